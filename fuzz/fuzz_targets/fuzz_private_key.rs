#![no_main]

use blockpi_core::{crypto::PrivateKey, recover_address, sign, Error};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary text as a key: either a clean InvalidKey or a valid signature
    if let Ok(text) = std::str::from_utf8(data) {
        match sign(text, data) {
            Ok(sig) => {
                assert_eq!(sig.len(), 132);
                let key = PrivateKey::from_hex(text).unwrap();
                assert_eq!(recover_address(data, &sig).unwrap(), key.address());
            }
            Err(e) => assert!(matches!(e, Error::InvalidKey(_))),
        }
    }

    // Raw 32-byte scalars
    if data.len() >= 32 {
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&data[..32]);

        if let Ok(key) = PrivateKey::from_bytes(&bytes) {
            let msg = &data[32..];
            let a = key.sign_message(msg).unwrap();
            let b = key.sign_message(msg).unwrap();
            assert_eq!(a, b);
            assert!(a.recovery_id() <= 1);
        }
    }
});
