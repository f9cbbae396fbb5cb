#![no_main]

use blockpi_core::{keccak256, types::RecoverableSignature};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Recovery from arbitrary bytes must never panic
    if data.len() >= 65 {
        let mut bytes = [0u8; 65];
        bytes.copy_from_slice(&data[..65]);
        let signature = RecoverableSignature::new(bytes);
        let _ = signature.recover(&keccak256(&data[65..]));
    }

    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(signature) = RecoverableSignature::from_hex(text) {
            assert_eq!(signature.to_hex().len(), 132);
        }
    }
});
