//! Hash-then-sign over secp256k1
//!
//! Messages are hashed with Keccak-256 and signed with deterministic
//! (RFC 6979) ECDSA. Signatures are emitted in the 65-byte `r || s || v`
//! layout with `v` in `{0, 1}` and `s` normalized to the lower half of the
//! curve order.

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use sha3::{Digest, Keccak256};
use tracing::trace;
use zeroize::Zeroizing;

use crate::error::{Error, Result};
use crate::types::{
    strip_hex_prefix, Address, MessageHash, PublicKey, RecoverableSignature, SIGNATURE_LEN,
};

/// Hash data using Keccak-256
pub fn keccak256(data: impl AsRef<[u8]>) -> MessageHash {
    MessageHash::new(Keccak256::digest(data.as_ref()).into())
}

/// secp256k1 signing key
///
/// Constructed for a single signing call and dropped right after; the
/// underlying scalar is zeroized on drop.
pub struct PrivateKey {
    inner: SigningKey,
}

impl PrivateKey {
    /// Parse a 32-byte scalar from hex (the `0x` prefix is optional)
    pub fn from_hex(s: &str) -> Result<Self> {
        let digits = strip_hex_prefix(s.trim());
        if digits.len() != 64 {
            return Err(Error::InvalidKey(format!(
                "expected 64 hex characters, got {}",
                digits.len()
            )));
        }

        let mut bytes = Zeroizing::new([0u8; 32]);
        hex::decode_to_slice(digits, &mut bytes[..])
            .map_err(|e| Error::InvalidKey(e.to_string()))?;

        Self::from_bytes(&bytes)
    }

    /// Build from raw scalar bytes; rejects zero and values >= the curve order
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self> {
        let inner = SigningKey::from_slice(bytes)
            .map_err(|_| Error::InvalidKey("scalar out of range for secp256k1".to_string()))?;
        Ok(Self { inner })
    }

    /// Uncompressed public key
    pub fn public_key(&self) -> PublicKey {
        encode_verifying_key(self.inner.verifying_key())
    }

    /// Ethereum address of this key
    pub fn address(&self) -> Address {
        self.public_key().address()
    }

    /// Sign a precomputed 32-byte digest
    pub fn sign_hash(&self, hash: &MessageHash) -> Result<RecoverableSignature> {
        let (signature, recovery_id) = self
            .inner
            .sign_prehash_recoverable(hash.as_bytes())
            .map_err(|e| Error::Signing(e.to_string()))?;

        let mut bytes = [0u8; SIGNATURE_LEN];
        bytes[..64].copy_from_slice(&signature.to_bytes());
        bytes[64] = recovery_id.to_byte();

        Ok(RecoverableSignature::new(bytes))
    }

    /// Hash with Keccak-256, then sign the digest
    pub fn sign_message(&self, data: impl AsRef<[u8]>) -> Result<RecoverableSignature> {
        self.sign_hash(&keccak256(data))
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("address", &self.address().to_hex())
            .finish_non_exhaustive()
    }
}

/// Sign `data` with the hex-encoded private key.
///
/// Returns the signature as `0x` followed by 130 lowercase hex characters.
/// Signing the same message with the same key always yields the same string.
pub fn sign(private_key_hex: &str, data: impl AsRef<[u8]>) -> Result<String> {
    let key = PrivateKey::from_hex(private_key_hex)?;
    let data = data.as_ref();
    let signature = key.sign_message(data)?;
    trace!(len = data.len(), "signed message");
    Ok(signature.to_hex())
}

impl RecoverableSignature {
    /// Recover the signer's public key from the digest this signature covers
    pub fn recover(&self, hash: &MessageHash) -> Result<PublicKey> {
        let signature = Signature::from_slice(&self.0[..64])
            .map_err(|e| Error::InvalidSignature(e.to_string()))?;
        let recovery_id = RecoveryId::from_byte(self.recovery_id()).ok_or_else(|| {
            Error::InvalidSignature(format!("bad recovery id {}", self.recovery_id()))
        })?;

        let verifying_key =
            VerifyingKey::recover_from_prehash(hash.as_bytes(), &signature, recovery_id)
                .map_err(|e| Error::InvalidSignature(e.to_string()))?;

        Ok(encode_verifying_key(&verifying_key))
    }
}

/// Recover the Ethereum address that produced `signature_hex` over `data`
pub fn recover_address(data: impl AsRef<[u8]>, signature_hex: &str) -> Result<Address> {
    let signature = RecoverableSignature::from_hex(signature_hex)?;
    Ok(signature.recover(&keccak256(data))?.address())
}

fn encode_verifying_key(key: &VerifyingKey) -> PublicKey {
    let point = key.to_encoded_point(false);
    let mut bytes = [0u8; 65];
    bytes.copy_from_slice(point.as_bytes());
    PublicKey::new(bytes)
}
