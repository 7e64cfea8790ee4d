/// AES-256-GCM secret envelope encryption
///
/// Envelope wire format: `base64(nonce || ciphertext || tag)`. The nonce is
/// fresh per encryption and travels with the ciphertext, so decryption needs
/// only the envelope and the key.
use crate::error::{CustodyError, Result};
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;

/// Seal a plaintext under a fresh random nonce.
pub fn encrypt(plaintext: &[u8], key: &[u8; 32]) -> Result<String> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| CustodyError::EncryptionFailure)?;

    let mut envelope = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    envelope.extend_from_slice(&nonce_bytes);
    envelope.extend_from_slice(&ciphertext);

    Ok(STANDARD.encode(envelope))
}

/// Open an envelope produced by [`encrypt`].
///
/// Fails on malformed base64, on input shorter than nonce + tag, and on
/// authentication tag mismatch (tampering or wrong key). Never returns
/// partial plaintext.
pub fn decrypt(envelope: &str, key: &[u8; 32]) -> Result<Vec<u8>> {
    let data = STANDARD
        .decode(envelope)
        .map_err(|_| CustodyError::DecryptionFailure)?;

    if data.len() < NONCE_LEN + TAG_LEN {
        return Err(CustodyError::DecryptionFailure);
    }

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let nonce = Nonce::from_slice(&data[..NONCE_LEN]);

    cipher
        .decrypt(nonce, &data[NONCE_LEN..])
        .map_err(|_| CustodyError::DecryptionFailure)
}
