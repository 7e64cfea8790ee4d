/// Data-key provider collaborator for secret envelope encryption
use crate::config::EncryptionSettings;
use crate::error::{CustodyError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

pub const DATA_KEY_LEN: usize = 32;

/// Contract with the external key-management collaborator: return a 256-bit
/// symmetric key or fail. Key storage and rotation live behind this seam;
/// this core never implements them.
pub trait KeyProvider: Send + Sync {
    fn data_key(&self) -> Result<[u8; DATA_KEY_LEN]>;
}

/// Key provider backed by a base64 key from configuration.
///
/// This is where a managed key service client would be substituted; the
/// rest of the crate only sees the `KeyProvider` contract.
pub struct StaticKeyProvider {
    key: [u8; DATA_KEY_LEN],
}

impl StaticKeyProvider {
    pub fn new(settings: &EncryptionSettings) -> Result<Self> {
        Self::from_base64(&settings.data_key)
    }

    pub fn from_base64(key_base64: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(key_base64)
            .map_err(|_| CustodyError::EncryptionFailure)?;

        let key: [u8; DATA_KEY_LEN] = bytes
            .try_into()
            .map_err(|_| CustodyError::EncryptionFailure)?;

        Ok(Self { key })
    }
}

impl KeyProvider for StaticKeyProvider {
    fn data_key(&self) -> Result<[u8; DATA_KEY_LEN]> {
        Ok(self.key)
    }
}

/// Generate a fresh random 256-bit data key, base64-encoded for storage in
/// configuration or a key management system.
pub fn generate_data_key() -> String {
    let mut key = [0u8; DATA_KEY_LEN];
    OsRng.fill_bytes(&mut key);
    STANDARD.encode(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_key_round_trips_through_provider() {
        let encoded = generate_data_key();
        let provider = StaticKeyProvider::from_base64(&encoded).expect("valid key");
        assert_eq!(provider.data_key().unwrap().len(), DATA_KEY_LEN);
    }

    #[test]
    fn rejects_wrong_length_and_bad_base64() {
        assert!(StaticKeyProvider::from_base64(&STANDARD.encode(b"short")).is_err());
        assert!(StaticKeyProvider::from_base64("not@valid@base64!!!").is_err());
    }
}
