use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Stored secret. Ownership is exclusive: a secret is visible and
/// decryptable only to its creator.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Secret {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Envelope: `base64(nonce || ciphertext || tag)`
    #[serde(skip_serializing)]
    pub encrypted_data: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing projection: never carries ciphertext or plaintext
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SecretMetadata {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Single-secret read with the decrypted payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretRevealed {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub data: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateSecretRequest {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[validate(length(max = 512))]
    #[serde(default)]
    pub description: String,
    pub data: String,
}

/// Insert payload handed to the secret store
#[derive(Debug, Clone)]
pub struct NewSecret {
    pub name: String,
    pub description: String,
    pub encrypted_data: String,
    pub created_by: Uuid,
}
