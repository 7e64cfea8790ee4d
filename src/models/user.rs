use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Identity record - core entity of the custody layer
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// Stored as `hex(salt):hex(derived_key)`; plaintext is never persisted
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Present only while the second factor is enabled
    #[serde(skip_serializing)]
    pub totp_secret: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether the second factor is required at login.
    pub fn totp_enabled(&self) -> bool {
        self.totp_secret.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// Role record; `admin` is the only role this core interprets structurally
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Identity summary safe to return to callers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        length(min = 3, max = 32),
        custom(function = "crate::validators::validate_username_shape")
    )]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 32))]
    pub username: String,
    #[validate(length(min = 1, max = 256))]
    pub password: String,
    /// Second-factor code; supplied on the second round-trip when the
    /// identity has TOTP enabled
    pub totp_code: Option<String>,
}
