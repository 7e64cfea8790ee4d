/// Data models for identity, secrets and audit
pub mod audit;
pub mod secret;
pub mod user;

pub use audit::{
    AuditAction, AuditDetail, AuditEvent, LoginFailureReason, NewAuditEvent, RequestOrigin,
};
pub use secret::{CreateSecretRequest, NewSecret, Secret, SecretMetadata, SecretRevealed};
pub use user::{LoginRequest, RegisterRequest, Role, User, UserSummary};
