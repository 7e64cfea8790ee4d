//! Service layer: the operations the custody core exposes to its host.
//!
//! Services hold `Arc`s to store traits and the crypto collaborators, so a
//! host can clone them freely across request handlers.

pub mod access;
pub mod audit;
pub mod auth;
pub mod secrets;
pub mod users;

pub use access::{AccessGate, Capability, CapabilitySet};
pub use audit::{AuditRecorder, AuditService};
pub use auth::{AuthService, LoginOutcome, TotpEnrollment};
pub use secrets::SecretService;
pub use users::{UserService, UserWithRoles};
