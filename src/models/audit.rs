use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Caller address and client agent string attached to every audit event
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestOrigin {
    pub ip_address: String,
    pub user_agent: String,
}

/// Security-relevant action tags; one per decisive outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    Register,
    LoginFailed,
    LoginSuccess,
    TotpEnable,
    UsersList,
    UserRead,
    UserUpdate,
    AssignRole,
    SecretCreate,
    SecretsList,
    SecretRead,
    SecretDelete,
    ListAudit,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Register => "user.register",
            AuditAction::LoginFailed => "auth.login.failed",
            AuditAction::LoginSuccess => "auth.login.success",
            AuditAction::TotpEnable => "totp.enable",
            AuditAction::UsersList => "users.list",
            AuditAction::UserRead => "users.read",
            AuditAction::UserUpdate => "users.update",
            AuditAction::AssignRole => "users.assign_role",
            AuditAction::SecretCreate => "secrets.create",
            AuditAction::SecretsList => "secrets.list",
            AuditAction::SecretRead => "secrets.read",
            AuditAction::SecretDelete => "secrets.delete",
            AuditAction::ListAudit => "audit.list",
        }
    }

    /// Resource type the action operates on
    pub fn resource_type(&self) -> &'static str {
        match self {
            AuditAction::Register
            | AuditAction::TotpEnable
            | AuditAction::UsersList
            | AuditAction::UserRead
            | AuditAction::UserUpdate
            | AuditAction::AssignRole => "users",
            AuditAction::LoginFailed | AuditAction::LoginSuccess => "auth",
            AuditAction::SecretCreate
            | AuditAction::SecretsList
            | AuditAction::SecretRead
            | AuditAction::SecretDelete => "secrets",
            AuditAction::ListAudit => "audit",
        }
    }

    /// Reading one's own audit history is exempt from recording so the
    /// trail does not grow from inspecting itself.
    pub fn exempt_from_recording(&self) -> bool {
        matches!(self, AuditAction::ListAudit)
    }
}

/// Reason recorded when a login transitions to rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginFailureReason {
    UserNotFound,
    UserInactive,
    InvalidPassword,
    InvalidTotp,
}

/// Closed set of per-action detail payloads, tagged by kind so event rows
/// serialize predictably.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditDetail {
    None,
    LoginFailed {
        #[serde(skip_serializing_if = "Option::is_none")]
        username: Option<String>,
        reason: LoginFailureReason,
    },
    SecretCreated {
        name: String,
    },
    SecretRead {
        name: String,
    },
    SecretDeleted {
        name: String,
    },
    UserUpdated {
        is_active: bool,
    },
    RoleAssigned {
        role_id: Uuid,
    },
}

/// Immutable audit event row; append-only, never updated or deleted
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditEvent {
    pub id: Uuid,
    /// Absent for pre-authentication failures
    pub user_id: Option<Uuid>,
    pub action: String,
    pub resource: String,
    pub resource_id: Option<Uuid>,
    pub details: serde_json::Value,
    pub ip_address: String,
    pub user_agent: String,
    pub created_at: DateTime<Utc>,
}

/// Append payload handed to the audit store
#[derive(Debug, Clone)]
pub struct NewAuditEvent {
    pub actor_id: Option<Uuid>,
    pub action: AuditAction,
    pub resource_id: Option<Uuid>,
    pub detail: AuditDetail,
    pub origin: RequestOrigin,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_serializes_with_kind_tag() {
        let detail = AuditDetail::LoginFailed {
            username: Some("alice".to_string()),
            reason: LoginFailureReason::InvalidPassword,
        };
        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["kind"], "login_failed");
        assert_eq!(value["reason"], "invalid_password");
        assert_eq!(value["username"], "alice");
    }

    #[test]
    fn pre_auth_failure_omits_username_cleanly() {
        let detail = AuditDetail::LoginFailed {
            username: None,
            reason: LoginFailureReason::UserNotFound,
        };
        let value = serde_json::to_value(&detail).unwrap();
        assert!(value.get("username").is_none());
    }

    #[test]
    fn only_audit_listing_is_exempt() {
        for action in [
            AuditAction::Register,
            AuditAction::LoginFailed,
            AuditAction::SecretCreate,
            AuditAction::UserUpdate,
        ] {
            assert!(!action.exempt_from_recording());
        }
        assert!(AuditAction::ListAudit.exempt_from_recording());
    }
}
