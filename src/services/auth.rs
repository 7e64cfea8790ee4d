//! Registration, login and second-factor enrollment.
//!
//! Login is a strict state machine: each rejection audits exactly one event
//! with its reason, and the caller-facing error never distinguishes an
//! unknown username from a wrong password.

use crate::db::IdentityStore;
use crate::error::{CustodyError, Result};
use crate::models::{
    AuditAction, AuditDetail, LoginFailureReason, LoginRequest, RegisterRequest, RequestOrigin,
    UserSummary,
};
use crate::security::password::{hash_password, verify_password};
use crate::security::token::TokenIssuer;
use crate::security::totp::TotpAuthenticator;
use crate::services::audit::AuditRecorder;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Result of a login attempt that was not rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials were correct but the identity has TOTP enabled and no
    /// code was supplied; the caller must retry with one. Informational,
    /// not a failure, and not audited.
    TotpRequired,
    Success { token: String, user: UserSummary },
}

/// Material returned from TOTP enrollment: the caller shows the URI (or a
/// code rendered from it) once and never again.
#[derive(Debug, Clone)]
pub struct TotpEnrollment {
    pub secret: String,
    pub provisioning_uri: String,
}

#[derive(Clone)]
pub struct AuthService {
    identities: Arc<dyn IdentityStore>,
    token_issuer: Arc<TokenIssuer>,
    audit: AuditRecorder,
    totp_issuer: String,
}

impl AuthService {
    pub fn new(
        identities: Arc<dyn IdentityStore>,
        token_issuer: Arc<TokenIssuer>,
        audit: AuditRecorder,
        totp_issuer: String,
    ) -> Self {
        Self {
            identities,
            token_issuer,
            audit,
            totp_issuer,
        }
    }

    /// Create a new identity with a freshly derived credential record.
    pub async fn register(
        &self,
        request: RegisterRequest,
        origin: &RequestOrigin,
    ) -> Result<UserSummary> {
        request.validate()?;

        let password_hash = hash_password(&request.password)?;
        let user = self
            .identities
            .create(&request.username, &request.email, &password_hash)
            .await?;

        self.audit
            .record(
                Some(user.id),
                AuditAction::Register,
                Some(user.id),
                AuditDetail::None,
                origin,
            )
            .await;

        Ok(UserSummary::from(&user))
    }

    /// Run the login state machine for one attempt.
    pub async fn login(
        &self,
        request: LoginRequest,
        origin: &RequestOrigin,
    ) -> Result<LoginOutcome> {
        request.validate()?;

        let user = match self.identities.find_by_username(&request.username).await? {
            Some(user) => user,
            None => {
                self.audit
                    .record(
                        None,
                        AuditAction::LoginFailed,
                        None,
                        AuditDetail::LoginFailed {
                            username: Some(request.username.clone()),
                            reason: LoginFailureReason::UserNotFound,
                        },
                        origin,
                    )
                    .await;
                // Same error as a wrong password: existence must not leak
                return Err(CustodyError::AuthenticationFailure);
            }
        };

        if !user.is_active {
            self.audit
                .record(
                    Some(user.id),
                    AuditAction::LoginFailed,
                    Some(user.id),
                    AuditDetail::LoginFailed {
                        username: None,
                        reason: LoginFailureReason::UserInactive,
                    },
                    origin,
                )
                .await;
            return Err(CustodyError::AccountDeactivated);
        }

        if !verify_password(&request.password, &user.password_hash) {
            self.audit
                .record(
                    Some(user.id),
                    AuditAction::LoginFailed,
                    Some(user.id),
                    AuditDetail::LoginFailed {
                        username: None,
                        reason: LoginFailureReason::InvalidPassword,
                    },
                    origin,
                )
                .await;
            return Err(CustodyError::AuthenticationFailure);
        }

        if user.totp_enabled() {
            let secret = user.totp_secret.as_deref().unwrap_or_default();
            let code = match request.totp_code.as_deref() {
                Some(code) if !code.is_empty() => code,
                _ => return Ok(LoginOutcome::TotpRequired),
            };

            let valid = TotpAuthenticator::validate_code(code, secret).unwrap_or(false);
            if !valid {
                self.audit
                    .record(
                        Some(user.id),
                        AuditAction::LoginFailed,
                        Some(user.id),
                        AuditDetail::LoginFailed {
                            username: None,
                            reason: LoginFailureReason::InvalidTotp,
                        },
                        origin,
                    )
                    .await;
                return Err(CustodyError::InvalidTotp);
            }
        }

        let token = self.token_issuer.issue(user.id, &user.username)?;

        self.audit
            .record(
                Some(user.id),
                AuditAction::LoginSuccess,
                Some(user.id),
                AuditDetail::None,
                origin,
            )
            .await;

        Ok(LoginOutcome::Success {
            token,
            user: UserSummary::from(&user),
        })
    }

    /// Enroll the actor in TOTP: mint a fresh secret, persist it and return
    /// it with the provisioning URI. Enrolling again replaces the secret.
    pub async fn enable_totp(
        &self,
        actor: Uuid,
        origin: &RequestOrigin,
    ) -> Result<TotpEnrollment> {
        let user = self
            .identities
            .find_by_id(actor)
            .await?
            .ok_or(CustodyError::UserNotFound)?;

        let secret = TotpAuthenticator::generate_secret();
        self.identities.set_totp_secret(user.id, &secret).await?;

        let provisioning_uri =
            TotpAuthenticator::provisioning_uri(&secret, &user.username, &self.totp_issuer);

        self.audit
            .record(
                Some(user.id),
                AuditAction::TotpEnable,
                Some(user.id),
                AuditDetail::None,
                origin,
            )
            .await;

        Ok(TotpEnrollment {
            secret,
            provisioning_uri,
        })
    }
}
