/// Signed bearer token issue and verification (HS256)
use crate::config::JwtSettings;
use crate::error::{CustodyError, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed token lifetime. Renewal requires a fresh login; tokens are never
/// extended or refreshed implicitly.
const TOKEN_TTL_HOURS: i64 = 24;

const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Claims carried by a token. Not persisted; reconstructed from a verified
/// signature on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (identity id as UUID string)
    pub sub: String,
    pub username: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp); always `iat` + 24h
    pub exp: i64,
}

impl TokenClaims {
    pub fn new(subject: Uuid, username: &str, issued_at: DateTime<Utc>) -> Self {
        Self {
            sub: subject.to_string(),
            username: username.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        }
    }

    /// Subject parsed back to a UUID.
    pub fn subject_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|_| CustodyError::TokenInvalid)
    }
}

/// Issues and verifies signed identity claims.
///
/// Built once at startup from the shared signing key and passed by reference
/// into request handling; immutable thereafter, so concurrent use needs no
/// synchronization.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenIssuer {
    pub fn new(settings: &JwtSettings) -> Self {
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.validate_exp = true;
        // No leeway: a token one second past expiry is already invalid
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(settings.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(settings.secret.as_bytes()),
            validation,
        }
    }

    /// Mint a token for the given identity, valid for 24 hours from now.
    pub fn issue(&self, subject: Uuid, username: &str) -> Result<String> {
        self.sign(&TokenClaims::new(subject, username, Utc::now()))
    }

    pub(crate) fn sign(&self, claims: &TokenClaims) -> Result<String> {
        encode(&Header::new(TOKEN_ALGORITHM), claims, &self.encoding_key)
            .map_err(|e| CustodyError::Internal(format!("failed to sign token: {e}")))
    }

    /// Verify signature and expiry, returning the claims.
    ///
    /// Signature mismatch, algorithm mismatch, malformed structure and
    /// expiry in the past all collapse to `TokenInvalid`; the caller learns
    /// only that re-authentication is required.
    pub fn verify(&self, token: &str) -> Result<TokenClaims> {
        decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| CustodyError::TokenInvalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(&JwtSettings {
            secret: "test-signing-key".to_string(),
        })
    }

    #[test]
    fn issue_and_verify_round_trip() {
        let issuer = issuer();
        let subject = Uuid::new_v4();

        let token = issuer.issue(subject, "alice").expect("should issue");
        let claims = issuer.verify(&token).expect("should verify");

        assert_eq!(claims.subject_id().unwrap(), subject);
        assert_eq!(claims.username, "alice");
        assert!(claims.exp > claims.iat);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn verifies_within_window_and_rejects_after_expiry() {
        let issuer = issuer();
        let subject = Uuid::new_v4();

        // Issued 23h59m ago: still inside the 24h window
        let claims = TokenClaims::new(
            subject,
            "alice",
            Utc::now() - Duration::hours(23) - Duration::minutes(59),
        );
        let token = issuer.sign(&claims).unwrap();
        assert!(issuer.verify(&token).is_ok());

        // Issued 24h0m1s ago: expiry is in the past, no leeway
        let claims = TokenClaims::new(
            subject,
            "alice",
            Utc::now() - Duration::hours(24) - Duration::seconds(1),
        );
        let token = issuer.sign(&claims).unwrap();
        assert!(matches!(
            issuer.verify(&token),
            Err(CustodyError::TokenInvalid)
        ));
    }

    #[test]
    fn rejects_wrong_key() {
        let token = issuer().issue(Uuid::new_v4(), "alice").unwrap();
        let other = TokenIssuer::new(&JwtSettings {
            secret: "different-key".to_string(),
        });
        assert!(matches!(
            other.verify(&token),
            Err(CustodyError::TokenInvalid)
        ));
    }

    #[test]
    fn rejects_malformed_tokens() {
        let issuer = issuer();
        for token in ["", "garbage", "a.b", "a.b.c.d"] {
            assert!(issuer.verify(token).is_err(), "accepted {token:?}");
        }
    }

    #[test]
    fn rejects_resigned_claim_tampering() {
        let issuer = issuer();
        let token = issuer.issue(Uuid::new_v4(), "alice").unwrap();

        // Swap in a payload claiming a different username without re-signing
        let parts: Vec<&str> = token.split('.').collect();
        let mut claims: TokenClaims = serde_json::from_slice(
            &URL_SAFE_NO_PAD.decode(parts[1]).expect("payload decodes"),
        )
        .expect("claims parse");
        claims.username = "mallory".to_string();
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert!(matches!(
            issuer.verify(&forged),
            Err(CustodyError::TokenInvalid)
        ));
    }

    #[test]
    fn rejects_algorithm_confusion() {
        let issuer = issuer();
        let token = issuer.issue(Uuid::new_v4(), "alice").unwrap();

        // Rewrite the header to claim "none"; signature check must still fail
        let parts: Vec<&str> = token.split('.').collect();
        let none_header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let forged = format!("{}.{}.", none_header, parts[1]);

        assert!(issuer.verify(&forged).is_err());
    }
}
