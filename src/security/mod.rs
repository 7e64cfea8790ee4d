//! Security primitives for the custody core.
//!
//! - `password`: Argon2id password hashing and verification
//! - `totp`: TOTP second-factor generation and validation (RFC 6238)
//! - `token`: signed bearer token issue/verify (HS256)
//! - `cipher`: AES-256-GCM secret envelope encryption
//! - `keys`: data-key provider collaborator contract
//!
//! Everything here is a pure function of its inputs plus configuration built
//! once at startup; all of it is safe to call with unbounded parallelism.

pub mod cipher;
pub mod keys;
pub mod password;
pub mod token;
pub mod totp;

pub use cipher::{decrypt, encrypt};
pub use keys::{KeyProvider, StaticKeyProvider};
pub use password::{hash_password, verify_password};
pub use token::{TokenClaims, TokenIssuer};
pub use totp::TotpAuthenticator;

/// Compare two byte slices in time independent of where they differ.
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_time_eq_basic() {
        assert!(constant_time_eq(b"test", b"test"));
        assert!(!constant_time_eq(b"test", b"fail"));
        assert!(!constant_time_eq(b"test", b"t")); // different lengths
        assert!(constant_time_eq(b"", b""));
    }
}
