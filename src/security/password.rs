/// Password hashing and verification using Argon2id
use crate::error::{CustodyError, Result};
use crate::security::constant_time_eq;
use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;
use rand::RngCore;

const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;

// Fixed cost parameters: 1 pass, 64 MiB, 4 lanes. Changing these invalidates
// every stored hash, so they are deliberately not configurable.
const T_COST: u32 = 1;
const M_COST_KIB: u32 = 64 * 1024;
const P_COST: u32 = 4;

fn kdf() -> Result<Argon2<'static>> {
    let params = Params::new(M_COST_KIB, T_COST, P_COST, Some(KEY_LEN))
        .map_err(|e| CustodyError::Internal(format!("invalid Argon2 params: {e}")))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a password with a fresh random 16-byte salt.
///
/// Returns the record as `hex(salt):hex(derived_key)`. Two calls on the same
/// password produce different records because the salt is fresh per call.
pub fn hash_password(password: &str) -> Result<String> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    let mut key = [0u8; KEY_LEN];
    kdf()?
        .hash_password_into(password.as_bytes(), &salt, &mut key)
        .map_err(|e| CustodyError::Internal(format!("password hashing failed: {e}")))?;

    Ok(format!("{}:{}", hex::encode(salt), hex::encode(key)))
}

/// Verify a password against a stored hash record.
///
/// Re-derives the key with the stored salt and compares it against the
/// stored key in constant time. A malformed record (wrong field count, bad
/// hex, wrong lengths) verifies as `false` rather than erroring, so callers
/// treat it exactly like a wrong password.
pub fn verify_password(password: &str, record: &str) -> bool {
    let parts: Vec<&str> = record.split(':').collect();
    if parts.len() != 2 {
        return false;
    }

    let Ok(salt) = hex::decode(parts[0]) else {
        return false;
    };
    let Ok(expected) = hex::decode(parts[1]) else {
        return false;
    };
    if salt.len() != SALT_LEN || expected.len() != KEY_LEN {
        return false;
    }

    let Ok(argon2) = kdf() else {
        return false;
    };

    let mut derived = [0u8; KEY_LEN];
    if argon2
        .hash_password_into(password.as_bytes(), &salt, &mut derived)
        .is_err()
    {
        return false;
    }

    constant_time_eq(&derived, &expected)
}
