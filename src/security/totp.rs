/// Time-based one-time password second factor (RFC 4226 / RFC 6238)
use crate::error::{CustodyError, Result};
use crate::security::constant_time_eq;
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha1::Sha1;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha1 = Hmac<Sha1>;

const SECRET_LEN: usize = 20;
const TIME_STEP_SECS: u64 = 30;
const CODE_DIGITS: usize = 6;

pub struct TotpAuthenticator;

impl TotpAuthenticator {
    /// Generate a new shared secret: 20 cryptographically random bytes,
    /// base32-encoded. 160 bits encode to exactly 32 characters with no
    /// padding, which is what authenticator apps expect.
    pub fn generate_secret() -> String {
        let mut bytes = [0u8; SECRET_LEN];
        OsRng.fill_bytes(&mut bytes);
        base32_encode(&bytes)
    }

    /// Build the standard provisioning URI for enrollment.
    ///
    /// The caller renders this as a scannable code; this core only produces
    /// the URI. Account and issuer are percent-encoded.
    pub fn provisioning_uri(secret: &str, account: &str, issuer: &str) -> String {
        format!(
            "otpauth://totp/{}:{}?secret={}&issuer={}",
            urlencoding::encode(issuer),
            urlencoding::encode(account),
            secret,
            urlencoding::encode(issuer),
        )
    }

    /// Validate a user-supplied code against the shared secret.
    ///
    /// Accepts the current 30-second step and the adjacent ±1 steps to
    /// tolerate clock drift. Non-numeric or wrong-length codes are rejected
    /// outright; an undecodable secret is an error because it indicates a
    /// corrupted enrollment, not a bad guess.
    pub fn validate_code(code: &str, secret: &str) -> Result<bool> {
        if code.len() != CODE_DIGITS || !code.chars().all(|c| c.is_ascii_digit()) {
            return Ok(false);
        }

        let secret_bytes = base32_decode(secret).ok_or(CustodyError::InvalidTotp)?;

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| CustodyError::Internal(format!("system time error: {e}")))?
            .as_secs();
        let current_step = now / TIME_STEP_SECS;

        for step_offset in [-1i64, 0, 1] {
            let step = (current_step as i64 + step_offset) as u64;
            let expected = totp_code(&secret_bytes, step)?;
            if constant_time_eq(code.as_bytes(), expected.as_bytes()) {
                return Ok(true);
            }
        }

        Ok(false)
    }
}

/// HMAC-SHA1 code for one time step, with dynamic truncation per RFC 4226 §5.3.
fn totp_code(secret: &[u8], step: u64) -> Result<String> {
    let mut mac = HmacSha1::new_from_slice(secret)
        .map_err(|e| CustodyError::Internal(format!("invalid HMAC key: {e}")))?;
    mac.update(&step.to_be_bytes());
    let hash = mac.finalize().into_bytes();

    let offset = (hash[hash.len() - 1] & 0x0f) as usize;
    let truncated = u32::from_be_bytes([
        hash[offset] & 0x7f,
        hash[offset + 1],
        hash[offset + 2],
        hash[offset + 3],
    ]);

    Ok(format!("{:06}", truncated % 1_000_000))
}

/// Base32 encode (RFC 4648, standard alphabet)
fn base32_encode(data: &[u8]) -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";
    let mut output = String::new();
    let mut buffer = 0u32;
    let mut buffer_size = 0;

    for byte in data {
        buffer = (buffer << 8) | (*byte as u32);
        buffer_size += 8;

        while buffer_size >= 5 {
            buffer_size -= 5;
            let index = ((buffer >> buffer_size) & 0x1f) as usize;
            output.push(ALPHABET[index] as char);
        }
    }

    if buffer_size > 0 {
        buffer <<= 5 - buffer_size;
        output.push(ALPHABET[(buffer & 0x1f) as usize] as char);
    }

    while output.len() % 8 != 0 {
        output.push('=');
    }

    output
}

/// Base32 decode (RFC 4648), returns None on any character outside the alphabet
fn base32_decode(data: &str) -> Option<Vec<u8>> {
    let data = data.trim_end_matches('=');
    let mut buffer = 0u32;
    let mut buffer_size = 0;
    let mut output = Vec::new();

    for ch in data.chars() {
        let value = match ch {
            'A'..='Z' => (ch as u32) - ('A' as u32),
            '2'..='7' => (ch as u32) - ('2' as u32) + 26,
            _ => return None,
        };

        buffer = (buffer << 5) | value;
        buffer_size += 5;

        if buffer_size >= 8 {
            buffer_size -= 8;
            output.push(((buffer >> buffer_size) & 0xff) as u8);
        }
    }

    Some(output)
}
