//! Input validation helpers shared by the request models.

use validator::ValidationError;

/// Username shape: starts with an ASCII letter or digit, then letters,
/// digits, `_`, `-` or `.`.
pub fn validate_username_shape(username: &str) -> Result<(), ValidationError> {
    let mut chars = username.chars();
    let valid_start = chars.next().is_some_and(|c| c.is_ascii_alphanumeric());
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));

    if valid_start && valid_rest {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_username"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_usernames() {
        for name in ["alice", "bob42", "a.b-c_d", "0day"] {
            assert!(validate_username_shape(name).is_ok(), "rejected {name}");
        }
    }

    #[test]
    fn rejects_bad_shapes() {
        for name in ["", "_leading", ".dot", "has space", "emoji😀", "semi;colon"] {
            assert!(validate_username_shape(name).is_err(), "accepted {name:?}");
        }
    }
}
