//! Short code generation and validation utilities.
//!
//! Generated codes are drawn uniformly from the 62-character alphanumeric
//! alphabet (`A-Z`, `a-z`, `0-9`). Every code, generated or user-supplied,
//! must match `^[A-Za-z0-9]{6,8}$`.

use crate::error::AppError;
use rand::Rng;
use rand::distr::Alphanumeric;
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

/// Length of generated codes.
pub const GENERATED_CODE_LENGTH: usize = 6;

/// Compiled pattern every stored code must match.
static CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{6,8}$").expect("code pattern is valid"));

/// Codes that would be shadowed by fixed routes.
const RESERVED_CODES: &[&str] = &["healthz"];

/// Generates a random short code of [`GENERATED_CODE_LENGTH`] characters.
///
/// Each character is sampled independently and uniformly from the
/// alphanumeric alphabet. No uniqueness check happens here; collisions
/// surface at insertion time.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code();
/// assert_eq!(code.len(), 6);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_code() -> String {
    generate_code_with_length(GENERATED_CODE_LENGTH)
}

/// Generates a random alphanumeric code of the given length.
pub fn generate_code_with_length(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Validates a short code.
///
/// # Rules
///
/// - Length: 6-8 characters
/// - Allowed characters: ASCII letters (either case) and digits
/// - Cannot be a reserved route name
///
/// # Errors
///
/// Returns [`AppError::InvalidCodeFormat`] if any rule is violated.
///
/// # Examples
///
/// ```ignore
/// assert!(validate_code("AbC123").is_ok());
/// assert!(validate_code("doc1").is_err());      // too short
/// assert!(validate_code("my-code1").is_err());  // hyphen
/// ```
pub fn validate_code(code: &str) -> Result<(), AppError> {
    if !CODE_REGEX.is_match(code) {
        return Err(AppError::invalid_code_format(
            "Code must be 6-8 alphanumeric characters",
            json!({ "code": code }),
        ));
    }

    if RESERVED_CODES.contains(&code) {
        return Err(AppError::invalid_code_format(
            "This code is reserved",
            json!({ "code": code }),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_code_has_correct_length() {
        let code = generate_code();
        assert_eq!(code.len(), GENERATED_CODE_LENGTH);
    }

    #[test]
    fn test_generate_code_is_alphanumeric() {
        for _ in 0..200 {
            let code = generate_code();
            assert!(code.chars().all(|c| c.is_ascii_alphanumeric()), "{code}");
        }
    }

    #[test]
    fn test_generated_codes_pass_validation() {
        for _ in 0..200 {
            assert!(validate_code(&generate_code()).is_ok());
        }
    }

    #[test]
    fn test_generate_code_covers_all_character_classes() {
        let mut seen_upper = false;
        let mut seen_lower = false;
        let mut seen_digit = false;

        for _ in 0..500 {
            for c in generate_code().chars() {
                seen_upper |= c.is_ascii_uppercase();
                seen_lower |= c.is_ascii_lowercase();
                seen_digit |= c.is_ascii_digit();
            }
        }

        assert!(seen_upper && seen_lower && seen_digit);
    }

    #[test]
    fn test_generate_code_mostly_unique() {
        let codes: HashSet<String> = (0..1000).map(|_| generate_code()).collect();
        // 62^6 possible codes; a handful of collisions would already be suspicious
        assert!(codes.len() > 995);
    }

    #[test]
    fn test_generate_code_with_length() {
        assert_eq!(generate_code_with_length(8).len(), 8);
        assert!(validate_code(&generate_code_with_length(9)).is_err());
    }

    #[test]
    fn test_validate_boundaries() {
        assert!(validate_code("abc123").is_ok());
        assert!(validate_code("ABCD1234").is_ok());
        assert!(validate_code("abc12").is_err());
        assert!(validate_code("abcd12345").is_err());
    }

    #[test]
    fn test_validate_mixed_case() {
        assert!(validate_code("AbCdEf").is_ok());
        assert!(validate_code("Zz09Yy").is_ok());
    }

    #[test]
    fn test_validate_too_short() {
        let err = validate_code("doc1").unwrap_err();
        assert!(matches!(err, AppError::InvalidCodeFormat { .. }));
        assert!(err.to_string().contains("6-8"));
    }

    #[test]
    fn test_validate_special_characters() {
        assert!(validate_code("my-code").is_err());
        assert!(validate_code("my_code").is_err());
        assert!(validate_code("my code").is_err());
        assert!(validate_code("code/12").is_err());
    }

    #[test]
    fn test_validate_non_ascii() {
        assert!(validate_code("ÄbCdEf").is_err());
        assert!(validate_code("１２３４５６").is_err());
    }

    #[test]
    fn test_validate_empty_string() {
        assert!(validate_code("").is_err());
    }

    #[test]
    fn test_validate_reserved_code() {
        let err = validate_code("healthz").unwrap_err();
        assert!(err.to_string().contains("reserved"));
    }
}
