//! Short code generation and alias validation.
//!
//! Codes are drawn from a case-sensitive alphanumeric alphabet using the
//! operating system CSPRNG.

use crate::error::AppError;
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

/// Alphabet of generated codes: `[A-Za-z0-9]`.
pub const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Bounds of the configurable generated code length.
pub const MIN_CODE_LENGTH: usize = 4;
pub const MAX_CODE_LENGTH: usize = 20;

pub const MAX_ALIAS_LENGTH: usize = 64;

/// Aliases that would shadow routed paths.
const RESERVED_ALIASES: &[&str] = &["shorten", "health", "metrics"];

/// Character set of a non-empty alias. Length is checked separately.
pub static ALIAS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

/// Largest multiple of the alphabet size that fits in a byte; bytes at or
/// above it are rejected so every symbol is equally likely.
const ACCEPT_BELOW: u8 = (256 / ALPHABET.len() * ALPHABET.len()) as u8;

/// Generates a random code of exactly `length` characters from [`ALPHABET`].
///
/// # Panics
///
/// Panics if the system random number generator fails. Without entropy no
/// safe code can be produced, so this is treated as fatal.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code(8);
/// assert_eq!(code.len(), 8);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_code(length: usize) -> String {
    let mut code = String::with_capacity(length);
    let mut buffer = [0u8; 32];

    while code.len() < length {
        getrandom::fill(&mut buffer).expect("Failed to generate random bytes");

        for &byte in buffer.iter().filter(|&&b| b < ACCEPT_BELOW) {
            if code.len() == length {
                break;
            }
            code.push(ALPHABET[byte as usize % ALPHABET.len()] as char);
        }
    }

    code
}

/// Validates a user-provided alias.
///
/// # Rules
///
/// - Length: 1-64 characters
/// - Allowed characters: ASCII letters, digits, `_` and `-`
/// - Cannot be a routed path (`shorten`, `health`, `metrics`)
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule is violated.
pub fn validate_alias(alias: &str) -> Result<(), AppError> {
    if alias.is_empty() || alias.len() > MAX_ALIAS_LENGTH {
        return Err(AppError::bad_request(
            format!("Alias must be 1-{} characters", MAX_ALIAS_LENGTH),
            json!({ "provided_length": alias.len() }),
        ));
    }

    if !ALIAS_REGEX.is_match(alias) {
        return Err(AppError::bad_request(
            "Alias can only contain letters, digits, underscores and hyphens",
            json!({ "alias": alias }),
        ));
    }

    if RESERVED_ALIASES.contains(&alias) {
        return Err(AppError::bad_request(
            "This alias is reserved",
            json!({ "alias": alias }),
        ));
    }

    Ok(())
}
