//! Validation of submitted destination URLs.

use crate::error::AppError;
use serde_json::json;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum UrlValidationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("URL must use http or https scheme")]
    UnsupportedScheme(String),
}

/// Checks that `input` is an absolute `http` or `https` URL.
///
/// The URL is stored exactly as submitted; parsing is only used to validate it.
///
/// # Errors
///
/// Returns [`UrlValidationError::InvalidFormat`] for relative or malformed URLs
/// and [`UrlValidationError::UnsupportedScheme`] for any other scheme
/// (`javascript:`, `ftp:`, `data:`, ...).
pub fn validate_url(input: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(input).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(UrlValidationError::UnsupportedScheme(other.to_string())),
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::InvalidFormat(
            "missing host".to_string(),
        ));
    }

    Ok(url)
}

impl From<UrlValidationError> for AppError {
    fn from(e: UrlValidationError) -> Self {
        let details = match &e {
            UrlValidationError::InvalidFormat(reason) => json!({ "reason": reason }),
            UrlValidationError::UnsupportedScheme(scheme) => json!({ "scheme": scheme }),
        };
        AppError::bad_request(e.to_string(), details)
    }
}
