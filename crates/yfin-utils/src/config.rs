//! Configuration helpers shared by the workspace crates

use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while reading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value could not be parsed
    #[error("Invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// The tracing subscriber could not be installed
    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

/// Read an environment variable, treating blank values as unset
pub fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read and parse an environment variable
///
/// Returns `Ok(None)` when the variable is unset or blank.
pub fn env_parse<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match env_string(key) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw,
                reason: e.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_string_blank_is_unset() {
        unsafe {
            std::env::set_var("YFIN_UTILS_TEST_BLANK", "   ");
            std::env::set_var("YFIN_UTILS_TEST_VALUE", " value ");
        }

        assert_eq!(env_string("YFIN_UTILS_TEST_BLANK"), None);
        assert_eq!(env_string("YFIN_UTILS_TEST_VALUE").as_deref(), Some("value"));
        assert_eq!(env_string("YFIN_UTILS_TEST_MISSING"), None);
    }

    #[test]
    fn test_env_parse() {
        unsafe {
            std::env::set_var("YFIN_UTILS_TEST_PORT", "8080");
            std::env::set_var("YFIN_UTILS_TEST_BAD_PORT", "eighty");
        }

        let port: Option<u16> = env_parse("YFIN_UTILS_TEST_PORT").unwrap();
        assert_eq!(port, Some(8080));

        let missing: Option<u16> = env_parse("YFIN_UTILS_TEST_NO_PORT").unwrap();
        assert!(missing.is_none());

        let err = env_parse::<u16>("YFIN_UTILS_TEST_BAD_PORT").unwrap_err();
        assert!(err.to_string().contains("YFIN_UTILS_TEST_BAD_PORT"));
        assert!(err.to_string().contains("eighty"));
    }
}
