//! Home directory and environment variable expansion for path values.
//!
//! Supports:
//! - `~` and `~/…` - expands to the home directory
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

use crate::ConfigError;

/// Expand `~` and `${VAR}` references in a path string.
///
/// Returns the original string unchanged if it neither starts with `~` nor
/// contains `${`. Bare `$VAR` syntax is not expanded.
pub(crate) fn expand_path(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.starts_with('~') && !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::full_with_context(
        value,
        || std::env::var("HOME").ok(),
        |var| -> Result<Option<String>, LookupError> {
            match std::env::var(var) {
                Ok(val) => Ok(Some(val)),
                Err(_) => Err(LookupError {
                    var_name: var.to_owned(),
                }),
            }
        },
    )
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{0}}} not set", e.cause.var_name),
    })
}

/// Error returned when environment variable lookup fails.
struct LookupError {
    var_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("HABR_TEST_IMAGES", "/srv/images");
        }
        let result = expand_path("${HABR_TEST_IMAGES}/post", "images.base_dir").unwrap();
        assert_eq!(result, "/srv/images/post");
        unsafe {
            std::env::remove_var("HABR_TEST_IMAGES");
        }
    }

    #[test]
    fn test_expand_with_default() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("HABR_TEST_UNSET");
        }
        let result = expand_path("${HABR_TEST_UNSET:-img}", "images.base_dir").unwrap();
        assert_eq!(result, "img");
    }

    #[test]
    fn test_expand_missing_var_error() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("HABR_TEST_MISSING");
        }
        let err = expand_path("${HABR_TEST_MISSING}", "images.base_dir").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("HABR_TEST_MISSING"));
        assert!(err.to_string().contains("images.base_dir"));
    }

    #[test]
    fn test_expand_tilde() {
        let Ok(home) = std::env::var("HOME") else {
            return;
        };
        let result = expand_path("~/posts", "images.base_dir").unwrap();
        assert_eq!(result, format!("{home}/posts"));
    }

    #[test]
    fn test_literal_unchanged() {
        assert_eq!(expand_path("./images", "images.base_dir").unwrap(), "./images");
        assert_eq!(expand_path("$HOME/x", "images.base_dir").unwrap(), "$HOME/x");
    }
}
