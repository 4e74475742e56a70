//! Object key validation.
//!
//! Keys address stored objects the way bucket object names do: `/`-separated
//! relative paths. Validation runs before any provider touches the
//! filesystem or the network, so a traversal attempt never causes I/O.

use std::path::{Component, Path};

use crate::error::AppError;
use crate::result::AppResult;

/// Validate an object key.
///
/// Rejects empty keys, absolute keys, keys containing NUL bytes, and keys
/// with `.` or `..` path components. A valid key always resolves to a
/// location inside the provider's configured root.
pub fn validate(key: &str) -> AppResult<()> {
    if key.is_empty() {
        return Err(AppError::validation("Object key must not be empty"));
    }
    if key.contains('\0') {
        return Err(AppError::validation("Object key must not contain NUL"));
    }
    for component in Path::new(key).components() {
        match component {
            Component::Normal(_) => {}
            Component::ParentDir => {
                return Err(AppError::validation(format!(
                    "Object key '{key}' contains a parent-directory segment"
                )));
            }
            _ => {
                return Err(AppError::validation(format!(
                    "Object key '{key}' must be a relative path"
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_accepts_plain_keys() {
        assert!(validate("cover.png").is_ok());
        assert!(validate("2026/08/cover.png").is_ok());
        assert!(validate("posts/draft-1/hero image.webp").is_ok());
    }

    #[test]
    fn test_rejects_traversal() {
        let err = validate("../../etc/passwd").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let err = validate("uploads/../../secret").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_rejects_absolute_and_dot() {
        assert!(validate("/etc/passwd").is_err());
        assert!(validate("./cover.png").is_err());
        assert!(validate("").is_err());
        assert!(validate("a\0b").is_err());
    }
}
