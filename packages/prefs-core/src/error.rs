//! Error types shared by every prefstore layer.

use std::path::PathBuf;

use thiserror::Error;

use crate::value::PrefType;

/// Errors produced by preference stores and the cells built on them.
#[derive(Debug, Error)]
pub enum Error {
    /// A preference name was rejected.
    #[error("invalid key: {message}")]
    InvalidKey { message: String },

    /// A type name did not match any known preference type.
    #[error("unknown preference type: {name}")]
    UnknownType { name: String },

    /// A stored enum name matched none of the enum's constants.
    #[error("no {enum_name} constant named {name:?}")]
    UnknownVariant {
        enum_name: &'static str,
        name: String,
    },

    /// The stored entry holds a different primitive type than requested.
    #[error("type mismatch for '{key}': expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: PrefType,
        found: PrefType,
    },

    /// Store configuration is unusable.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Another store in this process already holds the file.
    #[error("preference file already open: {}", path.display())]
    AlreadyOpen { path: PathBuf },

    /// The preference file could not be parsed.
    #[error("corrupt preference file {}: {message}", path.display())]
    Corrupt { path: PathBuf, message: String },

    /// Encoding or decoding the stored representation failed.
    #[error("serialization error: {message}")]
    Serialization { message: String },

    /// An I/O error occurred.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The change stream or the store behind it has gone away.
    #[error("store closed")]
    Closed,

    /// Generic error with message.
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Error::InvalidKey {
            message: message.into(),
        }
    }

    pub fn serialization(message: impl ToString) -> Self {
        Error::Serialization {
            message: message.to_string(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Error::Other {
            message: message.into(),
        }
    }
}

/// Result type alias for prefstore operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn unknown_variant_display() {
        let e = Error::UnknownVariant {
            enum_name: "Theme",
            name: "Purple".to_string(),
        };
        let display = format!("{}", e);
        assert!(display.contains("Theme"));
        assert!(display.contains("\"Purple\""));
    }

    #[test]
    fn type_mismatch_display() {
        let e = Error::TypeMismatch {
            key: "volume".to_string(),
            expected: PrefType::Int,
            found: PrefType::String,
        };
        assert_eq!(
            format!("{}", e),
            "type mismatch for 'volume': expected int, found string"
        );
    }

    #[test]
    fn corrupt_display_includes_path() {
        let e = Error::Corrupt {
            path: PathBuf::from("/tmp/prefs.preferences.json"),
            message: "expected value".to_string(),
        };
        let display = format!("{}", e);
        assert!(display.contains("/tmp/prefs.preferences.json"));
        assert!(display.contains("expected value"));
    }

    #[test]
    fn io_error_converts_and_keeps_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let e: Error = io_err.into();
        assert!(matches!(e, Error::Io(_)));
        assert!(StdError::source(&e).is_some());
    }

    #[test]
    fn other_error_display() {
        assert_eq!(format!("{}", Error::other("boom")), "boom");
        assert!(StdError::source(&Error::other("boom")).is_none());
    }
}
