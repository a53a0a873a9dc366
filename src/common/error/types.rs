//! Unified error types for the converter.
//!
//! Every layer (tokenizers, attribute set, content handlers, converters)
//! reports failures through [`Error`]. Callers that need a plain result code,
//! such as plugin hosts that cannot carry a rich error across their boundary,
//! collapse it with [`Error::kind`] or [`status`].
use thiserror::Error;

/// Closed set of conversion result codes.
///
/// `None` means success; every other kind is terminal for the conversion
/// that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum ErrorKind {
    /// Success
    #[default]
    None = 0,
    /// Malformed token stream or markup
    InvalidFormat = 1,
    /// A value outside the accepted domain of a callback or lookup
    InvalidParameter = 2,
    /// Allocation failure while building output or side tables
    InsufficientMemory = 3,
    /// Index-based accessor misuse
    OutOfRange = 4,
    /// Unclassified internal failure
    Unknown = 5,
}

impl ErrorKind {
    /// Stable integer code of this kind.
    #[inline]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Map an integer code back to a kind. Codes outside the closed set map
    /// to [`ErrorKind::Unknown`].
    #[inline]
    pub const fn from_code(code: i32) -> Self {
        match code {
            0 => Self::None,
            1 => Self::InvalidFormat,
            2 => Self::InvalidParameter,
            3 => Self::InsufficientMemory,
            4 => Self::OutOfRange,
            _ => Self::Unknown,
        }
    }

    /// Whether this kind denotes success.
    #[inline]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::None)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::None => "none",
            ErrorKind::InvalidFormat => "invalid format",
            ErrorKind::InvalidParameter => "invalid parameter",
            ErrorKind::InsufficientMemory => "insufficient memory",
            ErrorKind::OutOfRange => "out of range",
            ErrorKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Main error type for conversion operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed RTF token stream or XAML markup
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Value rejected by a callback or a vocabulary lookup
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Allocation failure
    #[error("Insufficient memory: {0}")]
    InsufficientMemory(String),

    /// Index past the end of an indexed collection
    #[error("Index {index} out of range (count {count})")]
    OutOfRange { index: usize, count: usize },

    /// Unclassified failure
    #[error("{0}")]
    Unknown(String),
}

impl Error {
    /// Result code corresponding to this error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidFormat(_) => ErrorKind::InvalidFormat,
            Error::InvalidParameter(_) => ErrorKind::InvalidParameter,
            Error::InsufficientMemory(_) => ErrorKind::InsufficientMemory,
            Error::OutOfRange { .. } => ErrorKind::OutOfRange,
            Error::Unknown(_) => ErrorKind::Unknown,
        }
    }

    pub(crate) fn format(message: impl Into<String>) -> Self {
        Error::InvalidFormat(message.into())
    }

    pub(crate) fn parameter(message: impl Into<String>) -> Self {
        Error::InvalidParameter(message.into())
    }
}

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Collapse a result into its result code.
#[inline]
pub fn status<T>(result: &Result<T>) -> ErrorKind {
    match result {
        Ok(_) => ErrorKind::None,
        Err(err) => err.kind(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for kind in [
            ErrorKind::None,
            ErrorKind::InvalidFormat,
            ErrorKind::InvalidParameter,
            ErrorKind::InsufficientMemory,
            ErrorKind::OutOfRange,
            ErrorKind::Unknown,
        ] {
            assert_eq!(ErrorKind::from_code(kind.code()), kind);
        }
        assert_eq!(ErrorKind::from_code(42), ErrorKind::Unknown);
        assert_eq!(ErrorKind::from_code(-1), ErrorKind::Unknown);
    }

    #[test]
    fn test_error_kind_and_status() {
        let err = Error::OutOfRange { index: 3, count: 2 };
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
        assert_eq!(err.to_string(), "Index 3 out of range (count 2)");

        let ok: Result<()> = Ok(());
        assert_eq!(status(&ok), ErrorKind::None);
        assert!(status(&ok).is_success());

        let failed: Result<()> = Err(Error::format("unterminated group"));
        assert_eq!(status(&failed), ErrorKind::InvalidFormat);
    }
}
