//! Error handling for the binvec crates.
//!
//! All fallible operations across the workspace return [`BinVecResult`]. The
//! [`binvec_err!`] and [`binvec_bail!`] macros construct and return errors
//! with formatted messages; [`binvec_panic!`] is reserved for invariant
//! violations that indicate data corruption or programmer error.

use std::str::Utf8Error;

use thiserror::Error;

/// The error type shared by every binvec crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BinVecError {
    /// The four-byte wire prefix is truncated or carries unknown type codes.
    #[error("malformed header: {0}")]
    MalformedHeader(String),
    /// A table field, vector, or packed region extends past the buffer.
    #[error("truncated payload: {0}")]
    TruncatedPayload(String),
    /// A packed bit-width outside the supported set {1, 8, 16, 32, 64}.
    #[error("unsupported nbits {0}, expected one of 1, 8, 16, 32, 64")]
    UnsupportedNBits(u8),
    /// A declared length is inconsistent with the sizes actually present.
    #[error("length mismatch: {0}")]
    LengthMismatch(String),
    /// The decoder registry has no maker for the requested element type.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    /// Bytes that were expected to be UTF-8 are not.
    #[error("invalid utf-8: {0}")]
    InvalidUtf8(#[from] Utf8Error),
    /// A caller-supplied argument is invalid.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience alias used throughout the workspace.
pub type BinVecResult<T> = Result<T, BinVecError>;

/// Construct a [`BinVecError`], optionally naming the variant:
/// `binvec_err!(TruncatedPayload: "vector ends at {}", end)`. Without a
/// variant the error is an `InvalidArgument`.
#[macro_export]
macro_rules! binvec_err {
    ($variant:ident: $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::BinVecError::$variant(format!($fmt $(, $arg)*))
    };
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::BinVecError::InvalidArgument(format!($fmt $(, $arg)*))
    };
}

/// Return early with a [`BinVecError`]; accepts the same forms as
/// [`binvec_err!`].
#[macro_export]
macro_rules! binvec_bail {
    ($($tt:tt)+) => {
        return Err($crate::binvec_err!($($tt)+))
    };
}

/// Panic with a formatted [`BinVecError`] message. Used on code paths that
/// are unreachable for blobs that passed construction-time validation, i.e.
/// data corruption.
#[macro_export]
macro_rules! binvec_panic {
    ($($tt:tt)+) => {
        panic!("{}", $crate::binvec_err!($($tt)+))
    };
}

#[cfg(test)]
mod test {
    use super::*;

    fn truncated() -> BinVecResult<()> {
        binvec_bail!(TruncatedPayload: "vector of {} bytes ends past the buffer", 24)
    }

    #[test]
    fn err_macro_selects_variant() {
        let err = binvec_err!(MalformedHeader: "unknown major type {}", 9);
        assert!(matches!(err, BinVecError::MalformedHeader(_)));
        assert_eq!(err.to_string(), "malformed header: unknown major type 9");

        let err = binvec_err!("index {} out of range", 3);
        assert!(matches!(err, BinVecError::InvalidArgument(_)));
    }

    #[test]
    fn bail_returns_early() {
        let err = truncated().unwrap_err();
        assert!(matches!(err, BinVecError::TruncatedPayload(_)));
    }
}
