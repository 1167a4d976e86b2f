use std::fmt;

/// Errors returned when constructing a [`crate::Context`].
///
/// This is the sole error kind this crate's public API returns; all other
/// failure modes (invalid opcodes, divide-by-zero, bad bus formats) are
/// architectural and are resolved internally by the exception pipeline
/// rather than surfaced to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    /// A required buffer was missing, empty, or not a power of two where one
    /// was required. The message names which buffer and constraint failed.
    InvalidArgument(&'static str),
}

impl fmt::Display for ContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
        }
    }
}

impl std::error::Error for ContextError {}
