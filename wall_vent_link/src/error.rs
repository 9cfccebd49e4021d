//! Error types for WallVentLink
//!
//! This module defines the error types returned by host collaborators
//! (material cloning, mesh upload, draw submission) and by the draw pass.

use std::fmt;

/// Result type for WallVentLink operations
pub type Result<T> = std::result::Result<T, Error>;

/// WallVentLink errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Host graphics backend refused an operation
    BackendError(String),

    /// Invalid resource (material, mesh, entity handle, etc.)
    InvalidResource(String),

    /// A lazily built resource could not be initialized
    InitializationFailed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Build a `BackendError`, logging it at ERROR level with file:line
///
/// # Example
///
/// ```ignore
/// let handle = pool.get(key)
///     .ok_or_else(|| wvl_err!("wvl::MockGraphics", "Unknown material {:?}", key))?;
/// ```
#[macro_export]
macro_rules! wvl_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::wvl::Runtime::log_detailed(
            $crate::wvl::log::LogSeverity::Error,
            $source,
            message.clone(),
            file!(),
            line!()
        );
        $crate::wvl::Error::BackendError(message)
    }};
}

/// Log and return a `BackendError` from the current function
///
/// # Example
///
/// ```ignore
/// if self.fail_draws {
///     wvl_bail!("wvl::MockGraphics", "Draw submission rejected");
/// }
/// ```
#[macro_export]
macro_rules! wvl_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::wvl_err!($source, $($arg)*))
    };
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
