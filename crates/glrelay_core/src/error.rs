//! # Engine Error Types
//!
//! Two families, split by the thread that observes them:
//!
//! - [`MethodError`]: raised synchronously on the issuing thread, before
//!   anything is enqueued (usage errors, unimplemented methods) or when a
//!   blocking call can no longer complete.
//! - [`ExecError`]: raised by an Op while the execution thread drains the
//!   backlog. Returned from `flush()`, never retried.

use glrelay_shared::{NativeId, ObjectId};
use thiserror::Error;

/// Errors surfaced to the caller of a context method.
///
/// Every variant that concerns a specific method carries its name, so the
/// script side sees `[bindBuffer] ...` style messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MethodError {
    /// No method with that name exists.
    #[error("[{0}] no such method")]
    UnknownMethod(String),

    /// Fewer arguments than the method requires.
    #[error("[{method}] expected {expected} arguments, got {got}")]
    WrongArgumentCount {
        /// Method name.
        method: &'static str,
        /// Required argument count.
        expected: usize,
        /// Supplied argument count.
        got: usize,
    },

    /// An argument had the wrong type or an out-of-range value.
    #[error("[{method}] argument {index}: expected {expected}, got {got}")]
    InvalidArgument {
        /// Method name.
        method: &'static str,
        /// Zero-based argument position.
        index: usize,
        /// What the method wanted.
        expected: &'static str,
        /// What it received.
        got: String,
    },

    /// The method exists but does not support this enum value.
    #[error("[{method}] parameter 0x{pname:04X} isn't supported yet")]
    UnsupportedParameter {
        /// Method name.
        method: &'static str,
        /// The rejected enum.
        pname: u32,
    },

    /// The method is recognized but deliberately not implemented.
    #[error("[{0}] isn't implemented yet")]
    Unimplemented(&'static str),

    /// The method needs a WebGL2-capable context.
    #[error("[{0}] requires a WebGL2 context")]
    RequiresWebGL2(&'static str),

    /// The context was destroyed (or never existed).
    #[error("context lost")]
    ContextLost,

    /// A blocking call's Op was dropped before it ran, because an earlier Op
    /// in the same drain pass failed.
    #[error("[{0}] blocking call abandoned by a failed drain")]
    Abandoned(&'static str),

    /// A blocking call ran but its Op reported a failure.
    #[error("[{method}] {source}")]
    Execution {
        /// Method name.
        method: &'static str,
        /// What went wrong on the execution thread.
        source: ExecError,
    },
}

/// Result type for context methods.
pub type MethodResult<T> = Result<T, MethodError>;

/// Errors raised by an Op on the execution thread.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    /// A creation Op tried to map an id that already has a native object.
    #[error("{0} is already mapped to a native object")]
    ObjectAlreadyMapped(ObjectId),

    /// A native object returned by the driver has no virtual handle.
    #[error("native object {0} has no virtual handle")]
    UnknownNativeObject(NativeId),

    /// The backend reported a failure of its own.
    #[error("backend failure: {0}")]
    Backend(String),
}

/// Result type for Ops.
pub type ExecResult<T> = Result<T, ExecError>;

/// Errors loading a [`crate::config::GlRelayConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The TOML was malformed or had unexpected fields.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A field parsed but its value is unusable.
    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_tagged_with_method() {
        let err = MethodError::WrongArgumentCount {
            method: "bindBuffer",
            expected: 2,
            got: 1,
        };
        assert_eq!(err.to_string(), "[bindBuffer] expected 2 arguments, got 1");

        let err = MethodError::UnsupportedParameter {
            method: "getParameter",
            pname: 0x8CA6,
        };
        assert_eq!(
            err.to_string(),
            "[getParameter] parameter 0x8CA6 isn't supported yet"
        );
    }
}
