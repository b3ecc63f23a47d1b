//! Exit outcome taxonomy.
//!
//! Every command ends in exactly one [`ExitOutcome`]. The dispatcher prints
//! the message of anything but `Success` to stderr and exits with
//! [`ExitOutcome::code`].

use std::fmt;

use crate::core::constants::{BACKEND_EXIT_CODE, MISUSE_EXIT_CODE};
use crate::error::{Error, ErrorKind, Result};

/// How a command finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitOutcome {
    Success,
    /// The secret store was reached and failed.
    Backend(String),
    /// Local validation failed.
    Misuse(String),
    /// A supervised child exited non-zero; its code becomes ours.
    Passthrough { code: i32, message: String },
}

impl ExitOutcome {
    pub fn backend(err: impl fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }

    pub fn misuse(err: impl fmt::Display) -> Self {
        Self::Misuse(err.to_string())
    }

    /// Process exit code for this outcome.
    pub fn code(&self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Backend(_) => BACKEND_EXIT_CODE,
            Self::Misuse(_) => MISUSE_EXIT_CODE,
            Self::Passthrough { code, .. } => *code,
        }
    }

    /// Message to print, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success => None,
            Self::Backend(msg) | Self::Misuse(msg) => Some(msg),
            Self::Passthrough { message, .. } => Some(message),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl From<Error> for ExitOutcome {
    fn from(err: Error) -> Self {
        match err.kind() {
            ErrorKind::Misuse => Self::misuse(err),
            ErrorKind::Backend => Self::backend(err),
        }
    }
}

impl From<Result<()>> for ExitOutcome {
    fn from(result: Result<()>) -> Self {
        match result {
            Ok(()) => Self::Success,
            Err(err) => err.into(),
        }
    }
}

impl From<Result<ExitOutcome>> for ExitOutcome {
    fn from(result: Result<ExitOutcome>) -> Self {
        result.unwrap_or_else(Self::from)
    }
}
