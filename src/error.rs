//! Application error type.
//!
//! Every fallible operation returns an [`AppError`] carrying the process exit
//! code it should map to:
//!
//! - `2` input, IO, or validation problems
//! - `3` nothing left to score
//! - `4` writing build artifacts
//! - `5` query service startup

use thiserror::Error;

pub const EXIT_INPUT: u8 = 2;
pub const EXIT_EMPTY: u8 = 3;
pub const EXIT_OUTPUT: u8 = 4;
pub const EXIT_SERVE: u8 = 5;

#[derive(Clone, Error)]
#[error("{message}")]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self::new(EXIT_INPUT, message)
    }

    pub fn output(message: impl Into<String>) -> Self {
        Self::new(EXIT_OUTPUT, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}
