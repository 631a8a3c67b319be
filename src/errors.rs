//! Errors that can occur using this crate.
//!
//! The crate's code is designed in a way that functions/method _can_ trigger all the enum variants
//! specified in the returned [`Result`]

use displaydoc::Display;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// Possible errors during image load.
///
/// Issues are invalid object images or errors while reading them.
/// `Display` and `Debug` provide all necessary details.
#[rustfmt::skip]
#[derive(Display, PartialEq, Eq)]
pub enum LoadImageError {
    /// Image is missing the two-byte origin word
    MissingOrigin,
    /// Error while reading the image stream: {0}
    ImageStreamNotReadable(String),
    /// Cannot read image from file '{file}': {message}
    ImageNotLoadable {
        file: String,
        message: String
    },
}
impl Debug for LoadImageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
impl Error for LoadImageError {}

/// Possible errors during program execution.
///
/// `Display` and `Debug` provide all necessary details.
#[rustfmt::skip]
#[expect(clippy::doc_markdown, reason = "using backticks as suggested would break displaydoc")]
#[derive(Display, PartialEq, Eq)]
pub enum ExecutionError {
    /// The reserved opcode {0:#06b} was found which is not specified. Most probably an invalid program.
    ReservedInstructionFound(u8),
    /// Error during reading Stdin or writing program output to Stdout: {0}
    IOInputOutputError(String),
}
impl Debug for ExecutionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
impl Error for ExecutionError {}

impl From<std::io::Error> for ExecutionError {
    fn from(error: std::io::Error) -> Self {
        Self::IOInputOutputError(error.to_string())
    }
}
