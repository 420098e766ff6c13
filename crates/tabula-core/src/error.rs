//! Error types for tabula-core

use crate::Position;
use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by sheet operations
///
/// None of these leave partial state behind: the operation that returns one
/// has not changed the sheet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Position outside the grid limits
    #[error("Position ({}, {}) out of bounds", .0.row, .0.col)]
    OutOfBounds(Position),

    /// The written formula would make a cell depend on itself
    #[error("Circular dependency detected at cell {0}")]
    CircularDependency(Position),

    /// Formula text could not be parsed
    #[error("Formula parse error: {0}")]
    FormulaParse(String),

    /// Invalid A1-style address text
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),
}
