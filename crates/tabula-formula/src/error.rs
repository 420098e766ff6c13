//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur while parsing a formula
///
/// Evaluation never fails with this type: runtime faults are
/// [`CellError`](tabula_core::CellError) values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    /// Formula parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Character that cannot start any token
    #[error("Unexpected character '{0}'")]
    UnexpectedCharacter(char),

    /// Identifier that is neither a number nor a cell reference
    #[error("Unknown identifier: {0}")]
    UnknownIdentifier(String),
}
