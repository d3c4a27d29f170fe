//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that abort a formula evaluation
///
/// Numeric anomalies (division by zero, overflow) and unrecognized input
/// fragments are not errors: they degrade to `0` or a dropped token.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// A cell reference was met but no resolver is bound
    #[error("No cell data source is bound to the evaluator")]
    MissingDataSource,

    /// The resolver has no value for a cell reference
    #[error("Unresolved cell reference: {0}")]
    UnresolvedReference(String),

    /// Wrong number of arguments
    #[error("Wrong number of arguments for {function}: expected {expected}, got {actual}")]
    ArityMismatch {
        function: String,
        expected: String,
        actual: usize,
    },

    /// A function name was used without an argument list
    #[error("Function '{0}' must be followed by a parenthesized argument list")]
    MisplacedFunction(String),

    /// Token sequence does not describe a single expression
    #[error("Malformed expression: {0}")]
    MalformedExpression(String),
}

impl FormulaError {
    /// Create a new "malformed expression" error with a message
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        FormulaError::MalformedExpression(msg.into())
    }
}
