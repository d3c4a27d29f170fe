//! Lexer and evaluator options

/// Options for tokenizing formulas
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerOptions {
    /// Read a comma between two digits as a decimal point (default: true)
    pub decimal_comma: bool,
    /// Insert a `0` after every `;` directly followed by `-` (default: true)
    pub zero_before_negative_argument: bool,
    /// Emit unrecognized fragments as `Text` tokens instead of dropping them
    pub keep_unrecognized: bool,
}

impl Default for LexerOptions {
    fn default() -> Self {
        Self {
            decimal_comma: true,
            zero_before_negative_argument: true,
            keep_unrecognized: false,
        }
    }
}

/// Options for evaluating token sequences
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluatorOptions {
    /// Reject function calls whose argument count the function does not accept
    ///
    /// When disabled, fixed-arity functions ignore surplus arguments and
    /// read missing ones as NaN.
    pub strict_arity: bool,
}

impl Default for EvaluatorOptions {
    fn default() -> Self {
        Self { strict_arity: true }
    }
}
