//! Formula tokens

use crate::registry::{FunctionDef, OperatorDef, SymbolRegistry};
use std::fmt;

/// A classified unit of a formula
///
/// Operator and function tokens carry their registry entry, so a token
/// sequence can be evaluated without consulting the registry again.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Numeric literal
    Number(f64),
    /// Cell reference like A10, kept as written
    Cell(String),
    /// Binary operator
    Operator(OperatorDef),
    /// Variadic function name
    Function(FunctionDef),
    /// `(`
    LeftBracket,
    /// `)`
    RightBracket,
    /// `;` argument separator
    Semicolon,
    /// Unrecognized fragment (only produced on request)
    Text(String),
}

/// Token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Cell,
    Number,
    Operator,
    Function,
    LeftBracket,
    RightBracket,
    Semicolon,
    Text,
}

impl TokenKind {
    /// Kind name as used in token dumps
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Cell => "cell",
            TokenKind::Number => "number",
            TokenKind::Operator => "operator",
            TokenKind::Function => "function",
            TokenKind::LeftBracket => "left bracket",
            TokenKind::RightBracket => "right bracket",
            TokenKind::Semicolon => "semicolon",
            TokenKind::Text => "text",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Token {
    /// Build an operator token from the registry
    pub fn operator(registry: &SymbolRegistry, symbol: char) -> Option<Self> {
        registry.operator(symbol).copied().map(Token::Operator)
    }

    /// Build a function token from the registry (case-insensitive name)
    pub fn function(registry: &SymbolRegistry, name: &str) -> Option<Self> {
        registry.function(name).copied().map(Token::Function)
    }

    /// Build a cell reference token
    pub fn cell<S: Into<String>>(reference: S) -> Self {
        Token::Cell(reference.into())
    }

    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Number(_) => TokenKind::Number,
            Token::Cell(_) => TokenKind::Cell,
            Token::Operator(_) => TokenKind::Operator,
            Token::Function(_) => TokenKind::Function,
            Token::LeftBracket => TokenKind::LeftBracket,
            Token::RightBracket => TokenKind::RightBracket,
            Token::Semicolon => TokenKind::Semicolon,
            Token::Text(_) => TokenKind::Text,
        }
    }

    /// Binding priority, for operators and functions only
    pub fn priority(&self) -> Option<u8> {
        match self {
            Token::Operator(op) => Some(op.priority),
            Token::Function(func) => Some(func.priority),
            _ => None,
        }
    }

    /// Numeric value, for number tokens only
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Token::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Reference string, for cell tokens only
    pub fn as_reference(&self) -> Option<&str> {
        match self {
            Token::Cell(reference) => Some(reference),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Cell(reference) => f.write_str(reference),
            Token::Operator(op) => write!(f, "{}", op.symbol),
            Token::Function(func) => f.write_str(func.name),
            Token::LeftBracket => f.write_str("("),
            Token::RightBracket => f.write_str(")"),
            Token::Semicolon => f.write_str(";"),
            Token::Text(text) => f.write_str(text),
        }
    }
}

/// Tokens serialize as `{ "type": <kind>, "value": <value> }`.
#[cfg(feature = "serde")]
impl serde::Serialize for Token {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Token", 2)?;
        state.serialize_field("type", self.kind().as_str())?;
        match self {
            Token::Number(n) => state.serialize_field("value", n)?,
            other => state.serialize_field("value", &other.to_string())?,
        }
        state.end()
    }
}
