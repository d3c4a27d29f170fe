//! Formula lexer
//!
//! Turns a formula string into classified tokens in three stages:
//!
//! 1. **Normalization** – whitespace removal, decimal-comma conversion and
//!    insertion of a `0` in front of a leading or bracketed `-`, so unary
//!    minus becomes a binary subtraction.
//! 2. **Splitting** – every separator character (operator symbols and
//!    `( ) ;`) becomes its own fragment; runs of other characters form the
//!    fragments in between.
//! 3. **Classification** – each fragment is matched against an ordered list
//!    of rules, first match wins. Fragments matching no rule are dropped.

use crate::options::LexerOptions;
use crate::registry::SymbolRegistry;
use crate::token::Token;

/// Tokenize a formula with the standard registry and default options
///
/// # Example
/// ```rust
/// use sheetcalc_formula::{tokenize, Token};
///
/// let tokens = tokenize("2,5 * A1");
/// assert_eq!(tokens.len(), 3);
/// assert_eq!(tokens[0], Token::Number(2.5));
/// assert_eq!(tokens[2], Token::cell("A1"));
/// ```
pub fn tokenize(formula: &str) -> Vec<Token> {
    Lexer::new(SymbolRegistry::standard()).tokenize(formula)
}

/// Formula lexer bound to a symbol registry
#[derive(Debug, Clone)]
pub struct Lexer<'r> {
    registry: &'r SymbolRegistry,
    options: LexerOptions,
}

impl<'r> Lexer<'r> {
    /// Create a lexer with default options
    pub fn new(registry: &'r SymbolRegistry) -> Self {
        Self {
            registry,
            options: LexerOptions::default(),
        }
    }

    /// Replace the lexer options
    pub fn with_options(mut self, options: LexerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &LexerOptions {
        &self.options
    }

    /// Convert a formula into an ordered token sequence
    pub fn tokenize(&self, formula: &str) -> Vec<Token> {
        let normalized = self.normalize(formula);
        let fragments = self.split(&normalized);
        tracing::trace!(formula, %normalized, ?fragments, "split formula");

        fragments
            .into_iter()
            .filter_map(|fragment| self.classify(fragment))
            .collect()
    }

    /// Apply the normalization steps, in order
    pub fn normalize(&self, formula: &str) -> String {
        // Whitespace
        let mut chars: Vec<char> = formula.chars().filter(|c| !c.is_whitespace()).collect();

        // Decimal comma: "2,5" -> "2.5"
        if self.options.decimal_comma {
            for i in 1..chars.len().saturating_sub(1) {
                if chars[i] == ',' && chars[i - 1].is_ascii_digit() && chars[i + 1].is_ascii_digit()
                {
                    chars[i] = '.';
                }
            }
        }

        let mut out = String::with_capacity(chars.len() + 4);

        // Leading minus: "-5" -> "0-5"
        if chars.first() == Some(&'-') {
            out.push('0');
        }

        // Minus opening a group or an argument: "(-5" -> "(0-5", ";-5" -> ";0-5"
        for (i, &c) in chars.iter().enumerate() {
            out.push(c);
            let opens_operand =
                c == '(' || (c == ';' && self.options.zero_before_negative_argument);
            if opens_operand && chars.get(i + 1) == Some(&'-') {
                out.push('0');
            }
        }

        out
    }

    /// Split a normalized formula around separator characters
    ///
    /// Separators become single-character fragments; empty fragments are
    /// never produced.
    pub fn split<'f>(&self, normalized: &'f str) -> Vec<&'f str> {
        let mut fragments = Vec::new();
        let mut start = 0;

        for (pos, c) in normalized.char_indices() {
            if !self.registry.is_separator(c) {
                continue;
            }
            if pos > start {
                fragments.push(&normalized[start..pos]);
            }
            let end = pos + c.len_utf8();
            fragments.push(&normalized[pos..end]);
            start = end;
        }
        if start < normalized.len() {
            fragments.push(&normalized[start..]);
        }

        fragments
    }

    /// Classify a single fragment
    ///
    /// Rules, first match wins:
    /// 1. exact operator symbol
    /// 2. `(`, `)` or `;`
    /// 3. fragment contains a function name (case-insensitive)
    /// 4. fragment starts with `digits[.digits]`
    /// 5. fragment starts with `LETTERS` + row number not starting with 0
    pub fn classify(&self, fragment: &str) -> Option<Token> {
        let mut chars = fragment.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if let Some(op) = self.registry.operator(c) {
                return Some(Token::Operator(*op));
            }
            match c {
                '(' => return Some(Token::LeftBracket),
                ')' => return Some(Token::RightBracket),
                ';' => return Some(Token::Semicolon),
                _ => {}
            }
        }

        if let Some(func) = self.registry.find_function_in(fragment) {
            return Some(Token::Function(*func));
        }

        if let Some(number) = numeric_prefix(fragment) {
            if number.len() < fragment.len() {
                tracing::debug!(fragment, number, "ignoring trailing characters of number");
            }
            // `numeric_prefix` only yields ASCII digits with at most one inner dot
            let value: f64 = number.trim_end_matches('.').parse().unwrap_or(0.0);
            if value.is_infinite() {
                tracing::debug!(fragment, "number literal overflows f64");
            }
            return Some(Token::Number(value));
        }

        if starts_with_cell_reference(fragment) {
            return Some(Token::Cell(fragment.to_string()));
        }

        if self.options.keep_unrecognized {
            Some(Token::Text(fragment.to_string()))
        } else {
            tracing::debug!(fragment, "dropping unrecognized fragment");
            None
        }
    }
}

/// Leading `digits[.digits]` of a fragment, if it starts with a digit
fn numeric_prefix(fragment: &str) -> Option<&str> {
    let bytes = fragment.as_bytes();
    let mut i = 0;

    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == 0 {
        return None;
    }

    if bytes.get(i) == Some(&b'.') {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }

    Some(&fragment[..i])
}

/// Whether a fragment starts with an A1-style reference: `[A-Z]+[1-9][0-9]*`
fn starts_with_cell_reference(fragment: &str) -> bool {
    let bytes = fragment.as_bytes();
    let mut i = 0;

    // Must have uppercase letters
    while i < bytes.len() && bytes[i].is_ascii_uppercase() {
        i += 1;
    }
    if i == 0 {
        return false;
    }

    // Row number must not start with 0
    matches!(bytes.get(i), Some(b'1'..=b'9'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lexer() -> Lexer<'static> {
        Lexer::new(SymbolRegistry::standard())
    }

    fn op(symbol: char) -> Token {
        Token::operator(SymbolRegistry::standard(), symbol).unwrap()
    }

    fn func(name: &str) -> Token {
        Token::function(SymbolRegistry::standard(), name).unwrap()
    }

    #[test]
    fn test_normalize_whitespace_and_minus() {
        let lexer = lexer();
        assert_eq!(lexer.normalize("-56 + 12 * 54"), "0-56+12*54");
        assert_eq!(lexer.normalize("( -5) * 2"), "(0-5)*2");
        assert_eq!(lexer.normalize("\t2 \n+ 3"), "2+3");
        assert_eq!(lexer.normalize("2-(-(-1))"), "2-(0-(0-1))");
    }

    #[test]
    fn test_normalize_decimal_comma() {
        let lexer = lexer();
        assert_eq!(lexer.normalize("2,5*2"), "2.5*2");
        assert_eq!(lexer.normalize("12,75 + 0,5"), "12.75+0.5");
        // only between digits
        assert_eq!(lexer.normalize("A1,B2"), "A1,B2");
        assert_eq!(lexer.normalize(",5"), ",5");

        let lexer = lexer.with_options(LexerOptions {
            decimal_comma: false,
            ..LexerOptions::default()
        });
        assert_eq!(lexer.normalize("2,5"), "2,5");
    }

    #[test]
    fn test_normalize_negative_argument() {
        let on = lexer();
        assert_eq!(on.normalize("max(1; -2)"), "max(1;0-2)");

        let off = lexer().with_options(LexerOptions {
            zero_before_negative_argument: false,
            ..LexerOptions::default()
        });
        assert_eq!(off.normalize("max(1; -2)"), "max(1;-2)");
        // bracket rule is unconditional
        assert_eq!(off.normalize("max(-1; 2)"), "max(0-1;2)");
    }

    #[test]
    fn test_split() {
        let lexer = lexer();
        assert_eq!(
            lexer.split("max(2*15;10;20)"),
            vec!["max", "(", "2", "*", "15", ";", "10", ";", "20", ")"]
        );
        assert_eq!(lexer.split("((1))"), vec!["(", "(", "1", ")", ")"]);
        assert_eq!(lexer.split(""), Vec::<&str>::new());
        assert_eq!(lexer.split("A1"), vec!["A1"]);
    }

    #[test]
    fn test_tokenize_arithmetic() {
        assert_eq!(
            tokenize("-56 + 12 * 54"),
            vec![
                Token::Number(0.0),
                op('-'),
                Token::Number(56.0),
                op('+'),
                Token::Number(12.0),
                op('*'),
                Token::Number(54.0),
            ]
        );
    }

    #[test]
    fn test_tokenize_function_call() {
        assert_eq!(
            tokenize("SUM(2*15; A10; 2,5)"),
            vec![
                func("sum"),
                Token::LeftBracket,
                Token::Number(2.0),
                op('*'),
                Token::Number(15.0),
                Token::Semicolon,
                Token::cell("A10"),
                Token::Semicolon,
                Token::Number(2.5),
                Token::RightBracket,
            ]
        );
    }

    #[test]
    fn test_classification_order() {
        let lexer = lexer();
        // function names win over cell references
        assert_eq!(lexer.classify("LOG1"), Some(func("log")));
        // substring match
        assert_eq!(lexer.classify("xmaxx"), Some(func("max")));
        // numbers keep only their leading digits
        assert_eq!(lexer.classify("12abc"), Some(Token::Number(12.0)));
        assert_eq!(lexer.classify("1.2.3"), Some(Token::Number(1.2)));
        assert_eq!(lexer.classify("7."), Some(Token::Number(7.0)));
        // overflow is left to the evaluator
        let overflow = format!("1{}", "0".repeat(400));
        assert_eq!(lexer.classify(&overflow), Some(Token::Number(f64::INFINITY)));
        // cell references are kept verbatim
        assert_eq!(lexer.classify("AB120"), Some(Token::cell("AB120")));
        assert_eq!(lexer.classify("A1x"), Some(Token::cell("A1x")));
    }

    #[test]
    fn test_unrecognized_fragments_dropped() {
        let lexer = lexer();
        assert_eq!(lexer.classify("A0"), None);
        assert_eq!(lexer.classify("a1"), None);
        assert_eq!(lexer.classify(".5"), None);
        assert_eq!(lexer.classify("%"), None);
        assert_eq!(
            lexer.tokenize("2 + $ + 3"),
            vec![Token::Number(2.0), op('+'), op('+'), Token::Number(3.0)]
        );
    }

    #[test]
    fn test_keep_unrecognized() {
        let lexer = lexer().with_options(LexerOptions {
            keep_unrecognized: true,
            ..LexerOptions::default()
        });
        assert_eq!(
            lexer.tokenize("2 + abc"),
            vec![Token::Number(2.0), op('+'), Token::Text("abc".into())]
        );
    }

    #[test]
    fn test_cell_reference_pattern() {
        assert!(starts_with_cell_reference("A1"));
        assert!(starts_with_cell_reference("XFD1048576"));
        assert!(!starts_with_cell_reference("A01"));
        assert!(!starts_with_cell_reference("A"));
        assert!(!starts_with_cell_reference("1A"));
        assert!(!starts_with_cell_reference("$A$1"));
    }
}
