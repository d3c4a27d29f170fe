//! # sheetcalc-formula
//!
//! Tokenizer and operator-precedence evaluator for spreadsheet-style
//! formulas.
//!
//! This crate provides:
//! - Formula tokenizing (text → tokens)
//! - Token evaluation with two stacks (tokens → number)
//! - An extensible table of operators and variadic functions
//! - A narrow lookup trait for cell values
//!
//! ## Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use sheetcalc_formula::{Evaluator, SymbolRegistry};
//!
//! let cells: HashMap<String, f64> = [("A1".to_string(), 7.0)].into_iter().collect();
//! let evaluator = Evaluator::new(SymbolRegistry::standard()).with_resolver(&cells);
//!
//! assert_eq!(evaluator.evaluate_formula("A1 + 3").unwrap(), 10.0);
//! assert_eq!(evaluator.evaluate_formula("sum(2*15; 10; A1)").unwrap(), 47.0);
//! ```

pub mod error;
pub mod evaluator;
pub mod functions;
pub mod lexer;
pub mod options;
pub mod registry;
pub mod resolver;
pub mod token;

pub use error::{FormulaError, FormulaResult};
pub use evaluator::{evaluate, Evaluator};
pub use lexer::{tokenize, Lexer};
pub use options::{EvaluatorOptions, LexerOptions};
pub use registry::{BinaryFn, FunctionDef, OperatorDef, SymbolRegistry, VariadicFn};
pub use resolver::{resolver_fn, CellResolver, ResolverFn};
pub use token::{Token, TokenKind};
