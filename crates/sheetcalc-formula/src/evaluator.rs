//! Formula evaluator
//!
//! Evaluates token sequences with two stacks: operand values and pending
//! control entries (operators, open brackets, function calls). Operators are
//! resolved left-associatively by priority; a function call is resolved
//! when the bracket that opened its argument list closes.
//!
//! Non-finite values (division by zero, overflow, logarithm of zero, but
//! also oversized literals and NaN cell values) are replaced by `0` and
//! evaluation continues. Only missing cell data and
//! malformed token sequences abort an evaluation.

use crate::error::{FormulaError, FormulaResult};
use crate::lexer::Lexer;
use crate::options::{EvaluatorOptions, LexerOptions};
use crate::registry::{FunctionDef, OperatorDef, SymbolRegistry};
use crate::resolver::CellResolver;
use crate::token::Token;
use std::fmt;

/// Evaluate a formula string with the standard registry and default options
///
/// # Example
/// ```rust
/// use sheetcalc_formula::evaluate;
///
/// assert_eq!(evaluate("max(2*15; 10; 20)", None).unwrap(), 30.0);
/// assert_eq!(evaluate("5/0", None).unwrap(), 0.0);
/// ```
pub fn evaluate(formula: &str, resolver: Option<&dyn CellResolver>) -> FormulaResult<f64> {
    let mut evaluator = Evaluator::new(SymbolRegistry::standard());
    if let Some(resolver) = resolver {
        evaluator = evaluator.with_resolver(resolver);
    }
    evaluator.evaluate_formula(formula)
}

/// Formula evaluator
///
/// Holds no per-evaluation state: every call to [`Evaluator::evaluate`]
/// builds its own stacks, so one evaluator can be reused and shared.
#[derive(Clone)]
pub struct Evaluator<'a> {
    registry: &'a SymbolRegistry,
    resolver: Option<&'a dyn CellResolver>,
    lexer_options: LexerOptions,
    options: EvaluatorOptions,
}

impl<'a> Evaluator<'a> {
    /// Create an evaluator with no cell resolver and default options
    pub fn new(registry: &'a SymbolRegistry) -> Self {
        Self {
            registry,
            resolver: None,
            lexer_options: LexerOptions::default(),
            options: EvaluatorOptions::default(),
        }
    }

    /// Bind a cell resolver
    pub fn with_resolver(mut self, resolver: &'a dyn CellResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Replace the evaluator options
    pub fn with_options(mut self, options: EvaluatorOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the options used to tokenize formula strings
    pub fn with_lexer_options(mut self, options: LexerOptions) -> Self {
        self.lexer_options = options;
        self
    }

    pub fn options(&self) -> &EvaluatorOptions {
        &self.options
    }

    /// The lexer used by [`Evaluator::evaluate_formula`]
    pub fn lexer(&self) -> Lexer<'a> {
        Lexer::new(self.registry).with_options(self.lexer_options.clone())
    }

    /// Tokenize and evaluate a formula string
    pub fn evaluate_formula(&self, formula: &str) -> FormulaResult<f64> {
        self.evaluate(self.lexer().tokenize(formula))
    }

    /// Evaluate a token sequence in a single left-to-right pass
    pub fn evaluate<I>(&self, tokens: I) -> FormulaResult<f64>
    where
        I: IntoIterator<Item = Token>,
    {
        let mut machine = StackMachine::new(&self.options);

        for token in tokens {
            match token {
                Token::Number(n) => machine.operands.push(recover(n, "number")),
                Token::Cell(reference) => {
                    let value = self.resolve_cell(&reference)?;
                    machine.operands.push(recover(value, &reference));
                }
                Token::Function(def) => machine.open_call(def),
                Token::LeftBracket => machine.operators.push(Pending::LeftBracket),
                Token::Operator(op) => {
                    machine.reduce(op.priority)?;
                    machine.operators.push(Pending::Operator(op));
                }
                Token::Semicolon => machine.complete_argument()?,
                Token::RightBracket => machine.close_bracket()?,
                Token::Text(text) => {
                    tracing::debug!(%text, "skipping text token");
                }
            }
        }

        machine.finish()
    }

    fn resolve_cell(&self, reference: &str) -> FormulaResult<f64> {
        let resolver = self.resolver.ok_or(FormulaError::MissingDataSource)?;
        resolver
            .resolve(reference)
            .ok_or_else(|| FormulaError::UnresolvedReference(reference.to_string()))
    }
}

impl fmt::Debug for Evaluator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evaluator")
            .field("has_resolver", &self.resolver.is_some())
            .field("lexer_options", &self.lexer_options)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Entry on the control stack
#[derive(Debug)]
enum Pending {
    Operator(OperatorDef),
    LeftBracket,
    Function(FunctionCall),
}

/// A function call whose argument list is still open
#[derive(Debug)]
struct FunctionCall {
    def: FunctionDef,
    /// Completed arguments, in order
    args: Vec<f64>,
    /// Operand stack depth when the call was opened
    base_depth: usize,
}

/// Stacks for one evaluation
struct StackMachine<'o> {
    options: &'o EvaluatorOptions,
    operands: Vec<f64>,
    operators: Vec<Pending>,
}

impl<'o> StackMachine<'o> {
    fn new(options: &'o EvaluatorOptions) -> Self {
        Self {
            options,
            operands: Vec::new(),
            operators: Vec::new(),
        }
    }

    fn open_call(&mut self, def: FunctionDef) {
        self.operators.push(Pending::Function(FunctionCall {
            def,
            args: Vec::new(),
            base_depth: self.operands.len(),
        }));
    }

    /// Resolve pending operators with priority >= `threshold`, stopping at
    /// the first open bracket
    fn reduce(&mut self, threshold: u8) -> FormulaResult<()> {
        while let Some(top) = self.operators.last() {
            let op = match top {
                Pending::Operator(op) if op.priority >= threshold => *op,
                // Calls are only closed by their bracket
                Pending::Function(call) => {
                    return Err(FormulaError::MisplacedFunction(call.def.name.to_string()))
                }
                _ => break,
            };
            self.operators.pop();

            let right = self.pop_operand(&op)?;
            let left = self.pop_operand(&op)?;
            let result = (op.compute)(left, right);
            tracing::trace!(left, op = %op.symbol, right, result, "reduce");

            self.operands.push(recover(result, op.symbol));
        }
        Ok(())
    }

    fn pop_operand(&mut self, op: &OperatorDef) -> FormulaResult<f64> {
        self.operands.pop().ok_or_else(|| {
            FormulaError::malformed(format!("operator '{}' is missing an operand", op.symbol))
        })
    }

    /// `;` – finish the current argument of the innermost open call
    fn complete_argument(&mut self) -> FormulaResult<()> {
        self.reduce(1)?;

        let call = self
            .operators
            .iter_mut()
            .rev()
            .find_map(|pending| match pending {
                Pending::Function(call) => Some(call),
                _ => None,
            })
            .ok_or_else(|| FormulaError::malformed("';' outside of a function call"))?;

        if self.operands.len() <= call.base_depth {
            return Err(FormulaError::malformed(format!(
                "empty argument in call to '{}'",
                call.def.name
            )));
        }
        // Guarded by the depth check above
        if let Some(value) = self.operands.pop() {
            call.args.push(value);
        }
        Ok(())
    }

    /// `)` – resolve the group, then the call it belongs to, if any
    fn close_bracket(&mut self) -> FormulaResult<()> {
        self.reduce(1)?;

        match self.operators.pop() {
            Some(Pending::LeftBracket) => {}
            _ => return Err(FormulaError::malformed("unbalanced ')'")),
        }

        if !matches!(self.operators.last(), Some(Pending::Function(_))) {
            return Ok(());
        }
        if let Some(Pending::Function(mut call)) = self.operators.pop() {
            if self.operands.len() > call.base_depth {
                if let Some(value) = self.operands.pop() {
                    call.args.push(value);
                }
            } else if !call.args.is_empty() {
                // `f(1;)`: a `;` was not followed by an argument
                return Err(FormulaError::malformed(format!(
                    "empty argument in call to '{}'",
                    call.def.name
                )));
            }
            let value = self.invoke(call)?;
            self.operands.push(value);
        }
        Ok(())
    }

    fn invoke(&self, call: FunctionCall) -> FormulaResult<f64> {
        let FunctionCall { def, args, .. } = call;

        if self.options.strict_arity && !def.accepts(args.len()) {
            return Err(FormulaError::ArityMismatch {
                function: def.name.to_string(),
                expected: def.arity_description(),
                actual: args.len(),
            });
        }

        let result = (def.compute)(&args);
        tracing::trace!(function = def.name, ?args, result, "call");
        Ok(recover(result, def.name))
    }

    /// Resolve everything left and return the single remaining value
    fn finish(mut self) -> FormulaResult<f64> {
        self.reduce(0)?;

        if !self.operators.is_empty() {
            return Err(FormulaError::malformed("unclosed '('"));
        }
        match self.operands.as_slice() {
            [value] => Ok(*value),
            [] => Err(FormulaError::malformed("empty expression")),
            values => Err(FormulaError::malformed(format!(
                "{} values without an operator between them",
                values.len()
            ))),
        }
    }
}

/// Replace a non-finite result by 0
fn recover(value: f64, source: impl fmt::Display) -> f64 {
    if value.is_finite() {
        value
    } else {
        tracing::debug!(%source, %value, "non-finite result replaced by 0");
        0.0
    }
}
