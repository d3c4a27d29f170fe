//! Symbol registry
//!
//! The table of operators and functions shared by the lexer and the
//! evaluator. Each entry carries a priority (higher binds tighter) and a
//! compute rule. Adding a symbol only needs a new entry here; neither the
//! lexer nor the evaluator knows any symbol by name.

use crate::functions;
use ahash::AHashMap;
use std::fmt;
use std::sync::OnceLock;

/// Compute rule of a binary operator: `(left, right) -> result`
pub type BinaryFn = fn(f64, f64) -> f64;

/// Compute rule of a function: ordered arguments -> result
pub type VariadicFn = fn(&[f64]) -> f64;

/// Characters that always split a formula, in addition to operator symbols
pub const STRUCTURAL_SEPARATORS: [char; 3] = ['(', ')', ';'];

/// Process-wide standard registry (lazily initialized, never mutated)
static STANDARD_REGISTRY: OnceLock<SymbolRegistry> = OnceLock::new();

/// Operator definition
#[derive(Clone, Copy)]
pub struct OperatorDef {
    /// Single-character symbol
    pub symbol: char,
    /// Binding priority, at least 1
    ///
    /// `)` and `;` only resolve operators of priority 1 and above.
    pub priority: u8,
    /// Binary compute rule
    pub compute: BinaryFn,
}

impl fmt::Debug for OperatorDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorDef")
            .field("symbol", &self.symbol)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

impl PartialEq for OperatorDef {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol && self.priority == other.priority
    }
}

/// Function definition
#[derive(Clone, Copy)]
pub struct FunctionDef {
    /// Function name (lowercase)
    pub name: &'static str,
    /// Binding priority
    pub priority: u8,
    /// Minimum arguments
    pub min_args: usize,
    /// Maximum arguments (None = unlimited)
    pub max_args: Option<usize>,
    /// Variadic compute rule
    pub compute: VariadicFn,
}

impl FunctionDef {
    /// Human-readable arity, e.g. "exactly 2" or "at least 1"
    pub fn arity_description(&self) -> String {
        match self.max_args {
            Some(max) if max == self.min_args => format!("exactly {}", max),
            Some(max) => format!("{} to {}", self.min_args, max),
            None => format!("at least {}", self.min_args),
        }
    }

    /// Whether `count` arguments are acceptable
    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min_args && self.max_args.map_or(true, |max| count <= max)
    }
}

impl fmt::Debug for FunctionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDef")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("min_args", &self.min_args)
            .field("max_args", &self.max_args)
            .finish_non_exhaustive()
    }
}

impl PartialEq for FunctionDef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.priority == other.priority
    }
}

/// Operator and function table
#[derive(Debug, Clone, Default)]
pub struct SymbolRegistry {
    operators: AHashMap<char, OperatorDef>,
    /// Registration order matters for substring classification
    functions: Vec<FunctionDef>,
    function_index: AHashMap<String, usize>,
}

impl SymbolRegistry {
    /// Create a registry with no symbols
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create an owned registry holding the built-in symbols, ready to extend
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register_builtin_operators();
        registry.register_builtin_functions();
        registry
    }

    /// The shared built-in registry
    pub fn standard() -> &'static SymbolRegistry {
        STANDARD_REGISTRY.get_or_init(Self::with_builtins)
    }

    /// Register an operator, replacing any operator with the same symbol
    ///
    /// # Panics
    /// In debug builds, if `def.priority` is 0.
    pub fn register_operator(&mut self, def: OperatorDef) -> &mut Self {
        debug_assert!(
            def.priority >= 1,
            "operator '{}' needs a priority of at least 1",
            def.symbol
        );
        self.operators.insert(def.symbol, def);
        self
    }

    /// Register a function, replacing any function with the same name
    pub fn register_function(&mut self, def: FunctionDef) -> &mut Self {
        let key = def.name.to_lowercase();
        match self.function_index.get(&key) {
            Some(&idx) => self.functions[idx] = def,
            None => {
                self.function_index.insert(key, self.functions.len());
                self.functions.push(def);
            }
        }
        self
    }

    /// Look up an operator by symbol
    pub fn operator(&self, symbol: char) -> Option<&OperatorDef> {
        self.operators.get(&symbol)
    }

    /// Look up a function by exact name (case-insensitive)
    pub fn function(&self, name: &str) -> Option<&FunctionDef> {
        self.function_index
            .get(&name.to_lowercase())
            .map(|&idx| &self.functions[idx])
    }

    /// Find the function whose name occurs leftmost inside `fragment`
    ///
    /// Matching is case-insensitive and unanchored: `"mySum"` finds `sum`.
    /// When two names start at the same position the one registered first
    /// wins.
    pub fn find_function_in(&self, fragment: &str) -> Option<&FunctionDef> {
        let lower = fragment.to_lowercase();
        lower
            .char_indices()
            .find_map(|(pos, _)| {
                let rest = &lower[pos..];
                self.functions
                    .iter()
                    .find(|def| rest.starts_with(&def.name.to_lowercase()))
            })
    }

    /// Whether `c` splits a formula into fragments
    pub fn is_separator(&self, c: char) -> bool {
        STRUCTURAL_SEPARATORS.contains(&c) || self.operators.contains_key(&c)
    }

    /// Registered functions in registration order
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDef> {
        self.functions.iter()
    }

    /// Registered operators (unordered)
    pub fn operators(&self) -> impl Iterator<Item = &OperatorDef> {
        self.operators.values()
    }

    fn register_builtin_operators(&mut self) {
        self.register_operator(OperatorDef {
            symbol: '+',
            priority: 1,
            compute: functions::op_add,
        })
        .register_operator(OperatorDef {
            symbol: '-',
            priority: 1,
            compute: functions::op_subtract,
        })
        .register_operator(OperatorDef {
            symbol: '*',
            priority: 2,
            compute: functions::op_multiply,
        })
        .register_operator(OperatorDef {
            symbol: '/',
            priority: 2,
            compute: functions::op_divide,
        })
        .register_operator(OperatorDef {
            symbol: '^',
            priority: 3,
            compute: functions::op_power,
        });
    }

    fn register_builtin_functions(&mut self) {
        // SUM
        self.register_function(FunctionDef {
            name: "sum",
            priority: 4,
            min_args: 0,
            max_args: None,
            compute: functions::fn_sum,
        });

        // MIN
        self.register_function(FunctionDef {
            name: "min",
            priority: 4,
            min_args: 1,
            max_args: None,
            compute: functions::fn_min,
        });

        // MAX
        self.register_function(FunctionDef {
            name: "max",
            priority: 4,
            min_args: 1,
            max_args: None,
            compute: functions::fn_max,
        });

        // POW
        self.register_function(FunctionDef {
            name: "pow",
            priority: 3,
            min_args: 2,
            max_args: Some(2),
            compute: functions::fn_pow,
        });

        // LOG
        self.register_function(FunctionDef {
            name: "log",
            priority: 2,
            min_args: 1,
            max_args: Some(2),
            compute: functions::fn_log,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_operators() {
        let registry = SymbolRegistry::standard();
        let priorities: Vec<(char, u8)> = ['+', '-', '*', '/', '^']
            .iter()
            .map(|&c| (c, registry.operator(c).unwrap().priority))
            .collect();
        assert_eq!(
            priorities,
            vec![('+', 1), ('-', 1), ('*', 2), ('/', 2), ('^', 3)]
        );
        assert!(registry.operator('%').is_none());
    }

    #[test]
    fn test_builtin_functions() {
        let registry = SymbolRegistry::standard();
        let names: Vec<&str> = registry.functions().map(|f| f.name).collect();
        assert_eq!(names, vec!["sum", "min", "max", "pow", "log"]);
        assert_eq!(registry.function("SUM").unwrap().priority, 4);
        assert_eq!(registry.function("pow").unwrap().priority, 3);
        assert_eq!(registry.function("Log").unwrap().priority, 2);
        assert!(registry.function("avg").is_none());
    }

    #[test]
    fn test_find_function_in_fragment() {
        let registry = SymbolRegistry::standard();
        assert_eq!(registry.find_function_in("MAX").unwrap().name, "max");
        assert_eq!(registry.find_function_in("mySum").unwrap().name, "sum");
        // leftmost occurrence wins over registration order
        assert_eq!(registry.find_function_in("logsum").unwrap().name, "log");
        assert!(registry.find_function_in("A10").is_none());
        assert!(registry.find_function_in("").is_none());
    }

    #[test]
    fn test_separators() {
        let registry = SymbolRegistry::standard();
        for c in ['+', '-', '*', '/', '^', '(', ')', ';'] {
            assert!(registry.is_separator(c), "{c} should separate");
        }
        for c in ['.', ',', 'A', '1', '%'] {
            assert!(!registry.is_separator(c), "{c} should not separate");
        }
    }

    #[test]
    fn test_arity() {
        let registry = SymbolRegistry::standard();
        let pow = registry.function("pow").unwrap();
        assert!(pow.accepts(2));
        assert!(!pow.accepts(1));
        assert!(!pow.accepts(3));
        assert_eq!(pow.arity_description(), "exactly 2");

        let log = registry.function("log").unwrap();
        assert_eq!(log.arity_description(), "1 to 2");

        let max = registry.function("max").unwrap();
        assert!(!max.accepts(0));
        assert!(max.accepts(50));
        assert_eq!(max.arity_description(), "at least 1");
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "priority of at least 1")]
    fn test_zero_priority_operator_rejected() {
        SymbolRegistry::empty().register_operator(OperatorDef {
            symbol: '#',
            priority: 0,
            compute: functions::op_add,
        });
    }

    #[test]
    fn test_extension() {
        fn fn_avg(args: &[f64]) -> f64 {
            args.iter().sum::<f64>() / args.len() as f64
        }
        fn op_modulo(left: f64, right: f64) -> f64 {
            left % right
        }

        let mut registry = SymbolRegistry::with_builtins();
        registry
            .register_function(FunctionDef {
                name: "avg",
                priority: 4,
                min_args: 1,
                max_args: None,
                compute: fn_avg,
            })
            .register_operator(OperatorDef {
                symbol: '%',
                priority: 2,
                compute: op_modulo,
            });

        assert!(registry.is_separator('%'));
        assert_eq!(registry.function("AVG").unwrap().name, "avg");
        assert_eq!(registry.functions().count(), 6);
        // the shared registry is untouched
        assert!(SymbolRegistry::standard().function("avg").is_none());
    }
}
