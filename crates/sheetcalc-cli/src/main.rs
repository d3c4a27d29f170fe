//! Sheetcalc CLI - spreadsheet formula calculator

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use sheetcalc_formula::{
    CellResolver, Evaluator, EvaluatorOptions, Lexer, LexerOptions, SymbolRegistry,
};
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Formulas printed by the `demo` command
const DEMO_FORMULAS: [&str; 5] = [
    "max(2*15; 10; 20)",
    "min(2; 10; 20)",
    "sum(2*15; 10; 20)",
    "23*56",
    "-56 + 12 * 54",
];

#[derive(Parser)]
#[command(name = "sheetcalc")]
#[command(author, version, about = "Spreadsheet formula calculator")]
struct Cli {
    /// Log more (-v: debug, -vv: trace); RUST_LOG is used otherwise
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a formula and print the result
    #[command(alias = "calc")]
    Eval {
        /// Formula, e.g. "sum(A1; 2*3)"
        formula: String,

        /// Cell value (repeatable)
        #[arg(long = "cell", value_name = "REF=VALUE", value_parser = parse_cell_assignment)]
        cells: Vec<(String, f64)>,

        /// JSON object file mapping cell references to numbers
        #[arg(long = "cells", value_name = "FILE")]
        cells_file: Option<PathBuf>,

        /// Let fixed-arity functions ignore surplus arguments
        #[arg(long)]
        lenient_arity: bool,

        #[command(flatten)]
        lexer: LexerArgs,
    },

    /// Print the tokens of a formula as JSON
    Tokens {
        /// Formula to tokenize
        formula: String,

        /// Keep unrecognized fragments as text tokens
        #[arg(long)]
        keep_unrecognized: bool,

        #[command(flatten)]
        lexer: LexerArgs,
    },

    /// Evaluate a few sample formulas
    Demo,
}

#[derive(Args)]
struct LexerArgs {
    /// Do not read a comma between two digits as a decimal point
    #[arg(long)]
    no_decimal_comma: bool,

    /// Do not insert a 0 between ';' and a following '-'
    #[arg(long)]
    no_negative_argument_fix: bool,
}

impl LexerArgs {
    fn options(&self, keep_unrecognized: bool) -> LexerOptions {
        LexerOptions {
            decimal_comma: !self.no_decimal_comma,
            zero_before_negative_argument: !self.no_negative_argument_fix,
            keep_unrecognized,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Eval {
            formula,
            cells,
            cells_file,
            lenient_arity,
            lexer,
        } => {
            // Any cell flag binds a resolver, even an empty one
            let values = if cells_file.is_none() && cells.is_empty() {
                None
            } else {
                let mut values = match cells_file {
                    Some(path) => load_cells(&path)?,
                    None => HashMap::new(),
                };
                values.extend(cells);
                tracing::debug!(count = values.len(), "cell values loaded");
                Some(values)
            };

            let options = EvaluatorOptions {
                strict_arity: !lenient_arity,
            };
            let value = eval(&formula, values.as_ref(), options, lexer.options(false))?;
            writeln!(io::stdout(), "{}", value)?;
            Ok(())
        }
        Commands::Tokens {
            formula,
            keep_unrecognized,
            lexer,
        } => print_tokens(&formula, lexer.options(keep_unrecognized)),
        Commands::Demo => demo(),
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn eval(
    formula: &str,
    cells: Option<&HashMap<String, f64>>,
    options: EvaluatorOptions,
    lexer_options: LexerOptions,
) -> Result<f64> {
    let evaluator = Evaluator::new(SymbolRegistry::standard())
        .with_options(options)
        .with_lexer_options(lexer_options);
    // Without cell flags the evaluator reports a missing data source
    let evaluator = match cells {
        Some(cells) => evaluator.with_resolver(cells as &dyn CellResolver),
        None => evaluator,
    };

    evaluator
        .evaluate_formula(formula)
        .with_context(|| format!("Failed to evaluate '{}'", formula))
}

fn print_tokens(formula: &str, options: LexerOptions) -> Result<()> {
    let tokens = Lexer::new(SymbolRegistry::standard())
        .with_options(options)
        .tokenize(formula);
    let json = serde_json::to_string_pretty(&tokens).context("Failed to serialize tokens")?;

    writeln!(io::stdout(), "{}", json)?;
    Ok(())
}

fn demo() -> Result<()> {
    let evaluator = Evaluator::new(SymbolRegistry::standard());
    let mut stdout = io::stdout().lock();

    for formula in DEMO_FORMULAS {
        let value = evaluator
            .evaluate_formula(formula)
            .with_context(|| format!("Failed to evaluate '{}'", formula))?;
        writeln!(stdout, "{} = {}", formula, value)?;
    }
    Ok(())
}

/// Parse `REF=VALUE`, e.g. `A1=7` or `B12=-2,5`
fn parse_cell_assignment(s: &str) -> Result<(String, f64), String> {
    let (reference, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected REF=VALUE, got '{}'", s))?;

    let reference = reference.trim();
    if reference.is_empty() {
        return Err(format!("missing cell reference in '{}'", s));
    }

    let value: f64 = value
        .trim()
        .replace(',', ".")
        .parse()
        .map_err(|_| format!("invalid number in '{}'", s))?;

    Ok((reference.to_string(), value))
}

/// Load cell values from a JSON object such as `{"A1": 7, "B2": 0.5}`
fn load_cells(path: &Path) -> Result<HashMap<String, f64>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    let cells = serde_json::from_str(&text)
        .with_context(|| format!("'{}' is not a JSON object of numbers", path.display()))?;
    Ok(cells)
}
