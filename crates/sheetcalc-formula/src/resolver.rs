//! Cell value lookup
//!
//! The evaluator never owns cell data. Whatever holds the grid implements
//! [`CellResolver`] and is consulted once per cell reference, read-only.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// Source of cell values
pub trait CellResolver {
    /// Current numeric value of `reference` (e.g. "B12"), or `None` if the
    /// reference is unknown or out of range
    fn resolve(&self, reference: &str) -> Option<f64>;
}

impl<T: CellResolver + ?Sized> CellResolver for &T {
    fn resolve(&self, reference: &str) -> Option<f64> {
        (**self).resolve(reference)
    }
}

impl<S: BuildHasher> CellResolver for HashMap<String, f64, S> {
    fn resolve(&self, reference: &str) -> Option<f64> {
        self.get(reference).copied()
    }
}

impl CellResolver for BTreeMap<String, f64> {
    fn resolve(&self, reference: &str) -> Option<f64> {
        self.get(reference).copied()
    }
}

/// Resolver backed by a closure, see [`resolver_fn`]
#[derive(Clone, Copy)]
pub struct ResolverFn<F>(F);

impl<F> CellResolver for ResolverFn<F>
where
    F: Fn(&str) -> Option<f64>,
{
    fn resolve(&self, reference: &str) -> Option<f64> {
        (self.0)(reference)
    }
}

/// Wrap a closure as a [`CellResolver`]
///
/// # Example
/// ```rust
/// use sheetcalc_formula::{resolver_fn, CellResolver};
///
/// let column_a = resolver_fn(|r: &str| r.strip_prefix('A')?.parse::<f64>().ok());
/// assert_eq!(column_a.resolve("A7"), Some(7.0));
/// assert_eq!(column_a.resolve("B7"), None);
/// ```
pub fn resolver_fn<F>(f: F) -> ResolverFn<F>
where
    F: Fn(&str) -> Option<f64>,
{
    ResolverFn(f)
}
