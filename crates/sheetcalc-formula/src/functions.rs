//! Built-in compute rules
//!
//! Operators take exactly two operands. Functions receive their arguments
//! as an ordered slice; fixed-arity functions read missing arguments as NaN
//! and ignore surplus ones, which only matters when arity checking is off.

// === Operators ===

/// `+`
pub fn op_add(left: f64, right: f64) -> f64 {
    left + right
}

/// `-`
pub fn op_subtract(left: f64, right: f64) -> f64 {
    left - right
}

/// `*`
pub fn op_multiply(left: f64, right: f64) -> f64 {
    left * right
}

/// `/`
pub fn op_divide(left: f64, right: f64) -> f64 {
    left / right
}

/// `^`
pub fn op_power(left: f64, right: f64) -> f64 {
    left.powf(right)
}

// === Functions ===

fn arg(args: &[f64], index: usize) -> f64 {
    args.get(index).copied().unwrap_or(f64::NAN)
}

/// SUM function
pub fn fn_sum(args: &[f64]) -> f64 {
    args.iter().sum()
}

/// MIN function
pub fn fn_min(args: &[f64]) -> f64 {
    args.iter().copied().fold(f64::INFINITY, f64::min)
}

/// MAX function
pub fn fn_max(args: &[f64]) -> f64 {
    args.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// POW function
pub fn fn_pow(args: &[f64]) -> f64 {
    arg(args, 0).powf(arg(args, 1))
}

/// LOG function: natural logarithm, or logarithm in the given base
///
/// `log(8; 2)` is 3. A second argument is never ignored, so the two-argument
/// form is not ln.
pub fn fn_log(args: &[f64]) -> f64 {
    let value = arg(args, 0);
    match args.get(1) {
        Some(&base) => value.log(base),
        None => value.ln(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-10,
            "Expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(op_add(2.0, 3.0), 5.0);
        assert_eq!(op_subtract(2.0, 3.0), -1.0);
        assert_eq!(op_multiply(2.0, 3.0), 6.0);
        assert_eq!(op_divide(3.0, 2.0), 1.5);
        assert_eq!(op_power(2.0, 10.0), 1024.0);
        assert!(op_divide(1.0, 0.0).is_infinite());
    }

    #[test]
    fn test_sum() {
        assert_eq!(fn_sum(&[30.0, 10.0, 20.0]), 60.0);
        assert_eq!(fn_sum(&[]), 0.0);
    }

    #[test]
    fn test_min_max() {
        assert_eq!(fn_min(&[2.0, 10.0, 20.0]), 2.0);
        assert_eq!(fn_max(&[30.0, 10.0, 20.0]), 30.0);
        assert_eq!(fn_min(&[-4.5]), -4.5);
    }

    #[test]
    fn test_pow() {
        assert_eq!(fn_pow(&[2.0, 3.0]), 8.0);
        // surplus arguments are ignored
        assert_eq!(fn_pow(&[2.0, 3.0, 100.0]), 8.0);
        assert!(fn_pow(&[2.0]).is_nan());
    }

    #[test]
    fn test_log() {
        assert_approx(fn_log(&[std::f64::consts::E]), 1.0);
        assert_approx(fn_log(&[8.0, 2.0]), 3.0);
        assert_approx(fn_log(&[1000.0, 10.0]), 3.0);
        assert!(fn_log(&[0.0]).is_infinite());
    }
}
