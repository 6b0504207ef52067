// ─────────────────────────────────────────────────────────────────────
// Resonance Kernel — Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for all Resonance Kernel failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KernelError {
    /// Integer bound below the domain minimum (or negative).
    #[error("invalid bound: {name} = {value}, must be >= {minimum}")]
    InvalidBound {
        name: &'static str,
        value: i64,
        minimum: i64,
    },

    /// A factor 1 + Ω(n·2^j) of the T(n) series was zero.
    #[error("division by zero: 1 + Omega({n} * 2^{j}) = 0, series diverges")]
    DivisionByZero { n: u64, j: u32 },

    /// Accumulated floating error exceeds what the consumer can tolerate.
    #[error("precision loss: error bound {bound:e} exceeds tolerance {tolerance:e}")]
    PrecisionLoss { bound: f64, tolerance: f64 },

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Numerical error (NaN/Inf in computation).
    #[error("numerical error: {0}")]
    Numerical(String),

    /// Integer argument outside the representable range.
    #[error("overflow: {0}")]
    Overflow(String),

    /// An external primality oracle could not answer for n.
    #[error("primality oracle failed at n = {n}: {reason}")]
    Oracle { n: u64, reason: String },
}

impl KernelError {
    /// Build an `InvalidBound` for `value < minimum`.
    pub fn bound(name: &'static str, value: i64, minimum: i64) -> Self {
        Self::InvalidBound {
            name,
            value,
            minimum,
        }
    }
}

pub type KernelResult<T> = Result<T, KernelError>;

/// Refuse `value < minimum` with `InvalidBound`; never clamps.
pub fn check_bound(name: &'static str, value: u64, minimum: u64) -> KernelResult<()> {
    if value < minimum {
        return Err(KernelError::bound(
            name,
            i64::try_from(value).unwrap_or(i64::MAX),
            i64::try_from(minimum).unwrap_or(i64::MAX),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_bound_rejects_small() {
        let err = check_bound("n", 2, 3).unwrap_err();
        assert_eq!(err, KernelError::bound("n", 2, 3));
        assert_eq!(err.to_string(), "invalid bound: n = 2, must be >= 3");
    }

    #[test]
    fn test_check_bound_accepts_minimum() {
        assert!(check_bound("n", 3, 3).is_ok());
    }

    #[test]
    fn test_oracle_message() {
        let err = KernelError::Oracle {
            n: 7,
            reason: "TypeError".into(),
        };
        assert_eq!(err.to_string(), "primality oracle failed at n = 7: TypeError");
    }

    #[test]
    fn test_precision_loss_message() {
        let err = KernelError::PrecisionLoss {
            bound: 1e-3,
            tolerance: 1e-6,
        };
        assert!(err.to_string().contains("exceeds tolerance"));
    }
}
