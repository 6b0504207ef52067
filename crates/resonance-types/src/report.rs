// ─────────────────────────────────────────────────────────────────────
// Resonance Kernel — Shared Report Types
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use crate::error::{KernelError, KernelResult};

/// Numerical error estimate attached to a floating field.
///
/// `widened` is the precision-loss flag: the estimated absolute error
/// exceeds `tolerance` and downstream comparisons must widen their
/// error bars accordingly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrecisionReport {
    /// Estimated worst-case rounding error of any single entry.
    pub rounding_bound: f64,
    /// Estimated worst-case error introduced by noise thresholding.
    pub threshold_bound: f64,
    pub tolerance: f64,
    pub widened: bool,
}

impl PrecisionReport {
    pub fn new(rounding_bound: f64, threshold_bound: f64, tolerance: f64) -> Self {
        let total = rounding_bound + threshold_bound;
        let widened = !total.is_finite() || total > tolerance;
        if widened {
            log::warn!(
                "precision widened: error bound {total:.3e} exceeds tolerance {tolerance:.3e}"
            );
        }
        Self {
            rounding_bound,
            threshold_bound,
            tolerance,
            widened,
        }
    }

    pub fn total_bound(&self) -> f64 {
        self.rounding_bound + self.threshold_bound
    }

    /// Fail with `PrecisionLoss` if the bound exceeds `tolerance`.
    pub fn require(&self, tolerance: f64) -> KernelResult<()> {
        let bound = self.total_bound();
        if !bound.is_finite() || bound > tolerance {
            return Err(KernelError::PrecisionLoss { bound, tolerance });
        }
        Ok(())
    }
}

/// One term μ(k)/k of the Möbius inversion sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MobiusTerm {
    pub k: u32,
    pub mu: i8,
    pub weight: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_within_tolerance() {
        let report = PrecisionReport::new(1e-12, 1e-9, 1e-6);
        assert!(!report.widened);
        assert!(report.require(1e-6).is_ok());
    }

    #[test]
    fn test_precision_widened() {
        let report = PrecisionReport::new(1e-5, 0.0, 1e-6);
        assert!(report.widened);
        assert!(matches!(
            report.require(1e-6),
            Err(KernelError::PrecisionLoss { .. })
        ));
    }

    #[test]
    fn test_precision_non_finite_is_widened() {
        let report = PrecisionReport::new(f64::INFINITY, 0.0, 1.0);
        assert!(report.widened);
        assert!(report.require(1.0).is_err());
    }

    #[test]
    fn test_require_tighter_tolerance() {
        let report = PrecisionReport::new(1e-8, 0.0, 1e-6);
        assert!(report.require(1e-6).is_ok());
        assert!(report.require(1e-9).is_err());
    }
}
