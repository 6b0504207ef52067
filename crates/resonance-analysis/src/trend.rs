// ─────────────────────────────────────────────────────────────────────
// Resonance Kernel — Ψ_E Trend & Resonance Error
// ─────────────────────────────────────────────────────────────────────
//! Least-squares fit of the logarithmic trend
//!
//!   Ψ_E(n) ≈ C·ln(n) + K
//!
//! and the residual |Ψ_E(n) − C·ln(n) − K| compared against √n.

use serde::{Deserialize, Serialize};

use resonance_core::DynamicalTrace;
use resonance_types::{KernelError, KernelResult};

/// Residuals below this n are dominated by the start-up transient.
const MIN_ERROR_N: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendFit {
    /// C.
    pub slope: f64,
    /// K.
    pub intercept: f64,
    /// Coefficient of determination of the fit.
    pub r_squared: f64,
    /// Slope the model predicts (K_MF).
    pub reference_slope: f64,
}

impl TrendFit {
    /// C·ln(n) + K.
    pub fn predict(&self, n: u64) -> f64 {
        self.slope * (n as f64).ln() + self.intercept
    }

    /// C − K_MF.
    pub fn slope_deviation(&self) -> f64 {
        self.slope - self.reference_slope
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResonanceErrorSample {
    pub n: u64,
    pub psi: f64,
    pub trend: f64,
    /// |Ψ_E(n) − trend|.
    pub error: f64,
    /// error / √n.
    pub ratio: f64,
}

/// Fit C and K over every retained point of the trace.
pub fn fit_trend(trace: &DynamicalTrace, reference_slope: f64) -> KernelResult<TrendFit> {
    let points = trace.points();
    if points.len() < 2 {
        return Err(KernelError::Numerical(format!(
            "trend fit needs at least 2 points, got {}",
            points.len()
        )));
    }

    let count = points.len() as f64;
    let (sum_x, sum_y) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), &(n, psi)| (sx + (n as f64).ln(), sy + psi));
    let mean_x = sum_x / count;
    let mean_y = sum_y / count;

    let (sxx, sxy, syy) = points.iter().fold((0.0, 0.0, 0.0), |(xx, xy, yy), &(n, psi)| {
        let dx = (n as f64).ln() - mean_x;
        let dy = psi - mean_y;
        (xx + dx * dx, xy + dx * dy, yy + dy * dy)
    });
    if sxx <= 0.0 {
        return Err(KernelError::Numerical("trend fit: ln(n) has zero variance".into()));
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    let r_squared = if syy > 0.0 { sxy * sxy / (sxx * syy) } else { 1.0 };

    if !slope.is_finite() || !intercept.is_finite() {
        return Err(KernelError::Numerical("trend fit produced non-finite values".into()));
    }

    log::debug!("trend: C={slope:.5} K={intercept:.5} R²={r_squared:.4} over {} points", points.len());
    Ok(TrendFit {
        slope,
        intercept,
        r_squared,
        reference_slope,
    })
}

/// Up to `samples` evenly spaced residuals over the points with n ≥ 10.
pub fn resonance_error(
    trace: &DynamicalTrace,
    fit: &TrendFit,
    samples: usize,
) -> Vec<ResonanceErrorSample> {
    let eligible: Vec<(u64, f64)> = trace
        .points()
        .into_iter()
        .filter(|&(n, _)| n >= MIN_ERROR_N)
        .collect();
    if eligible.is_empty() || samples == 0 {
        return Vec::new();
    }

    let take = samples.min(eligible.len());
    let span = eligible.len() - 1;
    (0..take)
        .map(|i| {
            let idx = if take == 1 { span } else { i * span / (take - 1) };
            let (n, psi) = eligible[idx];
            let trend = fit.predict(n);
            let error = (psi - trend).abs();
            ResonanceErrorSample {
                n,
                psi,
                trend,
                error,
                ratio: error / (n as f64).sqrt(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use resonance_core::trace;
    use resonance_types::constants::K_MF;
    use resonance_types::KernelConfig;

    fn synthetic(c: f64, k: f64, end: u64) -> DynamicalTrace {
        DynamicalTrace {
            start: 2,
            end,
            stride: 1,
            values: (2..=end).map(|n| c * (n as f64).ln() + k).collect(),
        }
    }

    #[test]
    fn test_fit_recovers_exact_line() {
        let fit = fit_trend(&synthetic(1.7, -0.25, 500), K_MF).unwrap();
        assert!((fit.slope - 1.7).abs() < 1e-10, "C = {}", fit.slope);
        assert!((fit.intercept + 0.25).abs() < 1e-10, "K = {}", fit.intercept);
        assert!((fit.r_squared - 1.0).abs() < 1e-10);
        assert!((fit.slope_deviation() - (1.7 - K_MF)).abs() < 1e-10);
    }

    #[test]
    fn test_fit_psi_trace_1000() {
        let t = trace(1000, &KernelConfig::default()).unwrap();
        let fit = fit_trend(&t, K_MF).unwrap();
        assert!((fit.slope - 1.44188).abs() < 1e-4, "C = {}", fit.slope);
        assert!((fit.intercept + 0.35179).abs() < 1e-4, "K = {}", fit.intercept);
        assert!(fit.r_squared > 0.0 && fit.r_squared < 1.0);
    }

    #[test]
    fn test_fit_rejects_degenerate_trace() {
        let single = DynamicalTrace {
            start: 2,
            end: 2,
            stride: 1,
            values: vec![0.0],
        };
        assert!(matches!(
            fit_trend(&single, K_MF),
            Err(KernelError::Numerical(_))
        ));
    }

    #[test]
    fn test_resonance_error_sampling() {
        let t = trace(1000, &KernelConfig::default()).unwrap();
        let fit = fit_trend(&t, K_MF).unwrap();
        let samples = resonance_error(&t, &fit, 5);
        let ns: Vec<u64> = samples.iter().map(|s| s.n).collect();
        assert_eq!(ns, vec![10, 257, 505, 752, 1000]);
        for s in &samples {
            assert!(s.error >= 0.0);
            assert!((s.ratio - s.error / (s.n as f64).sqrt()).abs() < 1e-15);
            assert_eq!(s.psi, t.values[(s.n - 2) as usize]);
        }
    }

    #[test]
    fn test_resonance_error_on_exact_line_is_zero() {
        let line = synthetic(2.0, 1.0, 200);
        let fit = fit_trend(&line, K_MF).unwrap();
        for s in resonance_error(&line, &fit, 20) {
            assert!(s.error < 1e-9, "n={} error={}", s.n, s.error);
        }
        assert!(resonance_error(&line, &fit, 0).is_empty());
    }
}
