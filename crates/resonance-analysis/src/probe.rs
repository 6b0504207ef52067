// ─────────────────────────────────────────────────────────────────────
// Resonance Kernel — Windowed T̄ Probe
// ─────────────────────────────────────────────────────────────────────
//! Local mean of T(n) over a contiguous window [start, start + len).
//!
//! Between discharges Ψ_E gains T̄ per step and loses a factor T_p per
//! prime, which projects the trend slope to C ≈ T̄ / (T_p − 1). The
//! model's target for that slope is K_MF − 1.

use serde::{Deserialize, Serialize};

use resonance_core::{ResonanceSource, SeriesEvaluator};
use resonance_types::{check_bound, KernelError, KernelResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbeStats {
    pub start: u64,
    pub len: usize,
    /// T̄ over the window.
    pub mean: f64,
    /// Population variance of T over the window.
    pub variance: f64,
    /// T̄ / (T_p − 1).
    pub projected_c: f64,
    /// K_MF − 1.
    pub target: f64,
    /// projected_c − target.
    pub deviation: f64,
}

/// T̄ statistics over [start, start + len). Requires start ≥ 3, len ≥ 1.
pub fn probe_window<S: ResonanceSource>(
    series: &SeriesEvaluator<S>,
    start: u64,
    len: usize,
) -> KernelResult<ProbeStats> {
    check_bound("start", start, 3)?;
    check_bound("len", len as u64, 1)?;
    start
        .checked_add(len as u64)
        .ok_or_else(|| KernelError::Overflow(format!("window {start} + {len}")))?;

    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    for n in start..start + len as u64 {
        let t = series.value(n)?;
        if !t.is_finite() {
            return Err(KernelError::Numerical(format!("T({n}) is not finite")));
        }
        sum += t;
        sum_sq += t * t;
    }

    let count = len as f64;
    let mean = sum / count;
    let variance = (sum_sq / count - mean * mean).max(0.0);
    let constants = series.constants();
    let projected_c = mean / (constants.t_p - 1.0);
    let target = constants.k_mf - 1.0;

    log::debug!("probe: [{start}, +{len}) T̄={mean:.6} var={variance:.6} C≈{projected_c:.6}");
    Ok(ProbeStats {
        start,
        len,
        mean,
        variance,
        projected_c,
        target,
        deviation: projected_c - target,
    })
}

/// [`probe_window`] at each magnitude with the same window length.
pub fn probe_magnitudes<S: ResonanceSource>(
    series: &SeriesEvaluator<S>,
    magnitudes: &[u64],
    len: usize,
) -> KernelResult<Vec<ProbeStats>> {
    magnitudes
        .iter()
        .map(|&start| probe_window(series, start, len))
        .collect()
}
