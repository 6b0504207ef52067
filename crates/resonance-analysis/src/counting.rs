// ─────────────────────────────────────────────────────────────────────
// Resonance Kernel — Floor-Sum Prime Counter
// ─────────────────────────────────────────────────────────────────────
//! π(N) = ⌊S_N⌋,   S_N = Σ_{n=3}^{N} N^(−Ω(n))
//!
//! Primes and n = 4 contribute 1 each (Ω = 0); every other composite
//! has Ω ≥ 1 and contributes at most 1/N, so the composites together
//! stay below 1. The Ω field is the synthesised one, so nothing is
//! factorised.

use serde::{Deserialize, Serialize};

use resonance_core::{prime_count, synthesize_omega, Accumulator};
use resonance_types::{check_bound, KernelError, KernelResult, SummationMode};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrimeCountReport {
    pub n: usize,
    /// S_N.
    pub sum: f64,
    /// ⌊S_N⌋.
    pub count: u64,
    /// S_N − ⌊S_N⌋, the composite mass.
    pub residual: f64,
    /// π(N) from the Eratosthenes table.
    pub reference: u64,
}

impl PrimeCountReport {
    pub fn matches_reference(&self) -> bool {
        self.count == self.reference
    }
}

/// Count primes up to `n` (≥ 4) from a fresh Ω field.
pub fn floor_sum_count(n: usize, mode: SummationMode) -> KernelResult<PrimeCountReport> {
    check_bound("n", n as u64, 4)?;
    let omega = synthesize_omega(n)?;
    floor_sum_count_from(&omega, n, mode)
}

/// Count primes up to `n` (≥ 4) from an Ω field covering [0, n].
pub fn floor_sum_count_from(
    omega: &[i64],
    n: usize,
    mode: SummationMode,
) -> KernelResult<PrimeCountReport> {
    check_bound("n", n as u64, 4)?;
    if omega.len() <= n {
        return Err(KernelError::bound("omega.len", omega.len() as i64, n as i64 + 1));
    }

    let base = n as f64;
    let mut acc = Accumulator::new(mode);
    for (i, &w) in omega.iter().enumerate().take(n + 1).skip(3) {
        if w < 0 {
            return Err(KernelError::Numerical(format!("Omega({i}) = {w} is negative")));
        }
        acc.add(if w == 0 { 1.0 } else { base.powf(-(w as f64)) });
    }

    let sum = acc.value();
    let count = sum.floor() as u64;
    let report = PrimeCountReport {
        n,
        sum,
        count,
        residual: sum - count as f64,
        reference: prime_count(n) as u64,
    };
    if !report.matches_reference() {
        log::warn!(
            "floor-sum count {} differs from pi({n}) = {}",
            report.count,
            report.reference
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_10000() {
        let report = floor_sum_count(10_000, SummationMode::Naive).unwrap();
        assert_eq!(report.count, 1229);
        assert_eq!(report.reference, 1229);
        assert!(report.residual > 0.0 && report.residual < 1.0, "residual {}", report.residual);
    }

    #[test]
    fn test_count_matches_reference_range() {
        let omega = synthesize_omega(3000).unwrap();
        for n in (4..=3000).step_by(37) {
            let report = floor_sum_count_from(&omega, n, SummationMode::Compensated).unwrap();
            assert!(report.matches_reference(), "n={n}: {report:?}");
        }
    }

    #[test]
    fn test_smallest_bounds() {
        let r4 = floor_sum_count(4, SummationMode::Naive).unwrap();
        assert_eq!((r4.count, r4.residual), (2, 0.0));
        let r6 = floor_sum_count(6, SummationMode::Naive).unwrap();
        assert_eq!(r6.count, 3);
        // Ω(6) = 2
        assert!((r6.residual - 1.0 / 36.0).abs() < 1e-15);
    }

    #[test]
    fn test_rejects_small_or_short_input() {
        assert!(matches!(
            floor_sum_count(3, SummationMode::Naive),
            Err(KernelError::InvalidBound { minimum: 4, .. })
        ));
        let omega = vec![0i64; 5];
        assert!(floor_sum_count_from(&omega, 10, SummationMode::Naive).is_err());
    }
}
