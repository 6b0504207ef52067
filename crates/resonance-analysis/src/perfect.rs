// ─────────────────────────────────────────────────────────────────────
// Resonance Kernel — Perfect-Number Detector
// ─────────────────────────────────────────────────────────────────────
//! Reads the spectral field at Mersenne indices M_p = 2^p − 1.
//!
//! On the unsigned field Λ(q) = ln q for odd primes q and Λ vanishes on
//! odd squarefree composites, so Λ(M_p) ≈ ln M_p marks a Mersenne prime
//! and with it the even perfect number M_p·2^(p−1).

use serde::{Deserialize, Serialize};

use resonance_core::SpectralField;
use resonance_types::constants::c_perf;
use resonance_types::{KernelError, KernelResult, SeedVariant};

/// Default |Λ(M_p) − ln M_p| tolerance.
pub const DEFAULT_TOLERANCE: f64 = 1e-4;

/// Largest exponent whose perfect number fits in u128.
const MAX_EXPONENT: u32 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Λ(M_p) ≈ ln M_p.
    Perfect,
    /// Λ(M_p) below tolerance: composite M_p.
    Void,
    /// Neither silent nor resonant.
    Noise,
    /// M_p > N.
    OutOfRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerfectCandidate {
    pub exponent: u32,
    pub mersenne: u64,
    /// Λ(M_p); `None` when out of range.
    pub tension: Option<f64>,
    /// ln M_p.
    pub expected: f64,
    pub verdict: Verdict,
    /// M_p·2^(p−1) for `Perfect`.
    pub perfect_number: Option<u128>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerfectReport {
    pub n: usize,
    pub tolerance: f64,
    pub candidates: Vec<PerfectCandidate>,
    /// Perfect numbers found, ascending by exponent.
    pub detected: Vec<u128>,
    /// Σ 1/(2p − 1) over the detected exponents.
    pub partial_damping: f64,
    /// The same sum over all known Mersenne exponents (C_Perf).
    pub c_perf: f64,
}

fn is_prime_exponent(p: u32) -> bool {
    p >= 2 && (2..p).take_while(|d| d * d <= p).all(|d| p % d != 0)
}

/// Prime exponents p with 2^p − 1 ≤ n.
pub fn exponents_in_range(n: usize) -> Vec<u32> {
    (2..=MAX_EXPONENT)
        .filter(|&p| is_prime_exponent(p))
        .take_while(|&p| mersenne(p).map_or(false, |m| m <= n as u64))
        .collect()
}

fn mersenne(p: u32) -> Option<u64> {
    match p {
        64 => Some(u64::MAX),
        _ => 1u64.checked_shl(p).map(|v| v - 1),
    }
}

/// Classify each exponent against the field.
///
/// The field must come from the unsigned seed and its error bound must
/// be below `tolerance`.
pub fn detect_perfect(
    field: &SpectralField,
    exponents: &[u32],
    tolerance: f64,
) -> KernelResult<PerfectReport> {
    if field.variant != SeedVariant::Unsigned {
        return Err(KernelError::Config(
            "perfect detection needs the unsigned seed variant".to_string(),
        ));
    }
    if !(tolerance > 0.0 && tolerance.is_finite()) {
        return Err(KernelError::Config(format!(
            "tolerance must be positive, got {tolerance}"
        )));
    }
    field.require_precision(tolerance)?;

    let mut candidates = Vec::with_capacity(exponents.len());
    for &p in exponents {
        if !(2..=MAX_EXPONENT).contains(&p) {
            return Err(KernelError::Config(format!(
                "exponent must be in [2, {MAX_EXPONENT}], got {p}"
            )));
        }
        let m = mersenne(p).ok_or_else(|| KernelError::Overflow(format!("2^{p} - 1")))?;
        let expected = (m as f64).ln();
        let tension = usize::try_from(m).ok().and_then(|i| field.lambda_at(i));

        let verdict = match tension {
            None => Verdict::OutOfRange,
            Some(l) if (l - expected).abs() < tolerance => Verdict::Perfect,
            Some(l) if l < tolerance => Verdict::Void,
            Some(_) => Verdict::Noise,
        };
        let perfect_number = (verdict == Verdict::Perfect).then(|| u128::from(m) << (p - 1));

        log::debug!("perfect: p={p} M_p={m} tension={tension:?} verdict={verdict:?}");
        candidates.push(PerfectCandidate {
            exponent: p,
            mersenne: m,
            tension,
            expected,
            verdict,
            perfect_number,
        });
    }

    let detected: Vec<u128> = candidates.iter().filter_map(|c| c.perfect_number).collect();
    let partial_damping: f64 = candidates
        .iter()
        .filter(|c| c.verdict == Verdict::Perfect)
        .map(|c| 1.0 / (2.0 * f64::from(c.exponent) - 1.0))
        .sum();

    Ok(PerfectReport {
        n: field.n,
        tolerance,
        candidates,
        detected,
        partial_damping,
        c_perf: c_perf(),
    })
}

/// [`detect_perfect`] over every prime exponent with M_p ≤ N.
pub fn detect_perfect_in_range(field: &SpectralField, tolerance: f64) -> KernelResult<PerfectReport> {
    detect_perfect(field, &exponents_in_range(field.n), tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use resonance_core::sieve;
    use resonance_types::SieveConfig;

    #[test]
    fn test_detects_perfect_numbers_up_to_m17() {
        let field = sieve(140_000, &SieveConfig::default()).unwrap();
        let report = detect_perfect(&field, &[2, 3, 5, 7, 11, 13, 17, 19], DEFAULT_TOLERANCE).unwrap();

        let verdicts: Vec<Verdict> = report.candidates.iter().map(|c| c.verdict).collect();
        assert_eq!(
            verdicts,
            vec![
                Verdict::Perfect,
                Verdict::Perfect,
                Verdict::Perfect,
                Verdict::Perfect,
                Verdict::Void,
                Verdict::Perfect,
                Verdict::Perfect,
                Verdict::OutOfRange,
            ]
        );
        assert_eq!(
            report.detected,
            vec![6, 28, 496, 8128, 33_550_336, 8_589_869_056]
        );
        let m11 = &report.candidates[4];
        assert_eq!(m11.mersenne, 2047);
        assert!(m11.tension.map_or(false, |t| t.abs() < 1e-9));
        assert_eq!(report.candidates[7].tension, None);
    }

    #[test]
    fn test_in_range_exponents() {
        assert_eq!(exponents_in_range(140_000), vec![2, 3, 5, 7, 11, 13, 17]);
        assert_eq!(exponents_in_range(2), Vec::<u32>::new());
        assert_eq!(exponents_in_range(usize::MAX).last(), Some(&61));
    }

    #[test]
    fn test_partial_damping() {
        let field = sieve(5_000, &SieveConfig::default()).unwrap();
        let report = detect_perfect_in_range(&field, DEFAULT_TOLERANCE).unwrap();
        assert_eq!(report.detected, vec![6, 28, 496, 8128]);
        let expected = 1.0 / 3.0 + 1.0 / 5.0 + 1.0 / 9.0 + 1.0 / 13.0;
        assert!((report.partial_damping - expected).abs() < 1e-15);
        assert!(report.partial_damping < report.c_perf);
    }

    #[test]
    fn test_rejects_signed_field() {
        let cfg = SieveConfig {
            seed_variant: SeedVariant::Signed,
            ..SieveConfig::default()
        };
        let field = sieve(200, &cfg).unwrap();
        assert!(matches!(
            detect_perfect_in_range(&field, DEFAULT_TOLERANCE),
            Err(KernelError::Config(_))
        ));
    }

    #[test]
    fn test_requires_precise_field() {
        let cfg = SieveConfig {
            noise_threshold: 1e-3,
            ..SieveConfig::default()
        };
        let field = sieve(200, &cfg).unwrap();
        assert!(matches!(
            detect_perfect_in_range(&field, DEFAULT_TOLERANCE),
            Err(KernelError::PrecisionLoss { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_exponent() {
        let field = sieve(100, &SieveConfig::default()).unwrap();
        assert!(detect_perfect(&field, &[1], DEFAULT_TOLERANCE).is_err());
        assert!(detect_perfect(&field, &[65], DEFAULT_TOLERANCE).is_err());
        assert!(detect_perfect(&field, &[3], 0.0).is_err());
    }
}
