// ─────────────────────────────────────────────────────────────────────
// Resonance Kernel — Additive Convolution Sieve
// ─────────────────────────────────────────────────────────────────────
//! Solves the Dirichlet-convolution identity
//!
//!   (Λ * α)(n) = Σ_{d|n} Λ(d)·α(n/d) = α(n)·ln(n),   1 ≤ n ≤ N
//!
//! by forward substitution without factoring anything:
//!
//!   C ← B = α·ln n
//!   for i = 1..N:   Λ(i) = C(i) / α(1)
//!                   C(i·k) −= Λ(i)·α(k)   for k ≥ 2, i·k ≤ N
//!
//! When index i is reached every proper divisor has already been pushed
//! into C(i), so Λ(i) is final. Total work Σ N/i = O(N log N).
//!
//! The same push-forward over integers synthesises the Ω field from the
//! signed seed: Σ_{d|n} α_signed(d) = d(2n) − 4.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use resonance_types::{check_bound, KernelResult, PrecisionReport, SeedVariant, SieveConfig};

use crate::seed::{generate_seed, signed_seed_int};

/// Unit roundoff of f64.
const UNIT_ROUNDOFF: f64 = f64::EPSILON / 2.0;

/// Output of one sieve pass for a fixed N.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectralField {
    pub n: usize,
    pub variant: SeedVariant,
    /// Seed α, length N + 1.
    pub alpha: Vec<f64>,
    /// Spectral field Λ, length N + 1. Λ(0) = 0.
    pub lambda: Vec<f64>,
    pub precision: PrecisionReport,
}

impl SpectralField {
    /// Λ(i), or `None` beyond N.
    pub fn lambda_at(&self, i: usize) -> Option<f64> {
        self.lambda.get(i).copied()
    }

    /// Fail with `PrecisionLoss` unless the field's error bound is
    /// within `tolerance`.
    pub fn require_precision(&self, tolerance: f64) -> KernelResult<()> {
        self.precision.require(tolerance)
    }
}

/// Run the convolution sieve over [1, n]. Requires n ≥ 1.
pub fn sieve(n: usize, config: &SieveConfig) -> KernelResult<SpectralField> {
    check_bound("n", n as u64, 1)?;
    let start = Instant::now();

    let alpha = generate_seed(n, config.seed_variant)?;
    let unit = alpha[1];

    let mut acc: Vec<f64> = alpha
        .iter()
        .enumerate()
        .map(|(i, &a)| if i == 0 { 0.0 } else { a * (i as f64).ln() })
        .collect();
    // Σ|terms| and number of updates per cell, for the rounding bound.
    let mut mass: Vec<f64> = acc.iter().map(|c| c.abs()).collect();
    let mut ops = vec![0u32; n + 1];

    let mut lambda = vec![0.0; n + 1];
    let mut rounding_bound = 0.0f64;
    let mut max_ops = 0u32;
    let mut skipped = 0usize;

    for i in 1..=n {
        let val = acc[i] / unit;
        lambda[i] = val;

        let cell_ops = ops[i].max(1);
        rounding_bound = rounding_bound.max(f64::from(cell_ops) * UNIT_ROUNDOFF * mass[i] / unit.abs());
        max_ops = max_ops.max(ops[i]);

        if val.abs() < config.noise_threshold {
            skipped += 1;
            continue;
        }
        for (k, m) in (2 * i..=n).step_by(i).enumerate() {
            let term = val * alpha[k + 2];
            acc[m] -= term;
            mass[m] += term.abs();
            ops[m] += 1;
        }
    }

    // Each skipped divisor of m leaves at most threshold·|α| ≤ 2·threshold
    // in C(m); m has at most max_ops + 1 divisors below itself.
    let threshold_bound = config.noise_threshold * 2.0 * f64::from(max_ops + 1);
    let precision = PrecisionReport::new(rounding_bound, threshold_bound, config.tolerance);

    log::debug!(
        "sieve: n={n} variant={:?} skipped={skipped} max_ops={max_ops} bound={:.3e} in {:.3} ms",
        config.seed_variant,
        precision.total_bound(),
        start.elapsed().as_secs_f64() * 1e3
    );

    Ok(SpectralField {
        n,
        variant: config.seed_variant,
        alpha,
        lambda,
        precision,
    })
}

/// Largest |(Λ * α)(n) − α(n)·ln n| over 1 ≤ n ≤ N.
pub fn verify_identity(field: &SpectralField) -> f64 {
    let n = field.n;
    let mut conv = vec![0.0; n + 1];
    for d in 1..=n {
        let l = field.lambda[d];
        if l == 0.0 {
            continue;
        }
        for (k, m) in (d..=n).step_by(d).enumerate() {
            conv[m] += l * field.alpha[k + 1];
        }
    }
    (1..=n)
        .map(|i| (conv[i] - field.alpha[i] * (i as f64).ln()).abs())
        .fold(0.0, f64::max)
}

/// Ω field over [0, n] by integer push-forward of the signed seed.
///
/// `omega[i]` = Σ_{d|i} α_signed(d) = d(2i) − 4 for every i ≥ 1, with
/// raw values Ω(1) = −2 and Ω(2) = −1. Index 0 is 0.
pub fn synthesize_omega(n: usize) -> KernelResult<Vec<i64>> {
    check_bound("n", n as u64, 1)?;
    let start = Instant::now();

    let mut omega = vec![0i64; n + 1];
    for d in 1..=n {
        let a = signed_seed_int(d);
        for m in (d..=n).step_by(d) {
            omega[m] += a;
        }
    }

    log::debug!(
        "synthesize_omega: n={n} in {:.3} ms",
        start.elapsed().as_secs_f64() * 1e3
    );
    Ok(omega)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arithmetic::{divisor_count, prime_table};
    use resonance_types::KernelError;

    fn config(variant: SeedVariant) -> SieveConfig {
        SieveConfig {
            seed_variant: variant,
            ..SieveConfig::default()
        }
    }

    #[test]
    fn test_identity_unsigned() {
        let field = sieve(5000, &config(SeedVariant::Unsigned)).unwrap();
        let r = verify_identity(&field);
        assert!(r < 1e-6, "residual {r}");
    }

    #[test]
    fn test_identity_signed() {
        let field = sieve(5000, &config(SeedVariant::Signed)).unwrap();
        let r = verify_identity(&field);
        assert!(r < 1e-6, "residual {r}");
    }

    #[test]
    fn test_identity_at_1e5() {
        for variant in [SeedVariant::Unsigned, SeedVariant::Signed] {
            let field = sieve(100_000, &config(variant)).unwrap();
            let r = verify_identity(&field);
            assert!(r < 1e-6, "{variant:?} residual {r}");
            assert!(!field.precision.widened, "{variant:?} {:?}", field.precision);
        }
    }

    #[test]
    fn test_identity_without_threshold() {
        let cfg = SieveConfig {
            noise_threshold: 0.0,
            ..SieveConfig::default()
        };
        let field = sieve(2000, &cfg).unwrap();
        assert!(verify_identity(&field) < 1e-10);
    }

    #[test]
    fn test_unsigned_field_at_primes() {
        let field = sieve(1000, &SieveConfig::default()).unwrap();
        let primes = prime_table(1000);
        for p in 3..=1000usize {
            if primes[p] {
                let err = (field.lambda[p] - (p as f64).ln()).abs();
                assert!(err < 1e-9, "Λ({p}) off by {err}");
            }
        }
        // odd squarefree composites vanish
        for c in [15usize, 21, 35, 105, 385] {
            assert!(field.lambda[c].abs() < 1e-9, "Λ({c}) = {}", field.lambda[c]);
        }
        assert!((field.lambda[2] - 2f64.ln() / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_signed_field_differs() {
        let unsigned = sieve(100, &config(SeedVariant::Unsigned)).unwrap();
        let signed = sieve(100, &config(SeedVariant::Signed)).unwrap();
        assert!((signed.lambda[3] + 3f64.ln()).abs() < 1e-12);
        assert!((unsigned.lambda[6] - signed.lambda[6]).abs() > 1.0);
    }

    #[test]
    fn test_sieve_minimum_bound() {
        let field = sieve(1, &SieveConfig::default()).unwrap();
        assert_eq!(field.lambda, vec![0.0, 0.0]);
        assert!(matches!(
            sieve(0, &SieveConfig::default()),
            Err(KernelError::InvalidBound { .. })
        ));
    }

    #[test]
    fn test_precision_report() {
        let field = sieve(10_000, &SieveConfig::default()).unwrap();
        assert!(!field.precision.widened);
        assert!(field.precision.rounding_bound > 0.0);
        assert!(field.require_precision(1e-6).is_ok());
        assert!(field.require_precision(1e-12).is_err());
    }

    #[test]
    fn test_precision_flag_with_coarse_threshold() {
        let cfg = SieveConfig {
            noise_threshold: 1e-3,
            ..SieveConfig::default()
        };
        let field = sieve(1000, &cfg).unwrap();
        assert!(field.precision.widened);
    }

    #[test]
    fn test_synthesized_omega_matches_divisor_count() {
        let omega = synthesize_omega(5000).unwrap();
        assert_eq!(omega[0], 0);
        for i in 1..=5000usize {
            let expected = divisor_count(2 * i as i64) as i64 - 4;
            assert_eq!(omega[i], expected, "i={i}");
        }
        assert_eq!(omega[1], -2);
        assert_eq!(omega[2], -1);
    }

    #[test]
    fn test_synthesize_omega_rejects_zero() {
        assert!(synthesize_omega(0).is_err());
    }
}
