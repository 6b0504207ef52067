// ─────────────────────────────────────────────────────────────────────
// Resonance Kernel — Möbius Reconstruction
// ─────────────────────────────────────────────────────────────────────
//! Approximate prime counting from the spectral field.
//!
//!   J(x)  = Σ_{2≤n≤x} Λ_clean(n) / ln n
//!   π̃(x) = Σ_{k≤K, μ(k)≠0} (μ(k)/k) · J(⌊x^(1/k)⌋),   K = ⌊log₂ N⌋
//!
//! This inverts J(x) = Σ_k (1/k)·π(x^(1/k)). Every squarefree k ≤ K
//! contributes; dropping any of them (k = 6, 10, …) biases π̃.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use resonance_types::{
    check_bound, KernelError, KernelResult, MobiusTerm, PrecisionReport, ReconstructionConfig,
    SeedVariant, SummationMode,
};

use crate::arithmetic::mobius;
use crate::sieve::SpectralField;
use crate::summation::Accumulator;

/// π̃ over [0, N] with the terms that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reconstruction {
    pub n: usize,
    pub terms: Vec<MobiusTerm>,
    /// π̃(x) for x = 0..=N.
    pub pi: Vec<f64>,
    pub precision: PrecisionReport,
}

impl Reconstruction {
    /// π̃(x), or `None` beyond N.
    pub fn at(&self, x: usize) -> Option<f64> {
        self.pi.get(x).copied()
    }

    pub fn require_precision(&self, tolerance: f64) -> KernelResult<()> {
        self.precision.require(tolerance)
    }
}

/// Cumulative potential J and its error estimate.
struct Potential {
    values: Vec<f64>,
    rounding_bound: f64,
    /// Σ |Λ(n)|/ln n over the zeroed entries.
    removed_mass: f64,
}

fn build_potential(lambda: &[f64], threshold: f64, mode: SummationMode) -> Potential {
    let mut values = vec![0.0; lambda.len()];
    let mut acc = Accumulator::new(mode);
    let mut removed_mass = 0.0;
    for (n, &l) in lambda.iter().enumerate().skip(2) {
        let weight = (n as f64).ln();
        if l.abs() <= threshold {
            removed_mass += l.abs() / weight;
        } else {
            acc.add(l / weight);
        }
        values[n] = acc.value();
    }
    Potential {
        values,
        rounding_bound: acc.error_bound(),
        removed_mass,
    }
}

/// J(x) = Σ_{2≤n≤x} Λ_clean(n)/ln n, with |Λ| ≤ `threshold` zeroed.
/// J(0) = J(1) = 0.
pub fn cumulative_potential(lambda: &[f64], threshold: f64, mode: SummationMode) -> Vec<f64> {
    build_potential(lambda, threshold, mode).values
}

/// μ(k)/k for every k ≤ ⌊log₂ n⌋ with μ(k) ≠ 0.
pub fn mobius_terms(n: usize) -> Vec<MobiusTerm> {
    if n < 2 {
        return Vec::new();
    }
    let max_k = usize::BITS - 1 - n.leading_zeros();
    (1..=max_k)
        .filter_map(|k| {
            let mu = mobius(u64::from(k));
            (mu != 0).then(|| MobiusTerm {
                k,
                mu,
                weight: f64::from(mu) / f64::from(k),
            })
        })
        .collect()
}

/// π̃ over [0, n] from J with the default configuration.
pub fn reconstruct_pi(j: &[f64], n: usize) -> KernelResult<Vec<f64>> {
    Ok(reconstruct_pi_with(j, n, &ReconstructionConfig::default())?.pi)
}

/// π̃ over [0, n] from J using every Möbius term up to ⌊log₂ n⌋.
pub fn reconstruct_pi_with(
    j: &[f64],
    n: usize,
    config: &ReconstructionConfig,
) -> KernelResult<Reconstruction> {
    check_bound("n", n as u64, 2)?;
    reconstruct_with_terms(j, n, &mobius_terms(n), config)
}

/// π̃ over [0, n] from an explicit term list.
///
/// Diagnostic entry point: passing a subset of [`mobius_terms`] shows
/// the effect of each k on the result.
pub fn reconstruct_with_terms(
    j: &[f64],
    n: usize,
    terms: &[MobiusTerm],
    config: &ReconstructionConfig,
) -> KernelResult<Reconstruction> {
    check_bound("n", n as u64, 2)?;
    if j.len() <= n {
        return Err(KernelError::bound("j.len", j.len() as i64, n as i64 + 1));
    }
    if let Some(bad) = j[..=n].iter().position(|v| !v.is_finite()) {
        return Err(KernelError::Numerical(format!("J({bad}) is not finite")));
    }
    if let Some(bad) = terms.iter().find(|t| t.k == 0 || !t.weight.is_finite()) {
        return Err(KernelError::Config(format!(
            "Möbius term needs k >= 1 and a finite weight, got k={} weight={}",
            bad.k, bad.weight
        )));
    }
    let start = Instant::now();

    // ⌊x^(1/k)⌋ per term, advanced incrementally as x grows.
    let mut roots = vec![0u64; terms.len()];
    let mut pi = Vec::with_capacity(n + 1);
    let mut rounding_bound = 0.0f64;

    for x in 0..=n as u64 {
        let mut acc = Accumulator::new(config.summation);
        for (term, root) in terms.iter().zip(roots.iter_mut()) {
            while (*root + 1)
                .checked_pow(term.k)
                .map_or(false, |p| p <= x)
            {
                *root += 1;
            }
            acc.add(term.weight * j[*root as usize]);
        }
        rounding_bound = rounding_bound.max(acc.error_bound());
        pi.push(acc.value());
    }

    let precision = PrecisionReport::new(rounding_bound, 0.0, config.tolerance);
    log::debug!(
        "reconstruct: n={n} terms={} pi(n)={:.4} in {:.3} ms",
        terms.len(),
        pi[n],
        start.elapsed().as_secs_f64() * 1e3
    );
    Ok(Reconstruction {
        n,
        terms: terms.to_vec(),
        pi,
        precision,
    })
}

/// J and π̃ from a sieve field, folding the field's rounding bound and
/// the thresholding loss of J into the reconstruction's precision report.
///
/// The sieve's own threshold bound stays on the field's report.
/// Only the unsigned field carries ln p at primes, so a signed field is
/// refused.
pub fn reconstruct_from_field(
    field: &SpectralField,
    config: &ReconstructionConfig,
) -> KernelResult<Reconstruction> {
    if field.variant != SeedVariant::Unsigned {
        return Err(KernelError::Config(
            "reconstruction needs the unsigned seed variant".to_string(),
        ));
    }
    check_bound("n", field.n as u64, 2)?;
    let potential = build_potential(&field.lambda, config.noise_threshold, config.summation);
    let mut rec = reconstruct_pi_with(&potential.values, field.n, config)?;

    let weight_mass: f64 = rec.terms.iter().map(|t| t.weight.abs()).sum();
    // Per-cell rounding δ reaches J(x) at most x·δ/ln 2 times.
    let field_bound = field.precision.rounding_bound * field.n as f64 / std::f64::consts::LN_2;
    let rounding = rec.precision.rounding_bound + weight_mass * (potential.rounding_bound + field_bound);
    let threshold = weight_mass * potential.removed_mass;
    rec.precision = PrecisionReport::new(rounding, threshold, config.tolerance);
    Ok(rec)
}
