// ─────────────────────────────────────────────────────────────────────
// Resonance Kernel — Spectral Sieve & Reconstruction Engine
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Additive-convolution sieve for the resonance model, with the
//! auxiliary series T(n), the Ψ_E accumulator and the Möbius
//! reconstruction of π(x).
//!
//! Data flows leaf to root: arithmetic base → seed → sieve →
//! {T(n), reconstruction} → Ψ_E.
//!
//! # Invariants
//!
//! 1. **No factorisation**: Λ and the synthesised Ω come from push-forward
//!    passes over multiples; Ω(n·2^j) uses the odd-part identity
//!    d(2^(a+1)·m) = (a+2)·d(m).
//!
//! 2. **Refuse, never clamp**: every entry point checks its bound and
//!    returns `InvalidBound`. The only clamping is the configurable
//!    Ω convention below n = 3.
//!
//! 3. **Precision is reported**: sieve and reconstruction carry a
//!    `PrecisionReport`; `widened` is set when the error estimate
//!    exceeds the configured tolerance.
//!
//! 4. **Fresh per run**: caches belong to the evaluator that owns them
//!    and nothing is shared between different N.

pub mod arithmetic;
pub mod cache;
pub mod dynamics;
pub mod primality;
pub mod reconstruction;
pub mod resonance;
pub mod seed;
pub mod series;
pub mod sieve;
pub mod summation;

pub use arithmetic::{divisor_count, mobius, omega, omega_scaled, prime_count, prime_table};
pub use cache::MemoCache;
pub use dynamics::{dynamical_trace, trace, trace_with, DynamicalAccumulator, DynamicalTrace};
pub use primality::{
    oracle_for, ExternalOracle, MillerRabinOracle, PrimalityOracle, SieveOracle,
    TrialDivisionOracle,
};
pub use reconstruction::{
    cumulative_potential, mobius_terms, reconstruct_from_field, reconstruct_pi,
    reconstruct_pi_with, reconstruct_with_terms, Reconstruction,
};
pub use resonance::{CachedResonance, DivisorResonance, ResonanceSource, TableResonance};
pub use seed::generate_seed;
pub use series::{series_t, SeriesEvaluator, SeriesValue};
pub use sieve::{sieve, synthesize_omega, verify_identity, SpectralField};
pub use summation::Accumulator;

use resonance_types::OmegaConvention;

/// d(m); 0 for m ≤ 0.
pub fn compute_d(m: i64) -> u64 {
    divisor_count(m)
}

/// Ω(n) = d(2n) − 4, with Ω(n) = 0 for n < 3.
pub fn compute_omega(n: u64) -> i64 {
    omega(n, OmegaConvention::Clamped).unwrap_or(0)
}
