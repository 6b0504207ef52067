// ─────────────────────────────────────────────────────────────────────
// Resonance Kernel — Parity Correction & Abel Summation
// ─────────────────────────────────────────────────────────────────────
//! Two readings of the signed seed's partial sums
//!
//!   A(x) = Σ_{n≤x} α(n) = 1.5·x + R(x)
//!
//! whose residual R only carries the parity of ⌊x⌋.
//!
//! **Parity correction.** π(N) ≈ li(N) + ΔN with
//!
//!   ΔN = −(2π / ln N) · Σ_{k=2}^{N} r_k·(k^(−s) − (k+1)^(−s)),   s = K_MF
//!
//! where r_k = +½ for odd k and −½ for even k.
//!
//! **Abel summation.** For real s > 1
//!
//!   L(s) = Σ α(n)·n^(−s) = 1.5·s/(s − 1) + s·∫_1^∞ R(x)·x^(−s−1) dx
//!        = (2 − 2^(−s))·ζ(s) − 4
//!
//! The integral is summed exactly per interval [m, m + 1), so the
//! truncation at N only drops the residual tail.

use serde::{Deserialize, Serialize};

use resonance_core::{generate_seed, prime_count, Accumulator};
use resonance_types::constants::li;
use resonance_types::{check_bound, KernelError, KernelResult, SeedVariant, SummationMode};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParityEstimate {
    pub n: usize,
    /// Exponent s of the decay weights.
    pub exponent: f64,
    /// li(N).
    pub li: f64,
    /// ΔN.
    pub correction: f64,
    /// li(N) + ΔN.
    pub estimate: f64,
    /// π(N) from the Eratosthenes table.
    pub reference: u64,
}

impl ParityEstimate {
    /// |estimate − π(N)|.
    pub fn error(&self) -> f64 {
        (self.estimate - self.reference as f64).abs()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AbelEvaluation {
    pub s: f64,
    /// Summation bound N.
    pub n: usize,
    /// L(s) by Abel summation of A(x) up to N.
    pub value: f64,
    /// Plain partial sum Σ_{n≤N} α(n)·n^(−s).
    pub partial_sum: f64,
    /// (L(s) + 4) / (2 − 2^(−s)).
    pub zeta: f64,
}

fn check_exponent(name: &str, s: f64, min_exclusive: f64) -> KernelResult<()> {
    if !(s.is_finite() && s > min_exclusive) {
        return Err(KernelError::Config(format!(
            "{name} must be finite and > {min_exclusive}, got {s}"
        )));
    }
    Ok(())
}

/// ΔN for N ≥ 2 with decay exponent `s` (> 0), usually K_MF.
pub fn parity_correction(n: usize, s: f64, mode: SummationMode) -> KernelResult<f64> {
    check_bound("n", n as u64, 2)?;
    check_exponent("s", s, 0.0)?;

    let mut acc = Accumulator::new(mode);
    let mut lower = 2f64.powf(-s);
    for k in 2..=n {
        let upper = ((k + 1) as f64).powf(-s);
        let r = if k % 2 == 1 { 0.5 } else { -0.5 };
        acc.add(r * (lower - upper));
        lower = upper;
    }
    Ok(-2.0 * std::f64::consts::PI / (n as f64).ln() * acc.value())
}

/// li(N) + ΔN against π(N).
pub fn parity_count(n: usize, s: f64, mode: SummationMode) -> KernelResult<ParityEstimate> {
    let correction = parity_correction(n, s, mode)?;
    let li_n = li(n as f64);
    let estimate = li_n + correction;
    let reference = prime_count(n) as u64;
    log::debug!("parity: n={n} li={li_n:.4} delta={correction:.6} pi={reference}");
    Ok(ParityEstimate {
        n,
        exponent: s,
        li: li_n,
        correction,
        estimate,
        reference,
    })
}

/// L(s) of the signed seed for real s > 1, summed up to N ≥ 2.
pub fn abel_l_function(s: f64, n: usize, mode: SummationMode) -> KernelResult<AbelEvaluation> {
    check_bound("n", n as u64, 2)?;
    check_exponent("s", s, 1.0)?;

    let alpha = generate_seed(n, SeedVariant::Signed)?;
    let mut residual = Accumulator::new(mode);
    let mut partial = Accumulator::new(mode);
    let mut a = 0.0;
    let mut pow_s = 1.0; // m^(−s)
    let mut pow_1s = 1.0; // m^(1−s)
    for (m, &alpha_m) in alpha.iter().enumerate().skip(1) {
        a += alpha_m;
        partial.add(alpha_m * pow_s);
        if m == n {
            break;
        }
        let next = (m + 1) as f64;
        let next_s = next.powf(-s);
        let next_1s = next * next_s;
        residual.add(a * (pow_s - next_s) / s - 1.5 * (pow_1s - next_1s) / (s - 1.0));
        pow_s = next_s;
        pow_1s = next_1s;
    }

    let value = 1.5 * s / (s - 1.0) + s * residual.value();
    let zeta = (value + 4.0) / (2.0 - 2f64.powf(-s));
    if !value.is_finite() {
        return Err(KernelError::Numerical(format!("L({s}) is not finite")));
    }
    Ok(AbelEvaluation {
        s,
        n,
        value,
        partial_sum: partial.value(),
        zeta,
    })
}
