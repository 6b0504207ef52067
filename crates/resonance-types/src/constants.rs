// ─────────────────────────────────────────────────────────────────────
// Resonance Kernel — Model Constants
// ─────────────────────────────────────────────────────────────────────
//! Analytic and empirical constants of the resonance model.
//!
//! These are plain values and pure functions; components receive them
//! through [`ModelConstants`](crate::config::ModelConstants) so that a
//! run can be repeated against alternative precisions.

/// Discharge constant quoted by earlier simulation runs.
///
/// Differs from the closed form in the fourth decimal; kept so that
/// historical Ψ_E traces can be reproduced bit for bit.
pub const T_P_LEGACY: f64 = 2.410142264177218;

/// Equilibrium slope of Ψ_E(n) ≈ K_MF·log(n), obtained offline as the root of
/// (2 − 2^−s)·ζ(s) = 4.
pub const K_MF: f64 = 1.72864;

/// Exponents p of the first 51 known Mersenne primes 2^p − 1.
pub const MERSENNE_EXPONENTS: [u64; 51] = [
    2, 3, 5, 7, 13, 17, 19, 31, 61, 89, 107, 127, 521, 607, 1279, 2203, 2281, 3217, 4253, 4423,
    9689, 9941, 11213, 19937, 21701, 23209, 44497, 86243, 110503, 132049, 216091, 756839, 859433,
    1257787, 1398269, 2976221, 3021377, 6972593, 13466917, 20996011, 24036583, 25964951,
    30402457, 32582657, 37156667, 42643801, 43112609, 57885161, 74207281, 77232917, 82589933,
];

/// Gaussian error function.
///
/// Maclaurin series for |x| ≤ 4, asymptotic erfc expansion beyond.
pub fn erf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x < 0.0 {
        return -erf(-x);
    }
    if x > 4.0 {
        return 1.0 - erfc_asymptotic(x);
    }

    // erf(x) = 2/√π Σ (−1)^n x^(2n+1) / (n! (2n+1))
    let x2 = x * x;
    let mut power = x; // (−1)^n x^(2n+1) / n!
    let mut sum = x;
    for n in 1..200u32 {
        power *= -x2 / f64::from(n);
        let term = power / f64::from(2 * n + 1);
        sum += term;
        if term.abs() < 1e-17 * sum.abs() {
            break;
        }
    }
    sum * std::f64::consts::FRAC_2_SQRT_PI
}

fn erfc_asymptotic(x: f64) -> f64 {
    let x2 = x * x;
    let mut term = 1.0;
    let mut series = 1.0;
    for n in 1..12u32 {
        let next = -term * f64::from(2 * n - 1) / (2.0 * x2);
        if next.abs() > term.abs() {
            break;
        }
        term = next;
        series += term;
    }
    (-x2).exp() / (x * std::f64::consts::PI.sqrt()) * series
}

/// Euler–Mascheroni constant γ.
pub const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Logarithmic integral li(x) for x > 1; NaN otherwise.
///
/// Ramanujan's series
///
///   li(x) = γ + ln ln x + √x · Σ_{k≥1} (−1)^(k−1) (ln x)^k / (k!·2^(k−1))
///                               · Σ_{i=0}^{⌊(k−1)/2⌋} 1/(2i+1)
pub fn li(x: f64) -> f64 {
    if !(x.is_finite() && x > 1.0) {
        return f64::NAN;
    }
    let ln_x = x.ln();
    let mut base = ln_x;
    let mut inner = 0.0;
    let mut sum = 0.0;
    for k in 1..=400u32 {
        if k > 1 {
            base *= -ln_x / f64::from(2 * k);
        }
        if k % 2 == 1 {
            inner += 1.0 / f64::from(k);
        }
        let term = base * inner;
        sum += term;
        if term.abs() < 1e-17 * sum.abs() && f64::from(k) > ln_x {
            break;
        }
    }
    EULER_GAMMA + ln_x.ln() + x.sqrt() * sum
}

/// Closed form of T(p) for primes p > 4:
///
///   T_p = 1 + √(π/2) · e^(1/2) · erf(1/√2)
pub fn t_p_analytic() -> f64 {
    let sqrt_pi_2 = (std::f64::consts::PI / 2.0).sqrt();
    1.0 + sqrt_pi_2 * 0.5f64.exp() * erf(std::f64::consts::FRAC_1_SQRT_2)
}

/// Perfect damping constant C_Perf = Σ_k 1 / (2·p_k − 1) over
/// [`MERSENNE_EXPONENTS`].
///
/// Each term is 1 / (1 + Ω(N_k)) for the perfect number N_k, where
/// Ω(N_k) = 2(p_k − 1).
pub fn c_perf() -> f64 {
    MERSENNE_EXPONENTS
        .iter()
        .map(|&p| 1.0 / (2.0 * p as f64 - 1.0))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_erf_known_values() {
        assert_eq!(erf(0.0), 0.0);
        assert!((erf(1.0) - 0.842_700_792_949_714_9).abs() < 1e-14);
        assert!((erf(0.5) - 0.520_499_877_813_046_5).abs() < 1e-14);
        assert!((erf(-1.0) + 0.842_700_792_949_714_9).abs() < 1e-14);
    }

    #[test]
    fn test_erf_tail() {
        assert!((erf(4.0) - 0.999_999_984_582_742_1).abs() < 1e-10);
        assert!((erf(5.0) - 0.999_999_999_998_462_5).abs() < 1e-14);
        assert!(erf(10.0) <= 1.0);
    }

    #[test]
    fn test_t_p_matches_double_factorial_series() {
        // T_p = 1 + 1 + 1/3 + 1/(3·5) + 1/(3·5·7) + …
        let mut sum = 1.0;
        let mut term = 1.0;
        for k in 1..40 {
            term /= (2 * k - 1) as f64;
            sum += term;
        }
        assert!(
            (t_p_analytic() - sum).abs() < 1e-13,
            "analytic={} series={sum}",
            t_p_analytic()
        );
        assert!((t_p_analytic() - 2.410_686_134_642_448).abs() < 1e-12);
    }

    #[test]
    fn test_legacy_constant_differs_from_closed_form() {
        let diff = (t_p_analytic() - T_P_LEGACY).abs();
        assert!(diff > 1e-4 && diff < 1e-3, "diff={diff}");
    }

    #[test]
    fn test_li_known_values() {
        assert!((li(2.0) - 1.045_163_780_117_493).abs() < 1e-14);
        assert!((li(10.0) - 6.165_599_504_787_298).abs() < 1e-13);
        assert!((li(10_000.0) - 1_246.137_215_899_388).abs() < 1e-9);
        assert!((li(1e6) - 78_627.549_159_462_19).abs() < 1e-7);
        assert!(li(1.0).is_nan());
        assert!(li(0.5).is_nan());
    }

    #[test]
    fn test_c_perf() {
        assert_eq!(MERSENNE_EXPONENTS.len(), 51);
        assert!((c_perf() - 0.860_907_480_517_451_8).abs() < 1e-12);
    }
}
