// ─────────────────────────────────────────────────────────────────────
// Resonance Kernel — Divisor / Resonance Base
// ─────────────────────────────────────────────────────────────────────
//! Pure arithmetic functions used as the correctness reference:
//!
//!   d(m)  : number of positive divisors, by trial division (O(√m))
//!   Ω(n)  : resonance, d(2n) − 4
//!   μ(k)  : Möbius function
//!
//! Ω(n) = 0 exactly when n is prime or n = 4 (for n ≥ 3). This is the
//! empirical claim the sieve and the counters are tested against.

use resonance_types::{KernelError, KernelResult, OmegaConvention};

/// Smallest n for which Ω(n) is defined in the strict model.
pub const OMEGA_MIN: u64 = 3;

/// ⌊√n⌋, exact for the whole u64 range.
pub fn isqrt(n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    let mut x = (n as f64).sqrt() as u64;
    while x.checked_mul(x).map_or(true, |sq| sq > n) {
        x -= 1;
    }
    while (x + 1).checked_mul(x + 1).map_or(false, |sq| sq <= n) {
        x += 1;
    }
    x
}

/// d(m): number of positive divisors of m; 0 for m ≤ 0.
pub fn divisor_count(m: i64) -> u64 {
    if m <= 0 {
        return 0;
    }
    count_divisors(m as u64)
}

pub(crate) fn count_divisors(m: u64) -> u64 {
    if m == 0 {
        return 0;
    }
    let limit = isqrt(m);
    let mut count = 0;
    for i in 1..=limit {
        if m % i == 0 {
            count += if i * i == m { 1 } else { 2 };
        }
    }
    count
}

/// d(2n) without forming 2n when it would overflow.
///
/// For n = 2^a·m with m odd: d(2n) = (a + 2)·d(m).
fn doubled_divisor_count(n: u64) -> u64 {
    match n.checked_mul(2) {
        Some(two_n) => count_divisors(two_n),
        None => {
            let a = u64::from(n.trailing_zeros());
            (a + 2) * count_divisors(n >> a)
        }
    }
}

/// Ω(n) = d(2n) − 4 under the given convention for n < 3.
pub fn omega(n: u64, convention: OmegaConvention) -> KernelResult<i64> {
    if n < OMEGA_MIN {
        return match convention {
            OmegaConvention::Clamped => Ok(0),
            OmegaConvention::Strict => Err(KernelError::bound("n", n as i64, OMEGA_MIN as i64)),
        };
    }
    Ok(doubled_divisor_count(n) as i64 - 4)
}

/// Ω(n·2^j), evaluated through the odd part of n so that n·2^j is never
/// materialised.
pub fn omega_scaled(n: u64, j: u32, convention: OmegaConvention) -> KernelResult<i64> {
    if n == 0 {
        return omega(0, convention);
    }
    // n·2^j < 3 only for (1, 0), (1, 1), (2, 0)
    if n < OMEGA_MIN && n << j.min(2) < OMEGA_MIN {
        return omega(n << j, convention);
    }
    let a = u64::from(n.trailing_zeros());
    let odd = n >> a;
    let exponent = a + u64::from(j) + 2;
    let d = exponent
        .checked_mul(count_divisors(odd))
        .ok_or_else(|| KernelError::Overflow(format!("d(2·{n}·2^{j})")))?;
    i64::try_from(d)
        .map(|d| d - 4)
        .map_err(|_| KernelError::Overflow(format!("Omega({n}·2^{j})")))
}

/// μ(k): 1 for k = 1, 0 if k has a squared prime factor, otherwise
/// (−1)^(number of distinct prime factors).
pub fn mobius(k: u64) -> i8 {
    if k == 0 {
        return 0;
    }
    let mut rest = k;
    let mut sign = 1i8;
    let mut p = 2u64;
    while p * p <= rest {
        if rest % p == 0 {
            rest /= p;
            if rest % p == 0 {
                return 0;
            }
            sign = -sign;
        }
        p += 1;
    }
    if rest > 1 {
        sign = -sign;
    }
    sign
}

/// ⌊x^(1/k)⌋ exactly: floating estimate followed by integer correction.
pub fn integer_root(x: u64, k: u32) -> u64 {
    if k <= 1 || x < 2 {
        return x;
    }
    let mut r = (x as f64).powf(1.0 / f64::from(k)).round() as u64;
    while r > 0 && r.checked_pow(k).map_or(true, |v| v > x) {
        r -= 1;
    }
    while (r + 1).checked_pow(k).map_or(false, |v| v <= x) {
        r += 1;
    }
    r
}

/// Sieve of Eratosthenes: `table[i]` is true iff i is prime, for i ∈ [0, n].
pub fn prime_table(n: usize) -> Vec<bool> {
    let mut table = vec![true; n + 1];
    table[0] = false;
    if n >= 1 {
        table[1] = false;
    }
    let mut i = 2;
    while i * i <= n {
        if table[i] {
            for multiple in (i * i..=n).step_by(i) {
                table[multiple] = false;
            }
        }
        i += 1;
    }
    table
}

/// π(n) by the Eratosthenes reference sieve.
pub fn prime_count(n: usize) -> usize {
    prime_table(n).iter().filter(|&&p| p).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isqrt_exact() {
        assert_eq!(isqrt(0), 0);
        assert_eq!(isqrt(1), 1);
        assert_eq!(isqrt(15), 3);
        assert_eq!(isqrt(16), 4);
        assert_eq!(isqrt(u64::MAX), 4_294_967_295);
        assert_eq!(isqrt((1 << 52) + 1), 1 << 26);
    }

    #[test]
    fn test_divisor_count_small() {
        let expected = [1u64, 2, 2, 3, 2, 4, 2, 4, 3, 4, 2, 6];
        for (i, &d) in expected.iter().enumerate() {
            assert_eq!(divisor_count(i as i64 + 1), d, "d({})", i + 1);
        }
    }

    #[test]
    fn test_divisor_count_non_positive() {
        assert_eq!(divisor_count(0), 0);
        assert_eq!(divisor_count(-12), 0);
    }

    #[test]
    fn test_divisor_count_square() {
        assert_eq!(divisor_count(36), 9);
        assert_eq!(divisor_count(1_000_000), 49);
    }

    #[test]
    fn test_omega_primes_and_four() {
        for n in [3u64, 4, 5, 7, 11, 13, 97, 7919] {
            assert_eq!(omega(n, OmegaConvention::Clamped).unwrap(), 0, "Omega({n})");
        }
    }

    #[test]
    fn test_omega_composites() {
        assert_eq!(omega(6, OmegaConvention::Clamped).unwrap(), 2);
        assert_eq!(omega(8, OmegaConvention::Clamped).unwrap(), 1);
        // Ω(2^r) = r − 2
        assert_eq!(omega(16, OmegaConvention::Clamped).unwrap(), 2);
        assert_eq!(omega(32, OmegaConvention::Clamped).unwrap(), 3);
    }

    #[test]
    fn test_omega_conventions_below_three() {
        for n in 0..3 {
            assert_eq!(omega(n, OmegaConvention::Clamped).unwrap(), 0);
            assert_eq!(
                omega(n, OmegaConvention::Strict).unwrap_err(),
                KernelError::bound("n", n as i64, 3)
            );
        }
    }

    #[test]
    fn test_omega_zero_iff_prime_or_four() {
        let n_max = 10_000;
        let primes = prime_table(n_max);
        for n in 3..=n_max {
            let zero = omega(n as u64, OmegaConvention::Clamped).unwrap() == 0;
            assert_eq!(zero, primes[n] || n == 4, "n={n}");
        }
    }

    #[test]
    fn test_omega_large_argument_uses_odd_part() {
        // 2^63: d(2^64) = 65
        let n = 1u64 << 63;
        assert_eq!(omega(n, OmegaConvention::Clamped).unwrap(), 61);
    }

    #[test]
    fn test_omega_scaled_matches_direct() {
        for n in 1..200u64 {
            for j in 0..6 {
                let direct = omega(n << j, OmegaConvention::Clamped).unwrap();
                let scaled = omega_scaled(n, j, OmegaConvention::Clamped).unwrap();
                assert_eq!(direct, scaled, "n={n} j={j}");
            }
        }
    }

    #[test]
    fn test_omega_scaled_beyond_u64() {
        // Ω(p·2^j) = 2j for odd primes p
        assert_eq!(omega_scaled(7, 100, OmegaConvention::Clamped).unwrap(), 200);
    }

    #[test]
    fn test_omega_scaled_strict_small() {
        assert!(omega_scaled(1, 0, OmegaConvention::Strict).is_err());
        assert!(omega_scaled(2, 0, OmegaConvention::Strict).is_err());
        assert_eq!(omega_scaled(2, 1, OmegaConvention::Strict).unwrap(), 0);
    }

    #[test]
    fn test_mobius() {
        let expected = [1i8, -1, -1, 0, -1, 1, -1, 0, 0, 1, -1, 0, -1, 1, 1, 0];
        for (i, &mu) in expected.iter().enumerate() {
            assert_eq!(mobius(i as u64 + 1), mu, "mu({})", i + 1);
        }
        assert_eq!(mobius(30), -1);
        assert_eq!(mobius(0), 0);
    }

    #[test]
    fn test_integer_root() {
        assert_eq!(integer_root(63, 6), 1);
        assert_eq!(integer_root(64, 6), 2);
        assert_eq!(integer_root(1000, 3), 10);
        assert_eq!(integer_root(999, 3), 9);
        assert_eq!(integer_root(10_000, 1), 10_000);
        assert_eq!(integer_root(u64::MAX, 2), 4_294_967_295);
        assert_eq!(integer_root(0, 5), 0);
    }

    #[test]
    fn test_prime_count_reference() {
        assert_eq!(prime_count(0), 0);
        assert_eq!(prime_count(1), 0);
        assert_eq!(prime_count(2), 1);
        assert_eq!(prime_count(100), 25);
        assert_eq!(prime_count(10_000), 1229);
    }
}
