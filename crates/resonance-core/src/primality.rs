// ─────────────────────────────────────────────────────────────────────
// Resonance Kernel — Primality Oracles
// ─────────────────────────────────────────────────────────────────────
//! Primality is an external collaborator of the dynamical accumulator
//! and is never derived from Ω = 0; Ψ_E must not depend on the
//! Ω/primality correspondence it is used to test.
//!
//! Any correct implementation can sit behind [`PrimalityOracle`]:
//! trial division, deterministic Miller–Rabin, a precomputed
//! Eratosthenes table, or a callback into the host language.

use resonance_types::{KernelError, KernelResult, PrimalityBackend};

use crate::arithmetic::{isqrt, prime_table};

/// Trait for primality backends.
pub trait PrimalityOracle: Send + Sync {
    fn is_prime(&self, n: u64) -> bool;

    /// Fallible form read by the accumulator. A backend that can fail
    /// must report it here; there is no safe default answer.
    fn check(&self, n: u64) -> KernelResult<bool> {
        Ok(self.is_prime(n))
    }
}

/// 6k ± 1 trial division. O(√n).
pub struct TrialDivisionOracle;

impl PrimalityOracle for TrialDivisionOracle {
    fn is_prime(&self, n: u64) -> bool {
        if n < 2 {
            return false;
        }
        if n < 4 {
            return true;
        }
        if n % 2 == 0 || n % 3 == 0 {
            return false;
        }
        let limit = isqrt(n);
        let mut i = 5;
        while i <= limit {
            if n % i == 0 || n % (i + 2) == 0 {
                return false;
            }
            i += 6;
        }
        true
    }
}

/// Miller–Rabin with the first twelve prime bases, deterministic for
/// every u64.
pub struct MillerRabinOracle;

const MR_BASES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

#[inline]
fn mul_mod(a: u64, b: u64, m: u64) -> u64 {
    ((u128::from(a) * u128::from(b)) % u128::from(m)) as u64
}

fn pow_mod(mut base: u64, mut exp: u64, m: u64) -> u64 {
    let mut result = 1 % m;
    base %= m;
    while exp > 0 {
        if exp & 1 == 1 {
            result = mul_mod(result, base, m);
        }
        base = mul_mod(base, base, m);
        exp >>= 1;
    }
    result
}

impl PrimalityOracle for MillerRabinOracle {
    fn is_prime(&self, n: u64) -> bool {
        if n < 2 {
            return false;
        }
        for &p in &MR_BASES {
            if n == p {
                return true;
            }
            if n % p == 0 {
                return false;
            }
        }

        let s = (n - 1).trailing_zeros();
        let d = (n - 1) >> s;

        'witness: for &a in &MR_BASES {
            let mut x = pow_mod(a, d, n);
            if x == 1 || x == n - 1 {
                continue;
            }
            for _ in 1..s {
                x = mul_mod(x, x, n);
                if x == n - 1 {
                    continue 'witness;
                }
            }
            return false;
        }
        true
    }
}

/// Eratosthenes table for [0, limit]. Values above `limit` fall back to
/// Miller–Rabin.
pub struct SieveOracle {
    table: Vec<bool>,
}

impl SieveOracle {
    pub fn new(limit: usize) -> Self {
        Self {
            table: prime_table(limit),
        }
    }

    pub fn limit(&self) -> usize {
        self.table.len().saturating_sub(1)
    }
}

impl PrimalityOracle for SieveOracle {
    fn is_prime(&self, n: u64) -> bool {
        match usize::try_from(n).ok().and_then(|i| self.table.get(i)) {
            Some(&p) => p,
            None => MillerRabinOracle.is_prime(n),
        }
    }
}

/// Oracle backed by a caller-supplied predicate.
///
/// Used by the PyO3 layer to delegate primality to Python.
type PrimeFn = Box<dyn Fn(u64) -> KernelResult<bool> + Send + Sync>;

pub struct ExternalOracle {
    predicate: PrimeFn,
}

impl ExternalOracle {
    pub fn new(predicate: impl Fn(u64) -> bool + Send + Sync + 'static) -> Self {
        Self {
            predicate: Box::new(move |n| Ok(predicate(n))),
        }
    }

    /// Predicate that may fail; the error stops the consumer.
    pub fn fallible(predicate: impl Fn(u64) -> KernelResult<bool> + Send + Sync + 'static) -> Self {
        Self {
            predicate: Box::new(predicate),
        }
    }
}

impl PrimalityOracle for ExternalOracle {
    fn is_prime(&self, n: u64) -> bool {
        match (self.predicate)(n) {
            Ok(p) => p,
            Err(e) => {
                log::warn!("external primality oracle failed at n={n}: {e}");
                false
            }
        }
    }

    fn check(&self, n: u64) -> KernelResult<bool> {
        (self.predicate)(n).map_err(|e| match e {
            KernelError::Oracle { .. } => e,
            other => KernelError::Oracle {
                n,
                reason: other.to_string(),
            },
        })
    }
}

/// Build the configured oracle for inputs up to `limit`.
pub fn oracle_for(backend: PrimalityBackend, limit: u64) -> Box<dyn PrimalityOracle> {
    match backend {
        PrimalityBackend::TrialDivision => Box::new(TrialDivisionOracle),
        PrimalityBackend::MillerRabin => Box::new(MillerRabinOracle),
        PrimalityBackend::Sieve => match usize::try_from(limit) {
            Ok(limit) => Box::new(SieveOracle::new(limit)),
            Err(_) => Box::new(MillerRabinOracle),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oracles_agree_with_table() {
        let table = prime_table(20_000);
        let trial = TrialDivisionOracle;
        let mr = MillerRabinOracle;
        let sieve = SieveOracle::new(20_000);
        for n in 0..=20_000u64 {
            let expected = table[n as usize];
            assert_eq!(trial.is_prime(n), expected, "trial n={n}");
            assert_eq!(mr.is_prime(n), expected, "miller-rabin n={n}");
            assert_eq!(sieve.is_prime(n), expected, "sieve n={n}");
        }
    }

    #[test]
    fn test_miller_rabin_large() {
        let mr = MillerRabinOracle;
        assert!(mr.is_prime(2_305_843_009_213_693_951)); // M61
        assert!(!mr.is_prime(2_305_843_009_213_693_953));
        assert!(mr.is_prime(18_446_744_073_709_551_557)); // largest u64 prime
        assert!(!mr.is_prime(u64::MAX));
        // strong pseudoprime to bases 2..=37 would need > 3.3e24
        assert!(!mr.is_prime(3_215_031_751));
    }

    #[test]
    fn test_sieve_falls_back_above_limit() {
        let sieve = SieveOracle::new(100);
        assert_eq!(sieve.limit(), 100);
        assert!(sieve.is_prime(7919));
        assert!(!sieve.is_prime(7917));
    }

    #[test]
    fn test_external_oracle() {
        let oracle = ExternalOracle::new(|n| n == 42);
        assert!(oracle.is_prime(42));
        assert!(!oracle.is_prime(7));
    }

    #[test]
    fn test_fallible_oracle_reports_failure() {
        let oracle = ExternalOracle::fallible(|n| {
            if n == 7 {
                Err(KernelError::Numerical("callback raised".into()))
            } else {
                Ok(n == 5)
            }
        });
        assert_eq!(oracle.check(5), Ok(true));
        assert_eq!(oracle.check(6), Ok(false));
        match oracle.check(7) {
            Err(KernelError::Oracle { n, reason }) => {
                assert_eq!(n, 7);
                assert!(reason.contains("callback raised"), "{reason}");
            }
            other => panic!("expected oracle error, got {other:?}"),
        }
        assert!(!oracle.is_prime(7));
    }

    #[test]
    fn test_oracle_for_backends() {
        for backend in [
            PrimalityBackend::TrialDivision,
            PrimalityBackend::MillerRabin,
            PrimalityBackend::Sieve,
        ] {
            let oracle = oracle_for(backend, 1000);
            assert!(oracle.is_prime(997));
            assert!(!oracle.is_prime(999));
        }
    }
}
