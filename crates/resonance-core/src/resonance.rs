// ─────────────────────────────────────────────────────────────────────
// Resonance Kernel — Resonance Sources
// ─────────────────────────────────────────────────────────────────────
//! Where the series evaluator gets Ω from.
//!
//! The default source is trial division on the odd part; a memoising
//! wrapper keeps every Ω(n·2^j) seen during one run. Tests substitute
//! their own source to reach the divergent branch of T(n).

use resonance_types::{KernelError, KernelResult, OmegaConvention};

use crate::arithmetic;
use crate::cache::MemoCache;

/// Trait for Ω backends.
pub trait ResonanceSource: Send + Sync {
    /// Ω(n).
    fn omega(&self, n: u64) -> KernelResult<i64>;

    /// Ω(n·2^j). The default forms n·2^j and fails on overflow.
    fn omega_scaled(&self, n: u64, j: u32) -> KernelResult<i64> {
        let scaled = 1u64
            .checked_shl(j)
            .and_then(|p| n.checked_mul(p))
            .ok_or_else(|| KernelError::Overflow(format!("{n}·2^{j} exceeds u64")))?;
        self.omega(scaled)
    }
}

/// Ω(n) = d(2n) − 4 by trial division.
#[derive(Debug, Clone, Copy)]
pub struct DivisorResonance {
    convention: OmegaConvention,
}

impl DivisorResonance {
    pub fn new(convention: OmegaConvention) -> Self {
        Self { convention }
    }

    pub fn convention(&self) -> OmegaConvention {
        self.convention
    }
}

impl Default for DivisorResonance {
    fn default() -> Self {
        Self::new(OmegaConvention::Clamped)
    }
}

impl ResonanceSource for DivisorResonance {
    fn omega(&self, n: u64) -> KernelResult<i64> {
        arithmetic::omega(n, self.convention)
    }

    fn omega_scaled(&self, n: u64, j: u32) -> KernelResult<i64> {
        arithmetic::omega_scaled(n, j, self.convention)
    }
}

/// Memoising wrapper around any source.
pub struct CachedResonance<S> {
    inner: S,
    cache: MemoCache<(u64, u32), i64>,
}

impl<S: ResonanceSource> CachedResonance<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: MemoCache::new(),
        }
    }

    pub fn cache(&self) -> &MemoCache<(u64, u32), i64> {
        &self.cache
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: ResonanceSource> ResonanceSource for CachedResonance<S> {
    fn omega(&self, n: u64) -> KernelResult<i64> {
        self.cache.get_or_try_insert((n, 0), || self.inner.omega(n))
    }

    fn omega_scaled(&self, n: u64, j: u32) -> KernelResult<i64> {
        self.cache
            .get_or_try_insert((n, j), || self.inner.omega_scaled(n, j))
    }
}

/// Ω over a precomputed table, e.g. the field built by
/// [`synthesize_omega`](crate::sieve::synthesize_omega).
///
/// Indices beyond the table fall back to trial division.
pub struct TableResonance {
    table: Vec<i64>,
    fallback: DivisorResonance,
}

impl TableResonance {
    pub fn new(table: Vec<i64>, convention: OmegaConvention) -> Self {
        Self {
            table,
            fallback: DivisorResonance::new(convention),
        }
    }
}

impl ResonanceSource for TableResonance {
    fn omega(&self, n: u64) -> KernelResult<i64> {
        if n < arithmetic::OMEGA_MIN {
            return self.fallback.omega(n);
        }
        match usize::try_from(n).ok().and_then(|i| self.table.get(i)) {
            Some(&v) => Ok(v),
            None => self.fallback.omega(n),
        }
    }

    fn omega_scaled(&self, n: u64, j: u32) -> KernelResult<i64> {
        match 1u64
            .checked_shl(j)
            .and_then(|p| n.checked_mul(p))
        {
            Some(scaled) => self.omega(scaled),
            None => self.fallback.omega_scaled(n, j),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_divisor_resonance() {
        let src = DivisorResonance::default();
        assert_eq!(src.omega(5).unwrap(), 0);
        assert_eq!(src.omega(6).unwrap(), 2);
        assert_eq!(src.omega_scaled(5, 3).unwrap(), 6);
    }

    #[test]
    fn test_default_omega_scaled_overflow() {
        struct Identity;
        impl ResonanceSource for Identity {
            fn omega(&self, n: u64) -> KernelResult<i64> {
                Ok(n as i64)
            }
        }
        assert_eq!(Identity.omega_scaled(3, 2).unwrap(), 12);
        assert!(matches!(
            Identity.omega_scaled(3, 64),
            Err(KernelError::Overflow(_))
        ));
        assert!(matches!(
            Identity.omega_scaled(u64::MAX, 1),
            Err(KernelError::Overflow(_))
        ));
    }

    #[test]
    fn test_cached_resonance_hits() {
        let src = CachedResonance::new(DivisorResonance::default());
        for _ in 0..4 {
            assert_eq!(src.omega_scaled(6, 1).unwrap(), 4);
        }
        assert_eq!(src.cache().misses(), 1);
        assert_eq!(src.cache().hits(), 3);
    }

    #[test]
    fn test_cached_strict_error_propagates() {
        let src = CachedResonance::new(DivisorResonance::new(OmegaConvention::Strict));
        assert!(src.omega(2).is_err());
        assert!(src.cache().is_empty());
    }

    #[test]
    fn test_table_resonance_falls_back() {
        let table = vec![0, 0, 0, 0, 0, 0, 2];
        let src = TableResonance::new(table, OmegaConvention::Clamped);
        assert_eq!(src.omega(6).unwrap(), 2);
        assert_eq!(src.omega(12).unwrap(), 4);
        assert_eq!(src.omega_scaled(3, 1).unwrap(), 2);
    }
}
