// ─────────────────────────────────────────────────────────────────────
// Resonance Kernel — Series Evaluator T(n)
// ─────────────────────────────────────────────────────────────────────
//! Nested-product series
//!
//!   T(n) = Σ_{k≥0} Π_{j<k} 1 / (1 + Ω(n·2^j))
//!
//! accumulated as a running product P and sum S (S starts at the k = 0
//! term). Each step multiplies P by the next factor, adds P to S and
//! stops once P < ε or `max_iter` terms were added.
//!
//! Closed forms: T(4) = e (Ω(4·2^j) = j) and T(p) = T_p for primes p > 4
//! (Ω(p·2^j) = 2j), where
//!
//!   T_p = 1 + √(π/2)·e^{1/2}·erf(1/√2)

use serde::{Deserialize, Serialize};

use resonance_types::{
    check_bound, KernelConfig, KernelError, KernelResult, ModelConstants, SeriesConfig,
};

use crate::cache::MemoCache;
use crate::resonance::{CachedResonance, DivisorResonance, ResonanceSource};

/// Outcome of one T(n) evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SeriesValue {
    /// Running product dropped below ε.
    Converged(f64),
    /// `max_iter` reached first.
    Truncated(f64),
    /// 1 + Ω(n·2^j) = 0.
    Divergent { j: u32 },
}

impl SeriesValue {
    /// Scalar value; `Divergent` maps to +∞.
    pub fn as_f64(self) -> f64 {
        match self {
            SeriesValue::Converged(v) | SeriesValue::Truncated(v) => v,
            SeriesValue::Divergent { .. } => f64::INFINITY,
        }
    }

    pub fn is_divergent(self) -> bool {
        matches!(self, SeriesValue::Divergent { .. })
    }
}

/// T(n) evaluator with a run-scoped memo cache.
pub struct SeriesEvaluator<S> {
    config: SeriesConfig,
    constants: ModelConstants,
    source: S,
    cache: MemoCache<u64, SeriesValue>,
}

impl SeriesEvaluator<CachedResonance<DivisorResonance>> {
    /// Evaluator over memoised trial-division Ω.
    pub fn from_config(config: &KernelConfig) -> Self {
        Self::new(
            config.series.clone(),
            config.constants,
            CachedResonance::new(DivisorResonance::new(config.omega_convention)),
        )
    }
}

impl<S: ResonanceSource> SeriesEvaluator<S> {
    pub fn new(config: SeriesConfig, constants: ModelConstants, source: S) -> Self {
        Self {
            config,
            constants,
            source,
            cache: MemoCache::new(),
        }
    }

    pub fn config(&self) -> &SeriesConfig {
        &self.config
    }

    pub fn constants(&self) -> &ModelConstants {
        &self.constants
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn cache(&self) -> &MemoCache<u64, SeriesValue> {
        &self.cache
    }

    /// T(n) as a tagged result. Requires n ≥ 1.
    pub fn evaluate(&self, n: u64) -> KernelResult<SeriesValue> {
        check_bound("n", n, 1)?;
        if self.config.memoize {
            self.cache.get_or_try_insert(n, || self.compute(n))
        } else {
            self.compute(n)
        }
    }

    /// T(n) as a scalar; a divergent series degrades to +∞.
    pub fn value(&self, n: u64) -> KernelResult<f64> {
        let v = self.evaluate(n)?;
        if let SeriesValue::Divergent { j } = v {
            log::warn!("T({n}) diverges: 1 + Omega({n}·2^{j}) = 0, returning +inf");
        }
        Ok(v.as_f64())
    }

    /// T(n), failing with `DivisionByZero` on a zero factor.
    pub fn try_value(&self, n: u64) -> KernelResult<f64> {
        match self.evaluate(n)? {
            SeriesValue::Divergent { j } => Err(KernelError::DivisionByZero { n, j }),
            v => Ok(v.as_f64()),
        }
    }

    fn compute(&self, n: u64) -> KernelResult<SeriesValue> {
        if self.config.use_closed_forms {
            if n == 4 {
                return Ok(SeriesValue::Converged(self.constants.euler));
            }
            if n > 4 && self.source.omega(n)? == 0 {
                return Ok(SeriesValue::Converged(self.constants.t_p));
            }
        }
        self.series(n)
    }

    fn series(&self, n: u64) -> KernelResult<SeriesValue> {
        let mut product = 1.0f64;
        let mut sum = 1.0f64;
        for k in 1..=self.config.max_iter {
            let j = k - 1;
            let denom = 1 + self.source.omega_scaled(n, j)?;
            if denom == 0 {
                return Ok(SeriesValue::Divergent { j });
            }
            product /= denom as f64;
            sum += product;
            if product.abs() < self.config.epsilon {
                return Ok(SeriesValue::Converged(sum));
            }
        }
        log::debug!(
            "T({n}) truncated at max_iter={} with P={product:.3e}",
            self.config.max_iter
        );
        Ok(SeriesValue::Truncated(sum))
    }
}

/// T(n) by the general series with explicit convergence controls.
///
/// Closed forms are not used, so `max_iter` and `epsilon` always apply.
pub fn series_t(n: u64, max_iter: u32, epsilon: f64) -> KernelResult<f64> {
    let config = SeriesConfig {
        max_iter,
        epsilon,
        use_closed_forms: false,
        memoize: false,
    };
    if max_iter == 0 {
        return Err(KernelError::Config("max_iter must be >= 1".to_string()));
    }
    if !(epsilon > 0.0 && epsilon < 1.0) {
        return Err(KernelError::Config(format!(
            "epsilon must be in (0, 1), got {epsilon}"
        )));
    }
    SeriesEvaluator::new(config, ModelConstants::default(), DivisorResonance::default()).value(n)
}
