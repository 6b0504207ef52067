// ─────────────────────────────────────────────────────────────────────
// Resonance Kernel — Configuration
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use crate::constants::{t_p_analytic, K_MF, T_P_LEGACY};
use crate::error::{KernelError, KernelResult};

/// Value of the seed α at n = 1.
///
/// Both variants satisfy the same convolution identity
/// (Λ * α)(n) = α(n)·ln(n) but produce different Λ fields:
/// `Unsigned` recovers ln(p) at odd primes and 0 at odd squarefree
/// composites; `Signed` is the seed whose divisor sum is Ω.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedVariant {
    /// α(1) = +2.
    Unsigned,
    /// α(1) = −2.
    Signed,
}

impl SeedVariant {
    pub fn unit_value(self) -> f64 {
        match self {
            SeedVariant::Unsigned => 2.0,
            SeedVariant::Signed => -2.0,
        }
    }
}

/// How Ω(n) is defined below the model's domain n ≥ 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OmegaConvention {
    /// Ω(n) = 0 for n < 3.
    Clamped,
    /// n < 3 is refused with `InvalidBound`.
    Strict,
}

/// Accumulation strategy for long floating sums (J and π̃).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummationMode {
    /// Plain left-to-right double accumulation.
    Naive,
    /// Neumaier compensated summation (roughly doubles the working precision).
    Compensated,
}

/// Primality oracle used by the dynamical accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimalityBackend {
    TrialDivision,
    MillerRabin,
    /// Eratosthenes table built once for [0, N].
    Sieve,
}

/// Injected model constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelConstants {
    /// Discharge constant T_p = T(p) for primes p > 4.
    pub t_p: f64,
    /// Reference slope for the Ψ_E ≈ K_MF·log(n) trend.
    pub k_mf: f64,
    /// T(4).
    pub euler: f64,
}

impl Default for ModelConstants {
    fn default() -> Self {
        Self {
            t_p: t_p_analytic(),
            k_mf: K_MF,
            euler: std::f64::consts::E,
        }
    }
}

impl ModelConstants {
    /// Constants as used by earlier simulation runs.
    pub fn legacy() -> Self {
        Self {
            t_p: T_P_LEGACY,
            ..Self::default()
        }
    }
}

/// Additive convolution sieve settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SieveConfig {
    /// Seed value at n = 1. Default: `Unsigned`.
    pub seed_variant: SeedVariant,

    /// |Λ(i)| below this is not propagated to multiples. 0 disables the skip.
    /// Default: 1e-9.
    pub noise_threshold: f64,

    /// Error bound above which the field is flagged as widened.
    /// Default: 1e-6.
    pub tolerance: f64,
}

impl Default for SieveConfig {
    fn default() -> Self {
        Self {
            seed_variant: SeedVariant::Unsigned,
            noise_threshold: 1e-9,
            tolerance: 1e-6,
        }
    }
}

/// Truncation contract for the T(n) series.
///
/// `max_iter` bounds the cost of one evaluation (one Ω evaluation per
/// term); `epsilon` stops early once the running product falls below it.
/// Raising `max_iter` or lowering `epsilon` buys accuracy with time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesConfig {
    /// Maximum number of product terms after the k = 0 term. Default: 50.
    pub max_iter: u32,

    /// Early-stop threshold on the running product. Default: 1e-15.
    pub epsilon: f64,

    /// Return e for n = 4 and T_p for primes n > 4 without iterating.
    /// Default: true.
    pub use_closed_forms: bool,

    /// Cache T(n) per evaluator. Default: true.
    pub memoize: bool,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            max_iter: 50,
            epsilon: 1e-15,
            use_closed_forms: true,
            memoize: true,
        }
    }
}

/// Möbius reconstruction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconstructionConfig {
    /// Λ values with |Λ| at or below this are zeroed before building J.
    /// Default: 1e-9.
    pub noise_threshold: f64,

    /// Default: `Naive`.
    pub summation: SummationMode,

    /// Error bound above which the reconstruction is flagged as widened.
    /// Default: 1e-6.
    pub tolerance: f64,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            noise_threshold: 1e-9,
            summation: SummationMode::Naive,
            tolerance: 1e-6,
        }
    }
}

/// Ψ_E accumulator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamicsConfig {
    /// Keep every `stride`-th value of the trajectory (1 = all). The last
    /// value is always kept. Default: 1.
    pub stride: usize,

    /// Default: `Sieve`.
    pub primality: PrimalityBackend,
}

impl Default for DynamicsConfig {
    fn default() -> Self {
        Self {
            stride: 1,
            primality: PrimalityBackend::Sieve,
        }
    }
}

/// Runtime configuration for the Resonance Kernel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KernelConfig {
    /// Default: `Clamped`.
    pub omega_convention: OmegaConvention,
    pub sieve: SieveConfig,
    pub series: SeriesConfig,
    pub reconstruction: ReconstructionConfig,
    pub dynamics: DynamicsConfig,
    pub constants: ModelConstants,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            omega_convention: OmegaConvention::Clamped,
            sieve: SieveConfig::default(),
            series: SeriesConfig::default(),
            reconstruction: ReconstructionConfig::default(),
            dynamics: DynamicsConfig::default(),
            constants: ModelConstants::default(),
        }
    }
}

impl KernelConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> KernelResult<()> {
        check_threshold("sieve.noise_threshold", self.sieve.noise_threshold)?;
        check_positive("sieve.tolerance", self.sieve.tolerance)?;
        check_threshold(
            "reconstruction.noise_threshold",
            self.reconstruction.noise_threshold,
        )?;
        check_positive("reconstruction.tolerance", self.reconstruction.tolerance)?;

        if self.series.max_iter == 0 || self.series.max_iter > 10_000 {
            return Err(KernelError::Config(format!(
                "series.max_iter must be in [1, 10000], got {}",
                self.series.max_iter
            )));
        }
        if !(self.series.epsilon > 0.0 && self.series.epsilon < 1.0) {
            return Err(KernelError::Config(format!(
                "series.epsilon must be in (0, 1), got {}",
                self.series.epsilon
            )));
        }
        if self.dynamics.stride == 0 {
            return Err(KernelError::Config(
                "dynamics.stride must be >= 1".to_string(),
            ));
        }
        if !(self.constants.t_p.is_finite() && self.constants.t_p > 1.0) {
            return Err(KernelError::Config(format!(
                "constants.t_p must be finite and > 1, got {}",
                self.constants.t_p
            )));
        }
        if !self.constants.k_mf.is_finite() || !self.constants.euler.is_finite() {
            return Err(KernelError::Config(
                "constants must be finite".to_string(),
            ));
        }
        Ok(())
    }

    /// Load from JSON string.
    pub fn from_json(json: &str) -> KernelResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| KernelError::Config(format!("JSON parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> KernelResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| KernelError::Config(format!("JSON encode error: {e}")))
    }
}

fn check_threshold(name: &str, value: f64) -> KernelResult<()> {
    if !(value.is_finite() && value >= 0.0) {
        return Err(KernelError::Config(format!(
            "{name} must be finite and >= 0, got {value}"
        )));
    }
    Ok(())
}

fn check_positive(name: &str, value: f64) -> KernelResult<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(KernelError::Config(format!(
            "{name} must be finite and > 0, got {value}"
        )));
    }
    Ok(())
}
