// ─────────────────────────────────────────────────────────────────────
// Resonance Kernel — Survey Orchestrator
// ─────────────────────────────────────────────────────────────────────
//! Runs the whole pipeline for one N and collects a serialisable report:
//!
//!   sieve → identity check → reconstruction vs. Eratosthenes
//!   Ω synthesis → correspondence check → floor-sum count
//!   parity correction li(N) + ΔN
//!   perfect detection → Ψ_E trace → trend, residuals and T̄ probe
//!
//! T(n) reads Ω from the synthesised table, so the trace does no trial
//! division below N.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use resonance_core::{
    oracle_for, prime_table, reconstruct_from_field, sieve, synthesize_omega, trace_with,
    verify_identity, CachedResonance, SeriesEvaluator, TableResonance,
};
use resonance_types::{
    check_bound, KernelConfig, KernelError, KernelResult, PrecisionReport, SeedVariant,
};

use crate::counting::{floor_sum_count_from, PrimeCountReport};
use crate::parity::{parity_count, ParityEstimate};
use crate::perfect::{detect_perfect_in_range, PerfectReport, DEFAULT_TOLERANCE};
use crate::probe::{probe_window, ProbeStats};
use crate::trend::{fit_trend, resonance_error, ResonanceErrorSample, TrendFit};

/// Residual samples per report.
const ERROR_SAMPLES: usize = 20;

/// Largest T̄ probe window, ending at N.
const PROBE_WINDOW: u64 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconstructionSummary {
    /// π̃(N).
    pub estimate: f64,
    /// π(N).
    pub reference: u64,
    /// |π̃(N) − π(N)|.
    pub error: f64,
    pub terms: usize,
    pub precision: PrecisionReport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyReport {
    pub n: usize,
    pub config: KernelConfig,
    /// max |(Λ * α)(n) − α(n)·ln n|.
    pub identity_residual: f64,
    pub sieve_precision: PrecisionReport,
    /// `None` for the signed seed.
    pub reconstruction: Option<ReconstructionSummary>,
    /// n ∈ [3, N] where (Ω(n) = 0) ≠ (n prime or n = 4).
    pub correspondence_violations: Vec<u64>,
    pub prime_count: PrimeCountReport,
    /// li(N) + ΔN with s = K_MF.
    pub parity: ParityEstimate,
    /// `None` for the signed seed or an imprecise field.
    pub perfect: Option<PerfectReport>,
    pub psi_final: f64,
    pub trend: TrendFit,
    pub error_samples: Vec<ResonanceErrorSample>,
    pub probe: ProbeStats,
    pub duration_ms: f64,
}

impl SurveyReport {
    pub fn to_json(&self) -> KernelResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| KernelError::Numerical(format!("report serialisation: {e}")))
    }
}

/// Pipeline runner bound to one validated configuration.
pub struct ResonanceSurvey {
    config: KernelConfig,
}

impl ResonanceSurvey {
    pub fn new(config: KernelConfig) -> KernelResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Run every stage for [1, n]. Requires n ≥ 4.
    pub fn run(&self, n: usize) -> KernelResult<SurveyReport> {
        check_bound("n", n as u64, 4)?;
        let start = Instant::now();
        let cfg = &self.config;
        log::info!("survey: starting n={n}");

        let field = sieve(n, &cfg.sieve)?;
        let identity_residual = verify_identity(&field);

        let table = prime_table(n);
        let reference = table.iter().filter(|&&p| p).count() as u64;
        let reconstruction = match field.variant {
            SeedVariant::Signed => None,
            SeedVariant::Unsigned => {
                let rec = reconstruct_from_field(&field, &cfg.reconstruction)?;
                Some(ReconstructionSummary {
                    estimate: rec.pi[n],
                    reference,
                    error: (rec.pi[n] - reference as f64).abs(),
                    terms: rec.terms.len(),
                    precision: rec.precision,
                })
            }
        };

        let omega = synthesize_omega(n)?;
        let correspondence_violations: Vec<u64> = (3..=n)
            .filter(|&i| (omega[i] == 0) != (table[i] || i == 4))
            .map(|i| i as u64)
            .collect();
        if !correspondence_violations.is_empty() {
            log::warn!(
                "survey: {} Omega/primality mismatches below {n}",
                correspondence_violations.len()
            );
        }
        let prime_count = floor_sum_count_from(&omega, n, cfg.reconstruction.summation)?;
        let parity = parity_count(n, cfg.constants.k_mf, cfg.reconstruction.summation)?;

        let perfect = match field.variant {
            SeedVariant::Signed => None,
            SeedVariant::Unsigned => match detect_perfect_in_range(&field, DEFAULT_TOLERANCE) {
                Ok(report) => Some(report),
                Err(KernelError::PrecisionLoss { bound, tolerance }) => {
                    log::warn!(
                        "survey: skipping perfect detection, field bound {bound:.3e} > {tolerance:.3e}"
                    );
                    None
                }
                Err(e) => return Err(e),
            },
        };

        let series = SeriesEvaluator::new(
            cfg.series.clone(),
            cfg.constants,
            CachedResonance::new(TableResonance::new(omega, cfg.omega_convention)),
        );
        let oracle = oracle_for(cfg.dynamics.primality, n as u64);
        let trace = trace_with(n as u64, &series, oracle.as_ref(), cfg.dynamics.stride)?;
        let psi_final = trace.last().unwrap_or(0.0);

        let trend = fit_trend(&trace, cfg.constants.k_mf)?;
        let error_samples = resonance_error(&trace, &trend, ERROR_SAMPLES);

        let window = PROBE_WINDOW.min(n as u64 - 2);
        let probe = probe_window(&series, n as u64 - window + 1, window as usize)?;

        let duration_ms = start.elapsed().as_secs_f64() * 1e3;
        log::info!(
            "survey: n={n} pi~={:?} pi={reference} Psi_E={psi_final:.6} C={:.5} in {duration_ms:.1} ms",
            reconstruction.as_ref().map(|r| r.estimate),
            trend.slope
        );

        Ok(SurveyReport {
            n,
            config: cfg.clone(),
            identity_residual,
            sieve_precision: field.precision,
            reconstruction,
            correspondence_violations,
            prime_count,
            parity,
            perfect,
            psi_final,
            trend,
            error_samples,
            probe,
            duration_ms,
        })
    }
}
