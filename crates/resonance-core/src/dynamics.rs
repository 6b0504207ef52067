// ─────────────────────────────────────────────────────────────────────
// Resonance Kernel — Dynamical Accumulator Ψ_E
// ─────────────────────────────────────────────────────────────────────
//! Sequential charge/discharge process over n = 2, 3, …, N:
//!
//!   Ψ_E(2) = 0
//!   Ψ_E(n) = Ψ_E(n−1) / T_p        n prime      (discharge)
//!   Ψ_E(n) = Ψ_E(n−1) + T(n)       n composite  (charge)
//!
//! Primality comes from the injected oracle, never from Ω.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use resonance_types::{check_bound, KernelConfig, KernelResult};

use crate::primality::{oracle_for, PrimalityOracle};
use crate::resonance::ResonanceSource;
use crate::series::SeriesEvaluator;

/// Sampled Ψ_E trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicalTrace {
    /// First n of the trajectory (always 2).
    pub start: u64,
    /// Last n of the trajectory (N).
    pub end: u64,
    pub stride: usize,
    /// Ψ_E at start, start + stride, …, plus Ψ_E(end).
    pub values: Vec<f64>,
}

impl DynamicalTrace {
    /// (n, Ψ_E(n)) pairs in traversal order.
    pub fn points(&self) -> Vec<(u64, f64)> {
        let last = self.values.len().saturating_sub(1);
        self.values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let n = if i == last {
                    self.end
                } else {
                    self.start + (i * self.stride) as u64
                };
                (n, v)
            })
            .collect()
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }
}

/// One-step-at-a-time Ψ_E state machine.
pub struct DynamicalAccumulator<'a, S> {
    series: &'a SeriesEvaluator<S>,
    oracle: &'a dyn PrimalityOracle,
    t_p: f64,
    n: u64,
    psi: f64,
}

impl<'a, S: ResonanceSource> DynamicalAccumulator<'a, S> {
    /// Start at Ψ_E(2) = 0. The discharge constant is the evaluator's T_p.
    pub fn new(series: &'a SeriesEvaluator<S>, oracle: &'a dyn PrimalityOracle) -> Self {
        Self {
            series,
            oracle,
            t_p: series.constants().t_p,
            n: 2,
            psi: 0.0,
        }
    }

    /// Current (n, Ψ_E(n)).
    pub fn state(&self) -> (u64, f64) {
        (self.n, self.psi)
    }

    /// Advance to n + 1 and return the new Ψ_E.
    ///
    /// On error the state is left at n.
    pub fn step(&mut self) -> KernelResult<f64> {
        let next = self.n + 1;
        let psi = if self.oracle.check(next)? {
            self.psi / self.t_p
        } else {
            self.psi + self.series.value(next)?
        };
        self.n = next;
        self.psi = psi;
        Ok(psi)
    }
}

/// Run the accumulator from 2 to `n` (≥ 3) with the given collaborators.
pub fn trace_with<S: ResonanceSource>(
    n: u64,
    series: &SeriesEvaluator<S>,
    oracle: &dyn PrimalityOracle,
    stride: usize,
) -> KernelResult<DynamicalTrace> {
    check_bound("n", n, 3)?;
    check_bound("stride", stride as u64, 1)?;
    let start = Instant::now();

    let mut acc = DynamicalAccumulator::new(series, oracle);
    let mut values = Vec::with_capacity((n as usize - 1) / stride + 1);
    values.push(0.0);
    for i in 1..(n - 1) {
        let psi = acc.step()?;
        if i as usize % stride == 0 || i == n - 2 {
            values.push(psi);
        }
    }

    log::debug!(
        "trace: n={n} stride={stride} kept={} final={:.6} in {:.3} ms",
        values.len(),
        acc.state().1,
        start.elapsed().as_secs_f64() * 1e3
    );
    Ok(DynamicalTrace {
        start: 2,
        end: n,
        stride,
        values,
    })
}

/// Ψ_E trajectory with the configured series, oracle and stride.
pub fn trace(n: u64, config: &KernelConfig) -> KernelResult<DynamicalTrace> {
    check_bound("n", n, 3)?;
    let series = SeriesEvaluator::from_config(config);
    let oracle = oracle_for(config.dynamics.primality, n);
    trace_with(n, &series, oracle.as_ref(), config.dynamics.stride)
}

/// Ψ_E(n) for n = 2..N with the default configuration.
pub fn dynamical_trace(n: u64) -> KernelResult<Vec<f64>> {
    Ok(trace(n, &KernelConfig::default())?.values)
}
