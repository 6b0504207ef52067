// ─────────────────────────────────────────────────────────────────────
// Resonance Kernel — Analysis
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Consumers of the core fields: Ψ_E trend fitting, perfect-number
//! detection on Λ, the floor-sum prime counter, the parity correction
//! to li(N), Abel summation of the seed, the windowed T̄ probe and the
//! survey that runs them for one N.

pub mod counting;
pub mod parity;
pub mod perfect;
pub mod probe;
pub mod survey;
pub mod trend;

pub use counting::{floor_sum_count, floor_sum_count_from, PrimeCountReport};
pub use perfect::{
    detect_perfect, detect_perfect_in_range, exponents_in_range, PerfectCandidate, PerfectReport,
    Verdict,
};
pub use parity::{
    abel_l_function, parity_correction, parity_count, AbelEvaluation, ParityEstimate,
};
pub use probe::{probe_magnitudes, probe_window, ProbeStats};
pub use survey::{ReconstructionSummary, ResonanceSurvey, SurveyReport};
pub use trend::{fit_trend, resonance_error, ResonanceErrorSample, TrendFit};
