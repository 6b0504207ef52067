// ─────────────────────────────────────────────────────────────────────
// Resonance Kernel — Types
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Configuration, model constants, error hierarchy and shared report
//! types for the Resonance Kernel.

pub mod config;
pub mod constants;
pub mod error;
pub mod report;

pub use config::{
    DynamicsConfig, KernelConfig, ModelConstants, OmegaConvention, PrimalityBackend,
    ReconstructionConfig, SeedVariant, SeriesConfig, SieveConfig, SummationMode,
};
pub use error::{check_bound, KernelError, KernelResult};
pub use report::{MobiusTerm, PrecisionReport};
