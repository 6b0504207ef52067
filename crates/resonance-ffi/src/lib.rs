// ─────────────────────────────────────────────────────────────────────
// Resonance Kernel — PyO3 FFI Bindings
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
// Note: #[deny(unsafe_code)] not applied — PyO3 proc macros generate
// unsafe blocks internally. All hand-written code in this crate is safe.
//! Python-callable wrappers around the Resonance Kernel.
//!
//! Exposes `KernelConfig`, `RustSpectralSieve`, `RustSeriesEvaluator`,
//! `RustDynamicalTrace`, `RustSurvey` and the free functions
//! `compute_d`, `compute_omega`, `series_t`, `dynamical_trace` and
//! `reconstruct_pi` to the Python plotting and report layers.
//!
//! # FFI Safety
//!
//! - GIL acquired via `Python::with_gil` before every Python callback.
//! - A primality callback that raises or returns a non-bool stops the
//!   trace; its exception is re-raised to the caller.
//! - Every other `KernelError` surfaces as `ValueError` with its message.
//! - All config validated before storage (`KernelConfig::validate()`).
//!
//! Install: `pip install -e crates/resonance-ffi` (requires maturin).
//!
//! Usage from Python:
//! ```python
//! from resonance_kernel import KernelConfig, RustSpectralSieve, RustSurvey
//!
//! field = RustSpectralSieve(10_000)
//! pi = field.reconstruct()["pi"]
//! report = RustSurvey(KernelConfig(summation="compensated")).run(10_000)
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use serde::de::DeserializeOwned;

use resonance_analysis::{
    detect_perfect_in_range, fit_trend, probe_window, resonance_error, ResonanceSurvey,
};
use resonance_core::{
    oracle_for, reconstruct_from_field, sieve, trace_with, verify_identity, CachedResonance,
    DivisorResonance, DynamicalTrace, ExternalOracle, PrimalityOracle, SeriesEvaluator,
    SeriesValue, SpectralField,
};
use resonance_types::{KernelConfig, KernelError, ModelConstants};

fn to_py_err(e: KernelError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// Parse a snake_case enum name through its serde representation.
fn parse_choice<T: DeserializeOwned>(field: &str, value: &str) -> PyResult<T> {
    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .map_err(|_| PyValueError::new_err(format!("invalid {field}: {value:?}")))
}

fn config_or_default(config: Option<PyKernelConfig>) -> KernelConfig {
    config.map(|c| c.inner).unwrap_or_default()
}

// ─── PyKernelConfig ─────────────────────────────────────────────────

/// Python-visible configuration for the Resonance Kernel.
#[pyclass(name = "KernelConfig")]
#[derive(Clone)]
struct PyKernelConfig {
    inner: KernelConfig,
}

#[pymethods]
impl PyKernelConfig {
    #[new]
    #[pyo3(signature = (
        seed_variant = "unsigned",
        omega_convention = "clamped",
        noise_threshold = 1e-9,
        max_iter = 50,
        epsilon = 1e-15,
        use_closed_forms = true,
        summation = "naive",
        stride = 1,
        primality = "sieve",
        legacy_constants = false,
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        seed_variant: &str,
        omega_convention: &str,
        noise_threshold: f64,
        max_iter: u32,
        epsilon: f64,
        use_closed_forms: bool,
        summation: &str,
        stride: usize,
        primality: &str,
        legacy_constants: bool,
    ) -> PyResult<Self> {
        let mut config = KernelConfig {
            omega_convention: parse_choice("omega_convention", omega_convention)?,
            constants: if legacy_constants {
                ModelConstants::legacy()
            } else {
                ModelConstants::default()
            },
            ..KernelConfig::default()
        };
        config.sieve.seed_variant = parse_choice("seed_variant", seed_variant)?;
        config.sieve.noise_threshold = noise_threshold;
        config.reconstruction.noise_threshold = noise_threshold;
        config.reconstruction.summation = parse_choice("summation", summation)?;
        config.series.max_iter = max_iter;
        config.series.epsilon = epsilon;
        config.series.use_closed_forms = use_closed_forms;
        config.dynamics.stride = stride;
        config.dynamics.primality = parse_choice("primality", primality)?;
        config.validate().map_err(to_py_err)?;
        Ok(Self { inner: config })
    }

    /// Construct from JSON string.
    #[staticmethod]
    fn from_json(json: &str) -> PyResult<Self> {
        let config = KernelConfig::from_json(json).map_err(to_py_err)?;
        Ok(Self { inner: config })
    }

    fn to_json(&self) -> PyResult<String> {
        self.inner.to_json().map_err(to_py_err)
    }

    #[getter]
    fn t_p(&self) -> f64 {
        self.inner.constants.t_p
    }

    #[getter]
    fn k_mf(&self) -> f64 {
        self.inner.constants.k_mf
    }

    fn __repr__(&self) -> String {
        format!(
            "KernelConfig(seed={:?}, omega={:?}, max_iter={}, epsilon={:e}, summation={:?})",
            self.inner.sieve.seed_variant,
            self.inner.omega_convention,
            self.inner.series.max_iter,
            self.inner.series.epsilon,
            self.inner.reconstruction.summation
        )
    }
}

// ─── RustSpectralSieve ──────────────────────────────────────────────

/// Λ field for one N, with reconstruction and perfect detection on top.
#[pyclass(name = "RustSpectralSieve")]
struct PySpectralSieve {
    field: SpectralField,
    config: KernelConfig,
}

#[pymethods]
impl PySpectralSieve {
    #[new]
    #[pyo3(signature = (n, config = None))]
    fn new(n: usize, config: Option<PyKernelConfig>) -> PyResult<Self> {
        let config = config_or_default(config);
        let field = sieve(n, &config.sieve).map_err(to_py_err)?;
        Ok(Self { field, config })
    }

    #[getter]
    fn n(&self) -> usize {
        self.field.n
    }

    #[getter]
    fn alpha(&self) -> Vec<f64> {
        self.field.alpha.clone()
    }

    #[getter]
    fn lambda_(&self) -> Vec<f64> {
        self.field.lambda.clone()
    }

    /// True when the field's error bound exceeds the configured tolerance.
    #[getter]
    fn widened(&self) -> bool {
        self.field.precision.widened
    }

    #[getter]
    fn error_bound(&self) -> f64 {
        self.field.precision.total_bound()
    }

    /// Largest residual of the convolution identity.
    fn verify_identity(&self) -> f64 {
        verify_identity(&self.field)
    }

    /// π̃ over [0, N] with its Möbius terms and precision flag.
    fn reconstruct<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let rec = reconstruct_from_field(&self.field, &self.config.reconstruction)
            .map_err(to_py_err)?;
        let terms: Vec<(u32, i8, f64)> = rec.terms.iter().map(|t| (t.k, t.mu, t.weight)).collect();
        let dict = PyDict::new(py);
        dict.set_item("pi", rec.pi)?;
        dict.set_item("terms", terms)?;
        dict.set_item("widened", rec.precision.widened)?;
        dict.set_item("error_bound", rec.precision.total_bound())?;
        Ok(dict)
    }

    /// Verdict for every prime exponent p with 2^p − 1 ≤ N.
    #[pyo3(signature = (tolerance = 1e-4))]
    fn detect_perfect<'py>(
        &self,
        py: Python<'py>,
        tolerance: f64,
    ) -> PyResult<Vec<Bound<'py, PyDict>>> {
        let report = detect_perfect_in_range(&self.field, tolerance).map_err(to_py_err)?;
        report
            .candidates
            .iter()
            .map(|c| {
                let dict = PyDict::new(py);
                dict.set_item("exponent", c.exponent)?;
                dict.set_item("mersenne", c.mersenne)?;
                dict.set_item("tension", c.tension)?;
                dict.set_item("expected", c.expected)?;
                dict.set_item("verdict", format!("{:?}", c.verdict))?;
                dict.set_item("perfect_number", c.perfect_number)?;
                Ok(dict)
            })
            .collect()
    }

    fn __repr__(&self) -> String {
        format!(
            "RustSpectralSieve(n={}, variant={:?}, error_bound={:.3e})",
            self.field.n,
            self.field.variant,
            self.field.precision.total_bound()
        )
    }
}

// ─── RustSeriesEvaluator ────────────────────────────────────────────

/// Memoising T(n) evaluator.
#[pyclass(name = "RustSeriesEvaluator")]
struct PySeriesEvaluator {
    inner: SeriesEvaluator<CachedResonance<DivisorResonance>>,
}

#[pymethods]
impl PySeriesEvaluator {
    #[new]
    #[pyo3(signature = (config = None))]
    fn new(config: Option<PyKernelConfig>) -> Self {
        Self {
            inner: SeriesEvaluator::from_config(&config_or_default(config)),
        }
    }

    /// T(n); a divergent series returns inf.
    fn value(&self, n: u64) -> PyResult<f64> {
        self.inner.value(n).map_err(to_py_err)
    }

    /// T(n); a divergent series raises ValueError.
    fn try_value(&self, n: u64) -> PyResult<f64> {
        self.inner.try_value(n).map_err(to_py_err)
    }

    /// {"status": "converged" | "truncated" | "divergent", "value": float}
    fn evaluate<'py>(&self, py: Python<'py>, n: u64) -> PyResult<Bound<'py, PyDict>> {
        let v = self.inner.evaluate(n).map_err(to_py_err)?;
        let status = match v {
            SeriesValue::Converged(_) => "converged",
            SeriesValue::Truncated(_) => "truncated",
            SeriesValue::Divergent { .. } => "divergent",
        };
        let dict = PyDict::new(py);
        dict.set_item("status", status)?;
        dict.set_item("value", v.as_f64())?;
        Ok(dict)
    }

    /// T̄ statistics over [start, start + length).
    fn probe<'py>(&self, py: Python<'py>, start: u64, length: usize) -> PyResult<Bound<'py, PyDict>> {
        let stats = probe_window(&self.inner, start, length).map_err(to_py_err)?;
        let dict = PyDict::new(py);
        dict.set_item("start", stats.start)?;
        dict.set_item("len", stats.len)?;
        dict.set_item("mean", stats.mean)?;
        dict.set_item("variance", stats.variance)?;
        dict.set_item("projected_c", stats.projected_c)?;
        dict.set_item("target", stats.target)?;
        dict.set_item("deviation", stats.deviation)?;
        Ok(dict)
    }

    fn cache_size(&self) -> usize {
        self.inner.cache().len()
    }
}

// ─── RustDynamicalTrace ─────────────────────────────────────────────

/// Ψ_E trajectory for n = 2..N.
#[pyclass(name = "RustDynamicalTrace")]
struct PyDynamicalTrace {
    inner: DynamicalTrace,
    k_mf: f64,
}

#[pymethods]
impl PyDynamicalTrace {
    /// Run the accumulator.
    ///
    /// Args:
    ///     n: Upper bound N (≥ 3).
    ///     config: Optional KernelConfig (uses defaults if None).
    ///     primality_callback: Optional Callable[[int], bool]. If None,
    ///                         the configured primality backend is used.
    ///                         An exception or non-bool result aborts the
    ///                         trace and is re-raised.
    #[new]
    #[pyo3(signature = (n, config = None, primality_callback = None))]
    fn new(
        n: u64,
        config: Option<PyKernelConfig>,
        primality_callback: Option<PyObject>,
    ) -> PyResult<Self> {
        let cfg = config_or_default(config);
        let raised: Arc<Mutex<Option<PyErr>>> = Arc::new(Mutex::new(None));
        let oracle: Box<dyn PrimalityOracle> = match primality_callback {
            Some(cb) => {
                let slot = Arc::clone(&raised);
                Box::new(ExternalOracle::fallible(move |k: u64| {
                    Python::with_gil(|py| {
                        match cb.call1(py, (k,)).and_then(|r| r.extract::<bool>(py)) {
                            Ok(is_prime) => Ok(is_prime),
                            Err(err) => {
                                let reason = err.to_string();
                                slot.lock().get_or_insert(err);
                                Err(KernelError::Oracle { n: k, reason })
                            }
                        }
                    })
                }))
            }
            None => oracle_for(cfg.dynamics.primality, n),
        };
        let series = SeriesEvaluator::from_config(&cfg);
        let inner = trace_with(n, &series, oracle.as_ref(), cfg.dynamics.stride).map_err(|e| {
            match raised.lock().take() {
                Some(err) if matches!(e, KernelError::Oracle { .. }) => err,
                _ => to_py_err(e),
            }
        })?;
        Ok(Self {
            inner,
            k_mf: cfg.constants.k_mf,
        })
    }

    #[getter]
    fn values(&self) -> Vec<f64> {
        self.inner.values.clone()
    }

    #[getter]
    fn ns(&self) -> Vec<u64> {
        self.inner.points().into_iter().map(|(n, _)| n).collect()
    }

    #[getter]
    fn stride(&self) -> usize {
        self.inner.stride
    }

    /// Least-squares Ψ_E ≈ C·ln(n) + K.
    fn fit_trend<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let fit = fit_trend(&self.inner, self.k_mf).map_err(to_py_err)?;
        let dict = PyDict::new(py);
        dict.set_item("slope", fit.slope)?;
        dict.set_item("intercept", fit.intercept)?;
        dict.set_item("r_squared", fit.r_squared)?;
        dict.set_item("reference_slope", fit.reference_slope)?;
        Ok(dict)
    }

    /// (n, psi, trend, error, ratio) tuples at evenly spaced n ≥ 10.
    #[pyo3(signature = (samples = 20))]
    fn resonance_error(&self, samples: usize) -> PyResult<Vec<(u64, f64, f64, f64, f64)>> {
        let fit = fit_trend(&self.inner, self.k_mf).map_err(to_py_err)?;
        Ok(resonance_error(&self.inner, &fit, samples)
            .into_iter()
            .map(|s| (s.n, s.psi, s.trend, s.error, s.ratio))
            .collect())
    }

    fn __len__(&self) -> usize {
        self.inner.values.len()
    }
}

// ─── RustSurvey ─────────────────────────────────────────────────────

/// Full pipeline for one N.
#[pyclass(name = "RustSurvey")]
struct PySurvey {
    inner: ResonanceSurvey,
}

#[pymethods]
impl PySurvey {
    #[new]
    #[pyo3(signature = (config = None))]
    fn new(config: Option<PyKernelConfig>) -> PyResult<Self> {
        let inner = ResonanceSurvey::new(config_or_default(config)).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Report as a JSON string.
    fn run_json(&self, n: usize) -> PyResult<String> {
        let report = self.inner.run(n).map_err(to_py_err)?;
        report.to_json().map_err(to_py_err)
    }

    /// Report as nested dicts.
    fn run(&self, py: Python<'_>, n: usize) -> PyResult<PyObject> {
        let json = self.run_json(n)?;
        let loads = py.import("json")?.getattr("loads")?;
        Ok(loads.call1((json,))?.unbind())
    }
}

// ─── Free functions ─────────────────────────────────────────────────

/// d(m); 0 for m ≤ 0.
#[pyfunction]
fn compute_d(m: i64) -> u64 {
    resonance_core::compute_d(m)
}

/// Ω(n) = d(2n) − 4, 0 for n < 3.
#[pyfunction]
fn compute_omega(n: u64) -> i64 {
    resonance_core::compute_omega(n)
}

/// T(n) by the general series.
#[pyfunction]
#[pyo3(signature = (n, max_iter = 50, epsilon = 1e-15))]
fn series_t(n: u64, max_iter: u32, epsilon: f64) -> PyResult<f64> {
    resonance_core::series_t(n, max_iter, epsilon).map_err(to_py_err)
}

/// Ψ_E(n) for n = 2..N.
#[pyfunction]
fn dynamical_trace(n: u64) -> PyResult<Vec<f64>> {
    resonance_core::dynamical_trace(n).map_err(to_py_err)
}

/// π̃ over [0, n] from a cumulative potential J.
#[pyfunction]
fn reconstruct_pi(j: Vec<f64>, n: usize) -> PyResult<Vec<f64>> {
    resonance_core::reconstruct_pi(&j, n).map_err(to_py_err)
}

// ─── Module ─────────────────────────────────────────────────────────

#[pymodule]
fn resonance_kernel(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyKernelConfig>()?;
    m.add_class::<PySpectralSieve>()?;
    m.add_class::<PySeriesEvaluator>()?;
    m.add_class::<PyDynamicalTrace>()?;
    m.add_class::<PySurvey>()?;
    m.add_function(wrap_pyfunction!(compute_d, m)?)?;
    m.add_function(wrap_pyfunction!(compute_omega, m)?)?;
    m.add_function(wrap_pyfunction!(series_t, m)?)?;
    m.add_function(wrap_pyfunction!(dynamical_trace, m)?)?;
    m.add_function(wrap_pyfunction!(reconstruct_pi, m)?)?;
    Ok(())
}
