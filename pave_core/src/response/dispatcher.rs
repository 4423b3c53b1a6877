//! # Backend Selection and Degradation
//!
//! One entry point for solving a structure: try the rigorous backend, and
//! when it is unavailable or fails recoverably, answer with the analytical
//! fallback instead of surfacing the failure. The [`ResponseSet`] records
//! which backend produced the numbers, whether the run was degraded, and
//! the reason, so downstream verdicts can display their provenance.
//!
//! Validation errors are never degraded around: a structure the fallback
//! would reject is rejected up front.

use crate::errors::{PaveError, PaveResult};
use crate::response::backend::ResponseBackend;
use crate::response::fallback::FallbackSolver;
use crate::response::{ResponseSet, SolverBackend};
use crate::structure::PavementStructure;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// How the dispatcher picks a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComputationMode {
    /// Rigorous backend, degrading to the fallback on recoverable failure
    RigorousOnly,
    /// Analytical fallback only; never touches the rigorous backend
    FallbackOnly,
    /// Run both, report the rigorous result annotated with both timings
    Comparison,
}

/// Selects and runs a solver backend.
///
/// The fallback is always available; the rigorous backend is optional and
/// pluggable so hosts without the native library still compute.
pub struct ResponseDispatcher {
    rigorous: Option<Box<dyn ResponseBackend + Send + Sync>>,
    fallback: FallbackSolver,
}

impl Default for ResponseDispatcher {
    fn default() -> Self {
        ResponseDispatcher::new()
    }
}

impl ResponseDispatcher {
    /// A dispatcher with no rigorous backend; every solve uses the fallback
    pub fn new() -> Self {
        ResponseDispatcher {
            rigorous: None,
            fallback: FallbackSolver,
        }
    }

    pub fn with_rigorous(backend: Box<dyn ResponseBackend + Send + Sync>) -> Self {
        ResponseDispatcher {
            rigorous: Some(backend),
            fallback: FallbackSolver,
        }
    }

    pub fn has_rigorous(&self) -> bool {
        self.rigorous.is_some()
    }

    /// Solve a structure under the requested mode.
    ///
    /// Recoverable rigorous failures (backend unavailable or a computation
    /// error) degrade to the fallback; invalid structures are errors in
    /// every mode.
    pub fn solve(
        &self,
        structure: &PavementStructure,
        mode: ComputationMode,
    ) -> PaveResult<ResponseSet> {
        structure.validate()?;
        match mode {
            ComputationMode::FallbackOnly => self.run_fallback(structure, false, None, None),
            ComputationMode::RigorousOnly => match self.try_rigorous(structure) {
                Ok((layers, elapsed)) => Ok(ResponseSet {
                    layers,
                    backend: SolverBackend::Rigorous,
                    degraded: false,
                    message: format!("computed by {}", self.rigorous_name()),
                    rigorous_time_ms: Some(elapsed),
                    fallback_time_ms: None,
                }),
                Err(err) if err.is_recoverable() => {
                    self.run_fallback(structure, true, Some(err), None)
                }
                Err(err) => Err(err),
            },
            ComputationMode::Comparison => match self.try_rigorous(structure) {
                Ok((layers, rigorous_ms)) => {
                    let start = Instant::now();
                    let _ = self.fallback.solve(structure)?;
                    let fallback_ms = elapsed_ms(start);
                    Ok(ResponseSet {
                        layers,
                        backend: SolverBackend::Rigorous,
                        degraded: false,
                        message: format!(
                            "comparison run, {} result retained",
                            self.rigorous_name()
                        ),
                        rigorous_time_ms: Some(rigorous_ms),
                        fallback_time_ms: Some(fallback_ms),
                    })
                }
                Err(err) if err.is_recoverable() => {
                    self.run_fallback(structure, true, Some(err), None)
                }
                Err(err) => Err(err),
            },
        }
    }

    fn rigorous_name(&self) -> &'static str {
        self.rigorous.as_ref().map(|b| b.name()).unwrap_or("none")
    }

    fn try_rigorous(
        &self,
        structure: &PavementStructure,
    ) -> PaveResult<(Vec<crate::response::LayerResponse>, f64)> {
        let backend = self
            .rigorous
            .as_ref()
            .ok_or_else(|| PaveError::backend_unavailable("no rigorous backend configured"))?;
        let start = Instant::now();
        let layers = backend.solve(structure)?;
        Ok((layers, elapsed_ms(start)))
    }

    fn run_fallback(
        &self,
        structure: &PavementStructure,
        degraded: bool,
        cause: Option<PaveError>,
        rigorous_time_ms: Option<f64>,
    ) -> PaveResult<ResponseSet> {
        let start = Instant::now();
        let layers = self.fallback.solve(structure)?;
        let fallback_ms = elapsed_ms(start);
        let message = match cause {
            Some(err) => format!("rigorous backend failed ({}), analytical fallback used", err),
            None => "computed by analytical fallback".to_string(),
        };
        Ok(ResponseSet {
            layers,
            backend: SolverBackend::AnalyticalFallback,
            degraded,
            message,
            rigorous_time_ms,
            fallback_time_ms: Some(fallback_ms),
        })
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
