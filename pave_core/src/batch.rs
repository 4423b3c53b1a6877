//! # Batch Solving
//!
//! Solves many structures in parallel on a bounded rayon pool. Results come
//! back index-aligned with the input so callers can zip them without
//! bookkeeping; a cooperative [`CancelToken`] checked before each structure
//! turns the remaining entries into `Cancelled` results, never holes.

use crate::errors::{PaveError, PaveResult};
use crate::response::dispatcher::{ComputationMode, ResponseDispatcher};
use crate::response::ResponseSet;
use crate::structure::PavementStructure;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag; cloning shares the flag, not a copy
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Worker thread cap; `None` keeps rayon's default
    pub concurrency: Option<usize>,
    pub mode: ComputationMode,
}

impl Default for BatchOptions {
    fn default() -> Self {
        BatchOptions {
            concurrency: None,
            mode: ComputationMode::RigorousOnly,
        }
    }
}

/// Solve every structure, one result per input in input order.
///
/// Per-structure failures stay per-entry; only a pool construction failure
/// is a batch-level error.
pub fn solve_batch(
    dispatcher: &ResponseDispatcher,
    structures: &[PavementStructure],
    options: &BatchOptions,
    cancel: &CancelToken,
) -> PaveResult<Vec<PaveResult<ResponseSet>>> {
    let solve_one = |(index, structure): (usize, &PavementStructure)| {
        if cancel.is_cancelled() {
            return Err(PaveError::Cancelled { index });
        }
        dispatcher.solve(structure, options.mode)
    };

    match options.concurrency {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| PaveError::Internal {
                    message: format!("failed to build worker pool: {}", e),
                })?;
            Ok(pool.install(|| {
                structures
                    .par_iter()
                    .enumerate()
                    .map(solve_one)
                    .collect()
            }))
        }
        None => Ok(structures.par_iter().enumerate().map(solve_one).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::{Layer, LayerRole, MaterialFamily};

    fn structure(surface_modulus: f64) -> PavementStructure {
        PavementStructure::new(vec![
            Layer::new(
                LayerRole::Surface,
                MaterialFamily::BetonBitumineux,
                0.08,
                surface_modulus,
                0.35,
            ),
            Layer::platform(MaterialFamily::Gnt, 120.0, 0.35),
        ])
    }

    #[test]
    fn test_results_are_index_aligned() {
        let dispatcher = ResponseDispatcher::new();
        let inputs: Vec<_> = (0..16).map(|i| structure(3000.0 + 500.0 * i as f64)).collect();
        let options = BatchOptions {
            concurrency: Some(4),
            mode: ComputationMode::FallbackOnly,
        };
        let results =
            solve_batch(&dispatcher, &inputs, &options, &CancelToken::new()).unwrap();

        assert_eq!(results.len(), inputs.len());
        for (input, result) in inputs.iter().zip(&results) {
            let sequential = dispatcher
                .solve(input, ComputationMode::FallbackOnly)
                .unwrap();
            assert_eq!(result.as_ref().unwrap().layers, sequential.layers);
        }
    }

    #[test]
    fn test_invalid_entry_fails_alone() {
        let dispatcher = ResponseDispatcher::new();
        let inputs = vec![
            structure(5400.0),
            PavementStructure::new(vec![]),
            structure(7000.0),
        ];
        let results = solve_batch(
            &dispatcher,
            &inputs,
            &BatchOptions::default(),
            &CancelToken::new(),
        )
        .unwrap();

        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_pre_cancelled_batch_reports_every_index() {
        let dispatcher = ResponseDispatcher::new();
        let inputs = vec![structure(5400.0), structure(7000.0)];
        let cancel = CancelToken::new();
        cancel.cancel();

        let results =
            solve_batch(&dispatcher, &inputs, &BatchOptions::default(), &cancel).unwrap();
        for (i, result) in results.iter().enumerate() {
            match result {
                Err(PaveError::Cancelled { index }) => assert_eq!(*index, i),
                other => panic!("entry {i}: expected cancellation, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_token_clones_share_the_flag() {
        let token = CancelToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
