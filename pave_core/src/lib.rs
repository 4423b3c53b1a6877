//! # pave_core - Pavement Structure Design Engine
//!
//! `pave_core` dimensions road pavement structures per the French
//! NF P98-086 method: given an ordered layer stack and a reference wheel
//! load it computes the mechanical response (stresses, strains,
//! deflections) at the top and bottom of every layer, then compares those
//! against fatigue-based admissible values derived from the traffic
//! forecast and the material fatigue laws.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: pure functions over immutable snapshots; recompute-on-
//!   change stays with the caller
//! - **JSON-First**: all public inputs and outputs implement
//!   Serialize/Deserialize
//! - **Rich Errors**: structured error types, not just strings
//! - **Degrade, don't fail**: the rigorous solver backend is optional; the
//!   analytical fallback always answers
//!
//! ## Quick Start
//!
//! ```rust
//! use pave_core::project::Project;
//! use pave_core::response::dispatcher::{ComputationMode, ResponseDispatcher};
//!
//! let project = Project::reference_demo();
//! let dispatcher = ResponseDispatcher::new();
//! let result = dispatcher
//!     .solve(&project.structure, ComputationMode::FallbackOnly)
//!     .unwrap();
//! assert_eq!(result.layers.len(), 4);
//! ```
//!
//! ## Modules
//!
//! - [`structure`] - Layer stack, interfaces, load reference, validation
//! - [`materials`] - Material records and the normative library
//! - [`modulus`] - Design-modulus interpolation and calibration
//! - [`response`] - Mechanical response solver backends and dispatch
//! - [`fatigue`] - Traffic, CAM, reliability and admissible values
//! - [`batch`] - Parallel multi-structure solving
//! - [`project`] - Project container and metadata
//! - [`errors`] - Structured error types

pub mod batch;
pub mod errors;
pub mod fatigue;
pub mod materials;
pub mod modulus;
pub mod project;
pub mod response;
pub mod structure;

// Re-export commonly used types at crate root for convenience
pub use errors::{PaveError, PaveResult};
pub use project::{Project, ProjectMetadata};
pub use response::dispatcher::{ComputationMode, ResponseDispatcher};
pub use response::{LayerResponse, ResponseSet, SolverBackend};
pub use structure::{Layer, LayerRole, LoadReference, PavementStructure};
