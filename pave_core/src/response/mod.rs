//! # Mechanical Response Types
//!
//! Per-layer response of a structure under the reference load: horizontal
//! tensile stress/strain, vertical compressive stress/strain, deflection, at
//! the top and bottom of every layer. The platform reports only a top value;
//! its bottom fields stay zero by convention, never extrapolated.
//!
//! Two interchangeable backends produce these (see [`backend`] and
//! [`fallback`]); [`dispatcher`] selects between them and handles
//! degradation.
//!
//! Sign convention: compression negative for σz, tension positive for σt;
//! strains in µdef, stresses in MPa, deflections in mm.

pub mod backend;
pub mod dispatcher;
pub mod fallback;

use crate::structure::{LayerRole, PavementStructure};
use serde::{Deserialize, Serialize};

/// Solicitation channels in assembly order
pub(crate) const CHANNEL_COUNT: usize = 5;

/// Response of one layer at its top and bottom faces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerResponse {
    pub layer_index: usize,
    pub role: LayerRole,
    /// Horizontal stress σt (MPa)
    pub sigma_t_top: f64,
    pub sigma_t_bottom: f64,
    /// Horizontal strain εt (µdef)
    pub epsilon_t_top: f64,
    pub epsilon_t_bottom: f64,
    /// Vertical stress σz (MPa, compression negative)
    pub sigma_z_top: f64,
    pub sigma_z_bottom: f64,
    /// Vertical strain εz (µdef)
    pub epsilon_z_top: f64,
    pub epsilon_z_bottom: f64,
    /// Deflection w (mm)
    pub deflection_top: f64,
    pub deflection_bottom: f64,
}

impl LayerResponse {
    fn zeroed(layer_index: usize, role: LayerRole) -> Self {
        LayerResponse {
            layer_index,
            role,
            sigma_t_top: 0.0,
            sigma_t_bottom: 0.0,
            epsilon_t_top: 0.0,
            epsilon_t_bottom: 0.0,
            sigma_z_top: 0.0,
            sigma_z_bottom: 0.0,
            epsilon_z_top: 0.0,
            epsilon_z_bottom: 0.0,
            deflection_top: 0.0,
            deflection_bottom: 0.0,
        }
    }

    /// Most unfavorable horizontal strain magnitude of the two faces
    pub fn epsilon_t_critical(&self) -> f64 {
        self.epsilon_t_top.abs().max(self.epsilon_t_bottom.abs())
    }

    pub fn sigma_t_critical(&self) -> f64 {
        self.sigma_t_top.abs().max(self.sigma_t_bottom.abs())
    }

    pub fn epsilon_z_critical(&self) -> f64 {
        self.epsilon_z_top.abs().max(self.epsilon_z_bottom.abs())
    }
}

/// Which backend produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverBackend {
    Rigorous,
    AnalyticalFallback,
}

/// A complete solve result with its provenance annotations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSet {
    pub layers: Vec<LayerResponse>,
    pub backend: SolverBackend,
    /// True when the rigorous backend failed and the fallback answered
    pub degraded: bool,
    /// Human-readable outcome, records any fallback and its reason
    pub message: String,
    #[serde(default)]
    pub rigorous_time_ms: Option<f64>,
    #[serde(default)]
    pub fallback_time_ms: Option<f64>,
}

/// Depths (m) of the `2n − 1` interface points: top and bottom per layer,
/// the semi-infinite platform contributing only its top.
pub(crate) fn interface_depths(structure: &PavementStructure) -> Vec<f64> {
    let n = structure.layers.len();
    let mut depths = vec![0.0; 2 * n - 1];
    let mut cumul = 0.0;
    for i in 0..n {
        depths[2 * i] = cumul;
        if i < n - 1 {
            cumul += structure.layers[i].thickness_m;
            depths[2 * i + 1] = cumul;
        }
    }
    depths
}

/// Round half away from zero to a number of decimals
pub(crate) fn round_to(x: f64, decimals: u32) -> f64 {
    let multiplier = 10f64.powi(decimals as i32);
    (x * multiplier).round() / multiplier
}

/// Decimal precision per channel: strains 1, deflection 2, stresses 3
pub(crate) fn channel_decimals(channel: usize) -> u32 {
    match channel {
        1 | 3 => 1,
        4 => 2,
        _ => 3,
    }
}

/// Distribute the five interface-point channel vectors into per-layer
/// top/bottom pairs. Layer `i` reads indices `2i` and `2i+1`; the platform
/// reads only its top point, bottom stays zero.
pub(crate) fn distribute_channels(
    structure: &PavementStructure,
    sigma_t: &[f64],
    epsilon_t: &[f64],
    sigma_z: &[f64],
    epsilon_z: &[f64],
    deflection: &[f64],
) -> Vec<LayerResponse> {
    let at = |values: &[f64], index: usize| values.get(index).copied().unwrap_or(0.0);

    let mut layers = Vec::with_capacity(structure.layers.len());
    for (i, layer) in structure.layers.iter().enumerate() {
        let mut response = LayerResponse::zeroed(i, layer.role);
        let top = 2 * i;
        response.sigma_t_top = at(sigma_t, top);
        response.epsilon_t_top = at(epsilon_t, top);
        response.sigma_z_top = at(sigma_z, top);
        response.epsilon_z_top = at(epsilon_z, top);
        response.deflection_top = at(deflection, top);
        if !layer.is_platform() {
            let bottom = top + 1;
            response.sigma_t_bottom = at(sigma_t, bottom);
            response.epsilon_t_bottom = at(epsilon_t, bottom);
            response.sigma_z_bottom = at(sigma_z, bottom);
            response.epsilon_z_bottom = at(epsilon_z, bottom);
            response.deflection_bottom = at(deflection, bottom);
        }
        layers.push(response);
    }
    layers
}
