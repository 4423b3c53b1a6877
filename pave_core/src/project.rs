//! # Project Container
//!
//! The `Project` struct is the root container a front-end serializes: the
//! layer stack, the traffic forecast, per-layer verification setups and
//! design settings, wrapped in uuid/timestamp metadata. Projects travel as
//! human-readable JSON.
//!
//! ## Example
//!
//! ```rust
//! use pave_core::project::Project;
//!
//! let project = Project::reference_demo();
//! let json = serde_json::to_string_pretty(&project).unwrap();
//! let roundtrip: Project = serde_json::from_str(&json).unwrap();
//! assert_eq!(roundtrip.structure.layers.len(), 4);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::fatigue::{
    FatigueCriterion, FatigueParameters, GrowthKind, MaterialGroup, TrafficParameters,
};
use crate::response::dispatcher::ComputationMode;
use crate::structure::{InterfaceBond, Layer, LayerRole, MaterialFamily, PavementStructure};

/// Current schema version for project files
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Root project container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub meta: ProjectMetadata,
    pub structure: PavementStructure,
    pub traffic: TrafficParameters,
    /// Verification setup per checked layer; layers without one are not
    /// checked against an admissible value
    pub verifications: Vec<LayerVerificationSetup>,
    pub settings: DesignSettings,
}

impl Project {
    pub fn new(
        name: impl Into<String>,
        engineer: impl Into<String>,
        structure: PavementStructure,
        traffic: TrafficParameters,
    ) -> Self {
        let now = Utc::now();
        Project {
            meta: ProjectMetadata {
                version: SCHEMA_VERSION.to_string(),
                id: Uuid::new_v4(),
                name: name.into(),
                engineer: engineer.into(),
                created: now,
                modified: now,
            },
            structure,
            traffic,
            verifications: Vec::new(),
            settings: DesignSettings::default(),
        }
    }

    /// Update the modified timestamp
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    pub fn add_verification(&mut self, setup: LayerVerificationSetup) {
        self.verifications.push(setup);
        self.touch();
    }

    /// The documented 4-layer verification structure with a typical traffic
    /// forecast: bituminous surface over two bound base layers on a 120 MPa
    /// platform, standard French twin-wheel load.
    pub fn reference_demo() -> Self {
        let structure = PavementStructure::new(vec![
            Layer::new(LayerRole::Surface, MaterialFamily::BetonBitumineux, 0.06, 7000.0, 0.35)
                .with_material_name("eb-bbsg1"),
            Layer::new(LayerRole::Base, MaterialFamily::Mtlh, 0.15, 23000.0, 0.25)
                .with_interface(InterfaceBond::SemiBonded),
            Layer::new(LayerRole::Subbase, MaterialFamily::Mtlh, 0.15, 23000.0, 0.25),
            Layer::platform(MaterialFamily::Gnt, 120.0, 0.35),
        ]);
        let traffic = TrafficParameters::new(450.0, 0.025, GrowthKind::Geometric, 20);

        let mut project = Project::new("Reference verification", "", structure, traffic);
        project.add_verification(LayerVerificationSetup {
            layer_index: 0,
            group: Some(MaterialGroup::Bituminous),
            params: FatigueParameters {
                criterion: FatigueCriterion::EpsiT,
                epsilon6_microdef: 100.0,
                sigma6_mpa: 0.0,
                inverse_b: 5.0,
                sn: 0.25,
                sh_m: 0.25,
                kc: 1.1,
                ks: 1.0,
                k_theta: 1.0,
                kd: 1.0,
                risk_percent: 5.0,
                cam: None,
                amplitude_a: None,
            },
        });
        project.add_verification(LayerVerificationSetup {
            layer_index: 3,
            group: Some(MaterialGroup::Granular),
            params: FatigueParameters::epsi_z(5.0, 4.5045),
        });
        project
    }
}

/// Project metadata stored in the file header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,
    pub id: Uuid,
    pub name: String,
    pub engineer: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// Verification setup attached to one layer of the structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerVerificationSetup {
    pub layer_index: usize,
    /// CAM material group override; `None` derives it from the layer family
    #[serde(default)]
    pub group: Option<MaterialGroup>,
    pub params: FatigueParameters,
}

impl LayerVerificationSetup {
    /// Group used for the CAM lookup, falling back to the layer family
    pub fn resolved_group(&self, structure: &PavementStructure) -> MaterialGroup {
        self.group.unwrap_or_else(|| {
            structure
                .layers
                .get(self.layer_index)
                .map(|l| MaterialGroup::from_family(l.family))
                .unwrap_or(MaterialGroup::Granular)
        })
    }
}

/// Design-wide solver and service-condition settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignSettings {
    pub mode: ComputationMode,
    /// Equivalent service temperature (°C)
    pub equivalent_temperature_c: f64,
    /// Loading frequency (Hz)
    pub frequency_hz: f64,
}

impl Default for DesignSettings {
    fn default() -> Self {
        DesignSettings {
            mode: ComputationMode::RigorousOnly,
            equivalent_temperature_c: 15.0,
            frequency_hz: 10.0,
        }
    }
}
