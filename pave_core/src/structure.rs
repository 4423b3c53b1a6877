//! # Pavement Structure Model
//!
//! Domain types for a layered pavement structure per NF P98-086: layer roles,
//! material families with their normative envelopes, interface bonding
//! conditions, and the reference wheel load.
//!
//! A structure is an ordered stack of layers. The platform (subgrade) is
//! always last and semi-infinite; every other layer has a finite thickness
//! and a bonding condition to the layer below.
//!
//! ## Example
//!
//! ```rust
//! use pave_core::structure::{Layer, LayerRole, MaterialFamily, PavementStructure};
//!
//! let structure = PavementStructure::new(vec![
//!     Layer::new(LayerRole::Surface, MaterialFamily::BetonBitumineux, 0.06, 7000.0, 0.35),
//!     Layer::new(LayerRole::Base, MaterialFamily::Mtlh, 0.15, 23000.0, 0.25),
//!     Layer::platform(MaterialFamily::Gnt, 120.0, 0.35),
//! ]);
//! assert!(structure.validate().is_ok());
//! ```

use crate::errors::{PaveError, PaveResult};
use serde::{Deserialize, Serialize};

/// Conventional thickness sentinel for the semi-infinite platform layer (m)
pub const PLATFORM_THICKNESS_M: f64 = 1.0e7;

/// Structural role of a layer within the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerRole {
    /// Wearing course (couche de roulement)
    Surface,
    /// Base course
    Base,
    /// Subbase / foundation course
    Subbase,
    /// Semi-infinite supporting platform (subgrade)
    Platform,
}

impl LayerRole {
    pub const ALL: [LayerRole; 4] = [
        LayerRole::Surface,
        LayerRole::Base,
        LayerRole::Subbase,
        LayerRole::Platform,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            LayerRole::Surface => "Surface",
            LayerRole::Base => "Base",
            LayerRole::Subbase => "Subbase",
            LayerRole::Platform => "Platform",
        }
    }
}

/// Material family per the NF P98-086 classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialFamily {
    /// Unbound granular materials and soils (GNT & Sol)
    Gnt,
    /// Materials treated with hydraulic binders (MTLH)
    Mtlh,
    /// Bituminous concrete
    BetonBitumineux,
    /// Cement concrete
    BetonCiment,
    /// Library material (user catalogue, no normative envelope)
    Bibliotheque,
}

impl MaterialFamily {
    pub const ALL: [MaterialFamily; 5] = [
        MaterialFamily::Gnt,
        MaterialFamily::Mtlh,
        MaterialFamily::BetonBitumineux,
        MaterialFamily::BetonCiment,
        MaterialFamily::Bibliotheque,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            MaterialFamily::Gnt => "GNT & Sol",
            MaterialFamily::Mtlh => "MTLH",
            MaterialFamily::BetonBitumineux => "Béton bitumineux",
            MaterialFamily::BetonCiment => "Béton de ciment",
            MaterialFamily::Bibliotheque => "Bibliothèque",
        }
    }

    /// Normative modulus envelope (MPa) for the family
    pub fn modulus_range(&self) -> (f64, f64) {
        match self {
            MaterialFamily::Gnt => (100.0, 1000.0),
            MaterialFamily::Mtlh => (3000.0, 32000.0),
            MaterialFamily::BetonBitumineux => (3000.0, 18000.0),
            MaterialFamily::BetonCiment => (18000.0, 40000.0),
            MaterialFamily::Bibliotheque => (1.0, 100000.0),
        }
    }

    /// Normative Poisson ratio for the family, if the standard fixes one
    pub fn expected_poisson(&self) -> Option<f64> {
        match self {
            MaterialFamily::Gnt => Some(0.35),
            MaterialFamily::BetonBitumineux => Some(0.35),
            MaterialFamily::Mtlh => Some(0.25),
            MaterialFamily::BetonCiment => Some(0.25),
            MaterialFamily::Bibliotheque => None,
        }
    }

    /// Normative thickness envelope (m) for a finite layer of this family
    pub fn thickness_range(&self) -> (f64, f64) {
        match self {
            MaterialFamily::Gnt => (0.10, 0.35),
            MaterialFamily::Mtlh => (0.15, 0.32),
            MaterialFamily::BetonBitumineux => (0.05, 0.16),
            MaterialFamily::BetonCiment => (0.12, 0.45),
            MaterialFamily::Bibliotheque => (0.01, 2.0),
        }
    }
}

/// Shear-transfer continuity condition between two adjacent layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterfaceBond {
    /// Full continuity of stress and displacement (collée)
    Bonded,
    /// Partial shear transfer (semi-collée)
    SemiBonded,
    /// Free slip (décollée)
    Unbonded,
}

impl InterfaceBond {
    pub const ALL: [InterfaceBond; 3] = [
        InterfaceBond::Bonded,
        InterfaceBond::SemiBonded,
        InterfaceBond::Unbonded,
    ];

    /// Integer code used across the foreign solver boundary
    pub fn code(&self) -> i32 {
        match self {
            InterfaceBond::Bonded => 0,
            InterfaceBond::SemiBonded => 1,
            InterfaceBond::Unbonded => 2,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            InterfaceBond::Bonded => "Collée",
            InterfaceBond::SemiBonded => "Semi-collée",
            InterfaceBond::Unbonded => "Décollée",
        }
    }
}

/// Wheel configuration of the reference load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WheelType {
    /// Isolated single wheel
    Single,
    /// Twin wheels at a fixed spacing (French standard dual)
    Twin,
}

/// Reference wheel load per NF P98-086.
///
/// Defaults to the French standard twin-wheel half-axle: 0.662 MPa contact
/// pressure on a 0.125 m radius, wheels 0.375 m apart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadReference {
    pub wheel_type: WheelType,
    /// Contact pressure (MPa)
    pub pressure_mpa: f64,
    /// Contact patch radius (m)
    pub contact_radius_m: f64,
    /// Center-to-center twin wheel spacing (m); ignored for a single wheel
    pub wheel_spacing_m: f64,
}

impl Default for LoadReference {
    fn default() -> Self {
        LoadReference {
            wheel_type: WheelType::Twin,
            pressure_mpa: 0.662,
            contact_radius_m: 0.125,
            wheel_spacing_m: 0.375,
        }
    }
}

impl LoadReference {
    /// Single-wheel load with the standard pressure and radius
    pub fn single_wheel() -> Self {
        LoadReference {
            wheel_type: WheelType::Single,
            wheel_spacing_m: 0.0,
            ..LoadReference::default()
        }
    }

    /// Validate load parameters
    pub fn validate(&self) -> PaveResult<()> {
        if self.pressure_mpa <= 0.0 {
            return Err(PaveError::invalid_input(
                "pressure_mpa",
                self.pressure_mpa.to_string(),
                "Contact pressure must be positive",
            ));
        }
        if self.contact_radius_m <= 0.0 {
            return Err(PaveError::invalid_input(
                "contact_radius_m",
                self.contact_radius_m.to_string(),
                "Contact radius must be positive",
            ));
        }
        if self.wheel_type == WheelType::Twin && self.wheel_spacing_m <= 0.0 {
            return Err(PaveError::invalid_input(
                "wheel_spacing_m",
                self.wheel_spacing_m.to_string(),
                "Twin wheel spacing must be positive",
            ));
        }
        Ok(())
    }
}

/// One layer of the pavement stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub role: LayerRole,
    pub family: MaterialFamily,
    /// Material name as shown in the catalogue (informational)
    #[serde(default)]
    pub material_name: String,
    /// Layer thickness (m); `PLATFORM_THICKNESS_M` for the platform
    pub thickness_m: f64,
    /// Young's modulus (MPa)
    pub modulus_mpa: f64,
    /// Poisson ratio, in (0, 0.5)
    pub poisson: f64,
    /// Bonding to the layer below; `None` for the platform
    #[serde(default)]
    pub interface_below: Option<InterfaceBond>,
}

impl Layer {
    pub fn new(
        role: LayerRole,
        family: MaterialFamily,
        thickness_m: f64,
        modulus_mpa: f64,
        poisson: f64,
    ) -> Self {
        Layer {
            role,
            family,
            material_name: String::new(),
            thickness_m,
            modulus_mpa,
            poisson,
            interface_below: Some(InterfaceBond::Bonded),
        }
    }

    /// Semi-infinite platform layer
    pub fn platform(family: MaterialFamily, modulus_mpa: f64, poisson: f64) -> Self {
        Layer {
            role: LayerRole::Platform,
            family,
            material_name: String::new(),
            thickness_m: PLATFORM_THICKNESS_M,
            modulus_mpa,
            poisson,
            interface_below: None,
        }
    }

    pub fn with_material_name(mut self, name: impl Into<String>) -> Self {
        self.material_name = name.into();
        self
    }

    pub fn with_interface(mut self, bond: InterfaceBond) -> Self {
        self.interface_below = Some(bond);
        self
    }

    pub fn is_platform(&self) -> bool {
        self.role == LayerRole::Platform
    }

    /// Advisory check against the family's normative envelope.
    ///
    /// Returns warnings, never errors: a value outside the envelope is
    /// legal input for the solver, it just deviates from the standard's
    /// typical range. Library materials are unconstrained.
    pub fn check_against_family_envelope(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.family == MaterialFamily::Bibliotheque {
            return warnings;
        }

        let (e_min, e_max) = self.family.modulus_range();
        if self.modulus_mpa < e_min || self.modulus_mpa > e_max {
            warnings.push(format!(
                "modulus {} MPa outside the {} envelope [{}, {}] MPa",
                self.modulus_mpa,
                self.family.display_name(),
                e_min,
                e_max
            ));
        }

        if let Some(expected) = self.family.expected_poisson() {
            if (self.poisson - expected).abs() > 1e-9 {
                warnings.push(format!(
                    "Poisson ratio {} differs from the {} standard value {}",
                    self.poisson,
                    self.family.display_name(),
                    expected
                ));
            }
        }

        if !self.is_platform() {
            let (h_min, h_max) = self.family.thickness_range();
            if self.thickness_m < h_min || self.thickness_m > h_max {
                warnings.push(format!(
                    "thickness {} m outside the {} envelope [{}, {}] m",
                    self.thickness_m,
                    self.family.display_name(),
                    h_min,
                    h_max
                ));
            }
        }
        warnings
    }

    /// Structure coefficient ks per NF P98-086 Section 6.2.2
    pub fn coeff_ks(&self) -> f64 {
        match self.role {
            LayerRole::Surface => match self.family {
                MaterialFamily::BetonBitumineux => 1.0,
                MaterialFamily::Mtlh => 1.15,
                MaterialFamily::BetonCiment => 1.35,
                _ => 1.0,
            },
            LayerRole::Base => match self.family {
                MaterialFamily::Gnt => 1.0,
                MaterialFamily::Mtlh => 1.3,
                MaterialFamily::BetonBitumineux => 1.2,
                MaterialFamily::BetonCiment => 1.5,
                _ => 1.0,
            },
            LayerRole::Subbase => match self.family {
                MaterialFamily::Mtlh => 1.2,
                _ => 1.0,
            },
            LayerRole::Platform => 1.0,
        }
    }

    /// Discontinuity coefficient kd per NF P98-086 Section 6.2.3, with the
    /// thickness adjustment of Section 6.2.3.2
    pub fn coeff_kd(&self) -> f64 {
        let base_kd: f64 = match self.family {
            MaterialFamily::Gnt => 2.0,
            MaterialFamily::Mtlh => 1.5,
            MaterialFamily::BetonBitumineux => 1.0,
            MaterialFamily::BetonCiment => 0.8,
            MaterialFamily::Bibliotheque => 1.8,
        };

        let thickness_multiplier = if self.thickness_m < 0.10 {
            1.2
        } else if self.thickness_m < 0.15 {
            1.1
        } else if self.thickness_m < 0.20 {
            1.0
        } else if self.thickness_m < 0.30 {
            0.95
        } else {
            0.9
        };

        let kd = base_kd * thickness_multiplier;
        // Half away from zero at 2 decimals; the epsilon keeps products
        // like 1.5 × 0.95 = 1.425 (stored as 1.42499…) on the 1.43 side
        (kd * 100.0 + 1e-9).round() / 100.0
    }
}

/// An ordered pavement stack plus its reference load.
///
/// Invariants (enforced by [`validate`](PavementStructure::validate)):
/// exactly one platform layer, positioned last; at least one non-platform
/// layer; positive thickness for all non-platform layers; modulus > 0 and
/// Poisson in (0, 0.5) everywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PavementStructure {
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub load: LoadReference,
}

impl PavementStructure {
    pub fn new(layers: Vec<Layer>) -> Self {
        PavementStructure {
            layers,
            load: LoadReference::default(),
        }
    }

    pub fn with_load(mut self, load: LoadReference) -> Self {
        self.load = load;
        self
    }

    /// Number of layers, platform included
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Validate the structure against the solver contract
    pub fn validate(&self) -> PaveResult<()> {
        if self.layers.len() < 2 {
            return Err(PaveError::invalid_input(
                "layers",
                self.layers.len().to_string(),
                "A structure needs at least one layer above the platform",
            ));
        }

        let platform_count = self.layers.iter().filter(|l| l.is_platform()).count();
        if platform_count != 1 {
            return Err(PaveError::invalid_input(
                "layers",
                platform_count.to_string(),
                "A structure must contain exactly one platform layer",
            ));
        }
        if !self.layers.last().map(Layer::is_platform).unwrap_or(false) {
            return Err(PaveError::invalid_input(
                "layers",
                "platform".to_string(),
                "The platform layer must be last",
            ));
        }

        for (i, layer) in self.layers.iter().enumerate() {
            if layer.modulus_mpa <= 0.0 {
                return Err(PaveError::invalid_input(
                    format!("layers[{}].modulus_mpa", i),
                    layer.modulus_mpa.to_string(),
                    "Modulus must be positive",
                ));
            }
            if layer.poisson <= 0.0 || layer.poisson >= 0.5 {
                return Err(PaveError::invalid_input(
                    format!("layers[{}].poisson", i),
                    layer.poisson.to_string(),
                    "Poisson ratio must lie strictly between 0 and 0.5",
                ));
            }
            if !layer.is_platform() && layer.thickness_m <= 0.0 {
                return Err(PaveError::invalid_input(
                    format!("layers[{}].thickness_m", i),
                    layer.thickness_m.to_string(),
                    "Layer thickness must be positive",
                ));
            }
        }

        self.load.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_structure() -> PavementStructure {
        PavementStructure::new(vec![
            Layer::new(
                LayerRole::Surface,
                MaterialFamily::BetonBitumineux,
                0.06,
                7000.0,
                0.35,
            ),
            Layer::new(LayerRole::Base, MaterialFamily::Mtlh, 0.15, 23000.0, 0.25),
            Layer::new(
                LayerRole::Subbase,
                MaterialFamily::Mtlh,
                0.15,
                23000.0,
                0.25,
            ),
            Layer::platform(MaterialFamily::Gnt, 120.0, 0.35),
        ])
    }

    #[test]
    fn test_valid_structure() {
        assert!(reference_structure().validate().is_ok());
    }

    #[test]
    fn test_platform_must_be_last() {
        let mut structure = reference_structure();
        structure.layers.swap(0, 3);
        let err = structure.validate().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_exactly_one_platform() {
        let mut structure = reference_structure();
        structure.layers[2] = Layer::platform(MaterialFamily::Gnt, 200.0, 0.35);
        assert!(structure.validate().is_err());
    }

    #[test]
    fn test_rejects_poisson_out_of_range() {
        let mut structure = reference_structure();
        structure.layers[0].poisson = 0.5;
        assert!(structure.validate().is_err());
        structure.layers[0].poisson = 0.0;
        assert!(structure.validate().is_err());
    }

    #[test]
    fn test_rejects_nonpositive_modulus() {
        let mut structure = reference_structure();
        structure.layers[1].modulus_mpa = 0.0;
        assert!(structure.validate().is_err());
    }

    #[test]
    fn test_twin_load_needs_spacing() {
        let mut structure = reference_structure();
        structure.load.wheel_spacing_m = 0.0;
        assert!(structure.validate().is_err());
        structure.load = LoadReference::single_wheel();
        assert!(structure.validate().is_ok());
    }

    #[test]
    fn test_family_envelopes() {
        assert_eq!(MaterialFamily::Gnt.modulus_range(), (100.0, 1000.0));
        assert_eq!(MaterialFamily::BetonCiment.expected_poisson(), Some(0.25));
        assert_eq!(MaterialFamily::Bibliotheque.expected_poisson(), None);
    }

    #[test]
    fn test_coefficients() {
        let base = Layer::new(LayerRole::Base, MaterialFamily::Mtlh, 0.25, 23000.0, 0.25);
        assert_eq!(base.coeff_ks(), 1.3);
        // 1.5 base kd scaled by the 0.20-0.30 m thickness bracket lands on
        // the half-cent boundary: 1.425 rounds up to 1.43
        assert_eq!(base.coeff_kd(), 1.43);

        // Another inexact product: 1.8 × 1.1 = 1.98
        let library = Layer::new(LayerRole::Base, MaterialFamily::Bibliotheque, 0.12, 800.0, 0.35);
        assert_eq!(library.coeff_kd(), 1.98);

        let surface = Layer::new(
            LayerRole::Surface,
            MaterialFamily::BetonBitumineux,
            0.06,
            7000.0,
            0.35,
        );
        assert_eq!(surface.coeff_ks(), 1.0);
        assert_eq!(surface.coeff_kd(), 1.2);
    }

    #[test]
    fn test_envelope_check_is_advisory() {
        // 0.06 m bituminous at the standard Poisson: inside the envelope
        let surface = Layer::new(
            LayerRole::Surface,
            MaterialFamily::BetonBitumineux,
            0.06,
            7000.0,
            0.35,
        );
        assert!(surface.check_against_family_envelope().is_empty());

        // Far too stiff and too thick for a bituminous course, but the
        // structure still validates
        let odd = Layer::new(
            LayerRole::Base,
            MaterialFamily::BetonBitumineux,
            0.40,
            25000.0,
            0.35,
        );
        assert_eq!(odd.check_against_family_envelope().len(), 2);
        let structure = PavementStructure::new(vec![
            odd,
            Layer::platform(MaterialFamily::Gnt, 120.0, 0.35),
        ]);
        assert!(structure.validate().is_ok());

        // Library materials are unconstrained
        let library = Layer::new(LayerRole::Base, MaterialFamily::Bibliotheque, 1.5, 50000.0, 0.2);
        assert!(library.check_against_family_envelope().is_empty());
    }

    #[test]
    fn test_interface_codes() {
        assert_eq!(InterfaceBond::Bonded.code(), 0);
        assert_eq!(InterfaceBond::SemiBonded.code(), 1);
        assert_eq!(InterfaceBond::Unbonded.code(), 2);
    }

    #[test]
    fn test_structure_serialization() {
        let structure = reference_structure();
        let json = serde_json::to_string(&structure).unwrap();
        let roundtrip: PavementStructure = serde_json::from_str(&json).unwrap();
        assert_eq!(structure, roundtrip);
    }
}
