//! # Material Records and Libraries
//!
//! A [`MaterialRecord`] carries the laboratory characterization of a material:
//! an optional full temperature×frequency modulus table, an optional
//! single-frequency temperature table, or just a flat reference modulus, plus
//! the fatigue constants used by the admissible-value engine.
//!
//! Libraries are read-only named collections of records. The normative
//! NF P98-086 bituminous catalogue lives in [`normative`].

pub mod normative;

use crate::structure::MaterialFamily;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Catalogue category tabs used by the library browser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialCategory {
    /// Bituminous mixes (matériaux bitumineux)
    Mb,
    /// Hydraulic-binder treated materials
    Mtlh,
    /// Cement concrete
    Beton,
    /// Soils and unbound granular materials
    SolGnt,
}

impl MaterialCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            MaterialCategory::Mb => "MB",
            MaterialCategory::Mtlh => "MTLH",
            MaterialCategory::Beton => "Beton",
            MaterialCategory::SolGnt => "Sol_GNT",
        }
    }
}

/// Provenance of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialStatus {
    /// Shipped normative/catalogue data
    System,
    /// Operator-defined material
    User,
}

/// One sampled row of a temperature×frequency modulus table: modulus (MPa)
/// against frequency (Hz) at a fixed temperature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub temperature_c: f64,
    /// (frequency Hz, modulus MPa) pairs, sorted by frequency
    pub samples: Vec<(f64, f64)>,
}

/// Full two-dimensional modulus characterization.
///
/// Lookup clamps to the table envelope on both axes: within each bounding
/// temperature row the modulus is linearly interpolated across frequency
/// (clamped to the row's range), then the two row results are linearly
/// interpolated across temperature. Exact matches short-circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModulusTable {
    /// Rows sorted by temperature
    pub rows: Vec<TableRow>,
}

impl ModulusTable {
    pub fn new(mut rows: Vec<TableRow>) -> Self {
        rows.sort_by(|a, b| a.temperature_c.total_cmp(&b.temperature_c));
        for row in &mut rows {
            row.samples.sort_by(|a, b| a.0.total_cmp(&b.0));
        }
        ModulusTable { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Clamped bilinear lookup
    pub fn value_at(&self, temperature_c: f64, frequency_hz: f64) -> Option<f64> {
        if self.rows.is_empty() {
            return None;
        }
        let row_value = |row: &TableRow| interp_clamped(&row.samples, frequency_hz);

        let first = &self.rows[0];
        let last = &self.rows[self.rows.len() - 1];
        if temperature_c <= first.temperature_c {
            return row_value(first);
        }
        if temperature_c >= last.temperature_c {
            return row_value(last);
        }
        for pair in self.rows.windows(2) {
            let (lo, hi) = (&pair[0], &pair[1]);
            if temperature_c == lo.temperature_c {
                return row_value(lo);
            }
            if lo.temperature_c <= temperature_c && temperature_c <= hi.temperature_c {
                let v0 = row_value(lo)?;
                let v1 = row_value(hi)?;
                let t = (temperature_c - lo.temperature_c) / (hi.temperature_c - lo.temperature_c);
                return Some(v0 + (v1 - v0) * t);
            }
        }
        row_value(last)
    }
}

/// Linear interpolation over sorted (x, y) pairs, clamped at both ends.
/// Returns `None` for an empty slice.
pub(crate) fn interp_clamped(points: &[(f64, f64)], x: f64) -> Option<f64> {
    match points {
        [] => None,
        [only] => Some(only.1),
        _ => {
            if x <= points[0].0 {
                return Some(points[0].1);
            }
            let last = points[points.len() - 1];
            if x >= last.0 {
                return Some(last.1);
            }
            for pair in points.windows(2) {
                let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
                if x0 <= x && x <= x1 {
                    return Some(y0 + (y1 - y0) * (x - x0) / (x1 - x0));
                }
            }
            Some(last.1)
        }
    }
}

/// Material characterization record (NF P98-086 / Alizé format).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRecord {
    pub name: String,
    pub family: MaterialFamily,
    pub category: MaterialCategory,
    pub status: MaterialStatus,
    /// Flat reference modulus (MPa), used when no table applies
    pub modulus_mpa: f64,
    pub poisson: f64,
    #[serde(default)]
    pub min_thickness_m: Option<f64>,
    #[serde(default)]
    pub max_thickness_m: Option<f64>,
    #[serde(default)]
    pub source: Option<String>,

    // Fatigue law constants (per material, where the standard provides them)
    /// σ6 (MPa), stress criterion base
    #[serde(default)]
    pub sigma6_mpa: Option<f64>,
    /// ε6 at 10 °C (µdef), strain criterion base
    #[serde(default)]
    pub epsi6_10c: Option<f64>,
    /// Positive magnitude of −1/b
    #[serde(default)]
    pub inverse_b: Option<f64>,
    #[serde(default)]
    pub sn: Option<f64>,
    /// Thickness dispersion Sh (m)
    #[serde(default)]
    pub sh_m: Option<f64>,
    #[serde(default)]
    pub kc: Option<f64>,
    #[serde(default)]
    pub kd: Option<f64>,

    /// E(θ) at the reference frequency (10 Hz), keyed by temperature °C
    #[serde(default)]
    pub e_vs_temperature: Option<BTreeMap<i32, f64>>,
    /// Full E(θ, f) characterization; takes precedence over `e_vs_temperature`
    #[serde(default)]
    pub modulus_table: Option<ModulusTable>,
    /// Implicit frequency of `e_vs_temperature` and the power-law anchor (Hz)
    #[serde(default = "default_reference_frequency")]
    pub reference_frequency_hz: f64,
    /// Power-law exponent m in E(f) = E_ref (f/f_ref)^m
    #[serde(default = "default_frequency_exponent")]
    pub frequency_exponent: f64,
}

fn default_reference_frequency() -> f64 {
    10.0
}

fn default_frequency_exponent() -> f64 {
    0.25
}

impl MaterialRecord {
    pub fn new(
        name: impl Into<String>,
        family: MaterialFamily,
        modulus_mpa: f64,
        poisson: f64,
    ) -> Self {
        MaterialRecord {
            name: name.into(),
            family,
            category: MaterialCategory::Mb,
            status: MaterialStatus::User,
            modulus_mpa,
            poisson,
            min_thickness_m: None,
            max_thickness_m: None,
            source: None,
            sigma6_mpa: None,
            epsi6_10c: None,
            inverse_b: None,
            sn: None,
            sh_m: None,
            kc: None,
            kd: None,
            e_vs_temperature: None,
            modulus_table: None,
            reference_frequency_hz: default_reference_frequency(),
            frequency_exponent: default_frequency_exponent(),
        }
    }

    pub fn with_category(mut self, category: MaterialCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_temperature_table(mut self, table: BTreeMap<i32, f64>) -> Self {
        self.e_vs_temperature = Some(table);
        self
    }

    pub fn with_modulus_table(mut self, table: ModulusTable) -> Self {
        self.modulus_table = Some(table);
        self
    }

    /// Normative bituminous records carry the authoritative NF P98-086 curve
    /// and are exempt from calibration.
    pub fn is_normative_bituminous(&self) -> bool {
        self.status == MaterialStatus::System
            && self.category == MaterialCategory::Mb
            && self.e_vs_temperature.is_some()
    }

    /// E(θ) from the single-frequency table, linearly interpolated and
    /// clamped; `None` without a table.
    pub fn temperature_modulus(&self, temperature_c: f64) -> Option<f64> {
        let table = self.e_vs_temperature.as_ref()?;
        let points: Vec<(f64, f64)> = table.iter().map(|(t, e)| (*t as f64, *e)).collect();
        interp_clamped(&points, temperature_c)
    }

    /// E(15 °C, 10 Hz), the normative anchor for the bituminous strategies
    pub fn e15_10(&self) -> f64 {
        self.temperature_modulus(15.0).unwrap_or(self.modulus_mpa)
    }
}

/// Read-only named collection of material records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialLibrary {
    pub name: String,
    pub materials: Vec<MaterialRecord>,
}

impl MaterialLibrary {
    pub fn new(name: impl Into<String>, materials: Vec<MaterialRecord>) -> Self {
        MaterialLibrary {
            name: name.into(),
            materials,
        }
    }

    /// Case-insensitive lookup by material name
    pub fn get(&self, name: &str) -> Option<&MaterialRecord> {
        self.materials
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }

    pub fn filter_by_category(&self, category: MaterialCategory) -> Vec<&MaterialRecord> {
        self.materials
            .iter()
            .filter(|m| m.category == category)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}
