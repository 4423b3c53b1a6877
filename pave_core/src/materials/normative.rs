//! # NF P98-086 Normative Catalogue
//!
//! Built-in material data: the normative bituminous library (annexe F,
//! Alizé format), the partial frequency-ratio tables for 1 and 3 Hz, the
//! GNT category parameters, and the legacy 15 °C / 11 Hz modulus constants
//! kept for the historical calibration path.
//!
//! Temperature tables are sampled on [`TEMPERATURE_GRID`]; ratios are
//! relative to each material's E(15 °C, 10 Hz).

use crate::errors::{PaveError, PaveResult};
use crate::materials::{MaterialCategory, MaterialLibrary, MaterialRecord, MaterialStatus};
use crate::structure::MaterialFamily;
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, HashMap};

/// Temperature sampling grid (°C) of the normative tables
pub const TEMPERATURE_GRID: [i32; 6] = [-10, 0, 10, 20, 30, 40];

/// Tabulated frequencies (Hz) of the normative frequency figure
pub const TABULATED_FREQUENCIES_HZ: [f64; 3] = [1.0, 3.0, 10.0];

/// Upper frequency bound of the normative figure (Hz)
pub const FREQUENCY_MAX_HZ: f64 = 30.0;

/// Lower frequency bound of the normative figure (Hz)
pub const FREQUENCY_MIN_HZ: f64 = 1.0;

/// E(f)/E(10 Hz) ratio rows at 1 and 3 Hz, one value per grid temperature
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyRatios {
    pub f1: [f64; 6],
    pub f3: [f64; 6],
}

fn bituminous_record(
    name: &str,
    modulus_mpa: f64,
    sh_m: f64,
    e_vs_t: [f64; 6],
) -> MaterialRecord {
    let mut table = BTreeMap::new();
    for (t, e) in TEMPERATURE_GRID.iter().zip(e_vs_t.iter()) {
        table.insert(*t, *e);
    }
    let mut record = MaterialRecord::new(name, MaterialFamily::BetonBitumineux, modulus_mpa, 0.35)
        .with_category(MaterialCategory::Mb)
        .with_temperature_table(table);
    record.status = MaterialStatus::System;
    record.epsi6_10c = Some(100.0);
    record.inverse_b = Some(5.0);
    record.sn = Some(5.0);
    record.sh_m = Some(sh_m);
    record.kc = Some(1.1);
    record.source = Some("NF P98-086 annexe F".to_string());
    record
}

/// NF P98-086 (2019) normative bituminous library
pub static NF_P98_086_2019: Lazy<MaterialLibrary> = Lazy::new(|| {
    MaterialLibrary::new(
        "NFP98_086_2019",
        vec![
            bituminous_record("eb-bbsg1", 1000.0, 0.25, [14800.0, 12000.0, 7315.0, 3685.0, 1300.0, 1000.0]),
            bituminous_record("eb-bbsg2", 1600.0, 0.25, [16000.0, 13500.0, 9310.0, 4690.0, 1600.0, 1000.0]),
            bituminous_record("eb-bbsg3", 2000.0, 0.25, [16000.0, 13500.0, 9310.0, 4690.0, 1800.0, 1000.0]),
            bituminous_record("eb-bbme1", 1200.0, 0.25, [14800.0, 12000.0, 7315.0, 3685.0, 1300.0, 1000.0]),
            bituminous_record("eb-bbme2", 2040.0, 0.25, [19500.0, 18200.0, 11630.0, 7300.0, 3800.0, 2300.0]),
            bituminous_record("bbm", 1000.0, 0.25, [14800.0, 12000.0, 7315.0, 3685.0, 1300.0, 1000.0]),
            bituminous_record("bbm2", 1600.0, 0.25, [16000.0, 13500.0, 9310.0, 4690.0, 1600.0, 1000.0]),
            bituminous_record("acr", 8500.0, 0.25, [8500.0, 8000.0, 4200.0, 1600.0, 800.0, 300.0]),
            bituminous_record("eb-gb1", 1600.0, 0.3, [16000.0, 13500.0, 9310.0, 4690.0, 1600.0, 1000.0]),
            bituminous_record("eb-gb2", 2000.0, 0.3, [19500.0, 18200.0, 11630.0, 7300.0, 3800.0, 2300.0]),
            bituminous_record("eb-gb3", 3200.0, 0.3, [23000.0, 21000.0, 13800.0, 9100.0, 2700.0, 1300.0]),
            bituminous_record("eb-eme1", 14000.0, 0.25, [30000.0, 24000.0, 16940.0, 11600.0, 6000.0, 3000.0]),
            bituminous_record("eb-eme2", 16000.0, 0.25, [30000.0, 24000.0, 16940.0, 11600.0, 6000.0, 3000.0]),
        ],
    )
});

// Partial ratio tables: R(θ,f) for f = 1 and 3 Hz only. The 10 Hz column is
// reconstructed from each material's E(θ) table so the two stay consistent.
static RATIO_TABLE: Lazy<HashMap<&'static str, FrequencyRatios>> = Lazy::new(|| {
    let mut map = HashMap::new();
    let bbsg12 = FrequencyRatios {
        f1: [2.45, 2.01, 1.23, 0.57, 0.22, 0.16],
        f3: [2.57, 2.09, 1.27, 0.60, 0.23, 0.17],
    };
    map.insert("eb-bbsg1", bbsg12);
    map.insert("eb-bbsg2", bbsg12);
    map.insert(
        "eb-bbsg3",
        FrequencyRatios {
            f1: [2.11, 1.89, 1.26, 0.52, 0.21, 0.13],
            f3: [2.24, 1.96, 1.31, 0.54, 0.22, 0.14],
        },
    );
    map.insert(
        "eb-bbme1",
        FrequencyRatios {
            f1: [1.69, 1.44, 0.99, 0.44, 0.21, 0.15],
            f3: [1.85, 1.74, 1.26, 0.60, 0.32, 0.26],
        },
    );
    let bbme23 = FrequencyRatios {
        f1: [1.56, 1.39, 0.99, 0.41, 0.16, 0.08],
        f3: [1.66, 1.51, 1.14, 0.49, 0.25, 0.19],
    };
    map.insert("eb-bbme2", bbme23);
    map.insert("eb-bbme3", bbme23);
    let gb23 = FrequencyRatios {
        f1: [2.23, 1.71, 0.98, 0.42, 0.14, 0.04],
        f3: [2.37, 1.86, 1.13, 0.53, 0.20, 0.07],
    };
    map.insert("eb-gb2", gb23);
    map.insert("eb-gb3", gb23);
    map.insert(
        "eb-gb4",
        FrequencyRatios {
            f1: [2.00, 1.53, 0.97, 0.43, 0.15, 0.04],
            f3: [2.13, 1.66, 1.11, 0.54, 0.22, 0.07],
        },
    );
    let eme12 = FrequencyRatios {
        f1: [1.89, 1.44, 0.90, 0.49, 0.20, 0.08],
        f3: [2.00, 1.57, 1.04, 0.61, 0.29, 0.13],
    };
    map.insert("eb-eme1", eme12);
    map.insert("eb-eme2", eme12);
    map
});

/// Frequency-ratio rows for a normative material name, if tabulated
pub fn frequency_ratios(name: &str) -> Option<&'static FrequencyRatios> {
    let key = name.to_ascii_lowercase();
    RATIO_TABLE.get(key.as_str())
}

/// French catalogue 1998 library (flat moduli, historical reference)
pub static CATALOGUE_FRANCAIS_1998: Lazy<MaterialLibrary> = Lazy::new(|| {
    let mut materials = Vec::new();

    let mut bbsg = MaterialRecord::new("Enrobé BBSG 0/14", MaterialFamily::Bibliotheque, 5400.0, 0.35)
        .with_category(MaterialCategory::Mb);
    bbsg.min_thickness_m = Some(0.06);
    bbsg.max_thickness_m = Some(0.08);

    let mut gc = MaterialRecord::new("Grave Ciment GC", MaterialFamily::Mtlh, 12000.0, 0.25)
        .with_category(MaterialCategory::Mtlh);
    gc.min_thickness_m = Some(0.15);
    gc.max_thickness_m = Some(0.30);

    let mut bc5 = MaterialRecord::new("Béton BC5", MaterialFamily::BetonCiment, 32000.0, 0.20)
        .with_category(MaterialCategory::Beton);
    bc5.min_thickness_m = Some(0.20);
    bc5.max_thickness_m = Some(0.30);

    let mut gnt = MaterialRecord::new("GNT 0/20", MaterialFamily::Gnt, 400.0, 0.35)
        .with_category(MaterialCategory::SolGnt);
    gnt.min_thickness_m = Some(0.15);
    gnt.max_thickness_m = Some(0.50);

    for record in [&mut bbsg, &mut gc, &mut bc5, &mut gnt] {
        record.status = MaterialStatus::System;
        record.source = Some("Catalogue Français 1998".to_string());
    }
    materials.extend([bbsg, gc, bc5, gnt]);
    MaterialLibrary::new("CatalogueFrancais1998", materials)
});

/// Built-in library lookup by catalogue name
pub fn builtin_library(name: &str) -> Option<&'static MaterialLibrary> {
    match name {
        "NFP98_086_2019" => Some(&NF_P98_086_2019),
        "CatalogueFrancais1998" => Some(&CATALOGUE_FRANCAIS_1998),
        _ => None,
    }
}

// Legacy modulus constants at the historical (15 °C, 11 Hz) reference
// condition. Numeric provenance is the 1998 catalogue; kept verbatim.
static LEGACY_MODULUS_15C_11HZ: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("enrobé bbsg 0/14", 5400.0),
        ("grave ciment gc", 12000.0),
        ("béton bc5", 32000.0),
        ("gnt 0/20", 400.0),
    ])
});

/// Historical catalogue modulus at exactly (15 °C, 11 Hz), by material name
pub fn legacy_modulus_15c_11hz(name: &str) -> Option<f64> {
    let key = name.to_lowercase();
    LEGACY_MODULUS_15C_11HZ.get(key.as_str()).copied()
}

/// GNT mechanical category, determined by the platform modulus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GntCategory {
    /// Platform modulus 500-700 MPa
    Cg1,
    /// Platform modulus 300-500 MPa
    Cg2,
    /// Platform modulus 100-300 MPa
    Cg3,
}

/// Stiffness parameters of an unbound granular layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GntParameters {
    /// Modular ratio to the supporting layer
    pub k: f64,
    /// Modulus ceiling (MPa)
    pub e_max_mpa: f64,
}

impl GntCategory {
    /// Classify from the platform modulus (valid range 100-700 MPa)
    pub fn from_platform_modulus(modulus_mpa: f64) -> PaveResult<GntCategory> {
        if (500.0..=700.0).contains(&modulus_mpa) {
            Ok(GntCategory::Cg1)
        } else if (300.0..500.0).contains(&modulus_mpa) {
            Ok(GntCategory::Cg2)
        } else if (100.0..300.0).contains(&modulus_mpa) {
            Ok(GntCategory::Cg3)
        } else {
            Err(PaveError::invalid_input(
                "platform_modulus_mpa",
                modulus_mpa.to_string(),
                "Platform modulus must lie between 100 and 700 MPa for GNT classification",
            ))
        }
    }

    /// k / Emax parameters; thick bituminous structures only admit CG1
    pub fn parameters(&self, thick_bituminous: bool) -> PaveResult<GntParameters> {
        if thick_bituminous {
            return match self {
                GntCategory::Cg1 => Ok(GntParameters { k: 3.0, e_max_mpa: 360.0 }),
                _ => Err(PaveError::invalid_input(
                    "gnt_category",
                    format!("{:?}", self),
                    "Only category CG1 is allowed for thick bituminous pavements",
                )),
            };
        }
        Ok(match self {
            GntCategory::Cg1 => GntParameters { k: 3.0, e_max_mpa: 600.0 },
            GntCategory::Cg2 => GntParameters { k: 2.5, e_max_mpa: 400.0 },
            GntCategory::Cg3 => GntParameters { k: 2.0, e_max_mpa: 200.0 },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normative_library_content() {
        let library = &*NF_P98_086_2019;
        assert_eq!(library.len(), 13);

        let bbsg1 = library.get("eb-bbsg1").unwrap();
        assert_eq!(bbsg1.temperature_modulus(10.0), Some(7315.0));
        assert_eq!(bbsg1.epsi6_10c, Some(100.0));
        assert_eq!(bbsg1.inverse_b, Some(5.0));
        assert_eq!(bbsg1.kc, Some(1.1));
        assert!(bbsg1.is_normative_bituminous());

        // GB family uses the thicker Sh
        assert_eq!(library.get("eb-gb3").unwrap().sh_m, Some(0.3));
        assert_eq!(bbsg1.sh_m, Some(0.25));
    }

    #[test]
    fn test_e15_interpolated_between_grid_nodes() {
        let bbsg1 = NF_P98_086_2019.get("eb-bbsg1").unwrap();
        // Midpoint of the 10 and 20 °C nodes
        assert!((bbsg1.e15_10() - 5500.0).abs() < 1e-9);
    }

    #[test]
    fn test_ratio_table_coverage() {
        assert!(frequency_ratios("eb-bbsg1").is_some());
        assert!(frequency_ratios("EB-GB3").is_some());
        // Materials without a normative frequency figure
        assert!(frequency_ratios("bbm").is_none());
        assert!(frequency_ratios("acr").is_none());
    }

    #[test]
    fn test_ratio_values() {
        let ratios = frequency_ratios("eb-eme1").unwrap();
        assert_eq!(ratios.f1[2], 0.90);
        assert_eq!(ratios.f3[3], 0.61);
    }

    #[test]
    fn test_legacy_constants() {
        assert_eq!(legacy_modulus_15c_11hz("Enrobé BBSG 0/14"), Some(5400.0));
        assert_eq!(legacy_modulus_15c_11hz("Béton BC5"), Some(32000.0));
        assert_eq!(legacy_modulus_15c_11hz("eb-bbsg1"), None);
    }

    #[test]
    fn test_gnt_classification() {
        assert_eq!(GntCategory::from_platform_modulus(600.0).unwrap(), GntCategory::Cg1);
        assert_eq!(GntCategory::from_platform_modulus(350.0).unwrap(), GntCategory::Cg2);
        assert_eq!(GntCategory::from_platform_modulus(120.0).unwrap(), GntCategory::Cg3);
        assert!(GntCategory::from_platform_modulus(50.0).is_err());
    }

    #[test]
    fn test_gnt_parameters() {
        let flexible = GntCategory::Cg2.parameters(false).unwrap();
        assert_eq!(flexible.k, 2.5);
        assert_eq!(flexible.e_max_mpa, 400.0);

        assert!(GntCategory::Cg2.parameters(true).is_err());
        let thick = GntCategory::Cg1.parameters(true).unwrap();
        assert_eq!(thick.e_max_mpa, 360.0);
    }

    #[test]
    fn test_builtin_library_dispatch() {
        assert!(builtin_library("NFP98_086_2019").is_some());
        assert!(builtin_library("CatalogueFrancais1998").is_some());
        assert!(builtin_library("Unknown").is_none());
    }
}
