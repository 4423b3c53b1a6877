//! # Modulus Interpolation Engine
//!
//! Resolves a design modulus for a material at a service temperature and
//! loading frequency. Resolution order: full temperature×frequency table,
//! then single-frequency temperature table with a power-law frequency
//! adjustment, then the flat reference modulus with the same power law.
//! A calibration step anchors formula-derived values to known reference
//! points; the engine owns the calibration factors explicitly, keyed by
//! material name, so records stay immutable snapshots.
//!
//! ## Example
//!
//! ```rust
//! use pave_core::materials::normative::NF_P98_086_2019;
//! use pave_core::modulus::ModulusEngine;
//!
//! let engine = ModulusEngine::new();
//! let record = NF_P98_086_2019.get("eb-bbsg1").unwrap();
//! let e = engine.resolve_modulus(record, 10.0, 10.0);
//! assert_eq!(e, 7315.0);
//! ```

pub mod normative;

use crate::materials::normative::legacy_modulus_15c_11hz;
use crate::materials::MaterialRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Outcome of calibrating one material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CalibrationOutcome {
    /// Factor computed from target/raw at the reference conditions
    Calibrated,
    /// Normative bituminous record; table is authoritative, factor forced to 1
    Exempt,
    /// Raw modulus was not positive; factor forced to 1 (non-fatal)
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationEntry {
    pub material_name: String,
    pub factor: f64,
    pub outcome: CalibrationOutcome,
}

/// Result of a [`ModulusEngine::calibrate`] pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationReport {
    pub reference_temperature_c: f64,
    pub reference_frequency_hz: f64,
    pub entries: Vec<CalibrationEntry>,
}

impl CalibrationReport {
    /// Materials whose calibration was skipped (factor defaulted to 1.0)
    pub fn skipped(&self) -> Vec<&CalibrationEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, CalibrationOutcome::Skipped { .. }))
            .collect()
    }
}

/// The interpolation engine. Cheap to clone; holds only calibration factors.
///
/// Calibration mutates the factor map in place and is therefore not
/// reentrant on the same engine from multiple threads; calibrate once up
/// front, then share the engine immutably.
#[derive(Debug, Clone, Default)]
pub struct ModulusEngine {
    calibration: HashMap<String, f64>,
}

impl ModulusEngine {
    pub fn new() -> Self {
        ModulusEngine::default()
    }

    /// Current calibration factor for a material (1.0 when uncalibrated)
    pub fn calibration_factor(&self, material_name: &str) -> f64 {
        self.calibration
            .get(&material_name.to_lowercase())
            .copied()
            .unwrap_or(1.0)
    }

    pub fn set_calibration_factor(&mut self, material_name: &str, factor: f64) {
        self.calibration
            .insert(material_name.to_lowercase(), factor);
    }

    /// Design modulus at (temperature, frequency), calibration applied
    pub fn resolve_modulus(
        &self,
        record: &MaterialRecord,
        temperature_c: f64,
        frequency_hz: f64,
    ) -> f64 {
        self.uncalibrated_modulus(record, temperature_c, frequency_hz)
            * self.calibration_factor(&record.name)
    }

    /// The resolution path without the calibration multiplier.
    ///
    /// The historical (15 °C, 11 Hz) condition keeps its hard-coded
    /// catalogue constants for the legacy material names.
    pub fn uncalibrated_modulus(
        &self,
        record: &MaterialRecord,
        temperature_c: f64,
        frequency_hz: f64,
    ) -> f64 {
        if temperature_c == 15.0 && frequency_hz == 11.0 {
            if let Some(legacy) = legacy_modulus_15c_11hz(&record.name) {
                return legacy;
            }
        }

        if let Some(table) = record.modulus_table.as_ref().filter(|t| !t.is_empty()) {
            if let Some(value) = table.value_at(temperature_c, frequency_hz) {
                return value;
            }
        }

        let adjust = frequency_adjustment(record, frequency_hz);
        match record.temperature_modulus(temperature_c) {
            Some(base) => base * adjust,
            None => record.modulus_mpa * adjust,
        }
    }

    /// Target value the calibration anchors to: the table lookup when a
    /// table exists, else the flat reference modulus unmodified.
    fn calibration_target(
        &self,
        record: &MaterialRecord,
        temperature_c: f64,
        frequency_hz: f64,
    ) -> f64 {
        if record.modulus_table.is_some() || record.e_vs_temperature.is_some() {
            self.uncalibrated_modulus(record, temperature_c, frequency_hz)
        } else {
            record.modulus_mpa
        }
    }

    /// Compute and store calibration factors for every record.
    ///
    /// Normative bituminous materials are exempt (factor 1.0); a
    /// non-positive raw modulus forces the factor to 1.0 and is reported,
    /// never raised as an error.
    pub fn calibrate(
        &mut self,
        records: &[MaterialRecord],
        reference_temperature_c: f64,
        reference_frequency_hz: f64,
    ) -> CalibrationReport {
        let mut entries = Vec::with_capacity(records.len());
        for record in records {
            let (factor, outcome) = if record.is_normative_bituminous() {
                (1.0, CalibrationOutcome::Exempt)
            } else {
                let raw = self.uncalibrated_modulus(
                    record,
                    reference_temperature_c,
                    reference_frequency_hz,
                );
                if raw <= 0.0 {
                    (
                        1.0,
                        CalibrationOutcome::Skipped {
                            reason: format!("raw modulus {} is not positive", raw),
                        },
                    )
                } else {
                    let target = self.calibration_target(
                        record,
                        reference_temperature_c,
                        reference_frequency_hz,
                    );
                    (target / raw, CalibrationOutcome::Calibrated)
                }
            };
            self.set_calibration_factor(&record.name, factor);
            entries.push(CalibrationEntry {
                material_name: record.name.clone(),
                factor,
                outcome,
            });
        }
        CalibrationReport {
            reference_temperature_c,
            reference_frequency_hz,
            entries,
        }
    }
}

/// Power-law frequency adjustment `(f / f_ref)^m`, guarded against
/// non-positive frequencies (treated as the reference frequency).
fn frequency_adjustment(record: &MaterialRecord, frequency_hz: f64) -> f64 {
    if frequency_hz <= 0.0 || record.reference_frequency_hz <= 0.0 {
        return 1.0;
    }
    (frequency_hz / record.reference_frequency_hz).powf(record.frequency_exponent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::normative::NF_P98_086_2019;
    use crate::materials::{MaterialRecord, ModulusTable, TableRow};
    use crate::structure::MaterialFamily;

    fn flat_record(name: &str, modulus: f64) -> MaterialRecord {
        MaterialRecord::new(name, MaterialFamily::Bibliotheque, modulus, 0.35)
    }

    fn table_record() -> MaterialRecord {
        flat_record("with-2d-table", 9999.0).with_modulus_table(ModulusTable::new(vec![
            TableRow {
                temperature_c: 10.0,
                samples: vec![(1.0, 5000.0), (10.0, 7000.0)],
            },
            TableRow {
                temperature_c: 20.0,
                samples: vec![(1.0, 2500.0), (10.0, 3500.0)],
            },
        ]))
    }

    #[test]
    fn test_resolution_order_prefers_2d_table() {
        let engine = ModulusEngine::new();
        let record = table_record();
        // 2D table wins over the flat reference
        assert_eq!(engine.resolve_modulus(&record, 10.0, 10.0), 7000.0);
    }

    #[test]
    fn test_1d_table_with_frequency_power_law() {
        let engine = ModulusEngine::new();
        let record = NF_P98_086_2019.get("eb-bbsg1").unwrap();
        let e_10hz = engine.resolve_modulus(record, 10.0, 10.0);
        assert_eq!(e_10hz, 7315.0);

        // Halving the frequency scales by (0.5)^0.25
        let e_5hz = engine.resolve_modulus(record, 10.0, 5.0);
        assert!((e_5hz - 7315.0 * 0.5f64.powf(0.25)).abs() < 1e-9);
    }

    #[test]
    fn test_flat_reference_with_power_law() {
        let engine = ModulusEngine::new();
        let record = flat_record("flat", 5400.0);
        assert_eq!(engine.resolve_modulus(&record, 25.0, 10.0), 5400.0);
        let e_20hz = engine.resolve_modulus(&record, 25.0, 20.0);
        assert!((e_20hz - 5400.0 * 2.0f64.powf(0.25)).abs() < 1e-9);
    }

    #[test]
    fn test_resolution_bounded_by_table_envelope() {
        let engine = ModulusEngine::new();
        let record = table_record();
        let table = record.modulus_table.as_ref().unwrap();
        let (min, max) = table
            .rows
            .iter()
            .flat_map(|r| r.samples.iter().map(|s| s.1))
            .fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));

        for t in [-30.0, 5.0, 13.0, 22.0, 55.0] {
            for f in [0.2, 1.0, 4.0, 10.0, 60.0] {
                let v = engine.resolve_modulus(&record, t, f);
                assert!(v >= min && v <= max, "E({t},{f}) = {v} left [{min},{max}]");
            }
        }
    }

    #[test]
    fn test_calibration_round_trip() {
        // Flat material: target is the flat value, raw carries the frequency
        // adjustment, so resolve after calibrate lands back on the target.
        let records = vec![flat_record("custom-mix", 4200.0)];
        let mut engine = ModulusEngine::new();
        let report = engine.calibrate(&records, 20.0, 25.0);
        assert!(matches!(
            report.entries[0].outcome,
            CalibrationOutcome::Calibrated
        ));
        let resolved = engine.resolve_modulus(&records[0], 20.0, 25.0);
        assert!((resolved - 4200.0).abs() < 1e-9);
    }

    #[test]
    fn test_calibration_round_trip_legacy_condition() {
        // At the historical (15 °C, 11 Hz) condition the raw path reads the
        // legacy catalogue constant; the round-trip still holds.
        let records = vec![flat_record("Enrobé BBSG 0/14", 5400.0)];
        let mut engine = ModulusEngine::new();
        engine.calibrate(&records, 15.0, 11.0);
        let resolved = engine.resolve_modulus(&records[0], 15.0, 11.0);
        assert!((resolved - 5400.0).abs() < 1e-9);
    }

    #[test]
    fn test_normative_materials_exempt() {
        let library = &*NF_P98_086_2019;
        let mut engine = ModulusEngine::new();
        let report = engine.calibrate(&library.materials, 15.0, 10.0);
        assert!(report
            .entries
            .iter()
            .all(|e| e.outcome == CalibrationOutcome::Exempt && e.factor == 1.0));
    }

    #[test]
    fn test_calibration_skipped_on_nonpositive_raw() {
        let mut broken = flat_record("broken", 0.0);
        broken.modulus_mpa = 0.0;
        let mut engine = ModulusEngine::new();
        let report = engine.calibrate(&[broken.clone()], 15.0, 10.0);
        assert_eq!(report.skipped().len(), 1);
        assert_eq!(engine.calibration_factor("broken"), 1.0);
    }

    #[test]
    fn test_calibration_factor_applied_multiplicatively() {
        let engine = {
            let mut e = ModulusEngine::new();
            e.set_calibration_factor("flat", 1.5);
            e
        };
        let record = flat_record("flat", 1000.0);
        assert_eq!(engine.resolve_modulus(&record, 15.0, 10.0), 1500.0);
    }
}
