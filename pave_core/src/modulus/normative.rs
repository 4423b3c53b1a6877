//! # Normative Bituminous Strategies
//!
//! Alternative resolution modes for the NF P98-086 bituminous class,
//! all anchored on E(15 °C, 10 Hz): the graph-curve model E(θ,f) =
//! E15 · R(θ,10) · ratio(f), the log-frequency 1-3-10 Hz column model, and
//! direct bilinear interpolation over the six-temperature × three-frequency
//! ratio grid. Results are rounded to the nearest integer MPa; frequency is
//! clamped to the normative figure's envelope.
//!
//! Applies only to catalogue materials carrying a frequency-ratio table;
//! everything else falls through to the general engine
//! ([`ModulusEngine`](crate::modulus::ModulusEngine)).

use crate::materials::normative::{
    frequency_ratios, FrequencyRatios, FREQUENCY_MAX_HZ, FREQUENCY_MIN_HZ,
    TABULATED_FREQUENCIES_HZ, TEMPERATURE_GRID,
};
use crate::materials::MaterialRecord;
use serde::{Deserialize, Serialize};

/// Selectable resolution mode for normative bituminous materials
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormativeStrategy {
    /// E15 · R(θ,10Hz) · frequency-ratio read off the normative curve
    GraphCurve,
    /// Tabulated 1/3/10 Hz ratio columns, log-interpolated across frequency
    LogFrequency1310,
    /// Bilinear interpolation over the temperature × frequency ratio grid
    Bilinear,
}

/// Modulus per the selected normative strategy.
///
/// `None` when the material has no normative frequency figure (no ratio
/// table); the caller should use the general resolution path instead.
pub fn normative_modulus(
    record: &MaterialRecord,
    temperature_c: f64,
    frequency_hz: f64,
    strategy: NormativeStrategy,
) -> Option<f64> {
    if !record.is_normative_bituminous() {
        return None;
    }
    let ratios = frequency_ratios(&record.name)?;

    let e15 = record.e15_10();
    if e15 <= 0.0 {
        return None;
    }
    let f = frequency_hz.clamp(FREQUENCY_MIN_HZ, FREQUENCY_MAX_HZ);

    let value = match strategy {
        NormativeStrategy::GraphCurve => graph_curve(record, ratios, e15, temperature_c, f),
        NormativeStrategy::LogFrequency1310 => log_frequency(record, ratios, e15, temperature_c, f),
        NormativeStrategy::Bilinear => bilinear(record, ratios, e15, temperature_c, f),
    };
    Some(value.round())
}

fn r_theta_10(record: &MaterialRecord, temperature_c: f64, e15: f64) -> f64 {
    record
        .temperature_modulus(temperature_c)
        .unwrap_or(record.modulus_mpa)
        / e15
}

/// Interpolate a ratio row across the grid temperature axis, clamped
fn ratio_at_temperature(row: &[f64; 6], temperature_c: f64) -> f64 {
    let grid = &TEMPERATURE_GRID;
    if temperature_c <= grid[0] as f64 {
        return row[0];
    }
    if temperature_c >= grid[5] as f64 {
        return row[5];
    }
    for i in 0..grid.len() - 1 {
        let t0 = grid[i] as f64;
        let t1 = grid[i + 1] as f64;
        if t0 <= temperature_c && temperature_c <= t1 {
            return row[i] + (row[i + 1] - row[i]) * (temperature_c - t0) / (t1 - t0);
        }
    }
    row[0]
}

/// Interpolate a ratio between two frequency nodes: log-log when both
/// endpoint ratios are positive, linear fallback otherwise.
fn interp_frequency(f: f64, f0: f64, f1: f64, r0: f64, r1: f64) -> f64 {
    let t = (f.ln() - f0.ln()) / (f1.ln() - f0.ln());
    if r0 > 0.0 && r1 > 0.0 {
        (r0.ln() + (r1.ln() - r0.ln()) * t).exp()
    } else {
        r0 + (r1 - r0) * t
    }
}

/// Log-log slope fitted through two (frequency, ratio) samples
fn frequency_exponent(r_a: f64, r_b: f64, f_a: f64, f_b: f64) -> f64 {
    if r_a <= 0.0 || r_b <= 0.0 {
        return 0.0;
    }
    (r_b / r_a).ln() / (f_b / f_a).ln()
}

fn graph_curve(
    record: &MaterialRecord,
    ratios: &FrequencyRatios,
    e15: f64,
    temperature_c: f64,
    f: f64,
) -> f64 {
    let r10 = r_theta_10(record, temperature_c, e15);
    let freq_ratio = if f == 10.0 {
        1.0
    } else {
        let r1 = ratio_at_temperature(&ratios.f1, temperature_c);
        let r3 = ratio_at_temperature(&ratios.f3, temperature_c);
        if f <= 1.0 {
            r1 / r10
        } else if f >= 10.0 {
            let m = frequency_exponent(r3, r10, 3.0, 10.0);
            (f / 10.0).powf(m)
        } else if f <= 3.0 {
            interp_frequency(f, 1.0, 3.0, r1, r3) / r10
        } else {
            interp_frequency(f, 3.0, 10.0, r3, r10) / r10
        }
    };
    e15 * r10 * freq_ratio
}

fn log_frequency(
    record: &MaterialRecord,
    ratios: &FrequencyRatios,
    e15: f64,
    temperature_c: f64,
    f: f64,
) -> f64 {
    let r1 = ratio_at_temperature(&ratios.f1, temperature_c);
    let r3 = ratio_at_temperature(&ratios.f3, temperature_c);
    let r10 = r_theta_10(record, temperature_c, e15);

    let r_f = if f <= 1.0 {
        r1
    } else if f == 10.0 {
        r10
    } else if f <= 3.0 {
        interp_frequency(f, 1.0, 3.0, r1, r3)
    } else if f < 10.0 {
        interp_frequency(f, 3.0, 10.0, r3, r10)
    } else {
        let m = frequency_exponent(r3, r10, 3.0, 10.0);
        r10 * (f / 10.0).powf(m)
    };
    e15 * r_f
}

fn bilinear(
    record: &MaterialRecord,
    ratios: &FrequencyRatios,
    e15: f64,
    temperature_c: f64,
    f: f64,
) -> f64 {
    // Ratio columns at the three tabulated frequencies; the 10 Hz column is
    // reconstructed from the E(θ) table at each grid node.
    let f10: [f64; 6] = {
        let mut col = [0.0; 6];
        for (i, t) in TEMPERATURE_GRID.iter().enumerate() {
            col[i] = record
                .temperature_modulus(*t as f64)
                .unwrap_or(record.modulus_mpa)
                / e15;
        }
        col
    };
    let columns: [(f64, &[f64; 6]); 3] = [
        (TABULATED_FREQUENCIES_HZ[0], &ratios.f1),
        (TABULATED_FREQUENCIES_HZ[1], &ratios.f3),
        (TABULATED_FREQUENCIES_HZ[2], &f10),
    ];

    // Clamp the frequency to the grid envelope
    let f = f.clamp(TABULATED_FREQUENCIES_HZ[0], TABULATED_FREQUENCIES_HZ[2]);

    // Exact frequency column: only the temperature axis remains
    if let Some((_, col)) = columns.iter().find(|(cf, _)| *cf == f) {
        return e15 * ratio_at_temperature(col, temperature_c);
    }

    let (lo, hi) = if f < 3.0 {
        (&columns[0], &columns[1])
    } else {
        (&columns[1], &columns[2])
    };
    let r_lo = ratio_at_temperature(lo.1, temperature_c);
    let r_hi = ratio_at_temperature(hi.1, temperature_c);
    let t = (f - lo.0) / (hi.0 - lo.0);
    e15 * (r_lo + (r_hi - r_lo) * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::normative::NF_P98_086_2019;

    fn bbsg1() -> &'static MaterialRecord {
        NF_P98_086_2019.get("eb-bbsg1").unwrap()
    }

    #[test]
    fn test_all_strategies_agree_on_grid_nodes() {
        // At a grid node (10 °C, 10 Hz) every strategy reads the table value
        for strategy in [
            NormativeStrategy::GraphCurve,
            NormativeStrategy::LogFrequency1310,
            NormativeStrategy::Bilinear,
        ] {
            let e = normative_modulus(bbsg1(), 10.0, 10.0, strategy).unwrap();
            assert_eq!(e, 7315.0, "{:?}", strategy);
        }
    }

    #[test]
    fn test_tabulated_1hz_column() {
        // R(10 °C, 1 Hz) = 1.23 relative to E15 = 5500
        let expected = (5500.0 * 1.23f64).round();
        for strategy in [
            NormativeStrategy::GraphCurve,
            NormativeStrategy::LogFrequency1310,
            NormativeStrategy::Bilinear,
        ] {
            let e = normative_modulus(bbsg1(), 10.0, 1.0, strategy).unwrap();
            assert_eq!(e, expected, "{:?}", strategy);
        }
    }

    #[test]
    fn test_frequency_clamped_to_envelope() {
        // Below 1 Hz clamps to the 1 Hz column
        let at_min = normative_modulus(bbsg1(), 10.0, 0.2, NormativeStrategy::GraphCurve).unwrap();
        let at_1hz = normative_modulus(bbsg1(), 10.0, 1.0, NormativeStrategy::GraphCurve).unwrap();
        assert_eq!(at_min, at_1hz);

        // Above 30 Hz clamps to 30 Hz
        let at_50 = normative_modulus(bbsg1(), 10.0, 50.0, NormativeStrategy::GraphCurve).unwrap();
        let at_30 = normative_modulus(bbsg1(), 10.0, 30.0, NormativeStrategy::GraphCurve).unwrap();
        assert_eq!(at_50, at_30);
    }

    #[test]
    fn test_extrapolation_above_10hz_increases_modulus() {
        let at_10 = normative_modulus(bbsg1(), 10.0, 10.0, NormativeStrategy::GraphCurve).unwrap();
        let at_20 = normative_modulus(bbsg1(), 10.0, 20.0, NormativeStrategy::GraphCurve).unwrap();
        assert!(at_20 > at_10);
    }

    #[test]
    fn test_log_interpolation_between_3_and_10hz() {
        // Between nodes the result must sit between the node values
        let at_3 = normative_modulus(bbsg1(), 10.0, 3.0, NormativeStrategy::LogFrequency1310).unwrap();
        let at_10 = normative_modulus(bbsg1(), 10.0, 10.0, NormativeStrategy::LogFrequency1310).unwrap();
        let at_6 = normative_modulus(bbsg1(), 10.0, 6.0, NormativeStrategy::LogFrequency1310).unwrap();
        assert!(at_3 < at_6 && at_6 < at_10);
    }

    #[test]
    fn test_temperature_interpolated_ratio() {
        // 15 °C sits between the 10 and 20 °C grid rows; ratio 1 Hz column
        // interpolates to (1.23 + 0.57) / 2 = 0.90 against E15 = 5500
        let e = normative_modulus(bbsg1(), 15.0, 1.0, NormativeStrategy::Bilinear).unwrap();
        assert_eq!(e, (5500.0 * 0.90f64).round());
    }

    #[test]
    fn test_non_normative_material_falls_through() {
        // "bbm" is a catalogue record without a frequency figure
        let bbm = NF_P98_086_2019.get("bbm").unwrap();
        assert!(normative_modulus(bbm, 15.0, 10.0, NormativeStrategy::GraphCurve).is_none());
    }

    #[test]
    fn test_strategies_agree_within_rounding_between_nodes() {
        // GraphCurve and LogFrequency1310 are algebraically the same model
        for f in [2.0, 5.0, 8.0, 15.0] {
            let a = normative_modulus(bbsg1(), 12.0, f, NormativeStrategy::GraphCurve).unwrap();
            let b =
                normative_modulus(bbsg1(), 12.0, f, NormativeStrategy::LogFrequency1310).unwrap();
            assert!((a - b).abs() <= 1.0, "f = {f}: {a} vs {b}");
        }
    }
}
