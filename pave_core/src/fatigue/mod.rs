//! # Fatigue and Admissible Values
//!
//! Converts a traffic forecast and a material's fatigue law into the
//! admissible strain or stress each layer may carry over the design life.
//! Cumulative traffic `NE` follows either arithmetic or geometric annual
//! growth; the per-layer damaging traffic applies a CAM aggressiveness
//! coefficient, auto-derived from the material group and traffic band when
//! the operator has not set one. The reliability coefficient Kr folds the
//! target risk through an inverse normal CDF and the dispersion of the
//! fatigue law.
//!
//! Admissible values per criterion:
//! - εt: `ε6 · (NE/1e6)^(−1/B) · Kc · Kr · Ks · Kθ`
//! - σt: `σ6 · (NE/1e6)^(−1/B) · Kc · Kr · Ks · Kd`
//! - εz: `A · NE^(−1/B)` with A = 16000 below 250 000 cycles, 12000 above,
//!   unless overridden.
//!
//! ## Example
//!
//! ```rust
//! use pave_core::fatigue::{GrowthKind, TrafficParameters};
//!
//! let traffic = TrafficParameters::new(450.0, 0.025, GrowthKind::Geometric, 20);
//! let ne = traffic.ne_total();
//! assert!(ne > 365.0 * 450.0 * 20.0); // growth beats the flat projection
//! ```

use crate::materials::MaterialRecord;
use crate::modulus::ModulusEngine;
use crate::response::{round_to, LayerResponse};
use crate::structure::MaterialFamily;
use serde::{Deserialize, Serialize};

/// Thickness-sensitivity constant of the dispersion term (m⁻¹)
const DISPERSION_THICKNESS_CONSTANT: f64 = 2.0;

/// Annual traffic growth law
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrowthKind {
    Arithmetic,
    Geometric,
}

/// Traffic forecast: mean daily heavy traffic and its growth over the
/// design period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficParameters {
    /// Mean annual daily heavy-vehicle count (MJA)
    pub mja: f64,
    /// Annual growth rate as a fraction (0.025 for 2.5 %)
    pub annual_growth_rate: f64,
    pub growth: GrowthKind,
    pub duration_years: u32,
}

impl TrafficParameters {
    pub fn new(mja: f64, annual_growth_rate: f64, growth: GrowthKind, duration_years: u32) -> Self {
        TrafficParameters {
            mja,
            annual_growth_rate,
            growth,
            duration_years,
        }
    }

    /// Cumulative heavy-vehicle count over the design life, rounded to
    /// 2 decimals. Geometric growth degenerates to the flat projection at
    /// rate 0.
    pub fn ne_total(&self) -> f64 {
        let years = self.duration_years as f64;
        let rate = self.annual_growth_rate;
        let growth_factor = match self.growth {
            GrowthKind::Arithmetic => years * (1.0 + (years - 1.0) * rate / 2.0),
            GrowthKind::Geometric => {
                if rate == 0.0 {
                    years
                } else {
                    ((1.0 + rate).powf(years) - 1.0) / rate
                }
            }
        };
        round_to(365.0 * self.mja * growth_factor, 2)
    }

    pub fn band(&self) -> TrafficBand {
        TrafficBand::from_mja(self.mja)
    }
}

/// Traffic class bands from the mean daily heavy-vehicle count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrafficBand {
    T5,
    T4,
    T3Minus,
    T3Plus,
    T2Plus,
}

impl TrafficBand {
    pub const ALL: [TrafficBand; 5] = [
        TrafficBand::T5,
        TrafficBand::T4,
        TrafficBand::T3Minus,
        TrafficBand::T3Plus,
        TrafficBand::T2Plus,
    ];

    pub fn from_mja(mja: f64) -> Self {
        if mja < 25.0 {
            TrafficBand::T5
        } else if mja < 50.0 {
            TrafficBand::T4
        } else if mja < 85.0 {
            TrafficBand::T3Minus
        } else if mja < 150.0 {
            TrafficBand::T3Plus
        } else {
            TrafficBand::T2Plus
        }
    }

    fn index(self) -> usize {
        match self {
            TrafficBand::T5 => 0,
            TrafficBand::T4 => 1,
            TrafficBand::T3Minus => 2,
            TrafficBand::T3Plus => 3,
            TrafficBand::T2Plus => 4,
        }
    }
}

/// Material grouping used by the CAM aggressiveness table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialGroup {
    Bituminous,
    HydraulicBinder,
    CementConcrete,
    TreatedSoil,
    Granular,
}

impl MaterialGroup {
    pub fn from_family(family: MaterialFamily) -> Self {
        match family {
            MaterialFamily::BetonBitumineux => MaterialGroup::Bituminous,
            MaterialFamily::Mtlh => MaterialGroup::HydraulicBinder,
            MaterialFamily::BetonCiment => MaterialGroup::CementConcrete,
            MaterialFamily::Gnt => MaterialGroup::Granular,
            MaterialFamily::Bibliotheque => MaterialGroup::Granular,
        }
    }

    /// Classification by stiffness when no family tag is available
    pub fn from_modulus(modulus_mpa: f64) -> Self {
        if modulus_mpa >= 18000.0 {
            MaterialGroup::CementConcrete
        } else if modulus_mpa >= 5000.0 {
            MaterialGroup::HydraulicBinder
        } else if modulus_mpa >= 1000.0 {
            MaterialGroup::Bituminous
        } else {
            MaterialGroup::Granular
        }
    }
}

/// CAM rows of the non-motorway network table, indexed by traffic band
/// T5, T4, T3⁻, T3⁺, T2+.
const CAM_BITUMINOUS: [f64; 5] = [0.3, 0.3, 0.4, 0.5, 0.5];
const CAM_HYDRAULIC: [f64; 5] = [0.4, 0.5, 0.6, 0.6, 0.8];
const CAM_TREATED_SOIL: [f64; 5] = [0.4, 0.5, 0.7, 0.7, 0.8];
const CAM_GRANULAR: [f64; 5] = [0.4, 0.5, 0.6, 0.75, 1.0];

/// Aggressiveness coefficient for a material group under a traffic band.
/// Cement concrete shares the hydraulic-binder row.
pub fn cam_coefficient(group: MaterialGroup, band: TrafficBand) -> f64 {
    let row = match group {
        MaterialGroup::Bituminous => &CAM_BITUMINOUS,
        MaterialGroup::HydraulicBinder | MaterialGroup::CementConcrete => &CAM_HYDRAULIC,
        MaterialGroup::TreatedSoil => &CAM_TREATED_SOIL,
        MaterialGroup::Granular => &CAM_GRANULAR,
    };
    row[band.index()]
}

/// Inverse standard-normal CDF on the open interval (0, 1).
///
/// Acklam's rational approximation: three regimes (lower tail, central,
/// upper tail), relative error below 1.15e-9 everywhere.
pub fn inverse_normal_cdf(p: f64) -> f64 {
    const P_LOW: f64 = 0.02425;
    const A: [f64; 6] = [
        -3.969683028665376e1,
        2.209460984245205e2,
        -2.759285104469687e2,
        1.383577518672690e2,
        -3.066479806614716e1,
        2.506628277459239,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e1,
        1.615858368580409e2,
        -1.556989798598866e2,
        6.680131188771972e1,
        -1.328068155288572e1,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-3,
        -3.223964580411365e-1,
        -2.400758277161838,
        -2.549732539343734,
        4.374664141464968,
        2.938163982698783,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-3,
        3.224671290700398e-1,
        2.445134137142996,
        3.754408661907416,
    ];

    if p <= P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p < 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -((((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0))
    }
}

/// Reliability coefficient `Kr = 10^(−b·u(p)·δ)`.
///
/// `inverse_b` is the stored positive magnitude B of −1/b; the risk is a
/// percentage clamped away from the CDF's poles.
pub fn kr(risk_percent: f64, inverse_b: f64, sn: f64, sh_m: f64) -> f64 {
    let b = -1.0 / inverse_b;
    let p = (risk_percent / 100.0).clamp(0.0001, 0.9999);
    let u = inverse_normal_cdf(p);
    let delta = (sn * sn + (DISPERSION_THICKNESS_CONSTANT * sh_m / b).powi(2)).sqrt();
    10f64.powf(-b * u * delta)
}

/// Stepped platform-support coefficient from the modulus of the nearest
/// underlying unbound layer.
pub fn ks_from_support_modulus(modulus_mpa: f64) -> f64 {
    if modulus_mpa < 50.0 {
        1.0 / 1.2
    } else if modulus_mpa < 80.0 {
        1.0 / 1.1
    } else if modulus_mpa < 120.0 {
        1.0 / 1.065
    } else {
        1.0
    }
}

/// Thermal equivalence coefficient `sqrt(E(10 °C, 10 Hz) / E(θeq, 10 Hz))`
/// for a bituminous record, resolved through the modulus engine.
///
/// `None` when either modulus is not positive.
pub fn k_theta_auto(
    engine: &ModulusEngine,
    record: &MaterialRecord,
    equivalent_temperature_c: f64,
) -> Option<f64> {
    let e_10 = engine.resolve_modulus(record, 10.0, 10.0);
    let e_theta = engine.resolve_modulus(record, equivalent_temperature_c, 10.0);
    if e_10 <= 0.0 || e_theta <= 0.0 {
        return None;
    }
    Some((e_10 / e_theta).sqrt())
}

/// Verification criterion for a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FatigueCriterion {
    /// Horizontal strain at the bituminous layer bottom
    EpsiT,
    /// Horizontal stress in hydraulic-bound or concrete layers
    SigmaT,
    /// Vertical strain at the top of unbound layers and the platform
    EpsiZ,
}

/// Fatigue law constants and correction coefficients for one layer.
///
/// Kr, the εz amplitude and the CAM are derived unless explicitly set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FatigueParameters {
    pub criterion: FatigueCriterion,
    /// ε6 at 10 °C, 25 Hz (µdef)
    pub epsilon6_microdef: f64,
    /// σ6 (MPa), only meaningful for the σt criterion
    pub sigma6_mpa: f64,
    /// Positive magnitude B of the fatigue slope −1/b
    pub inverse_b: f64,
    /// Fatigue-results standard deviation
    pub sn: f64,
    /// Thickness dispersion (m)
    pub sh_m: f64,
    pub kc: f64,
    pub ks: f64,
    pub k_theta: f64,
    pub kd: f64,
    /// Target risk in percent
    pub risk_percent: f64,
    /// Operator-set aggressiveness; `None` derives from the CAM table
    #[serde(default)]
    pub cam: Option<f64>,
    /// Operator-set εz amplitude A; `None` uses the 16000/12000 default
    #[serde(default)]
    pub amplitude_a: Option<f64>,
}

impl FatigueParameters {
    /// Parameters seeded from a library record; constants the record does
    /// not carry fall back to the common normative bituminous values,
    /// support/thermal corrections default to 1.
    pub fn for_record(record: &MaterialRecord, criterion: FatigueCriterion) -> Self {
        FatigueParameters {
            criterion,
            epsilon6_microdef: record.epsi6_10c.unwrap_or(100.0),
            sigma6_mpa: record.sigma6_mpa.unwrap_or(0.0),
            inverse_b: record.inverse_b.unwrap_or(5.0),
            sn: record.sn.unwrap_or(0.25),
            sh_m: record.sh_m.unwrap_or(0.25),
            kc: record.kc.unwrap_or(1.1),
            ks: 1.0,
            k_theta: 1.0,
            kd: record.kd.unwrap_or(1.0),
            risk_percent: 5.0,
            cam: None,
            amplitude_a: None,
        }
    }

    /// Vertical-strain criterion with its default amplitude law
    pub fn epsi_z(risk_percent: f64, inverse_b: f64) -> Self {
        FatigueParameters {
            criterion: FatigueCriterion::EpsiZ,
            epsilon6_microdef: 0.0,
            sigma6_mpa: 0.0,
            inverse_b,
            sn: 0.0,
            sh_m: 0.0,
            kc: 1.0,
            ks: 1.0,
            k_theta: 1.0,
            kd: 1.0,
            risk_percent,
            cam: None,
            amplitude_a: None,
        }
    }

    pub fn kr(&self) -> f64 {
        kr(self.risk_percent, self.inverse_b, self.sn, self.sh_m)
    }

    /// Damaging traffic for this layer: `NE_total × CAM`
    pub fn layer_ne(&self, traffic: &TrafficParameters, group: MaterialGroup) -> f64 {
        let cam = self
            .cam
            .unwrap_or_else(|| cam_coefficient(group, traffic.band()));
        traffic.ne_total() * cam
    }

    /// Admissible value for the criterion at a damaging traffic `ne`.
    /// µdef for the strain criteria, MPa for σt.
    pub fn admissible(&self, ne: f64) -> f64 {
        let slope = -1.0 / self.inverse_b;
        match self.criterion {
            FatigueCriterion::EpsiT => {
                self.epsilon6_microdef
                    * (ne / 1.0e6).powf(slope)
                    * self.kc
                    * self.kr()
                    * self.ks
                    * self.k_theta
            }
            FatigueCriterion::SigmaT => {
                self.sigma6_mpa * (ne / 1.0e6).powf(slope) * self.kc * self.kr() * self.ks * self.kd
            }
            FatigueCriterion::EpsiZ => {
                let a = self
                    .amplitude_a
                    .unwrap_or(if ne <= 250_000.0 { 16000.0 } else { 12000.0 });
                a * ne.powf(slope)
            }
        }
    }
}

/// Outcome of checking one layer's response against its admissible value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdmissibleCheck {
    pub layer_index: usize,
    pub criterion: FatigueCriterion,
    /// Most unfavorable computed magnitude for the criterion
    pub computed: f64,
    pub admissible: f64,
    pub satisfied: bool,
}

/// Compare a layer response against the admissible value at traffic `ne`
pub fn check_layer(
    response: &LayerResponse,
    params: &FatigueParameters,
    ne: f64,
) -> AdmissibleCheck {
    let computed = match params.criterion {
        FatigueCriterion::EpsiT => response.epsilon_t_critical(),
        FatigueCriterion::SigmaT => response.sigma_t_critical(),
        FatigueCriterion::EpsiZ => response.epsilon_z_critical(),
    };
    let admissible = params.admissible(ne);
    AdmissibleCheck {
        layer_index: response.layer_index,
        criterion: params.criterion,
        computed,
        admissible,
        satisfied: computed <= admissible,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometric_growth_reference() {
        let traffic = TrafficParameters::new(450.0, 0.025, GrowthKind::Geometric, 20);
        let expected = round_to(365.0 * 450.0 * ((1.025f64.powf(20.0) - 1.0) / 0.025), 2);
        assert_eq!(traffic.ne_total(), expected);
    }

    #[test]
    fn test_arithmetic_growth() {
        let traffic = TrafficParameters::new(100.0, 0.02, GrowthKind::Arithmetic, 10);
        let expected = round_to(365.0 * 100.0 * 10.0 * (1.0 + 9.0 * 0.02 / 2.0), 2);
        assert_eq!(traffic.ne_total(), expected);
    }

    #[test]
    fn test_geometric_degenerates_at_zero_rate() {
        let traffic = TrafficParameters::new(200.0, 0.0, GrowthKind::Geometric, 15);
        assert_eq!(traffic.ne_total(), 365.0 * 200.0 * 15.0);
    }

    #[test]
    fn test_traffic_bands() {
        assert_eq!(TrafficBand::from_mja(10.0), TrafficBand::T5);
        assert_eq!(TrafficBand::from_mja(25.0), TrafficBand::T4);
        assert_eq!(TrafficBand::from_mja(84.9), TrafficBand::T3Minus);
        assert_eq!(TrafficBand::from_mja(85.0), TrafficBand::T3Plus);
        assert_eq!(TrafficBand::from_mja(450.0), TrafficBand::T2Plus);
    }

    #[test]
    fn test_cam_table_rows() {
        assert_eq!(
            cam_coefficient(MaterialGroup::Bituminous, TrafficBand::T5),
            0.3
        );
        assert_eq!(
            cam_coefficient(MaterialGroup::Granular, TrafficBand::T2Plus),
            1.0
        );
        assert_eq!(
            cam_coefficient(MaterialGroup::Granular, TrafficBand::T3Plus),
            0.75
        );
        assert_eq!(
            cam_coefficient(MaterialGroup::HydraulicBinder, TrafficBand::T2Plus),
            0.8
        );
        assert_eq!(
            cam_coefficient(MaterialGroup::TreatedSoil, TrafficBand::T3Minus),
            0.7
        );
        // Cement concrete rides the hydraulic row
        assert_eq!(
            cam_coefficient(MaterialGroup::CementConcrete, TrafficBand::T4),
            0.5
        );
    }

    #[test]
    fn test_material_group_from_modulus() {
        assert_eq!(MaterialGroup::from_modulus(23000.0), MaterialGroup::CementConcrete);
        assert_eq!(MaterialGroup::from_modulus(12000.0), MaterialGroup::HydraulicBinder);
        assert_eq!(MaterialGroup::from_modulus(5400.0), MaterialGroup::HydraulicBinder);
        assert_eq!(MaterialGroup::from_modulus(3000.0), MaterialGroup::Bituminous);
        assert_eq!(MaterialGroup::from_modulus(400.0), MaterialGroup::Granular);
    }

    #[test]
    fn test_inverse_normal_cdf_reference_points() {
        assert!(inverse_normal_cdf(0.5).abs() < 1e-9);
        assert!((inverse_normal_cdf(0.975) - 1.959964).abs() < 1e-4);
        assert!((inverse_normal_cdf(0.025) + 1.959964).abs() < 1e-4);
        // Tail regimes stay finite and ordered
        assert!(inverse_normal_cdf(0.0001) < -3.0);
        assert!(inverse_normal_cdf(0.9999) > 3.0);
    }

    #[test]
    fn test_kr_is_one_at_even_odds() {
        // u(0.5) = 0, so the exponent vanishes regardless of dispersion
        assert!((kr(50.0, 5.0, 0.25, 0.01) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_kr_strictly_increasing_in_risk() {
        let risks = [1.0, 2.0, 5.0, 10.0, 25.0, 50.0, 75.0, 95.0];
        let mut previous = f64::NEG_INFINITY;
        for risk in risks {
            let value = kr(risk, 5.0, 0.25, 0.01);
            assert!(value > previous, "Kr({risk}) = {value} not above {previous}");
            previous = value;
        }
    }

    #[test]
    fn test_kr_below_one_for_small_risk() {
        assert!(kr(5.0, 5.0, 0.25, 0.01) < 1.0);
    }

    #[test]
    fn test_ks_steps() {
        assert_eq!(ks_from_support_modulus(40.0), 1.0 / 1.2);
        assert_eq!(ks_from_support_modulus(60.0), 1.0 / 1.1);
        assert_eq!(ks_from_support_modulus(100.0), 1.0 / 1.065);
        assert_eq!(ks_from_support_modulus(120.0), 1.0);
    }

    #[test]
    fn test_epsi_z_reference_value() {
        let params = FatigueParameters::epsi_z(5.0, 4.5045);
        let admissible = params.admissible(200_000.0);
        let expected = 16000.0 * 200_000f64.powf(-0.222);
        assert!((admissible - expected).abs() < 0.5, "{admissible} vs {expected}");
    }

    #[test]
    fn test_epsi_z_amplitude_switches_above_threshold() {
        let params = FatigueParameters::epsi_z(5.0, 4.5045);
        let below = params.admissible(250_000.0);
        let above = params.admissible(250_001.0);
        // Amplitude drops from 16000 to 12000 across the threshold
        assert!(above < below * 0.8);

        let overridden = FatigueParameters {
            amplitude_a: Some(16000.0),
            ..params
        };
        assert!(overridden.admissible(250_001.0) > above);
    }

    #[test]
    fn test_epsi_t_admissible_composition() {
        let params = FatigueParameters {
            criterion: FatigueCriterion::EpsiT,
            epsilon6_microdef: 100.0,
            sigma6_mpa: 0.0,
            inverse_b: 5.0,
            sn: 0.25,
            sh_m: 0.01,
            kc: 1.1,
            ks: 1.0 / 1.1,
            k_theta: 1.2,
            kd: 1.0,
            risk_percent: 10.0,
            cam: None,
            amplitude_a: None,
        };
        let ne = 2.0e6;
        let expected = 100.0
            * (ne / 1.0e6f64).powf(-1.0 / 5.0)
            * 1.1
            * params.kr()
            * (1.0 / 1.1)
            * 1.2;
        assert!((params.admissible(ne) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_layer_ne_user_cam_wins() {
        let traffic = TrafficParameters::new(450.0, 0.0, GrowthKind::Geometric, 20);
        let mut params = FatigueParameters::epsi_z(5.0, 5.0);
        let auto = params.layer_ne(&traffic, MaterialGroup::Bituminous);
        assert_eq!(auto, traffic.ne_total() * 0.5);

        params.cam = Some(0.8);
        assert_eq!(
            params.layer_ne(&traffic, MaterialGroup::Bituminous),
            traffic.ne_total() * 0.8
        );
    }

    #[test]
    fn test_check_layer_reads_critical_magnitude() {
        let mut response = LayerResponse {
            layer_index: 1,
            role: crate::structure::LayerRole::Base,
            sigma_t_top: 0.0,
            sigma_t_bottom: 0.0,
            epsilon_t_top: 10.0,
            epsilon_t_bottom: -80.0,
            sigma_z_top: 0.0,
            sigma_z_bottom: 0.0,
            epsilon_z_top: 0.0,
            epsilon_z_bottom: 0.0,
            deflection_top: 0.0,
            deflection_bottom: 0.0,
        };
        let mut params = FatigueParameters::for_record(
            &MaterialRecord::new("mix", MaterialFamily::BetonBitumineux, 5400.0, 0.35),
            FatigueCriterion::EpsiT,
        );
        params.epsilon6_microdef = 100.0;

        let check = check_layer(&response, &params, 1.0e6);
        assert_eq!(check.computed, 80.0);
        assert_eq!(check.layer_index, 1);

        response.epsilon_t_bottom = -1000.0;
        assert!(!check_layer(&response, &params, 1.0e6).satisfied);
    }

    #[test]
    fn test_k_theta_auto_from_library() {
        use crate::materials::normative::NF_P98_086_2019;
        let engine = ModulusEngine::new();
        let record = NF_P98_086_2019.get("eb-bbsg1").unwrap();
        // Warmer than 10 °C → softer → coefficient above 1
        let k = k_theta_auto(&engine, record, 15.0).unwrap();
        assert!(k > 1.0);
        // At the anchor temperature the coefficient is exactly 1
        let unity = k_theta_auto(&engine, record, 10.0).unwrap();
        assert!((unity - 1.0).abs() < 1e-9);
    }
}
