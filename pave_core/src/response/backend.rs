//! # Rigorous Backend Boundary
//!
//! The rigorous solver is an external native library implementing layered
//! elastic theory with a transmission/reflection matrix formulation (stable
//! at high modulus×thickness products). This module defines the strategy
//! trait both backends satisfy and the fixed-layout foreign-function
//! contract: `#[repr(C)]` input/output structures, function pointers bound
//! by the embedding application, and the ownership rule that output arrays
//! belong to the backend and are released exactly once.
//!
//! No loader lives here: the embedder resolves the symbols and hands them
//! over as a [`NativeApi`]. An unbound adapter reports
//! `BackendUnavailable`, which the dispatcher turns into a fallback run.

use crate::errors::{PaveError, PaveResult};
use crate::response::{distribute_channels, interface_depths, LayerResponse};
use crate::structure::{InterfaceBond, PavementStructure, WheelType};
use std::ffi::{c_char, CStr};

/// Return code for a successful native call
pub const PAVEMENT_SUCCESS: i32 = 0;

/// Fixed-layout calculation input. Array pointers must stay valid for the
/// duration of the call only.
#[repr(C)]
#[derive(Debug)]
pub struct PavementInputC {
    pub layer_count: i32,
    /// Poisson ratios, `layer_count` elements
    pub poisson_ratio: *const f64,
    /// Young's moduli (MPa), `layer_count` elements
    pub young_modulus_mpa: *const f64,
    /// Thicknesses (m), `layer_count` elements
    pub thickness_m: *const f64,
    /// Interface bonding codes, `layer_count - 1` elements
    pub interface_bond: *const i32,
    /// 0 = single wheel, 1 = twin wheels
    pub wheel_type: i32,
    pub pressure_mpa: f64,
    pub wheel_radius_m: f64,
    pub wheel_spacing_m: f64,
    /// Number of requested depths
    pub nz: i32,
    /// Calculation depths (m), `nz` elements
    pub z_coords_m: *const f64,
}

/// Fixed-layout calculation output. The five result arrays are allocated by
/// the backend and must be released with the backend's free function after
/// copying, exactly once, on every path.
#[repr(C)]
#[derive(Debug)]
pub struct PavementOutputC {
    /// 1 on success, 0 otherwise
    pub success: i32,
    pub error_code: i32,
    /// Number of result points (matches input `nz` when successful)
    pub nz: i32,
    pub calculation_time_ms: f64,
    pub sigma_t_mpa: *mut f64,
    pub epsilon_t_microdef: *mut f64,
    pub sigma_z_mpa: *mut f64,
    pub epsilon_z_microdef: *mut f64,
    pub deflection_mm: *mut f64,
}

impl PavementOutputC {
    /// An output ready to be populated by the backend
    pub fn zeroed() -> Self {
        PavementOutputC {
            success: 0,
            error_code: 0,
            nz: 0,
            calculation_time_ms: 0.0,
            sigma_t_mpa: std::ptr::null_mut(),
            epsilon_t_microdef: std::ptr::null_mut(),
            sigma_z_mpa: std::ptr::null_mut(),
            epsilon_z_microdef: std::ptr::null_mut(),
            deflection_mm: std::ptr::null_mut(),
        }
    }
}

pub type CalculateFn = unsafe extern "C" fn(*const PavementInputC, *mut PavementOutputC) -> i32;
pub type FreeOutputFn = unsafe extern "C" fn(*mut PavementOutputC);
pub type VersionFn = unsafe extern "C" fn() -> *const c_char;
pub type LastErrorFn = unsafe extern "C" fn() -> *const c_char;

/// Bound symbols of the native calculation library.
///
/// `version` and `last_error` return statically allocated, thread-local-safe
/// strings owned by the library.
#[derive(Clone, Copy)]
pub struct NativeApi {
    pub calculate: CalculateFn,
    pub free_output: FreeOutputFn,
    pub version: VersionFn,
    pub last_error: LastErrorFn,
}

/// Strategy interface both solver backends implement
pub trait ResponseBackend {
    fn name(&self) -> &'static str;

    /// Compute per-layer responses for a structure; validation errors are
    /// fatal, backend errors are recoverable by the dispatcher.
    fn solve(&self, structure: &PavementStructure) -> PaveResult<Vec<LayerResponse>>;
}

/// Adapter over the native library symbols. Construct unbound when the
/// library could not be loaded; every solve then reports
/// `BackendUnavailable` and the dispatcher degrades to the fallback.
pub struct NativeBackendAdapter {
    api: Option<NativeApi>,
}

impl NativeBackendAdapter {
    pub fn unbound() -> Self {
        NativeBackendAdapter { api: None }
    }

    pub fn with_api(api: NativeApi) -> Self {
        NativeBackendAdapter { api: Some(api) }
    }

    pub fn is_available(&self) -> bool {
        self.api.is_some()
    }

    /// Library version string, when bound
    pub fn version(&self) -> Option<String> {
        let api = self.api.as_ref()?;
        Some(read_c_string(unsafe { (api.version)() }))
    }

    fn last_error_message(api: &NativeApi) -> String {
        let message = read_c_string(unsafe { (api.last_error)() });
        if message.is_empty() {
            "native backend reported failure without detail".to_string()
        } else {
            message
        }
    }
}

fn read_c_string(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

/// Releases the backend-owned output arrays on drop, so the free happens
/// exactly once on success and error paths alike.
struct OutputGuard<'a> {
    api: &'a NativeApi,
    output: *mut PavementOutputC,
}

impl Drop for OutputGuard<'_> {
    fn drop(&mut self) {
        unsafe { (self.api.free_output)(self.output) };
    }
}

impl ResponseBackend for NativeBackendAdapter {
    fn name(&self) -> &'static str {
        "native-rigorous"
    }

    fn solve(&self, structure: &PavementStructure) -> PaveResult<Vec<LayerResponse>> {
        structure.validate()?;
        let api = self
            .api
            .as_ref()
            .ok_or_else(|| PaveError::backend_unavailable("no native library bound"))?;

        let poisson: Vec<f64> = structure.layers.iter().map(|l| l.poisson).collect();
        let young: Vec<f64> = structure.layers.iter().map(|l| l.modulus_mpa).collect();
        let thickness: Vec<f64> = structure.layers.iter().map(|l| l.thickness_m).collect();
        let bonds: Vec<i32> = structure.layers[..structure.layers.len() - 1]
            .iter()
            .map(|l| l.interface_below.unwrap_or(InterfaceBond::Bonded).code())
            .collect();
        let depths = interface_depths(structure);

        let input = PavementInputC {
            layer_count: structure.layers.len() as i32,
            poisson_ratio: poisson.as_ptr(),
            young_modulus_mpa: young.as_ptr(),
            thickness_m: thickness.as_ptr(),
            interface_bond: bonds.as_ptr(),
            wheel_type: match structure.load.wheel_type {
                WheelType::Single => 0,
                WheelType::Twin => 1,
            },
            pressure_mpa: structure.load.pressure_mpa,
            wheel_radius_m: structure.load.contact_radius_m,
            wheel_spacing_m: structure.load.wheel_spacing_m,
            nz: depths.len() as i32,
            z_coords_m: depths.as_ptr(),
        };

        let mut output = PavementOutputC::zeroed();
        let rc = unsafe { (api.calculate)(&input, &mut output) };
        let guard = OutputGuard {
            api,
            output: &mut output,
        };

        if rc != PAVEMENT_SUCCESS || output.success == 0 {
            let code = if output.error_code != 0 {
                output.error_code
            } else {
                rc
            };
            return Err(PaveError::backend_computation(
                code,
                Self::last_error_message(api),
            ));
        }
        if output.nz as usize != depths.len() {
            return Err(PaveError::backend_computation(
                output.error_code,
                format!(
                    "native backend returned {} points, expected {}",
                    output.nz,
                    depths.len()
                ),
            ));
        }

        let copy_channel = |ptr: *const f64, name: &str| -> PaveResult<Vec<f64>> {
            if ptr.is_null() {
                return Err(PaveError::backend_computation(
                    output.error_code,
                    format!("native backend returned a null {} array", name),
                ));
            }
            Ok(unsafe { std::slice::from_raw_parts(ptr, depths.len()) }.to_vec())
        };

        let sigma_t = copy_channel(output.sigma_t_mpa, "sigma_t")?;
        let epsilon_t = copy_channel(output.epsilon_t_microdef, "epsilon_t")?;
        let sigma_z = copy_channel(output.sigma_z_mpa, "sigma_z")?;
        let epsilon_z = copy_channel(output.epsilon_z_microdef, "epsilon_z")?;
        let deflection = copy_channel(output.deflection_mm, "deflection")?;
        drop(guard);

        Ok(distribute_channels(
            structure,
            &sigma_t,
            &epsilon_t,
            &sigma_z,
            &epsilon_z,
            &deflection,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::{Layer, LayerRole, MaterialFamily};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn two_layer_structure() -> PavementStructure {
        PavementStructure::new(vec![
            Layer::new(LayerRole::Surface, MaterialFamily::BetonBitumineux, 0.08, 5400.0, 0.35),
            Layer::platform(MaterialFamily::Gnt, 120.0, 0.35),
        ])
    }

    static FREE_CALLS_OK: AtomicUsize = AtomicUsize::new(0);
    static FREE_CALLS_FAIL: AtomicUsize = AtomicUsize::new(0);

    fn leak_array(value: f64, n: usize) -> *mut f64 {
        let mut data = vec![value; n].into_boxed_slice();
        let ptr = data.as_mut_ptr();
        std::mem::forget(data);
        ptr
    }

    unsafe fn release_arrays(output: *mut PavementOutputC) {
        let out = &mut *output;
        let n = out.nz as usize;
        for ptr in [
            &mut out.sigma_t_mpa,
            &mut out.epsilon_t_microdef,
            &mut out.sigma_z_mpa,
            &mut out.epsilon_z_microdef,
            &mut out.deflection_mm,
        ] {
            if !ptr.is_null() {
                drop(Vec::from_raw_parts(*ptr, n, n));
                *ptr = std::ptr::null_mut();
            }
        }
    }

    unsafe extern "C" fn stub_calculate_ok(
        input: *const PavementInputC,
        output: *mut PavementOutputC,
    ) -> i32 {
        let nz = (*input).nz as usize;
        let out = &mut *output;
        out.success = 1;
        out.error_code = 0;
        out.nz = nz as i32;
        out.calculation_time_ms = 0.5;
        out.sigma_t_mpa = leak_array(0.1, nz);
        out.epsilon_t_microdef = leak_array(25.0, nz);
        out.sigma_z_mpa = leak_array(-0.5, nz);
        out.epsilon_z_microdef = leak_array(40.0, nz);
        out.deflection_mm = leak_array(20.0, nz);
        PAVEMENT_SUCCESS
    }

    unsafe extern "C" fn stub_calculate_fail(
        _input: *const PavementInputC,
        output: *mut PavementOutputC,
    ) -> i32 {
        (*output).success = 0;
        (*output).error_code = 3;
        PAVEMENT_SUCCESS
    }

    unsafe extern "C" fn stub_free_ok(output: *mut PavementOutputC) {
        release_arrays(output);
        FREE_CALLS_OK.fetch_add(1, Ordering::SeqCst);
    }

    unsafe extern "C" fn stub_free_fail(output: *mut PavementOutputC) {
        release_arrays(output);
        FREE_CALLS_FAIL.fetch_add(1, Ordering::SeqCst);
    }

    unsafe extern "C" fn stub_version() -> *const c_char {
        b"1.0.0\0".as_ptr() as *const c_char
    }

    unsafe extern "C" fn stub_last_error() -> *const c_char {
        b"matrix assembly failed\0".as_ptr() as *const c_char
    }

    #[test]
    fn test_unbound_adapter_reports_unavailable() {
        let adapter = NativeBackendAdapter::unbound();
        assert!(!adapter.is_available());
        let err = adapter.solve(&two_layer_structure()).unwrap_err();
        assert_eq!(err.error_code(), "BACKEND_UNAVAILABLE");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_successful_call_copies_and_frees_once() {
        let adapter = NativeBackendAdapter::with_api(NativeApi {
            calculate: stub_calculate_ok,
            free_output: stub_free_ok,
            version: stub_version,
            last_error: stub_last_error,
        });
        let before = FREE_CALLS_OK.load(Ordering::SeqCst);
        let layers = adapter.solve(&two_layer_structure()).unwrap();

        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].sigma_z_top, -0.5);
        assert_eq!(layers[0].epsilon_t_bottom, 25.0);
        // Platform bottom stays zero even though the backend filled 3 points
        assert_eq!(layers[1].sigma_z_bottom, 0.0);
        assert_eq!(FREE_CALLS_OK.load(Ordering::SeqCst), before + 1);
    }

    #[test]
    fn test_failed_call_reports_and_still_frees_once() {
        let adapter = NativeBackendAdapter::with_api(NativeApi {
            calculate: stub_calculate_fail,
            free_output: stub_free_fail,
            version: stub_version,
            last_error: stub_last_error,
        });
        let before = FREE_CALLS_FAIL.load(Ordering::SeqCst);
        let err = adapter.solve(&two_layer_structure()).unwrap_err();

        match err {
            PaveError::BackendComputation { code, ref reason } => {
                assert_eq!(code, 3);
                assert_eq!(reason, "matrix assembly failed");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.is_recoverable());
        assert_eq!(FREE_CALLS_FAIL.load(Ordering::SeqCst), before + 1);
    }

    #[test]
    fn test_version_query() {
        let adapter = NativeBackendAdapter::with_api(NativeApi {
            calculate: stub_calculate_ok,
            free_output: stub_free_ok,
            version: stub_version,
            last_error: stub_last_error,
        });
        assert_eq!(adapter.version().as_deref(), Some("1.0.0"));
        assert_eq!(NativeBackendAdapter::unbound().version(), None);
    }
}
