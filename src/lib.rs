//! Daily rainfall intensity classification from station weather readings.
//!
//! The library loads a pre-fitted classifier and its two feature scalers once,
//! then turns each day's raw readings into the 9-column row the classifier was
//! fitted on and maps its answer to a rainfall category. The C functions at
//! the bottom of this file are what the desktop front-end links against.

pub mod config;
pub mod data;
pub mod error;
pub mod model;
pub mod session;
pub mod utils;

pub use config::Config;
pub use data::compass::CompassDirection;
pub use data::observation::RawObservation;
pub use data::preprocessing::{FeatureVector, MissingScalerPolicy};
pub use error::{LoadError, RequestError};
pub use model::labels::RainfallCategory;
pub use session::{ArtifactBundle, Classification, Session};

use std::ffi::{CStr, CString};
use std::path::PathBuf;
use tracing::error;

pub const RAINFALL_OK: i32 = 0;
pub const RAINFALL_WARNING: i32 = 1;
pub const RAINFALL_ERROR: i32 = 2;

/// Result handed to the front-end. Free with `rainfall_result_free`.
#[repr(C)]
pub struct RainfallResult {
    /// `RAINFALL_OK`, `RAINFALL_WARNING` (fix the input) or `RAINFALL_ERROR`.
    pub status: i32,
    /// Class id, or -1 when there is no prediction.
    pub class_id: i32,
    /// Category label, null when there is no prediction.
    pub label: *mut libc::c_char,
    /// Warning or error text, null when there is nothing to say.
    pub message: *mut libc::c_char,
}

fn to_c_string(s: &str) -> *mut libc::c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

fn present(value: f64) -> Option<f64> {
    if value.is_nan() { None } else { Some(value) }
}

fn into_result(status: i32, class_id: i32, label: Option<&str>, message: Option<&str>) -> *mut RainfallResult {
    Box::into_raw(Box::new(RainfallResult {
        status,
        class_id,
        label: label.map(to_c_string).unwrap_or(std::ptr::null_mut()),
        message: message.map(to_c_string).unwrap_or(std::ptr::null_mut()),
    }))
}

/// Loads config and artifacts. Returns null when the classifier cannot be
/// loaded; the front-end must not offer classification in that case.
/// A null `config_path` means `rainfall.toml` in the working directory.
///
/// On failure, if `error_out` is not null it receives the reason, to be
/// freed with `rainfall_string_free`.
#[unsafe(no_mangle)]
pub extern "C" fn rainfall_session_open(
    config_path: *const libc::c_char,
    error_out: *mut *mut libc::c_char,
) -> *mut Session {
    let fail = |message: String| -> *mut Session {
        error!("{}", message);
        if !error_out.is_null() {
            unsafe {
                *error_out = to_c_string(&message);
            }
        }
        std::ptr::null_mut()
    };

    let path = if config_path.is_null() {
        PathBuf::from(config::DEFAULT_CONFIG_PATH)
    } else {
        match unsafe { CStr::from_ptr(config_path) }.to_str() {
            Ok(s) => PathBuf::from(s),
            Err(e) => return fail(format!("config path is not valid UTF-8: {}", e)),
        }
    };

    match Session::from_config_file(&path) {
        Ok(session) => Box::into_raw(Box::new(session)),
        Err(e) => fail(e.to_string()),
    }
}

/// Start-up warnings joined by newlines, or null if there are none.
/// Free with `rainfall_string_free`.
#[unsafe(no_mangle)]
pub extern "C" fn rainfall_session_warnings(session: *const Session) -> *mut libc::c_char {
    let Some(session) = (unsafe { session.as_ref() }) else {
        return std::ptr::null_mut();
    };
    if session.warnings().is_empty() {
        return std::ptr::null_mut();
    }
    let text = session
        .warnings()
        .iter()
        .map(|w| w.to_string())
        .collect::<Vec<_>>()
        .join("\n");
    to_c_string(&text)
}

/// Classifies one day. Pass NaN for a numeric field that was left empty and
/// null for an unselected direction. `dddx` is in degrees.
#[unsafe(no_mangle)]
#[allow(clippy::too_many_arguments)]
pub extern "C" fn rainfall_classify(
    session: *const Session,
    tn: f64,
    tx: f64,
    tavg: f64,
    rhavg: f64,
    ss: f64,
    ffx: f64,
    ffavg: f64,
    dddx: f64,
    dddcar: *const libc::c_char,
) -> *mut RainfallResult {
    let Some(session) = (unsafe { session.as_ref() }) else {
        return into_result(RAINFALL_ERROR, -1, None, Some("session is not open"));
    };

    let dddcar = if dddcar.is_null() {
        None
    } else {
        let label = unsafe { CStr::from_ptr(dddcar) }.to_string_lossy();
        match label.parse::<CompassDirection>() {
            Ok(direction) => Some(direction),
            Err(e) => {
                return into_result(RAINFALL_WARNING, -1, None, Some(&e.to_string()));
            }
        }
    };

    let raw = RawObservation {
        tn: present(tn),
        tx: present(tx),
        tavg: present(tavg),
        rhavg: present(rhavg),
        ss: present(ss),
        ffx: present(ffx),
        ffavg: present(ffavg),
        dddx: present(dddx),
        dddcar,
    };

    match session.classify(&raw) {
        Ok(result) => into_result(
            RAINFALL_OK,
            result.category.class_id() as i32,
            Some(result.category.label()),
            result.scaling_warning().as_deref(),
        ),
        Err(e) => {
            let status = if e.is_validation() { RAINFALL_WARNING } else { RAINFALL_ERROR };
            let message = format!("{} {}", e, e.hint());
            into_result(status, -1, None, Some(&message))
        }
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn rainfall_result_free(result: *mut RainfallResult) {
    if !result.is_null() {
        unsafe {
            let result = Box::from_raw(result);
            rainfall_string_free(result.label);
            rainfall_string_free(result.message);
        }
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn rainfall_string_free(s: *mut libc::c_char) {
    if !s.is_null() {
        unsafe {
            let _ = CString::from_raw(s);
        }
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn rainfall_session_free(session: *mut Session) {
    if !session.is_null() {
        unsafe {
            let _ = Box::from_raw(session);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::scaler::{MinMaxScaler, RobustScaler};
    use crate::model::classifier::ClassifierArtifact;
    use crate::model::network::{DenseLayer, NeuralNetwork};
    use crate::session::PipelineSettings;
    use ndarray::{array, Array1, Array2};

    fn session() -> Session {
        let mut bias = Array1::zeros(5);
        bias[2] = 1.0;
        let classifier = ClassifierArtifact::Network(
            NeuralNetwork::new(vec![DenseLayer {
                weights: Array2::zeros((9, 5)),
                bias,
            }])
            .unwrap(),
        );
        let bundle = ArtifactBundle::new(
            classifier,
            Some(RobustScaler::new(array![20.0, 30.0, 25.0, 3.0, 2.0], array![1.0, 1.0, 1.0, 1.0, 1.0]).unwrap()),
            Some(MinMaxScaler::new(array![0.0, 0.0, 0.0], array![100.0, 24.0, 6.3]).unwrap()),
        )
        .unwrap();
        Session::from_bundle(bundle, PipelineSettings::default())
    }

    fn read(s: *mut libc::c_char) -> Option<String> {
        if s.is_null() {
            None
        } else {
            Some(unsafe { CStr::from_ptr(s) }.to_string_lossy().into_owned())
        }
    }

    #[test]
    fn test_classify_through_c_abi() {
        let session = Box::into_raw(Box::new(session()));
        let direction = CString::new("East (E)").unwrap();

        let result = rainfall_classify(session, 20.0, 30.0, 25.0, 80.0, 5.0, 3.0, 2.0, 90.0, direction.as_ptr());
        let r = unsafe { &*result };
        assert_eq!(r.status, RAINFALL_OK);
        assert_eq!(r.class_id, 2);
        assert_eq!(read(r.label).as_deref(), Some("Hujan Sedang"));
        assert!(r.message.is_null());

        rainfall_result_free(result);
        rainfall_session_free(session);
    }

    #[test]
    fn test_nan_field_is_a_validation_warning() {
        let session = Box::into_raw(Box::new(session()));
        let direction = CString::new("E").unwrap();

        let result = rainfall_classify(session, 20.0, 30.0, f64::NAN, 80.0, 5.0, 3.0, 2.0, 90.0, direction.as_ptr());
        let r = unsafe { &*result };
        assert_eq!(r.status, RAINFALL_WARNING);
        assert_eq!(r.class_id, -1);
        assert!(r.label.is_null());
        assert!(read(r.message).unwrap().contains("average temperature"));

        rainfall_result_free(result);
        rainfall_session_free(session);
    }

    #[test]
    fn test_unknown_direction_is_rejected() {
        let session = Box::into_raw(Box::new(session()));
        let direction = CString::new("Up").unwrap();

        let result = rainfall_classify(session, 20.0, 30.0, 25.0, 80.0, 5.0, 3.0, 2.0, 90.0, direction.as_ptr());
        let r = unsafe { &*result };
        assert_eq!(r.status, RAINFALL_WARNING);
        assert!(read(r.message).unwrap().contains("unknown wind direction 'Up'"));

        rainfall_result_free(result);
        rainfall_session_free(session);
    }

    #[test]
    fn test_null_session_is_an_error_result() {
        let result = rainfall_classify(std::ptr::null(), 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, std::ptr::null());
        let r = unsafe { &*result };
        assert_eq!(r.status, RAINFALL_ERROR);
        rainfall_result_free(result);
    }

    #[test]
    fn test_missing_classifier_gives_null_session() {
        let dir = std::env::temp_dir().join(format!("rainfall-ffi-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let config_path = dir.join("rainfall.toml");
        std::fs::write(
            &config_path,
            format!("[artifacts]\nclassifier = {:?}\n", dir.join("absent.bin").to_string_lossy()),
        )
        .unwrap();

        let c_path = CString::new(config_path.to_string_lossy().into_owned()).unwrap();
        let mut message: *mut libc::c_char = std::ptr::null_mut();
        assert!(rainfall_session_open(c_path.as_ptr(), &mut message).is_null());

        let text = read(message).unwrap();
        assert!(text.contains("absent.bin"), "{}", text);
        rainfall_string_free(message);

        // the out-parameter is optional
        assert!(rainfall_session_open(c_path.as_ptr(), std::ptr::null_mut()).is_null());

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_session_warnings_are_exposed() {
        let mut s = session();
        let (bundle, settings) = (s.bundle().clone(), *s.settings());
        let mut degraded = bundle;
        degraded.minmax = None;
        s = Session::from_bundle(degraded, settings);
        let session = Box::into_raw(Box::new(s));

        let text = read(rainfall_session_warnings(session)).unwrap();
        assert_eq!(text, "min-max scaler was not provided; predictions may be less accurate");

        rainfall_session_free(session);
    }
}
