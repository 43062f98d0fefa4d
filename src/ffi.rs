//! FFI bindings for PawTrack
//!
//! C-compatible functions for embedding the engine in mobile shells or other
//! languages. All functions use null-terminated C strings and return
//! allocated memory that must be freed with `pawtrack_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::activity::ActivityTracker;
use crate::health;
use crate::replay::{replay, ReplayConfig};
use crate::types::{PositionSample, RecordSource};
use crate::PAWTRACK_VERSION;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

fn parse_source(tag: &str) -> Option<RecordSource> {
    match tag {
        "user" => Some(RecordSource::User),
        "admin" => Some(RecordSource::Admin),
        _ => None,
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Replay a JSON array of position samples and return the emitted tracking
/// records plus final metrics as JSON.
///
/// # Safety
/// - `samples_json`, `subject_id`, and `source` must be valid null-terminated
///   C strings; `source` is `"user"` or `"admin"`.
/// - Returns a newly allocated string that must be freed with
///   `pawtrack_free_string`.
/// - Returns NULL on error; call `pawtrack_last_error` for the message.
#[no_mangle]
pub unsafe extern "C" fn pawtrack_replay_json(
    samples_json: *const c_char,
    subject_id: *const c_char,
    source: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let samples_str = match cstr_to_string(samples_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid samples JSON pointer");
            return ptr::null_mut();
        }
    };

    let subject = match cstr_to_string(subject_id) {
        Some(s) => s,
        None => {
            set_last_error("Invalid subject_id pointer");
            return ptr::null_mut();
        }
    };

    let source_tag = match cstr_to_string(source).as_deref().and_then(parse_source) {
        Some(s) => s,
        None => {
            set_last_error("source must be \"user\" or \"admin\"");
            return ptr::null_mut();
        }
    };

    let samples: Vec<PositionSample> = match serde_json::from_str(&samples_str) {
        Ok(s) => s,
        Err(e) => {
            set_last_error(&format!("Failed to parse samples: {e}"));
            return ptr::null_mut();
        }
    };

    let output = replay(&samples, &ReplayConfig::new(subject, source_tag));
    match serde_json::to_string(&output) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateful Tracker API
// ============================================================================

/// Opaque handle to an ActivityTracker
pub struct TrackerHandle {
    tracker: ActivityTracker,
}

/// Create a new activity tracker.
///
/// # Safety
/// - Returns a pointer to a newly allocated tracker.
/// - Must be freed with `pawtrack_tracker_free`.
#[no_mangle]
pub unsafe extern "C" fn pawtrack_tracker_new() -> *mut TrackerHandle {
    clear_last_error();
    let handle = Box::new(TrackerHandle {
        tracker: ActivityTracker::new(),
    });
    Box::into_raw(handle)
}

/// Free an activity tracker.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `pawtrack_tracker_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn pawtrack_tracker_free(tracker: *mut TrackerHandle) {
    if !tracker.is_null() {
        drop(Box::from_raw(tracker));
    }
}

/// Fold one position sample (JSON) into the tracker.
///
/// Returns 0 on success, -1 on error.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `pawtrack_tracker_new`.
/// - `sample_json` must be a valid null-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn pawtrack_tracker_update(
    tracker: *mut TrackerHandle,
    sample_json: *const c_char,
) -> i32 {
    clear_last_error();

    let handle = match tracker.as_mut() {
        Some(h) => h,
        None => {
            set_last_error("Invalid tracker pointer");
            return -1;
        }
    };

    let sample_str = match cstr_to_string(sample_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid sample JSON pointer");
            return -1;
        }
    };

    let sample: PositionSample = match serde_json::from_str(&sample_str) {
        Ok(s) => s,
        Err(e) => {
            set_last_error(&format!("Failed to parse sample: {e}"));
            return -1;
        }
    };

    handle.tracker.update(&sample);
    0
}

/// Return the tracker's current metrics as JSON.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `pawtrack_tracker_new`.
/// - Returns a newly allocated string that must be freed with
///   `pawtrack_free_string`; NULL on error.
#[no_mangle]
pub unsafe extern "C" fn pawtrack_tracker_metrics(tracker: *mut TrackerHandle) -> *mut c_char {
    clear_last_error();

    let handle = match tracker.as_ref() {
        Some(h) => h,
        None => {
            set_last_error("Invalid tracker pointer");
            return ptr::null_mut();
        }
    };

    match serde_json::to_string(handle.tracker.metrics()) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Return the health label derived from the tracker's current metrics.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `pawtrack_tracker_new`.
/// - Returns a newly allocated string that must be freed with
///   `pawtrack_free_string`; NULL on error.
#[no_mangle]
pub unsafe extern "C" fn pawtrack_tracker_label(tracker: *mut TrackerHandle) -> *mut c_char {
    clear_last_error();

    let handle = match tracker.as_ref() {
        Some(h) => h,
        None => {
            set_last_error("Invalid tracker pointer");
            return ptr::null_mut();
        }
    };

    let label = health::derive_health_label(handle.tracker.metrics());
    string_to_cstr(label.as_str())
}

// ============================================================================
// Utilities
// ============================================================================

/// Return the PawTrack version string.
///
/// # Safety
/// - Returns a newly allocated string that must be freed with
///   `pawtrack_free_string`.
#[no_mangle]
pub unsafe extern "C" fn pawtrack_version() -> *mut c_char {
    string_to_cstr(PAWTRACK_VERSION)
}

/// Return the last error message, or NULL if none.
///
/// # Safety
/// - The returned pointer is owned by thread-local storage and must NOT be
///   freed; it is invalidated by the next FFI call on this thread.
#[no_mangle]
pub unsafe extern "C" fn pawtrack_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(msg) => msg.as_ptr(),
        None => ptr::null(),
    })
}

/// Free a string allocated by this library.
///
/// # Safety
/// - `s` must be a pointer returned by a PawTrack FFI function, or NULL.
#[no_mangle]
pub unsafe extern "C" fn pawtrack_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn cstr(s: &str) -> CString {
        CString::new(s).unwrap()
    }

    unsafe fn take_string(ptr: *mut c_char) -> String {
        assert!(!ptr.is_null());
        let s = CStr::from_ptr(ptr).to_str().unwrap().to_string();
        pawtrack_free_string(ptr);
        s
    }

    #[test]
    fn test_replay_json_roundtrip() {
        let samples = cstr(
            r#"[
                {"latitude": 0.0, "longitude": 0.0, "accuracy": 5.0, "observed_at": "2024-01-15T10:00:00Z"},
                {"latitude": 0.0, "longitude": 0.0005, "accuracy": 5.0, "observed_at": "2024-01-15T10:00:30Z"}
            ]"#,
        );
        let subject = cstr("pet-9");
        let source = cstr("user");

        let out = unsafe {
            take_string(pawtrack_replay_json(
                samples.as_ptr(),
                subject.as_ptr(),
                source.as_ptr(),
            ))
        };
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["records"].as_array().unwrap().len(), 1);
        assert_eq!(parsed["health"], "monitoring");
    }

    #[test]
    fn test_replay_rejects_bad_source() {
        let samples = cstr("[]");
        let subject = cstr("pet-9");
        let source = cstr("operator");

        let out = unsafe {
            pawtrack_replay_json(samples.as_ptr(), subject.as_ptr(), source.as_ptr())
        };
        assert!(out.is_null());

        let err = unsafe { CStr::from_ptr(pawtrack_last_error()) };
        assert!(err.to_str().unwrap().contains("user"));
    }

    #[test]
    fn test_tracker_handle_lifecycle() {
        unsafe {
            let tracker = pawtrack_tracker_new();
            assert!(!tracker.is_null());

            let sample = cstr(
                r#"{"latitude": 48.0, "longitude": 2.0, "accuracy": 5.0, "observed_at": "2024-01-15T10:00:00Z"}"#,
            );
            assert_eq!(pawtrack_tracker_update(tracker, sample.as_ptr()), 0);

            let metrics = take_string(pawtrack_tracker_metrics(tracker));
            let parsed: serde_json::Value = serde_json::from_str(&metrics).unwrap();
            assert_eq!(parsed["history"].as_array().unwrap().len(), 1);

            let label = take_string(pawtrack_tracker_label(tracker));
            assert_eq!(label, "monitoring");

            pawtrack_tracker_free(tracker);
        }
    }

    #[test]
    fn test_tracker_update_rejects_malformed_sample() {
        unsafe {
            let tracker = pawtrack_tracker_new();
            let garbage = cstr("not json");
            assert_eq!(pawtrack_tracker_update(tracker, garbage.as_ptr()), -1);
            assert!(!pawtrack_last_error().is_null());
            pawtrack_tracker_free(tracker);
        }
    }
}
