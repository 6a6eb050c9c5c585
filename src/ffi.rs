//! FFI bindings for Pulse Analytics
//!
//! This module provides C-compatible functions for calling the engine from other
//! languages. Inputs and outputs are JSON in null-terminated C strings. Returned
//! strings are allocated here and must be freed by the caller using
//! `pulse_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use chrono::NaiveDate;

use crate::config::EngineConfig;
use crate::engine::AnalyticsEngine;
use crate::error::AnalyticsError;
use crate::goals::goal_progress;
use crate::score::health_score;
use crate::series::normalize_series;
use crate::summary::summarize;
use crate::trend::classify_trend;
use crate::types::{Goal, HealthScoreInputs, Period};

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

/// Helper to convert a required C string argument, recording an error if it is unusable
unsafe fn required_arg(ptr: *const c_char, name: &str) -> Option<String> {
    let value = cstr_to_string(ptr);
    if value.is_none() {
        set_last_error(&format!("Invalid {} string pointer", name));
    }
    value
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Helper to hand a computed JSON result (or its error) back across the boundary
fn json_result(result: Result<String, AnalyticsError>) -> *mut c_char {
    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, AnalyticsError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| AnalyticsError::ParseError(format!("Invalid date '{}': {}", value, e)))
}

fn parse_values(json: &str) -> Result<Vec<f64>, AnalyticsError> {
    Ok(serde_json::from_str(json)?)
}

// ============================================================================
// Stateless API
// ============================================================================

/// Summarize a JSON array of numbers.
///
/// # Safety
/// - `values_json` and `unit` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `pulse_free_string`.
/// - Returns NULL on error; call `pulse_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn pulse_summarize(
    values_json: *const c_char,
    unit: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some(values_str) = required_arg(values_json, "values JSON") else {
        return ptr::null_mut();
    };
    let Some(unit_str) = required_arg(unit, "unit") else {
        return ptr::null_mut();
    };

    json_result(parse_values(&values_str).and_then(|values| {
        Ok(serde_json::to_string(&summarize(&values, &unit_str))?)
    }))
}

/// Classify a most-recent-first JSON array of numbers as "up", "down" or "stable".
///
/// # Safety
/// - `values_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `pulse_free_string`.
/// - Returns NULL on error; call `pulse_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn pulse_classify_trend(values_json: *const c_char) -> *mut c_char {
    clear_last_error();

    let Some(values_str) = required_arg(values_json, "values JSON") else {
        return ptr::null_mut();
    };

    json_result(parse_values(&values_str).map(|values| classify_trend(&values).to_string()))
}

/// Normalize a JSON array of numbers into chart points.
///
/// # Safety
/// - `values_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `pulse_free_string`.
/// - Returns NULL on error; call `pulse_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn pulse_normalize_series(values_json: *const c_char) -> *mut c_char {
    clear_last_error();

    let Some(values_str) = required_arg(values_json, "values JSON") else {
        return ptr::null_mut();
    };

    json_result(
        parse_values(&values_str)
            .and_then(|values| Ok(serde_json::to_string(&normalize_series(&values))?)),
    )
}

/// Compute the health score for a JSON `HealthScoreInputs` object.
///
/// # Safety
/// - `inputs_json` must be a valid null-terminated C string.
/// - Returns the score (0-100), or -1 on error; call `pulse_last_error` for details.
#[no_mangle]
pub unsafe extern "C" fn pulse_health_score(inputs_json: *const c_char) -> i32 {
    clear_last_error();

    let Some(inputs_str) = required_arg(inputs_json, "inputs JSON") else {
        return -1;
    };

    match serde_json::from_str::<HealthScoreInputs>(&inputs_str) {
        Ok(inputs) => i32::from(health_score(&inputs)),
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Compute progress for a JSON `Goal` using its own `current_value`.
///
/// # Safety
/// - `goal_json` must be a valid null-terminated C string.
/// - Returns the percentage (0-100), or -1.0 on error; call `pulse_last_error` for details.
#[no_mangle]
pub unsafe extern "C" fn pulse_goal_progress(goal_json: *const c_char) -> f64 {
    clear_last_error();

    let Some(goal_str) = required_arg(goal_json, "goal JSON") else {
        return -1.0;
    };

    let result = serde_json::from_str::<Goal>(&goal_str)
        .map_err(AnalyticsError::from)
        .and_then(|goal| goal_progress(&goal, goal.current_value));

    match result {
        Ok(progress) => progress,
        Err(e) => {
            set_last_error(&e.to_string());
            -1.0
        }
    }
}

// ============================================================================
// Engine API
// ============================================================================

/// Opaque handle to an AnalyticsEngine
pub struct AnalyticsEngineHandle {
    engine: AnalyticsEngine,
}

/// Create an engine from JSON configuration, or with defaults when `config_json` is NULL.
///
/// # Safety
/// - `config_json` must be NULL or a valid null-terminated C string.
/// - Returns a pointer that must be freed with `pulse_engine_free`.
/// - Returns NULL on error; call `pulse_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn pulse_engine_new(config_json: *const c_char) -> *mut AnalyticsEngineHandle {
    clear_last_error();

    let config = if config_json.is_null() {
        Ok(EngineConfig::default())
    } else {
        match cstr_to_string(config_json) {
            Some(json) => EngineConfig::from_json(&json),
            None => {
                set_last_error("Invalid config JSON string pointer");
                return ptr::null_mut();
            }
        }
    };

    match config.and_then(AnalyticsEngine::with_config) {
        Ok(engine) => Box::into_raw(Box::new(AnalyticsEngineHandle { engine })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free an engine.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `pulse_engine_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn pulse_engine_free(engine: *mut AnalyticsEngineHandle) {
    if !engine.is_null() {
        drop(Box::from_raw(engine));
    }
}

/// Build an analytics report.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `pulse_engine_new`.
/// - `records_json`, `start` and `end` (YYYY-MM-DD) must be valid null-terminated C strings.
/// - `goals_json` must be NULL or a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `pulse_free_string`.
/// - Returns NULL on error; call `pulse_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn pulse_engine_analyze(
    engine: *const AnalyticsEngineHandle,
    records_json: *const c_char,
    start: *const c_char,
    end: *const c_char,
    goals_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return ptr::null_mut();
    }
    let handle = &*engine;

    let Some(records_str) = required_arg(records_json, "records JSON") else {
        return ptr::null_mut();
    };
    let Some(start_str) = required_arg(start, "start date") else {
        return ptr::null_mut();
    };
    let Some(end_str) = required_arg(end, "end date") else {
        return ptr::null_mut();
    };
    let goals_str = cstr_to_string(goals_json);

    let result = parse_date(&start_str)
        .and_then(|start| Period::new(start, parse_date(&end_str)?))
        .and_then(|period| {
            handle
                .engine
                .analyze_json(&records_str, period, goals_str.as_deref())
        });

    json_result(result)
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Pulse functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Pulse function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn pulse_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Pulse function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn pulse_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn pulse_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
