//! C-ABI FFI bindings for cross-language integration.
//!
//! This module provides a C-compatible API for using unembed from other
//! languages such as Python, C# and JavaScript hosts.

use std::ffi::{c_char, CStr, CString};
use std::path::Path;
use std::ptr;

use crate::model::{CleanResult, Method};
use crate::{clean_bytes, clean_file, CleanOptions};

/// Cleaned PDF bytes returned by [`unembed_clean_bytes`].
#[repr(C)]
pub struct UnembedBuffer {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Output bytes (null if failed). Must be freed with `unembed_free_buffer`.
    pub data: *mut u8,
    /// Length of `data` in bytes.
    pub len: usize,
    /// Method used: 0 = new, 1 = old, 2 = naive. Only meaningful on success.
    pub method: u8,
    /// Error message (null if succeeded). Freed with `unembed_free_buffer`.
    pub error: *mut c_char,
}

impl UnembedBuffer {
    fn success(bytes: Vec<u8>, method: Method) -> Self {
        let len = bytes.len();
        let data = Box::into_raw(bytes.into_boxed_slice()) as *mut u8;
        Self {
            success: true,
            data,
            len,
            method: method.code(),
            error: ptr::null_mut(),
        }
    }

    fn error(message: String) -> Self {
        Self {
            success: false,
            data: ptr::null_mut(),
            len: 0,
            method: Method::Auto.code(),
            error: c_string(message),
        }
    }
}

/// Result structure returned by path-based FFI functions.
#[repr(C)]
pub struct UnembedResult {
    /// Whether the operation succeeded.
    pub success: bool,
    /// The result data (null if failed). Must be freed with `unembed_free_result`.
    pub data: *mut c_char,
    /// Error message (null if succeeded). Must be freed with `unembed_free_result`.
    pub error: *mut c_char,
}

impl UnembedResult {
    fn success(data: String) -> Self {
        Self {
            success: true,
            data: c_string(data),
            error: ptr::null_mut(),
        }
    }

    fn error(message: String) -> Self {
        Self {
            success: false,
            data: ptr::null_mut(),
            error: c_string(message),
        }
    }
}

fn c_string(value: String) -> *mut c_char {
    CString::new(value).unwrap_or_default().into_raw()
}

fn options(force_naive: bool) -> CleanOptions {
    let options = CleanOptions::new().with_metadata(false);
    if force_naive {
        options.force_naive()
    } else {
        options
    }
}

/// Clean a PDF held in memory.
///
/// # Safety
///
/// `data` must point to `len` readable bytes.
/// The returned buffer must be freed with `unembed_free_buffer`.
#[no_mangle]
pub unsafe extern "C" fn unembed_clean_bytes(
    data: *const u8,
    len: usize,
    force_naive: bool,
) -> UnembedBuffer {
    if data.is_null() {
        return UnembedBuffer::error("Data cannot be null".to_string());
    }

    let input = std::slice::from_raw_parts(data, len);
    match clean_bytes(input, &options(force_naive)) {
        CleanResult::Success(success) => {
            let method = success.method;
            match CleanResult::Success(success).into_bytes() {
                Some(bytes) => UnembedBuffer::success(bytes, method),
                None => UnembedBuffer::error("No output produced".to_string()),
            }
        }
        CleanResult::Failure(failure) => UnembedBuffer::error(failure.message),
    }
}

/// Clean a PDF file, writing `<name>_clean.pdf` beside it.
///
/// On success `data` holds the output path.
///
/// # Safety
///
/// The `path` must be a valid null-terminated UTF-8 string.
/// The returned result must be freed with `unembed_free_result`.
#[no_mangle]
pub unsafe extern "C" fn unembed_clean_file(
    path: *const c_char,
    force_naive: bool,
) -> UnembedResult {
    if path.is_null() {
        return UnembedResult::error("Path cannot be null".to_string());
    }

    let path_str = match CStr::from_ptr(path).to_str() {
        Ok(s) => s,
        Err(_) => return UnembedResult::error("Invalid UTF-8 path".to_string()),
    };

    let result = clean_file(Path::new(path_str), &options(force_naive));
    match (result.output_path(), result.error_message()) {
        (Some(output), _) => UnembedResult::success(output.to_string_lossy().into_owned()),
        (None, Some(message)) => UnembedResult::error(message.to_string()),
        (None, None) => UnembedResult::error("No output produced".to_string()),
    }
}

/// Report the method `Auto` would pick for an in-memory PDF.
///
/// Returns the method code (0 = new, 1 = old, 2 = naive), or -1 if the data
/// cannot be loaded.
///
/// # Safety
///
/// `data` must point to `len` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn unembed_select_method(data: *const u8, len: usize) -> i32 {
    if data.is_null() {
        return -1;
    }

    let input = std::slice::from_raw_parts(data, len);
    match crate::preprocess::unlock_bytes(input) {
        Ok(doc) => crate::select_method(&doc).code() as i32,
        Err(_) => -1,
    }
}

/// Check if a file is a valid PDF.
///
/// # Safety
///
/// The `path` must be a valid null-terminated UTF-8 string.
#[no_mangle]
pub unsafe extern "C" fn unembed_is_pdf(path: *const c_char) -> bool {
    if path.is_null() {
        return false;
    }

    let path_str = match CStr::from_ptr(path).to_str() {
        Ok(s) => s,
        Err(_) => return false,
    };

    crate::detect::detect_format_from_path(Path::new(path_str)).is_ok()
}

/// Free a buffer returned by `unembed_clean_bytes`.
///
/// # Safety
///
/// The `buffer` must have been returned by `unembed_clean_bytes`.
/// This function should only be called once per buffer.
#[no_mangle]
pub unsafe extern "C" fn unembed_free_buffer(buffer: UnembedBuffer) {
    if !buffer.data.is_null() {
        let slice = ptr::slice_from_raw_parts_mut(buffer.data, buffer.len);
        drop(Box::from_raw(slice));
    }
    if !buffer.error.is_null() {
        drop(CString::from_raw(buffer.error));
    }
}

/// Free a result returned by any path-based unembed function.
///
/// # Safety
///
/// The `result` must have been returned by an unembed function.
/// This function should only be called once per result.
#[no_mangle]
pub unsafe extern "C" fn unembed_free_result(result: UnembedResult) {
    if !result.data.is_null() {
        drop(CString::from_raw(result.data));
    }
    if !result.error.is_null() {
        drop(CString::from_raw(result.error));
    }
}

/// Get the version of the unembed library.
///
/// # Safety
///
/// The returned string is statically allocated and should not be freed.
#[no_mangle]
pub extern "C" fn unembed_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
