//! C-ABI FFI bindings for cross-language integration.
//!
//! This module provides a C-compatible API for generating DANFEs from
//! other languages such as C#, Python, and Node.js.

use std::ffi::{c_char, CStr, CString};
use std::ptr;

use crate::render::RenderOptions;
use crate::{inspect_json, render_str_with_options};

/// String result structure returned by FFI functions.
#[repr(C)]
pub struct DanfeResult {
    /// Whether the operation succeeded.
    pub success: bool,
    /// The result data (null if failed). Must be freed with `danfe_free_string`.
    pub data: *mut c_char,
    /// Error message (null if succeeded). Must be freed with `danfe_free_string`.
    pub error: *mut c_char,
}

impl DanfeResult {
    fn success(data: String) -> Self {
        Self {
            success: true,
            data: CString::new(data).unwrap_or_default().into_raw(),
            error: ptr::null_mut(),
        }
    }

    fn error(message: String) -> Self {
        Self {
            success: false,
            data: ptr::null_mut(),
            error: CString::new(message).unwrap_or_default().into_raw(),
        }
    }
}

/// Binary result structure for rendered PDFs.
#[repr(C)]
pub struct DanfeBuffer {
    /// Whether the operation succeeded.
    pub success: bool,
    /// PDF bytes (null if failed). Freed by `danfe_free_buffer`.
    pub data: *mut u8,
    /// Length of `data` in bytes.
    pub len: usize,
    /// Suggested download filename (null if failed). Freed by `danfe_free_buffer`.
    pub filename: *mut c_char,
    /// Error message (null if succeeded). Freed by `danfe_free_buffer`.
    pub error: *mut c_char,
}

impl DanfeBuffer {
    fn success(bytes: Vec<u8>, filename: String) -> Self {
        let boxed = bytes.into_boxed_slice();
        let len = boxed.len();
        let data = Box::into_raw(boxed) as *mut u8;
        Self {
            success: true,
            data,
            len,
            filename: CString::new(filename).unwrap_or_default().into_raw(),
            error: ptr::null_mut(),
        }
    }

    fn error(message: String) -> Self {
        Self {
            success: false,
            data: ptr::null_mut(),
            len: 0,
            filename: ptr::null_mut(),
            error: CString::new(message).unwrap_or_default().into_raw(),
        }
    }
}

/// Render a DANFE PDF from NF-e XML text.
///
/// # Safety
///
/// The `xml` must be a valid null-terminated UTF-8 string.
/// The returned buffer must be freed with `danfe_free_buffer`.
#[no_mangle]
pub unsafe extern "C" fn danfe_render_xml(xml: *const c_char, single_page: bool) -> DanfeBuffer {
    if xml.is_null() {
        return DanfeBuffer::error("XML cannot be null".to_string());
    }

    let xml_str = match CStr::from_ptr(xml).to_str() {
        Ok(s) => s,
        Err(_) => return DanfeBuffer::error("Invalid UTF-8 XML".to_string()),
    };

    let mut options = RenderOptions::new();
    if single_page {
        options = options.single_page();
    }

    match render_str_with_options(xml_str, &options) {
        Ok(rendered) => DanfeBuffer::success(rendered.bytes, rendered.filename),
        Err(e) => DanfeBuffer::error(e.to_string()),
    }
}

/// Extract the DANFE field set from NF-e XML text as JSON.
///
/// # Safety
///
/// The `xml` must be a valid null-terminated UTF-8 string.
/// The returned result must be freed with `danfe_free_result`.
#[no_mangle]
pub unsafe extern "C" fn danfe_inspect(xml: *const c_char, pretty: bool) -> DanfeResult {
    if xml.is_null() {
        return DanfeResult::error("XML cannot be null".to_string());
    }

    let xml_str = match CStr::from_ptr(xml).to_str() {
        Ok(s) => s,
        Err(_) => return DanfeResult::error("Invalid UTF-8 XML".to_string()),
    };

    match inspect_json(xml_str, pretty) {
        Ok(json) => DanfeResult::success(json),
        Err(e) => DanfeResult::error(e.to_string()),
    }
}

/// Check whether the text looks like an NF-e document.
///
/// # Safety
///
/// The `xml` must be a valid null-terminated UTF-8 string.
#[no_mangle]
pub unsafe extern "C" fn danfe_is_nfe(xml: *const c_char) -> bool {
    if xml.is_null() {
        return false;
    }

    match CStr::from_ptr(xml).to_str() {
        Ok(s) => crate::detect::is_nfe_xml(s),
        Err(_) => false,
    }
}

/// Free a string result returned by a danfe function.
///
/// # Safety
///
/// The `result` must have been returned by a danfe function.
/// This function should only be called once per result.
#[no_mangle]
pub unsafe extern "C" fn danfe_free_result(result: DanfeResult) {
    if !result.data.is_null() {
        drop(CString::from_raw(result.data));
    }
    if !result.error.is_null() {
        drop(CString::from_raw(result.error));
    }
}

/// Free a binary buffer returned by `danfe_render_xml`.
///
/// # Safety
///
/// The `buffer` must have been returned by `danfe_render_xml`.
/// This function should only be called once per buffer.
#[no_mangle]
pub unsafe extern "C" fn danfe_free_buffer(buffer: DanfeBuffer) {
    if !buffer.data.is_null() {
        let slice = std::slice::from_raw_parts_mut(buffer.data, buffer.len);
        drop(Box::from_raw(slice as *mut [u8]));
    }
    if !buffer.filename.is_null() {
        drop(CString::from_raw(buffer.filename));
    }
    if !buffer.error.is_null() {
        drop(CString::from_raw(buffer.error));
    }
}

/// Free a string allocated by danfe.
///
/// # Safety
///
/// The `ptr` must have been allocated by danfe.
/// This function should only be called once per pointer.
#[no_mangle]
pub unsafe extern "C" fn danfe_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// Get the version of the danfe library.
///
/// # Safety
///
/// The returned string is statically allocated and should not be freed.
#[no_mangle]
pub extern "C" fn danfe_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
