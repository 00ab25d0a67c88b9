use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::panic;

use formatshaper::{CodecProperties, MappingPair};

// ---------------------------------------------------------------------------
// Version info
// ---------------------------------------------------------------------------
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(serde::Serialize)]
struct VersionInfo {
    version: &'static str,
}

// ---------------------------------------------------------------------------
// Opaque handle
// ---------------------------------------------------------------------------

/// Opaque per-codec handle handed across the C boundary.
pub struct ShaperCodec(CodecProperties);

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Convert a Rust string to a heap-allocated `*mut c_char`.
/// Returns `std::ptr::null_mut()` if the string contains interior NULs.
fn string_to_c(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(c) => c.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Borrow a C string argument as `&str`. Returns `None` for null pointers
/// and for strings that are not valid UTF-8.
///
/// # Safety
///
/// `ptr` must be either null or a valid pointer to a NUL-terminated C string.
unsafe fn str_arg<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

/// Lower an export into the C layout: key/value string pointers in pairs,
/// terminated by two consecutive NULLs, `2 * pairs.len() + 2` slots total.
///
/// Every string is duplicated onto the heap and owned by the caller. On any
/// conversion failure the strings allocated so far are released and NULL is
/// returned instead of a partially populated array.
fn pairs_to_c_array(pairs: &[MappingPair]) -> *mut *mut c_char {
    let mut slots: Vec<*mut c_char> = Vec::with_capacity(2 * pairs.len() + 2);

    for pair in pairs {
        let from = string_to_c(&pair.from);
        let to = string_to_c(&pair.to);
        if from.is_null() || to.is_null() {
            for s in [from, to].into_iter().chain(slots.into_iter()) {
                if !s.is_null() {
                    unsafe {
                        let _ = CString::from_raw(s);
                    }
                }
            }
            log::warn!("could not convert mappings for export");
            return std::ptr::null_mut();
        }
        slots.push(from);
        slots.push(to);
    }

    slots.push(std::ptr::null_mut());
    slots.push(std::ptr::null_mut());

    // Capacity was exact, so the boxed slice length is 2N+2 and
    // shaper_free_mappings can reconstruct it by scanning for the terminator.
    Box::into_raw(slots.into_boxed_slice()) as *mut *mut c_char
}

// ---------------------------------------------------------------------------
// FFI entry points
// ---------------------------------------------------------------------------

/// Create a codec properties handle for `name` handling `media_type`.
///
/// The caller **must** destroy the handle with `shaper_codec_free`.
/// Returns `NULL` if either argument is null or not valid UTF-8.
///
/// # Safety
///
/// `name` and `media_type` must be either null or valid pointers to
/// NUL-terminated UTF-8 C strings.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn shaper_codec_create(
    name: *const c_char,
    media_type: *const c_char,
) -> *mut ShaperCodec {
    match panic::catch_unwind(|| {
        let name = match unsafe { str_arg(name) } {
            Some(s) => s,
            None => return std::ptr::null_mut(),
        };
        let media_type = match unsafe { str_arg(media_type) } {
            Some(s) => s,
            None => return std::ptr::null_mut(),
        };
        Box::into_raw(Box::new(ShaperCodec(CodecProperties::new(name, media_type))))
    }) {
        Ok(ptr) => ptr,
        Err(_) => std::ptr::null_mut(),
    }
}

/// Destroy a handle returned by `shaper_codec_create`.
///
/// Passing `NULL` is safe and has no effect.
///
/// # Safety
///
/// `handle` must be either null or a pointer previously returned by
/// `shaper_codec_create`. Each handle must only be freed once.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn shaper_codec_free(handle: *mut ShaperCodec) {
    if !handle.is_null() {
        let _ = panic::catch_unwind(panic::AssertUnwindSafe(|| {
            unsafe {
                let _ = Box::from_raw(handle);
            }
        }));
    }
}

/// Return the codec name as a heap-allocated C string.
///
/// The caller **must** free the returned string with `shaper_free_string`.
/// Returns `NULL` if `handle` is null.
///
/// # Safety
///
/// `handle` must be either null or a valid handle from `shaper_codec_create`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn shaper_codec_name(handle: *const ShaperCodec) -> *mut c_char {
    match panic::catch_unwind(panic::AssertUnwindSafe(|| {
        if handle.is_null() {
            return std::ptr::null_mut();
        }
        string_to_c(unsafe { &*handle }.0.name())
    })) {
        Ok(ptr) => ptr,
        Err(_) => std::ptr::null_mut(),
    }
}

/// Return the codec media type as a heap-allocated C string.
///
/// The caller **must** free the returned string with `shaper_free_string`.
/// Returns `NULL` if `handle` is null.
///
/// # Safety
///
/// `handle` must be either null or a valid handle from `shaper_codec_create`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn shaper_codec_media_type(handle: *const ShaperCodec) -> *mut c_char {
    match panic::catch_unwind(panic::AssertUnwindSafe(|| {
        if handle.is_null() {
            return std::ptr::null_mut();
        }
        string_to_c(unsafe { &*handle }.0.media_type())
    })) {
        Ok(ptr) => ptr,
        Err(_) => std::ptr::null_mut(),
    }
}

/// Quality floor the codec is certified to meet at default settings.
/// Returns 0 if `handle` is null or the attribute is unset.
///
/// # Safety
///
/// `handle` must be either null or a valid handle from `shaper_codec_create`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn shaper_codec_supported_minimum_quality(
    handle: *const ShaperCodec,
) -> c_int {
    if handle.is_null() {
        return 0;
    }
    unsafe { &*handle }.0.supported_minimum_quality()
}

/// Set the quality floor. Stored verbatim, no bounds checking.
/// A null `handle` is ignored.
///
/// # Safety
///
/// `handle` must be either null or a valid handle from `shaper_codec_create`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn shaper_codec_set_supported_minimum_quality(
    handle: *mut ShaperCodec,
    vmaf: c_int,
) {
    if !handle.is_null() {
        unsafe { &mut *handle }.0.set_supported_minimum_quality(vmaf);
    }
}

/// Maximum quantization parameter used for quality shaping.
/// Returns 0 if `handle` is null or the attribute is unset.
///
/// # Safety
///
/// `handle` must be either null or a valid handle from `shaper_codec_create`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn shaper_codec_target_qp_max(handle: *const ShaperCodec) -> c_int {
    if handle.is_null() {
        return 0;
    }
    unsafe { &*handle }.0.target_qp_max()
}

/// Set the QP ceiling. Stored verbatim, no bounds checking.
/// A null `handle` is ignored.
///
/// # Safety
///
/// `handle` must be either null or a valid handle from `shaper_codec_create`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn shaper_codec_set_target_qp_max(handle: *mut ShaperCodec, qp_max: c_int) {
    if !handle.is_null() {
        unsafe { &mut *handle }.0.set_target_qp_max(qp_max);
    }
}

/// Platform API generation this codec was validated against.
/// Returns 0 if `handle` is null or the attribute is unset.
///
/// # Safety
///
/// `handle` must be either null or a valid handle from `shaper_codec_create`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn shaper_codec_supported_api(handle: *const ShaperCodec) -> c_int {
    if handle.is_null() {
        return 0;
    }
    unsafe { &*handle }.0.supported_api()
}

/// Install a standard → codec-specific translation for `key` under the
/// namespace `kind`. Re-registering an existing `(kind, key)` pair is a
/// no-op: the first value installed stays authoritative.
///
/// Null or non-UTF-8 arguments are ignored.
///
/// # Safety
///
/// - `handle` must be either null or a valid handle from `shaper_codec_create`.
/// - `kind`, `key` and `value` must be either null or valid pointers to
///   NUL-terminated UTF-8 C strings.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn shaper_codec_set_mapping(
    handle: *mut ShaperCodec,
    kind: *const c_char,
    key: *const c_char,
    value: *const c_char,
) {
    let _ = panic::catch_unwind(panic::AssertUnwindSafe(|| {
        if handle.is_null() {
            return;
        }
        let (Some(kind), Some(key), Some(value)) =
            (unsafe { str_arg(kind) }, unsafe { str_arg(key) }, unsafe { str_arg(value) })
        else {
            return;
        };
        unsafe { &mut *handle }.0.set_mapping(kind, key, value);
    }));
}

/// Translate `key` within the namespace `kind`.
///
/// Returns the codec-specific value when a mapping exists, otherwise a copy
/// of `key` unchanged, so the result is always directly usable. The caller
/// **must** free the returned string with `shaper_free_string`.
/// Returns `NULL` only for null/invalid arguments.
///
/// # Safety
///
/// - `handle` must be either null or a valid handle from `shaper_codec_create`.
/// - `key` and `kind` must be either null or valid pointers to
///   NUL-terminated UTF-8 C strings.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn shaper_codec_get_mapping(
    handle: *const ShaperCodec,
    key: *const c_char,
    kind: *const c_char,
) -> *mut c_char {
    match panic::catch_unwind(panic::AssertUnwindSafe(|| {
        if handle.is_null() {
            return std::ptr::null_mut();
        }
        let (Some(key), Some(kind)) = (unsafe { str_arg(key) }, unsafe { str_arg(kind) }) else {
            return std::ptr::null_mut();
        };
        string_to_c(unsafe { &*handle }.0.mapping(key, kind))
    })) {
        Ok(ptr) => ptr,
        Err(_) => std::ptr::null_mut(),
    }
}

/// Bulk directional export of the mapping table.
///
/// # Parameters
///
/// - `handle`  - Codec handle.
/// - `kind`    - Namespace filter. `NULL` or `""` exports every namespace.
/// - `reverse` - 0 emits pairs standard key → codec value; nonzero emits
///               the inverse, codec value → standard key.
///
/// # Returns
///
/// An array of string pointers in key/value pairs, in table storage order,
/// terminated by two consecutive `NULL` entries (`2*N + 2` slots for `N`
/// pairs). Every string and the array itself are freshly allocated and
/// exclusively owned by the caller, who **must** release them with
/// `shaper_free_mappings`.
///
/// Returns `NULL` when there is nothing to export — empty table, no entry
/// matching the filter, or a string conversion failure. A `NULL` result
/// means "no data", never an error.
///
/// # Safety
///
/// - `handle` must be either null or a valid handle from `shaper_codec_create`.
/// - `kind` must be either null or a valid pointer to a NUL-terminated
///   UTF-8 C string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn shaper_codec_get_mappings(
    handle: *const ShaperCodec,
    kind: *const c_char,
    reverse: c_int,
) -> *mut *mut c_char {
    match panic::catch_unwind(panic::AssertUnwindSafe(|| {
        if handle.is_null() {
            return std::ptr::null_mut();
        }
        let kind = if kind.is_null() {
            ""
        } else {
            match unsafe { str_arg(kind) } {
                Some(s) => s,
                None => return std::ptr::null_mut(),
            }
        };
        match unsafe { &*handle }.0.mappings(kind, reverse != 0) {
            Some(pairs) => pairs_to_c_array(&pairs),
            None => std::ptr::null_mut(),
        }
    })) {
        Ok(ptr) => ptr,
        Err(_) => std::ptr::null_mut(),
    }
}

/// Free an array that was returned by `shaper_codec_get_mappings`, along
/// with every string in it.
///
/// Passing `NULL` is safe and has no effect.
///
/// # Safety
///
/// `array` must be either null or a pointer previously returned by
/// `shaper_codec_get_mappings`. Each array must only be freed once, and the
/// caller must not have modified its contents.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn shaper_free_mappings(array: *mut *mut c_char) {
    if array.is_null() {
        return;
    }
    let _ = panic::catch_unwind(panic::AssertUnwindSafe(|| {
        // Strings come in pairs, so the first NULL slot starts the
        // two-NULL terminator.
        let mut len = 0usize;
        loop {
            let s = unsafe { *array.add(len) };
            if s.is_null() {
                len += 2;
                break;
            }
            unsafe {
                let _ = CString::from_raw(s);
            }
            len += 1;
        }
        unsafe {
            let _ = Box::from_raw(std::ptr::slice_from_raw_parts_mut(array, len));
        }
    }));
}

/// Log the full mapping table at debug level through the `log` facade.
/// Diagnostic only; a null `handle` is ignored.
///
/// # Safety
///
/// `handle` must be either null or a valid handle from `shaper_codec_create`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn shaper_codec_show_mappings(handle: *const ShaperCodec) {
    let _ = panic::catch_unwind(panic::AssertUnwindSafe(|| {
        if !handle.is_null() {
            unsafe { &*handle }.0.show_mappings();
        }
    }));
}

/// Return a JSON snapshot of the codec's properties and mapping table.
///
/// The caller **must** free the returned string with `shaper_free_string`.
/// Returns `NULL` if `handle` is null or on internal error.
///
/// # Safety
///
/// `handle` must be either null or a valid handle from `shaper_codec_create`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn shaper_codec_describe(handle: *const ShaperCodec) -> *mut c_char {
    match panic::catch_unwind(panic::AssertUnwindSafe(|| {
        if handle.is_null() {
            return std::ptr::null_mut();
        }
        let json = serde_json::to_string(&unsafe { &*handle }.0).unwrap_or_default();
        string_to_c(&json)
    })) {
        Ok(ptr) => ptr,
        Err(_) => std::ptr::null_mut(),
    }
}

/// Return a JSON string containing version information.
///
/// The caller **must** free the returned string with `shaper_free_string`.
/// Returns `NULL` on internal error.
#[unsafe(no_mangle)]
pub extern "C" fn shaper_version() -> *mut c_char {
    match panic::catch_unwind(|| {
        let info = VersionInfo { version: VERSION };
        let json = serde_json::to_string(&info).unwrap_or_default();
        string_to_c(&json)
    }) {
        Ok(ptr) => ptr,
        Err(_) => std::ptr::null_mut(),
    }
}

/// Free a string that was returned by one of the `shaper_*` functions.
///
/// Passing `NULL` is safe and has no effect.
///
/// # Safety
///
/// `s` must be either null or a pointer previously returned by one of the
/// `shaper_*` functions in this library. Each pointer must only be freed once.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn shaper_free_string(s: *mut c_char) {
    if !s.is_null() {
        unsafe {
            let _ = CString::from_raw(s);
        }
    }
}
