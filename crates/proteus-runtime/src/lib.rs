//! Proteus runtime: the prototype object model and core output routines.
//! All functions are exposed as C-compatible symbols under the names the
//! compiler declares, so generated code can call them directly.

mod object;

pub use object::{ObjRef, Object, Word};

use std::ffi::CStr;
use std::io::Write;
use std::os::raw::c_char;

use tracing::{trace, warn};

/// Convert a C string pointer to an owned Rust string.
unsafe fn cstr_to_string(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    // SAFETY: non-null pointers come from NUL-terminated literals.
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

/// Allocate an object whose prototype is `prototype` (may be null).
///
/// # Safety
/// `prototype` must be null or an object pointer returned by this runtime.
#[export_name = "newobj"]
pub unsafe extern "C" fn proteus_newobj(prototype: Word) -> Word {
    let prototype = unsafe { ObjRef::from_ptr(prototype) };
    let object = ObjRef::new(prototype);

    // The initializer slot is looked up but never invoked
    if let Some(proto) = prototype {
        let init = proto.get_slot("init", true);
        trace!(has_init = !init.is_null(), "newobj init lookup");
    }

    trace!(object = ?object, "newobj");
    object.as_ptr()
}

/// Look `key` up on `object`, following prototypes when `follow_chain != 0`.
/// A null object or a miss yields null.
///
/// # Safety
/// `object` must be null or an object pointer; `key` a C string.
#[export_name = "getSlot"]
pub unsafe extern "C" fn proteus_get_slot(object: Word, key: *const c_char, follow_chain: i64) -> Word {
    let Some(object) = (unsafe { ObjRef::from_ptr(object) }) else {
        trace!("getSlot on null");
        return std::ptr::null_mut();
    };
    let key = unsafe { cstr_to_string(key) };
    object.get_slot(&key, follow_chain != 0)
}

/// Store `value` under `key` on `object` itself.
///
/// # Safety
/// `object` must be null or an object pointer; `key` a C string.
#[export_name = "putSlot"]
pub unsafe extern "C" fn proteus_put_slot(object: Word, key: *const c_char, value: Word) {
    let key = unsafe { cstr_to_string(key) };
    match unsafe { ObjRef::from_ptr(object) } {
        Some(object) => {
            trace!(%key, "putSlot");
            object.put_slot(&key, value);
        }
        None => warn!(%key, "putSlot on null object ignored"),
    }
}

#[export_name = "print_int"]
pub extern "C" fn proteus_print_int(value: i64) {
    let _ = writeln!(std::io::stdout().lock(), "{}", value);
}

#[export_name = "print_double"]
pub extern "C" fn proteus_print_double(value: f64) {
    let _ = writeln!(std::io::stdout().lock(), "{}", value);
}

/// # Safety
/// `value` must be null or a NUL-terminated string.
#[export_name = "print_str"]
pub unsafe extern "C" fn proteus_print_str(value: *const c_char) {
    let text = unsafe { cstr_to_string(value) };
    let _ = writeln!(std::io::stdout().lock(), "{}", text);
}

/// Symbol table for in-process linking: every exported name and its address.
pub fn symbols() -> Vec<(&'static str, *const u8)> {
    vec![
        ("newobj", proteus_newobj as *const u8),
        ("getSlot", proteus_get_slot as *const u8),
        ("putSlot", proteus_put_slot as *const u8),
        ("print_int", proteus_print_int as *const u8),
        ("print_double", proteus_print_double as *const u8),
        ("print_str", proteus_print_str as *const u8),
    ]
}
