//! Prototype objects: a slot map plus an optional, fixed prototype.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

use tracing::trace;

/// Contents of a slot. Generated code stores whatever word it has at hand
/// (object pointers, integers, string pointers), so slots hold raw words.
pub type Word = *mut Object;

/// A runtime object.
///
/// The layout is fixed: the prototype pointer comes first, the slot map
/// handle second.
#[repr(C)]
pub struct Object {
    prototype: Option<ObjRef>,
    slots: Box<RefCell<HashMap<String, Word>>>,
}

/// Non-owning handle to a live object. Objects are never freed, so a handle
/// stays valid for the rest of the process.
#[repr(transparent)]
#[derive(Clone, Copy)]
pub struct ObjRef(&'static Object);

impl ObjRef {
    /// Allocate an object with no slots.
    pub fn new(prototype: Option<ObjRef>) -> ObjRef {
        let object = Box::leak(Box::new(Object {
            prototype,
            slots: Box::new(RefCell::new(HashMap::new())),
        }));
        ObjRef(object)
    }

    /// Reinterpret a word coming from generated code.
    ///
    /// # Safety
    /// `ptr` must be null or a pointer previously produced by [`ObjRef::as_ptr`].
    pub unsafe fn from_ptr(ptr: Word) -> Option<ObjRef> {
        // SAFETY: upheld by the caller; objects are leaked so 'static holds.
        unsafe { (ptr as *const Object).as_ref() }.map(ObjRef)
    }

    pub fn as_ptr(self) -> Word {
        self.0 as *const Object as Word
    }

    pub fn prototype(self) -> Option<ObjRef> {
        self.0.prototype
    }

    /// Look `key` up in this object, then along the prototype chain when
    /// `follow_chain` is set. A miss is null.
    pub fn get_slot(self, key: &str, follow_chain: bool) -> Word {
        let mut current = Some(self);
        while let Some(object) = current {
            if let Some(&value) = object.0.slots.borrow().get(key) {
                trace!(key, "slot hit");
                return value;
            }
            if !follow_chain {
                break;
            }
            current = object.prototype();
        }
        trace!(key, "slot miss");
        std::ptr::null_mut()
    }

    /// Insert or overwrite `key` on this object only.
    pub fn put_slot(self, key: &str, value: Word) {
        self.0.slots.borrow_mut().insert(key.to_string(), value);
    }

    /// Whether this object itself holds `key`.
    #[cfg(test)]
    pub fn has_own_slot(self, key: &str) -> bool {
        self.0.slots.borrow().contains_key(key)
    }

    pub fn slot_count(self) -> usize {
        self.0.slots.borrow().len()
    }
}

impl PartialEq for ObjRef {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.0, other.0)
    }
}

impl Eq for ObjRef {}

impl fmt::Debug for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjRef({:p})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    fn word(n: usize) -> Word {
        n as Word
    }

    #[test]
    fn test_put_overwrites() {
        let obj = ObjRef::new(None);
        obj.put_slot("k", word(1));
        obj.put_slot("k", word(2));
        assert_eq!(obj.get_slot("k", true), word(2));
        assert_eq!(obj.slot_count(), 1);
    }

    #[test]
    fn test_prototype_fallback() {
        let base = ObjRef::new(None);
        let middle = ObjRef::new(Some(base));
        let leaf = ObjRef::new(Some(middle));

        base.put_slot("greeting", word(7));
        middle.put_slot("name", word(8));

        assert_eq!(leaf.get_slot("greeting", true), word(7));
        assert_eq!(leaf.get_slot("name", true), word(8));
        assert!(leaf.get_slot("missing", true).is_null());
        assert!(!leaf.has_own_slot("greeting"));

        // Own slots shadow the prototype's
        leaf.put_slot("greeting", word(9));
        assert_eq!(leaf.get_slot("greeting", true), word(9));
        assert_eq!(base.get_slot("greeting", true), word(7));
    }

    #[test]
    fn test_no_follow_ignores_prototype() {
        let base = ObjRef::new(None);
        base.put_slot("k", word(1));
        let child = ObjRef::new(Some(base));

        assert!(child.get_slot("k", false).is_null());
        child.put_slot("k", word(2));
        assert_eq!(child.get_slot("k", false), word(2));
    }

    #[test]
    fn test_pointer_round_trip() {
        let obj = ObjRef::new(None);
        let back = unsafe { ObjRef::from_ptr(obj.as_ptr()) };
        assert_eq!(back, Some(obj));
        assert_eq!(unsafe { ObjRef::from_ptr(std::ptr::null_mut()) }, None);
        assert_ne!(obj, ObjRef::new(None));
    }

    #[test]
    fn test_layout() {
        assert_eq!(offset_of!(Object, prototype), 0);
        assert_eq!(offset_of!(Object, slots), size_of::<*const ()>());
        assert_eq!(size_of::<ObjRef>(), size_of::<*const ()>());
    }
}
