//! Typed accessors for the well-known capabilities.
//!
//! Each accessor resolves its selector through the delegation chain and calls
//! the implementation with the original receiver. A missing capability is a
//! contract violation here and comes back as
//! `ObjectError::CapabilityNotSupported`; use `ObjectSystem::resolve` to look up
//! optional capabilities without treating absence as an error.

use crate::object::method::Capability;
use crate::object::selector::{ObjectId, Selector};
use crate::object::system::ObjectSystem;
use crate::object::{ObjectError, ObjectResult};
use std::any::Any;
use std::io::Write;

/// Implementation type bound to `Selector::GET_TYPE`.
pub type GetTypeFn = fn(&ObjectSystem, ObjectId) -> &'static str;
/// Implementation type bound to `Selector::INITIALIZE`.
pub type InitializeFn = fn(&mut ObjectSystem, ObjectId) -> ObjectResult<()>;
/// Implementation type bound to `Selector::WRITE`.
pub type WriteFn = fn(&mut ObjectSystem, ObjectId, &mut dyn Write) -> ObjectResult<()>;

/// Stable type-name capability.
pub struct GetTypeCapability;

impl Capability for GetTypeCapability {
    const SELECTOR: Selector = Selector::GET_TYPE;
    type Implementation = GetTypeFn;
}

/// Post-construction setup capability.
pub struct InitializeCapability;

impl Capability for InitializeCapability {
    const SELECTOR: Selector = Selector::INITIALIZE;
    type Implementation = InitializeFn;
}

/// One-line description capability.
pub struct WriteCapability;

impl Capability for WriteCapability {
    const SELECTOR: Selector = Selector::WRITE;
    type Implementation = WriteFn;
}

/// Returns the receiver's stable type name.
pub fn get_type(system: &ObjectSystem, object: ObjectId) -> ObjectResult<&'static str> {
    let get_type_fn = system.resolve_capability::<GetTypeCapability>(object)?;
    Ok(get_type_fn(system, object))
}

/// Checks the receiver's type name against `expected`.
pub fn is_type(system: &ObjectSystem, object: ObjectId, expected: &str) -> ObjectResult<bool> {
    Ok(get_type(system, object)? == expected)
}

pub fn initialize(system: &mut ObjectSystem, object: ObjectId) -> ObjectResult<()> {
    let initialize_fn = system.resolve_capability::<InitializeCapability>(object)?;
    initialize_fn(system, object)
}

pub fn write(
    system: &mut ObjectSystem,
    object: ObjectId,
    out: &mut dyn Write,
) -> ObjectResult<()> {
    let write_fn = system.resolve_capability::<WriteCapability>(object)?;
    write_fn(system, object, out)
}

/// Runs `write` into a string.
pub fn describe(system: &mut ObjectSystem, object: ObjectId) -> ObjectResult<String> {
    let mut buffer = Vec::new();
    write(system, object, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Returns an extension's private data after checking the receiver's type.
///
/// Extensions key their data by one of their own selectors so layers stacked
/// on the same instance never share a slot.
///
/// # Errors
/// - `TypeMismatch` when the receiver does not report `expected_type`.
/// - Any error of `get_type` or `ObjectSystem::data_mut`.
pub fn typed_data_mut<'a, T: Any + Default>(
    system: &'a mut ObjectSystem,
    object: ObjectId,
    expected_type: &str,
    key: Selector,
) -> ObjectResult<&'a mut T> {
    let actual = get_type(system, object)?;
    if actual != expected_type {
        return Err(ObjectError::TypeMismatch {
            object,
            expected: expected_type.to_string(),
            actual,
        });
    }
    system.data_mut::<T>(object, key)
}
