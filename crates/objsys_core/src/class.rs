//! Class construction convention.
//!
//! # Responsibility
//! - Build an instance on top of one or more bases: allocate, push delegates,
//!   register canonical overrides, then initialize through dispatch.
//! - Provide the root `object` class with default capabilities.
//!
//! # Invariants
//! - `build` either returns a fully registered instance or frees what it
//!   allocated before returning the error.

use crate::dispatch::{
    self, GetTypeCapability, GetTypeFn, InitializeCapability, InitializeFn, WriteCapability,
    WriteFn,
};
use crate::object::method::{Capability, Method};
use crate::object::selector::{ObjectId, Selector};
use crate::object::system::ObjectSystem;
use crate::object::ObjectResult;
use log::{debug, warn};
use std::io::Write;

/// Type name reported by the root class.
pub const OBJECT_TYPE: &str = "object";

/// Collects the delegates and overrides of one new instance.
#[derive(Debug, Clone)]
pub struct ClassBuilder {
    delegates: Vec<ObjectId>,
    methods: Vec<(Selector, Method)>,
    run_initialize: bool,
}

impl ClassBuilder {
    pub fn new() -> Self {
        Self {
            delegates: Vec::new(),
            methods: Vec::new(),
            run_initialize: true,
        }
    }

    /// Adds a base; bases are consulted in the order they are added.
    pub fn delegate(mut self, base: ObjectId) -> Self {
        self.delegates.push(base);
        self
    }

    /// Adds a raw override. Prefer [`ClassBuilder::capability`], which
    /// fixes the stored implementation type.
    pub fn method(mut self, selector: Selector, method: Method) -> Self {
        self.methods.push((selector, method));
        self
    }

    pub fn capability<C: Capability>(self, implementation: C::Implementation) -> Self {
        self.method(C::SELECTOR, Method::capability::<C>(implementation))
    }

    pub fn get_type(self, implementation: GetTypeFn) -> Self {
        self.capability::<GetTypeCapability>(implementation)
    }

    pub fn initialize(self, implementation: InitializeFn) -> Self {
        self.capability::<InitializeCapability>(implementation)
    }

    pub fn write(self, implementation: WriteFn) -> Self {
        self.capability::<WriteCapability>(implementation)
    }

    /// Leaves initialization to the caller.
    pub fn skip_initialize(mut self) -> Self {
        self.run_initialize = false;
        self
    }

    /// Allocates and wires the instance, then runs `initialize` unless
    /// skipped.
    ///
    /// # Errors
    /// - Any delegate or registration error; the new instance is freed.
    /// - `CapabilityNotSupported` when initialize is requested but nothing in
    ///   the chain implements it; the new instance is freed.
    pub fn build(self, system: &mut ObjectSystem) -> ObjectResult<ObjectId> {
        let object = system.alloc();
        if let Err(err) = self.install(system, object) {
            warn!(
                "event=class_build module=class status=error object={} error={}",
                object, err
            );
            if let Err(cleanup) = system.free(object) {
                warn!(
                    "event=class_rollback module=class status=error object={} error={}",
                    object, cleanup
                );
            }
            return Err(err);
        }

        debug!(
            "event=class_build module=class status=ok object={} delegates={} methods={}",
            object,
            self.delegates.len(),
            self.methods.len()
        );
        Ok(object)
    }

    fn install(&self, system: &mut ObjectSystem, object: ObjectId) -> ObjectResult<()> {
        for base in &self.delegates {
            system.push_delegate(object, *base)?;
        }
        for (selector, method) in &self.methods {
            system.register(object, *selector, method.clone())?;
        }
        if self.run_initialize {
            dispatch::initialize(system, object)?;
        }
        Ok(())
    }
}

impl Default for ClassBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a root instance with default `get_type`, `initialize` and `write`.
pub fn object_class(system: &mut ObjectSystem) -> ObjectResult<ObjectId> {
    ClassBuilder::new()
        .get_type(object_get_type)
        .initialize(object_initialize)
        .write(object_write)
        .build(system)
}

fn object_get_type(_system: &ObjectSystem, _object: ObjectId) -> &'static str {
    OBJECT_TYPE
}

fn object_initialize(_system: &mut ObjectSystem, object: ObjectId) -> ObjectResult<()> {
    debug!("event=object_initialize module=class status=ok object={object}");
    Ok(())
}

// Resolves the type from the receiver, so inheritors print their own name.
fn object_write(
    system: &mut ObjectSystem,
    object: ObjectId,
    out: &mut dyn Write,
) -> ObjectResult<()> {
    let type_name = dispatch::get_type(system, object)?;
    writeln!(out, "{type_name}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{object_class, ClassBuilder, OBJECT_TYPE};
    use crate::dispatch;
    use crate::object::selector::{ObjectId, Selector};
    use crate::object::system::ObjectSystem;
    use crate::object::ObjectError;
    use crate::registry::RegistryError;

    fn widget_type(_system: &ObjectSystem, _object: ObjectId) -> &'static str {
        "widget"
    }

    #[test]
    fn root_class_provides_defaults() {
        let mut system = ObjectSystem::new();
        let root = object_class(&mut system).expect("root class");

        assert_eq!(dispatch::get_type(&system, root).expect("type"), OBJECT_TYPE);
        assert_eq!(
            dispatch::describe(&mut system, root).expect("describe"),
            "object\n"
        );
    }

    #[test]
    fn inherited_write_reports_receiver_type() {
        let mut system = ObjectSystem::new();
        let root = object_class(&mut system).expect("root class");
        let widget = ClassBuilder::new()
            .delegate(root)
            .get_type(widget_type)
            .build(&mut system)
            .expect("widget class");

        assert_eq!(
            dispatch::describe(&mut system, widget).expect("describe"),
            "widget\n"
        );
        assert_eq!(system.delegates(widget).expect("live"), &[root]);
    }

    #[test]
    fn failed_build_frees_partial_instance() {
        let mut system = ObjectSystem::new();
        let root = object_class(&mut system).expect("root class");
        let registered_before = system.methods().len();

        let err = ClassBuilder::new()
            .delegate(root)
            .get_type(widget_type)
            .get_type(widget_type)
            .build(&mut system)
            .expect_err("duplicate override must fail");
        assert!(matches!(
            err,
            ObjectError::Registry(RegistryError::DuplicateRegistration { selector, .. })
                if selector == Selector::GET_TYPE
        ));
        assert_eq!(system.len(), 1);
        assert_eq!(system.methods().len(), registered_before);
    }

    #[test]
    fn build_without_initialize_capability_fails() {
        let mut system = ObjectSystem::new();
        let err = ClassBuilder::new()
            .get_type(widget_type)
            .build(&mut system)
            .expect_err("nothing implements initialize");
        assert!(matches!(err, ObjectError::CapabilityNotSupported { .. }));
        assert!(system.is_empty());

        let object = ClassBuilder::new()
            .get_type(widget_type)
            .skip_initialize()
            .build(&mut system)
            .expect("initialize skipped");
        assert!(system.contains(object));
    }

    #[test]
    fn get_type_override_is_an_own_binding() {
        let mut system = ObjectSystem::new();
        let root = object_class(&mut system).expect("root class");
        let widget = ClassBuilder::new()
            .delegate(root)
            .get_type(widget_type)
            .build(&mut system)
            .expect("widget class");

        assert!(system.lookup(widget, Selector::GET_TYPE).is_some());
        assert!(system.lookup(widget, Selector::WRITE).is_none());
        assert!(dispatch::is_type(&system, widget, "widget").expect("widget type"));
        assert!(dispatch::is_type(&system, root, OBJECT_TYPE).expect("root type"));
    }
}
