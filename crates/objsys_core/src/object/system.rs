//! Object system context: instances, registrations and resolution.
//!
//! # Responsibility
//! - Own the method registry and every live instance.
//! - Resolve a capability for an instance: own registration first, then
//!   delegates in push order, first match wins.
//!
//! # Invariants
//! - Every registration receiver is a live instance.
//! - `push_delegate` refuses edges that would close a cycle.
//! - `free` refuses instances other live instances still delegate to.

use crate::object::instance::ObjectInstance;
use crate::object::method::{Capability, Method};
use crate::object::selector::{ObjectId, Selector};
use crate::object::{ObjectError, ObjectResult};
use crate::registry::{MethodRegistry, RegistryConfig, RegistryStats};
use log::{debug, warn};
use std::any::Any;
use std::collections::{HashMap, HashSet};

/// Explicit context threaded through every object operation.
pub struct ObjectSystem {
    methods: MethodRegistry<Method>,
    instances: HashMap<ObjectId, ObjectInstance>,
}

impl ObjectSystem {
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            methods: MethodRegistry::with_config(config),
            instances: HashMap::new(),
        }
    }

    /// Allocates a bare instance with no delegates and no registrations.
    pub fn alloc(&mut self) -> ObjectId {
        let id = ObjectId::new();
        self.instances.insert(id, ObjectInstance::new(id));
        debug!("event=object_alloc module=object status=ok object={id}");
        id
    }

    pub fn contains(&self, object: ObjectId) -> bool {
        self.instances.contains_key(&object)
    }

    pub fn instance(&self, object: ObjectId) -> ObjectResult<&ObjectInstance> {
        self.instances
            .get(&object)
            .ok_or(ObjectError::UnknownObject(object))
    }

    fn instance_mut(&mut self, object: ObjectId) -> ObjectResult<&mut ObjectInstance> {
        self.instances
            .get_mut(&object)
            .ok_or(ObjectError::UnknownObject(object))
    }

    /// Live instance count.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Appends `delegate` to the end of `object`'s delegate list.
    ///
    /// # Errors
    /// - `UnknownObject` if either instance is not live.
    /// - `DelegateCycle` if `delegate` is `object` or already reaches it.
    pub fn push_delegate(&mut self, object: ObjectId, delegate: ObjectId) -> ObjectResult<()> {
        self.instance(delegate)?;
        let dependents = self.instance(object)?.dependents();
        // Only an instance something delegates to can be reached from `delegate`.
        let closes_cycle = object == delegate || (dependents > 0 && self.reaches(delegate, object));
        if closes_cycle {
            warn!(
                "event=delegate_push module=object status=error reason=cycle object={} delegate={}",
                object, delegate
            );
            return Err(ObjectError::DelegateCycle { object, delegate });
        }

        self.instance_mut(object)?.push_delegate(delegate);
        self.instance_mut(delegate)?.add_dependent();
        debug!(
            "event=delegate_push module=object status=ok object={} delegate={}",
            object, delegate
        );
        Ok(())
    }

    /// Delegates of `object` in resolution order.
    pub fn delegates(&self, object: ObjectId) -> ObjectResult<&[ObjectId]> {
        Ok(self.instance(object)?.delegates())
    }

    fn reaches(&self, from: ObjectId, target: ObjectId) -> bool {
        let mut pending = vec![from];
        let mut seen = HashSet::new();
        while let Some(current) = pending.pop() {
            if current == target {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            if let Some(instance) = self.instances.get(&current) {
                pending.extend(instance.delegates().iter().copied());
            }
        }
        false
    }

    /// Binds `method` to (`selector`, `object`).
    ///
    /// # Errors
    /// - `UnknownObject` if `object` is not live.
    /// - `Registry(DuplicateRegistration)` if `object` already binds `selector`.
    pub fn register(
        &mut self,
        object: ObjectId,
        selector: Selector,
        method: Method,
    ) -> ObjectResult<()> {
        self.instance(object)?;
        self.methods.register(selector, object, method)?;
        self.instance_mut(object)?.note_registered(selector);
        Ok(())
    }

    /// Removes `object`'s own binding for `selector` and returns it.
    pub fn unregister(&mut self, object: ObjectId, selector: Selector) -> ObjectResult<Method> {
        self.instance(object)?;
        let method = self.methods.unregister(selector, object)?;
        self.instance_mut(object)?.note_unregistered(selector);
        Ok(method)
    }

    /// Replaces `object`'s own binding for `selector` in place.
    ///
    /// Delegates are never touched, so an inherited binding cannot be
    /// overridden this way; register an own binding instead.
    pub fn override_method(
        &mut self,
        object: ObjectId,
        selector: Selector,
        method: Method,
    ) -> ObjectResult<Method> {
        self.instance(object)?;
        Ok(self.methods.override_method(selector, object, method)?)
    }

    /// Own binding only; delegates are not consulted.
    pub fn lookup(&self, object: ObjectId, selector: Selector) -> Option<&Method> {
        self.methods.lookup(selector, object)
    }

    /// Resolves `selector` for `object` through the delegation chain.
    ///
    /// Returns `None` when neither the instance nor any delegate binds it.
    pub fn resolve(&self, object: ObjectId, selector: Selector) -> Option<Method> {
        self.resolve_ref(object, selector).cloned()
    }

    // Depth-first in push order, iterative so long chains cannot overflow the stack.
    fn resolve_ref(&self, object: ObjectId, selector: Selector) -> Option<&Method> {
        let mut pending = vec![object];
        while let Some(current) = pending.pop() {
            if let Some(method) = self.methods.lookup(selector, current) {
                return Some(method);
            }
            if let Some(instance) = self.instances.get(&current) {
                pending.extend(instance.delegates().iter().rev().copied());
            }
        }
        None
    }

    /// Resolves `selector` and recovers an implementation of type `F`.
    ///
    /// # Errors
    /// - `CapabilityNotSupported` when resolution finds nothing.
    /// - `SignatureMismatch` when the bound implementation is not an `F`.
    pub fn resolve_as<F: Any + Copy>(
        &self,
        object: ObjectId,
        selector: Selector,
    ) -> ObjectResult<F> {
        let method = self
            .resolve_ref(object, selector)
            .ok_or(ObjectError::CapabilityNotSupported { selector, object })?;
        method
            .downcast::<F>()
            .ok_or(ObjectError::SignatureMismatch { selector, object })
    }

    /// Binds an implementation of capability `C` to `object`.
    pub fn register_capability<C: Capability>(
        &mut self,
        object: ObjectId,
        implementation: C::Implementation,
    ) -> ObjectResult<()> {
        self.register(object, C::SELECTOR, Method::capability::<C>(implementation))
    }

    /// Resolves capability `C` for `object` through the delegation chain.
    pub fn resolve_capability<C: Capability>(
        &self,
        object: ObjectId,
    ) -> ObjectResult<C::Implementation> {
        self.resolve_as::<C::Implementation>(object, C::SELECTOR)
    }

    /// Returns `object`'s private data slot for `key`, allocating
    /// `T::default()` on first access.
    ///
    /// # Errors
    /// - `UnknownObject` if `object` is not live.
    /// - `DataTypeMismatch` if the slot was first allocated as another type.
    pub fn data_mut<T: Any + Default>(
        &mut self,
        object: ObjectId,
        key: Selector,
    ) -> ObjectResult<&mut T> {
        self.instance_mut(object)?
            .data_mut::<T>(key)
            .ok_or(ObjectError::DataTypeMismatch { key, object })
    }

    /// Unregisters `object`'s own bindings and drops it with its data.
    ///
    /// # Errors
    /// - `UnknownObject` if `object` is not live.
    /// - `DelegateInUse` if another live instance delegates to `object`.
    pub fn free(&mut self, object: ObjectId) -> ObjectResult<()> {
        let dependents = self.instance(object)?.dependents();
        if dependents > 0 {
            warn!(
                "event=object_free module=object status=error reason=delegate_in_use object={} dependents={}",
                object, dependents
            );
            return Err(ObjectError::DelegateInUse { object, dependents });
        }

        let Some(instance) = self.instances.remove(&object) else {
            return Err(ObjectError::UnknownObject(object));
        };
        for delegate in instance.delegates() {
            if let Some(base) = self.instances.get_mut(delegate) {
                base.remove_dependent();
            }
        }
        for selector in instance.own_selectors() {
            self.methods.unregister(*selector, object)?;
        }
        debug!(
            "event=object_free module=object status=ok object={} released={}",
            object,
            instance.own_selectors().len()
        );
        Ok(())
    }

    pub fn methods(&self) -> &MethodRegistry<Method> {
        &self.methods
    }

    pub fn stats(&self) -> RegistryStats {
        self.methods.stats()
    }

    /// Tears the system down.
    ///
    /// # Errors
    /// - `Registry(NotEmpty)` while any registration is live; free every
    ///   instance that owns registrations first.
    pub fn destroy(self) -> ObjectResult<()> {
        self.methods.destroy()?;
        Ok(())
    }
}

impl Default for ObjectSystem {
    fn default() -> Self {
        Self::new()
    }
}
