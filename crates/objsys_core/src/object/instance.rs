//! Per-instance state: delegates, owned selectors and data slots.

use crate::object::selector::{ObjectId, Selector};
use std::any::Any;
use std::collections::HashMap;

/// One object instance as stored by the object system.
///
/// Delegates are non-owning references; they are consulted in push order.
pub struct ObjectInstance {
    id: ObjectId,
    delegates: Vec<ObjectId>,
    dependents: usize,
    own_selectors: Vec<Selector>,
    data: HashMap<Selector, Box<dyn Any>>,
}

impl ObjectInstance {
    pub(crate) fn new(id: ObjectId) -> Self {
        Self {
            id,
            delegates: Vec::new(),
            dependents: 0,
            own_selectors: Vec::new(),
            data: HashMap::new(),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Delegates in resolution order (first pushed first).
    pub fn delegates(&self) -> &[ObjectId] {
        &self.delegates
    }

    /// Selectors this instance holds its own registrations for, in
    /// registration order.
    pub fn own_selectors(&self) -> &[Selector] {
        &self.own_selectors
    }

    pub fn delegates_to(&self, other: ObjectId) -> bool {
        self.delegates.contains(&other)
    }

    /// Number of delegate edges pointing at this instance.
    pub fn dependents(&self) -> usize {
        self.dependents
    }

    pub fn has_data(&self, key: Selector) -> bool {
        self.data.contains_key(&key)
    }

    pub(crate) fn push_delegate(&mut self, delegate: ObjectId) {
        self.delegates.push(delegate);
    }

    pub(crate) fn add_dependent(&mut self) {
        self.dependents += 1;
    }

    pub(crate) fn remove_dependent(&mut self) {
        self.dependents = self.dependents.saturating_sub(1);
    }

    pub(crate) fn note_registered(&mut self, selector: Selector) {
        self.own_selectors.push(selector);
    }

    pub(crate) fn note_unregistered(&mut self, selector: Selector) {
        self.own_selectors.retain(|own| *own != selector);
    }

    /// Returns the slot for `key`, allocating `T::default()` on first access.
    ///
    /// Returns `None` when the slot already holds a value of another type.
    pub(crate) fn data_mut<T: Any + Default>(&mut self, key: Selector) -> Option<&mut T> {
        self.data
            .entry(key)
            .or_insert_with(|| Box::new(T::default()))
            .downcast_mut::<T>()
    }
}
