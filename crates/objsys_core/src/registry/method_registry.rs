//! Hashed (selector, receiver) -> implementation table.

use crate::object::selector::{ObjectId, Selector};
use crate::registry::pool::{PoolStats, RecordHandle, RecordPool};
use crate::registry::{RegistryError, RegistryResult};
use log::{debug, warn};
use serde::Serialize;
use std::collections::HashMap;

const DEFAULT_INITIAL_CAPACITY: usize = 64;

/// Composite registry key. Equal only when both selector and receiver match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodKey {
    pub selector: Selector,
    pub receiver: ObjectId,
}

impl MethodKey {
    pub fn new(selector: Selector, receiver: ObjectId) -> Self {
        Self { selector, receiver }
    }
}

/// One pooled registration record.
#[derive(Debug, Clone)]
pub struct Registration<M> {
    pub key: MethodKey,
    pub method: M,
}

/// Sizing knobs for a new registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Slots reserved up front in both the index and the record pool.
    pub initial_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }
}

/// Registry snapshot for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub registrations: usize,
    pub pool: PoolStats,
}

/// Owns every registration and the pool its records are drawn from.
///
/// `M` is the implementation handle; the registry never inspects it.
pub struct MethodRegistry<M> {
    index: HashMap<MethodKey, RecordHandle>,
    records: RecordPool<Registration<M>>,
}

impl<M> MethodRegistry<M> {
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            index: HashMap::with_capacity(config.initial_capacity),
            records: RecordPool::with_capacity(config.initial_capacity),
        }
    }

    /// Inserts a new registration.
    ///
    /// # Errors
    /// - `DuplicateRegistration` when the key is already bound; the existing
    ///   binding is left intact.
    pub fn register(
        &mut self,
        selector: Selector,
        receiver: ObjectId,
        method: M,
    ) -> RegistryResult<()> {
        let key = MethodKey::new(selector, receiver);
        if self.index.contains_key(&key) {
            warn!(
                "event=method_register module=registry status=error reason=duplicate selector={} receiver={}",
                selector, receiver
            );
            return Err(RegistryError::DuplicateRegistration { selector, receiver });
        }

        let handle = self.records.alloc(Registration { key, method });
        self.index.insert(key, handle);
        debug!(
            "event=method_register module=registry status=ok selector={} receiver={} slot={}",
            selector,
            receiver,
            handle.index()
        );
        Ok(())
    }

    /// Removes a registration and returns its implementation.
    ///
    /// # Errors
    /// - `MissingRegistration` when the key is not bound.
    pub fn unregister(&mut self, selector: Selector, receiver: ObjectId) -> RegistryResult<M> {
        let key = MethodKey::new(selector, receiver);
        let Some(handle) = self.index.remove(&key) else {
            warn!(
                "event=method_unregister module=registry status=error reason=missing selector={} receiver={}",
                selector, receiver
            );
            return Err(RegistryError::MissingRegistration { selector, receiver });
        };

        match self.records.free(handle) {
            Some(record) => {
                debug!(
                    "event=method_unregister module=registry status=ok selector={} receiver={} slot={}",
                    selector,
                    receiver,
                    handle.index()
                );
                Ok(record.method)
            }
            None => Err(RegistryError::MissingRegistration { selector, receiver }),
        }
    }

    /// Returns the implementation bound to exactly this key.
    pub fn lookup(&self, selector: Selector, receiver: ObjectId) -> Option<&M> {
        let handle = self.index.get(&MethodKey::new(selector, receiver))?;
        self.records.get(*handle).map(|record| &record.method)
    }

    /// Replaces a bound implementation in place and returns the previous one.
    ///
    /// The record keeps its pool slot; the registry size does not change.
    ///
    /// # Errors
    /// - `MissingRegistration` when the key is not bound.
    pub fn override_method(
        &mut self,
        selector: Selector,
        receiver: ObjectId,
        method: M,
    ) -> RegistryResult<M> {
        let record = self
            .index
            .get(&MethodKey::new(selector, receiver))
            .copied()
            .and_then(|handle| self.records.get_mut(handle));
        let Some(record) = record else {
            warn!(
                "event=method_override module=registry status=error reason=missing selector={} receiver={}",
                selector, receiver
            );
            return Err(RegistryError::MissingRegistration { selector, receiver });
        };

        debug!(
            "event=method_override module=registry status=ok selector={} receiver={}",
            selector, receiver
        );
        Ok(std::mem::replace(&mut record.method, method))
    }

    pub fn contains(&self, selector: Selector, receiver: ObjectId) -> bool {
        self.index.contains_key(&MethodKey::new(selector, receiver))
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            registrations: self.len(),
            pool: self.records.stats(),
        }
    }

    /// Tears the registry down.
    ///
    /// # Errors
    /// - `NotEmpty` while any registration is still live.
    pub fn destroy(self) -> RegistryResult<()> {
        if !self.is_empty() {
            warn!(
                "event=registry_destroy module=registry status=error live={}",
                self.len()
            );
            return Err(RegistryError::NotEmpty { live: self.len() });
        }
        debug!("event=registry_destroy module=registry status=ok");
        Ok(())
    }
}

impl<M> Default for MethodRegistry<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{MethodRegistry, RegistryConfig};
    use crate::object::selector::{ObjectId, Selector};
    use crate::registry::RegistryError;

    const SPEAK: Selector = Selector::new("test.speak");
    const WALK: Selector = Selector::new("test.walk");

    #[test]
    fn duplicate_registration_keeps_first_binding() {
        let mut registry = MethodRegistry::new();
        let receiver = ObjectId::new();
        registry
            .register(SPEAK, receiver, 1)
            .expect("first registration should succeed");

        let err = registry
            .register(SPEAK, receiver, 2)
            .expect_err("duplicate registration must fail");
        assert_eq!(
            err,
            RegistryError::DuplicateRegistration {
                selector: SPEAK,
                receiver
            }
        );
        assert_eq!(registry.lookup(SPEAK, receiver), Some(&1));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn register_lookup_unregister_roundtrip() {
        let mut registry = MethodRegistry::new();
        let receiver = ObjectId::new();
        registry
            .register(SPEAK, receiver, "impl")
            .expect("registration should succeed");

        assert_eq!(registry.lookup(SPEAK, receiver), Some(&"impl"));
        assert_eq!(
            registry
                .unregister(SPEAK, receiver)
                .expect("registered key should unregister"),
            "impl"
        );
        assert_eq!(registry.lookup(SPEAK, receiver), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn key_equality_is_composite() {
        let mut registry = MethodRegistry::new();
        let a = ObjectId::new();
        let b = ObjectId::new();
        registry.register(SPEAK, a, 1).expect("speak on a");
        registry.register(WALK, a, 2).expect("walk on a");
        registry.register(SPEAK, b, 3).expect("speak on b");

        assert_eq!(registry.lookup(SPEAK, a), Some(&1));
        assert_eq!(registry.lookup(WALK, a), Some(&2));
        assert_eq!(registry.lookup(SPEAK, b), Some(&3));
        assert_eq!(registry.lookup(WALK, b), None);
    }

    #[test]
    fn override_replaces_in_place_without_growing() {
        let mut registry = MethodRegistry::new();
        let receiver = ObjectId::new();
        registry.register(SPEAK, receiver, 1).expect("register");
        let before = registry.stats();

        let previous = registry
            .override_method(SPEAK, receiver, 2)
            .expect("override of bound key should succeed");
        assert_eq!(previous, 1);
        assert_eq!(registry.lookup(SPEAK, receiver), Some(&2));

        let after = registry.stats();
        assert_eq!(after.registrations, 1);
        assert_eq!(after.pool, before.pool);
    }

    #[test]
    fn missing_key_mutations_fail_without_side_effects() {
        let mut registry: MethodRegistry<u32> = MethodRegistry::new();
        let receiver = ObjectId::new();

        let err = registry
            .unregister(SPEAK, receiver)
            .expect_err("unregister of missing key must fail");
        assert!(matches!(err, RegistryError::MissingRegistration { .. }));

        let err = registry
            .override_method(SPEAK, receiver, 9)
            .expect_err("override of missing key must fail");
        assert!(matches!(err, RegistryError::MissingRegistration { .. }));

        assert!(registry.is_empty());
        assert_eq!(registry.stats().pool.allocations, 0);
    }

    #[test]
    fn unregistered_record_slot_is_recycled() {
        let mut registry = MethodRegistry::with_config(RegistryConfig {
            initial_capacity: 2,
        });
        let receiver = ObjectId::new();
        registry.register(SPEAK, receiver, 1).expect("register speak");
        registry.unregister(SPEAK, receiver).expect("unregister speak");
        registry.register(WALK, receiver, 2).expect("register walk");

        let stats = registry.stats();
        assert_eq!(stats.registrations, 1);
        assert_eq!(stats.pool.capacity, 1);
        assert_eq!(stats.pool.reuses, 1);
    }

    #[test]
    fn destroy_requires_empty_registry() {
        let mut registry = MethodRegistry::new();
        let receiver = ObjectId::new();
        registry.register(SPEAK, receiver, ()).expect("register");

        let err = registry.destroy().expect_err("non-empty destroy must fail");
        assert_eq!(err, RegistryError::NotEmpty { live: 1 });

        let mut registry = MethodRegistry::new();
        registry.register(SPEAK, receiver, ()).expect("register");
        registry.unregister(SPEAK, receiver).expect("unregister");
        registry.destroy().expect("empty destroy should succeed");
    }
}
