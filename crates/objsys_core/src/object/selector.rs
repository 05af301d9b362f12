//! Capability and receiver identities.
//!
//! # Invariants
//! - A `Selector` is compared and hashed by its name only; it is never
//!   invoked as code.
//! - An `ObjectId` is generated once per instance and never reused.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque identity of one dispatchable capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Selector(&'static str);

impl Selector {
    /// Returns the stable type-name string of a receiver.
    pub const GET_TYPE: Selector = Selector::new("object.get_type");
    /// Runs after construction to set up an instance's data.
    pub const INITIALIZE: Selector = Selector::new("object.initialize");
    /// Writes a one-line description of the receiver.
    pub const WRITE: Selector = Selector::new("object.write");

    /// Declares a selector. Names should be namespaced by extension,
    /// e.g. `car.wheelsize`, to avoid accidental collisions.
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(self) -> &'static str {
        self.0
    }
}

impl Display for Selector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// Stable identity of one object instance (the receiver of registrations).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ObjectId(Uuid);

impl ObjectId {
    /// Generates a fresh identity.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an externally provided identity. Returns `None` for the nil uuid.
    pub fn from_uuid(uuid: Uuid) -> Option<Self> {
        if uuid.is_nil() {
            None
        } else {
            Some(Self(uuid))
        }
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let uuid = Uuid::deserialize(deserializer)?;
        Self::from_uuid(uuid).ok_or_else(|| serde::de::Error::custom("object id must not be nil"))
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
