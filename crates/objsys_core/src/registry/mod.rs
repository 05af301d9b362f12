//! Method registration storage.
//!
//! # Responsibility
//! - Map (selector, receiver) pairs to implementations.
//! - Own the pooled registration records behind that mapping.
//!
//! # Invariants
//! - At most one registration exists per (selector, receiver).
//! - A failing mutation leaves the registry unchanged.
//! - The registry is only torn down once empty.

use crate::object::selector::{ObjectId, Selector};
use std::error::Error;
use std::fmt::{Display, Formatter};

mod method_registry;
pub mod pool;

pub use method_registry::{MethodKey, MethodRegistry, Registration, RegistryConfig, RegistryStats};

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Protocol violations reported by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    DuplicateRegistration {
        selector: Selector,
        receiver: ObjectId,
    },
    MissingRegistration {
        selector: Selector,
        receiver: ObjectId,
    },
    NotEmpty {
        live: usize,
    },
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateRegistration { selector, receiver } => write!(
                f,
                "duplicate method registration attempt: {selector} on {receiver}"
            ),
            Self::MissingRegistration { selector, receiver } => write!(
                f,
                "nonexistent method registration: {selector} on {receiver}"
            ),
            Self::NotEmpty { live } => write!(
                f,
                "method registry still holds {live} live registration(s)"
            ),
        }
    }
}

impl Error for RegistryError {}
