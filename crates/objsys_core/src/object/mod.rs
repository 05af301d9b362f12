//! Object instances and delegation-based dispatch.
//!
//! # Responsibility
//! - Give every instance a stable identity, an ordered delegate list and
//!   private typed data slots.
//! - Resolve capabilities by checking the receiver first, then its delegates
//!   in push order.
//!
//! # Invariants
//! - The delegate graph never contains a cycle.
//! - An instance still used as a delegate cannot be freed.
//! - Raw resolution reports "not found" as `None`; typed accessors turn it
//!   into `ObjectError::CapabilityNotSupported`.

use crate::registry::RegistryError;
use selector::{ObjectId, Selector};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod instance;
pub mod method;
pub mod selector;
pub mod system;

pub type ObjectResult<T> = Result<T, ObjectError>;

/// Errors raised by object lifecycle and typed dispatch.
#[derive(Debug)]
pub enum ObjectError {
    Registry(RegistryError),
    UnknownObject(ObjectId),
    DelegateCycle {
        object: ObjectId,
        delegate: ObjectId,
    },
    DelegateInUse {
        object: ObjectId,
        dependents: usize,
    },
    CapabilityNotSupported {
        selector: Selector,
        object: ObjectId,
    },
    SignatureMismatch {
        selector: Selector,
        object: ObjectId,
    },
    DataTypeMismatch {
        key: Selector,
        object: ObjectId,
    },
    TypeMismatch {
        object: ObjectId,
        expected: String,
        actual: &'static str,
    },
    Io(std::io::Error),
}

impl Display for ObjectError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Registry(err) => write!(f, "{err}"),
            Self::UnknownObject(id) => write!(f, "object not found: {id}"),
            Self::DelegateCycle { object, delegate } => write!(
                f,
                "delegating {object} to {delegate} would create a cycle"
            ),
            Self::DelegateInUse { object, dependents } => write!(
                f,
                "object {object} is still a delegate of {dependents} instance(s)"
            ),
            Self::CapabilityNotSupported { selector, object } => {
                write!(f, "capability {selector} not supported by {object}")
            }
            Self::SignatureMismatch { selector, object } => write!(
                f,
                "implementation of {selector} resolved for {object} has an unexpected signature"
            ),
            Self::DataTypeMismatch { key, object } => write!(
                f,
                "data slot {key} of {object} holds a different type"
            ),
            Self::TypeMismatch {
                object,
                expected,
                actual,
            } => write!(f, "object {object} is `{actual}`, expected `{expected}`"),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ObjectError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Registry(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RegistryError> for ObjectError {
    fn from(value: RegistryError) -> Self {
        Self::Registry(value)
    }
}

impl From<std::io::Error> for ObjectError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
