//! Type-erased implementation handles.

use crate::object::selector::Selector;
use std::any::Any;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

/// Ties a selector to the function-pointer type its implementations have.
///
/// Registering and resolving through a `Capability` coerces function items to
/// `Implementation` at the call site, so the stored type always matches what
/// the accessor downcasts to.
pub trait Capability {
    const SELECTOR: Selector;
    type Implementation: Any + Copy;
}

/// Shareable handle to one capability implementation.
///
/// Implementations are stored as plain function pointers of the type the
/// capability's accessor expects (see `dispatch::GetTypeFn` and friends), and
/// recovered with [`Method::downcast`].
#[derive(Clone)]
pub struct Method(Rc<dyn Any>);

impl Method {
    /// Wraps `implementation` under its exact type.
    ///
    /// A function item passed without a turbofish keeps its unique item type
    /// and will not downcast to the matching `fn` pointer type; write
    /// `Method::new::<SpeakFn>(speak)` or use [`Method::capability`].
    pub fn new<F: Any>(implementation: F) -> Self {
        Self(Rc::new(implementation))
    }

    /// Wraps an implementation of capability `C`.
    pub fn capability<C: Capability>(implementation: C::Implementation) -> Self {
        Self::new(implementation)
    }

    /// Returns a copy of the implementation if it has type `F`.
    pub fn downcast<F: Any + Copy>(&self) -> Option<F> {
        self.0.downcast_ref::<F>().copied()
    }

    pub fn downcast_ref<F: Any>(&self) -> Option<&F> {
        self.0.downcast_ref::<F>()
    }

    /// Whether both handles point at the same registered implementation.
    pub fn ptr_eq(&self, other: &Method) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Debug for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Method({:p})", Rc::as_ptr(&self.0))
    }
}
