//! Delegating object system.
//!
//! Instances attach capability implementations to themselves or to shared
//! base instances; calls resolve by checking the receiver first and then its
//! delegates in push order.

pub mod class;
pub mod dispatch;
pub mod logging;
pub mod object;
pub mod registry;

pub use class::{object_class, ClassBuilder, OBJECT_TYPE};
pub use dispatch::{
    GetTypeCapability, GetTypeFn, InitializeCapability, InitializeFn, WriteCapability, WriteFn,
};
pub use logging::{default_log_level, init_logging, init_logging_from_env, logging_status};
pub use object::instance::ObjectInstance;
pub use object::method::{Capability, Method};
pub use object::selector::{ObjectId, Selector};
pub use object::system::ObjectSystem;
pub use object::{ObjectError, ObjectResult};
pub use registry::pool::{PoolStats, RecordHandle, RecordPool};
pub use registry::{
    MethodKey, MethodRegistry, Registration, RegistryConfig, RegistryError, RegistryResult,
    RegistryStats,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
