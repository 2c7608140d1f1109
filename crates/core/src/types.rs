//! The commonly used types of the crate, in one place.

pub use crate::thread_safe_wrapper::{ObjectId, ThreadSafeRef, WeakObjectRef};

pub use crate::class_key::{ClassKey, Object, Registrable, RegistryClass};
pub use crate::entry::{ObjectEntry, ObjectRef, TypedEntryView};
pub use crate::events::{ObjectRegistered, ObjectUnregistered, RegistryNotification, SubscriberId};
pub use crate::registry::{ObjectRegistry, RegisterOutcome, UnregisterOutcome};
