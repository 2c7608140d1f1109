/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/
//! Registration notifications.
//!
//! Subscribers are plain callbacks invoked synchronously, in subscription order, on the
//! thread that performed the mutation and strictly after the mutation is visible.
//! They receive a shared reference to the registry, so calling `get_registered::<T>()`
//! from inside a callback already reflects the change that triggered it.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::class_key::ClassKey;
use crate::entry::ObjectRef;
use crate::registry::ObjectRegistry;

/// Raised after an object was added to the bucket of `class`.
///
/// Not raised for duplicate registrations.
#[derive(Debug, Clone)]
pub struct ObjectRegistered {
    /// The class the object was registered under (the requested type, not the runtime type).
    pub class: ClassKey,
    pub object: ObjectRef,
}

/// Raised after an object was removed from the bucket of `class`.
///
/// Only raised if something was actually removed.
#[derive(Debug, Clone)]
pub struct ObjectUnregistered {
    pub class: ClassKey,
    pub object: ObjectRef,
}

/// Either kind of notification; this is what ends up in the registry's journal.
#[derive(Debug, Clone)]
pub enum RegistryNotification {
    Registered(ObjectRegistered),
    Unregistered(ObjectUnregistered),
}

impl RegistryNotification {
    pub fn class(&self) -> ClassKey {
        match self {
            Self::Registered(evt) => evt.class,
            Self::Unregistered(evt) => evt.class,
        }
    }

    pub fn object(&self) -> &ObjectRef {
        match self {
            Self::Registered(evt) => &evt.object,
            Self::Unregistered(evt) => &evt.object,
        }
    }

    pub fn is_registered(&self) -> bool {
        matches!(self, Self::Registered(_))
    }
}

impl From<ObjectRegistered> for RegistryNotification {
    fn from(value: ObjectRegistered) -> Self {
        Self::Registered(value)
    }
}

impl From<ObjectUnregistered> for RegistryNotification {
    fn from(value: ObjectUnregistered) -> Self {
        Self::Unregistered(value)
    }
}


/// Handle returned by a subscription; pass it to `ObjectRegistry::unsubscribe()` to stop listening.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SubscriberId(pub(crate) u64);

pub type RegistryCallback<E> = Box<dyn FnMut(&ObjectRegistry, &E) + Send + Sync>;

/// A multicast list of callbacks for one event type.
pub struct Delegate<E> {
    subscribers: Vec<(SubscriberId, RegistryCallback<E>)>,
}

impl<E> Delegate<E> {
    pub fn new() -> Self {
        Self { subscribers: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    pub(crate) fn add(&mut self, id: SubscriberId, callback: RegistryCallback<E>) {
        self.subscribers.push((id, callback));
    }

    pub(crate) fn remove(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(subscriber, _)| *subscriber != id);
        before != self.subscribers.len()
    }

    /// Calls every subscriber in subscription order.
    pub(crate) fn broadcast(&mut self, registry: &ObjectRegistry, event: &E) {
        for (_, callback) in self.subscribers.iter_mut() {
            callback(registry, event);
        }
    }
}

impl<E> Default for Delegate<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> core::fmt::Debug for Delegate<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Delegate")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
