/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/
//! Buckets of registered objects.
//!
//! Each bucket is stored twice over: an untyped [`ObjectEntry`] of type-erased [`ObjectRef`]s
//! (for callers that only have a runtime [`ClassKey`]) and a strongly-typed sequence of
//! `WeakObjectRef<T>` in the owning [`TypedEntryView<T>`] (for zero-cast retrieval).
//! The two sequences are kept in lockstep: same length, same order, same objects.
//!
//! Neither sequence keeps the objects alive; both hold weak handles only.
//!
//! The registry holds every view as a `Box<dyn ErasedEntry>`; the erased trait is the
//! only thing it needs to manipulate a bucket without knowing `T`.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;

use bevy::platform::collections::HashSet;

use crate::class_key::{ClassKey, Registrable};
use crate::types::{ObjectId, ThreadSafeRef, WeakObjectRef};


/// The erased weak handle inside an ObjectRef.
trait ErasedHandle: Send + Sync {
    fn is_alive(&self) -> bool;

    fn as_any(&self) -> &dyn Any;
}

impl<T: ?Sized + Registrable> ErasedHandle for WeakObjectRef<T> {
    fn is_alive(&self) -> bool {
        WeakObjectRef::is_alive(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}


/// A type-erased, base-typed, non-owning reference to a registered object.
///
/// Carries the object's identity, its most-derived class and the class it was
/// registered under. The typed handle can be recovered with [`ObjectRef::downcast`]
/// using the type the object was registered as, as long as its owner still holds it.
#[derive(Clone)]
pub struct ObjectRef {
    id: ObjectId,
    class: ClassKey,
    registered_as: ClassKey,
    handle: Arc<dyn ErasedHandle>,
}

impl ObjectRef {
    pub fn new<T: ?Sized + Registrable>(object: &ThreadSafeRef<T>) -> Self {
        Self::from_weak(object.downgrade(), object.object_class())
    }

    fn from_weak<T: ?Sized + Registrable>(object: WeakObjectRef<T>, class: ClassKey) -> Self {
        Self {
            id: object.object_id(),
            class,
            registered_as: T::static_class(),
            handle: Arc::new(object),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// The most-derived runtime class of the object.
    pub fn object_class(&self) -> ClassKey {
        self.class
    }

    /// The class whose bucket this reference was created for.
    pub fn registered_as(&self) -> ClassKey {
        self.registered_as
    }

    /// Recovers a strong typed handle. Only succeeds for the exact type used at
    /// registration, and only while the object is alive.
    pub fn downcast<T: ?Sized + 'static>(&self) -> Option<ThreadSafeRef<T>> {
        self.downcast_weak::<T>()?.upgrade()
    }

    /// Recovers the typed weak handle the registry stores, alive or not.
    pub fn downcast_weak<T: ?Sized + 'static>(&self) -> Option<&WeakObjectRef<T>> {
        self.handle.as_any().downcast_ref::<WeakObjectRef<T>>()
    }

    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.handle.as_any().is::<WeakObjectRef<T>>()
    }

    pub fn is_alive(&self) -> bool {
        self.handle.is_alive()
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ObjectRef {}

impl core::hash::Hash for ObjectRef {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

impl core::fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ObjectRef")
            .field("id", &self.id)
            .field("class", &self.class)
            .field("registered_as", &self.registered_as)
            .field("alive", &self.is_alive())
            .finish()
    }
}


/// The untyped half of a bucket: one class's registered objects, in insertion order,
/// plus the set of identities used to reject duplicates.
#[derive(Debug)]
pub struct ObjectEntry {
    class: ClassKey,
    objects: Vec<ObjectRef>,
    identities: HashSet<ObjectId>,
}

impl ObjectEntry {
    pub fn new(class: ClassKey) -> Self {
        Self {
            class,
            objects: Vec::new(),
            identities: HashSet::default(),
        }
    }

    pub fn class(&self) -> ClassKey {
        self.class
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> &[ObjectRef] {
        &self.objects
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.identities.contains(&id)
    }

    /// Appends the object unless its identity is already present.
    fn insert(&mut self, object: ObjectRef) -> bool {
        if !self.identities.insert(object.id()) {
            return false
        }

        self.objects.push(object);
        true
    }

    /// Removes the object, returning where it was so the typed view can follow suit.
    fn remove(&mut self, id: ObjectId) -> Option<(usize, ObjectRef)> {
        if !self.identities.remove(&id) {
            return None
        }

        let Some(index) = self.objects.iter().position(|object| object.id() == id) else {
            #[cfg(feature = "logging")]
            bevy::log::error!(
                "Object {} was marked as registered in {} but is missing from its list!",
                id, self.class
            );
            return None
        };

        Some((index, self.objects.remove(index)))
    }
}


/// The typed half of a bucket, owning the untyped half.
///
/// `typed()[i]` and `entry().objects()[i]` always refer to the same object.
pub struct TypedEntryView<T: ?Sized> {
    entry: ObjectEntry,
    typed: Vec<WeakObjectRef<T>>,
}

impl<T: ?Sized + Registrable> TypedEntryView<T> {
    pub fn new() -> Self {
        Self {
            entry: ObjectEntry::new(T::static_class()),
            typed: Vec::new(),
        }
    }

    pub fn entry(&self) -> &ObjectEntry {
        &self.entry
    }

    pub fn typed(&self) -> &[WeakObjectRef<T>] {
        &self.typed
    }

    /// Strong handles to the objects that are still alive, in registration order.
    pub fn iter_alive(&self) -> impl Iterator<Item = ThreadSafeRef<T>> + '_ {
        self.typed.iter().filter_map(WeakObjectRef::upgrade)
    }

    /// Appends to both sequences. Returns the erased reference if the object was new.
    pub(crate) fn insert(&mut self, object: &ThreadSafeRef<T>) -> Option<ObjectRef> {
        if self.entry.contains(object.object_id()) {
            return None
        }

        let weak = object.downgrade();
        let erased = ObjectRef::from_weak(weak.clone(), object.object_class());

        if !self.entry.insert(erased.clone()) {
            return None
        }

        self.typed.push(weak);
        Some(erased)
    }
}

impl<T: ?Sized + Registrable> Default for TypedEntryView<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> core::fmt::Debug for TypedEntryView<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TypedEntryView")
            .field("entry", &self.entry)
            .field("typed", &self.typed)
            .finish()
    }
}


/// What the registry needs from a bucket without knowing its element type.
pub(crate) trait ErasedEntry: Send + Sync {
    fn entry(&self) -> &ObjectEntry;

    /// Removes the object from both sequences and the identity set.
    fn remove_object(&mut self, id: ObjectId) -> Option<ObjectRef>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: ?Sized + Registrable> ErasedEntry for TypedEntryView<T> {
    fn entry(&self) -> &ObjectEntry {
        &self.entry
    }

    fn remove_object(&mut self, id: ObjectId) -> Option<ObjectRef> {
        let (index, removed) = self.entry.remove(id)?;
        let typed = self.typed.remove(index);
        debug_assert_eq!(typed.object_id(), id, "typed and untyped sequences diverged");
        Some(removed)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
