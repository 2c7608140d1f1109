/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/
//! An abstraction over whatever thread-safe shared pointer type (i.e. Arc<T>-like)
//! the library has decided to use for handles to registered objects.
//!
//! Tracked objects are owned by gameplay code, not by the registry. The registry
//! only keeps [`WeakObjectRef`]s downgraded from these handles, so dropping the
//! registry (or one of its buckets) never disposes of the objects behind them.
//!
//! The backing library's datatype should be treated as a hidden implementation detail
//! for the overwhelming majority of possible purposes.

use alloc::sync::{Arc, Weak};

/// The underlying 'backend' type for ThreadSafeRef
type ThreadSafeRefValue<T> = Arc<T>;

/// The non-owning counterpart of ThreadSafeRefValue
type WeakRefValue<T> = Weak<T>;

/// The identity of a tracked object: the address of its shared allocation.
///
/// Two handles to the same allocation always share an ObjectId, even if one of them
/// is typed as a concrete `SmartWeapon` and the other as a `dyn Weapon`.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ObjectId(usize);

impl ObjectId {
    pub fn to_primitive(self) -> usize {
        self.0
    }
}

impl core::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{:x}", self.0)
    }
}

/// A handle to an externally-owned object, as accepted and returned by the registry.
///
/// Equality and hashing are by identity (see [`ObjectId`]), never by value.
/// Two distinct objects that compare equal by value are still two registrations.
pub struct ThreadSafeRef<T: ?Sized> {
    wrapped: ThreadSafeRefValue<T>
}

impl<T> ThreadSafeRef<T> {
    #[inline]
    pub fn new(val: T) -> Self {
        Self { wrapped: Arc::new(val) }
    }
}

impl<T: ?Sized> ThreadSafeRef<T> {
    #[inline]
    pub fn new_from_ref(val: ThreadSafeRefValue<T>) -> Self {
        Self { wrapped: val }
    }

    #[inline]
    pub fn object_id(&self) -> ObjectId {
        ObjectId(Arc::as_ptr(&self.wrapped) as *const () as usize)
    }

    /// Identity comparison; ignores vtables, so a `dyn` view and a concrete
    /// view of the same object are considered the same.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.object_id() == other.object_id()
    }

    /// A clone of the backing pointer, e.g. for re-wrapping as a base-typed handle.
    pub fn to_arc(&self) -> ThreadSafeRefValue<T> {
        self.wrapped.clone()
    }

    pub fn into_arc(self) -> ThreadSafeRefValue<T> {
        self.wrapped
    }

    /// A handle that does not keep the object alive.
    pub fn downgrade(&self) -> WeakObjectRef<T> {
        WeakObjectRef {
            id: self.object_id(),
            wrapped: Arc::downgrade(&self.wrapped),
        }
    }
}

impl<T: ?Sized> Clone for ThreadSafeRef<T> {
    fn clone(&self) -> Self {
        Self::new_from_ref(self.wrapped.clone())
    }
}

impl<T: ?Sized> From<Arc<T>> for ThreadSafeRef<T> {
    fn from(value: Arc<T>) -> Self {
        Self::new_from_ref(value)
    }
}

impl<T: Default> Default for ThreadSafeRef<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: ?Sized> core::ops::Deref for ThreadSafeRef<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.wrapped.deref()
    }
}

impl<T: ?Sized> AsRef<Arc<T>> for ThreadSafeRef<T> {
    fn as_ref(&self) -> &Arc<T> {
        &self.wrapped
    }
}

impl<T: ?Sized> PartialEq for ThreadSafeRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<T: ?Sized> Eq for ThreadSafeRef<T> {}

impl<T: ?Sized> PartialEq<WeakObjectRef<T>> for ThreadSafeRef<T> {
    fn eq(&self, other: &WeakObjectRef<T>) -> bool {
        self.object_id() == other.object_id()
    }
}

impl<T: ?Sized> core::hash::Hash for ThreadSafeRef<T> {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.object_id().hash(state)
    }
}

// Identity only; the pointee is frequently a trait object without a Debug impl.
impl<T: ?Sized> core::fmt::Debug for ThreadSafeRef<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "ThreadSafeRef({})", self.object_id())
    }
}


/// A non-owning handle to a tracked object, as stored by the registry.
///
/// Shares its [`ObjectId`] with the [`ThreadSafeRef`] it was downgraded from. The id stays
/// unique for as long as any WeakObjectRef to the object exists, even after the object
/// itself was dropped, since the allocation is only released once the last one goes away.
pub struct WeakObjectRef<T: ?Sized> {
    id: ObjectId,
    wrapped: WeakRefValue<T>,
}

impl<T: ?Sized> WeakObjectRef<T> {
    #[inline]
    pub fn object_id(&self) -> ObjectId {
        self.id
    }

    /// A strong handle, if the object is still alive.
    pub fn upgrade(&self) -> Option<ThreadSafeRef<T>> {
        self.wrapped.upgrade().map(ThreadSafeRef::new_from_ref)
    }

    /// Whether the owner still holds the object.
    /// An entry that is registered but no longer alive was never unregistered.
    pub fn is_alive(&self) -> bool {
        self.wrapped.strong_count() > 0
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T: ?Sized> Clone for WeakObjectRef<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            wrapped: self.wrapped.clone(),
        }
    }
}

impl<T: ?Sized> PartialEq for WeakObjectRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<T: ?Sized> Eq for WeakObjectRef<T> {}

impl<T: ?Sized> PartialEq<ThreadSafeRef<T>> for WeakObjectRef<T> {
    fn eq(&self, other: &ThreadSafeRef<T>) -> bool {
        self.id == other.object_id()
    }
}

impl<T: ?Sized> core::hash::Hash for WeakObjectRef<T> {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

impl<T: ?Sized> core::fmt::Debug for WeakObjectRef<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.is_alive() {
            true => write!(f, "WeakObjectRef({})", self.id),
            false => write!(f, "WeakObjectRef({}, dropped)", self.id),
        }
    }
}
