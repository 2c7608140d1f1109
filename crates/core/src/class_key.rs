/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/
//! Runtime class identity for registrable types.
//!
//! Rust has no class hierarchy to reflect over, so registrable types declare theirs
//! explicitly: every type that can be used as a registry bucket implements [`RegistryClass`],
//! and every concrete object that can be registered implements [`Object`] to report its
//! most-derived class at runtime.
//!
//! Abstract 'base classes' are modelled as trait object types, e.g. `dyn Weapon`.
//! A concrete `SmartWeapon` declares `dyn Weapon` as its parent, and a `ThreadSafeRef<dyn Weapon>`
//! pointing at a `SmartWeapon` can then be registered under the `dyn Weapon` bucket.
//!
//! The [`registry_class!`] and [`registry_object!`] macros take care of the boilerplate.

use core::any::{Any, TypeId};

/// Upper bound on the length of a parent chain we are willing to walk.
/// Anything deeper is almost certainly a cycle introduced by a bad `RegistryClass` impl.
pub const MAX_CLASS_DEPTH: usize = 64;

/// A stable, collision-free identifier for a registrable type.
///
/// Identity is the [`TypeId`] of the type; the name is only kept around for diagnostics
/// and is never compared, so two types that happen to share a short name cannot collide.
#[derive(Clone, Copy)]
pub struct ClassKey {
    type_id: TypeId,
    name: &'static str,
    parent: Option<fn() -> ClassKey>,
}

impl ClassKey {
    /// A class with no parent.
    pub fn root<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: core::any::type_name::<T>(),
            parent: None,
        }
    }

    /// A class deriving from `P`.
    pub fn with_parent<T: ?Sized + 'static, P: ?Sized + RegistryClass>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: core::any::type_name::<T>(),
            parent: Some(<P as RegistryClass>::static_class),
        }
    }

    /// Shorthand for `T::static_class()`.
    #[inline]
    pub fn of<T: ?Sized + RegistryClass>() -> Self {
        T::static_class()
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn parent(&self) -> Option<ClassKey> {
        self.parent.map(|parent_fn| parent_fn())
    }

    /// Returns true if this class is `ancestor` or (transitively) derives from it.
    ///
    /// Reflexive, so `key.is_child_of(key)` is always true.
    pub fn is_child_of(&self, ancestor: ClassKey) -> bool {
        let mut current = Some(*self);
        let mut depth = 0;

        while let Some(class) = current {
            if class == ancestor {
                return true
            }

            if depth >= MAX_CLASS_DEPTH {
                #[cfg(feature = "logging")]
                bevy::log::error!(
                    "Class chain of {} is deeper than {} levels while looking for {} - is there a cycle?",
                    self, MAX_CLASS_DEPTH, ancestor
                );
                return false
            }

            depth += 1;
            current = class.parent();
        }

        false
    }

    /// Iterates over this class and its parents, most-derived first.
    pub fn lineage(&self) -> impl Iterator<Item = ClassKey> {
        core::iter::successors(Some(*self), ClassKey::parent).take(MAX_CLASS_DEPTH + 1)
    }
}

impl PartialEq for ClassKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ClassKey {}

impl core::hash::Hash for ClassKey {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.type_id.hash(state)
    }
}

impl core::fmt::Debug for ClassKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "ClassKey({})", self.name)
    }
}

impl core::fmt::Display for ClassKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name)
    }
}


/// A type that can be used as a registry bucket, i.e. the `T` in `register::<T>()`.
///
/// This is implemented both for concrete object types and for trait object types
/// acting as abstract base classes (`dyn Weapon`).
pub trait RegistryClass: 'static {
    fn static_class() -> ClassKey;
}

/// Something that can report its most-derived class at runtime.
///
/// Because this is object-safe, traits extending it (`trait Weapon: Object`) get
/// `object_class()` dispatched through the vtable, which is what lets the registry
/// tell a `SmartWeapon` apart from a `BasicWeapon` behind a `dyn Weapon`.
pub trait Object: Any + Send + Sync {
    fn object_class(&self) -> ClassKey;
}

/// Everything the registry needs from a requested type: a static class to bucket by
/// and a runtime class to validate instances against.
pub trait Registrable: RegistryClass + Object {}

impl<T: ?Sized + RegistryClass + Object> Registrable for T {}


/// Implements [`RegistryClass`] for a type, optionally declaring its parent class.
///
/// ```ignore
/// registry_class!(dyn Actor);
/// registry_class!(dyn Weapon => dyn Actor);
/// ```
#[macro_export]
macro_rules! registry_class {
    ($class:ty => $parent:ty) => {
        impl $crate::class_key::RegistryClass for $class {
            fn static_class() -> $crate::class_key::ClassKey {
                $crate::class_key::ClassKey::with_parent::<$class, $parent>()
            }
        }
    };
    ($class:ty) => {
        impl $crate::class_key::RegistryClass for $class {
            fn static_class() -> $crate::class_key::ClassKey {
                $crate::class_key::ClassKey::root::<$class>()
            }
        }
    };
}

/// Implements both [`RegistryClass`] and [`Object`] for a concrete type.
///
/// ```ignore
/// registry_object!(Target);
/// registry_object!(SmartWeapon => dyn Weapon);
/// ```
#[macro_export]
macro_rules! registry_object {
    ($class:ty => $parent:ty) => {
        $crate::registry_class!($class => $parent);

        impl $crate::class_key::Object for $class {
            fn object_class(&self) -> $crate::class_key::ClassKey {
                <$class as $crate::class_key::RegistryClass>::static_class()
            }
        }
    };
    ($class:ty) => {
        $crate::registry_class!($class);

        impl $crate::class_key::Object for $class {
            fn object_class(&self) -> $crate::class_key::ClassKey {
                <$class as $crate::class_key::RegistryClass>::static_class()
            }
        }
    };
}
