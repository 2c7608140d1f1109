/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/
//! The ObjectRegistry associates classes with lists of live objects and manages them.
//!
//! Gameplay code registers itself under some class `T` when it comes to life and
//! unregisters when it goes away; anything that cares about 'all the `T`s right now'
//! (e.g. a smart weapon looking for targets every frame) asks the registry instead of
//! scanning the world.
//!
//! The registry is purely an index. It holds weak handles to objects owned elsewhere,
//! never creates or disposes of them, and it is the registrant's job to unregister before
//! the object goes away. An entry whose object was dropped without unregistering stays
//! listed (and [`WeakObjectRef::upgrade`] returns None for it) until it is unregistered,
//! e.g. through [`ObjectRegistry::unregister_by_id`].
//!
//! If you want to filter the object list, request a copy with [`ObjectRegistry::get_registered_copy`]
//! and `retain()` on that; the live list is read-only.

use alloc::boxed::Box;
use alloc::vec::Vec;

use bevy::platform::collections::HashMap;

use crate::class_key::{ClassKey, Registrable, RegistryClass};
use crate::entry::{ErasedEntry, ObjectEntry, ObjectRef, TypedEntryView};
use crate::errors::{RegistryError, TypeMismatchStrategy};
use crate::events::{Delegate, ObjectRegistered, ObjectUnregistered, RegistryNotification, SubscriberId};
use crate::settings::{RegistrationPolicy, RegistrySettings};
use crate::types::{ObjectId, ThreadSafeRef, WeakObjectRef};


/// What happened to a `register()` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The object was added and the registered notification fired.
    Registered,
    /// The object was already in the bucket; nothing changed and nothing fired.
    AlreadyRegistered,
    /// The call was refused; the registry is untouched.
    Rejected(RegistryError),
}

impl RegisterOutcome {
    pub fn is_registered(&self) -> bool {
        matches!(self, Self::Registered)
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

/// What happened to an `unregister()` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnregisterOutcome {
    /// The object was removed and the unregistered notification fired.
    Unregistered,
    /// The object was not in the bucket; nothing changed and nothing fired.
    NotRegistered,
    /// The call was refused; the registry is untouched.
    Rejected(RegistryError),
}

impl UnregisterOutcome {
    pub fn is_unregistered(&self) -> bool {
        matches!(self, Self::Unregistered)
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}


#[derive(Default)]
pub struct ObjectRegistry {
    entries: HashMap<ClassKey, Box<dyn ErasedEntry>>,
    settings: RegistrySettings,
    on_registered: Delegate<ObjectRegistered>,
    on_unregistered: Delegate<ObjectUnregistered>,
    next_subscriber: u64,
    journal: Vec<RegistryNotification>,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: RegistrySettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    pub fn settings(&self) -> &RegistrySettings {
        &self.settings
    }

    // The policy is fixed at construction; only these two can change afterwards.

    pub fn set_on_type_mismatch(&mut self, strategy: TypeMismatchStrategy) -> &mut Self {
        self.settings.set_on_type_mismatch(strategy);
        self
    }

    pub fn set_record_notifications(&mut self, record: bool) -> &mut Self {
        self.settings.set_record_notifications(record);
        self
    }

    ///////////////////////////////////////////////////////////////////////////
    // Registry life cycle

    /// Registers an object under class `T`.
    ///
    /// The object's runtime class must be acceptable for `T` under the active
    /// [`RegistrationPolicy`]; otherwise the call is rejected and reported according
    /// to the configured mismatch strategy.
    ///
    /// Registering the same object (by identity) twice under the same `T` is a no-op.
    pub fn register<T: ?Sized + Registrable>(&mut self, object: &ThreadSafeRef<T>) -> RegisterOutcome {
        let class = T::static_class();

        if let Err(error) = self.check_class(class, object.object_class()) {
            self.settings.on_type_mismatch.handle(&error);
            return RegisterOutcome::Rejected(error)
        }

        let bucket = self.entries
            .entry(class)
            .or_insert_with(|| Box::new(TypedEntryView::<T>::new()));

        let Some(view) = bucket.as_any_mut().downcast_mut::<TypedEntryView<T>>() else {
            let error = RegistryError::BucketTypeConflict { class };
            #[cfg(feature = "logging")]
            bevy::log::error!("{}", error);
            return RegisterOutcome::Rejected(error)
        };

        let Some(object_ref) = view.insert(object) else {
            #[cfg(feature = "logging")]
            bevy::log::debug!("Object {} is already registered as {}, skipping", object.object_id(), class);
            return RegisterOutcome::AlreadyRegistered
        };

        #[cfg(feature = "logging")]
        bevy::log::debug!(
            "Registered object {} ({}) as {}",
            object_ref.id(), object_ref.object_class(), class
        );

        self.notify_registered(ObjectRegistered { class, object: object_ref });
        RegisterOutcome::Registered
    }

    /// Unregisters an object from class `T`.
    ///
    /// The same compatibility check as for [`ObjectRegistry::register`] applies, so
    /// unregistering through the wrong type is reported rather than silently ignored.
    /// If the bucket ends up empty, it is dropped.
    pub fn unregister<T: ?Sized + Registrable>(&mut self, object: &ThreadSafeRef<T>) -> UnregisterOutcome {
        let class = T::static_class();

        if let Err(error) = self.check_class(class, object.object_class()) {
            self.settings.on_type_mismatch.handle(&error);
            return UnregisterOutcome::Rejected(error)
        }

        self.remove_from_bucket(class, object.object_id())
    }

    /// Type-erased unregistration, for tooling that only holds a runtime class and an identity.
    ///
    /// Skips the class check, so it also removes entries whose object is already gone.
    pub fn unregister_by_id(&mut self, class: ClassKey, id: ObjectId) -> UnregisterOutcome {
        self.remove_from_bucket(class, id)
    }

    fn remove_from_bucket(&mut self, class: ClassKey, id: ObjectId) -> UnregisterOutcome {
        let Some(bucket) = self.entries.get_mut(&class) else {
            return UnregisterOutcome::NotRegistered
        };

        let Some(removed) = bucket.remove_object(id) else {
            #[cfg(feature = "logging")]
            bevy::log::debug!("Object {} is not registered as {}, nothing to do", id, class);
            return UnregisterOutcome::NotRegistered
        };

        if bucket.entry().is_empty() {
            self.entries.remove(&class);
        }

        #[cfg(feature = "logging")]
        bevy::log::debug!("Unregistered object {} from {}", id, class);

        self.notify_unregistered(ObjectUnregistered { class, object: removed });
        UnregisterOutcome::Unregistered
    }

    fn check_class(&self, requested: ClassKey, actual: ClassKey) -> Result<(), RegistryError> {
        let policy = self.settings.policy;
        let accepted = match policy {
            RegistrationPolicy::Strict => actual == requested,
            RegistrationPolicy::Permissive => actual.is_child_of(requested),
        };

        match accepted {
            true => Ok(()),
            false => Err(RegistryError::TypeMismatch { requested, actual, policy }),
        }
    }

    ///////////////////////////////////////////////////////////////////////////
    // Get Objects - Typed

    /// The live list of objects registered as `T`, in registration order.
    ///
    /// Empty if nothing is registered. Cheap enough to call every frame.
    /// The handles are weak; upgrade them to use the objects.
    pub fn get_registered<T: ?Sized + Registrable>(&self) -> &[WeakObjectRef<T>] {
        self.typed_view::<T>()
            .map(|view| view.typed())
            .unwrap_or(&[])
    }

    /// An independent snapshot of [`ObjectRegistry::get_registered`], safe to filter or mutate.
    pub fn get_registered_copy<T: ?Sized + Registrable>(&self) -> Vec<WeakObjectRef<T>> {
        self.get_registered::<T>().to_vec()
    }

    /// Strong handles to every object registered as `T` that is still alive, in registration order.
    pub fn get_registered_alive<T: ?Sized + Registrable>(&self) -> Vec<ThreadSafeRef<T>> {
        self.typed_view::<T>()
            .map(|view| view.iter_alive().collect())
            .unwrap_or_default()
    }

    pub fn typed_view<T: ?Sized + Registrable>(&self) -> Option<&TypedEntryView<T>> {
        let bucket = self.entries.get(&T::static_class())?;
        let view = bucket.as_any().downcast_ref::<TypedEntryView<T>>();

        #[cfg(feature = "logging")]
        if view.is_none() {
            bevy::log::error!("{}", RegistryError::BucketTypeConflict { class: T::static_class() });
        }

        view
    }

    ///////////////////////////////////////////////////////////////////////////
    // Get Objects - As base

    /// The live, type-erased list of objects registered under `class`.
    pub fn get_registered_as_base(&self, class: ClassKey) -> &[ObjectRef] {
        self.entry(class)
            .map(ObjectEntry::objects)
            .unwrap_or(&[])
    }

    pub fn get_registered_as_base_copy(&self, class: ClassKey) -> Vec<ObjectRef> {
        self.get_registered_as_base(class).to_vec()
    }

    pub fn get_registered_as_base_of<T: ?Sized + RegistryClass>(&self) -> &[ObjectRef] {
        self.get_registered_as_base(T::static_class())
    }

    pub fn get_registered_as_base_copy_of<T: ?Sized + RegistryClass>(&self) -> Vec<ObjectRef> {
        self.get_registered_as_base_copy(T::static_class())
    }

    pub fn entry(&self, class: ClassKey) -> Option<&ObjectEntry> {
        self.entries.get(&class).map(|bucket| bucket.entry())
    }

    ///////////////////////////////////////////////////////////////////////////
    // Introspection

    pub fn registered_count<T: ?Sized + RegistryClass>(&self) -> usize {
        self.entry(T::static_class()).map_or(0, ObjectEntry::len)
    }

    pub fn is_registered<T: ?Sized + Registrable>(&self, object: &ThreadSafeRef<T>) -> bool {
        self.contains_object(T::static_class(), object.object_id())
    }

    /// Type-erased counterpart of [`ObjectRegistry::is_registered`].
    pub fn contains_object(&self, class: ClassKey, id: ObjectId) -> bool {
        self.entry(class).is_some_and(|entry| entry.contains(id))
    }

    /// Whether a (necessarily non-empty) bucket exists for `class`.
    pub fn contains_class(&self, class: ClassKey) -> bool {
        self.entries.contains_key(&class)
    }

    /// Number of live buckets.
    pub fn class_count(&self) -> usize {
        self.entries.len()
    }

    /// Every class that currently has at least one registered object, in no particular order.
    pub fn registered_classes(&self) -> impl Iterator<Item = ClassKey> + '_ {
        self.entries.keys().copied()
    }

    ///////////////////////////////////////////////////////////////////////////
    // Notifications

    /// Subscribes to successful registrations.
    pub fn on_registered<F>(&mut self, callback: F) -> SubscriberId
    where
        F: FnMut(&ObjectRegistry, &ObjectRegistered) + Send + Sync + 'static
    {
        let id = self.allocate_subscriber_id();
        self.on_registered.add(id, Box::new(callback));
        id
    }

    /// Subscribes to successful unregistrations.
    pub fn on_unregistered<F>(&mut self, callback: F) -> SubscriberId
    where
        F: FnMut(&ObjectRegistry, &ObjectUnregistered) + Send + Sync + 'static
    {
        let id = self.allocate_subscriber_id();
        self.on_unregistered.add(id, Box::new(callback));
        id
    }

    /// Removes a subscription made with either `on_registered()` or `on_unregistered()`.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.on_registered.remove(id) || self.on_unregistered.remove(id)
    }

    pub fn has_pending_notifications(&self) -> bool {
        !self.journal.is_empty()
    }

    /// Drains the notification journal (see [`RegistrySettings::record_notifications`]).
    pub fn drain_notifications(&mut self) -> impl Iterator<Item = RegistryNotification> + '_ {
        self.journal.drain(..)
    }

    fn allocate_subscriber_id(&mut self) -> SubscriberId {
        let id = SubscriberId(self.next_subscriber);
        self.next_subscriber += 1;
        id
    }

    fn notify_registered(&mut self, event: ObjectRegistered) {
        if self.settings.record_notifications {
            self.journal.push(event.clone().into());
        }

        self.broadcast(Self::registered_delegate, &event);
    }

    fn notify_unregistered(&mut self, event: ObjectUnregistered) {
        if self.settings.record_notifications {
            self.journal.push(event.clone().into());
        }

        self.broadcast(Self::unregistered_delegate, &event);
    }

    /// Detaches the delegate for the duration of the broadcast so subscribers can read the registry.
    fn broadcast<E>(&mut self, slot: DelegateSlot<E>, event: &E) {
        let delegate = core::mem::take(slot(self));
        let mut detached = DetachedDelegate { registry: self, slot, delegate };
        let DetachedDelegate { registry, delegate, .. } = &mut detached;
        delegate.broadcast(&**registry, event);
    }

    fn registered_delegate(&mut self) -> &mut Delegate<ObjectRegistered> {
        &mut self.on_registered
    }

    fn unregistered_delegate(&mut self) -> &mut Delegate<ObjectUnregistered> {
        &mut self.on_unregistered
    }
}

type DelegateSlot<E> = fn(&mut ObjectRegistry) -> &mut Delegate<E>;

/// Puts a detached delegate back on drop, including when a subscriber panics.
struct DetachedDelegate<'r, E> {
    registry: &'r mut ObjectRegistry,
    slot: DelegateSlot<E>,
    delegate: Delegate<E>,
}

impl<E> Drop for DetachedDelegate<'_, E> {
    fn drop(&mut self) {
        let delegate = core::mem::take(&mut self.delegate);
        *(self.slot)(self.registry) = delegate;
    }
}

impl core::fmt::Debug for ObjectRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ObjectRegistry")
            .field("classes", &self.entries.keys().collect::<Vec<_>>())
            .field("settings", &self.settings)
            .field("on_registered", &self.on_registered)
            .field("on_unregistered", &self.on_unregistered)
            .field("journal", &self.journal.len())
            .finish()
    }
}


#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::sync::Arc;
    use alloc::vec::Vec;
    use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use super::*;
    use crate::class_key::Object;

    trait Actor: Object {}
    crate::registry_class!(dyn Actor);

    trait Weapon: Actor {}
    crate::registry_class!(dyn Weapon => dyn Actor);

    struct BasicWeapon;
    crate::registry_object!(BasicWeapon => dyn Weapon);
    impl Actor for BasicWeapon {}
    impl Weapon for BasicWeapon {}

    struct SmartWeapon;
    crate::registry_object!(SmartWeapon => dyn Weapon);
    impl Actor for SmartWeapon {}
    impl Weapon for SmartWeapon {}

    struct Target;
    crate::registry_object!(Target => dyn Actor);
    impl Actor for Target {}

    fn quiet_registry(policy: RegistrationPolicy) -> ObjectRegistry {
        let mut settings = RegistrySettings::default();
        settings
            .set_policy(policy)
            .set_on_type_mismatch(TypeMismatchStrategy::LogAndIgnore);
        ObjectRegistry::with_settings(settings)
    }

    fn smart_as_weapon() -> ThreadSafeRef<dyn Weapon> {
        ThreadSafeRef::<dyn Weapon>::new_from_ref(Arc::new(SmartWeapon))
    }

    fn ids<T: ?Sized>(list: &[WeakObjectRef<T>]) -> Vec<ObjectId> {
        list.iter().map(WeakObjectRef::object_id).collect()
    }

    #[test]
    fn register_twice_is_idempotent_and_fires_once() {
        let mut registry = ObjectRegistry::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        registry.on_registered(move |_, _| { counter.fetch_add(1, Ordering::SeqCst); });

        let target = ThreadSafeRef::new(Target);
        assert_eq!(registry.register(&target), RegisterOutcome::Registered);
        assert_eq!(registry.register(&target), RegisterOutcome::AlreadyRegistered);

        assert_eq!(ids(registry.get_registered::<Target>()), [target.object_id()]);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn register_then_unregister_drops_the_bucket() {
        let mut registry = ObjectRegistry::new();
        let target = ThreadSafeRef::new(Target);

        registry.register(&target);
        assert!(registry.contains_class(ClassKey::of::<Target>()));

        assert_eq!(registry.unregister(&target), UnregisterOutcome::Unregistered);
        assert!(registry.get_registered::<Target>().is_empty());
        assert!(!registry.contains_class(ClassKey::of::<Target>()));
        assert_eq!(registry.class_count(), 0);
    }

    #[test]
    fn preserves_registration_order() {
        let mut registry = ObjectRegistry::new();
        let [a, b, c] = [(); 3].map(|_| ThreadSafeRef::new(Target));

        for target in [&a, &b, &c] {
            registry.register(target);
        }
        assert_eq!(ids(registry.get_registered::<Target>()), [a.object_id(), b.object_id(), c.object_id()]);

        registry.unregister(&b);
        assert_eq!(ids(registry.get_registered::<Target>()), [a.object_id(), c.object_id()]);
    }

    #[test]
    fn copies_are_independent_of_the_live_list() {
        let mut registry = ObjectRegistry::new();
        let a = ThreadSafeRef::new(Target);
        let b = ThreadSafeRef::new(Target);
        registry.register(&a);
        registry.register(&b);

        let mut copy = registry.get_registered_copy::<Target>();
        copy.retain(|target| *target != a);
        assert_eq!(copy, [b.clone()]);
        copy.clear();

        assert_eq!(ids(registry.get_registered::<Target>()), [a.object_id(), b.object_id()]);
    }

    #[test]
    fn base_copies_are_independent_of_the_live_list() {
        let mut registry = ObjectRegistry::new();
        let basic: ThreadSafeRef<dyn Weapon> = ThreadSafeRef::new_from_ref(Arc::new(BasicWeapon));
        let smart = smart_as_weapon();
        registry.register(&basic);
        registry.register(&smart);

        let mut copy = registry.get_registered_as_base_copy(ClassKey::of::<dyn Weapon>());
        copy.retain(|weapon| weapon.object_class() == ClassKey::of::<SmartWeapon>());
        assert_eq!(copy.len(), 1);
        assert_eq!(copy[0].id(), smart.object_id());

        // Mutating the registry afterwards does not reach into the snapshot either.
        registry.unregister(&smart);
        assert_eq!(copy[0].id(), smart.object_id());

        let live: Vec<ObjectId> = registry
            .get_registered_as_base(ClassKey::of::<dyn Weapon>())
            .iter()
            .map(ObjectRef::id)
            .collect();
        assert_eq!(live, [basic.object_id()]);
    }

    /// Bumps a shared counter when dropped.
    struct DropCounted(Arc<AtomicUsize>);
    crate::registry_object!(DropCounted);

    impl Drop for DropCounted {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn dropping_the_registry_does_not_destroy_tracked_objects() {
        let drops = Arc::new(AtomicUsize::new(0));
        let mut registry = ObjectRegistry::new();
        let object = ThreadSafeRef::new(DropCounted(drops.clone()));

        registry.register(&object);
        let survivor = object.to_arc();
        drop(object);

        drop(registry);
        assert_eq!(drops.load(Ordering::SeqCst), 0);

        drop(survivor);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn registry_does_not_keep_objects_alive() {
        let drops = Arc::new(AtomicUsize::new(0));
        let mut registry = ObjectRegistry::new();

        registry.register(&ThreadSafeRef::new(DropCounted(drops.clone())));
        assert_eq!(drops.load(Ordering::SeqCst), 1);

        // The entry outlives its object until somebody unregisters it.
        let stale = registry.get_registered_copy::<DropCounted>();
        assert_eq!(stale.len(), 1);
        assert!(!stale[0].is_alive());
        assert!(registry.get_registered_alive::<DropCounted>().is_empty());

        let outcome = registry.unregister_by_id(ClassKey::of::<DropCounted>(), stale[0].object_id());
        assert!(outcome.is_unregistered());
        assert_eq!(registry.class_count(), 0);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn emptied_buckets_do_not_destroy_tracked_objects() {
        let drops = Arc::new(AtomicUsize::new(0));
        let mut registry = ObjectRegistry::new();
        let object = ThreadSafeRef::new(DropCounted(drops.clone()));

        registry.register(&object);
        registry.unregister(&object);

        assert_eq!(registry.class_count(), 0);
        assert_eq!(drops.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn buckets_are_isolated_by_requested_type() {
        let mut registry = ObjectRegistry::new();
        let smart = Arc::new(SmartWeapon);
        let as_weapon = ThreadSafeRef::<dyn Weapon>::new_from_ref(smart.clone());

        registry.register(&as_weapon);

        // Compatible with both, but only registered as a weapon.
        assert!(registry.get_registered::<dyn Actor>().is_empty());
        assert!(registry.get_registered::<SmartWeapon>().is_empty());
        assert_eq!(registry.get_registered::<dyn Weapon>().len(), 1);

        let as_smart = ThreadSafeRef::new_from_ref(smart);
        registry.register(&as_smart);
        assert_eq!(ids(registry.get_registered::<SmartWeapon>()), [as_smart.object_id()]);
        assert_eq!(registry.class_count(), 2);
    }

    #[test]
    fn callbacks_see_the_mutated_state() {
        let mut registry = ObjectRegistry::new();
        let seen_on_register = Arc::new(AtomicBool::new(false));
        let seen_on_unregister = Arc::new(AtomicBool::new(true));

        let flag = seen_on_register.clone();
        registry.on_registered(move |registry, event| {
            let present = registry.get_registered::<Target>().iter().any(|t| t.object_id() == event.object.id());
            flag.store(present, Ordering::SeqCst);
        });

        let flag = seen_on_unregister.clone();
        registry.on_unregistered(move |registry, event| {
            let present = registry.get_registered::<Target>().iter().any(|t| t.object_id() == event.object.id());
            flag.store(present, Ordering::SeqCst);
        });

        let target = ThreadSafeRef::new(Target);
        registry.register(&target);
        registry.unregister(&target);

        assert!(seen_on_register.load(Ordering::SeqCst));
        assert!(!seen_on_unregister.load(Ordering::SeqCst));
    }

    #[test]
    fn targets_scenario() {
        let mut registry = ObjectRegistry::new();
        let target_a = ThreadSafeRef::new(Target);
        let target_b = ThreadSafeRef::new(Target);

        registry.register(&target_a);
        registry.register(&target_b);
        assert_eq!(ids(registry.get_registered::<Target>()), [target_a.object_id(), target_b.object_id()]);

        registry.unregister(&target_a);
        assert_eq!(ids(registry.get_registered::<Target>()), [target_b.object_id()]);

        registry.unregister(&target_b);
        assert!(registry.get_registered::<Target>().is_empty());
        assert_eq!(registry.registered_count::<Target>(), 0);
        assert!(registry.entry(ClassKey::of::<Target>()).is_none());
    }

    #[test]
    fn smart_weapon_is_visible_as_base() {
        let mut registry = ObjectRegistry::new();
        let weapon = smart_as_weapon();

        assert!(registry.register(&weapon).is_registered());

        let as_base = registry.get_registered_as_base(ClassKey::of::<dyn Weapon>());
        assert_eq!(as_base.len(), 1);
        assert_eq!(as_base[0].id(), weapon.object_id());
        assert_eq!(as_base[0].object_class(), ClassKey::of::<SmartWeapon>());
        assert!(as_base[0].downcast::<dyn Weapon>().is_some_and(|w| w.ptr_eq(&weapon)));
        assert_eq!(registry.get_registered_alive::<dyn Weapon>(), [weapon.clone()]);
        assert_eq!(registry.get_registered_as_base_of::<dyn Weapon>(), as_base);
    }

    #[test]
    fn strict_policy_rejects_subclasses() {
        let mut registry = quiet_registry(RegistrationPolicy::Strict);
        let weapon = smart_as_weapon();

        let outcome = registry.register(&weapon);
        assert!(matches!(
            outcome,
            RegisterOutcome::Rejected(RegistryError::TypeMismatch { policy: RegistrationPolicy::Strict, .. })
        ));
        assert_eq!(registry.class_count(), 0);

        // Exact matches are still fine.
        let basic = ThreadSafeRef::new(BasicWeapon);
        assert!(registry.register(&basic).is_registered());
    }

    #[test]
    fn permissive_policy_accepts_subclasses() {
        let mut registry = quiet_registry(RegistrationPolicy::Permissive);
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        registry.on_registered(move |_, _| { counter.fetch_add(1, Ordering::SeqCst); });

        let target: Arc<dyn Actor> = Arc::new(Target);
        let target = ThreadSafeRef::new_from_ref(target);
        assert!(registry.register(&target).is_registered());
        assert!(registry.register(&smart_as_weapon()).is_registered());

        assert_eq!(registry.get_registered::<dyn Actor>().len(), 1);
        assert_eq!(registry.get_registered::<dyn Weapon>().len(), 1);
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn permissive_policy_rejects_classes_outside_the_hierarchy() {
        // Implements the Weapon trait, but declares itself a plain Actor.
        struct Impostor;
        crate::registry_object!(Impostor => dyn Actor);
        impl Actor for Impostor {}
        impl Weapon for Impostor {}

        let mut registry = quiet_registry(RegistrationPolicy::Permissive);
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        registry.on_registered(move |_, _| { counter.fetch_add(1, Ordering::SeqCst); });

        let impostor = ThreadSafeRef::<dyn Weapon>::new_from_ref(Arc::new(Impostor));
        let outcome = registry.register(&impostor);

        assert!(matches!(
            outcome,
            RegisterOutcome::Rejected(RegistryError::TypeMismatch { policy: RegistrationPolicy::Permissive, .. })
        ));
        assert!(registry.get_registered::<dyn Weapon>().is_empty());
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unregister_with_mismatched_type_is_reported() {
        let mut registry = quiet_registry(RegistrationPolicy::Strict);
        let basic = ThreadSafeRef::new(BasicWeapon);
        registry.register(&basic);

        // Same object, viewed as a weapon: not an exact match under the strict policy.
        let as_weapon = ThreadSafeRef::<dyn Weapon>::new_from_ref(basic.to_arc());
        assert!(registry.unregister(&as_weapon).is_rejected());
        assert_eq!(registry.registered_count::<BasicWeapon>(), 1);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic]
    fn default_mismatch_strategy_asserts_in_debug() {
        let mut registry = ObjectRegistry::with_settings(RegistrySettings {
            policy: RegistrationPolicy::Strict,
            ..Default::default()
        });
        registry.register(&smart_as_weapon());
    }

    #[test]
    fn unregistering_unknown_object_fires_nothing() {
        let mut registry = ObjectRegistry::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        registry.on_unregistered(move |_, _| { counter.fetch_add(1, Ordering::SeqCst); });

        let registered = ThreadSafeRef::new(Target);
        let stranger = ThreadSafeRef::new(Target);
        registry.register(&registered);

        assert_eq!(registry.unregister(&stranger), UnregisterOutcome::NotRegistered);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(registry.registered_count::<Target>(), 1);
    }

    #[test]
    fn unsubscribed_callbacks_stop_firing() {
        let mut registry = ObjectRegistry::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let id = registry.on_registered(move |_, _| { counter.fetch_add(1, Ordering::SeqCst); });

        registry.register(&ThreadSafeRef::new(Target));
        assert!(registry.unsubscribe(id));
        assert!(!registry.unsubscribe(id));
        registry.register(&ThreadSafeRef::new(Target));

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn erased_unregistration_by_id() {
        let mut registry = ObjectRegistry::new();
        let weapon = smart_as_weapon();
        registry.register(&weapon);

        let object = registry.get_registered_as_base_copy_of::<dyn Weapon>().remove(0);
        let outcome = registry.unregister_by_id(object.registered_as(), object.id());

        assert!(outcome.is_unregistered());
        assert!(!registry.is_registered(&weapon));
        assert_eq!(registry.class_count(), 0);
    }

    #[test]
    fn journal_records_only_when_enabled() {
        let mut registry = ObjectRegistry::new();
        let target = ThreadSafeRef::new(Target);
        registry.register(&target);
        assert!(!registry.has_pending_notifications());

        registry.set_record_notifications(true);
        registry.unregister(&target);
        registry.register(&target);
        registry.register(&target);

        let journal: Vec<RegistryNotification> = registry.drain_notifications().collect();
        assert_eq!(journal.len(), 2);
        assert!(!journal[0].is_registered());
        assert!(journal[1].is_registered());
        assert_eq!(journal[1].object().id(), target.object_id());
        assert!(!registry.has_pending_notifications());
    }

    #[test]
    fn runtime_settings_changes_keep_the_policy() {
        let mut registry = ObjectRegistry::new();
        let weapon = smart_as_weapon();
        registry.register(&weapon);

        registry
            .set_on_type_mismatch(TypeMismatchStrategy::LogAndIgnore)
            .set_record_notifications(true);

        assert_eq!(registry.settings().policy, RegistrationPolicy::Permissive);
        assert_eq!(registry.settings().on_type_mismatch, TypeMismatchStrategy::LogAndIgnore);
        assert!(registry.unregister(&weapon).is_unregistered());
        assert_eq!(registry.drain_notifications().count(), 1);
    }

    #[test]
    fn panicking_subscriber_does_not_drop_the_subscription() {
        let mut registry = ObjectRegistry::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        registry.on_registered(move |_, _| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("first notification blows up");
            }
        });

        let first = ThreadSafeRef::new(Target);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            registry.register(&first);
        }));
        assert!(result.is_err());
        assert!(registry.is_registered(&first));

        registry.register(&ThreadSafeRef::new(Target));
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn registered_classes_lists_live_buckets() {
        let mut registry = ObjectRegistry::new();
        registry.register(&ThreadSafeRef::new(Target));
        registry.register(&smart_as_weapon());

        let mut names: Vec<&str> = registry.registered_classes().map(|class| class.name()).collect();
        names.sort();
        assert_eq!(names.len(), 2);
        assert!(names.iter().any(|name| name.ends_with("Target")));
    }
}
