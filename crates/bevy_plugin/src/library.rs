/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/
//! Utility functions for finding and using the registries of a World.
//!
//! Registrants typically do not care which host they end up in; they either want 'the'
//! registry of the World (see [`ObjectRegistryLookup`]) or every registry there is
//! (see [`AcceptsObjectRegistrations`]).

use bevy::prelude::*;
use gameplay_registry_core::class_key::Registrable;
use gameplay_registry_core::host::{HasObjectRegistry, RegistryHost};
use gameplay_registry_core::types::ThreadSafeRef;

use crate::plugin::DefaultRegistryHost;


pub trait ObjectRegistryLookup {
    /// The Entity of the first registry host found.
    ///
    /// Hosts marked as `DefaultRegistryHost` take precedence; otherwise, the host with the
    /// lowest Entity wins, so the answer is stable between calls.
    fn first_registry_host(&mut self) -> Option<Entity>;

    /// The first registry host found, see `first_registry_host()`.
    fn first_object_registry(&mut self) -> Option<Mut<'_, RegistryHost>>;
}

impl ObjectRegistryLookup for World {
    fn first_registry_host(&mut self) -> Option<Entity> {
        let mut default_hosts = self.query_filtered::<Entity, (With<RegistryHost>, With<DefaultRegistryHost>)>();
        let default_host = default_hosts.iter(self).min();

        if default_host.is_some() {
            return default_host
        }

        let mut hosts = self.query_filtered::<Entity, With<RegistryHost>>();
        hosts.iter(self).min()
    }

    fn first_object_registry(&mut self) -> Option<Mut<'_, RegistryHost>> {
        let host = self.first_registry_host();

        #[cfg(feature = "logging")]
        if host.is_none() {
            bevy::log::warn!("No registry host found in the World!");
        }

        self.get_mut::<RegistryHost>(host?)
    }
}

impl ObjectRegistryLookup for App {
    fn first_registry_host(&mut self) -> Option<Entity> {
        self.world_mut().first_registry_host()
    }

    fn first_object_registry(&mut self) -> Option<Mut<'_, RegistryHost>> {
        self.world_mut().first_object_registry()
    }
}


pub trait AcceptsObjectRegistrations {
    /// Registers the object as `T` in every registry host of the World.
    /// Returns the number of registries that actually added it.
    fn register_everywhere<T: ?Sized + Registrable>(&mut self, object: &ThreadSafeRef<T>) -> usize;

    /// Unregisters the object from `T` in every registry host of the World.
    /// Returns the number of registries that actually removed it.
    fn unregister_everywhere<T: ?Sized + Registrable>(&mut self, object: &ThreadSafeRef<T>) -> usize;
}

impl AcceptsObjectRegistrations for World {
    fn register_everywhere<T: ?Sized + Registrable>(&mut self, object: &ThreadSafeRef<T>) -> usize {
        let mut hosts = self.query::<&mut RegistryHost>();
        let mut registered = 0;

        for mut host in hosts.iter_mut(self) {
            if host.object_registry_mut().register(object).is_registered() {
                registered += 1;
            }
        }

        #[cfg(feature = "logging")]
        if registered == 0 {
            bevy::log::debug!("Object {} was not added to any registry", object.object_id());
        }

        registered
    }

    fn unregister_everywhere<T: ?Sized + Registrable>(&mut self, object: &ThreadSafeRef<T>) -> usize {
        let mut hosts = self.query::<&mut RegistryHost>();
        let mut unregistered = 0;

        for mut host in hosts.iter_mut(self) {
            if host.object_registry_mut().unregister(object).is_unregistered() {
                unregistered += 1;
            }
        }

        unregistered
    }
}

impl AcceptsObjectRegistrations for App {
    fn register_everywhere<T: ?Sized + Registrable>(&mut self, object: &ThreadSafeRef<T>) -> usize {
        self.world_mut().register_everywhere(object)
    }

    fn unregister_everywhere<T: ?Sized + Registrable>(&mut self, object: &ThreadSafeRef<T>) -> usize {
        self.world_mut().unregister_everywhere(object)
    }
}


/// Deferred flavours of [`AcceptsObjectRegistrations`], for Systems and Observers
/// that do not have exclusive World access.
pub trait RegistryCommandsExt {
    fn register_everywhere<T: ?Sized + Registrable>(&mut self, object: ThreadSafeRef<T>) -> &mut Self;

    fn unregister_everywhere<T: ?Sized + Registrable>(&mut self, object: ThreadSafeRef<T>) -> &mut Self;
}

impl RegistryCommandsExt for Commands<'_, '_> {
    fn register_everywhere<T: ?Sized + Registrable>(&mut self, object: ThreadSafeRef<T>) -> &mut Self {
        self.queue(move |world: &mut World| {
            world.register_everywhere(&object);
        });
        self
    }

    fn unregister_everywhere<T: ?Sized + Registrable>(&mut self, object: ThreadSafeRef<T>) -> &mut Self {
        self.queue(move |world: &mut World| {
            world.unregister_everywhere(&object);
        });
        self
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use gameplay_registry_core::registry_object;

    struct Target;
    registry_object!(Target);

    fn count_in(world: &World, host: Entity) -> usize {
        world
            .get::<RegistryHost>(host)
            .map_or(0, |host| host.object_registry().registered_count::<Target>())
    }

    #[test]
    fn no_hosts_means_no_registry() {
        let mut world = World::new();
        assert!(world.first_registry_host().is_none());
        assert!(world.first_object_registry().is_none());
        assert_eq!(world.register_everywhere(&ThreadSafeRef::new(Target)), 0);
    }

    #[test]
    fn default_host_takes_precedence() {
        let mut world = World::new();
        let _plain = world.spawn(RegistryHost::new()).id();
        let default = world.spawn((RegistryHost::new(), DefaultRegistryHost)).id();

        assert_eq!(world.first_registry_host(), Some(default));
    }

    #[test]
    fn registers_into_every_host() {
        let mut world = World::new();
        let first = world.spawn(RegistryHost::new()).id();
        let second = world.spawn(RegistryHost::new()).id();
        let target = ThreadSafeRef::new(Target);

        assert_eq!(world.register_everywhere(&target), 2);
        assert_eq!(world.register_everywhere(&target), 0);
        assert_eq!(count_in(&world, first), 1);
        assert_eq!(count_in(&world, second), 1);

        assert_eq!(world.unregister_everywhere(&target), 2);
        assert_eq!(count_in(&world, first), 0);
    }

    #[test]
    fn commands_are_applied_on_flush() {
        let mut world = World::new();
        let host = world.spawn(RegistryHost::new()).id();
        let target = ThreadSafeRef::new(Target);

        world.commands().register_everywhere(target.clone());
        assert_eq!(count_in(&world, host), 0);

        world.flush();
        assert_eq!(count_in(&world, host), 1);

        world.commands().unregister_everywhere(target);
        world.flush();
        assert_eq!(count_in(&world, host), 0);
    }
}
