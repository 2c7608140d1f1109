/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/
//! Hosting registries in the world.
//!
//! There is no global registry. Every registry lives inside some host (a world-level
//! Entity, typically spawned by the Bevy plugin) and is created together with it and
//! dropped together with it. Anything that can hand out its registry implements
//! [`HasObjectRegistry`].

use bevy::prelude::Component;

use crate::registry::ObjectRegistry;
use crate::settings::RegistrySettings;

/// A Component owning exactly one ObjectRegistry for the lifetime of its Entity.
#[derive(Component, Debug, Default)]
pub struct RegistryHost {
    registry: ObjectRegistry,
}

impl RegistryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: RegistrySettings) -> Self {
        Self {
            registry: ObjectRegistry::with_settings(settings),
        }
    }
}

/// Capability of owning an ObjectRegistry.
pub trait HasObjectRegistry {
    fn object_registry(&self) -> &ObjectRegistry;

    fn object_registry_mut(&mut self) -> &mut ObjectRegistry;
}

impl HasObjectRegistry for RegistryHost {
    fn object_registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    fn object_registry_mut(&mut self) -> &mut ObjectRegistry {
        &mut self.registry
    }
}

impl HasObjectRegistry for ObjectRegistry {
    fn object_registry(&self) -> &ObjectRegistry {
        self
    }

    fn object_registry_mut(&mut self) -> &mut ObjectRegistry {
        self
    }
}
