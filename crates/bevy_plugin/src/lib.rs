/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/

//! This crate extends the gameplay-registry library with a plugin that streamlines the integration
//! of object registries into an existing Bevy application.
//!
//! The plugin handles the basic gruntwork - the settings Resource, a default registry host Entity,
//! and forwarding of registry notifications as Bevy Messages.
//!
//! What's left for you to do after adding it in is registering your objects, either directly
//! through a `RegistryHost` Component or through the lookup helpers in this crate
//! (`ObjectRegistryLookup`, `AcceptsObjectRegistrations`, `RegistryCommandsExt`).
#![no_std]

#[cfg(test)]
extern crate alloc;

mod library;
mod plugin;

pub use library::{AcceptsObjectRegistrations, ObjectRegistryLookup, RegistryCommandsExt};
pub use plugin::{
    DefaultRegistryHost,
    ObjectRegisteredMessage,
    ObjectRegistryPlugin,
    ObjectRegistrySettings,
    ObjectUnregisteredMessage,
    forward_registry_notifications,
    spawn_default_registry_host,
};
