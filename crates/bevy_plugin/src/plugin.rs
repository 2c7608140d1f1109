/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/

use bevy::prelude::*;
use gameplay_registry_core::entry::ObjectRef;
use gameplay_registry_core::events::RegistryNotification;
use gameplay_registry_core::host::{HasObjectRegistry, RegistryHost};
use gameplay_registry_core::settings::RegistrySettings;
use gameplay_registry_core::types::ClassKey;

/// App-wide defaults for registries created by the plugin.
///
/// Hosts spawned by the plugin copy these on spawn; changing the Resource later
/// does not affect hosts that already exist.
#[derive(Resource, Debug, Clone, Default)]
pub struct ObjectRegistrySettings(pub RegistrySettings);

impl ObjectRegistrySettings {
    /// A fresh host configured with these settings.
    pub fn new_host(&self) -> RegistryHost {
        RegistryHost::with_settings(self.0.clone())
    }
}

/// Marks the registry host spawned by the plugin.
/// Lookups that want 'the' registry of a World prefer hosts with this marker.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct DefaultRegistryHost;


/// A Message mirroring a registry's `ObjectRegistered` notification.
///
/// Written once per frame, in `Last`, for hosts whose registries record notifications.
#[derive(Message, Debug, Clone)]
pub struct ObjectRegisteredMessage {
    /// The Entity owning the RegistryHost that raised this.
    pub host: Entity,
    pub class: ClassKey,
    pub object: ObjectRef,
}

/// A Message mirroring a registry's `ObjectUnregistered` notification.
#[derive(Message, Debug, Clone)]
pub struct ObjectUnregisteredMessage {
    pub host: Entity,
    pub class: ClassKey,
    pub object: ObjectRef,
}


pub struct ObjectRegistryPlugin {
    /// Whether to spawn a `DefaultRegistryHost` during PreStartup.
    pub spawn_default_host: bool,

    /// Whether to turn on notification recording and forward the journal as Messages.
    pub forward_notifications: bool,

    /// Overrides the settings; if None, they are read from the build environment.
    /// Ignored if the app already has an `ObjectRegistrySettings` Resource.
    pub settings: Option<RegistrySettings>,
}

impl ObjectRegistryPlugin {
    pub fn with_settings(mut self, settings: RegistrySettings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn without_default_host(mut self) -> Self {
        self.spawn_default_host = false;
        self
    }

    pub fn without_notification_forwarding(mut self) -> Self {
        self.forward_notifications = false;
        self
    }
}

impl Default for ObjectRegistryPlugin {
    fn default() -> Self {
        Self {
            spawn_default_host: true,
            forward_notifications: true,
            settings: None,
        }
    }
}

impl Plugin for ObjectRegistryPlugin {
    fn build(&self, app: &mut App) {
        let mut settings = app.world_mut().get_resource_or_insert_with(|| {
            ObjectRegistrySettings(
                self.settings.clone().unwrap_or_else(RegistrySettings::from_build_env)
            )
        });

        if self.forward_notifications {
            settings.0.set_record_notifications(true);
        }

        app
        .add_message::<ObjectRegisteredMessage>()
        .add_message::<ObjectUnregisteredMessage>()
        ;

        if self.spawn_default_host {
            app.add_systems(PreStartup, spawn_default_registry_host);
        }

        if self.forward_notifications {
            app.add_systems(Last, forward_registry_notifications);
        }
    }
}


/// Spawns the World's default registry host from the current `ObjectRegistrySettings`.
pub fn spawn_default_registry_host(
    mut commands: Commands,
    settings: Res<ObjectRegistrySettings>,
) {
    let host = commands.spawn((
        Name::new("ObjectRegistryHost"),
        DefaultRegistryHost,
        settings.new_host(),
    )).id();

    #[cfg(feature = "logging")]
    bevy::log::debug!("Spawned default registry host {:?} with {:?}", host, settings.0);

    #[cfg(not(feature = "logging"))]
    let _ = host;
}

/// Drains the notification journal of every host and writes its contents out as Messages.
pub fn forward_registry_notifications(
    mut hosts: Query<(Entity, &mut RegistryHost)>,
    mut registered: MessageWriter<ObjectRegisteredMessage>,
    mut unregistered: MessageWriter<ObjectUnregisteredMessage>,
) {
    for (host, mut registry_host) in hosts.iter_mut() {
        // Avoids tripping change detection on hosts with nothing to say.
        if !registry_host.object_registry().has_pending_notifications() {
            continue;
        }

        for notification in registry_host.object_registry_mut().drain_notifications() {
            match notification {
                RegistryNotification::Registered(event) => {
                    registered.write(ObjectRegisteredMessage {
                        host,
                        class: event.class,
                        object: event.object,
                    });
                },
                RegistryNotification::Unregistered(event) => {
                    unregistered.write(ObjectUnregisteredMessage {
                        host,
                        class: event.class,
                        object: event.object,
                    });
                },
            }
        }
    }
}
