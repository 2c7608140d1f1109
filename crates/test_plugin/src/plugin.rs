/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/

#[cfg(feature = "logging")]
use alloc::string::ToString;

use bevy::{app::ScheduleRunnerPlugin, prelude::*};
use gameplay_registry_bevy_plugin::ObjectRegistryPlugin;

use crate::fixtures::TargetingFixturesPlugin;


/// A headless App setup for tests: minimal plugins, a single update per `run()`,
/// debug logging, the registry plugin and the targeting fixtures.
pub struct ObjectRegistryTestPlugin;

impl Plugin for ObjectRegistryTestPlugin {
    fn build(&self, app: &mut App) {
        app
        .add_plugins((
            MinimalPlugins.set(ScheduleRunnerPlugin::run_once()),
            ObjectRegistryPlugin::default(),
            TargetingFixturesPlugin,
        ))
        ;

        #[cfg(feature = "logging")]
        app.add_plugins(bevy::log::LogPlugin {
            level: bevy::log::Level::DEBUG,
            custom_layer: |_| None,
            filter: "wgpu=error,bevy_render=info,bevy_ecs=info".to_string(),
            fmt_layer: |_| None,
        });
    }
}
