use std::sync::Arc;

use bevy::log::LogPlugin;
use bevy::{app::ScheduleRunnerPlugin, prelude::*};
use gameplay_registry::prelude::*;
use gameplay_registry_bevy_plugin::forward_registry_notifications;
use gameplay_registry_test_plugin::{
    BasicWeapon,
    SmartWeapon,
    SmartWeaponController,
    Targetable,
    TargetingFixturesPlugin,
    Weapon,
    WeaponTarget,
};

/// Owns a weapon for as long as its Entity lives; the registries only index it.
#[derive(Component)]
struct ArmedWeapon(#[allow(dead_code)] ThreadSafeRef<dyn Weapon>);

/// Spawns a smart weapon aiming up the middle of the screen and a handful of targets around it.
fn setup_arena(world: &mut World) {
    let smart_weapon = SmartWeapon {
        position: Vec2::new(960., 1080.),
        forward: Vec2::new(0., -1.),
        target_area_size: Vec2::new(600., 400.),
    };

    let basic_weapon = BasicWeapon {
        position: Vec2::new(200., 1080.),
        forward: Vec2::new(0., -1.),
    };

    // Both weapons are also indexed through their base class, for anything that wants 'all weapons'.
    let controller = SmartWeaponController::new(smart_weapon);
    let smart_as_weapon: ThreadSafeRef<dyn Weapon> = ThreadSafeRef::new_from_ref(controller.weapon.to_arc());
    let basic_as_weapon: ThreadSafeRef<dyn Weapon> = ThreadSafeRef::new_from_ref(Arc::new(basic_weapon));

    world.register_everywhere(&smart_as_weapon);
    world.register_everywhere(&basic_as_weapon);
    world.spawn((Name::new("SmartWeapon"), controller));
    world.spawn((Name::new("BasicWeapon"), ArmedWeapon(basic_as_weapon)));

    for (index, position) in [
        Vec2::new(960., 540.),
        Vec2::new(1100., 600.),
        Vec2::new(100., 100.),
        Vec2::new(800., 450.),
        Vec2::new(1800., 900.),
    ].into_iter().enumerate() {
        world.spawn((
            Name::new(format!("Target{}", index)),
            Targetable { position },
        ));
    }
}

/// Destroys one target every other frame, so the registry has something to track.
fn destroy_targets(
    mut frame: Local<u32>,
    targets: Query<(Entity, &Name), With<Targetable>>,
    mut commands: Commands,
) {
    *frame += 1;

    if *frame % 2 != 0 {
        return;
    }

    if let Some((target, name)) = targets.iter().min_by_key(|(entity, _)| *entity) {
        bevy::log::info!("Destroying {}", name);
        commands.entity(target).despawn();
    }
}

fn report_registry_changes(
    mut registered: MessageReader<ObjectRegisteredMessage>,
    mut unregistered: MessageReader<ObjectUnregisteredMessage>,
) {
    for message in registered.read() {
        bevy::log::info!("+ {} registered as {}", message.object.object_class(), message.class);
    }

    for message in unregistered.read() {
        bevy::log::info!("- {} unregistered from {}", message.object.object_class(), message.class);
    }
}

fn report_locked_targets(
    weapons: Query<&SmartWeaponController>,
    names: Query<&Name>,
) {
    for controller in weapons.iter() {
        let locked: Vec<String> = controller.targets.targets()
            .iter()
            .filter_map(WeakObjectRef::upgrade)
            .map(|target| names.get(target.owner).map_or_else(|_| format!("{:?}", target.owner), Name::to_string))
            .collect();

        let best = controller.weapon
            .target_to_shoot(&controller.targets)
            .and_then(|target| names.get(target.owner).ok());

        bevy::log::info!("Smart weapon has locked {:?}, would shoot {:?}", locked, best);
    }
}

fn exit_when_no_targets_left(
    hosts: Query<&RegistryHost, With<DefaultRegistryHost>>,
    mut exit: MessageWriter<AppExit>,
) {
    let Some(host) = hosts.iter().next() else {
        return;
    };

    let registry = host.object_registry();

    if registry.registered_count::<WeaponTarget>() == 0 {
        bevy::log::info!(
            "No targets left; still tracking {} weapon(s) across {} class(es). Exiting.",
            registry.registered_count::<dyn Weapon>(),
            registry.class_count(),
        );
        exit.write(AppExit::Success);
    }
}

fn main() {
    let mut app = App::new();

    app
    .add_plugins((
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(std::time::Duration::from_millis(200))),
        LogPlugin {
            level: bevy::log::Level::DEBUG,
            custom_layer: |_| None,
            filter: "wgpu=error,bevy_render=info,bevy_ecs=info".to_string(),
            fmt_layer: |_| None,
        },
        ObjectRegistryPlugin::default(),
        TargetingFixturesPlugin,
    ))
    .add_systems(Startup, setup_arena)
    .add_systems(Update, (
        destroy_targets,
        report_locked_targets,
    ).chain())
    .add_systems(PostUpdate, exit_when_no_targets_left)
    .add_systems(Last, report_registry_changes.after(forward_registry_notifications))
    ;

    app.run();
}
