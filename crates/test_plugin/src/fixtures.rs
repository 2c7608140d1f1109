/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/
//! Gameplay classes used to exercise the registry: actors, weapons and weapon targets.
//!
//! All positions are in screen space, i.e. already projected onto the viewport.

use alloc::vec::Vec;

use bevy::prelude::*;
use gameplay_registry_bevy_plugin::{DefaultRegistryHost, RegistryCommandsExt};
use gameplay_registry_core::class_key::{Object, RegistryClass};
use gameplay_registry_core::host::{HasObjectRegistry, RegistryHost};
use gameplay_registry_core::registry::ObjectRegistry;
use gameplay_registry_core::types::{ThreadSafeRef, WeakObjectRef};
use gameplay_registry_core::{registry_class, registry_object};


pub trait Actor: Object {
    fn position(&self) -> Vec2;
}
registry_class!(dyn Actor);

pub trait Weapon: Actor {
    /// Unit-ish vector the weapon is aiming along.
    fn forward(&self) -> Vec2;
}
registry_class!(dyn Weapon => dyn Actor);


#[derive(Debug, Clone)]
pub struct Target {
    pub owner: Entity,
    pub position: Vec2,
}
registry_object!(Target => dyn Actor);

impl Actor for Target {
    fn position(&self) -> Vec2 {
        self.position
    }
}

/// The part of a targetable Entity that smart weapons look for.
#[derive(Debug, Clone)]
pub struct WeaponTarget {
    pub owner: Entity,
    pub position: Vec2,
}
registry_object!(WeaponTarget);

#[derive(Debug, Clone, Default)]
pub struct BasicWeapon {
    pub position: Vec2,
    pub forward: Vec2,
}
registry_object!(BasicWeapon => dyn Weapon);

impl Actor for BasicWeapon {
    fn position(&self) -> Vec2 {
        self.position
    }
}

impl Weapon for BasicWeapon {
    fn forward(&self) -> Vec2 {
        self.forward
    }
}

/// A weapon that locks on to any WeaponTarget inside a target area in the middle of the screen.
#[derive(Debug, Clone, Default)]
pub struct SmartWeapon {
    pub position: Vec2,
    pub forward: Vec2,
    pub target_area_size: Vec2,
}
registry_object!(SmartWeapon => dyn Weapon);

impl Actor for SmartWeapon {
    fn position(&self) -> Vec2 {
        self.position
    }
}

impl Weapon for SmartWeapon {
    fn forward(&self) -> Vec2 {
        self.forward
    }
}


/// An axis-aligned screen rectangle; the edges themselves are outside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetArea {
    pub begin: Vec2,
    pub size: Vec2,
}

impl TargetArea {
    pub fn centered(viewport: Vec2, size: Vec2) -> Self {
        Self {
            begin: (viewport - size) / 2.,
            size,
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        let end = self.begin + self.size;
        point.x > self.begin.x && point.x < end.x
        && point.y > self.begin.y && point.y < end.y
    }
}


/// The targets a smart weapon currently has locked, in the order they were acquired.
/// Locking on to a target does not keep it alive.
#[derive(Debug, Clone, Default)]
pub struct TargetCache {
    targets: Vec<WeakObjectRef<WeaponTarget>>,
}

impl TargetCache {
    pub fn targets(&self) -> &[WeakObjectRef<WeaponTarget>] {
        &self.targets
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl SmartWeapon {
    /// None if the viewport has no usable size yet.
    pub fn target_area(&self, viewport: Vec2) -> Option<TargetArea> {
        match viewport.x > 0. && viewport.y > 0. {
            true => Some(TargetArea::centered(viewport, self.target_area_size)),
            false => None,
        }
    }

    /// Locks on to registered targets that entered the area and drops the ones that
    /// left it or are no longer registered.
    pub fn update_targets(&self, registry: &ObjectRegistry, area: &TargetArea, cache: &mut TargetCache) {
        let class = WeaponTarget::static_class();
        cache.targets.retain(|target| target.is_alive() && registry.contains_object(class, target.object_id()));

        for target in registry.get_registered::<WeaponTarget>() {
            let Some(live) = target.upgrade() else {
                continue;
            };

            let locked = cache.targets.iter().position(|locked| locked.ptr_eq(target));

            match (area.contains(live.position), locked) {
                (true, None) => cache.targets.push(target.clone()),
                (false, Some(index)) => { cache.targets.remove(index); },
                _ => {},
            }
        }
    }

    /// The locked target with the smallest angle to the weapon's forward vector.
    pub fn target_to_shoot(&self, cache: &TargetCache) -> Option<ThreadSafeRef<WeaponTarget>> {
        let forward = self.forward.normalize_or_zero();

        cache.targets.iter().filter_map(WeakObjectRef::upgrade).max_by(|a, b| {
            let alignment_a = forward.dot((a.position - self.position).normalize_or_zero());
            let alignment_b = forward.dot((b.position - self.position).normalize_or_zero());
            alignment_a.total_cmp(&alignment_b)
        })
    }
}


/// Size of the screen the target areas are centered on.
#[derive(Resource, Debug, Clone, Copy)]
pub struct Viewport(pub Vec2);

impl Default for Viewport {
    fn default() -> Self {
        Self(Vec2::new(1920., 1080.))
    }
}

/// Makes its Entity show up in every registry as a WeaponTarget for as long as it has this Component.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Targetable {
    pub position: Vec2,
}

/// The handle a Targetable Entity was registered with. Owns the WeaponTarget.
#[derive(Component, Debug, Clone)]
pub struct RegisteredWeaponTarget(pub ThreadSafeRef<WeaponTarget>);

#[derive(Component, Debug, Clone)]
pub struct SmartWeaponController {
    pub weapon: ThreadSafeRef<SmartWeapon>,
    pub targets: TargetCache,
}

impl SmartWeaponController {
    pub fn new(weapon: SmartWeapon) -> Self {
        Self {
            weapon: ThreadSafeRef::new(weapon),
            targets: TargetCache::default(),
        }
    }
}

pub fn register_weapon_target(
    add: On<Add, Targetable>,
    targetables: Query<&Targetable>,
    mut commands: Commands,
) {
    let Ok(targetable) = targetables.get(add.entity) else {
        return;
    };

    let handle = ThreadSafeRef::new(WeaponTarget {
        owner: add.entity,
        position: targetable.position,
    });

    commands.entity(add.entity).insert(RegisteredWeaponTarget(handle.clone()));
    commands.register_everywhere(handle);
}

pub fn unregister_weapon_target(
    remove: On<Remove, Targetable>,
    registered: Query<&RegisteredWeaponTarget>,
    mut commands: Commands,
) {
    let Ok(RegisteredWeaponTarget(handle)) = registered.get(remove.entity) else {
        return;
    };

    commands.unregister_everywhere(handle.clone());
}

pub fn update_smart_weapon_targets(
    viewport: Res<Viewport>,
    hosts: Query<&RegistryHost, With<DefaultRegistryHost>>,
    mut weapons: Query<&mut SmartWeaponController>,
) {
    let Some(host) = hosts.iter().next() else {
        return;
    };

    for mut controller in weapons.iter_mut() {
        let SmartWeaponController { weapon, targets } = &mut *controller;

        let Some(area) = weapon.target_area(viewport.0) else {
            continue;
        };

        weapon.update_targets(host.object_registry(), &area, targets);
    }
}

/// Wires the fixture Components above into an App.
pub struct TargetingFixturesPlugin;

impl Plugin for TargetingFixturesPlugin {
    fn build(&self, app: &mut App) {
        app
        .init_resource::<Viewport>()
        .add_observer(register_weapon_target)
        .add_observer(unregister_weapon_target)
        .add_systems(Update, update_smart_weapon_targets)
        ;
    }
}
