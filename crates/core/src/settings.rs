/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/
//! Per-registry configuration.

use bevy::reflect::Reflect;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::errors::TypeMismatchStrategy;

/// Which instances a bucket for type `T` accepts.
///
/// Registration is always keyed by the *requested* type, never by the instance's
/// most-derived type; the policy only decides which instances are allowed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Reflect)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum RegistrationPolicy {
    /// The instance's runtime class must be exactly `T`.
    Strict,

    /// The instance's runtime class must be `T` or any subclass of `T`.
    /// Querying `dyn Weapon` then also yields smart weapons registered as weapons.
    #[default]
    Permissive,
}

impl RegistrationPolicy {
    /// Parses `strict` / `permissive` (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("strict") {
            Some(Self::Strict)
        } else if name.eq_ignore_ascii_case("permissive") {
            Some(Self::Permissive)
        } else {
            None
        }
    }
}


/// Configuration of a single ObjectRegistry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Reflect)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct RegistrySettings {
    pub policy: RegistrationPolicy,
    pub on_type_mismatch: TypeMismatchStrategy,

    /// If set, every notification is also appended to a journal that can be drained
    /// later, e.g. to forward notifications as ECS messages once per frame.
    /// Nothing drains it unless you (or the Bevy plugin) do, so leave this off otherwise.
    pub record_notifications: bool,
}

impl RegistrySettings {
    pub fn set_policy(&mut self, policy: RegistrationPolicy) -> &mut Self {
        self.policy = policy;
        self
    }

    /// Only accept instances whose runtime class is exactly the requested class.
    pub fn set_strict(&mut self) -> &mut Self {
        self.set_policy(RegistrationPolicy::Strict)
    }

    /// Accept instances of the requested class or any of its subclasses.
    ///
    /// This is the default behavior, so this method is only useful if something
    /// else has already modified the default settings.
    pub fn set_permissive(&mut self) -> &mut Self {
        self.set_policy(RegistrationPolicy::Permissive)
    }

    pub fn set_on_type_mismatch(&mut self, strategy: TypeMismatchStrategy) -> &mut Self {
        self.on_type_mismatch = strategy;
        self
    }

    pub fn set_record_notifications(&mut self, record: bool) -> &mut Self {
        self.record_notifications = record;
        self
    }

    /// Builds settings from values baked in at compile time:
    ///
    /// - `GAMEPLAY_REGISTRY_POLICY` - `strict` or `permissive`
    /// - `GAMEPLAY_REGISTRY_ON_MISMATCH` - `assert_in_debug`, `panic`, `log_and_ignore` or `ignore`
    ///
    /// Missing or unrecognized values fall back to the defaults.
    pub fn from_build_env() -> Self {
        Self::from_names(
            option_env!("GAMEPLAY_REGISTRY_POLICY"),
            option_env!("GAMEPLAY_REGISTRY_ON_MISMATCH"),
        )
    }

    fn from_names(policy: Option<&str>, on_type_mismatch: Option<&str>) -> Self {
        let policy = policy
            .and_then(RegistrationPolicy::from_name)
            .unwrap_or_default();

        let on_type_mismatch = on_type_mismatch
            .and_then(TypeMismatchStrategy::from_name)
            .unwrap_or_default();

        #[cfg(feature = "logging")]
        bevy::log::debug!("Registry defaults: {:?} policy, {:?} on mismatch", policy, on_type_mismatch);

        Self {
            policy,
            on_type_mismatch,
            ..Default::default()
        }
    }
}
