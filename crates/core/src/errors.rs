/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/
use bevy::reflect::Reflect;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::class_key::ClassKey;
use crate::settings::RegistrationPolicy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The runtime class of an instance is not acceptable for the requested bucket
    /// under the active [`RegistrationPolicy`].
    TypeMismatch {
        requested: ClassKey,
        actual: ClassKey,
        policy: RegistrationPolicy,
    },

    /// A bucket exists for the class, but it does not hold the expected typed view.
    /// This indicates a broken `RegistryClass` impl (two types reporting the same key).
    BucketTypeConflict {
        class: ClassKey,
    },
}

impl core::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::TypeMismatch { requested, actual, policy } => write!(
                f,
                "Inconsistency found! Instance of class {} cannot be used as {} ({:?} registration policy)",
                actual, requested, policy
            ),
            Self::BucketTypeConflict { class } => write!(
                f,
                "The bucket for class {} holds a view of a different type",
                class
            ),
        }
    }
}

impl core::error::Error for RegistryError {}


/// A config value indicating how the registry should handle registrations and unregistrations
/// whose instance does not match the requested type.
///
/// A mismatch is always a programming error on the caller's side, and the registry never
/// proceeds with it (the bucket would stop describing what it holds). The strategy only
/// decides how loudly that gets reported.
///
/// By default, debug builds assert and release builds log a warning and carry on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Reflect)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum TypeMismatchStrategy {
    #[default]
    AssertInDebug,
    Panic,
    LogAndIgnore,
    Ignore,
}

impl TypeMismatchStrategy {
    pub const fn assert_in_debug() -> Self {
        Self::AssertInDebug
    }

    pub const fn panic() -> Self {
        Self::Panic
    }

    pub const fn log_and_ignore() -> Self {
        Self::LogAndIgnore
    }

    pub const fn ignore() -> Self {
        Self::Ignore
    }

    /// Parses the strategy names used in build-time configuration (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        [
            ("assert_in_debug", Self::AssertInDebug),
            ("panic", Self::Panic),
            ("log_and_ignore", Self::LogAndIgnore),
            ("ignore", Self::Ignore),
        ]
        .into_iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, strategy)| strategy)
    }

    /// Reports a rejected call according to the strategy.
    pub fn handle(&self, error: &RegistryError) {
        match self {
            Self::AssertInDebug => {
                #[cfg(feature = "logging")]
                bevy::log::warn!("{}", error);
                debug_assert!(false, "{}", error);
            },
            Self::Panic => panic!("{}", error),
            Self::LogAndIgnore => {
                #[cfg(feature = "logging")]
                bevy::log::warn!("{}", error);
            },
            Self::Ignore => {},
        }

        #[cfg(not(feature = "logging"))]
        let _ = error;
    }
}
