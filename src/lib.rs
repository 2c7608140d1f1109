#![doc = include_str!("../README.md")]
#![no_std]

pub use gameplay_registry_core::*;

pub mod prelude {
    pub use gameplay_registry_core::*;
    pub use gameplay_registry_core::types::*;
    pub use gameplay_registry_core::errors::{RegistryError, TypeMismatchStrategy};
    pub use gameplay_registry_core::host::{HasObjectRegistry, RegistryHost};
    pub use gameplay_registry_core::settings::{RegistrationPolicy, RegistrySettings};

    #[cfg(any(feature = "bevy_plugin", feature = "testing"))]
    pub use gameplay_registry_bevy_plugin::{
        AcceptsObjectRegistrations,
        DefaultRegistryHost,
        ObjectRegisteredMessage,
        ObjectRegistryLookup,
        ObjectRegistryPlugin,
        ObjectRegistrySettings,
        ObjectUnregisteredMessage,
        RegistryCommandsExt,
    };

    #[cfg(feature = "testing")]
    pub use gameplay_registry_test_plugin::ObjectRegistryTestPlugin;
}
