/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/

//! This crate extends the gameplay-registry library with a plugin and a set of gameplay
//! fixture classes used to standardize testing the library itself.
#![no_std]

extern crate alloc;

mod fixtures;
mod plugin;

pub use fixtures::*;
pub use plugin::ObjectRegistryTestPlugin;
