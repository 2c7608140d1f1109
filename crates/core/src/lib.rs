/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/
#![no_std]

extern crate alloc;

pub mod class_key;
pub mod entry;
pub mod errors;
pub mod events;
pub mod host;
pub mod registry;
pub mod settings;
mod thread_safe_wrapper;
pub mod types;
