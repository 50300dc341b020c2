// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The host/sandbox boundary: the read-only barrier, host-adapted
//! callables, and stack sanitization.

pub mod barrier;
pub mod host_function;
pub(crate) mod stack_sanitizer;
