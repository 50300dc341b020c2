// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scripts and modules: owned parse results, script evaluation, and the
//! resolver-driven module graph.

pub mod module;
pub(crate) mod script;
pub mod source_code;
