// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

pub mod language;
pub mod property_descriptor;
pub mod property_key;

pub use language::bigint::JsBigInt;
pub use language::function::JsFunction;
pub use language::object::JsObject;
pub use language::string::JsString;
pub use language::symbol::JsSymbol;
pub use language::value::Value;
pub use property_descriptor::PropertyDescriptor;
pub use property_key::PropertyKey;
