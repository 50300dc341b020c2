// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [10.1 Ordinary Object Internal Methods](https://tc39.es/ecma262/#sec-ordinary-object-internal-methods-and-internal-slots)
//!
//! Creation helpers; the access paths live in
//! `abstract_operations::operations_on_objects`.

use crate::ecmascript::execution::agent::Agent;
use crate::ecmascript::types::language::object::JsObject;
use crate::ecmascript::types::property_descriptor::PropertySlot;
use crate::ecmascript::types::{PropertyKey, Value};

/// ### [10.1.12 OrdinaryObjectCreate](https://tc39.es/ecma262/#sec-ordinaryobjectcreate)
///
/// A plain object against the realm's `%Object.prototype%`.
pub(crate) fn ordinary_object_create(agent: &Agent) -> JsObject {
    JsObject::ordinary(Some(agent.intrinsics().object_prototype.clone()))
}

pub(crate) fn ordinary_object_create_with_prototype(prototype: Option<JsObject>) -> JsObject {
    JsObject::ordinary(prototype)
}

/// ### [7.3.5 CreateDataPropertyOrThrow](https://tc39.es/ecma262/#sec-createdatapropertyorthrow)
///
/// Unchecked fast path for freshly created objects (literals,
/// destructuring rests): the object is known extensible and the key
/// unconfigured.
pub(crate) fn create_data_property(object: &JsObject, key: PropertyKey, value: Value) {
    object.insert_slot(key.clone(), PropertySlot::data(value));
    super::array::update_length_for_index(object, &key);
}
