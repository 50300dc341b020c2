// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [7.3 Operations on Objects](https://tc39.es/ecma262/#sec-operations-on-objects)
//!
//! Property access with internal-kind dispatch: wrapped host objects go
//! through the barrier, module namespaces resolve live exports, arrays
//! keep `length` reactive, everything else is ordinary. Accessor calls are
//! driven synchronously; an interpreted getter cannot suspend.

use crate::ecmascript::builtins::array;
use crate::ecmascript::execution::agent::Agent;
use crate::ecmascript::execution::errors::{ExceptionType, JsResult};
use crate::ecmascript::scripts_and_modules::module;
use crate::ecmascript::types::language::object::{JsObject, ObjectKind, PrimitiveData};
use crate::ecmascript::types::property_descriptor::{PropertyDescriptor, PropertySlot};
use crate::ecmascript::types::{PropertyKey, Value};
use crate::engine::interpreter::functions::call_function_sync;
use crate::sandbox::barrier;

/// ### [7.3.2 Get](https://tc39.es/ecma262/#sec-get)
pub(crate) fn get(agent: &Agent, object: &JsObject, key: &PropertyKey) -> JsResult<Value> {
    enum Special {
        Barrier,
        Namespace,
        Value(Value),
        None,
    }
    let special = {
        let data = object.data();
        match &data.kind {
            ObjectKind::HostWrapped(_) => Special::Barrier,
            ObjectKind::Namespace(_) => Special::Namespace,
            ObjectKind::Array(array_data) => {
                if matches!(key, PropertyKey::String(name) if name == "length") {
                    Special::Value(Value::from(f64::from(array_data.length)))
                } else {
                    Special::None
                }
            }
            ObjectKind::HostBuffer(buffer) => match key {
                PropertyKey::Index(index) => Special::Value(
                    buffer
                        .bytes
                        .borrow()
                        .get(*index as usize)
                        .map(|byte| Value::from(f64::from(*byte)))
                        .unwrap_or(Value::Undefined),
                ),
                PropertyKey::String(name) if name == "length" => {
                    Special::Value(Value::from(buffer.bytes.borrow().len()))
                }
                _ => Special::None,
            },
            ObjectKind::Primitive(PrimitiveData::String(text)) => match key {
                PropertyKey::String(name) if name == "length" => {
                    Special::Value(Value::from(text.len()))
                }
                PropertyKey::Index(index) => Special::Value(
                    text.char_at(*index as usize)
                        .map(|ch| Value::from(crate::ecmascript::types::JsString::from(ch)))
                        .unwrap_or(Value::Undefined),
                ),
                _ => Special::None,
            },
            _ => Special::None,
        }
    };
    match special {
        Special::Barrier => {
            let data = object.data();
            let ObjectKind::HostWrapped(barrier_data) = &data.kind else {
                unreachable!()
            };
            barrier::get(barrier_data, key, agent.sanitize_stack_traces())
        }
        Special::Namespace => module::namespace_get(agent, object, key),
        Special::Value(value) => Ok(value),
        Special::None => ordinary_get(agent, object, key, &Value::Object(object.clone())),
    }
}

/// ### [10.1.8 OrdinaryGet](https://tc39.es/ecma262/#sec-ordinaryget)
fn ordinary_get(
    agent: &Agent,
    object: &JsObject,
    key: &PropertyKey,
    receiver: &Value,
) -> JsResult<Value> {
    let mut current = Some(object.clone());
    while let Some(link) = current {
        if let Some(slot) = link.own_slot(key) {
            return match slot {
                PropertySlot::Data { value, .. } => Ok(value),
                PropertySlot::Accessor { get: Some(getter), .. } => {
                    let Some(getter) = getter.as_function() else {
                        return Ok(Value::Undefined);
                    };
                    call_function_sync(agent, getter, receiver.clone(), &[])
                }
                PropertySlot::Accessor { get: None, .. } => Ok(Value::Undefined),
            };
        }
        current = link.prototype();
    }
    Ok(Value::Undefined)
}

/// Property read off any base value: primitives consult their prototype,
/// `undefined`/`null` fail.
pub(crate) fn get_value_property(
    agent: &Agent,
    base: &Value,
    key: &PropertyKey,
) -> JsResult<Value> {
    match base {
        Value::Undefined | Value::Null => Err(agent.throw_exception(
            ExceptionType::TypeError,
            format!(
                "Cannot read properties of {} (reading '{}')",
                if base.is_undefined() { "undefined" } else { "null" },
                key.to_display_string()
            ),
        )),
        _ => match base.as_object() {
            Some(object) => get(agent, object, key),
            None => {
                // Primitive: synthesize length/index for strings, then walk
                // the matching prototype with the primitive as receiver.
                if let Value::String(text) = base {
                    if let PropertyKey::Index(index) = key {
                        return Ok(text
                            .char_at(*index as usize)
                            .map(|ch| Value::from(crate::ecmascript::types::JsString::from(ch)))
                            .unwrap_or(Value::Undefined));
                    }
                    if matches!(key, PropertyKey::String(name) if name == "length") {
                        return Ok(Value::from(text.len()));
                    }
                }
                let prototype = primitive_prototype(agent, base);
                ordinary_get(agent, &prototype, key, base)
            }
        },
    }
}

fn primitive_prototype(agent: &Agent, value: &Value) -> JsObject {
    let intrinsics = agent.intrinsics();
    match value {
        Value::Boolean(_) => intrinsics.boolean_prototype.clone(),
        Value::Number(_) => intrinsics.number_prototype.clone(),
        Value::String(_) => intrinsics.string_prototype.clone(),
        Value::Symbol(_) => intrinsics.symbol_prototype.clone(),
        Value::BigInt(_) => intrinsics.bigint_prototype.clone(),
        _ => intrinsics.object_prototype.clone(),
    }
}

/// ### [7.3.4 Set](https://tc39.es/ecma262/#sec-set-o-p-v-throw)
pub(crate) fn set(
    agent: &Agent,
    object: &JsObject,
    key: &PropertyKey,
    value: Value,
) -> JsResult<()> {
    enum Route {
        Barrier,
        Namespace,
        ArrayLength,
        Ordinary,
    }
    let route = {
        let data = object.data();
        match &data.kind {
            ObjectKind::HostWrapped(_) => Route::Barrier,
            ObjectKind::Namespace(_) => Route::Namespace,
            ObjectKind::Array(_)
                if matches!(key, PropertyKey::String(name) if name == "length") =>
            {
                Route::ArrayLength
            }
            _ => Route::Ordinary,
        }
    };
    match route {
        Route::Barrier => {
            let data = object.data();
            let ObjectKind::HostWrapped(barrier_data) = &data.kind else {
                unreachable!()
            };
            barrier::set(barrier_data, key, &value)
        }
        Route::Namespace => Err(agent.throw_exception(
            ExceptionType::TypeError,
            "Cannot assign to read-only property of a module namespace",
        )),
        Route::ArrayLength => array::array_set_length(agent, object, &value),
        Route::Ordinary => {
            ordinary_set(agent, object, key, value)?;
            array::update_length_for_index(object, key);
            Ok(())
        }
    }
}

/// ### [10.1.9 OrdinarySet](https://tc39.es/ecma262/#sec-ordinaryset)
fn ordinary_set(agent: &Agent, object: &JsObject, key: &PropertyKey, value: Value) -> JsResult<()> {
    // Own slot first.
    if let Some(slot) = object.own_slot(key) {
        return match slot {
            PropertySlot::Data {
                writable: true,
                enumerable,
                configurable,
                ..
            } => {
                object.insert_slot(
                    key.clone(),
                    PropertySlot::Data {
                        value,
                        writable: true,
                        enumerable,
                        configurable,
                    },
                );
                Ok(())
            }
            PropertySlot::Data { writable: false, .. } => Err(read_only(agent, key)),
            PropertySlot::Accessor { set: Some(setter), .. } => {
                if let Some(setter) = setter.as_function() {
                    call_function_sync(
                        agent,
                        setter,
                        Value::Object(object.clone()),
                        &[value],
                    )?;
                }
                Ok(())
            }
            PropertySlot::Accessor { set: None, .. } => Err(read_only(agent, key)),
        };
    }
    // Inherited accessors and read-only data properties intercept.
    let mut current = object.prototype();
    while let Some(link) = current {
        if let Some(slot) = link.own_slot(key) {
            match slot {
                PropertySlot::Accessor { set: Some(setter), .. } => {
                    if let Some(setter) = setter.as_function() {
                        call_function_sync(
                            agent,
                            setter,
                            Value::Object(object.clone()),
                            &[value],
                        )?;
                    }
                    return Ok(());
                }
                PropertySlot::Accessor { set: None, .. }
                | PropertySlot::Data { writable: false, .. } => {
                    return Err(read_only(agent, key));
                }
                PropertySlot::Data { writable: true, .. } => break,
            }
        }
        current = link.prototype();
    }
    // Create an own property.
    if !object.is_extensible() {
        return Err(agent.throw_exception(
            ExceptionType::TypeError,
            format!(
                "Cannot add property {}, object is not extensible",
                key.to_display_string()
            ),
        ));
    }
    object.insert_slot(key.clone(), PropertySlot::data(value));
    Ok(())
}

fn read_only(
    agent: &Agent,
    key: &PropertyKey,
) -> crate::ecmascript::execution::errors::JsError {
    agent.throw_exception(
        ExceptionType::TypeError,
        format!(
            "Cannot assign to read only property '{}'",
            key.to_display_string()
        ),
    )
}

/// ### [7.3.5 CreateDataProperty](https://tc39.es/ecma262/#sec-createdataproperty) and friends
pub(crate) fn define_property(
    agent: &Agent,
    object: &JsObject,
    key: &PropertyKey,
    descriptor: &PropertyDescriptor,
) -> JsResult<()> {
    {
        let data = object.data();
        match &data.kind {
            ObjectKind::HostWrapped(barrier_data) => {
                return Err(barrier::define_property(barrier_data));
            }
            ObjectKind::Namespace(_) => {
                return Err(agent.throw_exception(
                    ExceptionType::TypeError,
                    "Cannot define properties on a module namespace",
                ));
            }
            _ => {}
        }
    }
    if let Some(mut slot) = object.own_slot(key) {
        if !slot.is_configurable() {
            let writable_data_value_change = matches!(
                (&slot, descriptor.is_accessor_descriptor()),
                (PropertySlot::Data { writable: true, .. }, false)
            );
            if !writable_data_value_change {
                return Err(agent.throw_exception(
                    ExceptionType::TypeError,
                    format!("Cannot redefine property: {}", key.to_display_string()),
                ));
            }
        }
        slot.apply(descriptor);
        object.insert_slot(key.clone(), slot);
    } else {
        if !object.is_extensible() {
            return Err(agent.throw_exception(
                ExceptionType::TypeError,
                format!(
                    "Cannot define property {}, object is not extensible",
                    key.to_display_string()
                ),
            ));
        }
        object.insert_slot(key.clone(), PropertySlot::from_descriptor(descriptor));
    }
    array::update_length_for_index(object, key);
    Ok(())
}

/// ### [7.3.9 DeletePropertyOrThrow](https://tc39.es/ecma262/#sec-deletepropertyorthrow) (boolean form)
pub(crate) fn delete_property(
    agent: &Agent,
    object: &JsObject,
    key: &PropertyKey,
) -> JsResult<bool> {
    {
        let data = object.data();
        match &data.kind {
            ObjectKind::HostWrapped(barrier_data) => {
                return Err(barrier::delete(barrier_data, key));
            }
            ObjectKind::Namespace(_) => {
                return Err(agent.throw_exception(
                    ExceptionType::TypeError,
                    "Cannot delete properties of a module namespace",
                ));
            }
            _ => {}
        }
    }
    match object.own_slot(key) {
        Some(slot) if !slot.is_configurable() => Ok(false),
        Some(_) => {
            object.remove_slot(key);
            Ok(true)
        }
        None => Ok(true),
    }
}

/// ### [7.3.12 HasProperty](https://tc39.es/ecma262/#sec-hasproperty)
pub(crate) fn has_property(agent: &Agent, object: &JsObject, key: &PropertyKey) -> JsResult<bool> {
    {
        let data = object.data();
        match &data.kind {
            ObjectKind::HostWrapped(barrier_data) => {
                return Ok(barrier::has(barrier_data, key));
            }
            ObjectKind::Namespace(_) => {
                return module::namespace_has(object, key);
            }
            ObjectKind::Array(array_data) => {
                if matches!(key, PropertyKey::String(name) if name == "length") {
                    let _ = array_data;
                    return Ok(true);
                }
            }
            _ => {}
        }
    }
    let mut current = Some(object.clone());
    while let Some(link) = current {
        if link.has_own(key) {
            return Ok(true);
        }
        current = link.prototype();
    }
    let _ = agent;
    Ok(false)
}

/// ### [7.3.11 GetMethod](https://tc39.es/ecma262/#sec-getmethod)
pub(crate) fn get_method(
    agent: &Agent,
    value: &Value,
    key: &PropertyKey,
) -> JsResult<Option<Value>> {
    let method = get_value_property(agent, value, key)?;
    if method.is_nullish() {
        return Ok(None);
    }
    if !method.is_callable() {
        return Err(agent.throw_exception(
            ExceptionType::TypeError,
            format!("Property '{}' is not a function", key.to_display_string()),
        ));
    }
    Ok(Some(method))
}

/// ### [7.3.22 OrdinaryHasInstance](https://tc39.es/ecma262/#sec-ordinaryhasinstance)
pub(crate) fn ordinary_has_instance(
    agent: &Agent,
    constructor: &Value,
    value: &Value,
) -> JsResult<bool> {
    let Some(constructor_fn) = constructor.as_function() else {
        return Err(agent.throw_exception(
            ExceptionType::TypeError,
            "Right-hand side of 'instanceof' is not callable",
        ));
    };
    let Some(object) = value.as_object() else {
        return Ok(false);
    };
    let prototype = get(
        agent,
        constructor_fn.object(),
        &PropertyKey::from("prototype"),
    )?;
    let Some(prototype) = prototype.as_object() else {
        return Err(agent.throw_exception(
            ExceptionType::TypeError,
            "Function has non-object prototype in instanceof check",
        ));
    };
    let mut current = object.prototype();
    while let Some(link) = current {
        if link.ptr_eq(prototype) {
            return Ok(true);
        }
        current = link.prototype();
    }
    Ok(false)
}

/// Own enumerable keys of one object, for `for..in`, `Object.keys` and
/// spread: array indices ascending, then strings in insertion order.
/// Symbols never enumerate.
pub(crate) fn own_enumerable_string_keys(agent: &Agent, object: &JsObject) -> Vec<PropertyKey> {
    {
        let data = object.data();
        match &data.kind {
            ObjectKind::HostWrapped(barrier_data) => {
                return barrier::own_enumerable_string_keys(barrier_data);
            }
            ObjectKind::Namespace(_) => {
                drop(data);
                return module::namespace_keys(object);
            }
            _ => {}
        }
    }
    let _ = agent;
    object
        .own_keys()
        .into_iter()
        .filter(|key| !key.is_symbol())
        .filter(|key| {
            object
                .own_slot(key)
                .map(|slot| slot.is_enumerable())
                .unwrap_or(false)
        })
        .collect()
}

/// `for..in` key sequence: own keys first, then inherited, shadowed names
/// skipped.
pub(crate) fn enumerate_for_in_keys(agent: &Agent, object: &JsObject) -> Vec<PropertyKey> {
    let mut seen: Vec<PropertyKey> = Vec::new();
    let mut result: Vec<PropertyKey> = Vec::new();
    let mut current = Some(object.clone());
    while let Some(link) = current {
        for key in own_enumerable_string_keys(agent, &link) {
            if !seen.contains(&key) {
                seen.push(key.clone());
                result.push(key);
            }
        }
        if link.is_host_wrapped() {
            break;
        }
        current = link.prototype();
    }
    result
}
