// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The read-only wrapping layer between sandbox code and host values.
//!
//! Every host object that becomes observable to sandbox code is wrapped in
//! a `HostWrapped` object. Reads are mediated here: forbidden names fail
//! with a `SecurityError` naming the property and the wrapper's display
//! path, nested reads return nested wrappers, writes and prototype
//! operations fail, and the reported prototype is always `null`. The one
//! mutation that passes is an indexed write into a host byte buffer.

use core::cell::RefCell;
use std::rc::Rc;

use phf::phf_set;

use crate::ecmascript::execution::errors::{ExceptionType, JsError, JsResult};
use crate::ecmascript::types::language::function::FunctionKind;
use crate::ecmascript::types::language::object::{JsObject, ObjectKind, PrimitiveData};
use crate::ecmascript::types::property_descriptor::PropertySlot;
use crate::ecmascript::types::{JsString, PropertyKey, Value};

use super::stack_sanitizer;

/// Property names whose reads the barrier refuses: prototype-chain keys,
/// legacy accessor introspection, introspection leaks, and function
/// reflection.
static FORBIDDEN_PROPERTY_NAMES: phf::Set<&'static str> = phf_set! {
    "__proto__",
    "constructor",
    "prototype",
    "__defineGetter__",
    "__defineSetter__",
    "__lookupGetter__",
    "__lookupSetter__",
    "valueOf",
    "toLocaleString",
    "hasOwnProperty",
    "isPrototypeOf",
    "propertyIsEnumerable",
    "apply",
    "call",
    "bind",
    "arguments",
    "caller",
};

/// Global names the evaluator refuses outright: each would let sandbox
/// code synthesize new code or reach engine internals.
pub(crate) static FORBIDDEN_GLOBAL_NAMES: [&str; 7] = [
    "Function",
    "eval",
    "Proxy",
    "Reflect",
    "AsyncFunction",
    "GeneratorFunction",
    "AsyncGeneratorFunction",
];

/// Internal slots of a wrapper object.
#[derive(Debug)]
pub(crate) struct BarrierData {
    pub(crate) target: JsObject,
    /// Human-readable origin, e.g. `global 'obj'.data[]`.
    pub(crate) path: String,
}

/// Internal slots of the writable host byte buffer.
#[derive(Debug)]
pub(crate) struct HostBufferData {
    pub(crate) bytes: Rc<RefCell<Vec<u8>>>,
}

/// Wraps a host global on first read. Primitives pass through; objects get
/// a wrapper; host callables are adapted.
pub(crate) fn wrap_global(value: Value, name: &JsString) -> Value {
    wrap_value(value, format!("global '{name}'"))
}

pub(crate) fn wrap_value(value: Value, path: String) -> Value {
    match value {
        Value::Object(object) => {
            Value::Object(JsObject::new(
                None,
                ObjectKind::HostWrapped(BarrierData { target: object, path }),
            ))
        }
        Value::Function(function) => {
            let data = function.data();
            if let ObjectKind::Function(function_data) = &data.kind {
                if let FunctionKind::HostAdapted(host) = &function_data.kind {
                    let name = function_data.name.borrow().clone();
                    return super::host_function::readapt(host, &name, None, path);
                }
            }
            drop(data);
            // A sandbox-native function round-tripping through the host is
            // already safe to call.
            Value::Function(function)
        }
        primitive => primitive,
    }
}

/// Property read through the barrier.
pub(crate) fn get(data: &BarrierData, key: &PropertyKey, sanitize_stacks: bool) -> JsResult<Value> {
    match key {
        PropertyKey::Symbol(symbol) => {
            return Err(security_error(&symbol.to_string(), &data.path));
        }
        PropertyKey::String(name) => {
            if FORBIDDEN_PROPERTY_NAMES.contains(name.as_str()) {
                return Err(security_error(name.as_str(), &data.path));
            }
            if name == "stack" {
                if let ObjectKind::Error(error) = &data.target.data().kind {
                    let stack = error
                        .stack
                        .as_ref()
                        .map(|stack| stack.as_str().to_string())
                        .unwrap_or_default();
                    let stack = if sanitize_stacks {
                        stack_sanitizer::sanitize_stack(&stack)
                    } else {
                        stack
                    };
                    return Ok(Value::from(stack));
                }
            }
        }
        PropertyKey::Index(index) => {
            if let ObjectKind::HostBuffer(buffer) = &data.target.data().kind {
                let bytes = buffer.bytes.borrow();
                return Ok(bytes
                    .get(*index as usize)
                    .map(|byte| Value::from(f64::from(*byte)))
                    .unwrap_or(Value::Undefined));
            }
        }
    }

    // Synthesized views of internal slots.
    if let PropertyKey::String(name) = key {
        let target_data = data.target.data();
        match (&target_data.kind, name.as_str()) {
            (ObjectKind::Array(array), "length") => {
                return Ok(Value::from(f64::from(array.length)));
            }
            (ObjectKind::HostBuffer(buffer), "length") => {
                return Ok(Value::from(buffer.bytes.borrow().len()));
            }
            (ObjectKind::Error(error), "message") => {
                return Ok(error
                    .message
                    .clone()
                    .map(Value::from)
                    .unwrap_or(Value::Undefined));
            }
            (ObjectKind::Error(error), "name") => {
                return Ok(Value::from(error.kind.as_str()));
            }
            _ => {}
        }
    }

    // Ordinary lookup on the target, walking its own (host-side) chain.
    // Host accessors are not invoked; only data slots are readable.
    let mut current = Some(data.target.clone());
    while let Some(object) = current {
        if let Some(slot) = object.own_slot(key) {
            return match slot {
                PropertySlot::Data { value, .. } => {
                    Ok(wrap_member(value, &data.path, key))
                }
                PropertySlot::Accessor { .. } => Err(security_error(
                    &key.to_display_string(),
                    &data.path,
                )),
            };
        }
        current = object.prototype();
    }
    Ok(Value::Undefined)
}

/// Nested reads propagate the wrapper with an extended display path.
fn wrap_member(value: Value, parent_path: &str, key: &PropertyKey) -> Value {
    wrap_value(value, format!("{parent_path}.{key}"))
}

/// Property write through the barrier. Only indexed writes into a host
/// byte buffer pass.
pub(crate) fn set(data: &BarrierData, key: &PropertyKey, value: &Value) -> JsResult<()> {
    if let (PropertyKey::Index(index), ObjectKind::HostBuffer(buffer)) =
        (key, &data.target.data().kind)
    {
        if let Value::Number(number) = value {
            let mut bytes = buffer.bytes.borrow_mut();
            let index = *index as usize;
            if index < bytes.len() {
                bytes[index] = to_uint8(*number);
            }
            return Ok(());
        }
    }
    Err(JsError::new(
        ExceptionType::SecurityError,
        format!(
            "Cannot assign to property '{}' of {}",
            key.to_display_string(),
            data.path
        ),
    ))
}

pub(crate) fn delete(data: &BarrierData, key: &PropertyKey) -> JsError {
    JsError::new(
        ExceptionType::SecurityError,
        format!(
            "Cannot delete property '{}' of {}",
            key.to_display_string(),
            data.path
        ),
    )
}

pub(crate) fn define_property(data: &BarrierData) -> JsError {
    JsError::new(
        ExceptionType::SecurityError,
        format!("Cannot define properties on {}", data.path),
    )
}

/// `in`, `for..in`: key introspection reveals names only, which is safe.
pub(crate) fn has(data: &BarrierData, key: &PropertyKey) -> bool {
    let mut current = Some(data.target.clone());
    while let Some(object) = current {
        if object.has_own(key) {
            return true;
        }
        current = object.prototype();
    }
    false
}

pub(crate) fn own_enumerable_string_keys(data: &BarrierData) -> Vec<PropertyKey> {
    data.target
        .own_keys()
        .into_iter()
        .filter(|key| !key.is_symbol())
        .filter(|key| match key {
            PropertyKey::String(name) => !FORBIDDEN_PROPERTY_NAMES.contains(name.as_str()),
            _ => true,
        })
        .collect()
}

/// The `valueOf` stub: primitive wrappers and date-likes report their
/// documented primitive; everything else reports nothing and the wrapper
/// coerces as an opaque object. The host's own `valueOf` is never invoked.
pub(crate) fn primitive_stub(data: &BarrierData) -> Option<Value> {
    match &data.target.data().kind {
        ObjectKind::Primitive(primitive) => Some(match primitive {
            PrimitiveData::Boolean(value) => Value::Boolean(*value),
            PrimitiveData::Number(value) => Value::Number(*value),
            PrimitiveData::String(value) => Value::String(value.clone()),
            PrimitiveData::Symbol(value) => Value::Symbol(value.clone()),
            PrimitiveData::BigInt(value) => Value::BigInt(value.clone()),
        }),
        ObjectKind::Date(date) => date.epoch_milliseconds.map(Value::Number),
        _ => None,
    }
}

/// `for..of` / `for await..of` over a wrapper: host arrays and byte
/// buffers iterate, each element wrapped under `path[]`.
pub(crate) fn iterable_values(data: &BarrierData) -> JsResult<Vec<Value>> {
    let element_path = format!("{}[]", data.path);
    let target_data = data.target.data();
    match &target_data.kind {
        ObjectKind::Array(array) => {
            let length = array.length;
            drop(target_data);
            let mut values = Vec::with_capacity(length as usize);
            for index in 0..length {
                let element = data
                    .target
                    .own_slot(&PropertyKey::Index(index))
                    .and_then(|slot| match slot {
                        PropertySlot::Data { value, .. } => Some(value),
                        PropertySlot::Accessor { .. } => None,
                    })
                    .unwrap_or(Value::Undefined);
                values.push(wrap_value(element, element_path.clone()));
            }
            Ok(values)
        }
        ObjectKind::HostBuffer(buffer) => Ok(buffer
            .bytes
            .borrow()
            .iter()
            .map(|byte| Value::from(f64::from(*byte)))
            .collect()),
        _ => Err(JsError::new(
            ExceptionType::TypeError,
            format!("{} is not iterable", data.path),
        )),
    }
}

fn security_error(name: &str, path: &str) -> JsError {
    log::trace!("barrier denied read of {name} on {path}");
    JsError::new(
        ExceptionType::SecurityError,
        format!("Cannot access {name} on {path}"),
    )
}

fn to_uint8(number: f64) -> u8 {
    if !number.is_finite() {
        return 0;
    }
    let int = number.trunc() as i64;
    (int.rem_euclid(256)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn wrapped(value: Value) -> BarrierData {
        let Value::Object(object) = wrap_global(value, &JsString::new("obj")) else {
            panic!("expected object wrapper");
        };
        let data = object.data();
        match &data.kind {
            ObjectKind::HostWrapped(barrier) => BarrierData {
                target: barrier.target.clone(),
                path: barrier.path.clone(),
            },
            _ => panic!("expected wrapper"),
        }
    }

    fn host_object() -> Value {
        let mut entries = IndexMap::new();
        entries.insert("value", Value::from(42.0));
        Value::host_object(entries)
    }

    #[test]
    fn forbidden_name_read_is_security_error() {
        let data = wrapped(host_object());
        let error = get(&data, &PropertyKey::from("__proto__"), true).unwrap_err();
        assert_eq!(error.kind(), ExceptionType::SecurityError);
        assert_eq!(
            error.message(),
            "Cannot access __proto__ on global 'obj'"
        );
    }

    #[test]
    fn nested_reads_extend_the_path() {
        let inner = host_object();
        let mut entries = IndexMap::new();
        entries.insert("data", inner);
        let data = wrapped(Value::host_object(entries));
        let nested = get(&data, &PropertyKey::from("data"), true).unwrap();
        let nested_object = nested.as_object().unwrap();
        match &nested_object.data().kind {
            ObjectKind::HostWrapped(barrier) => {
                assert_eq!(barrier.path, "global 'obj'.data");
            }
            other => panic!("expected nested wrapper, got {other:?}"),
        };
    }

    #[test]
    fn writes_fail_except_buffer_indices() {
        let data = wrapped(host_object());
        assert_eq!(
            set(&data, &PropertyKey::from("value"), &Value::from(1.0))
                .unwrap_err()
                .kind(),
            ExceptionType::SecurityError
        );

        let shared = Rc::new(RefCell::new(vec![0u8; 4]));
        let buffer = wrapped(Value::uint8_buffer_shared(shared.clone()));
        set(&buffer, &PropertyKey::Index(1), &Value::from(257.0)).unwrap();
        assert_eq!(shared.borrow()[1], 1);
    }

    #[test]
    fn host_array_iteration_wraps_elements() {
        let array = Value::host_array([host_object(), host_object()]);
        let data = wrapped(array);
        let values = iterable_values(&data).unwrap();
        assert_eq!(values.len(), 2);
        match &values[0].as_object().unwrap().data().kind {
            ObjectKind::HostWrapped(barrier) => assert_eq!(barrier.path, "global 'obj'[]"),
            other => panic!("expected wrapper, got {other:?}"),
        };
    }
}
