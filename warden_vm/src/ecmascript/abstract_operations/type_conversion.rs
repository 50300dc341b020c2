// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [7.1 Type Conversion](https://tc39.es/ecma262/#sec-type-conversion)
//!
//! The coercion tables, written out explicitly. BigInt never implicitly
//! mixes with Number; both directions fail with a `TypeError`.

use crate::ecmascript::abstract_operations::operations_on_objects::get_method;
use crate::ecmascript::execution::agent::Agent;
use crate::ecmascript::execution::errors::{ExceptionType, JsResult};
use crate::ecmascript::types::language::object::{JsObject, ObjectKind, PrimitiveData};
use crate::ecmascript::types::{JsBigInt, JsString, PropertyKey, Value};
use crate::engine::interpreter::functions::call_function_sync;
use crate::sandbox::barrier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PreferredType {
    Default,
    Number,
    String,
}

/// Either numeric tower, the result of [`to_numeric`].
#[derive(Debug, Clone)]
pub(crate) enum Numeric {
    Number(f64),
    BigInt(JsBigInt),
}

/// ### [7.1.1 ToPrimitive](https://tc39.es/ecma262/#sec-toprimitive)
pub(crate) fn to_primitive(
    agent: &Agent,
    value: &Value,
    preferred_type: PreferredType,
) -> JsResult<Value> {
    let Some(object) = value.as_object() else {
        return Ok(value.clone());
    };

    // Wrapped host objects never run host conversion code: primitive
    // wrappers and date-likes report their documented primitive, anything
    // else coerces as an opaque object.
    if let ObjectKind::HostWrapped(data) = &object.data().kind {
        if let Some(primitive) = barrier::primitive_stub(data) {
            return Ok(primitive);
        }
        return Ok(match preferred_type {
            PreferredType::String => Value::from("[object Object]"),
            _ => Value::from(f64::NAN),
        });
    }

    ordinary_to_primitive(agent, object, preferred_type)
}

/// ### [7.1.1.1 OrdinaryToPrimitive](https://tc39.es/ecma262/#sec-ordinarytoprimitive)
fn ordinary_to_primitive(
    agent: &Agent,
    object: &JsObject,
    preferred_type: PreferredType,
) -> JsResult<Value> {
    let method_names: [&str; 2] = if preferred_type == PreferredType::String {
        ["toString", "valueOf"]
    } else {
        ["valueOf", "toString"]
    };
    for name in method_names {
        let method = get_method(agent, &Value::Object(object.clone()), &PropertyKey::from(name))?;
        if let Some(method) = method {
            let method = method
                .as_function()
                .expect("get_method guarantees a callable value");
            let result = call_function_sync(
                agent,
                method,
                Value::Object(object.clone()),
                &[],
            )?;
            if !result.is_object() {
                return Ok(result);
            }
        }
    }
    Err(agent.throw_exception(
        ExceptionType::TypeError,
        "Cannot convert object to primitive value",
    ))
}

/// ### [7.1.4 ToNumber](https://tc39.es/ecma262/#sec-tonumber)
pub(crate) fn to_number(agent: &Agent, value: &Value) -> JsResult<f64> {
    match value {
        Value::Undefined => Ok(f64::NAN),
        Value::Null => Ok(0.0),
        Value::Boolean(true) => Ok(1.0),
        Value::Boolean(false) => Ok(0.0),
        Value::Number(number) => Ok(*number),
        Value::String(text) => Ok(string_to_number(text)),
        Value::Symbol(_) => Err(agent.throw_exception(
            ExceptionType::TypeError,
            "Cannot convert a Symbol value to a number",
        )),
        Value::BigInt(_) => Err(agent.throw_exception(
            ExceptionType::TypeError,
            "Cannot convert a BigInt value to a number",
        )),
        Value::Object(_) | Value::Function(_) => {
            let primitive = to_primitive(agent, value, PreferredType::Number)?;
            to_number(agent, &primitive)
        }
    }
}

/// ### [7.1.3 ToNumeric](https://tc39.es/ecma262/#sec-tonumeric)
pub(crate) fn to_numeric(agent: &Agent, value: &Value) -> JsResult<Numeric> {
    let primitive = to_primitive(agent, value, PreferredType::Number)?;
    if let Value::BigInt(big_int) = primitive {
        return Ok(Numeric::BigInt(big_int));
    }
    to_number(agent, &primitive).map(Numeric::Number)
}

/// ### [7.1.4.1.1 StringToNumber](https://tc39.es/ecma262/#sec-stringtonumber)
pub(crate) fn string_to_number(text: &JsString) -> f64 {
    let trimmed = text.as_str().trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if let Some(digits) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        return u64::from_str_radix(digits, 16).map_or(f64::NAN, |v| v as f64);
    }
    if let Some(digits) = trimmed.strip_prefix("0o").or_else(|| trimmed.strip_prefix("0O")) {
        return u64::from_str_radix(digits, 8).map_or(f64::NAN, |v| v as f64);
    }
    if let Some(digits) = trimmed.strip_prefix("0b").or_else(|| trimmed.strip_prefix("0B")) {
        return u64::from_str_radix(digits, 2).map_or(f64::NAN, |v| v as f64);
    }
    match fast_float::parse::<f64, _>(trimmed) {
        Ok(number) => {
            // fast-float accepts forms StringNumericLiteral does not
            // ("1.0e", "nan"); double-check the tail parsed.
            if trimmed
                .bytes()
                .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
            {
                number
            } else {
                f64::NAN
            }
        }
        Err(_) => f64::NAN,
    }
}

/// ### [6.1.6.1.20 Number::toString](https://tc39.es/ecma262/#sec-numeric-types-number-tostring)
pub(crate) fn number_to_string(number: f64) -> String {
    if number.is_nan() {
        return "NaN".to_string();
    }
    if number == f64::INFINITY {
        return "Infinity".to_string();
    }
    if number == f64::NEG_INFINITY {
        return "-Infinity".to_string();
    }
    let mut buffer = ryu_js::Buffer::new();
    buffer.format_finite(number).to_string()
}

/// ### [7.1.17 ToString](https://tc39.es/ecma262/#sec-tostring)
pub(crate) fn to_string(agent: &Agent, value: &Value) -> JsResult<JsString> {
    match value {
        Value::Undefined => Ok(JsString::new("undefined")),
        Value::Null => Ok(JsString::new("null")),
        Value::Boolean(true) => Ok(JsString::new("true")),
        Value::Boolean(false) => Ok(JsString::new("false")),
        Value::Number(number) => Ok(JsString::from(number_to_string(*number))),
        Value::BigInt(big_int) => Ok(JsString::from(big_int.to_string())),
        Value::String(text) => Ok(text.clone()),
        Value::Symbol(_) => Err(agent.throw_exception(
            ExceptionType::TypeError,
            "Cannot convert a Symbol value to a string",
        )),
        Value::Object(_) | Value::Function(_) => {
            let primitive = to_primitive(agent, value, PreferredType::String)?;
            to_string(agent, &primitive)
        }
    }
}

/// ### [7.1.18 ToObject](https://tc39.es/ecma262/#sec-toobject)
pub(crate) fn to_object(agent: &Agent, value: &Value) -> JsResult<JsObject> {
    let intrinsics = agent.intrinsics();
    let (prototype, data) = match value {
        Value::Undefined | Value::Null => {
            return Err(agent.throw_exception(
                ExceptionType::TypeError,
                "Cannot convert undefined or null to object",
            ));
        }
        Value::Object(object) => return Ok(object.clone()),
        Value::Function(function) => return Ok(function.object().clone()),
        Value::Boolean(flag) => (
            intrinsics.boolean_prototype.clone(),
            PrimitiveData::Boolean(*flag),
        ),
        Value::Number(number) => (
            intrinsics.number_prototype.clone(),
            PrimitiveData::Number(*number),
        ),
        Value::String(text) => (
            intrinsics.string_prototype.clone(),
            PrimitiveData::String(text.clone()),
        ),
        Value::Symbol(symbol) => (
            intrinsics.symbol_prototype.clone(),
            PrimitiveData::Symbol(symbol.clone()),
        ),
        Value::BigInt(big_int) => (
            intrinsics.bigint_prototype.clone(),
            PrimitiveData::BigInt(big_int.clone()),
        ),
    };
    Ok(JsObject::new(Some(prototype), ObjectKind::Primitive(data)))
}

/// ### [7.1.19 ToPropertyKey](https://tc39.es/ecma262/#sec-topropertykey)
pub(crate) fn to_property_key(agent: &Agent, value: &Value) -> JsResult<PropertyKey> {
    if let Value::Symbol(symbol) = value {
        return Ok(PropertyKey::Symbol(symbol.clone()));
    }
    // Numbers fold through their canonical string form so `a[3]` and
    // `a["3"]` land on the same slot.
    let key = to_string(agent, &to_primitive(agent, value, PreferredType::String)?)?;
    Ok(PropertyKey::from_string(key))
}

/// ### [7.1.6 ToInt32](https://tc39.es/ecma262/#sec-toint32)
pub(crate) fn to_int32(agent: &Agent, value: &Value) -> JsResult<i32> {
    let number = to_number(agent, value)?;
    Ok(f64_to_uint32(number) as i32)
}

/// ### [7.1.7 ToUint32](https://tc39.es/ecma262/#sec-touint32)
pub(crate) fn to_uint32(agent: &Agent, value: &Value) -> JsResult<u32> {
    let number = to_number(agent, value)?;
    Ok(f64_to_uint32(number))
}

pub(crate) fn f64_to_uint32(number: f64) -> u32 {
    if !number.is_finite() || number == 0.0 {
        return 0;
    }
    let modulo = number.trunc().rem_euclid(4_294_967_296.0);
    modulo as u32
}

/// ### [7.1.20 ToLength](https://tc39.es/ecma262/#sec-tolength)
pub(crate) fn to_length(agent: &Agent, value: &Value) -> JsResult<u64> {
    let number = to_number(agent, value)?;
    if number.is_nan() || number <= 0.0 {
        return Ok(0);
    }
    Ok(number.min(2f64.powi(53) - 1.0) as u64)
}

#[cfg(test)]
mod tests {
    use super::{number_to_string, string_to_number};
    use crate::ecmascript::types::JsString;

    #[test]
    fn string_to_number_forms() {
        assert_eq!(string_to_number(&JsString::new("  42  ")), 42.0);
        assert_eq!(string_to_number(&JsString::new("")), 0.0);
        assert_eq!(string_to_number(&JsString::new("0x10")), 16.0);
        assert_eq!(string_to_number(&JsString::new("1e3")), 1000.0);
        assert!(string_to_number(&JsString::new("12px")).is_nan());
        assert_eq!(string_to_number(&JsString::new("Infinity")), f64::INFINITY);
    }

    #[test]
    fn number_to_string_forms() {
        assert_eq!(number_to_string(5.0), "5");
        assert_eq!(number_to_string(0.5), "0.5");
        assert_eq!(number_to_string(f64::NAN), "NaN");
        assert_eq!(number_to_string(-0.0), "0");
        assert_eq!(number_to_string(f64::NEG_INFINITY), "-Infinity");
    }
}
