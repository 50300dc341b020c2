// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [7.2 Testing and Comparison Operations](https://tc39.es/ecma262/#sec-testing-and-comparison-operations)

use core::cmp::Ordering;

use num_bigint::BigInt;

use crate::ecmascript::execution::agent::Agent;
use crate::ecmascript::execution::errors::JsResult;
use crate::ecmascript::types::{JsBigInt, Value};

use super::type_conversion::{string_to_number, to_primitive, PreferredType};

/// ### [7.2.15 IsStrictlyEqual](https://tc39.es/ecma262/#sec-isstrictlyequal)
///
/// Identity for objects, bit-equal for primitives, `NaN ≠ NaN`,
/// `+0 == -0`.
pub(crate) fn is_strictly_equal(x: &Value, y: &Value) -> bool {
    match (x, y) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::BigInt(a), Value::BigInt(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Symbol(a), Value::Symbol(b)) => a == b,
        _ => match (x.as_object(), y.as_object()) {
            (Some(a), Some(b)) => a.ptr_eq(b),
            _ => false,
        },
    }
}

/// ### [7.2.11 SameValue](https://tc39.es/ecma262/#sec-samevalue)
///
/// `Object.is` semantics: `NaN` equals itself, `+0` and `-0` differ.
pub(crate) fn same_value(x: &Value, y: &Value) -> bool {
    if let (Value::Number(a), Value::Number(b)) = (x, y) {
        if a.is_nan() && b.is_nan() {
            return true;
        }
        return *a == *b && a.is_sign_negative() == b.is_sign_negative();
    }
    is_strictly_equal(x, y)
}

/// ### [7.2.12 SameValueZero](https://tc39.es/ecma262/#sec-samevaluezero)
///
/// As [`same_value`] but `+0` equals `-0`; the `includes`/collection
/// comparison.
pub(crate) fn same_value_zero(x: &Value, y: &Value) -> bool {
    if let (Value::Number(a), Value::Number(b)) = (x, y) {
        if a.is_nan() && b.is_nan() {
            return true;
        }
        return *a == *b;
    }
    is_strictly_equal(x, y)
}

/// ### [7.2.14 IsLooselyEqual](https://tc39.es/ecma262/#sec-islooselyequal)
pub(crate) fn is_loosely_equal(agent: &Agent, x: &Value, y: &Value) -> JsResult<bool> {
    // 1. Same type: strict comparison.
    if same_type(x, y) {
        return Ok(is_strictly_equal(x, y));
    }
    match (x, y) {
        (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => Ok(true),
        (Value::Number(a), Value::String(b)) => Ok(*a == string_to_number(b)),
        (Value::String(a), Value::Number(b)) => Ok(string_to_number(a) == *b),
        (Value::BigInt(a), Value::String(b)) => {
            Ok(parse_bigint_string(b.as_str()).map_or(false, |parsed| *a == parsed))
        }
        (Value::String(_), Value::BigInt(_)) => is_loosely_equal(agent, y, x),
        (Value::Boolean(_), _) => {
            let number = Value::Number(if x.to_boolean() { 1.0 } else { 0.0 });
            is_loosely_equal(agent, &number, y)
        }
        (_, Value::Boolean(_)) => {
            let number = Value::Number(if y.to_boolean() { 1.0 } else { 0.0 });
            is_loosely_equal(agent, x, &number)
        }
        (Value::BigInt(a), Value::Number(b)) => Ok(a.compare_f64(*b) == Some(Ordering::Equal)),
        (Value::Number(a), Value::BigInt(b)) => Ok(b.compare_f64(*a) == Some(Ordering::Equal)),
        (Value::Object(_) | Value::Function(_), _) if is_primitive(y) => {
            let primitive = to_primitive(agent, x, PreferredType::Default)?;
            if primitive.is_object() {
                return Ok(false);
            }
            is_loosely_equal(agent, &primitive, y)
        }
        (_, Value::Object(_) | Value::Function(_)) if is_primitive(x) => {
            let primitive = to_primitive(agent, y, PreferredType::Default)?;
            if primitive.is_object() {
                return Ok(false);
            }
            is_loosely_equal(agent, x, &primitive)
        }
        _ => Ok(false),
    }
}

/// ### [7.2.13 IsLessThan](https://tc39.es/ecma262/#sec-islessthan)
///
/// The shared core of the relational operators. `None` means an undefined
/// comparison (NaN involved).
pub(crate) fn compare_values(agent: &Agent, x: &Value, y: &Value) -> JsResult<Option<Ordering>> {
    let px = to_primitive(agent, x, PreferredType::Number)?;
    let py = to_primitive(agent, y, PreferredType::Number)?;
    if let (Value::String(a), Value::String(b)) = (&px, &py) {
        return Ok(Some(a.cmp(b)));
    }
    match (&px, &py) {
        (Value::BigInt(a), Value::BigInt(b)) => Ok(Some(a.as_inner().cmp(b.as_inner()))),
        (Value::BigInt(a), Value::String(b)) => {
            Ok(parse_bigint_string(b.as_str()).map(|parsed| a.as_inner().cmp(parsed.as_inner())))
        }
        (Value::String(a), Value::BigInt(b)) => Ok(parse_bigint_string(a.as_str())
            .map(|parsed| parsed.as_inner().cmp(b.as_inner()))),
        (Value::BigInt(a), other) => {
            let number = super::type_conversion::to_number(agent, other)?;
            Ok(a.compare_f64(number))
        }
        (other, Value::BigInt(b)) => {
            let number = super::type_conversion::to_number(agent, other)?;
            Ok(b.compare_f64(number).map(Ordering::reverse))
        }
        _ => {
            let a = super::type_conversion::to_number(agent, &px)?;
            let b = super::type_conversion::to_number(agent, &py)?;
            Ok(a.partial_cmp(&b))
        }
    }
}

fn parse_bigint_string(text: &str) -> Option<JsBigInt> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(JsBigInt::new(BigInt::from(0)));
    }
    JsBigInt::from_literal_digits(trimmed)
}

fn same_type(x: &Value, y: &Value) -> bool {
    core::mem::discriminant(&normalize(x)) == core::mem::discriminant(&normalize(y))
}

/// Object and Function are one type for comparison purposes.
fn normalize(value: &Value) -> Value {
    match value {
        Value::Function(function) => Value::Object(function.object().clone()),
        other => other.clone(),
    }
}

fn is_primitive(value: &Value) -> bool {
    !value.is_object()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_equality_nan_and_zero() {
        assert!(!is_strictly_equal(
            &Value::from(f64::NAN),
            &Value::from(f64::NAN)
        ));
        assert!(is_strictly_equal(&Value::from(0.0), &Value::from(-0.0)));
        assert!(same_value(&Value::from(f64::NAN), &Value::from(f64::NAN)));
        assert!(!same_value(&Value::from(0.0), &Value::from(-0.0)));
        assert!(same_value_zero(&Value::from(0.0), &Value::from(-0.0)));
    }

    #[test]
    fn strict_equality_is_identity_for_objects() {
        let a = crate::ecmascript::types::JsObject::ordinary(None);
        let b = crate::ecmascript::types::JsObject::ordinary(None);
        assert!(is_strictly_equal(
            &Value::Object(a.clone()),
            &Value::Object(a.clone())
        ));
        assert!(!is_strictly_equal(&Value::Object(a), &Value::Object(b)));
    }
}
