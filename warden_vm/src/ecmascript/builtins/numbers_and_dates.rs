// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Number, BigInt and Math intrinsics, plus the date-like internal slot.

use crate::ecmascript::abstract_operations::type_conversion::{
    number_to_string, to_number, to_string,
};
use crate::ecmascript::builtins::{
    builtin, create_builtin, ArgumentsList, Behaviour, Builtin, OrdinaryObjectBuilder,
};
use crate::ecmascript::execution::agent::Agent;
use crate::ecmascript::execution::errors::{ExceptionType, JsResult};
use crate::ecmascript::types::language::object::{JsObject, ObjectKind, PrimitiveData};
use crate::ecmascript::types::property_descriptor::PropertySlot;
use crate::ecmascript::types::{JsBigInt, JsString, PropertyKey, Value};

/// The `[[DateValue]]` slot of a date-like value: milliseconds since the
/// epoch, or nothing for an invalid date.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DateData {
    pub(crate) epoch_milliseconds: Option<f64>,
}

fn this_number(agent: &Agent, this_value: &Value) -> JsResult<f64> {
    match this_value {
        Value::Number(number) => Ok(*number),
        Value::Object(object) => match &object.data().kind {
            ObjectKind::Primitive(PrimitiveData::Number(number)) => Ok(*number),
            _ => Err(agent.throw_exception(ExceptionType::TypeError, "Receiver is not a number")),
        },
        _ => Err(agent.throw_exception(ExceptionType::TypeError, "Receiver is not a number")),
    }
}

builtin!(NumberPrototypeToString, "toString", 1, number_prototype_to_string);
fn number_prototype_to_string(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    let number = this_number(agent, &this_value)?;
    match arguments.get(0) {
        Value::Undefined => Ok(Value::from(number_to_string(number))),
        radix => {
            let radix = to_number(agent, &radix)?;
            if !(2.0..=36.0).contains(&radix) {
                return Err(agent.throw_exception(
                    ExceptionType::RangeError,
                    "toString() radix must be between 2 and 36",
                ));
            }
            if radix == 10.0 {
                return Ok(Value::from(number_to_string(number)));
            }
            Ok(Value::from(format_radix(number, radix as u32)))
        }
    }
}

/// Integer-only radix formatting; fractional digits are truncated.
fn format_radix(number: f64, radix: u32) -> String {
    if number.is_nan() {
        return "NaN".to_string();
    }
    if number.is_infinite() {
        return if number > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let negative = number < 0.0;
    let mut value = number.abs().trunc() as u64;
    if value == 0 {
        return "0".to_string();
    }
    let digits = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut out = Vec::new();
    while value > 0 {
        out.push(digits[(value % u64::from(radix)) as usize]);
        value /= u64::from(radix);
    }
    if negative {
        out.push(b'-');
    }
    out.reverse();
    String::from_utf8(out).expect("radix digits are ASCII")
}

builtin!(NumberPrototypeToFixed, "toFixed", 1, number_prototype_to_fixed);
fn number_prototype_to_fixed(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    let number = this_number(agent, &this_value)?;
    let digits = to_number(agent, &arguments.get(0))?;
    if !(0.0..=100.0).contains(&digits) {
        return Err(agent.throw_exception(
            ExceptionType::RangeError,
            "toFixed() digits argument must be between 0 and 100",
        ));
    }
    Ok(Value::from(format!("{number:.prec$}", prec = digits as usize)))
}

builtin!(NumberPrototypeValueOf, "valueOf", 0, number_prototype_value_of);
fn number_prototype_value_of(
    agent: &Agent,
    this_value: Value,
    _: ArgumentsList<'_>,
) -> JsResult<Value> {
    Ok(Value::Number(this_number(agent, &this_value)?))
}

builtin!(NumberIsInteger, "isInteger", 1, number_is_integer);
fn number_is_integer(_: &Agent, _: Value, arguments: ArgumentsList<'_>) -> JsResult<Value> {
    Ok(Value::Boolean(matches!(
        arguments.get(0),
        Value::Number(n) if n.is_finite() && n.trunc() == n
    )))
}

builtin!(NumberIsFinite, "isFinite", 1, number_is_finite);
fn number_is_finite(_: &Agent, _: Value, arguments: ArgumentsList<'_>) -> JsResult<Value> {
    Ok(Value::Boolean(matches!(
        arguments.get(0),
        Value::Number(n) if n.is_finite()
    )))
}

builtin!(NumberIsNan, "isNaN", 1, number_is_nan);
fn number_is_nan(_: &Agent, _: Value, arguments: ArgumentsList<'_>) -> JsResult<Value> {
    Ok(Value::Boolean(matches!(
        arguments.get(0),
        Value::Number(n) if n.is_nan()
    )))
}

/// `Number(x)` converts; `new Number(x)` wraps.
fn number_constructor(
    agent: &Agent,
    arguments: ArgumentsList<'_>,
    instance_prototype: Option<&JsObject>,
) -> JsResult<Value> {
    let number = if arguments.is_empty() {
        0.0
    } else {
        to_number(agent, &arguments.get(0))?
    };
    match instance_prototype {
        None => Ok(Value::Number(number)),
        Some(prototype) => Ok(Value::Object(JsObject::new(
            Some(prototype.clone()),
            ObjectKind::Primitive(PrimitiveData::Number(number)),
        ))),
    }
}

// Global numeric parsing functions, shared with `Number.parseInt` /
// `Number.parseFloat`.

builtin!(ParseIntBuiltin, "parseInt", 2, parse_int);
fn parse_int(agent: &Agent, _: Value, arguments: ArgumentsList<'_>) -> JsResult<Value> {
    let text = to_string(agent, &arguments.get(0))?;
    let trimmed = text.as_str().trim();
    let radix = match arguments.get(1) {
        Value::Undefined => 0,
        value => to_number(agent, &value)? as u32,
    };
    let (negative, digits) = match trimmed.as_bytes() {
        [b'-', ..] => (true, &trimmed[1..]),
        [b'+', ..] => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let (radix, digits) = match radix {
        0 => {
            if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
                (16, hex)
            } else {
                (10, digits)
            }
        }
        16 => (
            16,
            digits
                .strip_prefix("0x")
                .or_else(|| digits.strip_prefix("0X"))
                .unwrap_or(digits),
        ),
        2..=36 => (radix, digits),
        _ => return Ok(Value::from(f64::NAN)),
    };
    let valid_len = digits
        .bytes()
        .take_while(|byte| (*byte as char).to_digit(radix).is_some())
        .count();
    if valid_len == 0 {
        return Ok(Value::from(f64::NAN));
    }
    let mut result = 0.0f64;
    for byte in digits[..valid_len].bytes() {
        result = result * f64::from(radix) + f64::from((byte as char).to_digit(radix).unwrap());
    }
    Ok(Value::from(if negative { -result } else { result }))
}

builtin!(ParseFloatBuiltin, "parseFloat", 1, parse_float);
fn parse_float(agent: &Agent, _: Value, arguments: ArgumentsList<'_>) -> JsResult<Value> {
    let text = to_string(agent, &arguments.get(0))?;
    let trimmed = text.as_str().trim_start();
    match fast_float::parse_partial::<f64, _>(trimmed) {
        Ok((number, consumed)) if consumed > 0 => {
            // fast-float accepts nan/inf spellings JS does not.
            let prefix = &trimmed[..consumed];
            if prefix
                .bytes()
                .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
            {
                Ok(Value::from(number))
            } else if trimmed.starts_with("Infinity")
                || trimmed.starts_with("+Infinity")
                || trimmed.starts_with("-Infinity")
            {
                Ok(Value::from(if trimmed.starts_with('-') {
                    f64::NEG_INFINITY
                } else {
                    f64::INFINITY
                }))
            } else {
                Ok(Value::from(f64::NAN))
            }
        }
        _ => Ok(Value::from(f64::NAN)),
    }
}

builtin!(IsNanBuiltin, "isNaN", 1, global_is_nan);
fn global_is_nan(agent: &Agent, _: Value, arguments: ArgumentsList<'_>) -> JsResult<Value> {
    Ok(Value::Boolean(to_number(agent, &arguments.get(0))?.is_nan()))
}

builtin!(IsFiniteBuiltin, "isFinite", 1, global_is_finite);
fn global_is_finite(agent: &Agent, _: Value, arguments: ArgumentsList<'_>) -> JsResult<Value> {
    Ok(Value::Boolean(
        to_number(agent, &arguments.get(0))?.is_finite(),
    ))
}

pub(crate) fn create_number_prototype(
    object_prototype: &JsObject,
    function_prototype: &JsObject,
) -> JsObject {
    OrdinaryObjectBuilder::new(
        JsObject::ordinary(Some(object_prototype.clone())),
        function_prototype,
    )
    .with_builtin_function_property::<NumberPrototypeToString>()
    .with_builtin_function_property::<NumberPrototypeToFixed>()
    .with_builtin_function_property::<NumberPrototypeValueOf>()
    .build()
}

pub(crate) fn create_number_constructor(
    prototype: &JsObject,
    function_prototype: &JsObject,
) -> JsObject {
    let constructor = create_builtin(
        "Number",
        1,
        Behaviour::Constructor(number_constructor),
        function_prototype,
    )
    .into_object();
    let constructor = OrdinaryObjectBuilder::new(constructor, function_prototype)
        .with_builtin_function_property::<NumberIsInteger>()
        .with_builtin_function_property::<NumberIsFinite>()
        .with_builtin_function_property::<NumberIsNan>()
        .with_builtin_function_property::<ParseIntBuiltin>()
        .with_builtin_function_property::<ParseFloatBuiltin>()
        .with_data_property(
            PropertyKey::from("MAX_SAFE_INTEGER"),
            Value::from(9_007_199_254_740_991.0),
        )
        .with_data_property(
            PropertyKey::from("MIN_SAFE_INTEGER"),
            Value::from(-9_007_199_254_740_991.0),
        )
        .with_data_property(PropertyKey::from("EPSILON"), Value::from(f64::EPSILON))
        .with_data_property(PropertyKey::from("MAX_VALUE"), Value::from(f64::MAX))
        .with_data_property(PropertyKey::from("MIN_VALUE"), Value::from(f64::MIN_POSITIVE))
        .with_data_property(
            PropertyKey::from("POSITIVE_INFINITY"),
            Value::from(f64::INFINITY),
        )
        .with_data_property(
            PropertyKey::from("NEGATIVE_INFINITY"),
            Value::from(f64::NEG_INFINITY),
        )
        .with_data_property(PropertyKey::from("NaN"), Value::from(f64::NAN))
        .build();
    constructor.insert_slot(
        PropertyKey::from("prototype"),
        PropertySlot::frozen(Value::Object(prototype.clone())),
    );
    prototype.insert_slot(
        PropertyKey::from("constructor"),
        PropertySlot::method(Value::from(constructor.clone())),
    );
    constructor
}

// BigInt.

fn this_big_int_value(agent: &Agent, value: &Value) -> JsResult<JsBigInt> {
    match value {
        Value::BigInt(big_int) => Ok(big_int.clone()),
        Value::Object(object) => match &object.data().kind {
            ObjectKind::Primitive(PrimitiveData::BigInt(big_int)) => Ok(big_int.clone()),
            _ => Err(agent
                .throw_exception_with_static_message(ExceptionType::TypeError, "Not a BigInt")),
        },
        _ => {
            Err(agent.throw_exception_with_static_message(ExceptionType::TypeError, "Not a BigInt"))
        }
    }
}

builtin!(BigIntPrototypeToString, "toString", 0, big_int_prototype_to_string);
fn big_int_prototype_to_string(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    let value = this_big_int_value(agent, &this_value)?;
    let radix = arguments.get(0);
    if radix.is_undefined() || matches!(radix, Value::Number(n) if n == 10.0) {
        Ok(Value::from(value.to_string()))
    } else {
        let radix = to_number(agent, &radix)?;
        if !(2.0..=36.0).contains(&radix) {
            return Err(agent.throw_exception(
                ExceptionType::RangeError,
                "toString() radix must be between 2 and 36",
            ));
        }
        Ok(Value::from(value.as_inner().to_str_radix(radix as u32)))
    }
}

builtin!(BigIntPrototypeValueOf, "valueOf", 0, big_int_prototype_value_of);
fn big_int_prototype_value_of(
    agent: &Agent,
    this_value: Value,
    _: ArgumentsList<'_>,
) -> JsResult<Value> {
    this_big_int_value(agent, &this_value).map(Value::BigInt)
}

/// `BigInt(x)`: integral numbers and digit strings convert, everything
/// else is a `TypeError` (`new BigInt` included).
fn big_int_constructor(
    agent: &Agent,
    arguments: ArgumentsList<'_>,
    instance_prototype: Option<&JsObject>,
) -> JsResult<Value> {
    if instance_prototype.is_some() {
        return Err(agent.throw_exception(
            ExceptionType::TypeError,
            "BigInt is not a constructor",
        ));
    }
    match arguments.get(0) {
        Value::BigInt(value) => Ok(Value::BigInt(value)),
        Value::Number(number) => {
            if number.trunc() != number || !number.is_finite() {
                return Err(agent.throw_exception(
                    ExceptionType::RangeError,
                    "The number cannot be converted to a BigInt because it is not an integer",
                ));
            }
            Ok(Value::BigInt(JsBigInt::new(num_bigint::BigInt::from(
                number as i128,
            ))))
        }
        Value::String(text) => JsBigInt::from_literal_digits(text.as_str().trim())
            .map(Value::BigInt)
            .ok_or_else(|| {
                agent.throw_exception(
                    ExceptionType::SyntaxError,
                    format!("Cannot convert {text} to a BigInt"),
                )
            }),
        Value::Boolean(flag) => Ok(Value::BigInt(JsBigInt::from(i64::from(flag)))),
        other => Err(agent.throw_exception(
            ExceptionType::TypeError,
            format!("Cannot convert {} to a BigInt", other.type_of()),
        )),
    }
}

pub(crate) fn create_big_int_prototype(
    object_prototype: &JsObject,
    function_prototype: &JsObject,
) -> JsObject {
    OrdinaryObjectBuilder::new(
        JsObject::ordinary(Some(object_prototype.clone())),
        function_prototype,
    )
    .with_builtin_function_property::<BigIntPrototypeToString>()
    .with_builtin_function_property::<BigIntPrototypeValueOf>()
    .build()
}

pub(crate) fn create_big_int_constructor(
    prototype: &JsObject,
    function_prototype: &JsObject,
) -> JsObject {
    let constructor = create_builtin(
        "BigInt",
        1,
        Behaviour::Constructor(big_int_constructor),
        function_prototype,
    )
    .into_object();
    constructor.insert_slot(
        PropertyKey::from("prototype"),
        PropertySlot::frozen(Value::Object(prototype.clone())),
    );
    prototype.insert_slot(
        PropertyKey::from("constructor"),
        PropertySlot::method(Value::from(constructor.clone())),
    );
    constructor
}

// Math.

macro_rules! math_unary {
    ($struct_name:ident, $js_name:literal, $method:ident) => {
        builtin!($struct_name, $js_name, 1, $method);
        fn $method(agent: &Agent, _: Value, arguments: ArgumentsList<'_>) -> JsResult<Value> {
            let x = to_number(agent, &arguments.get(0))?;
            Ok(Value::from(f64::$method(x)))
        }
    };
}

math_unary!(MathAbs, "abs", abs);
math_unary!(MathFloor, "floor", floor);
math_unary!(MathCeil, "ceil", ceil);
math_unary!(MathTrunc, "trunc", trunc);
math_unary!(MathSqrt, "sqrt", sqrt);
math_unary!(MathCbrt, "cbrt", cbrt);
math_unary!(MathSin, "sin", sin);
math_unary!(MathCos, "cos", cos);
math_unary!(MathTan, "tan", tan);
math_unary!(MathAsin, "asin", asin);
math_unary!(MathAcos, "acos", acos);
math_unary!(MathAtan, "atan", atan);
math_unary!(MathExp, "exp", exp);
math_unary!(MathLn, "log", ln);
math_unary!(MathLog2, "log2", log2);
math_unary!(MathLog10, "log10", log10);

builtin!(MathRound, "round", 1, math_round);
fn math_round(agent: &Agent, _: Value, arguments: ArgumentsList<'_>) -> JsResult<Value> {
    let x = to_number(agent, &arguments.get(0))?;
    // JS rounds half toward +∞, not away from zero.
    Ok(Value::from((x + 0.5).floor()))
}

builtin!(MathSign, "sign", 1, math_sign);
fn math_sign(agent: &Agent, _: Value, arguments: ArgumentsList<'_>) -> JsResult<Value> {
    let x = to_number(agent, &arguments.get(0))?;
    Ok(Value::from(if x.is_nan() || x == 0.0 { x } else { x.signum() }))
}

builtin!(MathPow, "pow", 2, math_pow);
fn math_pow(agent: &Agent, _: Value, arguments: ArgumentsList<'_>) -> JsResult<Value> {
    let base = to_number(agent, &arguments.get(0))?;
    let exponent = to_number(agent, &arguments.get(1))?;
    Ok(Value::from(base.powf(exponent)))
}

builtin!(MathAtan2, "atan2", 2, math_atan2);
fn math_atan2(agent: &Agent, _: Value, arguments: ArgumentsList<'_>) -> JsResult<Value> {
    let y = to_number(agent, &arguments.get(0))?;
    let x = to_number(agent, &arguments.get(1))?;
    Ok(Value::from(y.atan2(x)))
}

builtin!(MathHypot, "hypot", 2, math_hypot);
fn math_hypot(agent: &Agent, _: Value, arguments: ArgumentsList<'_>) -> JsResult<Value> {
    let mut sum = 0.0f64;
    for argument in arguments.slice() {
        let x = to_number(agent, argument)?;
        sum += x * x;
    }
    Ok(Value::from(sum.sqrt()))
}

builtin!(MathMin, "min", 2, math_min);
fn math_min(agent: &Agent, _: Value, arguments: ArgumentsList<'_>) -> JsResult<Value> {
    let mut result = f64::INFINITY;
    for argument in arguments.slice() {
        let x = to_number(agent, argument)?;
        if x.is_nan() {
            return Ok(Value::from(f64::NAN));
        }
        result = result.min(x);
    }
    Ok(Value::from(result))
}

builtin!(MathMax, "max", 2, math_max);
fn math_max(agent: &Agent, _: Value, arguments: ArgumentsList<'_>) -> JsResult<Value> {
    let mut result = f64::NEG_INFINITY;
    for argument in arguments.slice() {
        let x = to_number(agent, argument)?;
        if x.is_nan() {
            return Ok(Value::from(f64::NAN));
        }
        result = result.max(x);
    }
    Ok(Value::from(result))
}

builtin!(MathRandom, "random", 0, math_random);
fn math_random(agent: &Agent, _: Value, _: ArgumentsList<'_>) -> JsResult<Value> {
    Ok(Value::from(agent.next_random()))
}

pub(crate) fn create_math_object(
    object_prototype: &JsObject,
    function_prototype: &JsObject,
) -> JsObject {
    OrdinaryObjectBuilder::new(
        JsObject::ordinary(Some(object_prototype.clone())),
        function_prototype,
    )
    .with_builtin_function_property::<MathAbs>()
    .with_builtin_function_property::<MathFloor>()
    .with_builtin_function_property::<MathCeil>()
    .with_builtin_function_property::<MathRound>()
    .with_builtin_function_property::<MathTrunc>()
    .with_builtin_function_property::<MathSign>()
    .with_builtin_function_property::<MathSqrt>()
    .with_builtin_function_property::<MathCbrt>()
    .with_builtin_function_property::<MathPow>()
    .with_builtin_function_property::<MathSin>()
    .with_builtin_function_property::<MathCos>()
    .with_builtin_function_property::<MathTan>()
    .with_builtin_function_property::<MathAsin>()
    .with_builtin_function_property::<MathAcos>()
    .with_builtin_function_property::<MathAtan>()
    .with_builtin_function_property::<MathAtan2>()
    .with_builtin_function_property::<MathHypot>()
    .with_builtin_function_property::<MathExp>()
    .with_builtin_function_property::<MathLn>()
    .with_builtin_function_property::<MathLog2>()
    .with_builtin_function_property::<MathLog10>()
    .with_builtin_function_property::<MathMin>()
    .with_builtin_function_property::<MathMax>()
    .with_builtin_function_property::<MathRandom>()
    .with_data_property(PropertyKey::from("PI"), Value::from(core::f64::consts::PI))
    .with_data_property(PropertyKey::from("E"), Value::from(core::f64::consts::E))
    .with_data_property(PropertyKey::from("LN2"), Value::from(core::f64::consts::LN_2))
    .with_data_property(PropertyKey::from("LN10"), Value::from(core::f64::consts::LN_10))
    .with_data_property(
        PropertyKey::from("LOG2E"),
        Value::from(core::f64::consts::LOG2_E),
    )
    .with_data_property(
        PropertyKey::from("LOG10E"),
        Value::from(core::f64::consts::LOG10_E),
    )
    .with_data_property(
        PropertyKey::from("SQRT2"),
        Value::from(core::f64::consts::SQRT_2),
    )
    .with_data_property(
        PropertyKey::from("SQRT1_2"),
        Value::from(core::f64::consts::FRAC_1_SQRT_2),
    )
    .build()
}

/// The date-like primitive used by the barrier's `valueOf` stub.
pub(crate) fn date_primitive(data: &DateData) -> Value {
    data.epoch_milliseconds
        .map(Value::Number)
        .unwrap_or(Value::from(f64::NAN))
}

#[cfg(test)]
mod tests {
    use super::format_radix;

    #[test]
    fn radix_formatting() {
        assert_eq!(format_radix(255.0, 16), "ff");
        assert_eq!(format_radix(-8.0, 2), "-1000");
        assert_eq!(format_radix(0.0, 8), "0");
    }
}
