// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! String intrinsics. Strings are UTF-8 and indexed by code point.

use crate::ecmascript::abstract_operations::type_conversion::{to_number, to_string};
use crate::ecmascript::builtins::{
    builtin, create_builtin, ArgumentsList, Behaviour, Builtin, OrdinaryObjectBuilder,
};
use crate::ecmascript::builtins::array::array_create;
use crate::ecmascript::builtins::control_abstraction_objects::create_iter_result_object;
use crate::ecmascript::execution::agent::Agent;
use crate::ecmascript::execution::errors::{ExceptionType, JsResult};
use crate::ecmascript::types::language::object::{JsObject, ObjectKind, PrimitiveData};
use crate::ecmascript::types::property_descriptor::PropertySlot;
use crate::ecmascript::types::{JsString, PropertyKey, Value};

/// Internal slots of a string iterator.
#[derive(Debug)]
pub(crate) struct StringIteratorData {
    pub(crate) chars: Vec<char>,
    pub(crate) index: usize,
}

/// The receiver as a string: primitive, or the `[[StringData]]` of a
/// wrapper object.
fn this_string(agent: &Agent, this_value: &Value) -> JsResult<JsString> {
    match this_value {
        Value::String(text) => Ok(text.clone()),
        Value::Object(object) => match &object.data().kind {
            ObjectKind::Primitive(PrimitiveData::String(text)) => Ok(text.clone()),
            _ => Err(agent.throw_exception(
                ExceptionType::TypeError,
                "Receiver is not a string",
            )),
        },
        _ => Err(agent.throw_exception(ExceptionType::TypeError, "Receiver is not a string")),
    }
}

fn index_argument(agent: &Agent, value: &Value, length: usize, default: usize) -> JsResult<usize> {
    if value.is_undefined() {
        return Ok(default);
    }
    let number = to_number(agent, value)?;
    if number.is_nan() {
        return Ok(0);
    }
    let number = number.trunc();
    Ok(if number < 0.0 {
        (length as f64 + number).max(0.0) as usize
    } else {
        (number as usize).min(length)
    })
}

builtin!(StringPrototypeCharAt, "charAt", 1, string_prototype_char_at);
fn string_prototype_char_at(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    let text = this_string(agent, &this_value)?;
    let index = to_number(agent, &arguments.get(0))?;
    if index < 0.0 || index.is_nan() {
        return Ok(Value::from(""));
    }
    Ok(text
        .char_at(index as usize)
        .map(|ch| Value::from(JsString::from(ch)))
        .unwrap_or_else(|| Value::from("")))
}

builtin!(
    StringPrototypeCodePointAt,
    "codePointAt",
    1,
    string_prototype_code_point_at
);
fn string_prototype_code_point_at(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    let text = this_string(agent, &this_value)?;
    let index = to_number(agent, &arguments.get(0))?.max(0.0) as usize;
    Ok(text
        .char_at(index)
        .map(|ch| Value::from(f64::from(u32::from(ch))))
        .unwrap_or(Value::Undefined))
}

builtin!(StringPrototypeIndexOf, "indexOf", 1, string_prototype_index_of);
fn string_prototype_index_of(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    let text = this_string(agent, &this_value)?;
    let needle = to_string(agent, &arguments.get(0))?;
    match text.as_str().find(needle.as_str()) {
        // Byte offset → code point offset.
        Some(byte_index) => Ok(Value::from(
            text.as_str()[..byte_index].chars().count() as f64
        )),
        None => Ok(Value::from(-1.0_f64)),
    }
}

builtin!(StringPrototypeIncludes, "includes", 1, string_prototype_includes);
fn string_prototype_includes(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    let text = this_string(agent, &this_value)?;
    let needle = to_string(agent, &arguments.get(0))?;
    Ok(Value::Boolean(text.as_str().contains(needle.as_str())))
}

builtin!(
    StringPrototypeStartsWith,
    "startsWith",
    1,
    string_prototype_starts_with
);
fn string_prototype_starts_with(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    let text = this_string(agent, &this_value)?;
    let needle = to_string(agent, &arguments.get(0))?;
    Ok(Value::Boolean(text.as_str().starts_with(needle.as_str())))
}

builtin!(
    StringPrototypeEndsWith,
    "endsWith",
    1,
    string_prototype_ends_with
);
fn string_prototype_ends_with(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    let text = this_string(agent, &this_value)?;
    let needle = to_string(agent, &arguments.get(0))?;
    Ok(Value::Boolean(text.as_str().ends_with(needle.as_str())))
}

builtin!(StringPrototypeSlice, "slice", 2, string_prototype_slice);
fn string_prototype_slice(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    let text = this_string(agent, &this_value)?;
    let chars: Vec<char> = text.as_str().chars().collect();
    let start = index_argument(agent, &arguments.get(0), chars.len(), 0)?;
    let end = index_argument(agent, &arguments.get(1), chars.len(), chars.len())?;
    let slice: String = chars[start..end.max(start)].iter().collect();
    Ok(Value::from(slice))
}

builtin!(
    StringPrototypeSubstring,
    "substring",
    2,
    string_prototype_substring
);
fn string_prototype_substring(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    let text = this_string(agent, &this_value)?;
    let chars: Vec<char> = text.as_str().chars().collect();
    let mut start = index_argument(agent, &arguments.get(0), chars.len(), 0)?;
    let mut end = index_argument(agent, &arguments.get(1), chars.len(), chars.len())?;
    if start > end {
        core::mem::swap(&mut start, &mut end);
    }
    let slice: String = chars[start..end].iter().collect();
    Ok(Value::from(slice))
}

builtin!(
    StringPrototypeToUpperCase,
    "toUpperCase",
    0,
    string_prototype_to_upper_case
);
fn string_prototype_to_upper_case(
    agent: &Agent,
    this_value: Value,
    _: ArgumentsList<'_>,
) -> JsResult<Value> {
    let text = this_string(agent, &this_value)?;
    Ok(Value::from(text.as_str().to_uppercase()))
}

builtin!(
    StringPrototypeToLowerCase,
    "toLowerCase",
    0,
    string_prototype_to_lower_case
);
fn string_prototype_to_lower_case(
    agent: &Agent,
    this_value: Value,
    _: ArgumentsList<'_>,
) -> JsResult<Value> {
    let text = this_string(agent, &this_value)?;
    Ok(Value::from(text.as_str().to_lowercase()))
}

builtin!(StringPrototypeTrim, "trim", 0, string_prototype_trim);
fn string_prototype_trim(
    agent: &Agent,
    this_value: Value,
    _: ArgumentsList<'_>,
) -> JsResult<Value> {
    let text = this_string(agent, &this_value)?;
    Ok(Value::from(text.as_str().trim()))
}

builtin!(StringPrototypeSplit, "split", 2, string_prototype_split);
fn string_prototype_split(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    let text = this_string(agent, &this_value)?;
    let separator = arguments.get(0);
    if separator.is_undefined() {
        let values = vec![Value::String(text)];
        return Ok(Value::Object(array_create(agent, values)));
    }
    let separator = to_string(agent, &separator)?;
    let values: Vec<Value> = if separator.is_empty() {
        text.as_str()
            .chars()
            .map(|ch| Value::from(JsString::from(ch)))
            .collect()
    } else {
        text.as_str()
            .split(separator.as_str())
            .map(Value::from)
            .collect()
    };
    Ok(Value::Object(array_create(agent, values)))
}

builtin!(StringPrototypeRepeat, "repeat", 1, string_prototype_repeat);
fn string_prototype_repeat(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    let text = this_string(agent, &this_value)?;
    let count = to_number(agent, &arguments.get(0))?;
    if count < 0.0 || !count.is_finite() {
        return Err(agent.throw_exception(ExceptionType::RangeError, "Invalid count value"));
    }
    Ok(Value::from(text.as_str().repeat(count as usize)))
}

builtin!(StringPrototypePadStart, "padStart", 1, string_prototype_pad_start);
fn string_prototype_pad_start(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    pad(agent, this_value, arguments, true)
}

builtin!(StringPrototypePadEnd, "padEnd", 1, string_prototype_pad_end);
fn string_prototype_pad_end(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    pad(agent, this_value, arguments, false)
}

fn pad(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
    at_start: bool,
) -> JsResult<Value> {
    let text = this_string(agent, &this_value)?;
    let target = to_number(agent, &arguments.get(0))?.max(0.0) as usize;
    let filler = match arguments.get(1) {
        Value::Undefined => " ".to_string(),
        value => to_string(agent, &value)?.as_str().to_string(),
    };
    let current = text.len();
    if current >= target || filler.is_empty() {
        return Ok(Value::String(text));
    }
    let missing = target - current;
    let mut padding: String = filler.chars().cycle().take(missing).collect();
    if at_start {
        padding.push_str(text.as_str());
        Ok(Value::from(padding))
    } else {
        let mut out = text.as_str().to_string();
        out.push_str(&padding);
        Ok(Value::from(out))
    }
}

builtin!(StringPrototypeConcat, "concat", 1, string_prototype_concat);
fn string_prototype_concat(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    let mut out = this_string(agent, &this_value)?.as_str().to_string();
    for argument in arguments.slice() {
        out.push_str(to_string(agent, argument)?.as_str());
    }
    Ok(Value::from(out))
}

builtin!(StringPrototypeToString, "toString", 0, string_prototype_to_string);
fn string_prototype_to_string(
    agent: &Agent,
    this_value: Value,
    _: ArgumentsList<'_>,
) -> JsResult<Value> {
    Ok(Value::String(this_string(agent, &this_value)?))
}

builtin!(StringPrototypeValueOf, "valueOf", 0, string_prototype_value_of);
fn string_prototype_value_of(
    agent: &Agent,
    this_value: Value,
    _: ArgumentsList<'_>,
) -> JsResult<Value> {
    Ok(Value::String(this_string(agent, &this_value)?))
}

builtin!(StringIteratorPrototypeNext, "next", 0, string_iterator_next);
fn string_iterator_next(
    agent: &Agent,
    this_value: Value,
    _: ArgumentsList<'_>,
) -> JsResult<Value> {
    let Some(object) = this_value.as_object() else {
        return Err(agent.throw_exception(
            ExceptionType::TypeError,
            "Receiver is not a string iterator",
        ));
    };
    let next_char = {
        let mut data = object.data_mut();
        match &mut data.kind {
            ObjectKind::StringIterator(iterator) => {
                let ch = iterator.chars.get(iterator.index).copied();
                iterator.index += 1;
                ch
            }
            _ => {
                return Err(agent.throw_exception(
                    ExceptionType::TypeError,
                    "Receiver is not a string iterator",
                ));
            }
        }
    };
    Ok(match next_char {
        Some(ch) => create_iter_result_object(agent, Value::from(JsString::from(ch)), false),
        None => create_iter_result_object(agent, Value::Undefined, true),
    })
}

fn string_iterator(agent: &Agent, this_value: Value, _: ArgumentsList<'_>) -> JsResult<Value> {
    let text = this_string(agent, &this_value)?;
    Ok(Value::Object(JsObject::new(
        Some(agent.intrinsics().string_iterator_prototype.clone()),
        ObjectKind::StringIterator(StringIteratorData {
            chars: text.as_str().chars().collect(),
            index: 0,
        }),
    )))
}

/// `String(x)` converts; `new String(x)` wraps.
fn string_constructor(
    agent: &Agent,
    arguments: ArgumentsList<'_>,
    instance_prototype: Option<&JsObject>,
) -> JsResult<Value> {
    let text = match arguments.get(0) {
        Value::Undefined if arguments.is_empty() => JsString::new(""),
        Value::Symbol(symbol) if instance_prototype.is_none() => {
            // String(symbol) is the one legal symbol-to-string conversion.
            JsString::from(symbol.to_string())
        }
        value => to_string(agent, &value)?,
    };
    match instance_prototype {
        None => Ok(Value::String(text)),
        Some(prototype) => Ok(Value::Object(JsObject::new(
            Some(prototype.clone()),
            ObjectKind::Primitive(PrimitiveData::String(text)),
        ))),
    }
}

pub(crate) struct StringIntrinsicParts<'a> {
    pub(crate) object_prototype: &'a JsObject,
    pub(crate) function_prototype: &'a JsObject,
    pub(crate) iterator_symbol: &'a crate::ecmascript::types::JsSymbol,
}

pub(crate) fn create_string_prototype(parts: &StringIntrinsicParts<'_>) -> (JsObject, JsObject) {
    let prototype = OrdinaryObjectBuilder::new(
        JsObject::ordinary(Some(parts.object_prototype.clone())),
        parts.function_prototype,
    )
    .with_builtin_function_property::<StringPrototypeCharAt>()
    .with_builtin_function_property::<StringPrototypeCodePointAt>()
    .with_builtin_function_property::<StringPrototypeIndexOf>()
    .with_builtin_function_property::<StringPrototypeIncludes>()
    .with_builtin_function_property::<StringPrototypeStartsWith>()
    .with_builtin_function_property::<StringPrototypeEndsWith>()
    .with_builtin_function_property::<StringPrototypeSlice>()
    .with_builtin_function_property::<StringPrototypeSubstring>()
    .with_builtin_function_property::<StringPrototypeToUpperCase>()
    .with_builtin_function_property::<StringPrototypeToLowerCase>()
    .with_builtin_function_property::<StringPrototypeTrim>()
    .with_builtin_function_property::<StringPrototypeSplit>()
    .with_builtin_function_property::<StringPrototypeRepeat>()
    .with_builtin_function_property::<StringPrototypePadStart>()
    .with_builtin_function_property::<StringPrototypePadEnd>()
    .with_builtin_function_property::<StringPrototypeConcat>()
    .with_builtin_function_property::<StringPrototypeToString>()
    .with_builtin_function_property::<StringPrototypeValueOf>()
    .build();
    let iterator_fn = create_builtin(
        "[Symbol.iterator]",
        0,
        Behaviour::Regular(string_iterator),
        parts.function_prototype,
    );
    prototype.insert_slot(
        PropertyKey::Symbol(parts.iterator_symbol.clone()),
        PropertySlot::method(Value::Function(iterator_fn)),
    );

    let iterator_prototype = OrdinaryObjectBuilder::new(
        JsObject::ordinary(Some(parts.object_prototype.clone())),
        parts.function_prototype,
    )
    .with_builtin_function_property::<StringIteratorPrototypeNext>()
    .build();
    (prototype, iterator_prototype)
}

pub(crate) fn create_string_constructor(
    prototype: &JsObject,
    function_prototype: &JsObject,
) -> JsObject {
    let constructor = create_builtin(
        "String",
        1,
        Behaviour::Constructor(string_constructor),
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
