// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `JSON` intrinsic. Parsing goes through `serde_json`; stringifying
//! is its own walk because ECMAScript semantics (undefined dropping,
//! cycle errors) do not map onto a serde serializer.

use crate::ecmascript::abstract_operations::operations_on_objects::{
    get, own_enumerable_string_keys,
};
use crate::ecmascript::abstract_operations::type_conversion::{number_to_string, to_string};
use crate::ecmascript::builtins::array::array_create;
use crate::ecmascript::builtins::ordinary::{create_data_property, ordinary_object_create};
use crate::ecmascript::builtins::{
    builtin, ArgumentsList, Behaviour, Builtin, OrdinaryObjectBuilder,
};
use crate::ecmascript::execution::agent::Agent;
use crate::ecmascript::execution::errors::{ExceptionType, JsResult};
use crate::ecmascript::types::language::object::{JsObject, ObjectKind, PrimitiveData};
use crate::ecmascript::types::{PropertyKey, Value};

builtin!(JsonParse, "parse", 2, json_parse);
/// ### [25.5.1 JSON.parse](https://tc39.es/ecma262/#sec-json.parse)
fn json_parse(agent: &Agent, _: Value, arguments: ArgumentsList<'_>) -> JsResult<Value> {
    let text = to_string(agent, &arguments.get(0))?;
    let parsed: serde_json::Value = serde_json::from_str(text.as_str()).map_err(|error| {
        agent.throw_exception(ExceptionType::SyntaxError, format!("Unexpected JSON input: {error}"))
    })?;
    Ok(json_to_value(agent, &parsed))
}

fn json_to_value(agent: &Agent, json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(flag) => Value::Boolean(*flag),
        serde_json::Value::Number(number) => {
            Value::from(number.as_f64().unwrap_or(f64::NAN))
        }
        serde_json::Value::String(text) => Value::from(text.as_str()),
        serde_json::Value::Array(items) => {
            let values = items.iter().map(|item| json_to_value(agent, item)).collect();
            Value::Object(array_create(agent, values))
        }
        serde_json::Value::Object(entries) => {
            let object = ordinary_object_create(agent);
            for (key, value) in entries {
                create_data_property(
                    &object,
                    PropertyKey::from_str(key),
                    json_to_value(agent, value),
                );
            }
            Value::Object(object)
        }
    }
}

builtin!(JsonStringify, "stringify", 3, json_stringify);
/// ### [25.5.2 JSON.stringify](https://tc39.es/ecma262/#sec-json.stringify)
fn json_stringify(agent: &Agent, _: Value, arguments: ArgumentsList<'_>) -> JsResult<Value> {
    let indent = match arguments.get(2) {
        Value::Number(number) => " ".repeat((number.max(0.0) as usize).min(10)),
        Value::String(text) => text.as_str().chars().take(10).collect(),
        _ => String::new(),
    };
    let mut stack = Vec::new();
    match stringify_value(agent, &arguments.get(0), &indent, 0, &mut stack)? {
        Some(text) => Ok(Value::from(text)),
        None => Ok(Value::Undefined),
    }
}

/// `None` means the value does not serialize (undefined, functions).
fn stringify_value(
    agent: &Agent,
    value: &Value,
    indent: &str,
    depth: usize,
    stack: &mut Vec<usize>,
) -> JsResult<Option<String>> {
    Ok(match value {
        Value::Undefined | Value::Function(_) => None,
        Value::Null => Some("null".to_string()),
        Value::Boolean(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(if number.is_finite() {
            number_to_string(*number)
        } else {
            "null".to_string()
        }),
        Value::String(text) => Some(quote_json(text.as_str())),
        Value::BigInt(_) => {
            return Err(agent.throw_exception(
                ExceptionType::TypeError,
                "Do not know how to serialize a BigInt",
            ));
        }
        Value::Symbol(_) => None,
        Value::Object(object) => {
            let address = object.address();
            if stack.contains(&address) {
                return Err(agent.throw_exception(
                    ExceptionType::TypeError,
                    "Converting circular structure to JSON",
                ));
            }
            stack.push(address);
            let result = stringify_object(agent, object, indent, depth, stack)?;
            stack.pop();
            Some(result)
        }
    })
}

fn stringify_object(
    agent: &Agent,
    object: &JsObject,
    indent: &str,
    depth: usize,
    stack: &mut Vec<usize>,
) -> JsResult<String> {
    // Primitive wrappers serialize as their primitive.
    {
        let data = object.data();
        match &data.kind {
            ObjectKind::Primitive(PrimitiveData::Number(number)) => {
                return Ok(if number.is_finite() {
                    number_to_string(*number)
                } else {
                    "null".to_string()
                });
            }
            ObjectKind::Primitive(PrimitiveData::String(text)) => {
                return Ok(quote_json(text.as_str()));
            }
            ObjectKind::Primitive(PrimitiveData::Boolean(flag)) => {
                return Ok(flag.to_string());
            }
            _ => {}
        }
    }
    let (open, close, is_array) = if object.is_array() {
        ('[', ']', true)
    } else {
        ('{', '}', false)
    };
    let mut parts: Vec<String> = Vec::new();
    if is_array {
        let length = object.array_length().unwrap_or(0);
        for index in 0..length {
            let element = get(agent, object, &PropertyKey::Index(index))?;
            let rendered = stringify_value(agent, &element, indent, depth + 1, stack)?
                .unwrap_or_else(|| "null".to_string());
            parts.push(rendered);
        }
    } else {
        for key in own_enumerable_string_keys(agent, object) {
            let element = get(agent, object, &key)?;
            if let Some(rendered) = stringify_value(agent, &element, indent, depth + 1, stack)? {
                parts.push(format!(
                    "{}:{}{}",
                    quote_json(&key.to_display_string()),
                    if indent.is_empty() { "" } else { " " },
                    rendered
                ));
            }
        }
    }
    if parts.is_empty() {
        return Ok(format!("{open}{close}"));
    }
    if indent.is_empty() {
        Ok(format!("{}{}{}", open, parts.join(","), close))
    } else {
        let inner_pad = indent.repeat(depth + 1);
        let outer_pad = indent.repeat(depth);
        Ok(format!(
            "{open}\n{inner}{body}\n{outer}{close}",
            inner = inner_pad,
            body = parts.join(&format!(",\n{inner_pad}")),
            outer = outer_pad,
        ))
    }
}

fn quote_json(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string())
}

pub(crate) fn create_json_object(
    object_prototype: &JsObject,
    function_prototype: &JsObject,
) -> JsObject {
    OrdinaryObjectBuilder::new(
        JsObject::ordinary(Some(object_prototype.clone())),
        function_prototype,
    )
    .with_builtin_function_property::<JsonParse>()
    .with_builtin_function_property::<JsonStringify>()
    .build()
}
