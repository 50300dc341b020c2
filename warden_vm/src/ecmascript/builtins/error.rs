// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error objects: the per-kind internal slots, the intrinsic constructors
//! (`Error`, `TypeError`, `RangeError`, …) and `Error.prototype`.

use crate::ecmascript::builtins::{
    create_builtin, ArgumentsList, Behaviour, Builtin, OrdinaryObjectBuilder,
};
use crate::ecmascript::execution::agent::Agent;
use crate::ecmascript::execution::errors::{ExceptionType, JsError, JsResult};
use crate::ecmascript::types::language::object::{JsObject, ObjectKind};
use crate::ecmascript::types::property_descriptor::PropertySlot;
use crate::ecmascript::types::{JsString, PropertyKey, Value};

/// Internal slots of an error object.
#[derive(Debug, Clone)]
pub(crate) struct ErrorData {
    pub(crate) kind: ExceptionType,
    pub(crate) message: Option<JsString>,
    pub(crate) stack: Option<JsString>,
    pub(crate) cause: Option<Value>,
}

/// Creates an error object of the given kind against the realm's
/// prototypes. `message` and `stack` become own data properties the way
/// script-thrown errors expect to read them.
pub(crate) fn create_error_object(
    agent: &Agent,
    kind: ExceptionType,
    message: &str,
    stack: &str,
) -> JsObject {
    let prototype = agent.intrinsics().error_prototype_for(kind);
    create_error_object_with_prototype(kind, message, stack, Some(prototype))
}

pub(crate) fn create_error_object_with_prototype(
    kind: ExceptionType,
    message: &str,
    stack: &str,
    prototype: Option<JsObject>,
) -> JsObject {
    let object = JsObject::new(
        prototype,
        ObjectKind::Error(ErrorData {
            kind,
            message: (!message.is_empty()).then(|| JsString::new(message)),
            stack: (!stack.is_empty()).then(|| JsString::new(stack)),
            cause: None,
        }),
    );
    if !message.is_empty() {
        object.insert_slot(
            PropertyKey::from("message"),
            PropertySlot::method(Value::from(message)),
        );
    }
    object.insert_slot(
        PropertyKey::from("stack"),
        PropertySlot::method(Value::from(stack)),
    );
    object
}

/// Converts a raised [`JsError`] into the value a `catch` clause binds:
/// the original thrown value when there is one, a materialized error
/// object otherwise.
pub(crate) fn error_to_catch_value(agent: &Agent, error: &JsError) -> Value {
    if let Some(cause) = error.cause() {
        return cause.clone();
    }
    Value::Object(create_error_object(
        agent,
        error.kind(),
        error.message(),
        error.stack(),
    ))
}

/// Classifies a thrown value back into a [`JsError`], preserving the value
/// in `cause`.
pub(crate) fn error_from_thrown_value(agent: &Agent, value: Value) -> JsError {
    let (kind, message) = match value.as_object() {
        Some(object) => match &object.data().kind {
            ObjectKind::Error(data) => (
                data.kind,
                data.message
                    .as_ref()
                    .map(|message| message.as_str().to_string())
                    .unwrap_or_default(),
            ),
            _ => (ExceptionType::Generic, String::new()),
        },
        None => (ExceptionType::Generic, describe_thrown(&value)),
    };
    JsError::thrown(kind, message, value, agent.current_stack_string())
}

fn describe_thrown(value: &Value) -> String {
    match value {
        Value::String(text) => text.as_str().to_string(),
        Value::Number(number) => crate::ecmascript::abstract_operations::type_conversion::number_to_string(*number),
        Value::Boolean(flag) => flag.to_string(),
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        _ => String::new(),
    }
}

struct ErrorPrototypeToString;
impl Builtin for ErrorPrototypeToString {
    const NAME: &'static str = "toString";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(error_prototype_to_string);
}

/// ### [20.5.3.4 Error.prototype.toString](https://tc39.es/ecma262/#sec-error.prototype.tostring)
fn error_prototype_to_string(
    agent: &Agent,
    this_value: Value,
    _: ArgumentsList<'_>,
) -> JsResult<Value> {
    let Some(object) = this_value.as_object() else {
        return Err(agent.throw_exception(ExceptionType::TypeError, "Error.prototype.toString requires an Error receiver"));
    };
    let name = match crate::ecmascript::abstract_operations::operations_on_objects::get(
        agent,
        object,
        &PropertyKey::from("name"),
    )? {
        Value::Undefined => "Error".to_string(),
        value => crate::ecmascript::abstract_operations::type_conversion::to_string(agent, &value)?
            .as_str()
            .to_string(),
    };
    let message = match crate::ecmascript::abstract_operations::operations_on_objects::get(
        agent,
        object,
        &PropertyKey::from("message"),
    )? {
        Value::Undefined => String::new(),
        value => crate::ecmascript::abstract_operations::type_conversion::to_string(agent, &value)?
            .as_str()
            .to_string(),
    };
    Ok(if message.is_empty() {
        Value::from(name)
    } else if name.is_empty() {
        Value::from(message)
    } else {
        Value::from(format!("{name}: {message}"))
    })
}

/// Builds `Error.prototype` plus the per-kind prototypes chained off it.
pub(crate) fn create_error_prototype(
    object_prototype: &JsObject,
    function_prototype: &JsObject,
) -> JsObject {
    OrdinaryObjectBuilder::new(
        JsObject::ordinary(Some(object_prototype.clone())),
        function_prototype,
    )
    .with_builtin_function_property::<ErrorPrototypeToString>()
    .with_property(PropertyKey::from("name"), Value::from("Error"))
    .with_property(PropertyKey::from("message"), Value::from(""))
    .build()
}

pub(crate) fn create_native_error_prototype(
    error_prototype: &JsObject,
    name: &str,
) -> JsObject {
    let prototype = JsObject::ordinary(Some(error_prototype.clone()));
    prototype.insert_slot(
        PropertyKey::from("name"),
        PropertySlot::method(Value::from(name)),
    );
    prototype
}

fn error_constructor_impl(
    agent: &Agent,
    kind: ExceptionType,
    arguments: ArgumentsList<'_>,
    instance_prototype: Option<&JsObject>,
) -> JsResult<Value> {
    let message = match arguments.get(0) {
        Value::Undefined => String::new(),
        value => crate::ecmascript::abstract_operations::type_conversion::to_string(agent, &value)?
            .as_str()
            .to_string(),
    };
    let prototype = instance_prototype
        .cloned()
        .unwrap_or_else(|| agent.intrinsics().error_prototype_for(kind));
    let object = create_error_object_with_prototype(
        kind,
        &message,
        &agent.current_stack_string(),
        Some(prototype),
    );
    Ok(Value::Object(object))
}

macro_rules! error_constructor {
    ($name:ident, $exception:expr) => {
        fn $name(
            agent: &Agent,
            arguments: ArgumentsList<'_>,
            instance_prototype: Option<&JsObject>,
        ) -> JsResult<Value> {
            error_constructor_impl(agent, $exception, arguments, instance_prototype)
        }
    };
}

error_constructor!(generic_error_constructor, ExceptionType::Generic);
error_constructor!(type_error_constructor, ExceptionType::TypeError);
error_constructor!(range_error_constructor, ExceptionType::RangeError);
error_constructor!(reference_error_constructor, ExceptionType::ReferenceError);
error_constructor!(syntax_error_constructor, ExceptionType::SyntaxError);
error_constructor!(security_error_constructor, ExceptionType::SecurityError);

/// Creates one error constructor and wires `constructor.prototype` /
/// `prototype.constructor`.
pub(crate) fn create_error_constructor(
    name: &'static str,
    kind: ExceptionType,
    prototype: &JsObject,
    function_prototype: &JsObject,
) -> JsObject {
    let behaviour = Behaviour::Constructor(match kind {
        ExceptionType::TypeError => type_error_constructor,
        ExceptionType::RangeError => range_error_constructor,
        ExceptionType::ReferenceError => reference_error_constructor,
        ExceptionType::SyntaxError => syntax_error_constructor,
        ExceptionType::SecurityError => security_error_constructor,
        _ => generic_error_constructor,
    });
    let constructor = create_builtin(name, 1, behaviour, function_prototype).into_object();
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
