// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `Object`, `Boolean` and `Symbol` intrinsics.

use crate::ecmascript::abstract_operations::operations_on_objects::{
    define_property, get, own_enumerable_string_keys,
};
use crate::ecmascript::abstract_operations::testing_and_comparison::same_value;
use crate::ecmascript::abstract_operations::type_conversion::{to_object, to_string};
use crate::ecmascript::builtins::array::array_create;
use crate::ecmascript::builtins::{
    builtin, create_builtin, ArgumentsList, Behaviour, Builtin, OrdinaryObjectBuilder,
};
use crate::ecmascript::execution::agent::Agent;
use crate::ecmascript::execution::errors::{ExceptionType, JsResult};
use crate::ecmascript::types::language::object::{JsObject, ObjectKind, PrimitiveData};
use crate::ecmascript::types::property_descriptor::{PropertyDescriptor, PropertySlot};
use crate::ecmascript::types::{JsString, PropertyKey, Value};

// Object.

fn object_constructor(
    agent: &Agent,
    arguments: ArgumentsList<'_>,
    _instance_prototype: Option<&JsObject>,
) -> JsResult<Value> {
    match arguments.get(0) {
        Value::Undefined | Value::Null => Ok(Value::Object(
            crate::ecmascript::builtins::ordinary::ordinary_object_create(agent),
        )),
        value => Ok(Value::Object(to_object(agent, &value)?)),
    }
}

builtin!(ObjectKeys, "keys", 1, object_keys);
fn object_keys(agent: &Agent, _: Value, arguments: ArgumentsList<'_>) -> JsResult<Value> {
    let object = to_object(agent, &arguments.get(0))?;
    let keys = own_enumerable_string_keys(agent, &object)
        .into_iter()
        .map(|key| Value::from(key.to_display_string()))
        .collect();
    Ok(Value::Object(array_create(agent, keys)))
}

builtin!(ObjectValues, "values", 1, object_values);
fn object_values(agent: &Agent, _: Value, arguments: ArgumentsList<'_>) -> JsResult<Value> {
    let object = to_object(agent, &arguments.get(0))?;
    let mut values = Vec::new();
    for key in own_enumerable_string_keys(agent, &object) {
        values.push(get(agent, &object, &key)?);
    }
    Ok(Value::Object(array_create(agent, values)))
}

builtin!(ObjectEntries, "entries", 1, object_entries);
fn object_entries(agent: &Agent, _: Value, arguments: ArgumentsList<'_>) -> JsResult<Value> {
    let object = to_object(agent, &arguments.get(0))?;
    let mut entries = Vec::new();
    for key in own_enumerable_string_keys(agent, &object) {
        let pair = vec![
            Value::from(key.to_display_string()),
            get(agent, &object, &key)?,
        ];
        entries.push(Value::Object(array_create(agent, pair)));
    }
    Ok(Value::Object(array_create(agent, entries)))
}

builtin!(ObjectAssign, "assign", 2, object_assign);
fn object_assign(agent: &Agent, _: Value, arguments: ArgumentsList<'_>) -> JsResult<Value> {
    let target = match arguments.get(0) {
        Value::Object(object) => object,
        value => to_object(agent, &value)?,
    };
    for source in arguments.slice().iter().skip(1) {
        if source.is_nullish() {
            continue;
        }
        let source = to_object(agent, source)?;
        for key in own_enumerable_string_keys(agent, &source) {
            let value = get(agent, &source, &key)?;
            crate::ecmascript::abstract_operations::operations_on_objects::set(
                agent, &target, &key, value,
            )?;
        }
    }
    Ok(Value::Object(target))
}

builtin!(ObjectFreeze, "freeze", 1, object_freeze);
fn object_freeze(agent: &Agent, _: Value, arguments: ArgumentsList<'_>) -> JsResult<Value> {
    let value = arguments.get(0);
    let Some(object) = value.as_object() else {
        return Ok(value);
    };
    if object.is_host_wrapped() {
        return Err(agent.throw_exception(
            ExceptionType::SecurityError,
            "Cannot freeze a host object",
        ));
    }
    object.prevent_extensions();
    let keys = object.own_keys();
    for key in keys {
        if let Some(mut slot) = object.own_slot(&key) {
            match &mut slot {
                PropertySlot::Data {
                    writable,
                    configurable,
                    ..
                } => {
                    *writable = false;
                    *configurable = false;
                }
                PropertySlot::Accessor { configurable, .. } => {
                    *configurable = false;
                }
            }
            object.insert_slot(key, slot);
        }
    }
    Ok(value)
}

builtin!(ObjectIsFrozen, "isFrozen", 1, object_is_frozen);
fn object_is_frozen(_: &Agent, _: Value, arguments: ArgumentsList<'_>) -> JsResult<Value> {
    let value = arguments.get(0);
    let Some(object) = value.as_object() else {
        return Ok(Value::Boolean(true));
    };
    if object.is_extensible() {
        return Ok(Value::Boolean(false));
    }
    let frozen = object.own_keys().into_iter().all(|key| {
        object
            .own_slot(&key)
            .map(|slot| match slot {
                PropertySlot::Data {
                    writable,
                    configurable,
                    ..
                } => !writable && !configurable,
                PropertySlot::Accessor { configurable, .. } => !configurable,
            })
            .unwrap_or(true)
    });
    Ok(Value::Boolean(frozen))
}

builtin!(ObjectGetPrototypeOf, "getPrototypeOf", 1, object_get_prototype_of);
fn object_get_prototype_of(
    agent: &Agent,
    _: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    let object = to_object(agent, &arguments.get(0))?;
    // The barrier severs prototype chains: wrapped host objects report
    // null.
    if object.is_host_wrapped() {
        return Ok(Value::Null);
    }
    Ok(object
        .prototype()
        .map(Value::Object)
        .unwrap_or(Value::Null))
}

builtin!(ObjectSetPrototypeOf, "setPrototypeOf", 2, object_set_prototype_of);
fn object_set_prototype_of(
    agent: &Agent,
    _: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    let value = arguments.get(0);
    let Some(object) = value.as_object() else {
        return Ok(value);
    };
    if object.is_host_wrapped() {
        return Err(agent.throw_exception(
            ExceptionType::SecurityError,
            "Cannot set the prototype of a host object",
        ));
    }
    match arguments.get(1) {
        Value::Null => object.set_prototype(None),
        Value::Object(prototype) => object.set_prototype(Some(prototype)),
        _ => {
            return Err(agent.throw_exception(
                ExceptionType::TypeError,
                "Object prototype may only be an Object or null",
            ));
        }
    }
    Ok(value)
}

builtin!(ObjectCreate, "create", 2, object_create);
fn object_create(agent: &Agent, _: Value, arguments: ArgumentsList<'_>) -> JsResult<Value> {
    let prototype = match arguments.get(0) {
        Value::Null => None,
        Value::Object(object) => Some(object),
        _ => {
            return Err(agent.throw_exception(
                ExceptionType::TypeError,
                "Object prototype may only be an Object or null",
            ));
        }
    };
    Ok(Value::Object(JsObject::ordinary(prototype)))
}

builtin!(ObjectDefineProperty, "defineProperty", 3, object_define_property);
fn object_define_property(
    agent: &Agent,
    _: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    let target = arguments.get(0);
    let Some(object) = target.as_object().cloned() else {
        return Err(agent.throw_exception(
            ExceptionType::TypeError,
            "Object.defineProperty called on non-object",
        ));
    };
    let key = crate::ecmascript::abstract_operations::type_conversion::to_property_key(
        agent,
        &arguments.get(1),
    )?;
    let Some(attributes) = arguments.get(2).as_object().cloned() else {
        return Err(agent.throw_exception(
            ExceptionType::TypeError,
            "Property description must be an object",
        ));
    };
    let descriptor = PropertyDescriptor {
        value: optional_field(agent, &attributes, "value")?,
        writable: optional_field(agent, &attributes, "writable")?.map(|v| v.to_boolean()),
        get: optional_field(agent, &attributes, "get")?,
        set: optional_field(agent, &attributes, "set")?,
        enumerable: optional_field(agent, &attributes, "enumerable")?.map(|v| v.to_boolean()),
        configurable: optional_field(agent, &attributes, "configurable")?.map(|v| v.to_boolean()),
    };
    define_property(agent, &object, &key, &descriptor)?;
    Ok(target)
}

fn optional_field(agent: &Agent, object: &JsObject, name: &str) -> JsResult<Option<Value>> {
    let key = PropertyKey::from(name);
    if crate::ecmascript::abstract_operations::operations_on_objects::has_property(
        agent, object, &key,
    )? {
        Ok(Some(get(agent, object, &key)?))
    } else {
        Ok(None)
    }
}

builtin!(ObjectIs, "is", 2, object_is);
fn object_is(_: &Agent, _: Value, arguments: ArgumentsList<'_>) -> JsResult<Value> {
    Ok(Value::Boolean(same_value(
        &arguments.get(0),
        &arguments.get(1),
    )))
}

builtin!(
    ObjectPrototypeHasOwnProperty,
    "hasOwnProperty",
    1,
    object_prototype_has_own_property
);
fn object_prototype_has_own_property(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    let object = to_object(agent, &this_value)?;
    let key = crate::ecmascript::abstract_operations::type_conversion::to_property_key(
        agent,
        &arguments.get(0),
    )?;
    Ok(Value::Boolean(object.has_own(&key)))
}

builtin!(
    ObjectPrototypeToString,
    "toString",
    0,
    object_prototype_to_string
);
fn object_prototype_to_string(
    agent: &Agent,
    this_value: Value,
    _: ArgumentsList<'_>,
) -> JsResult<Value> {
    let tag = match &this_value {
        Value::Undefined => "Undefined",
        Value::Null => "Null",
        value => match value.as_object() {
            Some(object) => match object.class_tag() {
                "Array" => "Array",
                "Function" => "Function",
                "Error" => "Error",
                _ => "Object",
            },
            None => "Object",
        },
    };
    let _ = agent;
    Ok(Value::from(format!("[object {tag}]")))
}

builtin!(
    ObjectPrototypeValueOf,
    "valueOf",
    0,
    object_prototype_value_of
);
fn object_prototype_value_of(
    agent: &Agent,
    this_value: Value,
    _: ArgumentsList<'_>,
) -> JsResult<Value> {
    Ok(Value::Object(to_object(agent, &this_value)?))
}

pub(crate) fn create_object_prototype_methods(
    object_prototype: &JsObject,
    function_prototype: &JsObject,
) {
    let methods = OrdinaryObjectBuilder::new(object_prototype.clone(), function_prototype)
        .with_builtin_function_property::<ObjectPrototypeHasOwnProperty>()
        .with_builtin_function_property::<ObjectPrototypeToString>()
        .with_builtin_function_property::<ObjectPrototypeValueOf>()
        .build();
    let _ = methods;
}

pub(crate) fn create_object_constructor(
    object_prototype: &JsObject,
    function_prototype: &JsObject,
) -> JsObject {
    let constructor = create_builtin(
        "Object",
        1,
        Behaviour::Constructor(object_constructor),
        function_prototype,
    )
    .into_object();
    let constructor = OrdinaryObjectBuilder::new(constructor, function_prototype)
        .with_builtin_function_property::<ObjectKeys>()
        .with_builtin_function_property::<ObjectValues>()
        .with_builtin_function_property::<ObjectEntries>()
        .with_builtin_function_property::<ObjectAssign>()
        .with_builtin_function_property::<ObjectFreeze>()
        .with_builtin_function_property::<ObjectIsFrozen>()
        .with_builtin_function_property::<ObjectGetPrototypeOf>()
        .with_builtin_function_property::<ObjectSetPrototypeOf>()
        .with_builtin_function_property::<ObjectCreate>()
        .with_builtin_function_property::<ObjectDefineProperty>()
        .with_builtin_function_property::<ObjectIs>()
        .build();
    constructor.insert_slot(
        PropertyKey::from("prototype"),
        PropertySlot::frozen(Value::Object(object_prototype.clone())),
    );
    object_prototype.insert_slot(
        PropertyKey::from("constructor"),
        PropertySlot::method(Value::from(constructor.clone())),
    );
    constructor
}

// Boolean.

fn boolean_constructor(
    _agent: &Agent,
    arguments: ArgumentsList<'_>,
    instance_prototype: Option<&JsObject>,
) -> JsResult<Value> {
    let flag = arguments.get(0).to_boolean();
    match instance_prototype {
        None => Ok(Value::Boolean(flag)),
        Some(prototype) => Ok(Value::Object(JsObject::new(
            Some(prototype.clone()),
            ObjectKind::Primitive(PrimitiveData::Boolean(flag)),
        ))),
    }
}

fn this_boolean(agent: &Agent, this_value: &Value) -> JsResult<bool> {
    match this_value {
        Value::Boolean(flag) => Ok(*flag),
        Value::Object(object) => match &object.data().kind {
            ObjectKind::Primitive(PrimitiveData::Boolean(flag)) => Ok(*flag),
            _ => Err(agent.throw_exception(ExceptionType::TypeError, "Receiver is not a boolean")),
        },
        _ => Err(agent.throw_exception(ExceptionType::TypeError, "Receiver is not a boolean")),
    }
}

builtin!(
    BooleanPrototypeToString,
    "toString",
    0,
    boolean_prototype_to_string
);
fn boolean_prototype_to_string(
    agent: &Agent,
    this_value: Value,
    _: ArgumentsList<'_>,
) -> JsResult<Value> {
    Ok(Value::from(this_boolean(agent, &this_value)?.to_string()))
}

builtin!(
    BooleanPrototypeValueOf,
    "valueOf",
    0,
    boolean_prototype_value_of
);
fn boolean_prototype_value_of(
    agent: &Agent,
    this_value: Value,
    _: ArgumentsList<'_>,
) -> JsResult<Value> {
    Ok(Value::Boolean(this_boolean(agent, &this_value)?))
}

pub(crate) fn create_boolean_prototype(
    object_prototype: &JsObject,
    function_prototype: &JsObject,
) -> JsObject {
    OrdinaryObjectBuilder::new(
        JsObject::ordinary(Some(object_prototype.clone())),
        function_prototype,
    )
    .with_builtin_function_property::<BooleanPrototypeToString>()
    .with_builtin_function_property::<BooleanPrototypeValueOf>()
    .build()
}

pub(crate) fn create_boolean_constructor(
    prototype: &JsObject,
    function_prototype: &JsObject,
) -> JsObject {
    let constructor = create_builtin(
        "Boolean",
        1,
        Behaviour::Constructor(boolean_constructor),
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

// Symbol.

/// `Symbol(description)`; `new Symbol` throws.
fn symbol_constructor(
    agent: &Agent,
    arguments: ArgumentsList<'_>,
    instance_prototype: Option<&JsObject>,
) -> JsResult<Value> {
    if instance_prototype.is_some() {
        return Err(agent.throw_exception(
            ExceptionType::TypeError,
            "Symbol is not a constructor",
        ));
    }
    let description = match arguments.get(0) {
        Value::Undefined => None,
        value => Some(to_string(agent, &value)?),
    };
    Ok(Value::Symbol(agent.create_symbol(description)))
}

fn this_symbol(
    agent: &Agent,
    this_value: &Value,
) -> JsResult<crate::ecmascript::types::JsSymbol> {
    match this_value {
        Value::Symbol(symbol) => Ok(symbol.clone()),
        Value::Object(object) => match &object.data().kind {
            ObjectKind::Primitive(PrimitiveData::Symbol(symbol)) => Ok(symbol.clone()),
            _ => Err(agent.throw_exception(ExceptionType::TypeError, "Receiver is not a symbol")),
        },
        _ => Err(agent.throw_exception(ExceptionType::TypeError, "Receiver is not a symbol")),
    }
}

builtin!(
    SymbolPrototypeToString,
    "toString",
    0,
    symbol_prototype_to_string
);
fn symbol_prototype_to_string(
    agent: &Agent,
    this_value: Value,
    _: ArgumentsList<'_>,
) -> JsResult<Value> {
    Ok(Value::from(JsString::from(
        this_symbol(agent, &this_value)?.to_string(),
    )))
}

builtin!(
    SymbolPrototypeValueOf,
    "valueOf",
    0,
    symbol_prototype_value_of
);
fn symbol_prototype_value_of(
    agent: &Agent,
    this_value: Value,
    _: ArgumentsList<'_>,
) -> JsResult<Value> {
    Ok(Value::Symbol(this_symbol(agent, &this_value)?))
}

pub(crate) fn create_symbol_prototype(
    object_prototype: &JsObject,
    function_prototype: &JsObject,
) -> JsObject {
    OrdinaryObjectBuilder::new(
        JsObject::ordinary(Some(object_prototype.clone())),
        function_prototype,
    )
    .with_builtin_function_property::<SymbolPrototypeToString>()
    .with_builtin_function_property::<SymbolPrototypeValueOf>()
    .build()
}

pub(crate) fn create_symbol_constructor(
    prototype: &JsObject,
    function_prototype: &JsObject,
    iterator_symbol: &crate::ecmascript::types::JsSymbol,
    async_iterator_symbol: &crate::ecmascript::types::JsSymbol,
) -> JsObject {
    let constructor = create_builtin(
        "Symbol",
        0,
        Behaviour::Constructor(symbol_constructor),
        function_prototype,
    )
    .into_object();
    constructor.insert_slot(
        PropertyKey::from("prototype"),
        PropertySlot::frozen(Value::Object(prototype.clone())),
    );
    constructor.insert_slot(
        PropertyKey::from("iterator"),
        PropertySlot::frozen(Value::Symbol(iterator_symbol.clone())),
    );
    constructor.insert_slot(
        PropertyKey::from("asyncIterator"),
        PropertySlot::frozen(Value::Symbol(async_iterator_symbol.clone())),
    );
    prototype.insert_slot(
        PropertyKey::from("constructor"),
        PropertySlot::method(Value::from(constructor.clone())),
    );
    constructor
}
