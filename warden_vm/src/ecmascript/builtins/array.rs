// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [10.4.2 Array Exotic Objects](https://tc39.es/ecma262/#sec-array-exotic-objects)
//!
//! Array creation, the reactive `length`, the intrinsic constructor, the
//! prototype methods, and array iterator objects.

use crate::ecmascript::abstract_operations::operations_on_objects::get;
use crate::ecmascript::abstract_operations::testing_and_comparison::{
    is_strictly_equal, same_value_zero,
};
use crate::ecmascript::abstract_operations::type_conversion::{
    to_number, to_string, to_uint32,
};
use crate::ecmascript::builtins::{
    builtin, create_builtin, ArgumentsList, Behaviour, Builtin, OrdinaryObjectBuilder,
};
use crate::ecmascript::execution::agent::Agent;
use crate::ecmascript::execution::errors::{ExceptionType, JsResult};
use crate::ecmascript::types::language::object::{ArrayData, JsObject, ObjectKind};
use crate::ecmascript::types::property_descriptor::PropertySlot;
use crate::ecmascript::types::{JsString, PropertyKey, Value};
use crate::engine::interpreter::functions::call_function_sync;

/// ### [10.4.2.2 ArrayCreate](https://tc39.es/ecma262/#sec-arraycreate)
pub(crate) fn array_create(agent: &Agent, values: Vec<Value>) -> JsObject {
    let object = JsObject::new(
        Some(agent.intrinsics().array_prototype.clone()),
        ObjectKind::Array(ArrayData { length: 0 }),
    );
    let mut length = 0u32;
    for value in values {
        object.insert_slot(PropertyKey::Index(length), PropertySlot::data(value));
        length += 1;
    }
    object.set_array_length_slot(length);
    object
}

/// ### [10.4.2.4 ArraySetLength](https://tc39.es/ecma262/#sec-arraysetlength)
///
/// Shrinking removes the indices above the new length.
pub(crate) fn array_set_length(agent: &Agent, array: &JsObject, value: &Value) -> JsResult<()> {
    let new_length = to_uint32(agent, value)?;
    let number_length = to_number(agent, value)?;
    if f64::from(new_length) != number_length {
        return Err(agent.throw_exception(ExceptionType::RangeError, "Invalid array length"));
    }
    let old_length = array.array_length().unwrap_or(0);
    if new_length < old_length {
        for index in new_length..old_length {
            array.remove_slot(&PropertyKey::Index(index));
        }
    }
    array.set_array_length_slot(new_length);
    Ok(())
}

/// Assignment to an index at or past `length` grows `length`.
pub(crate) fn update_length_for_index(object: &JsObject, key: &PropertyKey) {
    if let (Some(index), Some(length)) = (key.as_index(), object.array_length()) {
        if index >= length {
            object.set_array_length_slot(index + 1);
        }
    }
}

fn this_array(agent: &Agent, this_value: &Value) -> JsResult<JsObject> {
    match this_value.as_object() {
        Some(object) if object.is_array() => Ok(object.clone()),
        _ => Err(agent.throw_exception(
            ExceptionType::TypeError,
            "Receiver is not an array",
        )),
    }
}

fn array_length(array: &JsObject) -> u32 {
    array.array_length().unwrap_or(0)
}

fn element(agent: &Agent, array: &JsObject, index: u32) -> JsResult<Value> {
    get(agent, array, &PropertyKey::Index(index))
}

/// Normalizes a possibly negative relative index against `length`.
fn relative_index(agent: &Agent, value: &Value, length: u32, default: u32) -> JsResult<u32> {
    if value.is_undefined() {
        return Ok(default);
    }
    let number = to_number(agent, value)?;
    if number.is_nan() {
        return Ok(0);
    }
    let number = number.trunc();
    Ok(if number < 0.0 {
        (f64::from(length) + number).max(0.0) as u32
    } else {
        number.min(f64::from(length)) as u32
    })
}

fn callback(agent: &Agent, value: &Value) -> JsResult<crate::ecmascript::types::JsFunction> {
    value.as_function().cloned().ok_or_else(|| {
        agent.throw_exception(ExceptionType::TypeError, "Callback is not a function")
    })
}

builtin!(ArrayPrototypePush, "push", 1, array_prototype_push);
fn array_prototype_push(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    let array = this_array(agent, &this_value)?;
    let mut length = array_length(&array);
    for value in arguments.slice() {
        array.insert_slot(PropertyKey::Index(length), PropertySlot::data(value.clone()));
        length += 1;
    }
    array.set_array_length_slot(length);
    Ok(Value::from(f64::from(length)))
}

builtin!(ArrayPrototypePop, "pop", 0, array_prototype_pop);
fn array_prototype_pop(agent: &Agent, this_value: Value, _: ArgumentsList<'_>) -> JsResult<Value> {
    let array = this_array(agent, &this_value)?;
    let length = array_length(&array);
    if length == 0 {
        return Ok(Value::Undefined);
    }
    let value = element(agent, &array, length - 1)?;
    array.remove_slot(&PropertyKey::Index(length - 1));
    array.set_array_length_slot(length - 1);
    Ok(value)
}

builtin!(ArrayPrototypeShift, "shift", 0, array_prototype_shift);
fn array_prototype_shift(
    agent: &Agent,
    this_value: Value,
    _: ArgumentsList<'_>,
) -> JsResult<Value> {
    let array = this_array(agent, &this_value)?;
    let length = array_length(&array);
    if length == 0 {
        return Ok(Value::Undefined);
    }
    let first = element(agent, &array, 0)?;
    for index in 1..length {
        let value = element(agent, &array, index)?;
        array.insert_slot(PropertyKey::Index(index - 1), PropertySlot::data(value));
    }
    array.remove_slot(&PropertyKey::Index(length - 1));
    array.set_array_length_slot(length - 1);
    Ok(first)
}

builtin!(ArrayPrototypeUnshift, "unshift", 1, array_prototype_unshift);
fn array_prototype_unshift(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    let array = this_array(agent, &this_value)?;
    let length = array_length(&array);
    let added = arguments.len() as u32;
    if added > 0 {
        for index in (0..length).rev() {
            let value = element(agent, &array, index)?;
            array.insert_slot(PropertyKey::Index(index + added), PropertySlot::data(value));
        }
        for (offset, value) in arguments.slice().iter().enumerate() {
            array.insert_slot(
                PropertyKey::Index(offset as u32),
                PropertySlot::data(value.clone()),
            );
        }
    }
    array.set_array_length_slot(length + added);
    Ok(Value::from(f64::from(length + added)))
}

builtin!(ArrayPrototypeSlice, "slice", 2, array_prototype_slice);
fn array_prototype_slice(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    let array = this_array(agent, &this_value)?;
    let length = array_length(&array);
    let start = relative_index(agent, &arguments.get(0), length, 0)?;
    let end = relative_index(agent, &arguments.get(1), length, length)?;
    let mut values = Vec::new();
    for index in start..end.max(start) {
        values.push(element(agent, &array, index)?);
    }
    Ok(Value::Object(array_create(agent, values)))
}

builtin!(ArrayPrototypeSplice, "splice", 2, array_prototype_splice);
fn array_prototype_splice(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    let array = this_array(agent, &this_value)?;
    let length = array_length(&array);
    let start = relative_index(agent, &arguments.get(0), length, 0)?;
    let delete_count = if arguments.len() <= 1 {
        length - start
    } else {
        let requested = to_number(agent, &arguments.get(1))?.max(0.0);
        (requested.min(f64::from(length - start))) as u32
    };
    // Collect current elements, splice in Rust, rebuild.
    let mut values = Vec::with_capacity(length as usize);
    for index in 0..length {
        values.push(element(agent, &array, index)?);
    }
    let inserted: Vec<Value> = arguments.slice().iter().skip(2).cloned().collect();
    let removed: Vec<Value> = values
        .splice(
            start as usize..(start + delete_count) as usize,
            inserted,
        )
        .collect();
    for index in 0..length {
        array.remove_slot(&PropertyKey::Index(index));
    }
    for (index, value) in values.iter().enumerate() {
        array.insert_slot(
            PropertyKey::Index(index as u32),
            PropertySlot::data(value.clone()),
        );
    }
    array.set_array_length_slot(values.len() as u32);
    Ok(Value::Object(array_create(agent, removed)))
}

builtin!(ArrayPrototypeConcat, "concat", 1, array_prototype_concat);
fn array_prototype_concat(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    let array = this_array(agent, &this_value)?;
    let mut values = Vec::new();
    for index in 0..array_length(&array) {
        values.push(element(agent, &array, index)?);
    }
    for argument in arguments.slice() {
        match argument.as_object() {
            Some(object) if object.is_array() => {
                for index in 0..array_length(object) {
                    values.push(element(agent, object, index)?);
                }
            }
            _ => values.push(argument.clone()),
        }
    }
    Ok(Value::Object(array_create(agent, values)))
}

builtin!(ArrayPrototypeJoin, "join", 1, array_prototype_join);
fn array_prototype_join(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    let array = this_array(agent, &this_value)?;
    let separator = match arguments.get(0) {
        Value::Undefined => ",".to_string(),
        value => to_string(agent, &value)?.as_str().to_string(),
    };
    let mut out = String::new();
    for index in 0..array_length(&array) {
        if index > 0 {
            out.push_str(&separator);
        }
        let value = element(agent, &array, index)?;
        if !value.is_nullish() {
            out.push_str(to_string(agent, &value)?.as_str());
        }
    }
    Ok(Value::from(out))
}

builtin!(ArrayPrototypeToString, "toString", 0, array_prototype_to_string);
fn array_prototype_to_string(
    agent: &Agent,
    this_value: Value,
    _: ArgumentsList<'_>,
) -> JsResult<Value> {
    array_prototype_join(agent, this_value, ArgumentsList(&[]))
}

builtin!(ArrayPrototypeIndexOf, "indexOf", 1, array_prototype_index_of);
fn array_prototype_index_of(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    let array = this_array(agent, &this_value)?;
    let target = arguments.get(0);
    for index in 0..array_length(&array) {
        if is_strictly_equal(&element(agent, &array, index)?, &target) {
            return Ok(Value::from(f64::from(index)));
        }
    }
    Ok(Value::from(-1.0_f64))
}

builtin!(ArrayPrototypeIncludes, "includes", 1, array_prototype_includes);
fn array_prototype_includes(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    let array = this_array(agent, &this_value)?;
    let target = arguments.get(0);
    for index in 0..array_length(&array) {
        if same_value_zero(&element(agent, &array, index)?, &target) {
            return Ok(Value::Boolean(true));
        }
    }
    Ok(Value::Boolean(false))
}

builtin!(ArrayPrototypeMap, "map", 1, array_prototype_map);
fn array_prototype_map(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    let array = this_array(agent, &this_value)?;
    let mapper = callback(agent, &arguments.get(0))?;
    let this_arg = arguments.get(1);
    let mut values = Vec::new();
    for index in 0..array_length(&array) {
        let value = element(agent, &array, index)?;
        values.push(call_function_sync(
            agent,
            &mapper,
            this_arg.clone(),
            &[value, Value::from(f64::from(index)), Value::Object(array.clone())],
        )?);
    }
    Ok(Value::Object(array_create(agent, values)))
}

builtin!(ArrayPrototypeFilter, "filter", 1, array_prototype_filter);
fn array_prototype_filter(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    let array = this_array(agent, &this_value)?;
    let predicate = callback(agent, &arguments.get(0))?;
    let this_arg = arguments.get(1);
    let mut values = Vec::new();
    for index in 0..array_length(&array) {
        let value = element(agent, &array, index)?;
        let keep = call_function_sync(
            agent,
            &predicate,
            this_arg.clone(),
            &[value.clone(), Value::from(f64::from(index)), Value::Object(array.clone())],
        )?;
        if keep.to_boolean() {
            values.push(value);
        }
    }
    Ok(Value::Object(array_create(agent, values)))
}

builtin!(ArrayPrototypeForEach, "forEach", 1, array_prototype_for_each);
fn array_prototype_for_each(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    let array = this_array(agent, &this_value)?;
    let visitor = callback(agent, &arguments.get(0))?;
    let this_arg = arguments.get(1);
    for index in 0..array_length(&array) {
        let value = element(agent, &array, index)?;
        call_function_sync(
            agent,
            &visitor,
            this_arg.clone(),
            &[value, Value::from(f64::from(index)), Value::Object(array.clone())],
        )?;
    }
    Ok(Value::Undefined)
}

builtin!(ArrayPrototypeFind, "find", 1, array_prototype_find);
fn array_prototype_find(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    let array = this_array(agent, &this_value)?;
    let predicate = callback(agent, &arguments.get(0))?;
    for index in 0..array_length(&array) {
        let value = element(agent, &array, index)?;
        let matched = call_function_sync(
            agent,
            &predicate,
            Value::Undefined,
            &[value.clone(), Value::from(f64::from(index)), Value::Object(array.clone())],
        )?;
        if matched.to_boolean() {
            return Ok(value);
        }
    }
    Ok(Value::Undefined)
}

builtin!(ArrayPrototypeSome, "some", 1, array_prototype_some);
fn array_prototype_some(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    let array = this_array(agent, &this_value)?;
    let predicate = callback(agent, &arguments.get(0))?;
    for index in 0..array_length(&array) {
        let value = element(agent, &array, index)?;
        let matched = call_function_sync(
            agent,
            &predicate,
            Value::Undefined,
            &[value, Value::from(f64::from(index)), Value::Object(array.clone())],
        )?;
        if matched.to_boolean() {
            return Ok(Value::Boolean(true));
        }
    }
    Ok(Value::Boolean(false))
}

builtin!(ArrayPrototypeEvery, "every", 1, array_prototype_every);
fn array_prototype_every(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    let array = this_array(agent, &this_value)?;
    let predicate = callback(agent, &arguments.get(0))?;
    for index in 0..array_length(&array) {
        let value = element(agent, &array, index)?;
        let matched = call_function_sync(
            agent,
            &predicate,
            Value::Undefined,
            &[value, Value::from(f64::from(index)), Value::Object(array.clone())],
        )?;
        if !matched.to_boolean() {
            return Ok(Value::Boolean(false));
        }
    }
    Ok(Value::Boolean(true))
}

builtin!(ArrayPrototypeReverse, "reverse", 0, array_prototype_reverse);
fn array_prototype_reverse(
    agent: &Agent,
    this_value: Value,
    _: ArgumentsList<'_>,
) -> JsResult<Value> {
    let array = this_array(agent, &this_value)?;
    let length = array_length(&array);
    let mut values = Vec::with_capacity(length as usize);
    for index in 0..length {
        values.push(element(agent, &array, index)?);
    }
    values.reverse();
    for (index, value) in values.into_iter().enumerate() {
        array.insert_slot(PropertyKey::Index(index as u32), PropertySlot::data(value));
    }
    Ok(Value::Object(array))
}

// Array iterators.

/// Internal slots of an array iterator.
#[derive(Debug)]
pub(crate) struct ArrayIteratorData {
    pub(crate) array: JsObject,
    pub(crate) index: u32,
    pub(crate) kind: IterationKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IterationKind {
    Key,
    Value,
    KeyAndValue,
}

fn create_array_iterator(agent: &Agent, array: JsObject, kind: IterationKind) -> Value {
    Value::Object(JsObject::new(
        Some(agent.intrinsics().array_iterator_prototype.clone()),
        ObjectKind::ArrayIterator(ArrayIteratorData {
            array,
            index: 0,
            kind,
        }),
    ))
}

builtin!(ArrayPrototypeValues, "values", 0, array_prototype_values);
fn array_prototype_values(
    agent: &Agent,
    this_value: Value,
    _: ArgumentsList<'_>,
) -> JsResult<Value> {
    let array = this_array(agent, &this_value)?;
    Ok(create_array_iterator(agent, array, IterationKind::Value))
}

builtin!(ArrayPrototypeKeys, "keys", 0, array_prototype_keys);
fn array_prototype_keys(
    agent: &Agent,
    this_value: Value,
    _: ArgumentsList<'_>,
) -> JsResult<Value> {
    let array = this_array(agent, &this_value)?;
    Ok(create_array_iterator(agent, array, IterationKind::Key))
}

builtin!(ArrayPrototypeEntries, "entries", 0, array_prototype_entries);
fn array_prototype_entries(
    agent: &Agent,
    this_value: Value,
    _: ArgumentsList<'_>,
) -> JsResult<Value> {
    let array = this_array(agent, &this_value)?;
    Ok(create_array_iterator(agent, array, IterationKind::KeyAndValue))
}

builtin!(ArrayIteratorPrototypeNext, "next", 0, array_iterator_next);
fn array_iterator_next(agent: &Agent, this_value: Value, _: ArgumentsList<'_>) -> JsResult<Value> {
    let Some(object) = this_value.as_object() else {
        return Err(agent.throw_exception(
            ExceptionType::TypeError,
            "Receiver is not an array iterator",
        ));
    };
    let (array, index, kind) = {
        let mut data = object.data_mut();
        match &mut data.kind {
            ObjectKind::ArrayIterator(iterator) => {
                let snapshot = (
                    iterator.array.clone(),
                    iterator.index,
                    iterator.kind,
                );
                iterator.index += 1;
                snapshot
            }
            _ => {
                return Err(agent.throw_exception(
                    ExceptionType::TypeError,
                    "Receiver is not an array iterator",
                ));
            }
        }
    };
    if index >= array_length(&array) {
        return Ok(
            crate::ecmascript::builtins::control_abstraction_objects::create_iter_result_object(
                agent,
                Value::Undefined,
                true,
            ),
        );
    }
    let value = match kind {
        IterationKind::Key => Value::from(f64::from(index)),
        IterationKind::Value => element(agent, &array, index)?,
        IterationKind::KeyAndValue => {
            let entry = vec![Value::from(f64::from(index)), element(agent, &array, index)?];
            Value::Object(array_create(agent, entry))
        }
    };
    Ok(
        crate::ecmascript::builtins::control_abstraction_objects::create_iter_result_object(
            agent, value, false,
        ),
    )
}

// Constructor.

fn array_constructor(
    agent: &Agent,
    arguments: ArgumentsList<'_>,
    _instance_prototype: Option<&JsObject>,
) -> JsResult<Value> {
    if arguments.len() == 1 {
        if let Value::Number(length) = arguments.get(0) {
            let as_u32 = crate::ecmascript::abstract_operations::type_conversion::f64_to_uint32(length);
            if f64::from(as_u32) != length {
                return Err(
                    agent.throw_exception(ExceptionType::RangeError, "Invalid array length")
                );
            }
            let array = array_create(agent, Vec::new());
            array.set_array_length_slot(as_u32);
            return Ok(Value::Object(array));
        }
    }
    Ok(Value::Object(array_create(
        agent,
        arguments.slice().to_vec(),
    )))
}

builtin!(ArrayIsArray, "isArray", 1, array_is_array);
fn array_is_array(_: &Agent, _: Value, arguments: ArgumentsList<'_>) -> JsResult<Value> {
    Ok(Value::Boolean(
        arguments
            .get(0)
            .as_object()
            .map(|object| object.is_array())
            .unwrap_or(false),
    ))
}

builtin!(ArrayFrom, "from", 1, array_from);
fn array_from(agent: &Agent, _: Value, arguments: ArgumentsList<'_>) -> JsResult<Value> {
    let source = arguments.get(0);
    let values =
        crate::ecmascript::abstract_operations::operations_on_iterator_objects::iterator_to_list(
            agent, &source,
        )?;
    let values = match arguments.get(1) {
        Value::Undefined => values,
        mapper => {
            let mapper = callback(agent, &mapper)?;
            let mut mapped = Vec::with_capacity(values.len());
            for (index, value) in values.into_iter().enumerate() {
                mapped.push(call_function_sync(
                    agent,
                    &mapper,
                    Value::Undefined,
                    &[value, Value::from(index)],
                )?);
            }
            mapped
        }
    };
    Ok(Value::Object(array_create(agent, values)))
}

pub(crate) struct ArrayIntrinsicParts<'a> {
    pub(crate) object_prototype: &'a JsObject,
    pub(crate) function_prototype: &'a JsObject,
    pub(crate) iterator_symbol: &'a crate::ecmascript::types::JsSymbol,
}

/// Builds `Array.prototype` and the array iterator prototype.
pub(crate) fn create_array_prototype(parts: &ArrayIntrinsicParts<'_>) -> (JsObject, JsObject) {
    let prototype = OrdinaryObjectBuilder::new(
        JsObject::ordinary(Some(parts.object_prototype.clone())),
        parts.function_prototype,
    )
    .with_builtin_function_property::<ArrayPrototypePush>()
    .with_builtin_function_property::<ArrayPrototypePop>()
    .with_builtin_function_property::<ArrayPrototypeShift>()
    .with_builtin_function_property::<ArrayPrototypeUnshift>()
    .with_builtin_function_property::<ArrayPrototypeSlice>()
    .with_builtin_function_property::<ArrayPrototypeSplice>()
    .with_builtin_function_property::<ArrayPrototypeConcat>()
    .with_builtin_function_property::<ArrayPrototypeJoin>()
    .with_builtin_function_property::<ArrayPrototypeToString>()
    .with_builtin_function_property::<ArrayPrototypeIndexOf>()
    .with_builtin_function_property::<ArrayPrototypeIncludes>()
    .with_builtin_function_property::<ArrayPrototypeMap>()
    .with_builtin_function_property::<ArrayPrototypeFilter>()
    .with_builtin_function_property::<ArrayPrototypeForEach>()
    .with_builtin_function_property::<ArrayPrototypeFind>()
    .with_builtin_function_property::<ArrayPrototypeSome>()
    .with_builtin_function_property::<ArrayPrototypeEvery>()
    .with_builtin_function_property::<ArrayPrototypeReverse>()
    .with_builtin_function_property::<ArrayPrototypeValues>()
    .with_builtin_function_property::<ArrayPrototypeKeys>()
    .with_builtin_function_property::<ArrayPrototypeEntries>()
    .build();
    // @@iterator is the values intrinsic.
    let values_fn = create_builtin(
        "values",
        0,
        Behaviour::Regular(array_prototype_values),
        parts.function_prototype,
    );
    prototype.insert_slot(
        PropertyKey::Symbol(parts.iterator_symbol.clone()),
        PropertySlot::method(Value::Function(values_fn)),
    );

    let iterator_prototype = OrdinaryObjectBuilder::new(
        JsObject::ordinary(Some(parts.object_prototype.clone())),
        parts.function_prototype,
    )
    .with_builtin_function_property::<ArrayIteratorPrototypeNext>()
    .build();
    let self_fn = create_builtin(
        "[Symbol.iterator]",
        0,
        Behaviour::Regular(|_, this_value, _| Ok(this_value)),
        parts.function_prototype,
    );
    iterator_prototype.insert_slot(
        PropertyKey::Symbol(parts.iterator_symbol.clone()),
        PropertySlot::method(Value::Function(self_fn)),
    );
    (prototype, iterator_prototype)
}

/// Builds the `Array` constructor object.
pub(crate) fn create_array_constructor(
    prototype: &JsObject,
    function_prototype: &JsObject,
) -> JsObject {
    let constructor = create_builtin(
        "Array",
        1,
        Behaviour::Constructor(array_constructor),
        function_prototype,
    )
    .into_object();
    let builder = OrdinaryObjectBuilder::new(constructor.clone(), function_prototype)
        .with_builtin_function_property::<ArrayIsArray>()
        .with_builtin_function_property::<ArrayFrom>();
    let constructor = builder.build();
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

/// Renders an array for host-facing display, `[ 1, 2, 3 ]` style.
pub(crate) fn display_array(agent: &Agent, array: &JsObject) -> JsResult<JsString> {
    let mut out = String::from("[");
    for index in 0..array_length(array) {
        if index > 0 {
            out.push(',');
        }
        out.push(' ');
        let value = element(agent, array, index)?;
        out.push_str(to_string(agent, &value)?.as_str());
    }
    out.push_str(" ]");
    Ok(JsString::from(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_index_clamps() {
        let agent = Agent::new(crate::ecmascript::execution::agent::AgentOptions::default())
            .unwrap();
        assert_eq!(
            relative_index(&agent, &Value::from(-2.0), 5, 0).unwrap(),
            3
        );
        assert_eq!(
            relative_index(&agent, &Value::from(99.0), 5, 0).unwrap(),
            5
        );
        assert_eq!(relative_index(&agent, &Value::Undefined, 5, 5).unwrap(), 5);
    }
}
