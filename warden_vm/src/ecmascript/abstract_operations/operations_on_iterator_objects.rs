// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [7.4 Operations on Iterator Objects](https://tc39.es/ecma262/#sec-operations-on-iterator-objects)
//!
//! The synchronous iteration protocol. Async iteration composes these
//! pieces with awaits in the evaluator.

use crate::ecmascript::execution::agent::Agent;
use crate::ecmascript::execution::errors::{ExceptionType, JsResult};
use crate::ecmascript::types::language::object::ObjectKind;
use crate::ecmascript::types::{JsString, PropertyKey, Value};
use crate::engine::interpreter::functions::call_function_sync;
use crate::sandbox::barrier;

use super::operations_on_objects::{get_method, get_value_property};

/// An in-flight iteration.
pub(crate) enum IteratorRecord {
    /// Strings iterate by code point.
    StringChars { chars: Vec<char>, index: usize },
    /// The generic protocol: an iterator object and its `next` method.
    Protocol { iterator: Value, next: Value },
    /// Pre-materialized values (wrapped host arrays, byte buffers).
    Buffered { values: std::vec::IntoIter<Value> },
}

/// ### [7.4.3 GetIterator](https://tc39.es/ecma262/#sec-getiterator)
pub(crate) fn get_iterator(agent: &Agent, value: &Value) -> JsResult<IteratorRecord> {
    if let Value::String(text) = value {
        return Ok(IteratorRecord::StringChars {
            chars: text.as_str().chars().collect(),
            index: 0,
        });
    }
    if let Some(object) = value.as_object() {
        let data = object.data();
        if let ObjectKind::HostWrapped(barrier_data) = &data.kind {
            let values = barrier::iterable_values(barrier_data)?;
            return Ok(IteratorRecord::Buffered {
                values: values.into_iter(),
            });
        }
    }
    let method = get_method(
        agent,
        value,
        &PropertyKey::Symbol(agent.intrinsics().iterator_symbol.clone()),
    )?;
    let Some(method) = method.and_then(|m| m.as_function().cloned()) else {
        return Err(agent.throw_exception(
            ExceptionType::TypeError,
            format!("{} is not iterable", value.type_of()),
        ));
    };
    let iterator = call_function_sync(agent, &method, value.clone(), &[])?;
    if !iterator.is_object() {
        return Err(agent.throw_exception(
            ExceptionType::TypeError,
            "Iterator method did not return an object",
        ));
    }
    let next = get_value_property(agent, &iterator, &PropertyKey::from("next"))?;
    Ok(IteratorRecord::Protocol { iterator, next })
}

/// The async flavor: prefers `[Symbol.asyncIterator]`, falls back to the
/// sync protocol (the evaluator then awaits each value).
pub(crate) fn get_async_iterator(
    agent: &Agent,
    value: &Value,
) -> JsResult<IteratorRecord> {
    if value.is_object() {
        let method = get_method(
            agent,
            value,
            &PropertyKey::Symbol(agent.intrinsics().async_iterator_symbol.clone()),
        )?;
        if let Some(method) = method.and_then(|m| m.as_function().cloned()) {
            let iterator = call_function_sync(agent, &method, value.clone(), &[])?;
            let next = get_value_property(agent, &iterator, &PropertyKey::from("next"))?;
            return Ok(IteratorRecord::Protocol { iterator, next });
        }
    }
    get_iterator(agent, value)
}

impl IteratorRecord {
    /// ### [7.4.8 IteratorStep](https://tc39.es/ecma262/#sec-iteratorstep)
    ///
    /// `None` when the iterator is done. For protocol iterators the step
    /// result may be a promise; the synchronous caller treats that as a
    /// protocol violation, the async caller awaits it first.
    pub(crate) fn step_raw(&mut self, agent: &Agent) -> JsResult<Option<Value>> {
        match self {
            IteratorRecord::StringChars { chars, index } => {
                let Some(ch) = chars.get(*index) else {
                    return Ok(None);
                };
                *index += 1;
                Ok(Some(Value::from(JsString::from(*ch))))
            }
            IteratorRecord::Buffered { values } => Ok(values.next()),
            IteratorRecord::Protocol { iterator, next } => {
                let Some(next_fn) = next.as_function() else {
                    return Err(agent.throw_exception(
                        ExceptionType::TypeError,
                        "Iterator has no callable 'next' method",
                    ));
                };
                let result = call_function_sync(agent, next_fn, iterator.clone(), &[])?;
                Ok(Some(result))
            }
        }
    }

    /// Synchronous step: unwraps the `{value, done}` result object.
    pub(crate) fn step(&mut self, agent: &Agent) -> JsResult<Option<Value>> {
        let raw = self.step_raw(agent)?;
        match (raw, matches!(self, IteratorRecord::Protocol { .. })) {
            (None, _) => Ok(None),
            (Some(result), true) => unwrap_iter_result(agent, &result),
            (Some(value), false) => Ok(Some(value)),
        }
    }

    /// ### [7.4.11 IteratorClose](https://tc39.es/ecma262/#sec-iteratorclose)
    ///
    /// Called on early loop exits. Close failures are swallowed: the
    /// in-flight completion wins.
    pub(crate) fn close(&mut self, agent: &Agent) {
        if let IteratorRecord::Protocol { iterator, .. } = self {
            let method = get_method(agent, iterator, &PropertyKey::from("return"));
            if let Ok(Some(method)) = method {
                if let Some(method) = method.as_function() {
                    let _ = call_function_sync(agent, method, iterator.clone(), &[]);
                }
            }
        }
    }
}

/// Destructures an iterator result object.
pub(crate) fn unwrap_iter_result(agent: &Agent, result: &Value) -> JsResult<Option<Value>> {
    if !result.is_object() {
        return Err(agent.throw_exception(
            ExceptionType::TypeError,
            "Iterator result is not an object",
        ));
    }
    let done = get_value_property(agent, result, &PropertyKey::from("done"))?.to_boolean();
    if done {
        return Ok(None);
    }
    let value = get_value_property(agent, result, &PropertyKey::from("value"))?;
    Ok(Some(value))
}

/// Drains an iterable into a vector (spread, destructuring).
pub(crate) fn iterator_to_list(agent: &Agent, value: &Value) -> JsResult<Vec<Value>> {
    let mut record = get_iterator(agent, value)?;
    let mut values = Vec::new();
    while let Some(next) = record.step(agent)? {
        values.push(next);
    }
    Ok(values)
}
