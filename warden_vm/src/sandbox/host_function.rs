// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host-adapted callables. A host function is never exposed to sandbox
//! code directly: the adapter is the sole call point, it keeps `this` bound
//! to the original host receiver, and it records at construction whether
//! the callable is asynchronous.

use core::cell::RefCell;
use core::fmt;
use std::rc::Rc;

use futures_lite::future::BoxedLocal;

use crate::ecmascript::execution::errors::{JsError, JsResult};
use crate::ecmascript::types::language::function::{FunctionData, FunctionKind, HostFunctionData};
use crate::ecmascript::types::language::object::{JsObject, ObjectKind};
use crate::ecmascript::types::{JsFunction, JsString, Value};

type SyncHostFn = dyn Fn(Value, &[Value]) -> JsResult<Value>;
type AsyncHostFn = dyn Fn(Value, Vec<Value>) -> BoxedLocal<JsResult<Value>>;

/// The host side of an adapted callable.
#[derive(Clone)]
pub(crate) enum HostCallable {
    Sync(Rc<SyncHostFn>),
    Async(Rc<AsyncHostFn>),
}

impl fmt::Debug for HostCallable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostCallable::Sync(_) => f.write_str("HostCallable::Sync"),
            HostCallable::Async(_) => f.write_str("HostCallable::Async"),
        }
    }
}

/// Builders for host callables the embedder places in globals or on host
/// objects.
pub struct HostFunction;

impl HostFunction {
    /// A synchronous host callable. The first argument is the host
    /// receiver the callable was read off (`Value::Undefined` for a bare
    /// global function).
    pub fn new<F>(name: &str, f: F) -> Value
    where
        F: Fn(Value, &[Value]) -> Result<Value, JsError> + 'static,
    {
        Self::build(name, HostCallable::Sync(Rc::new(f)), false)
    }

    /// An asynchronous host callable: calling it from sandbox code produces
    /// a promise that settles when the returned future does.
    pub fn new_async<F>(name: &str, f: F) -> Value
    where
        F: Fn(Value, Vec<Value>) -> BoxedLocal<JsResult<Value>> + 'static,
    {
        Self::build(name, HostCallable::Async(Rc::new(f)), true)
    }

    fn build(name: &str, callable: HostCallable, is_async: bool) -> Value {
        let data = FunctionData {
            name: RefCell::new(JsString::new(name)),
            kind: FunctionKind::HostAdapted(HostFunctionData {
                callable,
                is_async,
                constructable: false,
                this_target: None,
                display_path: name.to_string(),
            }),
        };
        let object = JsObject::new(None, ObjectKind::Function(data));
        Value::Function(JsFunction(object))
    }
}

/// Re-adapts a host callable read through the barrier, rebinding `this` to
/// the host receiver it was read off and recording its display path.
pub(crate) fn readapt(
    source: &HostFunctionData,
    name: &JsString,
    this_target: Option<Value>,
    display_path: String,
) -> Value {
    let data = FunctionData {
        name: RefCell::new(name.clone()),
        kind: FunctionKind::HostAdapted(HostFunctionData {
            callable: source.callable.clone(),
            is_async: source.is_async,
            constructable: source.constructable,
            this_target,
            display_path,
        }),
    };
    let object = JsObject::new(None, ObjectKind::Function(data));
    Value::Function(JsFunction(object))
}
