// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Calling and constructing: call frames, `this` binding, the strict
//! argument-count check, parameter binding, and the four body kinds
//! (normal, generator, async, async generator).

use std::rc::Rc;

use futures_lite::future::BoxedLocal;

use crate::ecmascript::builtins::control_abstraction_objects::{
    create_generator_object, create_promise_from_future, poll_promise_once, GeneratorChannel,
};
use crate::ecmascript::builtins::{ArgumentsList, Behaviour};
use crate::ecmascript::execution::agent::Agent;
use crate::ecmascript::execution::environments::Environment;
use crate::ecmascript::execution::errors::{ExceptionType, JsResult};
use crate::ecmascript::types::language::function::{
    ClassFieldKey, ClassFieldValue, ConstructorStatus, EcmascriptFunctionData, FunctionKind,
    ThisMode,
};
use crate::ecmascript::types::language::object::{JsObject, ObjectKind};
use crate::ecmascript::types::{JsFunction, JsString, PropertyKey, Value};
use crate::sandbox::barrier;
use crate::sandbox::host_function::HostCallable;

use super::patterns::bind_parameters;
use super::{eval_statement_list, hoist_declarations, ExecutionContext};

/// Snapshot of the interpreted-function slots needed for a call, taken in
/// one borrow.
struct CallTarget {
    environment: Environment,
    private_environment: Option<crate::ecmascript::syntax_directed_operations::class_definitions::PrivateEnvironment>,
    source: Rc<crate::ecmascript::scripts_and_modules::source_code::SourceCode>,
    params: Option<&'static oxc_ast::ast::FormalParameters<'static>>,
    body: Option<&'static oxc_ast::ast::FunctionBody<'static>>,
    this_mode: ThisMode,
    is_async: bool,
    is_generator: bool,
    is_concise_arrow: bool,
    constructor_status: ConstructorStatus,
    fields: Vec<crate::ecmascript::types::language::function::ClassFieldInitializer>,
    name: JsString,
}

impl CallTarget {
    fn snapshot(data: &EcmascriptFunctionData, name: JsString) -> Self {
        CallTarget {
            environment: data.environment.clone(),
            private_environment: data.private_environment.clone(),
            source: data.source.clone(),
            params: data.params,
            body: data.body,
            this_mode: data.this_mode,
            is_async: data.is_async,
            is_generator: data.is_generator,
            is_concise_arrow: data.is_concise_arrow,
            constructor_status: data.constructor_status,
            fields: data.fields.clone(),
            name,
        }
    }
}

enum Callable {
    Ecmascript(CallTarget),
    Builtin(Behaviour),
    Host {
        callable: HostCallable,
        is_async: bool,
        this_target: Option<Value>,
        display_path: String,
    },
}

fn resolve_callable(agent: &Agent, function: &JsFunction) -> JsResult<Callable> {
    let data = function.data();
    let ObjectKind::Function(function_data) = &data.kind else {
        return Err(agent.throw_exception(ExceptionType::TypeError, "Value is not callable"));
    };
    let name = function_data.name.borrow().clone();
    Ok(match &function_data.kind {
        FunctionKind::Ecmascript(ecmascript) => {
            Callable::Ecmascript(CallTarget::snapshot(ecmascript, name))
        }
        FunctionKind::Builtin(builtin) => Callable::Builtin(builtin.behaviour),
        FunctionKind::HostAdapted(host) => Callable::Host {
            callable: host.callable.clone(),
            is_async: host.is_async,
            this_target: host.this_target.clone(),
            display_path: host.display_path.clone(),
        },
    })
}

/// ### [7.3.14 Call](https://tc39.es/ecma262/#sec-call)
pub(crate) async fn call_function(
    agent: Agent,
    function: JsFunction,
    this_value: Value,
    arguments: Vec<Value>,
) -> JsResult<Value> {
    match resolve_callable(&agent, &function)? {
        Callable::Builtin(behaviour) => call_builtin(&agent, behaviour, this_value, &arguments),
        Callable::Host {
            callable,
            is_async,
            this_target,
            display_path,
        } => call_host(&agent, callable, is_async, this_target, display_path, arguments),
        Callable::Ecmascript(target) => {
            if target.constructor_status.is_class_constructor() {
                return Err(agent.throw_exception(
                    ExceptionType::TypeError,
                    format!("Class constructor {} cannot be invoked without 'new'", target.name),
                ));
            }
            call_ecmascript(&agent, &function, target, CallThis::Bound(this_value), arguments, None)
                .await
        }
    }
}

/// Drives a call that cannot legitimately suspend (accessors, builtin
/// callbacks, `toString`/`valueOf` conversions). A pending poll is a
/// sandbox error, not a hang.
pub(crate) fn call_function_sync(
    agent: &Agent,
    function: &JsFunction,
    this_value: Value,
    arguments: &[Value],
) -> JsResult<Value> {
    let future = call_function(
        agent.clone(),
        function.clone(),
        this_value,
        arguments.to_vec(),
    );
    match futures_lite::future::block_on(futures_lite::future::poll_once(core::pin::pin!(future))) {
        Some(result) => result,
        None => Err(agent.throw_exception(
            ExceptionType::Generic,
            "Synchronous call attempted to suspend",
        )),
    }
}

fn call_builtin(
    agent: &Agent,
    behaviour: Behaviour,
    this_value: Value,
    arguments: &[Value],
) -> JsResult<Value> {
    match behaviour {
        Behaviour::Regular(function) => function(agent, this_value, ArgumentsList(arguments)),
        Behaviour::Constructor(function) => function(agent, ArgumentsList(arguments), None),
    }
}

/// The single call point for host-adapted callables: the host receiver is
/// the original host object, the result is wrapped on the way back in, and
/// host failures surface as sandbox errors with an optionally hidden
/// message.
fn call_host(
    agent: &Agent,
    callable: HostCallable,
    is_async: bool,
    this_target: Option<Value>,
    display_path: String,
    arguments: Vec<Value>,
) -> JsResult<Value> {
    let this_value = this_target.unwrap_or(Value::Undefined);
    let result_path = format!("{display_path}()");
    match callable {
        HostCallable::Sync(function) => {
            debug_assert!(!is_async);
            match function(this_value, &arguments) {
                Ok(value) => Ok(barrier::wrap_value(value, result_path)),
                Err(error) => Err(agent.convert_host_error(error)),
            }
        }
        HostCallable::Async(function) => {
            let future = function(this_value, arguments);
            let agent_clone = agent.clone();
            let body: BoxedLocal<JsResult<Value>> = Box::pin(async move {
                match future.await {
                    Ok(value) => Ok(barrier::wrap_value(value, result_path)),
                    Err(error) => Err(agent_clone.convert_host_error(error)),
                }
            });
            let promise = create_promise_from_future(agent, body);
            poll_promise_once(&promise);
            Ok(Value::Object(promise))
        }
    }
}

enum CallThis {
    /// Plain and method calls: `this` is the receiver (or `undefined`).
    Bound(Value),
    /// Derived constructors: `this` starts uninitialized; `super()` binds
    /// it.
    Uninitialized,
}

/// Runs an interpreted function body. `instance_prototype` is set when the
/// call is a construction; `super()` uses it to build the instance.
async fn call_ecmascript(
    agent: &Agent,
    function: &JsFunction,
    target: CallTarget,
    call_this: CallThis,
    arguments: Vec<Value>,
    instance_prototype: Option<JsObject>,
) -> JsResult<Value> {
    // The strict arity check (a deliberate divergence, documented): plain
    // functions reject wrong argument counts; arrows and host-adapted
    // callables accept anything.
    if target.this_mode == ThisMode::Dynamic {
        if let Some(params) = target.params {
            let (required, maximum) =
                crate::ecmascript::syntax_directed_operations::function_definitions::arity_bounds(
                    params,
                );
            let got = arguments.len();
            if got < required {
                return Err(agent.throw_exception(
                    ExceptionType::TypeError,
                    format!("Expected {required} arguments but got {got}"),
                ));
            }
            if let Some(maximum) = maximum {
                if got > maximum {
                    return Err(agent.throw_exception(
                        ExceptionType::TypeError,
                        format!("Expected {maximum} arguments but got {got}"),
                    ));
                }
            }
        }
    }

    let cx = ExecutionContext {
        agent: agent.clone(),
        source: target.source.clone(),
        channel: None,
        private_environment: target.private_environment.clone(),
        current_function: Some(function.clone()),
        instance_prototype,
        in_module: false,
    };

    let environment = Environment::new_function(
        &target.environment,
        target.this_mode == ThisMode::Lexical,
    );
    if target.this_mode == ThisMode::Dynamic {
        if let CallThis::Bound(this_value) = call_this {
            environment.bind_this(this_value)?;
        }
    }

    agent.push_frame(&target.name, target.source.path());
    let result = run_body(cx, environment, target, arguments).await;
    agent.pop_frame();
    result
}

async fn run_body(
    cx: ExecutionContext,
    environment: Environment,
    target: CallTarget,
    arguments: Vec<Value>,
) -> JsResult<Value> {
    // Default class constructor: no source body.
    let Some(body) = target.body else {
        return run_default_constructor(&cx, &environment, &target, arguments).await;
    };

    match (target.is_generator, target.is_async) {
        (false, false) => {
            if let Some(params) = target.params {
                bind_parameters(&cx, &environment, params, &arguments).await?;
            }
            run_field_initializers_if_base(&cx, &environment, &target).await?;
            let value =
                evaluate_function_statements(&cx, &environment, body, target.is_concise_arrow)
                    .await?;
            if target.constructor_status == ConstructorStatus::DerivedClass {
                return finish_derived_construction(&cx.agent, &environment, value);
            }
            Ok(value)
        }
        (false, true) => {
            // Async function: park the body in a promise and poll it once
            // (eager start to the first await).
            let cx = cx.clone();
            let environment = environment.clone();
            let agent = cx.agent.clone();
            let concise = target.is_concise_arrow;
            let params = target.params;
            let body_future: BoxedLocal<JsResult<Value>> = Box::pin(async move {
                if let Some(params) = params {
                    bind_parameters(&cx, &environment, params, &arguments).await?;
                }
                evaluate_function_statements(&cx, &environment, body, concise).await
            });
            let promise = create_promise_from_future(&agent, body_future);
            poll_promise_once(&promise);
            Ok(Value::Object(promise))
        }
        (true, is_async) => {
            // Generator: bind parameters eagerly (argument errors throw at
            // the call), then suspend at start.
            if let Some(params) = target.params {
                bind_parameters(&cx, &environment, params, &arguments).await?;
            }
            let channel = Rc::new(GeneratorChannel::default());
            let mut body_cx = cx.clone();
            body_cx.channel = Some(channel.clone());
            let environment = environment.clone();
            let body_future: BoxedLocal<JsResult<Value>> = Box::pin(async move {
                evaluate_function_statements(&body_cx, &environment, body, false).await
            });
            Ok(Value::Object(create_generator_object(
                &cx.agent,
                body_future,
                channel,
                is_async,
            )))
        }
    }
}

async fn evaluate_function_statements(
    cx: &ExecutionContext,
    environment: &Environment,
    body: &'static oxc_ast::ast::FunctionBody<'static>,
    is_concise_arrow: bool,
) -> JsResult<Value> {
    hoist_declarations(cx, environment, &body.statements)?;
    let completion = match eval_statement_list(cx, environment, &body.statements).await {
        Ok(completion) => completion,
        // generator.return(value) unwinds the body as a return completion.
        Err(error) => match error.as_generator_return() {
            Some(value) => return Ok(value.clone()),
            None => return Err(error),
        },
    };
    match completion {
        crate::engine::completion::Completion::Return(value) => Ok(value),
        completion if is_concise_arrow => Ok(completion.value()),
        _ => Ok(Value::Undefined),
    }
}

/// `constructor(...args) { super(...args); }` / `constructor() {}`.
async fn run_default_constructor(
    cx: &ExecutionContext,
    environment: &Environment,
    target: &CallTarget,
    arguments: Vec<Value>,
) -> JsResult<Value> {
    if target.constructor_status == ConstructorStatus::DerivedClass {
        let parent = parent_constructor(&cx.agent, cx.current_function.as_ref().unwrap())?;
        let instance = construct_boxed(
            cx.agent.clone(),
            parent,
            arguments,
            cx.instance_prototype.clone(),
        )
        .await?;
        environment.bind_this(instance.clone())?;
        run_field_initializers(cx, environment, &target.fields).await?;
        Ok(instance)
    } else {
        run_field_initializers(cx, environment, &target.fields).await?;
        environment.get_this()
    }
}

/// Base-class constructors initialize fields before the body runs; derived
/// ones wait for `super()`.
async fn run_field_initializers_if_base(
    cx: &ExecutionContext,
    environment: &Environment,
    target: &CallTarget,
) -> JsResult<()> {
    if target.constructor_status == ConstructorStatus::BaseClass {
        run_field_initializers(cx, environment, &target.fields).await?;
    }
    Ok(())
}

pub(crate) async fn run_field_initializers(
    cx: &ExecutionContext,
    environment: &Environment,
    fields: &[crate::ecmascript::types::language::function::ClassFieldInitializer],
) -> JsResult<()> {
    if fields.is_empty() {
        return Ok(());
    }
    let this_value = environment.get_this()?;
    let Some(this_object) = this_value.as_object().cloned() else {
        return Ok(());
    };
    for field in fields {
        let value = match &field.value {
            ClassFieldValue::None => Value::Undefined,
            ClassFieldValue::Method(closure) => Value::Function(closure.clone()),
            ClassFieldValue::Expression(expression) => {
                super::expressions::eval_expression(cx, environment, expression).await?
            }
        };
        match &field.key {
            ClassFieldKey::Private(id) => this_object.private_set(*id, value),
            ClassFieldKey::Property(key) => {
                crate::ecmascript::builtins::ordinary::create_data_property(
                    &this_object,
                    key.clone(),
                    value,
                );
            }
        }
    }
    Ok(())
}

/// The superclass constructor: the static-inheritance prototype edge of
/// the current (derived) constructor.
pub(crate) fn parent_constructor(agent: &Agent, function: &JsFunction) -> JsResult<JsFunction> {
    match function.object().prototype() {
        Some(parent) if parent.is_callable() => Ok(JsFunction(parent)),
        _ => Err(agent.throw_exception(
            ExceptionType::TypeError,
            "Super constructor is not a constructor",
        )),
    }
}

/// ### [7.3.15 Construct](https://tc39.es/ecma262/#sec-construct)
pub(crate) async fn construct(
    agent: Agent,
    function: JsFunction,
    arguments: Vec<Value>,
    instance_prototype: Option<JsObject>,
) -> JsResult<Value> {
    match resolve_callable(&agent, &function)? {
        Callable::Builtin(Behaviour::Constructor(constructor)) => {
            let prototype = match instance_prototype {
                Some(prototype) => Some(prototype),
                None => prototype_of_function(&agent, &function)?,
            };
            constructor(&agent, ArgumentsList(&arguments), prototype.as_ref())
        }
        Callable::Builtin(Behaviour::Regular(_)) => Err(agent.throw_exception(
            ExceptionType::TypeError,
            "Function is not a constructor",
        )),
        Callable::Host { .. } => Err(agent.throw_exception(
            ExceptionType::TypeError,
            "Host function is not a constructor",
        )),
        Callable::Ecmascript(target) => {
            if !target.constructor_status.is_constructor() {
                return Err(agent.throw_exception(
                    ExceptionType::TypeError,
                    format!("{} is not a constructor", target.name),
                ));
            }
            let prototype = match instance_prototype {
                Some(prototype) => Some(prototype),
                None => prototype_of_function(&agent, &function)?,
            };
            if target.constructor_status == ConstructorStatus::DerivedClass {
                // `this` stays uninitialized until `super()`.
                let result = call_ecmascript(
                    &agent,
                    &function,
                    target,
                    CallThis::Uninitialized,
                    arguments,
                    prototype,
                )
                .await?;
                Ok(result)
            } else {
                let this_object = JsObject::ordinary(
                    prototype.or_else(|| Some(agent.intrinsics().object_prototype.clone())),
                );
                let this_value = Value::Object(this_object.clone());
                let result = call_ecmascript(
                    &agent,
                    &function,
                    target,
                    CallThis::Bound(this_value.clone()),
                    arguments,
                    None,
                )
                .await?;
                // An explicit object return overrides the fresh instance.
                Ok(match result {
                    Value::Object(_) | Value::Function(_) => result,
                    _ => this_value,
                })
            }
        }
    }
}

/// Boxed recursion point: `construct` → derived body → `super()` →
/// `construct`.
pub(crate) fn construct_boxed(
    agent: Agent,
    function: JsFunction,
    arguments: Vec<Value>,
    instance_prototype: Option<JsObject>,
) -> BoxedLocal<JsResult<Value>> {
    Box::pin(construct(agent, function, arguments, instance_prototype))
}

fn prototype_of_function(agent: &Agent, function: &JsFunction) -> JsResult<Option<JsObject>> {
    let prototype = crate::ecmascript::abstract_operations::operations_on_objects::get(
        agent,
        function.object(),
        &PropertyKey::from("prototype"),
    )?;
    Ok(prototype.as_object().cloned())
}

/// The completion of a derived constructor body: an explicit object return
/// wins; otherwise `this` must have been bound by `super()`.
pub(crate) fn finish_derived_construction(
    agent: &Agent,
    environment: &Environment,
    result: Value,
) -> JsResult<Value> {
    match result {
        Value::Object(_) | Value::Function(_) => Ok(result),
        _ => {
            if !environment.is_this_bound() {
                return Err(agent.throw_exception(
                    ExceptionType::ReferenceError,
                    "Must call super constructor before returning from derived constructor",
                ));
            }
            environment.get_this()
        }
    }
}
