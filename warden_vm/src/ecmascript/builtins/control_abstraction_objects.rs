// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Generators, async generators, and promises.
//!
//! A generator owns its body as a boxed future plus a resume channel. The
//! driver polls the body with a no-op waker: a pending poll with the
//! channel's `yielded` slot filled is a `yield`, a ready poll is
//! completion. An async generator is driven with a real waker so host
//! futures awaited inside the body propagate. A promise is either settled
//! or holds the parked body future that will settle it; awaiting the
//! promise drives the body.

use core::cell::RefCell;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll, Waker};
use std::rc::Rc;

use futures_lite::future::BoxedLocal;

use crate::ecmascript::builtins::{ArgumentsList, Behaviour, Builtin, OrdinaryObjectBuilder};
use crate::ecmascript::execution::agent::Agent;
use crate::ecmascript::execution::errors::{ExceptionType, JsError, JsResult};
use crate::ecmascript::types::language::object::{JsObject, ObjectKind};
use crate::ecmascript::types::property_descriptor::PropertySlot;
use crate::ecmascript::types::{PropertyKey, Value};

use super::error::{error_from_thrown_value, error_to_catch_value};

pub(crate) type GeneratorBody = BoxedLocal<JsResult<Value>>;

/// The resume channel between a generator driver and the suspended body.
#[derive(Debug, Default)]
pub(crate) struct GeneratorChannel {
    pub(crate) yielded: RefCell<Option<Value>>,
    pub(crate) resume: RefCell<Option<ResumeSignal>>,
}

#[derive(Debug)]
pub(crate) enum ResumeSignal {
    Next(Value),
    Return(Value),
    Throw(Value),
}

/// Internal slots of a generator object.
pub(crate) struct GeneratorData {
    pub(crate) is_async: bool,
    pub(crate) state: GeneratorState,
}

impl core::fmt::Debug for GeneratorData {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GeneratorData")
            .field("is_async", &self.is_async)
            .finish_non_exhaustive()
    }
}

pub(crate) enum GeneratorState {
    SuspendedStart {
        body: GeneratorBody,
        channel: Rc<GeneratorChannel>,
    },
    SuspendedYield {
        body: GeneratorBody,
        channel: Rc<GeneratorChannel>,
    },
    Executing,
    Completed,
}

/// A single `Pending` before resuming: the suspension point of `yield`.
struct PendOnce(bool);

impl Future for PendOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            Poll::Ready(())
        } else {
            self.0 = true;
            Poll::Pending
        }
    }
}

/// What a `yield` expression resumes into.
pub(crate) enum YieldResume {
    Next(Value),
    Return(Value),
    Throw(Value),
}

/// Suspends the current generator body, handing `value` to the driver.
pub(crate) async fn perform_yield(channel: &Rc<GeneratorChannel>, value: Value) -> YieldResume {
    *channel.yielded.borrow_mut() = Some(value);
    PendOnce(false).await;
    match channel.resume.borrow_mut().take() {
        Some(ResumeSignal::Next(value)) => YieldResume::Next(value),
        Some(ResumeSignal::Return(value)) => YieldResume::Return(value),
        Some(ResumeSignal::Throw(value)) => YieldResume::Throw(value),
        None => YieldResume::Next(Value::Undefined),
    }
}

pub(crate) fn create_generator_object(
    agent: &Agent,
    body: GeneratorBody,
    channel: Rc<GeneratorChannel>,
    is_async: bool,
) -> JsObject {
    let prototype = if is_async {
        agent.intrinsics().async_generator_prototype.clone()
    } else {
        agent.intrinsics().generator_prototype.clone()
    };
    JsObject::new(
        Some(prototype),
        ObjectKind::Generator(GeneratorData {
            is_async,
            state: GeneratorState::SuspendedStart { body, channel },
        }),
    )
}

enum ResumeOutcome {
    Yielded(Value),
    Done(Value),
    Failed(JsError),
}

fn take_generator_state(
    agent: &Agent,
    generator: &JsObject,
    expect_async: bool,
) -> JsResult<GeneratorState> {
    let mut data = generator.data_mut();
    match &mut data.kind {
        ObjectKind::Generator(gen) if gen.is_async == expect_async => Ok(core::mem::replace(
            &mut gen.state,
            GeneratorState::Executing,
        )),
        _ => Err(agent.throw_exception(
            ExceptionType::TypeError,
            "Receiver is not a generator object",
        )),
    }
}

fn store_generator_state(generator: &JsObject, state: GeneratorState) {
    if let ObjectKind::Generator(gen) = &mut generator.data_mut().kind {
        gen.state = state;
    }
}

/// ### [27.5.3.3 GeneratorResume](https://tc39.es/ecma262/#sec-generatorresume)
///
/// Drives a synchronous generator one step. The body cannot legitimately
/// await, so a pending poll without a yielded value is an internal error.
pub(crate) fn resume_generator(
    agent: &Agent,
    generator: &JsObject,
    signal: ResumeSignal,
) -> JsResult<(Value, bool)> {
    let state = take_generator_state(agent, generator, false)?;
    let (mut body, channel) = match state {
        GeneratorState::SuspendedStart { body, channel } => match signal {
            ResumeSignal::Next(_) => (body, channel),
            ResumeSignal::Return(value) => {
                store_generator_state(generator, GeneratorState::Completed);
                return Ok((value, true));
            }
            ResumeSignal::Throw(value) => {
                store_generator_state(generator, GeneratorState::Completed);
                return Err(error_from_thrown_value(agent, value));
            }
        },
        GeneratorState::SuspendedYield { body, channel } => {
            *channel.resume.borrow_mut() = Some(signal);
            (body, channel)
        }
        GeneratorState::Executing => {
            store_generator_state(generator, GeneratorState::Executing);
            return Err(agent.throw_exception(
                ExceptionType::TypeError,
                "Generator is already running",
            ));
        }
        GeneratorState::Completed => {
            store_generator_state(generator, GeneratorState::Completed);
            return match signal {
                ResumeSignal::Next(_) => Ok((Value::Undefined, true)),
                ResumeSignal::Return(value) => Ok((value, true)),
                ResumeSignal::Throw(value) => Err(error_from_thrown_value(agent, value)),
            };
        }
    };

    let outcome = match futures_lite::future::block_on(futures_lite::future::poll_once(
        body.as_mut(),
    )) {
        Some(Ok(value)) => ResumeOutcome::Done(value),
        Some(Err(error)) => ResumeOutcome::Failed(error),
        None => match channel.yielded.borrow_mut().take() {
            Some(value) => ResumeOutcome::Yielded(value),
            None => ResumeOutcome::Failed(agent.throw_exception(
                ExceptionType::Generic,
                "Generator attempted to suspend outside a yield point",
            )),
        },
    };
    match outcome {
        ResumeOutcome::Yielded(value) => {
            store_generator_state(generator, GeneratorState::SuspendedYield { body, channel });
            Ok((value, false))
        }
        ResumeOutcome::Done(value) => {
            store_generator_state(generator, GeneratorState::Completed);
            Ok((value, true))
        }
        ResumeOutcome::Failed(error) => {
            store_generator_state(generator, GeneratorState::Completed);
            Err(error)
        }
    }
}

/// As [`resume_generator`] but for async generators: awaits through host
/// futures the body awaits between yields.
pub(crate) async fn resume_generator_async(
    agent: Agent,
    generator: JsObject,
    signal: ResumeSignal,
) -> JsResult<(Value, bool)> {
    let state = take_generator_state(&agent, &generator, true)?;
    let (mut body, channel) = match state {
        GeneratorState::SuspendedStart { body, channel } => match signal {
            ResumeSignal::Next(_) => (body, channel),
            ResumeSignal::Return(value) => {
                store_generator_state(&generator, GeneratorState::Completed);
                return Ok((value, true));
            }
            ResumeSignal::Throw(value) => {
                store_generator_state(&generator, GeneratorState::Completed);
                return Err(error_from_thrown_value(&agent, value));
            }
        },
        GeneratorState::SuspendedYield { body, channel } => {
            *channel.resume.borrow_mut() = Some(signal);
            (body, channel)
        }
        GeneratorState::Executing => {
            store_generator_state(&generator, GeneratorState::Executing);
            return Err(agent.throw_exception(
                ExceptionType::TypeError,
                "Generator is already running",
            ));
        }
        GeneratorState::Completed => {
            store_generator_state(&generator, GeneratorState::Completed);
            return match signal {
                ResumeSignal::Next(_) => Ok((Value::Undefined, true)),
                ResumeSignal::Return(value) => Ok((value, true)),
                ResumeSignal::Throw(value) => Err(error_from_thrown_value(&agent, value)),
            };
        }
    };

    let outcome = core::future::poll_fn(|cx| match body.as_mut().poll(cx) {
        Poll::Ready(Ok(value)) => Poll::Ready(ResumeOutcome::Done(value)),
        Poll::Ready(Err(error)) => Poll::Ready(ResumeOutcome::Failed(error)),
        Poll::Pending => match channel.yielded.borrow_mut().take() {
            Some(value) => Poll::Ready(ResumeOutcome::Yielded(value)),
            None => Poll::Pending,
        },
    })
    .await;
    match outcome {
        ResumeOutcome::Yielded(value) => {
            store_generator_state(&generator, GeneratorState::SuspendedYield { body, channel });
            Ok((value, false))
        }
        ResumeOutcome::Done(value) => {
            store_generator_state(&generator, GeneratorState::Completed);
            Ok((value, true))
        }
        ResumeOutcome::Failed(error) => {
            store_generator_state(&generator, GeneratorState::Completed);
            Err(error)
        }
    }
}

// Promises.

/// Internal slots of a promise object.
pub(crate) struct PromiseData {
    pub(crate) state: PromiseState,
}

impl core::fmt::Debug for PromiseData {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = match self.state {
            PromiseState::Pending { .. } => "pending",
            PromiseState::Fulfilled(_) => "fulfilled",
            PromiseState::Rejected(_) => "rejected",
        };
        f.debug_struct("PromiseData").field("state", &state).finish()
    }
}

pub(crate) enum PromiseState {
    Pending {
        /// The parked computation that settles this promise, driven by the
        /// first awaiter (or the agent's job drain).
        body: Option<BoxedLocal<JsResult<Value>>>,
        wakers: Vec<Waker>,
    },
    Fulfilled(Value),
    Rejected(JsError),
}

/// Creates a promise around a computation and parks it on the agent's job
/// list so unawaited promises still run during job draining.
pub(crate) fn create_promise_from_future(
    agent: &Agent,
    body: BoxedLocal<JsResult<Value>>,
) -> JsObject {
    let promise = JsObject::new(
        Some(agent.intrinsics().promise_prototype.clone()),
        ObjectKind::Promise(PromiseData {
            state: PromiseState::Pending {
                body: Some(body),
                wakers: Vec::new(),
            },
        }),
    );
    agent.enqueue_job(promise.clone());
    promise
}

pub(crate) fn create_fulfilled_promise(agent: &Agent, value: Value) -> JsObject {
    JsObject::new(
        Some(agent.intrinsics().promise_prototype.clone()),
        ObjectKind::Promise(PromiseData {
            state: PromiseState::Fulfilled(value),
        }),
    )
}

fn settle(promise: &JsObject, result: &JsResult<Value>) {
    let mut data = promise.data_mut();
    if let ObjectKind::Promise(p) = &mut data.kind {
        let wakers = match &mut p.state {
            PromiseState::Pending { wakers, .. } => core::mem::take(wakers),
            _ => Vec::new(),
        };
        p.state = match result {
            Ok(value) => PromiseState::Fulfilled(value.clone()),
            Err(error) => PromiseState::Rejected(error.clone()),
        };
        drop(data);
        for waker in wakers {
            waker.wake();
        }
    }
}

/// Awaits a promise object: drives the parked body if this caller is
/// first, otherwise waits for the driver to settle it.
pub(crate) fn await_promise(
    promise: JsObject,
) -> impl Future<Output = JsResult<Value>> {
    let mut driving: Option<BoxedLocal<JsResult<Value>>> = None;
    core::future::poll_fn(move |cx| {
        if driving.is_none() {
            let mut data = promise.data_mut();
            match &mut data.kind {
                ObjectKind::Promise(p) => match &mut p.state {
                    PromiseState::Fulfilled(value) => return Poll::Ready(Ok(value.clone())),
                    PromiseState::Rejected(error) => return Poll::Ready(Err(error.clone())),
                    PromiseState::Pending { body, wakers } => match body.take() {
                        Some(parked) => driving = Some(parked),
                        None => {
                            wakers.push(cx.waker().clone());
                            return Poll::Pending;
                        }
                    },
                },
                _ => {
                    return Poll::Ready(Err(JsError::new(
                        ExceptionType::TypeError,
                        "Awaited value is not a promise",
                    )))
                }
            }
        }
        let body = driving.as_mut().expect("body present while driving");
        match body.as_mut().poll(cx) {
            Poll::Ready(result) => {
                settle(&promise, &result);
                driving = None;
                Poll::Ready(result)
            }
            Poll::Pending => Poll::Pending,
        }
    })
}

/// Polls a pending promise's body exactly once. Used by the synchronous
/// job drain, where blocking on host futures is not an option.
pub(crate) fn poll_promise_once(promise: &JsObject) -> bool {
    let parked = {
        let mut data = promise.data_mut();
        match &mut data.kind {
            ObjectKind::Promise(p) => match &mut p.state {
                PromiseState::Pending { body, .. } => body.take(),
                _ => return true,
            },
            _ => return true,
        }
    };
    let Some(mut body) = parked else {
        return false;
    };
    match futures_lite::future::block_on(futures_lite::future::poll_once(body.as_mut())) {
        Some(result) => {
            settle(promise, &result);
            true
        }
        None => {
            let mut data = promise.data_mut();
            if let ObjectKind::Promise(p) = &mut data.kind {
                if let PromiseState::Pending { body: slot, .. } = &mut p.state {
                    *slot = Some(body);
                }
            }
            false
        }
    }
}

pub(crate) fn is_promise(value: &Value) -> Option<JsObject> {
    let object = value.as_object()?;
    if matches!(object.data().kind, ObjectKind::Promise(_)) {
        Some(object.clone())
    } else {
        None
    }
}

/// Awaits any value: promises resolve through their record, everything
/// else passes through.
pub(crate) async fn await_value(value: Value) -> JsResult<Value> {
    match is_promise(&value) {
        Some(promise) => await_promise(promise).await,
        None => Ok(value),
    }
}

// Prototypes.

pub(crate) fn create_iter_result_object(agent: &Agent, value: Value, done: bool) -> Value {
    let object = JsObject::ordinary(Some(agent.intrinsics().object_prototype.clone()));
    object.insert_slot(PropertyKey::from("value"), PropertySlot::data(value));
    object.insert_slot(
        PropertyKey::from("done"),
        PropertySlot::data(Value::Boolean(done)),
    );
    Value::Object(object)
}

fn this_generator(agent: &Agent, this_value: &Value) -> JsResult<JsObject> {
    match this_value.as_object() {
        Some(object) if matches!(object.data().kind, ObjectKind::Generator(_)) => {
            Ok(object.clone())
        }
        _ => Err(agent.throw_exception(
            ExceptionType::TypeError,
            "Receiver is not a generator object",
        )),
    }
}

struct GeneratorPrototypeNext;
impl Builtin for GeneratorPrototypeNext {
    const NAME: &'static str = "next";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(generator_prototype_next);
}

fn generator_prototype_next(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    let generator = this_generator(agent, &this_value)?;
    let (value, done) = resume_generator(agent, &generator, ResumeSignal::Next(arguments.get(0)))?;
    Ok(create_iter_result_object(agent, value, done))
}

struct GeneratorPrototypeReturn;
impl Builtin for GeneratorPrototypeReturn {
    const NAME: &'static str = "return";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(generator_prototype_return);
}

fn generator_prototype_return(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    let generator = this_generator(agent, &this_value)?;
    let (value, done) =
        resume_generator(agent, &generator, ResumeSignal::Return(arguments.get(0)))?;
    Ok(create_iter_result_object(agent, value, done))
}

struct GeneratorPrototypeThrow;
impl Builtin for GeneratorPrototypeThrow {
    const NAME: &'static str = "throw";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(generator_prototype_throw);
}

fn generator_prototype_throw(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    let generator = this_generator(agent, &this_value)?;
    let (value, done) =
        resume_generator(agent, &generator, ResumeSignal::Throw(arguments.get(0)))?;
    Ok(create_iter_result_object(agent, value, done))
}

fn return_this(_: &Agent, this_value: Value, _: ArgumentsList<'_>) -> JsResult<Value> {
    Ok(this_value)
}

pub(crate) fn create_generator_prototype(parts: &GeneratorPrototypeParts<'_>) -> JsObject {
    let prototype = OrdinaryObjectBuilder::new(
        JsObject::ordinary(Some(parts.object_prototype.clone())),
        parts.function_prototype,
    )
    .with_builtin_function_property::<GeneratorPrototypeNext>()
    .with_builtin_function_property::<GeneratorPrototypeReturn>()
    .with_builtin_function_property::<GeneratorPrototypeThrow>()
    .build();
    let self_fn = super::create_builtin(
        "[Symbol.iterator]",
        0,
        Behaviour::Regular(return_this),
        parts.function_prototype,
    );
    prototype.insert_slot(
        PropertyKey::Symbol(parts.iterator_symbol.clone()),
        PropertySlot::method(Value::Function(self_fn)),
    );
    prototype
}

pub(crate) struct GeneratorPrototypeParts<'a> {
    pub(crate) object_prototype: &'a JsObject,
    pub(crate) function_prototype: &'a JsObject,
    pub(crate) iterator_symbol: &'a crate::ecmascript::types::JsSymbol,
}

fn this_async_generator(agent: &Agent, this_value: &Value) -> JsResult<JsObject> {
    match this_value.as_object() {
        Some(object)
            if matches!(&object.data().kind, ObjectKind::Generator(g) if g.is_async) =>
        {
            Ok(object.clone())
        }
        _ => Err(agent.throw_exception(
            ExceptionType::TypeError,
            "Receiver is not an async generator object",
        )),
    }
}

pub(crate) fn create_async_generator_prototype(parts: &GeneratorPrototypeParts<'_>) -> JsObject {
    let prototype = OrdinaryObjectBuilder::new(
        JsObject::ordinary(Some(parts.object_prototype.clone())),
        parts.function_prototype,
    )
    .with_builtin_function_property::<AsyncGeneratorPrototypeNext>()
    .with_builtin_function_property::<AsyncGeneratorPrototypeReturn>()
    .with_builtin_function_property::<AsyncGeneratorPrototypeThrow>()
    .build();
    let self_fn = super::create_builtin(
        "[Symbol.asyncIterator]",
        0,
        Behaviour::Regular(return_this),
        parts.function_prototype,
    );
    prototype.insert_slot(
        PropertyKey::Symbol(parts.iterator_symbol.clone()),
        PropertySlot::method(Value::Function(self_fn)),
    );
    prototype
}

struct AsyncGeneratorPrototypeNext;
impl Builtin for AsyncGeneratorPrototypeNext {
    const NAME: &'static str = "next";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(async_generator_prototype_next);
}

fn async_generator_prototype_next(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    async_generator_resume_to_promise(agent, this_value, ResumeSignal::Next(arguments.get(0)))
}

struct AsyncGeneratorPrototypeReturn;
impl Builtin for AsyncGeneratorPrototypeReturn {
    const NAME: &'static str = "return";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(async_generator_prototype_return);
}

fn async_generator_prototype_return(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    async_generator_resume_to_promise(agent, this_value, ResumeSignal::Return(arguments.get(0)))
}

struct AsyncGeneratorPrototypeThrow;
impl Builtin for AsyncGeneratorPrototypeThrow {
    const NAME: &'static str = "throw";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(async_generator_prototype_throw);
}

fn async_generator_prototype_throw(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    async_generator_resume_to_promise(agent, this_value, ResumeSignal::Throw(arguments.get(0)))
}

fn async_generator_resume_to_promise(
    agent: &Agent,
    this_value: Value,
    signal: ResumeSignal,
) -> JsResult<Value> {
    let generator = this_async_generator(agent, &this_value)?;
    let agent_clone = agent.clone();
    let body: BoxedLocal<JsResult<Value>> = Box::pin(async move {
        let (value, done) =
            resume_generator_async(agent_clone.clone(), generator, signal).await?;
        Ok(create_iter_result_object(&agent_clone, value, done))
    });
    Ok(Value::Object(create_promise_from_future(agent, body)))
}

// Promise.prototype.

fn this_promise(agent: &Agent, this_value: &Value) -> JsResult<JsObject> {
    is_promise(this_value).ok_or_else(|| {
        agent.throw_exception(ExceptionType::TypeError, "Receiver is not a promise")
    })
}

struct PromisePrototypeThen;
impl Builtin for PromisePrototypeThen {
    const NAME: &'static str = "then";
    const LENGTH: u8 = 2;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(promise_prototype_then);
}

/// ### [27.2.5.4 Promise.prototype.then](https://tc39.es/ecma262/#sec-promise.prototype.then)
fn promise_prototype_then(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    let promise = this_promise(agent, &this_value)?;
    let on_fulfilled = arguments.get(0);
    let on_rejected = arguments.get(1);
    Ok(Value::Object(promise_then(
        agent,
        promise,
        on_fulfilled,
        on_rejected,
    )))
}

pub(crate) fn promise_then(
    agent: &Agent,
    promise: JsObject,
    on_fulfilled: Value,
    on_rejected: Value,
) -> JsObject {
    let agent_clone = agent.clone();
    let body: BoxedLocal<JsResult<Value>> = Box::pin(async move {
        let agent = agent_clone;
        let settled = await_promise(promise).await;
        match settled {
            Ok(value) => match on_fulfilled.as_function() {
                Some(handler) => {
                    let result = crate::engine::interpreter::functions::call_function(
                        agent.clone(),
                        handler.clone(),
                        Value::Undefined,
                        vec![value],
                    )
                    .await?;
                    await_value(result).await
                }
                None => Ok(value),
            },
            Err(error) => match on_rejected.as_function() {
                Some(handler) => {
                    let caught = error_to_catch_value(&agent, &error);
                    let result = crate::engine::interpreter::functions::call_function(
                        agent.clone(),
                        handler.clone(),
                        Value::Undefined,
                        vec![caught],
                    )
                    .await?;
                    await_value(result).await
                }
                None => Err(error),
            },
        }
    });
    create_promise_from_future(agent, body)
}

struct PromisePrototypeCatch;
impl Builtin for PromisePrototypeCatch {
    const NAME: &'static str = "catch";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(promise_prototype_catch);
}

fn promise_prototype_catch(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    let promise = this_promise(agent, &this_value)?;
    Ok(Value::Object(promise_then(
        agent,
        promise,
        Value::Undefined,
        arguments.get(0),
    )))
}

struct PromisePrototypeFinally;
impl Builtin for PromisePrototypeFinally {
    const NAME: &'static str = "finally";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(promise_prototype_finally);
}

fn promise_prototype_finally(
    agent: &Agent,
    this_value: Value,
    arguments: ArgumentsList<'_>,
) -> JsResult<Value> {
    let promise = this_promise(agent, &this_value)?;
    let on_finally = arguments.get(0);
    let agent_clone = agent.clone();
    let body: BoxedLocal<JsResult<Value>> = Box::pin(async move {
        let settled = await_promise(promise).await;
        if let Some(handler) = on_finally.as_function() {
            let result = crate::engine::interpreter::functions::call_function(
                agent_clone.clone(),
                handler.clone(),
                Value::Undefined,
                Vec::new(),
            )
            .await?;
            await_value(result).await?;
        }
        settled
    });
    Ok(Value::Object(create_promise_from_future(agent, body)))
}

pub(crate) fn create_promise_prototype(
    object_prototype: &JsObject,
    function_prototype: &JsObject,
) -> JsObject {
    OrdinaryObjectBuilder::new(
        JsObject::ordinary(Some(object_prototype.clone())),
        function_prototype,
    )
    .with_builtin_function_property::<PromisePrototypeThen>()
    .with_builtin_function_property::<PromisePrototypeCatch>()
    .with_builtin_function_property::<PromisePrototypeFinally>()
    .build()
}
