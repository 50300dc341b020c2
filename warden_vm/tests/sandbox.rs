// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The barrier: forbidden names, read-only enforcement, display paths,
//! host-adapted callables, and stack sanitization.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use warden_vm::{Agent, AgentOptions, ExceptionType, HostFunction, JsError, Value};

fn agent_with(globals: IndexMap<String, Value>) -> Agent {
    Agent::new(AgentOptions {
        globals,
        ..Default::default()
    })
    .unwrap()
}

fn host_object_global(value: Value) -> (Agent, Value) {
    let mut globals = IndexMap::new();
    globals.insert("obj".to_string(), value.clone());
    (agent_with(globals), value)
}

#[test]
fn proto_read_is_blocked_with_display_path() {
    let mut entries = IndexMap::new();
    entries.insert("value", Value::from(42.0));
    let (agent, raw) = host_object_global(Value::host_object(entries));

    let error = agent.evaluate("obj.__proto__").unwrap_err();
    assert_eq!(error.kind(), ExceptionType::SecurityError);
    assert_eq!(error.message(), "Cannot access __proto__ on global 'obj'");

    // No pollution: the host-side object is untouched and has no
    // prototype edge.
    let object = raw.as_object().unwrap();
    assert!(object.prototype().is_none());
    assert_eq!(
        agent.get_property(&raw, "value").unwrap().as_number(),
        Some(42.0)
    );
}

#[test]
fn every_forbidden_name_is_blocked() {
    let mut entries = IndexMap::new();
    entries.insert("value", Value::from(1.0));
    let (agent, _) = host_object_global(Value::host_object(entries));
    for name in [
        "__proto__",
        "constructor",
        "prototype",
        "__defineGetter__",
        "__lookupSetter__",
        "valueOf",
        "toLocaleString",
        "hasOwnProperty",
        "isPrototypeOf",
        "propertyIsEnumerable",
        "apply",
        "call",
        "bind",
        "arguments",
        "caller",
    ] {
        let error = agent.evaluate(&format!("obj.{name}")).unwrap_err();
        assert_eq!(error.kind(), ExceptionType::SecurityError, "name: {name}");
        assert!(error.message().contains(name), "message names {name}");
    }
}

#[test]
fn host_objects_are_read_only() {
    let mut entries = IndexMap::new();
    entries.insert("value", Value::from(42.0));
    let (agent, raw) = host_object_global(Value::host_object(entries));

    for source in [
        "obj.value = 1",
        "obj.fresh = 1",
        "delete obj.value",
        "Object.defineProperty(obj, 'value', { value: 1 })",
    ] {
        let error = agent.evaluate(source).unwrap_err();
        assert_eq!(error.kind(), ExceptionType::SecurityError, "source: {source}");
    }
    assert_eq!(
        agent.get_property(&raw, "value").unwrap().as_number(),
        Some(42.0)
    );
}

#[test]
fn nested_reads_return_wrappers_with_extended_paths() {
    let mut inner = IndexMap::new();
    inner.insert("secret", Value::from(7.0));
    let mut entries = IndexMap::new();
    entries.insert("data", Value::host_object(inner));
    let (agent, _) = host_object_global(Value::host_object(entries));

    assert_eq!(
        agent
            .evaluate("obj.data.secret")
            .unwrap()
            .as_number(),
        Some(7.0)
    );
    let error = agent.evaluate("obj.data.__proto__").unwrap_err();
    assert_eq!(
        error.message(),
        "Cannot access __proto__ on global 'obj'.data"
    );
    let error = agent.evaluate("obj.data.other = 3").unwrap_err();
    assert_eq!(error.kind(), ExceptionType::SecurityError);
}

#[test]
fn wrapped_prototype_reads_as_null() {
    let mut entries = IndexMap::new();
    entries.insert("value", Value::from(1.0));
    let (agent, _) = host_object_global(Value::host_object(entries));
    assert!(agent
        .evaluate("Object.getPrototypeOf(obj) === null")
        .unwrap()
        .as_boolean()
        .unwrap());
}

#[test]
fn host_array_iteration_wraps_elements() {
    let mut element = IndexMap::new();
    element.insert("n", Value::from(1.0));
    let array = Value::host_array([Value::host_object(element)]);
    let (agent, _) = host_object_global(array);

    // Values readable, element wrappers still read-only.
    assert_eq!(
        agent
            .evaluate("let total = 0; for (const e of obj) total += e.n; total")
            .unwrap()
            .as_number(),
        Some(1.0)
    );
    let error = agent
        .evaluate("for (const e of obj) { e.n = 9; }")
        .unwrap_err();
    assert_eq!(error.kind(), ExceptionType::SecurityError);
    assert!(error.message().contains("global 'obj'[]"));
}

#[test]
fn typed_buffer_indexed_writes_pass() {
    let shared = Rc::new(RefCell::new(vec![0u8; 4]));
    let mut globals = IndexMap::new();
    globals.insert(
        "buffer".to_string(),
        Value::uint8_buffer_shared(shared.clone()),
    );
    let agent = agent_with(globals);

    agent
        .evaluate("buffer[0] = 65; buffer[1] = 66; buffer[2] = 321;")
        .unwrap();
    assert_eq!(&*shared.borrow(), &[65, 66, 65, 0]);
    assert_eq!(agent.evaluate("buffer.length").unwrap().as_number(), Some(4.0));
    assert_eq!(agent.evaluate("buffer[1]").unwrap().as_number(), Some(66.0));

    // Named writes are still refused.
    let error = agent.evaluate("buffer.length = 0").unwrap_err();
    assert_eq!(error.kind(), ExceptionType::SecurityError);
}

#[test]
fn forbidden_global_names_are_rejected_at_construction() {
    for name in ["Function", "eval", "Proxy", "Reflect", "AsyncGeneratorFunction"] {
        let mut globals = IndexMap::new();
        globals.insert(name.to_string(), Value::from(1.0));
        let error = Agent::new(AgentOptions {
            globals,
            ..Default::default()
        })
        .err()
        .expect("construction must fail");
        assert_eq!(error.kind(), ExceptionType::SecurityError);
    }
}

#[test]
fn host_functions_are_callable_and_this_bound() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let calls_clone = calls.clone();
    let double = HostFunction::new("double", move |_this, arguments| {
        let n = arguments[0].as_number().unwrap_or(f64::NAN);
        calls_clone.borrow_mut().push(n);
        Ok(Value::from(n * 2.0))
    });
    let mut globals = IndexMap::new();
    globals.insert("double".to_string(), double);
    let agent = agent_with(globals);

    assert_eq!(agent.evaluate("double(21)").unwrap().as_number(), Some(42.0));
    assert_eq!(&*calls.borrow(), &[21.0]);
}

#[test]
fn host_function_results_are_wrapped() {
    let make = HostFunction::new("make", |_this, _arguments| {
        let mut entries = IndexMap::new();
        entries.insert("x", Value::from(1.0));
        Ok(Value::host_object(entries))
    });
    let mut globals = IndexMap::new();
    globals.insert("make".to_string(), make);
    let agent = agent_with(globals);

    assert_eq!(
        agent.evaluate("make().x").unwrap().as_number(),
        Some(1.0)
    );
    let error = agent.evaluate("make().x = 5").unwrap_err();
    assert_eq!(error.kind(), ExceptionType::SecurityError);
    assert!(error.message().contains("make()"));
}

#[test]
fn host_errors_are_hidden_by_default() {
    let fail = HostFunction::new("fail", |_this, _arguments| {
        Err(JsError::new(
            ExceptionType::Generic,
            "secret internal detail: /srv/keys.pem",
        ))
    });
    let mut globals = IndexMap::new();
    globals.insert("fail".to_string(), fail);
    let agent = agent_with(globals);

    let error = agent.evaluate("fail()").unwrap_err();
    assert_eq!(error.message(), "[error details hidden]");

    // Opt-out keeps the message.
    let fail = HostFunction::new("fail", |_this, _arguments| {
        Err(JsError::new(ExceptionType::Generic, "visible detail"))
    });
    let mut globals = IndexMap::new();
    globals.insert("fail".to_string(), fail);
    let agent = Agent::new(AgentOptions {
        globals,
        security: warden_vm::SecurityOptions {
            hide_host_error_messages: false,
            ..Default::default()
        },
        ..Default::default()
    })
    .unwrap();
    let error = agent.evaluate("fail()").unwrap_err();
    assert_eq!(error.message(), "visible detail");
}

#[test]
fn host_error_stacks_are_sanitized() {
    let error_value = Value::host_error(
        "boom",
        "Error: boom\n    at handler (file:///srv/app/handler.js:10:3)\n    at C:\\srv\\run.js:1:1",
    );
    let mut entries = IndexMap::new();
    entries.insert("failure", error_value);
    let (agent, _) = host_object_global(Value::host_object(entries));

    let stack = agent.evaluate("obj.failure.stack").unwrap();
    let stack = stack.as_string().unwrap().as_str().to_string();
    assert!(stack.starts_with("Error: boom"));
    assert!(!stack.contains("/srv/"));
    assert!(!stack.contains("C:\\"));
    assert!(stack.contains("[native code]"));
}

#[test]
fn date_like_values_coerce_through_the_stub() {
    let mut globals = IndexMap::new();
    globals.insert("when".to_string(), Value::date(86_400_000.0));
    let agent = agent_with(globals);
    // The host valueOf is never called; the stub reports the timestamp.
    assert_eq!(
        agent.evaluate("when - 0").unwrap().as_number(),
        Some(86_400_000.0)
    );
}

#[test]
fn sandbox_objects_keep_normal_semantics() {
    // The forbidden-name set applies to wrapped host objects only.
    let agent = Agent::new(AgentOptions::default()).unwrap();
    assert_eq!(
        agent
            .evaluate("const o = { a: 1 }; o.hasOwnProperty('a')")
            .unwrap()
            .as_boolean(),
        Some(true)
    );
    assert_eq!(
        agent
            .evaluate("const o = {}; o.fresh = 3; o.fresh")
            .unwrap()
            .as_number(),
        Some(3.0)
    );
}

#[test]
fn feature_gate_blocks_constructs_fatally() {
    let agent = Agent::new(AgentOptions {
        feature_control: warden_vm::FeaturePolicy::es2019(),
        ..Default::default()
    })
    .unwrap();
    // The rejection cannot be swallowed by try/catch.
    let error = agent
        .evaluate("try { 2n } catch (e) { 'caught' }")
        .unwrap_err();
    assert_eq!(error.kind(), ExceptionType::SyntaxError);
    assert!(error.message().contains("BigIntLiteral"));

    // The rest of the dialect still runs.
    assert_eq!(agent.evaluate("1 + 1").unwrap().as_number(), Some(2.0));

    let agent = Agent::new(AgentOptions {
        feature_control: warden_vm::FeaturePolicy::whitelist([
            "NumericLiteral",
            "BinaryExpression",
        ]),
        ..Default::default()
    })
    .unwrap();
    assert!(agent.evaluate("class C {}").is_err());
}

#[test]
fn cancellation_aborts_between_statements() {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    let flag = Arc::new(AtomicBool::new(true));
    let agent = Agent::new(AgentOptions {
        cancellation: Some(flag.clone()),
        ..Default::default()
    })
    .unwrap();
    let error = agent.evaluate("let i = 0; while (true) { i++; }").unwrap_err();
    assert!(error.is_fatal());
    assert!(error.message().contains("cancelled"));

    flag.store(false, Ordering::Relaxed);
    assert_eq!(agent.evaluate("2 + 2").unwrap().as_number(), Some(4.0));
}
