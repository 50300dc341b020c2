// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Generators, async functions, and the suspension rules.

use std::cell::RefCell;
use std::rc::Rc;

use futures_lite::future::block_on;
use indexmap::IndexMap;
use warden_vm::{Agent, AgentOptions, ExceptionType, HostFunction, Value};

fn agent() -> Agent {
    Agent::new(AgentOptions::default()).unwrap()
}

fn eval_display(source: &str) -> String {
    let agent = agent();
    let value = agent.evaluate(source).unwrap();
    agent.display_value(&value).unwrap()
}

#[test]
fn generator_yields_in_order() {
    let scenario = r#"
        function* numbers() {
            yield 1;
            yield 2;
            return 3;
        }
        const g = numbers();
        const a = g.next();
        const b = g.next();
        const c = g.next();
        const d = g.next();
        [a.value, a.done, b.value, b.done, c.value, c.done, d.done]
    "#;
    assert_eq!(
        eval_display(scenario),
        "[ 1, false, 2, false, 3, true, true ]"
    );
}

#[test]
fn generator_receives_sent_values() {
    let scenario = r#"
        function* echo() {
            const first = yield 'ready';
            const second = yield 'got ' + first;
            return 'end ' + second;
        }
        const g = echo();
        const greetings = [g.next().value, g.next('one').value, g.next('two').value];
        greetings.join('|')
    "#;
    let agent = agent();
    let value = agent.evaluate(scenario).unwrap();
    assert_eq!(value.as_string().unwrap(), "ready|got one|end two");
}

#[test]
fn generator_return_runs_finally() {
    let scenario = r#"
        let cleaned = false;
        function* g() {
            try {
                yield 1;
                yield 2;
            } finally {
                cleaned = true;
            }
        }
        const it = g();
        it.next();
        const r = it.return(99);
        [r.value, r.done, cleaned, it.next().done]
    "#;
    assert_eq!(eval_display(scenario), "[ 99, true, true, true ]");
}

#[test]
fn generator_throw_is_catchable_inside() {
    let scenario = r#"
        function* g() {
            try {
                yield 1;
            } catch (e) {
                yield 'caught ' + e;
            }
        }
        const it = g();
        it.next();
        it.throw('boom').value
    "#;
    let agent = agent();
    let value = agent.evaluate(scenario).unwrap();
    assert_eq!(value.as_string().unwrap(), "caught boom");
}

#[test]
fn generators_are_iterable() {
    let scenario = r#"
        function* range(n) {
            for (let i = 0; i < n; i++) yield i;
        }
        let total = 0;
        for (const n of range(5)) total += n;
        [total, [...range(3)].length]
    "#;
    assert_eq!(eval_display(scenario), "[ 10, 3 ]");
}

#[test]
fn yield_delegation() {
    let scenario = r#"
        function* inner() { yield 'a'; yield 'b'; }
        function* outer() {
            yield 'start';
            yield* inner();
            yield 'end';
        }
        [...outer()].join(',')
    "#;
    let agent = agent();
    let value = agent.evaluate(scenario).unwrap();
    assert_eq!(value.as_string().unwrap(), "start,a,b,end");
}

#[test]
fn async_functions_resolve_through_evaluate_async() {
    let scenario = r#"
        async function add(a, b) { return a + b; }
        async function main() {
            const x = await add(1, 2);
            const y = await add(x, 10);
            return y;
        }
        await main()
    "#;
    let value = block_on(agent().evaluate_async(scenario)).unwrap();
    assert_eq!(value.as_number(), Some(13.0));
}

#[test]
fn async_rejection_is_catchable() {
    let scenario = r#"
        async function fails() { throw new TypeError('async boom'); }
        async function main() {
            try {
                await fails();
                return 'no error';
            } catch (e) {
                return 'caught: ' + e.message;
            }
        }
        await main()
    "#;
    let value = block_on(agent().evaluate_async(scenario)).unwrap();
    assert_eq!(value.as_string().unwrap(), "caught: async boom");
}

#[test]
fn promise_then_chains() {
    let scenario = r#"
        async function one() { return 1; }
        await one().then(n => n + 1).then(n => n * 10)
    "#;
    let value = block_on(agent().evaluate_async(scenario)).unwrap();
    assert_eq!(value.as_number(), Some(20.0));
}

#[test]
fn host_async_functions_suspend_and_resume() {
    let fetch = HostFunction::new_async("fetchNumber", |_this, _arguments| {
        Box::pin(async {
            // Yield once so the sandbox genuinely suspends.
            futures_lite::future::yield_now().await;
            Ok(Value::from(42.0))
        })
    });
    let mut globals = IndexMap::new();
    globals.insert("fetchNumber".to_string(), fetch);
    let agent = Agent::new(AgentOptions {
        globals,
        ..Default::default()
    })
    .unwrap();

    let value = block_on(agent.evaluate_async("await fetchNumber() + 0")).unwrap();
    assert_eq!(value.as_number(), Some(42.0));
}

#[test]
fn sync_evaluate_fails_on_real_suspension() {
    let pending = HostFunction::new_async("never", |_this, _arguments| {
        Box::pin(core::future::pending())
    });
    let mut globals = IndexMap::new();
    globals.insert("never".to_string(), pending);
    let agent = Agent::new(AgentOptions {
        globals,
        ..Default::default()
    })
    .unwrap();

    let error = agent.evaluate("await never()").unwrap_err();
    assert_eq!(error.kind(), ExceptionType::Generic);
    assert!(error.message().contains("suspend"));
}

#[test]
fn async_generators_drive_for_await() {
    let scenario = r#"
        async function* produce() {
            yield 1;
            yield 2;
            yield 3;
        }
        async function main() {
            let total = 0;
            for await (const n of produce()) total += n;
            return total;
        }
        await main()
    "#;
    let value = block_on(agent().evaluate_async(scenario)).unwrap();
    assert_eq!(value.as_number(), Some(6.0));
}

#[test]
fn for_await_over_sync_iterables_of_promises() {
    let scenario = r#"
        async function wrap(n) { return n; }
        async function main() {
            let total = 0;
            for await (const n of [wrap(1), wrap(2), 3]) total += n;
            return total;
        }
        await main()
    "#;
    let value = block_on(agent().evaluate_async(scenario)).unwrap();
    assert_eq!(value.as_number(), Some(6.0));
}

#[test]
fn unawaited_async_work_still_runs() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let log_clone = log.clone();
    let record = HostFunction::new("record", move |_this, arguments| {
        log_clone
            .borrow_mut()
            .push(arguments[0].as_number().unwrap_or(f64::NAN));
        Ok(Value::Undefined)
    });
    let mut globals = IndexMap::new();
    globals.insert("record".to_string(), record);
    let agent = Agent::new(AgentOptions {
        globals,
        ..Default::default()
    })
    .unwrap();

    let scenario = r#"
        async function later() { record(2); }
        record(1);
        later();
        'done'
    "#;
    block_on(agent.evaluate_async(scenario)).unwrap();
    assert_eq!(&*log.borrow(), &[1.0, 2.0]);
}
