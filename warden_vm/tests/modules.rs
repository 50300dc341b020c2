// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The module loader: resolution, caching, re-exports, cycles,
//! namespaces, and introspection.

use std::cell::RefCell;
use std::rc::Rc;

use futures_lite::future::block_on;
use indexmap::IndexMap;
use warden_vm::{
    Agent, AgentOptions, ExceptionType, JsResult, ModuleOptions, ModuleResolution,
    ModuleResolver, ResolveContext, Value,
};

/// An in-memory resolver over a fixed set of sources, recording hook
/// firings.
struct MapResolver {
    sources: IndexMap<String, String>,
    loads: RefCell<Vec<String>>,
    errors: RefCell<Vec<String>>,
}

impl MapResolver {
    fn new<const N: usize>(sources: [(&str, &str); N]) -> Rc<Self> {
        Rc::new(Self {
            sources: sources
                .into_iter()
                .map(|(specifier, code)| (specifier.to_string(), code.to_string()))
                .collect(),
            loads: RefCell::new(Vec::new()),
            errors: RefCell::new(Vec::new()),
        })
    }
}

impl ModuleResolver for MapResolver {
    fn resolve(
        &self,
        specifier: &str,
        _importer: Option<&str>,
        _context: &ResolveContext<'_>,
    ) -> JsResult<Option<ModuleResolution>> {
        Ok(self.sources.get(specifier).map(|code| ModuleResolution::Source {
            code: code.clone(),
            path: format!("/modules/{specifier}.js"),
        }))
    }

    fn on_load(&self, specifier: &str, _path: &str) {
        self.loads.borrow_mut().push(specifier.to_string());
    }

    fn on_error(&self, specifier: &str, _importer: Option<&str>, _error: &warden_vm::JsError) {
        self.errors.borrow_mut().push(specifier.to_string());
    }
}

fn agent_with_resolver(resolver: Rc<MapResolver>) -> Agent {
    Agent::new(AgentOptions {
        modules: ModuleOptions {
            enabled: true,
            resolver: Some(resolver),
            ..Default::default()
        },
        ..Default::default()
    })
    .unwrap()
}

#[test]
fn named_default_and_renamed_exports() {
    let resolver = MapResolver::new([(
        "util",
        r#"
            export const first = 1;
            export function double(n) { return n * 2; }
            const hidden = 'internal';
            export { hidden as visible };
            export default 'the default';
        "#,
    )]);
    let agent = agent_with_resolver(resolver);
    let exports = block_on(agent.evaluate_module(
        r#"
            import fallback, { first, double, visible } from 'util';
            export const result = first + ':' + double(2) + ':' + visible + ':' + fallback;
        "#,
        "/entry.js",
    ))
    .unwrap();
    assert_eq!(
        exports["result"].as_string().unwrap(),
        "1:4:internal:the default"
    );
}

#[test]
fn module_diamond_loads_base_once() {
    let resolver = MapResolver::new([
        ("base", "export const BASE = 'base';"),
        ("left", "export * from 'base'; export const LEFT = 'left';"),
        ("right", "export * from 'base'; export const RIGHT = 'right';"),
        ("top", "export * from 'left'; export * from 'right';"),
    ]);
    let agent = agent_with_resolver(resolver.clone());
    let exports = block_on(agent.evaluate_module(
        r#"
            import { BASE, LEFT, RIGHT } from 'top';
            export const joined = BASE + LEFT + RIGHT;
        "#,
        "/entry.js",
    ))
    .unwrap();
    assert_eq!(exports["joined"].as_string().unwrap(), "baseleftright");

    let base_loads = resolver
        .loads
        .borrow()
        .iter()
        .filter(|specifier| specifier.as_str() == "base")
        .count();
    assert_eq!(base_loads, 1);
}

#[test]
fn star_reexports_never_propagate_default_and_locals_shadow() {
    let resolver = MapResolver::new([
        (
            "inner",
            "export const name = 'inner'; export const only = 'from inner'; export default 'inner default';",
        ),
        (
            "outer",
            "export * from 'inner'; export const name = 'outer';",
        ),
    ]);
    let agent = agent_with_resolver(resolver);
    let exports = block_on(agent.evaluate_module(
        r#"
            import * as ns from 'outer';
            export const name = ns.name;
            export const only = ns.only;
            export const hasDefault = 'default' in ns;
        "#,
        "/entry.js",
    ))
    .unwrap();
    assert_eq!(exports["name"].as_string().unwrap(), "outer");
    assert_eq!(exports["only"].as_string().unwrap(), "from inner");
    assert_eq!(exports["hasDefault"].as_boolean(), Some(false));
}

#[test]
fn namespace_reexport_carries_default() {
    let resolver = MapResolver::new([
        ("leaf", "export const x = 1; export default 'leaf default';"),
        ("hub", "export * as leaf from 'leaf';"),
    ]);
    let agent = agent_with_resolver(resolver);
    let exports = block_on(agent.evaluate_module(
        r#"
            import { leaf } from 'hub';
            export const x = leaf.x;
            export const d = leaf.default;
        "#,
        "/entry.js",
    ))
    .unwrap();
    assert_eq!(exports["x"].as_number(), Some(1.0));
    assert_eq!(exports["d"].as_string().unwrap(), "leaf default");
}

#[test]
fn namespace_objects_are_frozen_to_sandbox_code() {
    let resolver = MapResolver::new([("leaf", "export const x = 1;")]);
    let agent = agent_with_resolver(resolver);
    let error = block_on(agent.evaluate_module(
        r#"
            import * as ns from 'leaf';
            ns.x = 2;
        "#,
        "/entry.js",
    ))
    .unwrap_err();
    assert_eq!(error.kind(), ExceptionType::TypeError);
}

#[test]
fn cyclic_imports_observe_late_initialization() {
    let resolver = MapResolver::new([
        (
            "a",
            r#"
                import { fromB } from 'b';
                export const fromA = 'a';
                export function readB() { return fromB; }
            "#,
        ),
        (
            "b",
            r#"
                import { fromA } from 'a';
                export const fromB = 'b';
                export function readA() { return fromA; }
            "#,
        ),
    ]);
    let agent = agent_with_resolver(resolver);
    let exports = block_on(agent.evaluate_module(
        r#"
            import { readB } from 'a';
            import { readA } from 'b';
            export const both = readA() + readB();
        "#,
        "/entry.js",
    ))
    .unwrap();
    assert_eq!(exports["both"].as_string().unwrap(), "ab");
}

#[test]
fn live_bindings_track_the_exporting_module() {
    let resolver = MapResolver::new([(
        "counter",
        r#"
            export let count = 0;
            export function increment() { count = count + 1; }
        "#,
    )]);
    let agent = agent_with_resolver(resolver);
    let exports = block_on(agent.evaluate_module(
        r#"
            import { count, increment } from 'counter';
            const before = count;
            increment();
            increment();
            export const observed = before + ':' + count;
        "#,
        "/entry.js",
    ))
    .unwrap();
    assert_eq!(exports["observed"].as_string().unwrap(), "0:2");
}

#[test]
fn host_namespace_modules_resolve_without_source() {
    struct HostModuleResolver;
    impl ModuleResolver for HostModuleResolver {
        fn resolve(
            &self,
            specifier: &str,
            _importer: Option<&str>,
            _context: &ResolveContext<'_>,
        ) -> JsResult<Option<ModuleResolution>> {
            if specifier != "host:config" {
                return Ok(None);
            }
            let mut exports = IndexMap::new();
            exports.insert("version".to_string(), Value::from("1.2.3"));
            exports.insert("retries".to_string(), Value::from(3.0));
            Ok(Some(ModuleResolution::Namespace {
                exports,
                path: "host:config".to_string(),
            }))
        }
    }
    let agent = Agent::new(AgentOptions {
        modules: ModuleOptions {
            enabled: true,
            resolver: Some(Rc::new(HostModuleResolver)),
            ..Default::default()
        },
        ..Default::default()
    })
    .unwrap();
    let exports = block_on(agent.evaluate_module(
        r#"
            import { version, retries } from 'host:config';
            export const summary = version + '/' + retries;
        "#,
        "/entry.js",
    ))
    .unwrap();
    assert_eq!(exports["summary"].as_string().unwrap(), "1.2.3/3");
}

#[test]
fn missing_modules_fail_with_module_error_and_fire_on_error() {
    let resolver = MapResolver::new([]);
    let agent = agent_with_resolver(resolver.clone());
    let error = block_on(agent.evaluate_module("import 'nowhere';", "/entry.js")).unwrap_err();
    assert_eq!(error.kind(), ExceptionType::ModuleError);
    assert!(error.message().contains("nowhere"));
    assert_eq!(resolver.errors.borrow().as_slice(), &["nowhere".to_string()]);
}

#[test]
fn unknown_exports_fail_at_link_time() {
    let resolver = MapResolver::new([("leaf", "export const x = 1;")]);
    let agent = agent_with_resolver(resolver);
    let error = block_on(agent.evaluate_module(
        "import { missing } from 'leaf'; export const y = missing;",
        "/entry.js",
    ))
    .unwrap_err();
    assert_eq!(error.kind(), ExceptionType::ModuleError);
    assert!(error.message().contains("missing"));
}

#[test]
fn depth_limit_is_fatal() {
    let resolver = MapResolver::new([
        ("m0", "import 'm1'; export const x = 0;"),
        ("m1", "import 'm2'; export const x = 1;"),
        ("m2", "import 'm3'; export const x = 2;"),
        ("m3", "export const x = 3;"),
    ]);
    let agent = Agent::new(AgentOptions {
        modules: ModuleOptions {
            enabled: true,
            resolver: Some(resolver),
            max_depth: Some(2),
            ..Default::default()
        },
        ..Default::default()
    })
    .unwrap();
    let error =
        block_on(agent.evaluate_module("import 'm0';", "/entry.js")).unwrap_err();
    assert_eq!(error.kind(), ExceptionType::ModuleError);
    assert!(error.is_fatal());
}

#[test]
fn module_introspection_surface() {
    let resolver = MapResolver::new([("leaf", "export const x = 1;")]);
    let agent = agent_with_resolver(resolver);
    assert!(agent.is_module_system_enabled());

    block_on(agent.evaluate_module("import { x } from 'leaf'; export const y = x;", "/entry.js"))
        .unwrap();

    assert!(agent.is_module_cached("/modules/leaf.js"));
    assert!(agent.is_module_cached("/entry.js"));
    assert_eq!(agent.module_cache_size(), 2);

    let mut paths = agent.loaded_module_paths();
    paths.sort();
    assert_eq!(paths, vec!["/entry.js".to_string(), "/modules/leaf.js".to_string()]);

    let specifiers = agent.loaded_module_specifiers();
    assert!(specifiers.contains(&"leaf".to_string()));

    let metadata = agent.module_metadata("/modules/leaf.js").unwrap();
    assert_eq!(metadata.specifier, "leaf");
    assert_eq!(metadata.status, warden_vm::ModuleStatus::Initialized);
    assert_eq!(metadata.importer_chain, vec!["/entry.js".to_string()]);

    let exports = agent.module_exports("/modules/leaf.js").unwrap();
    assert_eq!(exports["x"].as_number(), Some(1.0));
    let exports = agent.module_exports_by_specifier("leaf").unwrap();
    assert_eq!(exports["x"].as_number(), Some(1.0));

    agent.clear_module_cache();
    assert_eq!(agent.module_cache_size(), 0);
}

#[test]
fn disabling_the_cache_reloads_per_evaluation() {
    let resolver = MapResolver::new([("leaf", "export const x = 1;")]);
    let agent = Agent::new(AgentOptions {
        modules: ModuleOptions {
            enabled: true,
            resolver: Some(resolver.clone()),
            cache: Some(false),
            ..Default::default()
        },
        ..Default::default()
    })
    .unwrap();
    let entry = "import { x } from 'leaf'; export const y = x;";
    block_on(agent.evaluate_module(entry, "/entry.js")).unwrap();
    block_on(agent.evaluate_module(entry, "/entry.js")).unwrap();
    let leaf_loads = resolver
        .loads
        .borrow()
        .iter()
        .filter(|specifier| specifier.as_str() == "leaf")
        .count();
    assert_eq!(leaf_loads, 2);
}

#[test]
fn modules_disabled_by_default() {
    let agent = Agent::new(AgentOptions::default()).unwrap();
    assert!(!agent.is_module_system_enabled());
    let error = block_on(agent.evaluate_module("export const x = 1;", "/entry.js")).unwrap_err();
    assert_eq!(error.kind(), ExceptionType::ModuleError);
}

#[test]
fn deterministic_evaluation_order() {
    let sources = [
        ("a", "order.push('a');"),
        ("b", "import 'a'; order.push('b');"),
        ("c", "import 'a'; import 'b'; order.push('c');"),
    ];
    let run = || {
        let resolver = MapResolver::new(sources);
        let order = Rc::new(RefCell::new(Vec::<String>::new()));
        let order_clone = order.clone();
        let push = warden_vm::HostFunction::new("push", move |_this, arguments| {
            let text = match &arguments[0] {
                Value::String(text) => text.as_str().to_string(),
                other => other.type_of().to_string(),
            };
            order_clone.borrow_mut().push(text);
            Ok(Value::Undefined)
        });
        let mut push_holder = IndexMap::new();
        push_holder.insert("push", push);
        let mut globals = IndexMap::new();
        globals.insert("order".to_string(), Value::host_object(push_holder));
        let agent = Agent::new(AgentOptions {
            globals,
            modules: ModuleOptions {
                enabled: true,
                resolver: Some(resolver),
                ..Default::default()
            },
            ..Default::default()
        })
        .unwrap();
        block_on(agent.evaluate_module("import 'c'; import 'b';", "/entry.js")).unwrap();
        let result = order.borrow().clone();
        result
    };
    let first = run();
    let second = run();
    assert_eq!(first, vec!["a", "b", "c"]);
    assert_eq!(first, second);
}
