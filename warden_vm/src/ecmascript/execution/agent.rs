// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [9.7 Agents](https://tc39.es/ecma262/#sec-agents)
//!
//! The embedding surface: one `Agent` is one isolated sandbox. Two agents
//! share nothing. All interpreter state hangs off the agent; the handle is
//! a cheap clone.

use core::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::ecmascript::builtins::control_abstraction_objects::{
    await_value, poll_promise_once,
};
use crate::ecmascript::scripts_and_modules::module::{
    ModuleMetadata, ModuleRecord, ModuleResolver,
};
use crate::ecmascript::scripts_and_modules::script;
use crate::ecmascript::scripts_and_modules::source_code::SourceCode;
use crate::ecmascript::types::language::object::JsObject;
use crate::ecmascript::types::{JsString, JsSymbol, Value};
use crate::engine::feature_gate::FeaturePolicy;
use crate::sandbox::barrier::FORBIDDEN_GLOBAL_NAMES;
use crate::sandbox::stack_sanitizer;

use super::environments::Environment;
use super::errors::{ExceptionType, JsError, JsResult};
use super::realm::{Intrinsics, Realm};

/// Module system configuration.
#[derive(Clone, Default)]
pub struct ModuleOptions {
    pub enabled: bool,
    pub resolver: Option<Rc<dyn ModuleResolver>>,
    /// Cache module records by resolved path (default). Disabling forces
    /// re-resolution and re-evaluation on every entry evaluation.
    pub cache: Option<bool>,
    /// Import graph depth bound; exceeding it is a fatal `ModuleError`.
    pub max_depth: Option<usize>,
}

/// Security toggles carried per agent, never process-wide.
#[derive(Debug, Clone)]
pub struct SecurityOptions {
    /// Rewrite host paths in stack traces (default true).
    pub sanitize_stack_traces: bool,
    /// Replace messages of errors raised by host callables with a neutral
    /// marker (default true).
    pub hide_host_error_messages: bool,
}

impl Default for SecurityOptions {
    fn default() -> Self {
        Self {
            sanitize_stack_traces: true,
            hide_host_error_messages: true,
        }
    }
}

/// Construction options; every field has a working default.
#[derive(Default)]
pub struct AgentOptions {
    /// Host values exposed as globals, wrapped lazily by the barrier.
    pub globals: IndexMap<String, Value>,
    pub modules: ModuleOptions,
    pub security: SecurityOptions,
    pub feature_control: FeaturePolicy,
    /// Cooperative cancellation: polled between statements.
    pub cancellation: Option<Arc<AtomicBool>>,
}

pub(crate) struct StackFrame {
    name: JsString,
    path: String,
}

/// The sandboxed interpreter instance.
#[derive(Clone)]
pub struct Agent(Rc<AgentInner>);

pub(crate) struct AgentInner {
    realm: Realm,
    security: SecurityOptions,
    feature_policy: FeaturePolicy,
    modules: ModuleOptions,
    cancellation: Option<Arc<AtomicBool>>,
    symbol_ids: Cell<u64>,
    private_ids: Cell<u64>,
    random_state: Cell<u64>,
    module_cache: RefCell<IndexMap<String, Rc<ModuleRecord>>>,
    pending_jobs: RefCell<VecDeque<JsObject>>,
    call_stack: RefCell<Vec<StackFrame>>,
}

impl Agent {
    /// Builds an agent. Fails with a `SecurityError` when a global is named
    /// after a code-synthesis intrinsic (`Function`, `eval`, `Proxy`, …).
    pub fn new(options: AgentOptions) -> Result<Agent, JsError> {
        for name in options.globals.keys() {
            if FORBIDDEN_GLOBAL_NAMES.contains(&name.as_str()) {
                return Err(JsError::new(
                    ExceptionType::SecurityError,
                    format!("Global '{name}' is not allowed in the sandbox"),
                ));
            }
        }
        let host_globals: IndexMap<JsString, Value> = options
            .globals
            .into_iter()
            .map(|(name, value)| (JsString::from(name), value))
            .collect();
        let realm = Realm::initialize(host_globals);
        Ok(Agent(Rc::new(AgentInner {
            realm,
            security: options.security,
            feature_policy: options.feature_control,
            modules: options.modules,
            cancellation: options.cancellation,
            symbol_ids: Cell::new(16),
            private_ids: Cell::new(1),
            random_state: Cell::new(0x9E37_79B9_7F4A_7C15),
            module_cache: RefCell::new(IndexMap::new()),
            pending_jobs: RefCell::new(VecDeque::new()),
            call_stack: RefCell::new(Vec::new()),
        })))
    }

    // Entry points.

    /// Synchronous evaluation. Fails if the script reaches a suspension
    /// point (top-level `await` on an unsettled promise).
    pub fn evaluate(&self, source_text: &str) -> JsResult<Value> {
        let source = SourceCode::parse(source_text, "<script>")?;
        let future = script::evaluate_parsed_script(self.clone(), source);
        let result = match futures_lite::future::block_on(futures_lite::future::poll_once(
            core::pin::pin!(future),
        )) {
            Some(result) => result,
            None => Err(self.throw_exception(
                ExceptionType::Generic,
                "Script attempted to suspend during synchronous evaluation",
            )),
        };
        self.run_jobs_once();
        result
    }

    /// Asynchronous evaluation: `await`, async functions and generators
    /// run freely; the returned future completes when the script and its
    /// settled jobs do. A promise completion value is awaited.
    pub async fn evaluate_async(&self, source_text: &str) -> JsResult<Value> {
        let source = SourceCode::parse(source_text, "<script>")?;
        let value = script::evaluate_parsed_script(self.clone(), source).await?;
        let value = await_value(value).await?;
        self.run_jobs().await;
        Ok(value)
    }

    /// Evaluates a module graph rooted at `source_text` and returns its
    /// exports.
    pub async fn evaluate_module(
        &self,
        source_text: &str,
        path: &str,
    ) -> JsResult<IndexMap<String, Value>> {
        let exports = crate::ecmascript::scripts_and_modules::module::evaluate_entry_module(
            self.clone(),
            source_text,
            path,
        )
        .await?;
        self.run_jobs().await;
        Ok(exports)
    }

    /// Reads a property off a value, through the same paths sandbox code
    /// uses (including the barrier for wrapped host objects).
    pub fn get_property(&self, value: &Value, key: &str) -> JsResult<Value> {
        crate::ecmascript::abstract_operations::operations_on_objects::get_value_property(
            self,
            value,
            &crate::ecmascript::types::PropertyKey::from(key),
        )
    }

    /// Reads an array element.
    pub fn get_element(&self, value: &Value, index: u32) -> JsResult<Value> {
        crate::ecmascript::abstract_operations::operations_on_objects::get_value_property(
            self,
            value,
            &crate::ecmascript::types::PropertyKey::Index(index),
        )
    }

    /// Renders a value the way diagnostics do: `toString` semantics for
    /// primitives, `[ .. ]` for arrays.
    pub fn display_value(&self, value: &Value) -> JsResult<String> {
        if let Some(object) = value.as_object() {
            if object.is_array() {
                return crate::ecmascript::builtins::array::display_array(self, object)
                    .map(|text| text.as_str().to_string());
            }
        }
        crate::ecmascript::abstract_operations::type_conversion::to_string(self, value)
            .map(|text| text.as_str().to_string())
    }

    // Module introspection.

    pub fn is_module_system_enabled(&self) -> bool {
        self.0.modules.enabled
    }

    pub fn is_module_cached(&self, path: &str) -> bool {
        self.0.module_cache.borrow().contains_key(path)
    }

    pub fn loaded_module_paths(&self) -> Vec<String> {
        self.0.module_cache.borrow().keys().cloned().collect()
    }

    pub fn loaded_module_specifiers(&self) -> Vec<String> {
        self.0
            .module_cache
            .borrow()
            .values()
            .map(|record| record.specifier().to_string())
            .collect()
    }

    pub fn module_metadata(&self, path: &str) -> Option<ModuleMetadata> {
        self.0
            .module_cache
            .borrow()
            .get(path)
            .map(|record| record.metadata())
    }

    pub fn module_exports(&self, path: &str) -> Option<IndexMap<String, Value>> {
        let record = self.0.module_cache.borrow().get(path).cloned()?;
        record.exports_snapshot(self).ok()
    }

    pub fn module_exports_by_specifier(
        &self,
        specifier: &str,
    ) -> Option<IndexMap<String, Value>> {
        let record = self
            .0
            .module_cache
            .borrow()
            .values()
            .find(|record| record.specifier() == specifier)
            .cloned()?;
        record.exports_snapshot(self).ok()
    }

    pub fn module_cache_size(&self) -> usize {
        self.0.module_cache.borrow().len()
    }

    pub fn clear_module_cache(&self) {
        log::debug!(
            "clearing module cache ({} records)",
            self.0.module_cache.borrow().len()
        );
        self.0.module_cache.borrow_mut().clear();
    }

    // Internals.

    pub(crate) fn intrinsics(&self) -> &Intrinsics {
        &self.0.realm.intrinsics
    }

    pub(crate) fn global_environment(&self) -> &Environment {
        &self.0.realm.global_environment
    }

    pub(crate) fn feature_policy(&self) -> &FeaturePolicy {
        &self.0.feature_policy
    }

    pub(crate) fn module_options(&self) -> &ModuleOptions {
        &self.0.modules
    }

    pub(crate) fn module_resolver(&self) -> Option<Rc<dyn ModuleResolver>> {
        self.0.modules.resolver.clone()
    }

    pub(crate) fn module_cache_get(&self, path: &str) -> Option<Rc<ModuleRecord>> {
        self.0.module_cache.borrow().get(path).cloned()
    }

    pub(crate) fn module_cache_insert(&self, path: String, record: Rc<ModuleRecord>) {
        self.0.module_cache.borrow_mut().insert(path, record);
    }

    pub(crate) fn sanitize_stack_traces(&self) -> bool {
        self.0.security.sanitize_stack_traces
    }

    /// Builds a sandbox error carrying the current (sanitized) stack.
    pub(crate) fn throw_exception(
        &self,
        kind: ExceptionType,
        message: impl Into<String>,
    ) -> JsError {
        let message = message.into();
        let stack = self.render_stack(kind, &message);
        JsError::with_stack(kind, message, stack)
    }

    pub(crate) fn throw_exception_with_static_message(
        &self,
        kind: ExceptionType,
        message: &'static str,
    ) -> JsError {
        self.throw_exception(kind, message)
    }

    /// Converts an error raised by a host callable: the message is hidden
    /// behind a neutral marker unless the host opted out, and the original
    /// host error never becomes sandbox-readable.
    pub(crate) fn convert_host_error(&self, error: JsError) -> JsError {
        if self.0.security.hide_host_error_messages {
            self.throw_exception(error.kind(), "[error details hidden]")
        } else {
            self.throw_exception(error.kind(), error.message())
        }
    }

    pub(crate) fn generator_return_error(&self, value: Value) -> JsError {
        JsError::generator_return(value)
    }

    fn render_stack(&self, kind: ExceptionType, message: &str) -> String {
        let mut out = if message.is_empty() {
            kind.as_str().to_string()
        } else {
            format!("{kind}: {message}")
        };
        for frame in self.0.call_stack.borrow().iter().rev() {
            out.push_str("\n    at ");
            if frame.name.is_empty() {
                out.push_str("<anonymous>");
            } else {
                out.push_str(frame.name.as_str());
            }
            out.push_str(" (");
            out.push_str(&frame.path);
            out.push(')');
        }
        if self.0.security.sanitize_stack_traces {
            stack_sanitizer::sanitize_stack(&out)
        } else {
            out
        }
    }

    pub(crate) fn current_stack_string(&self) -> String {
        self.render_stack(ExceptionType::Generic, "")
    }

    pub(crate) fn push_frame(&self, name: &JsString, path: &str) {
        self.0.call_stack.borrow_mut().push(StackFrame {
            name: name.clone(),
            path: path.to_string(),
        });
    }

    pub(crate) fn pop_frame(&self) {
        self.0.call_stack.borrow_mut().pop();
    }

    /// Cooperative cancellation check, run between statements. The error is
    /// fatal: `try/catch` cannot swallow it.
    pub(crate) fn check_cancelled(&self) -> JsResult<()> {
        if let Some(flag) = &self.0.cancellation {
            if flag.load(Ordering::Relaxed) {
                return Err(self
                    .throw_exception(ExceptionType::Generic, "Execution cancelled by host")
                    .into_fatal());
            }
        }
        Ok(())
    }

    pub(crate) fn create_symbol(&self, description: Option<JsString>) -> JsSymbol {
        let id = self.0.symbol_ids.get();
        self.0.symbol_ids.set(id + 1);
        JsSymbol::new(id, description)
    }

    pub(crate) fn next_private_id(&self) -> u64 {
        let id = self.0.private_ids.get();
        self.0.private_ids.set(id + 1);
        id
    }

    /// xorshift64*, deterministic per agent. Good enough for scripts, not
    /// for cryptography.
    pub(crate) fn next_random(&self) -> f64 {
        let mut state = self.0.random_state.get();
        state ^= state >> 12;
        state ^= state << 25;
        state ^= state >> 27;
        self.0.random_state.set(state);
        let bits = state.wrapping_mul(0x2545_F491_4F6C_DD1D) >> 11;
        bits as f64 / (1u64 << 53) as f64
    }

    /// Parks a pending promise so unawaited async work still gets driven.
    pub(crate) fn enqueue_job(&self, promise: JsObject) {
        self.0.pending_jobs.borrow_mut().push_back(promise);
    }

    /// Drives parked jobs to completion, FIFO, awaiting host futures.
    pub(crate) async fn run_jobs(&self) {
        loop {
            let next = self.0.pending_jobs.borrow_mut().pop_front();
            let Some(promise) = next else {
                break;
            };
            if let Err(error) =
                crate::ecmascript::builtins::control_abstraction_objects::await_promise(promise)
                    .await
            {
                log::debug!("unhandled promise rejection: {error}");
            }
        }
    }

    /// One synchronous sweep over parked jobs: each gets a single poll;
    /// still-pending jobs stay parked.
    pub(crate) fn run_jobs_once(&self) {
        let count = self.0.pending_jobs.borrow().len();
        for _ in 0..count {
            let next = self.0.pending_jobs.borrow_mut().pop_front();
            let Some(promise) = next else {
                break;
            };
            if !poll_promise_once(&promise) {
                self.0.pending_jobs.borrow_mut().push_back(promise);
            }
        }
    }
}

impl core::fmt::Debug for Agent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Agent")
            .field("modules_enabled", &self.0.modules.enabled)
            .finish_non_exhaustive()
    }
}
