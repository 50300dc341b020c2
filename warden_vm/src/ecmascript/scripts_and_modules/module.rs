// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [16.2 Modules](https://tc39.es/ecma262/#sec-modules)
//!
//! The specifier-resolver-driven module graph: records cached by resolved
//! path, a depth-bounded discovery walk, link-time live export bindings,
//! and deterministic post-order evaluation. Export bindings are
//! indirections into the exporting module's environment, so cyclic imports
//! observe late initialization (with TDZ covering the gap).

use core::cell::{Cell, RefCell};
use core::future::Future;
use core::pin::Pin;
use std::rc::Rc;
use std::time::SystemTime;

use indexmap::IndexMap;
use oxc_ast::ast;

use crate::ecmascript::execution::agent::Agent;
use crate::ecmascript::execution::environments::{BindingKind, Environment};
use crate::ecmascript::execution::errors::{ExceptionType, JsError, JsResult};
use crate::ecmascript::types::language::object::{JsObject, ObjectKind};
use crate::ecmascript::types::{JsString, PropertyKey, Value};
use crate::engine::interpreter::{eval_statement_list, hoist_declarations, ExecutionContext};

use super::source_code::{ParsedModule, SourceCode};

/// What a resolver hands back for a specifier.
pub enum ModuleResolution {
    /// Source text to parse and evaluate.
    Source { code: String, path: String },
    /// A pre-parsed module.
    Ast { module: ParsedModule, path: String },
    /// A host-provided namespace: name → value, no evaluation.
    Namespace {
        exports: IndexMap<String, Value>,
        path: String,
    },
}

/// Context handed to the resolver: the chain of importers that led here.
pub struct ResolveContext<'a> {
    pub importer_chain: &'a [String],
    pub depth: usize,
}

/// The future a [`ModuleResolver::resolve_async`] override returns.
pub type ResolverFuture<'a> =
    Pin<Box<dyn Future<Output = JsResult<Option<ModuleResolution>>> + 'a>>;

/// The host-implemented module source. `resolve` may be overridden with
/// `resolve_async` for IO-bound hosts; `None` means "module not found".
pub trait ModuleResolver {
    fn resolve(
        &self,
        specifier: &str,
        importer: Option<&str>,
        context: &ResolveContext<'_>,
    ) -> JsResult<Option<ModuleResolution>>;

    fn resolve_async<'a>(
        &'a self,
        specifier: &'a str,
        importer: Option<&'a str>,
        context: &'a ResolveContext<'_>,
    ) -> ResolverFuture<'a> {
        let result = self.resolve(specifier, importer, context);
        Box::pin(core::future::ready(result))
    }

    /// Fires once per unique resolved path per cache lifetime.
    fn on_load(&self, specifier: &str, path: &str) {
        let _ = (specifier, path);
    }

    /// Fires when loading or evaluating `specifier` fails.
    fn on_error(&self, specifier: &str, importer: Option<&str>, error: &JsError) {
        let _ = (specifier, importer, error);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleStatus {
    Resolving,
    Parsed,
    Linking,
    Evaluating,
    Initialized,
    Failed,
}

/// Host-facing module record metadata.
#[derive(Debug, Clone)]
pub struct ModuleMetadata {
    pub specifier: String,
    pub path: String,
    pub status: ModuleStatus,
    pub loaded_at: SystemTime,
    pub importer_chain: Vec<String>,
}

/// One export of a module.
#[derive(Debug, Clone)]
pub(crate) enum ExportEntry {
    /// A binding in this module's own environment.
    Local { name: JsString },
    /// Re-export: resolves through another module.
    Indirect {
        module: Rc<ModuleRecord>,
        export: JsString,
    },
    /// `export * as ns from "x"`: the whole namespace object.
    NamespaceOf { module: Rc<ModuleRecord> },
    /// Host-provided namespace value.
    Direct(Value),
}

#[derive(Debug)]
pub(crate) struct ModuleRecord {
    specifier: String,
    path: String,
    status: Cell<ModuleStatus>,
    environment: Environment,
    exports: RefCell<IndexMap<JsString, ExportEntry>>,
    source: RefCell<Option<Rc<SourceCode>>>,
    namespace_object: RefCell<Option<JsObject>>,
    dependencies: RefCell<Vec<Rc<ModuleRecord>>>,
    importer_chain: Vec<String>,
    loaded_at: SystemTime,
}

impl ModuleRecord {
    pub(crate) fn specifier(&self) -> &str {
        &self.specifier
    }

    pub(crate) fn metadata(&self) -> ModuleMetadata {
        ModuleMetadata {
            specifier: self.specifier.clone(),
            path: self.path.clone(),
            status: self.status.get(),
            loaded_at: self.loaded_at,
            importer_chain: self.importer_chain.clone(),
        }
    }

    /// Snapshot of every export's current value, for the host.
    pub(crate) fn exports_snapshot(
        self: &Rc<Self>,
        agent: &Agent,
    ) -> JsResult<IndexMap<String, Value>> {
        let names: Vec<JsString> = self.exports.borrow().keys().cloned().collect();
        let mut snapshot = IndexMap::new();
        for name in names {
            let value = read_export(agent, self, &name)?;
            snapshot.insert(name.as_str().to_string(), value);
        }
        Ok(snapshot)
    }
}

/// The internal slot of a module namespace object.
#[derive(Debug)]
pub(crate) struct NamespaceData {
    pub(crate) module: Rc<ModuleRecord>,
}

// Namespace object behavior (consulted from the object operations).

pub(crate) fn namespace_get(
    agent: &Agent,
    object: &JsObject,
    key: &PropertyKey,
) -> JsResult<Value> {
    let module = namespace_module(object);
    let PropertyKey::String(name) = key else {
        return Ok(Value::Undefined);
    };
    let Some(module) = module else {
        return Ok(Value::Undefined);
    };
    if !module.exports.borrow().contains_key(name) {
        return Ok(Value::Undefined);
    }
    read_export(agent, &module, name)
}

pub(crate) fn namespace_has(object: &JsObject, key: &PropertyKey) -> JsResult<bool> {
    let Some(module) = namespace_module(object) else {
        return Ok(false);
    };
    match key {
        PropertyKey::String(name) => Ok(module.exports.borrow().contains_key(name)),
        _ => Ok(false),
    }
}

pub(crate) fn namespace_keys(object: &JsObject) -> Vec<PropertyKey> {
    let Some(module) = namespace_module(object) else {
        return Vec::new();
    };
    let mut names: Vec<JsString> = module.exports.borrow().keys().cloned().collect();
    names.sort();
    names.into_iter().map(PropertyKey::String).collect()
}

fn namespace_module(object: &JsObject) -> Option<Rc<ModuleRecord>> {
    match &object.data().kind {
        ObjectKind::Namespace(data) => Some(data.module.clone()),
        _ => None,
    }
}

/// The namespace exotic object of a module: every export including
/// `default`, non-extensible, writes throw.
pub(crate) fn namespace_object(record: &Rc<ModuleRecord>) -> JsObject {
    if let Some(existing) = record.namespace_object.borrow().as_ref() {
        return existing.clone();
    }
    let object = JsObject::new(
        None,
        ObjectKind::Namespace(NamespaceData {
            module: record.clone(),
        }),
    );
    object.prevent_extensions();
    *record.namespace_object.borrow_mut() = Some(object.clone());
    object
}

/// Resolves one export name to a readable value, following re-export
/// chains.
fn read_export(agent: &Agent, record: &Rc<ModuleRecord>, name: &JsString) -> JsResult<Value> {
    let entry = record.exports.borrow().get(name).cloned();
    match entry {
        Some(ExportEntry::Local { name }) => record.environment.lookup(&name),
        Some(ExportEntry::Indirect { module, export }) => read_export(agent, &module, &export),
        Some(ExportEntry::NamespaceOf { module }) => {
            Ok(Value::Object(namespace_object(&module)))
        }
        Some(ExportEntry::Direct(value)) => Ok(value),
        None => Err(agent.throw_exception(
            ExceptionType::ModuleError,
            format!(
                "Module '{}' does not export '{name}'",
                record.specifier
            ),
        )),
    }
}

/// Where an export binding physically lives, for live import links.
enum ResolvedExport {
    Binding { environment: Environment, name: JsString },
    Value(Value),
    Namespace(Rc<ModuleRecord>),
}

fn resolve_export_binding(
    agent: &Agent,
    record: &Rc<ModuleRecord>,
    name: &JsString,
    importer: &str,
) -> JsResult<ResolvedExport> {
    let entry = record.exports.borrow().get(name).cloned();
    match entry {
        Some(ExportEntry::Local { name }) => Ok(ResolvedExport::Binding {
            environment: record.environment.clone(),
            name,
        }),
        Some(ExportEntry::Indirect { module, export }) => {
            resolve_export_binding(agent, &module, &export, importer)
        }
        Some(ExportEntry::NamespaceOf { module }) => Ok(ResolvedExport::Namespace(module)),
        Some(ExportEntry::Direct(value)) => Ok(ResolvedExport::Value(value)),
        None => Err(agent.throw_exception(
            ExceptionType::ModuleError,
            format!(
                "'{}' (imported by '{importer}') does not export '{name}'",
                record.specifier
            ),
        )),
    }
}

// Graph building.

/// Evaluates an entry module from source text and returns its exports.
pub(crate) async fn evaluate_entry_module(
    agent: Agent,
    source_text: &str,
    path: &str,
) -> JsResult<IndexMap<String, Value>> {
    if !agent.is_module_system_enabled() {
        return Err(agent.throw_exception(
            ExceptionType::ModuleError,
            "The module system is disabled for this agent",
        ));
    }
    let cache_enabled = agent.module_options().cache.unwrap_or(true);
    if !cache_enabled {
        agent.clear_module_cache();
    }

    let source = SourceCode::parse(source_text, path)?;
    let record = create_source_record(&agent, path, path, source, Vec::new());
    agent.module_cache_insert(path.to_string(), record.clone());

    // Failures below dependency level were already reported through
    // on_error at their own import site.
    if let Err(error) = build_and_link(&agent, &record, 0).await {
        record.status.set(ModuleStatus::Failed);
        return Err(error);
    }
    if let Err(error) = evaluate_record(&agent, &record).await {
        record.status.set(ModuleStatus::Failed);
        return Err(error);
    }
    record.exports_snapshot(&agent)
}

fn notify_error(agent: &Agent, record: &ModuleRecord, importer: Option<&str>, error: &JsError) {
    if let Some(resolver) = agent.module_resolver() {
        resolver.on_error(&record.specifier, importer, error);
    }
}

fn create_source_record(
    agent: &Agent,
    specifier: &str,
    path: &str,
    source: Rc<SourceCode>,
    importer_chain: Vec<String>,
) -> Rc<ModuleRecord> {
    Rc::new(ModuleRecord {
        specifier: specifier.to_string(),
        path: path.to_string(),
        status: Cell::new(ModuleStatus::Parsed),
        environment: Environment::new_module(agent.global_environment()),
        exports: RefCell::new(IndexMap::new()),
        source: RefCell::new(Some(source)),
        namespace_object: RefCell::new(None),
        dependencies: RefCell::new(Vec::new()),
        importer_chain,
        loaded_at: SystemTime::now(),
    })
}

fn create_namespace_record(
    agent: &Agent,
    specifier: &str,
    path: &str,
    exports: IndexMap<String, Value>,
    importer_chain: Vec<String>,
) -> Rc<ModuleRecord> {
    let record = Rc::new(ModuleRecord {
        specifier: specifier.to_string(),
        path: path.to_string(),
        status: Cell::new(ModuleStatus::Initialized),
        environment: Environment::new_module(agent.global_environment()),
        exports: RefCell::new(IndexMap::new()),
        source: RefCell::new(None),
        namespace_object: RefCell::new(None),
        dependencies: RefCell::new(Vec::new()),
        importer_chain,
        loaded_at: SystemTime::now(),
    });
    let mut entries = record.exports.borrow_mut();
    for (name, value) in exports {
        entries.insert(JsString::from(name), ExportEntry::Direct(value));
    }
    drop(entries);
    record
}

/// Loads (or finds cached) the module `specifier` names, as imported from
/// `importer`.
fn load_module<'a>(
    agent: &'a Agent,
    specifier: &'a str,
    importer: &'a Rc<ModuleRecord>,
    depth: usize,
) -> Pin<Box<dyn Future<Output = JsResult<Rc<ModuleRecord>>> + 'a>> {
    Box::pin(async move {
        let max_depth = agent.module_options().max_depth.unwrap_or(32);
        if depth > max_depth {
            return Err(agent
                .throw_exception(
                    ExceptionType::ModuleError,
                    format!("Module graph exceeds the maximum depth of {max_depth}"),
                )
                .into_fatal());
        }
        let Some(resolver) = agent.module_resolver() else {
            return Err(agent.throw_exception(
                ExceptionType::ModuleError,
                format!("Cannot resolve module '{specifier}': no resolver configured"),
            ));
        };

        let mut chain = importer.importer_chain.clone();
        chain.push(importer.path.clone());
        let context = ResolveContext {
            importer_chain: &chain,
            depth,
        };
        let resolution = resolver
            .resolve_async(specifier, Some(&importer.path), &context)
            .await
            .map_err(|error| {
                resolver.on_error(specifier, Some(&importer.path), &error);
                error
            })?;
        let Some(resolution) = resolution else {
            let error = agent.throw_exception(
                ExceptionType::ModuleError,
                format!("Module not found: '{specifier}'"),
            );
            resolver.on_error(specifier, Some(&importer.path), &error);
            return Err(error);
        };

        let (record, path) = match resolution {
            ModuleResolution::Source { code, path } => {
                if let Some(cached) = agent.module_cache_get(&path) {
                    return Ok(cached);
                }
                let source = match SourceCode::parse(&code, &path) {
                    Ok(source) => source,
                    Err(error) => {
                        resolver.on_error(specifier, Some(&importer.path), &error);
                        return Err(error);
                    }
                };
                (
                    create_source_record(agent, specifier, &path, source, chain.clone()),
                    path,
                )
            }
            ModuleResolution::Ast { module, path } => {
                if let Some(cached) = agent.module_cache_get(&path) {
                    return Ok(cached);
                }
                (
                    create_source_record(agent, specifier, &path, module.0, chain.clone()),
                    path,
                )
            }
            ModuleResolution::Namespace { exports, path } => {
                if let Some(cached) = agent.module_cache_get(&path) {
                    return Ok(cached);
                }
                let record =
                    create_namespace_record(agent, specifier, &path, exports, chain.clone());
                (record, path)
            }
        };
        log::debug!("loaded module '{specifier}' -> '{path}'");
        agent.module_cache_insert(path, record.clone());
        resolver.on_load(specifier, &record.path);

        if record.source.borrow().is_some() {
            if let Err(error) = build_and_link(agent, &record, depth + 1).await {
                record.status.set(ModuleStatus::Failed);
                notify_error(agent, &record, Some(&importer.path), &error);
                return Err(error);
            }
        }
        Ok(record)
    })
}

/// Requested specifiers of a module body, in source order, deduplicated.
fn requested_specifiers(program: &'static ast::Program<'static>) -> Vec<&'static str> {
    let mut specifiers: Vec<&'static str> = Vec::new();
    let mut push = |specifier: &'static str| {
        if !specifiers.contains(&specifier) {
            specifiers.push(specifier);
        }
    };
    for statement in &program.body {
        match statement {
            ast::Statement::ImportDeclaration(import) => push(import.source.value.as_str()),
            ast::Statement::ExportNamedDeclaration(export) => {
                if let Some(source) = &export.source {
                    push(source.value.as_str());
                }
            }
            ast::Statement::ExportAllDeclaration(export) => push(export.source.value.as_str()),
            _ => {}
        }
    }
    specifiers
}

/// Discovers and links a parsed module: loads dependencies, registers
/// export entries, declares import indirections.
async fn build_and_link(
    agent: &Agent,
    record: &Rc<ModuleRecord>,
    depth: usize,
) -> JsResult<()> {
    if record.status.get() != ModuleStatus::Parsed {
        return Ok(());
    }
    record.status.set(ModuleStatus::Linking);

    let source = record
        .source
        .borrow()
        .clone()
        .expect("linking requires a parsed source");
    let program = source.program();

    // 1. Register local export entries first: cyclic importers resolve
    //    against them while this module is still linking.
    {
        let mut exports = record.exports.borrow_mut();
        for statement in &program.body {
            match statement {
                ast::Statement::ExportNamedDeclaration(export) => {
                    if let Some(declaration) = &export.declaration {
                        for name in declaration_names(declaration) {
                            exports.insert(name.clone(), ExportEntry::Local { name });
                        }
                    }
                    if export.source.is_none() {
                        for specifier in &export.specifiers {
                            let local = module_export_name(&specifier.local);
                            let exported = module_export_name(&specifier.exported);
                            exports.insert(exported, ExportEntry::Local { name: local });
                        }
                    }
                }
                ast::Statement::ExportDefaultDeclaration(_) => {
                    exports.insert(
                        JsString::new("default"),
                        ExportEntry::Local {
                            name: JsString::new("*default*"),
                        },
                    );
                }
                _ => {}
            }
        }
    }

    // 2. Load dependencies (transitively linking them).
    let mut dependency_map: IndexMap<&'static str, Rc<ModuleRecord>> = IndexMap::new();
    for specifier in requested_specifiers(program) {
        let dependency = load_module(agent, specifier, record, depth).await?;
        dependency_map.insert(specifier, dependency.clone());
        record.dependencies.borrow_mut().push(dependency);
    }

    // 3. Named re-exports, then star re-exports (first-writer-wins, locals
    //    shadow).
    {
        let mut exports = record.exports.borrow_mut();
        for statement in &program.body {
            if let ast::Statement::ExportNamedDeclaration(export) = statement {
                if let Some(source) = &export.source {
                    let dependency = dependency_map
                        .get(source.value.as_str())
                        .expect("dependency was just loaded")
                        .clone();
                    for specifier in &export.specifiers {
                        let local = module_export_name(&specifier.local);
                        let exported = module_export_name(&specifier.exported);
                        exports.insert(
                            exported,
                            ExportEntry::Indirect {
                                module: dependency.clone(),
                                export: local,
                            },
                        );
                    }
                }
            }
        }
        for statement in &program.body {
            if let ast::Statement::ExportAllDeclaration(export) = statement {
                let dependency = dependency_map
                    .get(export.source.value.as_str())
                    .expect("dependency was just loaded")
                    .clone();
                match &export.exported {
                    Some(alias) => {
                        exports.insert(
                            module_export_name_of(alias),
                            ExportEntry::NamespaceOf {
                                module: dependency,
                            },
                        );
                    }
                    None => {
                        // Star re-export copies the names known now;
                        // `default` never propagates.
                        let names: Vec<JsString> =
                            dependency.exports.borrow().keys().cloned().collect();
                        for name in names {
                            if name == "default" {
                                continue;
                            }
                            if !exports.contains_key(&name) {
                                exports.insert(
                                    name.clone(),
                                    ExportEntry::Indirect {
                                        module: dependency.clone(),
                                        export: name,
                                    },
                                );
                            }
                        }
                    }
                }
            }
        }
    }

    // 4. Declare import bindings: live indirections into the exporting
    //    environments.
    for statement in &program.body {
        let ast::Statement::ImportDeclaration(import) = statement else {
            continue;
        };
        let dependency = dependency_map
            .get(import.source.value.as_str())
            .expect("dependency was just loaded")
            .clone();
        let Some(specifiers) = &import.specifiers else {
            continue;
        };
        for specifier in specifiers {
            match specifier {
                ast::ImportDeclarationSpecifier::ImportSpecifier(import_specifier) => {
                    let imported = module_export_name(&import_specifier.imported);
                    let local = JsString::new(import_specifier.local.name.as_str());
                    link_import(agent, record, &dependency, &imported, &local)?;
                }
                ast::ImportDeclarationSpecifier::ImportDefaultSpecifier(default_specifier) => {
                    let local = JsString::new(default_specifier.local.name.as_str());
                    link_import(
                        agent,
                        record,
                        &dependency,
                        &JsString::new("default"),
                        &local,
                    )?;
                }
                ast::ImportDeclarationSpecifier::ImportNamespaceSpecifier(namespace_specifier) => {
                    let local = JsString::new(namespace_specifier.local.name.as_str());
                    record.environment.declare(&local, BindingKind::Const)?;
                    record
                        .environment
                        .initialize(&local, Value::Object(namespace_object(&dependency)));
                }
            }
        }
    }

    Ok(())
}

fn link_import(
    agent: &Agent,
    record: &Rc<ModuleRecord>,
    dependency: &Rc<ModuleRecord>,
    imported: &JsString,
    local: &JsString,
) -> JsResult<()> {
    match resolve_export_binding(agent, dependency, imported, &record.specifier)? {
        ResolvedExport::Binding { environment, name } => {
            record.environment.declare_indirect(local, &environment, &name)
        }
        ResolvedExport::Value(value) => {
            record.environment.declare(local, BindingKind::Const)?;
            record.environment.initialize(local, value);
            Ok(())
        }
        ResolvedExport::Namespace(module) => {
            record.environment.declare(local, BindingKind::Const)?;
            record
                .environment
                .initialize(local, Value::Object(namespace_object(&module)));
            Ok(())
        }
    }
}

fn declaration_names(declaration: &'static ast::Declaration<'static>) -> Vec<JsString> {
    let mut names = Vec::new();
    match declaration {
        ast::Declaration::VariableDeclaration(variable) => {
            for declarator in &variable.declarations {
                crate::engine::interpreter::patterns::bound_names(&declarator.id, &mut names);
            }
        }
        ast::Declaration::FunctionDeclaration(function) => {
            if let Some(id) = &function.id {
                names.push(JsString::new(id.name.as_str()));
            }
        }
        ast::Declaration::ClassDeclaration(class) => {
            if let Some(id) = &class.id {
                names.push(JsString::new(id.name.as_str()));
            }
        }
        _ => {}
    }
    names
}

fn module_export_name(name: &'static ast::ModuleExportName<'static>) -> JsString {
    module_export_name_of(name)
}

fn module_export_name_of(name: &'static ast::ModuleExportName<'static>) -> JsString {
    match name {
        ast::ModuleExportName::IdentifierName(identifier) => {
            JsString::new(identifier.name.as_str())
        }
        ast::ModuleExportName::IdentifierReference(identifier) => {
            JsString::new(identifier.name.as_str())
        }
        ast::ModuleExportName::StringLiteral(literal) => JsString::new(literal.value.as_str()),
    }
}

/// ### [16.2.1.5.3 Evaluate](https://tc39.es/ecma262/#sec-moduleevaluation)
///
/// Post-order over the dependency graph; a module already `Evaluating` is
/// a cycle member and is skipped (TDZ covers its pending bindings).
fn evaluate_record<'a>(
    agent: &'a Agent,
    record: &'a Rc<ModuleRecord>,
) -> Pin<Box<dyn Future<Output = JsResult<()>> + 'a>> {
    Box::pin(async move {
        match record.status.get() {
            ModuleStatus::Initialized | ModuleStatus::Evaluating => return Ok(()),
            ModuleStatus::Failed => {
                return Err(agent.throw_exception(
                    ExceptionType::ModuleError,
                    format!("Module '{}' failed to load", record.specifier),
                ));
            }
            _ => {}
        }
        record.status.set(ModuleStatus::Evaluating);

        let dependencies: Vec<Rc<ModuleRecord>> = record.dependencies.borrow().clone();
        for dependency in dependencies {
            evaluate_record(agent, &dependency).await?;
        }

        let source = record
            .source
            .borrow()
            .clone()
            .expect("evaluation requires a parsed source");
        let program = source.program();
        let cx = ExecutionContext::for_source(agent.clone(), source.clone(), true);
        hoist_declarations(&cx, &record.environment, &program.body)?;
        match eval_statement_list(&cx, &record.environment, &program.body).await {
            Ok(_) => {
                record.status.set(ModuleStatus::Initialized);
                Ok(())
            }
            Err(error) => {
                record.status.set(ModuleStatus::Failed);
                Err(error)
            }
        }
    })
}
