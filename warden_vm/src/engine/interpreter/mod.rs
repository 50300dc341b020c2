// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The tree-walking evaluator: statement evaluation, hoisting, and the
//! execution context threaded through it. The walker is written as
//! recursive boxed futures; the three suspension points (`await`, `yield`,
//! `for await..of`) surface as pending polls.

pub(crate) mod expressions;
pub(crate) mod functions;
pub(crate) mod patterns;

use core::future::Future;
use core::pin::Pin;
use std::rc::Rc;

use oxc_ast::ast;

use crate::ecmascript::abstract_operations::operations_on_iterator_objects::{
    get_async_iterator, get_iterator, unwrap_iter_result, IteratorRecord,
};
use crate::ecmascript::abstract_operations::operations_on_objects::enumerate_for_in_keys;
use crate::ecmascript::abstract_operations::testing_and_comparison::is_strictly_equal;
use crate::ecmascript::builtins::control_abstraction_objects::{await_value, GeneratorChannel};
use crate::ecmascript::builtins::error::{error_from_thrown_value, error_to_catch_value};
use crate::ecmascript::execution::agent::Agent;
use crate::ecmascript::execution::environments::{BindingKind, Environment};
use crate::ecmascript::execution::errors::{ExceptionType, JsResult};
use crate::ecmascript::scripts_and_modules::source_code::SourceCode;
use crate::ecmascript::syntax_directed_operations::class_definitions::{
    evaluate_class, PrivateEnvironment,
};
use crate::ecmascript::syntax_directed_operations::function_definitions::instantiate_ordinary_function_object;
use crate::ecmascript::types::language::object::JsObject;
use crate::ecmascript::types::{JsFunction, JsString, Value};
use crate::engine::completion::{Completion, CompletionResult};

use self::expressions::eval_expression;
use self::patterns::{bind_pattern, bound_names};

/// A boxed recursion point in the evaluator.
pub(crate) type BoxedEval<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Everything a nested evaluation needs beyond its environment.
#[derive(Clone)]
pub(crate) struct ExecutionContext {
    pub(crate) agent: Agent,
    /// Keeps the AST alive for the `&'static` node references in flight.
    pub(crate) source: Rc<SourceCode>,
    /// The resume channel of the enclosing generator body, if any.
    pub(crate) channel: Option<Rc<GeneratorChannel>>,
    pub(crate) private_environment: Option<PrivateEnvironment>,
    /// The interpreted function being executed (for `super` and fields).
    pub(crate) current_function: Option<JsFunction>,
    /// During construction: the prototype the instance should get
    /// (threaded to `super()`).
    pub(crate) instance_prototype: Option<JsObject>,
    pub(crate) in_module: bool,
}

impl ExecutionContext {
    pub(crate) fn for_source(agent: Agent, source: Rc<SourceCode>, in_module: bool) -> Self {
        ExecutionContext {
            agent,
            source,
            channel: None,
            private_environment: None,
            current_function: None,
            instance_prototype: None,
            in_module,
        }
    }
}

/// Declaration hoisting for one scope: `var` names surface to the nearest
/// function/module/global record, `let`/`const`/`class` enter the TDZ,
/// function declarations hoist with their value.
pub(crate) fn hoist_declarations(
    cx: &ExecutionContext,
    env: &Environment,
    statements: &'static [ast::Statement<'static>],
) -> JsResult<()> {
    // Pass 1: var names from the whole subtree (function bodies excluded).
    let mut var_names: Vec<JsString> = Vec::new();
    for statement in statements {
        collect_var_names(statement, &mut var_names);
    }
    for name in var_names {
        env.hoist_var(&name)?;
    }
    // Pass 2: lexical declarations at this level.
    for statement in statements {
        match statement {
            ast::Statement::VariableDeclaration(declaration)
                if declaration.kind != ast::VariableDeclarationKind::Var =>
            {
                let kind = lexical_kind(declaration.kind);
                for declarator in &declaration.declarations {
                    let mut names = Vec::new();
                    bound_names(&declarator.id, &mut names);
                    for name in names {
                        env.declare(&name, kind)?;
                    }
                }
            }
            ast::Statement::FunctionDeclaration(function) => {
                if let Some(id) = &function.id {
                    let name = JsString::new(id.name.as_str());
                    env.declare(&name, BindingKind::Function)?;
                    let closure = instantiate_ordinary_function_object(
                        &cx.agent,
                        function,
                        env,
                        cx.private_environment.clone(),
                        cx.source.clone(),
                    );
                    env.initialize(&name, Value::Function(closure));
                }
            }
            ast::Statement::ClassDeclaration(class) => {
                if let Some(id) = &class.id {
                    env.declare(&JsString::new(id.name.as_str()), BindingKind::Let)?;
                }
            }
            ast::Statement::ExportNamedDeclaration(export) => {
                if let Some(ast::Declaration::FunctionDeclaration(function)) = &export.declaration
                {
                    if let Some(id) = &function.id {
                        let name = JsString::new(id.name.as_str());
                        env.declare(&name, BindingKind::Function)?;
                        let closure = instantiate_ordinary_function_object(
                            &cx.agent,
                            function,
                            env,
                            cx.private_environment.clone(),
                            cx.source.clone(),
                        );
                        env.initialize(&name, Value::Function(closure));
                    }
                } else if let Some(ast::Declaration::VariableDeclaration(declaration)) =
                    &export.declaration
                {
                    if declaration.kind != ast::VariableDeclarationKind::Var {
                        let kind = lexical_kind(declaration.kind);
                        for declarator in &declaration.declarations {
                            let mut names = Vec::new();
                            bound_names(&declarator.id, &mut names);
                            for name in names {
                                env.declare(&name, kind)?;
                            }
                        }
                    }
                } else if let Some(ast::Declaration::ClassDeclaration(class)) = &export.declaration
                {
                    if let Some(id) = &class.id {
                        env.declare(&JsString::new(id.name.as_str()), BindingKind::Let)?;
                    }
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn lexical_kind(kind: ast::VariableDeclarationKind) -> BindingKind {
    match kind {
        ast::VariableDeclarationKind::Const => BindingKind::Const,
        _ => BindingKind::Let,
    }
}

/// Var names of a statement subtree, stopping at function boundaries.
fn collect_var_names(statement: &'static ast::Statement<'static>, out: &mut Vec<JsString>) {
    match statement {
        ast::Statement::VariableDeclaration(declaration) => {
            if declaration.kind == ast::VariableDeclarationKind::Var {
                for declarator in &declaration.declarations {
                    bound_names(&declarator.id, out);
                }
            }
        }
        ast::Statement::BlockStatement(block) => {
            for statement in &block.body {
                collect_var_names(statement, out);
            }
        }
        ast::Statement::IfStatement(if_statement) => {
            collect_var_names(&if_statement.consequent, out);
            if let Some(alternate) = &if_statement.alternate {
                collect_var_names(alternate, out);
            }
        }
        ast::Statement::WhileStatement(while_statement) => {
            collect_var_names(&while_statement.body, out);
        }
        ast::Statement::DoWhileStatement(do_while) => collect_var_names(&do_while.body, out),
        ast::Statement::ForStatement(for_statement) => {
            if let Some(ast::ForStatementInit::VariableDeclaration(declaration)) =
                &for_statement.init
            {
                if declaration.kind == ast::VariableDeclarationKind::Var {
                    for declarator in &declaration.declarations {
                        bound_names(&declarator.id, out);
                    }
                }
            }
            collect_var_names(&for_statement.body, out);
        }
        ast::Statement::ForInStatement(for_in) => {
            if let ast::ForStatementLeft::VariableDeclaration(declaration) = &for_in.left {
                if declaration.kind == ast::VariableDeclarationKind::Var {
                    for declarator in &declaration.declarations {
                        bound_names(&declarator.id, out);
                    }
                }
            }
            collect_var_names(&for_in.body, out);
        }
        ast::Statement::ForOfStatement(for_of) => {
            if let ast::ForStatementLeft::VariableDeclaration(declaration) = &for_of.left {
                if declaration.kind == ast::VariableDeclarationKind::Var {
                    for declarator in &declaration.declarations {
                        bound_names(&declarator.id, out);
                    }
                }
            }
            collect_var_names(&for_of.body, out);
        }
        ast::Statement::TryStatement(try_statement) => {
            for statement in &try_statement.block.body {
                collect_var_names(statement, out);
            }
            if let Some(handler) = &try_statement.handler {
                for statement in &handler.body.body {
                    collect_var_names(statement, out);
                }
            }
            if let Some(finalizer) = &try_statement.finalizer {
                for statement in &finalizer.body {
                    collect_var_names(statement, out);
                }
            }
        }
        ast::Statement::SwitchStatement(switch) => {
            for case in &switch.cases {
                for statement in &case.consequent {
                    collect_var_names(statement, out);
                }
            }
        }
        ast::Statement::LabeledStatement(labeled) => collect_var_names(&labeled.body, out),
        ast::Statement::ExportNamedDeclaration(export) => {
            if let Some(ast::Declaration::VariableDeclaration(declaration)) = &export.declaration {
                if declaration.kind == ast::VariableDeclarationKind::Var {
                    for declarator in &declaration.declarations {
                        bound_names(&declarator.id, out);
                    }
                }
            }
        }
        _ => {}
    }
}

/// Evaluates a statement list; the completion value is the value of the
/// last expression statement (the script result convention).
pub(crate) async fn eval_statement_list(
    cx: &ExecutionContext,
    env: &Environment,
    statements: &'static [ast::Statement<'static>],
) -> CompletionResult {
    let mut last_value = Value::Undefined;
    for statement in statements {
        match eval_statement(cx, env, statement).await? {
            Completion::Normal(value) => {
                if !value.is_undefined() || statement_produces_value(statement) {
                    last_value = value;
                }
            }
            abrupt => return Ok(abrupt),
        }
    }
    Ok(Completion::Normal(last_value))
}

fn statement_produces_value(statement: &ast::Statement<'_>) -> bool {
    matches!(statement, ast::Statement::ExpressionStatement(_))
}

/// An unlabeled break/continue targets the nearest loop; a labeled one
/// targets a loop carrying that label.
fn label_matches(label: &Option<JsString>, labels: &[JsString]) -> bool {
    match label {
        None => true,
        Some(name) => labels.contains(name),
    }
}

pub(crate) fn eval_statement<'a>(
    cx: &'a ExecutionContext,
    env: &'a Environment,
    statement: &'static ast::Statement<'static>,
) -> BoxedEval<'a, CompletionResult> {
    Box::pin(async move { eval_statement_with_labels(cx, env, statement, &[]).await })
}

async fn eval_statement_with_labels(
    cx: &ExecutionContext,
    env: &Environment,
    statement: &'static ast::Statement<'static>,
    labels: &[JsString],
) -> CompletionResult {
    let agent = &cx.agent;
    agent.check_cancelled()?;
    match statement {
        ast::Statement::EmptyStatement(_) | ast::Statement::DebuggerStatement(_) => {
            Ok(Completion::Normal(Value::Undefined))
        }
        ast::Statement::ExpressionStatement(expression) => {
            let value = eval_expression(cx, env, &expression.expression).await?;
            Ok(Completion::Normal(value))
        }
        ast::Statement::BlockStatement(block) => {
            let block_env = Environment::new_block(env);
            hoist_declarations(cx, &block_env, &block.body)?;
            eval_statement_list(cx, &block_env, &block.body).await
        }
        ast::Statement::VariableDeclaration(declaration) => {
            eval_variable_declaration(cx, env, declaration).await?;
            Ok(Completion::Normal(Value::Undefined))
        }
        ast::Statement::FunctionDeclaration(_) => {
            // Hoisted with its value.
            Ok(Completion::Normal(Value::Undefined))
        }
        ast::Statement::ClassDeclaration(class) => {
            agent.feature_policy().check("ClassDeclaration")?;
            let constructor = evaluate_class(cx, env, class).await?;
            if let Some(id) = &class.id {
                env.initialize(&JsString::new(id.name.as_str()), constructor);
            }
            Ok(Completion::Normal(Value::Undefined))
        }
        ast::Statement::IfStatement(if_statement) => {
            agent.feature_policy().check("IfStatement")?;
            if eval_expression(cx, env, &if_statement.test).await?.to_boolean() {
                eval_statement(cx, env, &if_statement.consequent).await
            } else if let Some(alternate) = &if_statement.alternate {
                eval_statement(cx, env, alternate).await
            } else {
                Ok(Completion::Normal(Value::Undefined))
            }
        }
        ast::Statement::WhileStatement(while_statement) => {
            agent.feature_policy().check("WhileStatement")?;
            loop {
                agent.check_cancelled()?;
                if !eval_expression(cx, env, &while_statement.test)
                    .await?
                    .to_boolean()
                {
                    break;
                }
                match eval_statement(cx, env, &while_statement.body).await? {
                    Completion::Break(label) => {
                        if label_matches(&label, labels) {
                            break;
                        }
                        return Ok(Completion::Break(label));
                    }
                    Completion::Continue(label) => {
                        if label_matches(&label, labels) {
                            continue;
                        }
                        return Ok(Completion::Continue(label));
                    }
                    Completion::Return(value) => return Ok(Completion::Return(value)),
                    Completion::Normal(_) => {}
                }
            }
            Ok(Completion::Normal(Value::Undefined))
        }
        ast::Statement::DoWhileStatement(do_while) => {
            agent.feature_policy().check("DoWhileStatement")?;
            loop {
                agent.check_cancelled()?;
                match eval_statement(cx, env, &do_while.body).await? {
                    Completion::Break(label) => {
                        if label_matches(&label, labels) {
                            break;
                        }
                        return Ok(Completion::Break(label));
                    }
                    Completion::Continue(label) => {
                        if !label_matches(&label, labels) {
                            return Ok(Completion::Continue(label));
                        }
                    }
                    Completion::Return(value) => return Ok(Completion::Return(value)),
                    Completion::Normal(_) => {}
                }
                if !eval_expression(cx, env, &do_while.test).await?.to_boolean() {
                    break;
                }
            }
            Ok(Completion::Normal(Value::Undefined))
        }
        ast::Statement::ForStatement(for_statement) => {
            agent.feature_policy().check("ForStatement")?;
            eval_for_statement(cx, env, for_statement, labels).await
        }
        ast::Statement::ForInStatement(for_in) => {
            agent.feature_policy().check("ForInStatement")?;
            eval_for_in(cx, env, for_in, labels).await
        }
        ast::Statement::ForOfStatement(for_of) => {
            agent.feature_policy().check("ForOfStatement")?;
            eval_for_of(cx, env, for_of, labels).await
        }
        ast::Statement::ContinueStatement(continue_statement) => Ok(Completion::Continue(
            continue_statement
                .label
                .as_ref()
                .map(|label| JsString::new(label.name.as_str())),
        )),
        ast::Statement::BreakStatement(break_statement) => Ok(Completion::Break(
            break_statement
                .label
                .as_ref()
                .map(|label| JsString::new(label.name.as_str())),
        )),
        ast::Statement::ReturnStatement(return_statement) => {
            let value = match &return_statement.argument {
                Some(argument) => eval_expression(cx, env, argument).await?,
                None => Value::Undefined,
            };
            Ok(Completion::Return(value))
        }
        ast::Statement::LabeledStatement(labeled) => {
            let mut chain: Vec<JsString> = labels.to_vec();
            chain.push(JsString::new(labeled.label.name.as_str()));
            let completion = match &labeled.body {
                // Loops consume their label set directly so `continue label`
                // works.
                body @ (ast::Statement::WhileStatement(_)
                | ast::Statement::DoWhileStatement(_)
                | ast::Statement::ForStatement(_)
                | ast::Statement::ForInStatement(_)
                | ast::Statement::ForOfStatement(_)
                | ast::Statement::LabeledStatement(_)) => {
                    Box::pin(eval_statement_with_labels(cx, env, body, &chain)).await?
                }
                body => eval_statement(cx, env, body).await?,
            };
            match completion {
                Completion::Break(Some(label)) if chain.contains(&label) => {
                    Ok(Completion::Normal(Value::Undefined))
                }
                other => Ok(other),
            }
        }
        ast::Statement::SwitchStatement(switch) => {
            agent.feature_policy().check("SwitchStatement")?;
            eval_switch(cx, env, switch).await
        }
        ast::Statement::ThrowStatement(throw) => {
            let value = eval_expression(cx, env, &throw.argument).await?;
            Err(error_from_thrown_value(agent, value))
        }
        ast::Statement::TryStatement(try_statement) => {
            agent.feature_policy().check("TryStatement")?;
            eval_try(cx, env, try_statement).await
        }
        ast::Statement::ImportDeclaration(_) => {
            if cx.in_module {
                // Bindings were linked before evaluation.
                Ok(Completion::Normal(Value::Undefined))
            } else {
                Err(agent.throw_exception(
                    ExceptionType::SyntaxError,
                    "Cannot use import statement outside a module",
                ))
            }
        }
        ast::Statement::ExportNamedDeclaration(export) => {
            if !cx.in_module {
                return Err(agent.throw_exception(
                    ExceptionType::SyntaxError,
                    "Cannot use export statement outside a module",
                ));
            }
            if let Some(declaration) = &export.declaration {
                eval_declaration(cx, env, declaration).await?;
            }
            Ok(Completion::Normal(Value::Undefined))
        }
        ast::Statement::ExportDefaultDeclaration(export) => {
            if !cx.in_module {
                return Err(agent.throw_exception(
                    ExceptionType::SyntaxError,
                    "Cannot use export statement outside a module",
                ));
            }
            let value = match &export.declaration {
                ast::ExportDefaultDeclarationKind::FunctionDeclaration(function) => {
                    let closure = instantiate_ordinary_function_object(
                        agent,
                        function,
                        env,
                        cx.private_environment.clone(),
                        cx.source.clone(),
                    );
                    if let Some(id) = &function.id {
                        let name = JsString::new(id.name.as_str());
                        // Redeclaration already happened during hoisting.
                        let _ = env.declare(&name, BindingKind::Function);
                        env.initialize(&name, Value::Function(closure.clone()));
                    }
                    Value::Function(closure)
                }
                ast::ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                    let constructor = evaluate_class(cx, env, class).await?;
                    if let Some(id) = &class.id {
                        env.initialize(&JsString::new(id.name.as_str()), constructor.clone());
                    }
                    constructor
                }
                other => {
                    let Some(expression) = other.as_expression() else {
                        return Err(agent.throw_exception(
                            ExceptionType::SyntaxError,
                            "Unsupported default export",
                        ));
                    };
                    eval_expression(cx, env, expression).await?
                }
            };
            let default_name = JsString::new("*default*");
            let _ = env.declare(&default_name, BindingKind::Const);
            env.initialize(&default_name, value);
            Ok(Completion::Normal(Value::Undefined))
        }
        ast::Statement::ExportAllDeclaration(_) => {
            if cx.in_module {
                Ok(Completion::Normal(Value::Undefined))
            } else {
                Err(agent.throw_exception(
                    ExceptionType::SyntaxError,
                    "Cannot use export statement outside a module",
                ))
            }
        }
        _ => Err(agent.throw_exception(
            ExceptionType::SyntaxError,
            "Unsupported statement syntax",
        )),
    }
}

async fn eval_declaration(
    cx: &ExecutionContext,
    env: &Environment,
    declaration: &'static ast::Declaration<'static>,
) -> JsResult<()> {
    match declaration {
        ast::Declaration::VariableDeclaration(variable) => {
            eval_variable_declaration(cx, env, variable).await
        }
        ast::Declaration::FunctionDeclaration(_) => Ok(()),
        ast::Declaration::ClassDeclaration(class) => {
            cx.agent.feature_policy().check("ClassDeclaration")?;
            let constructor = evaluate_class(cx, env, class).await?;
            if let Some(id) = &class.id {
                env.initialize(&JsString::new(id.name.as_str()), constructor);
            }
            Ok(())
        }
        _ => Err(cx.agent.throw_exception(
            ExceptionType::SyntaxError,
            "Unsupported declaration syntax",
        )),
    }
}

async fn eval_variable_declaration(
    cx: &ExecutionContext,
    env: &Environment,
    declaration: &'static ast::VariableDeclaration<'static>,
) -> JsResult<()> {
    let kind = match declaration.kind {
        ast::VariableDeclarationKind::Var => BindingKind::Var,
        ast::VariableDeclarationKind::Const => BindingKind::Const,
        _ => BindingKind::Let,
    };
    for declarator in &declaration.declarations {
        let value = match &declarator.init {
            Some(init) => eval_expression(cx, env, init).await?,
            None => Value::Undefined,
        };
        if declarator.init.is_none() && kind == BindingKind::Var {
            // `var x;` keeps any value the binding already has.
            continue;
        }
        bind_pattern(cx, env, &declarator.id, value, kind).await?;
    }
    Ok(())
}

/// `for(;;)`: block-scoped `let`/`const` init bindings get a fresh copy per
/// iteration, so closures capture that iteration's values.
async fn eval_for_statement(
    cx: &ExecutionContext,
    env: &Environment,
    for_statement: &'static ast::ForStatement<'static>,
    labels: &[JsString],
) -> CompletionResult {
    let agent = &cx.agent;
    let loop_env = Environment::new_block(env);
    let mut per_iteration_names: Vec<JsString> = Vec::new();
    match &for_statement.init {
        Some(ast::ForStatementInit::VariableDeclaration(declaration)) => {
            if declaration.kind != ast::VariableDeclarationKind::Var {
                for declarator in &declaration.declarations {
                    bound_names(&declarator.id, &mut per_iteration_names);
                }
                for name in &per_iteration_names {
                    loop_env.declare(name, lexical_kind(declaration.kind))?;
                }
            } else {
                let mut names = Vec::new();
                for declarator in &declaration.declarations {
                    bound_names(&declarator.id, &mut names);
                }
                for name in &names {
                    env.hoist_var(name)?;
                }
            }
            eval_variable_declaration(cx, &loop_env, declaration).await?;
        }
        Some(init) => {
            if let Some(expression) = init.as_expression() {
                eval_expression(cx, &loop_env, expression).await?;
            }
        }
        None => {}
    }

    // First iteration scope: a copy of the init bindings.
    let mut iteration_env = loop_env.clone();
    if !per_iteration_names.is_empty() {
        let first_env = Environment::new_block(env);
        for name in &per_iteration_names {
            first_env.declare(name, BindingKind::Let)?;
            first_env.initialize(name, loop_env.lookup(name)?);
        }
        iteration_env = first_env;
    }
    loop {
        agent.check_cancelled()?;
        if let Some(test) = &for_statement.test {
            if !eval_expression(cx, &iteration_env, test).await?.to_boolean() {
                break;
            }
        }
        match eval_statement(cx, &iteration_env, &for_statement.body).await? {
            Completion::Break(label) => {
                if label_matches(&label, labels) {
                    break;
                }
                return Ok(Completion::Break(label));
            }
            Completion::Continue(label) => {
                if !label_matches(&label, labels) {
                    return Ok(Completion::Continue(label));
                }
            }
            Completion::Return(value) => return Ok(Completion::Return(value)),
            Completion::Normal(_) => {}
        }
        // Copy the lexical loop variables before the update runs, so
        // closures from this iteration keep this iteration's values.
        if !per_iteration_names.is_empty() {
            let next_env = Environment::new_block(env);
            for name in &per_iteration_names {
                next_env.declare(name, BindingKind::Let)?;
                next_env.initialize(name, iteration_env.lookup(name)?);
            }
            iteration_env = next_env;
        }
        if let Some(update) = &for_statement.update {
            eval_expression(cx, &iteration_env, update).await?;
        }
    }
    Ok(Completion::Normal(Value::Undefined))
}

enum ForTarget {
    Declaration(&'static ast::VariableDeclaration<'static>),
    Assignment(&'static ast::AssignmentTarget<'static>),
}

fn for_left_target(
    cx: &ExecutionContext,
    left: &'static ast::ForStatementLeft<'static>,
) -> JsResult<ForTarget> {
    match left {
        ast::ForStatementLeft::VariableDeclaration(declaration) => {
            Ok(ForTarget::Declaration(declaration))
        }
        other => other
            .as_assignment_target()
            .map(ForTarget::Assignment)
            .ok_or_else(|| {
                cx.agent.throw_exception(
                    ExceptionType::SyntaxError,
                    "Unsupported for-loop binding",
                )
            }),
    }
}

/// Binds the loop variable for one iteration, in a fresh scope for
/// declarations.
async fn bind_for_target(
    cx: &ExecutionContext,
    env: &Environment,
    target: &ForTarget,
    value: Value,
) -> JsResult<Environment> {
    match target {
        ForTarget::Declaration(declaration) => {
            let iteration_env = Environment::new_block(env);
            let kind = match declaration.kind {
                ast::VariableDeclarationKind::Var => BindingKind::Var,
                ast::VariableDeclarationKind::Const => BindingKind::Const,
                _ => BindingKind::Let,
            };
            for declarator in &declaration.declarations {
                if kind == BindingKind::Var {
                    let mut names = Vec::new();
                    bound_names(&declarator.id, &mut names);
                    for name in &names {
                        env.hoist_var(name)?;
                    }
                } else {
                    let mut names = Vec::new();
                    bound_names(&declarator.id, &mut names);
                    for name in &names {
                        iteration_env.declare(name, kind)?;
                    }
                }
                bind_pattern(cx, &iteration_env, &declarator.id, value.clone(), kind).await?;
            }
            Ok(iteration_env)
        }
        ForTarget::Assignment(target) => {
            patterns::assign_to_target(cx, env, target, value).await?;
            Ok(env.clone())
        }
    }
}

/// ### [14.7.5 The for..in Statement](https://tc39.es/ecma262/#sec-for-in-and-for-of-statements)
async fn eval_for_in(
    cx: &ExecutionContext,
    env: &Environment,
    for_in: &'static ast::ForInStatement<'static>,
    labels: &[JsString],
) -> CompletionResult {
    let agent = &cx.agent;
    let source = eval_expression(cx, env, &for_in.right).await?;
    let Some(object) = source.as_object() else {
        return Err(agent.throw_exception(
            ExceptionType::TypeError,
            format!("Cannot enumerate {}", source.type_of()),
        ));
    };
    let target = for_left_target(cx, &for_in.left)?;
    for key in enumerate_for_in_keys(agent, object) {
        agent.check_cancelled()?;
        let key_value = Value::from(key.to_display_string());
        let iteration_env = bind_for_target(cx, env, &target, key_value).await?;
        match eval_statement(cx, &iteration_env, &for_in.body).await? {
            Completion::Break(label) => {
                if label_matches(&label, labels) {
                    break;
                }
                return Ok(Completion::Break(label));
            }
            Completion::Continue(label) => {
                if !label_matches(&label, labels) {
                    return Ok(Completion::Continue(label));
                }
            }
            Completion::Return(value) => return Ok(Completion::Return(value)),
            Completion::Normal(_) => {}
        }
    }
    Ok(Completion::Normal(Value::Undefined))
}

/// `for..of` and `for await..of`.
async fn eval_for_of(
    cx: &ExecutionContext,
    env: &Environment,
    for_of: &'static ast::ForOfStatement<'static>,
    labels: &[JsString],
) -> CompletionResult {
    let agent = &cx.agent;
    if for_of.r#await {
        agent.feature_policy().check("ForAwaitStatement")?;
    }
    let source = eval_expression(cx, env, &for_of.right).await?;
    let mut iterator = if for_of.r#await {
        get_async_iterator(agent, &source)?
    } else {
        get_iterator(agent, &source)?
    };
    let target = for_left_target(cx, &for_of.left)?;
    loop {
        agent.check_cancelled()?;
        let next = if for_of.r#await {
            // Async protocol: the step result may be a promise of the
            // result object, and the value itself may be a promise.
            match iterator.step_raw(agent)? {
                None => None,
                Some(raw) => {
                    let settled = await_value(raw).await?;
                    let unwrapped = if matches!(iterator, IteratorRecord::Protocol { .. }) {
                        unwrap_iter_result(agent, &settled)?
                    } else {
                        Some(settled)
                    };
                    match unwrapped {
                        Some(value) => Some(await_value(value).await?),
                        None => None,
                    }
                }
            }
        } else {
            iterator.step(agent)?
        };
        let Some(value) = next else {
            break;
        };
        let iteration_env = bind_for_target(cx, env, &target, value).await?;
        match eval_statement(cx, &iteration_env, &for_of.body).await? {
            Completion::Break(label) => {
                if label_matches(&label, labels) {
                    iterator.close(agent);
                    break;
                }
                iterator.close(agent);
                return Ok(Completion::Break(label));
            }
            Completion::Continue(label) => {
                if !label_matches(&label, labels) {
                    iterator.close(agent);
                    return Ok(Completion::Continue(label));
                }
            }
            Completion::Return(value) => {
                iterator.close(agent);
                return Ok(Completion::Return(value));
            }
            Completion::Normal(_) => {}
        }
    }
    Ok(Completion::Normal(Value::Undefined))
}

/// ### [14.12 The switch Statement](https://tc39.es/ecma262/#sec-switch-statement)
async fn eval_switch(
    cx: &ExecutionContext,
    env: &Environment,
    switch: &'static ast::SwitchStatement<'static>,
) -> CompletionResult {
    let agent = &cx.agent;
    let discriminant = eval_expression(cx, env, &switch.discriminant).await?;
    let switch_env = Environment::new_block(env);
    for case in &switch.cases {
        hoist_declarations(cx, &switch_env, &case.consequent)?;
    }

    // Select the first strictly-equal case; fall back to default.
    let mut start_index: Option<usize> = None;
    for (index, case) in switch.cases.iter().enumerate() {
        if let Some(test) = &case.test {
            let test_value = eval_expression(cx, &switch_env, test).await?;
            if is_strictly_equal(&discriminant, &test_value) {
                start_index = Some(index);
                break;
            }
        }
    }
    if start_index.is_none() {
        start_index = switch.cases.iter().position(|case| case.test.is_none());
    }
    let Some(start_index) = start_index else {
        return Ok(Completion::Normal(Value::Undefined));
    };

    // Fall through from the selected case until a break.
    let mut last_value = Value::Undefined;
    for case in &switch.cases[start_index..] {
        for statement in &case.consequent {
            match Box::pin(eval_statement_with_labels(cx, &switch_env, statement, &[])).await? {
                Completion::Normal(value) => {
                    if !value.is_undefined() {
                        last_value = value;
                    }
                }
                Completion::Break(None) => return Ok(Completion::Normal(last_value)),
                abrupt => return Ok(abrupt),
            }
        }
    }
    Ok(Completion::Normal(last_value))
}

/// ### [14.15 The try Statement](https://tc39.es/ecma262/#sec-try-statement)
async fn eval_try(
    cx: &ExecutionContext,
    env: &Environment,
    try_statement: &'static ast::TryStatement<'static>,
) -> CompletionResult {
    let agent = &cx.agent;
    let block_env = Environment::new_block(env);
    hoist_declarations(cx, &block_env, &try_statement.block.body)?;
    let mut result = eval_statement_list(cx, &block_env, &try_statement.block.body).await;

    if let Err(error) = &result {
        let catchable =
            !error.is_fatal() && error.as_generator_return().is_none();
        if catchable {
            if let Some(handler) = &try_statement.handler {
                let catch_env = Environment::new_catch(env);
                if let Some(parameter) = &handler.param {
                    let caught = error_to_catch_value(agent, error);
                    patterns::bind_pattern(
                        cx,
                        &catch_env,
                        &parameter.pattern,
                        caught,
                        BindingKind::Param,
                    )
                    .await?;
                }
                hoist_declarations(cx, &catch_env, &handler.body.body)?;
                result = eval_statement_list(cx, &catch_env, &handler.body.body).await;
            }
        }
    }

    if let Some(finalizer) = &try_statement.finalizer {
        let finally_env = Environment::new_block(env);
        hoist_declarations(cx, &finally_env, &finalizer.body)?;
        let finally_result = eval_statement_list(cx, &finally_env, &finalizer.body).await?;
        // An abrupt completion from finally overrides try/catch.
        if finally_result.is_abrupt() {
            return Ok(finally_result);
        }
    }
    result
}
