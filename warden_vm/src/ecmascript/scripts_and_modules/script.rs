// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [16.1 Scripts](https://tc39.es/ecma262/#sec-scripts)
//!
//! Script evaluation. Each evaluation runs in a fresh scope over the
//! shared global record: declarations do not leak between `evaluate`
//! calls, globals and intrinsics persist for the agent's lifetime.

use std::rc::Rc;

use oxc_ast::ast;

use crate::ecmascript::execution::agent::Agent;
use crate::ecmascript::execution::environments::Environment;
use crate::ecmascript::execution::errors::{ExceptionType, JsResult};
use crate::ecmascript::types::Value;
use crate::engine::interpreter::{eval_statement_list, hoist_declarations, ExecutionContext};

use super::source_code::SourceCode;

/// Evaluates a parsed script; the result is the value of the last
/// top-level expression statement, or `undefined`.
pub(crate) async fn evaluate_parsed_script(
    agent: Agent,
    source: Rc<SourceCode>,
) -> JsResult<Value> {
    let program = source.program();
    // Scripts are parsed in module goal for strictness and top-level
    // await, but module syntax stays module-only.
    for statement in &program.body {
        if matches!(
            statement,
            ast::Statement::ImportDeclaration(_)
                | ast::Statement::ExportAllDeclaration(_)
                | ast::Statement::ExportDefaultDeclaration(_)
                | ast::Statement::ExportNamedDeclaration(_)
        ) {
            return Err(agent.throw_exception(
                ExceptionType::SyntaxError,
                "import/export statements are only valid in modules",
            ));
        }
    }

    // A function-kind scope so top-level `var` stays inside this
    // evaluation; `lexical_this` keeps `this` resolving to the (undefined)
    // global `this`.
    let script_scope = Environment::new_function(agent.global_environment(), true);
    let cx = ExecutionContext::for_source(agent.clone(), source.clone(), false);
    hoist_declarations(&cx, &script_scope, &program.body)?;
    let completion = eval_statement_list(&cx, &script_scope, &program.body).await?;
    Ok(completion.value())
}
