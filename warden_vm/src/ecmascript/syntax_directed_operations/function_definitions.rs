// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [15.2 Runtime Semantics: Function Definitions](https://tc39.es/ecma262/#sec-function-definitions)
//!
//! Turning `ast::Function` / `ast::ArrowFunctionExpression` nodes into
//! closure objects that capture their defining environment.

use core::cell::RefCell;
use std::rc::Rc;

use oxc_ast::ast;

use crate::ecmascript::execution::agent::Agent;
use crate::ecmascript::execution::environments::Environment;
use crate::ecmascript::scripts_and_modules::source_code::SourceCode;
use crate::ecmascript::types::language::function::{
    ClassFieldInitializer, ConstructorStatus, EcmascriptFunctionData, FunctionData, FunctionKind,
    ThisMode,
};
use crate::ecmascript::types::language::object::{JsObject, ObjectKind};
use crate::ecmascript::types::property_descriptor::PropertySlot;
use crate::ecmascript::types::{JsFunction, JsString, PropertyKey, Value};

use super::class_definitions::PrivateEnvironment;

pub(crate) struct OrdinaryFunctionCreateParams<'a> {
    pub(crate) environment: &'a Environment,
    pub(crate) private_environment: Option<PrivateEnvironment>,
    pub(crate) source: Rc<SourceCode>,
    pub(crate) parameters_list: Option<&'static ast::FormalParameters<'static>>,
    pub(crate) body: Option<&'static ast::FunctionBody<'static>>,
    pub(crate) is_concise_arrow_function: bool,
    pub(crate) is_async: bool,
    pub(crate) is_generator: bool,
    pub(crate) lexical_this: bool,
    pub(crate) constructor_status: ConstructorStatus,
    pub(crate) fields: Vec<ClassFieldInitializer>,
    pub(crate) name: JsString,
}

/// ### [10.2.3 OrdinaryFunctionCreate](https://tc39.es/ecma262/#sec-ordinaryfunctioncreate)
pub(crate) fn ordinary_function_create(
    agent: &Agent,
    params: OrdinaryFunctionCreateParams<'_>,
) -> JsFunction {
    let data = EcmascriptFunctionData {
        environment: params.environment.clone(),
        private_environment: params.private_environment,
        source: params.source,
        params: params.parameters_list,
        body: params.body,
        this_mode: if params.lexical_this {
            ThisMode::Lexical
        } else {
            ThisMode::Dynamic
        },
        is_async: params.is_async,
        is_generator: params.is_generator,
        is_concise_arrow: params.is_concise_arrow_function,
        constructor_status: params.constructor_status,
        home_object: RefCell::new(None),
        fields: params.fields,
    };
    let function_data = FunctionData {
        name: RefCell::new(params.name.clone()),
        kind: FunctionKind::Ecmascript(data),
    };
    let object = JsObject::new(
        Some(agent.intrinsics().function_prototype.clone()),
        ObjectKind::Function(function_data),
    );
    set_function_name(&object, &params.name);
    JsFunction(object)
}

/// ### [10.2.9 SetFunctionName](https://tc39.es/ecma262/#sec-setfunctionname)
pub(crate) fn set_function_name(function: &JsObject, name: &JsString) {
    function.insert_slot(
        PropertyKey::from("name"),
        PropertySlot::Data {
            value: Value::String(name.clone()),
            writable: false,
            enumerable: false,
            configurable: true,
        },
    );
    if let ObjectKind::Function(data) = &function.data().kind {
        *data.name.borrow_mut() = name.clone();
    }
}

/// ### [10.2.5 MakeConstructor](https://tc39.es/ecma262/#sec-makeconstructor)
///
/// Gives a plain function its `prototype` object with a back-pointing
/// `constructor` property.
pub(crate) fn make_constructor(agent: &Agent, function: &JsFunction) {
    let prototype = JsObject::ordinary(Some(agent.intrinsics().object_prototype.clone()));
    prototype.insert_slot(
        PropertyKey::from("constructor"),
        PropertySlot::method(Value::Function(function.clone())),
    );
    function.object().insert_slot(
        PropertyKey::from("prototype"),
        PropertySlot::Data {
            value: Value::Object(prototype),
            writable: true,
            enumerable: false,
            configurable: false,
        },
    );
}

/// ### [15.2.4 InstantiateOrdinaryFunctionObject](https://tc39.es/ecma262/#sec-runtime-semantics-instantiateordinaryfunctionobject)
///
/// Used for both declarations (hoisted with their value) and expressions.
pub(crate) fn instantiate_ordinary_function_object(
    agent: &Agent,
    function: &'static ast::Function<'static>,
    environment: &Environment,
    private_environment: Option<PrivateEnvironment>,
    source: Rc<SourceCode>,
) -> JsFunction {
    let name = function
        .id
        .as_ref()
        .map(|id| JsString::new(id.name.as_str()))
        .unwrap_or_else(|| JsString::new("default"));
    let constructor_status = if function.r#async || function.generator {
        ConstructorStatus::NotConstructor
    } else {
        ConstructorStatus::Constructor
    };
    let closure = ordinary_function_create(
        agent,
        OrdinaryFunctionCreateParams {
            environment,
            private_environment,
            source,
            parameters_list: Some(&function.params),
            body: function.body.as_deref(),
            is_concise_arrow_function: false,
            is_async: function.r#async,
            is_generator: function.generator,
            lexical_this: false,
            constructor_status,
            fields: Vec::new(),
            name,
        },
    );
    if constructor_status == ConstructorStatus::Constructor {
        make_constructor(agent, &closure);
    }
    closure
}

/// ### [15.3.4 InstantiateArrowFunctionExpression](https://tc39.es/ecma262/#sec-runtime-semantics-instantiatearrowfunctionexpression)
pub(crate) fn instantiate_arrow_function_expression(
    agent: &Agent,
    arrow: &'static ast::ArrowFunctionExpression<'static>,
    environment: &Environment,
    private_environment: Option<PrivateEnvironment>,
    source: Rc<SourceCode>,
) -> JsFunction {
    ordinary_function_create(
        agent,
        OrdinaryFunctionCreateParams {
            environment,
            private_environment,
            source,
            parameters_list: Some(&arrow.params),
            body: Some(&arrow.body),
            is_concise_arrow_function: arrow.expression,
            is_async: arrow.r#async,
            is_generator: false,
            lexical_this: true,
            constructor_status: ConstructorStatus::NotConstructor,
            fields: Vec::new(),
            name: JsString::new(""),
        },
    )
}

/// The callable arity window for the strict argument-count check: the
/// required count stops at the first defaulted or patterned-with-default
/// parameter, the maximum is unbounded once a rest parameter appears.
pub(crate) fn arity_bounds(params: &ast::FormalParameters<'_>) -> (usize, Option<usize>) {
    let mut required = 0usize;
    let mut seen_default = false;
    for parameter in &params.items {
        if matches!(
            parameter.pattern.kind,
            ast::BindingPatternKind::AssignmentPattern(_)
        ) {
            seen_default = true;
        } else if !seen_default {
            required += 1;
        }
    }
    let maximum = if params.rest.is_some() {
        None
    } else {
        Some(params.items.len())
    };
    (required, maximum)
}
