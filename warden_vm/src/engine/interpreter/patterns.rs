// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [8.6 Runtime Semantics: BindingInitialization](https://tc39.es/ecma262/#sec-runtime-semantics-bindinginitialization)
//!
//! Destructuring, in both flavors: binding patterns (declarations,
//! parameters, catch) and assignment targets. Pattern evaluation is a
//! single traversal over the source value producing bindings or
//! assignments in declaration order.

use oxc_ast::ast;

use crate::ecmascript::abstract_operations::operations_on_iterator_objects::get_iterator;
use crate::ecmascript::abstract_operations::operations_on_objects::{
    get_value_property, own_enumerable_string_keys, set,
};
use crate::ecmascript::builtins::array::array_create;
use crate::ecmascript::builtins::ordinary::create_data_property;
use crate::ecmascript::execution::environments::{BindingKind, Environment};
use crate::ecmascript::execution::errors::{ExceptionType, JsResult};
use crate::ecmascript::types::{JsObject, JsString, PropertyKey, Value};

use super::expressions::{eval_expression, eval_property_key};
use super::{BoxedEval, ExecutionContext};

/// Collects the names a binding pattern declares.
pub(crate) fn bound_names(pattern: &'static ast::BindingPattern<'static>, out: &mut Vec<JsString>) {
    match &pattern.kind {
        ast::BindingPatternKind::BindingIdentifier(identifier) => {
            out.push(JsString::new(identifier.name.as_str()));
        }
        ast::BindingPatternKind::ObjectPattern(object) => {
            for property in &object.properties {
                bound_names(&property.value, out);
            }
            if let Some(rest) = &object.rest {
                bound_names(&rest.argument, out);
            }
        }
        ast::BindingPatternKind::ArrayPattern(array) => {
            for element in array.elements.iter().flatten() {
                bound_names(element, out);
            }
            if let Some(rest) = &array.rest {
                bound_names(&rest.argument, out);
            }
        }
        ast::BindingPatternKind::AssignmentPattern(assignment) => {
            bound_names(&assignment.left, out);
        }
    }
}

fn bind_name(
    env: &Environment,
    name: &JsString,
    value: Value,
    kind: BindingKind,
) -> JsResult<()> {
    match kind {
        BindingKind::Param => {
            env.declare(name, BindingKind::Param)?;
            env.initialize(name, value);
        }
        BindingKind::Var => {
            // Declared by the hoisting pass; the var target holds the slot.
            env.var_target().initialize(name, value);
        }
        _ => {
            // let/const/function: declared (in TDZ) by the hoisting pass.
            env.initialize(name, value);
        }
    }
    Ok(())
}

/// Binds one pattern against a value.
pub(crate) fn bind_pattern<'a>(
    cx: &'a ExecutionContext,
    env: &'a Environment,
    pattern: &'static ast::BindingPattern<'static>,
    value: Value,
    kind: BindingKind,
) -> BoxedEval<'a, JsResult<()>> {
    Box::pin(async move {
        match &pattern.kind {
            ast::BindingPatternKind::BindingIdentifier(identifier) => {
                bind_name(env, &JsString::new(identifier.name.as_str()), value, kind)
            }
            ast::BindingPatternKind::AssignmentPattern(assignment) => {
                let value = if value.is_undefined() {
                    eval_expression(cx, env, &assignment.right).await?
                } else {
                    value
                };
                bind_pattern(cx, env, &assignment.left, value, kind).await
            }
            ast::BindingPatternKind::ObjectPattern(object) => {
                bind_object_pattern(cx, env, object, value, kind).await
            }
            ast::BindingPatternKind::ArrayPattern(array) => {
                bind_array_pattern(cx, env, array, value, kind).await
            }
        }
    })
}

async fn bind_object_pattern(
    cx: &ExecutionContext,
    env: &Environment,
    pattern: &'static ast::ObjectPattern<'static>,
    value: Value,
    kind: BindingKind,
) -> JsResult<()> {
    if value.is_nullish() {
        return Err(cx.agent.throw_exception(
            ExceptionType::TypeError,
            "Cannot destructure a nullish value",
        ));
    }
    let mut consumed: Vec<PropertyKey> = Vec::new();
    for property in &pattern.properties {
        let key = eval_property_key(cx, env, &property.key, property.computed).await?;
        let member = get_value_property(&cx.agent, &value, &key)?;
        consumed.push(key);
        bind_pattern(cx, env, &property.value, member, kind).await?;
    }
    if let Some(rest) = &pattern.rest {
        let rest_object = rest_object_from(cx, &value, &consumed)?;
        bind_pattern(cx, env, &rest.argument, Value::Object(rest_object), kind).await?;
    }
    Ok(())
}

/// `{ ...rest }`: the remaining own enumerable string-keyed properties.
pub(crate) fn rest_object_from(
    cx: &ExecutionContext,
    value: &Value,
    consumed: &[PropertyKey],
) -> JsResult<JsObject> {
    let rest_object =
        crate::ecmascript::builtins::ordinary::ordinary_object_create(&cx.agent);
    if let Some(source) = value.as_object() {
        for key in own_enumerable_string_keys(&cx.agent, source) {
            if consumed.contains(&key) {
                continue;
            }
            let member = get_value_property(&cx.agent, value, &key)?;
            create_data_property(&rest_object, key, member);
        }
    }
    Ok(rest_object)
}

async fn bind_array_pattern(
    cx: &ExecutionContext,
    env: &Environment,
    pattern: &'static ast::ArrayPattern<'static>,
    value: Value,
    kind: BindingKind,
) -> JsResult<()> {
    let mut iterator = get_iterator(&cx.agent, &value)?;
    for element in &pattern.elements {
        let next = iterator.step(&cx.agent)?.unwrap_or(Value::Undefined);
        if let Some(element) = element {
            bind_pattern(cx, env, element, next, kind).await?;
        }
    }
    if let Some(rest) = &pattern.rest {
        let mut values = Vec::new();
        while let Some(next) = iterator.step(&cx.agent)? {
            values.push(next);
        }
        let array = array_create(&cx.agent, values);
        bind_pattern(cx, env, &rest.argument, Value::Object(array), kind).await?;
    } else {
        iterator.close(&cx.agent);
    }
    Ok(())
}

/// ### [10.2.10 FunctionDeclarationInstantiation](https://tc39.es/ecma262/#sec-functiondeclarationinstantiation)
///
/// Parameter binding: defaults evaluate against the environment being
/// built, so later parameters may reference earlier ones; rest collects
/// the remaining arguments.
pub(crate) async fn bind_parameters(
    cx: &ExecutionContext,
    env: &Environment,
    params: &'static ast::FormalParameters<'static>,
    arguments: &[Value],
) -> JsResult<()> {
    for (index, parameter) in params.items.iter().enumerate() {
        let value = arguments.get(index).cloned().unwrap_or(Value::Undefined);
        bind_pattern(cx, env, &parameter.pattern, value, BindingKind::Param).await?;
    }
    if let Some(rest) = &params.rest {
        let remaining: Vec<Value> = arguments
            .iter()
            .skip(params.items.len())
            .cloned()
            .collect();
        let array = array_create(&cx.agent, remaining);
        bind_pattern(
            cx,
            env,
            &rest.argument,
            Value::Object(array),
            BindingKind::Param,
        )
        .await?;
    }
    Ok(())
}

// Assignment-target destructuring: `[a, b] = pair`, `({x} = point)`.

pub(crate) fn assign_to_target<'a>(
    cx: &'a ExecutionContext,
    env: &'a Environment,
    target: &'static ast::AssignmentTarget<'static>,
    value: Value,
) -> BoxedEval<'a, JsResult<()>> {
    Box::pin(async move {
        match target {
            ast::AssignmentTarget::AssignmentTargetIdentifier(identifier) => {
                env.assign(&JsString::new(identifier.name.as_str()), value)
            }
            ast::AssignmentTarget::StaticMemberExpression(member) => {
                let object = eval_expression(cx, env, &member.object).await?;
                assign_member(cx, &object, PropertyKey::from(member.property.name.as_str()), value)
            }
            ast::AssignmentTarget::ComputedMemberExpression(member) => {
                let object = eval_expression(cx, env, &member.object).await?;
                let key = eval_expression(cx, env, &member.expression).await?;
                let key = crate::ecmascript::abstract_operations::type_conversion::to_property_key(
                    &cx.agent, &key,
                )?;
                assign_member(cx, &object, key, value)
            }
            ast::AssignmentTarget::PrivateFieldExpression(member) => {
                let object = eval_expression(cx, env, &member.object).await?;
                super::expressions::private_field_set(
                    cx,
                    &object,
                    member.field.name.as_str(),
                    value,
                )
            }
            ast::AssignmentTarget::ArrayAssignmentTarget(array) => {
                assign_array_target(cx, env, array, value).await
            }
            ast::AssignmentTarget::ObjectAssignmentTarget(object) => {
                assign_object_target(cx, env, object, value).await
            }
            _ => Err(cx.agent.throw_exception(
                ExceptionType::SyntaxError,
                "Unsupported assignment target",
            )),
        }
    })
}

pub(crate) fn assign_member(
    cx: &ExecutionContext,
    object: &Value,
    key: PropertyKey,
    value: Value,
) -> JsResult<()> {
    let Some(object) = object.as_object() else {
        return Err(cx.agent.throw_exception(
            ExceptionType::TypeError,
            format!(
                "Cannot set properties of {} (setting '{}')",
                object.type_of(),
                key.to_display_string()
            ),
        ));
    };
    set(&cx.agent, object, &key, value)
}

async fn assign_maybe_default(
    cx: &ExecutionContext,
    env: &Environment,
    target: &'static ast::AssignmentTargetMaybeDefault<'static>,
    value: Value,
) -> JsResult<()> {
    if let ast::AssignmentTargetMaybeDefault::AssignmentTargetWithDefault(with_default) = target {
        let value = if value.is_undefined() {
            eval_expression(cx, env, &with_default.init).await?
        } else {
            value
        };
        return assign_to_target(cx, env, &with_default.binding, value).await;
    }
    let Some(target) = target.as_assignment_target() else {
        return Err(cx.agent.throw_exception(
            ExceptionType::SyntaxError,
            "Unsupported assignment target",
        ));
    };
    assign_to_target(cx, env, target, value).await
}

async fn assign_array_target(
    cx: &ExecutionContext,
    env: &Environment,
    pattern: &'static ast::ArrayAssignmentTarget<'static>,
    value: Value,
) -> JsResult<()> {
    let mut iterator = get_iterator(&cx.agent, &value)?;
    for element in &pattern.elements {
        let next = iterator.step(&cx.agent)?.unwrap_or(Value::Undefined);
        if let Some(element) = element {
            assign_maybe_default(cx, env, element, next).await?;
        }
    }
    if let Some(rest) = &pattern.rest {
        let mut values = Vec::new();
        while let Some(next) = iterator.step(&cx.agent)? {
            values.push(next);
        }
        let array = array_create(&cx.agent, values);
        assign_to_target(cx, env, &rest.target, Value::Object(array)).await?;
    } else {
        iterator.close(&cx.agent);
    }
    Ok(())
}

async fn assign_object_target(
    cx: &ExecutionContext,
    env: &Environment,
    pattern: &'static ast::ObjectAssignmentTarget<'static>,
    value: Value,
) -> JsResult<()> {
    if value.is_nullish() {
        return Err(cx.agent.throw_exception(
            ExceptionType::TypeError,
            "Cannot destructure a nullish value",
        ));
    }
    let mut consumed: Vec<PropertyKey> = Vec::new();
    for property in &pattern.properties {
        match property {
            ast::AssignmentTargetProperty::AssignmentTargetPropertyIdentifier(shorthand) => {
                let name = JsString::new(shorthand.binding.name.as_str());
                let key = PropertyKey::from_string(name.clone());
                let mut member = get_value_property(&cx.agent, &value, &key)?;
                if member.is_undefined() {
                    if let Some(default) = &shorthand.init {
                        member = eval_expression(cx, env, default).await?;
                    }
                }
                consumed.push(key);
                env.assign(&name, member)?;
            }
            ast::AssignmentTargetProperty::AssignmentTargetPropertyProperty(renamed) => {
                let key = eval_property_key(cx, env, &renamed.name, renamed.computed).await?;
                let member = get_value_property(&cx.agent, &value, &key)?;
                consumed.push(key);
                assign_maybe_default(cx, env, &renamed.binding, member).await?;
            }
        }
    }
    if let Some(rest) = &pattern.rest {
        let rest_object = rest_object_from(cx, &value, &consumed)?;
        assign_to_target(cx, env, &rest.target, Value::Object(rest_object)).await?;
    }
    Ok(())
}
