// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [13 ECMAScript Language: Expressions](https://tc39.es/ecma262/#sec-ecmascript-language-expressions)

use oxc_ast::ast;
use oxc_syntax::operator::{
    AssignmentOperator, BinaryOperator, LogicalOperator, UnaryOperator, UpdateOperator,
};

use crate::ecmascript::abstract_operations::operations_on_iterator_objects::{
    get_iterator, iterator_to_list,
};
use crate::ecmascript::abstract_operations::operations_on_objects::{
    delete_property, get_value_property, has_property, ordinary_has_instance,
    own_enumerable_string_keys,
};
use crate::ecmascript::abstract_operations::testing_and_comparison::{
    compare_values, is_loosely_equal, is_strictly_equal,
};
use crate::ecmascript::abstract_operations::type_conversion::{
    to_number, to_numeric, to_primitive, to_property_key, to_string, Numeric, PreferredType,
};
use crate::ecmascript::builtins::array::array_create;
use crate::ecmascript::builtins::control_abstraction_objects::{
    await_value, perform_yield, YieldResume,
};
use crate::ecmascript::builtins::error::error_from_thrown_value;
use crate::ecmascript::builtins::ordinary::{create_data_property, ordinary_object_create};
use crate::ecmascript::execution::environments::Environment;
use crate::ecmascript::execution::errors::{ExceptionType, JsResult};
use crate::ecmascript::syntax_directed_operations::class_definitions::{
    define_method, evaluate_class, set_home_object,
};
use crate::ecmascript::syntax_directed_operations::function_definitions::{
    instantiate_arrow_function_expression, instantiate_ordinary_function_object,
    ordinary_function_create, OrdinaryFunctionCreateParams,
};
use crate::ecmascript::types::language::function::ConstructorStatus;
use crate::ecmascript::types::language::object::ObjectKind;
use crate::ecmascript::types::property_descriptor::PropertySlot;
use crate::ecmascript::types::{JsBigInt, JsString, PropertyKey, Value};

use super::functions::{call_function, construct, parent_constructor, run_field_initializers};
use super::{BoxedEval, ExecutionContext};

pub(crate) fn eval_expression<'a>(
    cx: &'a ExecutionContext,
    env: &'a Environment,
    expression: &'static ast::Expression<'static>,
) -> BoxedEval<'a, JsResult<Value>> {
    Box::pin(async move {
        let agent = &cx.agent;
        let gate = cx.agent.feature_policy();
        match expression {
            ast::Expression::NullLiteral(_) => Ok(Value::Null),
            ast::Expression::BooleanLiteral(literal) => Ok(Value::Boolean(literal.value)),
            ast::Expression::NumericLiteral(literal) => Ok(Value::Number(literal.value)),
            ast::Expression::StringLiteral(literal) => {
                Ok(Value::from(literal.value.as_str()))
            }
            ast::Expression::BigIntLiteral(literal) => {
                gate.check("BigIntLiteral")?;
                let digits: String = literal
                    .value
                    .as_str()
                    .trim_end_matches('n')
                    .chars()
                    .filter(|ch| *ch != '_')
                    .collect();
                JsBigInt::from_literal_digits(&digits)
                    .map(Value::BigInt)
                    .ok_or_else(|| {
                        agent.throw_exception(
                            ExceptionType::SyntaxError,
                            "Invalid BigInt literal",
                        )
                    })
            }
            ast::Expression::RegExpLiteral(_) => {
                gate.check("RegExpLiteral")?;
                Err(agent.throw_exception(
                    ExceptionType::SyntaxError,
                    "Regular expression literals are not supported",
                ))
            }
            ast::Expression::TemplateLiteral(template) => {
                gate.check("TemplateLiteral")?;
                eval_template_literal(cx, env, template).await
            }
            ast::Expression::TaggedTemplateExpression(tagged) => {
                gate.check("TaggedTemplateExpression")?;
                eval_tagged_template(cx, env, tagged).await
            }
            ast::Expression::Identifier(identifier) => {
                env.lookup(&JsString::new(identifier.name.as_str()))
            }
            ast::Expression::ThisExpression(_) => env.get_this(),
            ast::Expression::Super(_) => Err(agent.throw_exception(
                ExceptionType::SyntaxError,
                "'super' keyword unexpected here",
            )),
            ast::Expression::MetaProperty(meta) => {
                if meta.meta.name == "import" {
                    return Err(agent.throw_exception(
                        ExceptionType::SyntaxError,
                        "import.meta is not supported",
                    ));
                }
                // new.target is not tracked.
                Ok(Value::Undefined)
            }
            ast::Expression::ImportExpression(_) => Err(agent.throw_exception(
                ExceptionType::SyntaxError,
                "Dynamic import() is not supported; use static imports",
            )),
            ast::Expression::ArrayExpression(array) => eval_array_literal(cx, env, array).await,
            ast::Expression::ObjectExpression(object) => {
                eval_object_literal(cx, env, object).await
            }
            ast::Expression::ParenthesizedExpression(inner) => {
                eval_expression(cx, env, &inner.expression).await
            }
            ast::Expression::SequenceExpression(sequence) => {
                let mut result = Value::Undefined;
                for expression in &sequence.expressions {
                    result = eval_expression(cx, env, expression).await?;
                }
                Ok(result)
            }
            ast::Expression::ConditionalExpression(conditional) => {
                if eval_expression(cx, env, &conditional.test).await?.to_boolean() {
                    eval_expression(cx, env, &conditional.consequent).await
                } else {
                    eval_expression(cx, env, &conditional.alternate).await
                }
            }
            ast::Expression::UnaryExpression(unary) => eval_unary(cx, env, unary).await,
            ast::Expression::UpdateExpression(update) => eval_update(cx, env, update).await,
            ast::Expression::BinaryExpression(binary) => {
                let left = eval_expression(cx, env, &binary.left).await?;
                let right = eval_expression(cx, env, &binary.right).await?;
                apply_binary_operator(cx, binary.operator, &left, &right)
            }
            ast::Expression::PrivateInExpression(private_in) => {
                gate.check("PrivateField")?;
                let value = eval_expression(cx, env, &private_in.right).await?;
                let id = resolve_private_id(cx, private_in.left.name.as_str())?;
                Ok(Value::Boolean(
                    value
                        .as_object()
                        .map(|object| object.has_private(id))
                        .unwrap_or(false),
                ))
            }
            ast::Expression::LogicalExpression(logical) => {
                let left = eval_expression(cx, env, &logical.left).await?;
                match logical.operator {
                    LogicalOperator::And => {
                        if left.to_boolean() {
                            eval_expression(cx, env, &logical.right).await
                        } else {
                            Ok(left)
                        }
                    }
                    LogicalOperator::Or => {
                        if left.to_boolean() {
                            Ok(left)
                        } else {
                            eval_expression(cx, env, &logical.right).await
                        }
                    }
                    LogicalOperator::Coalesce => {
                        gate.check("NullishCoalescing")?;
                        if left.is_nullish() {
                            eval_expression(cx, env, &logical.right).await
                        } else {
                            Ok(left)
                        }
                    }
                }
            }
            ast::Expression::AssignmentExpression(assignment) => {
                eval_assignment(cx, env, assignment).await
            }
            ast::Expression::StaticMemberExpression(member) => {
                if matches!(member.object, ast::Expression::Super(_)) {
                    let home_value = super_property(cx, env, member.property.name.as_str())?;
                    return Ok(home_value);
                }
                let object = eval_expression(cx, env, &member.object).await?;
                if member.optional {
                    gate.check("OptionalChaining")?;
                    if object.is_nullish() {
                        return Ok(Value::Undefined);
                    }
                }
                get_value_property(
                    agent,
                    &object,
                    &PropertyKey::from(member.property.name.as_str()),
                )
            }
            ast::Expression::ComputedMemberExpression(member) => {
                if matches!(member.object, ast::Expression::Super(_)) {
                    let key = eval_expression(cx, env, &member.expression).await?;
                    let key = to_property_key(agent, &key)?;
                    return super_property_by_key(cx, env, &key);
                }
                let object = eval_expression(cx, env, &member.object).await?;
                if member.optional {
                    gate.check("OptionalChaining")?;
                    if object.is_nullish() {
                        return Ok(Value::Undefined);
                    }
                }
                let key = eval_expression(cx, env, &member.expression).await?;
                let key = to_property_key(agent, &key)?;
                get_value_property(agent, &object, &key)
            }
            ast::Expression::PrivateFieldExpression(member) => {
                gate.check("PrivateField")?;
                let object = eval_expression(cx, env, &member.object).await?;
                private_field_get(cx, &object, member.field.name.as_str())
            }
            ast::Expression::ChainExpression(chain) => {
                gate.check("OptionalChaining")?;
                Ok(eval_chain_element(cx, env, &chain.expression)
                    .await?
                    .unwrap_or(Value::Undefined))
            }
            ast::Expression::CallExpression(call) => {
                eval_call_expression(cx, env, call).await
            }
            ast::Expression::NewExpression(new) => {
                let callee = eval_expression(cx, env, &new.callee).await?;
                let arguments = eval_arguments(cx, env, &new.arguments).await?;
                let Some(function) = callee.as_function().cloned() else {
                    return Err(agent.throw_exception(
                        ExceptionType::TypeError,
                        format!("{} is not a constructor", callee.type_of()),
                    ));
                };
                construct(agent.clone(), function, arguments, None).await
            }
            ast::Expression::FunctionExpression(function) => {
                Ok(Value::Function(instantiate_ordinary_function_object(
                    agent,
                    function,
                    env,
                    cx.private_environment.clone(),
                    cx.source.clone(),
                )))
            }
            ast::Expression::ArrowFunctionExpression(arrow) => {
                gate.check("ArrowFunctionExpression")?;
                Ok(Value::Function(instantiate_arrow_function_expression(
                    agent,
                    arrow,
                    env,
                    cx.private_environment.clone(),
                    cx.source.clone(),
                )))
            }
            ast::Expression::ClassExpression(class) => {
                gate.check("ClassExpression")?;
                evaluate_class(cx, env, class).await
            }
            ast::Expression::AwaitExpression(await_expression) => {
                gate.check("AwaitExpression")?;
                let value = eval_expression(cx, env, &await_expression.argument).await?;
                await_value(value).await
            }
            ast::Expression::YieldExpression(yield_expression) => {
                gate.check("YieldExpression")?;
                eval_yield(cx, env, yield_expression).await
            }
            _ => Err(agent.throw_exception(
                ExceptionType::SyntaxError,
                "Unsupported expression syntax",
            )),
        }
    })
}

/// Property keys in literals and classes: identifiers and literals are
/// static, computed keys evaluate.
pub(crate) async fn eval_property_key(
    cx: &ExecutionContext,
    env: &Environment,
    key: &'static ast::PropertyKey<'static>,
    computed: bool,
) -> JsResult<PropertyKey> {
    match key {
        ast::PropertyKey::StaticIdentifier(identifier) => {
            Ok(PropertyKey::from(identifier.name.as_str()))
        }
        ast::PropertyKey::PrivateIdentifier(_) => Err(cx.agent.throw_exception(
            ExceptionType::SyntaxError,
            "Unexpected private name",
        )),
        _ => {
            let Some(expression) = key.as_expression() else {
                return Err(cx.agent.throw_exception(
                    ExceptionType::SyntaxError,
                    "Unsupported property key",
                ));
            };
            let _ = computed;
            let value = eval_expression(cx, env, expression).await?;
            to_property_key(&cx.agent, &value)
        }
    }
}

async fn eval_template_literal(
    cx: &ExecutionContext,
    env: &Environment,
    template: &'static ast::TemplateLiteral<'static>,
) -> JsResult<Value> {
    let mut out = String::new();
    for (index, quasi) in template.quasis.iter().enumerate() {
        match &quasi.value.cooked {
            Some(cooked) => out.push_str(cooked.as_str()),
            None => out.push_str(quasi.value.raw.as_str()),
        }
        if let Some(expression) = template.expressions.get(index) {
            let value = eval_expression(cx, env, expression).await?;
            out.push_str(to_string(&cx.agent, &value)?.as_str());
        }
    }
    Ok(Value::from(out))
}

async fn eval_tagged_template(
    cx: &ExecutionContext,
    env: &Environment,
    tagged: &'static ast::TaggedTemplateExpression<'static>,
) -> JsResult<Value> {
    let tag = eval_expression(cx, env, &tagged.tag).await?;
    let Some(tag) = tag.as_function().cloned() else {
        return Err(cx.agent.throw_exception(
            ExceptionType::TypeError,
            "Tagged template tag is not a function",
        ));
    };
    let mut cooked: Vec<Value> = Vec::new();
    let mut raw: Vec<Value> = Vec::new();
    for quasi in &tagged.quasi.quasis {
        cooked.push(
            quasi
                .value
                .cooked
                .as_ref()
                .map(|text| Value::from(text.as_str()))
                .unwrap_or(Value::Undefined),
        );
        raw.push(Value::from(quasi.value.raw.as_str()));
    }
    let strings = array_create(&cx.agent, cooked);
    let raw_array = array_create(&cx.agent, raw);
    strings.insert_slot(
        PropertyKey::from("raw"),
        PropertySlot::method(Value::Object(raw_array)),
    );
    let mut arguments = vec![Value::Object(strings)];
    for expression in &tagged.quasi.expressions {
        arguments.push(eval_expression(cx, env, expression).await?);
    }
    call_function(cx.agent.clone(), tag, Value::Undefined, arguments).await
}

async fn eval_array_literal(
    cx: &ExecutionContext,
    env: &Environment,
    array: &'static ast::ArrayExpression<'static>,
) -> JsResult<Value> {
    let mut values: Vec<Value> = Vec::with_capacity(array.elements.len());
    for element in &array.elements {
        match element {
            ast::ArrayExpressionElement::Elision(_) => values.push(Value::Undefined),
            ast::ArrayExpressionElement::SpreadElement(spread) => {
                cx.agent.feature_policy().check("SpreadElement")?;
                let source = eval_expression(cx, env, &spread.argument).await?;
                values.extend(iterator_to_list(&cx.agent, &source)?);
            }
            _ => {
                let Some(expression) = element.as_expression() else {
                    return Err(cx.agent.throw_exception(
                        ExceptionType::SyntaxError,
                        "Unsupported array element",
                    ));
                };
                values.push(eval_expression(cx, env, expression).await?);
            }
        }
    }
    Ok(Value::Object(array_create(&cx.agent, values)))
}

async fn eval_object_literal(
    cx: &ExecutionContext,
    env: &Environment,
    literal: &'static ast::ObjectExpression<'static>,
) -> JsResult<Value> {
    let object = ordinary_object_create(&cx.agent);
    for property in &literal.properties {
        match property {
            ast::ObjectPropertyKind::SpreadProperty(spread) => {
                cx.agent.feature_policy().check("SpreadElement")?;
                let source = eval_expression(cx, env, &spread.argument).await?;
                if let Some(source_object) = source.as_object() {
                    for key in own_enumerable_string_keys(&cx.agent, source_object) {
                        let value = get_value_property(&cx.agent, &source, &key)?;
                        create_data_property(&object, key, value);
                    }
                }
            }
            ast::ObjectPropertyKind::ObjectProperty(property) => {
                let key = eval_property_key(cx, env, &property.key, property.computed).await?;
                match property.kind {
                    ast::PropertyKind::Init => {
                        let value = if property.method {
                            let ast::Expression::FunctionExpression(function) = &property.value
                            else {
                                return Err(cx.agent.throw_exception(
                                    ExceptionType::SyntaxError,
                                    "Malformed object method",
                                ));
                            };
                            let closure = method_closure(cx, env, function, &key);
                            set_home_object(&closure, &object);
                            Value::Function(closure)
                        } else {
                            eval_expression(cx, env, &property.value).await?
                        };
                        create_data_property(&object, key, value);
                    }
                    ast::PropertyKind::Get | ast::PropertyKind::Set => {
                        let ast::Expression::FunctionExpression(function) = &property.value
                        else {
                            return Err(cx.agent.throw_exception(
                                ExceptionType::SyntaxError,
                                "Malformed accessor",
                            ));
                        };
                        let closure = method_closure(cx, env, function, &key);
                        set_home_object(&closure, &object);
                        let kind = if property.kind == ast::PropertyKind::Get {
                            ast::MethodDefinitionKind::Get
                        } else {
                            ast::MethodDefinitionKind::Set
                        };
                        define_method(&object, key, &closure, kind);
                    }
                }
            }
        }
    }
    Ok(Value::Object(object))
}

/// Object-literal and class methods: not constructable, `super`-capable.
fn method_closure(
    cx: &ExecutionContext,
    env: &Environment,
    function: &'static ast::Function<'static>,
    key: &PropertyKey,
) -> crate::ecmascript::types::JsFunction {
    ordinary_function_create(
        &cx.agent,
        OrdinaryFunctionCreateParams {
            environment: env,
            private_environment: cx.private_environment.clone(),
            source: cx.source.clone(),
            parameters_list: Some(&function.params),
            body: function.body.as_deref(),
            is_concise_arrow_function: false,
            is_async: function.r#async,
            is_generator: function.generator,
            lexical_this: false,
            constructor_status: ConstructorStatus::NotConstructor,
            fields: Vec::new(),
            name: key.to_display_string(),
        },
    )
}

async fn eval_unary(
    cx: &ExecutionContext,
    env: &Environment,
    unary: &'static ast::UnaryExpression<'static>,
) -> JsResult<Value> {
    let agent = &cx.agent;
    match unary.operator {
        UnaryOperator::Typeof => {
            // `typeof` never throws on unresolved names.
            if let ast::Expression::Identifier(identifier) = &unary.argument {
                let value = env.lookup_optional(&JsString::new(identifier.name.as_str()))?;
                return Ok(Value::from(
                    value.map(|v| v.type_of()).unwrap_or("undefined"),
                ));
            }
            let value = eval_expression(cx, env, &unary.argument).await?;
            Ok(Value::from(value.type_of()))
        }
        UnaryOperator::Void => {
            eval_expression(cx, env, &unary.argument).await?;
            Ok(Value::Undefined)
        }
        UnaryOperator::LogicalNot => {
            let value = eval_expression(cx, env, &unary.argument).await?;
            Ok(Value::Boolean(!value.to_boolean()))
        }
        UnaryOperator::UnaryPlus => {
            let value = eval_expression(cx, env, &unary.argument).await?;
            Ok(Value::Number(to_number(agent, &value)?))
        }
        UnaryOperator::UnaryNegation => {
            let value = eval_expression(cx, env, &unary.argument).await?;
            match to_numeric(agent, &value)? {
                Numeric::Number(number) => Ok(Value::Number(-number)),
                Numeric::BigInt(big_int) => Ok(Value::BigInt(big_int.negate())),
            }
        }
        UnaryOperator::BitwiseNot => {
            let value = eval_expression(cx, env, &unary.argument).await?;
            match to_numeric(agent, &value)? {
                Numeric::Number(number) => Ok(Value::from(f64::from(
                    !(crate::ecmascript::abstract_operations::type_conversion::f64_to_uint32(
                        number,
                    ) as i32),
                ))),
                Numeric::BigInt(big_int) => Ok(Value::BigInt(big_int.bitwise_not())),
            }
        }
        UnaryOperator::Delete => eval_delete(cx, env, &unary.argument).await,
    }
}

/// ### [13.5.1 The `delete` Operator](https://tc39.es/ecma262/#sec-delete-operator)
async fn eval_delete(
    cx: &ExecutionContext,
    env: &Environment,
    target: &'static ast::Expression<'static>,
) -> JsResult<Value> {
    let agent = &cx.agent;
    match target {
        ast::Expression::StaticMemberExpression(member) => {
            let object = eval_expression(cx, env, &member.object).await?;
            let Some(object) = object.as_object() else {
                return Ok(Value::Boolean(true));
            };
            delete_property(
                agent,
                object,
                &PropertyKey::from(member.property.name.as_str()),
            )
            .map(Value::Boolean)
        }
        ast::Expression::ComputedMemberExpression(member) => {
            let object = eval_expression(cx, env, &member.object).await?;
            let key = eval_expression(cx, env, &member.expression).await?;
            let key = to_property_key(agent, &key)?;
            let Some(object) = object.as_object() else {
                return Ok(Value::Boolean(true));
            };
            delete_property(agent, object, &key).map(Value::Boolean)
        }
        ast::Expression::ChainExpression(_) => Ok(Value::Boolean(true)),
        // Deleting a binding is a strict-mode syntax error; anything else
        // evaluates and deletes nothing.
        _ => {
            eval_expression(cx, env, target).await?;
            Ok(Value::Boolean(true))
        }
    }
}

async fn eval_update(
    cx: &ExecutionContext,
    env: &Environment,
    update: &'static ast::UpdateExpression<'static>,
) -> JsResult<Value> {
    let agent = &cx.agent;
    // Read, step, write back.
    let (old_value, write_back): (Value, Box<dyn FnOnce(Value) -> JsResult<()> + '_>) =
        match &update.argument {
            ast::SimpleAssignmentTarget::AssignmentTargetIdentifier(identifier) => {
                let name = JsString::new(identifier.name.as_str());
                let value = env.lookup(&name)?;
                let env = env.clone();
                (
                    value,
                    Box::new(move |new| env.assign(&name, new)),
                )
            }
            ast::SimpleAssignmentTarget::StaticMemberExpression(member) => {
                let object = eval_expression(cx, env, &member.object).await?;
                let key = PropertyKey::from(member.property.name.as_str());
                let value = get_value_property(agent, &object, &key)?;
                let cx = cx.clone();
                (
                    value,
                    Box::new(move |new| {
                        super::patterns::assign_member(&cx, &object, key, new)
                    }),
                )
            }
            ast::SimpleAssignmentTarget::ComputedMemberExpression(member) => {
                let object = eval_expression(cx, env, &member.object).await?;
                let key = eval_expression(cx, env, &member.expression).await?;
                let key = to_property_key(agent, &key)?;
                let value = get_value_property(agent, &object, &key)?;
                let cx = cx.clone();
                (
                    value,
                    Box::new(move |new| {
                        super::patterns::assign_member(&cx, &object, key, new)
                    }),
                )
            }
            _ => {
                return Err(agent.throw_exception(
                    ExceptionType::SyntaxError,
                    "Invalid update expression target",
                ));
            }
        };
    let (old_numeric, new_value) = match to_numeric(agent, &old_value)? {
        Numeric::Number(number) => {
            let step = if update.operator == UpdateOperator::Increment {
                1.0
            } else {
                -1.0
            };
            (Value::Number(number), Value::Number(number + step))
        }
        Numeric::BigInt(big_int) => {
            let one = JsBigInt::from(1);
            let new = if update.operator == UpdateOperator::Increment {
                big_int.add(&one)
            } else {
                big_int.subtract(&one)
            };
            (Value::BigInt(big_int), Value::BigInt(new))
        }
    };
    write_back(new_value.clone())?;
    Ok(if update.prefix { new_value } else { old_numeric })
}

async fn eval_assignment(
    cx: &ExecutionContext,
    env: &Environment,
    assignment: &'static ast::AssignmentExpression<'static>,
) -> JsResult<Value> {
    let agent = &cx.agent;
    match assignment.operator {
        AssignmentOperator::Assign => {
            let value = eval_expression(cx, env, &assignment.right).await?;
            super::patterns::assign_to_target(cx, env, &assignment.left, value.clone()).await?;
            Ok(value)
        }
        AssignmentOperator::LogicalAnd
        | AssignmentOperator::LogicalOr
        | AssignmentOperator::LogicalNullish => {
            agent.feature_policy().check("LogicalAssignment")?;
            let current = read_simple_target(cx, env, &assignment.left).await?;
            let should_assign = match assignment.operator {
                AssignmentOperator::LogicalAnd => current.to_boolean(),
                AssignmentOperator::LogicalOr => !current.to_boolean(),
                _ => current.is_nullish(),
            };
            if !should_assign {
                return Ok(current);
            }
            let value = eval_expression(cx, env, &assignment.right).await?;
            super::patterns::assign_to_target(cx, env, &assignment.left, value.clone()).await?;
            Ok(value)
        }
        operator => {
            let current = read_simple_target(cx, env, &assignment.left).await?;
            let right = eval_expression(cx, env, &assignment.right).await?;
            let binary_operator = match operator {
                AssignmentOperator::Addition => BinaryOperator::Addition,
                AssignmentOperator::Subtraction => BinaryOperator::Subtraction,
                AssignmentOperator::Multiplication => BinaryOperator::Multiplication,
                AssignmentOperator::Division => BinaryOperator::Division,
                AssignmentOperator::Remainder => BinaryOperator::Remainder,
                AssignmentOperator::Exponential => BinaryOperator::Exponential,
                AssignmentOperator::ShiftLeft => BinaryOperator::ShiftLeft,
                AssignmentOperator::ShiftRight => BinaryOperator::ShiftRight,
                AssignmentOperator::ShiftRightZeroFill => BinaryOperator::ShiftRightZeroFill,
                AssignmentOperator::BitwiseOR => BinaryOperator::BitwiseOR,
                AssignmentOperator::BitwiseXOR => BinaryOperator::BitwiseXOR,
                AssignmentOperator::BitwiseAnd => BinaryOperator::BitwiseAnd,
                _ => {
                    return Err(agent.throw_exception(
                        ExceptionType::SyntaxError,
                        "Unsupported assignment operator",
                    ));
                }
            };
            let value = apply_binary_operator(cx, binary_operator, &current, &right)?;
            super::patterns::assign_to_target(cx, env, &assignment.left, value.clone()).await?;
            Ok(value)
        }
    }
}

/// Reads the current value of a simple assignment target (compound and
/// logical assignment).
async fn read_simple_target(
    cx: &ExecutionContext,
    env: &Environment,
    target: &'static ast::AssignmentTarget<'static>,
) -> JsResult<Value> {
    let agent = &cx.agent;
    match target {
        ast::AssignmentTarget::AssignmentTargetIdentifier(identifier) => {
            env.lookup(&JsString::new(identifier.name.as_str()))
        }
        ast::AssignmentTarget::StaticMemberExpression(member) => {
            let object = eval_expression(cx, env, &member.object).await?;
            get_value_property(
                agent,
                &object,
                &PropertyKey::from(member.property.name.as_str()),
            )
        }
        ast::AssignmentTarget::ComputedMemberExpression(member) => {
            let object = eval_expression(cx, env, &member.object).await?;
            let key = eval_expression(cx, env, &member.expression).await?;
            let key = to_property_key(agent, &key)?;
            get_value_property(agent, &object, &key)
        }
        ast::AssignmentTarget::PrivateFieldExpression(member) => {
            let object = eval_expression(cx, env, &member.object).await?;
            private_field_get(cx, &object, member.field.name.as_str())
        }
        _ => Err(agent.throw_exception(
            ExceptionType::SyntaxError,
            "Invalid compound assignment target",
        )),
    }
}

/// ### [13.15.3 ApplyStringOrNumericBinaryOperator](https://tc39.es/ecma262/#sec-applystringornumericbinaryoperator)
pub(crate) fn apply_binary_operator(
    cx: &ExecutionContext,
    operator: BinaryOperator,
    left: &Value,
    right: &Value,
) -> JsResult<Value> {
    let agent = &cx.agent;
    match operator {
        BinaryOperator::Addition => {
            let left_primitive = to_primitive(agent, left, PreferredType::Default)?;
            let right_primitive = to_primitive(agent, right, PreferredType::Default)?;
            if matches!(left_primitive, Value::String(_))
                || matches!(right_primitive, Value::String(_))
            {
                let mut out = to_string(agent, &left_primitive)?.as_str().to_string();
                out.push_str(to_string(agent, &right_primitive)?.as_str());
                return Ok(Value::from(out));
            }
            match numeric_pair(cx, &left_primitive, &right_primitive)? {
                NumericPair::Numbers(a, b) => Ok(Value::Number(a + b)),
                NumericPair::BigInts(a, b) => Ok(Value::BigInt(a.add(&b))),
            }
        }
        BinaryOperator::Subtraction => match numeric_pair(cx, left, right)? {
            NumericPair::Numbers(a, b) => Ok(Value::Number(a - b)),
            NumericPair::BigInts(a, b) => Ok(Value::BigInt(a.subtract(&b))),
        },
        BinaryOperator::Multiplication => match numeric_pair(cx, left, right)? {
            NumericPair::Numbers(a, b) => Ok(Value::Number(a * b)),
            NumericPair::BigInts(a, b) => Ok(Value::BigInt(a.multiply(&b))),
        },
        BinaryOperator::Division => match numeric_pair(cx, left, right)? {
            NumericPair::Numbers(a, b) => Ok(Value::Number(a / b)),
            NumericPair::BigInts(a, b) => a
                .divide(&b)
                .map(Value::BigInt)
                .ok_or_else(|| {
                    agent.throw_exception(ExceptionType::RangeError, "Division by zero")
                }),
        },
        BinaryOperator::Remainder => match numeric_pair(cx, left, right)? {
            NumericPair::Numbers(a, b) => Ok(Value::Number(a % b)),
            NumericPair::BigInts(a, b) => a
                .remainder(&b)
                .map(Value::BigInt)
                .ok_or_else(|| {
                    agent.throw_exception(ExceptionType::RangeError, "Division by zero")
                }),
        },
        BinaryOperator::Exponential => match numeric_pair(cx, left, right)? {
            NumericPair::Numbers(a, b) => Ok(Value::Number(a.powf(b))),
            NumericPair::BigInts(a, b) => a
                .exponentiate(&b)
                .map(Value::BigInt)
                .ok_or_else(|| {
                    agent.throw_exception(
                        ExceptionType::RangeError,
                        "Exponent must be a non-negative BigInt",
                    )
                }),
        },
        BinaryOperator::ShiftLeft => match numeric_pair(cx, left, right)? {
            NumericPair::Numbers(a, b) => {
                let shift = to_uint32_bits(b) & 31;
                Ok(Value::from(f64::from((to_uint32_bits(a) as i32) << shift)))
            }
            NumericPair::BigInts(a, b) => a.shift_left(&b).map(Value::BigInt).ok_or_else(|| {
                agent.throw_exception(ExceptionType::RangeError, "BigInt shift out of range")
            }),
        },
        BinaryOperator::ShiftRight => match numeric_pair(cx, left, right)? {
            NumericPair::Numbers(a, b) => {
                let shift = to_uint32_bits(b) & 31;
                Ok(Value::from(f64::from((to_uint32_bits(a) as i32) >> shift)))
            }
            NumericPair::BigInts(a, b) => a.shift_right(&b).map(Value::BigInt).ok_or_else(|| {
                agent.throw_exception(ExceptionType::RangeError, "BigInt shift out of range")
            }),
        },
        BinaryOperator::ShiftRightZeroFill => match numeric_pair(cx, left, right)? {
            NumericPair::Numbers(a, b) => {
                let shift = to_uint32_bits(b) & 31;
                Ok(Value::from(f64::from(to_uint32_bits(a) >> shift)))
            }
            NumericPair::BigInts(..) => Err(agent.throw_exception(
                ExceptionType::TypeError,
                "BigInts have no unsigned right shift",
            )),
        },
        BinaryOperator::BitwiseOR => bitwise(cx, left, right, |a, b| a | b, JsBigInt::bitwise_or),
        BinaryOperator::BitwiseXOR => {
            bitwise(cx, left, right, |a, b| a ^ b, JsBigInt::bitwise_xor)
        }
        BinaryOperator::BitwiseAnd => {
            bitwise(cx, left, right, |a, b| a & b, JsBigInt::bitwise_and)
        }
        BinaryOperator::Equality => {
            Ok(Value::Boolean(is_loosely_equal(agent, left, right)?))
        }
        BinaryOperator::Inequality => {
            Ok(Value::Boolean(!is_loosely_equal(agent, left, right)?))
        }
        BinaryOperator::StrictEquality => Ok(Value::Boolean(is_strictly_equal(left, right))),
        BinaryOperator::StrictInequality => {
            Ok(Value::Boolean(!is_strictly_equal(left, right)))
        }
        BinaryOperator::LessThan => Ok(Value::Boolean(matches!(
            compare_values(agent, left, right)?,
            Some(core::cmp::Ordering::Less)
        ))),
        BinaryOperator::LessEqualThan => Ok(Value::Boolean(matches!(
            compare_values(agent, left, right)?,
            Some(core::cmp::Ordering::Less | core::cmp::Ordering::Equal)
        ))),
        BinaryOperator::GreaterThan => Ok(Value::Boolean(matches!(
            compare_values(agent, left, right)?,
            Some(core::cmp::Ordering::Greater)
        ))),
        BinaryOperator::GreaterEqualThan => Ok(Value::Boolean(matches!(
            compare_values(agent, left, right)?,
            Some(core::cmp::Ordering::Greater | core::cmp::Ordering::Equal)
        ))),
        BinaryOperator::Instanceof => {
            Ok(Value::Boolean(ordinary_has_instance(agent, right, left)?))
        }
        BinaryOperator::In => {
            let Some(object) = right.as_object() else {
                return Err(agent.throw_exception(
                    ExceptionType::TypeError,
                    format!(
                        "Cannot use 'in' operator to search in {}",
                        right.type_of()
                    ),
                ));
            };
            let key = to_property_key(agent, left)?;
            Ok(Value::Boolean(has_property(agent, object, &key)?))
        }
    }
}

enum NumericPair {
    Numbers(f64, f64),
    BigInts(JsBigInt, JsBigInt),
}

/// The no-implicit-mixing rule: both operands convert to the same numeric
/// tower or the operation fails.
fn numeric_pair(cx: &ExecutionContext, left: &Value, right: &Value) -> JsResult<NumericPair> {
    let left = to_numeric(&cx.agent, left)?;
    let right = to_numeric(&cx.agent, right)?;
    match (left, right) {
        (Numeric::Number(a), Numeric::Number(b)) => Ok(NumericPair::Numbers(a, b)),
        (Numeric::BigInt(a), Numeric::BigInt(b)) => Ok(NumericPair::BigInts(a, b)),
        _ => Err(cx.agent.throw_exception(
            ExceptionType::TypeError,
            "Cannot mix BigInt and other types, use explicit conversions",
        )),
    }
}

fn to_uint32_bits(number: f64) -> u32 {
    crate::ecmascript::abstract_operations::type_conversion::f64_to_uint32(number)
}

fn bitwise(
    cx: &ExecutionContext,
    left: &Value,
    right: &Value,
    number_op: fn(i32, i32) -> i32,
    big_int_op: fn(&JsBigInt, &JsBigInt) -> JsBigInt,
) -> JsResult<Value> {
    match numeric_pair(cx, left, right)? {
        NumericPair::Numbers(a, b) => Ok(Value::from(f64::from(number_op(
            to_uint32_bits(a) as i32,
            to_uint32_bits(b) as i32,
        )))),
        NumericPair::BigInts(a, b) => Ok(Value::BigInt(big_int_op(&a, &b))),
    }
}

// Calls.

async fn eval_arguments(
    cx: &ExecutionContext,
    env: &Environment,
    arguments: &'static [ast::Argument<'static>],
) -> JsResult<Vec<Value>> {
    let mut values = Vec::with_capacity(arguments.len());
    for argument in arguments {
        match argument {
            ast::Argument::SpreadElement(spread) => {
                cx.agent.feature_policy().check("SpreadElement")?;
                let source = eval_expression(cx, env, &spread.argument).await?;
                values.extend(iterator_to_list(&cx.agent, &source)?);
            }
            _ => {
                let Some(expression) = argument.as_expression() else {
                    return Err(cx.agent.throw_exception(
                        ExceptionType::SyntaxError,
                        "Unsupported call argument",
                    ));
                };
                values.push(eval_expression(cx, env, expression).await?);
            }
        }
    }
    Ok(values)
}

async fn eval_call_expression(
    cx: &ExecutionContext,
    env: &Environment,
    call: &'static ast::CallExpression<'static>,
) -> JsResult<Value> {
    let agent = &cx.agent;
    // super(...) in a derived constructor.
    if matches!(call.callee, ast::Expression::Super(_)) {
        let arguments = eval_arguments(cx, env, &call.arguments).await?;
        return eval_super_call(cx, env, arguments).await;
    }
    // Method call: the receiver becomes `this`.
    let (this_value, callee_value) = match &call.callee {
        ast::Expression::StaticMemberExpression(member)
            if !matches!(member.object, ast::Expression::Super(_)) =>
        {
            let object = eval_expression(cx, env, &member.object).await?;
            if member.optional && object.is_nullish() {
                return Ok(Value::Undefined);
            }
            let callee = get_value_property(
                agent,
                &object,
                &PropertyKey::from(member.property.name.as_str()),
            )?;
            (object, callee)
        }
        ast::Expression::ComputedMemberExpression(member)
            if !matches!(member.object, ast::Expression::Super(_)) =>
        {
            let object = eval_expression(cx, env, &member.object).await?;
            if member.optional && object.is_nullish() {
                return Ok(Value::Undefined);
            }
            let key = eval_expression(cx, env, &member.expression).await?;
            let key = to_property_key(agent, &key)?;
            let callee = get_value_property(agent, &object, &key)?;
            (object, callee)
        }
        ast::Expression::StaticMemberExpression(member) => {
            // super.m(...): looked up on the home prototype, invoked on the
            // current `this`.
            let callee = super_property(cx, env, member.property.name.as_str())?;
            (env.get_this()?, callee)
        }
        ast::Expression::ComputedMemberExpression(member)
            if matches!(member.object, ast::Expression::Super(_)) =>
        {
            let key = eval_expression(cx, env, &member.expression).await?;
            let key = to_property_key(agent, &key)?;
            let callee = super_property_by_key(cx, env, &key)?;
            (env.get_this()?, callee)
        }
        ast::Expression::PrivateFieldExpression(member) => {
            let object = eval_expression(cx, env, &member.object).await?;
            let callee = private_field_get(cx, &object, member.field.name.as_str())?;
            (object, callee)
        }
        callee => (Value::Undefined, eval_expression(cx, env, callee).await?),
    };
    if call.optional {
        cx.agent.feature_policy().check("OptionalChaining")?;
        if callee_value.is_nullish() {
            return Ok(Value::Undefined);
        }
    }
    let arguments = eval_arguments(cx, env, &call.arguments).await?;
    let Some(function) = callee_value.as_function().cloned() else {
        return Err(agent.throw_exception(
            ExceptionType::TypeError,
            format!("{} is not a function", describe_callee(&call.callee)),
        ));
    };
    call_function(agent.clone(), function, this_value, arguments).await
}

fn describe_callee(callee: &ast::Expression<'_>) -> String {
    match callee {
        ast::Expression::Identifier(identifier) => identifier.name.as_str().to_string(),
        ast::Expression::StaticMemberExpression(member) => {
            format!("{}.{}", describe_callee(&member.object), member.property.name)
        }
        _ => "expression".to_string(),
    }
}

/// `super(...)`: constructs the parent, binds `this`, runs this class's
/// field initializers.
async fn eval_super_call(
    cx: &ExecutionContext,
    env: &Environment,
    arguments: Vec<Value>,
) -> JsResult<Value> {
    let agent = &cx.agent;
    let Some(function) = cx.current_function.clone() else {
        return Err(agent.throw_exception(
            ExceptionType::SyntaxError,
            "'super' keyword unexpected here",
        ));
    };
    let parent = parent_constructor(agent, &function)?;
    let instance = super::functions::construct_boxed(
        agent.clone(),
        parent,
        arguments,
        cx.instance_prototype.clone(),
    )
    .await?;
    env.bind_this(instance.clone())?;
    let fields = {
        let data = function.data();
        match &data.kind {
            ObjectKind::Function(function_data) => match &function_data.kind {
                crate::ecmascript::types::language::function::FunctionKind::Ecmascript(e) => {
                    e.fields.clone()
                }
                _ => Vec::new(),
            },
            _ => Vec::new(),
        }
    };
    run_field_initializers(cx, env, &fields).await?;
    Ok(instance)
}

/// `super.name` lookup: the home object's prototype chain, with the
/// current `this` as receiver.
fn super_property(cx: &ExecutionContext, env: &Environment, name: &str) -> JsResult<Value> {
    super_property_by_key(cx, env, &PropertyKey::from(name))
}

fn super_property_by_key(
    cx: &ExecutionContext,
    env: &Environment,
    key: &PropertyKey,
) -> JsResult<Value> {
    let agent = &cx.agent;
    let home = cx
        .current_function
        .as_ref()
        .and_then(|function| match &function.data().kind {
            ObjectKind::Function(data) => match &data.kind {
                crate::ecmascript::types::language::function::FunctionKind::Ecmascript(e) => {
                    e.home_object.borrow().clone()
                }
                _ => None,
            },
            _ => None,
        });
    let Some(home) = home else {
        return Err(agent.throw_exception(
            ExceptionType::SyntaxError,
            "'super' keyword unexpected here",
        ));
    };
    let Some(parent) = home.prototype() else {
        return Ok(Value::Undefined);
    };
    // Receiver semantics collapse to the parent lookup here; method calls
    // re-bind `this` at the call site.
    let _ = env;
    crate::ecmascript::abstract_operations::operations_on_objects::get(agent, &parent, key)
}

// Optional chains.

fn eval_chain_element<'a>(
    cx: &'a ExecutionContext,
    env: &'a Environment,
    element: &'static ast::ChainElement<'static>,
) -> BoxedEval<'a, JsResult<Option<Value>>> {
    Box::pin(async move {
        let agent = &cx.agent;
        match element {
            ast::ChainElement::CallExpression(call) => eval_call_in_chain(cx, env, call).await,
            ast::ChainElement::StaticMemberExpression(member) => {
                let Some(object) = eval_chain_object(cx, env, &member.object).await? else {
                    return Ok(None);
                };
                if member.optional && object.is_nullish() {
                    return Ok(None);
                }
                get_value_property(
                    agent,
                    &object,
                    &PropertyKey::from(member.property.name.as_str()),
                )
                .map(Some)
            }
            ast::ChainElement::ComputedMemberExpression(member) => {
                let Some(object) = eval_chain_object(cx, env, &member.object).await? else {
                    return Ok(None);
                };
                if member.optional && object.is_nullish() {
                    return Ok(None);
                }
                let key = eval_expression(cx, env, &member.expression).await?;
                let key = to_property_key(agent, &key)?;
                get_value_property(agent, &object, &key).map(Some)
            }
            ast::ChainElement::PrivateFieldExpression(member) => {
                let Some(object) = eval_chain_object(cx, env, &member.object).await? else {
                    return Ok(None);
                };
                if member.optional && object.is_nullish() {
                    return Ok(None);
                }
                private_field_get(cx, &object, member.field.name.as_str()).map(Some)
            }
            _ => Err(agent.throw_exception(
                ExceptionType::SyntaxError,
                "Unsupported optional chain element",
            )),
        }
    })
}

/// A call in the middle of an optional chain: its callee resolves with
/// chain semantics and its own short circuit propagates outward.
async fn eval_call_in_chain(
    cx: &ExecutionContext,
    env: &Environment,
    call: &'static ast::CallExpression<'static>,
) -> JsResult<Option<Value>> {
    let agent = &cx.agent;
    let (this_value, callee_value) = match &call.callee {
        ast::Expression::StaticMemberExpression(member) => {
            let Some(object) = eval_chain_object(cx, env, &member.object).await? else {
                return Ok(None);
            };
            if member.optional && object.is_nullish() {
                return Ok(None);
            }
            let callee = get_value_property(
                agent,
                &object,
                &PropertyKey::from(member.property.name.as_str()),
            )?;
            (object, callee)
        }
        ast::Expression::ComputedMemberExpression(member) => {
            let Some(object) = eval_chain_object(cx, env, &member.object).await? else {
                return Ok(None);
            };
            if member.optional && object.is_nullish() {
                return Ok(None);
            }
            let key = eval_expression(cx, env, &member.expression).await?;
            let key = to_property_key(agent, &key)?;
            (object.clone(), get_value_property(agent, &object, &key)?)
        }
        callee => (Value::Undefined, eval_expression(cx, env, callee).await?),
    };
    if call.optional && callee_value.is_nullish() {
        return Ok(None);
    }
    let arguments = eval_arguments(cx, env, &call.arguments).await?;
    let Some(function) = callee_value.as_function().cloned() else {
        return Err(agent.throw_exception(
            ExceptionType::TypeError,
            format!("{} is not a function", describe_callee(&call.callee)),
        ));
    };
    call_function(agent.clone(), function, this_value, arguments)
        .await
        .map(Some)
}

/// A chain member's object: member/call sub-expressions stay inside the
/// chain (their short circuit propagates), everything else evaluates
/// normally.
async fn eval_chain_object(
    cx: &ExecutionContext,
    env: &Environment,
    object: &'static ast::Expression<'static>,
) -> JsResult<Option<Value>> {
    match object {
        ast::Expression::StaticMemberExpression(member) => {
            let result =
                eval_chain_element_from_member(cx, env, MemberRef::Static(member)).await?;
            Ok(result)
        }
        ast::Expression::ComputedMemberExpression(member) => {
            let result =
                eval_chain_element_from_member(cx, env, MemberRef::Computed(member)).await?;
            Ok(result)
        }
        ast::Expression::CallExpression(call) => {
            Box::pin(eval_call_in_chain(cx, env, call)).await
        }
        _ => eval_expression(cx, env, object).await.map(Some),
    }
}

enum MemberRef {
    Static(&'static ast::StaticMemberExpression<'static>),
    Computed(&'static ast::ComputedMemberExpression<'static>),
}

async fn eval_chain_element_from_member(
    cx: &ExecutionContext,
    env: &Environment,
    member: MemberRef,
) -> JsResult<Option<Value>> {
    let agent = &cx.agent;
    match member {
        MemberRef::Static(member) => {
            let Some(object) = Box::pin(eval_chain_object(cx, env, &member.object)).await?
            else {
                return Ok(None);
            };
            if member.optional && object.is_nullish() {
                return Ok(None);
            }
            get_value_property(
                agent,
                &object,
                &PropertyKey::from(member.property.name.as_str()),
            )
            .map(Some)
        }
        MemberRef::Computed(member) => {
            let Some(object) = Box::pin(eval_chain_object(cx, env, &member.object)).await?
            else {
                return Ok(None);
            };
            if member.optional && object.is_nullish() {
                return Ok(None);
            }
            let key = eval_expression(cx, env, &member.expression).await?;
            let key = to_property_key(agent, &key)?;
            get_value_property(agent, &object, &key).map(Some)
        }
    }
}

// Private fields.

pub(crate) fn resolve_private_id(cx: &ExecutionContext, name: &str) -> JsResult<u64> {
    cx.private_environment
        .as_ref()
        .and_then(|environment| environment.resolve(&JsString::new(name)))
        .ok_or_else(|| {
            cx.agent.throw_exception(
                ExceptionType::SyntaxError,
                format!("Private field '#{name}' must be declared in an enclosing class"),
            )
        })
}

pub(crate) fn private_field_get(
    cx: &ExecutionContext,
    object: &Value,
    name: &str,
) -> JsResult<Value> {
    let id = resolve_private_id(cx, name)?;
    let Some(object) = object.as_object() else {
        return Err(cx.agent.throw_exception(
            ExceptionType::TypeError,
            "Cannot read private member from a non-object",
        ));
    };
    object.private_get(id).ok_or_else(|| {
        cx.agent.throw_exception(
            ExceptionType::TypeError,
            format!("Cannot read private member #{name} from an object whose class did not declare it"),
        )
    })
}

pub(crate) fn private_field_set(
    cx: &ExecutionContext,
    object: &Value,
    name: &str,
    value: Value,
) -> JsResult<()> {
    let id = resolve_private_id(cx, name)?;
    let Some(object) = object.as_object() else {
        return Err(cx.agent.throw_exception(
            ExceptionType::TypeError,
            "Cannot write private member to a non-object",
        ));
    };
    object.private_set(id, value);
    Ok(())
}

// Generators.

async fn eval_yield(
    cx: &ExecutionContext,
    env: &Environment,
    yield_expression: &'static ast::YieldExpression<'static>,
) -> JsResult<Value> {
    let agent = &cx.agent;
    let Some(channel) = cx.channel.clone() else {
        return Err(agent.throw_exception(
            ExceptionType::SyntaxError,
            "yield is only valid inside a generator",
        ));
    };
    if yield_expression.delegate {
        // yield*: forward every value of the inner iterable.
        let Some(argument) = &yield_expression.argument else {
            return Err(agent.throw_exception(
                ExceptionType::SyntaxError,
                "yield* requires an iterable argument",
            ));
        };
        let source = eval_expression(cx, env, argument).await?;
        let mut iterator = get_iterator(agent, &source)?;
        let mut last = Value::Undefined;
        loop {
            let Some(value) = iterator.step(agent)? else {
                break;
            };
            match perform_yield(&channel, value).await {
                YieldResume::Next(sent) => last = sent,
                YieldResume::Return(value) => {
                    iterator.close(agent);
                    return Err(return_completion_error(cx, value));
                }
                YieldResume::Throw(thrown) => {
                    iterator.close(agent);
                    return Err(error_from_thrown_value(agent, thrown));
                }
            }
        }
        Ok(last)
    } else {
        let value = match &yield_expression.argument {
            Some(argument) => eval_expression(cx, env, argument).await?,
            None => Value::Undefined,
        };
        match perform_yield(&channel, value).await {
            YieldResume::Next(sent) => Ok(sent),
            YieldResume::Return(value) => Err(return_completion_error(cx, value)),
            YieldResume::Throw(thrown) => Err(error_from_thrown_value(agent, thrown)),
        }
    }
}

/// `generator.return(v)` surfaces inside the body as a return completion;
/// it rides the error channel with a marker the function driver unwraps.
fn return_completion_error(
    cx: &ExecutionContext,
    value: Value,
) -> crate::ecmascript::execution::errors::JsError {
    cx.agent.generator_return_error(value)
}
