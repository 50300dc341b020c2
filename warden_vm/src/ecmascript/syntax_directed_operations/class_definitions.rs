// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [15.7 Runtime Semantics: ClassDefinitionEvaluation](https://tc39.es/ecma262/#sec-runtime-semantics-classdefinitionevaluation)
//!
//! Classes desugar to a constructor function plus a prototype object. The
//! constructor's internal prototype points at the superclass (static
//! inheritance); the prototype object's internal prototype points at the
//! superclass's prototype (instance inheritance). Private names resolve
//! through a lexical private-environment chain to per-instance side-table
//! ids.

use core::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use oxc_ast::ast;

use crate::ecmascript::execution::environments::{BindingKind, Environment};
use crate::ecmascript::execution::errors::{ExceptionType, JsResult};
use crate::ecmascript::types::language::function::{
    ClassFieldInitializer, ClassFieldKey, ClassFieldValue, ConstructorStatus, FunctionKind,
};
use crate::ecmascript::types::language::object::{JsObject, ObjectKind};
use crate::ecmascript::types::property_descriptor::PropertySlot;
use crate::ecmascript::types::{JsFunction, JsString, PropertyKey, Value};
use crate::engine::interpreter::expressions::{eval_expression, eval_property_key};
use crate::engine::interpreter::ExecutionContext;

use super::function_definitions::{ordinary_function_create, OrdinaryFunctionCreateParams};

/// The lexical scope of `#name`s: each class body adds one record.
#[derive(Clone)]
pub(crate) struct PrivateEnvironment(Rc<PrivateEnvironmentRecord>);

pub(crate) struct PrivateEnvironmentRecord {
    names: IndexMap<JsString, u64>,
    parent: Option<PrivateEnvironment>,
}

impl PrivateEnvironment {
    pub(crate) fn new(
        parent: Option<PrivateEnvironment>,
        names: IndexMap<JsString, u64>,
    ) -> Self {
        Self(Rc::new(PrivateEnvironmentRecord { names, parent }))
    }

    /// Resolves a `#name` to its side-table id, walking outward.
    pub(crate) fn resolve(&self, name: &JsString) -> Option<u64> {
        if let Some(id) = self.0.names.get(name) {
            return Some(*id);
        }
        self.0.parent.as_ref().and_then(|parent| parent.resolve(name))
    }
}

impl fmt::Debug for PrivateEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateEnvironment")
            .field("names", &self.0.names)
            .finish_non_exhaustive()
    }
}

/// Evaluates a class declaration or expression to its constructor.
pub(crate) async fn evaluate_class(
    cx: &ExecutionContext,
    env: &Environment,
    class: &'static ast::Class<'static>,
) -> JsResult<Value> {
    let agent = &cx.agent;
    let class_name = class
        .id
        .as_ref()
        .map(|id| JsString::new(id.name.as_str()))
        .unwrap_or_else(|| JsString::new(""));

    // 1. The class binding scope: the class name is visible (and in TDZ)
    //    inside the body.
    let class_env = Environment::new_block(env);
    if class.id.is_some() {
        class_env.declare(&class_name, BindingKind::Const)?;
    }

    // 2. Collect the `#names` declared by this body into a fresh private
    //    environment record.
    let mut private_names: IndexMap<JsString, u64> = IndexMap::new();
    for element in &class.body.body {
        let private = match element {
            ast::ClassElement::MethodDefinition(method) => private_identifier(&method.key),
            ast::ClassElement::PropertyDefinition(field) => private_identifier(&field.key),
            _ => None,
        };
        if let Some(name) = private {
            private_names.insert(JsString::new(name), agent.next_private_id());
        }
    }
    let private_environment = Some(PrivateEnvironment::new(
        cx.private_environment.clone(),
        private_names,
    ));
    let mut class_cx = cx.clone();
    class_cx.private_environment = private_environment.clone();
    let class_cx = &class_cx;

    // 3. ClassHeritage: the superclass constructor, or None for a base
    //    class, or null-extends (allowed, instances get a null prototype).
    let mut parent_constructor: Option<JsFunction> = None;
    let mut prototype_parent: Option<JsObject> = Some(agent.intrinsics().object_prototype.clone());
    let mut is_derived = false;
    if let Some(heritage) = &class.super_class {
        is_derived = true;
        match eval_expression(class_cx, &class_env, heritage).await? {
            Value::Null => {
                prototype_parent = None;
            }
            Value::Function(function) => {
                let parent_prototype = crate::ecmascript::abstract_operations::operations_on_objects::get(
                    agent,
                    function.object(),
                    &PropertyKey::from("prototype"),
                )?;
                prototype_parent = match parent_prototype {
                    Value::Object(object) => Some(object),
                    Value::Null => None,
                    _ => {
                        return Err(agent.throw_exception(
                            ExceptionType::TypeError,
                            "Class extends value does not have a valid prototype",
                        ));
                    }
                };
                parent_constructor = Some(function);
            }
            _ => {
                return Err(agent.throw_exception(
                    ExceptionType::TypeError,
                    "Class extends value is not a constructor",
                ));
            }
        }
    }

    let prototype = JsObject::ordinary(prototype_parent);

    // 4. Instance fields and private methods become the constructor's field
    //    initializer list, in declaration order. Computed keys evaluate
    //    once, now.
    let mut fields: Vec<ClassFieldInitializer> = Vec::new();
    let mut constructor_method: Option<&'static ast::MethodDefinition<'static>> = None;
    for element in &class.body.body {
        match element {
            ast::ClassElement::MethodDefinition(method)
                if method.kind == ast::MethodDefinitionKind::Constructor =>
            {
                constructor_method = Some(method);
            }
            _ => {}
        }
    }

    // 5. The constructor function.
    let constructor_status = if is_derived {
        ConstructorStatus::DerivedClass
    } else {
        ConstructorStatus::BaseClass
    };
    let constructor = match constructor_method {
        Some(method) => ordinary_function_create(
            agent,
            OrdinaryFunctionCreateParams {
                environment: &class_env,
                private_environment: private_environment.clone(),
                source: class_cx.source.clone(),
                parameters_list: Some(&method.value.params),
                body: method.value.body.as_deref(),
                is_concise_arrow_function: false,
                is_async: false,
                is_generator: false,
                lexical_this: false,
                constructor_status,
                fields: Vec::new(),
                name: class_name.clone(),
            },
        ),
        None => ordinary_function_create(
            agent,
            OrdinaryFunctionCreateParams {
                environment: &class_env,
                private_environment: private_environment.clone(),
                source: class_cx.source.clone(),
                parameters_list: None,
                body: None,
                is_concise_arrow_function: false,
                is_async: false,
                is_generator: false,
                lexical_this: false,
                constructor_status,
                fields: Vec::new(),
                name: class_name.clone(),
            },
        ),
    };

    // Wire the two inheritance chains.
    constructor.object().insert_slot(
        PropertyKey::from("prototype"),
        PropertySlot::frozen(Value::Object(prototype.clone())),
    );
    prototype.insert_slot(
        PropertyKey::from("constructor"),
        PropertySlot::method(Value::Function(constructor.clone())),
    );
    if let Some(parent) = &parent_constructor {
        constructor
            .object()
            .set_prototype(Some(parent.object().clone()));
    }
    set_home_object(&constructor, &prototype);

    // 6. Methods and fields.
    for element in &class.body.body {
        match element {
            ast::ClassElement::MethodDefinition(method) => {
                if method.kind == ast::MethodDefinitionKind::Constructor {
                    continue;
                }
                let closure_name = method_name(class_cx, &class_env, &method.key, method.computed)
                    .await?;
                let closure = ordinary_function_create(
                    agent,
                    OrdinaryFunctionCreateParams {
                        environment: &class_env,
                        private_environment: private_environment.clone(),
                        source: class_cx.source.clone(),
                        parameters_list: Some(&method.value.params),
                        body: method.value.body.as_deref(),
                        is_concise_arrow_function: false,
                        is_async: method.value.r#async,
                        is_generator: method.value.generator,
                        lexical_this: false,
                        constructor_status: ConstructorStatus::NotConstructor,
                        fields: Vec::new(),
                        name: closure_name.clone(),
                    },
                );
                let target = if method.r#static {
                    constructor.object()
                } else {
                    &prototype
                };
                set_home_object(&closure, target);

                if let Some(private) = private_identifier(&method.key) {
                    let id = private_environment
                        .as_ref()
                        .and_then(|p| p.resolve(&JsString::new(private)))
                        .expect("private name was just declared");
                    if method.r#static {
                        constructor.object().private_set(id, Value::Function(closure));
                    } else {
                        fields.push(ClassFieldInitializer {
                            key: ClassFieldKey::Private(id),
                            value: ClassFieldValue::Method(closure),
                        });
                    }
                    continue;
                }
                let key = eval_property_key(class_cx, &class_env, &method.key, method.computed)
                    .await?;
                define_method(target, key, &closure, method.kind);
            }
            ast::ClassElement::PropertyDefinition(field) => {
                let value = match &field.value {
                    Some(expression) => ClassFieldValue::Expression(expression),
                    None => ClassFieldValue::None,
                };
                let key = if let Some(private) = private_identifier(&field.key) {
                    ClassFieldKey::Private(
                        private_environment
                            .as_ref()
                            .and_then(|p| p.resolve(&JsString::new(private)))
                            .expect("private name was just declared"),
                    )
                } else {
                    ClassFieldKey::Property(
                        eval_property_key(class_cx, &class_env, &field.key, field.computed)
                            .await?,
                    )
                };
                if field.r#static {
                    // Static fields evaluate now, with `this` = constructor.
                    let static_env = Environment::new_function(&class_env, false);
                    static_env.bind_this(Value::Function(constructor.clone()))?;
                    let value = match value {
                        ClassFieldValue::Expression(expression) => {
                            eval_expression(class_cx, &static_env, expression).await?
                        }
                        ClassFieldValue::Method(closure) => Value::Function(closure),
                        ClassFieldValue::None => Value::Undefined,
                    };
                    match key {
                        ClassFieldKey::Private(id) => {
                            constructor.object().private_set(id, value);
                        }
                        ClassFieldKey::Property(key) => {
                            constructor
                                .object()
                                .insert_slot(key, PropertySlot::data(value));
                        }
                    }
                } else {
                    fields.push(ClassFieldInitializer { key, value });
                }
            }
            ast::ClassElement::StaticBlock(block) => {
                let static_env = Environment::new_function(&class_env, false);
                static_env.bind_this(Value::Function(constructor.clone()))?;
                crate::engine::interpreter::hoist_declarations(
                    class_cx,
                    &static_env,
                    &block.body,
                )?;
                let completion = crate::engine::interpreter::eval_statement_list(
                    class_cx,
                    &static_env,
                    &block.body,
                )
                .await?;
                let _ = completion;
            }
            _ => {
                return Err(agent.throw_exception(
                    ExceptionType::SyntaxError,
                    "Unsupported class member",
                ));
            }
        }
    }

    // 7. Attach the collected instance fields to the constructor.
    if !fields.is_empty() {
        if let ObjectKind::Function(data) = &mut constructor.object().data_mut().kind {
            if let FunctionKind::Ecmascript(ecmascript) = &mut data.kind {
                ecmascript.fields = fields;
            }
        }
    }

    // 8. Initialize the class binding.
    if class.id.is_some() {
        class_env.initialize(&class_name, Value::Function(constructor.clone()));
    }
    Ok(Value::Function(constructor))
}

fn private_identifier(key: &'static ast::PropertyKey<'static>) -> Option<&'static str> {
    match key {
        ast::PropertyKey::PrivateIdentifier(private) => Some(private.name.as_str()),
        _ => None,
    }
}

async fn method_name(
    cx: &ExecutionContext,
    env: &Environment,
    key: &'static ast::PropertyKey<'static>,
    computed: bool,
) -> JsResult<JsString> {
    if let Some(private) = private_identifier(key) {
        return Ok(JsString::from(format!("#{private}")));
    }
    let key = eval_property_key(cx, env, key, computed).await?;
    Ok(key.to_display_string())
}

/// Defines a method, getter, or setter slot, merging accessor pairs.
pub(crate) fn define_method(
    target: &JsObject,
    key: PropertyKey,
    closure: &JsFunction,
    kind: ast::MethodDefinitionKind,
) {
    match kind {
        ast::MethodDefinitionKind::Get => {
            let set = match target.own_slot(&key) {
                Some(PropertySlot::Accessor { set, .. }) => set,
                _ => None,
            };
            target.insert_slot(
                key,
                PropertySlot::Accessor {
                    get: Some(Value::Function(closure.clone())),
                    set,
                    enumerable: false,
                    configurable: true,
                },
            );
        }
        ast::MethodDefinitionKind::Set => {
            let get = match target.own_slot(&key) {
                Some(PropertySlot::Accessor { get, .. }) => get,
                _ => None,
            };
            target.insert_slot(
                key,
                PropertySlot::Accessor {
                    get,
                    set: Some(Value::Function(closure.clone())),
                    enumerable: false,
                    configurable: true,
                },
            );
        }
        _ => {
            target.insert_slot(key, PropertySlot::method(Value::Function(closure.clone())));
        }
    }
}

pub(crate) fn set_home_object(function: &JsFunction, home: &JsObject) {
    if let ObjectKind::Function(data) = &function.object().data().kind {
        if let FunctionKind::Ecmascript(ecmascript) = &data.kind {
            *ecmascript.home_object.borrow_mut() = Some(home.clone());
        }
    }
}
