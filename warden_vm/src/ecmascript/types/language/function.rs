// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use core::cell::RefCell;
use core::fmt;
use core::ops::Deref;
use std::rc::Rc;

use oxc_ast::ast;

use crate::ecmascript::builtins::Behaviour;
use crate::ecmascript::execution::environments::Environment;
use crate::ecmascript::scripts_and_modules::source_code::SourceCode;
use crate::ecmascript::syntax_directed_operations::class_definitions::PrivateEnvironment;
use crate::sandbox::host_function::HostCallable;

use super::object::JsObject;
use super::string::JsString;
use super::value::Value;

/// A callable object handle. The wrapped object's kind is always
/// [`crate::ecmascript::types::language::object::ObjectKind::Function`].
#[derive(Clone, PartialEq, Eq)]
pub struct JsFunction(pub(crate) JsObject);

impl JsFunction {
    pub(crate) fn object(&self) -> &JsObject {
        &self.0
    }

    pub(crate) fn into_object(self) -> JsObject {
        self.0
    }
}

impl Deref for JsFunction {
    type Target = JsObject;

    fn deref(&self) -> &JsObject {
        &self.0
    }
}

impl fmt::Debug for JsFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JsFunction(@ {:#x})", self.0.address())
    }
}

/// The function internal slots.
#[derive(Debug)]
pub(crate) struct FunctionData {
    pub(crate) name: RefCell<JsString>,
    pub(crate) kind: FunctionKind,
}

#[derive(Debug)]
pub(crate) enum FunctionKind {
    /// Interpreted closure over a captured environment.
    Ecmascript(EcmascriptFunctionData),
    /// Intrinsic (runtime-provided) native function.
    Builtin(BuiltinFunctionData),
    /// Host callable adapted through the sandbox barrier.
    HostAdapted(HostFunctionData),
}

/// ### [10.2 ECMAScript Function Objects](https://tc39.es/ecma262/#sec-ecmascript-function-objects)
pub(crate) struct EcmascriptFunctionData {
    pub(crate) environment: Environment,
    pub(crate) private_environment: Option<PrivateEnvironment>,
    /// Keeps the AST the `params`/`body` references point into alive.
    pub(crate) source: Rc<SourceCode>,
    /// `None` only for default class constructors.
    pub(crate) params: Option<&'static ast::FormalParameters<'static>>,
    /// `None` only for default class constructors.
    pub(crate) body: Option<&'static ast::FunctionBody<'static>>,
    pub(crate) this_mode: ThisMode,
    pub(crate) is_async: bool,
    pub(crate) is_generator: bool,
    /// Expression-bodied arrow: the single body statement is an implicit
    /// return.
    pub(crate) is_concise_arrow: bool,
    pub(crate) constructor_status: ConstructorStatus,
    pub(crate) home_object: RefCell<Option<JsObject>>,
    /// Instance field initializers, run at construction. Only class
    /// constructors carry these.
    pub(crate) fields: Vec<ClassFieldInitializer>,
}

impl fmt::Debug for EcmascriptFunctionData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcmascriptFunctionData")
            .field("this_mode", &self.this_mode)
            .field("is_async", &self.is_async)
            .field("is_generator", &self.is_generator)
            .field("constructor_status", &self.constructor_status)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ThisMode {
    /// Arrow forms: `this` is captured from the defining environment.
    Lexical,
    /// Everything else: `this` comes from the call form.
    Dynamic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConstructorStatus {
    /// Arrows, generators, async functions, methods: `new` throws.
    NotConstructor,
    /// Plain function declarations and expressions.
    Constructor,
    /// `class C {}` constructor.
    BaseClass,
    /// `class C extends S {}` constructor: `this` stays uninitialized until
    /// `super()` runs.
    DerivedClass,
}

impl ConstructorStatus {
    pub(crate) fn is_constructor(self) -> bool {
        !matches!(self, ConstructorStatus::NotConstructor)
    }

    pub(crate) fn is_class_constructor(self) -> bool {
        matches!(
            self,
            ConstructorStatus::BaseClass | ConstructorStatus::DerivedClass
        )
    }
}

/// One instance field of a class, evaluated per construction in declaration
/// order. Computed keys are evaluated once, at class definition time.
#[derive(Debug, Clone)]
pub(crate) struct ClassFieldInitializer {
    pub(crate) key: ClassFieldKey,
    pub(crate) value: ClassFieldValue,
}

#[derive(Debug, Clone)]
pub(crate) enum ClassFieldValue {
    /// Field with no initializer: `undefined`.
    None,
    /// Initializer expression, evaluated per construction.
    Expression(&'static ast::Expression<'static>),
    /// Private method: the shared closure, installed per instance.
    Method(JsFunction),
}

#[derive(Debug, Clone)]
pub(crate) enum ClassFieldKey {
    Property(crate::ecmascript::types::property_key::PropertyKey),
    Private(u64),
}

/// Intrinsic function slots, in the shape of the `Builtin` machinery.
pub(crate) struct BuiltinFunctionData {
    pub(crate) length: u8,
    pub(crate) behaviour: Behaviour,
}

impl fmt::Debug for BuiltinFunctionData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltinFunctionData")
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}

/// A host callable adapted into the sandbox: calls go through this single
/// point, `this` stays bound to the original host receiver, and the async
/// flag records whether the host callable produces a future.
pub(crate) struct HostFunctionData {
    pub(crate) callable: HostCallable,
    pub(crate) is_async: bool,
    pub(crate) constructable: bool,
    /// The host receiver the callable was read off, if any.
    pub(crate) this_target: Option<Value>,
    /// Display path for sandbox error messages.
    pub(crate) display_path: String,
}

impl fmt::Debug for HostFunctionData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostFunctionData")
            .field("is_async", &self.is_async)
            .field("display_path", &self.display_path)
            .finish_non_exhaustive()
    }
}
