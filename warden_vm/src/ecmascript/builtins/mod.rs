// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Intrinsic (runtime-provided) objects and the machinery to define them.

pub mod array;
pub mod control_abstraction_objects;
pub mod error;
pub mod fundamental_objects;
pub mod numbers_and_dates;
pub mod ordinary;
pub mod structured_data;
pub mod text_processing;

use core::cell::RefCell;

use crate::ecmascript::execution::agent::Agent;
use crate::ecmascript::execution::errors::JsResult;
use crate::ecmascript::types::language::function::{BuiltinFunctionData, FunctionData, FunctionKind};
use crate::ecmascript::types::language::object::{JsObject, ObjectKind};
use crate::ecmascript::types::property_descriptor::PropertySlot;
use crate::ecmascript::types::{JsFunction, JsString, PropertyKey, Value};

/// Arguments to a builtin call. Missing arguments read as `undefined`.
#[derive(Debug, Clone, Copy)]
pub struct ArgumentsList<'a>(pub(crate) &'a [Value]);

impl ArgumentsList<'_> {
    pub fn get(&self, index: usize) -> Value {
        self.0.get(index).cloned().unwrap_or(Value::Undefined)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn slice(&self) -> &[Value] {
        self.0
    }
}

/// Declares a `Builtin` impl for a prototype method in one line.
macro_rules! builtin {
    ($struct_name:ident, $js_name:literal, $length:literal, $fn_name:ident) => {
        pub(crate) struct $struct_name;
        impl Builtin for $struct_name {
            const NAME: &'static str = $js_name;
            const LENGTH: u8 = $length;
            const BEHAVIOUR: Behaviour = Behaviour::Regular($fn_name);
        }
    };
}
pub(crate) use builtin;

pub(crate) type RegularFn = fn(&Agent, Value, ArgumentsList<'_>) -> JsResult<Value>;

/// Constructor behaviour. The last argument is the prototype the instance
/// should get when the constructor was reached through `new` (possibly via
/// a subclass); `None` means the intrinsic was called, not constructed.
pub(crate) type ConstructorFn = fn(&Agent, ArgumentsList<'_>, Option<&JsObject>) -> JsResult<Value>;

#[derive(Clone, Copy)]
pub(crate) enum Behaviour {
    Regular(RegularFn),
    Constructor(ConstructorFn),
}

/// A builtin function definition: name, expected length, behaviour.
pub(crate) trait Builtin {
    const NAME: &'static str;
    const LENGTH: u8;
    const BEHAVIOUR: Behaviour;
}

/// Creates the function object for a builtin definition.
pub(crate) fn create_builtin_function<B: Builtin>(function_prototype: &JsObject) -> JsFunction {
    create_builtin(B::NAME, B::LENGTH, B::BEHAVIOUR, function_prototype)
}

pub(crate) fn create_builtin(
    name: &str,
    length: u8,
    behaviour: Behaviour,
    function_prototype: &JsObject,
) -> JsFunction {
    let data = FunctionData {
        name: RefCell::new(JsString::new(name)),
        kind: FunctionKind::Builtin(BuiltinFunctionData { length, behaviour }),
    };
    let object = JsObject::new(Some(function_prototype.clone()), ObjectKind::Function(data));
    object.insert_slot(
        PropertyKey::from("name"),
        PropertySlot::Data {
            value: Value::from(name),
            writable: false,
            enumerable: false,
            configurable: true,
        },
    );
    object.insert_slot(
        PropertyKey::from("length"),
        PropertySlot::Data {
            value: Value::from(f64::from(length)),
            writable: false,
            enumerable: false,
            configurable: true,
        },
    );
    JsFunction(object)
}

/// Fluent assembly of an intrinsic object, in the shape of the ordinary
/// object builder the prototypes are defined with.
pub(crate) struct OrdinaryObjectBuilder<'a> {
    object: JsObject,
    function_prototype: &'a JsObject,
}

impl<'a> OrdinaryObjectBuilder<'a> {
    pub(crate) fn new(object: JsObject, function_prototype: &'a JsObject) -> Self {
        Self {
            object,
            function_prototype,
        }
    }

    pub(crate) fn with_builtin_function_property<B: Builtin>(self) -> Self {
        let function = create_builtin_function::<B>(self.function_prototype);
        self.object.insert_slot(
            PropertyKey::from(B::NAME),
            PropertySlot::method(Value::Function(function)),
        );
        self
    }

    pub(crate) fn with_property(self, key: PropertyKey, value: Value) -> Self {
        self.object.insert_slot(key, PropertySlot::method(value));
        self
    }

    pub(crate) fn with_data_property(self, key: PropertyKey, value: Value) -> Self {
        self.object.insert_slot(key, PropertySlot::frozen(value));
        self
    }

    pub(crate) fn build(self) -> JsObject {
        self.object
    }
}
