// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [9.3 Realms](https://tc39.es/ecma262/#sec-code-realms)
//!
//! One realm per agent: the intrinsic objects and the global environment.
//! Host globals live beside the intrinsics and are wrapped by the barrier
//! on first read.

use indexmap::IndexMap;

use crate::ecmascript::builtins::array::{
    create_array_constructor, create_array_prototype, ArrayIntrinsicParts,
};
use crate::ecmascript::builtins::control_abstraction_objects::{
    create_async_generator_prototype, create_generator_prototype, create_promise_prototype,
    GeneratorPrototypeParts,
};
use crate::ecmascript::builtins::error::{
    create_error_constructor, create_error_prototype, create_native_error_prototype,
};
use crate::ecmascript::builtins::fundamental_objects::{
    create_boolean_constructor, create_boolean_prototype, create_object_constructor,
    create_object_prototype_methods, create_symbol_constructor, create_symbol_prototype,
};
use crate::ecmascript::builtins::numbers_and_dates::{
    create_big_int_constructor, create_big_int_prototype, create_math_object,
    create_number_constructor, create_number_prototype, IsFiniteBuiltin, IsNanBuiltin,
    ParseFloatBuiltin, ParseIntBuiltin,
};
use crate::ecmascript::builtins::create_builtin_function;
use crate::ecmascript::builtins::structured_data::create_json_object;
use crate::ecmascript::builtins::text_processing::{
    create_string_constructor, create_string_prototype, StringIntrinsicParts,
};
use crate::ecmascript::types::language::object::JsObject;
use crate::ecmascript::types::{JsString, JsSymbol, Value};

use super::environments::{BindingKind, Environment};
use super::errors::ExceptionType;

/// The intrinsic objects of a realm. Immutable once built.
#[derive(Debug)]
pub(crate) struct Intrinsics {
    pub(crate) object_prototype: JsObject,
    pub(crate) function_prototype: JsObject,
    pub(crate) array_prototype: JsObject,
    pub(crate) array_iterator_prototype: JsObject,
    pub(crate) string_prototype: JsObject,
    pub(crate) string_iterator_prototype: JsObject,
    pub(crate) number_prototype: JsObject,
    pub(crate) boolean_prototype: JsObject,
    pub(crate) symbol_prototype: JsObject,
    pub(crate) bigint_prototype: JsObject,
    pub(crate) error_prototype: JsObject,
    pub(crate) type_error_prototype: JsObject,
    pub(crate) range_error_prototype: JsObject,
    pub(crate) reference_error_prototype: JsObject,
    pub(crate) syntax_error_prototype: JsObject,
    pub(crate) security_error_prototype: JsObject,
    pub(crate) module_error_prototype: JsObject,
    pub(crate) generator_prototype: JsObject,
    pub(crate) async_generator_prototype: JsObject,
    pub(crate) promise_prototype: JsObject,
    pub(crate) iterator_symbol: JsSymbol,
    pub(crate) async_iterator_symbol: JsSymbol,
}

impl Intrinsics {
    pub(crate) fn error_prototype_for(&self, kind: ExceptionType) -> JsObject {
        match kind {
            ExceptionType::TypeError => self.type_error_prototype.clone(),
            ExceptionType::RangeError => self.range_error_prototype.clone(),
            ExceptionType::ReferenceError => self.reference_error_prototype.clone(),
            ExceptionType::SyntaxError => self.syntax_error_prototype.clone(),
            ExceptionType::SecurityError => self.security_error_prototype.clone(),
            ExceptionType::ModuleError => self.module_error_prototype.clone(),
            ExceptionType::Generic => self.error_prototype.clone(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct Realm {
    pub(crate) intrinsics: Intrinsics,
    pub(crate) global_environment: Environment,
}

impl Realm {
    /// Builds the intrinsics and assembles the global scope.
    pub(crate) fn initialize(host_globals: IndexMap<JsString, Value>) -> Realm {
        let object_prototype = JsObject::ordinary(None);
        let function_prototype = JsObject::ordinary(Some(object_prototype.clone()));
        create_object_prototype_methods(&object_prototype, &function_prototype);

        let iterator_symbol = JsSymbol::new(1, Some(JsString::new("Symbol.iterator")));
        let async_iterator_symbol = JsSymbol::new(2, Some(JsString::new("Symbol.asyncIterator")));

        let (array_prototype, array_iterator_prototype) =
            create_array_prototype(&ArrayIntrinsicParts {
                object_prototype: &object_prototype,
                function_prototype: &function_prototype,
                iterator_symbol: &iterator_symbol,
            });
        let (string_prototype, string_iterator_prototype) =
            create_string_prototype(&StringIntrinsicParts {
                object_prototype: &object_prototype,
                function_prototype: &function_prototype,
                iterator_symbol: &iterator_symbol,
            });
        let number_prototype = create_number_prototype(&object_prototype, &function_prototype);
        let boolean_prototype = create_boolean_prototype(&object_prototype, &function_prototype);
        let symbol_prototype = create_symbol_prototype(&object_prototype, &function_prototype);
        let bigint_prototype = create_big_int_prototype(&object_prototype, &function_prototype);

        let error_prototype = create_error_prototype(&object_prototype, &function_prototype);
        let type_error_prototype = create_native_error_prototype(&error_prototype, "TypeError");
        let range_error_prototype = create_native_error_prototype(&error_prototype, "RangeError");
        let reference_error_prototype =
            create_native_error_prototype(&error_prototype, "ReferenceError");
        let syntax_error_prototype =
            create_native_error_prototype(&error_prototype, "SyntaxError");
        let security_error_prototype =
            create_native_error_prototype(&error_prototype, "SecurityError");
        let module_error_prototype =
            create_native_error_prototype(&error_prototype, "ModuleError");

        let generator_prototype = create_generator_prototype(&GeneratorPrototypeParts {
            object_prototype: &object_prototype,
            function_prototype: &function_prototype,
            iterator_symbol: &iterator_symbol,
        });
        let async_generator_prototype =
            create_async_generator_prototype(&GeneratorPrototypeParts {
                object_prototype: &object_prototype,
                function_prototype: &function_prototype,
                iterator_symbol: &async_iterator_symbol,
            });
        let promise_prototype = create_promise_prototype(&object_prototype, &function_prototype);

        let global_environment = Environment::new_global(host_globals);

        let intrinsics = Intrinsics {
            object_prototype,
            function_prototype,
            array_prototype,
            array_iterator_prototype,
            string_prototype,
            string_iterator_prototype,
            number_prototype,
            boolean_prototype,
            symbol_prototype,
            bigint_prototype,
            error_prototype,
            type_error_prototype,
            range_error_prototype,
            reference_error_prototype,
            syntax_error_prototype,
            security_error_prototype,
            module_error_prototype,
            generator_prototype,
            async_generator_prototype,
            promise_prototype,
            iterator_symbol,
            async_iterator_symbol,
        };

        let realm = Realm {
            intrinsics,
            global_environment,
        };
        realm.install_intrinsic_globals();
        realm
    }

    /// The intrinsic global bindings: constructors, namespaces, numeric
    /// constants and the free functions.
    fn install_intrinsic_globals(&self) {
        let intrinsics = &self.intrinsics;
        let function_prototype = &intrinsics.function_prototype;

        let object_constructor =
            create_object_constructor(&intrinsics.object_prototype, function_prototype);
        let array_constructor =
            create_array_constructor(&intrinsics.array_prototype, function_prototype);
        let string_constructor =
            create_string_constructor(&intrinsics.string_prototype, function_prototype);
        let number_constructor =
            create_number_constructor(&intrinsics.number_prototype, function_prototype);
        let boolean_constructor =
            create_boolean_constructor(&intrinsics.boolean_prototype, function_prototype);
        let symbol_constructor = create_symbol_constructor(
            &intrinsics.symbol_prototype,
            function_prototype,
            &intrinsics.iterator_symbol,
            &intrinsics.async_iterator_symbol,
        );
        let big_int_constructor =
            create_big_int_constructor(&intrinsics.bigint_prototype, function_prototype);
        let math = create_math_object(&intrinsics.object_prototype, function_prototype);
        let json = create_json_object(&intrinsics.object_prototype, function_prototype);

        let error_constructor = create_error_constructor(
            "Error",
            ExceptionType::Generic,
            &intrinsics.error_prototype,
            function_prototype,
        );
        let type_error_constructor = create_error_constructor(
            "TypeError",
            ExceptionType::TypeError,
            &intrinsics.type_error_prototype,
            function_prototype,
        );
        let range_error_constructor = create_error_constructor(
            "RangeError",
            ExceptionType::RangeError,
            &intrinsics.range_error_prototype,
            function_prototype,
        );
        let reference_error_constructor = create_error_constructor(
            "ReferenceError",
            ExceptionType::ReferenceError,
            &intrinsics.reference_error_prototype,
            function_prototype,
        );
        let syntax_error_constructor = create_error_constructor(
            "SyntaxError",
            ExceptionType::SyntaxError,
            &intrinsics.syntax_error_prototype,
            function_prototype,
        );
        let security_error_constructor = create_error_constructor(
            "SecurityError",
            ExceptionType::SecurityError,
            &intrinsics.security_error_prototype,
            function_prototype,
        );

        let parse_int = Value::Function(create_builtin_function::<ParseIntBuiltin>(
            function_prototype,
        ));
        let parse_float = Value::Function(create_builtin_function::<ParseFloatBuiltin>(
            function_prototype,
        ));
        let is_nan = Value::Function(create_builtin_function::<IsNanBuiltin>(function_prototype));
        let is_finite = Value::Function(create_builtin_function::<IsFiniteBuiltin>(
            function_prototype,
        ));

        let entries: [(&str, Value); 22] = [
            ("Object", Value::from(object_constructor)),
            ("Array", Value::from(array_constructor)),
            ("String", Value::from(string_constructor)),
            ("Number", Value::from(number_constructor)),
            ("Boolean", Value::from(boolean_constructor)),
            ("Symbol", Value::from(symbol_constructor)),
            ("BigInt", Value::from(big_int_constructor)),
            ("Math", Value::Object(math)),
            ("JSON", Value::Object(json)),
            ("Error", Value::from(error_constructor)),
            ("TypeError", Value::from(type_error_constructor)),
            ("RangeError", Value::from(range_error_constructor)),
            ("ReferenceError", Value::from(reference_error_constructor)),
            ("SyntaxError", Value::from(syntax_error_constructor)),
            ("SecurityError", Value::from(security_error_constructor)),
            ("NaN", Value::from(f64::NAN)),
            ("Infinity", Value::from(f64::INFINITY)),
            ("undefined", Value::Undefined),
            ("parseInt", parse_int),
            ("parseFloat", parse_float),
            ("isNaN", is_nan),
            ("isFinite", is_finite),
        ];
        for (name, value) in entries {
            let name = JsString::new(name);
            // Initial population of an empty scope cannot collide.
            self.global_environment
                .declare(&name, BindingKind::Var)
                .expect("global scope starts empty");
            self.global_environment.initialize(&name, value);
        }
    }
}
