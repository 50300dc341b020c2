// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use core::cell::{Ref, RefCell, RefMut};
use core::fmt;
use std::rc::Rc;

use hashbrown::HashMap;
use indexmap::IndexMap;

use crate::ecmascript::builtins::array::ArrayIteratorData;
use crate::ecmascript::builtins::control_abstraction_objects::{GeneratorData, PromiseData};
use crate::ecmascript::builtins::error::ErrorData;
use crate::ecmascript::builtins::numbers_and_dates::DateData;
use crate::ecmascript::builtins::text_processing::StringIteratorData;
use crate::ecmascript::scripts_and_modules::module::NamespaceData;
use crate::ecmascript::types::property_descriptor::PropertySlot;
use crate::ecmascript::types::property_key::PropertyKey;
use crate::sandbox::barrier::{BarrierData, HostBufferData};

use super::function::FunctionData;
use super::value::Value;

/// ### [6.1.7 The Object Type](https://tc39.es/ecma262/#sec-object-type)
///
/// A shared-ownership handle to an object record. Identity is the
/// allocation; cloning copies the handle.
#[derive(Clone)]
pub struct JsObject(Rc<RefCell<ObjectData>>);

/// The object record proper: an insertion-ordered property table, a
/// prototype edge, an extensibility flag, and the internal-slot bag that
/// selects exotic behavior.
#[derive(Debug)]
pub(crate) struct ObjectData {
    pub(crate) prototype: Option<JsObject>,
    pub(crate) extensible: bool,
    pub(crate) properties: IndexMap<PropertyKey, PropertySlot>,
    /// Private class fields and methods, keyed by private-name id. Never
    /// visible in own-key enumeration.
    pub(crate) private_fields: HashMap<u64, Value>,
    pub(crate) kind: ObjectKind,
}

/// Internal class tag plus per-kind internal slots.
#[derive(Debug)]
pub(crate) enum ObjectKind {
    Ordinary,
    Array(ArrayData),
    Function(FunctionData),
    Error(ErrorData),
    Date(DateData),
    Primitive(PrimitiveData),
    ArrayIterator(ArrayIteratorData),
    StringIterator(StringIteratorData),
    Generator(GeneratorData),
    Promise(PromiseData),
    Namespace(NamespaceData),
    HostWrapped(BarrierData),
    HostBuffer(HostBufferData),
}

/// ### [10.4.2 Array Exotic Objects](https://tc39.es/ecma262/#sec-array-exotic-objects)
///
/// Elements live in the ordinary property table under index keys; only the
/// reactive `length` is an internal slot.
#[derive(Debug)]
pub(crate) struct ArrayData {
    pub(crate) length: u32,
}

/// ### [10.4.3 String Exotic Objects](https://tc39.es/ecma262/#sec-string-exotic-objects) and friends
///
/// The `[[BooleanData]]`/`[[NumberData]]`/… slot of primitive wrapper
/// objects.
#[derive(Debug, Clone)]
pub(crate) enum PrimitiveData {
    Boolean(bool),
    Number(f64),
    String(super::string::JsString),
    Symbol(super::symbol::JsSymbol),
    BigInt(super::bigint::JsBigInt),
}

impl JsObject {
    pub(crate) fn new(prototype: Option<JsObject>, kind: ObjectKind) -> Self {
        Self(Rc::new(RefCell::new(ObjectData {
            prototype,
            extensible: true,
            properties: IndexMap::new(),
            private_fields: HashMap::new(),
            kind,
        })))
    }

    pub(crate) fn ordinary(prototype: Option<JsObject>) -> Self {
        Self::new(prototype, ObjectKind::Ordinary)
    }

    pub(crate) fn data(&self) -> Ref<'_, ObjectData> {
        self.0.borrow()
    }

    pub(crate) fn data_mut(&self) -> RefMut<'_, ObjectData> {
        self.0.borrow_mut()
    }

    pub fn ptr_eq(&self, other: &JsObject) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn address(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    pub fn prototype(&self) -> Option<JsObject> {
        self.0.borrow().prototype.clone()
    }

    pub(crate) fn set_prototype(&self, prototype: Option<JsObject>) {
        self.0.borrow_mut().prototype = prototype;
    }

    pub(crate) fn is_extensible(&self) -> bool {
        self.0.borrow().extensible
    }

    pub(crate) fn prevent_extensions(&self) {
        self.0.borrow_mut().extensible = false;
    }

    /// The internal class tag (`"Array"`, `"Function"`, `"Error"`, …).
    pub fn class_tag(&self) -> &'static str {
        match &self.0.borrow().kind {
            ObjectKind::Ordinary => "Object",
            ObjectKind::Array(_) => "Array",
            ObjectKind::Function(_) => "Function",
            ObjectKind::Error(_) => "Error",
            ObjectKind::Date(_) => "Date",
            ObjectKind::Primitive(data) => match data {
                PrimitiveData::Boolean(_) => "Boolean",
                PrimitiveData::Number(_) => "Number",
                PrimitiveData::String(_) => "String",
                PrimitiveData::Symbol(_) => "Symbol",
                PrimitiveData::BigInt(_) => "BigInt",
            },
            ObjectKind::ArrayIterator(_) => "Array Iterator",
            ObjectKind::StringIterator(_) => "String Iterator",
            ObjectKind::Generator(data) => {
                if data.is_async {
                    "AsyncGenerator"
                } else {
                    "Generator"
                }
            }
            ObjectKind::Promise(_) => "Promise",
            ObjectKind::Namespace(_) => "Module",
            ObjectKind::HostWrapped(_) => "Object",
            ObjectKind::HostBuffer(_) => "Uint8Array",
        }
    }

    pub(crate) fn is_array(&self) -> bool {
        matches!(self.0.borrow().kind, ObjectKind::Array(_))
    }

    pub(crate) fn is_callable(&self) -> bool {
        matches!(self.0.borrow().kind, ObjectKind::Function(_))
    }

    pub(crate) fn is_host_wrapped(&self) -> bool {
        matches!(self.0.borrow().kind, ObjectKind::HostWrapped(_))
    }

    /// Array `length`, when this is an array.
    pub(crate) fn array_length(&self) -> Option<u32> {
        match &self.0.borrow().kind {
            ObjectKind::Array(data) => Some(data.length),
            _ => None,
        }
    }

    pub(crate) fn set_array_length_slot(&self, length: u32) {
        if let ObjectKind::Array(data) = &mut self.0.borrow_mut().kind {
            data.length = length;
        }
    }

    /// Raw own-slot read, no prototype walk, no accessor invocation.
    pub(crate) fn own_slot(&self, key: &PropertyKey) -> Option<PropertySlot> {
        self.0.borrow().properties.get(key).cloned()
    }

    pub(crate) fn insert_slot(&self, key: PropertyKey, slot: PropertySlot) {
        self.0.borrow_mut().properties.insert(key, slot);
    }

    pub(crate) fn remove_slot(&self, key: &PropertyKey) -> bool {
        self.0.borrow_mut().properties.shift_remove(key).is_some()
    }

    pub(crate) fn has_own(&self, key: &PropertyKey) -> bool {
        self.0.borrow().properties.contains_key(key)
    }

    /// ### [10.1.11 OrdinaryOwnPropertyKeys](https://tc39.es/ecma262/#sec-ordinaryownpropertykeys)
    ///
    /// Array indices ascending, then strings in insertion order, then
    /// symbols in insertion order.
    pub(crate) fn own_keys(&self) -> Vec<PropertyKey> {
        let data = self.0.borrow();
        let mut indices: Vec<u32> = Vec::new();
        let mut strings: Vec<PropertyKey> = Vec::new();
        let mut symbols: Vec<PropertyKey> = Vec::new();
        for key in data.properties.keys() {
            match key {
                PropertyKey::Index(index) => indices.push(*index),
                PropertyKey::String(_) => strings.push(key.clone()),
                PropertyKey::Symbol(_) => symbols.push(key.clone()),
            }
        }
        indices.sort_unstable();
        let mut keys: Vec<PropertyKey> =
            indices.into_iter().map(PropertyKey::Index).collect();
        keys.extend(strings);
        keys.extend(symbols);
        keys
    }

    pub(crate) fn private_get(&self, id: u64) -> Option<Value> {
        self.0.borrow().private_fields.get(&id).cloned()
    }

    pub(crate) fn private_set(&self, id: u64, value: Value) {
        self.0.borrow_mut().private_fields.insert(id, value);
    }

    pub(crate) fn has_private(&self, id: u64) -> bool {
        self.0.borrow().private_fields.contains_key(&id)
    }
}

impl fmt::Debug for JsObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JsObject({} @ {:p})", self.class_tag(), Rc::as_ptr(&self.0))
    }
}

impl PartialEq for JsObject {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for JsObject {}

impl core::hash::Hash for JsObject {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.address().hash(state);
    }
}
