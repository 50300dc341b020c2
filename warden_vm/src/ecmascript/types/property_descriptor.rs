// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::language::value::Value;

/// ### [6.2.6 The Property Descriptor Specification Type](https://tc39.es/ecma262/#sec-property-descriptor-specification-type)
///
/// Every field may be present or absent.
#[derive(Debug, Clone, Default)]
pub struct PropertyDescriptor {
    pub value: Option<Value>,
    pub writable: Option<bool>,
    pub get: Option<Value>,
    pub set: Option<Value>,
    pub enumerable: Option<bool>,
    pub configurable: Option<bool>,
}

impl PropertyDescriptor {
    pub(crate) fn data(value: Value, writable: bool, enumerable: bool, configurable: bool) -> Self {
        Self {
            value: Some(value),
            writable: Some(writable),
            enumerable: Some(enumerable),
            configurable: Some(configurable),
            ..Default::default()
        }
    }

    pub(crate) fn is_accessor_descriptor(&self) -> bool {
        self.get.is_some() || self.set.is_some()
    }
}

/// The stored form of a property: a data slot or an accessor slot.
#[derive(Debug, Clone)]
pub(crate) enum PropertySlot {
    Data {
        value: Value,
        writable: bool,
        enumerable: bool,
        configurable: bool,
    },
    Accessor {
        get: Option<Value>,
        set: Option<Value>,
        enumerable: bool,
        configurable: bool,
    },
}

impl PropertySlot {
    pub(crate) fn data(value: Value) -> Self {
        Self::Data {
            value,
            writable: true,
            enumerable: true,
            configurable: true,
        }
    }

    /// Method-style slot: writable and configurable but not enumerable.
    pub(crate) fn method(value: Value) -> Self {
        Self::Data {
            value,
            writable: true,
            enumerable: false,
            configurable: true,
        }
    }

    pub(crate) fn frozen(value: Value) -> Self {
        Self::Data {
            value,
            writable: false,
            enumerable: false,
            configurable: false,
        }
    }

    pub(crate) fn is_enumerable(&self) -> bool {
        match self {
            Self::Data { enumerable, .. } | Self::Accessor { enumerable, .. } => *enumerable,
        }
    }

    pub(crate) fn is_configurable(&self) -> bool {
        match self {
            Self::Data { configurable, .. } | Self::Accessor { configurable, .. } => *configurable,
        }
    }

    pub(crate) fn from_descriptor(descriptor: &PropertyDescriptor) -> Self {
        if descriptor.is_accessor_descriptor() {
            Self::Accessor {
                get: descriptor.get.clone(),
                set: descriptor.set.clone(),
                enumerable: descriptor.enumerable.unwrap_or(false),
                configurable: descriptor.configurable.unwrap_or(false),
            }
        } else {
            Self::Data {
                value: descriptor.value.clone().unwrap_or(Value::Undefined),
                writable: descriptor.writable.unwrap_or(false),
                enumerable: descriptor.enumerable.unwrap_or(false),
                configurable: descriptor.configurable.unwrap_or(false),
            }
        }
    }

    /// Applies a partial descriptor on top of an existing slot.
    pub(crate) fn apply(&mut self, descriptor: &PropertyDescriptor) {
        if descriptor.is_accessor_descriptor() {
            let (enumerable, configurable) = (self.is_enumerable(), self.is_configurable());
            let (mut get, mut set) = match self {
                Self::Accessor { get, set, .. } => (get.clone(), set.clone()),
                Self::Data { .. } => (None, None),
            };
            if descriptor.get.is_some() {
                get = descriptor.get.clone();
            }
            if descriptor.set.is_some() {
                set = descriptor.set.clone();
            }
            *self = Self::Accessor {
                get,
                set,
                enumerable: descriptor.enumerable.unwrap_or(enumerable),
                configurable: descriptor.configurable.unwrap_or(configurable),
            };
        } else {
            let (enumerable, configurable) = (self.is_enumerable(), self.is_configurable());
            let (mut value, mut writable) = match self {
                Self::Data {
                    value, writable, ..
                } => (value.clone(), *writable),
                Self::Accessor { .. } => (Value::Undefined, false),
            };
            if let Some(new_value) = &descriptor.value {
                value = new_value.clone();
            }
            if let Some(new_writable) = descriptor.writable {
                writable = new_writable;
            }
            *self = Self::Data {
                value,
                writable,
                enumerable: descriptor.enumerable.unwrap_or(enumerable),
                configurable: descriptor.configurable.unwrap_or(configurable),
            };
        }
    }

    pub(crate) fn to_descriptor(&self) -> PropertyDescriptor {
        match self {
            Self::Data {
                value,
                writable,
                enumerable,
                configurable,
            } => PropertyDescriptor {
                value: Some(value.clone()),
                writable: Some(*writable),
                enumerable: Some(*enumerable),
                configurable: Some(*configurable),
                ..Default::default()
            },
            Self::Accessor {
                get,
                set,
                enumerable,
                configurable,
            } => PropertyDescriptor {
                get: get.clone(),
                set: set.clone(),
                enumerable: Some(*enumerable),
                configurable: Some(*configurable),
                ..Default::default()
            },
        }
    }
}
