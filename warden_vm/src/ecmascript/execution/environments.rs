// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [9.1 Environment Records](https://tc39.es/ecma262/#sec-environment-records)
//!
//! Chained scope records. A binding is declared (possibly uninitialized,
//! the temporal dead zone), then initialized, then read or reassigned.
//! Reading or writing a TDZ binding throws; reassigning a `const` throws.

use core::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::ecmascript::types::{JsString, Value};
use crate::sandbox::barrier;

use super::errors::{ExceptionType, JsError, JsResult};

/// A lexical scope handle; clones share the record.
#[derive(Debug, Clone)]
pub(crate) struct Environment(Rc<EnvironmentRecord>);

#[derive(Debug)]
pub(crate) struct EnvironmentRecord {
    kind: EnvironmentKind,
    bindings: RefCell<IndexMap<JsString, Binding>>,
    parent: Option<Environment>,
}

#[derive(Debug)]
pub(crate) enum EnvironmentKind {
    /// The agent-wide outermost scope. Misses fall back to the lazily
    /// wrapped host globals.
    Global {
        host_globals: RefCell<IndexMap<JsString, HostGlobalSlot>>,
    },
    Module,
    Function {
        /// Arrow functions do not provide `this`; the walk continues past
        /// them.
        lexical_this: bool,
        /// `None` until bound: a derived constructor's `this` stays in TDZ
        /// until `super()` returns.
        this_value: RefCell<Option<Value>>,
    },
    Block,
    Catch,
}

#[derive(Debug)]
pub(crate) struct HostGlobalSlot {
    pub(crate) raw: Value,
    pub(crate) wrapped: Option<Value>,
}

#[derive(Debug, Clone)]
pub(crate) enum Binding {
    Declared {
        kind: BindingKind,
        /// `None` while in the temporal dead zone.
        value: Option<Value>,
    },
    /// Live indirection into another module's environment; reads re-resolve
    /// so cyclic imports observe late initialization.
    Indirect {
        environment: Environment,
        name: JsString,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BindingKind {
    Let,
    Const,
    Var,
    Param,
    Function,
}

impl BindingKind {
    fn is_lexical(self) -> bool {
        matches!(self, BindingKind::Let | BindingKind::Const | BindingKind::Function)
    }
}

impl Environment {
    pub(crate) fn new_global(host_globals: IndexMap<JsString, Value>) -> Self {
        let host_globals = host_globals
            .into_iter()
            .map(|(name, raw)| (name, HostGlobalSlot { raw, wrapped: None }))
            .collect();
        Self(Rc::new(EnvironmentRecord {
            kind: EnvironmentKind::Global {
                host_globals: RefCell::new(host_globals),
            },
            bindings: RefCell::new(IndexMap::new()),
            parent: None,
        }))
    }

    pub(crate) fn new_block(parent: &Environment) -> Self {
        Self::with_kind(EnvironmentKind::Block, Some(parent.clone()))
    }

    pub(crate) fn new_catch(parent: &Environment) -> Self {
        Self::with_kind(EnvironmentKind::Catch, Some(parent.clone()))
    }

    pub(crate) fn new_module(parent: &Environment) -> Self {
        Self::with_kind(EnvironmentKind::Module, Some(parent.clone()))
    }

    pub(crate) fn new_function(parent: &Environment, lexical_this: bool) -> Self {
        Self::with_kind(
            EnvironmentKind::Function {
                lexical_this,
                this_value: RefCell::new(None),
            },
            Some(parent.clone()),
        )
    }

    fn with_kind(kind: EnvironmentKind, parent: Option<Environment>) -> Self {
        Self(Rc::new(EnvironmentRecord {
            kind,
            bindings: RefCell::new(IndexMap::new()),
            parent,
        }))
    }

    /// Declares a binding in this record. Lexical redeclaration and
    /// lexical/`var` collisions fail; `var` over `var` is idempotent.
    pub(crate) fn declare(&self, name: &JsString, kind: BindingKind) -> JsResult<()> {
        let mut bindings = self.0.bindings.borrow_mut();
        if let Some(existing) = bindings.get(name) {
            let existing_kind = match existing {
                Binding::Declared { kind, .. } => *kind,
                Binding::Indirect { .. } => {
                    return Err(redeclaration(name));
                }
            };
            if kind == BindingKind::Var && existing_kind == BindingKind::Var {
                return Ok(());
            }
            if kind == BindingKind::Param && existing_kind == BindingKind::Param {
                // Duplicate parameter names are a parse-time error in strict
                // code; tolerate the re-bind for destructured params.
                return Ok(());
            }
            if kind.is_lexical() || existing_kind.is_lexical() {
                return Err(redeclaration(name));
            }
            return Ok(());
        }
        bindings.insert(
            name.clone(),
            Binding::Declared { kind, value: None },
        );
        Ok(())
    }

    pub(crate) fn declare_indirect(
        &self,
        name: &JsString,
        target: &Environment,
        target_name: &JsString,
    ) -> JsResult<()> {
        let mut bindings = self.0.bindings.borrow_mut();
        if bindings.contains_key(name) {
            return Err(redeclaration(name));
        }
        bindings.insert(
            name.clone(),
            Binding::Indirect {
                environment: target.clone(),
                name: target_name.clone(),
            },
        );
        Ok(())
    }

    /// Declares a `var` in the nearest function, module, or global record.
    pub(crate) fn declare_var(&self, name: &JsString) -> JsResult<()> {
        self.var_target().declare(name, BindingKind::Var)
    }

    /// Hoists a `var`: declares it at the var target and gives it
    /// `undefined` unless it already holds a value.
    pub(crate) fn hoist_var(&self, name: &JsString) -> JsResult<()> {
        let target = self.var_target();
        target.declare(name, BindingKind::Var)?;
        let mut bindings = target.0.bindings.borrow_mut();
        if let Some(Binding::Declared { value: slot @ None, .. }) = bindings.get_mut(name) {
            *slot = Some(Value::Undefined);
        }
        Ok(())
    }

    pub(crate) fn var_target(&self) -> Environment {
        let mut current = self.clone();
        loop {
            match current.0.kind {
                EnvironmentKind::Global { .. }
                | EnvironmentKind::Module
                | EnvironmentKind::Function { .. } => return current,
                EnvironmentKind::Block | EnvironmentKind::Catch => {
                    let parent = current.0.parent.clone().expect("scope chain ends at global");
                    current = parent;
                }
            }
        }
    }

    pub(crate) fn initialize(&self, name: &JsString, value: Value) {
        let mut bindings = self.0.bindings.borrow_mut();
        match bindings.get_mut(name) {
            Some(Binding::Declared { value: slot, .. }) => *slot = Some(value),
            _ => {
                // var assignment paths may initialize without declaring.
                bindings.insert(
                    name.clone(),
                    Binding::Declared {
                        kind: BindingKind::Var,
                        value: Some(value),
                    },
                );
            }
        }
    }

    /// Walks the chain and reassigns `name`.
    pub(crate) fn assign(&self, name: &JsString, value: Value) -> JsResult<()> {
        let mut current = Some(self.clone());
        while let Some(environment) = current {
            let mut resolved_indirect: Option<(Environment, JsString)> = None;
            {
                let mut bindings = environment.0.bindings.borrow_mut();
                if let Some(binding) = bindings.get_mut(name) {
                    match binding {
                        Binding::Declared { kind, value: slot } => {
                            if slot.is_none() {
                                return Err(tdz(name));
                            }
                            if *kind == BindingKind::Const {
                                return Err(JsError::new(
                                    ExceptionType::TypeError,
                                    format!("Assignment to constant variable '{name}'"),
                                ));
                            }
                            *slot = Some(value);
                            return Ok(());
                        }
                        Binding::Indirect { environment, name } => {
                            resolved_indirect = Some((environment.clone(), name.clone()));
                        }
                    }
                }
            }
            if resolved_indirect.is_some() {
                // Imported bindings are immutable in the importer.
                return Err(JsError::new(
                    ExceptionType::TypeError,
                    format!("Assignment to imported binding '{name}'"),
                ));
            }
            if let EnvironmentKind::Global { host_globals } = &environment.0.kind {
                if host_globals.borrow().contains_key(name) {
                    return Err(JsError::new(
                        ExceptionType::TypeError,
                        format!("Cannot assign to host-provided global '{name}'"),
                    ));
                }
            }
            current = environment.0.parent.clone();
        }
        Err(not_defined(name))
    }

    /// Walks the chain and reads `name`.
    pub(crate) fn lookup(&self, name: &JsString) -> JsResult<Value> {
        match self.lookup_optional(name)? {
            Some(value) => Ok(value),
            None => Err(not_defined(name)),
        }
    }

    /// As [`Environment::lookup`], but an unresolved name is `None` instead
    /// of an error (`typeof` never throws on undeclared names). TDZ still
    /// throws.
    pub(crate) fn lookup_optional(&self, name: &JsString) -> JsResult<Option<Value>> {
        let mut current = Some(self.clone());
        while let Some(environment) = current {
            let found = environment.0.bindings.borrow().get(name).cloned();
            if let Some(binding) = found {
                match binding {
                    Binding::Declared { value: Some(value), .. } => return Ok(Some(value)),
                    Binding::Declared { value: None, .. } => return Err(tdz(name)),
                    Binding::Indirect { environment, name } => {
                        return environment.lookup(&name).map(Some);
                    }
                }
            }
            if let EnvironmentKind::Global { host_globals } = &environment.0.kind {
                let mut globals = host_globals.borrow_mut();
                if let Some(slot) = globals.get_mut(name) {
                    if slot.wrapped.is_none() {
                        slot.wrapped = Some(barrier::wrap_global(slot.raw.clone(), name));
                    }
                    return Ok(slot.wrapped.clone());
                }
            }
            current = environment.0.parent.clone();
        }
        Ok(None)
    }

    pub(crate) fn has_binding(&self, name: &JsString) -> bool {
        self.0.bindings.borrow().contains_key(name)
    }

    /// The environment that provides `this`: nearest non-arrow function,
    /// module, or global record.
    pub(crate) fn this_environment(&self) -> Environment {
        let mut current = self.clone();
        loop {
            match &current.0.kind {
                EnvironmentKind::Function { lexical_this: false, .. }
                | EnvironmentKind::Global { .. }
                | EnvironmentKind::Module => return current,
                _ => {}
            }
            match current.0.parent.clone() {
                Some(parent) => current = parent,
                None => return current,
            }
        }
    }

    /// ### [9.1.1.3.4 GetThisBinding](https://tc39.es/ecma262/#sec-function-environment-records-getthisbinding)
    pub(crate) fn get_this(&self) -> JsResult<Value> {
        let environment = self.this_environment();
        match &environment.0.kind {
            EnvironmentKind::Function { this_value, .. } => match &*this_value.borrow() {
                Some(value) => Ok(value.clone()),
                None => Err(JsError::new(
                    ExceptionType::ReferenceError,
                    "Must call super constructor before accessing 'this'",
                )),
            },
            // Strict top level: `this` is undefined.
            _ => Ok(Value::Undefined),
        }
    }

    /// Binds `this` in the nearest function record. Fails when already
    /// bound (`super()` called twice).
    pub(crate) fn bind_this(&self, value: Value) -> JsResult<()> {
        let environment = self.this_environment();
        match &environment.0.kind {
            EnvironmentKind::Function { this_value, .. } => {
                let mut slot = this_value.borrow_mut();
                if slot.is_some() {
                    return Err(JsError::new(
                        ExceptionType::ReferenceError,
                        "Super constructor may only be called once",
                    ));
                }
                *slot = Some(value);
                Ok(())
            }
            _ => Err(JsError::new(
                ExceptionType::SyntaxError,
                "'super' keyword unexpected here",
            )),
        }
    }

    /// Whether `this` is already bound in the nearest function record.
    pub(crate) fn is_this_bound(&self) -> bool {
        let environment = self.this_environment();
        match &environment.0.kind {
            EnvironmentKind::Function { this_value, .. } => this_value.borrow().is_some(),
            _ => true,
        }
    }
}

fn redeclaration(name: &JsString) -> JsError {
    JsError::new(
        ExceptionType::SyntaxError,
        format!("Identifier '{name}' has already been declared"),
    )
}

fn tdz(name: &JsString) -> JsError {
    JsError::new(
        ExceptionType::ReferenceError,
        format!("Cannot access '{name}' before initialization"),
    )
}

fn not_defined(name: &JsString) -> JsError {
    JsError::new(
        ExceptionType::ReferenceError,
        format!("{name} is not defined"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global() -> Environment {
        Environment::new_global(IndexMap::new())
    }

    #[test]
    fn tdz_read_fails() {
        let env = global();
        let name = JsString::new("x");
        env.declare(&name, BindingKind::Let).unwrap();
        assert_eq!(
            env.lookup(&name).unwrap_err().kind(),
            ExceptionType::ReferenceError
        );
        env.initialize(&name, Value::from(1.0));
        assert_eq!(env.lookup(&name).unwrap().as_number(), Some(1.0));
    }

    #[test]
    fn const_is_single_assignment() {
        let env = global();
        let name = JsString::new("c");
        env.declare(&name, BindingKind::Const).unwrap();
        env.initialize(&name, Value::from(1.0));
        assert_eq!(
            env.assign(&name, Value::from(2.0)).unwrap_err().kind(),
            ExceptionType::TypeError
        );
    }

    #[test]
    fn lexical_redeclaration_fails_var_is_idempotent() {
        let env = global();
        let name = JsString::new("x");
        env.declare(&name, BindingKind::Var).unwrap();
        env.declare(&name, BindingKind::Var).unwrap();
        assert!(env.declare(&name, BindingKind::Let).is_err());
    }

    #[test]
    fn var_hoists_past_blocks() {
        let env = global();
        let block = Environment::new_block(&env);
        let name = JsString::new("v");
        block.declare_var(&name).unwrap();
        assert!(env.has_binding(&name));
    }

    #[test]
    fn shadowing_in_child_scope() {
        let env = global();
        let name = JsString::new("x");
        env.declare(&name, BindingKind::Let).unwrap();
        env.initialize(&name, Value::from(1.0));
        let block = Environment::new_block(&env);
        block.declare(&name, BindingKind::Let).unwrap();
        block.initialize(&name, Value::from(2.0));
        assert_eq!(block.lookup(&name).unwrap().as_number(), Some(2.0));
        assert_eq!(env.lookup(&name).unwrap().as_number(), Some(1.0));
    }
}
