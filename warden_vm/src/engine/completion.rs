// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::ecmascript::execution::errors::JsResult;
use crate::ecmascript::types::{JsString, Value};


/// ### [6.2.4 The Completion Record Specification Type](https://tc39.es/ecma262/#sec-completion-record-specification-type)
///
/// The result of a statement evaluation. Throw completions travel in the
/// `Err` arm of [`CompletionResult`] so `?` composes them; the `Ok` arm
/// carries the rest of the sum.
#[derive(Debug, Clone)]
pub(crate) enum Completion {
    Normal(Value),
    Return(Value),
    Break(Option<JsString>),
    Continue(Option<JsString>),
}

pub(crate) type CompletionResult = JsResult<Completion>;

impl Completion {
    /// The statement value of a normal completion; `undefined` otherwise.
    pub(crate) fn value(self) -> Value {
        match self {
            Completion::Normal(value) => value,
            _ => Value::Undefined,
        }
    }

    pub(crate) fn is_abrupt(&self) -> bool {
        !matches!(self, Completion::Normal(_))
    }

}
