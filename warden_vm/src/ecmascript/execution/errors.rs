// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use core::fmt;
use std::rc::Rc;

use crate::ecmascript::types::{JsString, Value};

/// The result type of every fallible evaluator operation. The `Err` arm is
/// the throw completion of the completion model; `?` composes it.
pub type JsResult<T> = Result<T, JsError>;

/// The error kinds surfaced to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExceptionType {
    TypeError,
    ReferenceError,
    SyntaxError,
    RangeError,
    SecurityError,
    ModuleError,
    Generic,
}

impl ExceptionType {
    pub fn as_str(self) -> &'static str {
        match self {
            ExceptionType::TypeError => "TypeError",
            ExceptionType::ReferenceError => "ReferenceError",
            ExceptionType::SyntaxError => "SyntaxError",
            ExceptionType::RangeError => "RangeError",
            ExceptionType::SecurityError => "SecurityError",
            ExceptionType::ModuleError => "ModuleError",
            ExceptionType::Generic => "Error",
        }
    }
}

impl fmt::Display for ExceptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single sandbox error carrier: a kind, a message, the user-thrown
/// value when there is one, and a (sanitized) stack.
///
/// Cheap to clone; errors cross `await` points and get stored in promise
/// records.
#[derive(Clone)]
pub struct JsError(Rc<JsErrorInner>);

struct JsErrorInner {
    kind: ExceptionType,
    message: JsString,
    cause: Option<Value>,
    stack: String,
    /// Fatal errors bypass `try/catch`: feature-gate rejections, module
    /// depth overruns, cancellation.
    fatal: bool,
    /// A `generator.return(value)` completion riding the error channel; it
    /// runs `finally` blocks but is never caught.
    generator_return: Option<Value>,
}

impl JsError {
    pub fn new(kind: ExceptionType, message: impl Into<String>) -> Self {
        Self(Rc::new(JsErrorInner {
            kind,
            message: JsString::from(message.into()),
            cause: None,
            stack: String::new(),
            fatal: false,
            generator_return: None,
        }))
    }

    pub(crate) fn with_stack(kind: ExceptionType, message: impl Into<String>, stack: String) -> Self {
        Self(Rc::new(JsErrorInner {
            kind,
            message: JsString::from(message.into()),
            cause: None,
            stack,
            fatal: false,
            generator_return: None,
        }))
    }

    /// Wraps a value thrown by sandbox code. The value is preserved in
    /// `cause` so enclosing `catch` clauses observe the original.
    pub(crate) fn thrown(kind: ExceptionType, message: impl Into<String>, cause: Value, stack: String) -> Self {
        Self(Rc::new(JsErrorInner {
            kind,
            message: JsString::from(message.into()),
            cause: Some(cause),
            stack,
            fatal: false,
            generator_return: None,
        }))
    }

    pub(crate) fn into_fatal(self) -> Self {
        Self(Rc::new(JsErrorInner {
            kind: self.0.kind,
            message: self.0.message.clone(),
            cause: self.0.cause.clone(),
            stack: self.0.stack.clone(),
            fatal: true,
            generator_return: self.0.generator_return.clone(),
        }))
    }

    pub fn kind(&self) -> ExceptionType {
        self.0.kind
    }

    pub fn message(&self) -> &str {
        self.0.message.as_str()
    }

    /// The original thrown value, when this error wraps a sandbox `throw`.
    pub fn cause(&self) -> Option<&Value> {
        self.0.cause.as_ref()
    }

    /// The stack trace. Already sanitized unless the agent was configured
    /// with `sanitize_stack_traces: false`.
    pub fn stack(&self) -> &str {
        &self.0.stack
    }

    pub fn is_fatal(&self) -> bool {
        self.0.fatal
    }

    /// A `return` completion delivered into a suspended generator.
    pub(crate) fn generator_return(value: Value) -> Self {
        Self(Rc::new(JsErrorInner {
            kind: ExceptionType::Generic,
            message: JsString::new(""),
            cause: None,
            stack: String::new(),
            fatal: false,
            generator_return: Some(value),
        }))
    }

    pub(crate) fn as_generator_return(&self) -> Option<&Value> {
        self.0.generator_return.as_ref()
    }
}

impl fmt::Display for JsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.message.is_empty() {
            f.write_str(self.0.kind.as_str())
        } else {
            write!(f, "{}: {}", self.0.kind, self.0.message)
        }
    }
}

impl fmt::Debug for JsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JsError({self})")
    }
}

impl std::error::Error for JsError {}

#[cfg(test)]
mod tests {
    use super::{ExceptionType, JsError};

    #[test]
    fn display_includes_kind_and_message() {
        let error = JsError::new(ExceptionType::TypeError, "10n + 5 mixes BigInt and Number");
        assert_eq!(
            error.to_string(),
            "TypeError: 10n + 5 mixes BigInt and Number"
        );
        assert!(!error.is_fatal());
        assert!(error.clone().into_fatal().is_fatal());
    }
}
