// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use core::fmt;
use std::rc::Rc;

use super::string::JsString;

/// ### [6.1.5 The Symbol Type](https://tc39.es/ecma262/#sec-ecmascript-language-types-symbol-type)
///
/// Identity is the shared allocation; the `id` is agent-unique and only used
/// for hashing and diagnostics.
#[derive(Debug, Clone)]
pub struct JsSymbol(Rc<SymbolData>);

#[derive(Debug)]
struct SymbolData {
    id: u64,
    description: Option<JsString>,
}

impl JsSymbol {
    pub(crate) fn new(id: u64, description: Option<JsString>) -> Self {
        Self(Rc::new(SymbolData { id, description }))
    }

    pub fn description(&self) -> Option<&JsString> {
        self.0.description.as_ref()
    }

    pub(crate) fn id(&self) -> u64 {
        self.0.id
    }
}

impl PartialEq for JsSymbol {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for JsSymbol {}

impl core::hash::Hash for JsSymbol {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl fmt::Display for JsSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.description {
            Some(description) => write!(f, "Symbol({description})"),
            None => f.write_str("Symbol()"),
        }
    }
}
