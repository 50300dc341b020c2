// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use core::fmt;

use super::language::string::JsString;
use super::language::symbol::JsSymbol;

/// A property key: an array index, a string, or a symbol.
///
/// Canonical numeric strings in the array-index range are always stored as
/// `Index`, so `obj["3"]` and `obj[3]` address the same slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    Index(u32),
    String(JsString),
    Symbol(JsSymbol),
}

impl PropertyKey {
    /// Normalizes a string key, folding canonical array indices into
    /// [`PropertyKey::Index`].
    pub fn from_str(key: &str) -> Self {
        if let Some(index) = canonical_index(key) {
            return Self::Index(index);
        }
        Self::String(JsString::new(key))
    }

    pub fn from_string(key: JsString) -> Self {
        if let Some(index) = canonical_index(&key) {
            return Self::Index(index);
        }
        Self::String(key)
    }

    pub(crate) fn as_index(&self) -> Option<u32> {
        match self {
            Self::Index(index) => Some(*index),
            _ => None,
        }
    }

    pub(crate) fn is_symbol(&self) -> bool {
        matches!(self, Self::Symbol(_))
    }

    /// The key as a string, for diagnostics and `for..in`. Symbols render
    /// their description form.
    pub(crate) fn to_display_string(&self) -> JsString {
        match self {
            Self::Index(index) => JsString::from(index.to_string()),
            Self::String(string) => string.clone(),
            Self::Symbol(symbol) => JsString::from(symbol.to_string()),
        }
    }
}

/// An array index is a canonical base-10 integer below 2^32 - 1 with no
/// leading zero.
fn canonical_index(key: &str) -> Option<u32> {
    if key.is_empty() || (key.len() > 1 && key.starts_with('0')) {
        return None;
    }
    if !key.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    let value: u64 = key.parse().ok()?;
    if value >= u64::from(u32::MAX) {
        return None;
    }
    Some(value as u32)
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

impl From<u32> for PropertyKey {
    fn from(value: u32) -> Self {
        Self::Index(value)
    }
}

impl From<JsString> for PropertyKey {
    fn from(value: JsString) -> Self {
        Self::from_string(value)
    }
}

impl From<&str> for PropertyKey {
    fn from(value: &str) -> Self {
        Self::from_str(value)
    }
}

impl From<JsSymbol> for PropertyKey {
    fn from(value: JsSymbol) -> Self {
        Self::Symbol(value)
    }
}

#[cfg(test)]
mod tests {
    use super::PropertyKey;

    #[test]
    fn canonical_indices_fold() {
        assert_eq!(PropertyKey::from_str("3"), PropertyKey::Index(3));
        assert_eq!(PropertyKey::from_str("0"), PropertyKey::Index(0));
        assert!(matches!(PropertyKey::from_str("03"), PropertyKey::String(_)));
        assert!(matches!(PropertyKey::from_str("-1"), PropertyKey::String(_)));
        assert!(matches!(
            PropertyKey::from_str("4294967295"),
            PropertyKey::String(_)
        ));
    }
}
