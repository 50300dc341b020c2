// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The feature gate: a whitelist/blacklist matrix over syntactic
//! constructs, consulted by the evaluator before each gated node kind.
//! Gate rejections are fatal: they bypass `try/catch`.

use hashbrown::HashSet;

use crate::ecmascript::execution::errors::{ExceptionType, JsError, JsResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureMode {
    /// Only the listed constructs are allowed.
    Whitelist,
    /// Everything except the listed constructs is allowed.
    Blacklist,
}

/// Gate tokens are ESTree-style node kind names: `"BigIntLiteral"`,
/// `"ClassDeclaration"`, `"AwaitExpression"`, `"OptionalChaining"`, …
#[derive(Debug, Clone)]
pub struct FeaturePolicy {
    mode: FeatureMode,
    features: HashSet<Box<str>>,
}

impl FeaturePolicy {
    pub fn allow_all() -> Self {
        Self {
            mode: FeatureMode::Blacklist,
            features: HashSet::new(),
        }
    }

    pub fn whitelist<I, S>(features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            mode: FeatureMode::Whitelist,
            features: features
                .into_iter()
                .map(|f| Box::from(f.as_ref()))
                .collect(),
        }
    }

    pub fn blacklist<I, S>(features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            mode: FeatureMode::Blacklist,
            features: features
                .into_iter()
                .map(|f| Box::from(f.as_ref()))
                .collect(),
        }
    }

    /// ES2019 dialect: no BigInt, optional chaining, nullish coalescing,
    /// logical assignment, or private class fields.
    pub fn es2019() -> Self {
        Self::blacklist([
            "BigIntLiteral",
            "OptionalChaining",
            "NullishCoalescing",
            "LogicalAssignment",
            "PrivateField",
            "StaticBlock",
        ])
    }

    /// ES2020 dialect: BigInt and optional chaining are in; logical
    /// assignment and private fields are not.
    pub fn es2020() -> Self {
        Self::blacklist(["LogicalAssignment", "PrivateField", "StaticBlock"])
    }

    /// Checks one construct. The error is fatal and names the construct.
    pub(crate) fn check(&self, feature: &'static str) -> JsResult<()> {
        let listed = self.features.contains(feature);
        let allowed = match self.mode {
            FeatureMode::Whitelist => listed,
            FeatureMode::Blacklist => !listed,
        };
        if allowed {
            Ok(())
        } else {
            Err(JsError::new(
                ExceptionType::SyntaxError,
                format!("'{feature}' is disabled by the feature policy"),
            )
            .into_fatal())
        }
    }
}

impl Default for FeaturePolicy {
    fn default() -> Self {
        Self::allow_all()
    }
}

#[cfg(test)]
mod tests {
    use super::FeaturePolicy;

    #[test]
    fn blacklist_blocks_listed() {
        let policy = FeaturePolicy::es2019();
        assert!(policy.check("ClassDeclaration").is_ok());
        let error = policy.check("BigIntLiteral").unwrap_err();
        assert!(error.is_fatal());
        assert!(error.message().contains("BigIntLiteral"));
    }

    #[test]
    fn whitelist_blocks_unlisted() {
        let policy = FeaturePolicy::whitelist(["BinaryExpression", "NumericLiteral"]);
        assert!(policy.check("BinaryExpression").is_ok());
        assert!(policy.check("AwaitExpression").is_err());
    }
}
