// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! An embeddable, sandboxed ECMAScript interpreter.
//!
//! `warden_vm` parses a subset of ECMAScript with [`oxc_parser`] and
//! evaluates it with a tree-walking evaluator against a host-controlled
//! global environment. Every host value that becomes observable to sandbox
//! code is mediated by a read-only barrier: sandbox code cannot mutate host
//! objects, see host prototype chains, or reach code-synthesis intrinsics.
//!
//! ```no_run
//! use warden_vm::{Agent, AgentOptions};
//!
//! let agent = Agent::new(AgentOptions::default()).unwrap();
//! let value = agent.evaluate("1 + 2").unwrap();
//! assert_eq!(value.as_number(), Some(3.0));
//! ```

pub mod ecmascript;
pub mod engine;
pub mod sandbox;

pub use ecmascript::{
    execution::{
        agent::{Agent, AgentOptions, ModuleOptions, SecurityOptions},
        errors::{ExceptionType, JsError, JsResult},
    },
    scripts_and_modules::module::{
        ModuleMetadata, ModuleResolution, ModuleResolver, ModuleStatus, ResolveContext,
    },
    scripts_and_modules::source_code::ParsedModule,
    types::{JsObject, JsString, JsSymbol, PropertyDescriptor, PropertyKey, Value},
};
pub use engine::feature_gate::{FeatureMode, FeaturePolicy};
pub use sandbox::host_function::HostFunction;
