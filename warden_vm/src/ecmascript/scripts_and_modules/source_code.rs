// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Owned parse results.
//!
//! The oxc AST borrows from its arena allocator and from the source text.
//! A [`SourceCode`] owns both, pins them behind stable heap allocations,
//! and hands out lifetime-erased references. Every stored AST reference in
//! the runtime (function bodies, module programs) travels together with an
//! `Rc<SourceCode>`, which is what makes the erasure sound.

use std::fmt;
use std::rc::Rc;

use oxc_allocator::Allocator;
use oxc_ast::ast;
use oxc_parser::Parser;
use oxc_span::SourceType;

use crate::ecmascript::execution::errors::{ExceptionType, JsError, JsResult};

pub(crate) struct SourceCode {
    /// Path reported in diagnostics, not consulted for IO.
    path: Box<str>,
    /// Byte offsets of line starts, for span → line:column mapping.
    line_starts: Vec<u32>,
    // Field order is load-bearing: `program` must drop before the arena and
    // the source text it points into. (Arena-allocated AST nodes have no
    // drop glue, but keep the order honest anyway.)
    program: ast::Program<'static>,
    #[allow(dead_code)]
    source: Box<str>,
    #[allow(dead_code)]
    allocator: Box<Allocator>,
}

impl SourceCode {
    /// Parses `source_text` in module goal: strict semantics, top-level
    /// `await` allowed. Parse errors surface as a single `SyntaxError`.
    pub(crate) fn parse(source_text: &str, path: &str) -> JsResult<Rc<SourceCode>> {
        let allocator = Box::new(Allocator::default());
        let source: Box<str> = Box::from(source_text);

        // SAFETY: `allocator` and `source` are heap allocations owned by
        // the record under construction; the parsed program is only
        // reachable through that record, so the references cannot outlive
        // their referents.
        let allocator_ref: &'static Allocator =
            unsafe { &*(allocator.as_ref() as *const Allocator) };
        let source_ref: &'static str = unsafe { &*(source.as_ref() as *const str) };

        let parser_return = Parser::new(allocator_ref, source_ref, SourceType::mjs()).parse();
        if parser_return.panicked || !parser_return.errors.is_empty() {
            let rendered = parser_return
                .errors
                .iter()
                .map(|diagnostic| diagnostic.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            let message = if rendered.is_empty() {
                format!("could not parse {path}")
            } else {
                rendered
            };
            return Err(JsError::new(ExceptionType::SyntaxError, message));
        }

        let mut line_starts = vec![0u32];
        for (offset, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(offset as u32 + 1);
            }
        }

        Ok(Rc::new(SourceCode {
            path: Box::from(path),
            line_starts,
            program: parser_return.program,
            source,
            allocator,
        }))
    }

    /// The parsed program. The returned reference is lifetime-erased; the
    /// caller must keep this `SourceCode` alive alongside it, which every
    /// holder does by carrying the `Rc`.
    pub(crate) fn program(self: &Rc<Self>) -> &'static ast::Program<'static> {
        // SAFETY: see `parse`; the Rc keeps the arena alive.
        unsafe { &*(&self.program as *const ast::Program<'static>) }
    }

    pub(crate) fn path(&self) -> &str {
        &self.path
    }

    /// 1-based line and column for a byte offset.
    pub(crate) fn line_column(&self, offset: u32) -> (u32, u32) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(index) => index,
            Err(index) => index.saturating_sub(1),
        };
        let column = offset - self.line_starts[line];
        (line as u32 + 1, column + 1)
    }
}

impl fmt::Debug for SourceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceCode")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// A pre-parsed module a host resolver can hand back instead of source
/// text.
#[derive(Debug, Clone)]
pub struct ParsedModule(pub(crate) Rc<SourceCode>);

impl ParsedModule {
    pub fn parse(source_text: &str, path: &str) -> Result<Self, JsError> {
        SourceCode::parse(source_text, path).map(Self)
    }

    pub fn path(&self) -> &str {
        self.0.path()
    }
}

#[cfg(test)]
mod tests {
    use super::SourceCode;

    #[test]
    fn parses_and_maps_positions() {
        let source = SourceCode::parse("let a = 1;\nlet b = 2;\n", "inline").unwrap();
        assert_eq!(source.line_column(0), (1, 1));
        assert_eq!(source.line_column(11), (2, 1));
        assert!(!source.program().body.is_empty());
    }

    #[test]
    fn parse_errors_are_syntax_errors() {
        let error = SourceCode::parse("let let = ;", "inline").unwrap_err();
        assert_eq!(
            error.kind(),
            crate::ecmascript::execution::errors::ExceptionType::SyntaxError
        );
    }
}
