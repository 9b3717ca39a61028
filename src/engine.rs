//! Core line-rewrite engine.
//!
//! Feeds `LineRecord`s from a `LineSource` through the `RuleSet`, tracking
//! the net displacement between original and rewritten line positions so
//! `#line` directives can be corrected as they pass through. Output
//! accumulates in memory, so a fatal error commits nothing.

use anyhow::Result;
use std::collections::VecDeque;

use crate::error::FixError;
use crate::rules::RuleSet;

/// Starting offset. The original tool renamed the file to its backup name
/// before rewriting, shifting every `#line` reference by one; the emitted
/// values are a compatibility contract, so the constant stays.
pub const INITIAL_LINE_OFFSET: i64 = 1;

/// One input line, keyed by its 1-based position in the original file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRecord {
    pub number: usize,
    pub text: String,
}

/// Lazily-consumed stream of input lines.
///
/// Records come out in strictly increasing `number` order, exactly once
/// each. A rule that needs the following line takes it through `pop_ahead`;
/// the consumed record is never re-offered.
#[derive(Debug)]
pub struct LineSource {
    lines: VecDeque<LineRecord>,
}

impl LineSource {
    pub fn new(content: &str) -> Self {
        let lines = content
            .lines()
            .enumerate()
            .map(|(i, text)| LineRecord {
                number: i + 1,
                text: text.to_string(),
            })
            .collect();
        Self { lines }
    }

    pub fn pop(&mut self) -> Option<LineRecord> {
        self.lines.pop_front()
    }

    /// Consume the line following line `after`, failing if the stream ended.
    pub fn pop_ahead(&mut self, after: usize) -> Result<LineRecord, FixError> {
        self.lines
            .pop_front()
            .ok_or(FixError::LookaheadExhausted { line: after })
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Mutable state scoped to one file's transformation.
///
/// Constructed when a file starts, dropped when it completes; nothing here
/// outlives a single file.
#[derive(Debug)]
pub struct FixContext {
    /// Net displacement between original and rewritten positions at the
    /// current cursor, starting from `INITIAL_LINE_OFFSET`.
    pub line_offset: i64,
    /// Set once `goto yyerrlab1` has been seen; disables label stripping.
    pub seen_error_label: bool,
    /// Set once bison's own syntax-error default case has been seen.
    pub syntax_error_has_default: bool,
}

impl FixContext {
    pub fn new() -> Self {
        Self {
            line_offset: INITIAL_LINE_OFFSET,
            seen_error_label: false,
            syntax_error_has_default: false,
        }
    }

    /// Record `n` lines consumed without being emitted.
    pub fn dropped(&mut self, n: i64) {
        self.line_offset -= n;
    }

    /// Record `n` lines emitted without being consumed.
    pub fn injected(&mut self, n: i64) {
        self.line_offset += n;
    }
}

impl Default for FixContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the full rule pipeline to whole files.
pub struct Rewriter {
    rules: RuleSet,
}

impl Rewriter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            rules: RuleSet::new()?,
        })
    }

    /// Transform one file's content, returning the rewritten text.
    pub fn rewrite(&self, content: &str) -> Result<String, FixError> {
        let mut ctx = FixContext::new();
        let mut source = LineSource::new(content);
        let mut out: Vec<String> = Vec::new();

        while let Some(record) = source.pop() {
            self.rules.apply(&mut ctx, record, &mut source, &mut out)?;
        }

        if out.is_empty() {
            Ok(String::new())
        } else {
            Ok(out.join("\n") + "\n")
        }
    }
}
