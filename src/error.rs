use thiserror::Error;

/// Fatal conditions inside the rewrite engine.
///
/// Pattern misses are ordinary no-ops and never surface here; the engine only
/// fails when the input does not have the shape bison is known to emit. Any
/// of these aborts the file before a single output line is committed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FixError {
    /// The warning-block marker appeared but its closing `#endif` never did.
    #[error("unterminated warning block starting at line {line}: no closing \"#endif\" before end of input")]
    UnterminatedBlock { line: usize },

    /// A rule needed to consume the line after `line`, but the stream ended.
    #[error("unexpected end of input: line {line} requires a following line")]
    LookaheadExhausted { line: usize },

    /// A dead-code condition was not followed by the single-statement body
    /// bison emits for it.
    #[error("dead-code condition at line {line} is not followed by a single statement (got {found:?})")]
    UnexpectedBlockShape { line: usize, found: String },
}
