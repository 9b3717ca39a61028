//! bisonfix: post-processor for bison-generated parser sources
//!
//! This library exposes the rewrite engine and file plumbing for use in
//! property-based tests. The main binary is at src/main.rs.

pub mod backup;
pub mod cli;
pub mod config;
pub mod diff_formatter;
pub mod engine;
pub mod error;
pub mod file_processor;
pub mod logger;
pub mod rules;

// Re-export commonly used types for convenience
pub use engine::{FixContext, LineRecord, LineSource, Rewriter, INITIAL_LINE_OFFSET};
pub use error::FixError;
pub use file_processor::{ChangeType, FileProcessor, FileReport, LineChange};
pub use rules::RuleSet;
