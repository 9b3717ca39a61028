//! Property-based tests for bisonfix
//!
//! This module uses proptest to verify the core invariants of the rewrite
//! engine: lines that match no rule pass through untouched, and the offset
//! accumulator keeps every emitted #line directive consistent with the
//! actual displacement between input and output.

use std::fs;
use tempfile::TempDir;

use bisonfix::{FileProcessor, Rewriter, INITIAL_LINE_OFFSET};

use proptest::prelude::*;

/// Lines drawn from this alphabet cannot contain any rule trigger: every
/// marker, prototype, and macro name needs at least one character outside
/// `[a-m ]` (y, #, parentheses, uppercase, ...).
fn inert_lines() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-m ]{0,40}", 0..20)
}

fn join(lines: &[String]) -> String {
    if lines.is_empty() {
        String::new()
    } else {
        lines.join("\n") + "\n"
    }
}

proptest! {
    /// Non-matching input is emitted byte-for-byte unchanged, and a second
    /// pass over the output changes nothing either.
    #[test]
    fn prop_inert_input_passes_through(lines in inert_lines()) {
        let input = join(&lines);
        let rewriter = Rewriter::new().unwrap();

        let once = rewriter.rewrite(&input).unwrap();
        prop_assert_eq!(&once, &input);

        let twice = rewriter.rewrite(&once).unwrap();
        prop_assert_eq!(twice, once);
    }

    /// Each suppressed prototype shifts a later #line directive down by one,
    /// on top of the constant initial offset.
    #[test]
    fn prop_directive_tracks_suppressions(
        protos in 0usize..4,
        padding in inert_lines(),
        arg in 1u32..10_000,
    ) {
        let mut lines: Vec<String> = Vec::new();
        for _ in 0..protos {
            lines.push("void *malloc (size_t n);".to_string());
        }
        lines.extend(padding.iter().cloned());
        lines.push(format!("#line {} \"parser.tab.c\"", arg));

        let position = lines.len() as i64;
        let expected = position + INITIAL_LINE_OFFSET - protos as i64;

        let output = Rewriter::new().unwrap().rewrite(&join(&lines)).unwrap();
        let last = output.lines().last().unwrap().to_string();
        prop_assert_eq!(last, format!("#line {} \"parser.tab.c\"", expected));
    }

    /// A warning block disappears wholesale: the output holds exactly the
    /// surrounding lines, and a trailing directive reflects the removal.
    #[test]
    fn prop_warning_block_removed(
        before in inert_lines(),
        block in prop::collection::vec("[a-m ]{0,40}", 0..10),
        after in inert_lines(),
    ) {
        let mut lines: Vec<String> = before.clone();
        lines.push("#if 1 /* Suppress GCC warning that yyerrlab1 is unused */".to_string());
        lines.extend(block.iter().cloned());
        lines.push("#endif".to_string());
        lines.extend(after.iter().cloned());
        lines.push("#line 1 \"parser.tab.c\"".to_string());

        let removed = block.len() as i64 + 2;
        let position = lines.len() as i64;
        let expected = position + INITIAL_LINE_OFFSET - removed;

        let output = Rewriter::new().unwrap().rewrite(&join(&lines)).unwrap();
        let out_lines: Vec<&str> = output.lines().collect();

        prop_assert_eq!(out_lines.len(), before.len() + after.len() + 1);
        let expected_line = format!("#line {} \"parser.tab.c\"", expected);
        prop_assert_eq!(
            *out_lines.last().unwrap(),
            expected_line.as_str()
        );
    }

    /// The guard injection adds exactly one line, immediately before the
    /// status expression, wherever that expression sits.
    #[test]
    fn prop_guard_injected_immediately_before(padding in inert_lines()) {
        let mut lines = padding.clone();
        lines.push("      yysyntax_error_status = YYSYNTAX_ERROR (&yymsg);".to_string());

        let output = Rewriter::new().unwrap().rewrite(&join(&lines)).unwrap();
        let out_lines: Vec<&str> = output.lines().collect();

        prop_assert_eq!(out_lines.len(), lines.len() + 1);
        let guard_count = out_lines
            .iter()
            .filter(|l| l.contains("yytoken = YYUNDEFTOK"))
            .count();
        prop_assert_eq!(guard_count, 1);
        prop_assert_eq!(out_lines[padding.len()], "if(yytoken < 0) yytoken = YYUNDEFTOK");
    }

    /// Applying to a file on disk produces exactly what the in-memory
    /// engine produces, and the backup keeps the original bytes.
    #[test]
    fn prop_file_round_trip_matches_engine(lines in inert_lines()) {
        let input = join(&lines);

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("parser.tab.c");
        fs::write(&path, &input).unwrap();

        let expected = Rewriter::new().unwrap().rewrite(&input).unwrap();

        let processor = FileProcessor::new(".bak", true).unwrap();
        let report = processor.apply(&path).unwrap();

        prop_assert_eq!(fs::read_to_string(&path).unwrap(), expected);
        if let Some(backup) = report.backup_path {
            prop_assert_eq!(fs::read_to_string(backup).unwrap(), input);
        }
    }
}
