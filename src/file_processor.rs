use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use similar::{capture_diff_slices, Algorithm, DiffTag};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;

use crate::backup;
use crate::engine::Rewriter;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Unchanged,
    Modified,
    Added,
    Deleted,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineChange {
    pub line_number: usize,
    pub change_type: ChangeType,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_content: Option<String>,
}

/// Outcome of transforming (or previewing) one file.
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub file_path: String,
    pub timestamp: DateTime<Utc>,
    pub lines_before: usize,
    pub lines_after: usize,
    /// Every output position, including unchanged lines (drives the
    /// context view).
    pub all_lines: Vec<LineChange>,
    /// Only the non-unchanged entries.
    pub changes: Vec<LineChange>,
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<String>,
}

/// Runs the rewrite engine against files on disk.
///
/// The rewritten content is committed through a temp file in the target's
/// directory and an atomic rename, after the original has been copied to its
/// backup path. A fatal rewrite error therefore leaves the file exactly as
/// it was.
pub struct FileProcessor {
    rewriter: Rewriter,
    backup_suffix: String,
    make_backups: bool,
}

impl FileProcessor {
    pub fn new(backup_suffix: impl Into<String>, make_backups: bool) -> Result<Self> {
        Ok(Self {
            rewriter: Rewriter::new()?,
            backup_suffix: backup_suffix.into(),
            make_backups,
        })
    }

    /// Rewrite without touching the filesystem; backs the dry-run mode.
    pub fn preview(&self, file_path: &Path) -> Result<FileReport> {
        let content = self.read(file_path)?;
        let rewritten = self.rewrite(file_path, &content)?;
        Ok(build_report(file_path, &content, &rewritten, false, None))
    }

    /// Rewrite and commit: back up the original, then atomically replace it.
    pub fn apply(&self, file_path: &Path) -> Result<FileReport> {
        let content = self.read(file_path)?;
        let rewritten = self.rewrite(file_path, &content)?;

        let backup_path = if self.make_backups {
            Some(backup::create(file_path, &self.backup_suffix)?)
        } else {
            None
        };

        let parent = file_path.parent().unwrap_or(Path::new("."));
        let mut temp = NamedTempFile::new_in(parent)
            .with_context(|| format!("Failed to create temp file in {}", parent.display()))?;
        temp.write_all(rewritten.as_bytes())
            .with_context(|| format!("Failed to write rewritten {}", file_path.display()))?;
        temp.persist(file_path)
            .with_context(|| format!("Failed to persist temp file to {}", file_path.display()))?;

        info!(file = %file_path.display(), "rewrote generated parser");
        Ok(build_report(
            file_path,
            &content,
            &rewritten,
            true,
            backup_path.map(|p| p.display().to_string()),
        ))
    }

    fn read(&self, file_path: &Path) -> Result<String> {
        fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read file: {}", file_path.display()))
    }

    fn rewrite(&self, file_path: &Path, content: &str) -> Result<String> {
        self.rewriter
            .rewrite(content)
            .with_context(|| format!("Failed to transform {}", file_path.display()))
    }
}

fn build_report(
    file_path: &Path,
    original: &str,
    rewritten: &str,
    applied: bool,
    backup_path: Option<String>,
) -> FileReport {
    let all_lines = diff_lines(original, rewritten);
    let changes = all_lines
        .iter()
        .filter(|c| c.change_type != ChangeType::Unchanged)
        .cloned()
        .collect();

    FileReport {
        file_path: file_path.display().to_string(),
        timestamp: Utc::now(),
        lines_before: original.lines().count(),
        lines_after: rewritten.lines().count(),
        all_lines,
        changes,
        applied,
        backup_path,
    }
}

/// Line diff between original and rewritten content. A replaced run pairs
/// old and new lines positionally into `Modified` entries; leftovers become
/// plain deletions or additions.
fn diff_lines(original: &str, rewritten: &str) -> Vec<LineChange> {
    let old: Vec<&str> = original.lines().collect();
    let new: Vec<&str> = rewritten.lines().collect();
    let ops = capture_diff_slices(Algorithm::Myers, &old, &new);

    let mut entries = Vec::new();
    for op in ops {
        match op.tag() {
            DiffTag::Equal => {
                for (i, j) in op.old_range().zip(op.new_range()) {
                    entries.push(LineChange {
                        line_number: j + 1,
                        change_type: ChangeType::Unchanged,
                        content: old[i].to_string(),
                        old_content: None,
                    });
                }
            }
            DiffTag::Delete => {
                for i in op.old_range() {
                    entries.push(LineChange {
                        line_number: i + 1,
                        change_type: ChangeType::Deleted,
                        content: old[i].to_string(),
                        old_content: None,
                    });
                }
            }
            DiffTag::Insert => {
                for j in op.new_range() {
                    entries.push(LineChange {
                        line_number: j + 1,
                        change_type: ChangeType::Added,
                        content: new[j].to_string(),
                        old_content: None,
                    });
                }
            }
            DiffTag::Replace => {
                let mut olds = op.old_range();
                let mut news = op.new_range();
                loop {
                    match (olds.next(), news.next()) {
                        (Some(i), Some(j)) => entries.push(LineChange {
                            line_number: j + 1,
                            change_type: ChangeType::Modified,
                            content: new[j].to_string(),
                            old_content: Some(old[i].to_string()),
                        }),
                        (Some(i), None) => entries.push(LineChange {
                            line_number: i + 1,
                            change_type: ChangeType::Deleted,
                            content: old[i].to_string(),
                            old_content: None,
                        }),
                        (None, Some(j)) => entries.push(LineChange {
                            line_number: j + 1,
                            change_type: ChangeType::Added,
                            content: new[j].to_string(),
                            old_content: None,
                        }),
                        (None, None) => break,
                    }
                }
            }
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const GENERATED: &str = "\
/* A Bison parser, made by GNU Bison 3.0.4.  */\n\
void *malloc (size_t n);\n\
void free (void *ptr);\n\
#line 10 \"parser.tab.c\"\n\
  yynerrs = 0;\n\
int done;\n";

    // malloc/free dropped (-2) on top of the initial +1: the directive at
    // original line 4 must come out as 3.
    const FIXED: &str = "\
/* A Bison parser, made by GNU Bison 3.0.4.  */\n\
#line 3 \"parser.tab.c\"\n\
  /* yynerrs = 0; */\n\
int done;\n";

    fn write_file(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("parser.tab.c");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_apply_rewrites_and_backs_up() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(&temp_dir, GENERATED);

        let processor = FileProcessor::new(".bak", true).unwrap();
        let report = processor.apply(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), FIXED);
        assert!(report.applied);
        assert_eq!(report.lines_before, 6);
        assert_eq!(report.lines_after, 4);

        let backup = report.backup_path.expect("backup path");
        assert_eq!(fs::read_to_string(&backup).unwrap(), GENERATED);
    }

    #[test]
    fn test_apply_without_backup() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(&temp_dir, GENERATED);

        let processor = FileProcessor::new(".bak", false).unwrap();
        let report = processor.apply(&path).unwrap();

        assert!(report.backup_path.is_none());
        assert!(!backup::backup_path(&path, ".bak").exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), FIXED);
    }

    #[test]
    fn test_preview_leaves_file_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(&temp_dir, GENERATED);

        let processor = FileProcessor::new(".bak", true).unwrap();
        let report = processor.preview(&path).unwrap();

        assert!(!report.applied);
        assert!(report.backup_path.is_none());
        assert!(!report.changes.is_empty());
        // Neither the file nor a backup was written.
        assert_eq!(fs::read_to_string(&path).unwrap(), GENERATED);
        assert!(!backup::backup_path(&path, ".bak").exists());
    }

    #[test]
    fn test_fatal_rewrite_commits_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(
            &temp_dir,
            "a\n/* Suppress GCC warning that yyerrlab1 */\nno endif here\n",
        );

        let processor = FileProcessor::new(".bak", true).unwrap();
        let err = processor.apply(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to transform"));

        // Original intact, no backup written.
        assert!(fs::read_to_string(&path).unwrap().contains("no endif here"));
        assert!(!backup::backup_path(&path, ".bak").exists());
    }

    #[test]
    fn test_missing_file_is_io_failure() {
        let processor = FileProcessor::new(".bak", true).unwrap();
        let err = processor
            .apply(Path::new("/nonexistent/parser.tab.c"))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }

    #[test]
    fn test_diff_lines_classifies_edits() {
        let entries = diff_lines("a\nb\nc\n", "a\nB\nc\nd\n");
        let tags: Vec<ChangeType> = entries.iter().map(|e| e.change_type.clone()).collect();
        assert_eq!(
            tags,
            vec![
                ChangeType::Unchanged,
                ChangeType::Modified,
                ChangeType::Unchanged,
                ChangeType::Added,
            ]
        );
        assert_eq!(entries[1].old_content.as_deref(), Some("b"));
        assert_eq!(entries[3].line_number, 4);
    }

    #[test]
    fn test_report_counts_changes_only() {
        let report = build_report(Path::new("x.c"), "same\ngone\n", "same\n", false, None);
        assert_eq!(report.changes.len(), 1);
        assert_eq!(report.changes[0].change_type, ChangeType::Deleted);
        assert_eq!(report.all_lines.len(), 2);
    }
}
