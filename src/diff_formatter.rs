use crate::file_processor::{ChangeType, FileReport, LineChange};
use colored::*;

pub struct DiffFormatter;

impl DiffFormatter {
    /// Format a file report with context around each change group.
    ///
    /// Color is handled by `colored` itself (tty detection plus NO_COLOR).
    pub fn format_report(report: &FileReport, context_size: usize) -> String {
        let mut output = String::new();

        output.push_str(&format!("{}\n", report.file_path.bold().cyan()));

        if report.changes.is_empty() {
            output.push_str("No changes.\n");
            return output;
        }

        for entry in Self::filter_lines_with_context(&report.all_lines, context_size) {
            // Placeholder separating distant change groups.
            if entry.content == "..." && entry.line_number == 0 {
                output.push_str(&format!("{}\n", "...".dimmed()));
                continue;
            }

            let line = match entry.change_type {
                ChangeType::Unchanged => format!(
                    "L{}: {} {}\n",
                    entry.line_number,
                    "=".dimmed(),
                    entry.content.dimmed()
                ),
                ChangeType::Modified => format!(
                    "L{}: {} {}\n",
                    entry.line_number,
                    "~".yellow().bold(),
                    entry.content.yellow().bold()
                ),
                ChangeType::Added => format!(
                    "L{}: {} {}\n",
                    entry.line_number,
                    "+".green().bold(),
                    entry.content.green().bold()
                ),
                ChangeType::Deleted => format!(
                    "L{}: {} {}\n",
                    entry.line_number,
                    "-".red().bold(),
                    entry.content.red()
                ),
            };
            output.push_str(&line);
        }

        output.push_str(&Self::format_summary(report));
        output
    }

    fn format_summary(report: &FileReport) -> String {
        let modified = Self::count(report, &ChangeType::Modified);
        let added = Self::count(report, &ChangeType::Added);
        let deleted = Self::count(report, &ChangeType::Deleted);
        let total = modified + added + deleted;

        let mut output = format!("\nTotal: {} change", total.to_string().bold().white());
        if total != 1 {
            output.push('s');
        }

        let mut parts = Vec::new();
        if modified > 0 {
            parts.push(format!("{} {}", modified, "modified".yellow()));
        }
        if added > 0 {
            parts.push(format!("{} {}", added, "added".green()));
        }
        if deleted > 0 {
            parts.push(format!("{} {}", deleted, "deleted".red()));
        }
        if !parts.is_empty() {
            output.push_str(&format!(" ({})", parts.join(", ")));
        }
        output.push('\n');
        output
    }

    fn count(report: &FileReport, change_type: &ChangeType) -> usize {
        report
            .changes
            .iter()
            .filter(|c| c.change_type == *change_type)
            .count()
    }

    /// Filter lines to show only changed lines with context, grouping close
    /// changes.
    fn filter_lines_with_context(lines: &[LineChange], context_size: usize) -> Vec<LineChange> {
        if context_size == 0 {
            return lines
                .iter()
                .filter(|c| c.change_type != ChangeType::Unchanged)
                .cloned()
                .collect();
        }

        let changed_indices: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, c)| c.change_type != ChangeType::Unchanged)
            .map(|(i, _)| i)
            .collect();

        if changed_indices.is_empty() {
            return Vec::new();
        }

        // Two changes within (context_size * 2 + 1) lines share a group.
        let group_threshold = context_size * 2 + 1;
        let mut groups: Vec<(usize, usize)> = vec![(changed_indices[0], changed_indices[0])];

        for &idx in &changed_indices[1..] {
            let (_, last_end) = *groups.last().expect("groups is non-empty");
            if idx.saturating_sub(last_end) <= group_threshold {
                groups.last_mut().expect("groups is non-empty").1 = idx;
            } else {
                groups.push((idx, idx));
            }
        }

        let mut result = Vec::new();
        let mut last_included_end: Option<usize> = None;

        for (group_start, group_end) in groups {
            let start = group_start.saturating_sub(context_size);
            let end = (group_end + context_size + 1).min(lines.len());

            if let Some(last_end) = last_included_end {
                if start > last_end + context_size {
                    result.push(LineChange {
                        line_number: 0,
                        change_type: ChangeType::Unchanged,
                        content: "...".to_string(),
                        old_content: None,
                    });
                }
            }

            for line in &lines[start..end] {
                result.push(line.clone());
            }

            last_included_end = Some(end);
        }

        result
    }

    /// Format dry run header
    pub fn format_dry_run_header() -> String {
        format!("{}\n\n", "🔍 Dry run: no files will be modified".bold().cyan())
    }
}
