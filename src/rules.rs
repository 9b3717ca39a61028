//! The rewrite rules applied to bison-generated lines.
//!
//! Rules run in a fixed priority order per line. A rule that consumes lines
//! (a filter) short-circuits: the line emits nothing further. The marker
//! strings, replacement texts, and injected lines are pinned to what bison
//! 2.x through 3.0.x emits.

use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

use crate::engine::{FixContext, LineRecord, LineSource};
use crate::error::FixError;

/// Marker comment opening the `yyerrlab1` warning-suppression block.
pub const WARNING_BLOCK_START: &str = "Suppress GCC warning that yyerrlab1";

/// The suppression block runs up to and including a line starting with this.
pub const WARNING_BLOCK_END: &str = "#endif";

/// Reference that proves the `yyerrlab1` label is actually used.
const ERROR_LABEL_TARGET: &str = "goto yyerrlab1";

/// Comment bison 3.0.5+ emits when the syntax-error switch already carries a
/// default case.
const DEFAULT_CASE_MARKER: &str = "default: /* Avoid compiler warnings. */";

/// Default case injected before `# undef YYCASE_` on older bison versions.
const DEFAULT_CASE_LINE: &str = "      default: yyformat = YY_(\"syntax error\")";

/// Expression marking the line that gets the token guard injected before it.
const STATUS_EXPR: &str = "yysyntax_error_status = YYSYNTAX_ERROR";

/// Guard keeping yytoken non-negative before the syntax-error status call.
const TOKEN_GUARD_LINE: &str = "if(yytoken < 0) yytoken = YYUNDEFTOK";

/// Always-false conditions bison emits with a single-statement body.
const DEAD_CONSTCOND: &str = "if (/*CONSTCOND*/ 0)";
const DEAD_TABLE_VALUE: &str = "(yytable_value_is_error (yyn)";

/// The full rule pipeline with its patterns compiled once.
pub struct RuleSet {
    error_label: Regex,
    malloc_proto: Regex,
    free_proto: Regex,
    case_undef: Regex,
    init_globals: Regex,
    line_directive: Regex,
    unused_counter: Regex,
}

impl RuleSet {
    pub fn new() -> Result<Self> {
        Ok(Self {
            error_label: compile(r"^yyerrlab1:")?,
            malloc_proto: compile(r"^void \*malloc\s*\(.*\)")?,
            free_proto: compile(r"^void free\s*\(.*\)")?,
            case_undef: compile(r"^# undef YYCASE_$")?,
            init_globals: compile(r"^(static int .*_init_globals.*);$")?,
            line_directive: compile(r"^#line \d+ (.*\.c)")?,
            unused_counter: compile(r"^(\s*)(.*yynerrs.*)$")?,
        })
    }

    /// Run the pipeline for one popped record.
    ///
    /// Output lines are appended to `out`; multi-line rules consume extra
    /// records from `source`. The only errors are the fatal malformed-input
    /// conditions; pattern misses just leave the line alone.
    pub fn apply(
        &self,
        ctx: &mut FixContext,
        record: LineRecord,
        source: &mut LineSource,
        out: &mut Vec<String>,
    ) -> Result<(), FixError> {
        // Warning-suppression block: drop everything through the #endif.
        if record.text.contains(WARNING_BLOCK_START) {
            return strip_warning_block(ctx, &record, source);
        }

        let mut text = record.text.clone();

        // The label may only be stripped before its first use.
        if text.contains(ERROR_LABEL_TARGET) {
            ctx.seen_error_label = true;
        }
        if !ctx.seen_error_label {
            text = self.error_label.replace(&text, "").to_string();
        }

        // yylineno is a macro in the surrounding scanner; the temporary gets
        // a different name, along with its one call site.
        text = text.replace("unsigned int yylineno = ", "unsigned int yylineno_tmp = ");
        text = text.replace("yyrule - 1, yylineno)", "yyrule - 1, yylineno_tmp)");

        // The platform C library already declares these.
        if self.malloc_proto.is_match(&text) || self.free_proto.is_match(&text) {
            debug!(line = record.number, "dropped prototype redefinition");
            ctx.dropped(1);
            return Ok(());
        }

        // bison 3.0.5+ ships its own default case for the syntax-error
        // switch; older versions need one injected before the undef.
        if text.contains(DEFAULT_CASE_MARKER) {
            ctx.syntax_error_has_default = true;
        }
        if self.case_undef.is_match(&text) && !ctx.syntax_error_has_default {
            debug!(line = record.number, "injected syntax-error default case");
            out.push(DEFAULT_CASE_LINE.to_string());
            ctx.injected(1);
            out.push(text);
            return Ok(());
        }

        if text.contains(STATUS_EXPR) {
            debug!(line = record.number, "injected yytoken guard");
            out.push(TOKEN_GUARD_LINE.to_string());
            ctx.injected(1);
            out.push(text);
            return Ok(());
        }

        // Empty-declaration warning: disarm the trailing semicolon.
        text = self.init_globals.replace(&text, "$1/").to_string();

        if text.contains(DEAD_CONSTCOND) || text.contains(DEAD_TABLE_VALUE) {
            return drop_dead_pair(ctx, &record, source);
        }

        // Keep #line directives pointing at positions in the rewritten file.
        if self.line_directive.is_match(&text) {
            let corrected = record.number as i64 + ctx.line_offset;
            text = self
                .line_directive
                .replace(&text, |caps: &regex::Captures| {
                    format!("#line {} {}", corrected, &caps[1])
                })
                .to_string();
        }

        // yynerrs is never read; comment out anything touching it.
        text = self.unused_counter.replace(&text, "$1/* $2 */").to_string();

        out.push(text);
        Ok(())
    }
}

/// Drop the marker line and every following line through the closing
/// `#endif`. The block length is unbounded; a stream that ends first is
/// malformed input.
fn strip_warning_block(
    ctx: &mut FixContext,
    record: &LineRecord,
    source: &mut LineSource,
) -> Result<(), FixError> {
    debug!(line = record.number, "dropping warning-suppression block");
    ctx.dropped(1);
    loop {
        let Some(next) = source.pop() else {
            return Err(FixError::UnterminatedBlock {
                line: record.number,
            });
        };
        ctx.dropped(1);
        if next.text.starts_with(WARNING_BLOCK_END) {
            return Ok(());
        }
    }
}

/// Drop an always-false condition line together with its single-statement
/// body. The body shape is asserted: bison emits exactly one `goto ...;`
/// here, and anything else must fail loudly instead of deleting the wrong
/// lines.
fn drop_dead_pair(
    ctx: &mut FixContext,
    record: &LineRecord,
    source: &mut LineSource,
) -> Result<(), FixError> {
    ctx.dropped(1);
    let body = source.pop_ahead(record.number)?;
    if !body.text.trim().ends_with(';') {
        return Err(FixError::UnexpectedBlockShape {
            line: record.number,
            found: body.text,
        });
    }
    debug!(line = record.number, "dropped always-false condition");
    ctx.dropped(1);
    Ok(())
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).with_context(|| format!("Invalid rule pattern: {}", pattern))
}
