use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "

Copyright (c) 2025 InkyQuill
License: MIT
Source: https://github.com/InkyQuill/bisonfix
Rust Edition: 2024"
);

#[derive(Parser)]
#[command(name = "bisonfix")]
#[command(about = "Fix compiler warnings and #line numbers in bison-generated parsers")]
#[command(long_about = "bisonfix rewrites C sources produced by the bison parser generator so
they compile cleanly.

It removes code blocks that trigger warnings, drops redefinitions of malloc
and free, renames a temporary that collides with the yylineno macro, injects
a missing syntax-error default case and a yytoken guard, comments out the
unused yynerrs counter, and corrects every #line directive so diagnostics
keep pointing at the right positions after lines have been added or removed.

Each file is backed up next to the original (foo.tab.c -> foo.tab.c.bak)
before being replaced atomically. Run bisonfix exactly once per bison
invocation: the rules assume generator-fresh input, and a second pass may
misfire.

EXAMPLES:
  bison -b foo_parser -p foo_parser_ -d -v foo_parser.y
  bisonfix foo_parser.tab.c                Fix in place (with backup)
  bisonfix --dry-run foo_parser.tab.c      Preview without writing
  bisonfix -k a.tab.c b.tab.c              Keep going past failures
  bisonfix --report-json foo_parser.tab.c  Machine-readable report
  bisonfix restore foo_parser.tab.c        Copy the backup back")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_version = LONG_VERSION)]
#[command(propagate_version = true)]
struct Cli {
    /// Generated parser sources to fix
    #[arg(value_name = "FILE")]
    files: Vec<String>,

    /// Dry run mode (preview changes without applying)
    #[arg(short = 'd', long)]
    #[arg(help = "Preview changes without modifying files\nNo backup is written in this mode.")]
    dry_run: bool,

    /// Number of context lines to show (default: 2)
    #[arg(short = 'n', long, value_name = "NUM")]
    #[arg(help = "Number of context lines to show around changes\nUse 0 to show only changed lines (equivalent to --no-context)")]
    context: Option<usize>,

    /// No context (show only changed lines)
    #[arg(long = "no-context", alias = "nc")]
    #[arg(help = "Show only changed lines without context\nEquivalent to --context=0")]
    no_context: bool,

    /// Suffix for backup copies
    #[arg(long, value_name = "SUFFIX")]
    #[arg(help = "Suffix appended to backup copies\nDefault: \".bak\" (foo.tab.c -> foo.tab.c.bak)")]
    backup_suffix: Option<String>,

    /// Skip backup creation (requires --force)
    #[arg(long = "no-backup", requires = "force")]
    #[arg(help = "Skip creating a backup (requires --force)\n⚠️  USE WITH CAUTION: the original content is lost on replace!\nRecommended only for files under version control")]
    no_backup: bool,

    /// Force dangerous operations (use with --no-backup)
    #[arg(long = "force", requires = "no_backup")]
    #[arg(help = "Force dangerous operations (required for --no-backup)\nConfirms you understand the risks")]
    force: bool,

    /// Keep processing remaining files after a failure
    #[arg(short = 'k', long)]
    #[arg(help = "Keep processing remaining files after a failure\nThe exit status is still non-zero if any file failed.\nDefault: stop at the first failure")]
    keep_going: bool,

    /// Print per-file reports as JSON instead of a diff
    #[arg(long = "report-json")]
    report_json: bool,

    /// Enable debug logging
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Restore files from their backups
    #[command(long_about = "Copy each file's backup back over the file itself.

The backup is looked up next to the file under the configured suffix
(default: foo.tab.c.bak for foo.tab.c). The backup is kept afterwards.

EXAMPLES:
  bisonfix restore foo_parser.tab.c
  bisonfix restore --backup-suffix .orig foo_parser.tab.c")]
    Restore {
        /// Files to restore
        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,
    },

    /// Show configuration
    #[command(long_about = "Print the configuration file location and, with --show, the
effective values.

CONFIGURATION OPTIONS:
  [backup]
    suffix = \".bak\"       # Suffix appended to backup copies
    enabled = true          # Write a backup before replacing each file

  [processing]
    context_lines = 2       # Context lines to show around changes
    keep_going = false      # Keep processing after a failure

EXAMPLES:
  bisonfix config                 Print the config file path
  bisonfix config --show          Print the effective configuration")]
    Config {
        /// Show current configuration
        #[arg(long = "show")]
        show: bool,
    },
}

pub fn parse_args() -> Result<Args> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Restore { files }) => Ok(Args::Restore {
            files,
            backup_suffix: cli.backup_suffix,
            verbose: cli.verbose,
        }),
        Some(Commands::Config { show }) => Ok(Args::Config { show }),
        None => {
            if cli.files.is_empty() {
                bail!("Missing input files. Usage: bisonfix foo_parser.tab.c");
            }

            // --no-context wins; otherwise defer to config when unset.
            let context = if cli.no_context { Some(0) } else { cli.context };

            Ok(Args::Execute {
                files: cli.files,
                dry_run: cli.dry_run,
                context,
                backup_suffix: cli.backup_suffix,
                no_backup: cli.no_backup,
                keep_going: cli.keep_going,
                report_json: cli.report_json,
                verbose: cli.verbose,
            })
        }
    }
}

#[derive(Debug)]
pub enum Args {
    Execute {
        files: Vec<String>,
        dry_run: bool,
        /// None means "use the configured default".
        context: Option<usize>,
        backup_suffix: Option<String>,
        no_backup: bool,
        keep_going: bool,
        report_json: bool,
        verbose: bool,
    },
    Restore {
        files: Vec<String>,
        backup_suffix: Option<String>,
        verbose: bool,
    },
    Config {
        show: bool,
    },
}
