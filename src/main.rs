use anyhow::{Context, Result};
use std::path::PathBuf;

use bisonfix::backup;
use bisonfix::cli::{parse_args, Args};
use bisonfix::config::Config;
use bisonfix::diff_formatter::DiffFormatter;
use bisonfix::file_processor::FileProcessor;
use bisonfix::logger;

fn main() -> Result<()> {
    let args = parse_args()?;

    match args {
        Args::Execute {
            files,
            dry_run,
            context,
            backup_suffix,
            no_backup,
            keep_going,
            report_json,
            verbose,
        } => {
            logger::init_logging(verbose)?;
            let config = Config::load()?;

            let suffix = backup_suffix
                .or_else(|| config.backup.suffix.clone())
                .unwrap_or_else(|| backup::DEFAULT_SUFFIX.to_string());
            backup::validate_suffix(&suffix)?;

            let make_backups = !no_backup && config.backup.enabled.unwrap_or(true);
            let context = context.or(config.processing.context_lines).unwrap_or(2);
            let keep_going = keep_going || config.processing.keep_going.unwrap_or(false);

            run_fix(
                &files,
                dry_run,
                context,
                &suffix,
                make_backups,
                keep_going,
                report_json,
            )
        }
        Args::Restore {
            files,
            backup_suffix,
            verbose,
        } => {
            logger::init_logging(verbose)?;
            let config = Config::load()?;
            let suffix = backup_suffix
                .or_else(|| config.backup.suffix.clone())
                .unwrap_or_else(|| backup::DEFAULT_SUFFIX.to_string());
            run_restore(&files, &suffix)
        }
        Args::Config { show } => run_config(show),
    }
}

fn run_fix(
    files: &[String],
    dry_run: bool,
    context: usize,
    suffix: &str,
    make_backups: bool,
    keep_going: bool,
    report_json: bool,
) -> Result<()> {
    let processor = FileProcessor::new(suffix, make_backups)?;

    if dry_run && !report_json {
        print!("{}", DiffFormatter::format_dry_run_header());
    }

    let mut failures = 0usize;

    for file in files {
        let path = PathBuf::from(file);
        let result = if dry_run {
            processor.preview(&path)
        } else {
            processor.apply(&path)
        };

        match result {
            Ok(report) => {
                if report_json {
                    let json = serde_json::to_string_pretty(&report)
                        .context("Failed to serialize report")?;
                    println!("{}", json);
                } else {
                    print!("{}", DiffFormatter::format_report(&report, context));
                }
            }
            Err(e) => {
                failures += 1;
                eprintln!("Error processing {}: {:#}", path.display(), e);
                if !keep_going {
                    anyhow::bail!("Aborted after failure on {}", path.display());
                }
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} file(s) failed", failures);
    }
    Ok(())
}

fn run_restore(files: &[String], suffix: &str) -> Result<()> {
    for file in files {
        let path = PathBuf::from(file);
        backup::restore(&path, suffix)?;
        println!("Restored: {}", path.display());
    }
    Ok(())
}

fn run_config(show: bool) -> Result<()> {
    let path = Config::ensure_exists()?;
    println!("Config file: {}", path.display());

    if show {
        let config = Config::load()?;
        println!("\n{}", config.show()?);
    }

    Ok(())
}
