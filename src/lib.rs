pub mod config;
pub mod engine;
pub mod oracle;
pub mod rewrite;
pub mod scanner;

use crate::oracle::EngineOracle;
use crate::rewrite::{RegionEdit, rewrite_regions, transform_class_list};
use crate::scanner::WalkOptions;
use futures::future;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};

pub const DEFAULT_PREFIX: &str = "tw-";
pub const DEFAULT_INCLUDE: &str = "**/*.vue";
pub const DEFAULT_IGNORE: [&str; 2] = ["**/node_modules/**", "**/dist/**"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Apply {
        cwd: Option<String>,
        inputs: Vec<String>,
        ignore: Vec<String>,
        prefix: String,
    },
    Scan {
        cwd: Option<String>,
        inputs: Vec<String>,
        ignore: Vec<String>,
        prefix: String,
    },
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CliError {
    pub message: String,
}

pub async fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Apply {
            cwd,
            inputs,
            ignore,
            prefix,
        } => run_pass(cwd, inputs, ignore, prefix, PassMode::Apply).await,
        Command::Scan {
            cwd,
            inputs,
            ignore,
            prefix,
        } => run_pass(cwd, inputs, ignore, prefix, PassMode::Report).await,
        Command::Help => {
            print_help();
            Ok(())
        }
    }
}

pub async fn run_from_env() -> Result<(), CliError> {
    let command = parse_args(env::args().skip(1))?;
    run(command).await
}

pub fn parse_args<I>(args: I) -> Result<Command, CliError>
where
    I: IntoIterator<Item = String>,
{
    let mut iter = args.into_iter();
    let Some(cmd) = iter.next() else {
        return Ok(Command::Help);
    };

    match cmd.as_str() {
        "apply" => parse_pass_args(iter.collect(), "apply"),
        "scan" => parse_pass_args(iter.collect(), "scan"),
        "-h" | "--help" | "help" => Ok(Command::Help),
        _ => Err(CliError {
            message: format!("unknown command: {}", cmd),
        }),
    }
}

fn parse_pass_args(args: Vec<String>, command: &str) -> Result<Command, CliError> {
    let mut cwd = None;
    let mut inputs = Vec::new();
    let mut ignore = Vec::new();
    let mut prefix = DEFAULT_PREFIX.to_string();
    let mut idx = 0;

    while idx < args.len() {
        match args[idx].as_str() {
            "--cwd" | "-C" => {
                idx += 1;
                if idx >= args.len() {
                    return Err(CliError {
                        message: format!("{} requires a value for --cwd", command),
                    });
                }
                cwd = Some(args[idx].clone());
            }
            "--prefix" | "-p" => {
                idx += 1;
                if idx >= args.len() {
                    return Err(CliError {
                        message: format!("{} requires a value for --prefix", command),
                    });
                }
                prefix = args[idx].clone();
            }
            "--ignore" | "-I" => {
                idx += 1;
                if idx >= args.len() {
                    return Err(CliError {
                        message: format!("{} requires a value for --ignore", command),
                    });
                }
                ignore.push(args[idx].clone());
            }
            value => {
                inputs.push(value.to_string());
            }
        }
        idx += 1;
    }

    if command == "apply" {
        Ok(Command::Apply {
            cwd,
            inputs,
            ignore,
            prefix,
        })
    } else {
        Ok(Command::Scan {
            cwd,
            inputs,
            ignore,
            prefix,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PassMode {
    Apply,
    Report,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentOutcome {
    Rewritten,
    Unchanged,
}

async fn run_pass(
    cwd: Option<String>,
    inputs: Vec<String>,
    ignore: Vec<String>,
    prefix: String,
    mode: PassMode,
) -> Result<(), CliError> {
    let workspace = resolve_workspace(cwd)?;

    let patterns = if inputs.is_empty() {
        vec![DEFAULT_INCLUDE.to_string()]
    } else {
        inputs
    };
    let mut ignore_patterns: Vec<String> = DEFAULT_IGNORE
        .iter()
        .map(|pattern| pattern.to_string())
        .collect();
    ignore_patterns.extend(ignore);

    let options = WalkOptions {
        base_path: workspace.clone(),
        ..WalkOptions::default()
    };
    let files = scanner::collect_documents(&patterns, &ignore_patterns, &options)
        .map_err(|err| CliError {
            message: err.message,
        })?;

    let oracle = EngineOracle::new(workspace);
    let mut processed = 0usize;
    let mut rewritten = 0usize;

    for file in &files {
        match process_document(&oracle, file, &prefix, mode).await {
            Ok(outcome) => {
                processed += 1;
                if outcome == DocumentOutcome::Rewritten {
                    rewritten += 1;
                }
            }
            Err(err) => {
                warn!(file = %file.display(), error = %err, "skipping unreadable document");
            }
        }
    }

    match mode {
        PassMode::Apply => eprintln!("processed {} files, rewrote {}", processed, rewritten),
        PassMode::Report => eprintln!("processed {} files, {} would be rewritten", processed, rewritten),
    }

    Ok(())
}

/// One whole-document pass: regions are located against the pristine text
/// and materialized before any mutation; transforms for all regions run
/// concurrently (each fanning out per token); the rewrite is two-phase; the
/// file is only written when the result differs.
async fn process_document(
    oracle: &EngineOracle,
    path: &Path,
    prefix: &str,
    mode: PassMode,
) -> std::io::Result<DocumentOutcome> {
    let text = tokio::fs::read_to_string(path).await?;
    let matches = scanner::find_class_attributes(&text);
    if matches.is_empty() {
        return Ok(DocumentOutcome::Unchanged);
    }

    let replacements = future::join_all(
        matches
            .iter()
            .map(|attribute| transform_class_list(oracle, &attribute.text, prefix)),
    )
    .await;

    let edits: Vec<RegionEdit> = matches
        .into_iter()
        .zip(replacements)
        .filter(|(attribute, replacement)| *replacement != attribute.text)
        .map(|(attribute, replacement)| RegionEdit {
            start: attribute.start,
            original: attribute.text,
            replacement,
        })
        .collect();
    if edits.is_empty() {
        return Ok(DocumentOutcome::Unchanged);
    }

    let outcome = rewrite_regions(&text, &edits);
    for failure in &outcome.failures {
        error!(file = %path.display(), offset = failure.start, "{}", failure);
    }
    if outcome.text == text {
        return Ok(DocumentOutcome::Unchanged);
    }

    match mode {
        PassMode::Apply => {
            tokio::fs::write(path, &outcome.text).await?;
            info!(file = %path.display(), regions = edits.len(), "rewrote utility classes");
        }
        PassMode::Report => {
            println!("{}", path.display());
            info!(file = %path.display(), regions = edits.len(), "would rewrite utility classes");
        }
    }

    Ok(DocumentOutcome::Rewritten)
}

fn resolve_workspace(cwd: Option<String>) -> Result<PathBuf, CliError> {
    let current = env::current_dir().map_err(|err| CliError {
        message: format!("failed to resolve current directory: {}", err),
    })?;
    Ok(match cwd {
        Some(dir) => {
            let path = PathBuf::from(dir);
            if path.is_absolute() {
                path
            } else {
                current.join(path)
            }
        }
        None => current,
    })
}

fn print_help() {
    println!("prefixwind");
    println!();
    println!("USAGE:");
    println!("  prefixwind apply [--cwd <dir>] [--prefix <value>] [--ignore <glob>] [glob...]");
    println!("  prefixwind scan  [--cwd <dir>] [--prefix <value>] [--ignore <glob>] [glob...]");
    println!();
    println!("  apply rewrites matching documents in place; scan reports the documents");
    println!("  an apply run would rewrite, without writing anything.");
    println!();
    println!("  defaults: prefix '{}', include '{}',", DEFAULT_PREFIX, DEFAULT_INCLUDE);
    println!("  ignore '{}' and '{}'", DEFAULT_IGNORE[0], DEFAULT_IGNORE[1]);
    println!();
    println!("EXAMPLES:");
    println!("  prefixwind apply");
    println!("  prefixwind apply --prefix app- \"src/**/*.vue\"");
    println!("  prefixwind scan -C packages/web -I \"**/generated/**\"");
}
