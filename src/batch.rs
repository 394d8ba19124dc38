//! Expands file patterns and runs the replacement protocol over each file.

use std::collections::HashSet;
use std::fs;
use std::path::{self, Path, PathBuf};

use console::style;
use log::info;

use crate::config::Configuration;
use crate::eol::Terminator;
use crate::error::FixEolError;
use crate::files::{PathLister, SearchScope};
use crate::replace::{FileReplacer, FileTask};

/// Totals for a completed run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub files: usize,
    pub lines: usize,
}

/// Resolves every pattern into a [`FileTask`].
///
/// Paths are canonicalized (falling back to a plain absolute path) and
/// de-duplicated, keeping first-seen order. Every
/// path is checked before any task is returned, so a missing file aborts the
/// run before anything is modified.
///
/// # Errors
///
/// * [`FixEolError::MissingFileArgument`] if `patterns` is empty.
/// * [`FixEolError::FileNotFound`] if a pattern matches nothing or a match is
///   not a regular file.
/// * Whatever the lister reports for unusable patterns.
pub fn expand<L: PathLister>(
    patterns: &[String],
    scope: SearchScope,
    lister: &L,
) -> Result<Vec<FileTask>, FixEolError> {
    if patterns.is_empty() {
        return Err(FixEolError::MissingFileArgument);
    }

    let mut seen = HashSet::new();
    let mut paths = Vec::new();
    for pattern in patterns {
        let matched = lister.matching(pattern, scope)?;
        if matched.is_empty() {
            return Err(FixEolError::FileNotFound(PathBuf::from(pattern)));
        }
        for p in matched {
            let abs = fs::canonicalize(&p)
                .or_else(|_| path::absolute(&p))
                .unwrap_or(p);
            if seen.insert(abs.clone()) {
                paths.push(abs);
            }
        }
    }

    if let Some(missing) = paths.iter().find(|p| !p.is_file()) {
        return Err(FixEolError::FileNotFound(missing.clone()));
    }

    Ok(paths.into_iter().map(FileTask::new).collect())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Processes `tasks` in order, stopping at the first failure.
///
/// Files already processed stay rewritten; the failing file is left in
/// whichever stage it reached.
///
/// # Parameters
///
/// * `tasks` - files from [`expand`], already known to exist.
/// * `terminator` - the line terminator to write.
/// * `config` - `verbose` prints per-file progress, `keep_backup` keeps `.bak`.
///
/// # Returns
///
/// Files and lines converted when every task succeeded.
///
/// # Errors
///
/// The first task's [`FixEolError::Backup`], [`FixEolError::Rewrite`] or
/// [`FixEolError::Cleanup`]; later tasks are not started.
pub fn run(
    tasks: &[FileTask],
    terminator: &Terminator,
    config: &Configuration,
) -> Result<BatchSummary, FixEolError> {
    tasks.iter().try_fold(BatchSummary::default(), |mut summary, task| {
        if config.verbose {
            println!("Processing file: {}", style(display_name(&task.path)).bold());
        }

        let mut replacer = FileReplacer::new(task);
        let stats = match replacer.run(terminator, config.keep_backup) {
            Ok(stats) => stats,
            Err(e) => {
                info!("{}: stopped at {:?}", task.path.display(), replacer.state());
                return Err(e);
            }
        };

        if config.verbose {
            println!(
                "  {} lines, terminator {}",
                stats.lines,
                style(terminator).cyan()
            );
        }

        summary.files += 1;
        summary.lines += stats.lines;
        Ok(summary)
    })
}
