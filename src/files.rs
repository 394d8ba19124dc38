//! File-pattern expansion.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use log::warn;
use walkdir::WalkDir;

use crate::error::FixEolError;

/// How deep a pattern's directory is searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    TopDirectoryOnly,
    AllDirectories,
}

impl SearchScope {
    pub fn from_recurse(recurse: bool) -> Self {
        if recurse {
            SearchScope::AllDirectories
        } else {
            SearchScope::TopDirectoryOnly
        }
    }
}

/// Abstraction over "given a pattern and a scope, return matching paths".
pub trait PathLister {
    fn matching(&self, pattern: &str, scope: SearchScope) -> Result<Vec<PathBuf>, FixEolError>;
}

/// Whether `pattern` contains the `*` or `?` wildcards.
///
/// Brackets alone do not make a pattern: `log[1].txt` is a plain name. Inside a
/// wildcard pattern they still form a `globset` character class.
pub fn has_wildcards(pattern: &str) -> bool {
    pattern.contains(['*', '?'])
}

enum NameMatcher {
    Literal(String),
    Glob(GlobMatcher),
}

impl NameMatcher {
    fn is_match(&self, name: &OsStr) -> bool {
        match self {
            NameMatcher::Literal(lit) => name == OsStr::new(lit),
            NameMatcher::Glob(glob) => glob.is_match(name),
        }
    }
}

/// Splits a pattern into the directory to search and the file-name part.
fn split_pattern(pattern: &str) -> (PathBuf, String) {
    let path = Path::new(pattern);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    (dir, name)
}

/// Lists files with `walkdir` and matches names with `globset`.
pub struct WalkDirLister;

impl PathLister for WalkDirLister {
    fn matching(&self, pattern: &str, scope: SearchScope) -> Result<Vec<PathBuf>, FixEolError> {
        let (dir, name) = split_pattern(pattern);
        let matcher = if has_wildcards(&name) {
            let glob = Glob::new(&name).map_err(|source| FixEolError::Pattern {
                pattern: pattern.to_string(),
                source,
            })?;
            NameMatcher::Glob(glob.compile_matcher())
        } else {
            NameMatcher::Literal(name)
        };

        if !dir.is_dir() {
            return Err(FixEolError::FileNotFound(PathBuf::from(pattern)));
        }

        let mut walker = WalkDir::new(&dir).min_depth(1).sort_by_file_name();
        if scope == SearchScope::TopDirectoryOnly {
            walker = walker.max_depth(1);
        }

        let mut found = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("skipping unreadable entry under {}: {}", dir.display(), e);
                    continue;
                }
            };
            // Symlinked files count; linked directories are not descended into.
            if entry.path().is_file() && matcher.is_match(entry.file_name()) {
                found.push(entry.into_path());
            }
        }
        Ok(found)
    }
}
