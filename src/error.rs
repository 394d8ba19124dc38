use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Every failure that ends a `fixeol` run.
///
/// None of these are retried. Each maps to its own process exit code via
/// [`FixEolError::exit_code`].
#[derive(Debug, Error)]
pub enum FixEolError {
    /// No file pattern on the command line or in the environment.
    #[error("missing command-line argument: file")]
    MissingFileArgument,

    /// A wildcard pattern that `globset` could not compile.
    #[error("invalid file pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// A pattern matched nothing, or a resolved path is not a regular file.
    #[error("the file was not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The terminator spec contains something other than CR/LF after token substitution.
    #[error("invalid eol `{spec}`: unexpected character {found:?}")]
    InvalidTerminatorSpec { spec: String, found: char },

    #[error("failed to create backup of {}: {source}", path.display())]
    Backup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to rewrite {}: {source}", path.display())]
    Rewrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to clean up after rewriting {}: {source}", path.display())]
    Cleanup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FixEolError {
    /// Process exit code reported for this error.
    ///
    /// * `1` – missing file argument, bad pattern, or file not found.
    /// * `5` – invalid terminator spec.
    /// * `100` / `101` / `102` – backup, rewrite, cleanup stage failures.
    pub fn exit_code(&self) -> i32 {
        match self {
            FixEolError::MissingFileArgument
            | FixEolError::Pattern { .. }
            | FixEolError::FileNotFound(_) => 1,
            FixEolError::InvalidTerminatorSpec { .. } => 5,
            FixEolError::Backup { .. } => 100,
            FixEolError::Rewrite { .. } => 101,
            FixEolError::Cleanup { .. } => 102,
        }
    }
}
