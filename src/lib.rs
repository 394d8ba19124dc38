//! # fixeol
//!
//! A CLI tool to normalize line endings across text files.
//!
//! This crate provides functionality to:
//! - Resolve options from negated flags, flags, environment variables and defaults
//! - Detect a file's encoding from its byte-order mark
//! - Rewrite every line terminator to CR, LF, CR LF or any CR/LF combination
//! - Replace each file through a backup → rewrite → finalize protocol
//!
//! ## Usage
//!
//! ```bash
//! # Convert all .txt files in the current directory to LF
//! fixeol -eol lf *.txt
//!
//! # Convert recursively to CRLF, keeping `<file>.bak` copies
//! fixeol -r -backup -eol crlf "*.cs"
//! ```
//!
//! ## Modules
//!
//! - [`cli`] - Command-line entry point and exit codes
//! - [`args`] - Command-line tokenization
//! - [`config`] - Option resolution and the run configuration
//! - [`environment`] - Environment-variable access
//! - [`encoding`] - Byte-order-mark detection
//! - [`eol`] - Terminator specs and line rewriting
//! - [`replace`] - Per-file replacement protocol
//! - [`files`] - File-pattern expansion
//! - [`batch`] - Sequential processing of resolved files
//! - [`pause`] - Pause-on-exit
//! - [`usage`] - Help and `-set` output
//! - [`error`] - Error taxonomy

pub mod args;
pub mod batch;
pub mod cli;
pub mod config;
pub mod encoding;
pub mod environment;
pub mod eol;
pub mod error;
pub mod files;
pub mod pause;
pub mod replace;
pub mod usage;

pub use error::FixEolError;
