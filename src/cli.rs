use crate::{
    args::CommandLine,
    batch,
    config::{ConfigResolver, Configuration, ENV_PREFIX, FILES, LIST_SEPARATOR, VALUED_OPTIONS},
    environment::{Environment, ProcessEnvironment},
    eol::Terminator,
    error::FixEolError,
    files::{PathLister, SearchScope, WalkDirLister},
    pause::{self, ConsoleKeyWaiter, KeyWaiter},
    usage,
};

use console::style;
use log::{debug, warn};
use std::env;

/// File patterns from the command line, or from `fixeol_files` when none were given.
fn file_patterns(cmd: &CommandLine, resolver: &ConfigResolver) -> Vec<String> {
    let positional: Vec<String> = cmd.positionals().into_iter().map(str::to_string).collect();
    if !positional.is_empty() {
        return positional;
    }
    resolver.get_list(&FILES, LIST_SEPARATOR, &[])
}

/// Runs the requested command and returns the exit code on success.
fn execute<E: Environment, L: PathLister>(
    cmd: &CommandLine,
    resolver: &ConfigResolver,
    config: &Configuration,
    env: &E,
    lister: &L,
) -> Result<i32, FixEolError> {
    if cmd.contains(&["h", "?", "help"]) {
        usage::print_usage(true);
        return Ok(0);
    }

    if cmd.contains(&["set"]) {
        usage::print_set_vars(env);
        return Ok(0);
    }

    // Validate the terminator before any file is looked at.
    let terminator = Terminator::parse(&config.terminator)?;
    debug!("terminator {} from spec {:?}", terminator, config.terminator);

    let patterns = file_patterns(cmd, resolver);
    let tasks = batch::expand(&patterns, SearchScope::from_recurse(config.recurse), lister)?;
    let summary = batch::run(&tasks, &terminator, config)?;

    if config.verbose {
        println!(
            "{}",
            style(format!(
                "Converted {} file(s), {} line(s).",
                summary.files, summary.lines
            ))
            .green()
            .bold()
        );
    }

    Ok(0)
}

/// Prints `err` to stderr, with a usage hint for argument problems.
fn report(err: &FixEolError) {
    eprintln!("{}", style(format!("**** Error: {}", err)).red().bold());
    if matches!(
        err,
        FixEolError::MissingFileArgument | FixEolError::FileNotFound(_)
    ) {
        usage::print_usage(false);
    }
}

/// Runs `fixeol` with explicit collaborators.
///
/// Configuration is resolved once up front. Pause-on-exit is honoured on
/// every path, including errors.
///
/// # Exit Codes
///
/// * `0` – Success, or help / `-set` shown.
/// * `1` – Missing file argument, bad pattern, or file not found.
/// * `5` – Invalid terminator spec.
/// * `100` / `101` / `102` – Backup, rewrite or cleanup failure.
pub fn run<E, L, W>(args: Vec<String>, env: &E, lister: &L, waiter: &mut W) -> i32
where
    E: Environment,
    L: PathLister,
    W: KeyWaiter,
{
    let cmd = CommandLine::parse(args, VALUED_OPTIONS);
    let resolver = ConfigResolver::new(&cmd, env, ENV_PREFIX);
    let config = resolver.resolve();
    debug!("{:?}", config);

    let code = match execute(&cmd, &resolver, &config, env, lister) {
        Ok(code) => code,
        Err(e) => {
            report(&e);
            e.exit_code()
        }
    };

    if let Err(e) = pause::pause_if(waiter, config.pause) {
        warn!("pause failed: {}", e);
    }

    code
}

/// Main CLI entry point for `fixeol`, using the process arguments, the real
/// environment, the filesystem and the terminal.
pub fn entry() -> i32 {
    let args: Vec<String> = env::args().skip(1).collect();
    run(args, &ProcessEnvironment, &WalkDirLister, &mut ConsoleKeyWaiter)
}
