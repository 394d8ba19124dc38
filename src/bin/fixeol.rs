use env_logger::Env;

/// Entry point for the `fixeol` binary.
///
/// Initializes logging (`RUST_LOG` overrides the default `warn` filter), then
/// delegates to the CLI entry function and exits with its code.
fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    std::process::exit(fixeol::cli::entry());
}
