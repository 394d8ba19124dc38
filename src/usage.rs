use console::{measure_text_width, style};

use crate::config::ENV_PREFIX;
use crate::environment::Environment;

const PROGRAM: &str = "fixeol";

/// Prints `lines` inside a box sized to the widest **visible** line.
///
/// Widths are measured with [`console::measure_text_width`] so styled content
/// does not throw off the padding. Borders are styled on their own so inner
/// colors never bleed into the frame.
fn print_boxed(lines: &[String]) {
    let max_width = lines
        .iter()
        .map(|l| measure_text_width(l))
        .max()
        .unwrap_or(0)
        + 2;

    let border = "─".repeat(max_width);
    let left = style("│ ").cyan().to_string();
    let right = style("│").cyan().to_string();

    println!("{}", style(format!("┌{}┐", border)).cyan());
    for line in lines {
        let pad = max_width - measure_text_width(line);
        println!("{}{}{}{}", left, line, " ".repeat(pad - 1), right);
    }
    println!("{}", style(format!("└{}┘", border)).cyan());
}

fn header_lines() -> Vec<String> {
    vec![
        style(format!("{} {}", PROGRAM, env!("CARGO_PKG_VERSION")))
            .bold()
            .to_string(),
        "Normalize line endings in text files.".to_string(),
    ]
}

/// Lines of the full usage text, without the header box.
///
/// # Examples
///
/// ```ignore
/// let lines = usage_lines();
/// assert!(lines.iter().any(|l| l.contains("-eol")));
/// ```
fn usage_lines() -> Vec<String> {
    let p = ENV_PREFIX;
    vec![
        "USAGE:".to_string(),
        format!("    {PROGRAM} [options] [commands] filepattern [filepattern...]"),
        String::new(),
        "    filepattern   file name or wildcard (* ?) of files to convert.".to_string(),
        format!("                  {p}files=a.txt;*.md is used when none is given."),
        String::new(),
        "COMMANDS:".to_string(),
        "    -eol <spec>   line ending to write: crlf, cr, lf, or \\r\\n-style".to_string(),
        "                  escapes (default: the operating system's).".to_string(),
        format!("    -set          display the {p}* environment variables, then exit."),
        "    -h -? -help   display this help, then exit.".to_string(),
        String::new(),
        "OPTIONS:".to_string(),
        "    -v -verbose   print each file as it is processed (default: false)".to_string(),
        "    -b -backup    keep the original as <file>.bak (default: false)".to_string(),
        "    -r -recurse   also search subdirectories; alias -s -subdir -subdirs".to_string(),
        "    -p -pause     wait for a key before exiting (default: false)".to_string(),
        String::new(),
        "    Prefix any option with ! to force it off, e.g. -!backup.".to_string(),
        String::new(),
        "ENVIRONMENT:".to_string(),
        format!("    {p}verbose  {p}backup  {p}recurse  {p}pause  {p}eol  {p}files"),
        "    Command-line options override environment variables.".to_string(),
    ]
}

/// Prints usage to stdout. With `details == false` only a hint is printed.
pub fn print_usage(details: bool) {
    if !details {
        println!();
        println!("type '{} -?' for help", PROGRAM);
        return;
    }

    println!();
    print_boxed(&header_lines());
    println!();
    for line in usage_lines() {
        println!("{}", line);
    }
    println!();
}

/// Lines for the `-set` command: every variable under [`ENV_PREFIX`].
fn set_var_lines<E: Environment>(env: &E) -> Vec<String> {
    let vars = env.vars_with_prefix(ENV_PREFIX);
    if vars.is_empty() {
        return vec!["  <none found>".to_string()];
    }
    vars.into_iter()
        .map(|(k, v)| format!("  {} = {}", k, v))
        .collect()
}

pub fn print_set_vars<E: Environment>(env: &E) {
    println!();
    print_boxed(&header_lines());
    println!();
    println!("{}", style("environment variables:").bold());
    for line in set_var_lines(env) {
        println!("{}", line);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::{set_var_lines, usage_lines};
    use crate::environment::MapEnvironment;

    #[test]
    fn usage_mentions_every_option_and_variable() {
        let s = usage_lines().join("\n");

        for needle in ["-eol", "-set", "-verbose", "-backup", "-recurse", "-subdirs", "-pause"] {
            assert!(s.contains(needle), "missing {needle}");
        }
        for key in ["verbose", "backup", "recurse", "pause", "eol", "files"] {
            assert!(s.contains(&format!("fixeol_{key}")), "missing {key}");
        }
    }

    #[test]
    fn set_lists_only_prefixed_variables() {
        let env = MapEnvironment::new()
            .with("fixeol_eol", "lf")
            .with("HOME", "/root");
        assert_eq!(set_var_lines(&env), vec!["  fixeol_eol = lf".to_string()]);
    }

    #[test]
    fn set_reports_none_found() {
        let env = MapEnvironment::new().with("HOME", "/root");
        assert_eq!(set_var_lines(&env), vec!["  <none found>".to_string()]);
    }
}
