//! Tri-source option resolution.
//!
//! Each option is looked up through an ordered list of providers: negated
//! flags, then flags, then environment variables. The first provider with an
//! answer wins; the caller's default applies when none has one.

use crate::args::CommandLine;
use crate::environment::Environment;

/// Prefix shared by every environment variable the tool reads.
pub const ENV_PREFIX: &str = "fixeol_";

/// Option names that take a value from the following token.
pub const VALUED_OPTIONS: &[&str] = &["eol"];

/// Where an option may come from.
#[derive(Debug, Clone, Copy)]
pub struct OptionSpec {
    pub aliases: &'static [&'static str],
    pub negated: &'static [&'static str],
    /// Environment key without [`ENV_PREFIX`].
    pub env_key: &'static str,
}

pub const VERBOSE: OptionSpec = OptionSpec {
    aliases: &["v", "verbose"],
    negated: &["!v", "!verbose"],
    env_key: "verbose",
};

pub const BACKUP: OptionSpec = OptionSpec {
    aliases: &["b", "backup"],
    negated: &["!b", "!backup"],
    env_key: "backup",
};

pub const RECURSE: OptionSpec = OptionSpec {
    aliases: &["r", "recurse", "s", "subdir", "subdirs"],
    negated: &["!r", "!recurse", "!s", "!subdir", "!subdirs"],
    env_key: "recurse",
};

pub const PAUSE: OptionSpec = OptionSpec {
    aliases: &["p", "pause"],
    negated: &["!p", "!pause"],
    env_key: "pause",
};

pub const EOL: OptionSpec = OptionSpec {
    aliases: &["eol"],
    negated: &["!eol"],
    env_key: "eol",
};

/// File patterns used when none are given positionally.
pub const FILES: OptionSpec = OptionSpec {
    aliases: &["file", "files"],
    negated: &["!file", "!files"],
    env_key: "files",
};

/// Separator for list-valued options.
pub const LIST_SEPARATOR: char = ';';

/// Terminator used when `-eol` is given without a value.
const BARE_EOL: &str = "crlf";

/// A raw answer from one provider, before typed parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// A negated alias was present: the option is forced off.
    Negated,
    /// A flag was present, possibly with a value.
    Flag(Option<String>),
    /// A non-empty environment variable.
    Env(String),
}

/// One source of option values.
pub trait Provider {
    fn lookup(&self, option: &OptionSpec) -> Option<Lookup>;
}

struct NegatedFlags<'a>(&'a CommandLine);

impl Provider for NegatedFlags<'_> {
    fn lookup(&self, option: &OptionSpec) -> Option<Lookup> {
        self.0.contains(option.negated).then_some(Lookup::Negated)
    }
}

struct Flags<'a>(&'a CommandLine);

impl Provider for Flags<'_> {
    fn lookup(&self, option: &OptionSpec) -> Option<Lookup> {
        self.0
            .value(option.aliases)
            .map(|v| Lookup::Flag(v.map(str::to_string)))
    }
}

struct EnvVars<'a> {
    env: &'a dyn Environment,
    prefix: &'a str,
}

impl Provider for EnvVars<'_> {
    fn lookup(&self, option: &OptionSpec) -> Option<Lookup> {
        self.env
            .var(&format!("{}{}", self.prefix, option.env_key))
            .filter(|v| !v.is_empty())
            .map(Lookup::Env)
    }
}

/// Parses a boolean leniently.
///
/// `true`/`false` in any case parse as themselves; otherwise a value starting
/// with `t` or `y`, or equal to `1`, is true and anything else is false.
pub fn parse_bool(raw: &str) -> bool {
    if raw.eq_ignore_ascii_case("true") {
        return true;
    }
    if raw.eq_ignore_ascii_case("false") {
        return false;
    }
    let first = raw.chars().next().map(|c| c.to_ascii_lowercase());
    matches!(first, Some('t') | Some('y')) || raw == "1"
}

/// Parses an integer, falling back to `default` on failure.
pub fn parse_int(raw: &str, default: i64) -> i64 {
    raw.trim().parse().unwrap_or(default)
}

/// Splits on `separator`, dropping empty entries; an empty result yields `default`.
pub fn parse_list(raw: &str, separator: char, default: &[String]) -> Vec<String> {
    let items: Vec<String> = raw
        .split(separator)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if items.is_empty() {
        default.to_vec()
    } else {
        items
    }
}

/// Resolves options from the command line and environment.
pub struct ConfigResolver<'a> {
    providers: Vec<Box<dyn Provider + 'a>>,
}

impl<'a> ConfigResolver<'a> {
    pub fn new(args: &'a CommandLine, env: &'a dyn Environment, prefix: &'a str) -> Self {
        ConfigResolver {
            providers: vec![
                Box::new(NegatedFlags(args)),
                Box::new(Flags(args)),
                Box::new(EnvVars { env, prefix }),
            ],
        }
    }

    /// First answer from the providers in priority order.
    pub fn lookup(&self, option: &OptionSpec) -> Option<Lookup> {
        self.providers.iter().find_map(|p| p.lookup(option))
    }

    /// Resolves a boolean option.
    ///
    /// # Parameters
    ///
    /// * `option` - aliases and environment key to look up.
    /// * `default` - used when no source mentions the option.
    ///
    /// # Returns
    ///
    /// `false` for a negated flag, `true` for a bare flag, otherwise the
    /// leniently parsed value (`true`, `yes`, `1`, ...).
    pub fn get_bool(&self, option: &OptionSpec, default: bool) -> bool {
        match self.lookup(option) {
            Some(Lookup::Negated) => false,
            Some(Lookup::Flag(None)) => true,
            Some(Lookup::Flag(Some(v))) | Some(Lookup::Env(v)) => parse_bool(&v),
            None => default,
        }
    }

    /// Resolves a string option.
    ///
    /// # Parameters
    ///
    /// * `option` - aliases and environment key to look up.
    /// * `bare` - used when the flag is given without a value.
    /// * `default` - used when no source mentions the option.
    ///
    /// # Returns
    ///
    /// The raw value; a negated flag yields an empty string.
    pub fn get_string(&self, option: &OptionSpec, bare: &str, default: &str) -> String {
        match self.lookup(option) {
            Some(Lookup::Negated) => String::new(),
            Some(Lookup::Flag(None)) => bare.to_string(),
            Some(Lookup::Flag(Some(v))) | Some(Lookup::Env(v)) => v,
            None => default.to_string(),
        }
    }

    /// Resolves an integer option.
    ///
    /// # Returns
    ///
    /// `0` for a negated flag. A bare flag or an unparsable value falls back
    /// to `default`.
    pub fn get_int(&self, option: &OptionSpec, default: i64) -> i64 {
        match self.lookup(option) {
            Some(Lookup::Negated) => 0,
            Some(Lookup::Flag(Some(v))) | Some(Lookup::Env(v)) => parse_int(&v, default),
            Some(Lookup::Flag(None)) | None => default,
        }
    }

    /// Resolves a list option such as `fixeol_files=a.txt;*.md`.
    ///
    /// # Parameters
    ///
    /// * `separator` - splits the raw value; empty entries are dropped.
    /// * `default` - used when the option is absent, bare, or splits to nothing.
    ///
    /// # Returns
    ///
    /// The entries in their given order; a negated flag yields an empty list.
    pub fn get_list(&self, option: &OptionSpec, separator: char, default: &[String]) -> Vec<String> {
        match self.lookup(option) {
            Some(Lookup::Negated) => Vec::new(),
            Some(Lookup::Flag(Some(v))) | Some(Lookup::Env(v)) => parse_list(&v, separator, default),
            Some(Lookup::Flag(None)) | None => default.to_vec(),
        }
    }

    /// Builds the run's configuration snapshot.
    pub fn resolve(&self) -> Configuration {
        Configuration {
            verbose: self.get_bool(&VERBOSE, false),
            pause: self.get_bool(&PAUSE, false),
            recurse: self.get_bool(&RECURSE, false),
            keep_backup: self.get_bool(&BACKUP, false),
            terminator: self.get_string(&EOL, BARE_EOL, ""),
        }
    }
}

/// Options resolved once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    pub verbose: bool,
    pub pause: bool,
    pub recurse: bool,
    pub keep_backup: bool,
    /// Raw terminator spec; empty means the host default.
    pub terminator: String,
}
