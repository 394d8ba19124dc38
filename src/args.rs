/// One command-line token after classification.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Item {
    Named { name: String, value: Option<String> },
    Positional(String),
}

/// Tokenized command line.
///
/// Named items start with `-`, `--` or `!`. A value is attached with `=` or
/// `:` (`-eol=lf`), or, for names listed as value-taking, taken from the
/// following token (`-eol lf`). Names compare case-insensitively. Everything
/// else is positional.
#[derive(Debug, Clone, Default)]
pub struct CommandLine {
    items: Vec<Item>,
}

fn option_name(token: &str) -> Option<&str> {
    let stripped = token
        .strip_prefix("--")
        .or_else(|| token.strip_prefix('-'))
        .or_else(|| token.starts_with('!').then_some(token))?;
    (!stripped.is_empty()).then_some(stripped)
}

impl CommandLine {
    /// Classifies `args` (without the program name).
    pub fn parse<I>(args: I, valued: &[&str]) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut items = Vec::new();
        let mut iter = args.into_iter().peekable();

        while let Some(token) = iter.next() {
            let Some(body) = option_name(&token) else {
                items.push(Item::Positional(token));
                continue;
            };

            let (name, value) = match body.find(['=', ':']) {
                Some(i) => (body[..i].to_string(), Some(body[i + 1..].to_string())),
                None => (body.to_string(), None),
            };

            let takes_value = valued.iter().any(|v| v.eq_ignore_ascii_case(&name));
            let value = match value {
                Some(v) => Some(v),
                None if takes_value => iter.next_if(|next| option_name(next).is_none()),
                None => None,
            };

            items.push(Item::Named { name, value });
        }

        CommandLine { items }
    }

    fn find(&self, aliases: &[&str]) -> Option<&Option<String>> {
        self.items.iter().find_map(|item| match item {
            Item::Named { name, value } if aliases.iter().any(|a| a.eq_ignore_ascii_case(name)) => {
                Some(value)
            }
            _ => None,
        })
    }

    /// Whether any of `aliases` was given.
    pub fn contains(&self, aliases: &[&str]) -> bool {
        self.find(aliases).is_some()
    }

    /// The first matching option's value: `None` if absent, `Some(None)` if given bare.
    pub fn value(&self, aliases: &[&str]) -> Option<Option<&str>> {
        self.find(aliases).map(|v| v.as_deref())
    }

    /// Positional arguments, in order.
    pub fn positionals(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter_map(|item| match item {
                Item::Positional(p) => Some(p.as_str()),
                Item::Named { .. } => None,
            })
            .collect()
    }
}
