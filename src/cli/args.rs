//! Command-line tokenizer
//!
//! Turns the raw process arguments into [`ParsedArguments`]: a map of flags
//! keyed by camelCase name plus the ordered list of positionals. Parsing never
//! fails. Anything that is not recognisably a flag becomes a positional and
//! validation is left to the command handlers.

use std::collections::BTreeMap;

/// Short flag aliases and the long flag each one resolves to
const SHORT_ALIASES: &[(char, &str)] = &[
    ('j', "json"),
    ('q', "quiet"),
    ('p', "pretty"),
    ('w', "wide"),
    ('y', "yes"),
    ('h', "help"),
    ('v', "verbose"),
    ('V', "version"),
    ('n', "namespace"),
    ('l', "limit"),
    ('t', "tags"),
    ('i', "importance"),
    ('f', "format"),
    ('o', "output"),
    ('c', "config"),
];

/// Flags whose presence alone means `true`; they never consume a value
const BOOLEAN_FLAGS: &[&str] = &[
    "json",
    "quiet",
    "pretty",
    "wide",
    "yes",
    "help",
    "verbose",
    "version",
    "noTruncate",
    "noColor",
    "watch",
    "dryRun",
    "force",
    "all",
];

static ABSENT: FlagValue = FlagValue::Absent;

/// State of a single flag after parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagValue {
    /// Flag given with a value (`--limit 5`, `--tags=`)
    Present(String),
    /// Flag given without a value
    Flag,
    /// Flag not given at all
    Absent,
}

impl FlagValue {
    /// The string value, if one was supplied
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FlagValue::Present(value) => Some(value),
            FlagValue::Flag | FlagValue::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, FlagValue::Absent)
    }
}

/// Result of tokenizing one invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArguments {
    positionals: Vec<String>,
    flags: BTreeMap<String, FlagValue>,
}

impl ParsedArguments {
    /// Tokenize `tokens` in a single left-to-right pass.
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Self {
        let mut parsed = Self::default();
        let mut cursor = 0;

        while cursor < tokens.len() {
            let token = tokens[cursor].as_ref();
            let next = tokens.get(cursor + 1).map(AsRef::as_ref);

            if let Some((name, value)) = short_with_inline_value(token) {
                parsed.bind(name, FlagValue::Present(value.to_string()));
                cursor += 1;
            } else if let Some(name) = single_short(token) {
                cursor += parsed.bind_short(name, next);
            } else if let Some((leading, last)) = combined_short(token) {
                // Only the last letter of a cluster may take a value.
                for name in leading {
                    parsed.bind(name, FlagValue::Flag);
                }
                cursor += parsed.bind_short(last, next);
            } else if token == "--" {
                parsed
                    .positionals
                    .extend(tokens[cursor + 1..].iter().map(|t| t.as_ref().to_string()));
                break;
            } else if let Some(body) = token.strip_prefix("--") {
                cursor += parsed.bind_long(body, next);
            } else {
                parsed.positionals.push(token.to_string());
                cursor += 1;
            }
        }

        parsed
    }

    /// Ordered positional arguments
    pub fn positionals(&self) -> &[String] {
        &self.positionals
    }

    /// Positional at `index`, if present
    pub fn positional(&self, index: usize) -> Option<&str> {
        self.positionals.get(index).map(String::as_str)
    }

    /// The command name (first positional)
    pub fn command(&self) -> Option<&str> {
        self.positional(0)
    }

    /// Three-state lookup of a flag by camelCase name
    pub fn flag(&self, name: &str) -> &FlagValue {
        self.flags.get(name).unwrap_or(&ABSENT)
    }

    /// String value of a flag; `None` when absent or given without a value
    pub fn value(&self, name: &str) -> Option<&str> {
        self.flag(name).as_str()
    }

    /// Whether a flag is switched on: given bare, or given a non-empty value
    pub fn enabled(&self, name: &str) -> bool {
        match self.flag(name) {
            FlagValue::Flag => true,
            FlagValue::Present(value) => !value.is_empty(),
            FlagValue::Absent => false,
        }
    }

    /// Iterate over every flag that was given
    pub fn flags(&self) -> impl Iterator<Item = (&str, &FlagValue)> {
        self.flags.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Fill in a value for a flag the user did not give.
    ///
    /// This is the only mutation allowed after parsing and must happen before
    /// output is configured.
    pub fn set_default(&mut self, name: &str, value: impl Into<String>) {
        self.flags
            .entry(name.to_string())
            .or_insert_with(|| FlagValue::Present(value.into()));
    }

    fn bind(&mut self, name: &str, value: FlagValue) {
        self.flags.insert(name.to_string(), value);
    }

    /// Bind a resolved short flag; returns the number of tokens consumed.
    fn bind_short(&mut self, name: &str, next: Option<&str>) -> usize {
        if is_boolean(name) {
            self.bind(name, FlagValue::Flag);
            return 1;
        }
        match next {
            Some(value) if !value.starts_with('-') => {
                self.bind(name, FlagValue::Present(value.to_string()));
                2
            }
            _ => {
                self.bind(name, FlagValue::Flag);
                1
            }
        }
    }

    /// Bind a `--name[=value]` flag; returns the number of tokens consumed.
    fn bind_long(&mut self, body: &str, next: Option<&str>) -> usize {
        if let Some((key, value)) = body.split_once('=') {
            self.bind(&kebab_to_camel(key), FlagValue::Present(value.to_string()));
            return 1;
        }

        let name = kebab_to_camel(body);
        if is_boolean(&name) {
            self.bind(&name, FlagValue::Flag);
            return 1;
        }
        match next {
            // A single leading dash still counts as a value, so `--offset -5` works.
            Some(value) if !value.starts_with("--") => {
                self.bind(&name, FlagValue::Present(value.to_string()));
                2
            }
            _ => {
                self.bind(&name, FlagValue::Flag);
                1
            }
        }
    }
}

/// Resolve a short alias to its long flag name
pub fn resolve_alias(short: char) -> Option<&'static str> {
    SHORT_ALIASES
        .iter()
        .find(|(alias, _)| *alias == short)
        .map(|(_, name)| *name)
}

/// Whether a (camelCase) flag never takes a value
pub fn is_boolean(name: &str) -> bool {
    BOOLEAN_FLAGS.contains(&name)
}

/// `foo-bar-baz` -> `fooBarBaz`. A hyphen is only folded away when a letter
/// follows it; `page-2` stays as is.
pub fn kebab_to_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('-', Some(next)) if next.is_ascii_alphabetic() => {
                out.push(next.to_ascii_uppercase());
                chars.next();
            }
            _ => out.push(c),
        }
    }
    out
}

/// `dryRun` -> `dry-run`, for messages that name a flag
pub fn camel_to_kebab(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Split off the single-dash prefix of a short-flag token (`-x...`).
fn short_body(token: &str) -> Option<&str> {
    let body = token.strip_prefix('-')?;
    if body.starts_with('-') {
        return None;
    }
    Some(body)
}

/// `-X=value` with a known alias
fn short_with_inline_value(token: &str) -> Option<(&'static str, &str)> {
    let mut chars = short_body(token)?.chars();
    let short = chars.next()?;
    let rest = chars.as_str().strip_prefix('=')?;
    Some((resolve_alias(short)?, rest))
}

/// `-X` with a known alias
fn single_short(token: &str) -> Option<&'static str> {
    let mut chars = short_body(token)?.chars();
    let short = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    resolve_alias(short)
}

/// `-XYZ` where every letter is a known alias; split into leading names and
/// the last one
fn combined_short(token: &str) -> Option<(Vec<&'static str>, &'static str)> {
    let body = short_body(token)?;
    if body.chars().count() < 2 {
        return None;
    }
    let mut names: Vec<&'static str> = body.chars().map(resolve_alias).collect::<Option<_>>()?;
    let last = names.pop()?;
    Some((names, last))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(tokens: &[&str]) -> ParsedArguments {
        ParsedArguments::parse(tokens)
    }

    #[test]
    fn test_store_scenario() {
        let args = parse(&[
            "store",
            "hello world",
            "--importance",
            "0.8",
            "--tags",
            "a,b",
            "-j",
        ]);

        assert_eq!(args.positionals(), ["store", "hello world"]);
        assert_eq!(args.value("importance"), Some("0.8"));
        assert_eq!(args.value("tags"), Some("a,b"));
        assert_eq!(args.flag("json"), &FlagValue::Flag);
        assert_eq!(args.flags().count(), 3);
    }

    #[test]
    fn test_short_value_flag_does_not_swallow_flag() {
        let args = parse(&["-n", "--json"]);

        assert_eq!(args.flag("namespace"), &FlagValue::Flag);
        assert_eq!(args.flag("json"), &FlagValue::Flag);
        assert!(args.positionals().is_empty());
    }

    #[test]
    fn test_short_value_flag_consumes_value() {
        let args = parse(&["list", "-n", "work", "-l", "5"]);

        assert_eq!(args.positionals(), ["list"]);
        assert_eq!(args.value("namespace"), Some("work"));
        assert_eq!(args.value("limit"), Some("5"));
    }

    #[test]
    fn test_short_inline_value() {
        let args = parse(&["-n=work", "-t="]);

        assert_eq!(args.value("namespace"), Some("work"));
        assert_eq!(args.flag("tags"), &FlagValue::Present(String::new()));
    }

    #[test]
    fn test_short_inline_value_on_boolean_alias_keeps_literal() {
        let args = parse(&["-j=yes"]);
        assert_eq!(args.value("json"), Some("yes"));
    }

    #[test]
    fn test_boolean_never_consumes_next() {
        let args = parse(&["--json", "x", "-q", "y"]);

        assert_eq!(args.flag("json"), &FlagValue::Flag);
        assert_eq!(args.flag("quiet"), &FlagValue::Flag);
        assert_eq!(args.positionals(), ["x", "y"]);
    }

    #[test]
    fn test_combined_short_flags() {
        let args = parse(&["-jq"]);

        assert_eq!(args.flag("json"), &FlagValue::Flag);
        assert_eq!(args.flag("quiet"), &FlagValue::Flag);
        assert!(args.positionals().is_empty());
    }

    #[test]
    fn test_combined_short_last_takes_value() {
        let args = parse(&["-jn", "work"]);

        assert_eq!(args.flag("json"), &FlagValue::Flag);
        assert_eq!(args.value("namespace"), Some("work"));
        assert!(args.positionals().is_empty());
    }

    #[test]
    fn test_combined_short_mid_value_flag_degrades_to_bool() {
        let args = parse(&["-nj", "work"]);

        assert_eq!(args.flag("namespace"), &FlagValue::Flag);
        assert_eq!(args.flag("json"), &FlagValue::Flag);
        assert_eq!(args.positionals(), ["work"]);
    }

    #[test]
    fn test_combined_short_with_unknown_letter_is_positional() {
        let args = parse(&["-jx", "-z"]);

        assert_eq!(args.positionals(), ["-jx", "-z"]);
        assert_eq!(args.flags().count(), 0);
    }

    #[test]
    fn test_negative_number_and_dash_are_positionals() {
        let args = parse(&["-5", "-", "-12"]);
        assert_eq!(args.positionals(), ["-5", "-", "-12"]);
    }

    #[test]
    fn test_double_dash_escape() {
        let args = parse(&["a", "--", "--b", "-c"]);

        assert_eq!(args.positionals(), ["a", "--b", "-c"]);
        assert_eq!(args.flags().count(), 0);
    }

    #[test]
    fn test_long_inline_value() {
        let args = parse(&["--namespace=work", "--tags=", "--query=a=b"]);

        assert_eq!(args.value("namespace"), Some("work"));
        assert_eq!(args.value("tags"), Some(""));
        assert_eq!(args.value("query"), Some("a=b"));
    }

    #[test]
    fn test_long_value_flag_without_value() {
        let args = parse(&["--namespace"]);
        assert_eq!(args.flag("namespace"), &FlagValue::Flag);

        let args = parse(&["--namespace", "--json"]);
        assert_eq!(args.flag("namespace"), &FlagValue::Flag);
        assert_eq!(args.flag("json"), &FlagValue::Flag);
    }

    #[test]
    fn test_long_flag_accepts_negative_number() {
        let args = parse(&["--offset", "-5"]);

        assert_eq!(args.value("offset"), Some("-5"));
        assert!(args.positionals().is_empty());
    }

    #[test]
    fn test_kebab_case_converted() {
        let args = parse(&["--foo-bar-baz", "v", "--no-truncate", "--dry-run"]);

        assert_eq!(args.value("fooBarBaz"), Some("v"));
        assert_eq!(args.flag("noTruncate"), &FlagValue::Flag);
        assert_eq!(args.flag("dryRun"), &FlagValue::Flag);
    }

    #[test]
    fn test_kebab_to_camel_leaves_digits() {
        assert_eq!(kebab_to_camel("min-score"), "minScore");
        assert_eq!(kebab_to_camel("page-2"), "page-2");
        assert_eq!(kebab_to_camel("a-b2-c"), "aB2C");
        assert_eq!(kebab_to_camel("plain"), "plain");
    }

    #[test]
    fn test_camel_to_kebab() {
        assert_eq!(camel_to_kebab("dryRun"), "dry-run");
        assert_eq!(camel_to_kebab("json"), "json");
        assert_eq!(camel_to_kebab(&kebab_to_camel("min-score")), "min-score");
    }

    #[test]
    fn test_falsy_string_preserved() {
        let args = parse(&["--limit", "0"]);

        assert_eq!(args.value("limit"), Some("0"));
        assert!(args.enabled("limit"));
    }

    #[test]
    fn test_last_occurrence_wins() {
        let args = parse(&["--limit", "5", "--limit", "7", "-n", "a", "--namespace=b"]);

        assert_eq!(args.value("limit"), Some("7"));
        assert_eq!(args.value("namespace"), Some("b"));
    }

    #[test]
    fn test_enabled_semantics() {
        let args = parse(&["--json", "--quiet=", "--pretty=false"]);

        assert!(args.enabled("json"));
        assert!(!args.enabled("quiet"));
        assert!(args.enabled("pretty"));
        assert!(!args.enabled("wide"));
    }

    #[test]
    fn test_set_default_only_fills_absent() {
        let mut args = parse(&["--namespace", "work", "--limit"]);

        args.set_default("namespace", "default");
        args.set_default("limit", "10");
        args.set_default("format", "yaml");

        assert_eq!(args.value("namespace"), Some("work"));
        assert_eq!(args.flag("limit"), &FlagValue::Flag);
        assert_eq!(args.value("format"), Some("yaml"));
    }

    #[test]
    fn test_command_and_positional_accessors() {
        let args = parse(&["relate", "m1", "m2"]);

        assert_eq!(args.command(), Some("relate"));
        assert_eq!(args.positional(2), Some("m2"));
        assert_eq!(args.positional(3), None);
        assert!(args.flag("anything").is_absent());
    }
}
