//! Advanced command argument parser.
//!
//! Turns the raw argument text of a command into positional arguments and
//! flags. The same pass also locates the element the cursor (end of input) is
//! in, so tab-completion sees exactly the structure final parsing would.
//!
//! Syntax:
//! - whitespace outside quotes separates tokens, runs of it collapse;
//! - `"` quotes a section of a token, `\"` and `\\` escape inside and outside
//!   quotes, any other `\` is kept as-is;
//! - `--name`, `--name=value` and `-abc` are flags unless quoted, and a lone
//!   `--` turns flag parsing off for the rest of the input;
//! - with a `limit`, everything after that many positional arguments is kept
//!   as one trailing string for a sub-grammar to handle.

use std::collections::BTreeMap;

use thiserror::Error;

/// Parser options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseConfig {
    /// Positional arguments to extract before the rest becomes the trailing
    /// string. `0` means unlimited.
    pub limit: usize,
    /// Extract `-x` / `--name[=value]` tokens into the flag map.
    pub parse_flags: bool,
    /// Treat an unterminated quote as closed at end of input.
    pub auto_close_quotes: bool,
    /// Leave the in-progress token out of `args`/`flags` (completion).
    pub exclude_current: bool,
    /// Keep the trailing string as the raw input slice instead of re-joining
    /// its unquoted tokens.
    pub leave_final_as_is: bool,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            limit: 0,
            parse_flags: true,
            auto_close_quotes: false,
            exclude_current: false,
            leave_final_as_is: false,
        }
    }
}

impl ParseConfig {
    /// Options for tab-completion: auto-close quotes, exclude the current
    /// token and keep the trailing string raw.
    pub fn completion() -> Self {
        Self {
            auto_close_quotes: true,
            exclude_current: true,
            leave_final_as_is: true,
            ..Self::default()
        }
    }

    /// Set the positional argument limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Enable or disable flag extraction.
    pub fn with_flags(mut self, parse_flags: bool) -> Self {
        self.parse_flags = parse_flags;
        self
    }

    /// Enable or disable quote auto-closing.
    pub fn with_auto_close_quotes(mut self, auto_close_quotes: bool) -> Self {
        self.auto_close_quotes = auto_close_quotes;
        self
    }

    /// Enable or disable leaving out the in-progress token.
    pub fn with_exclude_current(mut self, exclude_current: bool) -> Self {
        self.exclude_current = exclude_current;
        self
    }

    /// Enable or disable keeping the trailing string raw.
    pub fn with_leave_final_as_is(mut self, leave_final_as_is: bool) -> Self {
        self.leave_final_as_is = leave_final_as_is;
        self
    }
}

/// Kind of element the cursor is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// A positional argument (possibly empty, right after whitespace).
    Argument,
    /// The name of a flag.
    FlagKey,
    /// The value of a `--name=value` flag.
    FlagValue,
    /// The trailing string past the argument limit.
    Final,
    /// A token that was just closed by a quote; the next suggestion should
    /// start a new token.
    Complete,
}

/// Where the cursor sits after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentElement {
    /// Element kind.
    pub kind: ElementType,
    /// Number of positional arguments before this element. For
    /// [`ElementType::Final`] this is the limit.
    pub index: usize,
    /// Unescaped text typed so far for the element.
    pub token: String,
    /// Fixed text preceding the completable part: `--`, `-`, `--name=`, the
    /// input before the trailing string, or for [`ElementType::Complete`] the
    /// raw closed token.
    pub prefix: String,
    /// Flag name when completing a flag value.
    pub key: Option<String>,
}

impl CurrentElement {
    fn new(kind: ElementType, index: usize, token: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            kind,
            index,
            token: token.into(),
            prefix: prefix.into(),
            key: None,
        }
    }
}

/// Best-effort recovery applied while parsing. Never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseAmbiguity {
    /// A quote was never closed; its token kept the opening quote literally.
    #[error("unterminated quote starting at byte {offset}")]
    UnterminatedQuote {
        /// Byte offset of the opening quote.
        offset: usize,
    },
}

/// Outcome of one parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    /// Positional arguments; the trailing string (if any) is the last entry.
    pub args: Vec<String>,
    /// Flags by name; `None` for flags given without a value.
    pub flags: BTreeMap<String, Option<String>>,
    /// Element under the cursor.
    pub current: CurrentElement,
    /// Recovery applied to malformed input.
    pub ambiguity: Option<ParseAmbiguity>,
}

impl ParseResult {
    /// Positional argument at `index`.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// Whether the flag was given, with or without a value.
    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.contains_key(name)
    }

    /// Value of a `--name=value` flag.
    pub fn flag(&self, name: &str) -> Option<&str> {
        self.flags.get(name).and_then(|v| v.as_deref())
    }
}

#[derive(Debug)]
struct Lexeme {
    text: String,
    start: usize,
    end: usize,
    /// First character was an opening quote.
    quoted: bool,
    /// Last character consumed was a closing quote.
    closed_by_quote: bool,
}

enum Class<'a> {
    Positional,
    EndOfFlags,
    LongFlag { key: &'a str, value: Option<&'a str> },
    ShortFlags(&'a str),
}

/// Parse `input` with the given options.
pub fn parse(input: &str, config: &ParseConfig) -> ParseResult {
    let (lexemes, ambiguity) = lex(input, config.auto_close_quotes);
    let open_last = lexemes.last().is_some_and(|l| l.end == input.len());

    let mut args = Vec::new();
    let mut flags = BTreeMap::new();
    let mut flags_enabled = config.parse_flags;
    let mut positional = 0;
    let mut current = None;

    for (i, lexeme) in lexemes.iter().enumerate() {
        if config.limit > 0 && positional >= config.limit {
            let trailing = if config.leave_final_as_is {
                input[lexeme.start..].to_string()
            } else {
                lexemes[i..]
                    .iter()
                    .map(|l| l.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            };
            current = Some(CurrentElement::new(
                ElementType::Final,
                config.limit,
                trailing.clone(),
                &input[..lexeme.start],
            ));
            args.push(trailing);
            break;
        }

        let in_progress = open_last && i + 1 == lexemes.len();
        if in_progress && lexeme.closed_by_quote {
            current = Some(CurrentElement::new(
                ElementType::Complete,
                positional,
                lexeme.text.clone(),
                &input[lexeme.start..],
            ));
        }
        let cursor_here = in_progress && current.is_none();
        let exclude = cursor_here && config.exclude_current;

        let class = if flags_enabled {
            classify(lexeme)
        } else {
            Class::Positional
        };
        match class {
            Class::EndOfFlags => {
                if cursor_here {
                    current = Some(CurrentElement::new(ElementType::FlagKey, positional, "", "--"));
                }
                if !exclude {
                    flags_enabled = false;
                }
            }
            Class::LongFlag { key, value } => {
                if cursor_here {
                    current = Some(match value {
                        Some(value) => CurrentElement {
                            key: Some(key.to_string()),
                            ..CurrentElement::new(
                                ElementType::FlagValue,
                                positional,
                                value,
                                format!("--{key}="),
                            )
                        },
                        None => CurrentElement::new(ElementType::FlagKey, positional, key, "--"),
                    });
                }
                if !exclude {
                    flags.insert(key.to_string(), value.map(str::to_string));
                }
            }
            Class::ShortFlags(body) => {
                if cursor_here {
                    current = Some(CurrentElement::new(ElementType::FlagKey, positional, body, "-"));
                }
                if !exclude {
                    for c in body.chars() {
                        flags.insert(c.to_string(), None);
                    }
                }
            }
            Class::Positional => {
                if cursor_here {
                    current = Some(CurrentElement::new(
                        ElementType::Argument,
                        positional,
                        lexeme.text.clone(),
                        "",
                    ));
                }
                if !exclude {
                    args.push(lexeme.text.clone());
                }
                positional += 1;
            }
        }
    }

    // Cursor after whitespace (or on empty input): a fresh token starts here.
    let current = current.unwrap_or_else(|| {
        if config.limit > 0 && positional >= config.limit {
            CurrentElement::new(ElementType::Final, config.limit, "", input)
        } else {
            CurrentElement::new(ElementType::Argument, positional, "", "")
        }
    });

    ParseResult {
        args,
        flags,
        current,
        ambiguity,
    }
}

/// Quote an argument so that parsing it yields the same text back.
pub fn quote_argument(arg: &str) -> String {
    let needs_quotes = arg.is_empty()
        || arg.starts_with('-')
        || arg
            .chars()
            .any(|c| c.is_whitespace() || c == '"' || c == '\\');
    if !needs_quotes {
        return arg.to_string();
    }

    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    for c in arg.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

fn classify(lexeme: &Lexeme) -> Class<'_> {
    if lexeme.quoted {
        return Class::Positional;
    }
    let text = lexeme.text.as_str();
    if text == "--" {
        return Class::EndOfFlags;
    }
    if let Some(body) = text.strip_prefix("--") {
        return match body.split_once('=') {
            Some(("", _)) => Class::Positional,
            Some((key, value)) => Class::LongFlag {
                key,
                value: Some(value),
            },
            None => Class::LongFlag { key: body, value: None },
        };
    }
    match text.strip_prefix('-') {
        // `-5` and `-x1` stay positional so negative coordinates survive.
        Some(body) if !body.is_empty() && body.chars().all(char::is_alphabetic) => {
            Class::ShortFlags(body)
        }
        _ => Class::Positional,
    }
}

fn lex(input: &str, auto_close: bool) -> (Vec<Lexeme>, Option<ParseAmbiguity>) {
    let mut lexemes = Vec::new();
    let mut ambiguity = None;
    let mut chars = input.char_indices().peekable();

    loop {
        while chars.next_if(|&(_, c)| c.is_whitespace()).is_some() {}
        let Some(&(start, _)) = chars.peek() else {
            break;
        };

        let mut text = String::new();
        let mut end = input.len();
        let mut quoted = false;
        let mut closed_by_quote = false;
        // (offset in input, offset in text) of the currently open quote
        let mut open_quote: Option<(usize, usize)> = None;

        while let Some(&(offset, c)) = chars.peek() {
            if open_quote.is_none() && c.is_whitespace() {
                end = offset;
                break;
            }
            chars.next();
            closed_by_quote = false;
            match c {
                '\\' => match chars.next_if(|&(_, next)| next == '"' || next == '\\') {
                    Some((_, escaped)) => text.push(escaped),
                    None => text.push('\\'),
                },
                '"' if open_quote.is_some() => {
                    open_quote = None;
                    closed_by_quote = true;
                }
                '"' => {
                    quoted |= offset == start;
                    open_quote = Some((offset, text.len()));
                }
                _ => text.push(c),
            }
        }

        if let Some((offset, at)) = open_quote {
            if !auto_close {
                text.insert(at, '"');
                ambiguity.get_or_insert(ParseAmbiguity::UnterminatedQuote { offset });
            }
        }

        lexemes.push(Lexeme {
            text,
            start,
            end,
            quoted,
            closed_by_quote,
        });
    }

    (lexemes, ambiguity)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(input: &str) -> Vec<String> {
        parse(input, &ParseConfig::default()).args
    }

    #[test]
    fn whitespace_runs_collapse() {
        let result = parse("  add   positions\t 1 ", &ParseConfig::default());
        assert_eq!(result.args, vec!["add", "positions", "1"]);
        assert_eq!(result.current, CurrentElement::new(ElementType::Argument, 3, "", ""));
        assert_eq!(result.ambiguity, None);
    }

    #[test]
    fn empty_input_points_at_first_argument() {
        let result = parse("", &ParseConfig::default());
        assert!(result.args.is_empty());
        assert!(result.flags.is_empty());
        assert_eq!(result.current.kind, ElementType::Argument);
        assert_eq!(result.current.index, 0);
    }

    #[test]
    fn quoted_argument_keeps_spaces() {
        let result = parse(r#"say "hello world""#, &ParseConfig::default());
        assert_eq!(result.args, vec!["say", "hello world"]);
        assert_eq!(result.current.kind, ElementType::Complete);
        assert_eq!(result.current.index, 1);
        assert_eq!(result.current.prefix, r#""hello world""#);
    }

    #[test]
    fn quotes_can_appear_mid_token() {
        assert_eq!(args(r#"a"b c"d e"#), vec!["ab cd", "e"]);
        assert_eq!(args(r#""" x"#), vec!["", "x"]);
    }

    #[test]
    fn escapes_are_removed_only_before_quote_and_backslash() {
        assert_eq!(
            args(r#""a \"quoted\" \\ word" C:\path"#),
            vec![r#"a "quoted" \ word"#, r"C:\path"]
        );
        assert_eq!(args(r#"trailing\"#), vec![r"trailing\"]);
    }

    #[test]
    fn long_flag_with_value() {
        let result = parse("--limit=5 foo", &ParseConfig::default());
        assert_eq!(result.args, vec!["foo"]);
        assert_eq!(result.flag("limit"), Some("5"));
        assert_eq!(result.flags.len(), 1);
    }

    #[test]
    fn short_flags_split_and_negative_numbers_stay_positional() {
        let result = parse("-ab foo -5 -x1 --verbose", &ParseConfig::default());
        assert_eq!(result.args, vec!["foo", "-5", "-x1"]);
        assert!(result.has_flag("a"));
        assert!(result.has_flag("b"));
        assert!(result.has_flag("verbose"));
        assert_eq!(result.flag("verbose"), None);
    }

    #[test]
    fn double_dash_ends_flag_parsing() {
        let result = parse("-a -- -b --c=d", &ParseConfig::default());
        assert_eq!(result.args, vec!["-b", "--c=d"]);
        assert_eq!(result.flags.keys().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn quoted_and_disabled_flags_are_arguments() {
        assert_eq!(args(r#""--x" -"y""#), vec!["--x"]);
        let result = parse("--x -y", &ParseConfig::default().with_flags(false));
        assert_eq!(result.args, vec!["--x", "-y"]);
        assert!(result.flags.is_empty());
    }

    #[test]
    fn flag_value_may_be_quoted() {
        let result = parse(r#"--name="two words" x"#, &ParseConfig::default());
        assert_eq!(result.flag("name"), Some("two words"));
        assert_eq!(result.args, vec!["x"]);
    }

    #[test]
    fn repeated_flag_last_value_wins() {
        let result = parse("--w=a --w=b", &ParseConfig::default());
        assert_eq!(result.flag("w"), Some("b"));
    }

    #[test]
    fn unterminated_quote_is_best_effort() {
        let result = parse(r#"say "hello"#, &ParseConfig::default());
        assert_eq!(result.args, vec!["say", "\"hello"]);
        assert_eq!(
            result.ambiguity,
            Some(ParseAmbiguity::UnterminatedQuote { offset: 4 })
        );
    }

    #[test]
    fn unterminated_quote_auto_closes() {
        let config = ParseConfig::default().with_auto_close_quotes(true);
        let result = parse(r#"say "hello"#, &config);
        assert_eq!(result.args, vec!["say", "hello"]);
        assert_eq!(result.ambiguity, None);
        assert_eq!(result.current, CurrentElement::new(ElementType::Argument, 1, "hello", ""));
    }

    #[test]
    fn limit_keeps_raw_trailing_string() {
        let input = r#"positions ~1 -64 "a b" --x"#;
        let raw = parse(input, &ParseConfig::default().with_limit(1).with_leave_final_as_is(true));
        assert_eq!(raw.args, vec!["positions", r#"~1 -64 "a b" --x"#]);
        assert!(raw.flags.is_empty());
        assert_eq!(raw.current.kind, ElementType::Final);
        assert_eq!(raw.current.index, 1);
        assert_eq!(raw.current.prefix, "positions ");

        let joined = parse(input, &ParseConfig::default().with_limit(1));
        assert_eq!(joined.args, vec!["positions", "~1 -64 a b --x"]);
    }

    #[test]
    fn flags_before_limit_are_still_parsed() {
        let result = parse("-f one two three", &ParseConfig::default().with_limit(2));
        assert!(result.has_flag("f"));
        assert_eq!(result.args, vec!["one", "two", "three"]);
    }

    #[test]
    fn completion_excludes_in_progress_argument() {
        let config = ParseConfig::completion().with_limit(1);

        let typing = parse("posi", &config);
        assert!(typing.args.is_empty());
        assert_eq!(typing.current, CurrentElement::new(ElementType::Argument, 0, "posi", ""));

        let next = parse("positions ", &config);
        assert_eq!(next.args, vec!["positions"]);
        assert_eq!(next.current, CurrentElement::new(ElementType::Final, 1, "", "positions "));

        let sub = parse("positions 1 2", &config);
        assert_eq!(sub.args, vec!["positions", "1 2"]);
        assert_eq!(sub.current.kind, ElementType::Final);
        assert_eq!(sub.current.token, "1 2");
    }

    #[test]
    fn completion_keeps_quote_closed_token() {
        let result = parse(r#"a "b c""#, &ParseConfig::completion());
        assert_eq!(result.args, vec!["a", "b c"]);
        assert_eq!(result.current.kind, ElementType::Complete);
        assert_eq!(result.current.index, 1);
        assert_eq!(result.current.prefix, r#""b c""#);
    }

    #[test]
    fn completion_locates_flags() {
        let value = parse("foo --world=ov", &ParseConfig::completion());
        assert!(value.flags.is_empty());
        assert_eq!(value.current.kind, ElementType::FlagValue);
        assert_eq!(value.current.key.as_deref(), Some("world"));
        assert_eq!(value.current.token, "ov");
        assert_eq!(value.current.prefix, "--world=");
        assert_eq!(value.current.index, 1);

        let key = parse("foo --wo", &ParseConfig::completion());
        assert_eq!(key.current, CurrentElement::new(ElementType::FlagKey, 1, "wo", "--"));

        let short = parse("-a", &ParseConfig::default());
        assert!(short.has_flag("a"));
        assert_eq!(short.current, CurrentElement::new(ElementType::FlagKey, 0, "a", "-"));
    }

    #[test]
    fn parsing_is_deterministic() {
        let config = ParseConfig::completion().with_limit(2);
        let input = r#"-q --a=1 x "y z" rest of "it"#;
        assert_eq!(parse(input, &config), parse(input, &config));
    }

    #[test]
    fn quote_argument_only_quotes_when_needed() {
        assert_eq!(quote_argument("plain"), "plain");
        assert_eq!(quote_argument(""), r#""""#);
        assert_eq!(quote_argument("a b"), r#""a b""#);
        assert_eq!(quote_argument(r#"say "hi""#), r#""say \"hi\"""#);
        assert_eq!(quote_argument("-5"), r#""-5""#);
    }
}
