//! PL line grammar.
//!
//! Every physical line is classified on its own. Several shapes overlap
//! (`key == ` is also a prefix of `key = value`, `extends = x` is also a
//! key/value line), so shapes are tried in a fixed order and the first
//! match wins:
//!
//! 1. `extends = uri` / `template = uri`
//! 2. `key =@ uri` and the other load-from-file operators
//! 3. `key =$ uri`
//! 4. `key =: Component`
//! 5. `@ uri [alias]`
//! 6. `# comment`
//! 7. `key = value` and the other single-line operators
//! 8. `key ==` and the other multiline openers
//! 9. blank line
//!
//! A line inside an open multiline block is never classified; the parser
//! only checks it against [`is_multiline_end`].

use once_cell::sync::Lazy;
use regex::Regex;

const KEY: &str = r"^(?P<key>[a-zA-Z_][a-zA-Z0-9_.]*)\s*";
const COMMENT: &str = r"(?P<comment>#.*)";
// May be empty: `key =` assigns the empty string.
const VALUE: &str = r"(?P<value>(?:[^=@%#\s][^#]*?)?)\s*";
const FILE: &str = r"(?P<file>(?:[a-zA-Z0-9_]*:)?/?[^/ \t\n;#+&]+(?:/[^/ \t\n;#+&]+)*)\s*";
const ALIAS: &str = r"(?:\[\s*(?P<alias>[a-zA-Z_.][a-zA-Z0-9_.]*)\s*\]\s*)?";

fn compile(parts: &[&str]) -> Regex {
    Regex::new(&parts.concat()).expect("PL grammar pattern is valid")
}

static EXTENDS_LINE: Lazy<Regex> =
    Lazy::new(|| compile(&[r"^(?:extends|template)\s*=\s*", FILE, COMMENT, "?$"]));
static FROM_FILE_LINE: Lazy<Regex> = Lazy::new(|| {
    compile(&[KEY, r"(?P<operator>=@|\+=@|-=@|%@|\+@|-@)\s*", FILE, COMMENT, "?$"])
});
static URL_LINE: Lazy<Regex> =
    Lazy::new(|| compile(&[KEY, r"(?P<operator>=\$)\s*", FILE, COMMENT, "?$"]));
static COMPONENT_LINE: Lazy<Regex> = Lazy::new(|| {
    compile(&[KEY, r"(?P<operator>=:)\s*(?P<component>\w+)\s*", COMMENT, "?$"])
});
static DEPENDENCY_LINE: Lazy<Regex> =
    Lazy::new(|| compile(&[r"^@\s*", FILE, ALIAS, COMMENT, "?$"]));
static COMMENT_LINE: Lazy<Regex> = Lazy::new(|| compile(&[r"^\s*", COMMENT, "$"]));
static ONE_LINE: Lazy<Regex> =
    Lazy::new(|| compile(&[KEY, r"(?P<operator>[=%+-])\s*", VALUE, COMMENT, "?$"]));
static MULTI_LINE: Lazy<Regex> =
    Lazy::new(|| compile(&[KEY, r"(?P<operator>==|\+=|-=|%=)\s*", COMMENT, "?$"]));
static END_MULTI_LINE: Lazy<Regex> = Lazy::new(|| compile(&[r"^==\s*$"]));
static EMPTY_LINE: Lazy<Regex> = Lazy::new(|| compile(&[r"^\s*$"]));

/// What a right-hand side does to its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Assign,
    /// Assign the right-hand side parsed as JSON.
    Json,
    Append,
    Prepend,
}

impl Operator {
    /// `=`, `%`, `+`, `-`
    fn single_line(token: &str) -> Option<Self> {
        match token {
            "=" => Some(Operator::Assign),
            "%" => Some(Operator::Json),
            "+" => Some(Operator::Append),
            "-" => Some(Operator::Prepend),
            _ => None,
        }
    }

    /// `==`, `%=`, `+=`, `-=`
    fn multiline(token: &str) -> Option<Self> {
        match token {
            "==" => Some(Operator::Assign),
            "%=" => Some(Operator::Json),
            "+=" => Some(Operator::Append),
            "-=" => Some(Operator::Prepend),
            _ => None,
        }
    }

    /// `=@`, `%@`, `+=@`/`+@`, `-=@`/`-@`
    fn from_file(token: &str) -> Option<Self> {
        match token {
            "=@" => Some(Operator::Assign),
            "%@" => Some(Operator::Json),
            "+=@" | "+@" => Some(Operator::Append),
            "-=@" | "-@" => Some(Operator::Prepend),
            _ => None,
        }
    }
}

/// One classified line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive<'a> {
    Extends {
        uri: &'a str,
    },
    FromFile {
        key: &'a str,
        op: Operator,
        uri: &'a str,
    },
    Link {
        key: &'a str,
        uri: &'a str,
    },
    Component {
        key: &'a str,
        name: &'a str,
    },
    Dependency {
        uri: &'a str,
        alias: Option<&'a str>,
    },
    Comment(&'a str),
    Value {
        key: &'a str,
        op: Operator,
        value: &'a str,
    },
    MultilineOpen {
        key: &'a str,
        op: Operator,
    },
    Blank,
}

/// Classify a line with its terminator removed. `None` means the line
/// matches no shape.
pub fn classify(line: &str) -> Option<Directive<'_>> {
    if let Some(caps) = EXTENDS_LINE.captures(line) {
        return Some(Directive::Extends {
            uri: caps.name("file")?.as_str(),
        });
    }
    if let Some(caps) = FROM_FILE_LINE.captures(line) {
        return Some(Directive::FromFile {
            key: caps.name("key")?.as_str(),
            op: Operator::from_file(caps.name("operator")?.as_str())?,
            uri: caps.name("file")?.as_str(),
        });
    }
    if let Some(caps) = URL_LINE.captures(line) {
        return Some(Directive::Link {
            key: caps.name("key")?.as_str(),
            uri: caps.name("file")?.as_str(),
        });
    }
    if let Some(caps) = COMPONENT_LINE.captures(line) {
        return Some(Directive::Component {
            key: caps.name("key")?.as_str(),
            name: caps.name("component")?.as_str(),
        });
    }
    if let Some(caps) = DEPENDENCY_LINE.captures(line) {
        return Some(Directive::Dependency {
            uri: caps.name("file")?.as_str(),
            alias: caps.name("alias").map(|m| m.as_str()),
        });
    }
    if let Some(caps) = COMMENT_LINE.captures(line) {
        return Some(Directive::Comment(caps.name("comment")?.as_str()));
    }
    if let Some(caps) = ONE_LINE.captures(line) {
        return Some(Directive::Value {
            key: caps.name("key")?.as_str(),
            op: Operator::single_line(caps.name("operator")?.as_str())?,
            value: caps.name("value").map_or("", |m| m.as_str()),
        });
    }
    if let Some(caps) = MULTI_LINE.captures(line) {
        return Some(Directive::MultilineOpen {
            key: caps.name("key")?.as_str(),
            op: Operator::multiline(caps.name("operator")?.as_str())?,
        });
    }
    if EMPTY_LINE.is_match(line) {
        return Some(Directive::Blank);
    }
    None
}

/// Whether a line closes the open multiline block.
pub fn is_multiline_end(line: &str) -> bool {
    END_MULTI_LINE.is_match(line)
}
