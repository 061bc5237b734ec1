//! Document values: literal coercion of right-hand sides and the deep merge
//! used by inheritance.
//!
//! The document model is `serde_json::Value`: null, booleans, numbers,
//! strings, lists and string-keyed maps.

use serde_json::{Map, Number, Value};

/// Containers nested deeper than this are not read as literals.
pub const MAX_LITERAL_NESTING: usize = 128;

/// Interpret assignment text as a literal, falling back to the trimmed text.
///
/// Recognized shapes: `True`/`False`/`true`/`false`, `None`/`null`,
/// integers, floats, single- or double-quoted strings, bracketed lists
/// (or parenthesized tuples) and braced mappings with string keys. Never
/// fails.
pub fn coerce_literal(text: &str) -> Value {
    let trimmed = text.trim();
    parse_literal(trimmed).unwrap_or_else(|| Value::String(trimmed.to_owned()))
}

/// Like [`coerce_literal`], but text that is not a literal is kept exactly
/// as given. Used for multiline blocks, where leading indentation matters.
pub fn coerce_block(text: &str) -> Value {
    parse_literal(text.trim()).unwrap_or_else(|| Value::String(text.to_owned()))
}

/// Strict literal parse: `None` unless the whole input is one literal.
pub fn parse_literal(text: &str) -> Option<Value> {
    let mut reader = LiteralReader::new(text);
    let value = reader.value()?;
    reader.skip_ws();
    reader.at_end().then_some(value)
}

struct LiteralReader {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl LiteralReader {
    fn new(text: &str) -> Self {
        LiteralReader {
            chars: text.chars().collect(),
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn value(&mut self) -> Option<Value> {
        self.skip_ws();
        match self.peek()? {
            '[' | '(' | '{' => {
                if self.depth >= MAX_LITERAL_NESTING {
                    return None;
                }
                self.depth += 1;
                let value = self.container();
                self.depth -= 1;
                value
            }
            '\'' | '"' => self.string().map(Value::String),
            c if c == '+' || c == '-' || c == '.' || c.is_ascii_digit() => self.number(),
            c if c.is_alphabetic() || c == '_' => self.keyword(),
            _ => None,
        }
    }

    fn container(&mut self) -> Option<Value> {
        match self.peek()? {
            '[' => self.sequence(']').map(|(items, _)| Value::Array(items)),
            '(' => {
                let (mut items, saw_comma) = self.sequence(')')?;
                // `(x)` is just a parenthesized x, `(x,)` is a tuple.
                if items.len() == 1 && !saw_comma {
                    items.pop()
                } else {
                    Some(Value::Array(items))
                }
            }
            _ => self.mapping(),
        }
    }

    /// `{'key': value, ...}`. Keys must be strings.
    fn mapping(&mut self) -> Option<Value> {
        self.bump();
        let mut map = Map::new();
        loop {
            self.skip_ws();
            if self.peek()? == '}' {
                self.bump();
                return Some(Value::Object(map));
            }
            let key = match self.value()? {
                Value::String(key) => key,
                _ => return None,
            };
            self.skip_ws();
            if self.bump()? != ':' {
                return None;
            }
            let value = self.value()?;
            map.insert(key, value);
            self.skip_ws();
            match self.bump()? {
                ',' => {}
                '}' => return Some(Value::Object(map)),
                _ => return None,
            }
        }
    }

    fn sequence(&mut self, close: char) -> Option<(Vec<Value>, bool)> {
        self.bump();
        let mut items = Vec::new();
        let mut saw_comma = false;
        loop {
            self.skip_ws();
            if self.peek()? == close {
                self.bump();
                return Some((items, saw_comma));
            }
            items.push(self.value()?);
            self.skip_ws();
            match self.bump()? {
                ',' => saw_comma = true,
                c if c == close => return Some((items, saw_comma)),
                _ => return None,
            }
        }
    }

    fn string(&mut self) -> Option<String> {
        let quote = self.bump()?;
        let mut out = String::new();
        loop {
            match self.bump()? {
                c if c == quote => return Some(out),
                '\n' => return None,
                '\\' => match self.bump()? {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    '0' => out.push('\0'),
                    '\n' => {}
                    c @ ('\\' | '\'' | '"') => out.push(c),
                    other => {
                        out.push('\\');
                        out.push(other);
                    }
                },
                c => out.push(c),
            }
        }
    }

    fn number(&mut self) -> Option<Value> {
        let start = self.pos;
        if matches!(self.peek(), Some('+' | '-')) {
            self.pos += 1;
        }
        let int_digits = self.digits();
        let mut is_float = false;
        let mut frac_digits = 0;
        if self.peek() == Some('.') {
            is_float = true;
            self.pos += 1;
            frac_digits = self.digits();
        }
        if int_digits == 0 && frac_digits == 0 {
            return None;
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            is_float = true;
            self.pos += 1;
            if matches!(self.peek(), Some('+' | '-')) {
                self.pos += 1;
            }
            if self.digits() == 0 {
                return None;
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        if is_float {
            let f: f64 = text.parse().ok()?;
            return Number::from_f64(f).map(Value::Number);
        }
        let unsigned = text.trim_start_matches(['+', '-']);
        // Leading zeros are not a valid integer literal, except for zero itself.
        if unsigned.len() > 1 && unsigned.starts_with('0') && unsigned.chars().any(|c| c != '0') {
            return None;
        }
        let text = text.trim_start_matches('+');
        if let Ok(i) = text.parse::<i64>() {
            return Some(Value::Number(i.into()));
        }
        text.parse::<u64>().ok().map(|u| Value::Number(u.into()))
    }

    fn digits(&mut self) -> usize {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn keyword(&mut self) -> Option<Value> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        match word.as_str() {
            "True" | "true" => Some(Value::Bool(true)),
            "False" | "false" => Some(Value::Bool(false)),
            "None" | "null" => Some(Value::Null),
            _ => None,
        }
    }
}

/// Merge `incoming` into `target`.
///
/// Keys missing from `target` are copied in, maps present on both sides are
/// merged recursively, and any other conflict is won by `incoming`.
pub fn deep_merge(target: &mut Map<String, Value>, incoming: Map<String, Value>) {
    for (key, value) in incoming {
        match value {
            Value::Object(nested) => match target.get_mut(&key) {
                Some(Value::Object(existing)) => deep_merge(existing, nested),
                _ => {
                    target.insert(key, Value::Object(nested));
                }
            },
            value => {
                target.insert(key, value);
            }
        }
    }
}
