//! Dotted key paths (`a.b.c`) over the document's nested maps.

use crate::value::{coerce_block, coerce_literal};
use serde_json::{Map, Value};

/// Longest accepted dotted key, in segments.
pub const MAX_KEY_SEGMENTS: usize = 128;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KeyError {
    #[error("{key} does not correspond to a valid namespace: key cannot be empty")]
    EmptySegment { key: String },

    #[error("{key} does not correspond to a valid namespace: more than {limit} segments")]
    TooDeep { key: String, limit: usize },

    #[error("{key} does not correspond to a valid namespace: {segment} is not a mapping")]
    NotANamespace { key: String, segment: String },

    #[error("trying to {mode} to a key that does not exist: {key}")]
    MissingKey { key: String, mode: ApplyMode },

    #[error("cannot {mode} to {key}: existing value is {found}")]
    Incompatible {
        key: String,
        mode: ApplyMode,
        found: &'static str,
    },
}

/// How a right-hand side is combined with the value already at a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyMode {
    Assign,
    Append,
    Prepend,
}

impl std::fmt::Display for ApplyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ApplyMode::Assign => "assign",
            ApplyMode::Append => "append",
            ApplyMode::Prepend => "prepend",
        })
    }
}

/// A right-hand side waiting to be stored.
#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
    /// Raw text, stored and concatenated verbatim.
    Text(String),
    /// A single-line right-hand side. Coerced on assignment, concatenated
    /// verbatim onto text.
    Literal(String),
    /// A multiline body. Coerced when it is a literal, otherwise kept
    /// untrimmed.
    Block(String),
    /// An already-typed value (JSON payloads, components, links).
    Value(Value),
}

impl Incoming {
    fn into_value(self) -> Value {
        match self {
            Incoming::Text(text) => Value::String(text),
            Incoming::Literal(text) => coerce_literal(&text),
            Incoming::Block(text) => coerce_block(&text),
            Incoming::Value(value) => value,
        }
    }

    fn into_text(self) -> Option<String> {
        match self {
            Incoming::Text(text) | Incoming::Literal(text) | Incoming::Block(text) => Some(text),
            Incoming::Value(Value::String(text)) => Some(text),
            Incoming::Value(_) => None,
        }
    }
}

/// Walk `key` from `root`, creating missing intermediate maps.
///
/// Returns the map that holds the final segment together with that segment.
pub fn resolve<'m, 'k>(
    root: &'m mut Map<String, Value>,
    key: &'k str,
) -> Result<(&'m mut Map<String, Value>, &'k str), KeyError> {
    let segments: Vec<&'k str> = key.split('.').collect();
    if segments.len() > MAX_KEY_SEGMENTS {
        return Err(KeyError::TooDeep {
            key: key.to_owned(),
            limit: MAX_KEY_SEGMENTS,
        });
    }
    if segments.iter().any(|s| s.is_empty()) {
        return Err(KeyError::EmptySegment {
            key: key.to_owned(),
        });
    }
    let (last, parents) = match segments.split_last() {
        Some(split) => split,
        None => {
            return Err(KeyError::EmptySegment {
                key: key.to_owned(),
            })
        }
    };

    let mut current = root;
    for segment in parents {
        let slot = current
            .entry(*segment)
            .or_insert_with(|| Value::Object(Map::new()));
        current = match slot {
            Value::Object(map) => map,
            _ => {
                return Err(KeyError::NotANamespace {
                    key: key.to_owned(),
                    segment: (*segment).to_owned(),
                })
            }
        };
    }
    Ok((current, *last))
}

/// Store `incoming` at `key` according to `mode`.
///
/// Returns the overwrite warning when an assignment replaces an existing
/// value.
pub fn apply(
    root: &mut Map<String, Value>,
    key: &str,
    incoming: Incoming,
    mode: ApplyMode,
) -> Result<Option<String>, KeyError> {
    let (namespace, last) = resolve(root, key)?;

    if mode == ApplyMode::Assign {
        let warning = namespace
            .contains_key(last)
            .then(|| format!("Overwriting existing value at key \"{}\"", key));
        namespace.insert(last.to_owned(), incoming.into_value());
        return Ok(warning);
    }

    let existing = namespace.get_mut(last).ok_or_else(|| KeyError::MissingKey {
        key: key.to_owned(),
        mode,
    })?;
    let incompatible = |found: &'static str| KeyError::Incompatible {
        key: key.to_owned(),
        mode,
        found,
    };

    match existing {
        Value::String(current) => {
            let text = incoming.into_text().ok_or_else(|| incompatible("text"))?;
            if mode == ApplyMode::Append {
                current.push_str(&text);
            } else {
                current.insert_str(0, &text);
            }
        }
        Value::Array(items) => match incoming.into_value() {
            Value::Array(mut extra) => {
                if mode == ApplyMode::Append {
                    items.append(&mut extra);
                } else {
                    extra.append(items);
                    *items = extra;
                }
            }
            _ => return Err(incompatible("a list")),
        },
        other => return Err(incompatible(type_name(other))),
    }
    Ok(None)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "text",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
