use crate::source::FullPath;

/// Position of a directive inside a parsed file.
#[derive(Debug, Clone, PartialEq)]
pub struct LineContext {
    pub path: FullPath,
    /// The offending line, trimmed.
    pub line: String,
    /// 1-based line number.
    pub line_number: usize,
}

impl LineContext {
    pub fn new(path: &FullPath, line: &str, line_number: usize) -> Self {
        LineContext {
            path: path.clone(),
            line: line.trim().to_owned(),
            line_number,
        }
    }
}

impl std::fmt::Display for LineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (line {})", self.path, self.line_number)
    }
}

/// Every way a parse can fail. All of them abort the current file and,
/// transitively, every file that was inheriting from it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParserError {
    /// The file is not valid UTF-8.
    #[error("{path}: invalid file, could not be decoded")]
    InvalidFile { path: FullPath },

    /// A file loaded by a directive is not valid UTF-8.
    #[error("{at}: {message} in \"{}\"", .at.line)]
    InvalidFileLine { at: LineContext, message: String },

    #[error("{at}: {message} in \"{}\"", .at.line)]
    Syntax { at: LineContext, message: String },

    #[error("{at}: {message} in \"{}\"", .at.line)]
    Semantic { at: LineContext, message: String },

    #[error("{at}: {message} in \"{}\"", .at.line)]
    FileNotFound { at: LineContext, message: String },

    #[error("{at}: {message} in \"{}\"", .at.line)]
    ComponentNotFound { at: LineContext, message: String },

    /// `chain` runs from the root document to the repeated path.
    #[error("{path}: infinite inheritance loop detected, inheritance traceback is: {}", join_chain(.chain))]
    InheritanceLoop { path: FullPath, chain: Vec<FullPath> },

    #[error("{path}: inheritance chain exceeds {limit} levels: {}", join_chain(.chain))]
    InheritanceTooDeep {
        path: FullPath,
        chain: Vec<FullPath>,
        limit: usize,
    },

    #[error("{path}: expected key {key} is missing")]
    MissingKey { path: FullPath, key: String },

    #[error("{path}: no parser for extension .{extension}")]
    NoParser { path: FullPath, extension: String },
}

fn join_chain(chain: &[FullPath]) -> String {
    chain
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" \u{2192} ")
}

impl ParserError {
    pub fn syntax(at: LineContext, message: impl Into<String>) -> Self {
        ParserError::Syntax {
            at,
            message: message.into(),
        }
    }

    pub fn semantic(at: LineContext, message: impl Into<String>) -> Self {
        ParserError::Semantic {
            at,
            message: message.into(),
        }
    }

    pub fn file_not_found(at: LineContext, message: impl Into<String>) -> Self {
        ParserError::FileNotFound {
            at,
            message: message.into(),
        }
    }

    /// Short machine-readable name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            ParserError::InvalidFile { .. } => "invalid_file",
            ParserError::InvalidFileLine { .. } => "invalid_file_line",
            ParserError::Syntax { .. } => "syntax",
            ParserError::Semantic { .. } => "semantic",
            ParserError::FileNotFound { .. } => "file_not_found",
            ParserError::ComponentNotFound { .. } => "component_not_found",
            ParserError::InheritanceLoop { .. } => "inheritance_loop",
            ParserError::InheritanceTooDeep { .. } => "inheritance_too_deep",
            ParserError::MissingKey { .. } => "missing_key",
            ParserError::NoParser { .. } => "no_parser",
        }
    }

    /// The file the error was raised in.
    pub fn path(&self) -> &FullPath {
        match self {
            ParserError::InvalidFileLine { at, .. }
            | ParserError::Syntax { at, .. }
            | ParserError::Semantic { at, .. }
            | ParserError::FileNotFound { at, .. }
            | ParserError::ComponentNotFound { at, .. } => &at.path,
            ParserError::InvalidFile { path }
            | ParserError::InheritanceLoop { path, .. }
            | ParserError::InheritanceTooDeep { path, .. }
            | ParserError::MissingKey { path, .. }
            | ParserError::NoParser { path, .. } => path,
        }
    }

    /// 1-based line number, for errors scoped to a line.
    pub fn line_number(&self) -> Option<usize> {
        match self {
            ParserError::InvalidFileLine { at, .. }
            | ParserError::Syntax { at, .. }
            | ParserError::Semantic { at, .. }
            | ParserError::FileNotFound { at, .. }
            | ParserError::ComponentNotFound { at, .. } => Some(at.line_number),
            _ => None,
        }
    }

    /// Serialize for machine consumers. Absent fields are `null`.
    pub fn to_json_value(&self) -> serde_json::Value {
        let chain = match self {
            ParserError::InheritanceLoop { chain, .. }
            | ParserError::InheritanceTooDeep { chain, .. } => Some(
                chain
                    .iter()
                    .map(|p| serde_json::json!({"resource_id": p.resource_id, "path": p.path}))
                    .collect::<Vec<_>>(),
            ),
            _ => None,
        };
        let key = match self {
            ParserError::MissingKey { key, .. } => Some(key.as_str()),
            _ => None,
        };
        let extension = match self {
            ParserError::NoParser { extension, .. } => Some(extension.as_str()),
            _ => None,
        };
        serde_json::json!({
            "kind":      self.kind(),
            "file":      self.path().path,
            "line":      self.line_number(),
            "message":   self.to_string(),
            "chain":     chain,
            "key":       key,
            "extension": extension,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at() -> LineContext {
        LineContext::new(&FullPath::new(0, "exo.pl"), "  title ==  ", 4)
    }

    #[test]
    fn line_errors_render_position_and_trimmed_line() {
        let err = ParserError::syntax(at(), "multiline block was never closed");
        assert_eq!(
            err.to_string(),
            "0:exo.pl (line 4): multiline block was never closed in \"title ==\""
        );
        assert_eq!(err.line_number(), Some(4));
    }

    #[test]
    fn loop_error_lists_whole_chain() {
        let a = FullPath::new(0, "a.pl");
        let b = FullPath::new(0, "b.pl");
        let err = ParserError::InheritanceLoop {
            path: b.clone(),
            chain: vec![a.clone(), b, a],
        };
        let msg = err.to_string();
        assert!(msg.contains("0:a.pl \u{2192} 0:b.pl \u{2192} 0:a.pl"), "{msg}");
        let json = err.to_json_value();
        assert_eq!(json["kind"], "inheritance_loop");
        assert_eq!(json["chain"].as_array().unwrap().len(), 3);
        assert!(json["line"].is_null());
    }

    #[test]
    fn json_carries_variant_specific_fields() {
        let err = ParserError::MissingKey {
            path: FullPath::new(0, "exo.pl"),
            key: "author".into(),
        };
        let json = err.to_json_value();
        assert_eq!(json["key"], "author");
        assert_eq!(json["file"], "exo.pl");
        assert!(json["extension"].is_null());

        let err = ParserError::NoParser {
            path: FullPath::new(0, "exo.md"),
            extension: "md".into(),
        };
        assert_eq!(err.to_string(), "0:exo.md: no parser for extension .md");
        assert_eq!(err.to_json_value()["extension"], "md");
    }
}
