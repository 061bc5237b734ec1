//! Contract between the registry and parser implementations.
//!
//! A parser plugin is a [`PluginEntry`]: a name plus a zero-argument
//! function producing a [`ParserImport`]. The import names the format and
//! the file extensions the plugin claims, and carries a factory building a
//! [`Parser`] for one file.

use crate::config::ParseOptions;
use crate::error::ParserError;
use crate::output::ParserOutput;
use crate::source::{FullPath, Resolve};
use std::fmt;

/// Everything a parser needs to process one file.
pub struct ParserContext<'a> {
    pub file: &'a [u8],
    pub path: FullPath,
    pub circle_id: i64,
    pub resolver: &'a dyn Resolve,
    /// Files that led here through `extends`, root first, this file excluded.
    pub inherited: Vec<FullPath>,
    /// Only the root of an inheritance tree checks for mandatory keys.
    pub check_mandatory_keys: bool,
    pub options: ParseOptions,
}

impl<'a> ParserContext<'a> {
    /// Context for the root file of a parse.
    pub fn new(file: &'a [u8], path: FullPath, circle_id: i64, resolver: &'a dyn Resolve) -> Self {
        ParserContext {
            file,
            path,
            circle_id,
            resolver,
            inherited: Vec::new(),
            check_mandatory_keys: true,
            options: ParseOptions::default(),
        }
    }

    pub fn without_mandatory_keys(mut self) -> Self {
        self.check_mandatory_keys = false;
        self
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }
}

pub trait Parser {
    /// Parse the file and everything it inherits from.
    fn parse(self: Box<Self>) -> Result<ParserOutput, ParserError>;
}

/// Builds a parser for one file.
pub type ParserFactory = for<'a> fn(ParserContext<'a>) -> Box<dyn Parser + 'a>;

/// What a plugin provides.
#[derive(Clone)]
pub struct ParserImport {
    pub parser: ParserFactory,
    /// Format tag copied into `ParserOutput::format`.
    pub file_type: String,
    /// Extensions without the leading dot.
    pub extensions: Vec<String>,
}

impl fmt::Debug for ParserImport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserImport")
            .field("file_type", &self.file_type)
            .field("extensions", &self.extensions)
            .finish_non_exhaustive()
    }
}

/// A compiled-in plugin descriptor.
#[derive(Debug, Clone, Copy)]
pub struct PluginEntry {
    pub name: &'static str,
    /// `None` models a plugin that does not expose an entry point.
    pub get_parser: Option<fn() -> ParserImport>,
}

impl PluginEntry {
    pub const fn new(name: &'static str, get_parser: fn() -> ParserImport) -> Self {
        PluginEntry {
            name,
            get_parser: Some(get_parser),
        }
    }

    /// Helper entries (leading underscore) are never loaded.
    pub fn is_helper(&self) -> bool {
        self.name.starts_with('_')
    }

    /// Call the entry point and check the descriptor it returns.
    pub fn load(&self) -> Result<ParserImport, PluginError> {
        let get_parser = self.get_parser.ok_or_else(|| PluginError::MissingEntryPoint {
            plugin: self.name.to_owned(),
        })?;
        let import = std::panic::catch_unwind(get_parser).map_err(|_| PluginError::Panicked {
            plugin: self.name.to_owned(),
        })?;
        self.validate(&import)?;
        Ok(import)
    }

    fn validate(&self, import: &ParserImport) -> Result<(), PluginError> {
        let malformed = |reason: String| PluginError::Malformed {
            plugin: self.name.to_owned(),
            reason,
        };
        if import.file_type.trim().is_empty() {
            return Err(malformed("empty format tag".to_owned()));
        }
        if import.extensions.is_empty() {
            return Err(malformed("no extensions claimed".to_owned()));
        }
        for ext in &import.extensions {
            if ext.is_empty() || ext.contains(['.', '/']) || ext.chars().any(char::is_whitespace) {
                return Err(malformed(format!("invalid extension {:?}", ext)));
            }
        }
        Ok(())
    }
}

/// Why a plugin was skipped. Never fatal: the registry logs it and moves on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PluginError {
    #[error("get_parser() function from plugin {plugin} is not defined")]
    MissingEntryPoint { plugin: String },

    #[error("get_parser() function from plugin {plugin} returned a malformed ParserImport: {reason}")]
    Malformed { plugin: String, reason: String },

    #[error("could not import parser {plugin}: get_parser() panicked")]
    Panicked { plugin: String },
}
