//! Parser for `.pl` exercise files.
//!
//! Lines are processed strictly in file order. `extends` is resolved the
//! moment its line is reached: the ancestor is parsed recursively and merged
//! into what has been built so far, with the ancestor winning conflicts.
//! Keys set before an `extends` line can therefore be overwritten by the
//! ancestor, while keys set after it override the ancestor.

use crate::components;
use crate::config::ParseOptions;
use crate::error::{LineContext, ParserError};
use crate::grammar::{self, Directive, Operator};
use crate::namespace::{self, ApplyMode, Incoming};
use crate::output::ParserOutput;
use crate::plugin::{Parser, ParserContext, ParserImport};
use crate::source::{FullPath, LocationResult, Resolve};
use serde_json::Value;
use tracing::{debug, trace};

/// Top-level keys every complete exercise must define.
pub const MANDATORY_KEYS: &[&str] = &["author", "version", "title", "statement", "formState"];

pub const FORMAT: &str = "pl";

/// Plugin entry point for `.pl` files.
pub fn get_parser() -> ParserImport {
    ParserImport {
        parser: build,
        file_type: FORMAT.to_owned(),
        extensions: vec!["pl".to_owned()],
    }
}

fn build<'a>(context: ParserContext<'a>) -> Box<dyn Parser + 'a> {
    Box::new(PlParser::new(context))
}

/// An open `key ==` block collecting lines until `==`.
#[derive(Debug)]
struct Multiline {
    key: String,
    op: Operator,
    buffer: String,
    opening_line: String,
    opening_line_number: usize,
}

pub struct PlParser<'a> {
    file: &'a [u8],
    path: FullPath,
    directory: String,
    circle_id: i64,
    resolver: &'a dyn Resolve,
    /// Root first, this file last.
    inherited: Vec<FullPath>,
    check_mandatory_keys: bool,
    options: ParseOptions,
    output: ParserOutput,

    current_line: &'a str,
    line_number: usize,
    multiline: Option<Multiline>,
}

impl<'a> PlParser<'a> {
    pub fn new(context: ParserContext<'a>) -> Self {
        let mut inherited = context.inherited;
        inherited.push(context.path.clone());
        PlParser {
            file: context.file,
            directory: context.path.directory(),
            output: ParserOutput::new(context.path.clone(), context.circle_id, FORMAT),
            path: context.path,
            circle_id: context.circle_id,
            resolver: context.resolver,
            inherited,
            check_mandatory_keys: context.check_mandatory_keys,
            options: context.options,
            current_line: "",
            line_number: 0,
            multiline: None,
        }
    }

    pub fn parse(mut self) -> Result<ParserOutput, ParserError> {
        let contents = std::str::from_utf8(self.file).map_err(|_| ParserError::InvalidFile {
            path: self.path.clone(),
        })?;

        for (index, raw) in contents.split_inclusive('\n').enumerate() {
            let line = raw.strip_suffix('\n').unwrap_or(raw);
            let line = line.strip_suffix('\r').unwrap_or(line);
            self.current_line = line;
            self.line_number = index + 1;
            self.parse_line(raw, line)?;
        }

        if let Some(block) = self.multiline.take() {
            return Err(ParserError::syntax(
                LineContext::new(&self.path, &block.opening_line, block.opening_line_number),
                "multiline block was never closed",
            ));
        }

        if self.check_mandatory_keys {
            for key in MANDATORY_KEYS {
                if !self.output.data.contains_key(*key) {
                    return Err(ParserError::MissingKey {
                        path: self.path.clone(),
                        key: (*key).to_owned(),
                    });
                }
            }
        }

        Ok(self.output)
    }

    fn at(&self) -> LineContext {
        LineContext::new(&self.path, self.current_line, self.line_number)
    }

    fn parse_line(&mut self, raw: &'a str, line: &'a str) -> Result<(), ParserError> {
        if self.multiline.is_some() {
            if grammar::is_multiline_end(line) {
                if let Some(block) = self.multiline.take() {
                    self.close_multiline(block)?;
                }
            } else if let Some(block) = self.multiline.as_mut() {
                block.buffer.push_str(raw);
            }
            return Ok(());
        }

        match grammar::classify(line) {
            Some(Directive::Extends { uri }) => self.extends(uri),
            Some(Directive::FromFile { key, op, uri }) => self.from_file(key, op, uri),
            Some(Directive::Link { key, uri }) => self.link(key, uri),
            Some(Directive::Component { key, name }) => self.component(key, name),
            Some(Directive::Dependency { uri, alias }) => self.dependency(uri, alias),
            Some(Directive::Comment(comment)) => {
                self.output.comments.push(comment.to_owned());
                Ok(())
            }
            Some(Directive::Value { key, op, value }) => self.value(key, op, value),
            Some(Directive::MultilineOpen { key, op }) => {
                self.multiline = Some(Multiline {
                    key: key.to_owned(),
                    op,
                    buffer: String::new(),
                    opening_line: line.to_owned(),
                    opening_line_number: self.line_number,
                });
                Ok(())
            }
            Some(Directive::Blank) => Ok(()),
            None => Err(ParserError::syntax(
                self.at(),
                "line does not correspond to any defined pattern",
            )),
        }
    }

    fn value(&mut self, key: &str, op: Operator, value: &str) -> Result<(), ParserError> {
        let at = self.at();
        match op {
            Operator::Json => {
                let parsed: Value = serde_json::from_str(value).map_err(|_| {
                    ParserError::syntax(at.clone(), "line does not correspond to a valid JSON format")
                })?;
                self.store(key, Incoming::Value(parsed), ApplyMode::Assign, at)
            }
            op => self.store(key, Incoming::Literal(value.to_owned()), mode(op), at),
        }
    }

    fn close_multiline(&mut self, block: Multiline) -> Result<(), ParserError> {
        let at = LineContext::new(&self.path, &block.opening_line, block.opening_line_number);
        let text = block.buffer.strip_suffix('\n').map_or(block.buffer.as_str(), |t| {
            t.strip_suffix('\r').unwrap_or(t)
        });
        match block.op {
            Operator::Json => {
                let parsed: Value = serde_json::from_str(text).map_err(|_| {
                    ParserError::syntax(
                        at.clone(),
                        "multiline does not correspond to a valid JSON format",
                    )
                })?;
                self.store(&block.key, Incoming::Value(parsed), ApplyMode::Assign, at)
            }
            op => self.store(&block.key, Incoming::Block(text.to_owned()), mode(op), at),
        }
    }

    fn extends(&mut self, uri: &str) -> Result<(), ParserError> {
        let location = self.locate(uri)?;

        if self.inherited.contains(&location.path) {
            let mut chain = self.inherited.clone();
            chain.push(location.path);
            return Err(ParserError::InheritanceLoop {
                path: self.path.clone(),
                chain,
            });
        }
        if self.inherited.len() >= self.options.max_inheritance_depth {
            let mut chain = self.inherited.clone();
            chain.push(location.path);
            return Err(ParserError::InheritanceTooDeep {
                path: self.path.clone(),
                chain,
                limit: self.options.max_inheritance_depth,
            });
        }

        debug!(child = %self.path, ancestor = %location.path, depth = self.inherited.len(), "resolving extends");
        let LocationResult {
            file,
            path,
            circle_id,
        } = location;
        let ancestor = PlParser::new(ParserContext {
            file: &file,
            path,
            circle_id,
            resolver: self.resolver,
            inherited: self.inherited.clone(),
            check_mandatory_keys: false,
            options: self.options,
        })
        .parse()?;
        self.output.merge_output(ancestor);
        Ok(())
    }

    fn from_file(&mut self, key: &str, op: Operator, uri: &str) -> Result<(), ParserError> {
        let location = self.locate(uri)?;
        let at = self.at();
        let text = String::from_utf8(location.file).map_err(|_| ParserError::InvalidFileLine {
            at: at.clone(),
            message: format!("{} could not be decoded", location.path),
        })?;
        match op {
            Operator::Json => {
                let parsed: Value = serde_json::from_str(&text).map_err(|_| {
                    ParserError::syntax(at.clone(), "file does not correspond to a valid JSON format")
                })?;
                self.store(key, Incoming::Value(parsed), ApplyMode::Assign, at)
            }
            op => self.store(key, Incoming::Text(text), mode(op), at),
        }
    }

    fn link(&mut self, key: &str, uri: &str) -> Result<(), ParserError> {
        let location = self.locate(uri)?;
        let at = self.at();
        self.store(
            key,
            Incoming::Value(Value::String(location.path.path)),
            ApplyMode::Assign,
            at,
        )
    }

    fn component(&mut self, key: &str, name: &str) -> Result<(), ParserError> {
        let at = self.at();
        let value = components::component_value(name).ok_or_else(|| {
            ParserError::ComponentNotFound {
                at: at.clone(),
                message: format!("component {} not found", name),
            }
        })?;
        self.store(key, Incoming::Value(value), ApplyMode::Assign, at)
    }

    fn dependency(&mut self, uri: &str, alias: Option<&str>) -> Result<(), ParserError> {
        let location = self.locate(uri)?;
        let alias = alias
            .map(str::to_owned)
            .unwrap_or_else(|| location.path.file_name());
        trace!(path = %location.path, alias = %alias, "dependency");
        self.output.add_dependency(location.path, alias);
        Ok(())
    }

    fn store(
        &mut self,
        key: &str,
        incoming: Incoming,
        mode: ApplyMode,
        at: LineContext,
    ) -> Result<(), ParserError> {
        match namespace::apply(&mut self.output.data, key, incoming, mode) {
            Ok(Some(warning)) => {
                debug!(path = %self.path, line = at.line_number, "{}", warning);
                self.output.warnings.push(warning);
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(e) => Err(ParserError::semantic(at, e.to_string())),
        }
    }

    fn locate(&self, uri: &str) -> Result<LocationResult, ParserError> {
        self.resolver
            .get_location(uri, &self.directory, self.path.resource_id, self.circle_id)
            .ok_or_else(|| {
                ParserError::file_not_found(self.at(), format!("URI {} could not be resolved", uri))
            })
    }
}

impl Parser for PlParser<'_> {
    fn parse(self: Box<Self>) -> Result<ParserOutput, ParserError> {
        PlParser::parse(*self)
    }
}

fn mode(op: Operator) -> ApplyMode {
    match op {
        Operator::Assign | Operator::Json => ApplyMode::Assign,
        Operator::Append => ApplyMode::Append,
        Operator::Prepend => ApplyMode::Prepend,
    }
}
