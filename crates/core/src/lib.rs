#![allow(clippy::result_large_err)]
//! platon-core: parser for PL exercise description files.
//!
//! A `.pl` file is a line-oriented document of key/value directives that
//! builds a nested JSON-like tree, can inherit from other files through
//! `extends`, and declares the files an exercise depends on.
//!
//! # Public API
//!
//! - [`parse_file()`] -- pick a parser by extension and run it
//! - [`ParserRegistry`] / [`load_registry()`] -- extension to parser mapping
//! - [`ParserOutput`] -- the parsed document
//! - [`ParserError`] -- every fatal parse condition
//! - [`Resolve`] -- how `extends`, `@`, `=@` and `=$` references are found,
//!   with [`FileSystemResolver`] and [`InMemoryResolver`] provided

pub mod components;
pub mod config;
pub mod error;
pub mod grammar;
pub mod namespace;
pub mod output;
pub mod pl;
pub mod plugin;
pub mod registry;
pub mod source;
pub mod value;

// ── Convenience re-exports: key types ────────────────────────────────

pub use config::ParseOptions;
pub use error::{LineContext, ParserError};
pub use output::{Dependency, ParserOutput};
pub use plugin::{Parser, ParserContext, ParserImport, PluginEntry, PluginError};
pub use source::{FileSystemResolver, FullPath, InMemoryResolver, LocationResult, Resolve};

// ── Convenience re-exports: entry points ─────────────────────────────

pub use registry::{load_registry, parse_file, ParserRegistry, PluginRoot, BUILTIN_PLUGINS};
