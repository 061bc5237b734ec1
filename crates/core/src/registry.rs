//! Extension to parser mapping and the public `parse_file` entry point.
//!
//! A [`PluginRoot`] is a named, compiled-in set of plugins. Loading a root
//! produces a [`ParserRegistry`]; registries are cached per root name for
//! the life of the process.
//!
//! First population happens under a mutex: whichever caller takes the lock
//! first builds the registry, every later caller (concurrent or not) gets a
//! clone of the same `Arc`. A registry is immutable once built.

use crate::config::ParseOptions;
use crate::error::ParserError;
use crate::output::ParserOutput;
use crate::plugin::{ParserContext, ParserImport, PluginEntry};
use crate::source::{FullPath, Resolve};
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, error, warn};

/// A named set of parser plugins.
#[derive(Debug, Clone, Copy)]
pub struct PluginRoot {
    pub name: &'static str,
    pub plugins: &'static [PluginEntry],
}

/// Plugins shipped with this crate.
pub static BUILTIN_PLUGINS: PluginRoot = PluginRoot {
    name: "builtin",
    plugins: &[PluginEntry::new("pl", crate::pl::get_parser)],
};

#[derive(Debug, Clone, Default)]
pub struct ParserRegistry {
    parsers: BTreeMap<String, ParserImport>,
}

impl ParserRegistry {
    /// Build a registry from plugin descriptors, in order.
    ///
    /// Helpers are skipped, plugins that fail to load are logged and
    /// skipped, and a later plugin claiming an already claimed extension
    /// replaces the earlier one.
    pub fn from_plugins(plugins: &[PluginEntry]) -> Self {
        let mut parsers: BTreeMap<String, ParserImport> = BTreeMap::new();
        for entry in plugins.iter().filter(|entry| !entry.is_helper()) {
            let import = match entry.load() {
                Ok(import) => import,
                Err(e) => {
                    error!(plugin = entry.name, "{}", e);
                    continue;
                }
            };
            for ext in &import.extensions {
                if let Some(previous) = parsers.insert(ext.clone(), import.clone()) {
                    warn!(
                        extension = %ext,
                        previous = %previous.file_type,
                        plugin = entry.name,
                        "conflict between two parsers for extension .{}, keeping {}",
                        ext,
                        import.file_type
                    );
                }
            }
        }
        debug!(extensions = parsers.len(), "parser registry populated");
        ParserRegistry { parsers }
    }

    pub fn get(&self, extension: &str) -> Option<&ParserImport> {
        self.parsers.get(extension)
    }

    /// Registered extensions with their format tag, sorted by extension.
    pub fn extensions(&self) -> impl Iterator<Item = (&str, &str)> {
        self.parsers
            .iter()
            .map(|(ext, import)| (ext.as_str(), import.file_type.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }

    pub fn parse_file(
        &self,
        file: &[u8],
        path: FullPath,
        circle_id: i64,
        resolver: &dyn Resolve,
    ) -> Result<ParserOutput, ParserError> {
        self.parse_file_with(file, path, circle_id, resolver, ParseOptions::default())
    }

    /// Pick a parser by the extension of `path` and run it on `file`.
    pub fn parse_file_with(
        &self,
        file: &[u8],
        path: FullPath,
        circle_id: i64,
        resolver: &dyn Resolve,
        options: ParseOptions,
    ) -> Result<ParserOutput, ParserError> {
        self.run(ParserContext::new(file, path, circle_id, resolver).with_options(options))
    }

    /// Run the parser registered for the extension of `context.path`.
    pub fn run(&self, context: ParserContext<'_>) -> Result<ParserOutput, ParserError> {
        let extension = extension_of(&context.path.path).to_owned();
        let import = self
            .get(&extension)
            .ok_or_else(|| ParserError::NoParser {
                path: context.path.clone(),
                extension,
            })?;
        (import.parser)(context).parse()
    }
}

/// Text after the last `.` of the final path segment, or the whole segment
/// when it has no dot.
fn extension_of(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.rsplit('.').next().unwrap_or(name)
}

static REGISTRIES: Lazy<Mutex<HashMap<&'static str, Arc<ParserRegistry>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Registry for `root`, built on first request and shared afterwards.
pub fn load_registry(root: &PluginRoot) -> Arc<ParserRegistry> {
    let mut cache = REGISTRIES.lock().unwrap_or_else(PoisonError::into_inner);
    cache
        .entry(root.name)
        .or_insert_with(|| {
            debug!(root = root.name, "loading parser plugins");
            Arc::new(ParserRegistry::from_plugins(root.plugins))
        })
        .clone()
}

/// Parse `file` with the built-in plugins.
pub fn parse_file(
    file: &[u8],
    path: FullPath,
    circle_id: i64,
    resolver: &dyn Resolve,
) -> Result<ParserOutput, ParserError> {
    load_registry(&BUILTIN_PLUGINS).parse_file(file, path, circle_id, resolver)
}
