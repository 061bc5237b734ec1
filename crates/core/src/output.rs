use crate::source::FullPath;
use crate::value::deep_merge;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// A file to embed in the execution environment, under `alias`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Dependency {
    pub path: FullPath,
    pub alias: String,
}

/// Result of parsing one file together with everything it inherits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParserOutput {
    pub path: FullPath,
    pub circle_id: i64,
    pub format: String,
    pub dependencies: BTreeSet<Dependency>,
    pub comments: Vec<String>,
    pub warnings: Vec<String>,
    pub data: Map<String, Value>,
}

impl ParserOutput {
    pub fn new(path: FullPath, circle_id: i64, format: impl Into<String>) -> Self {
        ParserOutput {
            path,
            circle_id,
            format: format.into(),
            dependencies: BTreeSet::new(),
            comments: Vec::new(),
            warnings: Vec::new(),
            data: Map::new(),
        }
    }

    pub fn add_dependency(&mut self, path: FullPath, alias: impl Into<String>) {
        self.dependencies.insert(Dependency {
            path,
            alias: alias.into(),
        });
    }

    /// Fold an ancestor's output into this one.
    ///
    /// Dependencies are unioned, comments and warnings appended after ours,
    /// and data deep-merged with the ancestor winning scalar conflicts.
    pub fn merge_output(&mut self, ancestor: ParserOutput) {
        self.dependencies.extend(ancestor.dependencies);
        self.comments.extend(ancestor.comments);
        self.warnings.extend(ancestor.warnings);
        deep_merge(&mut self.data, ancestor.data);
    }
}
