//! Location resolution for references found in PL files.
//!
//! The parser never touches the filesystem itself: every `extends`,
//! load-from-file, link and dependency directive goes through a
//! [`Resolve`] implementation supplied by the caller. Resolution may block
//! (disk or network); the parser treats it as an opaque call.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// A file inside a specific content repository.
///
/// Used as the identity of a file for inheritance-loop detection and for
/// dependency deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FullPath {
    pub resource_id: i64,
    pub path: String,
}

impl FullPath {
    pub fn new(resource_id: i64, path: impl Into<String>) -> Self {
        FullPath {
            resource_id,
            path: path.into(),
        }
    }

    /// Directory containing this file, as passed to the resolver for
    /// relative references. Empty for a bare file name.
    pub fn directory(&self) -> String {
        Path::new(&self.path)
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Final path segment.
    pub fn file_name(&self) -> String {
        Path::new(&self.path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.clone())
    }
}

impl fmt::Display for FullPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource_id, self.path)
    }
}

/// The outcome of resolving a URI: raw bytes, where they came from, and the
/// namespace (circle) the resolved file belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationResult {
    pub file: Vec<u8>,
    pub path: FullPath,
    pub circle_id: i64,
}

/// Resolution callback used for every external reference in a PL file.
///
/// `directory` is the directory of the file containing the reference,
/// `resource_id` and `circle_id` are those of that file. `None` means the
/// URI could not be resolved.
///
/// Any `Fn(&str, &str, i64, i64) -> Option<LocationResult>` closure is a
/// valid resolver.
pub trait Resolve {
    fn get_location(
        &self,
        uri: &str,
        directory: &str,
        resource_id: i64,
        circle_id: i64,
    ) -> Option<LocationResult>;
}

impl<F> Resolve for F
where
    F: Fn(&str, &str, i64, i64) -> Option<LocationResult>,
{
    fn get_location(
        &self,
        uri: &str,
        directory: &str,
        resource_id: i64,
        circle_id: i64,
    ) -> Option<LocationResult> {
        self(uri, directory, resource_id, circle_id)
    }
}

/// Resolve `uri` against `directory` without touching the filesystem.
/// Absolute URIs are taken as-is; `.` and `..` are folded lexically.
pub fn join_uri(directory: &str, uri: &str) -> PathBuf {
    let uri = Path::new(uri);
    if uri.is_absolute() {
        normalize_path(uri)
    } else {
        normalize_path(&Path::new(directory).join(uri))
    }
}

/// Normalize a path by resolving `.` and `..` components lexically.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            other => components.push(other),
        }
    }
    components.iter().collect()
}

/// Filesystem-backed resolver: URIs are plain file paths.
///
/// Repository and namespace ids are passed through unchanged, so a whole
/// inheritance tree parsed from disk shares the root's ids.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSystemResolver;

impl Resolve for FileSystemResolver {
    fn get_location(
        &self,
        uri: &str,
        directory: &str,
        resource_id: i64,
        circle_id: i64,
    ) -> Option<LocationResult> {
        let path = join_uri(directory, uri);
        let file = std::fs::read(&path).ok()?;
        Some(LocationResult {
            file,
            path: FullPath::new(resource_id, path.to_string_lossy()),
            circle_id,
        })
    }
}

/// In-memory resolver for tests and embedders without a filesystem.
#[derive(Debug, Default, Clone)]
pub struct InMemoryResolver {
    files: HashMap<FullPath, (Vec<u8>, Option<i64>)>,
}

impl InMemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file. Its path is normalized the same way lookups are.
    pub fn with_file(mut self, resource_id: i64, path: &str, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(resource_id, path, contents, None);
        self
    }

    /// Register a file that lives in a specific circle rather than the
    /// requester's.
    pub fn with_file_in_circle(
        mut self,
        resource_id: i64,
        path: &str,
        contents: impl Into<Vec<u8>>,
        circle_id: i64,
    ) -> Self {
        self.insert(resource_id, path, contents, Some(circle_id));
        self
    }

    fn insert(
        &mut self,
        resource_id: i64,
        path: &str,
        contents: impl Into<Vec<u8>>,
        circle_id: Option<i64>,
    ) {
        let normalized = normalize_path(Path::new(path));
        self.files.insert(
            FullPath::new(resource_id, normalized.to_string_lossy()),
            (contents.into(), circle_id),
        );
    }

    /// Contents of a registered file, for building the root parse call.
    pub fn contents(&self, resource_id: i64, path: &str) -> Option<&[u8]> {
        let normalized = normalize_path(Path::new(path));
        self.files
            .get(&FullPath::new(resource_id, normalized.to_string_lossy()))
            .map(|(bytes, _)| bytes.as_slice())
    }
}

impl Resolve for InMemoryResolver {
    fn get_location(
        &self,
        uri: &str,
        directory: &str,
        resource_id: i64,
        circle_id: i64,
    ) -> Option<LocationResult> {
        let path = FullPath::new(resource_id, join_uri(directory, uri).to_string_lossy());
        let (file, own_circle) = self.files.get(&path)?;
        Some(LocationResult {
            file: file.clone(),
            path,
            circle_id: own_circle.unwrap_or(circle_id),
        })
    }
}
