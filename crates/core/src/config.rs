/// Default cap on the `extends` chain length.
pub const DEFAULT_MAX_INHERITANCE_DEPTH: usize = 64;

/// Knobs for a single parse invocation tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Longest allowed chain of files, root included. Resolving an
    /// `extends` that would exceed it fails with `InheritanceTooDeep`.
    pub max_inheritance_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_inheritance_depth: DEFAULT_MAX_INHERITANCE_DEPTH,
        }
    }
}

impl ParseOptions {
    pub fn with_max_inheritance_depth(mut self, depth: usize) -> Self {
        self.max_inheritance_depth = depth;
        self
    }
}
