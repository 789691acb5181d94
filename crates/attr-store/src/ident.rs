// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Identifier utilities for graph contexts and attribute handles.
use blake3::Hasher;

/// Canonical 256-bit hash used for context identities and snapshot digests.
pub type Hash = [u8; 32];

/// Strongly typed identifier for the graph context that owns a set of stores.
///
/// Stores are bound to exactly one context. Copying a store re-binds the copy
/// to a new context; the original keeps its own binding.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ContextId(pub Hash);

impl ContextId {
    /// Returns the canonical byte representation of this id.
    #[must_use]
    pub fn as_bytes(&self) -> &Hash {
        &self.0
    }

    /// Returns the first eight bytes as lowercase hex, for log output.
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

/// Produces a stable context id derived from a label (`blake3("context:" || label)`).
#[must_use]
pub fn make_context_id(label: &str) -> ContextId {
    let mut hasher = Hasher::new();
    hasher.update(b"context:");
    hasher.update(label.as_bytes());
    ContextId(hasher.finalize().into())
}

/// Produces the context id for the `generation`-th copy taken from `parent`
/// (`blake3("context-copy:" || parent || generation_le || label)`).
///
/// The result never equals `parent` and differs between copies taken from the
/// same parent, whatever their labels.
#[must_use]
pub fn make_copy_context_id(parent: &ContextId, generation: u64, label: &str) -> ContextId {
    let mut hasher = Hasher::new();
    hasher.update(b"context-copy:");
    hasher.update(parent.as_bytes());
    hasher.update(&generation.to_le_bytes());
    hasher.update(label.as_bytes());
    ContextId(hasher.finalize().into())
}

/// Dense handle for an attribute declared in an [`crate::AttributeTable`].
///
/// Handles are assigned in declaration order and are only meaningful for the
/// table that issued them (and for copies of that table).
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct AttrId(pub(crate) usize);

impl AttrId {
    /// Returns the raw index of this handle.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl core::fmt::Display for AttrId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "attr#{}", self.0)
    }
}

/// Element family an attribute is attached to.
///
/// Each family has its own element capacity; graph-level attributes always
/// have capacity 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElementKind {
    /// Graph-level attribute (a single slot).
    Graph,
    /// Vertex attribute.
    Vertex,
    /// Edge attribute.
    Edge,
}

impl ElementKind {
    /// Returns a lowercase label for diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Graph => "graph",
            Self::Vertex => "vertex",
            Self::Edge => "edge",
        }
    }
}

impl core::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_ids_are_label_derived() {
        assert_eq!(make_context_id("a"), make_context_id("a"));
        assert_ne!(make_context_id("a"), make_context_id("b"));
        assert_eq!(make_context_id("a").short().len(), 16);
    }

    #[test]
    fn copy_ids_are_distinct_from_parent_and_siblings() {
        let parent = make_context_id("a");
        assert_ne!(make_copy_context_id(&parent, 0, "a"), parent);
        assert_ne!(
            make_copy_context_id(&parent, 0, "a"),
            make_copy_context_id(&parent, 1, "a")
        );
        assert_eq!(
            make_copy_context_id(&parent, 0, "a"),
            make_copy_context_id(&parent, 0, "a")
        );
    }
}
