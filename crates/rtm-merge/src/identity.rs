//! Identity resolution: find the element in a tree that carries a given key.
//!
//! Resolution is whole-tree, not sibling-local: an element may be matched
//! anywhere in the original regardless of where its proposed counterpart
//! sits. When a key appears more than once, the first element in document
//! order wins.

use std::collections::HashMap;

use rtm_dom::{Document, NodeId};
use tracing::debug;

/// Lookup of elements by identity key.
///
/// Implementations must return the first match in document order. The
/// reconciler reports every structural change it makes so that cached
/// implementations can stay current.
pub trait IdentityIndex {
    /// The element whose identity attribute equals `key`, if any.
    fn resolve(&self, doc: &Document, key: &str) -> Option<NodeId>;

    /// `node` was just attached to `doc`.
    fn inserted(&mut self, _doc: &Document, _node: NodeId) {}

    /// `old` and its subtree were just replaced by `new` in `doc`.
    fn replaced(&mut self, _doc: &Document, _old: NodeId, _new: NodeId) {}

    /// Attributes of attached element `node` were just edited in place.
    fn updated(&mut self, _doc: &Document, _node: NodeId) {}
}

/// Pre-order scan per lookup. No state, O(m) per resolve.
#[derive(Clone, Debug)]
pub struct LinearScan {
    attribute: String,
}

impl LinearScan {
    pub fn new(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
        }
    }
}

impl IdentityIndex for LinearScan {
    fn resolve(&self, doc: &Document, key: &str) -> Option<NodeId> {
        if key.is_empty() {
            return None;
        }
        doc.find_first_element_by_attribute(&self.attribute, key)
    }
}

/// Key to node map built by one pre-order traversal.
///
/// Inserts are recorded incrementally. A replacement detaches a whole
/// subtree, which may hold the first occurrence of keys that also appear
/// later in the tree, so the map is rebuilt. An in-place edit can give an
/// early element a key that a later one already holds, so it rebuilds too.
#[derive(Clone, Debug)]
pub struct KeyedIndex {
    attribute: String,
    entries: HashMap<String, NodeId>,
}

impl KeyedIndex {
    /// Index every attached element of `doc` carrying `attribute`.
    pub fn build(doc: &Document, attribute: impl Into<String>) -> Self {
        let mut index = Self {
            attribute: attribute.into(),
            entries: HashMap::new(),
        };
        index.rebuild(doc);
        index
    }

    fn rebuild(&mut self, doc: &Document) {
        self.entries.clear();
        for id in doc.traverse() {
            if let Some(key) = doc.attr(id, &self.attribute).filter(|k| !k.is_empty()) {
                self.entries.entry(key.to_string()).or_insert(id);
            }
        }
        debug!(keys = self.entries.len(), "built identity index");
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IdentityIndex for KeyedIndex {
    fn resolve(&self, _doc: &Document, key: &str) -> Option<NodeId> {
        self.entries.get(key).copied()
    }

    fn inserted(&mut self, doc: &Document, node: NodeId) {
        if let Some(key) = doc.attr(node, &self.attribute).filter(|k| !k.is_empty()) {
            self.entries.entry(key.to_string()).or_insert(node);
        }
    }

    fn replaced(&mut self, doc: &Document, _old: NodeId, _new: NodeId) {
        self.rebuild(doc);
    }

    fn updated(&mut self, doc: &Document, _node: NodeId) {
        self.rebuild(doc);
    }
}
