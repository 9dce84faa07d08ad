//! Error types for the document crate.

use crate::node::NodeId;

/// Errors produced by document mutations and lookups.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DomError {
    /// The handle does not belong to this document.
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    /// The operation requires an element but the node is text or a comment.
    #[error("node {0} is not an element")]
    NotAnElement(NodeId),

    /// The node is not attached to a parent (detached, or the root).
    #[error("node {0} has no parent")]
    NoParent(NodeId),

    /// The document root cannot be detached or replaced.
    #[error("cannot detach or replace the document root {0}")]
    RootImmutable(NodeId),

    /// The node is already attached elsewhere in the tree.
    #[error("node {0} is already attached")]
    AlreadyAttached(NodeId),

    /// Attaching the node would make it its own ancestor.
    #[error("attaching {child} under {parent} would create a cycle")]
    WouldCycle { parent: NodeId, child: NodeId },

    /// A document root cannot sit under another node.
    #[error("document root {0} has a parent")]
    RootHasParent(NodeId),

    /// The node's parent link disagrees with the child lists, or the node
    /// is listed as a child more than once.
    #[error("parent link of {0} disagrees with the child lists")]
    ParentMismatch(NodeId),

    /// The node is its own ancestor.
    #[error("node {0} is its own ancestor")]
    Cycle(NodeId),

    /// A document root must be an element.
    #[error("document root must be an element")]
    RootNotElement,

    /// An element may carry each attribute name at most once.
    #[error("duplicate attribute name: {0}")]
    DuplicateAttribute(String),
}

/// Convenience alias for document results.
pub type DomResult<T> = Result<T, DomError>;
