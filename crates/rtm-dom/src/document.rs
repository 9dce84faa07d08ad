//! Arena-backed markup document.
//!
//! [`Document`] owns every node it has ever created in a flat arena and links
//! them through parent/child handles. Mutations only relink handles; a
//! detached or replaced node keeps its slot but is no longer reachable from
//! the root, so traversals never see it.
//!
//! # Invariants
//!
//! - The root is always an element and never has a parent.
//! - A node appears in at most one parent's child list, and its `parent`
//!   link names that list's owner.
//! - Only elements have children.

use serde::{Deserialize, Serialize};

use crate::error::{DomError, DomResult};
use crate::node::{Element, NodeId, NodeKind};

#[derive(Clone, Debug, Serialize, Deserialize)]
struct NodeSlot {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl NodeSlot {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// An ordered tree of elements, text and comments.
///
/// Deserialization rejects any arena that breaks the invariants above.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "RawDocument", into = "RawDocument")]
pub struct Document {
    nodes: Vec<NodeSlot>,
    root: NodeId,
}

/// Unchecked wire form of a [`Document`].
#[derive(Clone, Debug, Serialize, Deserialize)]
struct RawDocument {
    nodes: Vec<NodeSlot>,
    root: NodeId,
}

impl From<Document> for RawDocument {
    fn from(doc: Document) -> Self {
        Self {
            nodes: doc.nodes,
            root: doc.root,
        }
    }
}

impl TryFrom<RawDocument> for Document {
    type Error = DomError;

    fn try_from(raw: RawDocument) -> DomResult<Self> {
        let RawDocument { nodes, root } = raw;
        let id = |i: usize| NodeId(i as u32);

        match nodes.get(root.index()) {
            None => return Err(DomError::UnknownNode(root)),
            Some(slot) if !slot.kind.is_element() => return Err(DomError::RootNotElement),
            Some(slot) if slot.parent.is_some() => return Err(DomError::RootHasParent(root)),
            Some(_) => {}
        }

        // Owner of each node according to the child lists.
        let mut owner: Vec<Option<NodeId>> = vec![None; nodes.len()];
        for (i, slot) in nodes.iter().enumerate() {
            if !slot.children.is_empty() && !slot.kind.is_element() {
                return Err(DomError::NotAnElement(id(i)));
            }
            for &child in &slot.children {
                let entry = owner
                    .get_mut(child.index())
                    .ok_or(DomError::UnknownNode(child))?;
                if entry.is_some() {
                    return Err(DomError::ParentMismatch(child));
                }
                *entry = Some(id(i));
            }
        }
        for (i, slot) in nodes.iter().enumerate() {
            if slot.parent != owner[i] {
                return Err(DomError::ParentMismatch(id(i)));
            }
        }

        // Parent chains must terminate. 0 = unvisited, 1 = on the current
        // chain, 2 = known to reach a parentless node.
        let mut state = vec![0u8; nodes.len()];
        for start in 0..nodes.len() {
            let mut chain = Vec::new();
            let mut current = Some(start);
            while let Some(i) = current {
                match state[i] {
                    2 => break,
                    1 => return Err(DomError::Cycle(id(i))),
                    _ => {
                        state[i] = 1;
                        chain.push(i);
                        current = nodes[i].parent.map(NodeId::index);
                    }
                }
            }
            for i in chain {
                state[i] = 2;
            }
        }

        Ok(Self { nodes, root })
    }
}

impl Document {
    /// Create a document consisting of a single root element.
    pub fn new(root: Element) -> Self {
        Self {
            nodes: vec![NodeSlot::new(NodeKind::Element(root))],
            root: NodeId(0),
        }
    }

    /// The root element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of arena slots, including detached nodes.
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if `id` was created by this document.
    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    fn slot(&self, id: NodeId) -> DomResult<&NodeSlot> {
        self.nodes.get(id.index()).ok_or(DomError::UnknownNode(id))
    }

    fn slot_mut(&mut self, id: NodeId) -> DomResult<&mut NodeSlot> {
        self.nodes.get_mut(id.index()).ok_or(DomError::UnknownNode(id))
    }

    // ---------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id.index()).map(|s| &s.kind)
    }

    /// The element stored at `id`, or `None` for unknown ids and non-elements.
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.kind(id).and_then(NodeKind::as_element)
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.nodes
            .get_mut(id.index())
            .and_then(|s| s.kind.as_element_mut())
    }

    /// Value of attribute `name` on element `id`.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.attributes.get(name))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.index()).and_then(|s| s.parent)
    }

    /// Children in document order. Empty for unknown ids and leaves.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.index())
            .map(|s| s.children.as_slice())
            .unwrap_or(&[])
    }

    /// Element children in document order.
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |c| self.element(*c).is_some())
    }

    /// Returns `true` if `id` is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        if !self.contains(id) {
            return false;
        }
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.parent(current) {
                Some(p) => current = p,
                None => return false,
            }
        }
    }

    /// Returns `true` if `ancestor` is `node` or lies on its parent chain.
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.parent(c);
        }
        false
    }

    // ---------------------------------------------------------------
    // Traversal
    // ---------------------------------------------------------------

    /// Pre-order (document order) traversal of the subtree at `from`,
    /// `from` included.
    pub fn descendants(&self, from: NodeId) -> Descendants<'_> {
        let stack = if self.contains(from) { vec![from] } else { Vec::new() };
        Descendants { doc: self, stack }
    }

    /// Pre-order traversal of every attached node.
    pub fn traverse(&self) -> Descendants<'_> {
        self.descendants(self.root)
    }

    /// First element in document order whose tag name is `name`.
    pub fn find_first_element_by_name(&self, name: &str) -> Option<NodeId> {
        self.traverse()
            .find(|id| self.element(*id).is_some_and(|e| e.name == name))
    }

    /// First element in document order carrying `name="value"`.
    pub fn find_first_element_by_attribute(&self, name: &str, value: &str) -> Option<NodeId> {
        self.traverse()
            .find(|id| self.attr(*id, name) == Some(value))
    }

    /// Concatenated text of the direct text children of `id`.
    pub fn own_text(&self, id: NodeId) -> String {
        self.children(id)
            .iter()
            .filter_map(|c| self.kind(*c).and_then(NodeKind::as_text))
            .collect()
    }

    // ---------------------------------------------------------------
    // Node creation
    // ---------------------------------------------------------------

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeSlot::new(kind));
        id
    }

    /// Create a detached element.
    pub fn create_element(&mut self, element: Element) -> NodeId {
        self.push(NodeKind::Element(element))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(text.into()))
    }

    /// Create a detached comment node.
    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Comment(text.into()))
    }

    /// Copy element `node` of `source` into this document without its
    /// children. The copy starts detached.
    pub fn import_shallow(&mut self, source: &Document, node: NodeId) -> DomResult<NodeId> {
        let element = source
            .slot(node)?
            .kind
            .as_element()
            .ok_or(DomError::NotAnElement(node))?
            .clone();
        Ok(self.create_element(element))
    }

    // ---------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------

    fn check_detached(&self, child: NodeId) -> DomResult<()> {
        let slot = self.slot(child)?;
        if child == self.root {
            return Err(DomError::RootImmutable(child));
        }
        if slot.parent.is_some() {
            return Err(DomError::AlreadyAttached(child));
        }
        Ok(())
    }

    fn check_can_adopt(&self, parent: NodeId, child: NodeId) -> DomResult<()> {
        if !self.slot(parent)?.kind.is_element() {
            return Err(DomError::NotAnElement(parent));
        }
        self.check_detached(child)?;
        if self.is_ancestor_or_self(child, parent) {
            return Err(DomError::WouldCycle { parent, child });
        }
        Ok(())
    }

    /// Append detached `child` as the last child of element `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.check_can_adopt(parent, child)?;
        self.slot_mut(parent)?.children.push(child);
        self.slot_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Insert detached `child` immediately before `anchor`, inside the
    /// anchor's parent.
    pub fn insert_before(&mut self, anchor: NodeId, child: NodeId) -> DomResult<()> {
        let parent = self.slot(anchor)?.parent.ok_or(DomError::NoParent(anchor))?;
        self.check_can_adopt(parent, child)?;
        let siblings = &mut self.slot_mut(parent)?.children;
        let pos = siblings
            .iter()
            .position(|c| *c == anchor)
            .ok_or(DomError::NoParent(anchor))?;
        siblings.insert(pos, child);
        self.slot_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Put detached `new` in the position of `old`; `old` and its subtree
    /// become detached.
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> DomResult<()> {
        if old == self.root {
            return Err(DomError::RootImmutable(old));
        }
        let parent = self.slot(old)?.parent.ok_or(DomError::NoParent(old))?;
        self.check_can_adopt(parent, new)?;
        let siblings = &mut self.slot_mut(parent)?.children;
        let pos = siblings
            .iter()
            .position(|c| *c == old)
            .ok_or(DomError::NoParent(old))?;
        siblings[pos] = new;
        self.slot_mut(new)?.parent = Some(parent);
        self.slot_mut(old)?.parent = None;
        Ok(())
    }

    /// Unlink `id` from its parent. The subtree stays intact but detached.
    pub fn detach(&mut self, id: NodeId) -> DomResult<()> {
        if id == self.root {
            return Err(DomError::RootImmutable(id));
        }
        let parent = self.slot(id)?.parent.ok_or(DomError::NoParent(id))?;
        self.slot_mut(parent)?.children.retain(|c| *c != id);
        self.slot_mut(id)?.parent = None;
        Ok(())
    }
}

/// Pre-order iterator over a subtree. Created by [`Document::descendants`].
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(id).iter().rev().copied());
        Some(id)
    }
}
