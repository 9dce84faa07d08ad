//! Owned, nested tree values.
//!
//! A [`Fragment`] is the convenient way to write a document down by hand and
//! to take a comparable snapshot of one. Converting into a [`Document`]
//! assigns arena handles in document order.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::{DomError, DomResult};
use crate::node::{Element, NodeId, NodeKind};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fragment {
    Element {
        element: Element,
        children: Vec<Fragment>,
    },
    Text(String),
    Comment(String),
}

impl Fragment {
    /// Start an element fragment with tag `name`.
    pub fn element(name: impl Into<String>) -> Self {
        Fragment::Element {
            element: Element::new(name),
            children: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Fragment::Text(text.into())
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Fragment::Comment(text.into())
    }

    /// Add an attribute. No effect on text and comments.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let Fragment::Element { element, .. } = &mut self {
            element.attributes.set(name, value);
        }
        self
    }

    /// Append a child. No effect on text and comments.
    pub fn child(mut self, child: Fragment) -> Self {
        if let Fragment::Element { children, .. } = &mut self {
            children.push(child);
        }
        self
    }

    /// Append several children.
    pub fn children<I: IntoIterator<Item = Fragment>>(self, items: I) -> Self {
        items.into_iter().fold(self, Fragment::child)
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Fragment::Element { element, .. } => Some(element),
            _ => None,
        }
    }

    /// Build a document. The root must be an element.
    pub fn into_document(self) -> DomResult<Document> {
        let Fragment::Element { element, children } = self else {
            return Err(DomError::RootNotElement);
        };
        let mut doc = Document::new(element);
        let root = doc.root();
        for child in children {
            child.attach_to(&mut doc, root)?;
        }
        Ok(doc)
    }

    /// Materialise this fragment under `parent` in `doc`, returning the new
    /// node.
    pub fn attach_to(self, doc: &mut Document, parent: NodeId) -> DomResult<NodeId> {
        match self {
            Fragment::Element { element, children } => {
                let id = doc.create_element(element);
                doc.append_child(parent, id)?;
                for child in children {
                    child.attach_to(doc, id)?;
                }
                Ok(id)
            }
            Fragment::Text(text) => {
                let id = doc.create_text(text);
                doc.append_child(parent, id)?;
                Ok(id)
            }
            Fragment::Comment(text) => {
                let id = doc.create_comment(text);
                doc.append_child(parent, id)?;
                Ok(id)
            }
        }
    }
}

impl Document {
    /// Owned copy of the subtree at `id`.
    pub fn snapshot(&self, id: NodeId) -> Option<Fragment> {
        let fragment = match self.kind(id)? {
            NodeKind::Element(element) => Fragment::Element {
                element: element.clone(),
                children: self
                    .children(id)
                    .iter()
                    .filter_map(|c| self.snapshot(*c))
                    .collect(),
            },
            NodeKind::Text(t) => Fragment::Text(t.clone()),
            NodeKind::Comment(t) => Fragment::Comment(t.clone()),
        };
        Some(fragment)
    }

    /// Owned copy of the whole attached tree.
    pub fn to_fragment(&self) -> Fragment {
        // The root always exists, so this never falls back.
        self.snapshot(self.root())
            .unwrap_or_else(|| Fragment::element(""))
    }
}

impl TryFrom<Fragment> for Document {
    type Error = DomError;

    fn try_from(fragment: Fragment) -> DomResult<Self> {
        fragment.into_document()
    }
}

/// Compact markup rendering, one line, no escaping.
impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fragment::Element { element, children } => {
                write!(f, "<{}", element.name)?;
                if !element.attributes.is_empty() {
                    write!(f, " {}", element.attributes)?;
                }
                if children.is_empty() {
                    return f.write_str("/>");
                }
                f.write_str(">")?;
                for child in children {
                    write!(f, "{child}")?;
                }
                write!(f, "</{}>", element.name)
            }
            Fragment::Text(t) => f.write_str(t),
            Fragment::Comment(t) => write!(f, "<!--{t}-->"),
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fragment())
    }
}
