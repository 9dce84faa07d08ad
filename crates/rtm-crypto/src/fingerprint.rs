//! Element fingerprints.
//!
//! A fingerprint certifies "this element is exactly as the generator last
//! wrote it". The persistence side computes one for every identified element
//! and stores it in the fingerprint attribute; the merge side recomputes and
//! compares to detect hand edits.
//!
//! The canonical form covers the element itself, not its subtree:
//!
//! 1. the tag name,
//! 2. every attribute except the fingerprint attribute and internal
//!    (prefixed) attributes, sorted by name,
//! 3. the concatenated text of its direct text children.

use std::collections::BTreeMap;

use rtm_dom::{Document, NodeId};

use crate::hasher::ContentHasher;

/// Capability that computes an element's fingerprint.
///
/// The merge engine only compares fingerprints for equality; it never
/// interprets them.
pub trait Fingerprint {
    /// Fingerprint of element `node` in its current state.
    fn fingerprint(&self, doc: &Document, node: NodeId) -> FingerprintResult<String>;
}

impl<F> Fingerprint for F
where
    F: Fn(&Document, NodeId) -> FingerprintResult<String>,
{
    fn fingerprint(&self, doc: &Document, node: NodeId) -> FingerprintResult<String> {
        self(doc, node)
    }
}

/// Default BLAKE3 fingerprint, hex encoded.
#[derive(Clone, Debug)]
pub struct ContentFingerprint {
    fingerprint_attribute: String,
    internal_prefix: String,
}

impl Default for ContentFingerprint {
    fn default() -> Self {
        Self::new("z", "_")
    }
}

impl ContentFingerprint {
    /// Fingerprint that excludes `fingerprint_attribute` and every attribute
    /// starting with `internal_prefix` from the canonical form.
    pub fn new(fingerprint_attribute: impl Into<String>, internal_prefix: impl Into<String>) -> Self {
        Self {
            fingerprint_attribute: fingerprint_attribute.into(),
            internal_prefix: internal_prefix.into(),
        }
    }

    pub fn fingerprint_attribute(&self) -> &str {
        &self.fingerprint_attribute
    }

    fn excluded(&self, name: &str) -> bool {
        name == self.fingerprint_attribute
            || (!self.internal_prefix.is_empty() && name.starts_with(&self.internal_prefix))
    }

    /// Compute and store the fingerprint of `node`, returning it.
    pub fn stamp(&self, doc: &mut Document, node: NodeId) -> FingerprintResult<String> {
        let value = self.fingerprint(doc, node)?;
        let element = doc
            .element_mut(node)
            .ok_or(FingerprintError::NotAnElement(node))?;
        element
            .attributes
            .set(self.fingerprint_attribute.as_str(), value.as_str());
        Ok(value)
    }

    /// Stamp every attached element that carries a non-empty
    /// `identity_attribute`. Returns how many were stamped.
    pub fn stamp_all(&self, doc: &mut Document, identity_attribute: &str) -> FingerprintResult<usize> {
        let targets: Vec<NodeId> = doc
            .traverse()
            .filter(|id| {
                doc.element(*id)
                    .is_some_and(|e| e.attributes.get_non_empty(identity_attribute).is_some())
            })
            .collect();
        for id in &targets {
            self.stamp(doc, *id)?;
        }
        Ok(targets.len())
    }

    /// Returns `true` if the stored fingerprint on `node` matches a fresh
    /// computation. Elements without a stored fingerprint never match.
    pub fn verify(&self, doc: &Document, node: NodeId) -> FingerprintResult<bool> {
        let Some(stored) = doc.attr(node, &self.fingerprint_attribute) else {
            return Ok(false);
        };
        if stored.is_empty() {
            return Ok(false);
        }
        Ok(self.fingerprint(doc, node)? == stored)
    }
}

impl Fingerprint for ContentFingerprint {
    fn fingerprint(&self, doc: &Document, node: NodeId) -> FingerprintResult<String> {
        let element = doc.element(node).ok_or(FingerprintError::NotAnElement(node))?;

        let attrs: BTreeMap<&str, &str> = element
            .attributes
            .iter()
            .filter(|a| !self.excluded(&a.name))
            .map(|a| (a.name.as_str(), a.value.as_str()))
            .collect();
        let text = doc.own_text(node);

        let mut parts: Vec<&[u8]> = Vec::with_capacity(2 + attrs.len() * 2);
        parts.push(element.name.as_bytes());
        for (name, value) in &attrs {
            parts.push(name.as_bytes());
            parts.push(value.as_bytes());
        }
        parts.push(text.as_bytes());

        Ok(ContentHasher::ELEMENT.hash_parts(parts).to_hex())
    }
}

/// Errors from fingerprint computation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FingerprintError {
    #[error("node {0} is not an element")]
    NotAnElement(NodeId),
}

/// Convenience alias for fingerprint results.
pub type FingerprintResult<T> = Result<T, FingerprintError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rtm_dom::Fragment;

    fn doc(fragment: Fragment) -> Document {
        fragment.into_document().unwrap()
    }

    fn div(attrs: &[(&str, &str)]) -> Document {
        let f = attrs
            .iter()
            .fold(Fragment::element("div"), |f, (k, v)| f.attr(*k, *v));
        doc(f)
    }

    #[test]
    fn attribute_order_does_not_matter() {
        let fp = ContentFingerprint::default();
        let a = div(&[("id", "a"), ("x", "1")]);
        let b = div(&[("x", "1"), ("id", "a")]);
        assert_eq!(
            fp.fingerprint(&a, a.root()).unwrap(),
            fp.fingerprint(&b, b.root()).unwrap()
        );
    }

    #[test]
    fn bookkeeping_attributes_are_excluded() {
        let fp = ContentFingerprint::default();
        let a = div(&[("id", "a")]);
        let b = div(&[("id", "a"), ("z", "old"), ("_render", "yes")]);
        assert_eq!(
            fp.fingerprint(&a, a.root()).unwrap(),
            fp.fingerprint(&b, b.root()).unwrap()
        );
    }

    #[test]
    fn value_change_changes_fingerprint() {
        let fp = ContentFingerprint::default();
        let a = div(&[("id", "a"), ("x", "1")]);
        let b = div(&[("id", "a"), ("x", "2")]);
        assert_ne!(
            fp.fingerprint(&a, a.root()).unwrap(),
            fp.fingerprint(&b, b.root()).unwrap()
        );
    }

    #[test]
    fn own_text_is_covered_but_nested_text_is_not() {
        let fp = ContentFingerprint::default();
        let plain = doc(Fragment::element("p").attr("id", "a"));
        let with_text = doc(Fragment::element("p").attr("id", "a").child(Fragment::text("hi")));
        let nested = doc(
            Fragment::element("p")
                .attr("id", "a")
                .child(Fragment::element("b").child(Fragment::text("hi"))),
        );
        let h_plain = fp.fingerprint(&plain, plain.root()).unwrap();
        assert_ne!(h_plain, fp.fingerprint(&with_text, with_text.root()).unwrap());
        assert_eq!(h_plain, fp.fingerprint(&nested, nested.root()).unwrap());
    }

    #[test]
    fn stamp_then_verify() {
        let fp = ContentFingerprint::default();
        let mut d = div(&[("id", "a"), ("x", "1")]);
        let root = d.root();
        assert!(!fp.verify(&d, root).unwrap());
        let stamped = fp.stamp(&mut d, root).unwrap();
        assert_eq!(d.attr(root, "z"), Some(stamped.as_str()));
        assert!(fp.verify(&d, root).unwrap());

        d.element_mut(root).unwrap().attributes.set("x", "edited");
        assert!(!fp.verify(&d, root).unwrap());
    }

    #[test]
    fn stamp_all_only_touches_identified_elements() {
        let fp = ContentFingerprint::default();
        let mut d = doc(Fragment::element("page").attr("id", "p").children([
            Fragment::element("div").attr("id", "a"),
            Fragment::element("div"),
            Fragment::element("div").attr("id", ""),
        ]));
        assert_eq!(fp.stamp_all(&mut d, "id").unwrap(), 2);
        let stamped: Vec<_> = d.traverse().filter(|n| d.attr(*n, "z").is_some()).collect();
        assert_eq!(stamped.len(), 2);
    }

    #[test]
    fn text_node_is_not_fingerprintable() {
        let fp = ContentFingerprint::default();
        let mut d = div(&[("id", "a")]);
        let t = d.create_text("x");
        assert_eq!(fp.fingerprint(&d, t), Err(FingerprintError::NotAnElement(t)));
    }

    #[test]
    fn closures_are_fingerprints() {
        let constant = |_: &Document, _: NodeId| -> FingerprintResult<String> { Ok("H".into()) };
        let d = div(&[("id", "a")]);
        assert_eq!(constant.fingerprint(&d, d.root()).unwrap(), "H");
    }

    #[test]
    fn custom_attribute_names() {
        let fp = ContentFingerprint::new("hash", "rtm:");
        let a = div(&[("id", "a"), ("hash", "x"), ("rtm:seen", "1"), ("z", "kept")]);
        let b = div(&[("id", "a"), ("z", "kept")]);
        assert_eq!(
            fp.fingerprint(&a, a.root()).unwrap(),
            fp.fingerprint(&b, b.root()).unwrap()
        );
        assert_eq!(fp.fingerprint_attribute(), "hash");
    }
}
