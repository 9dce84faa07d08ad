//! Where a proposed element with no counterpart lands in the original.
//!
//! Rules, first applicable wins:
//!
//! 1. A placeholder anywhere in the original: insert right before it.
//! 2. The proposed parent has an identity key that resolves in the
//!    original: append as that element's last child.
//! 3. Append as the last child of the original root.
//!
//! The inserted node is a shallow copy; its children arrive one by one as
//! the walk continues.

use std::fmt;

use rtm_dom::{Document, NodeId};
use serde::{Deserialize, Serialize};

use crate::config::MergeConfig;
use crate::error::MergeResult;
use crate::identity::IdentityIndex;

/// The rule that decided an insertion point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    /// Inserted as the preceding sibling of the placeholder.
    BeforePlaceholder { placeholder: NodeId },
    /// Appended under the original counterpart of the proposed parent.
    UnderParent { parent: NodeId },
    /// Appended under the original root.
    RootAppend,
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placement::BeforePlaceholder { placeholder } => write!(f, "before placeholder {placeholder}"),
            Placement::UnderParent { parent } => write!(f, "under parent {parent}"),
            Placement::RootAppend => f.write_str("root append"),
        }
    }
}

/// Pick the insertion rule without touching the tree.
pub fn choose<I: IdentityIndex + ?Sized>(
    original: &Document,
    proposed: &Document,
    proposed_parent: NodeId,
    index: &I,
    config: &MergeConfig,
) -> Placement {
    // A placeholder that is itself the root has no parent to insert into.
    let placeholder = original.traverse().find(|id| {
        original.parent(*id).is_some()
            && original
                .element(*id)
                .is_some_and(|e| e.name == config.placeholder_tag)
    });
    if let Some(placeholder) = placeholder {
        return Placement::BeforePlaceholder { placeholder };
    }

    let parent_key = proposed
        .attr(proposed_parent, &config.identity_attribute)
        .filter(|k| !k.is_empty());
    if let Some(parent) = parent_key.and_then(|key| index.resolve(original, key)) {
        return Placement::UnderParent { parent };
    }

    Placement::RootAppend
}

/// Copy proposed element `node` (without children) into `original` at the
/// position chosen by [`choose`]. Returns the new node and the rule used.
pub fn place<I: IdentityIndex + ?Sized>(
    original: &mut Document,
    proposed: &Document,
    node: NodeId,
    proposed_parent: NodeId,
    index: &I,
    config: &MergeConfig,
) -> MergeResult<(NodeId, Placement)> {
    let placement = choose(original, proposed, proposed_parent, index, config);
    let copy = original.import_shallow(proposed, node)?;
    match placement {
        Placement::BeforePlaceholder { placeholder } => original.insert_before(placeholder, copy)?,
        Placement::UnderParent { parent } => original.append_child(parent, copy)?,
        Placement::RootAppend => {
            let root = original.root();
            original.append_child(root, copy)?
        }
    }
    Ok((copy, placement))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::LinearScan;
    use rtm_dom::Fragment;

    fn doc(f: Fragment) -> Document {
        f.into_document().unwrap()
    }

    fn proposed() -> (Document, NodeId, NodeId) {
        let d = doc(Fragment::element("page").attr("id", "p").child(
            Fragment::element("section").attr("id", "s").child(
                Fragment::element("field").attr("id", "f").child(Fragment::text("t")),
            ),
        ));
        let s = d.find_first_element_by_attribute("id", "s").unwrap();
        let f = d.find_first_element_by_attribute("id", "f").unwrap();
        (d, s, f)
    }

    fn place_f(original: &mut Document) -> (NodeId, Placement) {
        let (prop, s, f) = proposed();
        let index = LinearScan::new("id");
        place(original, &prop, f, s, &index, &MergeConfig::default()).unwrap()
    }

    #[test]
    fn placeholder_wins_over_parent() {
        let mut original = doc(Fragment::element("page").attr("id", "p").children([
            Fragment::element("section").attr("id", "s"),
            Fragment::element("div").child(Fragment::element("util:placeholder")),
        ]));
        let marker = original.find_first_element_by_name("util:placeholder").unwrap();
        let holder = original.parent(marker).unwrap();

        let (copy, placement) = place_f(&mut original);

        assert_eq!(placement, Placement::BeforePlaceholder { placeholder: marker });
        assert_eq!(original.children(holder), &[copy, marker]);
    }

    #[test]
    fn parent_counterpart_used_without_placeholder() {
        let mut original = doc(Fragment::element("page").attr("id", "p").child(
            Fragment::element("section")
                .attr("id", "s")
                .child(Fragment::element("field").attr("id", "other")),
        ));
        let s = original.find_first_element_by_attribute("id", "s").unwrap();

        let (copy, placement) = place_f(&mut original);

        assert_eq!(placement, Placement::UnderParent { parent: s });
        assert_eq!(original.children(s).last(), Some(&copy));
    }

    #[test]
    fn root_append_as_last_resort() {
        let mut original = doc(Fragment::element("page").attr("id", "p").child(
            Fragment::element("div").attr("id", "x"),
        ));
        let (copy, placement) = place_f(&mut original);
        assert_eq!(placement, Placement::RootAppend);
        assert_eq!(original.children(original.root()).last(), Some(&copy));
    }

    #[test]
    fn unidentified_parent_falls_back_to_root() {
        let mut original = doc(Fragment::element("page").attr("id", "p"));
        let prop = doc(Fragment::element("page").attr("id", "p").child(
            Fragment::element("div").child(Fragment::element("field").attr("id", "f")),
        ));
        let div = prop.find_first_element_by_name("div").unwrap();
        let f = prop.find_first_element_by_attribute("id", "f").unwrap();
        let index = LinearScan::new("id");
        let placement = choose(&original, &prop, div, &index, &MergeConfig::default());
        assert_eq!(placement, Placement::RootAppend);
        let (copy, _) = place(&mut original, &prop, f, div, &index, &MergeConfig::default()).unwrap();
        assert_eq!(original.parent(copy), Some(original.root()));
    }

    #[test]
    fn inserted_copy_is_shallow() {
        let mut original = doc(Fragment::element("page").attr("id", "p"));
        let (copy, _) = place_f(&mut original);
        assert!(original.children(copy).is_empty());
        assert_eq!(original.attr(copy, "id"), Some("f"));
    }

    #[test]
    fn root_placeholder_is_ignored() {
        let original = doc(Fragment::element("util:placeholder"));
        let (prop, s, _f) = proposed();
        let placement = choose(&original, &prop, s, &LinearScan::new("id"), &MergeConfig::default());
        assert_eq!(placement, Placement::RootAppend);
    }

    #[test]
    fn custom_placeholder_tag() {
        let config = MergeConfig {
            placeholder_tag: "slot".into(),
            ..Default::default()
        };
        let original = doc(Fragment::element("page").children([
            Fragment::element("util:placeholder"),
            Fragment::element("slot"),
        ]));
        let slot = original.find_first_element_by_name("slot").unwrap();
        let (prop, s, _f) = proposed();
        let placement = choose(&original, &prop, s, &LinearScan::new("id"), &config);
        assert_eq!(placement, Placement::BeforePlaceholder { placeholder: slot });
    }

    #[test]
    fn display_names_the_rule() {
        assert_eq!(Placement::RootAppend.to_string(), "root append");
    }
}
