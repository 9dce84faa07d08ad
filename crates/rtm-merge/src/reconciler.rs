//! The recursive walk that drives a merge.
//!
//! The walk visits the proposed tree in document order. Every identified
//! element is resolved against the original and then inserted, replaced or
//! left alone; the walk then descends into the proposed element's children
//! whatever the outcome, always resolving against the current state of the
//! original.

use rtm_crypto::Fingerprint;
use rtm_dom::{Document, Element, NodeId};
use tracing::{debug, warn};

use crate::config::MergeConfig;
use crate::equivalence::equivalent;
use crate::error::MergeResult;
use crate::identity::IdentityIndex;
use crate::placement;
use crate::report::{MergeChange, MergeReport, ProtectReason};

enum Decision {
    Insert,
    Equivalent,
    Replace(NodeId),
    Protect(NodeId, ProtectReason),
    Skip,
}

pub(crate) struct Reconciler<'a, F: ?Sized, I: ?Sized> {
    config: &'a MergeConfig,
    fingerprint: &'a F,
    index: &'a mut I,
    report: MergeReport,
}

impl<'a, F, I> Reconciler<'a, F, I>
where
    F: Fingerprint + ?Sized,
    I: IdentityIndex + ?Sized,
{
    pub(crate) fn new(config: &'a MergeConfig, fingerprint: &'a F, index: &'a mut I) -> Self {
        Self {
            config,
            fingerprint,
            index,
            report: MergeReport::new(),
        }
    }

    pub(crate) fn into_report(self) -> MergeReport {
        self.report
    }

    /// Reconcile the children of proposed node `node`. Returns `true` if the
    /// original was mutated anywhere below.
    pub(crate) fn walk(&mut self, original: &mut Document, proposed: &Document, node: NodeId) -> bool {
        let mut changed = false;
        for &child in proposed.children(node) {
            let Some(element) = proposed.element(child) else {
                continue;
            };
            if let Some(key) = element
                .attributes
                .get_non_empty(&self.config.identity_attribute)
            {
                changed |= self.reconcile(original, proposed, node, child, key);
            }
            changed |= self.walk(original, proposed, child);
        }
        changed
    }

    fn decide(&self, original: &Document, proposed: &Element, key: &str) -> Decision {
        let Some(existing) = self.index.resolve(original, key) else {
            return Decision::Insert;
        };
        let Some(current) = original.element(existing) else {
            return Decision::Skip;
        };
        if equivalent(current, proposed, self.config) {
            return Decision::Equivalent;
        }
        let Some(stored) = current
            .attributes
            .get_non_empty(&self.config.fingerprint_attribute)
        else {
            return Decision::Protect(existing, ProtectReason::Unfingerprinted);
        };
        match self.fingerprint.fingerprint(original, existing) {
            Ok(fresh) if fresh == stored => Decision::Replace(existing),
            Ok(_) => Decision::Protect(existing, ProtectReason::UserModified),
            Err(err) => {
                warn!(key, error = %err, "fingerprint unavailable, element left as is");
                Decision::Skip
            }
        }
    }

    fn reconcile(
        &mut self,
        original: &mut Document,
        proposed: &Document,
        parent: NodeId,
        node: NodeId,
        key: &str,
    ) -> bool {
        let Some(element) = proposed.element(node) else {
            return false;
        };
        match self.decide(original, element, key) {
            Decision::Insert => {
                match placement::place(original, proposed, node, parent, &*self.index, self.config) {
                    Ok((new, placement)) => {
                        self.index.inserted(original, new);
                        debug!(key, node = %new, %placement, "inserted element");
                        self.report.push(MergeChange::Inserted {
                            key: key.to_string(),
                            node: new,
                            placement,
                        });
                        true
                    }
                    Err(err) => {
                        warn!(key, error = %err, "insert skipped");
                        false
                    }
                }
            }
            Decision::Equivalent => {
                self.report.unchanged += 1;
                false
            }
            Decision::Replace(old) => match self.replace(original, proposed, old, node) {
                Ok(new) => {
                    debug!(key, old = %old, new = %new, "replaced element");
                    self.report.push(MergeChange::Replaced {
                        key: key.to_string(),
                        old,
                        new,
                    });
                    true
                }
                Err(err) => {
                    warn!(key, error = %err, "replace skipped");
                    false
                }
            },
            Decision::Protect(existing, reason) => {
                debug!(key, node = %existing, ?reason, "kept original element");
                self.report.push(MergeChange::Protected {
                    key: key.to_string(),
                    node: existing,
                    reason,
                });
                false
            }
            Decision::Skip => false,
        }
    }

    fn replace(
        &mut self,
        original: &mut Document,
        proposed: &Document,
        old: NodeId,
        node: NodeId,
    ) -> MergeResult<NodeId> {
        let new = original.import_shallow(proposed, node)?;
        original.replace(old, new)?;
        self.index.replaced(original, old, new);
        Ok(new)
    }

    /// Copy attributes of the proposed root that the original root lacks.
    /// Bookkeeping attributes are never copied.
    pub(crate) fn sync_root(&mut self, original: &mut Document, proposed: &Document) -> bool {
        let root = original.root();
        let Some(proposed_root) = proposed.element(proposed.root()) else {
            return false;
        };
        let missing: Vec<(String, String)> = proposed_root
            .attributes
            .iter()
            .filter(|a| !self.config.is_bookkeeping(&a.name))
            .filter(|a| original.attr(root, &a.name).is_none())
            .map(|a| (a.name.clone(), a.value.clone()))
            .collect();
        let Some(target) = original.element_mut(root) else {
            return false;
        };
        for (name, value) in &missing {
            target.attributes.set(name.as_str(), value.as_str());
            debug!(name = %name, "added root attribute");
            self.report.push(MergeChange::RootAttributeAdded {
                name: name.clone(),
                value: value.clone(),
            });
        }
        if missing.is_empty() {
            return false;
        }
        self.index.updated(original, root);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::LinearScan;
    use rtm_crypto::FingerprintResult;
    use rtm_dom::Fragment;

    fn run(
        original: &mut Document,
        proposed: &Document,
        fp: impl Fn(&Document, NodeId) -> FingerprintResult<String>,
    ) -> (bool, MergeReport) {
        let config = MergeConfig::default();
        let mut index = LinearScan::new("id");
        let mut r = Reconciler::new(&config, &fp, &mut index);
        let changed = r.walk(original, proposed, proposed.root());
        (changed, r.into_report())
    }

    fn constant(_: &Document, _: NodeId) -> FingerprintResult<String> {
        Ok("H".to_string())
    }

    #[test]
    fn text_and_comments_are_skipped() {
        let mut original = Fragment::element("page").into_document().unwrap();
        let proposed = Fragment::element("page")
            .children([Fragment::text("hello"), Fragment::comment("c")])
            .into_document()
            .unwrap();
        let (changed, report) = run(&mut original, &proposed, constant);
        assert!(!changed);
        assert!(report.changes.is_empty());
        assert!(original.children(original.root()).is_empty());
    }

    #[test]
    fn unidentified_wrapper_is_walked_through() {
        let mut original = Fragment::element("page").into_document().unwrap();
        let proposed = Fragment::element("page")
            .child(Fragment::element("div").child(Fragment::element("input").attr("id", "i")))
            .into_document()
            .unwrap();
        let (changed, report) = run(&mut original, &proposed, constant);
        assert!(changed);
        assert_eq!(report.inserted(), 1);
        // The wrapper itself is never copied.
        assert_eq!(
            original.to_string(),
            r#"<page><input id="i"/></page>"#
        );
    }

    #[test]
    fn fingerprint_failure_is_a_no_op() {
        let mut original = Fragment::element("page")
            .child(Fragment::element("div").attr("id", "a").attr("x", "1").attr("z", "H"))
            .into_document()
            .unwrap();
        let proposed = Fragment::element("page")
            .child(Fragment::element("div").attr("id", "a").attr("x", "2"))
            .into_document()
            .unwrap();
        let before = original.to_fragment();
        let failing = |_: &Document, n: NodeId| -> FingerprintResult<String> {
            Err(rtm_crypto::FingerprintError::NotAnElement(n))
        };
        let (changed, report) = run(&mut original, &proposed, failing);
        assert!(!changed);
        assert!(report.changes.is_empty());
        assert_eq!(original.to_fragment(), before);
    }

    #[test]
    fn replacing_the_root_is_skipped() {
        // Proposed child claims the original root's key.
        let mut original = Fragment::element("page")
            .attr("id", "p")
            .attr("x", "0")
            .attr("z", "H")
            .into_document()
            .unwrap();
        let proposed = Fragment::element("wrapper")
            .child(Fragment::element("page").attr("id", "p").attr("x", "1"))
            .into_document()
            .unwrap();
        let (changed, report) = run(&mut original, &proposed, constant);
        assert!(!changed);
        assert_eq!(report.replaced(), 0);
        assert_eq!(original.attr(original.root(), "z"), Some("H"));
    }

    #[test]
    fn sync_root_copies_missing_non_bookkeeping_attributes() {
        let mut original = Fragment::element("page")
            .attr("id", "p")
            .attr("xmlns:a", "old")
            .into_document()
            .unwrap();
        let proposed = Fragment::element("page")
            .attr("id", "p")
            .attr("xmlns:a", "new")
            .attr("xmlns:util", "urn:util")
            .attr("z", "H")
            .attr("_seen", "1")
            .into_document()
            .unwrap();
        let config = MergeConfig::default();
        let mut index = LinearScan::new("id");
        let mut r = Reconciler::new(&config, &constant, &mut index);
        assert!(r.sync_root(&mut original, &proposed));
        let report = r.into_report();

        let root = original.root();
        assert_eq!(original.attr(root, "xmlns:util"), Some("urn:util"));
        assert_eq!(original.attr(root, "xmlns:a"), Some("old"));
        assert!(original.attr(root, "z").is_none());
        assert!(original.attr(root, "_seen").is_none());
        assert_eq!(report.changes.len(), 1);
    }
}
