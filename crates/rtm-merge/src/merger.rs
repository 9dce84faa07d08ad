//! The configured merge engine.

use rtm_crypto::{ContentFingerprint, Fingerprint};
use rtm_dom::Document;
use tracing::info;

use crate::config::{IndexKind, MergeConfig};
use crate::error::MergeResult;
use crate::identity::{IdentityIndex, KeyedIndex, LinearScan};
use crate::reconciler::Reconciler;
use crate::report::MergeReport;

/// Merges proposed documents into originals.
///
/// A `Merger` holds no per-merge state, so one instance can serve any number
/// of merges, including concurrent ones on independent document pairs.
#[derive(Clone, Debug)]
pub struct Merger<F = ContentFingerprint> {
    config: MergeConfig,
    fingerprint: F,
}

impl Default for Merger<ContentFingerprint> {
    fn default() -> Self {
        let config = MergeConfig::default();
        let fingerprint = default_fingerprint(&config);
        Self { config, fingerprint }
    }
}

fn default_fingerprint(config: &MergeConfig) -> ContentFingerprint {
    ContentFingerprint::new(
        config.fingerprint_attribute.as_str(),
        config.internal_prefix.as_str(),
    )
}

impl Merger<ContentFingerprint> {
    /// Merger using the BLAKE3 content fingerprint with the configured
    /// attribute names.
    pub fn new(config: MergeConfig) -> MergeResult<Self> {
        let fingerprint = default_fingerprint(&config);
        Self::with_fingerprint(config, fingerprint)
    }
}

impl<F: Fingerprint> Merger<F> {
    /// Merger with a caller-supplied fingerprint. It must agree with
    /// whatever wrote the stored fingerprints.
    pub fn with_fingerprint(config: MergeConfig, fingerprint: F) -> MergeResult<Self> {
        config.validate()?;
        Ok(Self { config, fingerprint })
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    pub fn fingerprint(&self) -> &F {
        &self.fingerprint
    }

    /// Merge `proposed` into `original`. Returns `true` if `original` was
    /// mutated and should be persisted.
    pub fn merge(&self, original: &mut Document, proposed: &Document) -> bool {
        self.merge_with_report(original, proposed).changed()
    }

    /// Merge and describe every decision taken.
    pub fn merge_with_report(&self, original: &mut Document, proposed: &Document) -> MergeReport {
        let attribute = self.config.identity_attribute.as_str();
        match self.config.index {
            IndexKind::Linear => {
                self.merge_with_index(original, proposed, &mut LinearScan::new(attribute))
            }
            IndexKind::Keyed => {
                let mut index = KeyedIndex::build(original, attribute);
                self.merge_with_index(original, proposed, &mut index)
            }
        }
    }

    /// Merge using an explicit identity index over `original`.
    pub fn merge_with_index<I: IdentityIndex + ?Sized>(
        &self,
        original: &mut Document,
        proposed: &Document,
        index: &mut I,
    ) -> MergeReport {
        let mut reconciler = Reconciler::new(&self.config, &self.fingerprint, index);
        if self.config.sync_root_attributes {
            reconciler.sync_root(original, proposed);
        }
        reconciler.walk(original, proposed, proposed.root());
        let report = reconciler.into_report();

        info!(
            changed = report.changed(),
            inserted = report.inserted(),
            replaced = report.replaced(),
            protected = report.protected(),
            unchanged = report.unchanged,
            "merge complete"
        );
        report
    }
}

/// Merge with the default conventions (`id`, `z`, `util:placeholder`, `_`)
/// and the default fingerprint.
pub fn merge(original: &mut Document, proposed: &Document) -> bool {
    Merger::default().merge(original, proposed)
}
