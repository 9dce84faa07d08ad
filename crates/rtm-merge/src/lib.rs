//! Round-trip merge engine.
//!
//! Reconciles a freshly generated (*proposed*) markup document into a
//! previously generated (*original*) one that a user may have edited since.
//! New generated elements are inserted, unmodified generated elements are
//! refreshed, and anything a user touched is left alone.
//!
//! Elements are correlated by an identity attribute (`id`). A stored
//! fingerprint attribute (`z`) certifies that an original element is still
//! exactly as the tool wrote it; only such elements are ever replaced.
//!
//! # Key Types
//!
//! - [`Merger`] -- Configured engine; [`merge`] runs one with defaults
//! - [`MergeConfig`] -- Attribute/tag conventions and engine options
//! - [`IdentityIndex`] -- Key lookup capability ([`LinearScan`], [`KeyedIndex`])
//! - [`MergeReport`] / [`MergeChange`] -- Decision log of one merge
//! - [`Placement`] -- Which insertion rule placed a new element
//!
//! # Example
//!
//! ```rust
//! use rtm_dom::Fragment;
//!
//! let mut original = Fragment::element("page")
//!     .attr("id", "p")
//!     .into_document()
//!     .unwrap();
//! let proposed = Fragment::element("page")
//!     .attr("id", "p")
//!     .child(Fragment::element("field").attr("id", "name"))
//!     .into_document()
//!     .unwrap();
//!
//! assert!(rtm_merge::merge(&mut original, &proposed));
//! assert_eq!(original.to_string(), r#"<page id="p"><field id="name"/></page>"#);
//! // Already up to date: nothing to persist.
//! assert!(!rtm_merge::merge(&mut original, &proposed));
//! ```

pub mod config;
pub mod equivalence;
pub mod error;
pub mod identity;
pub mod merger;
pub mod placement;
mod reconciler;
pub mod report;

pub use config::{IndexKind, MergeConfig};
pub use equivalence::equivalent;
pub use error::{MergeError, MergeResult};
pub use identity::{IdentityIndex, KeyedIndex, LinearScan};
pub use merger::{merge, Merger};
pub use placement::Placement;
pub use report::{MergeChange, MergeReport, ProtectReason};

// Re-export the collaborating crates' key types.
pub use rtm_crypto::{ContentFingerprint, Fingerprint, FingerprintError, FingerprintResult};
pub use rtm_dom::{Document, Element, Fragment, NodeId};
