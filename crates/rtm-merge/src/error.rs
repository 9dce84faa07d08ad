//! Error types for the merge crate.
//!
//! The merge itself never fails; these cover configuration and the
//! structural operations the reconciler performs on the original tree.

use rtm_crypto::FingerprintError;
use rtm_dom::DomError;

/// Errors that can occur while configuring or applying a merge.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// A configuration value is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configuration text could not be parsed.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A tree mutation violated a structural precondition.
    #[error("document error: {0}")]
    Dom(#[from] DomError),

    /// An element fingerprint could not be computed.
    #[error("fingerprint error: {0}")]
    Fingerprint(#[from] FingerprintError),
}

/// Convenience alias for merge results.
pub type MergeResult<T> = Result<T, MergeError>;
