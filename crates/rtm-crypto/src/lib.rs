//! Hashing primitives for round-trip merging.
//!
//! Provides domain-separated BLAKE3 hashing and the element fingerprint used
//! to tell generator-written elements from hand-edited ones.
//!
//! All hashing wraps established libraries; there is no custom cryptography.

pub mod digest;
pub mod fingerprint;
pub mod hasher;

pub use digest::Digest;
pub use fingerprint::{ContentFingerprint, Fingerprint, FingerprintError, FingerprintResult};
pub use hasher::ContentHasher;
