//! Document model for round-trip merging.
//!
//! Provides the in-memory markup tree the merge engine reads and mutates:
//! an arena of element, text and comment nodes addressed by stable handles.
//!
//! # Key Types
//!
//! - [`Document`] -- Arena-backed ordered tree with a single root element
//! - [`NodeId`] -- Stable node handle, valid across mutations
//! - [`Element`] / [`Attributes`] -- Tag name and ordered attribute list
//! - [`Fragment`] -- Owned nested tree for building and snapshotting documents

pub mod attributes;
pub mod document;
pub mod error;
pub mod fragment;
pub mod node;

pub use attributes::{Attribute, Attributes};
pub use document::{Descendants, Document};
pub use error::{DomError, DomResult};
pub use fragment::Fragment;
pub use node::{Element, NodeId, NodeKind};
