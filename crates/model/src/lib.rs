//! # Helper Audit Model
//!
//! Shared data model for the helper reachability analyzer.
//!
//! ## Architecture
//!
//! ```text
//! StateStore (live entities)          .storage documents
//!     │                                    │
//!     └──> HelperCandidate[] ──┐           │
//!                              ├──> Reconciler ──> HelperClassification
//!     Sources ──> RefGraph ────┘
//! ```
//!
//! - Nodes: entity identifiers (`EntityId`)
//! - Edges: `ReferenceEdge` (source mentions entity), provenance-tagged
//! - Output: per-helper `HelperClassification` with a `HelperCategory`

mod classification;
mod entity;
mod error;
mod graph;
mod source;
mod store;

pub use classification::{HelperCategory, HelperClassification, SourceRefs};
pub use entity::{Attributes, EntityId, HelperCandidate};
pub use error::{ModelError, Result};
pub use graph::RefGraph;
pub use source::{ReferenceEdge, ReferenceSource, SourceKind};
pub use store::{EntityState, MemoryStateStore, StateStore};
