//! Entity classifier: decides whether an entity identifier denotes a
//! user-created helper or a platform/integration-owned entity.
//!
//! Three rule layers:
//!
//! 1. Naming convention (authoritative): always-helper domains, with a
//!    config-entry exception for integration-instantiated entities.
//! 2. Attribute-shape heuristic for ambiguous sensor-like domains.
//! 3. Basic-attribute-subset check for the remaining helper-capable domains.
//!
//! All thresholds and curated tables live on [`ClassifierPolicy`]; the
//! defaults are empirically tuned against one installation and should be
//! treated as policy, not ground truth.

mod classifier;
mod policy;

pub use classifier::{Classification, EntityClassifier};
pub use policy::ClassifierPolicy;
