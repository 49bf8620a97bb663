//! Reachability reconciler: aggregates reference edges across all sources
//! and classifies every helper into actively-used, dashboard-only, or
//! orphaned (or the `error` pseudo-category when attribute lookup failed).
//!
//! The three-way split is the point: a binary used/unused view would flag
//! dashboard-displayed helpers as orphaned and mark entities for deletion
//! that are only unreferenced by automation logic.

mod reconciler;

pub use reconciler::{reconcile, ReconcileSummary};
