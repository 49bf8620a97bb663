//! Command-line front end for the helper reachability analyzer: snapshot
//! loading, policy overrides, pipeline orchestration, and the deletion
//! planner.

pub mod pipeline;
pub mod policy;
pub mod preview;
pub mod store;
