//! Source scanner: enumerates every configuration surface that can mention
//! an entity and assembles the helper universe.
//!
//! ```text
//! config dir ──┐
//! packages/    ├──> discovered files ──> extractor ──> RefGraph edges
//! blueprints/  │
//! dashboards ──┘
//! .storage/core.config_entries ──> UI template sources
//! .storage/core.entity_registry ─┐
//! live StateStore ────────────────┴──> HelperCandidate universe
//! ```
//!
//! Failure policy throughout: log, skip the source, continue. A single
//! unreadable file or truncated document never aborts the run.

mod config;
mod discover;
mod error;
mod scanner;
mod storage;

pub use config::ScanConfig;
pub use error::{Result, ScanError};
pub use scanner::{ScanOutcome, SourceScanner};
pub use storage::{ConfigEntry, RegistryEntry, TemplateSource};
