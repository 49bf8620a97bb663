//! Report emitter: serializes reconciler output into a machine-readable
//! JSON report, plain-text review lists, a human-readable summary, and a
//! generated review dashboard, then surfaces the run's status back into
//! the live state table.
//!
//! Every output file is fully overwritten each run, and each write is
//! attempted independently: one failing file never blocks the others.

mod emitter;
mod error;
mod types;

pub use emitter::{EmitOutcome, ReportEmitter, STATUS_ENTITY_ID};
pub use error::{ReportError, Result};
pub use types::{AnalysisReport, AnalysisTotals, HelperDetail};
