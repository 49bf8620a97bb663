//! Reference extractor: pulls entity identifiers out of arbitrary
//! configuration text with a layered regex battery.
//!
//! Extraction is deliberately heuristic, not a parse of the host's YAML or
//! templating language: malformed documents still yield whatever references
//! the raw text exposes, so a single bad source never aborts an analysis.
//! Every match is filtered through a helper-domain allow-list before it
//! enters the result set.

mod extractor;

pub use extractor::{ExtractorConfig, ReferenceExtractor};
