//! Corpus statistics library.
//!
//! This crate analyzes a natural-language text and provides:
//! - Word tokenization and frequency counting
//! - A Zipf's law goodness-of-fit check (log-log regression)
//! - N-gram tables with occurrence counts
//! - Windowed collocation tables scored by association (PMI, NPMI)
//! - Loading of texts and export of the computed tables
//!
//! Every table is built in a single pass from explicit inputs and is
//! read-only afterwards. Nothing is shared between two analyzed corpora.

/// Statistics engine: tokenizer, counters, Zipf evaluator, n-grams,
/// collocations and the per-corpus orchestration.
pub mod analysis;

/// Error type shared by every fallible operation of the crate.
pub mod error;

/// Text metadata and raw-text loading.
pub mod text;

/// Results sinks (plain-text reports, binary export).
pub mod sink;

/// I/O utilities (path helpers, directory listing).
pub mod io;

pub use error::AnalysisError;
