//! Text-statistics engine.
//!
//! Components, leaves first:
//! - Tokenization (`Token`, `TokenSequence`, `Tokenizer`)
//! - Frequency counting and rank-frequency pairs (`FrequencyTable`)
//! - Zipf's law evaluation (`ZipfEvaluation`)
//! - N-gram tables (`NGramTable`)
//! - Windowed collocations (`CollocationTable`)
//! - Per-corpus orchestration (`CorpusReport`, `analyze_text`, `analyze_many`)

/// Normalizes raw text into a sequence of word tokens.
pub mod tokenizer;

/// Token occurrence counts and deterministic rank-frequency pairs.
pub mod frequency;

/// Log-log regression of frequency on rank and fit quality metrics.
pub mod zipf;

/// Contiguous n-token windows with occurrence counts.
pub mod ngram;

/// Ordered token pairs inside a sliding window, scored by association.
pub mod collocation;

/// Validated analysis parameters.
pub mod config;

/// Runs every component for one or many corpora.
pub mod corpus;

pub use collocation::{Association, CollocationPair, CollocationTable, ScoreFn};
pub use config::AnalysisConfig;
pub use corpus::{CorpusReport, analyze_many, analyze_text, analyze_tokens};
pub use frequency::{FrequencyTable, RankFrequencyPoint};
pub use ngram::{NGram, NGramTable};
pub use tokenizer::{Token, TokenSequence, Tokenizer, TokenizerOptions, tokenize};
pub use zipf::{ZipfEvaluation, ZipfFit, ZipfPoint, evaluate};
