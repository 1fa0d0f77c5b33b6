use std::sync::mpsc;
use std::thread;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::collocation::CollocationTable;
use super::config::AnalysisConfig;
use super::frequency::FrequencyTable;
use super::ngram::NGramTable;
use super::tokenizer::{TokenSequence, Tokenizer};
use super::zipf::{ZipfEvaluation, evaluate};
use crate::error::AnalysisError;
use crate::text::Text;

/// Every table computed for one corpus.
///
/// Built once by [`analyze_tokens`] / [`analyze_text`] and read-only
/// afterwards. Two reports never share state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CorpusReport {
	pub name: String,
	pub author: String,
	pub config: AnalysisConfig,
	pub token_count: usize,
	pub frequencies: FrequencyTable,
	pub zipf: ZipfEvaluation,
	/// One table per order in `config.n_start()..config.n_end()`.
	pub ngrams: Vec<NGramTable>,
	pub collocations: CollocationTable,
}

impl CorpusReport {
	/// Number of distinct tokens.
	pub fn vocabulary_size(&self) -> usize {
		self.frequencies.len()
	}

	/// The n-gram table of order `n`, if it was built.
	pub fn ngram_table(&self, n: usize) -> Option<&NGramTable> {
		self.ngrams.iter().find(|table| table.n() == n)
	}
}

/// Runs every component over an already tokenized corpus.
///
/// # Errors
/// Returns `InvalidParameter` if the configured n-gram range or radius is
/// invalid, checked before any table is built. An empty sequence is not an error: every table is empty and the
/// Zipf evaluation reports insufficient data.
pub fn analyze_tokens(
	name: &str,
	author: &str,
	tokens: &TokenSequence,
	config: &AnalysisConfig,
) -> Result<CorpusReport, AnalysisError> {
	config.validate()?;
	let ngrams = NGramTable::build_range(tokens, config.n_start(), config.n_end())?;
	let frequencies = FrequencyTable::count(tokens);
	let collocations = CollocationTable::build_with_frequencies(tokens, &frequencies, config.radius(), config.score_fn)?;
	let zipf = evaluate(&frequencies.rank_frequencies());

	info!(
		"analyzed '{name}': {} tokens, {} distinct, zipf goodness {:?}",
		tokens.len(),
		frequencies.len(),
		zipf.goodness()
	);

	Ok(CorpusReport {
		name: name.to_owned(),
		author: author.to_owned(),
		config: config.clone(),
		token_count: tokens.len(),
		frequencies,
		zipf,
		ngrams,
		collocations,
	})
}

/// Loads, tokenizes and analyzes a text.
///
/// # Errors
/// - `LoadFailure` if the text cannot be loaded; nothing is analyzed
/// - `InvalidParameter` as in [`analyze_tokens`]
pub fn analyze_text(text: &Text, config: &AnalysisConfig) -> Result<CorpusReport, AnalysisError> {
	let raw = text.load()?;
	let tokens = Tokenizer::new(config.tokenizer).tokenize(&raw);
	debug!("'{}' tokenized into {} tokens", text.name(), tokens.len());
	analyze_tokens(text.name(), text.author(), &tokens, config)
}

/// Analyzes several texts in parallel.
///
/// # Behavior
/// - Splits the texts into one chunk per CPU
/// - Spawns a thread per chunk; each thread analyzes its texts one by one
/// - Collects results over an MPSC channel
///
/// # Returns
/// One `(name, result)` per input text, in input order. A failing text does
/// not stop the others.
pub fn analyze_many(texts: Vec<Text>, config: &AnalysisConfig) -> Vec<(String, Result<CorpusReport, AnalysisError>)> {
	if texts.is_empty() {
		return Vec::new();
	}

	let names: Vec<String> = texts.iter().map(|t| t.name().to_owned()).collect();
	let chunk_size = texts.len().div_ceil(num_cpus::get().max(1));

	let (tx, rx) = mpsc::channel();
	for (chunk_index, chunk) in texts.chunks(chunk_size).enumerate() {
		let tx = tx.clone();
		let chunk: Vec<Text> = chunk.to_vec();
		let config = config.clone();
		let offset = chunk_index * chunk_size;

		thread::spawn(move || {
			for (i, text) in chunk.iter().enumerate() {
				// The receiver outlives every worker
				if tx.send((offset + i, analyze_text(text, &config))).is_err() {
					return;
				}
			}
		});
	}
	drop(tx);

	let mut results: Vec<Option<Result<CorpusReport, AnalysisError>>> = names.iter().map(|_| None).collect();
	for (index, result) in rx.iter() {
		results[index] = Some(result);
	}

	names
		.into_iter()
		.zip(results)
		.map(|(name, result)| {
			let result = result.unwrap_or_else(|| Err(AnalysisError::WorkerLost { name: name.clone() }));
			(name, result)
		})
		.collect()
}
