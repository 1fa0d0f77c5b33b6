use std::fmt;

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use super::tokenizer::{Token, TokenSequence};
use crate::error::AnalysisError;

/// Exclusive upper bound accepted by [`NGramTable::build_range`].
pub const MAX_NGRAM_END: usize = 10;

/// An ordered tuple of tokens. `("the", "cat")` and `("cat", "the")` differ.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NGram(Vec<Token>);

impl NGram {
	/// # Errors
	/// Returns `InvalidParameter` for an empty token list.
	pub fn new(tokens: Vec<Token>) -> Result<Self, AnalysisError> {
		if tokens.is_empty() {
			return Err(AnalysisError::invalid("n", "an n-gram holds at least one token"));
		}
		Ok(Self(tokens))
	}

	pub fn tokens(&self) -> &[Token] {
		&self.0
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}
}

impl fmt::Display for NGram {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, token) in self.0.iter().enumerate() {
			if i > 0 {
				f.write_str(" ")?;
			}
			f.write_str(token.as_str())?;
		}
		Ok(())
	}
}

/// Occurrence counts of every n-gram of a fixed order `n`.
///
/// # Invariants
/// - `n >= 1`
/// - Sum of counts is `len - n + 1` when `n <= len`, otherwise the table is empty
/// - Entries are kept in first-occurrence order
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NGramTable {
	n: usize,
	#[serde(with = "indexmap::map::serde_seq")]
	counts: IndexMap<NGram, u64>,
}

impl NGramTable {
	/// Counts every contiguous window of `n` tokens.
	///
	/// # Errors
	/// Returns `InvalidParameter` if `n == 0`, before anything is counted.
	pub fn build(tokens: &TokenSequence, n: usize) -> Result<Self, AnalysisError> {
		if n == 0 {
			return Err(AnalysisError::invalid("n", "n-gram order must be >= 1"));
		}

		let mut counts: IndexMap<NGram, u64> = IndexMap::new();
		// `windows` yields nothing when n > len
		for window in tokens.as_slice().windows(n) {
			*counts.entry(NGram(window.to_vec())).or_insert(0) += 1;
		}

		debug!("ngrams: n={n}, {} distinct over {} tokens", counts.len(), tokens.len());
		Ok(Self { n, counts })
	}

	/// Builds one table per order in `n_start..n_end`.
	///
	/// # Errors
	/// Returns `InvalidParameter` if `n_start < 1`, `n_end > 10`
	/// or the range is empty.
	pub fn build_range(tokens: &TokenSequence, n_start: usize, n_end: usize) -> Result<Vec<Self>, AnalysisError> {
		validate_range(n_start, n_end)?;
		(n_start..n_end).map(|n| Self::build(tokens, n)).collect()
	}

	pub fn n(&self) -> usize {
		self.n
	}

	/// Number of distinct n-grams.
	pub fn len(&self) -> usize {
		self.counts.len()
	}

	pub fn is_empty(&self) -> bool {
		self.counts.is_empty()
	}

	/// Sum of all counts.
	pub fn total(&self) -> u64 {
		self.counts.values().sum()
	}

	/// Count of the n-gram spelled by `words`, 0 if absent.
	pub fn get<S: AsRef<str>>(&self, words: &[S]) -> u64 {
		let tokens: Option<Vec<Token>> = words.iter().map(|w| Token::new(w.as_ref())).collect();
		tokens.and_then(|t| self.counts.get(&NGram(t)).copied()).unwrap_or(0)
	}

	/// Iterates `(ngram, count)` in first-occurrence order.
	pub fn iter(&self) -> impl Iterator<Item = (&NGram, u64)> {
		self.counts.iter().map(|(ngram, count)| (ngram, *count))
	}

	/// Entries by count descending, ties in first-occurrence order.
	pub fn most_common(&self) -> Vec<(&NGram, u64)> {
		let mut entries: Vec<(&NGram, u64)> = self.iter().collect();
		entries.sort_by(|a, b| b.1.cmp(&a.1));
		entries
	}

	/// Like [`most_common`](Self::most_common), keeping counts `>= min_count`.
	pub fn entries_at_least(&self, min_count: u64) -> Vec<(&NGram, u64)> {
		self.most_common().into_iter().filter(|(_, count)| *count >= min_count).collect()
	}
}

pub(crate) fn validate_range(n_start: usize, n_end: usize) -> Result<(), AnalysisError> {
	if n_start < 1 {
		return Err(AnalysisError::invalid("n_start", "must be >= 1"));
	}
	if n_end > MAX_NGRAM_END {
		return Err(AnalysisError::invalid("n_end", format!("must be <= {MAX_NGRAM_END}")));
	}
	if n_start >= n_end {
		return Err(AnalysisError::invalid("n_end", format!("must be greater than n_start ({n_start})")));
	}
	Ok(())
}
