use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::tokenizer::{Token, TokenSequence};
use crate::error::AnalysisError;

/// One point of the rank-frequency relation.
///
/// # Invariants
/// - `rank >= 1`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankFrequencyPoint {
	rank: usize,
	frequency: u64,
}

impl RankFrequencyPoint {
	/// # Errors
	/// Returns `InvalidParameter` if `rank == 0`.
	pub fn new(rank: usize, frequency: u64) -> Result<Self, AnalysisError> {
		if rank == 0 {
			return Err(AnalysisError::invalid("rank", "ranks start at 1"));
		}
		Ok(Self { rank, frequency })
	}

	pub fn rank(&self) -> usize {
		self.rank
	}

	pub fn frequency(&self) -> u64 {
		self.frequency
	}
}

/// Occurrence count of every distinct token of a sequence.
///
/// Entries are kept in first-occurrence order, which is what makes the
/// ranking tie-break stable.
///
/// # Invariants
/// - Sum of counts equals the length of the counted sequence
/// - Every count is >= 1
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrequencyTable {
	counts: IndexMap<Token, u64>,
	total: u64,
}

impl FrequencyTable {
	/// Counts tokens in a single pass.
	pub fn count(tokens: &TokenSequence) -> Self {
		let mut counts: IndexMap<Token, u64> = IndexMap::new();
		for token in tokens {
			*counts.entry(token.clone()).or_insert(0) += 1;
		}
		Self { counts, total: tokens.len() as u64 }
	}

	/// Occurrences of `token`, 0 if it never appeared.
	pub fn get(&self, token: &str) -> u64 {
		self.counts.get(token).copied().unwrap_or(0)
	}

	/// Number of counted tokens (length of the sequence).
	pub fn total(&self) -> u64 {
		self.total
	}

	/// Number of distinct tokens.
	pub fn len(&self) -> usize {
		self.counts.len()
	}

	pub fn is_empty(&self) -> bool {
		self.counts.is_empty()
	}

	/// Relative frequency of `token` in the sequence, 0.0 for an empty table.
	pub fn probability(&self, token: &str) -> f64 {
		if self.total == 0 {
			return 0.0;
		}
		self.get(token) as f64 / self.total as f64
	}

	/// Iterates `(token, count)` in first-occurrence order.
	pub fn iter(&self) -> impl Iterator<Item = (&Token, u64)> {
		self.counts.iter().map(|(token, count)| (token, *count))
	}

	/// Tokens with their rank-frequency point.
	///
	/// Sorted by frequency descending; equal frequencies keep first-occurrence
	/// order (stable sort), so the output is identical across runs.
	pub fn ranked_tokens(&self) -> Vec<(&Token, RankFrequencyPoint)> {
		let mut entries: Vec<(&Token, u64)> = self.iter().collect();
		entries.sort_by(|a, b| b.1.cmp(&a.1));

		entries
			.into_iter()
			.enumerate()
			.map(|(i, (token, frequency))| (token, RankFrequencyPoint { rank: i + 1, frequency }))
			.collect()
	}

	/// Rank-frequency points, rank 1 first.
	pub fn rank_frequencies(&self) -> Vec<RankFrequencyPoint> {
		self.ranked_tokens().into_iter().map(|(_, point)| point).collect()
	}
}
