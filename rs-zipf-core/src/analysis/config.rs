use serde::{Deserialize, Serialize};

use super::collocation::ScoreFn;
use super::ngram::validate_range;
use super::tokenizer::TokenizerOptions;
use crate::error::AnalysisError;

/// Parameters of a corpus analysis.
///
/// # Responsibilities
/// - Hold the n-gram order range, collocation window and score function
/// - Hold the minimum count used when rendering reports
/// - Reject invalid values when they are set, not when they are used
///
/// # Invariants
/// - `1 <= n_start < n_end <= 10`
/// - `radius >= 1`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
	n_start: usize,
	n_end: usize,
	radius: usize,
	/// Score used for collocation pairs.
	pub score_fn: ScoreFn,
	/// Entries seen fewer times are left out of rendered reports.
	pub min_count: u64,
	pub tokenizer: TokenizerOptions,
}

impl Default for AnalysisConfig {
	/// Bigrams and trigrams, a window of two tokens on each side, PMI.
	fn default() -> Self {
		Self {
			n_start: 2,
			n_end: 4,
			radius: 2,
			score_fn: ScoreFn::Pmi,
			min_count: 2,
			tokenizer: TokenizerOptions::default(),
		}
	}
}

impl AnalysisConfig {
	/// First n-gram order built.
	pub fn n_start(&self) -> usize {
		self.n_start
	}

	/// Exclusive last n-gram order.
	pub fn n_end(&self) -> usize {
		self.n_end
	}

	pub fn radius(&self) -> usize {
		self.radius
	}

	/// Sets the n-gram orders to `n_start..n_end`.
	///
	/// # Errors
	/// Returns `InvalidParameter` if `n_start < 1`, `n_end > 10` or the range is empty.
	pub fn set_ngram_range(&mut self, n_start: usize, n_end: usize) -> Result<(), AnalysisError> {
		validate_range(n_start, n_end)?;
		self.n_start = n_start;
		self.n_end = n_end;
		Ok(())
	}

	/// Sets the collocation window radius.
	///
	/// # Errors
	/// Returns `InvalidParameter` if `radius == 0`.
	pub fn set_radius(&mut self, radius: usize) -> Result<(), AnalysisError> {
		if radius == 0 {
			return Err(AnalysisError::invalid("radius", "window radius must be >= 1"));
		}
		self.radius = radius;
		Ok(())
	}

	/// Checks the invariants again, for configs that did not go through the
	/// setters (deserialized ones).
	pub(crate) fn validate(&self) -> Result<(), AnalysisError> {
		validate_range(self.n_start, self.n_end)?;
		if self.radius == 0 {
			return Err(AnalysisError::invalid("radius", "window radius must be >= 1"));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults() {
		let config = AnalysisConfig::default();
		assert_eq!((config.n_start(), config.n_end()), (2, 4));
		assert_eq!(config.radius(), 2);
		assert_eq!(config.min_count, 2);
		assert!(config.tokenizer.skip_comment_lines);
	}

	#[test]
	fn invalid_values_are_rejected_and_not_applied() {
		let mut config = AnalysisConfig::default();
		assert!(config.set_radius(0).is_err());
		assert!(config.set_ngram_range(0, 3).is_err());
		assert!(config.set_ngram_range(4, 4).is_err());
		assert!(config.set_ngram_range(2, 12).is_err());
		assert_eq!(config, AnalysisConfig::default());

		config.set_radius(5).unwrap();
		config.set_ngram_range(1, 10).unwrap();
		assert_eq!((config.radius(), config.n_start(), config.n_end()), (5, 1, 10));
		assert!(config.validate().is_ok());
	}

	#[test]
	fn deserialized_values_are_validated() {
		let mut bytes = postcard::to_stdvec(&AnalysisConfig::default()).unwrap();
		// n_start, n_end and radius are the leading varints
		assert_eq!(&bytes[..3], &[2, 4, 2]);
		bytes[2] = 0;
		let config: AnalysisConfig = postcard::from_bytes(&bytes).unwrap();
		assert_eq!(config.radius(), 0);
		let err = config.validate().unwrap_err();
		assert!(matches!(err, AnalysisError::InvalidParameter { name: "radius", .. }));

		bytes[2] = 2;
		bytes[1] = 2;
		let config: AnalysisConfig = postcard::from_bytes(&bytes).unwrap();
		assert!(config.validate().is_err());
	}
}
