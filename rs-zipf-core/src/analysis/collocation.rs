use std::collections::{HashMap, HashSet};
use std::fmt;

use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::frequency::FrequencyTable;
use super::tokenizer::{Token, TokenSequence};
use crate::error::AnalysisError;

/// Association score computed for every collocation pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreFn {
	/// Pointwise mutual information, `ln(P(x,y) / (P(x) P(y)))`.
	#[default]
	Pmi,
	/// PMI divided by `-ln P(x,y)`, in `[-1, 1]`.
	///
	/// Marginals are taken over the pairs (`P(x,·)`), not over the unigrams,
	/// which is what keeps the value inside its bounds.
	Npmi,
	/// Raw co-occurrence count.
	Frequency,
}

impl ScoreFn {
	/// Parses `"pmi"`, `"npmi"` or `"frequency"` (case-insensitive).
	pub fn parse(value: &str) -> Result<Self, AnalysisError> {
		match value.trim().to_ascii_lowercase().as_str() {
			"pmi" => Ok(Self::Pmi),
			"npmi" => Ok(Self::Npmi),
			"frequency" => Ok(Self::Frequency),
			_ => Err(AnalysisError::invalid(
				"score",
				format!("{value:?}, expected one of: 'pmi', 'npmi', 'frequency'"),
			)),
		}
	}
}

impl fmt::Display for ScoreFn {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			ScoreFn::Pmi => "pmi",
			ScoreFn::Npmi => "npmi",
			ScoreFn::Frequency => "frequency",
		})
	}
}

/// Score of a pair, or an explicit marker when it cannot be computed
/// (zero expected co-occurrence, degenerate normalization).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Association {
	Score(f64),
	Undefined,
}

impl Association {
	pub fn score(&self) -> Option<f64> {
		match self {
			Association::Score(s) => Some(*s),
			Association::Undefined => None,
		}
	}

	fn from_value(value: f64) -> Self {
		if value.is_finite() { Association::Score(value) } else { Association::Undefined }
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
struct PairStats {
	count: u64,
	association: Association,
}

/// View of one ordered pair of a [`CollocationTable`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CollocationPair<'a> {
	pub left: &'a Token,
	pub right: &'a Token,
	pub count: u64,
	pub association: Association,
}

/// Co-occurrence counts of ordered token pairs inside a sliding window.
///
/// The token at position `i` is paired with every token at position `j`,
/// `0 < |i - j| <= radius`. Pairs are ordered `(token[i], token[j])`, so
/// each co-occurrence is seen from both sides and `count(x, y) == count(y, x)`.
///
/// # Invariants
/// - `radius >= 1`
/// - `total_pairs` is the sum of all counts
/// - Scores are computed once, after every count is final
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollocationTable {
	radius: usize,
	score_fn: ScoreFn,
	total_pairs: u64,
	#[serde(with = "indexmap::map::serde_seq")]
	pairs: IndexMap<(Token, Token), PairStats>,
}

impl CollocationTable {
	/// Counts and scores every pair within `radius` positions.
	///
	/// # Errors
	/// Returns `InvalidParameter` if `radius == 0`, before anything is counted.
	pub fn build(tokens: &TokenSequence, radius: usize, score_fn: ScoreFn) -> Result<Self, AnalysisError> {
		Self::build_with_frequencies(tokens, &FrequencyTable::count(tokens), radius, score_fn)
	}

	/// Same as [`build`](Self::build), reusing the unigram counts of `tokens`.
	pub fn build_with_frequencies(
		tokens: &TokenSequence,
		frequencies: &FrequencyTable,
		radius: usize,
		score_fn: ScoreFn,
	) -> Result<Self, AnalysisError> {
		if radius == 0 {
			return Err(AnalysisError::invalid("radius", "window radius must be >= 1"));
		}

		let tokens = tokens.as_slice();
		let mut counts: IndexMap<(Token, Token), u64> = IndexMap::new();
		for (i, left) in tokens.iter().enumerate() {
			let start = i.saturating_sub(radius);
			let end = i.saturating_add(radius).min(tokens.len() - 1);
			for (j, right) in tokens.iter().enumerate().take(end + 1).skip(start) {
				if j != i {
					*counts.entry((left.clone(), right.clone())).or_insert(0) += 1;
				}
			}
		}

		let total_pairs: u64 = counts.values().sum();
		// Counting goes both ways, so P(x,·) == P(·,x)
		let mut pair_marginals: HashMap<Token, u64> = HashMap::new();
		if score_fn == ScoreFn::Npmi {
			for ((left, _), count) in &counts {
				*pair_marginals.entry(left.clone()).or_insert(0) += count;
			}
		}
		let marginals = Marginals { frequencies, pairs: &pair_marginals, total_pairs };
		let mut undefined = 0;
		let pairs: IndexMap<(Token, Token), PairStats> = counts
			.into_iter()
			.map(|((left, right), count)| {
				let association = score(score_fn, count, &marginals, &left, &right);
				if association == Association::Undefined {
					undefined += 1;
				}
				((left, right), PairStats { count, association })
			})
			.collect();

		if undefined > 0 {
			warn!("collocations: {undefined} pairs have an undefined {score_fn} score");
		}
		debug!("collocations: radius={radius}, {} distinct pairs, {total_pairs} observations", pairs.len());
		Ok(Self { radius, score_fn, total_pairs, pairs })
	}

	pub fn radius(&self) -> usize {
		self.radius
	}

	pub fn score_fn(&self) -> ScoreFn {
		self.score_fn
	}

	/// Number of window-pair observations.
	pub fn total_pairs(&self) -> u64 {
		self.total_pairs
	}

	/// Number of distinct ordered pairs.
	pub fn len(&self) -> usize {
		self.pairs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.pairs.is_empty()
	}

	/// Looks up the ordered pair `(left, right)`.
	pub fn get(&self, left: &str, right: &str) -> Option<CollocationPair<'_>> {
		let key = (Token::new(left)?, Token::new(right)?);
		self.pairs.get_key_value(&key).map(pair_view)
	}

	/// Co-occurrence count of `(left, right)`, 0 if never seen.
	pub fn count(&self, left: &str, right: &str) -> u64 {
		self.get(left, right).map_or(0, |pair| pair.count)
	}

	/// Pairs in first-occurrence order.
	pub fn iter(&self) -> impl Iterator<Item = CollocationPair<'_>> {
		self.pairs.iter().map(pair_view)
	}

	/// Pairs by score descending, then count descending; undefined scores last.
	pub fn ranked(&self) -> Vec<CollocationPair<'_>> {
		let mut pairs: Vec<CollocationPair<'_>> = self.iter().collect();
		pairs.sort_by(|a, b| match (a.association.score(), b.association.score()) {
			(Some(x), Some(y)) => y.total_cmp(&x).then(b.count.cmp(&a.count)),
			(Some(_), None) => std::cmp::Ordering::Less,
			(None, Some(_)) => std::cmp::Ordering::Greater,
			(None, None) => b.count.cmp(&a.count),
		});
		pairs
	}

	/// For every token, the number of distinct tokens it co-occurs with,
	/// in first-occurrence order.
	pub fn partner_counts(&self) -> Vec<(&Token, usize)> {
		let mut partners: IndexMap<&Token, HashSet<&Token>> = IndexMap::new();
		for (left, right) in self.pairs.keys() {
			partners.entry(left).or_default().insert(right);
		}
		partners.into_iter().map(|(token, set)| (token, set.len())).collect()
	}
}

fn pair_view<'a>((key, stats): (&'a (Token, Token), &'a PairStats)) -> CollocationPair<'a> {
	CollocationPair { left: &key.0, right: &key.1, count: stats.count, association: stats.association }
}

struct Marginals<'a> {
	frequencies: &'a FrequencyTable,
	pairs: &'a HashMap<Token, u64>,
	total_pairs: u64,
}

impl Marginals<'_> {
	fn pair_probability(&self, token: &Token) -> f64 {
		self.pairs.get(token).map_or(0.0, |&count| count as f64 / self.total_pairs as f64)
	}
}

fn score(score_fn: ScoreFn, count: u64, marginals: &Marginals, left: &Token, right: &Token) -> Association {
	if score_fn == ScoreFn::Frequency {
		return Association::Score(count as f64);
	}
	if marginals.total_pairs == 0 {
		return Association::Undefined;
	}

	let p_joint = count as f64 / marginals.total_pairs as f64;
	let expected = match score_fn {
		ScoreFn::Npmi => marginals.pair_probability(left) * marginals.pair_probability(right),
		_ => marginals.frequencies.probability(left.as_str()) * marginals.frequencies.probability(right.as_str()),
	};
	if expected <= 0.0 {
		return Association::Undefined;
	}

	let pmi = (p_joint / expected).ln();
	match score_fn {
		ScoreFn::Pmi => Association::from_value(pmi),
		// -ln(1) == 0: a pair that is the only observation cannot be normalized
		ScoreFn::Npmi if p_joint >= 1.0 => Association::Undefined,
		ScoreFn::Npmi => Association::from_value((pmi / -p_joint.ln()).clamp(-1.0, 1.0)),
		ScoreFn::Frequency => Association::Score(count as f64),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::analysis::tokenizer::tokenize;

	#[test]
	fn radius_one_pairs_neighbours_only() {
		let table = CollocationTable::build(&tokenize("a b c"), 1, ScoreFn::Pmi).unwrap();
		for (l, r) in [("a", "b"), ("b", "a"), ("b", "c"), ("c", "b")] {
			assert_eq!(table.count(l, r), 1, "({l}, {r})");
		}
		assert_eq!(table.count("a", "c"), 0);
		assert_eq!(table.count("c", "a"), 0);
		assert_eq!(table.len(), 4);
		assert_eq!(table.total_pairs(), 4);
	}

	#[test]
	fn pmi_matches_closed_form() {
		let table = CollocationTable::build(&tokenize("a b c"), 1, ScoreFn::Pmi).unwrap();
		// P(a,b) = 1/4, P(a) = P(b) = 1/3
		let expected = (0.25_f64 / (1.0 / 9.0)).ln();
		let score = table.get("a", "b").unwrap().association.score().unwrap();
		assert!((score - expected).abs() < 1e-12);
	}

	#[test]
	fn counts_are_symmetric() {
		let table = CollocationTable::build(&tokenize("the cat and the dog and the bird"), 2, ScoreFn::Pmi).unwrap();
		for pair in table.iter() {
			assert_eq!(pair.count, table.count(pair.right.as_str(), pair.left.as_str()));
		}
	}

	#[test]
	fn wider_window_reaches_further() {
		let table = CollocationTable::build(&tokenize("a b c d"), 2, ScoreFn::Frequency).unwrap();
		assert_eq!(table.count("a", "c"), 1);
		assert_eq!(table.count("a", "d"), 0);
		assert_eq!(table.total_pairs(), 10);
		assert_eq!(table.get("b", "d").unwrap().association, Association::Score(1.0));
	}

	#[test]
	fn zero_radius_is_rejected() {
		let err = CollocationTable::build(&tokenize("a b"), 0, ScoreFn::Pmi).unwrap_err();
		assert!(matches!(err, AnalysisError::InvalidParameter { name: "radius", .. }));
	}

	#[test]
	fn degenerate_npmi_is_undefined_not_nan() {
		let table = CollocationTable::build(&tokenize("echo echo"), 1, ScoreFn::Npmi).unwrap();
		let pair = table.get("echo", "echo").unwrap();
		assert_eq!(pair.count, 2);
		assert_eq!(pair.association, Association::Undefined);
	}

	#[test]
	fn npmi_stays_in_range() {
		let table = CollocationTable::build(&tokenize("new york is in new york state"), 1, ScoreFn::Npmi).unwrap();
		for pair in table.iter() {
			let score = pair.association.score().unwrap();
			assert!((-1.0..=1.0).contains(&score), "{score}");
		}
	}

	#[test]
	fn npmi_of_exclusive_partners_is_one() {
		// a and b only ever meet each other: P(a,b) == P(a,·) == P(·,b) == 1/2
		let table = CollocationTable::build(&tokenize("a b a"), 1, ScoreFn::Npmi).unwrap();
		let score = table.get("a", "b").unwrap().association.score().unwrap();
		assert!((score - 1.0).abs() < 1e-12, "{score}");
	}

	#[test]
	fn npmi_bounded_on_every_small_sequence() {
		let alphabet = ["a", "b", "c"];
		for len in 2..=5u32 {
			for code in 0..3usize.pow(len) {
				let words: Vec<&str> = (0..len).map(|k| alphabet[code / 3usize.pow(k) % 3]).collect();
				let text = words.join(" ");
				for radius in 1..=3 {
					let table = CollocationTable::build(&tokenize(&text), radius, ScoreFn::Npmi).unwrap();
					for pair in table.iter() {
						if let Some(score) = pair.association.score() {
							assert!((-1.0..=1.0).contains(&score), "{text:?} r={radius} ({}, {}) = {score}", pair.left, pair.right);
						}
					}
				}
			}
		}
	}

	#[test]
	fn huge_radius_covers_whole_sequence() {
		let table = CollocationTable::build(&tokenize("a b c"), usize::MAX, ScoreFn::Frequency).unwrap();
		assert_eq!(table.count("a", "c"), 1);
		assert_eq!(table.count("c", "a"), 1);
		assert_eq!(table.len(), 6);
		assert_eq!(table.total_pairs(), 6);
	}

	#[test]
	fn missing_marginals_are_undefined() {
		let tokens = tokenize("a b");
		let table = CollocationTable::build_with_frequencies(&tokens, &FrequencyTable::default(), 1, ScoreFn::Pmi).unwrap();
		assert!(table.iter().all(|p| p.association == Association::Undefined));
	}

	#[test]
	fn empty_and_single_token_sequences_are_empty() {
		assert!(CollocationTable::build(&TokenSequence::default(), 3, ScoreFn::Pmi).unwrap().is_empty());
		assert!(CollocationTable::build(&tokenize("alone"), 3, ScoreFn::Pmi).unwrap().is_empty());
	}

	#[test]
	fn ranked_puts_undefined_last() {
		let tokens = tokenize("a b a b c");
		let table = CollocationTable::build_with_frequencies(&tokens, &FrequencyTable::count(&tokenize("a b")), 1, ScoreFn::Pmi).unwrap();
		let ranked = table.ranked();
		assert!(ranked.first().unwrap().association.score().is_some());
		assert_eq!(ranked.last().unwrap().association, Association::Undefined);
	}

	#[test]
	fn partner_counts_follow_first_occurrence() {
		let table = CollocationTable::build(&tokenize("a b a c"), 1, ScoreFn::Pmi).unwrap();
		let partners: Vec<(&str, usize)> = table.partner_counts().into_iter().map(|(t, k)| (t.as_str(), k)).collect();
		assert_eq!(partners, vec![("a", 2), ("b", 1), ("c", 1)]);
	}

	#[test]
	fn score_fn_parsing() {
		assert_eq!(ScoreFn::parse("NPMI").unwrap(), ScoreFn::Npmi);
		assert_eq!(ScoreFn::parse(" frequency ").unwrap(), ScoreFn::Frequency);
		assert!(ScoreFn::parse("dice").is_err());
		assert_eq!(ScoreFn::default().to_string(), "pmi");
	}
}
