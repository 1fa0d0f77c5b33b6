use std::collections::BTreeSet;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::frequency::RankFrequencyPoint;

/// Observed and predicted frequency at one rank.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZipfPoint {
	pub rank: usize,
	pub observed: u64,
	/// Prediction of the fitted power law `C / rank^s`.
	pub predicted: f64,
	/// Prediction of the classic law `f(1) / rank`.
	pub classic: f64,
}

/// Result of a log-log least-squares fit of frequency against rank.
///
/// The fitted law is `f(r) = exp(intercept) * r^(-exponent)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZipfFit {
	/// Fitted exponent `s` (1.0 for an ideal Zipfian text).
	pub exponent: f64,
	/// Fitted `ln C`.
	pub intercept: f64,
	/// Pearson correlation of ln(rank) and ln(frequency); -1.0 is a perfect power law.
	pub correlation: f64,
	/// Square of `correlation`.
	pub r_squared: f64,
	/// Mean squared error between ln(observed) and the fitted line.
	pub log_mse: f64,
	/// Mean squared error between ln(observed) and ln(f(1) / rank).
	pub classic_log_mse: f64,
	/// Input points dropped because their frequency was zero.
	pub skipped: usize,
	pub points: Vec<ZipfPoint>,
}

/// Outcome of a Zipf evaluation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ZipfEvaluation {
	Fitted(ZipfFit),
	/// Fewer than two distinct ranks with a positive frequency.
	InsufficientData { usable_points: usize },
}

impl ZipfEvaluation {
	pub fn fit(&self) -> Option<&ZipfFit> {
		match self {
			ZipfEvaluation::Fitted(fit) => Some(fit),
			ZipfEvaluation::InsufficientData { .. } => None,
		}
	}

	/// Single scalar summarizing the fit: R², in [0, 1], higher is better.
	pub fn goodness(&self) -> Option<f64> {
		self.fit().map(|fit| fit.r_squared)
	}
}

/// Fits the rank-frequency points against a power law.
///
/// # Behavior
/// - Points with a zero frequency are skipped (their log is undefined)
/// - Least squares on `(ln rank, ln frequency)`, with centered sums so that
///   frequencies spanning many orders of magnitude stay accurate
/// - A constant ln(frequency) has no rank dependence: slope 0, correlation 0
///
/// # Returns
/// `InsufficientData` if fewer than two distinct ranks remain.
pub fn evaluate(points: &[RankFrequencyPoint]) -> ZipfEvaluation {
	let usable: Vec<&RankFrequencyPoint> = points.iter().filter(|p| p.frequency() > 0).collect();
	let skipped = points.len() - usable.len();
	if skipped > 0 {
		warn!("zipf: skipped {skipped} zero-frequency points");
	}

	let distinct_ranks = usable.iter().map(|p| p.rank()).collect::<BTreeSet<_>>().len();
	if distinct_ranks < 2 {
		debug!("zipf: {distinct_ranks} distinct ranks, not enough to fit");
		return ZipfEvaluation::InsufficientData { usable_points: usable.len() };
	}

	let xs: Vec<f64> = usable.iter().map(|p| (p.rank() as f64).ln()).collect();
	let ys: Vec<f64> = usable.iter().map(|p| (p.frequency() as f64).ln()).collect();
	let n = xs.len() as f64;
	let flat = ys.iter().all(|y| *y == ys[0]);
	let mean_x = xs.iter().sum::<f64>() / n;
	let mean_y = if flat { ys[0] } else { ys.iter().sum::<f64>() / n };

	let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
	for (x, y) in xs.iter().zip(&ys) {
		let (dx, dy) = (x - mean_x, y - mean_y);
		sxx += dx * dx;
		syy += dy * dy;
		sxy += dx * dy;
	}

	// sxx > 0: at least two distinct ranks
	let slope = if flat { 0.0 } else { sxy / sxx };
	let intercept = mean_y - slope * mean_x;
	let correlation = if flat || syy == 0.0 { 0.0 } else { (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0) };

	// Anchor of the classic law: the lowest usable rank
	let (anchor_rank, anchor_freq) = usable
		.iter()
		.min_by_key(|p| p.rank())
		.map(|p| (p.rank() as f64, p.frequency() as f64))
		.unwrap_or((1.0, 1.0));
	let ln_anchor = anchor_freq.ln() + anchor_rank.ln();

	let mut log_sq = 0.0;
	let mut classic_sq = 0.0;
	let mut fitted_points = Vec::with_capacity(usable.len());
	for ((p, x), y) in usable.iter().zip(&xs).zip(&ys) {
		let ln_predicted = intercept + slope * x;
		let ln_classic = ln_anchor - x;
		log_sq += (y - ln_predicted).powi(2);
		classic_sq += (y - ln_classic).powi(2);
		fitted_points.push(ZipfPoint {
			rank: p.rank(),
			observed: p.frequency(),
			predicted: ln_predicted.exp(),
			classic: ln_classic.exp(),
		});
	}

	let fit = ZipfFit {
		exponent: -slope,
		intercept,
		correlation,
		r_squared: correlation * correlation,
		log_mse: log_sq / n,
		classic_log_mse: classic_sq / n,
		skipped,
		points: fitted_points,
	};
	debug!(
		"zipf: s={:.4} r={:.4} log_mse={:.6} over {} ranks",
		fit.exponent, fit.correlation, fit.log_mse, distinct_ranks
	);
	ZipfEvaluation::Fitted(fit)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn points(frequencies: &[u64]) -> Vec<RankFrequencyPoint> {
		frequencies
			.iter()
			.enumerate()
			.map(|(i, f)| RankFrequencyPoint::new(i + 1, *f).unwrap())
			.collect()
	}

	#[test]
	fn perfect_zipf_has_near_zero_deviation() {
		// 27720 is divisible by every rank in 1..=12
		let frequencies: Vec<u64> = (1..=12).map(|r| 27720 / r).collect();
		let evaluation = evaluate(&points(&frequencies));
		let fit = evaluation.fit().unwrap();

		assert!((fit.exponent - 1.0).abs() < 1e-9);
		assert!((fit.correlation + 1.0).abs() < 1e-9);
		assert!(fit.log_mse < 1e-18);
		assert!(fit.classic_log_mse < 1e-18);
		assert!((fit.points[3].predicted - 6930.0).abs() < 1e-6);
		assert!((fit.points[3].classic - 6930.0).abs() < 1e-6);
	}

	#[test]
	fn rounded_zipf_still_fits_well() {
		let frequencies: Vec<u64> = (1..=200).map(|r| (10_000.0 / r as f64).round() as u64).collect();
		let fit = evaluate(&points(&frequencies)).fit().cloned().unwrap();
		assert!((fit.exponent - 1.0).abs() < 0.01);
		assert!(fit.r_squared > 0.999);
		assert!(fit.log_mse < 1e-3);
	}

	#[test]
	fn uniform_frequencies_fit_markedly_worse() {
		let zipf: Vec<u64> = (1..=20).map(|r| 1000 / r).collect();
		let uniform = vec![50; 20];

		let zipf_score = evaluate(&points(&zipf)).goodness().unwrap();
		let uniform_eval = evaluate(&points(&uniform));
		let uniform_fit = uniform_eval.fit().unwrap();

		assert_eq!(uniform_fit.correlation, 0.0);
		assert_eq!(uniform_fit.exponent, 0.0);
		assert!(zipf_score - uniform_fit.r_squared > 0.9);
		assert!(uniform_fit.classic_log_mse > 1.0);
	}

	#[test]
	fn fewer_than_two_ranks_is_insufficient() {
		assert_eq!(evaluate(&[]), ZipfEvaluation::InsufficientData { usable_points: 0 });
		assert_eq!(evaluate(&points(&[42])), ZipfEvaluation::InsufficientData { usable_points: 1 });
		assert_eq!(evaluate(&points(&[0, 0, 0])), ZipfEvaluation::InsufficientData { usable_points: 0 });
		assert!(evaluate(&points(&[7])).goodness().is_none());
	}

	#[test]
	fn duplicate_ranks_do_not_count_twice() {
		let same_rank = vec![RankFrequencyPoint::new(1, 10).unwrap(), RankFrequencyPoint::new(1, 5).unwrap()];
		assert!(matches!(evaluate(&same_rank), ZipfEvaluation::InsufficientData { usable_points: 2 }));
	}

	#[test]
	fn zero_frequencies_are_skipped() {
		let fit = evaluate(&points(&[100, 50, 0, 25])).fit().cloned().unwrap();
		assert_eq!(fit.skipped, 1);
		assert_eq!(fit.points.len(), 3);
		assert!(fit.points.iter().all(|p| p.predicted.is_finite() && p.classic.is_finite()));
	}

	#[test]
	fn large_magnitudes_stay_stable() {
		let frequencies: Vec<u64> = (1..=1000).map(|r| 1_000_000_000_000 / r as u64).collect();
		let fit = evaluate(&points(&frequencies)).fit().cloned().unwrap();
		assert!((fit.exponent - 1.0).abs() < 1e-6);
		assert!(fit.correlation.is_finite());
		assert!(fit.log_mse < 1e-9);
	}
}
