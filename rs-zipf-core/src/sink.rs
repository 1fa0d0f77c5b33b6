use std::fmt::{self, Write};
use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::analysis::{CorpusReport, ZipfEvaluation};
use crate::error::AnalysisError;
use crate::io::output_file;

/// Receiver of computed corpus reports (display, export).
///
/// The analysis has no opinion on presentation; a sink decides what to
/// keep and in which format.
pub trait ResultsSink {
	/// Consumes one report.
	///
	/// # Errors
	/// Returns `Export` if the report cannot be written.
	fn accept(&mut self, report: &CorpusReport) -> Result<(), AnalysisError>;
}

/// Writes human readable reports into a directory.
///
/// For a corpus named `War and Peace` it produces:
/// - `War_and_Peace_zipf_result.txt`
/// - `War_and_Peace_n_grams_result.txt`
/// - `War_and_Peace_collocations_result.txt`
///
/// N-grams seen fewer than `config.min_count` times are left out.
#[derive(Debug)]
pub struct TextReportSink {
	output_dir: PathBuf,
	written: Vec<PathBuf>,
}

impl TextReportSink {
	pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
		Self { output_dir: output_dir.as_ref().to_path_buf(), written: Vec::new() }
	}

	/// Files written so far, in order.
	pub fn written(&self) -> &[PathBuf] {
		&self.written
	}

	fn write<F>(&mut self, report: &CorpusReport, suffix: &str, render: F) -> Result<(), AnalysisError>
	where
		F: Fn(&CorpusReport) -> Result<String, fmt::Error>,
	{
		let path = output_file(&self.output_dir, &report.name, suffix, "txt");
		let contents = render(report).map_err(|e| AnalysisError::export(&path, e))?;
		fs::create_dir_all(&self.output_dir).map_err(|e| AnalysisError::export(&self.output_dir, e))?;
		fs::write(&path, contents).map_err(|e| AnalysisError::export(&path, e))?;
		info!("wrote {}", path.display());
		self.written.push(path);
		Ok(())
	}
}

impl ResultsSink for TextReportSink {
	fn accept(&mut self, report: &CorpusReport) -> Result<(), AnalysisError> {
		self.write(report, "_zipf_result", render_zipf)?;
		self.write(report, "_n_grams_result", render_ngrams)?;
		self.write(report, "_collocations_result", render_collocations)
	}
}

/// Fit summary followed by one `rank token observed predicted classic` line per rank.
pub fn render_zipf(report: &CorpusReport) -> Result<String, fmt::Error> {
	let mut out = String::new();
	writeln!(out, "Zipf's law analysis for \"{}\" by {}", report.name, report.author)?;
	writeln!(out, "{} tokens, {} distinct\n", report.token_count, report.vocabulary_size())?;

	match &report.zipf {
		ZipfEvaluation::InsufficientData { usable_points } => {
			writeln!(out, "Insufficient data: {usable_points} usable rank(s), at least 2 needed")?;
		}
		ZipfEvaluation::Fitted(fit) => {
			writeln!(out, "exponent:        {:.4}", fit.exponent)?;
			writeln!(out, "correlation:     {:.4}", fit.correlation)?;
			writeln!(out, "r squared:       {:.4}", fit.r_squared)?;
			writeln!(out, "log mse:         {:.6}", fit.log_mse)?;
			writeln!(out, "classic log mse: {:.6}", fit.classic_log_mse)?;
			writeln!(out, "\nrank\ttoken\tobserved\tpredicted\tclassic")?;

			let ranked = report.frequencies.ranked_tokens();
			for point in &fit.points {
				let token = ranked.get(point.rank - 1).map_or("?", |(t, _)| t.as_str());
				writeln!(
					out,
					"{}\t{}\t{}\t{:.2}\t{:.2}",
					point.rank, token, point.observed, point.predicted, point.classic
				)?;
			}
		}
	}
	Ok(out)
}

/// One section per n-gram order, most common first.
pub fn render_ngrams(report: &CorpusReport) -> Result<String, fmt::Error> {
	let mut out = String::new();
	writeln!(out, "N-grams analysis for \"{}\" by {}", report.name, report.author)?;

	for table in &report.ngrams {
		writeln!(out, "\n{}-GRAMs\n--------", table.n())?;
		for (ngram, count) in table.entries_at_least(report.config.min_count) {
			writeln!(out, "{ngram}: {count}")?;
		}
	}
	out.push_str("\n\n");
	Ok(out)
}

/// Distinct partner count per token, then the scored pairs.
pub fn render_collocations(report: &CorpusReport) -> Result<String, fmt::Error> {
	let table = &report.collocations;
	let mut out = String::new();
	writeln!(out, "Collocations analysis for \"{}\" by {}\n", report.name, report.author)?;

	for (token, partners) in table.partner_counts() {
		writeln!(out, "{token} occurs in {partners} collocations")?;
	}

	writeln!(out, "\n{} scores, window radius {}\n", table.score_fn(), table.radius())?;
	for pair in table.ranked().into_iter().filter(|p| p.count >= report.config.min_count) {
		let score = pair.association.score().map_or_else(|| "undefined".to_owned(), |s| format!("{s:.4}"));
		writeln!(out, "{} {}: {} ({score})", pair.left, pair.right, pair.count)?;
	}
	out.push_str("\n\n");
	Ok(out)
}

/// Stores reports as compact binary files (`<dir>/<name>.bin`) with postcard.
#[derive(Debug)]
pub struct BinarySink {
	output_dir: PathBuf,
}

impl BinarySink {
	pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
		Self { output_dir: output_dir.as_ref().to_path_buf() }
	}

	/// Path a report named `name` is written to.
	pub fn path_for(&self, name: &str) -> PathBuf {
		output_file(&self.output_dir, name, "", "bin")
	}

	/// Reads back a report written by this sink.
	///
	/// # Errors
	/// Returns `LoadFailure` if the file is missing or cannot be decoded.
	pub fn read<P: AsRef<Path>>(path: P) -> Result<CorpusReport, AnalysisError> {
		let path = path.as_ref();
		let failure = |reason: String| AnalysisError::LoadFailure { source_name: path.display().to_string(), reason };
		let bytes = fs::read(path).map_err(|e| failure(e.to_string()))?;
		postcard::from_bytes(&bytes).map_err(|e| failure(e.to_string()))
	}
}

impl ResultsSink for BinarySink {
	fn accept(&mut self, report: &CorpusReport) -> Result<(), AnalysisError> {
		let path = self.path_for(&report.name);
		let bytes = postcard::to_stdvec(report).map_err(|e| AnalysisError::export(&path, e))?;
		fs::create_dir_all(&self.output_dir).map_err(|e| AnalysisError::export(&self.output_dir, e))?;
		fs::write(&path, bytes).map_err(|e| AnalysisError::export(&path, e))?;
		info!("wrote {} ({} tokens)", path.display(), report.token_count);
		Ok(())
	}
}
