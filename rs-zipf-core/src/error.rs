use std::path::PathBuf;

/// Errors raised by the analysis pipeline.
///
/// Data sparsity is not an error: an unfit Zipf evaluation or an
/// undefined association score are reported as result variants so callers
/// can still render partial output.
#[derive(thiserror::Error, Debug)]
pub enum AnalysisError {
	/// A parameter was rejected before any counting started.
	#[error("invalid parameter `{name}`: {reason}")]
	InvalidParameter { name: &'static str, reason: String },

	/// The raw-text loader could not produce text.
	#[error("failed to load {source_name}: {reason}")]
	LoadFailure { source_name: String, reason: String },

	/// A results sink could not write or encode a report.
	#[error("failed to export {}: {reason}", .path.display())]
	Export { path: PathBuf, reason: String },

	/// A parallel analysis worker ended without sending its report.
	#[error("analysis worker for {name} stopped before reporting")]
	WorkerLost { name: String },
}

impl AnalysisError {
	pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
		Self::InvalidParameter { name, reason: reason.into() }
	}

	pub(crate) fn export(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
		Self::Export { path: path.into(), reason: reason.to_string() }
	}
}
