use std::fmt;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::AnalysisError;
use crate::io;

/// Where the raw text of a corpus comes from.
#[derive(Clone, Debug, PartialEq)]
pub enum TextSource {
	/// A UTF-8 text file on disk.
	File(PathBuf),
	/// An http(s) URL. Requires the `remote` feature.
	Url(String),
}

impl fmt::Display for TextSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TextSource::File(path) => write!(f, "{}", path.display()),
			TextSource::Url(url) => write!(f, "{url}"),
		}
	}
}

/// A corpus to analyze: a name, an author and the source of its raw text.
///
/// The text itself is not kept here; it is loaded on demand by [`Text::load`]
/// so that building a `Text` never touches the filesystem or the network.
#[derive(Clone, Debug, PartialEq)]
pub struct Text {
	name: String,
	author: String,
	source: TextSource,
}

impl Text {
	/// Creates a text with an explicit source. The author defaults to `"Unknown"`.
	///
	/// # Errors
	/// Returns `InvalidParameter` if the name is blank.
	pub fn new(name: &str, source: TextSource) -> Result<Self, AnalysisError> {
		if name.trim().is_empty() {
			return Err(AnalysisError::invalid("name", "text name cannot be empty"));
		}
		Ok(Self { name: name.to_owned(), author: "Unknown".to_owned(), source })
	}

	/// Creates a text backed by a file; the name is the file stem.
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AnalysisError> {
		let path = path.as_ref();
		let name = io::file_stem(path).map_err(|e| AnalysisError::LoadFailure {
			source_name: path.display().to_string(),
			reason: e.to_string(),
		})?;
		Self::new(&name, TextSource::File(path.to_path_buf()))
	}

	/// Sets the author.
	pub fn with_author(mut self, author: &str) -> Self {
		self.author = author.to_owned();
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn author(&self) -> &str {
		&self.author
	}

	pub fn source(&self) -> &TextSource {
		&self.source
	}

	/// Loads the raw text.
	///
	/// # Errors
	/// Returns `LoadFailure` if the file is missing, is not valid UTF-8, or the
	/// URL cannot be fetched. Nothing is retried.
	pub fn load(&self) -> Result<String, AnalysisError> {
		let failure = |reason: String| AnalysisError::LoadFailure {
			source_name: self.source.to_string(),
			reason,
		};

		let raw = match &self.source {
			TextSource::File(path) => io::read_text(path).map_err(|e| failure(e.to_string()))?,
			TextSource::Url(url) => fetch(url).map_err(failure)?,
		};

		debug!("loaded {} bytes for '{}' from {}", raw.len(), self.name, self.source);
		Ok(raw)
	}
}

impl fmt::Display for Text {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Text: {} by {}", self.name, self.author)
	}
}

#[cfg(feature = "remote")]
fn fetch(url: &str) -> Result<String, String> {
	let response = reqwest::blocking::get(url)
		.and_then(|r| r.error_for_status())
		.map_err(|e| e.to_string())?;
	response.text().map_err(|e| e.to_string())
}

#[cfg(not(feature = "remote"))]
fn fetch(_url: &str) -> Result<String, String> {
	Err("remote sources need the `remote` feature".to_owned())
}
