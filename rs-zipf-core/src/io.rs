use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

/// Reads a whole text file as UTF-8.
///
/// Invalid UTF-8 is reported as `io::ErrorKind::InvalidData`.
pub(crate) fn read_text<P: AsRef<Path>>(filename: P) -> io::Result<String> {
	fs::read_to_string(filename)
}

/// Turns a corpus name into something usable as a file name.
///
/// Spaces become `_`, path separators are removed.
pub fn sanitize_name(name: &str) -> String {
	name.trim()
		.chars()
		.filter(|c| *c != '/' && *c != '\\')
		.map(|c| if c.is_whitespace() { '_' } else { c })
		.collect()
}

/// Builds `<dir>/<sanitized name><suffix>.<extension>`.
///
/// Example:
/// `("out", "War and Peace", "_zipf_result", "txt")` → `out/War_and_Peace_zipf_result.txt`
pub fn output_file<P: AsRef<Path>>(dir: P, name: &str, suffix: &str, extension: &str) -> PathBuf {
	// Dots in the name belong to the name, not to the extension
	dir.as_ref().join(format!("{}{}.{}", sanitize_name(name), suffix, extension))
}

/// Extracts the base filename without extension.
///
/// Examples:
/// - `"./data/moby_dick.txt"` → `"moby_dick"`
/// - `"moby_dick"` → `"moby_dick"`
pub fn file_stem<P: AsRef<Path>>(input_path: P) -> io::Result<String> {
	let stem = input_path
		.as_ref()
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no filename"))?;

	Ok(stem.to_string_lossy().to_string())
}

/// Normalize a folder path.
///
/// - `"."` or `"./"` resolves to the current working directory
/// - Other paths are returned as-is (not canonicalized)
pub fn normalize_folder(input: &str) -> PathBuf {
	match input {
		"." | "./" => env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
		other => PathBuf::from(other),
	}
}

/// Lists the stems of all files with a given extension in a directory,
/// sorted by name. Subdirectories are ignored.
pub fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<String>> {
	let mut stems = Vec::new();

	for entry in fs::read_dir(dir)? {
		let path = entry?.path();
		if path.is_file() && path.extension() == Some(OsStr::new(extension)) {
			stems.push(file_stem(&path)?);
		}
	}

	stems.sort();
	Ok(stems)
}
