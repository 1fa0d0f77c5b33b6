use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Characters treated as word separators in addition to whitespace.
const SEPARATORS: [char; 4] = ['-', '=', '.', ','];

/// Lines starting with this character are comments.
const COMMENT_CHAR: char = '#';

/// A normalized word: lower-cased, punctuation stripped, never empty.
///
/// # Invariants
/// - Only alphanumeric characters, plus apostrophes enclosed by two of them
///   (`don't`, `o'clock`)
/// - Immutable once produced
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
	/// Normalizes a raw word into a token.
	///
	/// Returns `None` if nothing is left once punctuation is stripped.
	pub fn new(word: &str) -> Option<Self> {
		let chars: Vec<char> = word.chars().flat_map(char::to_lowercase).collect();
		let mut normalized = String::with_capacity(word.len());

		for (i, c) in chars.iter().enumerate() {
			if c.is_alphanumeric() {
				normalized.push(*c);
			} else if is_apostrophe(*c)
				&& i > 0
				&& i + 1 < chars.len()
				&& chars[i - 1].is_alphanumeric()
				&& chars[i + 1].is_alphanumeric()
			{
				normalized.push('\'');
			}
		}

		if normalized.is_empty() { None } else { Some(Self(normalized)) }
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

fn is_apostrophe(c: char) -> bool {
	c == '\'' || c == '’'
}

impl fmt::Display for Token {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl AsRef<str> for Token {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl Borrow<str> for Token {
	fn borrow(&self) -> &str {
		&self.0
	}
}

/// Ordered tokens of a text; the index of a token is its position.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSequence(Vec<Token>);

impl TokenSequence {
	/// Builds a sequence from raw words, normalizing each one and dropping
	/// the ones that normalize to nothing.
	pub fn from_words<S: AsRef<str>>(words: &[S]) -> Self {
		words.iter().filter_map(|w| Token::new(w.as_ref())).collect()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn as_slice(&self) -> &[Token] {
		&self.0
	}

	pub fn iter(&self) -> std::slice::Iter<'_, Token> {
		self.0.iter()
	}
}

impl FromIterator<Token> for TokenSequence {
	fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
		Self(iter.into_iter().collect())
	}
}

impl<'a> IntoIterator for &'a TokenSequence {
	type Item = &'a Token;
	type IntoIter = std::slice::Iter<'a, Token>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}

/// Tokenizer switches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizerOptions {
	/// Ignore lines whose first character is `#`.
	pub skip_comment_lines: bool,
}

impl Default for TokenizerOptions {
	fn default() -> Self {
		Self { skip_comment_lines: true }
	}
}

/// Whitespace and punctuation based word tokenizer.
///
/// Splits each line on whitespace and on `- = . ,`, then normalizes every
/// piece with [`Token::new`]. Pure and deterministic.
#[derive(Clone, Copy, Debug, Default)]
pub struct Tokenizer {
	options: TokenizerOptions,
}

impl Tokenizer {
	pub fn new(options: TokenizerOptions) -> Self {
		Self { options }
	}

	pub fn tokenize(&self, raw: &str) -> TokenSequence {
		raw.lines()
			.filter(|line| !(self.options.skip_comment_lines && line.starts_with(COMMENT_CHAR)))
			.flat_map(|line| line.split(|c: char| c.is_whitespace() || SEPARATORS.contains(&c)))
			.filter_map(Token::new)
			.collect()
	}
}

/// Tokenizes with the default options.
pub fn tokenize(raw: &str) -> TokenSequence {
	Tokenizer::default().tokenize(raw)
}
