use std::fmt::Display;
use std::ops::Range;

use serde::Serialize;

/// The path of a token within its namespace, e.g. `author:name` in
/// `[node:author:name]`.
///
/// Segments are separated by either `:` (chained tokens) or `.` (nested
/// access), so `author:name` and `author.name` address the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenPath {
	raw: String,
	segments: Vec<String>,
}

impl TokenPath {
	pub fn new(raw: impl Into<String>) -> Self {
		let raw = raw.into();
		let segments = raw
			.split([':', '.'])
			.map(ToString::to_string)
			.collect();

		Self { raw, segments }
	}

	/// The path exactly as written in the source text.
	pub fn as_str(&self) -> &str {
		&self.raw
	}

	/// The individual segments of the path. May contain empty strings when the
	/// path is invalid.
	pub fn segments(&self) -> &[String] {
		&self.segments
	}

	/// A path is valid when none of its segments are empty. `a::b`, `.a` and
	/// `a.` are all invalid and never resolve.
	pub fn is_valid(&self) -> bool {
		self.segments.iter().all(|segment| !segment.is_empty())
	}

	/// The first segment, which names the top level field.
	pub fn first(&self) -> Option<&str> {
		self.segments.first().map(String::as_str)
	}

	/// A path made from every segment after the first, used when a resolver
	/// delegates a chained token to another value.
	pub fn rest(&self) -> Option<TokenPath> {
		let (_, rest) = self.raw.split_once([':', '.'])?;
		Some(TokenPath::new(rest))
	}
}

impl Serialize for TokenPath {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.raw)
	}
}

impl Display for TokenPath {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.raw)
	}
}

/// A single `[namespace:path]` reference found in text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
	/// The namespace, e.g. `site` or `node`.
	pub namespace: String,
	/// The path within the namespace.
	pub path: TokenPath,
	/// Text used when the namespace is available but the path does not
	/// resolve, written as `[namespace:path|fallback]`.
	pub fallback: Option<String>,
	/// The original bracketed text, including the brackets.
	pub raw: String,
	/// Byte range of `raw` within the scanned text.
	pub span: Range<usize>,
}

impl Token {
	/// Build a token from the bracketed source text. Returns `None` when the
	/// text is not a well formed token.
	pub(crate) fn from_raw(raw: &str, span: Range<usize>) -> Option<Self> {
		let inner = raw.strip_prefix('[')?.strip_suffix(']')?;
		let (namespace, rest) = inner.split_once(':')?;

		if !is_valid_namespace(namespace) || rest.is_empty() {
			return None;
		}

		let (path, fallback) = match rest.split_once('|') {
			Some((path, fallback)) => (path, Some(fallback.to_string())),
			None => (rest, None),
		};

		if path.is_empty() {
			return None;
		}

		Some(Self {
			namespace: namespace.to_string(),
			path: TokenPath::new(path),
			fallback,
			raw: raw.to_string(),
			span,
		})
	}
}

impl Display for Token {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.raw)
	}
}

/// Whether `name` can appear as the namespace of a token.
pub fn is_valid_namespace(name: &str) -> bool {
	!name.is_empty()
		&& !name
			.chars()
			.any(|ch| ch.is_whitespace() || matches!(ch, ':' | '[' | ']'))
}
