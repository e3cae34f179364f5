use std::collections::BTreeMap;
use std::ops::Range;

use logos::Logos;

use crate::tokens::Token;

/// Raw tokens produced by logos for flat tokenization of the input text.
///
/// A token ends at the first `]`, so adjacent tokens such as
/// `[site:name][site:slogan]` are always split apart. A `[` that does not
/// start a well formed token is lexed on its own and kept as text.
#[derive(Logos, Debug, PartialEq)]
enum RawToken {
	#[regex(r"\[[^\s\[\]:]+:[^\[\]]+\]")]
	Token,
	#[token("[")]
	BracketOpen,
	#[regex(r"[^\[]+")]
	Text,
}

/// A piece of scanned text: either plain text to copy through, or a token
/// to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
	/// Byte range of untouched text.
	Text(Range<usize>),
	/// A well formed token.
	Token(Token),
}

/// Split `text` into text and token segments. Concatenating the source slices
/// of every segment in order reproduces `text` exactly.
pub fn tokenize(text: &str) -> Vec<Segment> {
	let mut segments: Vec<Segment> = Vec::new();

	for (result, span) in RawToken::lexer(text).spanned() {
		let token = match result {
			Ok(RawToken::Token) => Token::from_raw(&text[span.clone()], span.clone()),
			Ok(RawToken::BracketOpen | RawToken::Text) | Err(()) => None,
		};

		match token {
			Some(token) => segments.push(Segment::Token(token)),
			None => push_text(&mut segments, span),
		}
	}

	segments
}

/// Append a text span, merging it into the previous text segment when the
/// two are contiguous.
fn push_text(segments: &mut Vec<Segment>, span: Range<usize>) {
	if let Some(Segment::Text(previous)) = segments.last_mut() {
		if previous.end == span.start {
			previous.end = span.end;
			return;
		}
	}

	segments.push(Segment::Text(span));
}

/// Return every well formed token in `text`, in order of appearance.
pub fn scan(text: &str) -> Vec<Token> {
	tokenize(text)
		.into_iter()
		.filter_map(|segment| {
			match segment {
				Segment::Token(token) => Some(token),
				Segment::Text(_) => None,
			}
		})
		.collect()
}

/// Group the tokens found in `text` by namespace. Within each namespace the
/// tokens keep their order of appearance.
pub fn scan_by_namespace(text: &str) -> BTreeMap<String, Vec<Token>> {
	let mut grouped: BTreeMap<String, Vec<Token>> = BTreeMap::new();

	for token in scan(text) {
		grouped.entry(token.namespace.clone()).or_default().push(token);
	}

	grouped
}

/// Quick check used to skip the lexer for text that cannot contain a token.
pub(crate) fn may_contain_tokens(text: &str) -> bool {
	text.contains('[') && text.contains(':') && text.contains(']')
}
