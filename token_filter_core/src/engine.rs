use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use crate::TokenContext;
use crate::TokenRegistry;
use crate::lexer::Segment;
use crate::lexer::may_contain_tokens;
use crate::lexer::tokenize;
use crate::tips::render_tips;
use crate::tokens::Token;

/// What to do with a token that cannot be resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedPolicy {
	/// Keep the token text exactly as written.
	#[default]
	Preserve,
	/// Remove the token from the output.
	Clear,
}

/// Options controlling a [`TokenFilter`].
///
/// ```toml
/// [filter]
/// unresolved = "preserve"
/// escape_html = false
/// passes = 1
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct FilterOptions {
	/// Handling of tokens that do not resolve.
	pub unresolved: UnresolvedPolicy,
	/// HTML-escape resolved values and fallbacks before inserting them.
	pub escape_html: bool,
	/// Maximum number of substitution passes. Values may themselves contain
	/// tokens; each extra pass resolves those. `0` behaves like `1`.
	pub passes: usize,
}

impl Default for FilterOptions {
	fn default() -> Self {
		Self {
			unresolved: UnresolvedPolicy::Preserve,
			escape_html: false,
			passes: 1,
		}
	}
}

/// The outcome of [`TokenFilter::process`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterResult {
	/// The text with tokens replaced.
	pub text: String,
	/// The language code the text was processed for. Passed through unchanged
	/// so the host can vary caches by it.
	pub langcode: String,
	/// Number of tokens replaced by a resolved value or a fallback.
	pub replacements: usize,
	/// Raw text of every distinct token that could not be resolved, in order
	/// of first appearance.
	pub unresolved: Vec<String>,
	/// Namespaces that produced at least one replacement, sorted.
	pub namespaces: Vec<String>,
}

#[derive(Debug, Default)]
struct PassOutcome {
	text: String,
	replacements: usize,
	unresolved: Vec<String>,
	namespaces: BTreeSet<String>,
}

/// Replaces `[namespace:path]` tokens with values from a [`TokenContext`].
///
/// The filter holds only read-only state, so a single instance can be shared
/// between threads and used for any number of concurrent calls.
#[derive(Debug, Clone)]
pub struct TokenFilter {
	registry: Arc<TokenRegistry>,
	options: FilterOptions,
}

impl TokenFilter {
	pub fn new(registry: Arc<TokenRegistry>, options: FilterOptions) -> Self {
		Self { registry, options }
	}

	pub fn registry(&self) -> &TokenRegistry {
		&self.registry
	}

	pub fn options(&self) -> &FilterOptions {
		&self.options
	}

	/// Replace every resolvable token in `text`.
	///
	/// Tokens whose namespace is missing from `context`, whose namespace has no
	/// resolver, or whose path does not resolve are handled by the configured
	/// [`UnresolvedPolicy`]. This never fails.
	pub fn substitute(&self, text: &str, context: &TokenContext) -> String {
		self.run(text, context).text
	}

	/// Like [`TokenFilter::substitute`], but also reports what happened and
	/// passes `langcode` through for the host's cache keys.
	#[tracing::instrument(level = "trace", skip_all, fields(langcode = %langcode, len = text.len()))]
	pub fn process(&self, text: &str, context: &TokenContext, langcode: &str) -> FilterResult {
		let outcome = self.run(text, context);

		FilterResult {
			text: outcome.text,
			langcode: langcode.to_string(),
			replacements: outcome.replacements,
			unresolved: outcome.unresolved,
			namespaces: outcome.namespaces.into_iter().collect(),
		}
	}

	/// Help text describing the filter, linking to a browser for
	/// `token_types`.
	pub fn tips(&self, token_types: &[String], long: bool) -> String {
		render_tips(token_types, long, &self.registry)
	}

	fn run(&self, text: &str, context: &TokenContext) -> PassOutcome {
		let passes = self.options.passes.max(1);
		let mut outcome = PassOutcome {
			text: text.to_string(),
			..PassOutcome::default()
		};

		for pass in 0..passes {
			let next = self.substitute_once(&outcome.text, context);
			let changed = next.text != outcome.text;

			outcome.text = next.text;
			outcome.replacements += next.replacements;
			outcome.namespaces.extend(next.namespaces);
			for raw in next.unresolved {
				if !outcome.unresolved.contains(&raw) {
					outcome.unresolved.push(raw);
				}
			}

			if !changed {
				tracing::trace!(pass, "substitution reached a fixed point");
				break;
			}
		}

		outcome
	}

	fn substitute_once(&self, text: &str, context: &TokenContext) -> PassOutcome {
		if !may_contain_tokens(text) {
			return PassOutcome {
				text: text.to_string(),
				..PassOutcome::default()
			};
		}

		let mut outcome = PassOutcome {
			text: String::with_capacity(text.len()),
			..PassOutcome::default()
		};

		for segment in tokenize(text) {
			match segment {
				Segment::Text(span) => outcome.text.push_str(&text[span]),
				Segment::Token(token) => self.replace_token(&token, context, &mut outcome),
			}
		}

		outcome
	}

	fn replace_token(&self, token: &Token, context: &TokenContext, outcome: &mut PassOutcome) {
		let Some(data) = context.get(&token.namespace) else {
			tracing::debug!(token = %token.raw, "no data for token namespace");
			self.leave_unresolved(token, outcome);
			return;
		};

		let value = self.registry.resolve(&token.namespace, &token.path, data);
		let value = match (value, &token.fallback) {
			(Some(value), _) => value,
			(None, Some(fallback)) => fallback.clone(),
			(None, None) => {
				tracing::debug!(token = %token.raw, "token path did not resolve");
				self.leave_unresolved(token, outcome);
				return;
			}
		};

		if self.options.escape_html {
			outcome
				.text
				.push_str(&html_escape::encode_safe(&value));
		} else {
			outcome.text.push_str(&value);
		}

		outcome.replacements += 1;
		outcome.namespaces.insert(token.namespace.clone());
	}

	fn leave_unresolved(&self, token: &Token, outcome: &mut PassOutcome) {
		if !outcome.unresolved.contains(&token.raw) {
			outcome.unresolved.push(token.raw.clone());
		}

		match self.options.unresolved {
			UnresolvedPolicy::Preserve => outcome.text.push_str(&token.raw),
			UnresolvedPolicy::Clear => {}
		}
	}
}
