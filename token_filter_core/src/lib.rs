//! `token_filter_core` replaces `[namespace:path]` tokens in text with values
//! taken from a caller-supplied context, such as site-wide settings or the
//! content entity currently being rendered.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Text fragment
//!   → Lexer (splits text into plain segments and `[namespace:path]` tokens)
//!   → Context lookup (finds the data object for the token's namespace)
//!   → Registry (the namespace's resolver turns path + data into a string)
//!   → Engine (writes the value, a fallback, or the untouched token)
//! ```
//!
//! ## Token Syntax
//!
//! - `[site:name]`: the `name` field of the `site` namespace.
//! - `[node:author:name]` / `[node:author.name]`: chained or nested paths.
//! - `[node:summary|No summary]`: fallback text used when the namespace is
//!   available but the path does not resolve.
//!
//! Namespaces cannot contain whitespace, `:`, `[` or `]`. Paths cannot contain
//! `[` or `]`. Anything else is plain text and is never modified.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use serde_json::json;
//! use token_filter_core::FilterOptions;
//! use token_filter_core::TokenContext;
//! use token_filter_core::TokenFilter;
//! use token_filter_core::TokenRegistry;
//!
//! let registry = TokenRegistry::with_value_resolvers(["site"]);
//! let filter = TokenFilter::new(Arc::new(registry), FilterOptions::default());
//! let context = TokenContext::new().with("site", json!({ "name": "Acme" }));
//!
//! assert_eq!(filter.substitute("Hello [site:name]!", &context), "Hello Acme!");
//! assert_eq!(filter.substitute("[site:unknown]", &context), "[site:unknown]");
//! ```

pub use config::*;
pub use context::*;
pub use engine::*;
pub use error::*;
pub use lexer::scan;
pub use lexer::scan_by_namespace;
pub use registry::*;
pub use tips::*;
pub use tokens::Token;
pub use tokens::TokenPath;
pub use tokens::is_valid_namespace;

pub mod config;
mod context;
mod engine;
#[allow(unused_assignments)]
mod error;
pub(crate) mod lexer;
mod registry;
mod tips;
pub(crate) mod tokens;

#[cfg(test)]
mod __fixtures;
