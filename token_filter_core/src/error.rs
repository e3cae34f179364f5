use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while loading configuration and data sources.
///
/// Substitution itself never fails: unknown namespaces, invalid paths and
/// malformed token syntax are all handled by leaving text in place.
#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum TokenFilterError {
	#[error(transparent)]
	#[diagnostic(code(token_filter::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(token_filter::config_parse),
		help("check that token_filter.toml is valid TOML with [filter], [data] and/or [entity_types] sections")
	)]
	ConfigParse(String),

	#[error("failed to load data file `{path}`: {reason}")]
	#[diagnostic(code(token_filter::data_file))]
	DataFile { path: String, reason: String },

	#[error("unsupported data file format: `{0}`")]
	#[diagnostic(
		code(token_filter::unsupported_format),
		help("supported formats: text, json, toml, yaml, yml, ini")
	)]
	UnsupportedDataFormat(String),

	#[error("unconvertible float value in data file `{path}`: {value}")]
	#[diagnostic(
		code(token_filter::unconvertible_float),
		help("NaN and Infinity are not valid JSON numbers")
	)]
	UnconvertibleFloat { path: String, value: String },

	#[error("invalid namespace name: `{0}`")]
	#[diagnostic(
		code(token_filter::invalid_namespace),
		help("namespace names must be non-empty and cannot contain whitespace, `:`, `[` or `]`")
	)]
	InvalidNamespace(String),
}

pub type TokenFilterResult<T> = Result<T, TokenFilterError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
