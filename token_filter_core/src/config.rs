use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::EntityTokenMapper;
use crate::FilterOptions;
use crate::TokenContext;
use crate::TokenFilterError;
use crate::TokenFilterResult;
use crate::TokenRegistry;
use crate::ValueResolver;
use crate::tokens::is_valid_namespace;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = [
	"token_filter.toml",
	".token_filter.toml",
	".config/token_filter.toml",
];

/// Language code used when neither the config nor the caller provides one.
pub const DEFAULT_LANGCODE: &str = "en";

/// Data source entry for a `[data]` namespace.
///
/// A plain string is a path whose format is taken from its extension:
///
/// ```toml
/// [data]
/// site = "site.json"
/// ```
///
/// Typed entries provide an explicit format:
///
/// ```toml
/// [data]
/// node = { path = "node-data", format = "yaml" }
/// ```
#[derive(Debug, Clone, Deserialize, Eq, PartialEq)]
#[serde(untagged)]
#[non_exhaustive]
pub enum DataSource {
	Path(PathBuf),
	Typed(TypedDataSource),
}

impl DataSource {
	pub fn path(&self) -> &Path {
		match self {
			Self::Path(path) => path.as_path(),
			Self::Typed(typed) => typed.path.as_path(),
		}
	}

	/// The format to parse the source with: the explicit format when given,
	/// otherwise the lowercased file extension.
	pub fn format(&self) -> String {
		match self {
			Self::Path(path) => {
				path.extension()
					.and_then(|extension| extension.to_str())
					.unwrap_or("")
					.to_ascii_lowercase()
			}
			Self::Typed(typed) => typed.format.trim().to_ascii_lowercase(),
		}
	}
}

/// Typed data source configuration for `[data]` entries.
#[derive(Debug, Clone, Deserialize, Eq, PartialEq)]
pub struct TypedDataSource {
	pub path: PathBuf,
	pub format: String,
}

/// Configuration loaded from a `token_filter.toml` file.
///
/// ```toml
/// langcode = "en"
///
/// [filter]
/// unresolved = "preserve"
/// escape_html = false
/// passes = 1
///
/// [data]
/// site = "site.json"
///
/// [entity_types]
/// media_item = "media"
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct TokenFilterConfig {
	/// Language code passed through with every processed text.
	#[serde(default)]
	pub langcode: Option<String>,
	/// Substitution options.
	#[serde(default)]
	pub filter: FilterOptions,
	/// Map of namespace name to the file holding its global data.
	#[serde(default)]
	pub data: HashMap<String, DataSource>,
	/// Extra entity type → token type mappings on top of the defaults.
	#[serde(default)]
	pub entity_types: BTreeMap<String, String>,
}

impl TokenFilterConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> TokenFilterResult<Option<TokenFilterConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config = Self::from_toml(&content)?;
		tracing::debug!(path = %config_path.display(), "loaded config");

		Ok(Some(config))
	}

	/// Parse config from TOML source text.
	pub fn from_toml(content: &str) -> TokenFilterResult<TokenFilterConfig> {
		let config: TokenFilterConfig =
			toml::from_str(content).map_err(|e| TokenFilterError::ConfigParse(e.to_string()))?;

		if let Some(name) = config.data.keys().find(|name| !is_valid_namespace(name)) {
			return Err(TokenFilterError::InvalidNamespace(name.clone()));
		}

		Ok(config)
	}

	pub fn langcode(&self) -> &str {
		self.langcode.as_deref().unwrap_or(DEFAULT_LANGCODE)
	}

	pub fn entity_mapper(&self) -> EntityTokenMapper {
		EntityTokenMapper::new().with_mappings(self.entity_types.clone())
	}

	/// Read each data file and parse it into a `serde_json::Value` keyed by
	/// namespace.
	pub fn load_data(&self, root: &Path) -> TokenFilterResult<TokenContext> {
		let mut data = TokenContext::new();

		let mut namespaces: Vec<_> = self.data.iter().collect();
		namespaces.sort_by(|a, b| a.0.cmp(b.0));

		for (namespace, source) in namespaces {
			let rel_path = source.path();
			let path_display = rel_path.display().to_string();
			let content = std::fs::read_to_string(root.join(rel_path)).map_err(|e| {
				TokenFilterError::DataFile {
					path: path_display.clone(),
					reason: e.to_string(),
				}
			})?;
			let value = parse_data_file(&content, &source.format(), &path_display)?;

			data.insert(namespace.clone(), value);
		}

		Ok(data)
	}

	/// Build a registry with a [`ValueResolver`] for every `[data]` namespace,
	/// carrying the loaded data as the namespace's global data.
	pub fn registry(&self, root: &Path) -> TokenFilterResult<TokenRegistry> {
		let mut registry = TokenRegistry::new();

		for (namespace, value) in self.load_data(root)? {
			registry.register_global(namespace, ValueResolver, value);
		}

		Ok(registry)
	}
}

/// Parse a data file's content into a `serde_json::Value` based on its
/// format.
pub fn parse_data_file(
	content: &str,
	format: &str,
	path_display: &str,
) -> TokenFilterResult<serde_json::Value> {
	match format {
		"text" | "string" | "raw" | "txt" => Ok(serde_json::Value::String(content.to_string())),
		"json" => {
			serde_json::from_str(content).map_err(|e| {
				TokenFilterError::DataFile {
					path: path_display.to_string(),
					reason: e.to_string(),
				}
			})
		}
		"toml" => {
			let toml_value: toml::Value = toml::from_str(content).map_err(|e| {
				TokenFilterError::DataFile {
					path: path_display.to_string(),
					reason: e.to_string(),
				}
			})?;
			toml_to_json(toml_value, path_display)
		}
		"yaml" | "yml" => {
			serde_yaml_ng::from_str(content).map_err(|e| {
				TokenFilterError::DataFile {
					path: path_display.to_string(),
					reason: e.to_string(),
				}
			})
		}
		"ini" => {
			serde_ini::from_str(content).map_err(|e| {
				TokenFilterError::DataFile {
					path: path_display.to_string(),
					reason: e.to_string(),
				}
			})
		}
		other => Err(TokenFilterError::UnsupportedDataFormat(other.to_string())),
	}
}

/// Convert a `toml::Value` to a `serde_json::Value`. Integers stay integers;
/// non-finite floats are rejected.
fn toml_to_json(value: toml::Value, path_display: &str) -> TokenFilterResult<serde_json::Value> {
	let json = match value {
		toml::Value::String(s) => serde_json::Value::String(s),
		toml::Value::Integer(i) => serde_json::Value::Number(i.into()),
		toml::Value::Float(f) => {
			serde_json::Value::Number(serde_json::Number::from_f64(f).ok_or_else(|| {
				TokenFilterError::UnconvertibleFloat {
					path: path_display.to_string(),
					value: f.to_string(),
				}
			})?)
		}
		toml::Value::Boolean(b) => serde_json::Value::Bool(b),
		toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
		toml::Value::Array(arr) => {
			let items: TokenFilterResult<Vec<serde_json::Value>> = arr
				.into_iter()
				.map(|v| toml_to_json(v, path_display))
				.collect();
			serde_json::Value::Array(items?)
		}
		toml::Value::Table(table) => {
			let mut map = serde_json::Map::new();
			for (k, v) in table {
				map.insert(k, toml_to_json(v, path_display)?);
			}
			serde_json::Value::Object(map)
		}
	};

	Ok(json)
}
