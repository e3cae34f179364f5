use std::collections::BTreeMap;

use derive_more::Deref;
use derive_more::DerefMut;
use serde::Deserialize;
use serde_json::Value;

/// The data available to a single substitution call, keyed by namespace.
///
/// The caller decides what goes in here (site-wide data, the entity being
/// rendered, ...). Nothing is looked up implicitly.
#[derive(Debug, Clone, Default, PartialEq, Deref, DerefMut)]
pub struct TokenContext(
	#[deref]
	#[deref_mut]
	BTreeMap<String, Value>,
);

impl TokenContext {
	pub fn new() -> Self {
		Self::default()
	}

	/// Set the data for `namespace`. Inserting a namespace that is already
	/// present replaces the earlier value; the replaced value is returned.
	pub fn insert(&mut self, namespace: impl Into<String>, data: Value) -> Option<Value> {
		let namespace = namespace.into();
		let previous = self.0.insert(namespace.clone(), data);

		if previous.is_some() {
			tracing::debug!(%namespace, "context namespace assigned more than once, keeping the last value");
		}

		previous
	}

	/// Builder form of [`TokenContext::insert`].
	#[must_use]
	pub fn with(mut self, namespace: impl Into<String>, data: Value) -> Self {
		self.insert(namespace, data);
		self
	}

	/// Add a content entity under the token type its entity type maps to, e.g.
	/// a `taxonomy_term` entity becomes available as `[term:...]`. Returns the
	/// token type used.
	pub fn insert_entity(
		&mut self,
		mapper: &EntityTokenMapper,
		entity_type: &str,
		entity: Value,
	) -> String {
		let token_type = mapper.token_type_for(entity_type).to_string();
		self.insert(token_type.clone(), entity);
		token_type
	}
}

impl From<BTreeMap<String, Value>> for TokenContext {
	fn from(map: BTreeMap<String, Value>) -> Self {
		Self(map)
	}
}

impl IntoIterator for TokenContext {
	type IntoIter = std::collections::btree_map::IntoIter<String, Value>;
	type Item = (String, Value);

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

impl<K: Into<String>> FromIterator<(K, Value)> for TokenContext {
	fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
		let mut context = Self::new();
		for (namespace, data) in iter {
			context.insert(namespace, data);
		}
		context
	}
}

/// Entity types whose token type differs from their id.
const DEFAULT_ENTITY_TOKEN_TYPES: [(&str, &str); 2] = [
	("taxonomy_term", "term"),
	("taxonomy_vocabulary", "vocabulary"),
];

/// Maps content entity type ids to the namespace their tokens use.
///
/// Most entity types use their own id (`node` → `node`); the taxonomy types
/// use shorter names. Extra mappings can be configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityTokenMapper {
	mapping: BTreeMap<String, String>,
}

impl Default for EntityTokenMapper {
	fn default() -> Self {
		Self {
			mapping: DEFAULT_ENTITY_TOKEN_TYPES
				.iter()
				.map(|(entity_type, token_type)| {
					((*entity_type).to_string(), (*token_type).to_string())
				})
				.collect(),
		}
	}
}

impl EntityTokenMapper {
	pub fn new() -> Self {
		Self::default()
	}

	/// Add or override mappings on top of the defaults.
	#[must_use]
	pub fn with_mappings<I, K, V>(mut self, mappings: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		for (entity_type, token_type) in mappings {
			self.mapping.insert(entity_type.into(), token_type.into());
		}
		self
	}

	/// The token type used for `entity_type`.
	pub fn token_type_for<'a>(&'a self, entity_type: &'a str) -> &'a str {
		self.mapping
			.get(entity_type)
			.map_or(entity_type, String::as_str)
	}

	/// The entity type whose tokens use `token_type`.
	pub fn entity_type_for<'a>(&'a self, token_type: &'a str) -> &'a str {
		self.mapping
			.iter()
			.find(|(_, mapped)| mapped.as_str() == token_type)
			.map_or(token_type, |(entity_type, _)| entity_type.as_str())
	}

	/// Token types for the content entities among the current route's
	/// parameters, in parameter order and without duplicates.
	pub fn token_types_for_route(&self, parameters: &[RouteParameter]) -> Vec<String> {
		let mut token_types: Vec<String> = Vec::new();

		for parameter in parameters {
			let Some(entity_type) = parameter.entity_type.as_deref() else {
				continue;
			};

			let token_type = self.token_type_for(entity_type);
			if !token_types.iter().any(|existing| existing == token_type) {
				token_types.push(token_type.to_string());
			}
		}

		token_types
	}
}

/// A parameter of the route currently being served.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RouteParameter {
	pub name: String,
	/// The entity type id when the parameter is a content entity.
	#[serde(default)]
	pub entity_type: Option<String>,
}

impl RouteParameter {
	/// A plain (non-entity) route parameter.
	pub fn plain(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			entity_type: None,
		}
	}

	/// A route parameter holding a content entity of `entity_type`.
	pub fn entity(name: impl Into<String>, entity_type: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			entity_type: Some(entity_type.into()),
		}
	}
}
