use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::TokenContext;
use crate::tokens::TokenPath;

/// Turns a token path and the namespace's data object into a rendered
/// string.
///
/// Resolvers must be pure reads: they are shared between threads and may be
/// called any number of times for the same token. Returning `None` marks the
/// token as unresolved.
pub trait Resolver: Send + Sync {
	fn resolve(&self, path: &TokenPath, data: &Value) -> Option<String>;
}

impl<F> Resolver for F
where
	F: Fn(&TokenPath, &Value) -> Option<String> + Send + Sync,
{
	fn resolve(&self, path: &TokenPath, data: &Value) -> Option<String> {
		self(path, data)
	}
}

/// Resolves paths by walking a `serde_json::Value`.
///
/// Each path segment selects an object key, or an array index when the
/// segment is numeric. Strings render as-is, numbers and booleans through
/// `Display`, and arrays of scalars are joined with `", "`. Anything else
/// (`null`, objects, nested arrays, missing keys) is unresolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueResolver;

impl Resolver for ValueResolver {
	fn resolve(&self, path: &TokenPath, data: &Value) -> Option<String> {
		if !path.is_valid() {
			return None;
		}

		let value = lookup(data, path.segments())?;
		render_value(value)
	}
}

/// Walk `value` by `segments`, returning the value at the end of the path.
pub fn lookup<'a>(value: &'a Value, segments: &[String]) -> Option<&'a Value> {
	let mut current = value;

	for segment in segments {
		current = match current {
			Value::Object(map) => map.get(segment)?,
			Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
			_ => return None,
		};
	}

	Some(current)
}

/// Render a scalar value (or an array of scalars) as token replacement text.
pub fn render_value(value: &Value) -> Option<String> {
	match value {
		Value::Array(items) => {
			let rendered: Option<Vec<String>> = items.iter().map(render_scalar).collect();
			rendered.map(|items| items.join(", "))
		}
		other => render_scalar(other),
	}
}

fn render_scalar(value: &Value) -> Option<String> {
	match value {
		Value::String(string) => Some(string.clone()),
		Value::Number(number) => Some(number.to_string()),
		Value::Bool(boolean) => Some(boolean.to_string()),
		Value::Null | Value::Array(_) | Value::Object(_) => None,
	}
}

struct NamespaceEntry {
	resolver: Box<dyn Resolver>,
	global: Option<Value>,
}

/// A summary of a registered namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceInfo {
	pub name: String,
	/// Whether the namespace carries its own global data object (e.g. `site`).
	pub global: bool,
}

/// The set of known namespace resolvers.
///
/// Populate the registry once at start-up, then share it immutably (for
/// example behind an `Arc`) between all substitution calls.
#[derive(Default)]
pub struct TokenRegistry {
	entries: BTreeMap<String, NamespaceEntry>,
}

impl fmt::Debug for TokenRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TokenRegistry")
			.field("namespaces", &self.entries.keys().collect::<Vec<_>>())
			.finish()
	}
}

impl TokenRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// A registry using [`ValueResolver`] for every name in `names`.
	pub fn with_value_resolvers<I, S>(names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut registry = Self::new();
		for name in names {
			registry.register_namespace(name, ValueResolver);
		}
		registry
	}

	/// Add or replace the resolver for `name`. The last registration wins; the
	/// replaced resolver is returned.
	pub fn register_namespace(
		&mut self,
		name: impl Into<String>,
		resolver: impl Resolver + 'static,
	) -> Option<Box<dyn Resolver>> {
		self.insert(name.into(), Box::new(resolver), None)
	}

	/// Add or replace the resolver for `name` together with a global data
	/// object, such as site-wide settings. Global data is made available
	/// through [`TokenRegistry::global_context`].
	pub fn register_global(
		&mut self,
		name: impl Into<String>,
		resolver: impl Resolver + 'static,
		data: Value,
	) -> Option<Box<dyn Resolver>> {
		self.insert(name.into(), Box::new(resolver), Some(data))
	}

	fn insert(
		&mut self,
		name: String,
		resolver: Box<dyn Resolver>,
		global: Option<Value>,
	) -> Option<Box<dyn Resolver>> {
		let previous = self
			.entries
			.insert(name.clone(), NamespaceEntry { resolver, global });

		if previous.is_some() {
			tracing::info!(namespace = %name, "replacing previously registered token resolver");
		}

		previous.map(|entry| entry.resolver)
	}

	/// The resolver registered for `name`.
	pub fn resolver(&self, name: &str) -> Option<&dyn Resolver> {
		self.entries.get(name).map(|entry| entry.resolver.as_ref())
	}

	pub fn contains(&self, name: &str) -> bool {
		self.entries.contains_key(name)
	}

	/// Resolve a single path against `data` with the resolver for `namespace`.
	pub fn resolve(&self, namespace: &str, path: &TokenPath, data: &Value) -> Option<String> {
		self.resolver(namespace)?.resolve(path, data)
	}

	/// All registered namespaces, sorted by name.
	pub fn namespaces(&self) -> Vec<NamespaceInfo> {
		self.entries
			.iter()
			.map(|(name, entry)| {
				NamespaceInfo {
					name: name.clone(),
					global: entry.global.is_some(),
				}
			})
			.collect()
	}

	/// A fresh context holding the global data of every namespace registered
	/// with [`TokenRegistry::register_global`]. Callers add per-request data
	/// (such as the entity being rendered) on top of it.
	pub fn global_context(&self) -> TokenContext {
		let mut context = TokenContext::new();
		for (name, entry) in &self.entries {
			if let Some(data) = &entry.global {
				context.insert(name.clone(), data.clone());
			}
		}
		context
	}
}
