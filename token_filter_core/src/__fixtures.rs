use std::sync::Arc;

use rstest::fixture;
use serde_json::Value;
use serde_json::json;

use crate::FilterOptions;
use crate::TokenContext;
use crate::TokenFilter;
use crate::TokenPath;
use crate::TokenRegistry;
use crate::ValueResolver;

/// Resolves only `name` against `data["name"]`.
pub fn site_name_resolver(path: &TokenPath, data: &Value) -> Option<String> {
	match path.as_str() {
		"name" => data.get("name")?.as_str().map(ToString::to_string),
		_ => None,
	}
}

#[fixture]
pub fn site_registry() -> TokenRegistry {
	let mut registry = TokenRegistry::new();
	registry.register_namespace("site", site_name_resolver);
	registry
}

#[fixture]
pub fn site_context() -> TokenContext {
	TokenContext::new().with("site", json!({ "name": "Acme" }))
}

#[fixture]
pub fn site_filter(site_registry: TokenRegistry) -> TokenFilter {
	TokenFilter::new(Arc::new(site_registry), FilterOptions::default())
}

#[fixture]
pub fn node_data() -> Value {
	json!({
		"title": "Release notes",
		"nid": 42,
		"published": true,
		"summary": null,
		"tags": ["rust", "tokens"],
		"author": {
			"name": "Ada",
			"roles": [{ "id": "editor" }]
		},
		"body": "Fish & <chips>"
	})
}

/// A filter with value resolvers for `site`, `node` and `term`.
pub fn value_filter(options: FilterOptions) -> TokenFilter {
	let registry = TokenRegistry::with_value_resolvers(["site", "node", "term"]);
	TokenFilter::new(Arc::new(registry), options)
}

#[fixture]
pub fn node_context(node_data: Value) -> TokenContext {
	TokenContext::new()
		.with("site", json!({ "name": "Acme", "slogan": "[site:name] rocks" }))
		.with("node", node_data)
}

pub fn value_registry_with_global() -> TokenRegistry {
	let mut registry = TokenRegistry::new();
	registry.register_global("site", ValueResolver, json!({ "name": "Acme" }));
	registry.register_namespace("node", ValueResolver);
	registry
}
