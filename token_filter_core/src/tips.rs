use url::form_urlencoded;

use crate::TokenRegistry;

/// Route of the token browser the tips link points at.
pub const TOKEN_TREE_PATH: &str = "/token/tree";

const TIPS_DESCRIPTION: &str = "Global and entity tokens are replaced with their values.";

/// Render the filter's help fragment.
///
/// The fragment is a short description followed by a link to the token
/// browser, scoped to `token_types` (for example the token types of the
/// entities on the current route). In `long` mode the global namespaces of
/// `registry` are listed as well.
pub fn render_tips(token_types: &[String], long: bool, registry: &TokenRegistry) -> String {
	let mut build = String::from(TIPS_DESCRIPTION);
	build.push(' ');
	build.push_str(&token_tree_link(token_types));

	if long {
		let globals: Vec<String> = registry
			.namespaces()
			.into_iter()
			.filter(|info| info.global)
			.map(|info| info.name)
			.collect();

		if !globals.is_empty() {
			build.push_str("\n<ul class=\"token-global-types\">");
			for name in &globals {
				build.push_str("\n<li>");
				build.push_str(&html_escape::encode_text(name));
				build.push_str("</li>");
			}
			build.push_str("\n</ul>");
		}
	}

	build
}

/// A link to the token browser listing `token_types`.
pub fn token_tree_link(token_types: &[String]) -> String {
	let href = if token_types.is_empty() {
		TOKEN_TREE_PATH.to_string()
	} else {
		let query = form_urlencoded::Serializer::new(String::new())
			.append_pair("token_types", &token_types.join(","))
			.finish();
		format!("{TOKEN_TREE_PATH}?{query}")
	};

	format!(
		"<a href=\"{}\" class=\"token-tree-link\">Browse available tokens.</a>",
		html_escape::encode_double_quoted_attribute(&href)
	)
}
