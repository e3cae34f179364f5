use std::path::Path;

use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub fn token_filter_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("token-filter"));
	cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
	cmd
}

/// Write a project with a `site` data file and a config pointing at it.
#[allow(dead_code)]
pub fn write_site_project(root: &Path) -> std::io::Result<()> {
	std::fs::write(
		root.join("site.json"),
		r#"{ "name": "Acme", "slogan": "Tools for everyone", "mail": "hi@acme.test" }"#,
	)?;
	std::fs::write(
		root.join("token_filter.toml"),
		"langcode = \"fr\"\n\n[data]\nsite = \"site.json\"\n",
	)
}
