mod common;

use predicates::prelude::PredicateBooleanExt;
use serde_json::Value;
use token_filter_core::AnyEmptyResult;

#[test]
fn render_replaces_global_tokens_from_stdin() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_site_project(tmp.path())?;

	common::token_filter_cmd()
		.arg("render")
		.arg("--path")
		.arg(tmp.path())
		.write_stdin("Hello [site:name]! [site:missing] [user:name]")
		.assert()
		.success()
		.stdout("Hello Acme! [site:missing] [user:name]");

	Ok(())
}

#[test]
fn render_reads_file_argument() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_site_project(tmp.path())?;
	let input = tmp.path().join("page.html");
	std::fs::write(&input, "<p>[site:name]: [site:slogan]</p>\n")?;

	common::token_filter_cmd()
		.arg("render")
		.arg(&input)
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout("<p>Acme: Tools for everyone</p>\n");

	Ok(())
}

#[test]
fn render_without_config_leaves_text_unchanged() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::token_filter_cmd()
		.arg("render")
		.arg("--path")
		.arg(tmp.path())
		.write_stdin("Hello [site:name]")
		.assert()
		.success()
		.stdout("Hello [site:name]");

	Ok(())
}

#[test]
fn render_maps_entity_type_to_token_type() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_site_project(tmp.path())?;
	let entity = tmp.path().join("term.json");
	std::fs::write(&entity, r#"{ "name": "Rust", "tid": 7 }"#)?;

	common::token_filter_cmd()
		.arg("render")
		.arg("--path")
		.arg(tmp.path())
		.arg("--entity-type")
		.arg("taxonomy_term")
		.arg("--entity")
		.arg(&entity)
		.write_stdin("[term:name] (#[term:tid]) on [site:name]")
		.assert()
		.success()
		.stdout("Rust (#7) on Acme");

	Ok(())
}

#[test]
fn render_entity_from_yaml() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let entity = tmp.path().join("node.yaml");
	std::fs::write(&entity, "title: Release notes\nauthor:\n  name: Ada\n")?;

	common::token_filter_cmd()
		.arg("render")
		.arg("--path")
		.arg(tmp.path())
		.arg("--entity-type")
		.arg("node")
		.arg("--entity")
		.arg(&entity)
		.write_stdin("[node:title] by [node:author:name]")
		.assert()
		.success()
		.stdout("Release notes by Ada");

	Ok(())
}

#[test]
fn render_entity_requires_entity_type() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::token_filter_cmd()
		.arg("render")
		.arg("--path")
		.arg(tmp.path())
		.arg("--entity")
		.arg(tmp.path().join("node.json"))
		.write_stdin("")
		.assert()
		.failure();

	Ok(())
}

#[test]
fn render_json_reports_unresolved_tokens() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_site_project(tmp.path())?;

	let output = common::token_filter_cmd()
		.arg("render")
		.arg("--path")
		.arg(tmp.path())
		.arg("--format")
		.arg("json")
		.write_stdin("[site:name] [site:missing] [site:missing] [user:name]")
		.output()?;

	assert!(output.status.success());
	let result: Value = serde_json::from_slice(&output.stdout)?;
	assert_eq!(result["text"], "Acme [site:missing] [site:missing] [user:name]");
	assert_eq!(result["langcode"], "fr");
	assert_eq!(result["replacements"], 1);
	assert_eq!(
		result["unresolved"],
		serde_json::json!(["[site:missing]", "[user:name]"])
	);
	assert_eq!(result["namespaces"], serde_json::json!(["site"]));

	Ok(())
}

#[test]
fn render_langcode_flag_overrides_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_site_project(tmp.path())?;

	let output = common::token_filter_cmd()
		.arg("render")
		.arg("--path")
		.arg(tmp.path())
		.arg("--langcode")
		.arg("de")
		.arg("--format")
		.arg("json")
		.write_stdin("[site:name]")
		.output()?;

	let result: Value = serde_json::from_slice(&output.stdout)?;
	assert_eq!(result["langcode"], "de");

	Ok(())
}

#[test]
fn render_applies_filter_options_from_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("site.json"),
		r#"{ "name": "Fish & <Chips>" }"#,
	)?;
	std::fs::write(
		tmp.path().join("token_filter.toml"),
		"[filter]\nunresolved = \"clear\"\nescape_html = true\n\n[data]\nsite = \"site.json\"\n",
	)?;

	common::token_filter_cmd()
		.arg("render")
		.arg("--path")
		.arg(tmp.path())
		.write_stdin("<b>[site:name]</b>[site:missing][user:name]")
		.assert()
		.success()
		.stdout("<b>Fish &amp; &lt;Chips&gt;</b>");

	Ok(())
}

#[test]
fn render_diff_shows_changed_lines() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_site_project(tmp.path())?;

	common::token_filter_cmd()
		.arg("render")
		.arg("--diff")
		.arg("--path")
		.arg(tmp.path())
		.write_stdin("Title\nWelcome to [site:name]\n")
		.assert()
		.success()
		.stdout("")
		.stderr(predicates::str::contains("-Welcome to [site:name]"))
		.stderr(predicates::str::contains("+Welcome to Acme"))
		.stderr(predicates::str::contains("1 replaced, 0 unresolved"));

	Ok(())
}

#[test]
fn render_diff_reports_no_changes() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::token_filter_cmd()
		.arg("render")
		.arg("--diff")
		.arg("--path")
		.arg(tmp.path())
		.write_stdin("plain text\n")
		.assert()
		.success()
		.stderr(predicates::str::contains("No tokens were replaced."));

	Ok(())
}

#[test]
fn render_fails_on_missing_data_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("token_filter.toml"),
		"[data]\nsite = \"missing.json\"\n",
	)?;

	common::token_filter_cmd()
		.arg("render")
		.arg("--path")
		.arg(tmp.path())
		.write_stdin("[site:name]")
		.assert()
		.code(2)
		.stderr(predicates::str::contains("missing.json"))
		.stdout(predicates::str::contains("[site:name]").not());

	Ok(())
}

#[test]
fn render_fails_on_invalid_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("token_filter.toml"), "[data\n")?;

	common::token_filter_cmd()
		.arg("render")
		.arg("--path")
		.arg(tmp.path())
		.write_stdin("")
		.assert()
		.code(2);

	Ok(())
}

#[test]
fn verbose_logs_unresolved_tokens_to_stderr() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_site_project(tmp.path())?;

	common::token_filter_cmd()
		.arg("render")
		.arg("--verbose")
		.arg("--path")
		.arg(tmp.path())
		.write_stdin("[site:missing]")
		.assert()
		.success()
		.stdout("[site:missing]")
		.stderr(predicates::str::contains("token could not be resolved"));

	Ok(())
}

#[test]
fn no_subcommand_exits_with_one() {
	common::token_filter_cmd()
		.assert()
		.code(1)
		.stderr(predicates::str::contains("No subcommand specified"));
}
