mod common;

use serde_json::Value;
use token_filter_core::AnyEmptyResult;

#[test]
fn scan_groups_tokens_by_namespace() -> AnyEmptyResult {
	common::token_filter_cmd()
		.arg("scan")
		.write_stdin("[site:name] and [node:title|Untitled] then [site:mail] [not a token]")
		.assert()
		.success()
		.stdout(predicates::str::contains("node (1)"))
		.stdout(predicates::str::contains("site (2)"))
		.stdout(predicates::str::contains("(fallback: Untitled)"))
		.stdout(predicates::str::contains("3 token(s) in 2 namespace(s)"));

	Ok(())
}

#[test]
fn scan_reports_no_tokens() {
	common::token_filter_cmd()
		.arg("scan")
		.write_stdin("plain [text] without: tokens")
		.assert()
		.success()
		.stdout("No tokens found.\n");
}

#[test]
fn scan_json_includes_spans() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let input = tmp.path().join("page.txt");
	std::fs::write(&input, "Hi [user:name]")?;

	let output = common::token_filter_cmd()
		.arg("scan")
		.arg(&input)
		.arg("--format")
		.arg("json")
		.output()?;

	assert!(output.status.success());
	let value: Value = serde_json::from_slice(&output.stdout)?;
	let token = &value["user"][0];
	assert_eq!(token["namespace"], "user");
	assert_eq!(token["path"], "name");
	assert_eq!(token["raw"], "[user:name]");
	assert_eq!(token["span"]["start"], 3);
	assert_eq!(token["span"]["end"], 14);

	Ok(())
}

#[test]
fn scan_missing_file_fails() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::token_filter_cmd()
		.arg("scan")
		.arg(tmp.path().join("missing.txt"))
		.assert()
		.code(2)
		.stderr(predicates::str::contains("error:"));

	Ok(())
}
