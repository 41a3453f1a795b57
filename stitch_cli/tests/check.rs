mod common;

use clap::Parser;
use serde_json::Value;
use stitch_cli::Commands;
use stitch_cli::OutputFormat;
use stitch_cli::StitchCli;
use stitch_core::AnyEmptyResult;

#[test]
fn check_passes_for_clean_project() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_files(
		tmp.path(),
		&[
			(
				"stitch.toml",
				"[[pages]]\nentry = \"page.html\"\noutput = \"out.html\"\n",
			),
			("page.html", "<Component file={\"card.html\"} />"),
			("card.html", "card"),
		],
	)?;

	common::stitch_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Check passed"));

	Ok(())
}

#[test]
fn check_fails_on_dropped_markers() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_files(
		tmp.path(),
		&[(
			"page.html",
			"<p>\n<Component title={'x'} />\n<Component file={\"gone.html\"} />\n</p>",
		)],
	)?;

	common::stitch_cmd()
		.arg("check")
		.arg("page.html")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stderr(predicates::str::contains("page.html:2:1: marker has no `file` option"))
		.stderr(predicates::str::contains("page.html:3:1: component"))
		.stderr(predicates::str::contains("2 diagnostic(s) found."));

	Ok(())
}

#[test]
fn check_json_output() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_files(
		tmp.path(),
		&[
			("page.html", "<Component file={\"list.html\"} rows={['a']} />"),
			("list.html", "no loop here"),
		],
	)?;

	let output = common::stitch_cmd()
		.arg("check")
		.arg("page.html")
		.arg("--format")
		.arg("json")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.get_output()
		.stdout
		.clone();

	let json: Value = serde_json::from_slice(&output)?;
	assert_eq!(json["ok"], Value::Bool(false));

	let diagnostics = json["diagnostics"]
		.as_array()
		.ok_or("diagnostics should be an array")?;
	assert_eq!(diagnostics.len(), 1);
	assert_eq!(diagnostics[0]["kind"], "unmatched_list_option");
	assert_eq!(diagnostics[0]["document"], "page.html");
	assert_eq!(diagnostics[0]["option"], "rows");
	assert_eq!(diagnostics[0]["position"]["start"]["line"], 1);

	Ok(())
}

#[test]
fn check_json_output_when_clean() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_files(tmp.path(), &[("page.html", "plain")])?;

	let output = common::stitch_cmd()
		.arg("check")
		.arg("page.html")
		.arg("--format")
		.arg("json")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.get_output()
		.stdout
		.clone();

	let json: Value = serde_json::from_slice(&output)?;
	assert_eq!(json["ok"], Value::Bool(true));
	assert_eq!(json["diagnostics"], Value::Array(Vec::new()));

	Ok(())
}

#[test]
fn check_arguments_parse() -> AnyEmptyResult {
	let cli = StitchCli::try_parse_from([
		"stitch",
		"check",
		"page.html",
		"--format",
		"json",
		"-p",
		"site",
	])?;

	let Some(Commands::Check { entry, format }) = cli.command else {
		return Err("expected the check command".into());
	};
	assert_eq!(entry.as_deref(), Some(std::path::Path::new("page.html")));
	assert!(matches!(format, OutputFormat::Json));
	assert_eq!(cli.path.as_deref(), Some(std::path::Path::new("site")));

	Ok(())
}
