mod common;

use stitch_core::AnyEmptyResult;

const CONFIG: &str = "[[pages]]\nentry = \"src/index.html\"\noutput = \
                      \"dist/index.html\"\n\n[[pages]]\nentry = \"src/about.html\"\noutput = \
                      \"dist/about/index.html\"\n";

fn site(root: &std::path::Path) -> std::io::Result<()> {
	common::write_files(
		root,
		&[
			("stitch.toml", CONFIG),
			(
				"src/index.html",
				"<main><Component file={\"parts/nav.html\"} active={'home'} /></main>",
			),
			(
				"src/about.html",
				"<main><Component file={\"parts/nav.html\"} active={'about'} /></main>",
			),
			("src/parts/nav.html", "<nav data-active=\"%active%\"></nav>"),
		],
	)
}

#[test]
fn build_writes_every_page() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	site(tmp.path())?;

	common::stitch_cmd()
		.arg("build")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Wrote 2 page(s)."));

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("dist/index.html"))?,
		"<main><nav data-active=\"home\"></nav></main>"
	);
	assert_eq!(
		std::fs::read_to_string(tmp.path().join("dist/about/index.html"))?,
		"<main><nav data-active=\"about\"></nav></main>"
	);

	Ok(())
}

#[test]
fn build_is_idempotent() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	site(tmp.path())?;

	common::stitch_cmd()
		.arg("build")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	common::stitch_cmd()
		.arg("build")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("already up to date"));

	Ok(())
}

#[test]
fn build_dry_run_writes_nothing() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	site(tmp.path())?;

	common::stitch_cmd()
		.arg("build")
		.arg("--dry-run")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Dry run: would write 2 page(s):"))
		.stdout(predicates::str::contains("dist/index.html"));

	assert!(!tmp.path().join("dist").exists());

	Ok(())
}

#[test]
fn build_strict_still_warns_about_removed_markers() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	site(tmp.path())?;
	common::write_files(
		tmp.path(),
		&[(
			"src/index.html",
			"<main><Component file={\"parts/gone.html\"} /></main>",
		)],
	)?;

	common::stitch_cmd()
		.arg("build")
		.arg("--strict")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stderr(predicates::str::contains("src/index.html:1:7"))
		.stdout(predicates::str::contains("Wrote 2 page(s)."));

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("dist/index.html"))?,
		"<main></main>"
	);

	Ok(())
}

#[test]
fn build_without_pages() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::stitch_cmd()
		.arg("build")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("No pages configured"));

	Ok(())
}

#[test]
fn build_rejects_invalid_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_files(tmp.path(), &[("stitch.toml", "pages = 3\n")])?;

	common::stitch_cmd()
		.arg("build")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("failed to parse config file"));

	Ok(())
}
