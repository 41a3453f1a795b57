use std::path::Path;
use std::path::PathBuf;
use std::process;
use std::sync::mpsc;
use std::time::Duration;

use clap::Parser;
use owo_colors::OwoColorize;
use stitch_cli::Commands;
use stitch_cli::OutputFormat;
use stitch_cli::StitchCli;
use stitch_core::AnyEmptyResult;
use stitch_core::AnyResult;
use stitch_core::RenderDiagnostic;
use stitch_core::StitchError;
use stitch_core::StitchResult;
use stitch_core::project::ProjectContext;
use stitch_core::project::compute_outputs;
use stitch_core::project::write_outputs;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
}

const SAMPLE_CONFIG: &str = "# stitch configuration\n\n# Tag name that opens a component \
                             marker.\n# tag = \"Component\"\n\n# Maximum component nesting \
                             depth. Unbounded when absent.\n# max_depth = 64\n\n[[pages]]\nentry \
                             = \"src/index.html\"\noutput = \"dist/index.html\"\n";

const SAMPLE_PAGE: &str = "<!doctype html>\n<html>\n  <body>\n    <Component \
                           file={\"card.html\"} title={'Hello from stitch'} items={['one', \
                           'two']} />\n  </body>\n</html>\n";

const SAMPLE_COMPONENT: &str = "<section>\n  <h1>%title%</h1>\n  <ul>\n    <!-- foreach \
                                %items% --><li>%items%</li><!-- endforeach %items% -->\n  \
                                </ul>\n</section>\n";

fn main() {
	let args = StitchCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_tracing(args.verbose, use_color);

	let result = match &args.command {
		Some(Commands::Init) => run_init(&args),
		Some(Commands::Render {
			entry,
			output,
			watch,
		}) => run_render(&args, entry, output.as_deref(), *watch),
		Some(Commands::Build { dry_run, watch }) => run_build(&args, *dry_run, *watch),
		Some(Commands::Check { entry, format }) => run_check(&args, entry.as_deref(), *format),
		None => {
			eprintln!("No subcommand specified. Run `stitch --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		match e.downcast::<StitchError>() {
			Ok(stitch_err) => {
				let report: miette::Report = (*stitch_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Log to stderr. `STITCH_LOG` takes precedence over `RUST_LOG`.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_directive = if verbose { "debug" } else { "warn" };
	let filter = EnvFilter::try_from_env("STITCH_LOG")
		.or_else(|_| EnvFilter::try_from_default_env())
		.unwrap_or_else(|_| EnvFilter::new(default_directive));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.without_time()
		.try_init()
		.ok();
}

fn resolve_root(args: &StitchCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Load the project and apply command line overrides on top of stitch.toml.
fn load_context(args: &StitchCli) -> StitchResult<ProjectContext> {
	let mut ctx = ProjectContext::load(resolve_root(args))?;

	if let Some(tag) = &args.tag {
		ctx.config.tag.clone_from(tag);
	}
	if let Some(max_depth) = args.max_depth {
		ctx.config.max_depth = Some(max_depth);
	}
	if args.strict {
		ctx.config.strict = true;
	}

	Ok(ctx)
}

fn run_init(args: &StitchCli) -> AnyEmptyResult {
	let root = resolve_root(args);
	let files = [
		(root.join("stitch.toml"), SAMPLE_CONFIG),
		(root.join("src/index.html"), SAMPLE_PAGE),
		(root.join("src/card.html"), SAMPLE_COMPONENT),
	];

	let mut created = 0;
	for (path, content) in &files {
		if path.exists() {
			println!("File already exists: {}", path.display());
			continue;
		}

		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		std::fs::write(path, content)?;
		println!("Created {}", path.display());
		created += 1;
	}

	if created > 0 {
		println!();
		println!("Next steps:");
		println!("  1. Edit src/card.html and src/index.html");
		println!("  2. Run `stitch build` to write dist/index.html");
	}

	Ok(())
}

fn run_render(
	args: &StitchCli,
	entry: &Path,
	output: Option<&Path>,
	watch: bool,
) -> AnyEmptyResult {
	run_render_once(args, entry, output)?;

	if !watch {
		return Ok(());
	}

	watch_project(args, "rendering", || run_render_once(args, entry, output))
}

fn run_render_once(args: &StitchCli, entry: &Path, output: Option<&Path>) -> AnyEmptyResult {
	let ctx = load_context(args)?;
	let engine = ctx.engine()?;
	let entry = ctx.resolve(entry);

	let rendered = if ctx.config.strict {
		engine.try_render_with_diagnostics(&entry)?
	} else {
		engine.render_with_diagnostics(&entry)
	};
	if !rendered.is_clean() {
		print_diagnostics(&rendered.diagnostics, &ctx.root);
	}
	let text = rendered.text;

	let Some(output) = output else {
		print!("{text}");
		return Ok(());
	};

	let output = ctx.resolve(output);
	let unchanged = std::fs::read_to_string(&output).is_ok_and(|current| current == text);
	if unchanged {
		tracing::debug!(output = %output.display(), "output is up to date");
		return Ok(());
	}

	if let Some(parent) = output.parent() {
		std::fs::create_dir_all(parent)?;
	}
	std::fs::write(&output, &text)?;
	println!("Wrote {}", make_relative(&output, &ctx.root));

	Ok(())
}

fn run_build(args: &StitchCli, dry_run: bool, watch: bool) -> AnyEmptyResult {
	run_build_once(args, dry_run)?;

	if !watch || dry_run {
		return Ok(());
	}

	watch_project(args, "building", || run_build_once(args, false))
}

fn run_build_once(args: &StitchCli, dry_run: bool) -> AnyEmptyResult {
	let ctx = load_context(args)?;
	if ctx.config.pages.is_empty() {
		println!("No pages configured. Add a [[pages]] entry to stitch.toml.");
		return Ok(());
	}

	let result = compute_outputs(&ctx)?;
	print_diagnostics(&result.diagnostics, &ctx.root);

	let changed = result.changed_count();
	if changed == 0 {
		println!("All pages are already up to date.");
		return Ok(());
	}

	if dry_run {
		println!("Dry run: would write {changed} page(s):");
	} else {
		write_outputs(&result)?;
		println!("Wrote {changed} page(s).");
	}

	if dry_run || args.verbose {
		for page in result.pages.iter().filter(|page| page.changed) {
			println!("  {}", make_relative(&page.output, &ctx.root));
		}
	}

	Ok(())
}

fn run_check(args: &StitchCli, entry: Option<&Path>, format: OutputFormat) -> AnyEmptyResult {
	let ctx = load_context(args)?;
	let diagnostics = collect_diagnostics(&ctx, entry)?;

	match format {
		OutputFormat::Json => {
			let entries = diagnostics
				.iter()
				.map(|diagnostic| diagnostic_to_json(diagnostic, &ctx.root))
				.collect::<AnyResult<Vec<_>>>()?;
			let output = serde_json::json!({
				"ok": diagnostics.is_empty(),
				"diagnostics": entries,
			});
			println!("{output}");
		}
		OutputFormat::Text => {
			if diagnostics.is_empty() {
				println!(
					"{} nothing is dropped while rendering.",
					colored!("Check passed:", green)
				);
			} else {
				eprintln!("Check failed.");
				eprintln!();
				for diagnostic in &diagnostics {
					eprintln!("  {}", describe(diagnostic, &ctx.root));
				}
				eprintln!();
				eprintln!("{} diagnostic(s) found.", diagnostics.len());
			}
		}
	}

	if !diagnostics.is_empty() {
		process::exit(1);
	}

	Ok(())
}

/// Diagnostics for a single entry, or for every configured page.
fn collect_diagnostics(
	ctx: &ProjectContext,
	entry: Option<&Path>,
) -> AnyResult<Vec<RenderDiagnostic>> {
	let engine = ctx.engine()?;
	let entries: Vec<PathBuf> = match entry {
		Some(entry) => vec![ctx.resolve(entry)],
		None => {
			ctx.config
				.pages
				.iter()
				.map(|page| ctx.resolve(&page.entry))
				.collect()
		}
	};

	let diagnostics = entries
		.iter()
		.flat_map(|entry| engine.render_with_diagnostics(entry).diagnostics)
		.collect();

	Ok(diagnostics)
}

fn diagnostic_to_json(
	diagnostic: &RenderDiagnostic,
	root: &Path,
) -> AnyResult<serde_json::Value> {
	let mut value = serde_json::to_value(diagnostic)?;
	let relative = serde_json::Value::String(make_relative(diagnostic.document(), root));
	let key = if value.get("document").is_some() {
		"document"
	} else {
		"path"
	};

	value[key] = relative;
	value["message"] = serde_json::Value::String(diagnostic.to_string());

	Ok(value)
}

fn print_diagnostics(diagnostics: &[RenderDiagnostic], root: &Path) {
	for diagnostic in diagnostics {
		eprintln!("{} {}", colored!("warning:", yellow), describe(diagnostic, root));
	}
}

fn describe(diagnostic: &RenderDiagnostic, root: &Path) -> String {
	let document = make_relative(diagnostic.document(), root);
	match diagnostic.position() {
		Some(position) => {
			format!(
				"{document}:{}:{}: {diagnostic}",
				position.start.line, position.start.column
			)
		}
		None => format!("{document}: {diagnostic}"),
	}
}

/// Re-run `run` whenever something under the project root is created or
/// modified, until the process is interrupted.
fn watch_project(
	args: &StitchCli,
	action: &str,
	mut run: impl FnMut() -> AnyEmptyResult,
) -> AnyEmptyResult {
	println!("\nWatching for file changes... (press Ctrl+C to stop)");

	let root = resolve_root(args);
	let (tx, rx) = mpsc::channel();

	let mut watcher =
		notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
			if let Ok(event) = res {
				if matches!(
					event.kind,
					notify::EventKind::Modify(_) | notify::EventKind::Create(_)
				) {
					let _ = tx.send(());
				}
			}
		})?;

	use notify::Watcher;
	watcher.watch(&root, notify::RecursiveMode::Recursive)?;

	loop {
		rx.recv()?;
		// Debounce: drain additional events within 200ms.
		while rx.recv_timeout(Duration::from_millis(200)).is_ok() {}

		println!("\nFile change detected, {action}...");
		if let Err(e) = run() {
			eprintln!("{} {e}", colored!("error:", red));
		}
	}
}

fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
