use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Compose documents from reusable file components.",
	long_about = "stitch expands self-closing component markers such as `<Component \
	              file={\"card.html\"} title={'Hi'} />` into the referenced file, substituting \
	              `%title%` placeholders and `foreach` blocks along the way.\n\nQuick start:\n  \
	              stitch init             Create stitch.toml and a sample page\n  stitch build    \
	              Render every configured page\n  stitch render <ENTRY>   Render one document to \
	              stdout\n  stitch check            Report markers that were dropped"
)]
pub struct StitchCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output and debug logging.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,

	/// Tag name that opens a component marker. Overrides `tag` in
	/// stitch.toml.
	#[arg(long, global = true)]
	pub tag: Option<String>,

	/// Maximum component nesting depth. Overrides `max_depth` in
	/// stitch.toml.
	#[arg(long, global = true)]
	pub max_depth: Option<usize>,

	/// Fail on unreadable documents and exceeded depth limits instead of
	/// dropping them from the output.
	#[arg(long, global = true, default_value_t = false)]
	pub strict: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Initialize stitch in a project.
	///
	/// Creates `stitch.toml` with one configured page, plus a sample page and
	/// component under `src/`. Files that already exist are left untouched.
	Init,
	/// Render a single document with every component marker expanded.
	///
	/// The entry path is relative to the project root. Output goes to stdout
	/// unless `--output` is given.
	Render {
		/// The entry document to render.
		entry: PathBuf,

		/// Write the rendered text to this file instead of stdout.
		#[arg(long, short)]
		output: Option<PathBuf>,

		/// Watch for file changes and re-render automatically.
		#[arg(long, default_value_t = false)]
		watch: bool,
	},
	/// Render every page configured in stitch.toml.
	///
	/// Each `[[pages]]` entry is rendered and written to its output path.
	/// Outputs that already hold the rendered text are not rewritten.
	Build {
		/// Report which outputs would change without writing them.
		#[arg(long, default_value_t = false)]
		dry_run: bool,

		/// Watch for file changes and rebuild automatically.
		#[arg(long, default_value_t = false)]
		watch: bool,
	},
	/// Report markers and documents that would be dropped while rendering.
	///
	/// Checks a single entry when one is given, otherwise every configured
	/// page. Exits with a non-zero status code when anything is reported.
	Check {
		/// The entry document to check. Defaults to every configured page.
		entry: Option<PathBuf>,

		/// Output format for check results. Use `text` for human-readable
		/// output or `json` for programmatic consumption.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption. Each diagnostic includes its
	/// kind, the document it was found in and the marker position.
	Json,
}
