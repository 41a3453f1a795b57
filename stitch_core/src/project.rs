use std::path::Path;
use std::path::PathBuf;

use crate::Engine;
use crate::RenderDiagnostic;
use crate::StitchConfig;
use crate::StitchResult;

/// A project root together with its loaded configuration.
#[derive(Debug, Clone)]
pub struct ProjectContext {
	pub root: PathBuf,
	pub config: StitchConfig,
	/// Path of the config file that was loaded, if one was found.
	pub config_path: Option<PathBuf>,
}

impl ProjectContext {
	/// Load the project at `root`. A missing config file yields the default
	/// configuration with no pages.
	pub fn load(root: impl Into<PathBuf>) -> StitchResult<Self> {
		let root = root.into();
		let config_path = StitchConfig::resolve_path(&root);
		let config = StitchConfig::load(&root)?.unwrap_or_default();

		Ok(Self {
			root,
			config,
			config_path,
		})
	}

	pub fn with_config(root: impl Into<PathBuf>, config: StitchConfig) -> Self {
		Self {
			root: root.into(),
			config,
			config_path: None,
		}
	}

	/// A filesystem engine configured from this project.
	pub fn engine(&self) -> StitchResult<Engine> {
		Engine::new().with_options(self.config.engine_options())
	}

	/// Resolve a path given relative to the project root.
	pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
		self.root.join(path)
	}
}

/// The rendered output for one configured page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOutput {
	pub entry: PathBuf,
	pub output: PathBuf,
	pub text: String,
	/// False when the output file already holds exactly this text.
	pub changed: bool,
}

/// Result of rendering every page of a project.
#[derive(Debug, Default)]
pub struct BuildResult {
	pub pages: Vec<PageOutput>,
	/// Diagnostics collected across all pages.
	pub diagnostics: Vec<RenderDiagnostic>,
}

impl BuildResult {
	/// Number of pages whose output differs from what is on disk.
	pub fn changed_count(&self) -> usize {
		self.pages.iter().filter(|page| page.changed).count()
	}

	/// Returns true when no page dropped anything from its output.
	pub fn is_clean(&self) -> bool {
		self.diagnostics.is_empty()
	}
}

/// Render every configured page. Nothing is written to disk.
///
/// In strict mode the first unreadable document or exceeded depth limit
/// aborts the build. Removed markers are reported in both modes.
pub fn compute_outputs(ctx: &ProjectContext) -> StitchResult<BuildResult> {
	let engine = ctx.engine()?;
	let mut result = BuildResult::default();

	for page in &ctx.config.pages {
		let entry = ctx.resolve(&page.entry);
		let output = ctx.resolve(&page.output);

		let rendered = if ctx.config.strict {
			engine.try_render_with_diagnostics(&entry)?
		} else {
			engine.render_with_diagnostics(&entry)
		};
		result.diagnostics.extend(rendered.diagnostics);
		let text = rendered.text;

		let changed = std::fs::read_to_string(&output).map_or(true, |current| current != text);
		tracing::debug!(entry = %entry.display(), changed, "rendered page");

		result.pages.push(PageOutput {
			entry,
			output,
			text,
			changed,
		});
	}

	Ok(result)
}

/// Write every changed page to its output path, creating parent directories
/// as needed.
pub fn write_outputs(result: &BuildResult) -> StitchResult<()> {
	for page in result.pages.iter().filter(|page| page.changed) {
		if let Some(parent) = page.output.parent() {
			std::fs::create_dir_all(parent)?;
		}
		std::fs::write(&page.output, &page.text)?;
	}

	Ok(())
}
