use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::DEFAULT_TAG;
use crate::EngineOptions;
use crate::StitchError;
use crate::StitchResult;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
	["stitch.toml", ".stitch.toml", ".config/stitch.toml"];

/// Configuration loaded from a `stitch.toml` file.
///
/// ```toml
/// tag = "Component"
/// max_depth = 64
/// strict = false
///
/// [[pages]]
/// entry = "src/index.html"
/// output = "dist/index.html"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct StitchConfig {
	/// Tag name that opens a component marker, e.g. `Component` for
	/// `<Component file={"card.html"} />`.
	#[serde(default = "default_tag")]
	pub tag: String,
	/// Maximum nesting depth for component includes. When absent, nesting is
	/// unbounded and a component that includes itself never terminates.
	#[serde(default)]
	pub max_depth: Option<usize>,
	/// When true, unreadable documents and exceeded depth limits fail the
	/// build instead of being dropped from the output.
	#[serde(default)]
	pub strict: bool,
	/// Pages rendered by `stitch build`.
	#[serde(default)]
	pub pages: Vec<PageConfig>,
}

/// An entry document and the file its rendered output is written to. Both
/// paths are relative to the project root.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PageConfig {
	pub entry: PathBuf,
	pub output: PathBuf,
}

fn default_tag() -> String {
	DEFAULT_TAG.to_string()
}

impl Default for StitchConfig {
	fn default() -> Self {
		Self {
			tag: default_tag(),
			max_depth: None,
			strict: false,
			pages: Vec::new(),
		}
	}
}

impl StitchConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> StitchResult<Option<StitchConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config = Self::from_toml(&content)?;
		tracing::debug!(path = %config_path.display(), "loaded config");

		Ok(Some(config))
	}

	/// Parse config from TOML source.
	pub fn from_toml(content: &str) -> StitchResult<StitchConfig> {
		let config: StitchConfig =
			toml::from_str(content).map_err(|e| StitchError::ConfigParse(e.to_string()))?;

		Ok(config)
	}

	/// Engine options described by this config.
	pub fn engine_options(&self) -> EngineOptions {
		EngineOptions {
			tag: self.tag.clone(),
			max_depth: self.max_depth,
		}
	}
}
