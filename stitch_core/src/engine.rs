use std::fmt;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;

use crate::DEFAULT_TAG;
use crate::DocumentLoader;
use crate::FileSystemLoader;
use crate::MarkerScanner;
use crate::Position;
use crate::StitchError;
use crate::StitchResult;
use crate::normalize_encoding;
use crate::substitute_with_report;

/// Settings that change how documents are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
	/// Tag name that opens a marker.
	pub tag: String,
	/// Maximum include nesting. `None` leaves nesting unbounded, so a
	/// component that includes itself recurses until the stack is exhausted.
	pub max_depth: Option<usize>,
}

impl Default for EngineOptions {
	fn default() -> Self {
		Self {
			tag: DEFAULT_TAG.to_string(),
			max_depth: None,
		}
	}
}

/// Something the engine dropped from the output while rendering. None of
/// these stop rendering; they describe text that silently disappeared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[non_exhaustive]
pub enum RenderDiagnostic {
	/// The entry document does not exist, so the output is empty.
	MissingEntry { path: PathBuf },
	/// A marker had no `file` option and was removed.
	MissingFileOption {
		document: PathBuf,
		position: Position,
	},
	/// A marker referenced a component that does not exist and was removed.
	MissingComponent {
		document: PathBuf,
		position: Position,
		component: PathBuf,
	},
	/// A document exists but could not be read. It rendered as empty text.
	UnreadableDocument { path: PathBuf, reason: String },
	/// A list option found no `foreach` block in its component.
	UnmatchedListOption {
		document: PathBuf,
		position: Position,
		component: PathBuf,
		option: String,
	},
	/// A marker would have nested deeper than the configured limit and was
	/// removed.
	DepthLimitReached {
		document: PathBuf,
		position: Position,
		component: PathBuf,
		limit: usize,
	},
}

impl RenderDiagnostic {
	/// The document the diagnostic was reported in.
	pub fn document(&self) -> &Path {
		match self {
			Self::MissingEntry { path } | Self::UnreadableDocument { path, .. } => path,
			Self::MissingFileOption { document, .. }
			| Self::MissingComponent { document, .. }
			| Self::UnmatchedListOption { document, .. }
			| Self::DepthLimitReached { document, .. } => document,
		}
	}

	/// Where in [`RenderDiagnostic::document`] the offending marker starts.
	pub fn position(&self) -> Option<&Position> {
		match self {
			Self::MissingEntry { .. } | Self::UnreadableDocument { .. } => None,
			Self::MissingFileOption { position, .. }
			| Self::MissingComponent { position, .. }
			| Self::UnmatchedListOption { position, .. }
			| Self::DepthLimitReached { position, .. } => Some(position),
		}
	}
}

impl fmt::Display for RenderDiagnostic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::MissingEntry { path } => {
				write!(f, "entry document `{}` does not exist", path.display())
			}
			Self::MissingFileOption { .. } => {
				write!(f, "marker has no `file` option and was removed")
			}
			Self::MissingComponent { component, .. } => {
				write!(
					f,
					"component `{}` does not exist; marker was removed",
					component.display()
				)
			}
			Self::UnreadableDocument { path, reason } => {
				write!(f, "could not read `{}`: {reason}", path.display())
			}
			Self::UnmatchedListOption {
				component, option, ..
			} => {
				write!(
					f,
					"list option `{option}` has no `foreach %{option}%` block in `{}`",
					component.display()
				)
			}
			Self::DepthLimitReached {
				component, limit, ..
			} => {
				write!(
					f,
					"including `{}` would exceed the depth limit of {limit}; marker was removed",
					component.display()
				)
			}
		}
	}
}

/// Output of a render together with everything dropped along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
	pub text: String,
	pub diagnostics: Vec<RenderDiagnostic>,
}

impl Rendered {
	/// Returns true when nothing was dropped from the output.
	pub fn is_clean(&self) -> bool {
		self.diagnostics.is_empty()
	}
}

/// Expands component markers recursively, starting from an entry document.
///
/// Documents are read every time they are referenced; nothing is cached
/// between markers or between calls.
#[derive(Debug, Clone)]
pub struct Engine<L = FileSystemLoader> {
	loader: L,
	scanner: MarkerScanner,
	max_depth: Option<usize>,
}

impl Engine {
	/// An engine reading from the filesystem with default options.
	pub fn new() -> Self {
		Self::with_loader(FileSystemLoader)
	}
}

impl Default for Engine {
	fn default() -> Self {
		Self::new()
	}
}

impl<L: DocumentLoader> Engine<L> {
	pub fn with_loader(loader: L) -> Self {
		Self {
			loader,
			scanner: MarkerScanner::default(),
			max_depth: None,
		}
	}

	/// Replace the engine options. Fails when the tag name is not usable.
	pub fn with_options(mut self, options: EngineOptions) -> StitchResult<Self> {
		self.scanner = MarkerScanner::new(options.tag)?;
		self.max_depth = options.max_depth;
		Ok(self)
	}

	pub fn scanner(&self) -> &MarkerScanner {
		&self.scanner
	}

	/// Render `path` with every marker expanded. A missing entry renders as
	/// empty text.
	pub fn render(&self, path: impl AsRef<Path>) -> String {
		self.render_with_diagnostics(path).text
	}

	/// Render `path` and report every marker or document that was dropped.
	pub fn render_with_diagnostics(&self, path: impl AsRef<Path>) -> Rendered {
		let path = path.as_ref();
		let mut resolution = Resolution::new(self, false);

		if !self.loader.exists(path) {
			resolution.diagnostics.push(RenderDiagnostic::MissingEntry {
				path: path.to_path_buf(),
			});
		}

		let text = match resolution.resolve(path, 0) {
			Ok(text) => text,
			Err(error) => {
				tracing::warn!(%error, "render failed");
				String::new()
			}
		};

		Rendered {
			text,
			diagnostics: resolution.diagnostics,
		}
	}

	/// Render `path`, failing on a missing entry, an unreadable document or an
	/// exceeded depth limit instead of dropping them. Missing components and
	/// markers without a `file` option are still removed.
	pub fn try_render(&self, path: impl AsRef<Path>) -> StitchResult<String> {
		self.try_render_with_diagnostics(path).map(|rendered| rendered.text)
	}

	/// Like [`Engine::try_render`], but also reports the markers that were
	/// removed along the way.
	pub fn try_render_with_diagnostics(&self, path: impl AsRef<Path>) -> StitchResult<Rendered> {
		let path = path.as_ref();
		if !self.loader.exists(path) {
			return Err(StitchError::MissingEntry(path.display().to_string()));
		}

		let mut resolution = Resolution::new(self, true);
		let text = resolution.resolve(path, 0)?;

		Ok(Rendered {
			text,
			diagnostics: resolution.diagnostics,
		})
	}
}

/// Render `path` from the filesystem with default options.
pub fn render(path: impl AsRef<Path>) -> String {
	Engine::new().render(path)
}

/// Where the component named by a marker's `file` option lives. Values that
/// start with a path separator are absolute; anything else is relative to the
/// directory containing `document`.
pub fn resolve_component_path(document: &Path, file: &str) -> PathBuf {
	if file.starts_with(std::path::is_separator) {
		return PathBuf::from(file);
	}

	document
		.parent()
		.unwrap_or_else(|| Path::new(""))
		.join(file)
}

/// State for one top-level render.
struct Resolution<'a, L> {
	engine: &'a Engine<L>,
	strict: bool,
	diagnostics: Vec<RenderDiagnostic>,
}

impl<'a, L: DocumentLoader> Resolution<'a, L> {
	fn new(engine: &'a Engine<L>, strict: bool) -> Self {
		Self {
			engine,
			strict,
			diagnostics: Vec::new(),
		}
	}

	#[tracing::instrument(level = "debug", skip(self, path), fields(path = %path.display()))]
	fn resolve(&mut self, path: &Path, depth: usize) -> StitchResult<String> {
		let engine = self.engine;
		let loader = &engine.loader;
		if !loader.exists(path) {
			tracing::debug!("document does not exist");
			return Ok(String::new());
		}

		let mut text = match loader.read(path) {
			Ok(bytes) => normalize_encoding(bytes),
			Err(error) => {
				if self.strict {
					return Err(StitchError::UnreadableDocument {
						path: path.display().to_string(),
						reason: error.to_string(),
					});
				}

				tracing::warn!(%error, "unable to read document");
				self.diagnostics.push(RenderDiagnostic::UnreadableDocument {
					path: path.to_path_buf(),
					reason: error.to_string(),
				});
				return Ok(String::new());
			}
		};

		let markers = engine.scanner.scan(&text);
		if markers.is_empty() {
			return Ok(text);
		}
		tracing::debug!(count = markers.len(), "found markers");

		for marker in markers {
			let Some(file) = marker.options.file() else {
				self.diagnostics.push(RenderDiagnostic::MissingFileOption {
					document: path.to_path_buf(),
					position: marker.position,
				});
				text = text.replace(&marker.raw, "");
				continue;
			};

			let component = resolve_component_path(path, file);
			if !loader.exists(&component) {
				tracing::debug!(component = %component.display(), "component does not exist");
				self.diagnostics.push(RenderDiagnostic::MissingComponent {
					document: path.to_path_buf(),
					position: marker.position,
					component,
				});
				text = text.replace(&marker.raw, "");
				continue;
			}

			if let Some(limit) = engine.max_depth {
				if depth >= limit {
					if self.strict {
						return Err(StitchError::DepthLimitExceeded {
							path: component.display().to_string(),
							limit,
						});
					}

					tracing::warn!(component = %component.display(), limit, "depth limit reached");
					self.diagnostics.push(RenderDiagnostic::DepthLimitReached {
						document: path.to_path_buf(),
						position: marker.position,
						component,
						limit,
					});
					text = text.replace(&marker.raw, "");
					continue;
				}
			}

			let child = self.resolve(&component, depth + 1)?;
			let substitution = substitute_with_report(&child, &marker.options);
			for option in substitution.unmatched_lists {
				self.diagnostics.push(RenderDiagnostic::UnmatchedListOption {
					document: path.to_path_buf(),
					position: marker.position,
					component: component.clone(),
					option,
				});
			}

			text = text.replace(&marker.raw, &substitution.text);
		}

		Ok(text)
	}
}
