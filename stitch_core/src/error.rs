use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum StitchError {
	#[error(transparent)]
	#[diagnostic(code(stitch::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(stitch::config_parse),
		help("check that stitch.toml is valid TOML with optional `tag`, `max_depth` and [[pages]] entries")
	)]
	ConfigParse(String),

	#[error("invalid component tag name: `{0}`")]
	#[diagnostic(
		code(stitch::invalid_tag),
		help("the tag name must be non-empty and contain no whitespace, e.g. `Component`")
	)]
	InvalidTag(String),

	#[error("entry document not found: `{0}`")]
	#[diagnostic(code(stitch::missing_entry))]
	MissingEntry(String),

	#[error("failed to read document `{path}`: {reason}")]
	#[diagnostic(code(stitch::unreadable_document))]
	UnreadableDocument { path: String, reason: String },

	#[error("component nesting exceeded the depth limit of {limit} at `{path}`")]
	#[diagnostic(
		code(stitch::depth_limit),
		help("check for a component that includes itself, or raise `max_depth` in stitch.toml")
	)]
	DepthLimitExceeded { path: String, limit: usize },
}

pub type StitchResult<T> = Result<T, StitchError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
