use std::ops::Range;
use std::sync::LazyLock;

use derive_more::Deref;
use regex::Regex;

use crate::Position;
use crate::StitchError;
use crate::StitchResult;
use crate::lexer::list_elements;

/// The tag name used by markers when no other name is configured.
pub const DEFAULT_TAG: &str = "Component";

/// The option naming the document a marker includes.
pub const FILE_OPTION: &str = "file";

/// Matches one option fragment inside a marker body. Braced values stop at
/// the first `}` so `id={'123456}'}` yields `'123456`.
static OPTION_FRAGMENT: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r#"(?P<key>[^\s={}"']+)\s*=\s*(?:\{(?P<braced>.*?)\}|"(?P<double>[^"]*)"|'(?P<single>[^']*)')"#,
	)
	.unwrap_or_else(|e| panic!("invalid option fragment pattern: {e}"))
});

static DEFAULT_SCANNER: LazyLock<MarkerScanner> = LazyLock::new(|| {
	MarkerScanner::new(DEFAULT_TAG)
		.unwrap_or_else(|e| panic!("invalid default marker tag: {e}"))
});

/// The value of a single marker option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
	/// A single string, substituted directly for `%name%`.
	Scalar(String),
	/// An ordered list of strings, expanded through `foreach` blocks.
	List(Vec<String>),
}

impl OptionValue {
	pub fn as_scalar(&self) -> Option<&str> {
		match self {
			Self::Scalar(value) => Some(value.as_str()),
			Self::List(_) => None,
		}
	}

	pub fn as_list(&self) -> Option<&[String]> {
		match self {
			Self::Scalar(_) => None,
			Self::List(values) => Some(values.as_slice()),
		}
	}

	pub fn is_list(&self) -> bool {
		matches!(self, Self::List(_))
	}
}

impl From<&str> for OptionValue {
	fn from(value: &str) -> Self {
		Self::Scalar(value.to_string())
	}
}

impl From<Vec<&str>> for OptionValue {
	fn from(values: Vec<&str>) -> Self {
		Self::List(values.into_iter().map(ToString::to_string).collect())
	}
}

/// Options parsed from a single marker, in the order their keys first
/// appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref)]
pub struct OptionSet(Vec<(String, OptionValue)>);

impl OptionSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert an option. A key that is already present keeps its position and
	/// takes the new value.
	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<OptionValue>) {
		let name = name.into();
		let value = value.into();

		if let Some(slot) = self.0.iter_mut().find(|(key, _)| *key == name) {
			slot.1 = value;
		} else {
			self.0.push((name, value));
		}
	}

	pub fn get(&self, name: &str) -> Option<&OptionValue> {
		self.0
			.iter()
			.find_map(|(key, value)| (key == name).then_some(value))
	}

	/// The scalar `file` option, if present.
	pub fn file(&self) -> Option<&str> {
		self.get(FILE_OPTION).and_then(OptionValue::as_scalar)
	}

	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(|(key, _)| key.as_str())
	}
}

impl<K: Into<String>, V: Into<OptionValue>> FromIterator<(K, V)> for OptionSet {
	fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
		let mut options = Self::new();
		for (name, value) in iter {
			options.insert(name, value);
		}
		options
	}
}

/// One occurrence of a self-closing component tag inside a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentMarker {
	/// The exact matched text. Splicing replaces this text wherever it occurs.
	pub raw: String,
	/// Byte range of the match in the scanned text.
	pub span: Range<usize>,
	/// Line and column of the match in the scanned text.
	pub position: Position,
	pub options: OptionSet,
}

/// Finds and parses markers for one tag name, e.g. `<Component ... />`.
#[derive(Debug, Clone)]
pub struct MarkerScanner {
	tag: String,
	pattern: Regex,
}

impl MarkerScanner {
	pub fn new(tag: impl Into<String>) -> StitchResult<Self> {
		let tag = tag.into();
		if tag.is_empty() || tag.chars().any(|c| c.is_whitespace() || c == '/' || c == '>') {
			return Err(StitchError::InvalidTag(tag));
		}

		let pattern = Regex::new(&format!(r"(?s)<{}.*?/>", regex::escape(&tag)))
			.map_err(|_| StitchError::InvalidTag(tag.clone()))?;

		Ok(Self { tag, pattern })
	}

	pub fn tag(&self) -> &str {
		&self.tag
	}

	/// Find every marker in `text`, in order of appearance. Each match runs
	/// from the opening tag to the nearest following `/>`, across lines.
	pub fn scan(&self, text: &str) -> Vec<ComponentMarker> {
		self.pattern
			.find_iter(text)
			.map(|found| {
				let raw = found.as_str();
				ComponentMarker {
					raw: raw.to_string(),
					span: found.range(),
					position: Position::from_span(text, found.range()),
					options: self.parse_options(raw),
				}
			})
			.collect()
	}

	/// Parse the options of a single marker's raw text.
	pub fn parse_options(&self, raw: &str) -> OptionSet {
		let body = raw.replace("\r\n", " ").replace(['\n', '\r'], " ");
		let body = body
			.strip_prefix('<')
			.and_then(|rest| rest.strip_prefix(self.tag.as_str()))
			.unwrap_or(&body);
		let body = body.strip_suffix("/>").unwrap_or(body);

		let mut collected: Vec<(String, String)> = Vec::new();
		for captures in OPTION_FRAGMENT.captures_iter(body) {
			let key = captures["key"].trim().to_string();
			let Some(value) = captures
				.name("braced")
				.or_else(|| captures.name("double"))
				.or_else(|| captures.name("single"))
			else {
				continue;
			};
			let value = clean_value(value.as_str()).to_string();

			if let Some(slot) = collected.iter_mut().find(|(existing, _)| *existing == key) {
				slot.1 = value;
			} else {
				collected.push((key, value));
			}
		}

		let options: OptionSet = collected
			.into_iter()
			.filter(|(_, value)| !is_falsy(value))
			.map(|(key, value)| {
				let value = classify_value(&value);
				(key, value)
			})
			.collect();

		tracing::trace!(marker = raw, options = options.len(), "parsed marker options");
		options
	}
}

impl Default for MarkerScanner {
	fn default() -> Self {
		DEFAULT_SCANNER.clone()
	}
}

/// Find every `<Component ... />` marker in `text`.
pub fn find_markers(text: &str) -> Vec<ComponentMarker> {
	DEFAULT_SCANNER.scan(text)
}

/// Parse the options of a `<Component ... />` marker.
pub fn parse_options(raw: &str) -> OptionSet {
	DEFAULT_SCANNER.parse_options(raw)
}

/// Empty values and the literal `0` never become options.
fn is_falsy(value: &str) -> bool {
	value.is_empty() || value == "0"
}

fn classify_value(value: &str) -> OptionValue {
	if value.starts_with('[') && value.ends_with(']') {
		let elements = list_elements(value)
			.into_iter()
			.map(|element| clean_value(element).to_string())
			.collect();
		return OptionValue::List(elements);
	}

	OptionValue::Scalar(value.to_string())
}

const OPENING_QUOTES: [char; 4] = ['"', '\'', '\u{201C}', '\u{2018}'];
const CLOSING_QUOTES: [char; 4] = ['"', '\'', '\u{201D}', '\u{2019}'];

/// Trim whitespace and one layer of quote characters from each end. Quotes
/// are cosmetic, so an unbalanced quote is removed as well.
fn clean_value(value: &str) -> &str {
	let value = value.trim();
	let value = value.strip_prefix(OPENING_QUOTES).unwrap_or(value);
	let value = value.strip_suffix(CLOSING_QUOTES).unwrap_or(value);
	value.trim()
}
