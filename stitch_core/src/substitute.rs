use regex::Regex;

use crate::OptionSet;
use crate::OptionValue;

/// Result of applying a marker's options to a component's text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitution {
	pub text: String,
	/// Names of list options that found no `foreach` block to expand and
	/// therefore left no trace in the text.
	pub unmatched_lists: Vec<String>,
}

/// The placeholder token for an option name, e.g. `%title%`.
pub fn placeholder(name: &str) -> String {
	format!("%{name}%")
}

/// Apply `options` to `text` in order. Scalars replace every `%name%`
/// occurrence; lists expand the `foreach` blocks for `%name%`.
pub fn substitute(text: &str, options: &OptionSet) -> String {
	substitute_with_report(text, options).text
}

/// Like [`substitute`], but also reports list options that had nothing to
/// expand.
pub fn substitute_with_report(text: &str, options: &OptionSet) -> Substitution {
	let mut result = text.to_string();
	let mut unmatched_lists = Vec::new();

	for (name, value) in options.iter() {
		match value {
			OptionValue::Scalar(value) => {
				result = result.replace(&placeholder(name), value);
			}
			OptionValue::List(values) => {
				match expand_loop_blocks(&result, name, values) {
					Some(expanded) => result = expanded,
					None => unmatched_lists.push(name.clone()),
				}
			}
		}
	}

	Substitution {
		text: result,
		unmatched_lists,
	}
}

/// Expand every `<!-- foreach %name% --> ... <!-- endforeach %name% -->`
/// region in `text` once per element of `values`, joining the copies with
/// newlines. Returns `None` when `text` has no such region.
pub fn expand_loop_blocks(text: &str, name: &str, values: &[String]) -> Option<String> {
	let patterns = LoopPatterns::new(name)?;
	let regions: Vec<&str> = patterns
		.region
		.find_iter(text)
		.map(|found| found.as_str())
		.collect();

	if regions.is_empty() {
		return None;
	}

	let token = placeholder(name);
	let mut result = text.to_string();

	for region in regions {
		let template = patterns.delimiter.replace_all(region, "");
		let expanded = values
			.iter()
			.map(|value| template.replace(&token, value))
			.collect::<Vec<_>>()
			.join("\n");
		result = result.replace(region, &expanded);
	}

	Some(result)
}

struct LoopPatterns {
	/// A whole block, delimiter comments included. Spans lines.
	region: Regex,
	/// Either delimiter comment, within a single line.
	delimiter: Regex,
}

impl LoopPatterns {
	fn new(name: &str) -> Option<Self> {
		let token = regex::escape(&placeholder(name));
		let start = format!(r"<!--.*?foreach.*?{token}.*?-->");
		let end = format!(r"<!--.*?endforeach.*?{token}.*?-->");

		let build = |pattern: String| {
			Regex::new(&pattern)
				.map_err(|error| {
					tracing::warn!(option = name, %error, "unable to build foreach pattern");
				})
				.ok()
		};

		Some(Self {
			region: build(format!("(?s){start}.*?{end}"))?,
			delimiter: build(format!("{start}|{end}"))?,
		})
	}
}
