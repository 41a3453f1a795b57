use logos::Logos;

/// Raw tokens for array-valued options such as `['a', "b", 2]`. Only quoted
/// spans and digit runs become elements; everything else is filler between
/// them.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum ListToken {
	#[regex(r#""[^"]*""#)]
	DoubleQuoted,
	#[regex(r"'[^']*'")]
	SingleQuoted,
	#[regex(r"[0-9]+")]
	Digits,
	/// A `"` with no closing partner.
	#[token("\"")]
	StrayDoubleQuote,
	/// A `'` with no closing partner.
	#[token("'")]
	StraySingleQuote,
	#[regex(r#"[^"'0-9]+"#)]
	Filler,
}

impl ListToken {
	fn is_element(self) -> bool {
		matches!(self, Self::DoubleQuoted | Self::SingleQuoted | Self::Digits)
	}
}

/// Split the source of an array literal into its element spans, left to
/// right. Quotes are still attached to quoted elements.
pub(crate) fn list_elements(source: &str) -> Vec<&str> {
	ListToken::lexer(source)
		.spanned()
		.filter_map(|(token, span)| {
			match token {
				Ok(token) if token.is_element() => Some(&source[span]),
				_ => None,
			}
		})
		.collect()
}
