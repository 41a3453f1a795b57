use serde::Serialize;

/// A single location inside a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Point {
	/// 1-indexed line number.
	pub line: usize,
	/// 1-indexed column number, counted in characters.
	pub column: usize,
	/// 0-indexed byte offset.
	pub offset: usize,
}

impl Point {
	pub fn new(line: usize, column: usize, offset: usize) -> Self {
		Self {
			line,
			column,
			offset,
		}
	}

	/// Compute the point for a byte `offset` into `text`. Offsets past the end
	/// of the text are clamped to its length.
	pub fn from_offset(text: &str, offset: usize) -> Self {
		let offset = offset.min(text.len());
		let before = &text[..floor_char_boundary(text, offset)];
		let line = before.matches('\n').count() + 1;
		let line_start = before.rfind('\n').map_or(0, |idx| idx + 1);
		let column = before[line_start..].chars().count() + 1;

		Self::new(line, column, offset)
	}
}

/// The span of a marker or region inside a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Position {
	pub start: Point,
	pub end: Point,
}

impl Position {
	pub fn new(
		start_line: usize,
		start_column: usize,
		start_offset: usize,
		end_line: usize,
		end_column: usize,
		end_offset: usize,
	) -> Self {
		Self {
			start: Point::new(start_line, start_column, start_offset),
			end: Point::new(end_line, end_column, end_offset),
		}
	}

	/// Build a position from a byte range of `text`.
	pub fn from_span(text: &str, span: std::ops::Range<usize>) -> Self {
		Self {
			start: Point::from_offset(text, span.start),
			end: Point::from_offset(text, span.end),
		}
	}
}

fn floor_char_boundary(text: &str, mut offset: usize) -> usize {
	while !text.is_char_boundary(offset) {
		offset -= 1;
	}
	offset
}
