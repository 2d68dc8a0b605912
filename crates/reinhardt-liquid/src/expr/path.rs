//! Variable paths such as `product.variants[0].price`.

use std::fmt;

/// One step of a variable path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
	/// Object key (or the `size`/`first`/`last` pseudo keys).
	Key(String),
	/// Array index.
	Index(usize),
}

/// A dotted variable path resolved against the data context.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariablePath {
	raw: String,
	segments: Vec<Segment>,
}

impl VariablePath {
	/// Parses a path. Parsing never fails; use [`is_valid`](Self::is_valid)
	/// to check that the text is usable as a Liquid variable reference.
	pub fn parse(raw: impl Into<String>) -> Self {
		let raw = raw.into();
		let segments = parse_segments(&raw);
		Self { raw, segments }
	}

	/// Returns the path as written.
	pub fn as_str(&self) -> &str {
		&self.raw
	}

	/// Returns the parsed segments.
	pub fn segments(&self) -> &[Segment] {
		&self.segments
	}

	/// Returns the first key of the path.
	pub fn root(&self) -> Option<&str> {
		match self.segments.first() {
			Some(Segment::Key(key)) => Some(key),
			_ => None,
		}
	}

	/// Appends a key segment.
	pub fn child(&self, key: &str) -> Self {
		Self::parse(format!("{}.{}", self.raw, key))
	}

	/// Returns `true` if the path can be written into a Liquid tag verbatim.
	pub fn is_valid(&self) -> bool {
		let raw = self.raw.as_str();
		let Some(first) = raw.chars().next() else {
			return false;
		};
		(first.is_ascii_alphabetic() || first == '_')
			&& !raw.ends_with('.')
			&& !raw.contains("..")
			&& raw.chars().all(|c| {
				c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '?' | '.' | '[' | ']' | '\'')
			})
			&& brackets_balanced(raw)
	}
}

impl fmt::Display for VariablePath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.raw)
	}
}

/// Checks bracket nesting. A quote may only appear as a whole quoted key
/// directly inside brackets (`a['b']`).
fn brackets_balanced(raw: &str) -> bool {
	let mut chars = raw.chars().peekable();
	let mut depth = 0usize;
	while let Some(c) = chars.next() {
		match c {
			'[' if chars.peek() == Some(&'\'') => {
				chars.next();
				let mut closed = false;
				for c in chars.by_ref() {
					match c {
						'\'' => {
							closed = true;
							break;
						}
						'[' | ']' => return false,
						_ => {}
					}
				}
				if !closed || chars.next() != Some(']') {
					return false;
				}
			}
			'[' => depth += 1,
			']' => {
				if depth == 0 {
					return false;
				}
				depth -= 1;
			}
			'\'' => return false,
			_ => {}
		}
	}
	depth == 0
}

/// Returns `true` for names usable as loop bindings, assign targets and prop keys.
pub(crate) fn is_identifier(name: &str) -> bool {
	let mut chars = name.chars();
	match chars.next() {
		Some(first) if first.is_ascii_alphabetic() || first == '_' => {
			chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
		}
		_ => false,
	}
}

fn parse_segments(raw: &str) -> Vec<Segment> {
	let mut segments = Vec::new();
	let mut current = String::new();
	let mut chars = raw.chars();

	while let Some(c) = chars.next() {
		match c {
			'.' => flush(&mut current, &mut segments),
			'[' => {
				flush(&mut current, &mut segments);
				let inner: String = chars.by_ref().take_while(|&c| c != ']').collect();
				let inner = inner.trim();
				let unquoted = inner.trim_matches(|c| c == '\'' || c == '"');
				if unquoted.len() != inner.len() {
					segments.push(Segment::Key(unquoted.to_string()));
				} else if let Ok(index) = inner.parse() {
					segments.push(Segment::Index(index));
				} else if !inner.is_empty() {
					segments.push(Segment::Key(inner.to_string()));
				}
			}
			_ => current.push(c),
		}
	}
	flush(&mut current, &mut segments);
	segments
}

fn flush(current: &mut String, segments: &mut Vec<Segment>) {
	if !current.is_empty() {
		segments.push(Segment::Key(std::mem::take(current)));
	}
}
