//! Data context for the client target.
//!
//! A [`Context`] holds the root data object plus a stack of scoped bindings
//! introduced by loops. Lookups check the innermost binding first and fall
//! back to the root object; anything missing resolves to nil.

use crate::expr::{Segment, VariablePath};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// Money format used when none is configured.
pub const DEFAULT_MONEY_FORMAT: &str = "${{amount}}";

/// Evaluation context for expressions on the client target.
#[derive(Debug, Clone)]
pub struct Context {
	root: Value,
	scopes: Vec<(String, Value)>,
	money_format: String,
}

impl Default for Context {
	fn default() -> Self {
		Self::new(Value::Object(Map::new()))
	}
}

impl From<Value> for Context {
	fn from(root: Value) -> Self {
		Self::new(root)
	}
}

impl Context {
	/// Creates a context over the given root data.
	pub fn new(root: Value) -> Self {
		Self {
			root,
			scopes: Vec::new(),
			money_format: DEFAULT_MONEY_FORMAT.to_string(),
		}
	}

	/// Creates a context with an empty root object.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Sets the format used by the `money` filter.
	///
	/// The format understands `{{amount}}`, `{{amount_no_decimals}}` and
	/// `{{amount_with_comma_separator}}` placeholders.
	pub fn with_money_format(mut self, format: impl Into<String>) -> Self {
		self.money_format = format.into();
		self
	}

	/// Returns the configured money format.
	pub fn money_format(&self) -> &str {
		&self.money_format
	}

	/// Returns the root data.
	pub fn root(&self) -> &Value {
		&self.root
	}

	/// Pushes a scoped binding that shadows root keys and outer bindings.
	pub fn push_scope(&mut self, name: impl Into<String>, value: Value) {
		self.scopes.push((name.into(), value));
	}

	/// Pops the innermost binding.
	pub fn pop_scope(&mut self) -> Option<(String, Value)> {
		self.scopes.pop()
	}

	/// Returns the innermost binding with the given name.
	pub fn binding(&self, name: &str) -> Option<&Value> {
		self.scopes
			.iter()
			.rev()
			.find(|(bound, _)| bound == name)
			.map(|(_, value)| value)
	}

	/// Resolves a variable path; missing segments yield nil.
	pub fn lookup(&self, path: &VariablePath) -> Value {
		self.resolve(path).unwrap_or(Value::Null)
	}

	/// Parses and resolves a dotted path such as `product.tags[0]`.
	pub fn get(&self, path: &str) -> Value {
		self.lookup(&VariablePath::parse(path))
	}

	fn resolve(&self, path: &VariablePath) -> Option<Value> {
		let mut segments = path.segments().iter();
		let start = match segments.next()? {
			Segment::Key(name) => self.binding(name).or_else(|| self.root.get(name.as_str()))?,
			Segment::Index(_) => return None,
		};

		let mut current = Cow::Borrowed(start);
		for segment in segments {
			current = match current {
				Cow::Borrowed(value) => step(value, segment)?,
				Cow::Owned(value) => Cow::Owned(step(&value, segment)?.into_owned()),
			};
		}
		Some(current.into_owned())
	}
}

fn step<'a>(value: &'a Value, segment: &Segment) -> Option<Cow<'a, Value>> {
	match (value, segment) {
		(Value::Object(map), Segment::Key(key)) => match map.get(key) {
			Some(found) => Some(Cow::Borrowed(found)),
			None if key == "size" => Some(Cow::Owned(Value::from(map.len()))),
			None => None,
		},
		(Value::Object(map), Segment::Index(index)) => {
			map.get(&index.to_string()).map(Cow::Borrowed)
		}
		(Value::Array(items), Segment::Index(index)) => items.get(*index).map(Cow::Borrowed),
		(Value::Array(items), Segment::Key(key)) => match key.as_str() {
			"size" => Some(Cow::Owned(Value::from(items.len()))),
			"first" => items.first().map(Cow::Borrowed),
			"last" => items.last().map(Cow::Borrowed),
			_ => None,
		},
		(Value::String(s), Segment::Key(key)) if key == "size" => {
			Some(Cow::Owned(Value::from(s.chars().count())))
		}
		_ => None,
	}
}
