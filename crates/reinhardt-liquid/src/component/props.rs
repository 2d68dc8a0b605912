//! Component props.

use crate::expr::Expr;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
struct PropEntry {
	expr: Expr,
	value: Option<Value>,
}

/// Named props passed to a component.
///
/// Every prop carries an expression, so a component can place it in a
/// template on the server target. On the client target props also carry
/// the evaluated value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props {
	entries: BTreeMap<String, PropEntry>,
}

impl Props {
	/// Creates empty props.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds props from live JSON values; each prop's expression reads the
	/// variable of the same name.
	pub fn from_json(values: &Map<String, Value>) -> Self {
		let entries = values
			.iter()
			.map(|(name, value)| {
				let entry = PropEntry {
					expr: Expr::var(name.as_str()),
					value: Some(value.clone()),
				};
				(name.clone(), entry)
			})
			.collect();
		Self { entries }
	}

	/// Inserts a prop given by expression.
	pub fn insert(&mut self, name: impl Into<String>, expr: impl Into<Expr>) {
		self.entries.insert(
			name.into(),
			PropEntry {
				expr: expr.into(),
				value: None,
			},
		);
	}

	/// Inserts a prop with its evaluated value.
	pub fn insert_resolved(&mut self, name: impl Into<String>, expr: Expr, value: Value) {
		self.entries.insert(
			name.into(),
			PropEntry {
				expr,
				value: Some(value),
			},
		);
	}

	/// Builder form of [`insert`](Self::insert).
	pub fn with(mut self, name: impl Into<String>, expr: impl Into<Expr>) -> Self {
		self.insert(name, expr);
		self
	}

	/// Returns the expression of a prop; missing props are `nil`.
	pub fn get(&self, name: &str) -> Expr {
		self.entries
			.get(name)
			.map(|entry| entry.expr.clone())
			.unwrap_or_else(Expr::nil)
	}

	/// Returns the evaluated value of a prop, when known.
	pub fn value(&self, name: &str) -> Option<&Value> {
		self.entries.get(name).and_then(|entry| entry.value.as_ref())
	}

	/// Returns whether a prop is present.
	pub fn contains(&self, name: &str) -> bool {
		self.entries.contains_key(name)
	}

	/// Iterates over prop names in sorted order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.entries.keys().map(String::as_str)
	}

	/// Returns the evaluated values as a JSON object.
	///
	/// Props without a value are skipped.
	pub fn to_json(&self) -> Map<String, Value> {
		self.entries
			.iter()
			.filter_map(|(name, entry)| Some((name.clone(), entry.value.clone()?)))
			.collect()
	}

	/// Number of props.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns `true` when there are no props.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
