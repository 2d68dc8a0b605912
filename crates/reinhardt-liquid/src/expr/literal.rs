//! Literal values and their Liquid source form.

use crate::value::format_float;
use serde_json::{Number, Value};

/// A constant usable inside expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
	/// `nil`
	Nil,
	/// `true` / `false`
	Bool(bool),
	/// Integer literal.
	Int(i64),
	/// Float literal.
	Float(f64),
	/// String literal, always emitted single-quoted.
	Str(String),
}

impl Literal {
	/// Returns the Liquid source text for this literal.
	pub fn template(&self) -> String {
		match self {
			Literal::Nil => "nil".to_string(),
			Literal::Bool(b) => b.to_string(),
			Literal::Int(i) => i.to_string(),
			Literal::Float(f) if f.is_finite() => format_float(*f),
			Literal::Float(_) => "nil".to_string(),
			Literal::Str(s) => quote(s),
		}
	}

	/// Returns the JSON value of this literal.
	pub fn to_value(&self) -> Value {
		match self {
			Literal::Nil => Value::Null,
			Literal::Bool(b) => Value::Bool(*b),
			Literal::Int(i) => Value::from(*i),
			Literal::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
			Literal::Str(s) => Value::String(s.clone()),
		}
	}

	/// Converts a scalar JSON value; arrays and objects have no literal form.
	pub fn from_value(value: &Value) -> Option<Self> {
		match value {
			Value::Null => Some(Literal::Nil),
			Value::Bool(b) => Some(Literal::Bool(*b)),
			Value::Number(n) => n
				.as_i64()
				.map(Literal::Int)
				.or_else(|| n.as_f64().map(Literal::Float)),
			Value::String(s) => Some(Literal::Str(s.clone())),
			Value::Array(_) | Value::Object(_) => None,
		}
	}
}

/// Single-quotes a string for Liquid source, doubling embedded quotes.
pub fn quote(text: &str) -> String {
	format!("'{}'", text.replace('\'', "''"))
}

impl From<&str> for Literal {
	fn from(value: &str) -> Self {
		Literal::Str(value.to_string())
	}
}

impl From<String> for Literal {
	fn from(value: String) -> Self {
		Literal::Str(value)
	}
}

impl From<bool> for Literal {
	fn from(value: bool) -> Self {
		Literal::Bool(value)
	}
}

impl From<i32> for Literal {
	fn from(value: i32) -> Self {
		Literal::Int(value.into())
	}
}

impl From<i64> for Literal {
	fn from(value: i64) -> Self {
		Literal::Int(value)
	}
}

impl From<u32> for Literal {
	fn from(value: u32) -> Self {
		Literal::Int(value.into())
	}
}

impl From<usize> for Literal {
	fn from(value: usize) -> Self {
		i64::try_from(value)
			.map(Literal::Int)
			.unwrap_or(Literal::Float(value as f64))
	}
}

impl From<f64> for Literal {
	fn from(value: f64) -> Self {
		Literal::Float(value)
	}
}
