//! Liquid value semantics over JSON data.
//!
//! The client target evaluates expressions against plain `serde_json::Value`
//! data. The helpers in this module apply the rules the Liquid engine uses
//! for the same values, so both targets agree on truthiness, emptiness,
//! stringification and comparison.

use serde_json::{Number, Value};
use std::cmp::Ordering;

/// Returns `true` unless the value is nil or `false`.
///
/// Empty strings, zero and empty collections are truthy, as in Liquid.
pub fn is_truthy(value: &Value) -> bool {
	!matches!(value, Value::Null | Value::Bool(false))
}

/// Returns `true` for nil (missing or explicit null).
pub fn is_nil(value: &Value) -> bool {
	value.is_null()
}

/// Returns `true` for nil, the empty string, the empty array and the empty object.
pub fn is_blank(value: &Value) -> bool {
	match value {
		Value::Null => true,
		Value::String(s) => s.is_empty(),
		Value::Array(items) => items.is_empty(),
		Value::Object(map) => map.is_empty(),
		Value::Bool(_) | Value::Number(_) => false,
	}
}

/// Emptiness as seen by the `default` filter: blank values and `false`.
pub(crate) fn is_empty_for_default(value: &Value) -> bool {
	is_blank(value) || matches!(value, Value::Bool(false))
}

/// Converts a value to the text Liquid would output for it.
///
/// Nil renders as the empty string, whole floats keep one decimal place
/// (`3.0`), arrays render their elements back to back and objects render
/// as compact JSON.
pub fn to_liquid_string(value: &Value) -> String {
	match value {
		Value::Null => String::new(),
		Value::Bool(b) => b.to_string(),
		Value::Number(n) => format_number(n),
		Value::String(s) => s.clone(),
		Value::Array(items) => items.iter().map(to_liquid_string).collect(),
		Value::Object(_) => value.to_string(),
	}
}

pub(crate) fn format_number(n: &Number) -> String {
	if let Some(i) = n.as_i64() {
		return i.to_string();
	}
	if let Some(u) = n.as_u64() {
		return u.to_string();
	}
	n.as_f64().map(format_float).unwrap_or_default()
}

pub(crate) fn format_float(f: f64) -> String {
	if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
		format!("{:.1}", f)
	} else {
		f.to_string()
	}
}

/// Numeric coercion used by the math filters.
///
/// Numbers keep their integer/float nature, numeric strings are parsed and
/// everything else coerces to integer zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Num {
	Int(i64),
	Float(f64),
}

impl Num {
	pub(crate) fn from_value(value: &Value) -> Num {
		match value {
			Value::Number(n) => n
				.as_i64()
				.map(Num::Int)
				.or_else(|| n.as_f64().map(Num::Float))
				.unwrap_or(Num::Int(0)),
			Value::String(s) => parse_number(s.trim()).unwrap_or(Num::Int(0)),
			_ => Num::Int(0),
		}
	}

	pub(crate) fn as_f64(self) -> f64 {
		match self {
			Num::Int(i) => i as f64,
			Num::Float(f) => f,
		}
	}

	pub(crate) fn as_i64(self) -> i64 {
		match self {
			Num::Int(i) => i,
			Num::Float(f) => f as i64,
		}
	}

	pub(crate) fn into_value(self) -> Value {
		match self {
			Num::Int(i) => Value::from(i),
			Num::Float(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
		}
	}
}

fn parse_number(s: &str) -> Option<Num> {
	s.parse::<i64>().ok().map(Num::Int).or_else(|| {
		s.parse::<f64>()
			.ok()
			.filter(|f| f.is_finite())
			.map(Num::Float)
	})
}

/// Liquid equality: numbers compare by value regardless of representation.
pub(crate) fn liquid_eq(lhs: &Value, rhs: &Value) -> bool {
	match (lhs, rhs) {
		(Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
		_ => lhs == rhs,
	}
}

/// Ordering for `<`, `>`, `<=` and `>=`.
///
/// Only number/number and string/string pairs are ordered; any other pair
/// makes the comparison false.
pub(crate) fn liquid_cmp(lhs: &Value, rhs: &Value) -> Option<Ordering> {
	match (lhs, rhs) {
		(Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
		(Value::String(a), Value::String(b)) => Some(a.cmp(b)),
		_ => None,
	}
}

/// The `contains` operator: substring, array membership or object key.
pub(crate) fn liquid_contains(haystack: &Value, needle: &Value) -> bool {
	match haystack {
		Value::String(s) => match needle {
			Value::Null => false,
			other => s.contains(to_liquid_string(other).as_str()),
		},
		Value::Array(items) => items.iter().any(|item| liquid_eq(item, needle)),
		Value::Object(map) => map.contains_key(to_liquid_string(needle).as_str()),
		_ => false,
	}
}

/// Total order used by `sort`: nils last, numbers numerically, strings
/// lexicographically, mixed types keep their relative order.
pub(crate) fn sort_order(lhs: &Value, rhs: &Value) -> Ordering {
	match (lhs, rhs) {
		(Value::Null, Value::Null) => Ordering::Equal,
		(Value::Null, _) => Ordering::Greater,
		(_, Value::Null) => Ordering::Less,
		_ => liquid_cmp(lhs, rhs).unwrap_or(Ordering::Equal),
	}
}
