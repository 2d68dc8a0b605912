//! Liquid filters and their client-side semantics.

use crate::context::Context;
use crate::value::{Num, is_empty_for_default, is_truthy, sort_order, to_liquid_string};
use crate::view::html_escape;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use std::fmt::Write;

/// A Liquid filter.
///
/// The template side of a filter is its [`name`](Filter::name); the client
/// side is [`apply`](Filter::apply), which mirrors what the Liquid engine
/// computes for the same input and arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Filter {
	/// `default`
	Default,
	/// `plus`
	Plus,
	/// `minus`
	Minus,
	/// `times`
	Times,
	/// `divided_by`
	DividedBy,
	/// `modulo`
	Modulo,
	/// `abs`
	Abs,
	/// `ceil`
	Ceil,
	/// `floor`
	Floor,
	/// `round`
	Round,
	/// `at_least`
	AtLeast,
	/// `at_most`
	AtMost,
	/// `append`
	Append,
	/// `prepend`
	Prepend,
	/// `upcase`
	Upcase,
	/// `downcase`
	Downcase,
	/// `capitalize`
	Capitalize,
	/// `strip`
	Strip,
	/// `lstrip`
	Lstrip,
	/// `rstrip`
	Rstrip,
	/// `replace`
	Replace,
	/// `replace_first`
	ReplaceFirst,
	/// `remove`
	Remove,
	/// `remove_first`
	RemoveFirst,
	/// `split`
	Split,
	/// `truncate`
	Truncate,
	/// `truncatewords`
	TruncateWords,
	/// `escape`
	Escape,
	/// `url_encode`
	UrlEncode,
	/// `size`
	Size,
	/// `first`
	First,
	/// `last`
	Last,
	/// `join`
	Join,
	/// `sort`
	Sort,
	/// `sort_natural`
	SortNatural,
	/// `where`
	Where,
	/// `map`
	Map,
	/// `reverse`
	Reverse,
	/// `uniq`
	Uniq,
	/// `compact`
	Compact,
	/// `concat`
	Concat,
	/// `date`
	Date,
	/// `money`
	Money,
	/// `pluralize`
	Pluralize,
	/// `json`
	Json,
}

impl Filter {
	/// Returns the filter name as written in Liquid source.
	pub fn name(self) -> &'static str {
		match self {
			Filter::Default => "default",
			Filter::Plus => "plus",
			Filter::Minus => "minus",
			Filter::Times => "times",
			Filter::DividedBy => "divided_by",
			Filter::Modulo => "modulo",
			Filter::Abs => "abs",
			Filter::Ceil => "ceil",
			Filter::Floor => "floor",
			Filter::Round => "round",
			Filter::AtLeast => "at_least",
			Filter::AtMost => "at_most",
			Filter::Append => "append",
			Filter::Prepend => "prepend",
			Filter::Upcase => "upcase",
			Filter::Downcase => "downcase",
			Filter::Capitalize => "capitalize",
			Filter::Strip => "strip",
			Filter::Lstrip => "lstrip",
			Filter::Rstrip => "rstrip",
			Filter::Replace => "replace",
			Filter::ReplaceFirst => "replace_first",
			Filter::Remove => "remove",
			Filter::RemoveFirst => "remove_first",
			Filter::Split => "split",
			Filter::Truncate => "truncate",
			Filter::TruncateWords => "truncatewords",
			Filter::Escape => "escape",
			Filter::UrlEncode => "url_encode",
			Filter::Size => "size",
			Filter::First => "first",
			Filter::Last => "last",
			Filter::Join => "join",
			Filter::Sort => "sort",
			Filter::SortNatural => "sort_natural",
			Filter::Where => "where",
			Filter::Map => "map",
			Filter::Reverse => "reverse",
			Filter::Uniq => "uniq",
			Filter::Compact => "compact",
			Filter::Concat => "concat",
			Filter::Date => "date",
			Filter::Money => "money",
			Filter::Pluralize => "pluralize",
			Filter::Json => "json",
		}
	}

	/// Applies the filter to already evaluated input and arguments.
	///
	/// Never panics: bad types, missing data and division by zero degrade
	/// to nil or an empty value.
	pub fn apply(self, input: Value, args: &[Value], context: &Context) -> Value {
		match self {
			Filter::Default => {
				if is_empty_for_default(&input) {
					arg(args, 0).clone()
				} else {
					input
				}
			}
			Filter::Plus => arithmetic(&input, arg(args, 0), i64::checked_add, |a, b| a + b),
			Filter::Minus => arithmetic(&input, arg(args, 0), i64::checked_sub, |a, b| a - b),
			Filter::Times => arithmetic(&input, arg(args, 0), i64::checked_mul, |a, b| a * b),
			Filter::DividedBy => divided_by(&input, arg(args, 0)),
			Filter::Modulo => modulo(&input, arg(args, 0)),
			Filter::Abs => match Num::from_value(&input) {
				Num::Int(i) => i
					.checked_abs()
					.map(Value::from)
					.unwrap_or_else(|| Num::Float((i as f64).abs()).into_value()),
				Num::Float(f) => Num::Float(f.abs()).into_value(),
			},
			Filter::Ceil => integral(&input, f64::ceil),
			Filter::Floor => integral(&input, f64::floor),
			Filter::Round => round(&input, arg(args, 0)),
			Filter::AtLeast => clamp(&input, arg(args, 0), true),
			Filter::AtMost => clamp(&input, arg(args, 0), false),
			Filter::Append => {
				Value::String(to_liquid_string(&input) + &string_arg(args, 0))
			}
			Filter::Prepend => {
				Value::String(string_arg(args, 0) + &to_liquid_string(&input))
			}
			Filter::Upcase => Value::String(to_liquid_string(&input).to_uppercase()),
			Filter::Downcase => Value::String(to_liquid_string(&input).to_lowercase()),
			Filter::Capitalize => Value::String(capitalize(&to_liquid_string(&input))),
			Filter::Strip => Value::String(to_liquid_string(&input).trim().to_string()),
			Filter::Lstrip => Value::String(to_liquid_string(&input).trim_start().to_string()),
			Filter::Rstrip => Value::String(to_liquid_string(&input).trim_end().to_string()),
			Filter::Replace => Value::String(
				to_liquid_string(&input).replace(&string_arg(args, 0), &string_arg(args, 1)),
			),
			Filter::ReplaceFirst => Value::String(to_liquid_string(&input).replacen(
				&string_arg(args, 0),
				&string_arg(args, 1),
				1,
			)),
			Filter::Remove => {
				Value::String(to_liquid_string(&input).replace(&string_arg(args, 0), ""))
			}
			Filter::RemoveFirst => {
				Value::String(to_liquid_string(&input).replacen(&string_arg(args, 0), "", 1))
			}
			Filter::Split => split(&to_liquid_string(&input), &string_arg(args, 0)),
			Filter::Truncate => truncate(&input, args),
			Filter::TruncateWords => truncate_words(&input, args),
			Filter::Escape => match input {
				Value::Null => Value::Null,
				other => Value::String(html_escape(&to_liquid_string(&other))),
			},
			Filter::UrlEncode => match input {
				Value::Null => Value::Null,
				other => Value::String(
					urlencoding::encode(&to_liquid_string(&other)).replace("%20", "+"),
				),
			},
			Filter::Size => Value::from(match &input {
				Value::Array(items) => items.len(),
				Value::Object(map) => map.len(),
				Value::String(s) => s.chars().count(),
				_ => 0,
			}),
			Filter::First => match input {
				Value::Array(items) => items.into_iter().next().unwrap_or(Value::Null),
				_ => Value::Null,
			},
			Filter::Last => match input {
				Value::Array(items) => items.into_iter().last().unwrap_or(Value::Null),
				_ => Value::Null,
			},
			Filter::Join => {
				let separator = match args.first() {
					Some(Value::Null) | None => " ".to_string(),
					Some(other) => to_liquid_string(other),
				};
				Value::String(
					into_items(input)
						.iter()
						.map(to_liquid_string)
						.collect::<Vec<_>>()
						.join(&separator),
				)
			}
			Filter::Sort => {
				let mut items = into_items(input);
				match args.first() {
					Some(Value::Null) | None => items.sort_by(sort_order),
					Some(key) => {
						let key = to_liquid_string(key);
						items.sort_by(|a, b| sort_order(&property(a, &key), &property(b, &key)));
					}
				}
				Value::Array(items)
			}
			Filter::SortNatural => {
				let mut items = into_items(input);
				items.sort_by(|a, b| match (a, b) {
					(Value::Null, Value::Null) => std::cmp::Ordering::Equal,
					(Value::Null, _) => std::cmp::Ordering::Greater,
					(_, Value::Null) => std::cmp::Ordering::Less,
					_ => to_liquid_string(a)
						.to_lowercase()
						.cmp(&to_liquid_string(b).to_lowercase()),
				});
				Value::Array(items)
			}
			Filter::Where => {
				let key = string_arg(args, 0);
				let items = into_items(input);
				Value::Array(match args.get(1) {
					None => items
						.into_iter()
						.filter(|item| is_truthy(&property(item, &key)))
						.collect(),
					Some(expected) => items
						.into_iter()
						.filter(|item| property(item, &key) == *expected)
						.collect(),
				})
			}
			Filter::Map => {
				let key = string_arg(args, 0);
				Value::Array(
					into_items(input)
						.iter()
						.map(|item| property(item, &key))
						.collect(),
				)
			}
			Filter::Reverse => {
				let mut items = into_items(input);
				items.reverse();
				Value::Array(items)
			}
			Filter::Uniq => {
				let mut unique: Vec<Value> = Vec::new();
				for item in into_items(input) {
					if !unique.contains(&item) {
						unique.push(item);
					}
				}
				Value::Array(unique)
			}
			Filter::Compact => Value::Array(
				into_items(input)
					.into_iter()
					.filter(|item| !item.is_null())
					.collect(),
			),
			Filter::Concat => {
				let mut items = into_items(input);
				items.extend(into_items(arg(args, 0).clone()));
				Value::Array(items)
			}
			Filter::Date => format_date(input, &string_arg(args, 0)),
			Filter::Money => money(&input, context.money_format()),
			Filter::Pluralize => {
				if Num::from_value(&input).as_f64() == 1.0 {
					arg(args, 0).clone()
				} else {
					arg(args, 1).clone()
				}
			}
			Filter::Json => Value::String(input.to_string()),
		}
	}
}

fn arg(args: &[Value], index: usize) -> &Value {
	args.get(index).unwrap_or(&Value::Null)
}

fn string_arg(args: &[Value], index: usize) -> String {
	to_liquid_string(arg(args, index))
}

fn into_items(value: Value) -> Vec<Value> {
	match value {
		Value::Array(items) => items,
		Value::Null => Vec::new(),
		other => vec![other],
	}
}

fn property(item: &Value, key: &str) -> Value {
	match item {
		Value::Object(map) => map.get(key).cloned().unwrap_or(Value::Null),
		_ => Value::Null,
	}
}

fn arithmetic(
	lhs: &Value,
	rhs: &Value,
	int_op: fn(i64, i64) -> Option<i64>,
	float_op: fn(f64, f64) -> f64,
) -> Value {
	match (Num::from_value(lhs), Num::from_value(rhs)) {
		(Num::Int(a), Num::Int(b)) => int_op(a, b)
			.map(Value::from)
			.unwrap_or_else(|| Num::Float(float_op(a as f64, b as f64)).into_value()),
		(a, b) => Num::Float(float_op(a.as_f64(), b.as_f64())).into_value(),
	}
}

fn divided_by(lhs: &Value, rhs: &Value) -> Value {
	match (Num::from_value(lhs), Num::from_value(rhs)) {
		(_, Num::Int(0)) => Value::Null,
		(Num::Int(a), Num::Int(b)) => match a.checked_div(b) {
			Some(q) if a % b != 0 && ((a < 0) != (b < 0)) => Value::from(q - 1),
			Some(q) => Value::from(q),
			None => Value::Null,
		},
		(a, b) => {
			let divisor = b.as_f64();
			if divisor == 0.0 {
				Value::Null
			} else {
				Num::Float(a.as_f64() / divisor).into_value()
			}
		}
	}
}

fn modulo(lhs: &Value, rhs: &Value) -> Value {
	match (Num::from_value(lhs), Num::from_value(rhs)) {
		(_, Num::Int(0)) => Value::Null,
		(Num::Int(a), Num::Int(b)) => match a.checked_rem(b) {
			Some(r) if r != 0 && ((r < 0) != (b < 0)) => Value::from(r + b),
			Some(r) => Value::from(r),
			None => Value::from(0),
		},
		(a, b) => {
			let (a, b) = (a.as_f64(), b.as_f64());
			if b == 0.0 {
				return Value::Null;
			}
			let r = a % b;
			let r = if r != 0.0 && ((r < 0.0) != (b < 0.0)) { r + b } else { r };
			Num::Float(r).into_value()
		}
	}
}

fn integral(input: &Value, op: fn(f64) -> f64) -> Value {
	match Num::from_value(input) {
		Num::Int(i) => Value::from(i),
		Num::Float(f) => float_to_integer(op(f)),
	}
}

fn float_to_integer(f: f64) -> Value {
	if f.is_finite() && f.abs() < 9.0e15 {
		Value::from(f as i64)
	} else {
		Num::Float(f).into_value()
	}
}

/// Rounds half away from zero; `f64::round` already does.
fn round(input: &Value, digits: &Value) -> Value {
	let digits = match digits {
		Value::Null => 0,
		other => Num::from_value(other).as_i64().clamp(-15, 15) as i32,
	};
	match Num::from_value(input) {
		Num::Int(i) if digits >= 0 => Value::from(i),
		num if digits == 0 => float_to_integer(num.as_f64().round()),
		num if digits > 0 => {
			let factor = 10f64.powi(digits);
			Num::Float((num.as_f64() * factor).round() / factor).into_value()
		}
		num => {
			let factor = 10f64.powi(-digits);
			float_to_integer((num.as_f64() / factor).round() * factor)
		}
	}
}

fn clamp(input: &Value, bound: &Value, lower: bool) -> Value {
	let (value, bound) = (Num::from_value(input), Num::from_value(bound));
	let pick_bound = if lower {
		value.as_f64() < bound.as_f64()
	} else {
		value.as_f64() > bound.as_f64()
	};
	if pick_bound { bound.into_value() } else { value.into_value() }
}

fn capitalize(text: &str) -> String {
	let mut chars = text.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
		None => String::new(),
	}
}

fn split(text: &str, separator: &str) -> Value {
	let parts: Vec<Value> = if separator.is_empty() {
		text.chars().map(|c| Value::String(c.to_string())).collect()
	} else if separator == " " {
		text.split_whitespace().map(|s| Value::String(s.to_string())).collect()
	} else {
		let mut parts: Vec<&str> = text.split(separator).collect();
		while parts.last().is_some_and(|part| part.is_empty()) {
			parts.pop();
		}
		parts.into_iter().map(|s| Value::String(s.to_string())).collect()
	};
	Value::Array(parts)
}

fn truncate(input: &Value, args: &[Value]) -> Value {
	if input.is_null() {
		return Value::Null;
	}
	let text = to_liquid_string(input);
	let length = match arg(args, 0) {
		Value::Null => 50,
		other => Num::from_value(other).as_i64().max(0) as usize,
	};
	let ellipsis = match arg(args, 1) {
		Value::Null => "...".to_string(),
		other => to_liquid_string(other),
	};
	let chars: Vec<char> = text.chars().collect();
	if chars.len() <= length {
		return Value::String(text);
	}
	let keep = length.saturating_sub(ellipsis.chars().count());
	let mut truncated: String = chars[..keep].iter().collect();
	truncated.push_str(&ellipsis);
	Value::String(truncated)
}

fn truncate_words(input: &Value, args: &[Value]) -> Value {
	if input.is_null() {
		return Value::Null;
	}
	let text = to_liquid_string(input);
	let count = match arg(args, 0) {
		Value::Null => 15,
		other => Num::from_value(other).as_i64().max(1) as usize,
	};
	let ellipsis = match arg(args, 1) {
		Value::Null => "...".to_string(),
		other => to_liquid_string(other),
	};
	let words: Vec<&str> = text.split_whitespace().collect();
	if words.len() <= count {
		return Value::String(text);
	}
	Value::String(words[..count].join(" ") + &ellipsis)
}

fn format_date(input: Value, format: &str) -> Value {
	if format.is_empty() {
		return input;
	}
	let Some(datetime) = parse_date(&input) else {
		return input;
	};
	let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
	if items.iter().any(|item| matches!(item, Item::Error)) {
		return input;
	}
	let mut formatted = String::new();
	if write!(formatted, "{}", datetime.format_with_items(items.iter())).is_err() {
		return input;
	}
	Value::String(formatted)
}

fn parse_date(input: &Value) -> Option<DateTime<FixedOffset>> {
	match input {
		Value::Number(n) => from_timestamp(n.as_i64()?),
		Value::String(s) => {
			let s = s.trim();
			if s.eq_ignore_ascii_case("now") || s.eq_ignore_ascii_case("today") {
				return Some(Utc::now().fixed_offset());
			}
			DateTime::parse_from_rfc3339(s)
				.ok()
				.or_else(|| {
					NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
						.ok()
						.map(|naive| naive.and_utc().fixed_offset())
				})
				.or_else(|| {
					NaiveDate::parse_from_str(s, "%Y-%m-%d")
						.ok()
						.and_then(|date| date.and_hms_opt(0, 0, 0))
						.map(|naive| naive.and_utc().fixed_offset())
				})
				.or_else(|| from_timestamp(s.parse().ok()?))
		}
		_ => None,
	}
}

fn from_timestamp(seconds: i64) -> Option<DateTime<FixedOffset>> {
	DateTime::from_timestamp(seconds, 0).map(|utc| utc.fixed_offset())
}

fn money(input: &Value, format: &str) -> Value {
	if input.is_null() {
		return Value::Null;
	}
	let amount = Num::from_value(input).as_f64() / 100.0;
	Value::String(
		format
			.replace("{{amount}}", &delimit(amount, 2, ',', '.'))
			.replace("{{amount_no_decimals}}", &delimit(amount, 0, ',', '.'))
			.replace("{{amount_with_comma_separator}}", &delimit(amount, 2, '.', ',')),
	)
}

fn delimit(amount: f64, decimals: u32, thousands: char, decimal_mark: char) -> String {
	let factor = 10u64.pow(decimals);
	let scaled = (amount.abs() * factor as f64).round() as u64;
	let (whole, fraction) = (scaled / factor, scaled % factor);

	let digits = whole.to_string();
	let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
	for (i, digit) in digits.chars().enumerate() {
		if i > 0 && (digits.len() - i) % 3 == 0 {
			grouped.push(thousands);
		}
		grouped.push(digit);
	}

	let mut out = String::new();
	if amount < 0.0 && scaled > 0 {
		out.push('-');
	}
	out.push_str(&grouped);
	if decimals > 0 {
		out.push(decimal_mark);
		out.push_str(&format!("{:0width$}", fraction, width = decimals as usize));
	}
	out
}
