//! Expression AST and its dual compilation.
//!
//! An [`Expr`] is an immutable description of a value. It compiles two ways:
//!
//! - [`Expr::template`] writes the inline Liquid source (`product.title | upcase`)
//! - [`Expr::compile`] builds an [`Evaluator`] that computes the same value
//!   from a [`Context`] on the client
//!
//! Boolean tests live in [`Condition`](crate::condition::Condition) because
//! Liquid only accepts comparisons inside tags.
//!
//! ## Example
//!
//! ```
//! use reinhardt_liquid::{Context, Expr};
//! use serde_json::json;
//!
//! let title = Expr::var("product.title").default("Untitled").upcase();
//! assert_eq!(title.template(), "product.title | default: 'Untitled' | upcase");
//!
//! let context = Context::new(json!({"product": {"title": "shirt"}}));
//! assert_eq!(title.evaluate(&context), json!("SHIRT"));
//! ```

mod filters;
mod literal;
mod path;

pub use filters::Filter;
pub use literal::{Literal, quote};
pub(crate) use path::is_identifier;
pub use path::{Segment, VariablePath};

use crate::condition::{Clause, CompareOp, Condition};
use crate::context::Context;
use serde_json::Value;
use std::sync::Arc;

/// A compiled expression.
pub type Evaluator = Arc<dyn Fn(&Context) -> Value + Send + Sync>;

/// A value expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
	/// A constant.
	Literal(Literal),
	/// A reference into the data context.
	Variable(VariablePath),
	/// A filter applied to an input expression.
	Filter(Box<FilterCall>),
}

/// `input | filter: args`
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCall {
	/// The filtered expression.
	pub input: Expr,
	/// The filter.
	pub filter: Filter,
	/// Filter arguments.
	pub args: Vec<Expr>,
}

impl Expr {
	/// References a variable path.
	pub fn var(path: impl Into<String>) -> Self {
		Expr::Variable(VariablePath::parse(path))
	}

	/// Wraps a literal.
	pub fn lit(value: impl Into<Literal>) -> Self {
		Expr::Literal(value.into())
	}

	/// The `nil` literal.
	pub fn nil() -> Self {
		Expr::Literal(Literal::Nil)
	}

	/// Applies a filter with the given arguments.
	pub fn filter(self, filter: Filter, args: Vec<Expr>) -> Self {
		Expr::Filter(Box::new(FilterCall {
			input: self,
			filter,
			args,
		}))
	}

	/// Returns `true` for literals and variables, which Liquid accepts
	/// anywhere an operand is expected.
	pub fn is_operand(&self) -> bool {
		!matches!(self, Expr::Filter(_))
	}

	/// Returns the inline Liquid source of this expression.
	pub fn template(&self) -> String {
		match self {
			Expr::Literal(literal) => literal.template(),
			Expr::Variable(path) => path.as_str().to_string(),
			Expr::Filter(call) => {
				let args: Vec<String> = call.args.iter().map(Expr::template).collect();
				filter_source(&call.input.template(), call.filter, &args)
			}
		}
	}

	/// Compiles the expression into a client evaluator.
	pub fn compile(&self) -> Evaluator {
		match self {
			Expr::Literal(literal) => {
				let value = literal.to_value();
				Arc::new(move |_| value.clone())
			}
			Expr::Variable(path) => {
				let path = path.clone();
				Arc::new(move |context| context.lookup(&path))
			}
			Expr::Filter(call) => {
				let input = call.input.compile();
				let args: Vec<Evaluator> = call.args.iter().map(Expr::compile).collect();
				let filter = call.filter;
				Arc::new(move |context| {
					let values: Vec<Value> = args.iter().map(|arg| arg(context)).collect();
					filter.apply(input(context), &values, context)
				})
			}
		}
	}

	/// Evaluates the expression once against a context.
	pub fn evaluate(&self, context: &Context) -> Value {
		(self.compile())(context)
	}

	pub(crate) fn variables(&self) -> Vec<&VariablePath> {
		let mut found = Vec::new();
		self.collect_variables(&mut found);
		found
	}

	fn collect_variables<'a>(&'a self, found: &mut Vec<&'a VariablePath>) {
		match self {
			Expr::Literal(_) => {}
			Expr::Variable(path) => found.push(path),
			Expr::Filter(call) => {
				call.input.collect_variables(found);
				for arg in &call.args {
					arg.collect_variables(found);
				}
			}
		}
	}

	fn unary(self, filter: Filter) -> Self {
		self.filter(filter, Vec::new())
	}

	fn binary(self, filter: Filter, arg: impl Into<Expr>) -> Self {
		self.filter(filter, vec![arg.into()])
	}

	fn ternary(self, filter: Filter, first: impl Into<Expr>, second: impl Into<Expr>) -> Self {
		self.filter(filter, vec![first.into(), second.into()])
	}

	/// `default: fallback`
	pub fn default(self, fallback: impl Into<Expr>) -> Self {
		self.binary(Filter::Default, fallback)
	}

	/// `plus: n`
	pub fn plus(self, n: impl Into<Expr>) -> Self {
		self.binary(Filter::Plus, n)
	}

	/// `minus: n`
	pub fn minus(self, n: impl Into<Expr>) -> Self {
		self.binary(Filter::Minus, n)
	}

	/// `times: n`
	pub fn times(self, n: impl Into<Expr>) -> Self {
		self.binary(Filter::Times, n)
	}

	/// `divided_by: n`
	pub fn divided_by(self, n: impl Into<Expr>) -> Self {
		self.binary(Filter::DividedBy, n)
	}

	/// `modulo: n`
	pub fn modulo(self, n: impl Into<Expr>) -> Self {
		self.binary(Filter::Modulo, n)
	}

	/// `abs`
	pub fn abs(self) -> Self {
		self.unary(Filter::Abs)
	}

	/// `ceil`
	pub fn ceil(self) -> Self {
		self.unary(Filter::Ceil)
	}

	/// `floor`
	pub fn floor(self) -> Self {
		self.unary(Filter::Floor)
	}

	/// `round`
	pub fn round(self) -> Self {
		self.unary(Filter::Round)
	}

	/// `round: digits`
	pub fn round_to(self, digits: impl Into<Expr>) -> Self {
		self.binary(Filter::Round, digits)
	}

	/// `at_least: n`
	pub fn at_least(self, n: impl Into<Expr>) -> Self {
		self.binary(Filter::AtLeast, n)
	}

	/// `at_most: n`
	pub fn at_most(self, n: impl Into<Expr>) -> Self {
		self.binary(Filter::AtMost, n)
	}

	/// `append: suffix`
	pub fn append(self, suffix: impl Into<Expr>) -> Self {
		self.binary(Filter::Append, suffix)
	}

	/// `prepend: prefix`
	pub fn prepend(self, prefix: impl Into<Expr>) -> Self {
		self.binary(Filter::Prepend, prefix)
	}

	/// `upcase`
	pub fn upcase(self) -> Self {
		self.unary(Filter::Upcase)
	}

	/// `downcase`
	pub fn downcase(self) -> Self {
		self.unary(Filter::Downcase)
	}

	/// `capitalize`
	pub fn capitalize(self) -> Self {
		self.unary(Filter::Capitalize)
	}

	/// `strip`
	pub fn strip(self) -> Self {
		self.unary(Filter::Strip)
	}

	/// `lstrip`
	pub fn lstrip(self) -> Self {
		self.unary(Filter::Lstrip)
	}

	/// `rstrip`
	pub fn rstrip(self) -> Self {
		self.unary(Filter::Rstrip)
	}

	/// `replace: from, to`
	pub fn replace(self, from: impl Into<Expr>, to: impl Into<Expr>) -> Self {
		self.ternary(Filter::Replace, from, to)
	}

	/// `replace_first: from, to`
	pub fn replace_first(self, from: impl Into<Expr>, to: impl Into<Expr>) -> Self {
		self.ternary(Filter::ReplaceFirst, from, to)
	}

	/// `remove: text`
	pub fn remove(self, text: impl Into<Expr>) -> Self {
		self.binary(Filter::Remove, text)
	}

	/// `remove_first: text`
	pub fn remove_first(self, text: impl Into<Expr>) -> Self {
		self.binary(Filter::RemoveFirst, text)
	}

	/// `split: separator`
	pub fn split(self, separator: impl Into<Expr>) -> Self {
		self.binary(Filter::Split, separator)
	}

	/// `truncate: length`; the `...` marker counts toward the length.
	pub fn truncate(self, length: impl Into<Expr>) -> Self {
		self.binary(Filter::Truncate, length)
	}

	/// `truncate: length, ellipsis`
	pub fn truncate_with(self, length: impl Into<Expr>, ellipsis: impl Into<Expr>) -> Self {
		self.ternary(Filter::Truncate, length, ellipsis)
	}

	/// `truncatewords: count`
	pub fn truncate_words(self, count: impl Into<Expr>) -> Self {
		self.binary(Filter::TruncateWords, count)
	}

	/// `escape`
	pub fn escape(self) -> Self {
		self.unary(Filter::Escape)
	}

	/// `url_encode`
	pub fn url_encode(self) -> Self {
		self.unary(Filter::UrlEncode)
	}

	/// `size`
	pub fn size(self) -> Self {
		self.unary(Filter::Size)
	}

	/// `first`
	pub fn first(self) -> Self {
		self.unary(Filter::First)
	}

	/// `last`
	pub fn last(self) -> Self {
		self.unary(Filter::Last)
	}

	/// `join: separator`
	pub fn join(self, separator: impl Into<Expr>) -> Self {
		self.binary(Filter::Join, separator)
	}

	/// `sort`
	pub fn sort(self) -> Self {
		self.unary(Filter::Sort)
	}

	/// `sort: 'key'`; stable, nils last.
	pub fn sort_by(self, key: impl Into<String>) -> Self {
		self.binary(Filter::Sort, Literal::Str(key.into()))
	}

	/// `sort_natural`
	pub fn sort_natural(self) -> Self {
		self.unary(Filter::SortNatural)
	}

	/// `where: 'key'`, keeping items whose `key` is truthy.
	pub fn where_truthy(self, key: impl Into<String>) -> Self {
		self.binary(Filter::Where, Literal::Str(key.into()))
	}

	/// `where: 'key', value`, keeping items whose `key` equals `value`.
	pub fn where_eq(self, key: impl Into<String>, value: impl Into<Expr>) -> Self {
		self.ternary(Filter::Where, Literal::Str(key.into()), value)
	}

	/// `map: 'key'`
	pub fn map(self, key: impl Into<String>) -> Self {
		self.binary(Filter::Map, Literal::Str(key.into()))
	}

	/// `reverse`
	pub fn reverse(self) -> Self {
		self.unary(Filter::Reverse)
	}

	/// `uniq`
	pub fn uniq(self) -> Self {
		self.unary(Filter::Uniq)
	}

	/// `compact`
	pub fn compact(self) -> Self {
		self.unary(Filter::Compact)
	}

	/// `concat: other`
	pub fn concat(self, other: impl Into<Expr>) -> Self {
		self.binary(Filter::Concat, other)
	}

	/// `date: 'format'` (strftime).
	pub fn date(self, format: impl Into<String>) -> Self {
		self.binary(Filter::Date, Literal::Str(format.into()))
	}

	/// `money`, formatting an amount in cents.
	pub fn money(self) -> Self {
		self.unary(Filter::Money)
	}

	/// `pluralize: singular, plural`
	pub fn pluralize(self, singular: impl Into<Expr>, plural: impl Into<Expr>) -> Self {
		self.ternary(Filter::Pluralize, singular, plural)
	}

	/// `json`
	pub fn json(self) -> Self {
		self.unary(Filter::Json)
	}

	fn compare(self, op: CompareOp, rhs: impl Into<Expr>) -> Condition {
		Condition::new(Clause::Compare {
			lhs: self,
			op,
			rhs: rhs.into(),
		})
	}

	/// `self == rhs`
	pub fn equals(self, rhs: impl Into<Expr>) -> Condition {
		self.compare(CompareOp::Eq, rhs)
	}

	/// `self != rhs`
	pub fn not_equals(self, rhs: impl Into<Expr>) -> Condition {
		self.compare(CompareOp::Ne, rhs)
	}

	/// `self > rhs`
	pub fn gt(self, rhs: impl Into<Expr>) -> Condition {
		self.compare(CompareOp::Gt, rhs)
	}

	/// `self >= rhs`
	pub fn ge(self, rhs: impl Into<Expr>) -> Condition {
		self.compare(CompareOp::Ge, rhs)
	}

	/// `self < rhs`
	pub fn lt(self, rhs: impl Into<Expr>) -> Condition {
		self.compare(CompareOp::Lt, rhs)
	}

	/// `self <= rhs`
	pub fn le(self, rhs: impl Into<Expr>) -> Condition {
		self.compare(CompareOp::Le, rhs)
	}

	/// `self contains needle`
	pub fn contains(self, needle: impl Into<Expr>) -> Condition {
		self.compare(CompareOp::Contains, needle)
	}

	/// `self == blank`
	pub fn is_blank(self) -> Condition {
		Condition::new(Clause::Blank(self))
	}

	/// `self != blank`
	pub fn is_present(self) -> Condition {
		Condition::new(Clause::Present(self))
	}

	/// `self == nil`
	pub fn is_nil(self) -> Condition {
		Condition::new(Clause::Nil(self))
	}

	/// Plain truthiness test.
	pub fn is_truthy(self) -> Condition {
		Condition::new(Clause::Truthy(self))
	}
}

/// Writes `input | name: arg, arg`.
pub(crate) fn filter_source(input: &str, filter: Filter, args: &[String]) -> String {
	if args.is_empty() {
		format!("{} | {}", input, filter.name())
	} else {
		format!("{} | {}: {}", input, filter.name(), args.join(", "))
	}
}

impl From<Literal> for Expr {
	fn from(literal: Literal) -> Self {
		Expr::Literal(literal)
	}
}

impl From<VariablePath> for Expr {
	fn from(path: VariablePath) -> Self {
		Expr::Variable(path)
	}
}

impl From<&str> for Expr {
	fn from(value: &str) -> Self {
		Expr::Literal(value.into())
	}
}

impl From<String> for Expr {
	fn from(value: String) -> Self {
		Expr::Literal(value.into())
	}
}

impl From<bool> for Expr {
	fn from(value: bool) -> Self {
		Expr::Literal(value.into())
	}
}

impl From<i32> for Expr {
	fn from(value: i32) -> Self {
		Expr::Literal(value.into())
	}
}

impl From<i64> for Expr {
	fn from(value: i64) -> Self {
		Expr::Literal(value.into())
	}
}

impl From<u32> for Expr {
	fn from(value: u32) -> Self {
		Expr::Literal(value.into())
	}
}

impl From<usize> for Expr {
	fn from(value: usize) -> Self {
		Expr::Literal(value.into())
	}
}

impl From<f64> for Expr {
	fn from(value: f64) -> Self {
		Expr::Literal(value.into())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_template_of_nested_filters() {
		let expr = Expr::var("product.title")
			.truncate(20)
			.replace("'", "")
			.append(Expr::var("suffix"));
		assert_eq!(
			expr.template(),
			"product.title | truncate: 20 | replace: '''', '' | append: suffix"
		);
	}

	#[rstest]
	fn test_compile_is_reusable() {
		let evaluator = Expr::var("n").plus(1).compile();
		assert_eq!(evaluator(&Context::new(json!({"n": 1}))), json!(2));
		assert_eq!(evaluator(&Context::new(json!({"n": 41}))), json!(42));
	}

	#[rstest]
	fn test_variables_are_collected_from_arguments() {
		let expr = Expr::var("a").default(Expr::var("b")).append("c");
		let names: Vec<&str> = expr.variables().iter().map(|p| p.as_str()).collect();
		assert_eq!(names, vec!["a", "b"]);
	}

	#[rstest]
	fn test_missing_variable_is_nil() {
		assert_eq!(Expr::var("nope.nothing").evaluate(&Context::empty()), json!(null));
	}
}
