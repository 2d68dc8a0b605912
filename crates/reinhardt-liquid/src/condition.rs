//! Boolean conditions for `if`, `elsif` and `unless` tags.
//!
//! Liquid has no parentheses: a condition is a flat chain of clauses joined
//! by `and`/`or`, evaluated right to left (`a and b or c` means
//! `a and (b or c)`). [`Condition`] keeps exactly that shape, so the client
//! evaluator and the emitted tag always agree.

use crate::context::Context;
use crate::expr::Expr;
use crate::value::{is_blank, is_nil, is_truthy, liquid_cmp, liquid_contains, liquid_eq};
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::Arc;

/// A compiled condition.
pub type Predicate = Arc<dyn Fn(&Context) -> bool + Send + Sync>;

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
	/// `==`
	Eq,
	/// `!=`
	Ne,
	/// `<`
	Lt,
	/// `>`
	Gt,
	/// `<=`
	Le,
	/// `>=`
	Ge,
	/// `contains`
	Contains,
}

impl CompareOp {
	/// Returns the operator as written in Liquid source.
	pub fn as_str(self) -> &'static str {
		match self {
			CompareOp::Eq => "==",
			CompareOp::Ne => "!=",
			CompareOp::Lt => "<",
			CompareOp::Gt => ">",
			CompareOp::Le => "<=",
			CompareOp::Ge => ">=",
			CompareOp::Contains => "contains",
		}
	}

	pub(crate) fn apply(self, lhs: &Value, rhs: &Value) -> bool {
		match self {
			CompareOp::Eq => liquid_eq(lhs, rhs),
			CompareOp::Ne => !liquid_eq(lhs, rhs),
			CompareOp::Lt => liquid_cmp(lhs, rhs) == Some(Ordering::Less),
			CompareOp::Gt => liquid_cmp(lhs, rhs) == Some(Ordering::Greater),
			CompareOp::Le => matches!(liquid_cmp(lhs, rhs), Some(Ordering::Less | Ordering::Equal)),
			CompareOp::Ge => {
				matches!(liquid_cmp(lhs, rhs), Some(Ordering::Greater | Ordering::Equal))
			}
			CompareOp::Contains => liquid_contains(lhs, rhs),
		}
	}
}

/// Logical joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicOp {
	/// `and`
	And,
	/// `or`
	Or,
}

impl LogicOp {
	/// Returns the keyword.
	pub fn as_str(self) -> &'static str {
		match self {
			LogicOp::And => "and",
			LogicOp::Or => "or",
		}
	}
}

/// A single test inside a condition chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
	/// The expression is truthy.
	Truthy(Expr),
	/// `lhs op rhs`
	Compare {
		/// Left operand.
		lhs: Expr,
		/// Operator.
		op: CompareOp,
		/// Right operand.
		rhs: Expr,
	},
	/// `expr == blank`
	Blank(Expr),
	/// `expr != blank`
	Present(Expr),
	/// `expr == nil`
	Nil(Expr),
}

impl Clause {
	fn compile(&self) -> Predicate {
		match self {
			Clause::Truthy(expr) => {
				let value = expr.compile();
				Arc::new(move |context| is_truthy(&value(context)))
			}
			Clause::Compare { lhs, op, rhs } => {
				let (lhs, rhs, op) = (lhs.compile(), rhs.compile(), *op);
				Arc::new(move |context| op.apply(&lhs(context), &rhs(context)))
			}
			Clause::Blank(expr) => {
				let value = expr.compile();
				Arc::new(move |context| is_blank(&value(context)))
			}
			Clause::Present(expr) => {
				let value = expr.compile();
				Arc::new(move |context| !is_blank(&value(context)))
			}
			Clause::Nil(expr) => {
				let value = expr.compile();
				Arc::new(move |context| is_nil(&value(context)))
			}
		}
	}

	/// Returns the inline Liquid source, without operand hoisting.
	pub fn template(&self) -> String {
		match self {
			Clause::Truthy(expr) => expr.template(),
			Clause::Compare { lhs, op, rhs } => {
				format!("{} {} {}", lhs.template(), op.as_str(), rhs.template())
			}
			Clause::Blank(expr) => format!("{} == blank", expr.template()),
			Clause::Present(expr) => format!("{} != blank", expr.template()),
			Clause::Nil(expr) => format!("{} == nil", expr.template()),
		}
	}
}

/// A flat `and`/`or` chain of clauses.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
	head: Clause,
	tail: Vec<(LogicOp, Clause)>,
}

impl Condition {
	/// Starts a chain with one clause.
	pub fn new(clause: Clause) -> Self {
		Self {
			head: clause,
			tail: Vec::new(),
		}
	}

	/// Truthiness test of an expression.
	pub fn truthy(expr: impl Into<Expr>) -> Self {
		Self::new(Clause::Truthy(expr.into()))
	}

	/// Appends `and other`. The other chain is spliced in as written.
	pub fn and(self, other: impl Into<Condition>) -> Self {
		self.join(LogicOp::And, other.into())
	}

	/// Appends `or other`. The other chain is spliced in as written.
	pub fn or(self, other: impl Into<Condition>) -> Self {
		self.join(LogicOp::Or, other.into())
	}

	fn join(mut self, op: LogicOp, other: Condition) -> Self {
		self.tail.push((op, other.head));
		self.tail.extend(other.tail);
		self
	}

	/// The first clause.
	pub fn head(&self) -> &Clause {
		&self.head
	}

	/// The joined clauses after the first.
	pub fn tail(&self) -> &[(LogicOp, Clause)] {
		&self.tail
	}

	/// Iterates over every clause in order.
	pub fn clauses(&self) -> impl Iterator<Item = &Clause> {
		std::iter::once(&self.head).chain(self.tail.iter().map(|(_, clause)| clause))
	}

	/// Number of `or` joins in the chain.
	pub fn or_count(&self) -> usize {
		self.tail.iter().filter(|(op, _)| *op == LogicOp::Or).count()
	}

	/// Returns the inline Liquid source, without operand hoisting.
	pub fn template(&self) -> String {
		let mut source = self.head.template();
		for (op, clause) in &self.tail {
			source.push(' ');
			source.push_str(op.as_str());
			source.push(' ');
			source.push_str(&clause.template());
		}
		source
	}

	/// Compiles the condition for the client target.
	pub fn compile(&self) -> Predicate {
		let clauses: Vec<Predicate> = self.clauses().map(Clause::compile).collect();
		let ops: Vec<LogicOp> = self.tail.iter().map(|(op, _)| *op).collect();
		Arc::new(move |context| evaluate_chain(&clauses, &ops, context))
	}

	/// Evaluates the condition once.
	pub fn evaluate(&self, context: &Context) -> bool {
		(self.compile())(context)
	}
}

fn evaluate_chain(clauses: &[Predicate], ops: &[LogicOp], context: &Context) -> bool {
	let Some((first, rest)) = clauses.split_first() else {
		return false;
	};
	let current = first(context);
	match ops.split_first() {
		None => current,
		Some((LogicOp::And, ops)) => current && evaluate_chain(rest, ops, context),
		Some((LogicOp::Or, ops)) => current || evaluate_chain(rest, ops, context),
	}
}

impl From<Clause> for Condition {
	fn from(clause: Clause) -> Self {
		Condition::new(clause)
	}
}

impl From<Expr> for Condition {
	fn from(expr: Expr) -> Self {
		Condition::truthy(expr)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_chain_template() {
		let condition = Expr::var("a")
			.equals(1)
			.and(Expr::var("b").is_blank())
			.or(Expr::var("c").contains("x"));
		assert_eq!(condition.template(), "a == 1 and b == blank or c contains 'x'");
		assert_eq!(condition.or_count(), 1);
	}

	#[rstest]
	fn test_right_associative_evaluation() {
		// false and (false or true) == false, while (false and false) or true == true
		let condition = Condition::truthy(Expr::var("a"))
			.and(Expr::var("b"))
			.or(Expr::var("c"));
		let context = Context::new(json!({"a": false, "b": false, "c": true}));
		assert!(!condition.evaluate(&context));
	}

	#[rstest]
	#[case(json!(null), true, true)]
	#[case(json!(""), true, false)]
	#[case(json!([]), true, false)]
	#[case(json!({}), true, false)]
	#[case(json!(0), false, false)]
	#[case(json!(false), false, false)]
	#[case(json!("x"), false, false)]
	fn test_blank_and_nil(#[case] value: Value, #[case] blank: bool, #[case] nil: bool) {
		let context = Context::new(json!({ "v": value }));
		assert_eq!(Expr::var("v").is_blank().evaluate(&context), blank);
		assert_eq!(Expr::var("v").is_present().evaluate(&context), !blank);
		assert_eq!(Expr::var("v").is_nil().evaluate(&context), nil);
	}

	#[rstest]
	fn test_undefined_is_nil_and_blank() {
		let context = Context::empty();
		assert!(Expr::var("missing").is_nil().evaluate(&context));
		assert!(Expr::var("missing").is_blank().evaluate(&context));
	}

	#[rstest]
	fn test_comparisons_of_mixed_types_are_false() {
		let context = Context::new(json!({"n": 5, "s": "5"}));
		assert!(!Expr::var("s").gt(1).evaluate(&context));
		assert!(Expr::var("n").ge(5).evaluate(&context));
		assert!(Expr::var("n").not_equals("5").evaluate(&context));
	}

	proptest! {
		#[test]
		fn prop_chain_matches_right_fold(bits in proptest::collection::vec(any::<bool>(), 1..6), ops in proptest::collection::vec(any::<bool>(), 5)) {
			let mut data = serde_json::Map::new();
			for (i, bit) in bits.iter().enumerate() {
				data.insert(format!("v{}", i), json!(bit));
			}
			let mut condition = Condition::truthy(Expr::var("v0"));
			for i in 1..bits.len() {
				let next = Condition::truthy(Expr::var(format!("v{}", i)));
				condition = if ops[i - 1] { condition.and(next) } else { condition.or(next) };
			}

			let mut expected = bits[bits.len() - 1];
			for i in (0..bits.len() - 1).rev() {
				expected = if ops[i] { bits[i] && expected } else { bits[i] || expected };
			}

			prop_assert_eq!(condition.evaluate(&Context::new(Value::Object(data))), expected);
		}
	}
}
