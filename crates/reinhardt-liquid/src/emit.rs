//! Lowering of expressions into Liquid tags.
//!
//! Liquid only accepts plain operands (literals and variables) as filter
//! arguments, comparison operands, loop collections and case subjects. The
//! emitter hoists any filtered sub-expression in those positions into an
//! `{% assign %}` written ahead of the tag that uses it.

use crate::condition::{Clause, Condition};
use crate::error::{CompileError, CompileResult};
use crate::expr::{Expr, VariablePath, filter_source};
use std::fmt::Write;

pub(crate) struct Emitter {
	temp_prefix: String,
	next_temp: usize,
}

impl Emitter {
	pub(crate) fn new(temp_prefix: impl Into<String>) -> Self {
		Self {
			temp_prefix: temp_prefix.into(),
			next_temp: 0,
		}
	}

	fn temp(&mut self) -> String {
		let name = format!("{}{}", self.temp_prefix, self.next_temp);
		self.next_temp += 1;
		name
	}

	/// Writes `{% assign name = source %}`.
	pub(crate) fn assign(&mut self, out: &mut String, name: &str, source: &str) {
		let _ = write!(out, "{{% assign {} = {} %}}", name, source);
	}

	/// Returns source usable where Liquid wants a bare operand, hoisting
	/// filtered expressions into a temporary.
	pub(crate) fn operand(&mut self, expr: &Expr, out: &mut String) -> CompileResult<String> {
		if expr.is_operand() {
			return self.filtered(expr, out);
		}
		let source = self.filtered(expr, out)?;
		let name = self.temp();
		self.assign(out, &name, &source);
		Ok(name)
	}

	/// Returns source usable inside `{{ }}` or on the right of an assign,
	/// where one filter chain is allowed.
	pub(crate) fn filtered(&mut self, expr: &Expr, out: &mut String) -> CompileResult<String> {
		match expr {
			Expr::Literal(literal) => Ok(literal.template()),
			Expr::Variable(path) => checked_path(path),
			Expr::Filter(call) => {
				let input = self.filtered(&call.input, out)?;
				let args = call
					.args
					.iter()
					.map(|arg| self.operand(arg, out))
					.collect::<CompileResult<Vec<_>>>()?;
				Ok(filter_source(&input, call.filter, &args))
			}
		}
	}

	/// Returns source for an `if`/`elsif`/`unless` tag.
	pub(crate) fn condition(
		&mut self,
		condition: &Condition,
		out: &mut String,
	) -> CompileResult<String> {
		let mut source = self.clause(condition.head(), out)?;
		for (op, clause) in condition.tail() {
			let clause = self.clause(clause, out)?;
			let _ = write!(source, " {} {}", op.as_str(), clause);
		}
		Ok(source)
	}

	fn clause(&mut self, clause: &Clause, out: &mut String) -> CompileResult<String> {
		Ok(match clause {
			Clause::Truthy(expr) => self.operand(expr, out)?,
			Clause::Compare { lhs, op, rhs } => {
				let lhs = self.operand(lhs, out)?;
				let rhs = self.operand(rhs, out)?;
				format!("{} {} {}", lhs, op.as_str(), rhs)
			}
			Clause::Blank(expr) => format!("{} == blank", self.operand(expr, out)?),
			Clause::Present(expr) => format!("{} != blank", self.operand(expr, out)?),
			Clause::Nil(expr) => format!("{} == nil", self.operand(expr, out)?),
		})
	}
}

fn checked_path(path: &VariablePath) -> CompileResult<String> {
	if path.is_valid() {
		Ok(path.as_str().to_string())
	} else {
		Err(CompileError::InvalidPath(path.as_str().to_string()))
	}
}
