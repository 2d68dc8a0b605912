//! `case` / `when` blocks.

use crate::error::CompileResult;
use crate::expr::{Expr, quote};
use crate::renderer::Renderer;
use crate::target::RenderTarget;
use crate::value::to_liquid_string;
use crate::view::{IntoView, View};
use std::fmt::Write;

/// A multi-way branch on the string form of a value.
///
/// Prefer this over a [`Conditional`](super::Conditional) that chains many
/// `or` clauses on the same value.
#[derive(Debug)]
pub struct Branch {
	subject: Expr,
	cases: Vec<(String, Vec<View>)>,
	otherwise: Option<Vec<View>>,
}

impl Branch {
	/// Branches on `subject`.
	pub fn new(subject: impl Into<Expr>) -> Self {
		Self {
			subject: subject.into(),
			cases: Vec::new(),
			otherwise: None,
		}
	}

	/// Adds a case; keys are compared as strings, first match wins.
	pub fn case(
		mut self,
		key: impl Into<String>,
		children: impl IntoIterator<Item = impl IntoView>,
	) -> Self {
		self.cases.push((
			key.into(),
			children.into_iter().map(IntoView::into_view).collect(),
		));
		self
	}

	/// Sets the default branch.
	pub fn otherwise(mut self, children: impl IntoIterator<Item = impl IntoView>) -> Self {
		self.otherwise = Some(children.into_iter().map(IntoView::into_view).collect());
		self
	}

	/// Iterates over case keys in order.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.cases.iter().map(|(key, _)| key.as_str())
	}

	pub(crate) fn render(&self, renderer: &mut Renderer, out: &mut String) -> CompileResult<()> {
		match renderer.target() {
			RenderTarget::ServerTemplate => {
				let subject = renderer.emitter().operand(&self.subject, out)?;
				let _ = write!(out, "{{% case {} %}}", subject);
				for (key, children) in &self.cases {
					let _ = write!(out, "{{% when {} %}}", quote(key));
					renderer.render_children(children, out)?;
				}
				if let Some(children) = &self.otherwise {
					out.push_str("{% else %}");
					renderer.render_children(children, out)?;
				}
				out.push_str("{% endcase %}");
				Ok(())
			}
			RenderTarget::Client => {
				let key = to_liquid_string(&self.subject.evaluate(renderer.context()));
				let selected = self
					.cases
					.iter()
					.find(|(candidate, _)| *candidate == key)
					.map(|(_, children)| children)
					.or(self.otherwise.as_ref());
				match selected {
					Some(children) => renderer.render_children(children, out),
					None => Ok(()),
				}
			}
		}
	}
}

impl IntoView for Branch {
	fn into_view(self) -> View {
		View::Branch(Box::new(self))
	}
}
