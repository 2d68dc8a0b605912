//! `if` / `unless` blocks.

use crate::condition::Condition;
use crate::error::CompileResult;
use crate::renderer::Renderer;
use crate::target::RenderTarget;
use crate::view::{IntoView, View};
use std::fmt::Write;

/// A conditional block with optional `elsif` branches and an `else` branch.
#[derive(Debug)]
pub struct Conditional {
	negated: bool,
	branches: Vec<(Condition, Vec<View>)>,
	otherwise: Option<Vec<View>>,
}

impl Conditional {
	/// Renders `children` when `condition` holds.
	pub fn new(
		condition: impl Into<Condition>,
		children: impl IntoIterator<Item = impl IntoView>,
	) -> Self {
		Self {
			negated: false,
			branches: vec![(condition.into(), collect(children))],
			otherwise: None,
		}
	}

	/// Renders `children` when `condition` does not hold (`unless`).
	pub fn unless(
		condition: impl Into<Condition>,
		children: impl IntoIterator<Item = impl IntoView>,
	) -> Self {
		Self {
			negated: true,
			..Self::new(condition, children)
		}
	}

	/// Adds an `elsif` branch.
	pub fn else_if(
		mut self,
		condition: impl Into<Condition>,
		children: impl IntoIterator<Item = impl IntoView>,
	) -> Self {
		self.branches.push((condition.into(), collect(children)));
		self
	}

	/// Sets the `else` branch.
	pub fn otherwise(mut self, children: impl IntoIterator<Item = impl IntoView>) -> Self {
		self.otherwise = Some(collect(children));
		self
	}

	/// Returns the head condition.
	pub fn condition(&self) -> &Condition {
		&self.branches[0].0
	}

	pub(crate) fn render(&self, renderer: &mut Renderer, out: &mut String) -> CompileResult<()> {
		match renderer.target() {
			RenderTarget::ServerTemplate => self.render_template(renderer, out),
			RenderTarget::Client => {
				let selected = {
					let context = renderer.context();
					self.branches
						.iter()
						.enumerate()
						.find(|(i, (condition, _))| {
							let holds = condition.evaluate(context);
							if *i == 0 && self.negated { !holds } else { holds }
						})
						.map(|(_, (_, children))| children)
						.or(self.otherwise.as_ref())
				};
				match selected {
					Some(children) => renderer.render_children(children, out),
					None => Ok(()),
				}
			}
		}
	}

	fn render_template(&self, renderer: &mut Renderer, out: &mut String) -> CompileResult<()> {
		let mut heads = Vec::with_capacity(self.branches.len());
		for (condition, _) in &self.branches {
			let or_joins = condition.or_count();
			if or_joins >= 2 && renderer.options().warn_on_or_chains {
				tracing::warn!(
					condition = %condition.template(),
					or_joins,
					"conditional chains several `or` clauses; a Branch (case/when) reads better"
				);
			}
			heads.push(renderer.emitter().condition(condition, out)?);
		}

		let (open, close) = if self.negated {
			("unless", "endunless")
		} else {
			("if", "endif")
		};
		for (i, ((_, children), head)) in self.branches.iter().zip(&heads).enumerate() {
			if i == 0 {
				let _ = write!(out, "{{% {} {} %}}", open, head);
			} else {
				let _ = write!(out, "{{% elsif {} %}}", head);
			}
			renderer.render_children(children, out)?;
		}
		if let Some(children) = &self.otherwise {
			out.push_str("{% else %}");
			renderer.render_children(children, out)?;
		}
		let _ = write!(out, "{{% {} %}}", close);
		Ok(())
	}
}

impl IntoView for Conditional {
	fn into_view(self) -> View {
		View::Conditional(Box::new(self))
	}
}

fn collect(children: impl IntoIterator<Item = impl IntoView>) -> Vec<View> {
	children.into_iter().map(IntoView::into_view).collect()
}
