//! Dual-target renderer.
//!
//! One [`Renderer`] renders one document. It owns the render target, the
//! client data context, the island id counter and the temporaries used for
//! Liquid lowering, so independent renders never share state.

use crate::component::{Component, Props};
use crate::context::Context;
use crate::emit::Emitter;
use crate::error::CompileResult;
use crate::expr::Expr;
use crate::island::PayloadForm;
use crate::target::RenderTarget;
use crate::value::to_liquid_string;
use crate::view::{AttrValue, ElementView, View, html_escape, protect_delimiters};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Options for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
	/// Prefix of generated island ids.
	pub island_id_prefix: String,
	/// Prefix of hoisted Liquid temporaries.
	pub temp_prefix: String,
	/// Prefix of the variables holding assembled island props.
	pub props_var_prefix: String,
	/// Where island markers carry their props payload.
	pub payload_form: PayloadForm,
	/// Tag of the island wrapper element.
	pub island_tag: String,
	/// Whether conditionals with two or more `or` joins log a warning.
	pub warn_on_or_chains: bool,
}

impl Default for RenderOptions {
	fn default() -> Self {
		Self {
			island_id_prefix: "rh-island-".to_string(),
			temp_prefix: "rh_tmp_".to_string(),
			props_var_prefix: "rh_props_".to_string(),
			payload_form: PayloadForm::Script,
			island_tag: "div".to_string(),
			warn_on_or_chains: true,
		}
	}
}

impl RenderOptions {
	/// Creates new default options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Loads options from JSON; missing fields keep their defaults.
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}

	/// Sets the island id prefix.
	pub fn island_id_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.island_id_prefix = prefix.into();
		self
	}

	/// Sets the prefix of hoisted temporaries.
	pub fn temp_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.temp_prefix = prefix.into();
		self
	}

	/// Sets the prefix of island props variables.
	pub fn props_var_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.props_var_prefix = prefix.into();
		self
	}

	/// Sets the payload form of island markers.
	pub fn payload_form(mut self, form: PayloadForm) -> Self {
		self.payload_form = form;
		self
	}

	/// Sets the island wrapper tag.
	pub fn island_tag(mut self, tag: impl Into<String>) -> Self {
		self.island_tag = tag.into();
		self
	}

	/// Enables or disables the `or` chain warning.
	pub fn warn_on_or_chains(mut self, enable: bool) -> Self {
		self.warn_on_or_chains = enable;
		self
	}
}

/// The dual-target renderer.
pub struct Renderer {
	options: RenderOptions,
	target: RenderTarget,
	context: Context,
	emitter: Emitter,
	islands: usize,
	loop_depth: usize,
}

impl Default for Renderer {
	fn default() -> Self {
		Self::new()
	}
}

impl Renderer {
	/// Creates a renderer for the default target.
	pub fn new() -> Self {
		tracing::debug!(
			render_target = ?RenderTarget::default(),
			"no render target selected, using the default"
		);
		Self::with_target(RenderTarget::default(), Context::empty())
	}

	/// Creates a renderer emitting Liquid source.
	pub fn server() -> Self {
		Self::with_target(RenderTarget::ServerTemplate, Context::empty())
	}

	/// Creates a renderer evaluating against live data.
	pub fn client(context: Context) -> Self {
		Self::with_target(RenderTarget::Client, context)
	}

	/// Creates a renderer for an explicit target.
	pub fn with_target(target: RenderTarget, context: Context) -> Self {
		let options = RenderOptions::default();
		Self {
			emitter: Emitter::new(options.temp_prefix.clone()),
			options,
			target,
			context,
			islands: 0,
			loop_depth: 0,
		}
	}

	/// Replaces the render options.
	pub fn with_options(mut self, options: RenderOptions) -> Self {
		self.emitter = Emitter::new(options.temp_prefix.clone());
		self.options = options;
		self
	}

	/// Returns the render target.
	pub fn target(&self) -> RenderTarget {
		self.target
	}

	/// Returns the render options.
	pub fn options(&self) -> &RenderOptions {
		&self.options
	}

	/// Returns the client data context.
	pub fn context(&self) -> &Context {
		&self.context
	}

	/// Number of islands rendered so far.
	pub fn islands_rendered(&self) -> usize {
		self.islands
	}

	/// Renders a view tree.
	pub fn render(&mut self, view: &View) -> CompileResult<String> {
		let mut out = String::new();
		self.render_view(view, &mut out)?;
		Ok(out)
	}

	/// Renders a component with the given props.
	pub fn render_component<C: Component>(
		&mut self,
		component: &C,
		props: &Props,
	) -> CompileResult<String> {
		let view = component.render(props);
		self.render(&view)
	}

	pub(crate) fn context_mut(&mut self) -> &mut Context {
		&mut self.context
	}

	pub(crate) fn emitter(&mut self) -> &mut Emitter {
		&mut self.emitter
	}

	pub(crate) fn enter_loop(&mut self) {
		self.loop_depth += 1;
	}

	pub(crate) fn exit_loop(&mut self) {
		self.loop_depth = self.loop_depth.saturating_sub(1);
	}

	/// Allocates the next island index and id.
	pub(crate) fn next_island(&mut self) -> (usize, String) {
		let index = self.islands;
		self.islands += 1;
		let id = format!("{}{}", self.options.island_id_prefix, index);
		(index, self.loop_suffixed(&id))
	}

	/// Appends one `-{{ forloop...index0 }}` per enclosing loop, outermost
	/// first, so every engine-side repetition of an island has a distinct id.
	/// Ids are left alone on the client target.
	pub(crate) fn loop_suffixed(&self, id: &str) -> String {
		let mut id = id.to_string();
		if self.target.is_server() {
			for level in (0..self.loop_depth).rev() {
				id.push_str("-{{ forloop");
				for _ in 0..level {
					id.push_str(".parentloop");
				}
				id.push_str(".index0 }}");
			}
		}
		id
	}

	pub(crate) fn render_children(&mut self, children: &[View], out: &mut String) -> CompileResult<()> {
		for child in children {
			self.render_view(child, out)?;
		}
		Ok(())
	}

	pub(crate) fn render_view(&mut self, view: &View, out: &mut String) -> CompileResult<()> {
		match view {
			View::Element(element) => self.render_element(element, out),
			View::Text(text) => {
				let escaped = html_escape(text);
				if self.target.is_server() {
					out.push_str(&protect_delimiters(&escaped));
				} else {
					out.push_str(&escaped);
				}
				Ok(())
			}
			View::Output(expr) => self.render_output(expr, true, out),
			View::RawOutput(expr) => self.render_output(expr, false, out),
			View::Conditional(conditional) => conditional.render(self, out),
			View::Loop(each) => each.render(self, out),
			View::Branch(branch) => branch.render(self, out),
			View::Island(marker) => marker.render(self, out),
			View::IslandComponent(factory) => factory.render(self, out),
			View::Fragment(children) => self.render_children(children, out),
			View::Empty => Ok(()),
		}
	}

	fn render_output(&mut self, expr: &Expr, escape: bool, out: &mut String) -> CompileResult<()> {
		match self.target {
			RenderTarget::ServerTemplate => {
				let source = self.emitter.filtered(expr, out)?;
				if escape {
					let _ = write!(out, "{{{{ {} | escape }}}}", source);
				} else {
					let _ = write!(out, "{{{{ {} }}}}", source);
				}
			}
			RenderTarget::Client => {
				let text = to_liquid_string(&expr.evaluate(&self.context));
				if escape {
					out.push_str(&html_escape(&text));
				} else {
					out.push_str(&text);
				}
			}
		}
		Ok(())
	}

	fn render_element(&mut self, element: &ElementView, out: &mut String) -> CompileResult<()> {
		let mut attrs = String::new();
		for (name, value) in element.attrs() {
			let rendered = match (value, self.target) {
				(AttrValue::Static(text), RenderTarget::ServerTemplate) => {
					protect_delimiters(&html_escape(text)).into_owned()
				}
				(AttrValue::Static(text), RenderTarget::Client) => html_escape(text),
				(AttrValue::Expr(expr), RenderTarget::ServerTemplate) => {
					format!("{{{{ {} | escape }}}}", self.emitter.filtered(expr, out)?)
				}
				(AttrValue::Expr(expr), RenderTarget::Client) => {
					html_escape(&to_liquid_string(&expr.evaluate(&self.context)))
				}
			};
			let _ = write!(attrs, " {}=\"{}\"", name, rendered);
		}

		let _ = write!(out, "<{}{}", element.tag_name(), attrs);
		if element.is_void() {
			out.push_str(" />");
		} else {
			out.push('>');
			self.render_children(element.child_views(), out)?;
			let _ = write!(out, "</{}>", element.tag_name());
		}
		Ok(())
	}
}
