//! Island markers for SSR.
//!
//! These markers are embedded in the rendered template to enable client-side
//! hydration. The runtime uses them to find each island, its component and
//! the props to mount it with.

use crate::error::{CompileError, CompileResult};
use crate::expr::Expr;
use crate::renderer::{RenderOptions, Renderer};
use crate::target::RenderTarget;
use crate::view::{IntoView, View};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// The attribute naming the island's component.
pub const ISLAND_ATTR: &str = "data-rh-island";

/// The attribute name for hydration IDs.
pub const HYDRATION_ATTR_ID: &str = "data-rh-id";

/// The attribute name for serialized props.
///
/// Marks the `<script type="application/json">` payload child, or holds the
/// payload itself in the attribute form.
pub const HYDRATION_ATTR_PROPS: &str = "data-rh-props";

/// How a marker carries its props payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadForm {
	/// A `<script type="application/json" data-rh-props>` child holding raw JSON.
	#[default]
	Script,
	/// A `data-rh-props` attribute holding HTML-escaped JSON.
	Attribute,
}

/// A hydration island marker.
///
/// On the server target it renders the wrapper element with the component
/// name, a unique id and the props payload, followed by optional SSR
/// children. On the client target it renders nothing.
#[derive(Debug)]
pub struct IslandMarker {
	/// Explicit id; generated per document when absent.
	pub id: Option<String>,
	/// The component to mount.
	pub component_name: String,
	/// Expression producing the props JSON text.
	pub props: Expr,
	/// Server-rendered content shown until hydration.
	pub children: Vec<View>,
}

impl IslandMarker {
	/// Creates a marker whose payload is the JSON text produced by `props`.
	pub fn new(component_name: impl Into<String>, props: impl Into<Expr>) -> Self {
		Self {
			id: None,
			component_name: component_name.into(),
			props: props.into(),
			children: Vec::new(),
		}
	}

	/// Sets an explicit id. Inside loops it still gets the per-iteration suffix.
	pub fn with_id(mut self, id: impl Into<String>) -> Self {
		self.id = Some(id.into());
		self
	}

	/// Adds a child view.
	pub fn child(mut self, child: impl IntoView) -> Self {
		self.children.push(child.into_view());
		self
	}

	pub(crate) fn render(&self, renderer: &mut Renderer, out: &mut String) -> CompileResult<()> {
		if renderer.target() == RenderTarget::Client {
			return Ok(());
		}
		check_component_name(&self.component_name)?;

		let id = match &self.id {
			Some(id) => renderer.loop_suffixed(&html_escape_attr(id)),
			None => renderer.next_island().1,
		};
		let payload = renderer.emitter().filtered(&self.props, out)?;
		let mut content = String::new();
		renderer.render_children(&self.children, &mut content)?;
		write_marker(
			out,
			renderer.options(),
			&id,
			&self.component_name,
			&payload,
			&content,
		);
		Ok(())
	}
}

impl IntoView for IslandMarker {
	fn into_view(self) -> View {
		View::Island(Box::new(self))
	}
}

pub(crate) fn check_component_name(name: &str) -> CompileResult<()> {
	let valid = !name.is_empty()
		&& name
			.chars()
			.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':' | '/'));
	if valid {
		Ok(())
	} else {
		Err(CompileError::InvalidIdentifier {
			kind: "component name",
			name: name.to_string(),
		})
	}
}

/// Writes the island wrapper. `payload` is Liquid source for the props JSON.
pub(crate) fn write_marker(
	out: &mut String,
	options: &RenderOptions,
	id: &str,
	component_name: &str,
	payload: &str,
	content: &str,
) {
	let tag = &options.island_tag;
	let _ = write!(
		out,
		"<{} {}=\"{}\" {}=\"{}\"",
		tag,
		ISLAND_ATTR,
		html_escape_attr(component_name),
		HYDRATION_ATTR_ID,
		id
	);
	match options.payload_form {
		PayloadForm::Script => {
			let _ = write!(
				out,
				"><script type=\"application/json\" {}>{{{{ {} | replace: '</', '<\\/' }}}}</script>",
				HYDRATION_ATTR_PROPS, payload
			);
		}
		PayloadForm::Attribute => {
			let _ = write!(
				out,
				" {}=\"{{{{ {} | escape }}}}\">",
				HYDRATION_ATTR_PROPS, payload
			);
		}
	}
	out.push_str(content);
	let _ = write!(out, "</{}>", tag);
}

/// Escapes a string for use in an HTML attribute value.
fn html_escape_attr(s: &str) -> String {
	s.replace('&', "&amp;")
		.replace('"', "&quot;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
}
