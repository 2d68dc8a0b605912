//! Island factory: an ordinary component wrapped as a hydration island.
//!
//! Liquid has no object literals, so the server target assembles the props
//! JSON with `json` and `append` only:
//!
//! ```text
//! {% assign rh_props_0 = '{' %}
//! {% assign rh_props_0_key = 'title' | json %}
//! {% assign rh_props_0_value = product.title | default: 'Untitled' | json %}
//! {% assign rh_props_0 = rh_props_0 | append: rh_props_0_key | append: ':' | append: rh_props_0_value %}
//! {% assign rh_props_0 = rh_props_0 | append: '}' %}
//! ```
//!
//! Only single-quoted literals appear in the generated tags; every `"` in the
//! payload comes from the engine's own `json` filter.

use super::marker::{check_component_name, write_marker};
use crate::component::{DynComponent, Props};
use crate::error::{CompileError, CompileResult};
use crate::expr::{Expr, Literal, is_identifier, quote};
use crate::renderer::Renderer;
use crate::target::RenderTarget;
use crate::view::{IntoView, View};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Where a prop's value comes from.
#[derive(Debug, Clone, PartialEq)]
pub struct PropSource {
	path: String,
	default: Option<Literal>,
}

impl PropSource {
	/// Reads the prop from a variable path.
	pub fn var(path: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			default: None,
		}
	}

	/// Falls back to `value` when the variable is nil, false or empty.
	pub fn default(mut self, value: impl Into<Literal>) -> Self {
		self.default = Some(value.into());
		self
	}

	/// The source variable path.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// The expression producing the prop value.
	pub fn expr(&self) -> Expr {
		let source = Expr::var(self.path.as_str());
		match &self.default {
			Some(default) => source.default(default.clone()),
			None => source,
		}
	}
}

#[derive(Deserialize)]
struct PropSourceSpec {
	source: String,
	#[serde(default)]
	default: Option<Value>,
}

/// An ordered `prop name → source` mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropMapping {
	entries: Vec<(String, PropSource)>,
}

impl PropMapping {
	/// Creates an empty mapping.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses the declarative form
	/// `{"title": {"source": "product.title", "default": "Untitled"}}`.
	///
	/// Entries are ordered by prop name.
	pub fn from_json(json: &str) -> CompileResult<Self> {
		let specs: BTreeMap<String, PropSourceSpec> = serde_json::from_str(json)
			.map_err(|error| CompileError::InvalidMapping(error.to_string()))?;
		let mut mapping = Self::new();
		for (name, spec) in specs {
			let mut source = PropSource::var(spec.source);
			if let Some(default) = spec.default {
				let literal = Literal::from_value(&default).ok_or_else(|| {
					CompileError::InvalidMapping(format!(
						"default of '{}' must be a scalar",
						name
					))
				})?;
				source = source.default(literal);
			}
			mapping.insert(name, source);
		}
		Ok(mapping)
	}

	/// Adds or replaces a prop.
	pub fn insert(&mut self, name: impl Into<String>, source: PropSource) {
		let name = name.into();
		match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
			Some((_, slot)) => *slot = source,
			None => self.entries.push((name, source)),
		}
	}

	/// Iterates over entries in order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &PropSource)> {
		self.entries
			.iter()
			.map(|(name, source)| (name.as_str(), source))
	}

	/// Number of props.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns `true` when no props are mapped.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

/// Wraps a component and a prop mapping into a hydration island.
#[derive(Debug, Clone)]
pub struct IslandFactory {
	component: DynComponent,
	mapping: PropMapping,
}

impl IslandFactory {
	/// Creates a factory for `component` with no props.
	pub fn new(component: impl Into<DynComponent>) -> Self {
		Self {
			component: component.into(),
			mapping: PropMapping::new(),
		}
	}

	/// Maps one prop.
	pub fn prop(mut self, name: impl Into<String>, source: PropSource) -> Self {
		self.mapping.insert(name, source);
		self
	}

	/// Replaces the whole mapping.
	pub fn with_mapping(mut self, mapping: PropMapping) -> Self {
		self.mapping = mapping;
		self
	}

	/// The island (component) name.
	pub fn name(&self) -> &str {
		self.component.name()
	}

	/// The prop mapping.
	pub fn mapping(&self) -> &PropMapping {
		&self.mapping
	}

	/// A view rendering this island.
	pub fn view(&self) -> View {
		View::IslandComponent(Box::new(self.clone()))
	}

	pub(crate) fn render(&self, renderer: &mut Renderer, out: &mut String) -> CompileResult<()> {
		for (name, _) in self.mapping.iter() {
			if !is_identifier(name) {
				return Err(CompileError::InvalidIdentifier {
					kind: "prop name",
					name: name.to_string(),
				});
			}
		}
		match renderer.target() {
			RenderTarget::ServerTemplate => self.render_template(renderer, out),
			RenderTarget::Client => {
				let mut props = Props::new();
				for (name, source) in self.mapping.iter() {
					let expr = source.expr();
					let value = expr.evaluate(renderer.context());
					props.insert_resolved(name, expr, value);
				}
				let view = self.component.render(&props);
				renderer.render_view(&view, out)
			}
		}
	}

	fn render_template(&self, renderer: &mut Renderer, out: &mut String) -> CompileResult<()> {
		check_component_name(self.name())?;
		let (index, id) = renderer.next_island();
		let var = format!("{}{}", renderer.options().props_var_prefix, index);
		let key_var = format!("{}_key", var);
		let value_var = format!("{}_value", var);

		let mut props = Props::new();
		let emitter = renderer.emitter();
		emitter.assign(out, &var, "'{'");
		for (i, (name, source)) in self.mapping.iter().enumerate() {
			let expr = source.expr();
			let value = emitter.filtered(&expr.clone().json(), out)?;
			emitter.assign(out, &key_var, &format!("{} | json", quote(name)));
			emitter.assign(out, &value_var, &value);
			let separator = if i == 0 { "" } else { " | append: ','" };
			emitter.assign(
				out,
				&var,
				&format!(
					"{}{} | append: {} | append: ':' | append: {}",
					var, separator, key_var, value_var
				),
			);
			props.insert(name, expr);
		}
		emitter.assign(out, &var, &format!("{} | append: '}}'", var));

		let view = self.component.render(&props);
		let mut content = String::new();
		renderer.render_view(&view, &mut content)?;
		write_marker(out, renderer.options(), &id, self.name(), &var, &content);
		Ok(())
	}
}

impl IntoView for IslandFactory {
	fn into_view(self) -> View {
		View::IslandComponent(Box::new(self))
	}
}
