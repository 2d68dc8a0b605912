//! `for` blocks.

use crate::error::{CompileError, CompileResult};
use crate::expr::{Expr, is_identifier};
use crate::renderer::Renderer;
use crate::target::RenderTarget;
use crate::view::{IntoView, View};
use serde_json::{Map, Value, json};
use std::fmt::{self, Write};
use std::rc::Rc;

type RenderItem = Rc<dyn Fn(&LoopItem) -> View>;

enum Body {
	Children(Vec<View>),
	Render(RenderItem),
}

/// One iteration as seen by a loop body.
///
/// On the server target the body runs once and builds expressions through
/// [`field`](LoopItem::field) and [`expr`](LoopItem::expr); the item carries
/// no value. On the client target the body runs per element with the real
/// value and 0-based index.
#[derive(Debug, Clone)]
pub struct LoopItem {
	binding: String,
	index: Option<usize>,
	value: Option<Value>,
}

impl LoopItem {
	fn template(binding: &str) -> Self {
		Self {
			binding: binding.to_string(),
			index: None,
			value: None,
		}
	}

	/// The loop variable name.
	pub fn binding(&self) -> &str {
		&self.binding
	}

	/// The loop variable itself.
	pub fn expr(&self) -> Expr {
		Expr::var(self.binding.as_str())
	}

	/// A field of the loop variable, e.g. `item.title`.
	pub fn field(&self, name: &str) -> Expr {
		Expr::var(format!("{}.{}", self.binding, name))
	}

	/// `forloop.index0` of the innermost enclosing loop.
	pub fn index_expr(&self) -> Expr {
		Expr::var("forloop.index0")
	}

	/// The 0-based index, on the client target.
	pub fn index(&self) -> Option<usize> {
		self.index
	}

	/// The element value, on the client target.
	pub fn value(&self) -> Option<&Value> {
		self.value.as_ref()
	}
}

/// A loop over a collection with an optional `else` branch for empty input.
pub struct Loop {
	binding: String,
	collection: Expr,
	body: Body,
	otherwise: Option<Vec<View>>,
}

impl Loop {
	/// Repeats static children once per element; children refer to the
	/// element through `binding`.
	pub fn new(
		binding: impl Into<String>,
		collection: impl Into<Expr>,
		children: impl IntoIterator<Item = impl IntoView>,
	) -> Self {
		Self {
			binding: binding.into(),
			collection: collection.into(),
			body: Body::Children(children.into_iter().map(IntoView::into_view).collect()),
			otherwise: None,
		}
	}

	/// Builds the body from a callback receiving a [`LoopItem`].
	pub fn each<F>(binding: impl Into<String>, collection: impl Into<Expr>, render: F) -> Self
	where
		F: Fn(&LoopItem) -> View + 'static,
	{
		Self {
			binding: binding.into(),
			collection: collection.into(),
			body: Body::Render(Rc::new(render)),
			otherwise: None,
		}
	}

	/// Sets the branch rendered for an empty collection.
	pub fn otherwise(mut self, children: impl IntoIterator<Item = impl IntoView>) -> Self {
		self.otherwise = Some(children.into_iter().map(IntoView::into_view).collect());
		self
	}

	/// The loop variable name.
	pub fn binding(&self) -> &str {
		&self.binding
	}

	/// The iterated collection.
	pub fn collection(&self) -> &Expr {
		&self.collection
	}

	pub(crate) fn render(&self, renderer: &mut Renderer, out: &mut String) -> CompileResult<()> {
		if !is_identifier(&self.binding) {
			return Err(CompileError::InvalidIdentifier {
				kind: "loop binding",
				name: self.binding.clone(),
			});
		}
		match renderer.target() {
			RenderTarget::ServerTemplate => self.render_template(renderer, out),
			RenderTarget::Client => self.render_client(renderer, out),
		}
	}

	fn render_template(&self, renderer: &mut Renderer, out: &mut String) -> CompileResult<()> {
		let collection = renderer.emitter().operand(&self.collection, out)?;
		let _ = write!(out, "{{% for {} in {} %}}", self.binding, collection);

		renderer.enter_loop();
		let body = match &self.body {
			Body::Children(children) => renderer.render_children(children, out),
			Body::Render(render) => {
				let view = render(&LoopItem::template(&self.binding));
				renderer.render_view(&view, out)
			}
		};
		renderer.exit_loop();
		body?;

		if let Some(children) = &self.otherwise {
			out.push_str("{% else %}");
			renderer.render_children(children, out)?;
		}
		out.push_str("{% endfor %}");
		Ok(())
	}

	fn render_client(&self, renderer: &mut Renderer, out: &mut String) -> CompileResult<()> {
		let items = iteration_items(self.collection.evaluate(renderer.context()));
		if items.is_empty() {
			if let Some(children) = &self.otherwise {
				renderer.render_children(children, out)?;
			}
			return Ok(());
		}

		let parent = renderer.context().binding("forloop").cloned();
		let length = items.len();
		for (index, value) in items.into_iter().enumerate() {
			let context = renderer.context_mut();
			context.push_scope("forloop", forloop(index, length, parent.as_ref()));
			context.push_scope(self.binding.as_str(), value.clone());

			let body = match &self.body {
				Body::Children(children) => renderer.render_children(children, out),
				Body::Render(render) => {
					let item = LoopItem {
						binding: self.binding.clone(),
						index: Some(index),
						value: Some(value),
					};
					let view = render(&item);
					renderer.render_view(&view, out)
				}
			};

			let context = renderer.context_mut();
			context.pop_scope();
			context.pop_scope();
			body?;
		}
		Ok(())
	}
}

impl IntoView for Loop {
	fn into_view(self) -> View {
		View::Loop(Box::new(self))
	}
}

impl fmt::Debug for Loop {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let body = match &self.body {
			Body::Children(children) => format!("{} children", children.len()),
			Body::Render(_) => "callback".to_string(),
		};
		f.debug_struct("Loop")
			.field("binding", &self.binding)
			.field("collection", &self.collection)
			.field("body", &body)
			.field("otherwise", &self.otherwise)
			.finish()
	}
}

/// Arrays iterate their elements, objects iterate `[key, value]` pairs,
/// nil is empty and any other value iterates once.
fn iteration_items(collection: Value) -> Vec<Value> {
	match collection {
		Value::Array(items) => items,
		Value::Object(map) => map
			.into_iter()
			.map(|(key, value)| json!([key, value]))
			.collect(),
		Value::Null => Vec::new(),
		other => vec![other],
	}
}

fn forloop(index: usize, length: usize, parent: Option<&Value>) -> Value {
	let mut object = Map::new();
	object.insert("index".into(), json!(index + 1));
	object.insert("index0".into(), json!(index));
	object.insert("rindex".into(), json!(length - index));
	object.insert("rindex0".into(), json!(length - index - 1));
	object.insert("first".into(), json!(index == 0));
	object.insert("last".into(), json!(index + 1 == length));
	object.insert("length".into(), json!(length));
	if let Some(parent) = parent {
		object.insert("parentloop".into(), parent.clone());
	}
	Value::Object(object)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::context::Context;
	use rstest::rstest;

	fn titles() -> Loop {
		Loop::each("product", Expr::var("collection.products"), |item| {
			View::element("li").child(item.field("title")).into_view()
		})
		.otherwise(["No products"])
	}

	#[rstest]
	fn test_server_emits_single_for_block() {
		let html = Renderer::server().render(&titles().into_view()).unwrap();
		assert_eq!(
			html,
			"{% for product in collection.products %}<li>{{ product.title | escape }}</li>{% else %}No products{% endfor %}"
		);
	}

	#[rstest]
	fn test_client_iterates_with_index() {
		let view = Loop::each("n", Expr::var("numbers"), |item| {
			View::text(format!("{}:{};", item.index().unwrap_or(99), item.value().cloned().unwrap_or_default()))
		})
		.into_view();
		let context = Context::new(json!({"numbers": [10, 20]}));
		assert_eq!(Renderer::client(context).render(&view).unwrap(), "0:10;1:20;");
	}

	#[rstest]
	fn test_client_empty_collection_renders_otherwise() {
		let html = Renderer::client(Context::empty())
			.render(&titles().into_view())
			.unwrap();
		assert_eq!(html, "No products");
	}

	#[rstest]
	fn test_client_binds_forloop_and_parentloop() {
		let inner = Loop::new(
			"cell",
			Expr::var("row"),
			[View::output(Expr::var("forloop.parentloop.index")), View::text("."), View::output(Expr::var("forloop.index")), View::text(" ")],
		);
		let outer = Loop::new("row", Expr::var("grid"), [inner.into_view()]).into_view();
		let context = Context::new(json!({"grid": [["a", "b"], ["c"]]}));
		assert_eq!(
			Renderer::client(context).render(&outer).unwrap(),
			"1.1 1.2 2.1 "
		);
	}

	#[rstest]
	fn test_object_iterates_as_pairs() {
		let view = Loop::new("pair", Expr::var("opts"), [View::output(Expr::var("pair[0]")), View::text("=")]).into_view();
		let context = Context::new(json!({"opts": {"size": "M"}}));
		assert_eq!(Renderer::client(context).render(&view).unwrap(), "size=");
	}

	#[rstest]
	fn test_sorted_collection_is_hoisted() {
		let view = Loop::new("p", Expr::var("products").sort_by("price"), [View::text("x")]).into_view();
		assert_eq!(
			Renderer::server().render(&view).unwrap(),
			"{% assign rh_tmp_0 = products | sort: 'price' %}{% for p in rh_tmp_0 %}x{% endfor %}"
		);
	}

	#[rstest]
	fn test_invalid_binding_is_rejected() {
		let view = Loop::new("bad binding", Expr::var("items"), [View::text("x")]).into_view();
		assert_eq!(
			Renderer::server().render(&view),
			Err(CompileError::InvalidIdentifier {
				kind: "loop binding",
				name: "bad binding".into(),
			})
		);
	}
}
