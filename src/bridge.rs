//! Hydrating Liquid components
//!
//! A [`LiquidIsland`] lets the hydration runtime mount a Liquid component.
//! The island's props become the render context and the component's view
//! renders through the client target, so the mounted markup matches what
//! the server template produced for the same data.

use crate::hydration::{ComponentError, Dom, HydrationRuntime, Markup, Props as IslandProps};
use crate::liquid::{Context, DynComponent, Props, Renderer};
use serde_json::Value;

/// A Liquid component mounted by the hydration runtime.
///
/// # Example
///
/// ```
/// use reinhardt_islands::hydration::{HydrationRuntime, MemoryDom};
/// use reinhardt_islands::liquid::prelude::*;
/// use reinhardt_islands::{LiquidIsland, register_liquid_island};
///
/// let price = DynComponent::from_fn("Price", |props: &Props| {
///     View::element("span").child(props.get("cents").money()).into_view()
/// });
///
/// let dom = MemoryDom::new();
/// let island = dom.insert_island(dom.body(), "Price", "rh-island-0", Some(r#"{"cents": 1250}"#));
/// let runtime = HydrationRuntime::new(dom.clone());
/// register_liquid_island(&runtime, LiquidIsland::new(price));
/// runtime.hydrate(None);
///
/// assert_eq!(dom.inner_html(island), "<span>$12.50</span>");
/// ```
#[derive(Debug, Clone)]
pub struct LiquidIsland {
	component: DynComponent,
	money_format: Option<String>,
}

impl LiquidIsland {
	/// Wraps a component.
	pub fn new(component: impl Into<DynComponent>) -> Self {
		Self {
			component: component.into(),
			money_format: None,
		}
	}

	/// Sets the shop's money format used by the `money` filter.
	pub fn money_format(mut self, format: impl Into<String>) -> Self {
		self.money_format = Some(format.into());
		self
	}

	/// The component name, used as the island name.
	pub fn name(&self) -> &str {
		self.component.name()
	}

	/// Renders the component for `props`.
	pub fn create(&self, props: &IslandProps) -> Result<Markup, ComponentError> {
		let view = self.component.render(&Props::from_json(props));
		let mut context = Context::new(Value::Object(props.clone()));
		if let Some(format) = &self.money_format {
			context = context.with_money_format(format.as_str());
		}
		let html = Renderer::client(context)
			.render(&view)
			.map_err(|error| ComponentError::Failed(error.to_string()))?;
		tracing::debug!(component = self.name(), "rendered liquid island");
		Ok(Markup::new(html))
	}
}

/// Registers `island` with `runtime` under its component name.
pub fn register_liquid_island<D: Dom + 'static>(runtime: &HydrationRuntime<D>, island: LiquidIsland) {
	let name = island.name().to_string();
	runtime.register(
		name,
		move |props: &IslandProps| -> Result<D::Node, ComponentError> {
			island.create(props).map(D::Node::from)
		},
	);
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::hydration::MemoryDom;
	use crate::liquid::{Expr, IntoView, View};
	use rstest::rstest;
	use serde_json::json;

	fn greeting() -> DynComponent {
		DynComponent::from_fn("Greeting", |props: &Props| {
			View::element("p")
				.child(View::text("Hi "))
				.child(props.get("name").default("there"))
				.into_view()
		})
	}

	fn props(value: Value) -> IslandProps {
		match value {
			Value::Object(map) => map,
			_ => IslandProps::new(),
		}
	}

	#[rstest]
	#[case(json!({"name": "Ada"}), "<p>Hi Ada</p>")]
	#[case(json!({}), "<p>Hi there</p>")]
	#[case(json!({"name": "<b>"}), "<p>Hi &lt;b&gt;</p>")]
	fn test_create_renders_client_markup(#[case] input: Value, #[case] expected: &str) {
		let island = LiquidIsland::new(greeting());
		let markup = island.create(&props(input)).unwrap();
		assert_eq!(markup.as_str(), expected);
	}

	#[rstest]
	fn test_money_format_applies() {
		let price = DynComponent::from_fn("Price", |props: &Props| {
			View::output(props.get("cents").money())
		});
		let island = LiquidIsland::new(price).money_format("{{amount}} EUR");
		let markup = island.create(&props(json!({"cents": 500}))).unwrap();
		assert_eq!(markup.as_str(), "5.00 EUR");
	}

	#[rstest]
	fn test_render_error_becomes_component_error() {
		let broken = DynComponent::from_fn("Broken", |_: &Props| {
			crate::liquid::Loop::each("bad name", Expr::var("items"), |_| View::text("x"))
				.into_view()
		});
		let island = LiquidIsland::new(broken);
		assert!(matches!(
			island.create(&IslandProps::new()),
			Err(ComponentError::Failed(_))
		));
	}

	#[rstest]
	fn test_register_uses_component_name() {
		let dom = MemoryDom::new();
		let element = dom.insert_island(dom.body(), "Greeting", "g", Some(r#"{"name": "Lin"}"#));
		let runtime = HydrationRuntime::new(dom.clone());
		register_liquid_island(&runtime, LiquidIsland::new(greeting()));

		let report = runtime.hydrate(None);
		assert_eq!(report.hydrated, vec!["g"]);
		assert_eq!(dom.inner_html(element), "<p>Hi Lin</p>");
	}
}
