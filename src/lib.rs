//! # Reinhardt Islands
//!
//! Liquid storefront rendering with hydration islands.
//!
//! Pages are written once as Rust views. The same view tree compiles to a
//! Liquid template that the storefront engine renders on the server, and
//! renders to HTML on the client from live JSON data. Interactive parts are
//! marked as islands; the hydration runtime finds them in the served page
//! and mounts a component into each one.
//!
//! ## Feature Flags
//!
//! - `full` (default) - Everything below, plus [`LiquidIsland`]
//! - `liquid` - Template compiler and structural primitives ([`liquid`])
//! - `hydration` - Client hydration runtime ([`hydration`])
//!
//! ## Architecture
//!
//! ```text
//!            View tree (Expr, Conditional, Loop, Branch, islands)
//!               │                                  │
//!   Renderer::server()                    Renderer::client(ctx)
//!               │                                  │
//!        Liquid template                         HTML
//!               │                                  ▲
//!     storefront engine ──► page ──► HydrationRuntime
//! ```
//!
//! ## Example
//!
//! ```rust
//! use reinhardt_islands::prelude::*;
//!
//! struct AddToCart;
//!
//! impl Component for AddToCart {
//!     fn render(&self, props: &Props) -> View {
//!         View::element("button").child(props.get("label")).into_view()
//!     }
//!
//!     fn name() -> &'static str {
//!         "AddToCart"
//!     }
//! }
//!
//! // Server: compile the island into the theme template
//! let view = IslandFactory::new(AddToCart)
//!     .prop("label", PropSource::var("settings.cart_label").default("Add"))
//!     .view();
//! let template = Renderer::server().render(&view).unwrap();
//! assert!(template.contains("data-rh-island=\"AddToCart\""));
//!
//! // Client: hydrate the page the engine produced
//! let dom = MemoryDom::new();
//! let island = dom.insert_island(dom.body(), "AddToCart", "rh-island-0", Some(r#"{"label":"Buy"}"#));
//! let runtime = HydrationRuntime::new(dom.clone());
//! register_liquid_island(&runtime, LiquidIsland::new(AddToCart));
//! runtime.hydrate(None);
//!
//! assert_eq!(dom.inner_html(island), "<button>Buy</button>");
//! ```

#![warn(missing_docs)]

#[cfg(all(feature = "liquid", feature = "hydration"))]
mod bridge;
#[cfg(feature = "hydration")]
pub mod hydration;
#[cfg(feature = "liquid")]
pub mod liquid;

#[cfg(all(feature = "liquid", feature = "hydration"))]
pub use bridge::{LiquidIsland, register_liquid_island};

#[cfg(feature = "hydration")]
pub use reinhardt_hydration::register_island_component;

/// Commonly used items.
///
/// Liquid's [`Component`](crate::liquid::Component) and
/// [`Props`](crate::liquid::Props) take the plain names; the hydration
/// runtime's counterparts stay under [`hydration`](crate::hydration).
pub mod prelude {
	#[cfg(feature = "liquid")]
	pub use reinhardt_liquid::prelude::*;

	#[cfg(feature = "hydration")]
	pub use reinhardt_hydration::{
		ComponentError, Dom, HydrationConfig, HydrationRuntime, IslandEvent, IslandState, Markup,
		MemoryDom, register_island_component,
	};
	#[cfg(all(feature = "hydration", target_arch = "wasm32"))]
	pub use reinhardt_hydration::WebDom;

	#[cfg(all(feature = "liquid", feature = "hydration"))]
	pub use crate::bridge::{LiquidIsland, register_liquid_island};
}
