//! # Reinhardt Liquid
//!
//! Dual-target rendering for Liquid storefront templates with hydration
//! islands.
//!
//! Every expression and view renders one of two ways:
//!
//! - **Server template**: Liquid source (`{{ }}`, `{% %}`, filters) for the
//!   templating engine that runs on the server
//! - **Client**: plain HTML computed from live JSON data, with the same
//!   semantics the engine applies
//!
//! ## Architecture
//!
//! ```text
//! Expr / Condition        value and boolean expressions
//!        │
//! View + primitives       Conditional, Loop, Branch
//!        │
//! IslandMarker / Factory  hydration islands
//!        │
//! Renderer                one document, one target
//! ```
//!
//! ## Example
//!
//! ```
//! use reinhardt_liquid::prelude::*;
//! use serde_json::json;
//!
//! let view = Loop::each("product", Expr::var("products"), |item| {
//!     View::element("li").child(item.field("title").upcase()).into_view()
//! })
//! .into_view();
//!
//! let template = Renderer::server().render(&view).unwrap();
//! assert_eq!(
//!     template,
//!     "{% for product in products %}<li>{{ product.title | upcase | escape }}</li>{% endfor %}"
//! );
//!
//! let context = Context::new(json!({"products": [{"title": "tee"}]}));
//! let html = Renderer::client(context).render(&view).unwrap();
//! assert_eq!(html, "<li>TEE</li>");
//! ```

#![warn(missing_docs)]

pub mod component;
pub mod condition;
pub mod context;
mod emit;
pub mod error;
pub mod expr;
pub mod island;
pub mod pipeline;
pub mod primitives;
pub mod renderer;
pub mod target;
pub mod value;
pub mod view;

pub use component::{Component, DynComponent, Props};
pub use condition::{Clause, CompareOp, Condition, LogicOp, Predicate};
pub use context::Context;
pub use error::{CompileError, CompileResult};
pub use expr::{Evaluator, Expr, Filter, FilterCall, Literal, VariablePath};
pub use island::{IslandFactory, IslandMarker, PayloadForm, PropMapping, PropSource};
pub use pipeline::{CompileUnit, CompiledUnit, UnitOutcome, compile_units};
pub use primitives::{Branch, Conditional, Loop, LoopItem};
pub use renderer::{RenderOptions, Renderer};
pub use target::RenderTarget;
pub use view::{ElementView, IntoView, View};

/// Commonly used items.
pub mod prelude {
	pub use crate::component::{Component, DynComponent, Props};
	pub use crate::condition::Condition;
	pub use crate::context::Context;
	pub use crate::expr::Expr;
	pub use crate::island::{IslandFactory, IslandMarker, PropSource};
	pub use crate::primitives::{Branch, Conditional, Loop, LoopItem};
	pub use crate::renderer::{RenderOptions, Renderer};
	pub use crate::target::RenderTarget;
	pub use crate::view::{IntoView, View};
}
