//! Dual-target Liquid rendering
//!
//! This module provides access to reinhardt-liquid: expressions, conditions
//! and structural primitives that render either to Liquid template source
//! for the storefront engine or to HTML from live JSON data.
//!
//! ## Example
//!
//! ```rust
//! use reinhardt_islands::liquid::prelude::*;
//! use serde_json::json;
//!
//! let view = Conditional::new(
//!     Expr::var("product.available"),
//!     [View::text("In stock")],
//! )
//! .otherwise([View::text("Sold out")])
//! .into_view();
//!
//! let template = Renderer::server().render(&view).unwrap();
//! assert_eq!(
//!     template,
//!     "{% if product.available %}In stock{% else %}Sold out{% endif %}"
//! );
//!
//! let context = Context::new(json!({"product": {"available": false}}));
//! assert_eq!(Renderer::client(context).render(&view).unwrap(), "Sold out");
//! ```

// Re-export all reinhardt-liquid functionality
pub use reinhardt_liquid::*;
