//! Components for the dual-target renderer.
//!
//! A component turns [`Props`] into a [`View`](crate::view::View). The same
//! component renders on both targets: on the server its props hold Liquid
//! expressions, on the client they additionally carry evaluated values.
//!
//! ## Usage
//!
//! ```
//! use reinhardt_liquid::component::{DynComponent, Props};
//! use reinhardt_liquid::view::{IntoView, View};
//!
//! let card = DynComponent::from_fn("ProductCard", |props: &Props| {
//!     View::element("h2").child(props.get("title")).into_view()
//! });
//! assert_eq!(card.name(), "ProductCard");
//! ```

mod props;
mod r#trait;

pub use props::Props;
pub use r#trait::{Component, DynComponent};
