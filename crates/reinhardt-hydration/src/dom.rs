//! DOM abstraction used by the hydration runtime.
//!
//! The runtime never touches `web_sys` directly. It talks to a [`Dom`]: the
//! browser implementation ([`WebDom`], WASM only) or the in-memory
//! [`MemoryDom`] used by native tests and tooling.
//!
//! ## Architecture
//!
//! ```text
//! HydrationRuntime
//!        │  find_islands / attributes / payload_text
//!        │  mount / clear / dispatch
//!        │  bounding_rect / viewport / observe / when_idle
//!        ▼
//!      Dom ──► WebDom (web_sys)
//!          └─► MemoryDom (Rc<RefCell<Tree>>)
//! ```

mod memory;
#[cfg(target_arch = "wasm32")]
mod web;

pub use memory::{MemoryDom, NodeId};
#[cfg(target_arch = "wasm32")]
pub use web::WebDom;

use crate::events::IslandEvent;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// Called while an observed element intersects the grown viewport.
pub type ObserverCallback = Rc<dyn Fn()>;

/// Work scheduled for the first idle opportunity after the document is ready.
pub type IdleTask = Box<dyn FnOnce()>;

/// An axis-aligned rectangle in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
	/// Left edge.
	pub x: f64,
	/// Top edge.
	pub y: f64,
	/// Width.
	pub width: f64,
	/// Height.
	pub height: f64,
}

impl Rect {
	/// Creates a rectangle.
	pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
		Self {
			x,
			y,
			width,
			height,
		}
	}

	/// Grows the rectangle by `margin` on every side.
	pub fn expand(&self, margin: f64) -> Self {
		Self {
			x: self.x - margin,
			y: self.y - margin,
			width: self.width + margin * 2.0,
			height: self.height + margin * 2.0,
		}
	}

	/// Returns `true` when the rectangles overlap or touch.
	pub fn intersects(&self, other: &Rect) -> bool {
		self.x <= other.x + other.width
			&& other.x <= self.x + self.width
			&& self.y <= other.y + other.height
			&& other.y <= self.y + self.height
	}
}

/// HTML markup produced by a component.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Markup(String);

impl Markup {
	/// Wraps an HTML string.
	pub fn new(html: impl Into<String>) -> Self {
		Self(html.into())
	}

	/// The HTML text.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Consumes the markup, returning the HTML text.
	pub fn into_string(self) -> String {
		self.0
	}
}

impl From<String> for Markup {
	fn from(html: String) -> Self {
		Self(html)
	}
}

impl From<&str> for Markup {
	fn from(html: &str) -> Self {
		Self(html.to_string())
	}
}

impl fmt::Display for Markup {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Errors raised while attaching a component's tree to its container.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum MountError {
	/// The container is no longer part of the document.
	#[error("container is detached from the document")]
	Detached,
	/// The DOM refused the tree.
	#[error("mount rejected: {0}")]
	Rejected(String),
}

/// The DOM operations the hydration runtime needs.
pub trait Dom {
	/// Element handle.
	type Element: Clone + PartialEq + fmt::Debug + 'static;

	/// Tree type mounted into island containers.
	///
	/// Global components registered through
	/// [`register_island_component!`](crate::register_island_component)
	/// produce [`Markup`], hence the `From` bound.
	type Node: From<Markup>;

	/// Island elements under `root` (the whole document when `None`),
	/// `root` included, in document order.
	fn find_islands(&self, root: Option<&Self::Element>) -> Vec<Self::Element>;

	/// Returns `true` when `descendant` is `ancestor` or lies inside it.
	fn contains(&self, ancestor: &Self::Element, descendant: &Self::Element) -> bool;

	/// Reads an attribute.
	fn get_attribute(&self, element: &Self::Element, name: &str) -> Option<String>;

	/// Writes an attribute.
	fn set_attribute(&self, element: &Self::Element, name: &str, value: &str);

	/// Removes an attribute.
	fn remove_attribute(&self, element: &Self::Element, name: &str);

	/// Text of the element's `<script type="application/json" data-rh-props>`
	/// child, when present.
	fn payload_text(&self, element: &Self::Element) -> Option<String>;

	/// Replaces the container's content with `node`.
	fn mount(&self, node: Self::Node, container: &Self::Element) -> Result<(), MountError>;

	/// Removes the container's content.
	fn clear(&self, container: &Self::Element);

	/// Dispatches a bubbling event on `element`.
	fn dispatch(&self, element: &Self::Element, event: &IslandEvent);

	/// The element's bounding box.
	fn bounding_rect(&self, element: &Self::Element) -> Rect;

	/// The viewport.
	fn viewport(&self) -> Rect;

	/// Calls `callback` once `element` intersects the viewport grown by
	/// `root_margin_px`. Returns `false` when observation is unavailable.
	fn observe(
		&self,
		element: &Self::Element,
		root_margin_px: f64,
		callback: ObserverCallback,
	) -> bool;

	/// Stops observing `element`.
	fn unobserve(&self, element: &Self::Element);

	/// Runs `task` once the document is ready and the browser is idle.
	fn when_idle(&self, task: IdleTask);
}
