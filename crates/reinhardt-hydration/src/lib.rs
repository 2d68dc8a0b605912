//! # Reinhardt Hydration
//!
//! Client-side runtime that mounts interactive islands into server-rendered
//! Liquid pages.
//!
//! ## Architecture
//!
//! ```text
//! server HTML ──► IslandDetector ──► HydrationRuntime ──► Component::create
//!                                         │                    │
//!                                         │                    ▼
//!                                         └────────────► Dom::mount
//! ```
//!
//! - [`HydrationRuntime`]: discovery, visibility-deferred hydration,
//!   per-island error isolation, `update` and `unmount`
//! - [`Dom`]: the DOM seam, implemented by [`WebDom`] (WASM) and
//!   [`MemoryDom`]
//! - [`ComponentRegistry`] and [`register_island_component!`]: name lookup
//!
//! ## Example
//!
//! ```
//! use reinhardt_hydration::{ComponentError, HydrationRuntime, Markup, MemoryDom, Props};
//!
//! fn counter(props: &Props) -> Result<Markup, ComponentError> {
//!     let count = props.get("count").and_then(|v| v.as_i64()).unwrap_or(0);
//!     Ok(Markup::new(format!("<button>{}</button>", count)))
//! }
//!
//! let dom = MemoryDom::new();
//! let island = dom.insert_island(dom.body(), "Counter", "rh-island-0", Some(r#"{"count":2}"#));
//!
//! let runtime = HydrationRuntime::new(dom.clone());
//! runtime.register("Counter", counter);
//! runtime.hydrate(None);
//!
//! assert_eq!(dom.inner_html(island), "<button>2</button>");
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod dom;
pub mod events;
pub mod islands;
pub mod logging;
pub mod markers;
pub mod payload;
pub mod registry;
pub mod runtime;

pub use config::HydrationConfig;
#[cfg(target_arch = "wasm32")]
pub use dom::WebDom;
pub use dom::{Dom, Markup, MemoryDom, MountError, NodeId, Rect};
pub use events::IslandEvent;
pub use islands::{IslandDetector, IslandNode};
pub use markers::{ERROR_ATTR, HYDRATED_ATTR, HYDRATION_ATTR_ID, HYDRATION_ATTR_PROPS, ISLAND_ATTR};
pub use payload::{PayloadError, parse_props};
pub use registry::{Component, ComponentError, ComponentRegistry, GlobalComponent, Props};
pub use runtime::{
	HydrationError, HydrationErrorRecord, HydrationReport, HydrationRuntime, IslandState,
	MountCause, MountedIsland,
};

// Re-exported for `register_island_component!`.
#[doc(hidden)]
pub use inventory;

#[doc(hidden)]
pub mod __private {
	pub use tracing;
	#[cfg(target_arch = "wasm32")]
	pub use web_sys;
}
