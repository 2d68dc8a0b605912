//! Client island hydration
//!
//! This module provides access to reinhardt-hydration, the runtime that
//! mounts components into the islands of a server-rendered page.
//!
//! ## Example
//!
//! ```rust,ignore
//! use reinhardt_islands::hydration::{HydrationRuntime, WebDom};
//!
//! let runtime = HydrationRuntime::new(WebDom::from_window().unwrap());
//! runtime.register("Counter", counter);
//! runtime.start();
//! ```

// Re-export all reinhardt-hydration functionality
pub use reinhardt_hydration::*;
