//! Runtime configuration.

use serde::{Deserialize, Serialize};

/// Options for a [`HydrationRuntime`](crate::HydrationRuntime).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HydrationConfig {
	/// How far outside the viewport, in pixels, an island still counts as
	/// visible during discovery and observation.
	pub root_margin_px: f64,
	/// Whether the runtime logs its debug trace.
	pub debug: bool,
	/// Whether `hydrated` and `error` events are dispatched.
	pub dispatch_events: bool,
}

impl Default for HydrationConfig {
	fn default() -> Self {
		Self {
			root_margin_px: 100.0,
			debug: false,
			dispatch_events: true,
		}
	}
}

impl HydrationConfig {
	/// Creates new default options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Loads options from JSON; missing fields keep their defaults.
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}

	/// Sets the visibility margin.
	pub fn root_margin_px(mut self, margin: f64) -> Self {
		self.root_margin_px = margin;
		self
	}

	/// Enables or disables the debug trace.
	pub fn debug(mut self, enable: bool) -> Self {
		self.debug = enable;
		self
	}

	/// Enables or disables lifecycle events.
	pub fn dispatch_events(mut self, enable: bool) -> Self {
		self.dispatch_events = enable;
		self
	}
}
