//! Island lifecycle events.
//!
//! The runtime dispatches these on the island element; they bubble, so a
//! single listener on the document observes every island.

use crate::registry::Props;
use serde_json::{Value, json};

/// Name of the event dispatched after an island mounts.
pub const HYDRATED_EVENT: &str = "hydrated";

/// Name of the event dispatched when an island fails.
pub const ERROR_EVENT: &str = "error";

/// A lifecycle event of one island.
#[derive(Debug, Clone, PartialEq)]
pub enum IslandEvent {
	/// The island mounted.
	Hydrated {
		/// Island id.
		id: String,
		/// Mounted component.
		component_name: String,
	},
	/// The island failed to hydrate.
	Error {
		/// Error message.
		error: String,
		/// Requested component.
		component_name: String,
		/// Props the component was given.
		props: Props,
	},
}

impl IslandEvent {
	/// The DOM event name.
	pub fn name(&self) -> &'static str {
		match self {
			IslandEvent::Hydrated { .. } => HYDRATED_EVENT,
			IslandEvent::Error { .. } => ERROR_EVENT,
		}
	}

	/// The event's `detail` object, with camelCase keys.
	pub fn detail(&self) -> Value {
		match self {
			IslandEvent::Hydrated { id, component_name } => json!({
				"id": id,
				"componentName": component_name,
			}),
			IslandEvent::Error {
				error,
				component_name,
				props,
			} => json!({
				"error": error,
				"componentName": component_name,
				"props": props,
			}),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_hydrated_detail() {
		let event = IslandEvent::Hydrated {
			id: "rh-island-0".into(),
			component_name: "Counter".into(),
		};
		assert_eq!(event.name(), "hydrated");
		assert_eq!(
			event.detail(),
			json!({"id": "rh-island-0", "componentName": "Counter"})
		);
	}

	#[rstest]
	fn test_error_detail_carries_props() {
		let mut props = Props::new();
		props.insert("count".into(), json!(3));
		let event = IslandEvent::Error {
			error: "boom".into(),
			component_name: "Counter".into(),
			props,
		};
		assert_eq!(event.name(), "error");
		assert_eq!(event.detail()["props"], json!({"count": 3}));
		assert_eq!(event.detail()["componentName"], json!("Counter"));
	}
}
