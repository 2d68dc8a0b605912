//! Hydration Runtime
//!
//! The runtime finds island markers in server-rendered HTML and mounts a
//! live component into each one. Islands are independent: one island
//! failing never stops the others.
//!
//! ## Island lifecycle
//!
//! ```text
//! Unmounted ──► Hydrating ──► Hydrated
//!     ▲              │
//!     │              └──────► Error
//!     └── unmount(id)
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use reinhardt_hydration::{HydrationRuntime, Markup, Props, WebDom};
//!
//! let runtime = HydrationRuntime::new(WebDom::from_window().unwrap());
//! runtime.register("Counter", |props: &Props| {
//!     let count = props.get("count").and_then(|v| v.as_i64()).unwrap_or(0);
//!     Ok(Markup::new(format!("<button>{}</button>", count)))
//! });
//! runtime.start();
//! ```

use crate::config::HydrationConfig;
use crate::dom::{Dom, MountError, ObserverCallback};
use crate::events::IslandEvent;
use crate::islands::{IslandDetector, IslandNode};
use crate::markers::{ERROR_ATTR, HYDRATED_ATTR, HYDRATION_ATTR_PROPS};
use crate::payload::parse_props;
use crate::registry::{Component, ComponentError, ComponentRegistry, Props};
use crate::{debug_log, error_log, info_log, warn_log};
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::{Rc, Weak};
use thiserror::Error;

/// Errors that can occur during hydration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum HydrationError {
	/// No component is registered under the island's name.
	#[error("component '{0}' is not registered")]
	MissingComponent(String),
	/// The component could not be created or mounted.
	#[error("failed to mount '{component}': {cause}")]
	Mount {
		/// Component name.
		component: String,
		/// What went wrong.
		cause: MountCause,
	},
	/// No island with this id is mounted.
	#[error("island '{0}' is not mounted")]
	NotMounted(String),
}

/// Why mounting a component failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum MountCause {
	/// The component reported an error.
	#[error(transparent)]
	Component(#[from] ComponentError),
	/// The DOM refused the tree.
	#[error(transparent)]
	Dom(#[from] MountError),
	/// The component panicked.
	#[error("panicked: {0}")]
	Panic(String),
}

/// Hydration state of one island.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IslandState {
	/// Not mounted (yet, or again after `unmount`).
	#[default]
	Unmounted,
	/// Mounting is in progress.
	Hydrating,
	/// Mounted.
	Hydrated,
	/// The last attempt failed.
	Error,
}

/// A mounted island.
#[derive(Debug, Clone, PartialEq)]
pub struct MountedIsland<E> {
	/// The container element.
	pub element: E,
	/// Mounted component.
	pub component_name: String,
	/// Props the component was mounted with.
	pub props: Props,
}

/// A failed hydration attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct HydrationErrorRecord {
	/// Island id.
	pub id: String,
	/// Requested component.
	pub component_name: String,
	/// Props the component was given.
	pub props: Props,
	/// What went wrong.
	pub error: HydrationError,
}

/// Outcome of one hydration pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HydrationReport {
	/// Ids mounted during the pass.
	pub hydrated: Vec<String>,
	/// Ids that failed.
	pub failed: Vec<String>,
	/// Ids left to the intersection observer.
	pub deferred: Vec<String>,
	/// Islands skipped because they were already hydrated.
	pub skipped: usize,
}

struct Inner<D: Dom> {
	dom: D,
	config: RefCell<HydrationConfig>,
	registry: RefCell<ComponentRegistry<D::Node>>,
	mounted: RefCell<HashMap<String, MountedIsland<D::Element>>>,
	errors: RefCell<Vec<HydrationErrorRecord>>,
	states: RefCell<HashMap<String, IslandState>>,
}

/// The client hydration runtime.
///
/// A cheap handle: clones share the same registries. Create one per
/// document. Callbacks handed to the DOM hold weak references, so dropping
/// every handle releases the runtime.
pub struct HydrationRuntime<D: Dom + 'static> {
	inner: Rc<Inner<D>>,
}

impl<D: Dom + 'static> Clone for HydrationRuntime<D> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<D: Dom + 'static> HydrationRuntime<D> {
	/// Creates a runtime with default options.
	pub fn new(dom: D) -> Self {
		Self::with_config(dom, HydrationConfig::default())
	}

	/// Creates a runtime with `config`.
	pub fn with_config(dom: D, config: HydrationConfig) -> Self {
		Self {
			inner: Rc::new(Inner {
				dom,
				config: RefCell::new(config),
				registry: RefCell::new(ComponentRegistry::new()),
				mounted: RefCell::new(HashMap::new()),
				errors: RefCell::new(Vec::new()),
				states: RefCell::new(HashMap::new()),
			}),
		}
	}

	/// The DOM this runtime hydrates.
	pub fn dom(&self) -> &D {
		&self.inner.dom
	}

	/// Current options.
	pub fn config(&self) -> HydrationConfig {
		self.inner.config.borrow().clone()
	}

	/// Registers a component for this runtime, replacing any previous one.
	pub fn register(&self, name: impl Into<String>, component: impl Component<D::Node> + 'static) {
		let name = name.into();
		self.debug(|| format!("registered component {}", name));
		self.inner.registry.borrow_mut().register(name, component);
	}

	/// Enables or disables the debug trace.
	pub fn set_debug(&self, enable: bool) {
		self.inner.config.borrow_mut().debug = enable;
	}

	/// Returns `true` when the debug trace is on.
	pub fn is_debug(&self) -> bool {
		self.inner.config.borrow().debug
	}

	/// Schedules automatic discovery for when the document is ready and idle.
	///
	/// Visible islands (viewport grown by `root_margin_px`) hydrate during
	/// that pass; the rest hydrate when they first intersect, or right away
	/// when the DOM cannot observe intersections.
	pub fn start(&self) {
		let weak = Rc::downgrade(&self.inner);
		self.inner.dom.when_idle(Box::new(move || {
			if let Some(runtime) = Self::upgrade(&weak) {
				let report = runtime.discover();
				info_log!(
					"hydration pass: {} hydrated, {} failed, {} deferred",
					report.hydrated.len(),
					report.failed.len(),
					report.deferred.len()
				);
			}
		}));
	}

	/// Hydrates every unhydrated island under `root` (the whole document
	/// when `None`) now, regardless of visibility.
	///
	/// Islands that failed before are retried.
	pub fn hydrate(&self, root: Option<&D::Element>) -> HydrationReport {
		let detector = IslandDetector::new(&self.inner.dom);
		let mut report = HydrationReport {
			skipped: detector.count_hydrated(root),
			..HydrationReport::default()
		};
		for island in detector.find_islands(root) {
			self.hydrate_into_report(&island, &mut report);
		}
		report
	}

	/// The mounted island with `id`.
	pub fn get_mounted(&self, id: &str) -> Option<MountedIsland<D::Element>> {
		self.inner.mounted.borrow().get(id).cloned()
	}

	/// Ids of every mounted island, sorted.
	pub fn mounted_ids(&self) -> Vec<String> {
		let mut ids: Vec<String> = self.inner.mounted.borrow().keys().cloned().collect();
		ids.sort_unstable();
		ids
	}

	/// Failures of islands that have not hydrated since.
	pub fn get_errors(&self) -> Vec<HydrationErrorRecord> {
		self.inner.errors.borrow().clone()
	}

	/// State of the island with `id`.
	pub fn state(&self, id: &str) -> IslandState {
		self.inner
			.states
			.borrow()
			.get(id)
			.copied()
			.unwrap_or_default()
	}

	/// Unmounts an island.
	///
	/// The container is emptied and loses its hydrated flag; the current
	/// props are written to `data-rh-props` so a later `hydrate` mounts the
	/// island again with the same props.
	pub fn unmount(&self, id: &str) -> Result<(), HydrationError> {
		let island = self
			.inner
			.mounted
			.borrow_mut()
			.remove(id)
			.ok_or_else(|| HydrationError::NotMounted(id.to_string()))?;
		let dom = &self.inner.dom;
		dom.clear(&island.element);
		dom.remove_attribute(&island.element, HYDRATED_ATTR);
		dom.set_attribute(
			&island.element,
			HYDRATION_ATTR_PROPS,
			&serde_json::Value::Object(island.props).to_string(),
		);
		self.set_state(id, IslandState::Unmounted);
		self.debug(|| format!("unmounted island {}", id));
		Ok(())
	}

	/// Shallow-merges `partial` over the island's props and remounts the
	/// component in place.
	///
	/// On failure the island keeps its previous content and props.
	pub fn update(&self, id: &str, partial: Props) -> Result<(), HydrationError> {
		let island = self
			.get_mounted(id)
			.ok_or_else(|| HydrationError::NotMounted(id.to_string()))?;
		let mut props = island.props;
		for (key, value) in partial {
			props.insert(key, value);
		}
		if let Err(error) = self.mount_component(&island.component_name, &props, &island.element) {
			error_log!("failed to update island {}: {}", id, error);
			return Err(error);
		}
		if let Some(mounted) = self.inner.mounted.borrow_mut().get_mut(id) {
			mounted.props = props;
		}
		self.debug(|| format!("updated island {}", id));
		Ok(())
	}

	fn upgrade(weak: &Weak<Inner<D>>) -> Option<Self> {
		weak.upgrade().map(|inner| Self { inner })
	}

	fn debug(&self, message: impl FnOnce() -> String) {
		if self.is_debug() {
			debug_log!("[hydration] {}", message());
		}
	}

	fn set_state(&self, id: &str, state: IslandState) {
		self.inner.states.borrow_mut().insert(id.to_string(), state);
	}

	fn discover(&self) -> HydrationReport {
		let dom = &self.inner.dom;
		let detector = IslandDetector::new(dom);
		let mut report = HydrationReport {
			skipped: detector.count_hydrated(None),
			..HydrationReport::default()
		};
		let margin = self.inner.config.borrow().root_margin_px;
		let visible_area = dom.viewport().expand(margin);

		let (visible, deferred): (Vec<_>, Vec<_>) = detector
			.find_islands(None)
			.into_iter()
			.partition(|island| visible_area.intersects(&dom.bounding_rect(&island.element)));

		for island in &visible {
			self.hydrate_into_report(island, &mut report);
		}
		for island in deferred {
			if dom.observe(&island.element, margin, self.observer_callback(&island.element)) {
				self.debug(|| format!("deferred island {}", island.hydration_id));
				report.deferred.push(island.hydration_id);
			} else {
				self.hydrate_into_report(&island, &mut report);
			}
		}
		report
	}

	fn observer_callback(&self, element: &D::Element) -> ObserverCallback {
		let weak = Rc::downgrade(&self.inner);
		let element = element.clone();
		Rc::new(move || {
			let Some(runtime) = Self::upgrade(&weak) else {
				return;
			};
			if let Some(island) = IslandNode::from_element(runtime.dom(), &element) {
				let _ = runtime.hydrate_island(&island);
			}
			runtime.dom().unobserve(&element);
		})
	}

	fn hydrate_into_report(&self, island: &IslandNode<D::Element>, report: &mut HydrationReport) {
		match self.hydrate_island(island) {
			Ok(true) => report.hydrated.push(island.hydration_id.clone()),
			Ok(false) => report.skipped += 1,
			Err(_) => report.failed.push(island.hydration_id.clone()),
		}
	}

	/// Returns `Ok(false)` when the island is already hydrated or in progress.
	fn hydrate_island(&self, island: &IslandNode<D::Element>) -> Result<bool, HydrationError> {
		let dom = &self.inner.dom;
		let id = island.hydration_id.as_str();
		if dom.get_attribute(&island.element, HYDRATED_ATTR).is_some()
			|| self.state(id) == IslandState::Hydrating
		{
			return Ok(false);
		}
		self.set_state(id, IslandState::Hydrating);
		self.debug(|| format!("hydrating island {} ({})", id, island.component_name));

		let props = self.read_props(island);
		match self.mount_component(&island.component_name, &props, &island.element) {
			Ok(()) => {
				dom.remove_attribute(&island.element, ERROR_ATTR);
				dom.set_attribute(&island.element, HYDRATED_ATTR, "true");
				self.inner.mounted.borrow_mut().insert(
					id.to_string(),
					MountedIsland {
						element: island.element.clone(),
						component_name: island.component_name.clone(),
						props,
					},
				);
				self.inner.errors.borrow_mut().retain(|record| record.id != id);
				self.set_state(id, IslandState::Hydrated);
				self.emit(
					&island.element,
					IslandEvent::Hydrated {
						id: id.to_string(),
						component_name: island.component_name.clone(),
					},
				);
				self.debug(|| format!("hydrated island {}", id));
				Ok(true)
			}
			Err(error) => {
				error_log!(
					"island {} ({}) failed to hydrate: {}",
					id,
					island.component_name,
					error
				);
				dom.set_attribute(&island.element, ERROR_ATTR, &error.to_string());
				self.inner.errors.borrow_mut().push(HydrationErrorRecord {
					id: id.to_string(),
					component_name: island.component_name.clone(),
					props: props.clone(),
					error: error.clone(),
				});
				self.set_state(id, IslandState::Error);
				self.emit(
					&island.element,
					IslandEvent::Error {
						error: error.to_string(),
						component_name: island.component_name.clone(),
						props,
					},
				);
				Err(error)
			}
		}
	}

	/// Reads the payload child first, then the `data-rh-props` attribute.
	fn read_props(&self, island: &IslandNode<D::Element>) -> Props {
		let dom = &self.inner.dom;
		let text = dom
			.payload_text(&island.element)
			.or_else(|| dom.get_attribute(&island.element, HYDRATION_ATTR_PROPS));
		let Some(text) = text else {
			return Props::new();
		};
		parse_props(&text).unwrap_or_else(|error| {
			warn_log!(
				"island {} ({}): {}; mounting with empty props",
				island.hydration_id,
				island.component_name,
				error
			);
			Props::new()
		})
	}

	/// Resolves, creates and mounts a component. No registry borrow is held
	/// while component code runs.
	fn mount_component(
		&self,
		name: &str,
		props: &Props,
		element: &D::Element,
	) -> Result<(), HydrationError> {
		let component = self
			.inner
			.registry
			.borrow()
			.resolve(name)
			.ok_or_else(|| HydrationError::MissingComponent(name.to_string()))?;
		let mount_error = |cause: MountCause| HydrationError::Mount {
			component: name.to_string(),
			cause,
		};

		let node = match catch_unwind(AssertUnwindSafe(|| component.create(props))) {
			Ok(Ok(node)) => node,
			Ok(Err(error)) => return Err(mount_error(error.into())),
			Err(panic) => return Err(mount_error(MountCause::Panic(panic_message(panic)))),
		};
		match catch_unwind(AssertUnwindSafe(|| self.inner.dom.mount(node, element))) {
			Ok(Ok(())) => Ok(()),
			Ok(Err(error)) => Err(mount_error(error.into())),
			Err(panic) => Err(mount_error(MountCause::Panic(panic_message(panic)))),
		}
	}

	fn emit(&self, element: &D::Element, event: IslandEvent) {
		if self.inner.config.borrow().dispatch_events {
			self.inner.dom.dispatch(element, &event);
		}
	}
}

impl<D: Dom + 'static> fmt::Debug for HydrationRuntime<D> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HydrationRuntime")
			.field("config", &*self.inner.config.borrow())
			.field("registry", &*self.inner.registry.borrow())
			.field("mounted", &self.mounted_ids())
			.field("errors", &self.inner.errors.borrow().len())
			.finish()
	}
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
	if let Some(message) = panic.downcast_ref::<&str>() {
		message.to_string()
	} else if let Some(message) = panic.downcast_ref::<String>() {
		message.clone()
	} else {
		"unknown panic".to_string()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dom::{Markup, MemoryDom, Rect};
	use rstest::rstest;
	use serde_json::{Value, json};

	fn counter(props: &Props) -> Result<Markup, ComponentError> {
		let count = props.get("count").and_then(Value::as_i64).unwrap_or(0);
		Ok(Markup::new(format!("<button>{}</button>", count)))
	}

	fn runtime() -> HydrationRuntime<MemoryDom> {
		let runtime = HydrationRuntime::new(MemoryDom::new());
		runtime.register("Counter", counter);
		runtime
	}

	#[rstest]
	fn test_hydrate_mounts_with_script_props() {
		let runtime = runtime();
		let dom = runtime.dom().clone();
		let island = dom.insert_island(dom.body(), "Counter", "c1", Some(r#"{"count": 4}"#));

		let report = runtime.hydrate(None);
		assert_eq!(report.hydrated, vec!["c1"]);
		assert_eq!(dom.inner_html(island), "<button>4</button>");
		assert_eq!(dom.get_attribute(&island, HYDRATED_ATTR).as_deref(), Some("true"));
		assert_eq!(runtime.state("c1"), IslandState::Hydrated);
		assert_eq!(
			runtime.get_mounted("c1").map(|mounted| Value::Object(mounted.props)),
			Some(json!({"count": 4}))
		);
	}

	#[rstest]
	fn test_attribute_payload_is_fallback() {
		let runtime = runtime();
		let dom = runtime.dom().clone();
		let island = dom.insert_island(dom.body(), "Counter", "c1", None);
		dom.set_attribute(&island, HYDRATION_ATTR_PROPS, r#"{"count": 9}"#);

		runtime.hydrate(None);
		assert_eq!(dom.inner_html(island), "<button>9</button>");
	}

	#[rstest]
	fn test_unrendered_payload_mounts_with_empty_props() {
		let runtime = runtime();
		let dom = runtime.dom().clone();
		let island = dom.insert_island(
			dom.body(),
			"Counter",
			"c1",
			Some("{{ rh_props_0 | replace: '</', '<\\/' }}"),
		);

		let report = runtime.hydrate(None);
		assert_eq!(report.hydrated, vec!["c1"]);
		assert_eq!(dom.inner_html(island), "<button>0</button>");
	}

	#[rstest]
	fn test_component_error_is_recorded() {
		let runtime = runtime();
		runtime.register("Strict", |_: &Props| -> Result<Markup, ComponentError> {
			Err(ComponentError::MissingProp("sku".into()))
		});
		let dom = runtime.dom().clone();
		let island = dom.insert_island(dom.body(), "Strict", "s1", None);

		let report = runtime.hydrate(None);
		assert_eq!(report.failed, vec!["s1"]);
		assert_eq!(runtime.state("s1"), IslandState::Error);
		let errors = runtime.get_errors();
		assert_eq!(errors.len(), 1);
		assert_eq!(
			errors[0].error,
			HydrationError::Mount {
				component: "Strict".into(),
				cause: MountCause::Component(ComponentError::MissingProp("sku".into())),
			}
		);
		assert_eq!(
			dom.get_attribute(&island, ERROR_ATTR).as_deref(),
			Some("failed to mount 'Strict': missing prop 'sku'")
		);
	}

	#[rstest]
	fn test_panicking_component_is_contained() {
		let runtime = runtime();
		runtime.register("Panics", |_: &Props| -> Result<Markup, ComponentError> {
			panic!("render exploded")
		});
		let dom = runtime.dom().clone();
		dom.insert_island(dom.body(), "Panics", "p1", None);
		dom.insert_island(dom.body(), "Counter", "c1", None);

		let report = runtime.hydrate(None);
		assert_eq!(report.failed, vec!["p1"]);
		assert_eq!(report.hydrated, vec!["c1"]);
		assert!(matches!(
			&runtime.get_errors()[0].error,
			HydrationError::Mount { cause: MountCause::Panic(message), .. } if message == "render exploded"
		));
	}

	#[rstest]
	fn test_retry_after_registration_clears_error() {
		let runtime = HydrationRuntime::new(MemoryDom::new());
		let dom = runtime.dom().clone();
		let island = dom.insert_island(dom.body(), "Late", "l1", None);

		runtime.hydrate(None);
		assert_eq!(runtime.get_errors().len(), 1);

		runtime.register("Late", counter);
		let report = runtime.hydrate(None);
		assert_eq!(report.hydrated, vec!["l1"]);
		assert!(runtime.get_errors().is_empty());
		assert_eq!(dom.get_attribute(&island, ERROR_ATTR), None);
	}

	#[rstest]
	fn test_discovery_defers_offscreen_islands() {
		let runtime = runtime();
		let dom = runtime.dom().clone();
		let near = dom.insert_island(dom.body(), "Counter", "near", None);
		let far = dom.insert_island(dom.body(), "Counter", "far", None);
		dom.set_rect(near, Rect::new(0.0, 850.0, 100.0, 20.0));
		dom.set_rect(far, Rect::new(0.0, 5000.0, 100.0, 20.0));

		let report = runtime.discover();
		assert_eq!(report.hydrated, vec!["near"]);
		assert_eq!(report.deferred, vec!["far"]);
		assert_eq!(dom.observed(), vec![far]);
	}

	#[rstest]
	fn test_visible_islands_hydrate_before_fallback() {
		let runtime = HydrationRuntime::new(MemoryDom::new().without_intersection_observer());
		runtime.register("Counter", counter);
		let dom = runtime.dom().clone();
		let far = dom.insert_island(dom.body(), "Counter", "far", None);
		dom.insert_island(dom.body(), "Counter", "near", None);
		dom.set_rect(far, Rect::new(0.0, 5000.0, 100.0, 20.0));

		let report = runtime.discover();
		assert_eq!(report.hydrated, vec!["near", "far"]);
		assert!(report.deferred.is_empty());
	}

	#[rstest]
	fn test_update_requires_mounted_island() {
		let runtime = runtime();
		assert_eq!(
			runtime.update("ghost", Props::new()),
			Err(HydrationError::NotMounted("ghost".into()))
		);
		assert_eq!(
			runtime.unmount("ghost"),
			Err(HydrationError::NotMounted("ghost".into()))
		);
	}

	#[rstest]
	fn test_events_can_be_disabled() {
		let runtime = HydrationRuntime::with_config(
			MemoryDom::new(),
			HydrationConfig::new().dispatch_events(false),
		);
		runtime.register("Counter", counter);
		let dom = runtime.dom().clone();
		dom.insert_island(dom.body(), "Counter", "c1", None);

		runtime.hydrate(None);
		assert!(dom.events().is_empty());
	}

	#[rstest]
	fn test_set_debug() {
		let runtime = runtime();
		assert!(!runtime.is_debug());
		runtime.set_debug(true);
		assert!(runtime.is_debug());
		assert!(runtime.config().debug);
	}

	#[rstest]
	fn test_dropped_runtime_ignores_idle_pass() {
		let dom = MemoryDom::new();
		dom.insert_island(dom.body(), "Counter", "c1", None);
		{
			let runtime = HydrationRuntime::new(dom.clone());
			runtime.register("Counter", counter);
			runtime.start();
		}
		dom.run_idle();
		assert!(dom.events().is_empty());
	}
}
