//! Island component registry.
//!
//! Components are looked up by name, first in the runtime's own
//! [`ComponentRegistry`], then in the process-wide namespace filled at link
//! time by [`register_island_component!`](crate::register_island_component).
//!
//! ## Example
//!
//! ```ignore
//! use reinhardt_hydration::{ComponentError, Markup, Props, register_island_component};
//!
//! fn badge(props: &Props) -> Result<Markup, ComponentError> {
//!     let label = props.get("label").and_then(|v| v.as_str()).unwrap_or("New");
//!     Ok(Markup::new(format!("<span class=\"badge\">{}</span>", label)))
//! }
//!
//! register_island_component!("Badge", badge);
//! ```

use crate::dom::Markup;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// Props handed to an island component.
pub type Props = Map<String, Value>;

/// Errors a component reports while building its tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ComponentError {
	/// A required prop is absent.
	#[error("missing prop '{0}'")]
	MissingProp(String),
	/// A prop has the wrong shape.
	#[error("invalid prop '{name}': {reason}")]
	InvalidProp {
		/// Prop name.
		name: String,
		/// What is wrong with it.
		reason: String,
	},
	/// Any other failure.
	#[error("{0}")]
	Failed(String),
}

/// A component that builds a tree of `N` from props.
pub trait Component<N> {
	/// Builds the component's tree.
	fn create(&self, props: &Props) -> Result<N, ComponentError>;
}

impl<N, F> Component<N> for F
where
	F: Fn(&Props) -> Result<N, ComponentError>,
{
	fn create(&self, props: &Props) -> Result<N, ComponentError> {
		self(props)
	}
}

/// Constructor stored in the global namespace.
pub type CreateFn = fn(&Props) -> Result<Markup, ComponentError>;

/// A component registered for the whole process.
///
/// Collected with `inventory`; submit entries through
/// [`register_island_component!`](crate::register_island_component).
pub struct GlobalComponent {
	/// Component name, as written in `data-rh-island`.
	pub name: &'static str,
	/// Builds the component's markup.
	pub create: CreateFn,
}

inventory::collect!(GlobalComponent);

impl fmt::Debug for GlobalComponent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("GlobalComponent")
			.field("name", &self.name)
			.finish_non_exhaustive()
	}
}

/// Looks a component up in the global namespace.
pub fn global_component(name: &str) -> Option<&'static GlobalComponent> {
	inventory::iter::<GlobalComponent>
		.into_iter()
		.find(|component| component.name == name)
}

/// Registers a component in the global namespace.
///
/// # Example
///
/// ```rust,ignore
/// use reinhardt_hydration::register_island_component;
///
/// register_island_component!("Badge", badge);
/// ```
#[macro_export]
macro_rules! register_island_component {
	($name:expr, $create:expr) => {
		$crate::inventory::submit! {
			$crate::registry::GlobalComponent {
				name: $name,
				create: $create,
			}
		}
	};
}

/// Per-runtime name → component map.
pub struct ComponentRegistry<N> {
	components: HashMap<String, Rc<dyn Component<N>>>,
}

impl<N: From<Markup> + 'static> ComponentRegistry<N> {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self {
			components: HashMap::new(),
		}
	}

	/// Registers `component` under `name`, replacing any previous entry.
	pub fn register(&mut self, name: impl Into<String>, component: impl Component<N> + 'static) {
		self.components.insert(name.into(), Rc::new(component));
	}

	/// Returns `true` when `name` is registered locally.
	pub fn contains(&self, name: &str) -> bool {
		self.components.contains_key(name)
	}

	/// Locally registered names, sorted.
	pub fn names(&self) -> Vec<&str> {
		let mut names: Vec<&str> = self.components.keys().map(String::as_str).collect();
		names.sort_unstable();
		names
	}

	/// Resolves `name` locally, then globally.
	pub fn resolve(&self, name: &str) -> Option<Rc<dyn Component<N>>> {
		if let Some(component) = self.components.get(name) {
			return Some(Rc::clone(component));
		}
		let global = global_component(name)?;
		let create = global.create;
		Some(Rc::new(move |props: &Props| create(props).map(N::from)))
	}
}

impl<N: From<Markup> + 'static> Default for ComponentRegistry<N> {
	fn default() -> Self {
		Self::new()
	}
}

impl<N> fmt::Debug for ComponentRegistry<N> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut names: Vec<&String> = self.components.keys().collect();
		names.sort_unstable();
		f.debug_struct("ComponentRegistry")
			.field("components", &names)
			.finish()
	}
}
