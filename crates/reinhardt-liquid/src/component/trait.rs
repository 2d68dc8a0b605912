//! Component trait definition.

use super::props::Props;
use crate::view::View;
use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

/// Trait for reusable components.
///
/// # Example
///
/// ```
/// use reinhardt_liquid::component::{Component, Props};
/// use reinhardt_liquid::view::{IntoView, View};
///
/// struct Price;
///
/// impl Component for Price {
///     fn render(&self, props: &Props) -> View {
///         View::element("span")
///             .attr("class", "price")
///             .child(props.get("cents").money())
///             .into_view()
///     }
///
///     fn name() -> &'static str {
///         "Price"
///     }
/// }
/// ```
pub trait Component: 'static {
	/// Renders the component with the given props.
	fn render(&self, props: &Props) -> View;

	/// Returns the component's name, used as the island name.
	fn name() -> &'static str
	where
		Self: Sized;
}

/// A shared, type-erased component.
#[derive(Clone)]
pub struct DynComponent {
	inner: Rc<dyn Fn(&Props) -> View>,
	name: Cow<'static, str>,
}

impl DynComponent {
	/// Erases a [`Component`] implementation.
	pub fn new<T: Component>(component: T) -> Self {
		Self {
			inner: Rc::new(move |props: &Props| component.render(props)),
			name: Cow::Borrowed(T::name()),
		}
	}

	/// Builds a component from a render function.
	pub fn from_fn(
		name: impl Into<Cow<'static, str>>,
		render: impl Fn(&Props) -> View + 'static,
	) -> Self {
		Self {
			inner: Rc::new(render),
			name: name.into(),
		}
	}

	/// Returns the component's name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Renders the component.
	pub fn render(&self, props: &Props) -> View {
		(self.inner)(props)
	}
}

impl<T: Component> From<T> for DynComponent {
	fn from(component: T) -> Self {
		Self::new(component)
	}
}

impl fmt::Debug for DynComponent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DynComponent")
			.field("name", &self.name)
			.finish_non_exhaustive()
	}
}
