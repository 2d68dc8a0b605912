//! Browser DOM backed by `web_sys`.

use super::{Dom, IdleTask, Markup, MountError, ObserverCallback, Rect};
use crate::events::IslandEvent;
use crate::markers::{HYDRATION_ATTR_PROPS, ISLAND_ATTR};
use crate::warn_log;
use std::cell::RefCell;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
	CustomEvent, CustomEventInit, Document, Element, IntersectionObserver,
	IntersectionObserverEntry, IntersectionObserverInit, Window,
};

type IntersectionClosure = Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>;

struct Observation {
	element: Element,
	observer: IntersectionObserver,
	_closure: IntersectionClosure,
}

/// The browser document.
pub struct WebDom {
	window: Window,
	document: Document,
	observations: RefCell<Vec<Observation>>,
}

impl WebDom {
	/// Binds to the current window's document.
	pub fn from_window() -> Option<Self> {
		let window = web_sys::window()?;
		let document = window.document()?;
		Some(Self {
			window,
			document,
			observations: RefCell::new(Vec::new()),
		})
	}

	fn schedule_idle(window: &Window, task: IdleTask) {
		let callback = Closure::once_into_js(move || task());
		let function = callback.unchecked_ref::<js_sys::Function>();
		let has_idle = js_sys::Reflect::has(window, &JsValue::from_str("requestIdleCallback"))
			.unwrap_or(false);
		let scheduled = if has_idle {
			window.request_idle_callback(function).is_ok()
		} else {
			window
				.set_timeout_with_callback_and_timeout_and_arguments_0(function, 0)
				.is_ok()
		};
		if !scheduled {
			warn_log!("failed to schedule hydration callback");
		}
	}

	/// Drops a disconnected observation on the next macrotask.
	///
	/// `unobserve` usually runs inside the observer's own callback, whose
	/// closure must outlive the call.
	fn release_later(window: &Window, observation: Observation) {
		let release = Closure::once_into_js(move || drop(observation));
		if window
			.set_timeout_with_callback_and_timeout_and_arguments_0(release.unchecked_ref(), 0)
			.is_err()
		{
			warn_log!("failed to schedule observer release");
		}
	}
}

impl Dom for WebDom {
	type Element = Element;
	type Node = Markup;

	fn find_islands(&self, root: Option<&Element>) -> Vec<Element> {
		let selector = format!("[{}]", ISLAND_ATTR);
		let mut found = Vec::new();
		let list = match root {
			Some(root) => {
				if root.has_attribute(ISLAND_ATTR) {
					found.push(root.clone());
				}
				root.query_selector_all(&selector)
			}
			None => self.document.query_selector_all(&selector),
		};
		if let Ok(list) = list {
			for i in 0..list.length() {
				if let Some(element) = list.item(i).and_then(|node| node.dyn_into::<Element>().ok()) {
					found.push(element);
				}
			}
		}
		found
	}

	fn contains(&self, ancestor: &Element, descendant: &Element) -> bool {
		ancestor.contains(Some(descendant))
	}

	fn get_attribute(&self, element: &Element, name: &str) -> Option<String> {
		element.get_attribute(name)
	}

	fn set_attribute(&self, element: &Element, name: &str, value: &str) {
		if element.set_attribute(name, value).is_err() {
			warn_log!("failed to set {} on island element", name);
		}
	}

	fn remove_attribute(&self, element: &Element, name: &str) {
		let _ = element.remove_attribute(name);
	}

	fn payload_text(&self, element: &Element) -> Option<String> {
		let selector = format!(":scope > script[{}]", HYDRATION_ATTR_PROPS);
		element
			.query_selector(&selector)
			.ok()
			.flatten()
			.and_then(|script| script.text_content())
	}

	fn mount(&self, node: Markup, container: &Element) -> Result<(), MountError> {
		if !container.is_connected() {
			return Err(MountError::Detached);
		}
		container.set_inner_html(node.as_str());
		Ok(())
	}

	fn clear(&self, container: &Element) {
		container.set_inner_html("");
	}

	fn dispatch(&self, element: &Element, event: &IslandEvent) {
		let detail = js_sys::JSON::parse(&event.detail().to_string()).unwrap_or(JsValue::NULL);
		let init = CustomEventInit::new();
		init.set_bubbles(true);
		init.set_detail(&detail);
		match CustomEvent::new_with_event_init_dict(event.name(), &init) {
			Ok(custom) => {
				let _ = element.dispatch_event(&custom);
			}
			Err(_) => warn_log!("failed to create {} event", event.name()),
		}
	}

	fn bounding_rect(&self, element: &Element) -> Rect {
		let rect = element.get_bounding_client_rect();
		Rect::new(rect.x(), rect.y(), rect.width(), rect.height())
	}

	fn viewport(&self) -> Rect {
		let width = self
			.window
			.inner_width()
			.ok()
			.and_then(|value| value.as_f64())
			.unwrap_or(0.0);
		let height = self
			.window
			.inner_height()
			.ok()
			.and_then(|value| value.as_f64())
			.unwrap_or(0.0);
		Rect::new(0.0, 0.0, width, height)
	}

	fn observe(&self, element: &Element, root_margin_px: f64, callback: ObserverCallback) -> bool {
		let closure: IntersectionClosure =
			Closure::new(move |entries: js_sys::Array, _observer: IntersectionObserver| {
				let intersecting = entries.iter().any(|entry| {
					entry
						.unchecked_into::<IntersectionObserverEntry>()
						.is_intersecting()
				});
				if intersecting {
					callback();
				}
			});
		let init = IntersectionObserverInit::new();
		init.set_root_margin(&format!("{}px", root_margin_px));
		let observer = match IntersectionObserver::new_with_options(
			closure.as_ref().unchecked_ref(),
			&init,
		) {
			Ok(observer) => observer,
			Err(_) => return false,
		};
		observer.observe(element);
		self.observations.borrow_mut().push(Observation {
			element: element.clone(),
			observer,
			_closure: closure,
		});
		true
	}

	fn unobserve(&self, element: &Element) {
		let mut observations = self.observations.borrow_mut();
		let mut i = 0;
		while i < observations.len() {
			if observations[i].element == *element {
				let observation = observations.remove(i);
				observation.observer.disconnect();
				Self::release_later(&self.window, observation);
			} else {
				i += 1;
			}
		}
	}

	fn when_idle(&self, task: IdleTask) {
		if self.document.ready_state() != "loading" {
			Self::schedule_idle(&self.window, task);
			return;
		}
		let window = self.window.clone();
		let on_ready = Closure::once_into_js(move || Self::schedule_idle(&window, task));
		if self
			.document
			.add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())
			.is_err()
		{
			warn_log!("failed to wait for DOMContentLoaded");
		}
	}
}
