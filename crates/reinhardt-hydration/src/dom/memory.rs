//! In-memory DOM.
//!
//! A small element tree with layout boxes, an intersection observer and an
//! idle queue driven by hand. Native tests build pages with it and step the
//! runtime through discovery, scrolling and idle callbacks.

use super::{Dom, IdleTask, Markup, MountError, ObserverCallback, Rect};
use crate::events::IslandEvent;
use crate::markers::{HYDRATION_ATTR_ID, HYDRATION_ATTR_PROPS, ISLAND_ATTR};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Write;
use std::rc::Rc;

/// Handle to an element of a [`MemoryDom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
struct NodeData {
	tag: String,
	attrs: Vec<(String, String)>,
	parent: Option<NodeId>,
	children: Vec<NodeId>,
	text: String,
	markup: Option<Markup>,
	rect: Rect,
}

struct Observation {
	element: NodeId,
	margin: f64,
	callback: ObserverCallback,
}

struct Tree {
	nodes: Vec<NodeData>,
	viewport: Rect,
	observer_available: bool,
	observations: Vec<Observation>,
	idle: Vec<IdleTask>,
	events: Vec<(NodeId, IslandEvent)>,
	mounts: HashMap<NodeId, usize>,
}

impl Tree {
	fn node(&self, id: NodeId) -> &NodeData {
		&self.nodes[id.0]
	}

	fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
		&mut self.nodes[id.0]
	}

	fn is_ancestor(&self, ancestor: NodeId, mut node: NodeId) -> bool {
		loop {
			if node == ancestor {
				return true;
			}
			match self.node(node).parent {
				Some(parent) => node = parent,
				None => return false,
			}
		}
	}

	fn detach_children(&mut self, id: NodeId) {
		let children = std::mem::take(&mut self.node_mut(id).children);
		for child in children {
			self.node_mut(child).parent = None;
		}
	}

	fn collect(&self, id: NodeId, predicate: &dyn Fn(&NodeData) -> bool, out: &mut Vec<NodeId>) {
		if predicate(self.node(id)) {
			out.push(id);
		}
		for child in &self.node(id).children {
			self.collect(*child, predicate, out);
		}
	}

	fn write_html(&self, id: NodeId, out: &mut String) {
		let node = self.node(id);
		let _ = write!(out, "<{}", node.tag);
		for (name, value) in &node.attrs {
			if value.is_empty() {
				let _ = write!(out, " {}", name);
			} else {
				let _ = write!(out, " {}=\"{}\"", name, value.replace('"', "&quot;"));
			}
		}
		out.push('>');
		self.write_inner(id, out);
		let _ = write!(out, "</{}>", node.tag);
	}

	fn write_inner(&self, id: NodeId, out: &mut String) {
		let node = self.node(id);
		out.push_str(&node.text);
		if let Some(markup) = &node.markup {
			out.push_str(markup.as_str());
		}
		for child in &node.children {
			self.write_html(*child, out);
		}
	}
}

/// An in-memory [`Dom`].
///
/// Cloning yields another handle to the same tree. The document body
/// ([`body`](Self::body)) spans the default 1280×800 viewport; new elements
/// get a 100×20 box at the top-left corner, i.e. visible.
#[derive(Clone)]
pub struct MemoryDom {
	tree: Rc<RefCell<Tree>>,
}

impl Default for MemoryDom {
	fn default() -> Self {
		Self::new()
	}
}

impl MemoryDom {
	/// Creates a document with an empty body.
	pub fn new() -> Self {
		let viewport = Rect::new(0.0, 0.0, 1280.0, 800.0);
		let body = NodeData {
			tag: "body".to_string(),
			attrs: Vec::new(),
			parent: None,
			children: Vec::new(),
			text: String::new(),
			markup: None,
			rect: viewport,
		};
		Self {
			tree: Rc::new(RefCell::new(Tree {
				nodes: vec![body],
				viewport,
				observer_available: true,
				observations: Vec::new(),
				idle: Vec::new(),
				events: Vec::new(),
				mounts: HashMap::new(),
			})),
		}
	}

	/// Simulates a browser without `IntersectionObserver`.
	pub fn without_intersection_observer(self) -> Self {
		self.tree.borrow_mut().observer_available = false;
		self
	}

	/// Sets the viewport.
	pub fn with_viewport(self, viewport: Rect) -> Self {
		self.tree.borrow_mut().viewport = viewport;
		self
	}

	/// The document body.
	pub fn body(&self) -> NodeId {
		NodeId(0)
	}

	/// Appends an empty element.
	pub fn append_element(&self, parent: NodeId, tag: &str) -> NodeId {
		let mut tree = self.tree.borrow_mut();
		let id = NodeId(tree.nodes.len());
		tree.nodes.push(NodeData {
			tag: tag.to_string(),
			attrs: Vec::new(),
			parent: Some(parent),
			children: Vec::new(),
			text: String::new(),
			markup: None,
			rect: Rect::new(0.0, 0.0, 100.0, 20.0),
		});
		tree.node_mut(parent).children.push(id);
		id
	}

	/// Appends an island marker the way the template compiler writes it,
	/// with a `<script type="application/json" data-rh-props>` child holding
	/// `props` when given.
	pub fn insert_island(
		&self,
		parent: NodeId,
		component: &str,
		id: &str,
		props: Option<&str>,
	) -> NodeId {
		let island = self.append_element(parent, "div");
		self.set_attribute(&island, ISLAND_ATTR, component);
		self.set_attribute(&island, HYDRATION_ATTR_ID, id);
		if let Some(props) = props {
			let script = self.append_element(island, "script");
			self.set_attribute(&script, "type", "application/json");
			self.set_attribute(&script, HYDRATION_ATTR_PROPS, "");
			self.set_text(script, props);
		}
		island
	}

	/// Sets an element's text content.
	pub fn set_text(&self, element: NodeId, text: &str) {
		self.tree.borrow_mut().node_mut(element).text = text.to_string();
	}

	/// Moves an element's layout box.
	pub fn set_rect(&self, element: NodeId, rect: Rect) {
		self.tree.borrow_mut().node_mut(element).rect = rect;
	}

	/// Serializes the element's content.
	pub fn inner_html(&self, element: NodeId) -> String {
		let tree = self.tree.borrow();
		let mut out = String::new();
		tree.write_inner(element, &mut out);
		out
	}

	/// How many times a tree was mounted into `element`.
	pub fn mount_count(&self, element: NodeId) -> usize {
		self.tree
			.borrow()
			.mounts
			.get(&element)
			.copied()
			.unwrap_or(0)
	}

	/// Every dispatched event with its target, in order.
	pub fn events(&self) -> Vec<(NodeId, IslandEvent)> {
		self.tree.borrow().events.clone()
	}

	/// Events a listener on `element` would receive, counting bubbling.
	pub fn events_reaching(&self, element: NodeId) -> Vec<IslandEvent> {
		let tree = self.tree.borrow();
		tree.events
			.iter()
			.filter(|(target, _)| tree.is_ancestor(element, *target))
			.map(|(_, event)| event.clone())
			.collect()
	}

	/// Elements currently observed.
	pub fn observed(&self) -> Vec<NodeId> {
		self.tree
			.borrow()
			.observations
			.iter()
			.map(|observation| observation.element)
			.collect()
	}

	/// Number of queued idle tasks.
	pub fn pending_idle_tasks(&self) -> usize {
		self.tree.borrow().idle.len()
	}

	/// Runs queued idle tasks, including ones queued while running.
	pub fn run_idle(&self) {
		loop {
			let tasks = std::mem::take(&mut self.tree.borrow_mut().idle);
			if tasks.is_empty() {
				return;
			}
			for task in tasks {
				task();
			}
		}
	}

	/// Scrolls `element` to the top of the viewport and notifies observers
	/// of every observed element that now intersects.
	pub fn scroll_into_view(&self, element: NodeId) {
		let callbacks: Vec<ObserverCallback> = {
			let mut tree = self.tree.borrow_mut();
			let viewport = tree.viewport;
			let node = tree.node_mut(element);
			node.rect = Rect::new(viewport.x, viewport.y, node.rect.width, node.rect.height);
			tree.observations
				.iter()
				.filter(|observation| {
					viewport
						.expand(observation.margin)
						.intersects(&tree.node(observation.element).rect)
				})
				.map(|observation| Rc::clone(&observation.callback))
				.collect()
		};
		for callback in callbacks {
			callback();
		}
	}
}

impl Dom for MemoryDom {
	type Element = NodeId;
	type Node = Markup;

	fn find_islands(&self, root: Option<&NodeId>) -> Vec<NodeId> {
		let tree = self.tree.borrow();
		let mut found = Vec::new();
		let start = root.copied().unwrap_or(NodeId(0));
		tree.collect(
			start,
			&|node| node.attrs.iter().any(|(name, _)| name == ISLAND_ATTR),
			&mut found,
		);
		found
	}

	fn contains(&self, ancestor: &NodeId, descendant: &NodeId) -> bool {
		self.tree.borrow().is_ancestor(*ancestor, *descendant)
	}

	fn get_attribute(&self, element: &NodeId, name: &str) -> Option<String> {
		self.tree
			.borrow()
			.node(*element)
			.attrs
			.iter()
			.find(|(attr, _)| attr == name)
			.map(|(_, value)| value.clone())
	}

	fn set_attribute(&self, element: &NodeId, name: &str, value: &str) {
		let mut tree = self.tree.borrow_mut();
		let attrs = &mut tree.node_mut(*element).attrs;
		match attrs.iter_mut().find(|(attr, _)| attr == name) {
			Some((_, slot)) => *slot = value.to_string(),
			None => attrs.push((name.to_string(), value.to_string())),
		}
	}

	fn remove_attribute(&self, element: &NodeId, name: &str) {
		self.tree
			.borrow_mut()
			.node_mut(*element)
			.attrs
			.retain(|(attr, _)| attr != name);
	}

	fn payload_text(&self, element: &NodeId) -> Option<String> {
		let tree = self.tree.borrow();
		tree.node(*element)
			.children
			.iter()
			.map(|child| tree.node(*child))
			.find(|child| {
				child.tag == "script" && child.attrs.iter().any(|(name, _)| name == HYDRATION_ATTR_PROPS)
			})
			.map(|script| script.text.clone())
	}

	fn mount(&self, node: Markup, container: &NodeId) -> Result<(), MountError> {
		let mut tree = self.tree.borrow_mut();
		if !tree.is_ancestor(NodeId(0), *container) {
			return Err(MountError::Detached);
		}
		tree.detach_children(*container);
		let target = tree.node_mut(*container);
		target.text.clear();
		target.markup = Some(node);
		*tree.mounts.entry(*container).or_insert(0) += 1;
		Ok(())
	}

	fn clear(&self, container: &NodeId) {
		let mut tree = self.tree.borrow_mut();
		tree.detach_children(*container);
		let target = tree.node_mut(*container);
		target.text.clear();
		target.markup = None;
	}

	fn dispatch(&self, element: &NodeId, event: &IslandEvent) {
		self.tree.borrow_mut().events.push((*element, event.clone()));
	}

	fn bounding_rect(&self, element: &NodeId) -> Rect {
		self.tree.borrow().node(*element).rect
	}

	fn viewport(&self) -> Rect {
		self.tree.borrow().viewport
	}

	fn observe(&self, element: &NodeId, root_margin_px: f64, callback: ObserverCallback) -> bool {
		let mut tree = self.tree.borrow_mut();
		if !tree.observer_available {
			return false;
		}
		tree.observations.push(Observation {
			element: *element,
			margin: root_margin_px,
			callback,
		});
		true
	}

	fn unobserve(&self, element: &NodeId) {
		self.tree
			.borrow_mut()
			.observations
			.retain(|observation| observation.element != *element);
	}

	fn when_idle(&self, task: IdleTask) {
		self.tree.borrow_mut().idle.push(task);
	}
}

impl std::fmt::Debug for MemoryDom {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let tree = self.tree.borrow();
		let mut html = String::new();
		tree.write_html(NodeId(0), &mut html);
		f.debug_struct("MemoryDom").field("document", &html).finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::cell::Cell;

	#[rstest]
	fn test_insert_island_writes_marker_and_payload() {
		let dom = MemoryDom::new();
		let island = dom.insert_island(dom.body(), "Counter", "c1", Some(r#"{"count":1}"#));
		assert_eq!(dom.get_attribute(&island, ISLAND_ATTR).as_deref(), Some("Counter"));
		assert_eq!(dom.payload_text(&island).as_deref(), Some(r#"{"count":1}"#));
		assert_eq!(
			dom.inner_html(island),
			r#"<script type="application/json" data-rh-props>{"count":1}</script>"#
		);
	}

	#[rstest]
	fn test_mount_replaces_content() {
		let dom = MemoryDom::new();
		let island = dom.insert_island(dom.body(), "Counter", "c1", Some("{}"));
		dom.mount(Markup::from("<button>1</button>"), &island).unwrap();
		assert_eq!(dom.inner_html(island), "<button>1</button>");
		assert_eq!(dom.payload_text(&island), None);
		assert_eq!(dom.mount_count(island), 1);
	}

	#[rstest]
	fn test_mount_into_detached_container_fails() {
		let dom = MemoryDom::new();
		let outer = dom.append_element(dom.body(), "div");
		let inner = dom.append_element(outer, "div");
		dom.clear(&outer);
		assert_eq!(
			dom.mount(Markup::from("x"), &inner),
			Err(MountError::Detached)
		);
	}

	#[rstest]
	fn test_events_bubble_to_ancestors() {
		let dom = MemoryDom::new();
		let section = dom.append_element(dom.body(), "section");
		let island = dom.insert_island(section, "A", "a", None);
		let other = dom.append_element(dom.body(), "aside");
		let event = IslandEvent::Hydrated {
			id: "a".into(),
			component_name: "A".into(),
		};
		dom.dispatch(&island, &event);
		assert_eq!(dom.events_reaching(dom.body()), vec![event.clone()]);
		assert_eq!(dom.events_reaching(section), vec![event]);
		assert!(dom.events_reaching(other).is_empty());
	}

	#[rstest]
	fn test_scroll_notifies_observer() {
		let dom = MemoryDom::new();
		let element = dom.append_element(dom.body(), "div");
		dom.set_rect(element, Rect::new(0.0, 5000.0, 100.0, 20.0));
		let fired = Rc::new(Cell::new(0));
		let counter = Rc::clone(&fired);
		assert!(dom.observe(&element, 100.0, Rc::new(move || counter.set(counter.get() + 1))));
		assert_eq!(dom.observed(), vec![element]);
		dom.scroll_into_view(element);
		assert_eq!(fired.get(), 1);
	}

	#[rstest]
	fn test_observer_unavailable() {
		let dom = MemoryDom::new().without_intersection_observer();
		let element = dom.append_element(dom.body(), "div");
		assert!(!dom.observe(&element, 0.0, Rc::new(|| {})));
		assert!(dom.observed().is_empty());
	}

	#[rstest]
	fn test_idle_tasks_run_on_demand() {
		let dom = MemoryDom::new();
		let ran = Rc::new(Cell::new(false));
		let flag = Rc::clone(&ran);
		dom.when_idle(Box::new(move || flag.set(true)));
		assert_eq!(dom.pending_idle_tasks(), 1);
		assert!(!ran.get());
		dom.run_idle();
		assert!(ran.get());
		assert_eq!(dom.pending_idle_tasks(), 0);
	}
}
