//! Island Detection for Partial Hydration
//!
//! Islands are elements marked with `data-rh-island="<Component>"` by the
//! template compiler. Only islands need client-side work; everything else on
//! the page stays inert server-rendered HTML.
//!
//! ## Architecture
//!
//! ```text
//! Rendered page:
//! <div data-rh-island="Counter" data-rh-id="rh-island-0">
//!   <script type="application/json" data-rh-props>{"count":1}</script>
//!   <button>1</button>
//! </div>
//!
//! Island Detection:
//! IslandDetector → [IslandNode] → HydrationRuntime
//! ```

use crate::dom::Dom;
use crate::markers::{HYDRATED_ATTR, HYDRATION_ATTR_ID, ISLAND_ATTR};
use crate::warn_log;

/// An island found in the DOM.
#[derive(Debug, Clone, PartialEq)]
pub struct IslandNode<E> {
	/// The island's container element.
	pub element: E,
	/// Hydration ID from `data-rh-id`.
	pub hydration_id: String,
	/// Component name from `data-rh-island`.
	pub component_name: String,
}

impl<E: Clone> IslandNode<E> {
	/// Reads an island from its element.
	///
	/// Returns `None` when the element lacks a hydration ID or a component
	/// name.
	pub fn from_element<D: Dom<Element = E>>(dom: &D, element: &E) -> Option<Self> {
		let hydration_id = dom.get_attribute(element, HYDRATION_ATTR_ID)?;
		let component_name = dom.get_attribute(element, ISLAND_ATTR)?;
		Some(Self {
			element: element.clone(),
			hydration_id,
			component_name,
		})
	}
}

/// Finds the islands a hydration pass should process.
pub struct IslandDetector<'a, D: Dom> {
	dom: &'a D,
}

impl<'a, D: Dom> IslandDetector<'a, D> {
	/// Creates a detector over `dom`.
	pub fn new(dom: &'a D) -> Self {
		Self { dom }
	}

	/// Finds unhydrated islands under `root`, in document order.
	///
	/// Islands nested inside another island of the result are excluded; the
	/// outer component owns them. Already hydrated islands are skipped, and
	/// islands without an id are skipped with a warning.
	pub fn find_islands(&self, root: Option<&D::Element>) -> Vec<IslandNode<D::Element>> {
		let mut islands: Vec<IslandNode<D::Element>> = Vec::new();
		for element in self.dom.find_islands(root) {
			if self.dom.get_attribute(&element, HYDRATED_ATTR).is_some() {
				continue;
			}
			if self.is_within_island(&element, &islands) {
				continue;
			}
			match IslandNode::from_element(self.dom, &element) {
				Some(island) => islands.push(island),
				None => warn_log!(
					"island {:?} has no {} attribute and is skipped",
					self.dom.get_attribute(&element, ISLAND_ATTR),
					HYDRATION_ATTR_ID
				),
			}
		}
		islands
	}

	/// Counts islands under `root` that are already hydrated.
	pub fn count_hydrated(&self, root: Option<&D::Element>) -> usize {
		self.dom
			.find_islands(root)
			.iter()
			.filter(|element| self.dom.get_attribute(element, HYDRATED_ATTR).is_some())
			.count()
	}

	fn is_within_island(&self, element: &D::Element, islands: &[IslandNode<D::Element>]) -> bool {
		islands
			.iter()
			.any(|island| &island.element != element && self.dom.contains(&island.element, element))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dom::MemoryDom;
	use rstest::rstest;

	#[rstest]
	fn test_finds_islands_in_document_order() {
		let dom = MemoryDom::new();
		let body = dom.body();
		dom.insert_island(body, "Header", "a", None);
		let section = dom.append_element(body, "section");
		dom.insert_island(section, "Cart", "b", None);
		dom.insert_island(body, "Footer", "c", None);

		let ids: Vec<String> = IslandDetector::new(&dom)
			.find_islands(None)
			.into_iter()
			.map(|island| island.hydration_id)
			.collect();
		assert_eq!(ids, vec!["a", "b", "c"]);
	}

	#[rstest]
	fn test_nested_islands_are_excluded() {
		let dom = MemoryDom::new();
		let outer = dom.insert_island(dom.body(), "Outer", "outer", None);
		dom.insert_island(outer, "Inner", "inner", None);

		let islands = IslandDetector::new(&dom).find_islands(None);
		assert_eq!(islands.len(), 1);
		assert_eq!(islands[0].component_name, "Outer");
	}

	#[rstest]
	fn test_hydrated_and_id_less_islands_are_skipped() {
		let dom = MemoryDom::new();
		let done = dom.insert_island(dom.body(), "Done", "done", None);
		dom.set_attribute(&done, HYDRATED_ATTR, "true");
		let anonymous = dom.append_element(dom.body(), "div");
		dom.set_attribute(&anonymous, ISLAND_ATTR, "Anonymous");
		dom.insert_island(dom.body(), "Todo", "todo", None);

		let detector = IslandDetector::new(&dom);
		let islands = detector.find_islands(None);
		assert_eq!(islands.len(), 1);
		assert_eq!(islands[0].hydration_id, "todo");
		assert_eq!(detector.count_hydrated(None), 1);
	}

	#[rstest]
	fn test_root_limits_the_search() {
		let dom = MemoryDom::new();
		let left = dom.append_element(dom.body(), "aside");
		dom.insert_island(left, "A", "a", None);
		dom.insert_island(dom.body(), "B", "b", None);

		let islands = IslandDetector::new(&dom).find_islands(Some(&left));
		assert_eq!(islands.len(), 1);
		assert_eq!(islands[0].hydration_id, "a");
	}
}
