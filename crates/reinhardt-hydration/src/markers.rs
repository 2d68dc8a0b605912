//! Hydration markers read from server-rendered HTML.
//!
//! The template compiler writes these attributes; the runtime finds islands
//! by them and records each island's progress on the element.

/// The attribute naming an island's component.
pub const ISLAND_ATTR: &str = "data-rh-island";

/// The attribute name for hydration IDs.
pub const HYDRATION_ATTR_ID: &str = "data-rh-id";

/// The attribute name for serialized props.
///
/// Marks the `<script type="application/json">` payload child, or holds the
/// payload itself.
pub const HYDRATION_ATTR_PROPS: &str = "data-rh-props";

/// Set once an island is mounted; a marked island is never mounted again.
pub const HYDRATED_ATTR: &str = "data-rh-hydrated";

/// Holds the error message of an island that failed to hydrate.
pub const ERROR_ATTR: &str = "data-rh-error";

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_markers_share_prefix() {
		for attr in [
			ISLAND_ATTR,
			HYDRATION_ATTR_ID,
			HYDRATION_ATTR_PROPS,
			HYDRATED_ATTR,
			ERROR_ATTR,
		] {
			assert!(attr.starts_with("data-rh-"), "{}", attr);
		}
	}
}
