//! Hydration Runtime Integration Tests
//!
//! Drives the runtime over an in-memory page the way a browser would:
//! idle discovery, scrolling, manual passes, updates and unmounts.
//!
//! Success Criteria:
//! 1. Every island mounts at most once, however often hydration runs
//! 2. A failing island never affects its neighbours
//! 3. Off-screen islands wait for intersection
//! 4. Updates and unmounts keep props consistent
//!
//! Test Categories:
//! - Category 1: Idempotency
//! - Category 2: Failure isolation
//! - Category 3: Deferred hydration
//! - Category 4: Update and unmount
//! - Category 5: Global components

use reinhardt_hydration::{
	ComponentError, Dom, ERROR_ATTR, HYDRATED_ATTR, HYDRATION_ATTR_PROPS, HydrationConfig,
	HydrationError, HydrationRuntime, IslandEvent, IslandState, Markup, MemoryDom, Props, Rect,
	register_island_component,
};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

fn counter(props: &Props) -> Result<Markup, ComponentError> {
	let count = props.get("count").and_then(Value::as_i64).unwrap_or(0);
	Ok(Markup::new(format!("<button>{}</button>", count)))
}

fn echo(props: &Props) -> Result<Markup, ComponentError> {
	Ok(Markup::new(Value::Object(props.clone()).to_string()))
}

fn global_badge(props: &Props) -> Result<Markup, ComponentError> {
	let label = props.get("label").and_then(Value::as_str).unwrap_or("New");
	Ok(Markup::new(format!("<span class=\"badge\">{}</span>", label)))
}

register_island_component!("GlobalBadge", global_badge);

fn object(value: Value) -> Props {
	match value {
		Value::Object(map) => map,
		_ => Props::new(),
	}
}

#[fixture]
fn runtime() -> HydrationRuntime<MemoryDom> {
	let runtime = HydrationRuntime::new(MemoryDom::new());
	runtime.register("Counter", counter);
	runtime.register("Echo", echo);
	runtime
}

// ============================================================================
// Category 1: Idempotency
// ============================================================================

/// Tests that a second hydrate mounts nothing again
#[rstest]
fn test_hydrate_twice_mounts_once(runtime: HydrationRuntime<MemoryDom>) {
	let dom = runtime.dom().clone();
	let a = dom.insert_island(dom.body(), "Counter", "a", Some(r#"{"count": 1}"#));
	let b = dom.insert_island(dom.body(), "Counter", "b", Some(r#"{"count": 2}"#));

	let first = runtime.hydrate(None);
	let second = runtime.hydrate(None);

	assert_eq!(first.hydrated, vec!["a", "b"]);
	assert!(second.hydrated.is_empty());
	assert_eq!(second.skipped, 2);
	assert_eq!(dom.mount_count(a), 1);
	assert_eq!(dom.mount_count(b), 1);
	assert_eq!(dom.inner_html(b), "<button>2</button>");
}

/// Tests that idle discovery followed by a manual pass mounts once
#[rstest]
fn test_start_then_hydrate_mounts_once(runtime: HydrationRuntime<MemoryDom>) {
	let dom = runtime.dom().clone();
	let island = dom.insert_island(dom.body(), "Counter", "a", None);

	runtime.start();
	assert_eq!(dom.mount_count(island), 0);
	dom.run_idle();
	runtime.hydrate(None);

	assert_eq!(dom.mount_count(island), 1);
	assert_eq!(dom.events_reaching(dom.body()).len(), 1);
}

/// Tests that the hydrated event reaches document-level listeners
#[rstest]
fn test_hydrated_event_bubbles(runtime: HydrationRuntime<MemoryDom>) {
	let dom = runtime.dom().clone();
	let section = dom.append_element(dom.body(), "section");
	dom.insert_island(section, "Counter", "a", None);

	runtime.hydrate(None);

	let events = dom.events_reaching(dom.body());
	assert_eq!(
		events,
		vec![IslandEvent::Hydrated {
			id: "a".into(),
			component_name: "Counter".into(),
		}]
	);
	assert_eq!(
		events[0].detail(),
		json!({"id": "a", "componentName": "Counter"})
	);
}

// ============================================================================
// Category 2: Failure isolation
// ============================================================================

/// Tests that an unregistered component fails alone
#[rstest]
fn test_partial_failure_is_isolated(runtime: HydrationRuntime<MemoryDom>) {
	let dom = runtime.dom().clone();
	let first = dom.insert_island(dom.body(), "Counter", "first", Some(r#"{"count": 1}"#));
	let second = dom.insert_island(dom.body(), "Missing", "second", Some(r#"{"x": 1}"#));
	let third = dom.insert_island(dom.body(), "Counter", "third", Some(r#"{"count": 3}"#));

	let report = runtime.hydrate(None);

	assert_eq!(report.hydrated, vec!["first", "third"]);
	assert_eq!(report.failed, vec!["second"]);
	assert_eq!(runtime.state("first"), IslandState::Hydrated);
	assert_eq!(runtime.state("second"), IslandState::Error);
	assert_eq!(runtime.state("third"), IslandState::Hydrated);

	assert_eq!(dom.get_attribute(&first, ERROR_ATTR), None);
	assert_eq!(dom.get_attribute(&third, ERROR_ATTR), None);
	assert_eq!(
		dom.get_attribute(&second, ERROR_ATTR).as_deref(),
		Some("component 'Missing' is not registered")
	);
	assert_eq!(dom.get_attribute(&second, HYDRATED_ATTR), None);

	let errors = runtime.get_errors();
	assert_eq!(errors.len(), 1);
	assert_eq!(errors[0].id, "second");
	assert_eq!(
		errors[0].error,
		HydrationError::MissingComponent("Missing".into())
	);

	let error_events: Vec<IslandEvent> = dom
		.events_reaching(second)
		.into_iter()
		.filter(|event| event.name() == "error")
		.collect();
	assert_eq!(
		error_events,
		vec![IslandEvent::Error {
			error: "component 'Missing' is not registered".into(),
			component_name: "Missing".into(),
			props: object(json!({"x": 1})),
		}]
	);
}

/// Tests that a broken payload still mounts the island
#[rstest]
#[case("{count: 1}")]
#[case("[1, 2, 3]")]
#[case("{{ rh_props_0 | replace: '</', '<\\/' }}")]
fn test_bad_payload_mounts_with_empty_props(
	runtime: HydrationRuntime<MemoryDom>,
	#[case] payload: &str,
) {
	let dom = runtime.dom().clone();
	let island = dom.insert_island(dom.body(), "Counter", "a", Some(payload));

	let report = runtime.hydrate(None);

	assert_eq!(report.hydrated, vec!["a"]);
	assert_eq!(dom.inner_html(island), "<button>0</button>");
	assert!(runtime.get_errors().is_empty());
}

// ============================================================================
// Category 3: Deferred hydration
// ============================================================================

/// Tests that an off-screen island hydrates on intersection and is then
/// no longer observed
#[rstest]
fn test_deferred_island_hydrates_on_intersection(runtime: HydrationRuntime<MemoryDom>) {
	let dom = runtime.dom().clone();
	let visible = dom.insert_island(dom.body(), "Counter", "visible", None);
	let below = dom.insert_island(dom.body(), "Counter", "below", Some(r#"{"count": 7}"#));
	dom.set_rect(below, Rect::new(0.0, 4000.0, 100.0, 20.0));

	runtime.start();
	dom.run_idle();

	assert_eq!(dom.mount_count(visible), 1);
	assert_eq!(dom.mount_count(below), 0);
	assert_eq!(runtime.state("below"), IslandState::Unmounted);
	assert_eq!(dom.observed(), vec![below]);

	dom.scroll_into_view(below);

	assert_eq!(dom.inner_html(below), "<button>7</button>");
	assert_eq!(runtime.state("below"), IslandState::Hydrated);
	assert!(dom.observed().is_empty());

	dom.scroll_into_view(below);
	assert_eq!(dom.mount_count(below), 1);
}

/// Tests that with no root margin an island just below the viewport waits
#[rstest]
fn test_zero_root_margin_defers_nearby_island() {
	let dom = MemoryDom::new();
	let runtime = HydrationRuntime::with_config(
		dom.clone(),
		HydrationConfig::new().root_margin_px(0.0),
	);
	runtime.register("Counter", counter);
	let near = dom.insert_island(dom.body(), "Counter", "near", None);
	dom.set_rect(near, Rect::new(0.0, 850.0, 100.0, 20.0));

	runtime.start();
	dom.run_idle();

	assert_eq!(dom.mount_count(near), 0);
	assert_eq!(dom.observed(), vec![near]);
}

/// Tests that without an intersection observer every island hydrates
/// during discovery
#[rstest]
fn test_no_observer_hydrates_immediately() {
	let dom = MemoryDom::new().without_intersection_observer();
	let runtime = HydrationRuntime::new(dom.clone());
	runtime.register("Counter", counter);
	let below = dom.insert_island(dom.body(), "Counter", "below", None);
	dom.set_rect(below, Rect::new(0.0, 4000.0, 100.0, 20.0));

	runtime.start();
	dom.run_idle();

	assert_eq!(dom.mount_count(below), 1);
	assert!(dom.observed().is_empty());
}

/// Tests that visible islands hydrate before off-screen ones earlier in the
/// page when the fallback path hydrates everything
#[rstest]
fn test_fallback_hydrates_visible_islands_first() {
	let dom = MemoryDom::new().without_intersection_observer();
	let runtime = HydrationRuntime::new(dom.clone());
	runtime.register("Counter", counter);
	let far = dom.insert_island(dom.body(), "Counter", "far", None);
	dom.insert_island(dom.body(), "Counter", "near", None);
	dom.set_rect(far, Rect::new(0.0, 5000.0, 100.0, 20.0));

	runtime.start();
	dom.run_idle();

	let order: Vec<String> = dom
		.events_reaching(dom.body())
		.into_iter()
		.filter_map(|event| match event {
			IslandEvent::Hydrated { id, .. } => Some(id),
			_ => None,
		})
		.collect();
	assert_eq!(order, vec!["near", "far"]);
}

/// Tests that a manual pass hydrates deferred islands too
#[rstest]
fn test_manual_hydrate_ignores_visibility(runtime: HydrationRuntime<MemoryDom>) {
	let dom = runtime.dom().clone();
	let below = dom.insert_island(dom.body(), "Counter", "below", None);
	dom.set_rect(below, Rect::new(0.0, 4000.0, 100.0, 20.0));

	runtime.hydrate(None);

	assert_eq!(dom.mount_count(below), 1);
}

// ============================================================================
// Category 4: Update and unmount
// ============================================================================

/// Tests that updates replace props shallowly instead of accumulating
#[rstest]
fn test_update_merges_shallowly(runtime: HydrationRuntime<MemoryDom>) {
	let dom = runtime.dom().clone();
	let island = dom.insert_island(dom.body(), "Echo", "e", None);
	runtime.hydrate(None);

	runtime.update("e", object(json!({"x": 1}))).unwrap();
	runtime.update("e", object(json!({"x": 2}))).unwrap();

	let mounted = runtime.get_mounted("e").unwrap();
	assert_eq!(Value::Object(mounted.props), json!({"x": 2}));
	assert_eq!(dom.inner_html(island), r#"{"x":2}"#);
}

/// Tests that update keeps props it does not mention
#[rstest]
fn test_update_keeps_other_props(runtime: HydrationRuntime<MemoryDom>) {
	let dom = runtime.dom().clone();
	dom.insert_island(
		dom.body(),
		"Echo",
		"e",
		Some(r#"{"title": "Cap", "qty": 1}"#),
	);
	runtime.hydrate(None);

	runtime.update("e", object(json!({"qty": 3}))).unwrap();

	let mounted = runtime.get_mounted("e").unwrap();
	assert_eq!(
		Value::Object(mounted.props),
		json!({"title": "Cap", "qty": 3})
	);
}

/// Tests that an unmounted island hydrates again with its last props
#[rstest]
fn test_unmount_then_rehydrate(runtime: HydrationRuntime<MemoryDom>) {
	let dom = runtime.dom().clone();
	let island = dom.insert_island(dom.body(), "Counter", "c", Some(r#"{"count": 1}"#));
	runtime.hydrate(None);
	runtime.update("c", object(json!({"count": 5}))).unwrap();

	runtime.unmount("c").unwrap();

	assert_eq!(dom.inner_html(island), "");
	assert_eq!(dom.get_attribute(&island, HYDRATED_ATTR), None);
	assert_eq!(
		dom.get_attribute(&island, HYDRATION_ATTR_PROPS).as_deref(),
		Some(r#"{"count":5}"#)
	);
	assert!(runtime.get_mounted("c").is_none());
	assert_eq!(runtime.state("c"), IslandState::Unmounted);

	let report = runtime.hydrate(None);

	assert_eq!(report.hydrated, vec!["c"]);
	assert_eq!(dom.inner_html(island), "<button>5</button>");
}

/// Tests that a failed update leaves the island as it was
#[rstest]
fn test_failed_update_keeps_previous_state(runtime: HydrationRuntime<MemoryDom>) {
	runtime.register("Picky", |props: &Props| -> Result<Markup, ComponentError> {
		match props.get("qty").and_then(Value::as_i64) {
			Some(qty) if qty < 0 => Err(ComponentError::InvalidProp {
				name: "qty".into(),
				reason: "negative".into(),
			}),
			qty => Ok(Markup::new(format!("{}", qty.unwrap_or(0)))),
		}
	});
	let dom = runtime.dom().clone();
	let island = dom.insert_island(dom.body(), "Picky", "p", Some(r#"{"qty": 2}"#));
	runtime.hydrate(None);

	let result = runtime.update("p", object(json!({"qty": -1})));

	assert!(matches!(result, Err(HydrationError::Mount { .. })));
	assert_eq!(dom.inner_html(island), "2");
	assert_eq!(
		Value::Object(runtime.get_mounted("p").unwrap().props),
		json!({"qty": 2})
	);
}

// ============================================================================
// Category 5: Global components
// ============================================================================

/// Tests that a component registered with the macro resolves without
/// per-runtime registration
#[rstest]
fn test_global_component_fallback() {
	let dom = MemoryDom::new();
	let runtime = HydrationRuntime::new(dom.clone());
	let island = dom.insert_island(dom.body(), "GlobalBadge", "g", Some(r#"{"label": "Sale"}"#));

	let report = runtime.hydrate(None);

	assert_eq!(report.hydrated, vec!["g"]);
	assert_eq!(dom.inner_html(island), "<span class=\"badge\">Sale</span>");
}

/// Tests that runtimes do not share local registrations
#[rstest]
fn test_runtimes_are_independent() {
	let first = HydrationRuntime::new(MemoryDom::new());
	first.register("OnlyHere", counter);
	let second = HydrationRuntime::new(MemoryDom::new());

	let dom = second.dom().clone();
	dom.insert_island(dom.body(), "OnlyHere", "x", None);
	let report = second.hydrate(None);

	assert_eq!(report.failed, vec!["x"]);
}
