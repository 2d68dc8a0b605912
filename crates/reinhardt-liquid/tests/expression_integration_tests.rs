//! Expression Integration Tests
//!
//! Both targets of the expression compiler, checked against each other:
//! the Liquid source emitted for the server and the value computed for the
//! client from the same expression tree.
//!
//! Test Categories:
//! - Category 1: Template text generation
//! - Category 2: Client evaluation goldens
//! - Category 3: Blank and nil predicates
//! - Category 4: Conditions

use proptest::prelude::*;
use reinhardt_liquid::prelude::*;
use rstest::rstest;
use serde_json::{Value, json};

fn catalog() -> Context {
	Context::new(json!({
		"shop": {"name": "Reinhardt Goods"},
		"product": {
			"title": "Hello World",
			"vendor": null,
			"tags": ["linen", "summer"],
			"price": 2450
		},
		"products": [
			{"title": "Cap", "price": 1500, "available": true, "type": "hat"},
			{"title": "Tee", "price": 900, "available": false, "type": "shirt"},
			{"title": "Polo", "price": 1200, "available": true, "type": "shirt"},
			{"title": "Mystery", "available": true, "type": "box"}
		]
	}))
}

fn titles(value: Value) -> Vec<String> {
	value
		.as_array()
		.map(|items| {
			items
				.iter()
				.filter_map(|item| item["title"].as_str().map(str::to_string))
				.collect()
		})
		.unwrap_or_default()
}

// ============================================================================
// Category 1: Template text generation
// ============================================================================

/// Tests that building the same expression twice yields the same text
#[rstest]
fn test_same_expression_builds_same_template() {
	let build = || {
		Expr::var("products")
			.where_eq("type", "shirt")
			.sort_by("price")
			.map("title")
			.join(", ")
	};
	assert_eq!(build().template(), build().template());
	assert_eq!(
		build().template(),
		"products | where: 'type', 'shirt' | sort: 'price' | map: 'title' | join: ', '"
	);
}

/// Tests that rendering the same view twice yields the same document
#[rstest]
fn test_same_view_renders_same_document() {
	let view = || {
		Conditional::new(
			Expr::var("product.price").gt(1000),
			[View::output(Expr::var("product.price").money())],
		)
		.otherwise(["Sale"])
		.into_view()
	};
	let first = Renderer::server().render(&view()).unwrap();
	let second = Renderer::server().render(&view()).unwrap();
	assert_eq!(first, second);
}

/// Tests string literal quoting in generated filter arguments
#[rstest]
#[case("plain", "x | append: 'plain'")]
#[case("it's", "x | append: 'it''s'")]
#[case("say \"hi\"", "x | append: 'say \"hi\"'")]
fn test_literal_arguments_are_single_quoted(#[case] suffix: &str, #[case] expected: &str) {
	assert_eq!(Expr::var("x").append(suffix).template(), expected);
}

proptest! {
	/// Template text depends only on the expression tree.
	#[test]
	fn prop_template_text_is_idempotent(
		path in "[a-z][a-z_]{0,8}(\\.[a-z][a-z_]{0,8}){0,2}",
		fallback in "[ -~]{0,12}",
		length in 0i64..100,
	) {
		let build = || Expr::var(path.as_str()).default(fallback.as_str()).truncate(length).upcase();
		prop_assert_eq!(build().template(), build().template());
		prop_assert_eq!(build(), build());
	}
}

// ============================================================================
// Category 2: Client evaluation goldens
// ============================================================================

/// Tests `default` against missing, null and present values
#[rstest]
#[case("product.title", json!("Hello World"))]
#[case("product.vendor", json!("Unknown"))]
#[case("product.missing", json!("Unknown"))]
fn test_default_golden(#[case] path: &str, #[case] expected: Value) {
	let expr = Expr::var(path).default("Unknown");
	assert_eq!(expr.evaluate(&catalog()), expected);
}

/// Tests `where` with only a key
#[rstest]
fn test_where_without_value_golden() {
	let expr = Expr::var("products").where_truthy("available");
	assert_eq!(titles(expr.evaluate(&catalog())), vec!["Cap", "Polo", "Mystery"]);
}

/// Tests `where` with a key and a value
#[rstest]
fn test_where_with_value_golden() {
	let expr = Expr::var("products").where_eq("type", "shirt");
	assert_eq!(titles(expr.evaluate(&catalog())), vec!["Tee", "Polo"]);
}

/// Tests `sort` by key; items missing the key go last
#[rstest]
fn test_sort_by_key_golden() {
	let expr = Expr::var("products").sort_by("price");
	assert_eq!(
		titles(expr.evaluate(&catalog())),
		vec!["Tee", "Polo", "Cap", "Mystery"]
	);
}

/// Tests `truncate` counting the ellipsis in the length
#[rstest]
#[case(8, "Hello...")]
#[case(11, "Hello World")]
#[case(3, "...")]
fn test_truncate_golden(#[case] length: i64, #[case] expected: &str) {
	let expr = Expr::var("product.title").truncate(length);
	assert_eq!(expr.evaluate(&catalog()), json!(expected));
}

/// Tests a chain mixing collection and string filters
#[rstest]
fn test_chained_filters_golden() {
	let expr = Expr::var("products")
		.where_eq("type", "shirt")
		.map("title")
		.join(" & ")
		.upcase();
	assert_eq!(expr.evaluate(&catalog()), json!("TEE & POLO"));
}

/// Tests that a compiled evaluator can be reused across contexts
#[rstest]
fn test_compiled_evaluator_is_reusable() {
	let evaluator = Expr::var("n").times(2).compile();
	assert_eq!(evaluator(&Context::new(json!({"n": 2}))), json!(4));
	assert_eq!(evaluator(&Context::new(json!({"n": 21}))), json!(42));
}

// ============================================================================
// Category 3: Blank and nil predicates
// ============================================================================

/// Tests values that are blank
#[rstest]
#[case(json!(null))]
#[case(json!(""))]
#[case(json!([]))]
#[case(json!({}))]
fn test_blank_values(#[case] value: Value) {
	let context = Context::new(json!({ "v": value }));
	assert!(Expr::var("v").is_blank().evaluate(&context));
	assert!(!Expr::var("v").is_present().evaluate(&context));
}

/// Tests values that are not blank
#[rstest]
#[case(json!(0))]
#[case(json!(false))]
#[case(json!("x"))]
#[case(json!([1]))]
#[case(json!({"k": 1}))]
fn test_present_values(#[case] value: Value) {
	let context = Context::new(json!({ "v": value }));
	assert!(!Expr::var("v").is_blank().evaluate(&context));
	assert!(Expr::var("v").is_present().evaluate(&context));
}

/// Tests that an undefined variable is both blank and nil
#[rstest]
fn test_undefined_is_blank_and_nil() {
	let context = Context::empty();
	assert!(Expr::var("missing").is_blank().evaluate(&context));
	assert!(Expr::var("missing").is_nil().evaluate(&context));
}

/// Tests that only null is nil
#[rstest]
#[case(json!(null), true)]
#[case(json!(""), false)]
#[case(json!([]), false)]
#[case(json!(0), false)]
#[case(json!(false), false)]
fn test_nil_only_for_null(#[case] value: Value, #[case] expected: bool) {
	let context = Context::new(json!({ "v": value }));
	assert_eq!(Expr::var("v").is_nil().evaluate(&context), expected);
}

/// Tests the Liquid text of the emptiness predicates
#[rstest]
fn test_predicate_templates() {
	assert_eq!(Expr::var("v").is_blank().template(), "v == blank");
	assert_eq!(Expr::var("v").is_present().template(), "v != blank");
	assert_eq!(Expr::var("v").is_nil().template(), "v == nil");
}

// ============================================================================
// Category 4: Conditions
// ============================================================================

/// Tests that chains read right to left, as the engine evaluates them
#[rstest]
fn test_condition_chain_is_right_associative() {
	// false and (true or true) => false; left-to-right would give true
	let condition = Condition::truthy(false)
		.and(Condition::truthy(true))
		.or(Condition::truthy(true));
	assert_eq!(condition.template(), "false and true or true");
	assert!(!condition.evaluate(&Context::empty()));
}

/// Tests comparison operators on the client
#[rstest]
#[case(Expr::var("product.price").gt(2000), true)]
#[case(Expr::var("product.price").le(2000), false)]
#[case(Expr::var("product.tags").contains("linen"), true)]
#[case(Expr::var("product.title").contains("World"), true)]
#[case(Expr::var("product.vendor").equals(Expr::nil()), true)]
#[case(Expr::var("shop.name").not_equals("Reinhardt Goods"), false)]
fn test_comparisons(#[case] condition: Condition, #[case] expected: bool) {
	assert_eq!(condition.evaluate(&catalog()), expected);
}

/// Tests that a filtered operand is hoisted before the tag that uses it
#[rstest]
fn test_filtered_operand_is_hoisted() {
	let view = Conditional::new(
		Expr::var("products").size().gt(3),
		["Many"],
	)
	.into_view();
	assert_eq!(
		Renderer::server().render(&view).unwrap(),
		"{% assign rh_tmp_0 = products | size %}{% if rh_tmp_0 > 3 %}Many{% endif %}"
	);
	assert_eq!(Renderer::client(catalog()).render(&view).unwrap(), "Many");
}
