use std::sync::Arc;

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;
use crate::TransformResult;

fn noop(_: &str, _: &bytes::Bytes) -> TransformResult {
	Ok(None)
}

fn index_of(predicates: impl IntoIterator<Item = Predicate>) -> DispatchIndex {
	DispatchIndex::from_entries(predicates.into_iter().enumerate().map(|(seq, predicate)| {
		Arc::new(Interceptor::new(
			Arc::from(format!("i{seq}")),
			predicate,
			Arc::new(noop),
			seq as u64,
		))
	}))
}

fn names(hits: Vec<&Arc<Interceptor>>) -> Vec<&str> {
	hits.into_iter().map(|e| e.name()).collect()
}

#[test]
fn categories_apply_in_fixed_order() {
	let index = index_of([
		Predicate::contains("Mob"),
		Predicate::suffix("Mob"),
		Predicate::prefix("game."),
		Predicate::exact("game.Mob"),
		Predicate::all(),
	]);
	assert_eq!(names(index.matches("game.Mob")), ["i3", "i2", "i1", "i0", "i4"]);
}

#[test]
fn registration_order_holds_across_prefix_keys() {
	// Longer key registered first must still apply first.
	let index = index_of([
		Predicate::prefix("a.b."),
		Predicate::prefix("a."),
		Predicate::prefix("a.b."),
		Predicate::prefix(""),
	]);
	assert_eq!(names(index.matches("a.b.C")), ["i0", "i1", "i2", "i3"]);
	assert_eq!(names(index.matches("a.x")), ["i1", "i3"]);
}

#[test]
fn registration_order_holds_across_suffix_keys() {
	let index = index_of([Predicate::suffix("Mixin"), Predicate::suffix("n"), Predicate::suffix("Mixin")]);
	assert_eq!(names(index.matches("a.FooMixin")), ["i0", "i1", "i2"]);
	assert_eq!(names(index.matches("a.Bean")), ["i1"]);
}

#[test]
fn multibyte_names_split_on_char_boundaries() {
	let index = index_of([Predicate::prefix("é"), Predicate::suffix("ü"), Predicate::exact("éü")]);
	assert_eq!(names(index.matches("éü")), ["i2", "i0", "i1"]);
	assert_eq!(names(index.matches("ü")), ["i1"]);
}

#[test]
fn composites_fall_into_residual() {
	assert_eq!(Category::of(&Predicate::exact("a")), Category::Exact);
	assert_eq!(Category::of(&Predicate::prefix("a").negate()), Category::Residual);
	assert_eq!(Category::of(&Predicate::exact("a").or(Predicate::exact("b"))), Category::Residual);
	assert_eq!(Category::of(&Predicate::none()), Category::Residual);
}

#[test]
fn empty_index_matches_nothing() {
	let index = DispatchIndex::new();
	assert!(index.is_empty());
	assert!(index.matches("anything").is_empty());
}

fn arb_name() -> impl Strategy<Value = String> {
	"[ab.é]{0,5}"
}

fn arb_predicate() -> impl Strategy<Value = Predicate> {
	let leaf = prop_oneof![
		3 => arb_name().prop_map(Predicate::exact),
		3 => arb_name().prop_map(Predicate::prefix),
		3 => arb_name().prop_map(Predicate::suffix),
		1 => arb_name().prop_map(Predicate::contains),
		1 => Just(Predicate::all()),
		1 => Just(Predicate::none()),
	];
	leaf.prop_recursive(3, 16, 2, |inner| {
		prop_oneof![
			(inner.clone(), inner.clone()).prop_map(|(l, r)| l.and(r)),
			(inner.clone(), inner.clone()).prop_map(|(l, r)| l.or(r)),
			inner.prop_map(Predicate::negate),
		]
	})
}

proptest! {
	#[test]
	fn prop_index_matches_brute_force(
		predicates in prop::collection::vec(arb_predicate(), 0..24),
		samples in prop::collection::vec(arb_name(), 1..8),
	) {
		let index = index_of(predicates);
		for name in &samples {
			prop_assert_eq!(names(index.matches(name)), names(index.matches_brute_force(name)), "name {:?}", name);
		}
	}
}
