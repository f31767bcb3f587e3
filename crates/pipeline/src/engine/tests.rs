use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use bytes::Bytes;
use pretty_assertions::assert_eq;
use splice_filter::Predicate;

use crate::{
	ArtifactStore, FrozenReason, PatchedArtifacts, PipelineEngine, RegisterError, Resolution, TransformResult,
};

/// Appends `marker` to the bytes.
fn append(marker: &'static str) -> impl Fn(&str, &Bytes) -> TransformResult + Send + Sync + 'static {
	move |_: &str, bytes: &Bytes| {
		let mut out = bytes.to_vec();
		out.extend_from_slice(marker.as_bytes());
		Ok(Some(out.into()))
	}
}

/// Appends `marker` unless already present, counting every invocation.
fn append_once(
	marker: &'static str,
	calls: Arc<AtomicUsize>,
) -> impl Fn(&str, &Bytes) -> TransformResult + Send + Sync + 'static {
	move |_: &str, bytes: &Bytes| {
		calls.fetch_add(1, Ordering::SeqCst);
		if bytes.ends_with(marker.as_bytes()) {
			return Ok(None);
		}
		let mut out = bytes.to_vec();
		out.extend_from_slice(marker.as_bytes());
		Ok(Some(out.into()))
	}
}

fn base() -> Option<Bytes> {
	Some(Bytes::from_static(b"base"))
}

#[test]
fn exact_applies_before_prefix() {
	let engine = PipelineEngine::new();
	// Registered prefix-first: category order still puts exact first.
	engine
		.register("y", Predicate::prefix("a."), append("Y"))
		.unwrap();
	engine
		.register("x", Predicate::exact("a.B"), append("X"))
		.unwrap();

	assert_eq!(engine.resolve("a.B", base).unwrap(), Some(Bytes::from_static(b"baseXY")));
	assert_eq!(engine.resolve("a.C", base).unwrap(), Some(Bytes::from_static(b"baseY")));
	assert_eq!(engine.resolve("z.Q", base).unwrap(), Some(Bytes::from_static(b"base")));
	assert_eq!(
		engine.cached("z.Q"),
		Some(Resolution::Unmodified(Bytes::from_static(b"base")))
	);
}

#[test]
fn full_category_order() {
	let engine = PipelineEngine::new();
	engine
		.register("residual", Predicate::contains("Mob"), append("4"))
		.unwrap();
	engine
		.register("suffix", Predicate::suffix("Mob"), append("3"))
		.unwrap();
	engine
		.register("prefix", Predicate::prefix("game."), append("2"))
		.unwrap();
	engine
		.register("exact", Predicate::exact("game.Mob"), append("1"))
		.unwrap();

	assert_eq!(
		engine.matching("game.Mob"),
		["exact", "prefix", "suffix", "residual"].map(Arc::<str>::from).to_vec()
	);
	assert_eq!(
		engine.resolve("game.Mob", || Some(Bytes::new())).unwrap(),
		Some(Bytes::from_static(b"1234"))
	);
}

#[test]
fn declining_transforms_see_latest_bytes() {
	let engine = PipelineEngine::new();
	engine
		.register("first", Predicate::all(), append("A"))
		.unwrap();
	engine
		.register("skip", Predicate::all(), |_: &str, _: &Bytes| Ok(None))
		.unwrap();
	engine
		.register("check", Predicate::all(), |_: &str, bytes: &Bytes| {
			assert_eq!(&bytes[..], b"baseA");
			Ok(None)
		})
		.unwrap();

	assert_eq!(engine.resolve("any", base).unwrap(), Some(Bytes::from_static(b"baseA")));
	assert!(engine.cached("any").unwrap().is_modified());
}

#[test]
fn resolve_is_idempotent() {
	let calls = Arc::new(AtomicUsize::new(0));
	let engine = PipelineEngine::new();
	engine
		.register("once", Predicate::prefix("a."), append_once("!", calls.clone()))
		.unwrap();

	let first = engine.resolve("a.B", base).unwrap();
	let second = engine
		.resolve("a.B", || panic!("cached names must not fetch again"))
		.unwrap();

	assert_eq!(first, second);
	assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn unmodified_results_are_cached_too() {
	let calls = Arc::new(AtomicUsize::new(0));
	let counter = calls.clone();
	let engine = PipelineEngine::new();
	engine
		.register("noop", Predicate::all(), move |_: &str, _: &Bytes| {
			counter.fetch_add(1, Ordering::SeqCst);
			Ok(None)
		})
		.unwrap();

	engine.resolve("n", base).unwrap();
	engine.resolve("n", base).unwrap();
	assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn missing_original_is_not_cached() {
	let engine = PipelineEngine::new();
	assert_eq!(engine.resolve("ghost", || None).unwrap(), None);
	assert!(engine.cached("ghost").is_none());
	assert_eq!(engine.resolve("ghost", base).unwrap(), base());
}

#[test]
fn transform_failure_is_not_cached() {
	let engine = PipelineEngine::new();
	engine
		.register("ok", Predicate::all(), append("A"))
		.unwrap();
	engine
		.register("boom", Predicate::exact("bad.Artifact"), |_: &str, _: &Bytes| {
			Err("corrupt constant pool".into())
		})
		.unwrap();

	let err = engine.resolve("bad.Artifact", base).unwrap_err();
	assert_eq!(&*err.artifact, "bad.Artifact");
	assert_eq!(&*err.transformer, "boom");
	assert_eq!(err.source.to_string(), "corrupt constant pool");
	assert!(engine.cached("bad.Artifact").is_none());

	// Other names are unaffected.
	assert_eq!(engine.resolve("good", base).unwrap(), Some(Bytes::from_static(b"baseA")));
}

#[test]
fn duplicate_names_are_refused() {
	let engine = PipelineEngine::new();
	engine
		.register("dup", Predicate::all(), append("A"))
		.unwrap();
	let err = engine
		.register("dup", Predicate::none(), append("B"))
		.unwrap_err();

	assert!(matches!(err, RegisterError::DuplicateName { ref name } if &**name == "dup"));
	assert_eq!(engine.len(), 1);
}

#[test]
fn empty_names_are_refused() {
	let engine = PipelineEngine::new();
	assert!(matches!(
		engine.register("", Predicate::all(), append("A")),
		Err(RegisterError::EmptyName)
	));
	assert!(engine.is_empty());
}

#[test]
fn register_after_seal_is_refused() {
	let engine = PipelineEngine::new();
	engine
		.register("before", Predicate::all(), append("A"))
		.unwrap();
	engine.seal();

	let err = engine
		.register("after", Predicate::all(), append("B"))
		.unwrap_err();
	assert_eq!(err.frozen_reason(), Some(FrozenReason::Sealed));
	assert_eq!(engine.entry_names(), vec![Arc::<str>::from("before")]);
	assert!(engine.is_sealed());
}

#[test]
fn attach_failure_freezes_registration() {
	let engine = PipelineEngine::new();
	engine.mark_attach_failed();

	let err = engine
		.register("late", Predicate::all(), append("A"))
		.unwrap_err();
	assert_eq!(err.frozen_reason(), Some(FrozenReason::AttachFailed));
	assert!(engine.is_empty());
	assert!(!engine.retrofit().unwrap().applied);
}

fn upstream() -> Arc<PatchedArtifacts> {
	Arc::new(
		[("a.One", "one"), ("a.Two", "two"), ("b.Three", "three")]
			.into_iter()
			.collect(),
	)
}

#[test]
fn retrofit_rewrites_upstream_and_seeds_cache() {
	let store = upstream();
	let calls = Arc::new(AtomicUsize::new(0));
	let engine = PipelineEngine::with_upstream(store.clone());
	engine
		.register("mark", Predicate::prefix("a."), append_once("+", calls.clone()))
		.unwrap();
	engine.seal();

	let report = engine.retrofit().unwrap();
	assert_eq!(report.examined, 3);
	assert_eq!(report.transformed, 2);
	assert_eq!(store.get("a.One"), Some(Bytes::from_static(b"one+")));
	assert_eq!(store.get("b.Three"), Some(Bytes::from_static(b"three")));
	assert_eq!(calls.load(Ordering::SeqCst), 2);

	// Seeded: resolve short-circuits even though the store now holds new bytes.
	let resolved = engine
		.resolve("a.One", || store.get("a.One"))
		.unwrap();
	assert_eq!(resolved, Some(Bytes::from_static(b"one+")));
	assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn retrofit_runs_once() {
	let store = upstream();
	let calls = Arc::new(AtomicUsize::new(0));
	let engine = PipelineEngine::with_upstream(store.clone());
	engine
		.register("mark", Predicate::all(), append_once("+", calls.clone()))
		.unwrap();

	assert!(engine.retrofit().unwrap().applied);
	let after_first = store.snapshot();
	let invocations = calls.load(Ordering::SeqCst);

	let second = engine.retrofit().unwrap();
	assert!(!second.applied);
	assert_eq!(store.snapshot(), after_first);
	assert_eq!(calls.load(Ordering::SeqCst), invocations);
	assert!(engine.retrofit_applied());
}

#[test]
fn retrofit_output_is_a_fixed_point_for_idempotent_transforms() {
	let store = upstream();
	let calls = Arc::new(AtomicUsize::new(0));
	let engine = PipelineEngine::with_upstream(store.clone());
	engine
		.register("mark", Predicate::all(), append_once("+", calls))
		.unwrap();
	engine.retrofit().unwrap();

	for (name, bytes) in store.snapshot() {
		assert_eq!(engine.apply_all(&name, &bytes).unwrap(), None, "{name} changed twice");
	}
}

#[test]
fn retrofit_writes_back_answers_resolved_earlier() {
	let store: Arc<PatchedArtifacts> = Arc::new([("a.One", "one"), ("a.Two", "two")].into_iter().collect());
	let engine = PipelineEngine::with_upstream(store.clone());

	// Loaded while registration is still open: one cached as transformed, one as unmodified.
	engine
		.register("m1", Predicate::exact("a.One"), append("1"))
		.unwrap();
	let early_one = engine.resolve("a.One", || store.get("a.One")).unwrap();
	let early_two = engine.resolve("a.Two", || store.get("a.Two")).unwrap();
	engine
		.register("m2", Predicate::prefix("a."), append("2"))
		.unwrap();
	engine.seal();

	let report = engine.retrofit().unwrap();
	assert_eq!(report.transformed, 1);
	assert_eq!(early_one, Some(Bytes::from_static(b"one1")));
	assert_eq!(store.get("a.One"), early_one);
	assert_eq!(store.get("a.Two"), early_two);
	for name in ["a.One", "a.Two"] {
		assert_eq!(engine.resolve(name, || store.get(name)).unwrap(), store.get(name), "{name}");
	}
}

#[test]
fn retrofit_failure_aborts_without_rearming() {
	let store = upstream();
	let engine = PipelineEngine::with_upstream(store.clone());
	engine
		.register("mark", Predicate::prefix("a."), append("+"))
		.unwrap();
	engine
		.register("boom", Predicate::exact("a.Two"), |_: &str, _: &Bytes| Err("truncated artifact".into()))
		.unwrap();
	engine.seal();

	let err = engine.retrofit().unwrap_err();
	assert_eq!(&*err.artifact, "a.Two");
	assert_eq!(&*err.transformer, "boom");
	assert!(engine.cached("a.Two").is_none());
	assert_eq!(store.get("a.Two"), Some(Bytes::from_static(b"two")));
	// Visited before the failure, so already written.
	assert_eq!(store.get("a.One"), Some(Bytes::from_static(b"one+")));

	assert!(engine.retrofit_applied());
	assert!(!engine.retrofit().unwrap().applied);
	assert_eq!(store.get("a.Two"), Some(Bytes::from_static(b"two")));
}

#[test]
fn concurrent_resolves_agree() {
	let engine = Arc::new(PipelineEngine::new());
	let calls = Arc::new(AtomicUsize::new(0));
	let counter = calls.clone();
	engine
		.register("tag", Predicate::all(), move |name: &str, bytes: &Bytes| {
			let n = counter.fetch_add(1, Ordering::SeqCst);
			let mut out = bytes.to_vec();
			out.extend_from_slice(format!("{name}#{n}").as_bytes());
			Ok(Some(out.into()))
		})
		.unwrap();
	engine.seal();

	let handles: Vec<_> = (0..8)
		.map(|_| {
			let engine = engine.clone();
			thread::spawn(move || engine.resolve("shared", base).unwrap())
		})
		.collect();
	let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

	let cached = engine.cached("shared").unwrap().into_bytes();
	assert!(results.iter().all(|r| r.as_ref() == Some(&cached)));
}
