//! Pipeline engine: registration lifecycle, resolution and caching.
//!
//! # Role
//!
//! Owns the published [`DispatchIndex`], the [`ResolutionCache`] and the
//! lifecycle flags. One instance per host, passed by reference to whatever
//! startup code registers interceptors.
//!
//! # Invariants
//!
//! - Registration is refused once sealed or once attachment failed; refusal
//!   never mutates the entry list (see `tests::register_after_seal_is_refused`).
//! - A cached name never re-runs a transform (see `tests::resolve_is_idempotent`).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arc_swap::ArcSwap;
use bytes::Bytes;
use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use splice_filter::Predicate;
use tracing::{debug, info, trace, warn};

use crate::{
	ArtifactStore, DispatchIndex, FrozenReason, Interceptor, PatchedArtifacts, RegisterError, Resolution,
	ResolutionCache, Transform, TransformResult, TransformationFailure,
};

mod retrofit;

pub use retrofit::RetrofitReport;

/// Mutable registration state, guarded by the engine's registration lock.
#[derive(Default)]
struct Registrar {
	names: FxHashSet<Arc<str>>,
	index: DispatchIndex,
	next_seq: u64,
}

/// The interceptor registry plus its resolution cache.
pub struct PipelineEngine {
	registrar: Mutex<Registrar>,
	index: ArcSwap<DispatchIndex>,
	cache: ResolutionCache,
	upstream: Arc<dyn ArtifactStore>,
	sealed: AtomicBool,
	attach_failed: AtomicBool,
	retrofit_applied: AtomicBool,
}

impl Default for PipelineEngine {
	fn default() -> Self {
		Self::new()
	}
}

impl PipelineEngine {
	/// Creates an engine with no pre-existing upstream artifacts.
	pub fn new() -> Self {
		Self::with_upstream(Arc::new(PatchedArtifacts::new()))
	}

	/// Creates an engine over artifacts the host produced before attachment.
	/// Those artifacts are the input to [`Self::retrofit`].
	pub fn with_upstream(upstream: Arc<dyn ArtifactStore>) -> Self {
		Self {
			registrar: Mutex::new(Registrar::default()),
			index: ArcSwap::from_pointee(DispatchIndex::new()),
			cache: ResolutionCache::new(),
			upstream,
			sealed: AtomicBool::new(false),
			attach_failed: AtomicBool::new(false),
			retrofit_applied: AtomicBool::new(false),
		}
	}

	/// Registers a closure transform guarded by `predicate`.
	pub fn register<F>(&self, name: impl Into<Arc<str>>, predicate: Predicate, transform: F) -> Result<(), RegisterError>
	where
		F: Fn(&str, &Bytes) -> TransformResult + Send + Sync + 'static,
	{
		self.register_transform(name, predicate, Arc::new(transform))
	}

	/// Registers a shared transform guarded by `predicate`.
	///
	/// Fails with [`RegisterError::DuplicateName`] if `name` is taken and with
	/// [`RegisterError::Frozen`] once sealed or after a failed attachment.
	pub fn register_transform(
		&self,
		name: impl Into<Arc<str>>,
		predicate: Predicate,
		transform: Arc<dyn Transform>,
	) -> Result<(), RegisterError> {
		let name: Arc<str> = name.into();
		if name.is_empty() {
			return Err(RegisterError::EmptyName);
		}

		let mut reg = self.registrar.lock();

		if let Some(reason) = self.frozen_reason() {
			warn!(name = %name, %reason, "refusing interceptor registration");
			return Err(RegisterError::Frozen { name, reason });
		}
		if reg.names.contains(&name) {
			warn!(name = %name, "refusing duplicate interceptor name");
			return Err(RegisterError::DuplicateName { name });
		}

		if matches!(predicate, Predicate::All) {
			warn!(name = %name, "interceptor has no filter and applies to every artifact");
		}
		info!(name = %name, filter = %predicate, "registering interceptor");

		let seq = reg.next_seq;
		reg.next_seq += 1;
		reg.names.insert(name.clone());
		reg.index
			.insert(Arc::new(Interceptor::new(name, predicate, transform, seq)));
		self.index.store(Arc::new(reg.index.clone()));
		Ok(())
	}

	/// Closes registration permanently.
	pub fn seal(&self) {
		let reg = self.registrar.lock();
		if !self.sealed.swap(true, Ordering::AcqRel) {
			info!(entries = reg.index.len(), "interceptor registry sealed");
		}
	}

	/// Records that the host attachment failed under the non-fail-hard policy.
	/// The engine stays inert: registrations are refused and retrofit is skipped.
	pub fn mark_attach_failed(&self) {
		let _reg = self.registrar.lock();
		if !self.attach_failed.swap(true, Ordering::AcqRel) {
			warn!("pipeline marked inert after failed attachment");
		}
	}

	pub fn is_sealed(&self) -> bool {
		self.sealed.load(Ordering::Acquire)
	}

	pub fn attach_failed(&self) -> bool {
		self.attach_failed.load(Ordering::Acquire)
	}

	pub fn retrofit_applied(&self) -> bool {
		self.retrofit_applied.load(Ordering::Acquire)
	}

	fn frozen_reason(&self) -> Option<FrozenReason> {
		if self.attach_failed() {
			Some(FrozenReason::AttachFailed)
		} else if self.is_sealed() {
			Some(FrozenReason::Sealed)
		} else {
			None
		}
	}

	/// Returns the bytes to load for `name`.
	///
	/// Cached names answer immediately. Otherwise `fetch_original` supplies the
	/// current bytes; `None` from it yields `None` and nothing is cached. A
	/// failing transform aborts the resolution and nothing is cached.
	pub fn resolve<F>(&self, name: &str, fetch_original: F) -> Result<Option<Bytes>, TransformationFailure>
	where
		F: FnOnce() -> Option<Bytes>,
	{
		if let Some(hit) = self.cache.get(name) {
			trace!(name, modified = hit.is_modified(), "resolution cache hit");
			return Ok(Some(hit.into_bytes()));
		}

		let Some(original) = fetch_original() else {
			trace!(name, "no original bytes");
			return Ok(None);
		};

		let resolution = match self.apply_all(name, &original)? {
			Some(bytes) => {
				debug!(name, len = bytes.len(), "artifact transformed");
				Resolution::Transformed(bytes)
			}
			None => {
				debug!(name, "artifact unmodified");
				Resolution::Unmodified(original)
			}
		};
		Ok(Some(self.cache.insert_first(name, resolution).into_bytes()))
	}

	/// Feeds `bytes` through every matching interceptor in application order.
	///
	/// Returns `Some(final)` if any transform produced output, `None` if all of
	/// them declined. Does not touch the cache.
	pub fn apply_all(&self, name: &str, bytes: &Bytes) -> Result<Option<Bytes>, TransformationFailure> {
		// Transforms run arbitrary code; hold a full Arc rather than a guard.
		let index = self.index.load_full();
		let mut current = bytes.clone();
		let mut modified = false;

		for entry in index.matches(name) {
			match entry.apply(name, &current) {
				Ok(Some(next)) => {
					trace!(name, interceptor = entry.name(), "transform applied");
					current = next;
					modified = true;
				}
				Ok(None) => {}
				Err(source) => {
					return Err(TransformationFailure {
						artifact: Arc::from(name),
						transformer: entry.name_arc().clone(),
						source,
					});
				}
			}
		}

		Ok(modified.then_some(current))
	}

	/// Returns the cached resolution for `name`, if any.
	pub fn cached(&self, name: &str) -> Option<Resolution> {
		self.cache.get(name)
	}

	/// Names of the interceptors that would apply to `name`, in order.
	pub fn matching(&self, name: &str) -> Vec<Arc<str>> {
		self.index
			.load()
			.matches(name)
			.into_iter()
			.map(|e| e.name_arc().clone())
			.collect()
	}

	/// Names of all registered interceptors in registration order.
	pub fn entry_names(&self) -> Vec<Arc<str>> {
		self.index
			.load()
			.entries()
			.iter()
			.map(|e| e.name_arc().clone())
			.collect()
	}

	pub fn len(&self) -> usize {
		self.index.load().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

#[cfg(test)]
mod tests;
