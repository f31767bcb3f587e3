//! Upstream artifact store: what the host produced before the pipeline attached.

use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Artifacts a preceding loading phase already produced, handed to the engine at
/// construction so retrofit can rewrite them in place.
pub trait ArtifactStore: Send + Sync {
	/// Returns every `(name, bytes)` pair currently held.
	fn snapshot(&self) -> Vec<(Arc<str>, Bytes)>;

	/// Replaces the bytes stored for `name`.
	fn write_back(&self, name: &str, bytes: Bytes);
}

/// In-memory [`ArtifactStore`].
#[derive(Debug, Default)]
pub struct PatchedArtifacts {
	map: RwLock<FxHashMap<Arc<str>, Bytes>>,
}

impl PatchedArtifacts {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&self, name: impl Into<Arc<str>>, bytes: impl Into<Bytes>) {
		self.map.write().insert(name.into(), bytes.into());
	}

	pub fn get(&self, name: &str) -> Option<Bytes> {
		self.map.read().get(name).cloned()
	}

	pub fn len(&self) -> usize {
		self.map.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.map.read().is_empty()
	}
}

impl<N, B> FromIterator<(N, B)> for PatchedArtifacts
where
	N: Into<Arc<str>>,
	B: Into<Bytes>,
{
	fn from_iter<I: IntoIterator<Item = (N, B)>>(iter: I) -> Self {
		let map = iter
			.into_iter()
			.map(|(name, bytes)| (name.into(), bytes.into()))
			.collect();
		Self { map: RwLock::new(map) }
	}
}

impl ArtifactStore for PatchedArtifacts {
	/// Sorted by name so retrofit visits artifacts deterministically.
	fn snapshot(&self) -> Vec<(Arc<str>, Bytes)> {
		let mut all: Vec<_> = self
			.map
			.read()
			.iter()
			.map(|(name, bytes)| (name.clone(), bytes.clone()))
			.collect();
		all.sort_unstable_by(|a, b| a.0.cmp(&b.0));
		all
	}

	fn write_back(&self, name: &str, bytes: Bytes) {
		self.map.write().insert(Arc::from(name), bytes);
	}
}
