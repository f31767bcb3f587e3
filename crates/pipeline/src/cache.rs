//! Resolution cache: the final answer for every resolved artifact.

use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Cached outcome of resolving one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
	/// No transform changed anything; holds the original bytes.
	Unmodified(Bytes),
	/// At least one transform produced output; holds the final bytes.
	Transformed(Bytes),
}

impl Resolution {
	/// Returns the bytes to load.
	pub fn bytes(&self) -> &Bytes {
		match self {
			Self::Unmodified(b) | Self::Transformed(b) => b,
		}
	}

	pub fn into_bytes(self) -> Bytes {
		match self {
			Self::Unmodified(b) | Self::Transformed(b) => b,
		}
	}

	pub fn is_modified(&self) -> bool {
		matches!(self, Self::Transformed(_))
	}
}

/// Write-once map from artifact name to [`Resolution`].
#[derive(Debug, Default)]
pub struct ResolutionCache {
	map: RwLock<FxHashMap<Arc<str>, Resolution>>,
}

impl ResolutionCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, name: &str) -> Option<Resolution> {
		self.map.read().get(name).cloned()
	}

	/// Stores `resolution` unless `name` already has one, and returns whichever
	/// value is now cached. Racing writers all observe the winner.
	pub fn insert_first(&self, name: &str, resolution: Resolution) -> Resolution {
		let mut map = self.map.write();
		if let Some(existing) = map.get(name) {
			return existing.clone();
		}
		map.insert(Arc::from(name), resolution.clone());
		resolution
	}

	pub fn len(&self) -> usize {
		self.map.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.map.read().is_empty()
	}
}
