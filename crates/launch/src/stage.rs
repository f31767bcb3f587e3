//! The load stage installed in the host in place of its native one.

use std::sync::Arc;

use bytes::Bytes;
use splice_filter::Predicate;
use splice_pipeline::{PipelineEngine, TransformationFailure};
use tracing::trace;

use crate::{ArtifactSource, LoadStage};

/// Routes host load requests through the [`PipelineEngine`].
///
/// Excluded names go straight to the native stage. Everything else is resolved
/// by the engine, which fetches originals from the native stage and falls back
/// to the [`ArtifactSource`] when the native stage has nothing.
pub struct PipelineStage {
	engine: Arc<PipelineEngine>,
	exclusion: Predicate,
	native: Arc<dyn LoadStage>,
	source: Option<Arc<dyn ArtifactSource>>,
}

impl PipelineStage {
	/// `exclusion` is true for names the pipeline may transform.
	pub fn new(
		engine: Arc<PipelineEngine>,
		exclusion: Predicate,
		native: Arc<dyn LoadStage>,
		source: Option<Arc<dyn ArtifactSource>>,
	) -> Self {
		Self {
			engine,
			exclusion,
			native,
			source,
		}
	}

	pub fn engine(&self) -> &Arc<PipelineEngine> {
		&self.engine
	}
}

impl LoadStage for PipelineStage {
	fn load(&self, name: &str) -> Result<Option<Bytes>, TransformationFailure> {
		if !self.exclusion.evaluate(name) {
			trace!(name, "excluded from transformation");
			return self.native.load(name);
		}

		let mut native_failure = None;
		let resolved = self.engine.resolve(name, || match self.native.load(name) {
			Ok(Some(bytes)) => Some(bytes),
			Ok(None) => self.source.as_ref().and_then(|source| source.read(name)),
			Err(failure) => {
				native_failure = Some(failure);
				None
			}
		})?;

		match native_failure {
			Some(failure) => Err(failure),
			None => Ok(resolved),
		}
	}
}
