//! Collaborator seams between the pipeline and the host loader.

use std::sync::Arc;

use bytes::Bytes;
use splice_pipeline::{ArtifactStore, TransformationFailure};

use crate::AttachError;

/// The host's step that turns an artifact name into loadable bytes.
pub trait LoadStage: Send + Sync {
	/// `Ok(None)` means the stage has no bytes for `name`.
	fn load(&self, name: &str) -> Result<Option<Bytes>, TransformationFailure>;
}

/// What the host hands over when the pipeline takes its place.
pub struct HostHandoff {
	/// The stage the pipeline replaces; still consulted for original bytes.
	pub stage: Arc<dyn LoadStage>,
	/// Artifacts the native stage already produced. Input to retrofit.
	pub store: Arc<dyn ArtifactStore>,
}

/// A host loader the pipeline can attach to.
pub trait Host {
	/// Surrenders the native stage and its prior state.
	fn handoff(&self) -> Result<HostHandoff, AttachError>;

	/// Installs `stage` in place of the native one.
	fn install(&self, stage: Arc<dyn LoadStage>) -> Result<(), AttachError>;
}
