//! Host attachment and startup sequencing.
//!
//! # Purpose
//!
//! Takes over a host loader's native load stage, lets extension points register
//! interceptors, then seals the registry and retrofits whatever the host had
//! already produced.
//!
//! # Mental Model
//!
//! 1. **Handoff:** the [`Host`] surrenders its native [`LoadStage`] and the
//!    [`ArtifactStore`](splice_pipeline::ArtifactStore) it has filled so far.
//! 2. **Install:** a [`PipelineStage`] wrapping both replaces the native stage.
//! 3. **Register:** every [`ExtensionPoint`] runs once, in order.
//! 4. **Seal + retrofit:** registration closes, pre-existing artifacts are
//!    rewritten once.
//!
//! # Attachment Failure
//!
//! Under [`AttachPolicy::FailHard`](splice_config::AttachPolicy) a failed
//! handoff or install aborts the launch. Under `NonFailHard` the engine is marked
//! inert: extension points that try to register are skipped, retrofit does
//! nothing, and the host keeps loading through its native stage.
//!
//! - Enforced in: [`Launcher::launch`]
//! - Tested by: `tests/launch.rs`

mod error;
mod extension;
mod host;
mod launcher;
mod source;
mod stage;

pub use error::{AttachError, LaunchError};
pub use extension::{ExtensionPoint, FnExtension, from_fn};
pub use host::{Host, HostHandoff, LoadStage};
pub use launcher::{Launched, Launcher};
pub use source::{ArtifactSource, DirectorySource};
pub use stage::PipelineStage;
