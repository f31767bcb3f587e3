//! Error types for host attachment and launch.

use std::borrow::Cow;

use splice_config::ConfigError;
use splice_pipeline::{RegisterError, TransformationFailure};
use thiserror::Error;

/// The host refused or could not complete the hand-off.
#[derive(Debug, Error)]
#[error("cannot attach to host: {reason}")]
pub struct AttachError {
	reason: Cow<'static, str>,
	#[source]
	source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AttachError {
	pub fn new(reason: impl Into<Cow<'static, str>>) -> Self {
		Self {
			reason: reason.into(),
			source: None,
		}
	}

	/// Attaches the underlying cause.
	pub fn with_source(mut self, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
		self.source = Some(source.into());
		self
	}

	pub fn reason(&self) -> &str {
		&self.reason
	}
}

/// Startup failures surfaced by [`crate::Launcher`].
#[derive(Debug, Error)]
pub enum LaunchError {
	/// Attachment failed under the fail-hard policy.
	#[error(transparent)]
	Attach(#[from] AttachError),

	/// An extension point failed to register its interceptors.
	#[error("extension point {extension:?} failed to register")]
	Registration {
		extension: String,
		#[source]
		source: RegisterError,
	},

	/// A transform failed while retrofitting pre-existing artifacts.
	#[error("retrofit aborted")]
	Retrofit(#[from] TransformationFailure),

	#[error(transparent)]
	Config(#[from] ConfigError),
}
