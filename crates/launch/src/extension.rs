//! Third-party registration entry points.

use splice_pipeline::{PipelineEngine, RegisterError};

/// A consumer that registers interceptors during startup.
pub trait ExtensionPoint {
	/// Stable identifier used in logs and errors.
	fn id(&self) -> &str;

	fn register(&self, engine: &PipelineEngine) -> Result<(), RegisterError>;
}

/// [`ExtensionPoint`] backed by a closure. See [`from_fn`].
pub struct FnExtension<F> {
	id: String,
	register: F,
}

/// Wraps `register` as an extension point named `id`.
pub fn from_fn<F>(id: impl Into<String>, register: F) -> FnExtension<F>
where
	F: Fn(&PipelineEngine) -> Result<(), RegisterError>,
{
	FnExtension {
		id: id.into(),
		register,
	}
}

impl<F> ExtensionPoint for FnExtension<F>
where
	F: Fn(&PipelineEngine) -> Result<(), RegisterError>,
{
	fn id(&self) -> &str {
		&self.id
	}

	fn register(&self, engine: &PipelineEngine) -> Result<(), RegisterError> {
		(self.register)(engine)
	}
}
