//! Startup sequencing: attach, register, seal, retrofit.

use std::path::Path;
use std::sync::Arc;

use splice_config::{AttachPolicy, SpliceConfig};
use splice_filter::Predicate;
use splice_pipeline::{FrozenReason, PipelineEngine, RetrofitReport};
use tracing::{error, info, warn};

use crate::{ArtifactSource, AttachError, ExtensionPoint, Host, LaunchError, PipelineStage};

/// Drives pipeline startup against a [`Host`].
pub struct Launcher {
	config: SpliceConfig,
	source: Option<Arc<dyn ArtifactSource>>,
}

/// A started pipeline.
pub struct Launched {
	pub engine: Arc<PipelineEngine>,
	/// True for names the pipeline may transform.
	pub exclusion: Predicate,
	/// False when attachment failed and the engine runs inert.
	pub attached: bool,
	pub retrofit: RetrofitReport,
}

impl Launcher {
	pub fn new(config: SpliceConfig) -> Self {
		Self { config, source: None }
	}

	/// Loads the configuration at `path`, writing defaults if it is missing.
	pub fn from_config_path(path: impl AsRef<Path>) -> Result<Self, LaunchError> {
		Ok(Self::new(SpliceConfig::load_or_init(path)?))
	}

	/// Fallback for originals the native stage does not produce.
	pub fn with_source(mut self, source: Arc<dyn ArtifactSource>) -> Self {
		self.source = Some(source);
		self
	}

	pub fn config(&self) -> &SpliceConfig {
		&self.config
	}

	/// Attaches to `host`, runs `extension_points` in order, seals the engine and
	/// retrofits artifacts the host produced before attachment.
	pub fn launch(&self, host: &dyn Host, extension_points: &[&dyn ExtensionPoint]) -> Result<Launched, LaunchError> {
		info!("starting pipeline launch");
		info!(
			exclusions = %self.config.exclusions().collect::<Vec<_>>().join(", "),
			"transformer exclusions"
		);
		let exclusion = self.config.exclusion_filter();

		let (engine, attached) = match self.attach(host, &exclusion) {
			Ok(engine) => (engine, true),
			Err((engine, err)) => match self.config.attach_policy() {
				AttachPolicy::FailHard => return Err(err.into()),
				AttachPolicy::NonFailHard => {
					error!(error = %err, "cannot attach to host, continuing without transformation");
					engine.mark_attach_failed();
					(engine, false)
				}
			},
		};

		info!(count = extension_points.len(), "calling extension points");
		for point in extension_points {
			info!(extension = point.id(), "registering extension point");
			match point.register(&engine) {
				Ok(()) => {}
				Err(source) if source.frozen_reason() == Some(FrozenReason::AttachFailed) => {
					warn!(extension = point.id(), "extension point skipped, pipeline is inert");
				}
				Err(source) => {
					return Err(LaunchError::Registration {
						extension: point.id().to_string(),
						source,
					});
				}
			}
		}

		engine.seal();
		let retrofit = engine.retrofit()?;
		info!(attached, interceptors = engine.len(), "pipeline launch finished");

		Ok(Launched {
			engine,
			exclusion,
			attached,
			retrofit,
		})
	}

	/// Builds the engine over the host's prior state and installs the pipeline
	/// stage. On failure the engine is still returned so it can run inert.
	fn attach(
		&self,
		host: &dyn Host,
		exclusion: &Predicate,
	) -> Result<Arc<PipelineEngine>, (Arc<PipelineEngine>, AttachError)> {
		let handoff = match host.handoff() {
			Ok(handoff) => handoff,
			Err(err) => return Err((Arc::new(PipelineEngine::new()), err)),
		};

		let engine = Arc::new(PipelineEngine::with_upstream(handoff.store));
		let stage = PipelineStage::new(engine.clone(), exclusion.clone(), handoff.stage, self.source.clone());
		match host.install(Arc::new(stage)) {
			Ok(()) => {
				info!("pipeline stage installed");
				Ok(engine)
			}
			Err(err) => Err((engine, err)),
		}
	}
}
