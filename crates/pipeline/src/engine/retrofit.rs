//! One-time retrofit over artifacts produced before the pipeline attached.

use std::sync::atomic::Ordering;

use tracing::{debug, info};

use super::PipelineEngine;
use crate::{Resolution, TransformationFailure};

/// Outcome of [`PipelineEngine::retrofit`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetrofitReport {
	/// False when the pass was skipped (already applied, or the engine is inert).
	pub applied: bool,
	/// Upstream artifacts fed through the pipeline.
	pub examined: usize,
	/// Artifacts whose upstream bytes were replaced.
	pub transformed: usize,
}

impl PipelineEngine {
	/// Re-applies the pipeline to every upstream artifact, at most once.
	///
	/// Changed artifacts are written back to the upstream store and seeded into
	/// the resolution cache, so a later [`PipelineEngine::resolve`] returns the
	/// retrofitted bytes without recomputing. Names already in the cache are not
	/// recomputed; their cached bytes are written back instead, so upstream and
	/// `resolve` always agree. A transform failure aborts the pass;
	/// writes made before the failure remain, and the pass is not retried.
	pub fn retrofit(&self) -> Result<RetrofitReport, TransformationFailure> {
		if self.attach_failed() {
			debug!("skipping retrofit on inert pipeline");
			return Ok(RetrofitReport::default());
		}
		if self
			.retrofit_applied
			.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
			.is_err()
		{
			debug!("retrofit already applied");
			return Ok(RetrofitReport::default());
		}

		let mut report = RetrofitReport {
			applied: true,
			..RetrofitReport::default()
		};

		for (name, bytes) in self.upstream.snapshot() {
			report.examined += 1;
			// A name resolved before retrofit keeps its cached answer; upstream follows it.
			let settled = match self.cache.get(&name) {
				Some(hit) => hit,
				None => match self.apply_all(&name, &bytes)? {
					Some(rewritten) => self
						.cache
						.insert_first(&name, Resolution::Transformed(rewritten)),
					None => continue,
				},
			};
			if settled.bytes() == &bytes {
				continue;
			}
			self.upstream.write_back(&name, settled.into_bytes());
			report.transformed += 1;
		}

		info!(
			examined = report.examined,
			transformed = report.transformed,
			"retrofit applied to pre-existing artifacts"
		);
		Ok(report)
	}
}
