//! Registration and transformation errors.

use std::fmt;
use std::sync::Arc;

use splice_filter::FilterError;
use thiserror::Error;

use crate::TransformError;

/// Why the registry refuses new entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrozenReason {
	/// [`crate::PipelineEngine::seal`] was called.
	Sealed,
	/// The pipeline never attached to the host and runs inert.
	AttachFailed,
}

impl fmt::Display for FrozenReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Sealed => f.write_str("registry is sealed"),
			Self::AttachFailed => f.write_str("pipeline failed to attach to the host"),
		}
	}
}

/// Registration failures. Local and recoverable.
#[derive(Debug, Error)]
pub enum RegisterError {
	#[error("interceptor name must not be empty")]
	EmptyName,

	#[error("interceptor {name:?} is already registered")]
	DuplicateName { name: Arc<str> },

	#[error("cannot register {name:?}: {reason}")]
	Frozen { name: Arc<str>, reason: FrozenReason },

	/// Predicate construction failed (malformed pattern or invalid reflective target).
	#[error(transparent)]
	Filter(#[from] FilterError),
}

impl RegisterError {
	/// Returns the freeze reason if this is a [`RegisterError::Frozen`].
	pub fn frozen_reason(&self) -> Option<FrozenReason> {
		match self {
			Self::Frozen { reason, .. } => Some(*reason),
			_ => None,
		}
	}
}

/// A matched transform failed. Never retried, never downgraded to "unmodified".
#[derive(Debug, Error)]
#[error("interceptor {transformer:?} failed while transforming {artifact:?}")]
pub struct TransformationFailure {
	pub artifact: Arc<str>,
	pub transformer: Arc<str>,
	#[source]
	pub source: TransformError,
}
