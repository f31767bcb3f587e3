//! Interceptor entries and the transform contract.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use splice_filter::Predicate;

/// Error raised by a transform. Any error aborts the resolution it occurred in.
pub type TransformError = Box<dyn std::error::Error + Send + Sync>;

/// `Ok(None)` means the transform declined to change anything.
pub type TransformResult = Result<Option<Bytes>, TransformError>;

/// A rewrite of one artifact. Must be pure with respect to shared external state.
pub trait Transform: Send + Sync {
	fn transform(&self, name: &str, bytes: &Bytes) -> TransformResult;
}

impl<F> Transform for F
where
	F: Fn(&str, &Bytes) -> TransformResult + Send + Sync,
{
	fn transform(&self, name: &str, bytes: &Bytes) -> TransformResult {
		self(name, bytes)
	}
}

/// A registered `(name, predicate, transform)` triple. Immutable once registered.
pub struct Interceptor {
	name: Arc<str>,
	predicate: Predicate,
	transform: Arc<dyn Transform>,
	/// Registration ordinal; total order across all entries.
	seq: u64,
}

impl Interceptor {
	pub(crate) fn new(name: Arc<str>, predicate: Predicate, transform: Arc<dyn Transform>, seq: u64) -> Self {
		Self {
			name,
			predicate,
			transform,
			seq,
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub(crate) fn name_arc(&self) -> &Arc<str> {
		&self.name
	}

	pub fn predicate(&self) -> &Predicate {
		&self.predicate
	}

	/// Position in registration order.
	pub fn seq(&self) -> u64 {
		self.seq
	}

	#[inline]
	pub fn matches(&self, name: &str) -> bool {
		self.predicate.evaluate(name)
	}

	#[inline]
	pub(crate) fn apply(&self, name: &str, bytes: &Bytes) -> TransformResult {
		self.transform.transform(name, bytes)
	}
}

impl fmt::Debug for Interceptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Interceptor")
			.field("name", &self.name)
			.field("predicate", &format_args!("{}", self.predicate))
			.field("seq", &self.seq)
			.finish_non_exhaustive()
	}
}
