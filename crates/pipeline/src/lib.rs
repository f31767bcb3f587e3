#![cfg_attr(doc, allow(rustdoc::private_intra_doc_links))]
//! Load-time artifact transformation pipeline.
//!
//! # Purpose
//!
//! Consumers register named interceptors, each guarded by a [`Predicate`] over
//! artifact names. When the host asks for the bytes of an artifact, the
//! [`PipelineEngine`] runs every matching interceptor in a fixed order, caches the
//! answer, and hands back the same answer for every later request.
//!
//! # Mental Model
//!
//! 1. **Registration:** [`PipelineEngine::register`] appends an [`Interceptor`] and
//!    classifies it into the [`DispatchIndex`] by predicate shape.
//! 2. **Seal:** [`PipelineEngine::seal`] closes registration for good.
//! 3. **Retrofit:** [`PipelineEngine::retrofit`] runs once over artifacts the host
//!    produced before the pipeline attached, writing results back upstream.
//! 4. **Resolution:** [`PipelineEngine::resolve`] answers load requests, consulting
//!    the [`ResolutionCache`] first.
//!
//! # Application Order
//!
//! Matches are applied by category, then by registration order within a
//! category: exact → prefix → suffix → residual. Each transform sees the most
//! recently modified bytes; a transform returning `None` leaves them unchanged.
//!
//! - Enforced in: [`crate::index::DispatchIndex::matches`]
//! - Tested by: `index::tests::prop_index_matches_brute_force`
//! - Failure symptom: composed transforms produce different bytes than expected.
//!
//! # Concurrency
//!
//! - **Reads:** the dispatch index is published through `ArcSwap`; resolution
//!   never takes the registration lock.
//! - **Writes:** registration, sealing and attach-failure marking serialize on a
//!   single mutex.
//! - **Cache:** transforms run outside the cache lock. The first stored result for
//!   a name wins and every concurrent caller returns that stored result.
//!
//! # Invariants
//!
//! - `resolve` is idempotent: a cached name never re-runs a transform.
//!   - Tested by: `engine::tests::resolve_is_idempotent`
//! - Registration after seal fails and leaves the entry list untouched.
//!   - Tested by: `engine::tests::register_after_seal_is_refused`
//! - Retrofit runs at most once.
//!   - Tested by: `engine::tests::retrofit_runs_once`
//! - A failing transform aborts the whole resolution and nothing is cached.
//!   - Tested by: `engine::tests::transform_failure_is_not_cached`

mod cache;
mod engine;
mod entry;
mod error;
mod index;
mod store;

pub use bytes::Bytes;
pub use cache::{Resolution, ResolutionCache};
pub use engine::{PipelineEngine, RetrofitReport};
pub use entry::{Interceptor, Transform, TransformError, TransformResult};
pub use error::{FrozenReason, RegisterError, TransformationFailure};
pub use index::{Category, DispatchIndex};
pub use splice_filter::Predicate;
pub use store::{ArtifactStore, PatchedArtifacts};
