//! Dispatch index: interceptors bucketed by predicate shape.
//!
//! # Role
//!
//! Answers "which interceptors match this name, in application order" without
//! evaluating every predicate. Exact, prefix and suffix predicates are looked up
//! by literal; only the residual bucket is scanned.
//!
//! # Invariants
//!
//! - The index is purely an optimization: [`DispatchIndex::matches`] equals the
//!   brute-force filter of [`DispatchIndex::entries`] by direct evaluation,
//!   stably partitioned by [`Category`].
//!   - Tested by: `index::tests::prop_index_matches_brute_force`

use std::iter;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use splice_filter::Predicate;

use crate::Interceptor;

type Buckets = FxHashMap<Arc<str>, Vec<Arc<Interceptor>>>;

/// Application category. Categories apply in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
	Exact,
	Prefix,
	Suffix,
	/// Contains, regex, reflective, composite, `All` and `Nothing`.
	Residual,
}

impl Category {
	/// Classifies a predicate by its top-level shape.
	pub fn of(predicate: &Predicate) -> Self {
		match predicate {
			Predicate::Exact(_) => Self::Exact,
			Predicate::Prefix(_) => Self::Prefix,
			Predicate::Suffix(_) => Self::Suffix,
			_ => Self::Residual,
		}
	}
}

/// Derived, rebuildable lookup structure over the registered interceptors.
#[derive(Debug, Clone, Default)]
pub struct DispatchIndex {
	exact: Buckets,
	prefix: Buckets,
	suffix: Buckets,
	residual: Vec<Arc<Interceptor>>,
	/// Every entry in registration order.
	entries: Vec<Arc<Interceptor>>,
}

impl DispatchIndex {
	pub fn new() -> Self {
		Self::default()
	}

	/// Rebuilds an index from entries given in registration order.
	pub fn from_entries(entries: impl IntoIterator<Item = Arc<Interceptor>>) -> Self {
		let mut index = Self::new();
		for entry in entries {
			index.insert(entry);
		}
		index
	}

	/// Appends an entry. Entries must arrive in increasing `seq` order.
	pub fn insert(&mut self, entry: Arc<Interceptor>) {
		debug_assert!(
			self.entries.last().is_none_or(|last| last.seq() < entry.seq()),
			"interceptors must be inserted in registration order"
		);
		match entry.predicate() {
			Predicate::Exact(lit) => push_bucket(&mut self.exact, lit, &entry),
			Predicate::Prefix(lit) => push_bucket(&mut self.prefix, lit, &entry),
			Predicate::Suffix(lit) => push_bucket(&mut self.suffix, lit, &entry),
			_ => self.residual.push(entry.clone()),
		}
		self.entries.push(entry);
	}

	/// Returns every entry in registration order.
	pub fn entries(&self) -> &[Arc<Interceptor>] {
		&self.entries
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Returns the entries matching `name` in application order.
	pub fn matches(&self, name: &str) -> Vec<&Arc<Interceptor>> {
		let mut out = Vec::new();

		if let Some(bucket) = self.exact.get(name) {
			out.extend(bucket.iter());
		}

		// Every prefix/suffix of `name` that is a key selects a bucket. Buckets are
		// each in registration order; merging restores it across keys.
		let cuts = || name.char_indices().map(|(i, _)| i).chain(iter::once(name.len()));
		append_merged(&mut out, cuts().filter_map(|i| self.prefix.get(&name[..i])));
		append_merged(&mut out, cuts().filter_map(|i| self.suffix.get(&name[i..])));

		out.extend(self.residual.iter().filter(|e| e.matches(name)));
		out
	}

	/// Reference semantics for [`Self::matches`]: direct evaluation of every entry.
	pub fn matches_brute_force(&self, name: &str) -> Vec<&Arc<Interceptor>> {
		let mut hits: Vec<&Arc<Interceptor>> = self.entries.iter().filter(|e| e.matches(name)).collect();
		hits.sort_by_key(|e| Category::of(e.predicate()));
		hits
	}
}

fn push_bucket(buckets: &mut Buckets, key: &Arc<str>, entry: &Arc<Interceptor>) {
	buckets.entry(key.clone()).or_default().push(entry.clone());
}

fn append_merged<'a>(out: &mut Vec<&'a Arc<Interceptor>>, buckets: impl Iterator<Item = &'a Vec<Arc<Interceptor>>>) {
	let start = out.len();
	let mut bucket_count = 0;
	for bucket in buckets {
		out.extend(bucket.iter());
		bucket_count += 1;
	}
	if bucket_count > 1 {
		out[start..].sort_unstable_by_key(|e| e.seq());
	}
}

#[cfg(test)]
mod tests;
