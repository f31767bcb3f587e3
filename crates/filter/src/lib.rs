//! Predicate algebra over artifact names.
//!
//! # Purpose
//!
//! Every interceptor in the pipeline is guarded by a [`Predicate`]: a pure, total
//! boolean test over an artifact name. This crate owns the leaf predicates, the
//! `and`/`or`/`negate` combinators, and the type-introspection collaborator that
//! reflective predicates consult.
//!
//! # Mental Model
//!
//! Predicates are built bottom-up at registration time and never mutated
//! afterwards. Composite nodes hold `Arc`s to their operands, so a predicate is a
//! tree (or a DAG when operands are shared) and cloning one is cheap.
//!
//! | Kind | Matches when |
//! |------|--------------|
//! | [`Predicate::Exact`] | the name equals the literal |
//! | [`Predicate::Prefix`] | the name starts with the literal |
//! | [`Predicate::Suffix`] | the name ends with the literal |
//! | [`Predicate::Contains`] | the literal occurs anywhere in the name |
//! | [`Predicate::Regex`] | the pattern matches the *whole* name |
//! | [`Predicate::Reflective`] | the resolved type satisfies an attribute/supertype query |
//! | [`Predicate::All`] / [`Predicate::Nothing`] | always / never |
//!
//! # Invariants
//!
//! - Evaluation never fails and never has side effects. A reflective predicate
//!   whose candidate cannot be resolved evaluates to `false`.
//! - Construction is where failures surface: malformed regexes yield
//!   [`FilterError::InvalidPattern`], wrong-kind reflective targets yield
//!   [`FilterError::InvalidFilterTarget`].

mod error;
mod introspect;
mod pattern;
mod predicate;

pub use error::FilterError;
pub use introspect::{InMemoryTypes, TypeDecl, TypeDescriptor, TypeIntrospector, TypeKind};
pub use pattern::{NamePattern, RegexFlags};
pub use predicate::{Predicate, Reflective, ReflectiveQuery};
