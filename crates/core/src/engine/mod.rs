//! Bundle eligibility engine.
//!
//! Pure logic over an already built [`crate::catalog::Catalog`]: rule
//! predicates, rule dominance, per-bundle rule derivation, bundle validation
//! and selection. Nothing here performs I/O or holds state between calls.

pub mod advisor;
pub mod derive;
pub mod dominance;
pub mod relation;
pub mod select;
pub mod validate;

pub use advisor::{AdviceCheck, Answers, BundleAdvisor};
pub use derive::derive_rules;
pub use dominance::common_rule;
pub use relation::{correlates, is_violated_by, satisfies, satisfy_all};
pub use select::select_by;
pub use validate::{first_violation, is_valid_bundle, validate, BundleValidation, BundleViolation, Verbosity};

#[cfg(test)]
pub(crate) mod test_support;
