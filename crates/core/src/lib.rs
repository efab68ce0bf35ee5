//! `vbank-core`: bundle eligibility engine for the Virtual Bank product
//! advisor.
//!
//! The crate has no I/O beyond reading a catalog document the caller points
//! at. [`catalog`] holds the data model and how it is built or loaded;
//! [`engine`] holds the rule predicates, dominance, derivation, validation
//! and selection logic, plus the [`engine::BundleAdvisor`] facade.

pub mod catalog;
pub mod engine;
pub mod error;
pub mod types;
