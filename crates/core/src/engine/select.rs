//! Filtering bundles by a concrete answer set.

use std::collections::HashSet;

use crate::catalog::{Bundle, Catalog, Constraint, Rule};
use crate::error::CoreError;

use super::derive::derive_rules;
use super::relation::satisfy_all;

/// Bundles whose derived rules every constraint satisfies, in input order.
///
/// `constraints` must be non-empty and hold at most one constraint per
/// category. Ranking the result is left to the caller.
pub fn select_by<'b>(
    catalog: &Catalog,
    bundles: &'b [Bundle],
    default_rules: &[Rule],
    constraints: &[&Constraint],
) -> Result<Vec<&'b Bundle>, CoreError> {
    check_constraints(catalog, constraints)?;

    let selected: Vec<&Bundle> = bundles
        .iter()
        .filter(|bundle| {
            let rules = derive_rules(catalog, bundle, default_rules);
            satisfy_all(catalog, constraints, &rules)
        })
        .collect();

    tracing::debug!(
        constraints = constraints.len(),
        candidates = bundles.len(),
        selected = selected.len(),
        "Bundles selected"
    );

    Ok(selected)
}

fn check_constraints(catalog: &Catalog, constraints: &[&Constraint]) -> Result<(), CoreError> {
    if constraints.is_empty() {
        return Err(CoreError::EmptyConstraints);
    }
    let mut seen = HashSet::new();
    for constraint in constraints {
        if !seen.insert(constraint.category) {
            return Err(CoreError::DuplicateCategory {
                category: catalog.category(constraint.category).description.clone(),
            });
        }
    }
    Ok(())
}
