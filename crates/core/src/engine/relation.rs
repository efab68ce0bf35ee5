//! Applicability and violation tests between a constraint and a rule.

use crate::catalog::{Catalog, Constraint, Engagement, Rule};

/// Whether `rule` speaks about the category `constraint` belongs to.
pub fn correlates(catalog: &Catalog, rule: &Rule, constraint: &Constraint) -> bool {
    catalog.constraint(rule.constraint).category == constraint.category
}

/// Whether answering `constraint` breaks `rule`.
///
/// Only meaningful when [`correlates`] holds for the pair.
pub fn is_violated_by(catalog: &Catalog, rule: &Rule, constraint: &Constraint) -> bool {
    let required = catalog.constraint(rule.constraint).precedence;
    match rule.engagement {
        Engagement::Exact => constraint.precedence != required,
        // The rule sets a floor.
        Engagement::IncludingAbove => constraint.precedence < required,
    }
}

/// No rule both correlates with and is violated by `constraint`.
pub fn satisfies(catalog: &Catalog, constraint: &Constraint, rules: &[&Rule]) -> bool {
    !rules
        .iter()
        .any(|rule| correlates(catalog, rule, constraint) && is_violated_by(catalog, rule, constraint))
}

/// Every constraint satisfies `rules`.
///
/// Rules whose category has no matching constraint are never consulted.
pub fn satisfy_all(catalog: &Catalog, constraints: &[&Constraint], rules: &[&Rule]) -> bool {
    constraints
        .iter()
        .all(|constraint| satisfies(catalog, constraint, rules))
}
