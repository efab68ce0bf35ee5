//! Picking the strongest of several same-category rules.

use std::cmp::Ordering;

use crate::catalog::{Catalog, Rule};

/// The dominant rule of a group.
///
/// Expects same-category rules that do not collide; neither property is
/// re-checked, and the answer for colliding input is arbitrary. Exact rules
/// beat floors, and among rules of one engagement the highest precedence
/// wins. Ties keep the earliest rule. Returns `None` for an empty group.
pub fn common_rule<'r>(catalog: &Catalog, rules: &[&'r Rule]) -> Option<&'r Rule> {
    rules
        .iter()
        .copied()
        .min_by(|a, b| dominance_order(catalog, a, b))
}

fn dominance_order(catalog: &Catalog, a: &Rule, b: &Rule) -> Ordering {
    let precedence = |r: &Rule| catalog.constraint(r.constraint).precedence;
    a.engagement
        .cmp(&b.engagement)
        .then_with(|| precedence(b).cmp(&precedence(a)))
}
