//! Aggregate eligibility of a bundle: one effective rule per constraint
//! category.

use std::collections::BTreeMap;

use crate::catalog::{Bundle, Catalog, Rule};
use crate::types::CategoryId;

use super::dominance::common_rule;

/// Group rules by the category of their constraint, ordered by category id.
pub(crate) fn group_by_category<'r>(
    catalog: &Catalog,
    rules: impl IntoIterator<Item = &'r Rule>,
) -> BTreeMap<CategoryId, Vec<&'r Rule>> {
    let mut groups: BTreeMap<CategoryId, Vec<&'r Rule>> = BTreeMap::new();
    for rule in rules {
        let category = catalog.constraint(rule.constraint).category;
        groups.entry(category).or_default().push(rule);
    }
    groups
}

/// Rules owned by the bundle's products, in product order.
pub(crate) fn bundle_rules<'c>(
    catalog: &'c Catalog,
    bundle: &Bundle,
) -> impl Iterator<Item = &'c Rule> + 'c {
    let products = bundle.products.clone();
    products
        .into_iter()
        .flat_map(move |product| catalog.rules_of(product))
}

/// The bundle's effective rules.
///
/// Expects a bundle whose products do not collide (see
/// [`super::validate::first_violation`]). Each category addressed by a
/// product contributes its dominant rule; every other category falls back
/// to its default rule. The result holds at most one rule per category,
/// ordered by category id, and does not depend on product order.
pub fn derive_rules<'c>(
    catalog: &'c Catalog,
    bundle: &Bundle,
    default_rules: &'c [Rule],
) -> Vec<&'c Rule> {
    let groups = group_by_category(catalog, bundle_rules(catalog, bundle));

    let mut derived: BTreeMap<CategoryId, &'c Rule> = groups
        .iter()
        .filter_map(|(category, rules)| common_rule(catalog, rules).map(|r| (*category, r)))
        .collect();

    for rule in default_rules {
        let category = catalog.constraint(rule.constraint).category;
        derived.entry(category).or_insert(rule);
    }

    derived.into_values().collect()
}
