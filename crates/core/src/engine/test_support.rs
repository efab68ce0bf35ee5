//! Shared fixtures for engine tests.

use crate::catalog::seed::virtual_bank;
use crate::catalog::{Catalog, CategoryKind, Constraint, Engagement, Product, Rule};
use crate::types::RuleId;

pub fn seed() -> Catalog {
    virtual_bank().expect("seed catalog should build")
}

/// Constraints of the named constraint category, ordered by precedence.
pub fn constraints<'c>(catalog: &'c Catalog, category: &str) -> Vec<&'c Constraint> {
    let category = catalog
        .find_category(CategoryKind::Constraint, category)
        .expect("constraint category should exist");
    let mut found: Vec<&Constraint> = catalog.constraints_of(category.id).collect();
    found.sort_by_key(|c| c.precedence);
    found
}

/// A free-standing rule against `constraint`, owned by no product.
pub fn rule(constraint: &Constraint, engagement: Engagement) -> Rule {
    Rule {
        id: RuleId(u32::MAX),
        engagement,
        constraint: constraint.id,
        product: None,
    }
}

pub fn product<'c>(catalog: &'c Catalog, name: &str) -> &'c Product {
    catalog
        .find_product_by_name(name)
        .expect("product should exist")
}
