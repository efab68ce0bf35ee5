//! Incremental construction of a [`Catalog`].
//!
//! Ids are assigned from the builder's own tables (an id is the position of
//! the entity in its table), so no counter outlives the builder. All
//! invariants are checked once, in [`CatalogBuilder::build`].

use std::collections::{HashMap, HashSet};

use crate::error::CoreError;
use crate::types::{BundleId, CategoryId, ConstraintId, ProductId, RuleId};

use super::model::{Bundle, Category, CategoryKind, Constraint, Engagement, ItemRef, Product, Rule};
use super::Catalog;

#[derive(Debug, Default)]
pub struct CatalogBuilder {
    categories: Vec<Category>,
    constraints: Vec<Constraint>,
    products: Vec<Product>,
    rules: Vec<Rule>,
    default_rules: Vec<Rule>,
    bundles: Vec<Bundle>,
    memberships: Vec<(BundleId, ProductId)>,
    next_rule: u32,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(&mut self, description: impl Into<String>, kind: CategoryKind) -> CategoryId {
        let id = CategoryId(self.categories.len() as u32);
        self.categories.push(Category {
            id,
            description: description.into(),
            kind,
            items: Vec::new(),
        });
        id
    }

    pub fn constraint(
        &mut self,
        category: CategoryId,
        name: impl Into<String>,
        precedence: u32,
    ) -> ConstraintId {
        let id = ConstraintId(self.constraints.len() as u32);
        self.constraints.push(Constraint {
            id,
            category,
            name: name.into(),
            precedence,
        });
        if let Some(owner) = self.categories.get_mut(category.0 as usize) {
            owner.items.push(ItemRef::Constraint(id));
        }
        id
    }

    pub fn product(&mut self, category: CategoryId, name: impl Into<String>) -> ProductId {
        let id = ProductId(self.products.len() as u32);
        self.products.push(Product {
            id,
            category,
            name: name.into(),
            bound_to: None,
        });
        if let Some(owner) = self.categories.get_mut(category.0 as usize) {
            owner.items.push(ItemRef::Product(id));
        }
        id
    }

    /// Declare the products `product` depends on, by name.
    pub fn bound_to<S: AsRef<str>>(&mut self, product: ProductId, names: &[S]) {
        let joined = names
            .iter()
            .map(|s| s.as_ref())
            .collect::<Vec<&str>>()
            .join(";");
        if let Some(p) = self.products.get_mut(product.0 as usize) {
            p.bound_to = Some(joined).filter(|s| !s.is_empty());
        }
    }

    pub fn rule(
        &mut self,
        product: ProductId,
        constraint: ConstraintId,
        engagement: Engagement,
    ) -> RuleId {
        let id = self.next_rule_id();
        self.rules.push(Rule {
            id,
            engagement,
            constraint,
            product: Some(product),
        });
        id
    }

    /// Fallback rule for a constraint category no bundle product addresses.
    pub fn default_rule(&mut self, constraint: ConstraintId, engagement: Engagement) -> RuleId {
        let id = self.next_rule_id();
        self.default_rules.push(Rule {
            id,
            engagement,
            constraint,
            product: None,
        });
        id
    }

    pub fn bundle(&mut self, name: impl Into<String>, priority: i32) -> BundleId {
        let id = BundleId(self.bundles.len() as u32);
        self.bundles.push(Bundle {
            id: Some(id),
            name: name.into(),
            priority,
            products: Vec::new(),
        });
        id
    }

    pub fn add_to_bundle(&mut self, bundle: BundleId, product: ProductId) {
        if let Some(b) = self.bundles.get_mut(bundle.0 as usize) {
            b.products.push(product);
            self.memberships.push((bundle, product));
        }
    }

    fn next_rule_id(&mut self) -> RuleId {
        let id = RuleId(self.next_rule);
        self.next_rule += 1;
        id
    }

    // -----------------------------------------------------------------------
    // Build
    // -----------------------------------------------------------------------

    /// Check every catalog invariant and freeze the tables.
    pub fn build(self) -> Result<Catalog, CoreError> {
        self.check_categories()?;
        self.check_constraints()?;
        self.check_rules()?;
        self.check_default_rules()?;
        self.check_bundles()?;

        tracing::debug!(
            categories = self.categories.len(),
            products = self.products.len(),
            rules = self.rules.len(),
            bundles = self.bundles.len(),
            "Catalog built"
        );

        Ok(Catalog {
            categories: self.categories,
            constraints: self.constraints,
            products: self.products,
            rules: self.rules,
            default_rules: self.default_rules,
            bundles: self.bundles,
            memberships: self.memberships,
        })
    }

    fn category_of_kind(&self, id: CategoryId, kind: CategoryKind) -> Option<&Category> {
        self.categories
            .get(id.0 as usize)
            .filter(|c| c.kind == kind)
    }

    fn check_categories(&self) -> Result<(), CoreError> {
        let mut seen = HashSet::new();
        for category in &self.categories {
            if !seen.insert((category.kind, category.description.as_str())) {
                return Err(invalid(format!(
                    "duplicate {} category '{}'",
                    category.kind.as_str(),
                    category.description
                )));
            }
            if category.kind == CategoryKind::Constraint && category.items.is_empty() {
                return Err(invalid(format!(
                    "constraint category '{}' has no constraints",
                    category.description
                )));
            }
        }
        Ok(())
    }

    fn check_constraints(&self) -> Result<(), CoreError> {
        let mut seen = HashSet::new();
        for constraint in &self.constraints {
            let category = self
                .category_of_kind(constraint.category, CategoryKind::Constraint)
                .ok_or_else(|| {
                    invalid(format!(
                        "constraint '{}' does not belong to a constraint category",
                        constraint.name
                    ))
                })?;
            if !seen.insert((constraint.category, constraint.precedence)) {
                return Err(invalid(format!(
                    "precedence {} is used twice in category '{}'",
                    constraint.precedence, category.description
                )));
            }
        }
        for product in &self.products {
            if self
                .category_of_kind(product.category, CategoryKind::Product)
                .is_none()
            {
                return Err(invalid(format!(
                    "product '{}' does not belong to a product category",
                    product.name
                )));
            }
        }
        Ok(())
    }

    fn check_rules(&self) -> Result<(), CoreError> {
        for rule in &self.rules {
            if self.constraints.get(rule.constraint.0 as usize).is_none() {
                return Err(invalid(format!(
                    "rule {} references unknown constraint {}",
                    rule.id, rule.constraint
                )));
            }
            let known_product = rule
                .product
                .is_some_and(|p| self.products.get(p.0 as usize).is_some());
            if !known_product {
                return Err(invalid(format!(
                    "rule {} is not owned by a known product",
                    rule.id
                )));
            }
        }
        Ok(())
    }

    fn check_default_rules(&self) -> Result<(), CoreError> {
        let mut per_category: HashMap<CategoryId, usize> = HashMap::new();
        for rule in &self.default_rules {
            let constraint = self
                .constraints
                .get(rule.constraint.0 as usize)
                .ok_or_else(|| {
                    invalid(format!(
                        "default rule {} references unknown constraint {}",
                        rule.id, rule.constraint
                    ))
                })?;
            *per_category.entry(constraint.category).or_default() += 1;
        }

        for category in &self.categories {
            if category.kind != CategoryKind::Constraint {
                continue;
            }
            match per_category.get(&category.id).copied().unwrap_or(0) {
                1 => {}
                0 => {
                    return Err(invalid(format!(
                        "constraint category '{}' has no default rule",
                        category.description
                    )))
                }
                n => {
                    return Err(invalid(format!(
                        "constraint category '{}' has {n} default rules",
                        category.description
                    )))
                }
            }
        }
        Ok(())
    }

    fn check_bundles(&self) -> Result<(), CoreError> {
        for (bundle, product) in &self.memberships {
            if self.products.get(product.0 as usize).is_none() {
                let name = &self.bundles[bundle.0 as usize].name;
                return Err(invalid(format!(
                    "bundle '{name}' references unknown product {product}"
                )));
            }
        }
        Ok(())
    }
}

fn invalid(message: String) -> CoreError {
    CoreError::InvalidCatalog(message)
}
