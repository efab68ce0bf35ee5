//! The product catalog: an immutable arena of categories, constraints,
//! products, rules and bundles.
//!
//! Every entity lives in its own id-indexed table. Relationships are stored
//! as ids (rule → constraint, rule → product) or as an explicit
//! (bundle, product) membership table, and are looked up rather than
//! traversed. A [`Catalog`] is produced once by [`CatalogBuilder`] and is
//! read-only afterwards, so it can be shared behind an `Arc` freely.

pub mod builder;
pub mod document;
pub mod model;
pub mod seed;
pub mod state;

use serde::Serialize;

use crate::error::CoreError;
use crate::types::{BundleId, CategoryId, ConstraintId, ProductId};

pub use builder::CatalogBuilder;
pub use model::{
    Bundle, Category, CategoryKind, Constraint, Engagement, ItemRef, Product, Rule,
    ACCOUNT_CATEGORY,
};

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// One possible answer to a [`Question`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    pub precedence: u32,
    pub text: String,
}

/// A constraint category presented as a question with its possible answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub category: String,
    /// Ordered by ascending precedence.
    pub possible_answers: Vec<Answer>,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Catalog {
    pub(crate) categories: Vec<Category>,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) products: Vec<Product>,
    pub(crate) rules: Vec<Rule>,
    pub(crate) default_rules: Vec<Rule>,
    pub(crate) bundles: Vec<Bundle>,
    /// (bundle, product) pairs in insertion order.
    pub(crate) memberships: Vec<(BundleId, ProductId)>,
}

impl Catalog {
    pub fn category(&self, id: CategoryId) -> &Category {
        &self.categories[id.0 as usize]
    }

    pub fn constraint(&self, id: ConstraintId) -> &Constraint {
        &self.constraints[id.0 as usize]
    }

    pub fn product(&self, id: ProductId) -> &Product {
        &self.products[id.0 as usize]
    }

    /// Look up a product by an id that did not necessarily come from this
    /// catalog.
    pub fn find_product(&self, id: ProductId) -> Option<&Product> {
        self.products.get(id.0 as usize)
    }

    pub fn find_product_by_name(&self, name: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.name == name)
    }

    /// Look up a category of the given kind by its description.
    pub fn find_category(&self, kind: CategoryKind, description: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|c| c.kind == kind && c.description == description)
    }

    /// Constraint categories in insertion order.
    pub fn constraint_categories(&self) -> impl Iterator<Item = &Category> {
        self.categories
            .iter()
            .filter(|c| c.kind == CategoryKind::Constraint)
    }

    /// Product categories in insertion order.
    pub fn product_categories(&self) -> impl Iterator<Item = &Category> {
        self.categories
            .iter()
            .filter(|c| c.kind == CategoryKind::Product)
    }

    /// Constraints owned by `category`, in insertion order.
    pub fn constraints_of(&self, category: CategoryId) -> impl Iterator<Item = &Constraint> {
        self.category(category).items.iter().filter_map(move |item| match item {
            ItemRef::Constraint(id) => Some(self.constraint(*id)),
            ItemRef::Product(_) => None,
        })
    }

    /// Products owned by `category`, in insertion order.
    pub fn products_of(&self, category: CategoryId) -> impl Iterator<Item = &Product> {
        self.category(category).items.iter().filter_map(move |item| match item {
            ItemRef::Product(id) => Some(self.product(*id)),
            ItemRef::Constraint(_) => None,
        })
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Rules owned by `product`.
    pub fn rules_of(&self, product: ProductId) -> impl Iterator<Item = &Rule> {
        self.rules
            .iter()
            .filter(move |r| r.product == Some(product))
    }

    /// One rule per constraint category, used where a bundle says nothing.
    pub fn default_rules(&self) -> &[Rule] {
        &self.default_rules
    }

    pub fn bundles(&self) -> &[Bundle] {
        &self.bundles
    }

    pub fn bundle(&self, id: BundleId) -> &Bundle {
        &self.bundles[id.0 as usize]
    }

    /// Bundles that include `product`.
    pub fn bundles_of(&self, product: ProductId) -> impl Iterator<Item = &Bundle> {
        self.memberships
            .iter()
            .filter(move |(_, p)| *p == product)
            .map(move |(b, _)| self.bundle(*b))
    }

    /// Category a constraint belongs to.
    pub fn category_of_constraint(&self, id: ConstraintId) -> &Category {
        self.category(self.constraint(id).category)
    }

    /// Resolve the constraint of `category` with the given precedence.
    ///
    /// Negative or unknown precedences fail with a message describing the
    /// valid range.
    pub fn constraint_at(
        &self,
        category: CategoryId,
        precedence: i64,
    ) -> Result<&Constraint, CoreError> {
        let found = u32::try_from(precedence).ok().and_then(|p| {
            self.constraints_of(category)
                .find(|c| c.precedence == p)
        });
        if let Some(constraint) = found {
            return Ok(constraint);
        }

        let description = &self.category(category).description;
        let values: Vec<i64> = self
            .constraints_of(category)
            .map(|c| i64::from(c.precedence))
            .collect();
        let (min, max) = match (values.iter().min(), values.iter().max()) {
            (Some(min), Some(max)) => (*min, *max),
            _ => {
                return Err(CoreError::PrecedenceOutOfRange(format!(
                    "{description} has no values"
                )))
            }
        };

        let message = if min <= precedence && precedence <= max {
            format!("{description} = {precedence} is not valid in range [{min}, {max}]")
        } else {
            format!("{description} must be in range [{min}, {max}], now is {precedence}")
        };
        Err(CoreError::PrecedenceOutOfRange(message))
    }

    // -----------------------------------------------------------------------
    // Display text
    // -----------------------------------------------------------------------

    /// `"{name} {category}"`, e.g. `Gold Credit Card`.
    pub fn product_display(&self, id: ProductId) -> String {
        let product = self.product(id);
        format!("{} {}", product.name, self.category(product.category).description)
    }

    /// Human-readable form of a rule, e.g. `Age: 18-64 or higher`.
    pub fn rule_description(&self, rule: &Rule) -> String {
        let constraint = self.constraint(rule.constraint);
        let category = &self.category(constraint.category).description;
        match rule.engagement {
            Engagement::Exact => format!("{category}: {}", constraint.name),
            Engagement::IncludingAbove => format!("{category}: {} or higher", constraint.name),
        }
    }

    /// Every constraint category with its answers ordered by precedence.
    pub fn questions(&self) -> Vec<Question> {
        self.constraint_categories()
            .map(|category| {
                let mut possible_answers: Vec<Answer> = self
                    .constraints_of(category.id)
                    .map(|c| Answer {
                        precedence: c.precedence,
                        text: c.name.clone(),
                    })
                    .collect();
                possible_answers.sort_by_key(|a| a.precedence);
                Question {
                    category: category.description.clone(),
                    possible_answers,
                }
            })
            .collect()
    }
}
