//! JSON description of a catalog.
//!
//! A document names things instead of numbering them; ids are assigned while
//! the document is replayed into a [`CatalogBuilder`]. Field-level checks run
//! through `validator` before any name is resolved.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::{ConstraintId, ProductId};

use super::builder::CatalogBuilder;
use super::model::{CategoryKind, Engagement, BOUND_TO_SEPARATOR};
use super::Catalog;

// ---------------------------------------------------------------------------
// Document types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CatalogDocument {
    #[validate(length(min = 1), nested)]
    pub constraint_categories: Vec<ConstraintCategoryDoc>,
    #[validate(length(min = 1), nested)]
    pub product_categories: Vec<ProductCategoryDoc>,
    #[validate(nested)]
    pub bundles: Vec<BundleDoc>,
    #[validate(nested)]
    pub default_rules: Vec<RuleDoc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ConstraintCategoryDoc {
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(length(min = 1), nested)]
    pub constraints: Vec<ConstraintDoc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ConstraintDoc {
    #[validate(length(min = 1))]
    pub name: String,
    pub precedence: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProductCategoryDoc {
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(nested)]
    pub products: Vec<ProductDoc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProductDoc {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bound_to: Vec<String>,
    #[serde(default)]
    #[validate(nested)]
    pub rules: Vec<RuleDoc>,
}

/// A rule addressed by category description and constraint name.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RuleDoc {
    #[validate(length(min = 1))]
    pub category: String,
    #[validate(length(min = 1))]
    pub constraint: String,
    pub engagement: Engagement,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BundleDoc {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub priority: i32,
    #[validate(length(min = 1))]
    pub products: Vec<String>,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl CatalogDocument {
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        serde_json::from_str(json).map_err(|e| CoreError::Parse(e.to_string()))
    }

    pub fn read(path: &Path) -> Result<Self, CoreError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| CoreError::Io(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// Validate the document and build the catalog it describes.
    pub fn into_catalog(self) -> Result<Catalog, CoreError> {
        self.validate()
            .map_err(|e| CoreError::InvalidCatalog(e.to_string()))?;

        let mut b = CatalogBuilder::new();
        let mut constraints: HashMap<(&str, &str), ConstraintId> = HashMap::new();

        for category in &self.constraint_categories {
            let id = b.category(category.description.clone(), CategoryKind::Constraint);
            for c in &category.constraints {
                let constraint = b.constraint(id, c.name.clone(), c.precedence);
                constraints.insert((category.description.as_str(), c.name.as_str()), constraint);
            }
        }

        let resolve = |rule: &RuleDoc| -> Result<ConstraintId, CoreError> {
            constraints
                .get(&(rule.category.as_str(), rule.constraint.as_str()))
                .copied()
                .ok_or_else(|| {
                    CoreError::InvalidCatalog(format!(
                        "unknown constraint '{}' in category '{}'",
                        rule.constraint, rule.category
                    ))
                })
        };

        let mut products: HashMap<&str, ProductId> = HashMap::new();
        for category in &self.product_categories {
            let id = b.category(category.description.clone(), CategoryKind::Product);
            for p in &category.products {
                let product = b.product(id, p.name.clone());
                if products.insert(p.name.as_str(), product).is_some() {
                    return Err(CoreError::InvalidCatalog(format!(
                        "duplicate product name '{}'",
                        p.name
                    )));
                }
                if p.bound_to.iter().any(|n| n.contains(BOUND_TO_SEPARATOR)) {
                    return Err(CoreError::InvalidCatalog(format!(
                        "bound-to names of '{}' must not contain '{BOUND_TO_SEPARATOR}'",
                        p.name
                    )));
                }
                b.bound_to(product, p.bound_to.as_slice());
                for rule in &p.rules {
                    b.rule(product, resolve(rule)?, rule.engagement);
                }
            }
        }

        for bundle in &self.bundles {
            let id = b.bundle(bundle.name.clone(), bundle.priority);
            for name in &bundle.products {
                let product = products.get(name.as_str()).copied().ok_or_else(|| {
                    CoreError::InvalidCatalog(format!(
                        "bundle '{}' references unknown product '{name}'",
                        bundle.name
                    ))
                })?;
                b.add_to_bundle(id, product);
            }
        }

        for rule in &self.default_rules {
            b.default_rule(resolve(rule)?, rule.engagement);
        }

        b.build()
    }
}

impl Catalog {
    /// Describe this catalog as a document, inverse of
    /// [`CatalogDocument::into_catalog`].
    pub fn to_document(&self) -> CatalogDocument {
        let rule_doc = |constraint: ConstraintId, engagement: Engagement| {
            let c = self.constraint(constraint);
            RuleDoc {
                category: self.category(c.category).description.clone(),
                constraint: c.name.clone(),
                engagement,
            }
        };

        CatalogDocument {
            constraint_categories: self
                .constraint_categories()
                .map(|category| ConstraintCategoryDoc {
                    description: category.description.clone(),
                    constraints: self
                        .constraints_of(category.id)
                        .map(|c| ConstraintDoc {
                            name: c.name.clone(),
                            precedence: c.precedence,
                        })
                        .collect(),
                })
                .collect(),
            product_categories: self
                .product_categories()
                .map(|category| ProductCategoryDoc {
                    description: category.description.clone(),
                    products: self
                        .products_of(category.id)
                        .map(|p| ProductDoc {
                            name: p.name.clone(),
                            bound_to: p.bound_names().map(str::to_string).collect(),
                            rules: self
                                .rules_of(p.id)
                                .map(|r| rule_doc(r.constraint, r.engagement))
                                .collect(),
                        })
                        .collect(),
                })
                .collect(),
            bundles: self
                .bundles()
                .iter()
                .map(|bundle| BundleDoc {
                    name: bundle.name.clone(),
                    priority: bundle.priority,
                    products: bundle
                        .products
                        .iter()
                        .map(|p| self.product(*p).name.clone())
                        .collect(),
                })
                .collect(),
            default_rules: self
                .default_rules()
                .iter()
                .map(|r| rule_doc(r.constraint, r.engagement))
                .collect(),
        }
    }
}
