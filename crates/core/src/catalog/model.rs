//! Catalog entity types.
//!
//! Entities reference each other by id only; see [`super::Catalog`] for the
//! tables that own them.

use serde::{Deserialize, Serialize};

use crate::types::{BundleId, CategoryId, ConstraintId, ProductId, RuleId};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Description of the product category every bundle needs exactly one of.
pub const ACCOUNT_CATEGORY: &str = "Account";

/// Separator used in a product's bound-to list.
pub const BOUND_TO_SEPARATOR: char = ';';

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Whether a category is an eligibility axis or a product grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    Constraint,
    Product,
}

impl CategoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Constraint => "constraint",
            Self::Product => "product",
        }
    }
}

/// A named axis of classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    /// Stable key of the category, e.g. `Age` or `Account`.
    pub description: String,
    pub kind: CategoryKind,
    /// Owned items in insertion order.
    pub items: Vec<ItemRef>,
}

/// Reference to one item owned by a category.
///
/// Constraint categories own only constraints and product categories own
/// only products; the builder rejects anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum ItemRef {
    Constraint(ConstraintId),
    Product(ProductId),
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// One discrete, ordered value on a constraint axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub id: ConstraintId,
    pub category: CategoryId,
    /// Display text, e.g. `18-64`.
    pub name: String,
    /// Strength of the value within its category; higher is more restrictive.
    pub precedence: u32,
}

/// A financial product offered inside bundles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub category: CategoryId,
    pub name: String,
    /// Semicolon-delimited names of products this one depends on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound_to: Option<String>,
}

impl Product {
    /// Whether the product depends on at least one other product.
    pub fn is_bound(&self) -> bool {
        self.bound_names().next().is_some()
    }

    /// Names listed in the bound-to list, trimmed, empty entries skipped.
    pub fn bound_names(&self) -> impl Iterator<Item = &str> {
        self.bound_to
            .as_deref()
            .unwrap_or_default()
            .split(BOUND_TO_SEPARATOR)
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Whether `name` appears in the bound-to list.
    pub fn is_bound_to(&self, name: &str) -> bool {
        self.bound_names().any(|bound| bound == name)
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// How a rule binds to its constraint.
///
/// The declaration order is the dominance order: an exact requirement is
/// stronger than an open-ended floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Engagement {
    /// The answer must match the constraint precisely.
    Exact,
    /// The answer must meet or exceed the constraint.
    IncludingAbove,
}

/// A single eligibility requirement against one constraint category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    pub engagement: Engagement,
    pub constraint: ConstraintId,
    /// Owning product; `None` only for default rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductId>,
}

// ---------------------------------------------------------------------------
// Bundles
// ---------------------------------------------------------------------------

/// A named, prioritized grouping of products offered as one recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
    /// `None` for a transient bundle reconstructed from a request.
    pub id: Option<BundleId>,
    pub name: String,
    /// Selection tie-breaker; higher wins.
    pub priority: i32,
    pub products: Vec<ProductId>,
}

impl Bundle {
    /// A bundle that lives only for the request that built it.
    pub fn transient(name: impl Into<String>, products: Vec<ProductId>) -> Self {
        Self {
            id: None,
            name: name.into(),
            priority: 0,
            products,
        }
    }
}
