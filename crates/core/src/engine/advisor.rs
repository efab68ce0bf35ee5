//! Request-level operations over a shared catalog: turning answers into
//! constraints, advising the best bundle, and checking a bundle the caller
//! picked.

use serde::{Deserialize, Serialize};

use crate::catalog::{Bundle, Catalog, CategoryKind, Constraint, Question};
use crate::error::CoreError;
use crate::types::{BundleId, ProductId};

use super::select::select_by;
use super::validate::{validate, BundleValidation, Verbosity};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One answer: the precedence chosen for a constraint category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerEntry {
    pub category: String,
    pub precedence: i64,
}

/// Answers to the catalog's questions, in the order they were given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Answers(Vec<AnswerEntry>);

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, category: impl Into<String>, precedence: i64) -> Self {
        self.push(category, precedence);
        self
    }

    pub fn push(&mut self, category: impl Into<String>, precedence: i64) {
        self.0.push(AnswerEntry {
            category: category.into(),
            precedence,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnswerEntry> {
        self.0.iter()
    }
}

impl<S: Into<String>> FromIterator<(S, i64)> for Answers {
    fn from_iter<I: IntoIterator<Item = (S, i64)>>(iter: I) -> Self {
        let mut answers = Self::new();
        for (category, precedence) in iter {
            answers.push(category, precedence);
        }
        answers
    }
}

/// Outcome of checking a caller-chosen bundle against answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum AdviceCheck {
    /// The bundle is consistent and matches the answers.
    Accepted,
    /// The bundle itself is inconsistent.
    Rejected { reasons: Vec<String> },
    /// The bundle is consistent but the answers rule it out.
    Mismatch,
}

impl AdviceCheck {
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Accepted => None,
            Self::Rejected { reasons } => Some(reasons.join("\n")),
            Self::Mismatch => Some("Bundle doesn't match given constraints".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSummary {
    pub id: ProductId,
    /// Product display text.
    pub name: String,
    /// Rule descriptions, e.g. `Age: 18-64 or higher`.
    pub rules: Vec<String>,
    /// Products this one requires any of.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bound_to: Vec<String>,
}

/// A bundle as shown to a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<BundleId>,
    pub name: String,
    pub priority: i32,
    pub products: Vec<ProductSummary>,
}

// ---------------------------------------------------------------------------
// Advisor
// ---------------------------------------------------------------------------

/// Borrowing facade over a catalog snapshot. Cheap to create per request.
#[derive(Debug, Clone, Copy)]
pub struct BundleAdvisor<'c> {
    catalog: &'c Catalog,
}

impl<'c> BundleAdvisor<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'c Catalog {
        self.catalog
    }

    /// Resolve every answer to a constraint of its category.
    pub fn constraints_for(&self, answers: &Answers) -> Result<Vec<&'c Constraint>, CoreError> {
        if answers.is_empty() {
            return Err(CoreError::EmptyConstraints);
        }
        answers
            .iter()
            .map(|answer| {
                let category = self
                    .catalog
                    .find_category(CategoryKind::Constraint, &answer.category)
                    .ok_or_else(|| CoreError::UnknownCategory(answer.category.clone()))?;
                self.catalog.constraint_at(category.id, answer.precedence)
            })
            .collect()
    }

    /// Every catalog bundle the answers allow, in catalog order.
    pub fn select_by(&self, answers: &Answers) -> Result<Vec<&'c Bundle>, CoreError> {
        let constraints = self.constraints_for(answers)?;
        select_by(
            self.catalog,
            self.catalog.bundles(),
            self.catalog.default_rules(),
            &constraints,
        )
    }

    /// The highest-priority bundle the answers allow; the earliest one wins
    /// a tie.
    pub fn advise(&self, answers: &Answers) -> Result<Option<&'c Bundle>, CoreError> {
        let selected = self.select_by(answers)?;
        let best = selected.into_iter().fold(None, |best: Option<&Bundle>, bundle| match best {
            Some(current) if current.priority >= bundle.priority => Some(current),
            _ => Some(bundle),
        });
        match best {
            Some(bundle) => tracing::debug!(bundle = %bundle.name, "Bundle advised"),
            None => tracing::debug!("No bundle matches the answers"),
        }
        Ok(best)
    }

    /// Build a transient bundle from product ids, resolving each against the
    /// catalog.
    pub fn reconstruct(&self, name: &str, products: &[ProductId]) -> Result<Bundle, CoreError> {
        let resolved = products
            .iter()
            .map(|id| {
                self.catalog
                    .find_product(*id)
                    .map(|p| p.id)
                    .ok_or(CoreError::UnknownProduct { id: *id })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Bundle::transient(name, resolved))
    }

    pub fn validate(&self, bundle: &Bundle, verbosity: Verbosity) -> BundleValidation {
        validate(self.catalog, bundle, verbosity)
    }

    /// Check a caller-chosen bundle: answers must resolve, the bundle must be
    /// consistent, and it must survive selection by the answers. Rejection
    /// reasons carry the requested detail.
    pub fn check(
        &self,
        answers: &Answers,
        bundle: &Bundle,
        verbosity: Verbosity,
    ) -> Result<AdviceCheck, CoreError> {
        let constraints = self.constraints_for(answers)?;

        let validation = self.validate(bundle, verbosity);
        if !validation.is_valid {
            tracing::warn!(bundle = %bundle.name, reasons = ?validation.reasons, "Proposed bundle rejected");
            return Ok(AdviceCheck::Rejected {
                reasons: validation.reasons,
            });
        }

        let candidates = std::slice::from_ref(bundle);
        let selected = select_by(
            self.catalog,
            candidates,
            self.catalog.default_rules(),
            &constraints,
        )?;
        if selected.is_empty() {
            return Ok(AdviceCheck::Mismatch);
        }
        Ok(AdviceCheck::Accepted)
    }

    pub fn questions(&self) -> Vec<Question> {
        self.catalog.questions()
    }

    pub fn summarize(&self, bundle: &Bundle) -> BundleSummary {
        BundleSummary {
            id: bundle.id,
            name: bundle.name.clone(),
            priority: bundle.priority,
            products: bundle
                .products
                .iter()
                .map(|id| self.summarize_product(*id))
                .collect(),
        }
    }

    pub fn summarize_product(&self, id: ProductId) -> ProductSummary {
        let product = self.catalog.product(id);
        ProductSummary {
            id,
            name: self.catalog.product_display(id),
            rules: self
                .catalog
                .rules_of(id)
                .map(|rule| self.catalog.rule_description(rule))
                .collect(),
            bound_to: product.bound_names().map(str::to_string).collect(),
        }
    }

    /// Every catalog bundle, in catalog order.
    pub fn bundles(&self) -> Vec<BundleSummary> {
        self.catalog
            .bundles()
            .iter()
            .map(|bundle| self.summarize(bundle))
            .collect()
    }

    /// Every catalog product, in id order.
    pub fn products(&self) -> Vec<ProductSummary> {
        self.catalog
            .products()
            .iter()
            .map(|product| self.summarize_product(product.id))
            .collect()
    }
}
