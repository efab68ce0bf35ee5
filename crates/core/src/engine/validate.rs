//! Bundle validation: is a product composition self-consistent, regardless of
//! any user answers?
//!
//! A bad bundle is an expected outcome, reported as data rather than as an
//! error. Checks run in a fixed order and stop at the first failure:
//!
//! 1. the bundle has at least one product;
//! 2. exactly one product belongs to the [`ACCOUNT_CATEGORY`];
//! 3. every bound product has one of its dependencies in the bundle;
//! 4. no two rules of one category collide.

use std::fmt;

use serde::Serialize;

use crate::catalog::{Bundle, Catalog, Engagement, Rule, ACCOUNT_CATEGORY};
use crate::types::{CategoryId, ProductId};

use super::derive::{bundle_rules, group_by_category};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// The only reason reported in terse mode.
pub const GENERAL_FAILURE: &str = "Validation failed";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How much detail a failed validation carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    /// Human-readable reasons.
    Verbose,
    /// A single opaque [`GENERAL_FAILURE`] marker.
    Terse,
}

/// Outcome of [`validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleValidation {
    pub is_valid: bool,
    /// Empty when valid.
    pub reasons: Vec<String>,
}

impl BundleValidation {
    fn valid() -> Self {
        Self {
            is_valid: true,
            reasons: Vec::new(),
        }
    }
}

/// The first inconsistency found in a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleViolation {
    Empty,
    /// Zero or several account products.
    AccountCount { count: usize },
    /// A bound product with none of its dependencies in the bundle.
    Unbound {
        product: String,
        bound_to: String,
    },
    /// Two products whose rules in one category cannot both hold.
    Collision {
        first: String,
        second: String,
        category: String,
    },
}

impl fmt::Display for BundleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Bundle must have at least one product"),
            Self::AccountCount { .. } => write!(f, "Bundle must have only one account"),
            Self::Unbound { product, bound_to } => write!(
                f,
                "Product '{product}' requires any of '{bound_to}' to be included"
            ),
            Self::Collision {
                first,
                second,
                category,
            } => write!(
                f,
                "Products '{first}' and '{second}' are incompatible by {category} condition"
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Validate a bundle, rendering the outcome at the requested verbosity.
pub fn validate(catalog: &Catalog, bundle: &Bundle, verbosity: Verbosity) -> BundleValidation {
    match first_violation(catalog, bundle) {
        None => BundleValidation::valid(),
        Some(violation) => {
            tracing::debug!(bundle = %bundle.name, %violation, "Bundle failed validation");
            let reason = match verbosity {
                Verbosity::Verbose => violation.to_string(),
                Verbosity::Terse => GENERAL_FAILURE.to_string(),
            };
            BundleValidation {
                is_valid: false,
                reasons: vec![reason],
            }
        }
    }
}

pub fn is_valid_bundle(catalog: &Catalog, bundle: &Bundle) -> bool {
    first_violation(catalog, bundle).is_none()
}

/// Run the checks in order and return the first failure.
pub fn first_violation(catalog: &Catalog, bundle: &Bundle) -> Option<BundleViolation> {
    if bundle.products.is_empty() {
        return Some(BundleViolation::Empty);
    }
    check_single_account(catalog, &bundle.products)
        .or_else(|| check_bound_products(catalog, &bundle.products))
        .or_else(|| check_rule_collisions(catalog, bundle))
}

// ---------------------------------------------------------------------------
// Structural checks
// ---------------------------------------------------------------------------

fn check_single_account(catalog: &Catalog, products: &[ProductId]) -> Option<BundleViolation> {
    let count = products
        .iter()
        .filter(|p| {
            let category = catalog.category(catalog.product(**p).category);
            category.description == ACCOUNT_CATEGORY
        })
        .count();
    (count != 1).then_some(BundleViolation::AccountCount { count })
}

/// A bound product is satisfied by any *other* member listed in its
/// bound-to list. Repeated copies of the product itself never count.
fn check_bound_products(catalog: &Catalog, products: &[ProductId]) -> Option<BundleViolation> {
    products.iter().find_map(|id| {
        let product = catalog.product(*id);
        if !product.is_bound() {
            return None;
        }
        let satisfied = products
            .iter()
            .filter(|other| **other != *id)
            .any(|other| product.is_bound_to(&catalog.product(*other).name));
        (!satisfied).then(|| BundleViolation::Unbound {
            product: catalog.product_display(*id),
            bound_to: product.bound_to.clone().unwrap_or_default(),
        })
    })
}

// ---------------------------------------------------------------------------
// Rule collisions
// ---------------------------------------------------------------------------

fn check_rule_collisions(catalog: &Catalog, bundle: &Bundle) -> Option<BundleViolation> {
    let groups = group_by_category(catalog, bundle_rules(catalog, bundle));
    groups.into_iter().find_map(|(category, mut rules)| {
        if rules.len() < 2 {
            return None;
        }
        rules.sort_by_key(|r| (catalog.constraint(r.constraint).precedence, r.engagement));
        find_collision(catalog, &rules).map(|(a, b)| collision(catalog, category, a, b))
    })
}

/// Adjacent scan over rules sorted by (precedence, engagement).
///
/// Only an exact rule anchors a comparison. Two exact rules must agree on
/// precedence. One exact rule met by a floor is accepted once per category,
/// and only when the floor is not above the exact value; a second
/// exact/floor pair collides with the first exact rule.
fn find_collision<'r>(catalog: &Catalog, rules: &[&'r Rule]) -> Option<(&'r Rule, &'r Rule)> {
    let precedence = |r: &Rule| catalog.constraint(r.constraint).precedence;

    let mut accepted_exact: Option<&'r Rule> = None;
    let mut prev = *rules.first()?;

    for &next in &rules[1..] {
        if prev.engagement != Engagement::Exact {
            prev = next;
            continue;
        }

        if prev.engagement == next.engagement {
            if precedence(prev) != precedence(next) {
                return Some((prev, next));
            }
        } else {
            if let Some(exact) = accepted_exact {
                return Some((exact, next));
            }
            accepted_exact = Some(prev);

            if precedence(prev) < precedence(next) {
                return Some((prev, next));
            }
        }

        prev = next;
    }

    None
}

fn collision(catalog: &Catalog, category: CategoryId, a: &Rule, b: &Rule) -> BundleViolation {
    let display = |r: &Rule| {
        r.product
            .map(|p| catalog.product_display(p))
            .unwrap_or_default()
    };
    BundleViolation::Collision {
        first: display(a),
        second: display(b),
        category: catalog.category(category).description.clone(),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::catalog::{CatalogBuilder, CategoryKind};
    use crate::types::ConstraintId;

    // -----------------------------------------------------------------------
    // Fixture: Age{0,1,2} and Income{0..3}, Account + Card categories
    // -----------------------------------------------------------------------

    struct Fixture {
        builder: CatalogBuilder,
        account: CategoryId,
        card: CategoryId,
        age: Vec<ConstraintId>,
        income: Vec<ConstraintId>,
    }

    impl Fixture {
        fn new() -> Self {
            let mut builder = CatalogBuilder::new();
            let age_cat = builder.category("Age", CategoryKind::Constraint);
            let age: Vec<ConstraintId> = ["0-17", "18-64", "65+"]
                .iter()
                .enumerate()
                .map(|(p, name)| builder.constraint(age_cat, *name, p as u32))
                .collect();
            let income_cat = builder.category("Income", CategoryKind::Constraint);
            let income: Vec<ConstraintId> = ["0", "1-12000", "12001-40000", "40001+"]
                .iter()
                .enumerate()
                .map(|(p, name)| builder.constraint(income_cat, *name, p as u32))
                .collect();
            builder.default_rule(age[0], Engagement::IncludingAbove);
            builder.default_rule(income[0], Engagement::IncludingAbove);
            let account = builder.category("Account", CategoryKind::Product);
            let card = builder.category("Card", CategoryKind::Product);
            Self {
                builder,
                account,
                card,
                age,
                income,
            }
        }

        fn account(&mut self, name: &str) -> ProductId {
            self.builder.product(self.account, name)
        }

        fn card(&mut self, name: &str) -> ProductId {
            self.builder.product(self.card, name)
        }

        fn age_rule(&mut self, product: ProductId, precedence: usize, engagement: Engagement) {
            let c = self.age[precedence];
            self.builder.rule(product, c, engagement);
        }

        fn income_rule(&mut self, product: ProductId, precedence: usize, engagement: Engagement) {
            let c = self.income[precedence];
            self.builder.rule(product, c, engagement);
        }

        fn build(self) -> Catalog {
            self.builder.build().expect("fixture catalog should build")
        }
    }

    fn bundle(products: &[ProductId]) -> Bundle {
        Bundle::transient("candidate", products.to_vec())
    }

    // -----------------------------------------------------------------------
    // Structure
    // -----------------------------------------------------------------------

    #[test]
    fn empty_bundle_is_invalid() {
        let catalog = Fixture::new().build();
        let b = bundle(&[]);
        assert_eq!(first_violation(&catalog, &b), Some(BundleViolation::Empty));
        assert!(!is_valid_bundle(&catalog, &b));
    }

    #[test]
    fn bundle_needs_exactly_one_account() {
        let mut f = Fixture::new();
        let debit = f.card("Debit");
        let credit = f.card("Credit");
        let current = f.account("Current");
        let savings = f.account("Savings");
        let catalog = f.build();

        let mut products = vec![debit, credit];
        assert_matches!(
            first_violation(&catalog, &bundle(&products)),
            Some(BundleViolation::AccountCount { count: 0 })
        );

        products.push(current);
        assert!(is_valid_bundle(&catalog, &bundle(&products)));

        products.push(savings);
        assert_matches!(
            first_violation(&catalog, &bundle(&products)),
            Some(BundleViolation::AccountCount { count: 2 })
        );
    }

    #[test]
    fn bound_product_needs_a_listed_bundle_mate() {
        let mut f = Fixture::new();
        let some = f.account("SomeProduct");
        let other = f.card("OtherProduct");
        let other_other = f.card("OtherOther");
        let unrelated = f.card("NewProduct");
        f.builder.bound_to(some, &["OtherProduct"]);
        let mut catalog = f.build();

        assert_matches!(
            first_violation(&catalog, &bundle(&[some])),
            Some(BundleViolation::Unbound { .. })
        );
        assert!(is_valid_bundle(&catalog, &bundle(&[some, other])));

        // Widen the dependency list and swap the dependency.
        catalog.products[some.0 as usize].bound_to = Some("OtherProduct;OtherOther".to_string());
        assert!(is_valid_bundle(&catalog, &bundle(&[some, other_other])));

        assert!(is_valid_bundle(&catalog, &bundle(&[some, other_other, unrelated])));
    }

    #[test]
    fn bound_product_does_not_satisfy_itself() {
        let mut f = Fixture::new();
        let selfish = f.account("Selfish");
        f.builder.bound_to(selfish, &["Selfish"]);
        let catalog = f.build();
        assert_matches!(
            first_violation(&catalog, &bundle(&[selfish])),
            Some(BundleViolation::Unbound { .. })
        );
    }

    #[test]
    fn repeated_bound_product_does_not_satisfy_itself() {
        let mut f = Fixture::new();
        let account = f.account("Plain");
        let selfish = f.card("Selfish");
        f.builder.bound_to(selfish, &["Selfish"]);
        let catalog = f.build();
        assert_matches!(
            first_violation(&catalog, &bundle(&[account, selfish, selfish])),
            Some(BundleViolation::Unbound { ref product, .. }) if product == "Selfish Card"
        );
    }

    #[test]
    fn account_check_runs_before_bound_check() {
        let mut f = Fixture::new();
        let debit = f.card("Debit");
        f.builder.bound_to(debit, &["Current"]);
        let catalog = f.build();
        assert_matches!(
            first_violation(&catalog, &bundle(&[debit])),
            Some(BundleViolation::AccountCount { count: 0 })
        );
    }

    // -----------------------------------------------------------------------
    // Collisions
    // -----------------------------------------------------------------------

    #[test]
    fn two_exact_values_collide() {
        let mut f = Fixture::new();
        let junior = f.account("Junior");
        let card = f.card("Adult Card");
        f.age_rule(junior, 0, Engagement::Exact);
        f.age_rule(card, 1, Engagement::Exact);
        let catalog = f.build();

        let violation = first_violation(&catalog, &bundle(&[junior, card])).unwrap();
        assert_eq!(
            violation,
            BundleViolation::Collision {
                first: "Junior Account".to_string(),
                second: "Adult Card Card".to_string(),
                category: "Age".to_string(),
            }
        );
        assert_eq!(
            violation.to_string(),
            "Products 'Junior Account' and 'Adult Card Card' are incompatible by Age condition"
        );
    }

    #[test]
    fn equal_exact_values_do_not_collide() {
        let mut f = Fixture::new();
        let plus = f.account("Current Plus");
        let gold = f.card("Gold Credit");
        f.income_rule(plus, 3, Engagement::Exact);
        f.income_rule(gold, 3, Engagement::Exact);
        let catalog = f.build();
        assert!(is_valid_bundle(&catalog, &bundle(&[plus, gold])));
    }

    #[test]
    fn floors_never_collide() {
        let mut f = Fixture::new();
        let current = f.account("Current");
        let credit = f.card("Credit");
        let gold = f.card("Gold");
        f.income_rule(current, 1, Engagement::IncludingAbove);
        f.income_rule(credit, 2, Engagement::IncludingAbove);
        f.income_rule(gold, 0, Engagement::IncludingAbove);
        let catalog = f.build();
        assert!(is_valid_bundle(&catalog, &bundle(&[current, credit, gold])));
    }

    #[test]
    fn exact_at_the_floor_is_accepted() {
        let mut f = Fixture::new();
        let pensioner = f.account("Pensioner");
        let card = f.card("Senior Card");
        f.age_rule(pensioner, 2, Engagement::Exact);
        f.age_rule(card, 2, Engagement::IncludingAbove);
        let catalog = f.build();
        assert!(is_valid_bundle(&catalog, &bundle(&[pensioner, card])));
    }

    #[test]
    fn exact_above_the_floor_is_accepted() {
        let mut f = Fixture::new();
        let pensioner = f.account("Pensioner");
        let credit = f.card("Credit");
        f.age_rule(pensioner, 2, Engagement::Exact);
        f.age_rule(credit, 1, Engagement::IncludingAbove);
        let catalog = f.build();
        // Sorted: floor@1 then exact@2; a floor never anchors a comparison.
        assert!(is_valid_bundle(&catalog, &bundle(&[pensioner, credit])));
    }

    #[test]
    fn exact_below_the_floor_collides() {
        let mut f = Fixture::new();
        let junior = f.account("Junior");
        let credit = f.card("Credit");
        f.age_rule(junior, 0, Engagement::Exact);
        f.age_rule(credit, 1, Engagement::IncludingAbove);
        let catalog = f.build();

        assert_matches!(
            first_violation(&catalog, &bundle(&[credit, junior])),
            Some(BundleViolation::Collision { ref first, ref second, ref category })
                if first == "Junior Account" && second == "Credit Card" && category == "Age"
        );
    }

    #[test]
    fn second_exact_floor_pair_collides_with_the_first_exact() {
        let mut f = Fixture::new();
        let account = f.account("Base");
        let low_exact = f.card("Low Exact");
        let low_floor = f.card("Low Floor");
        let high_exact = f.card("High Exact");
        let high_floor = f.card("High Floor");
        f.income_rule(low_exact, 1, Engagement::Exact);
        f.income_rule(low_floor, 1, Engagement::IncludingAbove);
        f.income_rule(high_exact, 2, Engagement::Exact);
        f.income_rule(high_floor, 2, Engagement::IncludingAbove);
        let catalog = f.build();

        // Sorted: exact@1, floor@1, exact@2, floor@2. The first pair is
        // accepted; the floor@1 → exact@2 step is skipped; exact@2 → floor@2
        // is a second mismatch.
        let violation =
            first_violation(&catalog, &bundle(&[account, high_floor, low_exact, high_exact, low_floor]));
        assert_matches!(
            violation,
            Some(BundleViolation::Collision { ref first, ref second, .. })
                if first == "Low Exact Card" && second == "High Floor Card"
        );
    }

    #[test]
    fn exact_floor_then_equal_exact_is_accepted() {
        let mut f = Fixture::new();
        let account = f.account("Base");
        let exact = f.card("Exact");
        let floor = f.card("Floor");
        let again = f.card("Exact Again");
        f.income_rule(exact, 2, Engagement::Exact);
        f.income_rule(again, 2, Engagement::Exact);
        f.income_rule(floor, 2, Engagement::IncludingAbove);
        let catalog = f.build();
        // Sorted: exact@2, exact@2, floor@2.
        assert!(is_valid_bundle(&catalog, &bundle(&[account, exact, floor, again])));
    }

    #[test]
    fn collisions_in_any_category_are_found() {
        let mut f = Fixture::new();
        let account = f.account("Base");
        let card = f.card("Card");
        f.age_rule(account, 1, Engagement::IncludingAbove);
        f.age_rule(card, 1, Engagement::IncludingAbove);
        f.income_rule(account, 0, Engagement::Exact);
        f.income_rule(card, 3, Engagement::Exact);
        let catalog = f.build();
        assert_matches!(
            first_violation(&catalog, &bundle(&[account, card])),
            Some(BundleViolation::Collision { ref category, .. }) if category == "Income"
        );
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    #[test]
    fn verbose_and_terse_reasons() {
        let catalog = Fixture::new().build();
        let empty = bundle(&[]);

        let verbose = validate(&catalog, &empty, Verbosity::Verbose);
        assert!(!verbose.is_valid);
        assert_eq!(verbose.reasons, vec!["Bundle must have at least one product"]);

        let terse = validate(&catalog, &empty, Verbosity::Terse);
        assert!(!terse.is_valid);
        assert_eq!(terse.reasons, vec![GENERAL_FAILURE]);
    }

    #[test]
    fn valid_bundle_has_no_reasons() {
        let mut f = Fixture::new();
        let current = f.account("Current");
        let catalog = f.build();
        let outcome = validate(&catalog, &bundle(&[current]), Verbosity::Verbose);
        assert!(outcome.is_valid);
        assert!(outcome.reasons.is_empty());
    }

    #[test]
    fn unbound_message_names_the_dependencies() {
        let mut f = Fixture::new();
        let current = f.account("Current");
        let debit = f.card("Debit");
        f.builder.bound_to(debit, &["Student", "Pensioner"]);
        let catalog = f.build();
        let outcome = validate(&catalog, &bundle(&[current, debit]), Verbosity::Verbose);
        assert_eq!(
            outcome.reasons,
            vec!["Product 'Debit Card' requires any of 'Student;Pensioner' to be included"]
        );
    }
}
