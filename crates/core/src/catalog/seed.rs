//! The built-in Virtual Bank catalog.
//!
//! Used when no catalog document is configured, and as the reference data
//! set for tests.

use crate::error::CoreError;
use crate::types::{ConstraintId, ProductId};

use super::builder::CatalogBuilder;
use super::model::{CategoryKind, Engagement};
use super::Catalog;

/// Names used by the seed catalog.
pub mod names {
    pub const AGE: &str = "Age";
    pub const STUDENT: &str = "Student";
    pub const INCOME: &str = "Income";
    pub const ACCOUNT: &str = "Account";
    pub const CARD: &str = "Card";

    pub const AGE_0_17: &str = "0-17";
    pub const AGE_18_64: &str = "18-64";
    pub const AGE_65_PLUS: &str = "65+";
    pub const STUDENT_NO: &str = "No";
    pub const STUDENT_YES: &str = "Yes";
    pub const INCOME_0: &str = "0";
    pub const INCOME_1_12K: &str = "1-12000";
    pub const INCOME_12K1_40K: &str = "12001-40000";
    pub const INCOME_40K1_PLUS: &str = "40001+";

    pub const PRODUCT_JUNIOR: &str = "Junior Saver";
    pub const PRODUCT_STUDENT: &str = "Student";
    pub const PRODUCT_CURRENT: &str = "Current";
    pub const PRODUCT_CURRENT_PLUS: &str = "Current Plus";
    pub const PRODUCT_PENSIONER: &str = "Pensioner";
    pub const PRODUCT_DEBIT: &str = "Debit";
    pub const PRODUCT_CREDIT: &str = "Credit";
    pub const PRODUCT_GOLD_CREDIT: &str = "Gold Credit";

    pub const BUNDLE_JUNIOR_SAVER: &str = "Junior Saver";
    pub const BUNDLE_STUDENT: &str = "Student";
    pub const BUNDLE_CLASSIC: &str = "Classic";
    pub const BUNDLE_CLASSIC_PLUS: &str = "Classic Plus";
    pub const BUNDLE_GOLD: &str = "Gold";
}

use names::*;

/// Build the Virtual Bank catalog.
pub fn virtual_bank() -> Result<Catalog, CoreError> {
    use Engagement::{Exact, IncludingAbove};

    let mut b = CatalogBuilder::new();

    // --- Constraint categories ---
    let age = b.category(AGE, CategoryKind::Constraint);
    let age_0_17 = b.constraint(age, AGE_0_17, 0);
    let age_18_64 = b.constraint(age, AGE_18_64, 1);
    let age_65_plus = b.constraint(age, AGE_65_PLUS, 2);

    let student = b.category(STUDENT, CategoryKind::Constraint);
    let student_no = b.constraint(student, STUDENT_NO, 0);
    let student_yes = b.constraint(student, STUDENT_YES, 1);

    let income = b.category(INCOME, CategoryKind::Constraint);
    let income_0 = b.constraint(income, INCOME_0, 0);
    let income_1_12k = b.constraint(income, INCOME_1_12K, 1);
    let income_12k1_40k = b.constraint(income, INCOME_12K1_40K, 2);
    let income_40k1_plus = b.constraint(income, INCOME_40K1_PLUS, 3);

    // --- Account products ---
    let account = b.category(ACCOUNT, CategoryKind::Product);
    let junior = b.product(account, PRODUCT_JUNIOR);
    let student_account = b.product(account, PRODUCT_STUDENT);
    let current = b.product(account, PRODUCT_CURRENT);
    let current_plus = b.product(account, PRODUCT_CURRENT_PLUS);
    let pensioner = b.product(account, PRODUCT_PENSIONER);

    with_rules(&mut b, junior, &[(age_0_17, Exact)]);
    with_rules(
        &mut b,
        student_account,
        &[(student_yes, Exact), (age_18_64, IncludingAbove)],
    );
    with_rules(
        &mut b,
        current,
        &[(income_1_12k, IncludingAbove), (age_18_64, IncludingAbove)],
    );
    with_rules(
        &mut b,
        current_plus,
        &[(income_40k1_plus, Exact), (age_18_64, IncludingAbove)],
    );
    with_rules(
        &mut b,
        pensioner,
        &[(income_1_12k, IncludingAbove), (age_65_plus, Exact)],
    );

    // --- Card products ---
    let card = b.category(CARD, CategoryKind::Product);
    let debit = b.product(card, PRODUCT_DEBIT);
    let credit = b.product(card, PRODUCT_CREDIT);
    let gold_credit = b.product(card, PRODUCT_GOLD_CREDIT);

    b.bound_to(
        debit,
        &[
            PRODUCT_STUDENT,
            PRODUCT_CURRENT,
            PRODUCT_CURRENT_PLUS,
            PRODUCT_PENSIONER,
        ],
    );
    with_rules(
        &mut b,
        credit,
        &[(income_12k1_40k, IncludingAbove), (age_18_64, IncludingAbove)],
    );
    with_rules(
        &mut b,
        gold_credit,
        &[(income_40k1_plus, Exact), (age_18_64, IncludingAbove)],
    );

    // --- Bundles ---
    let bundles: [(&str, i32, &[ProductId]); 5] = [
        (BUNDLE_JUNIOR_SAVER, 0, &[junior]),
        (BUNDLE_STUDENT, 0, &[student_account, debit, credit]),
        (BUNDLE_CLASSIC, 1, &[current, debit]),
        (BUNDLE_CLASSIC_PLUS, 1, &[current, debit, credit]),
        (BUNDLE_GOLD, 2, &[current_plus, debit, gold_credit]),
    ];
    for (name, priority, products) in bundles {
        let bundle = b.bundle(name, priority);
        for product in products {
            b.add_to_bundle(bundle, *product);
        }
    }

    // --- Defaults: any age, not a student, any income ---
    b.default_rule(age_0_17, IncludingAbove);
    b.default_rule(student_no, Exact);
    b.default_rule(income_0, IncludingAbove);

    b.build()
}

fn with_rules(b: &mut CatalogBuilder, product: ProductId, rules: &[(ConstraintId, Engagement)]) {
    for (constraint, engagement) in rules {
        b.rule(product, *constraint, *engagement);
    }
}
