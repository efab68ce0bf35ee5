//! Command-line requests and their JSON responses.

use anyhow::{bail, Context};
use serde_json::{json, Value};

use vbank_core::engine::{Answers, BundleAdvisor, Verbosity};
use vbank_core::error::CoreError;
use vbank_core::types::ProductId;

const BUNDLE_FLAG: &str = "--bundle=";
const LIST_BUNDLES_FLAG: &str = "--bundles";
const LIST_PRODUCTS_FLAG: &str = "--products";
const PROPOSED_BUNDLE_NAME: &str = "Proposed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// List the questions a customer has to answer.
    Questions,
    /// List every bundle with its products.
    Bundles,
    /// List every product id with its display text.
    Products,
    /// Recommend the best bundle for the answers.
    Advise(Answers),
    /// Check a bundle the customer put together.
    Check {
        answers: Answers,
        products: Vec<ProductId>,
    },
}

impl Request {
    /// Parse `Category=precedence` pairs and an optional
    /// `--bundle=<id>,<id>,...`, or a lone `--bundles` / `--products`.
    pub fn parse<I, S>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut answers = Answers::new();
        let mut products: Option<Vec<ProductId>> = None;
        let mut listing: Option<Self> = None;

        for arg in args {
            let arg = arg.as_ref();
            let listing_flag = match arg {
                LIST_BUNDLES_FLAG => Some(Self::Bundles),
                LIST_PRODUCTS_FLAG => Some(Self::Products),
                _ => None,
            };
            if let Some(list) = listing_flag {
                if listing.replace(list).is_some() {
                    bail!("only one of {LIST_BUNDLES_FLAG} and {LIST_PRODUCTS_FLAG} may be given");
                }
                continue;
            }
            if let Some(list) = arg.strip_prefix(BUNDLE_FLAG) {
                if products.is_some() {
                    bail!("--bundle given more than once");
                }
                products = Some(parse_products(list)?);
                continue;
            }
            let (category, precedence) = arg
                .split_once('=')
                .with_context(|| format!("expected Category=precedence, got '{arg}'"))?;
            let precedence: i64 = precedence
                .trim()
                .parse()
                .with_context(|| format!("precedence of '{category}' is not a number"))?;
            answers.push(category.trim(), precedence);
        }

        if let Some(listing) = listing {
            if !answers.is_empty() || products.is_some() {
                bail!("listing flags take no other arguments");
            }
            return Ok(listing);
        }

        Ok(match products {
            Some(products) => Self::Check { answers, products },
            None if answers.is_empty() => Self::Questions,
            None => Self::Advise(answers),
        })
    }

    /// Run the request against the catalog.
    pub fn respond(
        &self,
        advisor: &BundleAdvisor<'_>,
        verbosity: Verbosity,
    ) -> Result<Value, CoreError> {
        match self {
            Self::Questions => Ok(json!({ "questions": advisor.questions() })),
            Self::Bundles => Ok(json!({ "bundles": advisor.bundles() })),
            Self::Products => Ok(json!({ "products": advisor.products() })),
            Self::Advise(answers) => {
                let bundle = advisor.advise(answers)?.map(|b| advisor.summarize(b));
                Ok(json!({ "bundle": bundle }))
            }
            Self::Check { answers, products } => {
                let bundle = advisor.reconstruct(PROPOSED_BUNDLE_NAME, products)?;
                let outcome = advisor.check(answers, &bundle, verbosity)?;
                Ok(json!({
                    "bundle": advisor.summarize(&bundle),
                    "check": outcome,
                    "message": outcome.message(),
                }))
            }
        }
    }
}

fn parse_products(list: &str) -> anyhow::Result<Vec<ProductId>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>()
                .map(ProductId)
                .with_context(|| format!("'{s}' is not a product id"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use vbank_core::catalog::seed;

    use super::*;

    fn respond(args: &[&str], verbosity: Verbosity) -> Value {
        let catalog = seed::virtual_bank().unwrap();
        let advisor = BundleAdvisor::new(&catalog);
        Request::parse(args).unwrap().respond(&advisor, verbosity).unwrap()
    }

    // -----------------------------------------------------------------------
    // Parsing
    // -----------------------------------------------------------------------

    #[test]
    fn no_arguments_asks_questions() {
        assert_eq!(Request::parse(Vec::<String>::new()).unwrap(), Request::Questions);
    }

    #[test]
    fn pairs_become_answers() {
        let request = Request::parse(["Age=1", "Income = 3"]).unwrap();
        assert_eq!(
            request,
            Request::Advise(Answers::new().with("Age", 1).with("Income", 3))
        );
    }

    #[test]
    fn bundle_flag_switches_to_check() {
        let request = Request::parse(["Age=1", "--bundle=3, 5,7"]).unwrap();
        assert_eq!(
            request,
            Request::Check {
                answers: Answers::new().with("Age", 1),
                products: vec![ProductId(3), ProductId(5), ProductId(7)],
            }
        );
    }

    #[test]
    fn listing_flags() {
        assert_eq!(Request::parse(["--bundles"]).unwrap(), Request::Bundles);
        assert_eq!(Request::parse(["--products"]).unwrap(), Request::Products);
        assert!(Request::parse(["--bundles", "--products"]).is_err());
        assert!(Request::parse(["--products", "Age=1"]).is_err());
        assert!(Request::parse(["--bundles", "--bundle=1"]).is_err());
    }

    #[test]
    fn malformed_arguments_are_rejected() {
        assert!(Request::parse(["Age"]).is_err());
        assert!(Request::parse(["Age=old"]).is_err());
        assert!(Request::parse(["--bundle=1,x"]).is_err());
        assert!(Request::parse(["--bundle=1", "--bundle=2"]).is_err());
    }

    // -----------------------------------------------------------------------
    // Responses
    // -----------------------------------------------------------------------

    #[test]
    fn questions_list_every_constraint_category() {
        let value = respond(&[], Verbosity::Verbose);
        let categories: Vec<&str> = value["questions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|q| q["category"].as_str().unwrap())
            .collect();
        assert_eq!(categories, vec!["Age", "Student", "Income"]);
    }

    #[test]
    fn advice_names_the_bundle() {
        let value = respond(&["Age=1", "Income=3"], Verbosity::Verbose);
        assert_eq!(value["bundle"]["name"], "Gold");
        assert_eq!(value["bundle"]["products"][2]["name"], "Gold Credit Card");
    }

    #[test]
    fn advice_without_match_is_null() {
        let value = respond(&["Age=1", "Income=0"], Verbosity::Verbose);
        assert!(value["bundle"].is_null());
    }

    #[test]
    fn check_accepts_gold_for_high_income() {
        // Current Plus, Debit, Gold Credit.
        let value = respond(&["Age=1", "Income=3", "--bundle=3,5,7"], Verbosity::Verbose);
        assert_eq!(value["check"]["outcome"], "accepted");
        assert!(value["message"].is_null());
    }

    #[test]
    fn check_reports_mismatch() {
        let value = respond(&["Age=1", "--bundle=0"], Verbosity::Verbose);
        assert_eq!(value["check"]["outcome"], "mismatch");
        assert_eq!(value["message"], "Bundle doesn't match given constraints");
    }

    #[test]
    fn terse_rejection_hides_details() {
        // Two accounts.
        let verbose = respond(&["Age=1", "--bundle=1,2"], Verbosity::Verbose);
        assert_eq!(verbose["check"]["outcome"], "rejected");
        assert_ne!(verbose["message"], "Validation failed");

        let terse = respond(&["Age=1", "--bundle=1,2"], Verbosity::Terse);
        assert_eq!(terse["check"]["reasons"], json!(["Validation failed"]));
    }

    #[test]
    fn bundles_list_products_with_rules() {
        let value = respond(&["--bundles"], Verbosity::Verbose);
        let bundles = value["bundles"].as_array().unwrap();
        assert_eq!(bundles.len(), 5);

        let student = &bundles[1];
        assert_eq!(student["name"], "Student");
        assert_eq!(student["id"], 1);
        let account = &student["products"][0];
        assert_eq!(account["name"], "Student Account");
        assert_eq!(account["rules"], json!(["Student: Yes", "Age: 18-64 or higher"]));
        let debit = &student["products"][1];
        assert_eq!(
            debit["bound_to"],
            json!(["Student", "Current", "Current Plus", "Pensioner"])
        );
    }

    #[test]
    fn products_list_ids_usable_with_bundle_flag() {
        let value = respond(&["--products"], Verbosity::Verbose);
        let products = value["products"].as_array().unwrap();
        assert_eq!(products.len(), 8);
        assert_eq!(products[3]["id"], 3);
        assert_eq!(products[3]["name"], "Current Plus Account");
        assert!(products[3].get("bound_to").is_none());
        assert_eq!(products[5]["name"], "Debit Card");
    }

    #[test]
    fn unknown_product_is_an_error() {
        let catalog = seed::virtual_bank().unwrap();
        let advisor = BundleAdvisor::new(&catalog);
        let request = Request::parse(["Age=1", "--bundle=99"]).unwrap();
        assert_matches!(
            request.respond(&advisor, Verbosity::Verbose),
            Err(CoreError::UnknownProduct { .. })
        );
    }
}
