//! Arena ids shared by every catalog table.
//!
//! Ids are minted by [`crate::catalog::CatalogBuilder`] from its own counter
//! and are only meaningful within the catalog that minted them.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Key into the category table.
    CategoryId
);
entity_id!(
    /// Key into the constraint table.
    ConstraintId
);
entity_id!(
    /// Key into the product table.
    ProductId
);
entity_id!(
    /// Key into the rule table (default rules included).
    RuleId
);
entity_id!(
    /// Key into the bundle table.
    BundleId
);
