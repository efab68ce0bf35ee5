use crate::types::ProductId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Must contain at least one constraint")]
    EmptyConstraints,

    #[error("Multiple constraints of the same category are not allowed: {category}")]
    DuplicateCategory { category: String },

    #[error("{0}")]
    PrecedenceOutOfRange(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Unknown product identifier: {id}")]
    UnknownProduct { id: ProductId },

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("Catalog document could not be read: {0}")]
    Io(String),

    #[error("Catalog document could not be parsed: {0}")]
    Parse(String),
}
