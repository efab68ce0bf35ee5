//! One-shot catalog loading.
//!
//! A [`CatalogState`] starts as [`CatalogState::NotLoaded`] and moves to
//! [`CatalogState::Loaded`] exactly once, through [`CatalogState::load`].
//! After that every caller shares the same immutable snapshot.

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::CoreError;

use super::document::CatalogDocument;
use super::{seed, Catalog};

/// Where a catalog comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// The built-in Virtual Bank catalog.
    Seed,
    /// A JSON [`CatalogDocument`] on disk.
    File(PathBuf),
}

impl CatalogSource {
    pub fn load(&self) -> Result<Catalog, CoreError> {
        match self {
            Self::Seed => seed::virtual_bank(),
            Self::File(path) => CatalogDocument::read(path)?.into_catalog(),
        }
    }
}

#[derive(Debug)]
pub enum CatalogState {
    NotLoaded(CatalogSource),
    Loaded(Arc<Catalog>),
}

impl CatalogState {
    pub fn new(source: CatalogSource) -> Self {
        Self::NotLoaded(source)
    }

    /// Load the catalog if that has not happened yet and return the shared
    /// snapshot. A failed load leaves the state untouched.
    pub fn load(&mut self) -> Result<Arc<Catalog>, CoreError> {
        match self {
            Self::Loaded(catalog) => Ok(Arc::clone(catalog)),
            Self::NotLoaded(source) => {
                let catalog = Arc::new(source.load()?);
                tracing::info!(
                    source = ?source,
                    bundles = catalog.bundles().len(),
                    products = catalog.products().len(),
                    "Catalog loaded"
                );
                *self = Self::Loaded(Arc::clone(&catalog));
                Ok(catalog)
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}
