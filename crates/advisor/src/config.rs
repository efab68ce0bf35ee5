use std::path::PathBuf;

use vbank_core::catalog::state::CatalogSource;
use vbank_core::engine::Verbosity;

/// Advisor configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisorConfig {
    /// Where the catalog is loaded from.
    pub catalog: CatalogSource,
    /// Detail level of bundle check failures.
    pub verbosity: Verbosity,
}

impl AdvisorConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var           | Default                     |
    /// |-------------------|-----------------------------|
    /// | `CATALOG_PATH`    | unset: built-in catalog     |
    /// | `ADVISOR_VERBOSE` | `true`                      |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AdvisorConfig::from_env`], reading from `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let catalog = lookup("CATALOG_PATH")
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .map(|p| CatalogSource::File(PathBuf::from(p)))
            .unwrap_or(CatalogSource::Seed);

        let verbose = lookup("ADVISOR_VERBOSE")
            .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "false" | "0" | "no"))
            .unwrap_or(true);

        Self {
            catalog,
            verbosity: if verbose {
                Verbosity::Verbose
            } else {
                Verbosity::Terse
            },
        }
    }
}
