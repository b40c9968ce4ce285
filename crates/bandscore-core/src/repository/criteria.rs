//! Criteria store trait definition.

use std::future::Future;
use std::path::PathBuf;

use bandscore_types::error::CriteriaError;
use bandscore_types::task::TaskVariant;

/// Where a variant's descriptor text would be read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriteriaSource {
    pub path: PathBuf,
    /// True when `path` is the `.enc` sibling.
    pub encrypted: bool,
}

/// Read-only access to band-descriptor text by task variant.
///
/// Implementations return the text verbatim; callers treat it as an opaque
/// prompt fragment.
pub trait CriteriaStore: Send + Sync {
    /// Resolve which file backs `variant`.
    fn locate(&self, variant: TaskVariant) -> Result<CriteriaSource, CriteriaError>;

    /// Load (and decrypt when needed) the descriptor text for `variant`.
    fn load(
        &self,
        variant: TaskVariant,
    ) -> impl Future<Output = Result<String, CriteriaError>> + Send;
}
