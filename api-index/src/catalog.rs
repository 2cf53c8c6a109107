//! Immutable snapshot of the corpus: record store plus one index per facet.

use std::sync::Arc;

use tracing::debug;

use crate::errors::IndexError;
use crate::index::SimilarityIndex;
use crate::record::Facet;
use crate::store::RecordStore;

/// Everything a query needs to read. Shared as `Arc<IndexCatalog>`.
pub struct IndexCatalog {
    store: RecordStore,
    indices: Vec<(Facet, Arc<dyn SimilarityIndex>)>,
}

impl IndexCatalog {
    pub fn new(store: RecordStore, indices: Vec<(Facet, Arc<dyn SimilarityIndex>)>) -> Self {
        Self { store, indices }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn indices(&self) -> &[(Facet, Arc<dyn SimilarityIndex>)] {
        &self.indices
    }

    /// Common dimension of all indices, if any index is present.
    pub fn dimension(&self) -> Option<usize> {
        self.indices.first().map(|(_, i)| i.dimension())
    }

    /// Fails on the first index whose dimension differs from `embed_dim`.
    pub fn check_dimension(&self, embed_dim: usize) -> Result<(), IndexError> {
        for (facet, index) in &self.indices {
            debug!(facet = %facet, index = index.name(), dim = index.dimension(), "Checking index dimension");
            if index.dimension() != embed_dim {
                return Err(IndexError::DimensionMismatch {
                    index: index.name().to_string(),
                    index_dim: index.dimension(),
                    embed_dim,
                });
            }
        }
        Ok(())
    }
}
