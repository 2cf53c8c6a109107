//! Similarity index abstraction shared by local and remote backends.

use futures::future::BoxFuture;

use crate::errors::IndexError;

/// One raw search hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    pub vector_id: u64,
    /// Smaller is closer.
    pub distance: f32,
}

/// A named, fixed-dimension vector index.
///
/// Implementations must return hits in ascending distance order.
pub trait SimilarityIndex: Send + Sync {
    fn name(&self) -> &str;

    fn dimension(&self) -> usize;

    /// Up to `k` nearest neighbors of `query`.
    fn search<'a>(
        &'a self,
        query: &'a [f32],
        k: usize,
    ) -> BoxFuture<'a, Result<Vec<Neighbor>, IndexError>>;
}
