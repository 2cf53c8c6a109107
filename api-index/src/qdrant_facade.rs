//! Thin adapter around `qdrant-client` exposing a collection as a [`SimilarityIndex`].
//!
//! Each facet lives in its own collection; point ids are the numeric vector
//! ids that `vector_map.jsonl` resolves to records.

use futures::future::{BoxFuture, FutureExt};
use qdrant_client::Qdrant;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::vectors_config::Config as VectorsConfigKind;
use qdrant_client::qdrant::{ScoredPoint, SearchParamsBuilder, SearchPointsBuilder};
use tracing::{debug, info, warn};

use crate::config::{DistanceKind, QdrantIndexConfig};
use crate::errors::IndexError;
use crate::index::{Neighbor, SimilarityIndex};

/// A facet index backed by one Qdrant collection.
pub struct QdrantIndex {
    client: Qdrant,
    name: String,
    collection: String,
    distance: DistanceKind,
    exact: bool,
    dim: usize,
}

impl QdrantIndex {
    /// Connects and reads the collection's vector size as the index dimension.
    ///
    /// # Errors
    /// Invalid config, connection failures, or a collection without a single
    /// unnamed vector space.
    pub async fn connect(name: impl Into<String>, cfg: &QdrantIndexConfig) -> Result<Self, IndexError> {
        cfg.validate()?;

        let mut builder = Qdrant::from_url(&cfg.url);
        if let Some(key) = &cfg.api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder
            .build()
            .map_err(|e| IndexError::Qdrant(e.to_string()))?;

        let info = client
            .collection_info(&cfg.collection)
            .await
            .map_err(|e| IndexError::Qdrant(e.to_string()))?;

        let size = info
            .result
            .and_then(|r| r.config)
            .and_then(|c| c.params)
            .and_then(|p| p.vectors_config)
            .and_then(|v| v.config)
            .and_then(|kind| match kind {
                VectorsConfigKind::Params(p) => Some(p.size),
                VectorsConfigKind::ParamsMap(_) => None,
            })
            .ok_or_else(|| {
                IndexError::Config(format!(
                    "collection '{}' has no single vector space",
                    cfg.collection
                ))
            })?;

        let name = name.into();
        info!(
            index = %name,
            collection = %cfg.collection,
            dim = size,
            distance = ?cfg.distance,
            "Qdrant index connected"
        );

        Ok(Self {
            client,
            name,
            collection: cfg.collection.clone(),
            distance: cfg.distance,
            exact: cfg.exact_search,
            dim: size as usize,
        })
    }

    async fn search_remote(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, IndexError> {
        if query.len() != self.dim {
            return Err(IndexError::QueryDimension {
                index: self.name.clone(),
                got: query.len(),
                want: self.dim,
            });
        }

        let mut builder = SearchPointsBuilder::new(&self.collection, query.to_vec(), k as u64)
            .with_payload(false);
        if self.exact {
            builder = builder.params(SearchParamsBuilder::default().exact(true));
        }

        let res = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| IndexError::Qdrant(e.to_string()))?;

        let mut out: Vec<Neighbor> = res
            .result
            .into_iter()
            .filter_map(|p| to_neighbor(p, self.distance))
            .collect();
        out.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.vector_id.cmp(&b.vector_id))
        });

        debug!(index = %self.name, hits = out.len(), "Qdrant search completed");
        Ok(out)
    }
}

fn to_neighbor(p: ScoredPoint, distance: DistanceKind) -> Option<Neighbor> {
    match p.id.and_then(|id| id.point_id_options) {
        Some(PointIdOptions::Num(vector_id)) => Some(Neighbor {
            vector_id,
            distance: distance.score_to_distance(p.score),
        }),
        other => {
            warn!(id = ?other, "Skipping point with non-numeric id");
            None
        }
    }
}

impl SimilarityIndex for QdrantIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn search<'a>(
        &'a self,
        query: &'a [f32],
        k: usize,
    ) -> BoxFuture<'a, Result<Vec<Neighbor>, IndexError>> {
        self.search_remote(query, k).boxed()
    }
}
