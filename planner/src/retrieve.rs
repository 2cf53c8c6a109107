//! Multi-index candidate retrieval for one action.
//!
//! Embeds the action once, fans the query out to every facet index,
//! filters by similarity, resolves records, dedupes by `doc_id`, and caps
//! the result.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use api_index::scoring::{passes_threshold, similarity_from_distance};
use api_index::{Facet, IndexCatalog, Neighbor, SimilarityIndex};
use futures::future::try_join_all;
use tracing::{debug, trace};

use crate::error::LookupError;
use crate::plan::ScoredCandidate;
use crate::services::{Embedder, bounded};

/// Retrieval knobs taken from [`crate::cfg::PipelineConfig`].
#[derive(Clone, Copy, Debug)]
pub struct RetrievalParams {
    pub per_index_top_k: usize,
    pub top_k: usize,
    pub threshold: f32,
    pub call_timeout: Duration,
}

pub struct CandidateRetriever {
    embedder: Arc<dyn Embedder>,
    catalog: Arc<IndexCatalog>,
    params: RetrievalParams,
}

impl CandidateRetriever {
    pub fn new(embedder: Arc<dyn Embedder>, catalog: Arc<IndexCatalog>, params: RetrievalParams) -> Self {
        Self {
            embedder,
            catalog,
            params,
        }
    }

    /// Ranked candidates for `action`; empty means "no match".
    ///
    /// # Errors
    /// [`LookupError`] if embedding or any index search fails or times out.
    pub async fn retrieve(&self, action: &str) -> Result<Vec<ScoredCandidate>, LookupError> {
        let t = self.params.call_timeout;

        let query = bounded(t, self.embedder.embed(action))
            .await
            .map_err(LookupError::Embed)?;

        if let Some(want) = self.catalog.dimension() {
            if query.len() != want {
                return Err(LookupError::Dimension {
                    got: query.len(),
                    want,
                });
            }
        }

        let searches = self
            .catalog
            .indices()
            .iter()
            .map(|(facet, index)| self.search_facet(*facet, index.as_ref(), &query));
        let per_index = try_join_all(searches).await?;

        let mut scored = Vec::new();
        for (facet, index_name, hits) in per_index {
            trace!(index = index_name, hits = hits.len(), "Raw hits");
            for Neighbor {
                vector_id,
                distance,
            } in hits
            {
                let similarity = similarity_from_distance(distance);
                if !passes_threshold(similarity, self.params.threshold) {
                    continue;
                }
                let Some(record) = self.catalog.store().get(index_name, vector_id) else {
                    debug!(index = index_name, vector_id, "Hit has no record; skipped");
                    continue;
                };
                scored.push(ScoredCandidate {
                    record,
                    matched_facet: facet,
                    similarity,
                    raw_distance: distance,
                });
            }
        }

        let merged = merge_candidates(scored, self.params.top_k);
        debug!(action, candidates = merged.len(), "Candidates retrieved");
        Ok(merged)
    }

    async fn search_facet<'a>(
        &self,
        facet: Facet,
        index: &'a dyn SimilarityIndex,
        query: &[f32],
    ) -> Result<(Facet, &'a str, Vec<Neighbor>), LookupError> {
        let t = self.params.call_timeout;
        let hits = tokio::time::timeout(t, index.search(query, self.params.per_index_top_k))
            .await
            .map_err(|_| LookupError::IndexTimeout {
                index: index.name().to_string(),
                after: t,
            })?
            .map_err(|source| LookupError::Index {
                index: index.name().to_string(),
                source,
            })?;
        Ok((facet, index.name(), hits))
    }
}

/// Dedupes by `doc_id`, sorts, and caps at `top_k`.
///
/// Per record the highest similarity wins; equal similarity goes to the
/// facet with the stronger priority. Output order: similarity desc, then
/// facet priority, then `doc_id`.
pub fn merge_candidates(hits: Vec<ScoredCandidate>, top_k: usize) -> Vec<ScoredCandidate> {
    let mut best: HashMap<String, ScoredCandidate> = HashMap::new();
    for c in hits {
        let replace = best
            .get(&c.record.doc_id)
            .is_none_or(|prev| rank(prev, &c) == Ordering::Greater);
        if replace {
            best.insert(c.record.doc_id.clone(), c);
        }
    }

    let mut out: Vec<ScoredCandidate> = best.into_values().collect();
    out.sort_by(|a, b| rank(a, b).then_with(|| a.record.doc_id.cmp(&b.record.doc_id)));
    out.truncate(top_k);
    out
}

/// `Less` when `a` ranks ahead of `b`.
fn rank(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.similarity
        .total_cmp(&a.similarity)
        .then_with(|| a.matched_facet.priority().cmp(&b.matched_facet.priority()))
}
