//! Remote index configuration.

use std::str::FromStr;

use crate::errors::IndexError;

/// Distance function of a Qdrant collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DistanceKind {
    /// Cosine similarity; score in `[-1, 1]`, higher is closer.
    Cosine,
    /// Dot product; unbounded, higher is closer.
    Dot,
    /// Euclidean; score is already a distance.
    Euclid,
}

impl DistanceKind {
    /// Maps a Qdrant score to a non-negative distance where smaller is closer.
    ///
    /// Dot scores go through `exp(-score)`, which keeps the order for any
    /// magnitude; the resulting similarity is the logistic of the score.
    pub fn score_to_distance(self, score: f32) -> f32 {
        match self {
            DistanceKind::Cosine => (1.0 - score).max(0.0),
            DistanceKind::Dot => (-score).exp(),
            DistanceKind::Euclid => score,
        }
    }
}

impl FromStr for DistanceKind {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cosine" => Ok(DistanceKind::Cosine),
            "dot" => Ok(DistanceKind::Dot),
            "euclid" | "l2" => Ok(DistanceKind::Euclid),
            other => Err(IndexError::Config(format!("unknown distance: {other}"))),
        }
    }
}

/// Connection settings for one Qdrant-backed facet index.
#[derive(Clone, Debug)]
pub struct QdrantIndexConfig {
    /// Qdrant gRPC endpoint, e.g. `http://localhost:6334`.
    pub url: String,
    pub api_key: Option<String>,
    pub collection: String,
    pub distance: DistanceKind,
    /// Exact search flag (false = HNSW ANN).
    pub exact_search: bool,
}

impl QdrantIndexConfig {
    pub fn new(url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            collection: collection.into(),
            distance: DistanceKind::Cosine,
            exact_search: false,
        }
    }

    pub fn validate(&self) -> Result<(), IndexError> {
        if self.url.trim().is_empty() {
            return Err(IndexError::Config("qdrant url is empty".into()));
        }
        if self.collection.trim().is_empty() {
            return Err(IndexError::Config("collection is empty".into()));
        }
        Ok(())
    }
}
