//! Exact in-memory index with squared Euclidean distance.

use std::path::Path;

use futures::future::{self, BoxFuture, FutureExt};
use tracing::info;

use crate::errors::IndexError;
use crate::index::{Neighbor, SimilarityIndex};
use crate::io_jsonl::{VectorRow, read_jsonl};

/// Brute-force L2 index. Vectors are stored row-major in one buffer.
#[derive(Debug)]
pub struct FlatIndex {
    name: String,
    dim: usize,
    ids: Vec<u64>,
    data: Vec<f32>,
}

impl FlatIndex {
    pub fn new(name: impl Into<String>, dim: usize) -> Result<Self, IndexError> {
        let name = name.into();
        if dim == 0 {
            return Err(IndexError::Config(format!(
                "index '{name}': dimension must be > 0"
            )));
        }
        Ok(Self {
            name,
            dim,
            ids: Vec::new(),
            data: Vec::new(),
        })
    }

    pub fn add(&mut self, vector_id: u64, vector: &[f32]) -> Result<(), IndexError> {
        if vector.len() != self.dim {
            return Err(IndexError::QueryDimension {
                index: self.name.clone(),
                got: vector.len(),
                want: self.dim,
            });
        }
        self.ids.push(vector_id);
        self.data.extend_from_slice(vector);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Loads `{"vector_id","vector"}` rows; the first row fixes the dimension.
    pub fn load(name: impl Into<String>, path: impl AsRef<Path>) -> Result<Self, IndexError> {
        let name = name.into();
        let rows: Vec<VectorRow> = read_jsonl(path)?;
        let dim = rows.first().map(|r| r.vector.len()).ok_or_else(|| {
            IndexError::Config(format!("index '{name}' has no vectors"))
        })?;

        let mut idx = Self::new(name, dim)?;
        idx.ids.reserve(rows.len());
        idx.data.reserve(rows.len() * dim);
        for row in rows {
            idx.add(row.vector_id, &row.vector)?;
        }
        info!(index = %idx.name, dim, vectors = idx.len(), "Flat index loaded");
        Ok(idx)
    }

    fn search_sync(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, IndexError> {
        if query.len() != self.dim {
            return Err(IndexError::QueryDimension {
                index: self.name.clone(),
                got: query.len(),
                want: self.dim,
            });
        }

        let mut hits: Vec<Neighbor> = self
            .ids
            .iter()
            .zip(self.data.chunks_exact(self.dim))
            .map(|(&vector_id, v)| Neighbor {
                vector_id,
                distance: squared_l2(query, v),
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.vector_id.cmp(&b.vector_id))
        });
        hits.truncate(k);
        Ok(hits)
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

impl SimilarityIndex for FlatIndex {
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
        future::ready(self.search_sync(query, k)).boxed()
    }
}
