//! In-memory stand-ins for the model services and indices.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use api_index::{
    ApiRecord, Facet, FlatIndex, IndexCatalog, IndexError, Neighbor, RecordStore, SimilarityIndex,
};
use futures::future::{BoxFuture, FutureExt};

use crate::error::ServiceError;
use crate::plan::ScoredCandidate;
use crate::services::{Completer, Embedder};

/// Fixed vectors per text, a default for everything else.
pub struct StubEmbedder {
    default: Vec<f32>,
    by_text: HashMap<String, Vec<f32>>,
    failing: HashSet<String>,
    delayed: HashMap<String, Duration>,
}

impl StubEmbedder {
    pub fn new(default: Vec<f32>) -> Self {
        Self {
            default,
            by_text: HashMap::new(),
            failing: HashSet::new(),
            delayed: HashMap::new(),
        }
    }

    pub fn with(mut self, text: &str, v: Vec<f32>) -> Self {
        self.by_text.insert(text.to_string(), v);
        self
    }

    pub fn failing_on(mut self, text: &str) -> Self {
        self.failing.insert(text.to_string());
        self
    }

    pub fn delayed_on(mut self, text: &str, d: Duration) -> Self {
        self.delayed.insert(text.to_string(), d);
        self
    }
}

impl Embedder for StubEmbedder {
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, ServiceError>> {
        async move {
            if let Some(d) = self.delayed.get(text) {
                tokio::time::sleep(*d).await;
            }
            if self.failing.contains(text) {
                return Err(ServiceError::Unavailable("embedder down".into()));
            }
            Ok(self
                .by_text
                .get(text)
                .cloned()
                .unwrap_or_else(|| self.default.clone()))
        }
        .boxed()
    }
}

type Reply = dyn Fn(&str) -> Result<String, ServiceError> + Send + Sync;

/// Answers every prompt through a closure and counts calls.
pub struct StubCompleter {
    reply: Box<Reply>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl StubCompleter {
    pub fn new(reply: impl Fn(&str) -> Result<String, ServiceError> + Send + Sync + 'static) -> Self {
        Self {
            reply: Box::new(reply),
            calls: AtomicUsize::new(0),
            delay: None,
        }
    }

    /// Every answer arrives after `d`.
    pub fn delayed(mut self, d: Duration) -> Self {
        self.delay = Some(d);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Completer for StubCompleter {
    fn complete<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, ServiceError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let out = (self.reply)(prompt);
        let delay = self.delay;
        async move {
            if let Some(d) = delay {
                tokio::time::sleep(d).await;
            }
            out
        }
        .boxed()
    }
}

/// Index returning canned hits, or failing on every search.
pub struct StubIndex {
    name: String,
    dim: usize,
    hits: Vec<Neighbor>,
    fail: bool,
    delay: Option<Duration>,
}

impl StubIndex {
    pub fn new(name: &str, dim: usize) -> Self {
        Self {
            name: name.to_string(),
            dim,
            hits: Vec::new(),
            fail: false,
            delay: None,
        }
    }

    pub fn with_hits(mut self, hits: Vec<(u64, f32)>) -> Self {
        self.hits = hits
            .into_iter()
            .map(|(vector_id, distance)| Neighbor {
                vector_id,
                distance,
            })
            .collect();
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn stalled(mut self, d: Duration) -> Self {
        self.delay = Some(d);
        self
    }
}

impl SimilarityIndex for StubIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn search<'a>(
        &'a self,
        _query: &'a [f32],
        k: usize,
    ) -> BoxFuture<'a, Result<Vec<Neighbor>, IndexError>> {
        let res = if self.fail {
            Err(IndexError::Qdrant("connection refused".into()))
        } else {
            Ok(self.hits.iter().take(k).copied().collect())
        };
        let delay = self.delay;
        async move {
            if let Some(d) = delay {
                tokio::time::sleep(d).await;
            }
            res
        }
        .boxed()
    }
}

pub fn record(doc_id: &str, signature: &str) -> ApiRecord {
    let mut r: ApiRecord = serde_json::from_value(serde_json::json!({ "doc_id": doc_id }))
        .expect("minimal record");
    r.full_signature = signature.to_string();
    r
}

pub fn candidate(doc_id: &str, facet: Facet, similarity: f32) -> ScoredCandidate {
    ScoredCandidate {
        record: Arc::new(record(doc_id, "")),
        matched_facet: facet,
        similarity,
        raw_distance: 1.0 / similarity - 1.0,
    }
}

pub fn candidate_with_signature(doc_id: &str, signature: &str, similarity: f32) -> ScoredCandidate {
    let mut c = candidate(doc_id, Facet::Description, similarity);
    c.record = Arc::new(record(doc_id, signature));
    c
}

/// Catalog over stub indices; `maps` are `(doc_id, index, vector_id)`.
pub fn catalog_with(maps: &[(&str, &str, u64)], indices: Vec<(Facet, StubIndex)>) -> Arc<IndexCatalog> {
    let mut b = RecordStore::builder();
    let mut seen = HashSet::new();
    for (doc_id, _, _) in maps {
        if seen.insert(*doc_id) {
            b.add_record(record(doc_id, "")).expect("unique doc");
        }
    }
    for (doc_id, index, vector_id) in maps {
        b.map_vector(index, *vector_id, doc_id).expect("known doc");
    }
    let indices = indices
        .into_iter()
        .map(|(f, i)| (f, Arc::new(i) as Arc<dyn SimilarityIndex>))
        .collect();
    Arc::new(IndexCatalog::new(b.build(), indices))
}

/// Small image-editing corpus over three real flat indices (dim 2).
///
/// `[1, 0]` is close to crop (and trim), `[0, 1]` is close to scale only.
pub fn image_catalog() -> Arc<IndexCatalog> {
    let records = [
        record("crop", "Image.crop(x, y, w, h)"),
        record("trim", "Image.trim(edges)"),
        record("scale", "Image.scale(factor)"),
        record("rotate", "Image.rotate(degrees)"),
    ];
    let layout: [(Facet, &[(u64, &str, [f32; 2])]); 3] = [
        (
            Facet::Description,
            &[
                (0, "crop", [1.0, 0.0]),
                (1, "scale", [0.0, 1.0]),
                (2, "rotate", [5.0, 5.0]),
                (3, "trim", [0.8, 0.0]),
            ],
        ),
        (
            Facet::Details,
            &[
                (0, "crop", [1.0, 0.2]),
                (1, "scale", [0.1, 1.0]),
                (2, "rotate", [6.0, 6.0]),
            ],
        ),
        (
            Facet::Example,
            &[(0, "trim", [1.0, 0.3]), (1, "scale", [0.0, 1.1])],
        ),
    ];

    let mut b = RecordStore::builder();
    for r in records {
        b.add_record(r).expect("unique doc");
    }
    let mut indices: Vec<(Facet, Arc<dyn SimilarityIndex>)> = Vec::new();
    for (facet, rows) in layout {
        let mut idx = FlatIndex::new(facet.as_str(), 2).expect("dim");
        for (vector_id, doc_id, v) in rows {
            idx.add(*vector_id, v).expect("dim");
            b.map_vector(facet.as_str(), *vector_id, doc_id).expect("known doc");
        }
        indices.push((facet, Arc::new(idx)));
    }
    Arc::new(IndexCatalog::new(b.build(), indices))
}
