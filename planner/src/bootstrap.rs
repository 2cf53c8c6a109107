//! Catalog loading from environment variables.
//!
//! `INDEX_BACKEND=flat` (default) reads local JSONL files under `CORPUS_DIR`:
//! - `records.jsonl`
//! - `vector_map.jsonl`
//! - `index/<facet>.jsonl` for each facet present
//!
//! `INDEX_BACKEND=qdrant` reads the same two record files and connects one
//! collection per facet, named `{QDRANT_COLLECTION_PREFIX}_{facet}`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use api_index::{
    DistanceKind, Facet, FlatIndex, IndexCatalog, QdrantIndex, QdrantIndexConfig, RecordStore,
    SimilarityIndex,
};
use tracing::{info, warn};

use crate::cfg::env;
use crate::error::PlanError;

#[derive(Clone, Debug, PartialEq)]
pub enum IndexBackend {
    Flat,
    Qdrant {
        url: String,
        api_key: Option<String>,
        collection_prefix: String,
        distance: DistanceKind,
        exact: bool,
    },
}

/// Where the corpus lives and how its indices are served.
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogSource {
    pub corpus_dir: PathBuf,
    pub backend: IndexBackend,
}

impl CatalogSource {
    pub fn from_env() -> Result<Self, PlanError> {
        let corpus_dir = PathBuf::from(env("CORPUS_DIR", "corpus"));
        let backend = match env("INDEX_BACKEND", "flat").to_ascii_lowercase().as_str() {
            "flat" => IndexBackend::Flat,
            "qdrant" => IndexBackend::Qdrant {
                url: env("QDRANT_URL", "http://localhost:6334"),
                api_key: std::env::var("QDRANT_API_KEY")
                    .ok()
                    .filter(|k| !k.trim().is_empty()),
                collection_prefix: env("QDRANT_COLLECTION_PREFIX", "api_docs"),
                distance: env("QDRANT_DISTANCE", "cosine").parse()?,
                exact: env("RAG_EXACT_SEARCH", "false") == "true",
            },
            other => {
                return Err(PlanError::Config(format!(
                    "INDEX_BACKEND must be 'flat' or 'qdrant', got '{other}'"
                )));
            }
        };
        Ok(Self {
            corpus_dir,
            backend,
        })
    }
}

/// Loads the record store and every available facet index.
///
/// # Errors
/// Load failures, or a corpus with no facet index at all.
pub async fn load_catalog(src: &CatalogSource) -> Result<IndexCatalog, PlanError> {
    let store = RecordStore::load(
        src.corpus_dir.join("records.jsonl"),
        src.corpus_dir.join("vector_map.jsonl"),
    )?;

    let mut indices: Vec<(Facet, Arc<dyn SimilarityIndex>)> = Vec::new();
    for facet in Facet::ALL {
        match &src.backend {
            IndexBackend::Flat => {
                let path = flat_index_path(&src.corpus_dir, facet);
                if !path.exists() {
                    warn!(facet = %facet, path = ?path, "Facet index file missing; skipped");
                    continue;
                }
                indices.push((facet, Arc::new(FlatIndex::load(facet.as_str(), &path)?)));
            }
            IndexBackend::Qdrant {
                url,
                api_key,
                collection_prefix,
                distance,
                exact,
            } => {
                let mut cfg = QdrantIndexConfig::new(url.clone(), format!("{collection_prefix}_{facet}"));
                cfg.api_key = api_key.clone();
                cfg.distance = *distance;
                cfg.exact_search = *exact;
                indices.push((facet, Arc::new(QdrantIndex::connect(facet.as_str(), &cfg).await?)));
            }
        }
    }

    if indices.is_empty() {
        return Err(PlanError::Config(format!(
            "no facet index found under {}",
            src.corpus_dir.display()
        )));
    }

    info!(
        records = store.len(),
        indices = indices.len(),
        "Catalog ready"
    );
    Ok(IndexCatalog::new(store, indices))
}

fn flat_index_path(dir: &Path, facet: Facet) -> PathBuf {
    dir.join("index").join(format!("{}.jsonl", facet.as_str()))
}
