//! Record lookup keyed by `(index name, vector id)`.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::errors::IndexError;
use crate::io_jsonl::{VectorMapRow, read_jsonl};
use crate::record::ApiRecord;

/// Immutable `doc_id → record` map plus per-index vector id mapping.
///
/// Built once, then shared read-only; lookups need no locking.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: HashMap<String, Arc<ApiRecord>>,
    vectors: HashMap<String, HashMap<u64, Arc<ApiRecord>>>,
}

impl RecordStore {
    pub fn builder() -> RecordStoreBuilder {
        RecordStoreBuilder::default()
    }

    /// Record behind `vector_id` in `index`, if any.
    pub fn get(&self, index: &str, vector_id: u64) -> Option<Arc<ApiRecord>> {
        self.vectors.get(index)?.get(&vector_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Loads `records.jsonl` and `vector_map.jsonl`.
    ///
    /// # Errors
    /// I/O and parse errors, duplicate `doc_id`s, or mappings to unknown records.
    pub fn load(
        records_path: impl AsRef<Path>,
        vector_map_path: impl AsRef<Path>,
    ) -> Result<Self, IndexError> {
        let records: Vec<ApiRecord> = read_jsonl(records_path)?;
        let rows: Vec<VectorMapRow> = read_jsonl(vector_map_path)?;

        let mut b = Self::builder();
        for r in records {
            b.add_record(r)?;
        }
        for row in rows {
            b.map_vector(&row.index, row.vector_id, &row.doc_id)?;
        }
        let store = b.build();
        info!(
            records = store.len(),
            indices = store.vectors.len(),
            "Record store loaded"
        );
        Ok(store)
    }
}

/// Incremental constructor for [`RecordStore`].
#[derive(Debug, Default)]
pub struct RecordStoreBuilder {
    inner: RecordStore,
}

impl RecordStoreBuilder {
    pub fn add_record(&mut self, record: ApiRecord) -> Result<&mut Self, IndexError> {
        if self.inner.records.contains_key(&record.doc_id) {
            return Err(IndexError::DuplicateDocId(record.doc_id));
        }
        self.inner
            .records
            .insert(record.doc_id.clone(), Arc::new(record));
        Ok(self)
    }

    pub fn map_vector(
        &mut self,
        index: &str,
        vector_id: u64,
        doc_id: &str,
    ) -> Result<&mut Self, IndexError> {
        let record = self
            .inner
            .records
            .get(doc_id)
            .cloned()
            .ok_or_else(|| IndexError::UnknownDocId {
                index: index.to_string(),
                vector_id,
                doc_id: doc_id.to_string(),
            })?;
        self.inner
            .vectors
            .entry(index.to_string())
            .or_default()
            .insert(vector_id, record);
        Ok(self)
    }

    pub fn build(self) -> RecordStore {
        self.inner
    }
}
