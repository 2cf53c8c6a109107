//! Read-only API documentation corpus.
//!
//! This crate provides:
//! - the record model ([`ApiRecord`], [`Facet`]) and a [`RecordStore`] that
//!   resolves `(index, vector_id)` hits back to records;
//! - the [`SimilarityIndex`] trait with an exact in-memory [`FlatIndex`] and
//!   a Qdrant-backed [`QdrantIndex`];
//! - [`IndexCatalog`], the immutable snapshot queried by the planner;
//! - small pure helpers: distance scoring and the API-name classifier.
//!
//! Nothing here mutates after construction; all types are `Send + Sync`.

mod catalog;
mod config;
mod errors;
mod flat;
mod index;
pub mod io_jsonl;
pub mod naming;
mod qdrant_facade;
mod record;
pub mod scoring;
mod store;

pub use catalog::IndexCatalog;
pub use config::{DistanceKind, QdrantIndexConfig};
pub use errors::IndexError;
pub use flat::FlatIndex;
pub use index::{Neighbor, SimilarityIndex};
pub use qdrant_facade::QdrantIndex;
pub use record::{ApiRecord, Facet, MemberType};
pub use store::{RecordStore, RecordStoreBuilder};
