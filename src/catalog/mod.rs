//! Catalog access: search, candidate extraction, caching and resolution.
//!
//! Everything here is synchronous state plus small async jobs that only
//! perform I/O; completions are applied back on the UI thread.

mod cache;
mod channel;
mod client;
mod error;
mod extract;
pub mod http;
mod resolve;
mod types;

pub use cache::{CacheLookup, CacheUpdate, FetchDone, FetchJob, ResultCache};
pub use channel::{WorkerChannel, WorkerMessage};
pub use client::CatalogClient;
pub use error::{Error, Result};
pub use extract::{bbox_from_description, extract, spatial_bounds, MapCandidate};
pub use resolve::{select_tile_template, Enrichment, ResolvedLayerData, TileDescriptorResolver};
pub use types::{DatasetRecord, Resource};
