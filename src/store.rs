/// Record store client module.
///
/// This module provides the blocking HTTP client for the PostgREST-style
/// record store, the `RecordStore` trait that the browser depends on, and
/// the query type for server-side text search.
mod client;
mod query;

pub use client::{
    DEFAULT_FETCH_LIMIT, RecordStore, StoreClient, StoreClientBuilder, StoreError,
};
pub use query::{RecordQuery, escape_like};
