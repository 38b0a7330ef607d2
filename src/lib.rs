pub mod browser;
pub mod filter;
pub mod models;
pub mod store;
pub mod topics;
pub mod tui;
pub mod utils;

pub use browser::{Browser, LoadState};
pub use filter::{MatchMode, TopicSelection, filter_records};
pub use models::{Record, RecordBuilder, RecordId, TopicChip, TopicRow};
pub use store::{RecordQuery, RecordStore, StoreClient, StoreClientBuilder, StoreError};
pub use topics::TopicNormalizer;
