mod ids;
mod record;
mod topic_chip;

pub use ids::RecordId;
pub use record::{Record, RecordBuilder};
pub use topic_chip::{TopicChip, TopicRow};
