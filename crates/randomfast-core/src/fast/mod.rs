mod progress;
mod record;
mod store;

pub use progress::FastProgress;
pub use record::{FastCollection, FastRecord, FastStats, FastStatus};
pub use store::{FastStore, OverlapPolicy, FAST_STORE_KEY};
