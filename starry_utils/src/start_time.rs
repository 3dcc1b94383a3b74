use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;

/// Set once the first shard is ready.
pub static START_TIME: OnceCell<DateTime<Utc>> = OnceCell::new();
