mod bot_info;
mod set_dir;
mod shard_manager_wrapper;
mod start_time;
mod update_status;
mod ws_latency;

pub use bot_info::*;
pub use set_dir::*;
pub use shard_manager_wrapper::*;
pub use start_time::*;
pub use update_status::*;
pub use ws_latency::*;
