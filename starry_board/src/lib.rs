//! The starboard itself: deciding what qualifies, rendering posts and keeping them in sync.

mod embed;
mod error;
mod locks;
mod manager;
mod plan;
mod recount;
mod stars;

pub use embed::*;
pub use error::*;
pub use locks::*;
pub use manager::*;
pub use plan::*;
pub use recount::*;
pub use stars::*;

use serenity::prelude::TypeMapKey;
use std::sync::Arc;

pub struct StarboardKey;

impl TypeMapKey for StarboardKey {
    type Value = Arc<Starboard>;
}
