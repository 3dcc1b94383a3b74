pub mod cmd_error;
mod cmd_help;
mod cmd_ping;
mod cmd_purge;
mod cmd_recalculate;
mod cmd_refresh;
mod cmd_reset;
mod cmd_shutdown;
mod cmd_stars;
mod cmd_stats;
pub mod groups;
mod parse;

pub use cmd_error::*;
pub use cmd_help::*;
pub use cmd_ping::*;
pub use cmd_purge::*;
pub use cmd_recalculate::*;
pub use cmd_refresh::*;
pub use cmd_reset::*;
pub use cmd_shutdown::*;
pub use cmd_stars::*;
pub use cmd_stats::*;
pub use groups::*;

use serenity::client::Context;
use serenity::framework::standard::CommandError;
use starry_board::{Starboard, StarboardKey};
use std::sync::Arc;

/// Pulls the starboard out of the client's data. It's inserted before the client starts, so
/// this only fails if something went very wrong during startup.
pub(crate) async fn get_starboard(ctx: &Context) -> Result<Arc<Starboard>, CommandError> {
    ctx.data
        .read()
        .await
        .get::<StarboardKey>()
        .cloned()
        .ok_or_else(|| "the starboard isn't in the client's data".into())
}
