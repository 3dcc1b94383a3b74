use serenity::gateway::ShardManager;
use serenity::prelude::TypeMapKey;
use std::sync::Arc;

pub struct ShardManagerWrapper;
impl TypeMapKey for ShardManagerWrapper {
    type Value = Arc<ShardManager>;
}
