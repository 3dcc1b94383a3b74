use crate::PG_POOL;
use starry_config::{BotConfig, DatabaseConfig, DatabaseConnection};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{query, PgPool};
use tracing::{info, warn};

/// Statements run in order on every start. All of them must stay idempotent.
///
/// The `ALTER`s come first so tables created by older versions pick up the newer columns
/// before anything else touches them.
const SCHEMA: &[&str] = &[
    "ALTER TABLE IF EXISTS ONLY starboard
       ADD COLUMN IF NOT EXISTS original_author_id BIGINT NOT NULL DEFAULT -1",
    "ALTER TABLE IF EXISTS ONLY starboard
       ADD COLUMN IF NOT EXISTS referenced_message_id BIGINT",
    "ALTER TABLE IF EXISTS ONLY starboard
       ADD COLUMN IF NOT EXISTS referenced_author_id BIGINT",
    "CREATE TABLE IF NOT EXISTS starboard (
       original_message_id BIGINT NOT NULL PRIMARY KEY,
       original_channel_id BIGINT NOT NULL,
       original_author_id BIGINT NOT NULL,
       starboard_message_id BIGINT NOT NULL UNIQUE,
       referenced_message_id BIGINT,
       referenced_author_id BIGINT,
       stars SMALLINT NOT NULL
     )",
    "CREATE INDEX IF NOT EXISTS starboard_author_idx ON starboard (original_author_id)",
    "CREATE INDEX IF NOT EXISTS starboard_channel_idx ON starboard (original_channel_id)",
    "CREATE INDEX IF NOT EXISTS starboard_referenced_idx ON starboard (referenced_message_id)",
];

pub fn connect_options(config: &DatabaseConfig) -> PgConnectOptions {
    let (user, password, db) = config.db_login();
    let options = match config.db_connection() {
        DatabaseConnection::TcpSocket(host, port) => PgConnectOptions::new().host(&host).port(port),
        DatabaseConnection::UnixSocket(socket) => PgConnectOptions::new().socket(socket),
    };
    let options = options
        .username(user)
        .database(db)
        .application_name("starry")
        .statement_cache_capacity(100_usize);
    if password.is_empty() {
        options
    } else {
        options.password(password)
    }
}

/// Connects to the database, brings the schema up to date and stores the pool in [`PG_POOL`].
pub async fn set_db(config: &BotConfig) -> Result<PgPool, sqlx::Error> {
    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect_with(connect_options(config.database()))
        .await?;

    for statement in SCHEMA {
        query(statement).execute(&db).await?;
    }
    info!("database schema is up to date");

    if PG_POOL.set(db.clone()).is_err() {
        warn!("pool was already set, don't call `set_db` more than once");
    }

    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_creates_table_after_migrating_it() {
        let create = SCHEMA
            .iter()
            .position(|s| s.starts_with("CREATE TABLE"))
            .unwrap();
        assert!(SCHEMA[..create].iter().all(|s| s.starts_with("ALTER TABLE IF EXISTS")));
        assert!(SCHEMA.iter().all(|s| s.contains("IF NOT EXISTS")));
    }

    #[test]
    fn options_follow_config() {
        let config: DatabaseConfig =
            toml::from_str("host = \"db.internal\"\nport = 6543\nuser = \"star\"\n").unwrap();
        let options = connect_options(&config);
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_username(), "star");
        assert_eq!(options.get_database(), Some("star"));
    }
}
