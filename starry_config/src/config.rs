use crate::{env::EnvSource, ConfigError, DatabaseConfig, BOT_CONFIG};
use serde::{Deserialize, Serialize};
use std::{fs, io, path::Path};
use toml::{Table, Value};
use tracing::warn;

/// The colour of the embed for the starred message itself.
pub const DEFAULT_COLOUR: u32 = 0xFDD835;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    token: String,
    starboard_channel: u64,
    emoji: String,
    minimum_stars: i16,
    exclude_self_stars: bool,
    recalculate_on_startup: bool,
    prefix: String,
    metrics_port: Option<u16>,
    colour: u32,
    database: DatabaseConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            starboard_channel: 0,
            emoji: "⭐".to_string(),
            minimum_stars: 3,
            exclude_self_stars: true,
            recalculate_on_startup: false,
            prefix: "~".to_string(),
            metrics_port: None,
            colour: DEFAULT_COLOUR,
            database: DatabaseConfig::default(),
        }
    }
}

const DEFAULT_CONFIG: &str = "# The token of the bot: https://discord.com/developers/applications
token = \"TOKEN HERE\"

# The ID of the channel starred messages get reposted to
starboard_channel = 0

# The emoji that counts as a star. Only unicode emoji are supported.
emoji = \"⭐\"

# How many stars a message needs before it shows up on the starboard
minimum_stars = 3

# Whether the author starring their own message counts towards the total
exclude_self_stars = true

# Recount every entry once the bot is ready
recalculate_on_startup = false

# The prefix for commands. Mentioning the bot works too.
prefix = \"~\"

# Serve prometheus metrics on this port. Leave commented out to disable.
# metrics_port = 9100

# The colour of starboard embeds: https://www.checkyourmath.com/convert/color/rgb_decimal.php
colour = 16635957

# DB login stuff: PostgreSQL
[database]
host = \"localhost\"
port = 5432
user = \"postgres\"
password = \"postgres\"
# db = \"starry\"
# unix_socket = \"/var/run/postgresql/\"
";

/// Keys with a usable default: where they live in the file, and their environment variable.
const DEFAULTED_KEYS: &[(&str, Option<&str>)] = &[
    ("emoji", Some("EMOJI")),
    ("minimum_stars", Some("MINIMUM_REACTIONS")),
    ("exclude_self_stars", Some("EXCLUDE_SELF_STARS")),
    ("recalculate_on_startup", Some("RECALCULATE_ON_STARTUP")),
    ("prefix", Some("COMMAND_PREFIX")),
    ("colour", None),
    ("database.host", Some("DATABASE_HOST")),
    ("database.port", Some("DATABASE_PORT")),
    ("database.user", Some("DATABASE_USERNAME")),
];

fn in_file(file: &Table, path: &str) -> bool {
    let mut table = file;
    let mut parts = path.split('.').peekable();
    while let Some(part) = parts.next() {
        match (table.get(part), parts.peek()) {
            (Some(_), None) => return true,
            (Some(Value::Table(t)), Some(_)) => table = t,
            _ => return false,
        }
    }
    false
}

/// Keys set neither in the file nor in the environment.
fn defaulted_keys<F>(file: &Table, env: &EnvSource<F>) -> Vec<&'static str>
where
    F: Fn(&str) -> Option<String>,
{
    DEFAULTED_KEYS
        .iter()
        .filter(|(path, var)| !in_file(file, path) && !var.is_some_and(|v| env.is_provided(v)))
        .map(|(path, _)| *path)
        .collect()
}

impl BotConfig {
    /// Loads the config from `config_path` and the process environment and stores it in
    /// [`BOT_CONFIG`].
    pub fn set(config_path: impl AsRef<Path>) -> Result<&'static BotConfig, ConfigError> {
        let config = Self::load(config_path.as_ref(), |key| std::env::var(key).ok())?;
        BOT_CONFIG
            .try_insert(config)
            .map_err(|_| ConfigError::AlreadySet)
    }

    /// Reads `config_path` (if it exists), then applies overrides from `env`.
    ///
    /// When there is neither a config file nor a token in the environment, a commented
    /// default config is written to `config_path` and [`ConfigError::DefaultWritten`] returned.
    pub fn load<F>(config_path: &Path, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvSource::new(env);
        let (mut config, file) = match fs::read_to_string(config_path) {
            Ok(raw) => (toml::from_str::<BotConfig>(&raw)?, raw.parse::<Table>()?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                if !env.is_provided("DISCORD_TOKEN") {
                    fs::write(config_path, DEFAULT_CONFIG).map_err(|source| ConfigError::Io {
                        path: config_path.to_path_buf(),
                        source,
                    })?;
                    return Err(ConfigError::DefaultWritten(config_path.to_path_buf()));
                }
                warn!(
                    "{} not found, configuring from the environment only",
                    config_path.display()
                );
                (BotConfig::default(), Table::new())
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: config_path.to_path_buf(),
                    source,
                })
            }
        };
        config.apply_env(&env)?;
        for key in defaulted_keys(&file, &env) {
            warn!("{} has not been configured, using the default", key);
        }
        config.validate()?;
        Ok(config)
    }

    fn apply_env<F>(&mut self, env: &EnvSource<F>) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = env.string("DISCORD_TOKEN")? {
            self.token = v;
        }
        if let Some(v) = env.parse("STARBOARD_CHANNEL")? {
            self.starboard_channel = v;
        }
        if let Some(v) = env.string("EMOJI")? {
            self.emoji = v.trim().to_string();
        }
        if let Some(v) = env.parse("MINIMUM_REACTIONS")? {
            self.minimum_stars = v;
        }
        if let Some(v) = env.parse("EXCLUDE_SELF_STARS")? {
            self.exclude_self_stars = v;
        }
        if let Some(v) = env.parse("RECALCULATE_ON_STARTUP")? {
            self.recalculate_on_startup = v;
        }
        if let Some(v) = env.string("COMMAND_PREFIX")? {
            self.prefix = v;
        }
        if let Some(v) = env.parse("METRICS_PORT")? {
            self.metrics_port = Some(v);
        }
        if let Some(v) = env.string("DATABASE_HOST")? {
            self.database.host = v;
        }
        if let Some(v) = env.parse("DATABASE_PORT")? {
            self.database.port = v;
        }
        if let Some(v) = env.string("DATABASE_USERNAME")? {
            self.database.user = v;
        }
        if let Some(v) = env.string("DATABASE_PASSWORD")? {
            self.database.password = v;
        }
        if let Some(v) = env.string("DATABASE_NAME")? {
            self.database.db = Some(v);
        }
        if let Some(v) = env.string("DATABASE_SOCKET")? {
            self.database.unix_socket = Some(v);
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, reason: &str| ConfigError::Invalid {
            key: key.to_string(),
            reason: reason.to_string(),
        };
        if self.token.trim().is_empty() {
            return Err(invalid("token", "no token configured"));
        }
        if self.starboard_channel == 0 {
            return Err(invalid("starboard_channel", "no starboard channel configured"));
        }
        if self.emoji.is_empty() {
            return Err(invalid("emoji", "the star emoji can't be empty"));
        }
        if self.minimum_stars < 1 {
            return Err(invalid("minimum_stars", "must be at least 1"));
        }
        if self.database.password.is_empty() {
            warn!("no database password configured, trying to connect without one");
        }
        Ok(())
    }

    pub fn token(&self) -> &str {
        &self.token
    }
    pub fn starboard_channel(&self) -> u64 {
        self.starboard_channel
    }
    pub fn emoji(&self) -> &str {
        &self.emoji
    }
    pub fn minimum_stars(&self) -> i16 {
        self.minimum_stars
    }
    pub fn exclude_self_stars(&self) -> bool {
        self.exclude_self_stars
    }
    pub fn recalculate_on_startup(&self) -> bool {
        self.recalculate_on_startup
    }
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
    pub fn metrics_port(&self) -> Option<u16> {
        self.metrics_port
    }
    pub fn colour(&self) -> u32 {
        self.colour
    }
    pub fn database(&self) -> &DatabaseConfig {
        &self.database
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn writes_default_config_when_nothing_is_configured() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        match BotConfig::load(&path, env_of(&[])) {
            Err(ConfigError::DefaultWritten(p)) => assert_eq!(p, path),
            other => panic!("unexpected result: {:?}", other),
        }
        let written = fs::read_to_string(&path).unwrap();
        // the default must itself be valid TOML for BotConfig
        let parsed: BotConfig = toml::from_str(&written).unwrap();
        assert_eq!(parsed.emoji(), "⭐");
        assert_eq!(parsed.colour(), DEFAULT_COLOUR);
        assert_eq!(parsed.minimum_stars(), 3);
    }

    #[test]
    fn environment_only_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = BotConfig::load(
            &path,
            env_of(&[
                ("DISCORD_TOKEN", "abc"),
                ("STARBOARD_CHANNEL", "1181409862553829406"),
                ("DATABASE_PASSWORD", "hunter2"),
            ]),
        )
        .unwrap();

        assert!(!path.exists());
        assert_eq!(config.token(), "abc");
        assert_eq!(config.starboard_channel(), 1181409862553829406);
        assert_eq!(config.minimum_stars(), 3);
        assert!(config.exclude_self_stars());
        assert_eq!(config.prefix(), "~");
        assert_eq!(config.database().db_login(), ("postgres", "hunter2", "postgres"));
    }

    #[test]
    fn environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "token = \"from-file\"\nstarboard_channel = 42\nminimum_stars = 5\n\n[database]\nhost = \"db\"\n",
        )
        .unwrap();

        let config = BotConfig::load(
            &path,
            env_of(&[("MINIMUM_REACTIONS", "2"), ("EMOJI", " 🌟 ")]),
        )
        .unwrap();
        assert_eq!(config.token(), "from-file");
        assert_eq!(config.starboard_channel(), 42);
        assert_eq!(config.minimum_stars(), 2);
        assert_eq!(config.emoji(), "🌟");
        assert_eq!(
            config.database().db_connection(),
            crate::DatabaseConnection::TcpSocket("db".to_string(), 5432)
        );
    }

    #[test]
    fn rejects_bad_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let no_channel = BotConfig::load(&path, env_of(&[("DISCORD_TOKEN", "abc")]));
        match no_channel {
            Err(ConfigError::Invalid { key, .. }) => assert_eq!(key, "starboard_channel"),
            other => panic!("unexpected result: {:?}", other),
        }

        let zero_stars = BotConfig::load(
            &path,
            env_of(&[
                ("DISCORD_TOKEN", "abc"),
                ("STARBOARD_CHANNEL", "7"),
                ("MINIMUM_REACTIONS", "0"),
            ]),
        );
        match zero_stars {
            Err(ConfigError::Invalid { key, .. }) => assert_eq!(key, "minimum_stars"),
            other => panic!("unexpected result: {:?}", other),
        }

        let bad_port = BotConfig::load(
            &path,
            env_of(&[
                ("DISCORD_TOKEN", "abc"),
                ("STARBOARD_CHANNEL", "7"),
                ("DATABASE_PORT", "-1"),
            ]),
        );
        match bad_port {
            Err(ConfigError::Invalid { key, .. }) => assert_eq!(key, "DATABASE_PORT"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn keys_left_unset_are_reported() {
        let file: Table = "emoji = \"🌟\"\n\n[database]\nhost = \"db\"\n"
            .parse()
            .unwrap();
        let env = EnvSource::new(env_of(&[
            ("MINIMUM_REACTIONS", "2"),
            ("DATABASE_USERNAME_FILE", "/run/secrets/user"),
        ]));
        let defaulted = defaulted_keys(&file, &env);

        for set in ["emoji", "minimum_stars", "database.host", "database.user"] {
            assert!(!defaulted.contains(&set), "{} was configured", set);
        }
        for unset in ["prefix", "colour", "database.port", "exclude_self_stars"] {
            assert!(defaulted.contains(&unset), "{} was not configured", unset);
        }
    }

    #[test]
    fn full_file_leaves_nothing_defaulted() {
        let file: Table = DEFAULT_CONFIG.parse().unwrap();
        let env = EnvSource::new(env_of(&[]));
        assert!(defaulted_keys(&file, &env).is_empty());
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "minimum_stars = \"three\"").unwrap();
        assert!(matches!(
            BotConfig::load(&path, env_of(&[])),
            Err(ConfigError::Parse(_))
        ));
    }
}
