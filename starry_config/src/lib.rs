//! Starry's bot-wide configuration.
//!
//! This crate contains a struct for the config, and
//! a static OnceCell that will contain the config once set up.

mod config;
mod database;
mod env;

pub use config::*;
pub use database::*;

use once_cell::sync::OnceCell;
use std::{io, path::PathBuf};
use thiserror::Error;

pub static BOT_CONFIG: OnceCell<BotConfig> = OnceCell::new();

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("created a default config at {0}, edit it and restart please")]
    DefaultWritten(PathBuf),

    #[error("couldn't read or write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("couldn't read the secret file {path} for {key}: {source}")]
    SecretFile {
        key: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("looks like something is wrong with your config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },

    #[error("the config was already set")]
    AlreadySet,
}
