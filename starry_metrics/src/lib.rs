//! Prometheus metrics for the bot.
//!
//! Layout follows sushiibot's metrics model:
//! https://raw.githubusercontent.com/sushiibot/sushii-2/888fbcdaecc0838e5c3735a5aac677a2d327ef10/src/model/metrics.rs

mod background_updater;
mod command_run_hook;

pub use background_updater::*;
pub use command_run_hook::*;

use once_cell::sync::OnceCell;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use prometheus_static_metric::make_static_metric;
use serde::{Deserialize, Serialize};
use serenity::{model::event::Event, prelude::TypeMapKey};
use std::{io, path::Path, sync::Arc};

/// Where counters are persisted between restarts.
pub const METRICS_FILE: &str = "metrics.json";

#[allow(clippy::nonstandard_macro_braces)] // originates in a macro, nothing i can do
make_static_metric! {
    pub label_enum EventType {
        channel_delete,
        guild_create,
        guild_delete,
        message_create,
        message_delete,
        message_delete_bulk,
        message_update,
        reaction_add,
        reaction_remove,
        reaction_remove_all,
        reaction_remove_emoji,
        ready,
        resumed,
        other,
    }

    pub label_enum EntryAction {
        created,
        updated,
        removed,
    }

    pub label_enum CommandName {
        help,
        ping,
        stats,
        stars,
        refresh,
        recalculate,
        purgechannel,
        resetboard,
        shutdown,
    }

    pub struct EventCounterVec: IntCounter {
        "event_type" => EventType,
    }

    pub struct EntryCounterVec: IntCounter {
        "action" => EntryAction,
    }

    pub struct CommandCounterVec: IntCounter {
        "command" => CommandName,
    }
}

pub static METRICS: OnceCell<Arc<Metrics>> = OnceCell::new();

/// Encodes the global registry in the prometheus text format.
pub fn serialize_metrics() -> prometheus::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    if let Some(m) = METRICS.get() {
        TextEncoder::new().encode(&m.registry.gather(), &mut buffer)?;
    }
    Ok(buffer)
}

#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsJson {
    entries: Entries,
    total_commands: u64,
    total_events: u64,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entries {
    created: u64,
    updated: u64,
    removed: u64,
}

pub struct Metrics {
    pub registry: Registry,
    pub events: EventCounterVec,
    pub entry_actions: EntryCounterVec,
    pub commands: CommandCounterVec,
    pub entries: IntGauge,
    pub stars: IntGauge,
    pub total_commands: IntCounter,
    pub total_events: IntCounter,
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let events_vec =
            IntCounterVec::new(Opts::new("events", "Gateway events"), &["event_type"])?;
        let events_static_vec = EventCounterVec::from(&events_vec);

        let entries_vec = IntCounterVec::new(
            Opts::new("entry_actions", "Starboard entries created, updated and removed"),
            &["action"],
        )?;
        let entries_static_vec = EntryCounterVec::from(&entries_vec);

        let commands_vec =
            IntCounterVec::new(Opts::new("commands", "Commands run"), &["command"])?;
        let commands_static_vec = CommandCounterVec::from(&commands_vec);

        let entries = IntGauge::new("entries", "Current starboard entries")?;
        let stars = IntGauge::new("stars", "Stars across all starboard entries")?;
        let total_commands = IntCounter::new("total_commands", "Total commands run")?;
        let total_events = IntCounter::new("total_events", "Total gateway events")?;

        let registry = Registry::new_custom(Some("starry".into()), None)?;
        registry.register(Box::new(events_vec))?;
        registry.register(Box::new(entries_vec))?;
        registry.register(Box::new(commands_vec))?;
        registry.register(Box::new(entries.clone()))?;
        registry.register(Box::new(stars.clone()))?;
        registry.register(Box::new(total_commands.clone()))?;
        registry.register(Box::new(total_events.clone()))?;

        Ok(Self {
            registry,
            events: events_static_vec,
            entry_actions: entries_static_vec,
            commands: commands_static_vec,
            entries,
            stars,
            total_commands,
            total_events,
        })
    }

    /// Counts one gateway event.
    pub fn raw_event(&self, event: &Event) {
        match event {
            Event::ChannelDelete(_) => self.events.channel_delete.inc(),
            Event::GuildCreate(_) => self.events.guild_create.inc(),
            Event::GuildDelete(_) => self.events.guild_delete.inc(),
            Event::MessageCreate(_) => self.events.message_create.inc(),
            Event::MessageDelete(_) => self.events.message_delete.inc(),
            Event::MessageDeleteBulk(_) => self.events.message_delete_bulk.inc(),
            Event::MessageUpdate(_) => self.events.message_update.inc(),
            Event::ReactionAdd(_) => self.events.reaction_add.inc(),
            Event::ReactionRemove(_) => self.events.reaction_remove.inc(),
            Event::ReactionRemoveAll(_) => self.events.reaction_remove_all.inc(),
            Event::ReactionRemoveEmoji(_) => self.events.reaction_remove_emoji.inc(),
            Event::Ready(_) => self.events.ready.inc(),
            Event::Resumed(_) => self.events.resumed.inc(),
            _ => self.events.other.inc(),
        };
        self.total_events.inc();
    }

    /// The counter for a command, by its registered name.
    pub fn command_counter(&self, name: &str) -> Option<&IntCounter> {
        let c = &self.commands;
        Some(match name {
            "help" => &c.help,
            "ping" => &c.ping,
            "stats" => &c.stats,
            "stars" => &c.stars,
            "refresh" => &c.refresh,
            "recalculate" => &c.recalculate,
            "purgechannel" => &c.purgechannel,
            "resetboard" => &c.resetboard,
            "shutdown" => &c.shutdown,
            _ => return None,
        })
    }

    fn snapshot(&self) -> MetricsJson {
        MetricsJson {
            entries: Entries {
                created: self.entry_actions.created.get(),
                updated: self.entry_actions.updated.get(),
                removed: self.entry_actions.removed.get(),
            },
            total_commands: self.total_commands.get(),
            total_events: self.total_events.get(),
        }
    }

    /// Load counters saved by [`Metrics::save_metrics`]. A missing file is not an error.
    pub async fn load_metrics(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let buf = match tokio::fs::read(path).await {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        };
        let d = serde_json::from_slice::<MetricsJson>(&buf[..])?;
        self.entry_actions.created.inc_by(d.entries.created);
        self.entry_actions.updated.inc_by(d.entries.updated);
        self.entry_actions.removed.inc_by(d.entries.removed);
        self.total_commands.inc_by(d.total_commands);
        self.total_events.inc_by(d.total_events);
        Ok(())
    }

    /// Save counters to disk.
    pub async fn save_metrics(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let r = serde_json::to_vec(&self.snapshot())?;
        tokio::fs::write(path, r).await
    }
}

impl TypeMapKey for Metrics {
    type Value = Arc<Metrics>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_names_map_to_counters() {
        let m = Metrics::new().unwrap();
        for name in [
            "help",
            "ping",
            "stats",
            "stars",
            "refresh",
            "recalculate",
            "purgechannel",
            "resetboard",
            "shutdown",
        ] {
            m.command_counter(name).unwrap().inc();
        }
        assert!(m.command_counter("eval").is_none());
        assert_eq!(m.commands.stats.get(), 1);
        assert_eq!(m.commands.resetboard.get(), 1);
    }

    #[tokio::test]
    async fn counters_survive_a_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(METRICS_FILE);

        let before = Metrics::new().unwrap();
        before.entry_actions.created.inc_by(3);
        before.entry_actions.removed.inc();
        before.total_events.inc_by(40);
        before.save_metrics(&path).await.unwrap();

        let after = Metrics::new().unwrap();
        after.load_metrics(&path).await.unwrap();
        assert_eq!(after.snapshot(), before.snapshot());
        assert_eq!(after.entry_actions.created.get(), 3);
        assert_eq!(after.entry_actions.updated.get(), 0);
    }

    #[tokio::test]
    async fn missing_file_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let m = Metrics::new().unwrap();
        m.load_metrics(dir.path().join("nope.json")).await.unwrap();
        assert_eq!(m.snapshot(), MetricsJson::default());
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(METRICS_FILE);
        tokio::fs::write(&path, b"{").await.unwrap();
        let m = Metrics::new().unwrap();
        assert!(m.load_metrics(&path).await.is_err());
    }

    #[test]
    fn registry_is_prefixed() {
        let m = Metrics::new().unwrap();
        m.entries.set(2);
        let mut buf = Vec::new();
        TextEncoder::new().encode(&m.registry.gather(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("starry_entries 2"));
    }
}
