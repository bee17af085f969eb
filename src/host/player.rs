//! Player-state capability and a JSON-backed toggle store

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::TimberConfig;
use crate::core::lifecycle::Component;
use crate::core::types::Result;

/// Stable player identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub const fn from_u128(v: u128) -> Self {
        Self(Uuid::from_u128(v))
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Per-player chopping toggle, owned by the host
pub trait PlayerState {
    fn is_chopping_enabled(&self, player: PlayerId) -> bool;

    /// Flip the player's toggle and return the new state (true = enabled)
    fn toggle_chopping(&mut self, player: PlayerId) -> bool;

    /// Apply a reloaded `chopping_enabled_by_default`. Players who set
    /// their own toggle keep it.
    fn set_default_enabled(&mut self, _enabled: bool) {}
}

/// On-disk layout of the toggle file
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PlayersFile {
    enabled_players: Vec<PlayerId>,
    disabled_players: Vec<PlayerId>,
}

/// Toggle store: players only appear when they differ from the default.
#[derive(Debug)]
pub struct PlayerStore {
    default_enabled: bool,
    overrides: HashMap<PlayerId, bool>,
    /// Backing file, if persistent
    path: Option<PathBuf>,
}

impl PlayerStore {
    /// In-memory store with no backing file
    pub fn new(default_enabled: bool) -> Self {
        Self {
            default_enabled,
            overrides: HashMap::new(),
            path: None,
        }
    }

    fn from_file(path: PathBuf, default_enabled: bool, file: PlayersFile) -> Self {
        let mut store = Self::new(default_enabled);
        store.path = Some(path);
        for id in file.enabled_players {
            store.set(id, true);
        }
        for id in file.disabled_players {
            store.set(id, false);
        }
        store
    }

    /// Open an existing toggle file or start empty
    pub async fn open(path: PathBuf, default_enabled: bool) -> Result<Self> {
        if path.exists() {
            let data = tokio::fs::read_to_string(&path).await?;
            let file: PlayersFile = serde_json::from_str(&data)?;
            Ok(Self::from_file(path, default_enabled, file))
        } else {
            Ok(Self::from_file(path, default_enabled, PlayersFile::default()))
        }
    }

    /// Open an existing toggle file or start empty (sync)
    pub fn open_sync(path: PathBuf, default_enabled: bool) -> Result<Self> {
        if path.exists() {
            let data = std::fs::read_to_string(&path)?;
            let file: PlayersFile = serde_json::from_str(&data)?;
            Ok(Self::from_file(path, default_enabled, file))
        } else {
            Ok(Self::from_file(path, default_enabled, PlayersFile::default()))
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Force a player's state
    pub fn set(&mut self, player: PlayerId, enabled: bool) {
        if enabled == self.default_enabled {
            self.overrides.remove(&player);
        } else {
            self.overrides.insert(player, enabled);
        }
    }

    fn snapshot(&self) -> PlayersFile {
        let mut file = PlayersFile::default();
        for (&id, &enabled) in &self.overrides {
            if enabled {
                file.enabled_players.push(id);
            } else {
                file.disabled_players.push(id);
            }
        }
        file.enabled_players.sort();
        file.disabled_players.sort();
        file
    }

    /// Write the toggle file
    pub async fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&self.snapshot())?;
        write_file(path.clone(), json).await
    }

    /// Snapshot now and write on the runtime without waiting for it.
    pub fn save_in_background(
        &self,
        runtime: &tokio::runtime::Handle,
    ) -> Option<tokio::task::JoinHandle<Result<()>>> {
        let path = self.path.clone()?;
        let json = match serde_json::to_string_pretty(&self.snapshot()) {
            Ok(json) => json,
            Err(e) => {
                log::error!("Failed to serialize player toggles: {}", e);
                return None;
            }
        };
        Some(runtime.spawn(async move {
            let result = write_file(path.clone(), json).await;
            if let Err(e) = &result {
                log::error!("Failed to save player toggles to {}: {}", path.display(), e);
            }
            result
        }))
    }

    /// Toggle and schedule a save; returns the new state
    pub fn toggle_and_persist(&mut self, player: PlayerId, runtime: &tokio::runtime::Handle) -> bool {
        let enabled = self.toggle_chopping(player);
        self.save_in_background(runtime);
        enabled
    }
}

async fn write_file(path: PathBuf, json: String) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, json).await?;
    Ok(())
}

impl PlayerState for PlayerStore {
    fn is_chopping_enabled(&self, player: PlayerId) -> bool {
        self.overrides.get(&player).copied().unwrap_or(self.default_enabled)
    }

    fn toggle_chopping(&mut self, player: PlayerId) -> bool {
        let enabled = !self.is_chopping_enabled(player);
        self.set(player, enabled);
        log::debug!("Chopping for {} is now {}", player, if enabled { "on" } else { "off" });
        enabled
    }

    fn set_default_enabled(&mut self, enabled: bool) {
        if enabled == self.default_enabled {
            return;
        }
        // Keep every player's effective state across the default flip.
        let players: Vec<_> = self.overrides.drain().collect();
        self.default_enabled = enabled;
        for (id, enabled) in players {
            self.set(id, enabled);
        }
    }
}

impl Component for PlayerStore {
    fn name(&self) -> &'static str {
        "player-store"
    }

    fn reset(&mut self, config: &TimberConfig) -> Result<()> {
        self.set_default_enabled(config.chopping_enabled_by_default);
        Ok(())
    }

    fn shutdown(&mut self) {
        self.overrides.clear();
    }
}
