//! Per-player chop cooldowns

use std::collections::HashMap;

use crate::config::TimberConfig;
use crate::core::lifecycle::Component;
use crate::core::types::Result;
use crate::host::player::PlayerId;

/// Players currently locked out of chopping.
///
/// Expiry is driven from outside by a scheduled task; the tracker only
/// remembers who is waiting and whether they have been told. Each
/// cooldown carries a generation so an expiry queued for an earlier
/// cooldown cannot end a later one.
#[derive(Debug, Default)]
pub struct CooldownTracker {
    entries: HashMap<PlayerId, CooldownEntry>,
    next_generation: u64,
}

#[derive(Clone, Copy, Debug)]
struct CooldownEntry {
    notified: bool,
    generation: u64,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a cooldown and return its generation, to be passed back to
    /// [`expire`](Self::expire).
    pub fn start(&mut self, player: PlayerId) -> u64 {
        let generation = self.next_generation;
        self.next_generation += 1;
        self.entries.insert(player, CooldownEntry { notified: false, generation });
        generation
    }

    /// `None` when the player may chop, otherwise whether this is the first
    /// check since the cooldown began.
    pub fn check(&mut self, player: PlayerId) -> Option<bool> {
        let entry = self.entries.get_mut(&player)?;
        let notify = !entry.notified;
        entry.notified = true;
        Some(notify)
    }

    /// Ends the player's cooldown if it is still the one started as `generation`
    pub fn expire(&mut self, player: PlayerId, generation: u64) {
        match self.entries.get(&player) {
            Some(entry) if entry.generation == generation => {
                self.entries.remove(&player);
                log::debug!("Cooldown for {} expired", player);
            }
            Some(_) => log::trace!("Ignoring stale cooldown expiry for {}", player),
            None => {}
        }
    }

    pub fn is_on_cooldown(&self, player: PlayerId) -> bool {
        self.entries.contains_key(&player)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Component for CooldownTracker {
    fn name(&self) -> &'static str {
        "cooldowns"
    }

    fn reset(&mut self, config: &TimberConfig) -> Result<()> {
        if !config.cooldown_enabled {
            self.entries.clear();
        }
        Ok(())
    }

    fn shutdown(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_once() {
        let mut cooldowns = CooldownTracker::new();
        let player = PlayerId::from_u128(1);
        assert_eq!(cooldowns.check(player), None);

        let generation = cooldowns.start(player);
        assert_eq!(cooldowns.check(player), Some(true));
        assert_eq!(cooldowns.check(player), Some(false));
        assert_eq!(cooldowns.check(player), Some(false));

        cooldowns.expire(player, generation);
        assert_eq!(cooldowns.check(player), None);

        // A fresh cooldown notifies again
        cooldowns.start(player);
        assert_eq!(cooldowns.check(player), Some(true));
    }

    #[test]
    fn test_reset_clears_when_disabled() {
        let mut cooldowns = CooldownTracker::new();
        cooldowns.start(PlayerId::from_u128(1));

        cooldowns.reset(&TimberConfig::default()).unwrap();
        assert_eq!(cooldowns.len(), 1);

        let config = TimberConfig { cooldown_enabled: false, ..TimberConfig::default() };
        cooldowns.reset(&config).unwrap();
        assert!(cooldowns.is_empty());
    }

    #[test]
    fn test_stale_expiry_ignored() {
        let mut cooldowns = CooldownTracker::new();
        let player = PlayerId::from_u128(1);

        let first = cooldowns.start(player);
        cooldowns.reset(&TimberConfig { cooldown_enabled: false, ..TimberConfig::default() }).unwrap();
        assert!(!cooldowns.is_on_cooldown(player));

        let second = cooldowns.start(player);
        assert_ne!(first, second);

        // The expiry queued for the cleared cooldown must not end the new one
        cooldowns.expire(player, first);
        assert!(cooldowns.is_on_cooldown(player));

        cooldowns.expire(player, second);
        assert!(!cooldowns.is_on_cooldown(player));
    }
}
