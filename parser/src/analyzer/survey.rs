use std::collections::{BTreeMap, HashMap};

use tracing::info;

use crate::game_constants::GameConstants;
use crate::types::{PlayerId, WeaponId};

use super::events::{ActionEvent, ActionKind};

/// Data-quality counters and per-player tallies for one session.
#[derive(Debug, Default, Clone)]
pub struct SessionSummary {
    pub total_frames: usize,
    pub decoded_frames: usize,
    /// Frames whose input ended part way through a symbol
    pub truncated_frames: usize,
    /// Frames that would have decoded past the record width
    pub overflowed_frames: usize,
    /// Frames that decoded to the wrong number of bytes
    pub size_mismatched_frames: usize,
    /// Bytes after the last whole frame that were never decoded
    pub trailing_bytes: usize,
    pub invalid_weapon_ids: usize,
    pub unrecognized_entity_types: usize,
    pub events_emitted: usize,
    pub flushes: usize,
    pub actions: BTreeMap<PlayerId, HashMap<ActionKind, usize>>,
    pub fires_by_weapon: BTreeMap<WeaponId, usize>,
}

impl SessionSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skipped_frames(&self) -> usize {
        self.truncated_frames + self.overflowed_frames + self.size_mismatched_frames
    }

    pub fn record(&mut self, event: &ActionEvent) {
        self.events_emitted += 1;
        *self
            .actions
            .entry(event.player_id)
            .or_default()
            .entry(event.kind())
            .or_default() += 1;
        if event.kind() == ActionKind::Fire {
            if let Some(weapon) = event.weapon() {
                *self.fires_by_weapon.entry(weapon).or_default() += 1;
            }
        }
    }

    pub fn action_count(&self, player: PlayerId, kind: ActionKind) -> usize {
        self.actions
            .get(&player)
            .and_then(|counts| counts.get(&kind))
            .copied()
            .unwrap_or(0)
    }

    /// Writes the summary to the log at `info` level.
    pub fn log(&self, constants: &GameConstants) {
        info!(
            total = self.total_frames,
            decoded = self.decoded_frames,
            truncated = self.truncated_frames,
            overflowed = self.overflowed_frames,
            size_mismatched = self.size_mismatched_frames,
            trailing_bytes = self.trailing_bytes,
            invalid_weapon_ids = self.invalid_weapon_ids,
            unrecognized_entity_types = self.unrecognized_entity_types,
            events = self.events_emitted,
            flushes = self.flushes,
            "session finished"
        );
        for (player, counts) in &self.actions {
            let mut counts: Vec<_> = counts.iter().collect();
            counts.sort_by_key(|(kind, _)| kind.to_string());
            for (kind, count) in counts {
                info!(player = %player.default_name(), action = %kind, count, "player actions");
            }
        }
        for (weapon, count) in &self.fires_by_weapon {
            info!(weapon = constants.weapon_name(*weapon), id = %weapon, count, "shots fired");
        }
    }
}
