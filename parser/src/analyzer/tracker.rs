use std::collections::{HashMap, VecDeque};

use serde::Serialize;
use strum_macros::FromRepr;
use tracing::trace;

use crate::entity::{EntityRecord, Vec3};
use crate::flags::FieldExtractor;
use crate::types::{DemoClock, PlayerId, WeaponId};

use super::events::{Action, ActionEvent};
use super::survey::SessionSummary;

/// Entity types that describe weapon usage. Everything else only feeds the
/// movement and aim analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(i32)]
pub enum WeaponEventType {
    Fire = 1,
    Hit = 2,
    Reload = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AimSample {
    pub angles: Vec3,
    pub timestamp: DemoClock,
}

/// Everything remembered about one player across a session.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerAnalyticsState {
    last_position: Option<(Vec3, DemoClock)>,
    aim_history: VecDeque<AimSample>,
    history_len: usize,
    shots: u32,
    hits: u32,
}

impl PlayerAnalyticsState {
    fn new(history_len: usize) -> Self {
        Self {
            last_position: None,
            aim_history: VecDeque::with_capacity(history_len),
            history_len,
            shots: 0,
            hits: 0,
        }
    }

    pub fn last_position(&self) -> Option<(Vec3, DemoClock)> {
        self.last_position
    }

    /// Most recent samples last.
    pub fn aim_history(&self) -> &VecDeque<AimSample> {
        &self.aim_history
    }

    pub fn shots(&self) -> u32 {
        self.shots
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    /// Hits over shots. Undefined until a shot has been seen, and while hits
    /// outnumber shots.
    pub fn accuracy(&self) -> Option<f32> {
        if self.shots == 0 || self.hits > self.shots {
            None
        } else {
            Some(self.hits as f32 / self.shots as f32)
        }
    }

    fn push_aim(&mut self, sample: AimSample) {
        if self.aim_history.len() == self.history_len {
            self.aim_history.pop_front();
        }
        self.aim_history.push_back(sample);
    }
}

/// Mutable state for one decode session. Created empty per capture and
/// threaded through every call into the tracker.
#[derive(Debug, Default)]
pub struct SessionContext {
    players: HashMap<PlayerId, PlayerAnalyticsState>,
    pub summary: SessionSummary,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerAnalyticsState> {
        self.players.get(&id)
    }

    pub fn players(&self) -> &HashMap<PlayerId, PlayerAnalyticsState> {
        &self.players
    }
}

/// Derives [`ActionEvent`]s from entity records.
#[derive(Debug, Clone)]
pub struct AnalyticsTracker {
    extractor: FieldExtractor,
    aim_epsilon: f32,
    aim_history_len: usize,
}

impl AnalyticsTracker {
    pub fn new(extractor: FieldExtractor, aim_epsilon: f32, aim_history_len: usize) -> Self {
        Self {
            extractor,
            aim_epsilon,
            aim_history_len: aim_history_len.max(2),
        }
    }

    /// Updates the record's player and returns the events it produced, in
    /// the order Move, AimConsistency, then Fire/Hit/Reload.
    pub fn process(&self, ctx: &mut SessionContext, record: &EntityRecord) -> Vec<ActionEvent> {
        let player_id = self.extractor.extract_player_id(record.entity_flags);
        let weapon_type = WeaponEventType::from_repr(record.entity_type);
        let weapon = weapon_type.map(|_| self.extractor.extract_weapon_id(record.entity_flags));
        if weapon.is_some_and(WeaponId::is_unknown) {
            ctx.summary.invalid_weapon_ids += 1;
        }
        if weapon_type.is_none() {
            trace!(entity_type = record.entity_type, "no weapon action for entity type");
            ctx.summary.unrecognized_entity_types += 1;
        }

        let history_len = self.aim_history_len;
        let state = ctx
            .players
            .entry(player_id)
            .or_insert_with(|| PlayerAnalyticsState::new(history_len));

        let timestamp = record.timestamp;
        let mut events = Vec::with_capacity(3);
        let mut emit = |action| events.push(ActionEvent::new(timestamp, player_id, action));

        let position = record.position.base;
        if let Some((last, last_time)) = state.last_position {
            let dt = timestamp.millis_since(last_time);
            let velocity = if dt > 0 {
                last.distance(position) / dt as f32
            } else {
                0.0
            };
            emit(Action::Move { position, velocity });
        }
        state.last_position = Some((position, timestamp));

        state.push_aim(AimSample {
            angles: record.angles,
            timestamp,
        });
        if let [.., previous, latest] = state.aim_history.make_contiguous() {
            let change = previous.angles.manhattan(latest.angles);
            if change < self.aim_epsilon {
                emit(Action::AimConsistency {
                    angles: latest.angles,
                    change,
                });
            }
        }

        if let (Some(weapon_type), Some(weapon)) = (weapon_type, weapon) {
            match weapon_type {
                WeaponEventType::Fire => {
                    state.shots = state.shots.saturating_add(1);
                    emit(Action::Fire { weapon });
                }
                WeaponEventType::Hit => {
                    state.hits = state.hits.saturating_add(1);
                    emit(Action::Hit {
                        weapon,
                        accuracy: state.accuracy(),
                    });
                }
                WeaponEventType::Reload => emit(Action::Reload { weapon }),
            }
        }

        events
    }
}

impl Default for AnalyticsTracker {
    fn default() -> Self {
        Self::new(FieldExtractor::default(), 0.01, 32)
    }
}
