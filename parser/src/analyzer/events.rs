use kinded::Kinded;
use serde::Serialize;

use crate::entity::Vec3;
use crate::types::{DemoClock, PlayerId, WeaponId};

/// A player action derived from one entity snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionEvent {
    pub timestamp: DemoClock,
    pub player_id: PlayerId,
    pub action: Action,
}

/// Everything the tracker can report. Within one snapshot, actions are
/// produced in declaration order: movement, aim, then weapon usage.
#[derive(Debug, Clone, PartialEq, Serialize, Kinded)]
#[kinded(derive(Hash, Serialize))]
#[serde(tag = "type")]
pub enum Action {
    /// The player moved since their previous snapshot
    Move {
        position: Vec3,
        /// Units per millisecond; zero when no time passed
        velocity: f32,
    },

    /// Aim barely changed between the two latest snapshots
    AimConsistency {
        angles: Vec3,
        /// Sum of absolute per-axis differences from the previous sample
        change: f32,
    },

    /// A shot was fired
    Fire { weapon: WeaponId },

    /// A shot landed. `accuracy` is hits over shots, absent while no shot
    /// has been seen or hits outnumber shots.
    Hit {
        weapon: WeaponId,
        accuracy: Option<f32>,
    },

    Reload { weapon: WeaponId },
}

impl ActionEvent {
    pub fn new(timestamp: DemoClock, player_id: PlayerId, action: Action) -> Self {
        Self {
            timestamp,
            player_id,
            action,
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.action.kind()
    }

    pub fn weapon(&self) -> Option<WeaponId> {
        match self.action {
            Action::Fire { weapon } | Action::Hit { weapon, .. } | Action::Reload { weapon } => {
                Some(weapon)
            }
            Action::Move { .. } | Action::AimConsistency { .. } => None,
        }
    }
}
