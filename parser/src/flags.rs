use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::game_constants::WeaponTable;
use crate::types::{PlayerId, WeaponId};

/// Which bit layout the entity flags are read with.
///
/// Captures have been described with several incompatible layouts. Only
/// `Standard` is considered correct; a session uses exactly one layout for
/// every record it sees.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagLayout {
    /// bits 0..8 unused, 8..16 weapon, 16..24 player, 24..32 unused
    #[default]
    Standard,
}

#[allow(dead_code)]
mod standard_layout {
    use modular_bitfield::prelude::*;

    #[bitfield]
    pub(super) struct RawEntityFlags {
        pub low: B8,
        pub weapon: B8,
        pub player: B8,
        pub high: B8,
    }
}
use standard_layout::RawEntityFlags;

/// Pulls the player and weapon ids out of a record's entity flags.
#[derive(Debug, Clone, Copy)]
pub struct FieldExtractor {
    layout: FlagLayout,
    weapons: WeaponTable,
}

impl FieldExtractor {
    pub fn new(layout: FlagLayout, weapons: WeaponTable) -> Self {
        Self { layout, weapons }
    }

    pub fn layout(&self) -> FlagLayout {
        self.layout
    }

    fn unpack(&self, entity_flags: u32) -> RawEntityFlags {
        match self.layout {
            FlagLayout::Standard => RawEntityFlags::from_bytes(entity_flags.to_le_bytes()),
        }
    }

    pub fn extract_player_id(&self, entity_flags: u32) -> PlayerId {
        PlayerId(self.unpack(entity_flags).player())
    }

    /// Reads the weapon slot. Out of range values come back as
    /// [`WeaponId::Unknown`] and are logged; they never fail the record.
    pub fn extract_weapon_id(&self, entity_flags: u32) -> WeaponId {
        let raw = self.unpack(entity_flags).weapon();
        let weapon = WeaponId::from_raw(raw);
        match weapon {
            WeaponId::Known(id) => {
                trace!(id, name = self.weapons.name(weapon), "extracted weapon");
            }
            WeaponId::Unknown(raw) => {
                warn!(raw, entity_flags, "invalid weapon id in entity flags");
            }
        }
        weapon
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new(FlagLayout::Standard, WeaponTable::defaults())
    }
}
