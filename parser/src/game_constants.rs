use crate::types::{MAX_WEAPONS, WeaponId};

const UNKNOWN_WEAPON: &str = "Unknown";

static WEAPON_NAMES: [&str; MAX_WEAPONS as usize] = [
    "None",
    "Knife",
    "Luger",
    "Colt",
    "MP40",
    "Thompson",
    "Sten",
    "FG42",
    "Panzerfaust",
    "Flamethrower",
    "Grenade",
    "Grenade Launcher",
    "Mortar",
    "Dynamite",
    "Satchel Charge",
    "Airstrike Marker",
    "Landmine",
    "Smoke Grenade",
    "MG42",
    "Garand",
    "K43",
    "BAR",
    "M1 Carbine",
    "PPSH",
    "Panzerschreck",
    "Mosin-Nagant",
    // 26..64 are unassigned
    UNKNOWN_WEAPON, UNKNOWN_WEAPON, UNKNOWN_WEAPON, UNKNOWN_WEAPON, UNKNOWN_WEAPON,
    UNKNOWN_WEAPON, UNKNOWN_WEAPON, UNKNOWN_WEAPON, UNKNOWN_WEAPON, UNKNOWN_WEAPON,
    UNKNOWN_WEAPON, UNKNOWN_WEAPON, UNKNOWN_WEAPON, UNKNOWN_WEAPON, UNKNOWN_WEAPON,
    UNKNOWN_WEAPON, UNKNOWN_WEAPON, UNKNOWN_WEAPON, UNKNOWN_WEAPON, UNKNOWN_WEAPON,
    UNKNOWN_WEAPON, UNKNOWN_WEAPON, UNKNOWN_WEAPON, UNKNOWN_WEAPON, UNKNOWN_WEAPON,
    UNKNOWN_WEAPON, UNKNOWN_WEAPON, UNKNOWN_WEAPON, UNKNOWN_WEAPON, UNKNOWN_WEAPON,
    UNKNOWN_WEAPON, UNKNOWN_WEAPON, UNKNOWN_WEAPON, UNKNOWN_WEAPON, UNKNOWN_WEAPON,
    UNKNOWN_WEAPON, UNKNOWN_WEAPON, UNKNOWN_WEAPON,
];

/// Read-only lookup from weapon slot to display name.
#[derive(Debug, Clone, Copy)]
pub struct WeaponTable {
    names: &'static [&'static str; MAX_WEAPONS as usize],
}

impl WeaponTable {
    pub fn defaults() -> Self {
        Self {
            names: &WEAPON_NAMES,
        }
    }

    pub fn name(&self, weapon: WeaponId) -> &'static str {
        weapon
            .index()
            .map(|id| self.names[id as usize])
            .unwrap_or(UNKNOWN_WEAPON)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for WeaponTable {
    fn default() -> Self {
        Self::defaults()
    }
}

/// Static game data shared by a decode session.
#[derive(Clone, Default)]
pub struct GameConstants {
    weapons: WeaponTable,
}

impl GameConstants {
    /// Hardcoded defaults (no game files needed).
    pub fn defaults() -> Self {
        Self {
            weapons: WeaponTable::defaults(),
        }
    }

    pub fn weapons(&self) -> &WeaponTable {
        &self.weapons
    }

    pub fn weapon_name(&self, weapon: WeaponId) -> &'static str {
        self.weapons.name(weapon)
    }
}
