use serde::{Deserialize, Serialize};
use std::fmt;

/// Client slot of the player an entity snapshot belongs to. Always fits in
/// eight bits of the entity flags.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u8);

impl PlayerId {
    pub fn raw(self) -> u8 {
        self.0
    }

    /// Placeholder display name used when no player info string is available.
    pub fn default_name(self) -> String {
        format!("Player{}", self.0)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u8> for PlayerId {
    fn from(v: u8) -> Self {
        PlayerId(v)
    }
}

/// Number of weapon slots the game defines.
pub const MAX_WEAPONS: u8 = 64;

/// A weapon slot extracted from the entity flags.
///
/// Values outside of `0..MAX_WEAPONS` are kept as `Unknown` together with the
/// raw value that was read, so they never masquerade as a real weapon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum WeaponId {
    Known(u8),
    Unknown(u8),
}

impl WeaponId {
    pub fn from_raw(raw: u8) -> Self {
        if raw < MAX_WEAPONS {
            WeaponId::Known(raw)
        } else {
            WeaponId::Unknown(raw)
        }
    }

    /// The slot index, or `None` for an out of range value.
    pub fn index(self) -> Option<u8> {
        match self {
            WeaponId::Known(id) => Some(id),
            WeaponId::Unknown(_) => None,
        }
    }

    pub fn is_unknown(self) -> bool {
        matches!(self, WeaponId::Unknown(_))
    }
}

impl fmt::Display for WeaponId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeaponId::Known(id) => write!(f, "{id}"),
            WeaponId::Unknown(raw) => write!(f, "unknown({raw})"),
        }
    }
}

/// Server time of a snapshot in milliseconds, as written in the frame header.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DemoClock(pub i32);

impl DemoClock {
    pub fn millis(self) -> i32 {
        self.0
    }

    /// Milliseconds elapsed since `earlier`. Widened so that wrapped or
    /// hostile timestamps can't overflow.
    pub fn millis_since(self, earlier: DemoClock) -> i64 {
        i64::from(self.0) - i64::from(earlier.0)
    }
}

impl fmt::Display for DemoClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

impl From<i32> for DemoClock {
    fn from(v: i32) -> Self {
        DemoClock(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weapon_range() {
        assert_eq!(WeaponId::from_raw(0), WeaponId::Known(0));
        assert_eq!(WeaponId::from_raw(63), WeaponId::Known(63));
        assert_eq!(WeaponId::from_raw(64), WeaponId::Unknown(64));
        assert_eq!(WeaponId::from_raw(70).index(), None);
        assert!(WeaponId::from_raw(255).is_unknown());
    }

    #[test]
    fn clock_delta_does_not_overflow() {
        let delta = DemoClock(i32::MAX).millis_since(DemoClock(i32::MIN));
        assert_eq!(delta, i64::from(u32::MAX));
    }

    #[test]
    fn player_name() {
        assert_eq!(PlayerId(5).default_name(), "Player5");
    }
}
