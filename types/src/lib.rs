//! Shared value types for Waymark
//!
//! This crate contains serializable types that appear both in encounter
//! definition files and in the engine itself (party roles, party slot masks,
//! draw colors). It has no knowledge of geometry or world state.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Party Roles
// ─────────────────────────────────────────────────────────────────────────────

/// Combat role of a party member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Tank,
    Healer,
    Melee,
    Ranged,
    Caster,
    /// Enemies, pets and anything the feed could not classify
    #[default]
    None,
}

impl Role {
    /// Returns true for damage dealers of any kind
    pub fn is_dps(&self) -> bool {
        matches!(self, Role::Melee | Role::Ranged | Role::Caster)
    }

    /// Short label used in CLI output
    pub fn label(&self) -> &'static str {
        match self {
            Role::Tank => "T",
            Role::Healer => "H",
            Role::Melee => "M",
            Role::Ranged => "R",
            Role::Caster => "C",
            Role::None => "-",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Party Slot Mask
// ─────────────────────────────────────────────────────────────────────────────

/// Number of party slots a mask can address.
pub const MAX_PARTY_SLOTS: usize = 8;

/// A fixed-size set of party slot indices.
///
/// Used by mechanics that affect a subset of the party (spread markers,
/// tethers, baiters). Slot indices outside `0..MAX_PARTY_SLOTS` are never
/// members and are ignored on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotMask(u8);

impl SlotMask {
    pub const EMPTY: Self = Self(0);
    pub const ALL: Self = Self(u8::MAX);

    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Mask with a single slot set
    pub fn single(slot: usize) -> Self {
        let mut mask = Self::EMPTY;
        mask.insert(slot);
        mask
    }

    pub fn contains(self, slot: usize) -> bool {
        slot < MAX_PARTY_SLOTS && self.0 & (1 << slot) != 0
    }

    pub fn insert(&mut self, slot: usize) {
        if slot < MAX_PARTY_SLOTS {
            self.0 |= 1 << slot;
        }
    }

    pub fn remove(&mut self, slot: usize) {
        if slot < MAX_PARTY_SLOTS {
            self.0 &= !(1 << slot);
        }
    }

    pub fn set(&mut self, slot: usize, value: bool) {
        if value {
            self.insert(slot);
        } else {
            self.remove(slot);
        }
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Every addressable slot not in this mask
    pub const fn complement(self) -> Self {
        Self(!self.0)
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Iterate member slot indices in ascending order
    pub fn iter(self) -> impl Iterator<Item = usize> {
        (0..MAX_PARTY_SLOTS).filter(move |&slot| self.contains(slot))
    }

    /// Keep only `(slot, item)` pairs whose slot is a member
    pub fn included<T>(
        self,
        items: impl IntoIterator<Item = (usize, T)>,
    ) -> impl Iterator<Item = (usize, T)> {
        items.into_iter().filter(move |(slot, _)| self.contains(*slot))
    }

    /// Keep only `(slot, item)` pairs whose slot is not a member
    pub fn excluded<T>(
        self,
        items: impl IntoIterator<Item = (usize, T)>,
    ) -> impl Iterator<Item = (usize, T)> {
        items.into_iter().filter(move |(slot, _)| !self.contains(*slot))
    }
}

impl FromIterator<usize> for SlotMask {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut mask = Self::EMPTY;
        for slot in iter {
            mask.insert(slot);
        }
        mask
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Draw Colors
// ─────────────────────────────────────────────────────────────────────────────

/// RGBA color
pub type Color = [u8; 4];

/// Semantic color of a draw intent. The renderer maps roles to actual colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorRole {
    /// Filled hazard area
    Aoe,
    /// Outline or marker of something dangerous
    #[default]
    Danger,
    /// Suggested safe spot
    Safe,
    /// Actor that is vulnerable to the current mechanic
    Vulnerable,
    /// Party member with no special role in the mechanic
    PlayerGeneric,
    /// Party member that matters for the mechanic
    PlayerInteresting,
    Enemy,
    /// Source of an AOE centered on another actor
    AoeTarget,
}

/// Default arena colors
pub mod arena_colors {
    use super::{Color, ColorRole};

    pub const AOE: Color = [255, 128, 0, 128];
    pub const DANGER: Color = [255, 0, 0, 255];
    pub const SAFE: Color = [0, 255, 0, 255];
    pub const VULNERABLE: Color = [255, 0, 255, 255];
    pub const PLAYER_GENERIC: Color = [128, 128, 128, 255];
    pub const PLAYER_INTERESTING: Color = [192, 192, 192, 255];
    pub const ENEMY: Color = [255, 64, 64, 255];
    pub const AOE_TARGET: Color = [255, 128, 128, 255];

    /// Default color for a role
    pub fn for_role(role: ColorRole) -> Color {
        match role {
            ColorRole::Aoe => AOE,
            ColorRole::Danger => DANGER,
            ColorRole::Safe => SAFE,
            ColorRole::Vulnerable => VULNERABLE,
            ColorRole::PlayerGeneric => PLAYER_GENERIC,
            ColorRole::PlayerInteresting => PLAYER_INTERESTING,
            ColorRole::Enemy => ENEMY,
            ColorRole::AoeTarget => AOE_TARGET,
        }
    }
}
