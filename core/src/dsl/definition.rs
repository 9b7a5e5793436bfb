//! Encounter definition types
//!
//! One TOML file describes one encounter: its arena, the mechanic components
//! it is built from, and the phase graph that switches them on and off.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::arena::ArenaBounds;
use crate::mechanics::MechanicConfig;
use crate::phase::PhaseDefinition;
use crate::world::Oid;

// ═══════════════════════════════════════════════════════════════════════════
// Root Structure
// ═══════════════════════════════════════════════════════════════════════════

/// Root structure of an encounter file
///
/// ```toml
/// id = "p1s"
/// name = "Erichthonios"
/// primary_oid = 0x3522
///
/// [arena]
/// type = "circle"
/// center = [100.0, 100.0]
/// radius = 20.0
///
/// [[component]]
/// tag = "knockback"
/// kind = "knockback"
/// stack_actions = [0x6612]
///
/// [[phase]]
/// name = "Opener"
/// initial = true
/// ...
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterDefinition {
    /// Unique identifier
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Object kind of the boss; the driver binds the primary actor by it
    #[serde(default)]
    pub primary_oid: Oid,

    pub arena: ArenaBounds,

    #[serde(default, rename = "component")]
    pub components: Vec<ComponentDefinition>,

    #[serde(default, rename = "phase")]
    pub phases: Vec<PhaseDefinition>,
}

impl EncounterDefinition {
    /// Display name, falling back to the id
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() { &self.id } else { &self.name }
    }

    /// Tags declared more than once
    pub fn duplicate_tags(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.components
            .iter()
            .map(|c| c.tag.as_str())
            .filter(|tag| !seen.insert(*tag))
            .collect()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Components
// ═══════════════════════════════════════════════════════════════════════════

/// One mechanic instance. The mechanic's own fields sit next to `tag` and
/// `kind` in the same table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDefinition {
    pub tag: String,

    #[serde(flatten)]
    pub mechanic: MechanicConfig,

    /// Survives exits from the phases that activated it
    #[serde(default)]
    pub persistent: bool,

    /// Active from the first tick of every attempt
    #[serde(default)]
    pub active_at_start: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mechanics::AoeTargeting;

    const KENKO: &str = r#"
        id = "d70_kenko"
        name = "Kenko"
        primary_oid = 0x23EB

        [arena]
        type = "circle"
        center = [-300.0, -300.0]
        radius = 25.0

        [[component]]
        tag = "claws"
        kind = "cast_aoe"
        active_at_start = true
        actions = [12205]
        shape = { type = "cone", length = 15.0, half_angle_deg = 45.0 }

        [[component]]
        tag = "slabber"
        kind = "cast_aoe"
        persistent = true
        actions = [12203]
        targeting = "location"
        shape = { type = "circle", radius = 8.0 }

        [[phase]]
        name = "Fight"
        initial = true

        [[phase.transition]]
        to = "Wipe"
        guard = { type = "party_dead" }

        [[phase]]
        name = "Wipe"
        terminal = "wiped"
    "#;

    #[test]
    fn parses_flattened_components() {
        let def: EncounterDefinition = toml::from_str(KENKO).unwrap();
        assert_eq!(def.display_name(), "Kenko");
        assert_eq!(def.primary_oid, 0x23EB);
        assert_eq!(def.components.len(), 2);

        let claws = &def.components[0];
        assert!(claws.active_at_start);
        assert!(!claws.persistent);
        assert_eq!(claws.mechanic.kind_name(), "cast_aoe");

        match &def.components[1].mechanic {
            MechanicConfig::CastAoe(c) => assert_eq!(c.targeting, AoeTargeting::Location),
            other => panic!("unexpected mechanic {other:?}"),
        }
        assert_eq!(def.phases.len(), 2);
        assert!(def.duplicate_tags().is_empty());
    }

    #[test]
    fn unknown_kind_rejected() {
        let bad = KENKO.replacen("cast_aoe", "laser", 1);
        assert!(toml::from_str::<EncounterDefinition>(&bad).is_err());
    }
}
