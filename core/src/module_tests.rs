//! End-to-end ticks through an encounter module built from TOML

use glam::Vec2;
use waymark_types::Role;

use crate::config::EngineConfig;
use crate::dsl::EncounterDefinition;
use crate::error::EngineError;
use crate::events::{CastEvent, CastKind, EncounterEvent, IconEvent};
use crate::module::{EncounterModule, TickInput};
use crate::phase::Outcome;
use crate::world::{Actor, ActorId, WorldSnapshot};

const BOSS: ActorId = ActorId(0x4000_0001);

/// Knockback opener, then a stack on an icon, cleared once the stack
/// resolves twice. Wipes if the party dies.
const ENCOUNTER: &str = r#"
    id = "test_knockback"
    name = "Knockback Test"
    primary_oid = 1

    [arena]
    type = "circle"
    center = [0.0, 0.0]
    radius = 20.0

    [[component]]
    tag = "knockback"
    kind = "knockback"
    active_at_start = true
    stack_actions = [100]
    resolve_actions = [101]

    [[component]]
    tag = "stack"
    kind = "stack_spread"
    stack_icons = [7]
    resolve_actions = [200]
    expected_resolves = 2
    required = 2
    stack_hint = "Stack!"

    [[component]]
    tag = "raidwide"
    kind = "raidwide"
    persistent = true
    actions = [300]

    [[phase]]
    name = "Knockback"
    initial = true
    activate = ["raidwide"]

    [[phase.transition]]
    to = "Wipe"
    guard = { type = "party_dead" }

    [[phase.transition]]
    to = "Stacks"
    guard = { type = "component_resolved", component = "knockback" }

    [[phase]]
    name = "Stacks"
    activate = ["stack"]
    deactivate = ["knockback"]

    [[phase.transition]]
    to = "Wipe"
    guard = { type = "party_dead" }

    [[phase.transition]]
    to = "Cleared"
    guard = { type = "component_resolved", component = "stack" }

    [[phase]]
    name = "Cleared"
    terminal = "cleared"

    [[phase]]
    name = "Wipe"
    terminal = "wiped"
"#;

fn member(slot: usize) -> ActorId {
    ActorId(0x1000_0000 + slot as u64)
}

fn module() -> EncounterModule {
    let def: EncounterDefinition = toml::from_str(ENCOUNTER).unwrap();
    EncounterModule::from_definition(def, EngineConfig::default()).unwrap()
}

fn world() -> WorldSnapshot {
    WorldSnapshot::new()
        .with_primary(Actor::new(BOSS, Vec2::ZERO).with_oid(1).with_target(member(0)))
        .with_party_member(0, Actor::new(member(0), Vec2::new(2.0, 0.0)).with_role(Role::Tank))
        .with_party_member(1, Actor::new(member(1), Vec2::new(10.0, 0.0)).with_role(Role::Healer))
}

fn cast(action: u32, kind: CastKind, target: Option<ActorId>) -> EncounterEvent {
    EncounterEvent::Cast(CastEvent {
        caster: BOSS,
        action,
        kind,
        target,
        location: None,
        duration: Some(3.0),
        sequence: None,
    })
}

#[test]
fn full_attempt_to_cleared() {
    let mut m = module();
    let world = world();
    assert_eq!(m.phase_name(), "Knockback");
    assert_eq!(m.registry().active_tags(), vec!["knockback", "raidwide"]);

    let report = m.tick(&world, &TickInput::new(1.0, &[]));
    assert!(report.phase_changes.is_empty());
    assert_eq!(report.hints.len(), 2);

    // knockback on the healer resolves the opener
    let events = [
        cast(100, CastKind::Started, Some(member(1))),
        cast(101, CastKind::Completed, None),
    ];
    let report = m.tick(&world, &TickInput::new(2.0, &events));
    assert_eq!(report.phase, "Stacks");
    assert_eq!(report.phase_changes[0].from, "Knockback");
    assert_eq!(m.registry().active_tags(), vec!["stack", "raidwide"]);

    // stack on the tank; the healer is too far
    let icon = [EncounterEvent::Icon(IconEvent {
        actor: member(0),
        icon: 7,
    })];
    let report = m.tick(&world, &TickInput::new(3.0, &icon).with_pov(1));
    let healer = report.hints_for_slot(1).unwrap();
    assert_eq!(healer.text, vec!["Stack!"]);
    assert!(healer.zones.iter().all(|z| z.source == "stack"));
    assert!(!report.draw_intents.is_empty());

    m.tick(&world, &TickInput::new(4.0, &[cast(200, CastKind::Completed, None)]));
    // redelivered completion of the first round does not count
    let report = m.tick(&world, &TickInput::new(4.5, &[cast(200, CastKind::Completed, None)]));
    assert_eq!(report.phase, "Stacks");
    let second = [cast(200, CastKind::Started, None), cast(200, CastKind::Completed, None)];
    let report = m.tick(&world, &TickInput::new(8.0, &second));
    assert_eq!(report.outcome, Some(Outcome::Cleared));
    assert!(m.registry().active_tags().is_empty());
    assert_eq!(m.history().len(), 2);
}

#[test]
fn events_reach_components_before_hints() {
    let mut m = module();
    let world = world();
    let report = m.tick(&world, &TickInput::new(1.0, &[cast(300, CastKind::Started, None)]));
    assert_eq!(report.hints_for_slot(0).unwrap().text, vec!["Raidwide"]);
}

#[test]
fn wipe_then_reset() {
    let mut m = module();
    let mut world = world();
    for slot in 0..2 {
        if let Some(a) = world.actor_mut(member(slot)) {
            a.dead = true;
        }
    }
    let report = m.tick(&world, &TickInput::new(5.0, &[]));
    assert_eq!(report.outcome, Some(Outcome::Wiped));

    m.reset(30.0);
    assert_eq!(m.phase_name(), "Knockback");
    assert_eq!(m.outcome(), None);
    assert_eq!(m.time_in_phase(31.0), 1.0);
    assert_eq!(m.registry().active_tags(), vec!["knockback", "raidwide"]);
}

#[test]
fn force_advance_and_queries() {
    let src = ENCOUNTER.replace(
        "guard = { type = \"component_resolved\", component = \"knockback\" }",
        "guard = { type = \"force_advance\" }",
    );
    let def: EncounterDefinition = toml::from_str(&src).unwrap();
    let mut m = EncounterModule::from_definition(def, EngineConfig::default()).unwrap();
    let world = world();

    m.force_advance();
    m.tick(&world, &TickInput::new(1.0, &[]));
    assert_eq!(m.phase_name(), "Stacks");
    assert_eq!(m.name(), "Knockback Test");
    assert_eq!(m.primary_oid(), 1);
    assert!(m.hints_for(&world, 0, 1.0).is_some());
    assert!(m.hints_for(&world, 5, 1.0).is_none());
    assert!(m.draw_intents(&world, 5, 1.0).is_empty());
}

#[test]
fn construction_fails_fast() {
    let bad_arena = ENCOUNTER.replace("radius = 20.0", "radius = -1.0");
    let def: EncounterDefinition = toml::from_str(&bad_arena).unwrap();
    assert!(matches!(
        EncounterModule::from_definition(def, EngineConfig::default()),
        Err(EngineError::InvalidArena { .. })
    ));

    let bad_ref = ENCOUNTER.replace("activate = [\"stack\"]", "activate = [\"stacks\"]");
    let def: EncounterDefinition = toml::from_str(&bad_ref).unwrap();
    match EncounterModule::from_definition(def, EngineConfig::default()) {
        Err(EngineError::MalformedConfiguration { reason }) => assert!(reason.contains("'stacks'")),
        other => panic!("expected malformed configuration, got {:?}", other.err()),
    }

    let bad_tunable = ENCOUNTER.replace("stack_hint = \"Stack!\"", "stack_hint = \"Stack!\"\n    stack_radius = 0.0");
    let def: EncounterDefinition = toml::from_str(&bad_tunable).unwrap();
    match EncounterModule::from_definition(def, EngineConfig::default()) {
        Err(EngineError::MalformedConfiguration { reason }) => assert!(reason.starts_with("component 'stack'")),
        other => panic!("expected malformed configuration, got {:?}", other.err()),
    }
}
