//! Phase machine scenarios and graph validation

use glam::Vec2;

use super::*;
use crate::arena::ArenaBounds;
use crate::components::{Component, ComponentEntry, ComponentRegistry, Progress, TickContext};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::events::{CastEvent, CastKind, EncounterEvent, dispatch};
use crate::world::{Actor, ActorId, WorldSnapshot, WorldState};

/// Resolves once action 1 completes
#[derive(Default)]
struct Switch {
    done: bool,
}

impl Component for Switch {
    fn on_cast(&mut self, _ctx: &TickContext<'_>, event: &CastEvent) {
        if event.action == 1 && event.kind == CastKind::Completed {
            self.done = true;
        }
    }

    fn progress(&self) -> Progress {
        Progress {
            resolved: self.done,
            count: u32::from(self.done),
        }
    }
}

fn registry(tags: &[(&'static str, bool)]) -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();
    for &(tag, persistent) in tags {
        registry
            .register(ComponentEntry::from_fn(tag, Switch::default).persistent(persistent))
            .unwrap();
    }
    registry
}

fn a_b_cleared() -> Vec<PhaseDefinition> {
    vec![
        PhaseDefinition::new("A")
            .initial()
            .transition("B", Guard::PhaseTimeAtLeast { secs: 10.0 }),
        PhaseDefinition::new("B").activating("X").transition(
            "Cleared",
            Guard::ComponentResolved {
                component: "X".into(),
            },
        ),
        PhaseDefinition::new("Cleared").terminal(Outcome::Cleared),
    ]
}

fn resolve(registry: &mut ComponentRegistry, world: &WorldSnapshot, time: f32) {
    let arena = ArenaBounds::circle(Vec2::ZERO, 20.0).unwrap();
    let config = EngineConfig::default();
    let ctx = TickContext::new(world, &arena, &config, time);
    let event = EncounterEvent::Cast(CastEvent {
        caster: ActorId(99),
        action: 1,
        kind: CastKind::Completed,
        target: None,
        location: None,
        duration: None,
        sequence: None,
    });
    dispatch(&event, registry, &ctx);
}

#[test]
fn timer_then_component_then_cleared() {
    let world = WorldSnapshot::new();
    let mut registry = registry(&[("X", false)]);
    let mut machine = PhaseMachine::new(a_b_cleared(), &registry).unwrap();
    machine.start(&mut registry, 0.0);

    for tick in 0..10 {
        assert!(machine.evaluate(&mut registry, &world, tick as f32).is_none());
    }
    assert_eq!(machine.current_name(), "A");
    assert!(!registry.is_active("X"));

    let change = machine.evaluate(&mut registry, &world, 10.0).unwrap();
    assert_eq!((change.from.as_str(), change.to.as_str()), ("A", "B"));
    assert!(registry.is_active("X"));

    // timers keep running but X is unresolved
    for tick in 11..40 {
        assert!(machine.evaluate(&mut registry, &world, tick as f32).is_none());
    }
    assert_eq!(machine.current_name(), "B");
    assert_eq!(machine.time_in_phase(39.0), 29.0);

    resolve(&mut registry, &world, 40.0);
    let change = machine.evaluate(&mut registry, &world, 40.0).unwrap();
    assert_eq!(change.to, "Cleared");
    assert_eq!(machine.outcome(), Some(Outcome::Cleared));
    assert!(registry.active_tags().is_empty());

    // terminal: nothing else happens
    machine.force_advance();
    assert!(machine.evaluate(&mut registry, &world, 41.0).is_none());
    assert_eq!(machine.history().len(), 2);
}

#[test]
fn first_true_guard_in_declared_order_wins() {
    let world = WorldSnapshot::new();
    let mut registry = registry(&[]);
    let phases = vec![
        PhaseDefinition::new("start")
            .initial()
            .transition("left", Guard::PhaseTimeAtLeast { secs: 5.0 })
            .transition("right", Guard::PhaseTimeAtLeast { secs: 3.0 }),
        PhaseDefinition::new("left").terminal(Outcome::Cleared),
        PhaseDefinition::new("right").terminal(Outcome::Wiped),
    ];
    let mut machine = PhaseMachine::new(phases, &registry).unwrap();
    machine.start(&mut registry, 0.0);

    let change = machine.evaluate(&mut registry, &world, 6.0).unwrap();
    assert_eq!(change.to, "left");
}

#[test]
fn force_advance_is_consumed() {
    let world = WorldSnapshot::new();
    let mut registry = registry(&[]);
    let phases = vec![
        PhaseDefinition::new("one").initial().transition("two", Guard::ForceAdvance),
        PhaseDefinition::new("two").transition("end", Guard::ForceAdvance),
        PhaseDefinition::new("end").terminal(Outcome::Cleared),
    ];
    let mut machine = PhaseMachine::new(phases, &registry).unwrap();
    machine.start(&mut registry, 0.0);

    machine.force_advance();
    assert!(machine.evaluate(&mut registry, &world, 1.0).is_some());
    assert!(machine.evaluate(&mut registry, &world, 2.0).is_none());
    assert_eq!(machine.current_name(), "two");
}

#[test]
fn phase_exit_stops_only_non_persistent_components() {
    let world = WorldSnapshot::new();
    let mut registry = registry(&[("short", false), ("long", true)]);
    let phases = vec![
        PhaseDefinition::new("one")
            .initial()
            .activating("short")
            .activating("long")
            .transition("two", Guard::ForceAdvance),
        PhaseDefinition::new("two").transition("end", Guard::ForceAdvance),
        PhaseDefinition::new("end").terminal(Outcome::Cleared),
    ];
    let mut machine = PhaseMachine::new(phases, &registry).unwrap();
    machine.start(&mut registry, 0.0);
    assert_eq!(registry.active_tags(), vec!["short", "long"]);

    machine.force_advance();
    machine.evaluate(&mut registry, &world, 1.0);
    assert_eq!(registry.active_tags(), vec!["long"]);

    machine.force_advance();
    machine.evaluate(&mut registry, &world, 2.0);
    assert!(registry.active_tags().is_empty());
}

#[test]
fn wipe_and_restart() {
    let mut world = WorldSnapshot::new().with_party_member(0, Actor::new(ActorId(1), Vec2::ZERO));
    let mut registry = registry(&[("X", false)]);
    let mut phases = a_b_cleared();
    phases[0] = phases[0].clone().transition("Wipe", Guard::PartyDead);
    phases.push(PhaseDefinition::new("Wipe").terminal(Outcome::Wiped));

    let mut machine = PhaseMachine::new(phases, &registry).unwrap();
    machine.start(&mut registry, 0.0);

    if let Some(actor) = world.actor_mut(ActorId(1)) {
        actor.dead = true;
    }
    assert!(world.party_wiped());
    machine.evaluate(&mut registry, &world, 3.0);
    assert_eq!(machine.outcome(), Some(Outcome::Wiped));

    machine.start(&mut registry, 50.0);
    assert_eq!(machine.current_name(), "A");
    assert_eq!(machine.outcome(), None);
    assert!(machine.history().is_empty());
    assert_eq!(machine.time_in_phase(55.0), 5.0);
}

// ─── Validation ──────────────────────────────────────────────────────────────

fn malformed(phases: Vec<PhaseDefinition>, registry: &ComponentRegistry) -> String {
    match PhaseMachine::new(phases, registry) {
        Err(EngineError::MalformedConfiguration { reason }) => reason,
        other => panic!("expected malformed configuration, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn unreachable_terminal_rejected() {
    let registry = registry(&[]);
    let phases = vec![
        PhaseDefinition::new("A").initial().transition("B", Guard::ForceAdvance),
        // B and C only loop between each other
        PhaseDefinition::new("B").transition("C", Guard::ForceAdvance),
        PhaseDefinition::new("C").transition("B", Guard::ForceAdvance),
        PhaseDefinition::new("End").terminal(Outcome::Cleared),
    ];
    let reason = malformed(phases, &registry);
    assert!(reason.contains("cannot reach a terminal"), "{reason}");
}

#[test]
fn missing_terminal_rejected() {
    let registry = registry(&[]);
    let phases = vec![PhaseDefinition::new("A").initial()];
    assert!(malformed(phases, &registry).contains("no terminal"));
}

#[test]
fn initial_phase_count_checked() {
    let registry = registry(&[]);
    let none = vec![PhaseDefinition::new("End").terminal(Outcome::Cleared)];
    assert!(malformed(none, &registry).contains("no initial"));

    let two = vec![
        PhaseDefinition::new("A").initial().transition("End", Guard::ForceAdvance),
        PhaseDefinition::new("B").initial().transition("End", Guard::ForceAdvance),
        PhaseDefinition::new("End").terminal(Outcome::Cleared),
    ];
    assert!(malformed(two, &registry).contains("marked initial"));
}

#[test]
fn unknown_references_rejected() {
    let registry = registry(&[("X", false)]);

    let bad_dest = vec![
        PhaseDefinition::new("A").initial().transition("Nowhere", Guard::ForceAdvance),
        PhaseDefinition::new("End").terminal(Outcome::Cleared),
    ];
    assert!(malformed(bad_dest, &registry).contains("unknown phase 'Nowhere'"));

    let bad_tag = vec![
        PhaseDefinition::new("A").initial().activating("Y").transition("End", Guard::ForceAdvance),
        PhaseDefinition::new("End").terminal(Outcome::Cleared),
    ];
    assert!(malformed(bad_tag, &registry).contains("unknown component 'Y'"));

    let bad_guard = vec![
        PhaseDefinition::new("A").initial().transition(
            "End",
            Guard::AnyOf {
                conditions: vec![Guard::ComponentResolved {
                    component: "Z".into(),
                }],
            },
        ),
        PhaseDefinition::new("End").terminal(Outcome::Cleared),
    ];
    assert!(malformed(bad_guard, &registry).contains("unknown component 'Z'"));
}

#[test]
fn duplicate_names_rejected() {
    let registry = registry(&[]);
    let phases = vec![
        PhaseDefinition::new("A").initial().transition("End", Guard::ForceAdvance),
        PhaseDefinition::new("End").terminal(Outcome::Cleared),
        PhaseDefinition::new("End").terminal(Outcome::Wiped),
    ];
    assert!(malformed(phases, &registry).contains("duplicate phase name"));
}

#[test]
fn phases_parse_from_toml() {
    #[derive(serde::Deserialize)]
    struct Doc {
        phase: Vec<PhaseDefinition>,
    }

    let doc: Doc = toml::from_str(
        r#"
        [[phase]]
        name = "Opener"
        initial = true
        activate = ["X"]

        [[phase.transition]]
        to = "Done"
        guard = { type = "component_resolved", component = "X" }

        [[phase.transition]]
        to = "Wipe"
        guard = { type = "party_dead" }

        [[phase]]
        name = "Done"
        terminal = "cleared"

        [[phase]]
        name = "Wipe"
        terminal = "wiped"
        "#,
    )
    .unwrap();

    assert_eq!(doc.phase.len(), 3);
    assert_eq!(doc.phase[0].transitions.len(), 2);
    assert_eq!(doc.phase[2].terminal, Some(Outcome::Wiped));
    assert!(PhaseMachine::new(doc.phase, &registry(&[("X", false)])).is_ok());
}
