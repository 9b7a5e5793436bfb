use super::{ActorHints, ZoneStatus};
use crate::components::{ComponentRegistry, TickContext};
use crate::world::Actor;

/// Union of every contributing component's hints and zones for one party
/// member, in registration order. No deduplication.
///
/// Zones are stamped with their component's tag and a status for the
/// current time. Zones that leave no safe in-bounds spot are dropped when
/// `drop_unsafe_zones` is set; expired zones are kept unless
/// `report_expired_zones` is off. Target hints for the same enemy merge:
/// highest priority wins and the tanking flags are or-ed.
pub fn hints_for(registry: &ComponentRegistry, ctx: &TickContext<'_>, slot: usize, actor: &Actor) -> ActorHints {
    let mut hints = ActorHints::default();
    let config = ctx.config;

    for (tag, component) in registry.contributing() {
        hints.text.extend(component.text_hints(ctx, slot, actor));

        for mut zone in component.forbidden_zones(ctx, slot, actor) {
            zone.status = zone.status_at(ctx.time);
            if zone.status == ZoneStatus::Expired && !config.report_expired_zones {
                continue;
            }
            if config.drop_unsafe_zones && !ctx.arena.has_safe_complement(&zone.shape, config.safe_spot_step) {
                tracing::debug!(tag, slot, shape = ?zone.shape, "Dropping zone with no safe spot");
                continue;
            }
            zone.source = tag.to_string();
            hints.zones.push(zone);
        }

        for target in component.target_hints(ctx, slot, actor) {
            match hints.targets.iter_mut().find(|t| t.actor == target.actor) {
                Some(existing) => existing.merge(&target),
                None => hints.targets.push(target),
            }
        }
    }

    hints
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::arena::ArenaBounds;
    use crate::components::{Component, ComponentEntry};
    use crate::config::EngineConfig;
    use crate::geometry::Shape;
    use crate::hints::{Activation, ForbiddenZone, TargetHint};
    use crate::world::{ActorId, WorldSnapshot};

    /// Forbids a fixed circle (or everything outside it) and says a fixed line
    struct FixedZone {
        center: Vec2,
        radius: f32,
        deadline: Option<f32>,
        inside: bool,
        text: &'static str,
    }

    impl Component for FixedZone {
        fn text_hints(&self, _ctx: &TickContext<'_>, _slot: usize, _actor: &Actor) -> Vec<String> {
            vec![self.text.to_string()]
        }

        fn forbidden_zones(&self, _ctx: &TickContext<'_>, _slot: usize, _actor: &Actor) -> Vec<ForbiddenZone> {
            let shape = if self.inside {
                Shape::inverted_circle(self.center, self.radius)
            } else {
                Shape::circle(self.center, self.radius)
            };
            vec![match self.deadline {
                Some(t) => ForbiddenZone::at(shape, t, 0.0),
                None => ForbiddenZone::always(shape),
            }]
        }
    }

    fn fixed(tag: &'static str, center: Vec2, radius: f32, deadline: Option<f32>) -> ComponentEntry {
        ComponentEntry::from_fn(tag, move || FixedZone {
            center,
            radius,
            deadline,
            inside: false,
            text: tag,
        })
        .active_at_start(true)
    }

    fn stay_inside(tag: &'static str, center: Vec2, radius: f32) -> ComponentEntry {
        ComponentEntry::from_fn(tag, move || FixedZone {
            center,
            radius,
            deadline: None,
            inside: true,
            text: tag,
        })
        .active_at_start(true)
    }

    /// Rates one enemy
    struct Rater(TargetHint);

    impl Component for Rater {
        fn target_hints(&self, _ctx: &TickContext<'_>, _slot: usize, _actor: &Actor) -> Vec<TargetHint> {
            vec![self.0]
        }
    }

    fn rater(tag: &'static str, hint: TargetHint) -> ComponentEntry {
        ComponentEntry::from_fn(tag, move || Rater(hint)).active_at_start(true)
    }

    fn registry_of(entries: Vec<ComponentEntry>) -> ComponentRegistry {
        let mut registry = ComponentRegistry::new();
        for entry in entries {
            registry.register(entry).unwrap();
        }
        registry.restart();
        registry
    }

    fn query(registry: &ComponentRegistry, time: f32, config: &EngineConfig) -> ActorHints {
        let world = WorldSnapshot::new().with_party_member(0, Actor::new(ActorId(1), Vec2::ZERO));
        let arena = ArenaBounds::circle(Vec2::ZERO, 20.0).unwrap();
        let ctx = TickContext::new(&world, &arena, config, time);
        let actor = Actor::new(ActorId(1), Vec2::ZERO);
        hints_for(registry, &ctx, 0, &actor)
    }

    #[test]
    fn identical_zones_are_not_merged() {
        let registry = registry_of(vec![
            fixed("a", Vec2::new(3.0, 0.0), 5.0, Some(8.0)),
            fixed("b", Vec2::new(3.0, 0.0), 5.0, Some(8.0)),
        ]);
        let hints = query(&registry, 1.0, &EngineConfig::default());

        assert_eq!(hints.zones.len(), 2);
        assert_eq!(hints.zones[0].shape, hints.zones[1].shape);
        assert_eq!(hints.zones[0].source, "a");
        assert_eq!(hints.zones[1].source, "b");
        assert_eq!(hints.text, vec!["a", "b"]);
    }

    #[test]
    fn union_is_independent_of_registration_order() {
        let a = || fixed("a", Vec2::new(3.0, 0.0), 5.0, Some(8.0));
        let b = || fixed("b", Vec2::new(-4.0, 2.0), 3.0, None);
        let c = || fixed("c", Vec2::new(0.0, 9.0), 2.0, Some(4.0));
        let config = EngineConfig::default();

        let forward = query(&registry_of(vec![a(), b(), c()]), 1.0, &config);
        let backward = query(&registry_of(vec![c(), b(), a()]), 1.0, &config);

        let key = |z: &ForbiddenZone| (z.source.clone(), format!("{:?}", z.shape), format!("{:?}", z.activation));
        let mut lhs: Vec<_> = forward.zones.iter().map(key).collect();
        let mut rhs: Vec<_> = backward.zones.iter().map(key).collect();
        lhs.sort();
        rhs.sort();
        assert_eq!(lhs, rhs);
        assert_ne!(forward.zones[0].source, backward.zones[0].source);
    }

    #[test]
    fn expired_zones_are_flagged_not_dropped() {
        let registry = registry_of(vec![
            fixed("late", Vec2::new(3.0, 0.0), 5.0, Some(2.0)),
            fixed("forever", Vec2::new(-3.0, 0.0), 5.0, None),
        ]);
        let hints = query(&registry, 5.0, &EngineConfig::default());
        assert_eq!(hints.zones[0].status, ZoneStatus::Expired);
        assert_eq!(hints.zones[1].status, ZoneStatus::Persistent);
        // expired zones no longer forbid anything
        assert!(!hints.is_forbidden(Vec2::new(3.0, 0.0)));
        assert!(hints.is_forbidden(Vec2::new(-3.0, 0.0)));

        let hidden = EngineConfig {
            report_expired_zones: false,
            ..EngineConfig::default()
        };
        assert_eq!(query(&registry, 5.0, &hidden).zones.len(), 1);
    }

    #[test]
    fn zone_covering_whole_arena_is_dropped() {
        let registry = registry_of(vec![fixed("huge", Vec2::ZERO, 50.0, None)]);
        let hints = query(&registry, 0.0, &EngineConfig::default());
        assert!(hints.zones.is_empty());
        assert_eq!(hints.text, vec!["huge"]);

        let keep = EngineConfig {
            drop_unsafe_zones: false,
            ..EngineConfig::default()
        };
        assert_eq!(query(&registry, 0.0, &keep).zones.len(), 1);
    }

    #[test]
    fn small_stay_inside_zone_is_kept() {
        // interior lies between grid points at the default step
        let registry = registry_of(vec![stay_inside("partner", Vec2::new(0.5, 0.5), 0.6)]);
        let hints = query(&registry, 0.0, &EngineConfig::default());
        assert_eq!(hints.zones.len(), 1);
        assert!(!hints.is_forbidden(Vec2::new(0.5, 0.5)));
        assert!(hints.is_forbidden(Vec2::new(2.0, 0.0)));

        // a stay-inside zone entirely beyond the wall is still dropped
        let unreachable = registry_of(vec![stay_inside("gone", Vec2::new(40.0, 0.0), 1.0)]);
        assert!(query(&unreachable, 0.0, &EngineConfig::default()).zones.is_empty());
    }

    #[test]
    fn target_ratings_merge_per_enemy() {
        let boss = ActorId(0x40);
        let add = ActorId(0x41);
        let registry = registry_of(vec![
            rater("dps", TargetHint::new(boss, 1)),
            rater("adds", TargetHint::new(add, -1)),
            rater(
                "swap",
                TargetHint {
                    should_tank: true,
                    prefer_provoking: true,
                    ..TargetHint::new(boss, 0)
                },
            ),
        ]);
        let hints = query(&registry, 0.0, &EngineConfig::default());

        assert_eq!(hints.targets.len(), 2);
        assert_eq!(hints.targets[0].actor, boss);
        let merged = hints.target(boss).unwrap();
        assert_eq!(merged.priority, 1);
        assert!(merged.should_tank && merged.prefer_provoking);
        assert_eq!(hints.target(add).unwrap().priority, -1);
    }

    #[test]
    fn deadline_never_precedes_creation() {
        let zone = ForbiddenZone::at(Shape::circle(Vec2::ZERO, 1.0), 3.0, 7.5);
        assert_eq!(zone.activation, Activation::At(7.5));
        assert_eq!(zone.status_at(7.5), ZoneStatus::Imminent);
        assert_eq!(zone.status_at(7.6), ZoneStatus::Expired);
    }
}
