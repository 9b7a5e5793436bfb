//! Stack points and spread targets assigned by icons or statuses
//!
//! Stack points must gather `required` players (themselves included) within
//! the stack radius; everybody else must stand within the radius of at least
//! one stack point. Spread targets keep everyone else out of their radius.
//! With `source_oid` set, the line from that enemy to the stack point it
//! will hit next is drawn; stack points are hit in turn, one per resolve.

use serde::{Deserialize, Serialize};
use waymark_types::ColorRole;

use crate::components::{Component, Progress, TickContext};
use crate::draw::DrawIntent;
use crate::events::{CastEvent, IconEvent, StatusChange, StatusEvent};
use crate::geometry::Shape;
use crate::hints::ForbiddenZone;
use crate::serde_defaults::default_stack_required;
use crate::world::{ActionId, Actor, ActorId, IconId, Oid, StatusId};

use super::SeenCasts;

const HINT_SPREAD: &str = "Spread!";
const HINT_GTFO_SPREAD: &str = "GTFO from spread!";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackSpreadConfig {
    #[serde(default)]
    pub stack_icons: Vec<IconId>,
    #[serde(default)]
    pub stack_statuses: Vec<StatusId>,
    #[serde(default)]
    pub spread_icons: Vec<IconId>,
    #[serde(default)]
    pub spread_statuses: Vec<StatusId>,

    #[serde(default = "default_radius")]
    pub stack_radius: f32,
    #[serde(default = "default_radius")]
    pub spread_radius: f32,

    /// Players sharing one stack, the stack point included
    #[serde(default = "default_stack_required")]
    pub required: usize,

    /// Casts that resolve one round of the mechanic
    #[serde(default)]
    pub resolve_actions: Vec<ActionId>,

    /// Rounds until the mechanic is resolved; 0 never resolves
    #[serde(default)]
    pub expected_resolves: u32,

    #[serde(default = "default_stack_hint")]
    pub stack_hint: String,

    /// Enemy that strikes the stack points in turn
    #[serde(default)]
    pub source_oid: Option<Oid>,
}

fn default_radius() -> f32 {
    6.0
}

fn default_stack_hint() -> String {
    "Stack in fours!".to_string()
}

/// A marked actor with the deadline of its mark, if known
#[derive(Debug, Clone, Copy, PartialEq)]
struct Mark {
    actor: ActorId,
    created: f32,
    deadline: Option<f32>,
}

impl Mark {
    fn zone(&self, shape: Shape) -> ForbiddenZone {
        match self.deadline {
            Some(t) => ForbiddenZone::at(shape, t, self.created),
            None => ForbiddenZone::always(shape),
        }
    }
}

/// Add or refresh a mark. Redelivery leaves a single entry.
fn upsert_mark(marks: &mut Vec<Mark>, mark: Mark) {
    match marks.iter_mut().find(|m| m.actor == mark.actor) {
        Some(existing) => existing.deadline = mark.deadline.or(existing.deadline),
        None => marks.push(mark),
    }
}

pub struct StackSpread {
    config: StackSpreadConfig,
    stack_points: Vec<Mark>,
    spread_targets: Vec<Mark>,
    resolves: u32,
    seen: SeenCasts,
}

impl StackSpread {
    pub fn new(config: StackSpreadConfig) -> Self {
        Self {
            config,
            stack_points: Vec::new(),
            spread_targets: Vec::new(),
            resolves: 0,
            seen: SeenCasts::default(),
        }
    }

    /// Mark a stack point directly
    pub fn with_stack_point(mut self, actor: ActorId) -> Self {
        upsert_mark(
            &mut self.stack_points,
            Mark {
                actor,
                created: 0.0,
                deadline: None,
            },
        );
        self
    }

    /// Source enemy and the stack point it strikes next
    fn next_strike<'a>(&self, ctx: &TickContext<'a>) -> Option<(&'a Actor, &'a Actor)> {
        let oid = self.config.source_oid?;
        let source = ctx.world.enemies(oid).into_iter().find(|a| !a.dead)?;
        if self.stack_points.is_empty() {
            return None;
        }
        let mark = self.stack_points[self.resolves as usize % self.stack_points.len()];
        let target = ctx.actor(mark.actor)?;
        Some((source, target))
    }

    fn is_resolved(&self) -> bool {
        self.progress().resolved
    }

    fn is_stack_point(&self, id: ActorId) -> bool {
        self.stack_points.iter().any(|m| m.actor == id)
    }

    fn is_spread_target(&self, id: ActorId) -> bool {
        self.spread_targets.iter().any(|m| m.actor == id)
    }

    /// Stack points still in the world and alive
    fn stack_positions<'a>(&self, ctx: &TickContext<'a>) -> Vec<(Mark, &'a Actor)> {
        self.stack_points
            .iter()
            .filter_map(|m| ctx.actor(m.actor).map(|a| (*m, a)))
            .filter(|(_, a)| !a.dead)
            .collect()
    }

    fn spread_positions<'a>(&self, ctx: &TickContext<'a>) -> Vec<(Mark, &'a Actor)> {
        self.spread_targets
            .iter()
            .filter_map(|m| ctx.actor(m.actor).map(|a| (*m, a)))
            .collect()
    }

    fn mark(&mut self, actor: ActorId, stack: bool, created: f32, deadline: Option<f32>) {
        let marks = if stack {
            &mut self.stack_points
        } else {
            &mut self.spread_targets
        };
        upsert_mark(
            marks,
            Mark {
                actor,
                created,
                deadline,
            },
        );
    }

    fn unmark(&mut self, actor: ActorId, stack: bool) {
        let marks = if stack {
            &mut self.stack_points
        } else {
            &mut self.spread_targets
        };
        marks.retain(|m| m.actor != actor);
    }
}

impl Component for StackSpread {
    fn text_hints(&self, ctx: &TickContext<'_>, _slot: usize, actor: &Actor) -> Vec<String> {
        let mut hints = Vec::new();
        if self.is_resolved() {
            return hints;
        }

        let stack_radius = self.config.stack_radius;
        if self.is_stack_point(actor.id) {
            let near = ctx
                .world
                .party_in_radius_excluding(actor.id, actor.position, stack_radius)
                .len();
            if near + 1 < self.config.required {
                hints.push(self.config.stack_hint.clone());
            }
        } else {
            let points = self.stack_positions(ctx);
            if !points.is_empty()
                && !points
                    .iter()
                    .any(|(_, p)| p.position.distance(actor.position) <= stack_radius)
            {
                hints.push(self.config.stack_hint.clone());
            }
        }

        let spread_radius = self.config.spread_radius;
        if self.is_spread_target(actor.id) {
            let near = ctx
                .world
                .party_in_radius_excluding(actor.id, actor.position, spread_radius);
            if !near.is_empty() {
                hints.push(HINT_SPREAD.to_string());
            }
        } else if self
            .spread_positions(ctx)
            .iter()
            .any(|(_, p)| p.position.distance(actor.position) <= spread_radius)
        {
            hints.push(HINT_GTFO_SPREAD.to_string());
        }
        hints
    }

    fn forbidden_zones(&self, ctx: &TickContext<'_>, _slot: usize, actor: &Actor) -> Vec<ForbiddenZone> {
        let mut zones = Vec::new();
        if self.is_resolved() {
            return zones;
        }

        // stay inside the nearest stack
        if !self.is_stack_point(actor.id)
            && let Some((mark, nearest)) = self.stack_positions(ctx).into_iter().min_by(|a, b| {
                let da = a.1.position.distance_squared(actor.position);
                let db = b.1.position.distance_squared(actor.position);
                da.total_cmp(&db)
            })
        {
            zones.push(mark.zone(Shape::inverted_circle(nearest.position, self.config.stack_radius)));
        }

        let spread_radius = self.config.spread_radius;
        if let Some(own) = self.spread_targets.iter().find(|m| m.actor == actor.id) {
            for (_, other) in ctx.world.alive_party() {
                if other.id != actor.id {
                    zones.push(own.zone(Shape::circle(other.position, spread_radius)));
                }
            }
        } else {
            for (mark, target) in self.spread_positions(ctx) {
                zones.push(mark.zone(Shape::circle(target.position, spread_radius)));
            }
        }
        zones
    }

    fn draw_intents(&self, ctx: &TickContext<'_>, _pov: &Actor) -> Vec<DrawIntent> {
        let mut intents = Vec::new();
        if self.is_resolved() {
            return intents;
        }
        if let Some((source, target)) = self.next_strike(ctx) {
            intents.push(DrawIntent::line(source.position, target.position, ColorRole::Danger));
            intents.push(DrawIntent::marker(source.position, ColorRole::Danger));
        }
        for (_, player) in ctx.world.party() {
            if self.is_stack_point(player.id) {
                intents.push(DrawIntent::marker(player.position, ColorRole::PlayerInteresting));
                intents.push(DrawIntent::circle(player.position, self.config.stack_radius, ColorRole::Danger));
            } else if self.is_spread_target(player.id) {
                intents.push(DrawIntent::marker(player.position, ColorRole::Vulnerable));
                intents.push(DrawIntent::circle(player.position, self.config.spread_radius, ColorRole::Danger));
            } else {
                intents.push(DrawIntent::marker(player.position, ColorRole::PlayerGeneric));
            }
        }
        intents
    }

    fn on_cast(&mut self, _ctx: &TickContext<'_>, event: &CastEvent) {
        if event.is_action(&self.config.resolve_actions) && self.seen.completion(event) {
            self.resolves += 1;
        }
    }

    fn on_icon(&mut self, ctx: &TickContext<'_>, event: &IconEvent) {
        if self.config.stack_icons.contains(&event.icon) {
            self.mark(event.actor, true, ctx.time, None);
        } else if self.config.spread_icons.contains(&event.icon) {
            self.mark(event.actor, false, ctx.time, None);
        }
    }

    fn on_status(&mut self, ctx: &TickContext<'_>, event: &StatusEvent) {
        let stack = if self.config.stack_statuses.contains(&event.status) {
            true
        } else if self.config.spread_statuses.contains(&event.status) {
            false
        } else {
            return;
        };
        match event.change {
            StatusChange::Applied => {
                let deadline = event.duration.map(|d| ctx.time + d);
                self.mark(event.actor, stack, ctx.time, deadline);
            }
            StatusChange::Removed => self.unmark(event.actor, stack),
        }
    }

    fn on_actor_removed(&mut self, actor: ActorId) {
        self.unmark(actor, true);
        self.unmark(actor, false);
    }

    fn progress(&self) -> Progress {
        Progress::counting(self.resolves, self.config.expected_resolves)
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;
    use waymark_types::Role;

    use super::*;
    use crate::events::CastKind;
    use crate::mechanics::test_support::*;
    use crate::world::WorldState;

    const STACK_ICON: IconId = 0x64;
    const SPREAD_STATUS: StatusId = 0xB6;
    const SEVER: ActionId = 0x63C9;

    fn config() -> StackSpreadConfig {
        toml::from_str(
            r#"
            stack_icons = [0x64]
            spread_statuses = [0xB6]
            resolve_actions = [0x63C9]
            expected_resolves = 2
            "#,
        )
        .unwrap()
    }

    /// Stack point in slot 0 at the origin; slots 1-3 within 5; slot 4 at 7
    fn stack_of_four() -> Harness {
        Harness::new()
            .party(0, Vec2::ZERO, Role::Tank)
            .party(1, Vec2::new(5.0, 0.0), Role::Healer)
            .party(2, Vec2::new(0.0, 4.0), Role::Melee)
            .party(3, Vec2::new(-3.0, -3.0), Role::Caster)
            .party(4, Vec2::new(7.0, 0.0), Role::Ranged)
    }

    #[test]
    fn stack_of_four_scenario() {
        let h = stack_of_four();
        let mut mech = StackSpread::new(config());
        mech.on_icon(&h.ctx(0.0), &icon(member(0), STACK_ICON));

        assert!(h.hints(&mech, 0.0, 0).is_empty());
        assert!(h.hints(&mech, 0.0, 1).is_empty());
        assert_eq!(h.hints(&mech, 0.0, 4), vec!["Stack in fours!"]);

        let zones = h.zones(&mech, 0.0, 4);
        assert_eq!(zones.len(), 1);
        assert!(zones[0].shape.contains(Vec2::new(10.0, 0.0)));
        assert!(!zones[0].shape.contains(Vec2::new(1.0, 0.0)));
    }

    #[test]
    fn stack_point_counts_others() {
        let mut h = stack_of_four();
        h.move_to(member(3), Vec2::new(-9.0, 0.0));
        let mech = StackSpread::new(config()).with_stack_point(member(0));
        // only two others within radius now
        assert_eq!(h.hints(&mech, 0.0, 0), vec!["Stack in fours!"]);
    }

    #[test]
    fn any_stack_point_satisfies() {
        let h = stack_of_four();
        let mech = StackSpread::new(config())
            .with_stack_point(member(0))
            .with_stack_point(member(4));
        // slot 2 is inside the origin stack only, slot 1 inside both
        assert!(h.hints(&mech, 0.0, 1).is_empty());
        assert!(h.hints(&mech, 0.0, 2).is_empty());
    }

    #[test]
    fn stack_hints_are_idempotent() {
        let h = stack_of_four();
        let mut mech = StackSpread::new(config());
        let ctx = h.ctx(0.0);
        mech.on_icon(&ctx, &icon(member(0), STACK_ICON));
        // redelivery does not duplicate the stack point
        mech.on_icon(&ctx, &icon(member(0), STACK_ICON));

        for slot in 0..5 {
            let first = h.hints(&mech, 0.0, slot);
            let second = h.hints(&mech, 0.0, slot);
            assert_eq!(first, second);
        }
        assert_eq!(mech.stack_points.len(), 1);
    }

    #[test]
    fn spread_target_pushes_others_away() {
        let h = stack_of_four();
        let mut mech = StackSpread::new(config());
        let status_on = status(member(1), SPREAD_STATUS, StatusChange::Applied, Some(6.0));
        mech.on_status(&h.ctx(2.0), &status_on);

        assert_eq!(h.hints(&mech, 2.0, 1), vec![HINT_SPREAD]);
        assert_eq!(h.hints(&mech, 2.0, 4), vec![HINT_GTFO_SPREAD]);

        let zones = h.zones(&mech, 2.0, 4);
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].deadline(), Some(8.0));
        // the spread target avoids all four others
        assert_eq!(h.zones(&mech, 2.0, 1).len(), 4);

        let status_off = status(member(1), SPREAD_STATUS, StatusChange::Removed, None);
        mech.on_status(&h.ctx(3.0), &status_off);
        assert!(h.hints(&mech, 3.0, 4).is_empty());
    }

    #[test]
    fn resolves_after_expected_rounds() {
        let h = stack_of_four();
        let mut mech = StackSpread::new(config()).with_stack_point(member(0));
        let sever = cast(BOSS, SEVER, CastKind::Completed);

        mech.on_cast(&h.ctx(10.0), &sever);
        mech.on_cast(&h.ctx(10.0), &sever);
        assert_eq!(mech.progress().count, 1);
        assert!(!mech.progress().resolved);

        mech.on_cast(&h.ctx(13.0), &cast(BOSS, SEVER, CastKind::Started));
        mech.on_cast(&h.ctx(14.0), &sever);
        assert!(mech.progress().resolved);
        assert!(h.hints(&mech, 14.0, 4).is_empty());
    }

    #[test]
    fn completion_redelivered_next_tick_counts_once() {
        let h = stack_of_four();
        let mut mech = StackSpread::new(config()).with_stack_point(member(0));
        let sever = cast(BOSS, SEVER, CastKind::Completed);

        mech.on_cast(&h.ctx(1.0), &sever);
        mech.on_cast(&h.ctx(1.1), &sever);
        assert_eq!(
            mech.progress(),
            Progress {
                resolved: false,
                count: 1
            }
        );
    }

    #[test]
    fn vanished_stack_point_leaves_valid_ones() {
        let mut h = stack_of_four();
        h.move_to(member(1), Vec2::new(15.0, 0.0));
        let mech = StackSpread::new(config())
            .with_stack_point(member(0))
            .with_stack_point(ActorId(0xDEAD));

        assert_eq!(h.hints(&mech, 0.0, 1), vec!["Stack in fours!"]);
        let zones = h.zones(&mech, 0.0, 1);
        assert_eq!(zones.len(), 1);
        // stay inside the remaining stack at the origin
        assert!(!zones[0].shape.contains(Vec2::new(1.0, 0.0)));
    }

    #[test]
    fn dead_stack_point_is_skipped() {
        let mut h = stack_of_four();
        h.actor_mut(member(4)).dead = true;
        let mech = StackSpread::new(config())
            .with_stack_point(member(0))
            .with_stack_point(member(4));
        // slot 1 at (5,0) is nearer the dead stack at (7,0) but must follow the live one
        let zones = h.zones(&mech, 0.0, 1);
        assert_eq!(zones.len(), 1);
        assert!(zones[0].shape.contains(Vec2::new(0.0, 7.0)));
        assert!(!zones[0].shape.contains(Vec2::new(0.0, 5.0)));
    }

    #[test]
    fn sever_line_follows_resolves() {
        const ZEPHIRIN: u32 = 0x2E3;
        let h = stack_of_four().enemy(Actor::new(ActorId(0x4000_0030), Vec2::new(0.0, 15.0)).with_oid(ZEPHIRIN));
        let mut cfg = config();
        cfg.source_oid = Some(ZEPHIRIN);
        let mut mech = StackSpread::new(cfg)
            .with_stack_point(member(0))
            .with_stack_point(member(4));
        let pov = h.world.party_member(1).unwrap();

        let line_to = |mech: &StackSpread| {
            mech.draw_intents(&h.ctx(0.0), pov).into_iter().find_map(|i| match i {
                DrawIntent::Line { from, to, .. } => Some((from, to)),
                _ => None,
            })
        };
        assert_eq!(line_to(&mech), Some((Vec2::new(0.0, 15.0), Vec2::ZERO)));

        mech.on_cast(&h.ctx(5.0), &cast(BOSS, SEVER, CastKind::Completed));
        assert_eq!(line_to(&mech), Some((Vec2::new(0.0, 15.0), Vec2::new(7.0, 0.0))));
    }

    #[test]
    fn vanished_stack_point_degrades_quietly() {
        let h = stack_of_four();
        let mech = StackSpread::new(config()).with_stack_point(ActorId(0xDEAD));
        assert!(h.hints(&mech, 0.0, 4).is_empty());
        assert!(h.zones(&mech, 0.0, 4).is_empty());
    }
}
