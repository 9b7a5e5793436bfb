//! Scripted scenarios for the replay CLI
//!
//! A scenario stands in for the live frame loop: it seeds the world with
//! actors, then lists frames. Each frame patches actors, removes actors,
//! and feeds events to the encounter module before ticking it.
//!
//! ```toml
//! pov = 1
//!
//! [[actor]]
//! id = 0x10000001
//! slot = 1
//! role = "healer"
//! position = [10.0, 0.0]
//!
//! [[frame]]
//! time = 1.0
//!
//! [[frame.event]]
//! type = "icon"
//! actor = 0x10000001
//! icon = 0x3E
//! ```

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};
use waymark_core::geometry::Shape;
use waymark_core::{
    Actor, ActorId, EncounterEvent, EncounterModule, TickInput, TickReport, WorldSnapshot,
    WorldState, ZoneStatus,
};

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scenario {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("frame {index} at {time}s precedes the previous frame at {previous}s")]
    TimeWentBackwards { index: usize, time: f32, previous: f32 },
}

// ═══════════════════════════════════════════════════════════════════════════
// Scenario Format
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,

    /// Party slot whose draw intents are reported
    #[serde(default)]
    pub pov: Option<usize>,

    #[serde(default, rename = "actor")]
    pub actors: Vec<ScenarioActor>,

    #[serde(default, rename = "frame")]
    pub frames: Vec<Frame>,
}

/// An actor plus how the world binds it
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioActor {
    /// Party slot to bind the actor to
    #[serde(default)]
    pub slot: Option<usize>,

    /// Bind as the primary enemy. Without any explicit primary, the first
    /// actor matching the encounter's primary oid is used.
    #[serde(default)]
    pub primary: bool,

    #[serde(flatten)]
    pub actor: Actor,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Frame {
    /// Encounter time in seconds
    pub time: f32,

    /// Actors inserted or replaced before the tick
    #[serde(default, rename = "actor")]
    pub actors: Vec<ScenarioActor>,

    /// Actors that leave the world. Each one also produces an
    /// `actor_removed` event ahead of the frame's own events.
    #[serde(default)]
    pub remove: Vec<ActorId>,

    #[serde(default, rename = "event")]
    pub events: Vec<EncounterEvent>,

    /// Raise the force-advance signal before this tick
    #[serde(default)]
    pub force_advance: bool,

    /// Start a new attempt at this frame's time before ticking
    #[serde(default)]
    pub reset: bool,
}

impl Scenario {
    pub fn parse(source: &str, path: &Path) -> Result<Self, ScenarioError> {
        let scenario: Scenario = toml::from_str(source).map_err(|source| ScenarioError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        scenario.check_order()?;
        Ok(scenario)
    }

    /// Frames must not go back in time
    fn check_order(&self) -> Result<(), ScenarioError> {
        let mut previous = f32::NEG_INFINITY;
        for (index, frame) in self.frames.iter().enumerate() {
            if frame.time < previous {
                return Err(ScenarioError::TimeWentBackwards {
                    index,
                    time: frame.time,
                    previous,
                });
            }
            previous = frame.time;
        }
        Ok(())
    }
}

pub fn load_scenario(path: &Path) -> Result<Scenario, ScenarioError> {
    let source = std::fs::read_to_string(path).map_err(|source| ScenarioError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    Scenario::parse(&source, path)
}

// ═══════════════════════════════════════════════════════════════════════════
// Replay
// ═══════════════════════════════════════════════════════════════════════════

/// Drives one encounter module through scenario frames
pub struct Replay {
    module: EncounterModule,
    world: WorldSnapshot,
    pov: Option<usize>,
}

impl Replay {
    pub fn new(module: EncounterModule, scenario: &Scenario) -> Self {
        let mut replay = Self {
            module,
            world: WorldSnapshot::new(),
            pov: scenario.pov,
        };
        replay.apply_actors(&scenario.actors);
        replay
    }

    pub fn with_pov(mut self, pov: Option<usize>) -> Self {
        if pov.is_some() {
            self.pov = pov;
        }
        self
    }

    pub fn module(&self) -> &EncounterModule {
        &self.module
    }

    pub fn world(&self) -> &WorldSnapshot {
        &self.world
    }

    fn apply_actors(&mut self, actors: &[ScenarioActor]) {
        for entry in actors {
            if let Some(slot) = entry.slot {
                self.world.set_party_slot(slot, Some(entry.actor.id));
            }
            if entry.primary {
                self.world.set_primary(Some(entry.actor.id));
            }
            self.world.upsert(entry.actor.clone());
        }

        if self.world.primary().is_none() {
            let oid = self.module.primary_oid();
            let mut candidates: Vec<ActorId> = actors
                .iter()
                .filter(|e| e.actor.oid == oid && oid != 0)
                .map(|e| e.actor.id)
                .collect();
            candidates.sort();
            if let Some(&id) = candidates.first() {
                debug!(actor = %id, oid, "Bound primary by oid");
                self.world.set_primary(Some(id));
            }
        }
    }

    /// Apply one frame and tick the module
    pub fn step(&mut self, frame: &Frame) -> TickReport {
        if frame.reset {
            self.module.reset(frame.time);
        }
        if frame.force_advance {
            self.module.force_advance();
        }

        self.apply_actors(&frame.actors);

        let mut events = Vec::with_capacity(frame.remove.len() + frame.events.len());
        for &id in &frame.remove {
            if self.world.remove(id).is_some() && self.world.primary() == Some(id) {
                self.world.set_primary(None);
            }
            events.push(EncounterEvent::ActorRemoved { actor: id });
        }
        events.extend(frame.events.iter().cloned());

        let mut input = TickInput::new(frame.time, &events);
        if let Some(pov) = self.pov {
            input = input.with_pov(pov);
        }
        self.module.tick(&self.world, &input)
    }

    /// Run every frame, stopping early once the encounter ends
    pub fn run(&mut self, scenario: &Scenario) -> Vec<TickReport> {
        let mut reports = Vec::with_capacity(scenario.frames.len());
        for frame in &scenario.frames {
            let report = self.step(frame);
            let done = report.outcome.is_some();
            reports.push(report);
            if done {
                break;
            }
        }
        info!(
            frames = reports.len(),
            phase = self.module.phase_name(),
            outcome = ?self.module.outcome(),
            "Replay finished"
        );
        reports
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Output
// ═══════════════════════════════════════════════════════════════════════════

/// Short text form of a hazard shape
pub fn describe_shape(shape: &Shape) -> String {
    match shape {
        Shape::Circle { center, radius } => {
            format!("circle ({:.1}, {:.1}) r={:.1}", center.x, center.y, radius)
        }
        Shape::Donut { center, inner, outer } => format!(
            "donut ({:.1}, {:.1}) {:.1}-{:.1}",
            center.x, center.y, inner, outer
        ),
        Shape::Cone {
            apex,
            direction,
            half_angle,
            length,
        } => format!(
            "cone ({:.1}, {:.1}) dir={:.0}° ±{:.0}° len={:.1}",
            apex.x,
            apex.y,
            direction.deg(),
            half_angle.deg(),
            length
        ),
        Shape::Rect { from, to, half_width } => format!(
            "lane ({:.1}, {:.1})->({:.1}, {:.1}) w={:.1}",
            from.x,
            from.y,
            to.x,
            to.y,
            half_width * 2.0
        ),
        Shape::Inverted(inner) => format!("outside {}", describe_shape(inner)),
    }
}

/// Human-readable tick report. Slots without hints are skipped.
pub fn format_report(report: &TickReport, world: &dyn WorldState) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "[{:>6.1}s] {} (+{:.1}s)",
        report.time, report.phase, report.time_in_phase
    );
    for change in &report.phase_changes {
        let _ = writeln!(out, "  phase {} -> {} at {:.1}s", change.from, change.to, change.at);
    }

    for (slot, hints) in &report.hints {
        if hints.is_empty() {
            continue;
        }
        let label = world
            .party_member(*slot)
            .map(|a| {
                if a.name.is_empty() {
                    a.role.label().to_string()
                } else {
                    format!("{} {}", a.role.label(), a.name)
                }
            })
            .unwrap_or_default();
        let _ = writeln!(out, "  slot {} [{}]", slot, label);
        for text in &hints.text {
            let _ = writeln!(out, "    ! {}", text);
        }
        for zone in &hints.zones {
            let status = match zone.status {
                ZoneStatus::Imminent => match zone.deadline() {
                    Some(t) => format!("until {:.1}s", t),
                    None => "imminent".to_string(),
                },
                ZoneStatus::Expired => "expired".to_string(),
                ZoneStatus::Persistent => "persistent".to_string(),
            };
            let _ = writeln!(
                out,
                "    x {} [{}] {}",
                describe_shape(&zone.shape),
                zone.source,
                status
            );
        }
        for target in &hints.targets {
            let mut flags = String::new();
            if target.should_tank {
                flags.push_str(" tank");
            }
            if target.prefer_provoking {
                flags.push_str(" provoke");
            }
            let _ = writeln!(out, "    > {} priority {}{}", target.actor, target.priority, flags);
        }
    }

    if !report.draw_intents.is_empty() {
        let _ = writeln!(out, "  {} draw intents", report.draw_intents.len());
    }
    if let Some(outcome) = report.outcome {
        let _ = writeln!(out, "  outcome: {:?}", outcome);
    }
    out
}
