pub mod logging;
pub mod scenario;

pub use scenario::{Frame, Replay, Scenario, ScenarioError, format_report, load_scenario};
