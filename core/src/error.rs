//! Error types for engine construction and mechanic evaluation

use thiserror::Error;

use crate::world::ActorId;

/// Errors raised while building an encounter module. These are fatal and
/// surface before the first tick.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid arena bounds: {reason}")]
    InvalidArena { reason: String },

    #[error("malformed encounter configuration: {reason}")]
    MalformedConfiguration { reason: String },
}

impl EngineError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedConfiguration {
            reason: reason.into(),
        }
    }
}

/// Errors a single component can hit during its update. The registry
/// isolates them: the component contributes nothing for the tick.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MechanicError {
    #[error("actor {0} is no longer in the world")]
    MissingActor(ActorId),

    #[error("inconsistent mechanic state: {0}")]
    Inconsistent(String),
}
