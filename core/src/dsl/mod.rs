//! Encounter definitions
//!
//! Stateless definitions parsed from TOML files. Runtime state lives in the
//! [`EncounterModule`](crate::module::EncounterModule) built from them.
//!
//! - **definition**: encounter, component and phase tables
//! - **loader**: file and directory loading
//! - **error**: loading errors with the offending path

mod definition;
mod error;
mod loader;

pub use definition::*;
pub use error::DslError;
pub use loader::*;
