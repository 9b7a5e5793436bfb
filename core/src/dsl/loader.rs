//! Loading encounter definitions from TOML files

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use super::{DslError, EncounterDefinition};

/// Load a single encounter file
pub fn load_encounter_from_file(path: &Path) -> Result<EncounterDefinition, DslError> {
    let content = fs::read_to_string(path).map_err(|source| DslError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    let def: EncounterDefinition = toml::from_str(&content).map_err(|source| DslError::ParseToml {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(tag) = def.duplicate_tags().first() {
        return Err(DslError::InvalidDefinition {
            path: path.to_path_buf(),
            reason: format!("component tag '{}' declared twice", tag),
        });
    }

    debug!(path = %path.display(), id = %def.id, "Loaded encounter definition");
    Ok(def)
}

/// Load every `*.toml` below `dir`, recursively. Files that fail to load are
/// skipped with a warning; a missing directory yields no definitions.
pub fn load_encounters_from_dir(dir: &Path) -> Result<Vec<EncounterDefinition>, DslError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut encounters = Vec::new();
    load_encounters_recursive(dir, &mut encounters)?;
    encounters.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(encounters)
}

/// Load a file, or every encounter in a directory
pub fn load_encounters(path: &Path) -> Result<Vec<EncounterDefinition>, DslError> {
    if path.is_dir() {
        load_encounters_from_dir(path)
    } else {
        load_encounter_from_file(path).map(|def| vec![def])
    }
}

fn load_encounters_recursive(dir: &Path, encounters: &mut Vec<EncounterDefinition>) -> Result<(), DslError> {
    let entries = fs::read_dir(dir).map_err(|source| DslError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry in entries.flatten() {
        let path = entry.path();

        if path.is_dir() {
            load_encounters_recursive(&path, encounters)?;
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match load_encounter_from_file(&path) {
                Ok(def) => encounters.push(def),
                Err(e) => warn!(error = %e, path = %path.display(), "Skipping encounter file"),
            }
        }
    }

    Ok(())
}
