use super::{clean_records, StorageError};
use crate::model::Recipe;
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::collections::HashSet;
use std::fs;

const FIXTURE_PATTERNS: &[&str] = &["**/*.json", "**/*.yaml", "**/*.yml"];

/// Loads bundled recipes from every JSON or YAML file under `dir`.
///
/// Each file holds an array of recipes. Files are read in sorted path order
/// so the resulting sequence is stable. A missing directory yields no
/// recipes.
pub fn load_fixtures(dir: &Utf8Path) -> Result<Vec<Recipe>, StorageError> {
    let mut paths = Vec::new();
    for pattern in FIXTURE_PATTERNS {
        let pattern = dir.join(pattern).to_string();
        for entry in glob::glob(&pattern)? {
            let path = Utf8PathBuf::from_path_buf(entry?).map_err(|_| {
                StorageError::IoError(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "Path contains invalid UTF-8",
                ))
            })?;
            paths.push(path);
        }
    }
    paths.sort();

    let mut recipes = Vec::new();
    for path in paths {
        let content = fs::read_to_string(&path)?;
        let records: Vec<Recipe> = match path.extension() {
            Some("json") => serde_json::from_str(&content)?,
            _ => serde_yaml::from_str(&content)?,
        };
        debug!("Loaded {} fixture recipes from {}", records.len(), path);
        recipes.extend(clean_records(records, path.as_str()));
    }

    Ok(recipes)
}

/// Merges stored recipes with bundled fixtures.
///
/// Stored entries come first. Fixture entries follow unless their id is
/// already present. Within each source the first occurrence of an id wins.
pub fn merge_recipes(local: Vec<Recipe>, fixtures: Vec<Recipe>) -> Vec<Recipe> {
    let mut seen = HashSet::new();
    local
        .into_iter()
        .chain(fixtures)
        .filter(|recipe| seen.insert(recipe.id()))
        .collect()
}
