use super::{RecipeStorage, StorageError};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io::ErrorKind;

/// Stores each key as `<dir>/<key>.json`.
///
/// Writes go to a temporary file first and are renamed into place, so a
/// failed write never leaves a truncated document behind.
///
/// # Examples
///
/// ```no_run
/// use recipe_store::{JsonFileStorage, RecipeStorage};
///
/// let storage = JsonFileStorage::new("./data");
/// storage.write("recipes", "[]")?;
/// assert_eq!(storage.read("recipes")?.as_deref(), Some("[]"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: Utf8PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        JsonFileStorage { dir: dir.into() }
    }

    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Returns the file backing `key`.
    pub fn path_for(&self, key: &str) -> Result<Utf8PathBuf, StorageError> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl RecipeStorage for JsonFileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;

        let tmp_path = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp_path, value)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}
