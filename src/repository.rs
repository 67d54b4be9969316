//! Project storage.
//!
//! Persistence is an injected [`ProjectRepository`], never ambient global
//! state: the application hands the core a repository and the core calls
//! through the trait. The filesystem implementation keeps one JSON document
//! per project under a base directory and rotates timestamped backups on
//! overwrite.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use log::info;

use crate::constants::PROJECT_EXTENSION;
use crate::error::{CoreError, Result};
use crate::paths;
use crate::project::ProjectDocument;

pub trait ProjectRepository {
    /// Names of every stored project, ascending.
    fn list(&self) -> Result<Vec<String>>;
    fn save(&mut self, name: &str, document: &ProjectDocument) -> Result<()>;
    fn load(&self, name: &str) -> Result<ProjectDocument>;
    fn delete(&mut self, name: &str) -> Result<()>;
}

pub struct FsProjectRepository {
    base_dir: PathBuf,
    backups_enabled: bool,
}

const MAX_BACKUPS: usize = 10;

impl FsProjectRepository {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            backups_enabled: true,
        }
    }

    /// Repository rooted at the platform's data directory.
    pub fn default_location() -> Self {
        Self::new(paths::projects_dir())
    }

    pub fn with_backups(mut self, enabled: bool) -> Self {
        self.backups_enabled = enabled;
        self
    }

    fn project_path(&self, name: &str) -> PathBuf {
        let safe: String = name
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || *c == ' ')
            .collect();
        self.base_dir.join(format!("{safe}.{PROJECT_EXTENSION}"))
    }

    /// Move the existing file into `Backups/` with a timestamp suffix,
    /// keeping only the newest MAX_BACKUPS per project.
    fn create_backup(&self, path: &Path) -> Result<()> {
        let Some(parent) = path.parent() else {
            return Ok(());
        };
        let backup_dir = parent.join("Backups");
        fs::create_dir_all(&backup_dir)?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("project");
        let backup_path = backup_dir.join(format!("{stem}_{timestamp}.{PROJECT_EXTENSION}"));
        fs::copy(path, &backup_path)?;

        self.rotate_backups(&backup_dir, stem)?;
        Ok(())
    }

    fn rotate_backups(&self, backup_dir: &Path, stem: &str) -> Result<()> {
        let mut backups = Vec::new();
        if let Ok(entries) = fs::read_dir(backup_dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if !path.is_file() {
                    continue;
                }
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    if name.starts_with(stem) && name.ends_with(PROJECT_EXTENSION) {
                        backups.push(path);
                    }
                }
            }
        }

        backups.sort_by_key(|p| p.metadata().and_then(|m| m.modified()).ok());
        if backups.len() > MAX_BACKUPS {
            let to_remove = backups.len() - MAX_BACKUPS;
            for path in backups.iter().take(to_remove) {
                let _ = fs::remove_file(path);
            }
        }
        Ok(())
    }
}

impl ProjectRepository for FsProjectRepository {
    fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let entries = match fs::read_dir(&self.base_dir) {
            Ok(entries) => entries,
            Err(_) => return Ok(names),
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some(PROJECT_EXTENSION) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn save(&mut self, name: &str, document: &ProjectDocument) -> Result<()> {
        fs::create_dir_all(&self.base_dir)?;
        let path = self.project_path(name);
        if self.backups_enabled && path.exists() {
            self.create_backup(&path)?;
        }
        let json = document.to_json()?;
        fs::write(&path, json)?;
        info!("saved project '{name}' to {}", path.display());
        Ok(())
    }

    fn load(&self, name: &str) -> Result<ProjectDocument> {
        let path = self.project_path(name);
        if !path.exists() {
            return Err(CoreError::Repository(format!(
                "project '{name}' does not exist"
            )));
        }
        let contents = fs::read_to_string(&path)?;
        ProjectDocument::from_json(&contents)
    }

    fn delete(&mut self, name: &str) -> Result<()> {
        let path = self.project_path(name);
        if !path.exists() {
            return Err(CoreError::Repository(format!(
                "project '{name}' does not exist"
            )));
        }
        fs::remove_file(&path)?;
        info!("deleted project '{name}'");
        Ok(())
    }
}

/// In-memory repository for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryProjectRepository {
    projects: BTreeMap<String, ProjectDocument>,
}

impl MemoryProjectRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProjectRepository for MemoryProjectRepository {
    fn list(&self) -> Result<Vec<String>> {
        Ok(self.projects.keys().cloned().collect())
    }

    fn save(&mut self, name: &str, document: &ProjectDocument) -> Result<()> {
        self.projects.insert(name.to_string(), document.clone());
        Ok(())
    }

    fn load(&self, name: &str) -> Result<ProjectDocument> {
        self.projects
            .get(name)
            .cloned()
            .ok_or_else(|| CoreError::Repository(format!("project '{name}' does not exist")))
    }

    fn delete(&mut self, name: &str) -> Result<()> {
        self.projects
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| CoreError::Repository(format!("project '{name}' does not exist")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AudioSource;
    use crate::store::TrackStore;

    fn sample_document() -> ProjectDocument {
        let mut store = TrackStore::new();
        store.create_track(
            Some(AudioSource {
                source_id: 3,
                duration: 6.0,
            }),
            Some("vox".into()),
        );
        ProjectDocument::from_store("sample", &store)
    }

    fn temp_repo() -> FsProjectRepository {
        let dir = std::env::temp_dir().join(format!("clipline-repo-{}", crate::idgen::next()));
        FsProjectRepository::new(dir)
    }

    #[test]
    fn memory_repository_round_trips() {
        let mut repo = MemoryProjectRepository::new();
        let doc = sample_document();
        repo.save("one", &doc).unwrap();
        repo.save("two", &doc).unwrap();

        assert_eq!(repo.list().unwrap(), vec!["one", "two"]);
        let loaded = repo.load("one").unwrap();
        assert_eq!(loaded.tracks.len(), 1);

        repo.delete("one").unwrap();
        assert_eq!(repo.list().unwrap(), vec!["two"]);
        assert!(repo.load("one").is_err());
    }

    #[test]
    fn fs_repository_saves_and_loads() {
        let mut repo = temp_repo();
        let doc = sample_document();
        repo.save("session", &doc).unwrap();

        assert_eq!(repo.list().unwrap(), vec!["session"]);
        let loaded = repo.load("session").unwrap();
        assert_eq!(loaded.name, doc.name);
        assert_eq!(loaded.tracks.len(), doc.tracks.len());

        repo.delete("session").unwrap();
        assert!(repo.list().unwrap().is_empty());
    }

    #[test]
    fn fs_load_of_missing_project_is_an_error() {
        let repo = temp_repo();
        assert!(matches!(
            repo.load("ghost"),
            Err(CoreError::Repository(_))
        ));
    }

    #[test]
    fn fs_load_of_corrupt_file_is_a_project_error() {
        let mut repo = temp_repo();
        repo.save("ok", &sample_document()).unwrap();
        let path = repo.project_path("ok");
        fs::write(&path, "{broken").unwrap();
        assert!(matches!(repo.load("ok"), Err(CoreError::Project(_))));
    }

    #[test]
    fn overwrite_creates_backup() {
        let mut repo = temp_repo();
        let doc = sample_document();
        repo.save("session", &doc).unwrap();
        repo.save("session", &doc).unwrap();

        let backups = repo.base_dir.join("Backups");
        let count = fs::read_dir(backups).unwrap().count();
        assert_eq!(count, 1);
    }

    #[test]
    fn list_of_empty_repository_is_empty_not_error() {
        let repo = temp_repo();
        assert!(repo.list().unwrap().is_empty());
    }
}
