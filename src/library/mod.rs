//! Library Module
//!
//! Saved articles organised in folders. One folder, "Uncategorized", always
//! exists and cannot be renamed or deleted; a PMID is saved in at most one
//! folder at a time.
//!
//! All operations are synchronous and in-memory. Persisting is the caller's
//! job, via [`LibraryStorage`], after every mutation.

pub mod storage;

pub use storage::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

pub const DEFAULT_FOLDER_ID: &str = "default";
pub const DEFAULT_FOLDER_NAME: &str = "Uncategorized";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LibraryError {
    #[error("Folder not found: {0}")]
    FolderNotFound(String),

    #[error("Article {0} is not saved")]
    PaperNotFound(String),

    #[error("Article {0} is already saved in a folder")]
    AlreadySaved(String),

    #[error("Name must not be empty")]
    BlankName,

    #[error("The Uncategorized folder cannot be renamed or deleted")]
    DefaultFolderLocked,

    #[error("\"{0}\" is reserved for the default folder")]
    ReservedName(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedPaper {
    pub pmid: String,
    pub title: String,
    #[serde(rename = "date")]
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub papers: Vec<SavedPaper>,
}

impl Folder {
    fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            papers: Vec::new(),
        }
    }

    pub fn is_default(&self) -> bool {
        self.id == DEFAULT_FOLDER_ID
    }
}

/// What [`Library::toggle_save`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveToggle {
    Saved,
    Removed { folder_id: String },
}

/// On disk this is a bare JSON array of folders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Library {
    folders: Vec<Folder>,
}

impl Default for Library {
    fn default() -> Self {
        Self {
            folders: vec![Folder::new(DEFAULT_FOLDER_ID, DEFAULT_FOLDER_NAME)],
        }
    }
}

impl Library {
    /// Repair state read from disk: restore the default folder if it is
    /// missing and drop repeated PMIDs, keeping the first occurrence.
    pub fn normalize(&mut self) {
        if !self.folders.iter().any(Folder::is_default) {
            self.folders.insert(0, Folder::new(DEFAULT_FOLDER_ID, DEFAULT_FOLDER_NAME));
        }

        let mut seen = HashSet::new();
        for folder in &mut self.folders {
            folder.papers.retain(|p| seen.insert(p.pmid.clone()));
        }
    }

    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    pub fn folder(&self, id: &str) -> Option<&Folder> {
        self.folders.iter().find(|f| f.id == id)
    }

    fn folder_mut(&mut self, id: &str) -> Result<&mut Folder, LibraryError> {
        self.folders
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| LibraryError::FolderNotFound(id.to_string()))
    }

    pub fn folder_of(&self, pmid: &str) -> Option<&Folder> {
        self.folders
            .iter()
            .find(|f| f.papers.iter().any(|p| p.pmid == pmid))
    }

    pub fn is_saved(&self, pmid: &str) -> bool {
        self.folder_of(pmid).is_some()
    }

    pub fn total_saved(&self) -> usize {
        self.folders.iter().map(|f| f.papers.len()).sum()
    }

    /// Save into "Uncategorized" if unsaved, otherwise unsave from wherever
    /// it is.
    pub fn toggle_save(&mut self, pmid: &str, title: &str) -> SaveToggle {
        if let Some(folder_id) = self.folder_of(pmid).map(|f| f.id.clone()) {
            self.remove(pmid);
            return SaveToggle::Removed { folder_id };
        }

        if !self.folders.iter().any(Folder::is_default) {
            self.normalize();
        }
        // normalize() guarantees the default folder exists
        if let Ok(folder) = self.folder_mut(DEFAULT_FOLDER_ID) {
            folder.papers.push(SavedPaper {
                pmid: pmid.to_string(),
                title: title.to_string(),
                saved_at: Utc::now(),
            });
        }
        SaveToggle::Saved
    }

    /// Save into a specific folder. Rejected if already saved anywhere.
    pub fn save_to(&mut self, folder_id: &str, pmid: &str, title: &str) -> Result<(), LibraryError> {
        if self.is_saved(pmid) {
            return Err(LibraryError::AlreadySaved(pmid.to_string()));
        }
        let folder = self.folder_mut(folder_id)?;
        folder.papers.push(SavedPaper {
            pmid: pmid.to_string(),
            title: title.to_string(),
            saved_at: Utc::now(),
        });
        Ok(())
    }

    /// Unsave. Returns whether anything was removed.
    pub fn remove(&mut self, pmid: &str) -> bool {
        let before = self.total_saved();
        for folder in &mut self.folders {
            folder.papers.retain(|p| p.pmid != pmid);
        }
        self.total_saved() != before
    }

    /// Rename a saved article in place. Blank titles are ignored.
    pub fn rename_paper(&mut self, pmid: &str, title: &str) -> bool {
        if title.trim().is_empty() {
            return false;
        }
        for folder in &mut self.folders {
            if let Some(paper) = folder.papers.iter_mut().find(|p| p.pmid == pmid) {
                paper.title = title.to_string();
                return true;
            }
        }
        false
    }

    /// Move to the end of `target_id`. A missing target leaves the article
    /// where it was.
    pub fn move_paper(&mut self, pmid: &str, target_id: &str) -> Result<(), LibraryError> {
        if self.folder(target_id).is_none() {
            return Err(LibraryError::FolderNotFound(target_id.to_string()));
        }

        let mut taken = None;
        for folder in &mut self.folders {
            if let Some(index) = folder.papers.iter().position(|p| p.pmid == pmid) {
                taken = Some(folder.papers.remove(index));
                break;
            }
        }
        let paper = taken.ok_or_else(|| LibraryError::PaperNotFound(pmid.to_string()))?;

        self.folder_mut(target_id)?.papers.push(paper);
        Ok(())
    }

    /// Returns the new folder's id.
    pub fn create_folder(&mut self, name: &str) -> Result<String, LibraryError> {
        let name = folder_name(name)?;
        let id = format!("folder_{}", uuid::Uuid::new_v4().simple());
        self.folders.push(Folder::new(id.clone(), name));
        Ok(id)
    }

    pub fn rename_folder(&mut self, id: &str, name: &str) -> Result<(), LibraryError> {
        if id == DEFAULT_FOLDER_ID {
            return Err(LibraryError::DefaultFolderLocked);
        }
        let name = folder_name(name)?;
        self.folder_mut(id)?.name = name.to_string();
        Ok(())
    }

    /// Delete a folder together with its articles; returns the PMIDs that
    /// are no longer saved.
    pub fn delete_folder(&mut self, id: &str) -> Result<Vec<String>, LibraryError> {
        if id == DEFAULT_FOLDER_ID {
            return Err(LibraryError::DefaultFolderLocked);
        }
        let index = self
            .folders
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| LibraryError::FolderNotFound(id.to_string()))?;

        let folder = self.folders.remove(index);
        Ok(folder.papers.into_iter().map(|p| p.pmid).collect())
    }
}

/// Trimmed folder name; the default folder's name is unique.
fn folder_name(name: &str) -> Result<&str, LibraryError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LibraryError::BlankName);
    }
    if name.eq_ignore_ascii_case(DEFAULT_FOLDER_NAME) {
        return Err(LibraryError::ReservedName(name.to_string()));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_unique(library: &Library) {
        let mut seen = HashSet::new();
        for folder in library.folders() {
            for paper in &folder.papers {
                assert!(seen.insert(paper.pmid.clone()), "pmid {} saved twice", paper.pmid);
            }
        }
    }

    #[test]
    fn test_default_state() {
        let library = Library::default();
        assert_eq!(library.folders().len(), 1);
        assert_eq!(library.folders()[0].name, DEFAULT_FOLDER_NAME);
        assert_eq!(library.total_saved(), 0);
    }

    #[test]
    fn test_toggle_save() {
        let mut library = Library::default();
        assert_eq!(library.toggle_save("1", "Gout"), SaveToggle::Saved);
        assert!(library.is_saved("1"));
        assert_eq!(library.folder_of("1").unwrap().id, DEFAULT_FOLDER_ID);

        let other = library.create_folder("Reading").unwrap();
        library.move_paper("1", &other).unwrap();
        assert_eq!(
            library.toggle_save("1", "Gout"),
            SaveToggle::Removed { folder_id: other }
        );
        assert!(!library.is_saved("1"));
    }

    #[test]
    fn test_save_to_rejects_duplicates() {
        let mut library = Library::default();
        let id = library.create_folder("Trials").unwrap();
        library.save_to(&id, "7", "T").unwrap();
        assert_eq!(
            library.save_to(DEFAULT_FOLDER_ID, "7", "T"),
            Err(LibraryError::AlreadySaved("7".into()))
        );
        assert_eq!(
            library.save_to("nope", "8", "T"),
            Err(LibraryError::FolderNotFound("nope".into()))
        );
    }

    #[test]
    fn test_move_keeps_single_copy() {
        let mut library = Library::default();
        let a = library.create_folder("A").unwrap();
        let b = library.create_folder("B").unwrap();
        library.toggle_save("1", "one");
        library.toggle_save("2", "two");

        library.move_paper("1", &a).unwrap();
        library.move_paper("1", &b).unwrap();
        library.move_paper("2", &b).unwrap();
        library.move_paper("2", &b).unwrap();
        assert_unique(&library);

        let papers: Vec<&str> = library.folder(&b).unwrap().papers.iter().map(|p| p.pmid.as_str()).collect();
        assert_eq!(papers, vec!["1", "2"]);
        assert_eq!(library.total_saved(), 2);
    }

    #[test]
    fn test_move_to_missing_folder_keeps_paper() {
        let mut library = Library::default();
        library.toggle_save("1", "one");
        assert!(library.move_paper("1", "gone").is_err());
        assert_eq!(library.folder_of("1").unwrap().id, DEFAULT_FOLDER_ID);
    }

    #[test]
    fn test_rename_paper() {
        let mut library = Library::default();
        library.toggle_save("1", "one");
        assert!(!library.rename_paper("1", "   "));
        assert!(library.rename_paper("1", "Better title"));
        assert_eq!(library.folder_of("1").unwrap().papers[0].title, "Better title");
        assert!(!library.rename_paper("404", "x"));
    }

    #[test]
    fn test_folder_crud() {
        let mut library = Library::default();
        assert_eq!(library.create_folder("  "), Err(LibraryError::BlankName));

        let id = library.create_folder("  Trials ").unwrap();
        assert!(id.starts_with("folder_"));
        assert_eq!(library.folder(&id).unwrap().name, "Trials");

        library.rename_folder(&id, "RCTs").unwrap();
        assert_eq!(library.folder(&id).unwrap().name, "RCTs");
        assert_eq!(library.rename_folder(DEFAULT_FOLDER_ID, "x"), Err(LibraryError::DefaultFolderLocked));
        assert_eq!(library.delete_folder(DEFAULT_FOLDER_ID), Err(LibraryError::DefaultFolderLocked));
    }

    #[test]
    fn test_default_name_is_reserved() {
        let mut library = Library::default();
        assert_eq!(
            library.create_folder(" uncategorized "),
            Err(LibraryError::ReservedName("uncategorized".into()))
        );

        let id = library.create_folder("Trials").unwrap();
        assert_eq!(
            library.rename_folder(&id, "UNCATEGORIZED"),
            Err(LibraryError::ReservedName("UNCATEGORIZED".into()))
        );
        assert_eq!(library.folder(&id).unwrap().name, "Trials");

        let defaults = library.folders().iter().filter(|f| f.name == DEFAULT_FOLDER_NAME).count();
        assert_eq!(defaults, 1);
    }

    #[test]
    fn test_delete_folder_cascades() {
        let mut library = Library::default();
        let id = library.create_folder("Trials").unwrap();
        library.save_to(&id, "1", "one").unwrap();
        library.save_to(&id, "2", "two").unwrap();
        library.toggle_save("3", "three");

        let removed = library.delete_folder(&id).unwrap();
        assert_eq!(removed, vec!["1", "2"]);
        assert!(!library.is_saved("1"));
        assert!(library.is_saved("3"));
        assert!(library.folder(&id).is_none());
    }

    #[test]
    fn test_normalize_restores_default_and_dedupes() {
        let json = r#"[
            {"id": "folder_a", "name": "A", "papers": [
                {"pmid": "1", "title": "one", "date": "2024-01-01T00:00:00Z"}
            ]},
            {"id": "folder_b", "name": "B", "papers": [
                {"pmid": "1", "title": "dup", "date": "2024-01-02T00:00:00Z"}
            ]}
        ]"#;
        let mut library: Library = serde_json::from_str(json).unwrap();
        library.normalize();

        assert_eq!(library.folders()[0].id, DEFAULT_FOLDER_ID);
        assert_eq!(library.total_saved(), 1);
        assert_eq!(library.folder_of("1").unwrap().id, "folder_a");
    }

    #[test]
    fn test_serialized_as_array() {
        let mut library = Library::default();
        library.toggle_save("1", "one");
        let value = serde_json::to_value(&library).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["id"], "default");
        assert_eq!(value[0]["papers"][0]["pmid"], "1");
        assert!(value[0]["papers"][0]["date"].is_string());
    }
}
