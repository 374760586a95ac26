//! File-backed object store for builds.
//!
//! Each object is one pretty-printed JSON document named `<id>.json`. A
//! store may also expose a directory of built-in objects, which can be
//! loaded and copied but never overwritten or deleted.
//!
//! The id→metadata map sits behind a [`parking_lot::Mutex`] so a store can
//! be shared through an `Arc` with a worker thread. Objects returned by
//! [`ObjectStore::load`] carry no lock; only their owner mutates them.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rayon::prelude::*;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::ConstructionError;
use crate::persist::{is_valid_id, Storable};

/// Persistence failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A file or directory could not be read or written.
    #[error("Failed to access '{path}': {source}")]
    Io {
        /// Path involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// A document could not be parsed or written.
    #[error("Malformed document '{path}': {source}")]
    Json {
        /// Path involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// The id cannot name a document file.
    #[error("Invalid object id: {0:?}")]
    InvalidId(String),

    /// No object with this id is known.
    #[error("Unknown object id: {0}")]
    UnknownId(String),

    /// The object is built-in and cannot be changed.
    #[error("Object '{0}' is read-only")]
    ReadOnly(String),

    /// The document holds a different kind of build.
    #[error("Expected a '{expected}' document, found '{found}'")]
    KindMismatch {
        /// Kind this store holds.
        expected: &'static str,
        /// Kind found in the document.
        found: String,
    },

    /// The document is valid JSON but not a valid build.
    #[error(transparent)]
    Construction(#[from] ConstructionError),
}

/// Result type alias using [`StoreError`].
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// What the store knows about an object without loading it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMetadata {
    /// Stable identity.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Kind recorded in the document.
    pub kind: String,
    /// Document location.
    pub path: PathBuf,
    /// Built-in objects are read-only.
    pub read_only: bool,
}

/// Outcome of loading every object.
#[derive(Debug)]
pub struct BatchLoad<T> {
    /// Objects that loaded, in id order.
    pub loaded: Vec<T>,
    /// Objects that failed, with their error, in id order.
    pub failures: Vec<(String, StoreError)>,
}

impl<T> BatchLoad<T> {
    /// Check if every object loaded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// The few document fields the store reads without a full load.
#[derive(Debug, Deserialize)]
struct DocumentHeader {
    id: String,
    #[serde(default)]
    name: String,
    kind: String,
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn json_error(path: &Path) -> impl FnOnce(serde_json::Error) -> StoreError + '_ {
    move |source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    }
}

/// A directory of stored objects of one kind.
#[derive(Debug)]
pub struct ObjectStore<T: Storable> {
    user_dir: PathBuf,
    entries: Mutex<BTreeMap<String, ObjectMetadata>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Storable> ObjectStore<T> {
    /// Open a store over `user_dir`, creating the directory if needed.
    pub fn open(user_dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let user_dir = user_dir.into();
        fs::create_dir_all(&user_dir).map_err(io_error(&user_dir))?;
        let mut entries = BTreeMap::new();
        scan(&user_dir, false, &mut entries)?;
        info!(kind = T::KIND, dir = %user_dir.display(), objects = entries.len(), "Opened store");
        Ok(Self {
            user_dir,
            entries: Mutex::new(entries),
            _marker: PhantomData,
        })
    }

    /// Open a store over `user_dir` that also exposes the read-only objects
    /// in `builtin_dir`. A user object with the same id shadows the
    /// built-in one.
    pub fn open_with_builtin(
        user_dir: impl Into<PathBuf>,
        builtin_dir: impl AsRef<Path>,
    ) -> StoreResult<Self> {
        let store = Self::open(user_dir)?;
        let mut builtin = BTreeMap::new();
        scan(builtin_dir.as_ref(), true, &mut builtin)?;
        {
            let mut entries = store.entries.lock();
            for (id, metadata) in builtin {
                entries.entry(id).or_insert(metadata);
            }
        }
        Ok(store)
    }

    /// Directory new objects are written to.
    #[must_use]
    pub fn user_dir(&self) -> &Path {
        &self.user_dir
    }

    /// Every known id, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.entries.lock().keys().cloned().collect()
    }

    /// Metadata of every known object, sorted by id.
    #[must_use]
    pub fn list(&self) -> Vec<ObjectMetadata> {
        self.entries.lock().values().cloned().collect()
    }

    /// Metadata of one object.
    #[must_use]
    pub fn metadata(&self, id: &str) -> Option<ObjectMetadata> {
        self.entries.lock().get(id).cloned()
    }

    /// Number of known objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check if the store holds no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn require(&self, id: &str) -> StoreResult<ObjectMetadata> {
        self.metadata(id)
            .ok_or_else(|| StoreError::UnknownId(id.to_string()))
    }

    /// Load and regenerate one object.
    pub fn load(&self, id: &str) -> StoreResult<T> {
        let metadata = self.require(id)?;
        let path = &metadata.path;
        let source = fs::read_to_string(path).map_err(io_error(path))?;
        let header: DocumentHeader = serde_json::from_str(&source).map_err(json_error(path))?;
        if header.kind != T::KIND {
            return Err(StoreError::KindMismatch {
                expected: T::KIND,
                found: header.kind,
            });
        }
        let document: T::Document = serde_json::from_str(&source).map_err(json_error(path))?;
        let object = T::from_document(document)?;
        debug!(kind = T::KIND, id, "Loaded object");
        Ok(object)
    }

    /// Load every object in parallel. A failing object never aborts the
    /// batch; its error is collected instead.
    pub fn load_all(&self) -> BatchLoad<T> {
        let ids = self.ids();
        let results: Vec<(String, StoreResult<T>)> = ids
            .into_par_iter()
            .map(|id| {
                let result = self.load(&id);
                (id, result)
            })
            .collect();

        let mut batch = BatchLoad {
            loaded: Vec::with_capacity(results.len()),
            failures: Vec::new(),
        };
        for (id, result) in results {
            match result {
                Ok(object) => batch.loaded.push(object),
                Err(err) => {
                    warn!(kind = T::KIND, id = %id, error = %err, "Failed to load object");
                    batch.failures.push((id, err));
                }
            }
        }
        batch
    }

    /// Write an object, replacing any earlier version.
    ///
    /// A registered object is written back to the file it came from; a new
    /// one goes to `<id>.json` in the user directory.
    pub fn save(&self, object: &T) -> StoreResult<()> {
        let id = object.id();
        if !is_valid_id(id) {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        let path = match self.metadata(id) {
            Some(metadata) if metadata.read_only => {
                return Err(StoreError::ReadOnly(id.to_string()));
            }
            Some(metadata) => metadata.path,
            None => self.user_dir.join(format!("{id}.json")),
        };
        let json =
            serde_json::to_string_pretty(&object.to_document()).map_err(json_error(&path))?;
        fs::write(&path, json).map_err(io_error(&path))?;

        self.entries.lock().insert(
            id.to_string(),
            ObjectMetadata {
                id: id.to_string(),
                name: object.name().to_string(),
                kind: T::KIND.to_string(),
                path,
                read_only: false,
            },
        );
        info!(kind = T::KIND, id, name = object.name(), "Saved object");
        Ok(())
    }

    /// Remove an object and its document.
    pub fn delete(&self, object: &T) -> StoreResult<()> {
        self.delete_id(object.id())
    }

    /// Remove an object by id.
    pub fn delete_id(&self, id: &str) -> StoreResult<()> {
        let metadata = self.require(id)?;
        if metadata.read_only {
            return Err(StoreError::ReadOnly(id.to_string()));
        }
        fs::remove_file(&metadata.path).map_err(io_error(&metadata.path))?;
        self.entries.lock().remove(id);
        info!(kind = T::KIND, id, "Deleted object");
        Ok(())
    }

    /// Save a copy of an object under a fresh id and a new name.
    pub fn copy(&self, object: &T, new_name: impl Into<String>) -> StoreResult<T> {
        let copy = object.duplicate(Uuid::new_v4().to_string(), new_name.into());
        self.save(&copy)?;
        info!(kind = T::KIND, from = object.id(), to = copy.id(), "Copied object");
        Ok(copy)
    }
}

/// Register every `*.json` document in `dir`. A missing directory is empty.
///
/// Documents whose header cannot be read are still registered under their
/// file stem, so loading reports the error against that id. When two files
/// claim the same id, the one named `<id>.json` wins.
fn scan(dir: &Path, read_only: bool, entries: &mut BTreeMap<String, ObjectMetadata>) -> StoreResult<()> {
    if !dir.exists() {
        return Ok(());
    }
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(io_error(dir))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    for path in paths {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let header = fs::read_to_string(&path)
            .ok()
            .and_then(|source| serde_json::from_str::<DocumentHeader>(&source).ok());
        let metadata = match header {
            Some(header) => ObjectMetadata {
                id: header.id,
                name: header.name,
                kind: header.kind,
                path,
                read_only,
            },
            None => {
                warn!(path = %path.display(), "Unreadable document header");
                ObjectMetadata {
                    id: stem.clone(),
                    name: stem,
                    kind: String::new(),
                    path,
                    read_only,
                }
            }
        };
        if let Some(existing) = entries.get(&metadata.id) {
            let named_for_id = |p: &Path| p.file_stem().is_some_and(|s| s == metadata.id.as_str());
            warn!(
                id = %metadata.id,
                first = %existing.path.display(),
                second = %metadata.path.display(),
                "Two documents share an id"
            );
            if named_for_id(&existing.path) || !named_for_id(&metadata.path) {
                continue;
            }
        }
        entries.insert(metadata.id.clone(), metadata);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConstructionConfig;
    use crate::persist::{Robot, Weapon};

    fn robot(name: &str) -> Robot {
        Robot::new(name, ConstructionConfig::default()).unwrap()
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store: ObjectStore<Robot> = ObjectStore::open(dir.path()).unwrap();
        let original = robot("Servitor");
        store.save(&original).unwrap();

        let loaded = store.load(original.id()).unwrap();
        assert_eq!(loaded.name(), "Servitor");
        assert_eq!(loaded.manifest(), original.manifest());
    }

    #[test]
    fn test_reopen_finds_saved_objects() {
        let dir = tempfile::tempdir().unwrap();
        let id = {
            let store: ObjectStore<Robot> = ObjectStore::open(dir.path()).unwrap();
            let original = robot("Servitor");
            store.save(&original).unwrap();
            original.id().to_string()
        };
        let store: ObjectStore<Robot> = ObjectStore::open(dir.path()).unwrap();
        assert_eq!(store.ids(), vec![id.clone()]);
        assert_eq!(store.metadata(&id).unwrap().name, "Servitor");
    }

    #[test]
    fn test_draft_weapon_saves_and_loads() {
        let dir = tempfile::tempdir().unwrap();
        let store: ObjectStore<Weapon> = ObjectStore::open(dir.path()).unwrap();
        let draft = Weapon::new("Draft", ConstructionConfig::default()).unwrap();
        store.save(&draft).unwrap();

        let loaded = store.load(draft.id()).unwrap();
        assert_eq!(loaded.manifest(), draft.manifest());
        assert!(loaded.context().validate().is_err());
    }

    #[test]
    fn test_unknown_id() {
        let dir = tempfile::tempdir().unwrap();
        let store: ObjectStore<Robot> = ObjectStore::open(dir.path()).unwrap();
        assert!(matches!(store.load("missing"), Err(StoreError::UnknownId(_))));
    }

    #[test]
    fn test_delete_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store: ObjectStore<Robot> = ObjectStore::open(dir.path()).unwrap();
        let original = robot("Servitor");
        store.save(&original).unwrap();
        store.delete(&original).unwrap();
        assert!(store.is_empty());
        assert!(!dir.path().join(format!("{}.json", original.id())).exists());
    }

    #[test]
    fn test_copy_gets_new_identity() {
        let dir = tempfile::tempdir().unwrap();
        let store: ObjectStore<Robot> = ObjectStore::open(dir.path()).unwrap();
        let original = robot("Servitor");
        store.save(&original).unwrap();
        let copy = store.copy(&original, "Servitor II").unwrap();
        assert_ne!(copy.id(), original.id());
        assert_eq!(copy.name(), "Servitor II");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_builtin_objects_are_read_only() {
        let builtin = tempfile::tempdir().unwrap();
        let original = robot("Factory Droid");
        {
            let seed: ObjectStore<Robot> = ObjectStore::open(builtin.path()).unwrap();
            seed.save(&original).unwrap();
        }
        let user = tempfile::tempdir().unwrap();
        let store: ObjectStore<Robot> =
            ObjectStore::open_with_builtin(user.path(), builtin.path()).unwrap();

        assert!(store.metadata(original.id()).unwrap().read_only);
        assert!(matches!(store.save(&original), Err(StoreError::ReadOnly(_))));
        assert!(matches!(store.delete(&original), Err(StoreError::ReadOnly(_))));
        let copy = store.copy(&original, "My Droid").unwrap();
        assert!(!store.metadata(copy.id()).unwrap().read_only);
    }

    #[test]
    fn test_batch_load_collects_failures() {
        let dir = tempfile::tempdir().unwrap();
        let store: ObjectStore<Robot> = ObjectStore::open(dir.path()).unwrap();
        store.save(&robot("One")).unwrap();
        store.save(&robot("Two")).unwrap();
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();

        let store: ObjectStore<Robot> = ObjectStore::open(dir.path()).unwrap();
        let batch = store.load_all();
        assert_eq!(batch.loaded.len(), 2);
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].0, "broken");
        assert!(matches!(batch.failures[0].1, StoreError::Json { .. }));
    }

    fn write_with_id(path: &Path, original: &Robot, id: &str) {
        let mut document = original.to_document();
        document.id = id.to_string();
        fs::write(path, serde_json::to_string_pretty(&document).unwrap()).unwrap();
    }

    #[test]
    fn test_save_rejects_path_like_id() {
        let dir = tempfile::tempdir().unwrap();
        let store: ObjectStore<Robot> = ObjectStore::open(dir.path().join("robots")).unwrap();
        let original = robot("Servitor");
        for id in ["../escape", "nested/id", ".."] {
            let stray = original.duplicate(id.to_string(), "Stray".to_string());
            assert!(matches!(store.save(&stray), Err(StoreError::InvalidId(_))));
        }
        assert!(!dir.path().join("escape.json").exists());
        assert!(store.is_empty());
    }

    #[test]
    fn test_document_with_path_like_id_does_not_load() {
        let dir = tempfile::tempdir().unwrap();
        write_with_id(&dir.path().join("stray.json"), &robot("Stray"), "../stray");

        let store: ObjectStore<Robot> = ObjectStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.load("../stray"),
            Err(StoreError::Construction(ConstructionError::InvalidDocument(_)))
        ));
    }

    #[test]
    fn test_resave_writes_back_to_source_file() {
        let dir = tempfile::tempdir().unwrap();
        let original = robot("Servitor");
        let source = dir.path().join("renamed.json");
        write_with_id(&source, &original, original.id());

        let store: ObjectStore<Robot> = ObjectStore::open(dir.path()).unwrap();
        let mut loaded = store.load(original.id()).unwrap();
        loaded.set_name("Servitor Mk II");
        store.save(&loaded).unwrap();

        assert!(!dir.path().join(format!("{}.json", original.id())).exists());
        let store: ObjectStore<Robot> = ObjectStore::open(dir.path()).unwrap();
        assert_eq!(store.len(), 1);
        let metadata = store.metadata(original.id()).unwrap();
        assert_eq!(metadata.path, source);
        assert_eq!(metadata.name, "Servitor Mk II");
    }

    #[test]
    fn test_file_named_for_id_wins_a_clash() {
        let dir = tempfile::tempdir().unwrap();
        let original = robot("Servitor");
        let canonical = dir.path().join(format!("{}.json", original.id()));
        // Sorts before the canonical name, so it is scanned first.
        write_with_id(&dir.path().join("0-stale.json"), &robot("Stale"), original.id());
        write_with_id(&canonical, &original, original.id());

        let store: ObjectStore<Robot> = ObjectStore::open(dir.path()).unwrap();
        let metadata = store.metadata(original.id()).unwrap();
        assert_eq!(metadata.path, canonical);
        assert_eq!(metadata.name, "Servitor");
    }

    #[test]
    fn test_kind_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let robots: ObjectStore<Robot> = ObjectStore::open(dir.path()).unwrap();
        let original = robot("Servitor");
        robots.save(&original).unwrap();

        let weapons: ObjectStore<Weapon> = ObjectStore::open(dir.path()).unwrap();
        assert!(matches!(
            weapons.load(original.id()),
            Err(StoreError::KindMismatch { expected: "weapon", .. })
        ));
    }
}
