//! File-backed document store.
//!
//! # Storage layout
//!
//! ```text
//! ~/.vra/                    (mode 0700)
//!   collections/             (mode 0700)
//!     <collection>/          (mode 0700)
//!       .lock                (advisory write lock, mode 0600)
//!       <id>.yaml            (one document per record, mode 0600)
//! ```
//!
//! # Write flow
//!
//! serialize → `<id>.yaml.tmp` sibling → `chmod 0600` → `rename`. A crash
//! before the rename leaves the previous version of the record intact.
//!
//! Every operation holds an exclusive advisory lock on `<collection>/.lock`
//! for its whole read-append-write, which is what makes
//! [`Storage::atomic_append`] race-free across handles and processes. Clones
//! of one handle also queue on an in-process mutex before taking the file
//! lock.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;
use vra_core::document::{self, Document};
use vra_core::storage::append_to_field;
use vra_core::{Identifier, MatchedCount, Storage, StorageError};

use crate::error::{io_err, FileStoreError};
use crate::paths::{
    collection_dir, collections_root, lock_path, record_path, tmp_path, vra_root,
};

/// A [`Storage`] persisting one YAML file per record.
#[derive(Debug, Clone)]
pub struct FileStore {
    home: PathBuf,
    collection: String,
    write_lock: Arc<Mutex<()>>,
}

impl FileStore {
    /// Open (creating if needed) `<home>/.vra/collections/<collection>/`.
    pub fn open_at(home: &Path, collection: &str) -> Result<Self, FileStoreError> {
        if Identifier::parse(collection).is_err() {
            return Err(FileStoreError::InvalidCollection(collection.to_owned()));
        }
        let dir = collection_dir(home, collection);
        for level in [vra_root(home), collections_root(home), dir.clone()] {
            if !level.exists() {
                fs::create_dir_all(&level).map_err(|e| io_err(&level, e))?;
                set_dir_permissions(&level)?;
            }
        }
        tracing::debug!(dir = %dir.display(), "opened file store");
        Ok(Self {
            home: home.to_path_buf(),
            collection: collection.to_owned(),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// `open_at` convenience wrapper.
    pub fn open(collection: &str) -> Result<Self, FileStoreError> {
        let home = dirs::home_dir().ok_or(FileStoreError::HomeNotFound)?;
        Self::open_at(&home, collection)
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn dir(&self) -> PathBuf {
        collection_dir(&self.home, &self.collection)
    }

    /// `<dir>/<id>.yaml`, whether or not it exists.
    pub fn record_path(&self, id: &Identifier) -> PathBuf {
        record_path(&self.home, &self.collection, id)
    }

    /// Read the stored document matching `id`.
    pub async fn find_one(&self, id: &Identifier) -> Result<Option<Document>, StorageError> {
        let path = self.record_path(id);
        self.run(move || {
            if !path.exists() {
                return Ok(None);
            }
            Ok(Some(load_record(&path)?))
        })
        .await
    }

    /// Run `op` on the blocking pool while holding both the in-process mutex
    /// and the collection's file lock.
    async fn run<T, F>(&self, op: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, StorageError> + Send + 'static,
    {
        let lock = Arc::clone(&self.write_lock);
        let lock_file = lock_path(&self.home, &self.collection);
        tokio::task::spawn_blocking(move || {
            // The mutex guards no data and every write is rename-atomic, so a
            // poisoned mutex is safe to reuse.
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            let mut file_lock = open_lock_file(&lock_file)?;
            let _flock = file_lock.write().map_err(|e| io_err(&lock_file, e))?;
            op()
        })
        .await
        .map_err(FileStoreError::from)?
    }
}

#[async_trait]
impl Storage for FileStore {
    async fn insert(&self, mut record: Document) -> Result<Identifier, StorageError> {
        let store = self.clone();
        self.run(move || {
            let mut id = Identifier::generate();
            while store.record_path(&id).exists() {
                id = Identifier::generate();
            }
            record.insert(document::ID.to_owned(), Value::String(id.to_string()));
            save_record(&store.record_path(&id), &record)?;
            tracing::debug!(id = %id, collection = %store.collection, "record inserted");
            Ok(id)
        })
        .await
    }

    async fn replace_one(
        &self,
        id: &Identifier,
        mut record: Document,
    ) -> Result<MatchedCount, StorageError> {
        let path = self.record_path(id);
        let id = id.clone();
        self.run(move || {
            if !path.exists() {
                return Ok(0);
            }
            record.insert(document::ID.to_owned(), Value::String(id.to_string()));
            save_record(&path, &record)?;
            Ok(1)
        })
        .await
    }

    async fn atomic_append(
        &self,
        id: &Identifier,
        field: &str,
        element: Value,
    ) -> Result<MatchedCount, StorageError> {
        let path = self.record_path(id);
        let field = field.to_owned();
        self.run(move || {
            if !path.exists() {
                return Ok(0);
            }
            let mut record = load_record(&path)?;
            append_to_field(&mut record, &field, element)?;
            save_record(&path, &record)?;
            Ok(1)
        })
        .await
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn open_lock_file(path: &Path) -> Result<fd_lock::RwLock<fs::File>, FileStoreError> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)
        .map_err(|e| io_err(path, e))?;
    set_file_permissions(path)?;
    Ok(fd_lock::RwLock::new(file))
}

fn load_record(path: &Path) -> Result<Document, FileStoreError> {
    let contents = fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let value: Value = serde_yaml::from_str(&contents).map_err(|e| FileStoreError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    match value {
        Value::Object(doc) => Ok(doc),
        _ => Err(FileStoreError::NotADocument {
            path: path.to_path_buf(),
        }),
    }
}

fn save_record(path: &Path, record: &Document) -> Result<(), FileStoreError> {
    let tmp = tmp_path(path);
    let yaml = serde_yaml::to_string(record)?;
    fs::write(&tmp, yaml).map_err(|e| io_err(&tmp, e))?;
    set_file_permissions(&tmp)?;
    fs::rename(&tmp, path).map_err(|e| io_err(path, e))?;
    Ok(())
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), FileStoreError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o700)).map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), FileStoreError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), FileStoreError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), FileStoreError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn make_home() -> TempDir {
        TempDir::new().expect("tempdir")
    }

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(doc) => doc,
            _ => unreachable!(),
        }
    }

    #[test]
    fn open_creates_collection_dir_with_perms() {
        let home = make_home();
        let store = FileStore::open_at(home.path(), "vehicles").expect("open");
        assert!(store.dir().ends_with(".vra/collections/vehicles"));
        assert!(store.dir().exists());
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            for dir in [vra_root(home.path()), collections_root(home.path()), store.dir()] {
                let mode = fs::metadata(&dir).unwrap().permissions().mode() & 0o777;
                assert_eq!(mode, 0o700, "{} has mode {mode:o}", dir.display());
            }
        }
    }

    #[test]
    fn open_rejects_path_like_collection() {
        let home = make_home();
        let err = FileStore::open_at(home.path(), "../escape").unwrap_err();
        assert!(matches!(err, FileStoreError::InvalidCollection(_)));
    }

    #[test]
    fn save_and_load_record_roundtrip() {
        let home = make_home();
        let store = FileStore::open_at(home.path(), "vehicles").unwrap();
        let path = store.record_path(&Identifier::parse("rec1").unwrap());
        let record = doc(json!({"vin": "12345", "year": 2015, "owners": []}));

        save_record(&path, &record).expect("save");
        let loaded = load_record(&path).expect("load");
        assert_eq!(loaded, record, "numeric-looking strings must stay strings");
        assert!(!tmp_path(&path).exists(), ".tmp must be gone after save");
    }

    #[test]
    fn load_non_mapping_is_rejected() {
        let home = make_home();
        let store = FileStore::open_at(home.path(), "vehicles").unwrap();
        let path = store.record_path(&Identifier::parse("rec1").unwrap());
        fs::write(&path, "- just\n- a list\n").unwrap();

        let err = load_record(&path).unwrap_err();
        assert!(matches!(err, FileStoreError::NotADocument { .. }), "got: {err}");
    }

    #[test]
    fn file_store_error_converts_to_backend() {
        let err: StorageError = FileStoreError::HomeNotFound.into();
        assert!(matches!(err, StorageError::Backend(_)));
        assert!(err.to_string().contains("storage backend error"));
    }
}
