use std::path::{Path, PathBuf};

use vra_core::Identifier;

pub const VRA_DIR: &str = ".vra";
pub const COLLECTIONS_DIR: &str = "collections";
pub const DEFAULT_COLLECTION: &str = "vehicles";
pub const LOCK_FILE: &str = ".lock";

pub fn vra_root(home: &Path) -> PathBuf {
    home.join(VRA_DIR)
}

pub fn collections_root(home: &Path) -> PathBuf {
    vra_root(home).join(COLLECTIONS_DIR)
}

pub fn collection_dir(home: &Path, collection: &str) -> PathBuf {
    collections_root(home).join(collection)
}

/// `<home>/.vra/collections/<collection>/<id>.yaml`
pub fn record_path(home: &Path, collection: &str, id: &Identifier) -> PathBuf {
    collection_dir(home, collection).join(format!("{id}.yaml"))
}

/// Advisory lock file serializing writers across handles and processes.
pub fn lock_path(home: &Path, collection: &str) -> PathBuf {
    collection_dir(home, collection).join(LOCK_FILE)
}

/// Sibling used for the write-then-rename step.
pub fn tmp_path(record: &Path) -> PathBuf {
    let mut name = record.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    record.with_file_name(name)
}
