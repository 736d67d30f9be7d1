use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use uuid::Uuid;

/// Suffix appended to the primary file name to locate the backup generation.
const BACKUP_SUFFIX: &str = ".bak";
/// Suffix used for scratch files written before an atomic rename.
const TEMP_SUFFIX: &str = ".tmp";

/// Location of the snapshot file and the paths derived from it.
#[derive(Debug, Clone)]
pub struct FileStoreConfig {
    path: PathBuf,
}

impl FileStoreConfig {
    /// Store the snapshot at `path`; the backup lives next to it.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Primary snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Single backup generation: the primary path with a `.bak` suffix.
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(BACKUP_SUFFIX);
        PathBuf::from(name)
    }

    /// Fresh scratch path in the same directory as the primary file so the
    /// final rename never crosses filesystems.
    pub fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(".");
        name.push(self.path.file_name().unwrap_or_else(|| "snapshot".as_ref()));
        name.push(format!(".{}{TEMP_SUFFIX}", Uuid::new_v4().simple()));
        self.path.with_file_name(name)
    }

    /// Directory holding the primary file, if it has one.
    pub fn parent(&self) -> Option<&Path> {
        self.path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
    }
}
