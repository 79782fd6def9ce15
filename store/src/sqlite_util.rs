//! Owner-only permissions for the history database and its directory.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Journal files SQLite keeps beside the database in WAL mode.
const SIDECAR_SUFFIXES: [&str; 2] = ["-wal", "-shm"];

/// Create missing directories and the database file, then connect.
pub(crate) fn open_secure_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        prepare_dir(parent)?;
    }
    prepare_file(path)?;

    Connection::open(path).with_context(|| format!("Failed to open database at {}", path.display()))
}

/// Restrict the WAL sidecars. They only exist once the connection has
/// written, so this runs after the schema bootstrap.
pub(crate) fn restrict_sidecars(path: &Path) -> Result<()> {
    for sidecar in SIDECAR_SUFFIXES.map(|suffix| sidecar_path(path, suffix)) {
        if sidecar.exists() {
            restrict(&sidecar, 0o600)?;
        }
    }
    Ok(())
}

fn prepare_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    if owned_by_us(dir)? {
        restrict(dir, 0o700)?;
    }
    Ok(())
}

fn prepare_file(path: &Path) -> Result<()> {
    let mut options = OpenOptions::new();
    options.create(true).truncate(false).read(true).write(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options
        .open(path)
        .with_context(|| format!("Failed to create database file: {}", path.display()))?;
    restrict(path, 0o600)
}

#[cfg(unix)]
fn owned_by_us(path: &Path) -> Result<bool> {
    use std::os::unix::fs::MetadataExt;

    let metadata = fs::metadata(path)
        .with_context(|| format!("Failed to read metadata: {}", path.display()))?;
    // SAFETY: getuid has no preconditions and cannot fail.
    let uid = unsafe { libc::getuid() };
    Ok(metadata.uid() == uid)
}

#[cfg(not(unix))]
fn owned_by_us(_path: &Path) -> Result<bool> {
    Ok(false)
}

#[cfg(unix)]
fn restrict(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let current = fs::metadata(path)
        .with_context(|| format!("Failed to read metadata: {}", path.display()))?
        .permissions()
        .mode()
        & 0o777;
    if current == mode {
        return Ok(());
    }
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .with_context(|| format!("Failed to set permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn restrict(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

fn sidecar_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_missing_parent_and_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("rota.db");

        let conn = open_secure_db(&path).expect("open");
        drop(conn);

        assert!(path.exists());
    }

    #[test]
    fn sidecar_names_append_to_the_file_name() {
        let path = Path::new("/tmp/rota/students.db");
        assert_eq!(
            sidecar_path(path, "-wal"),
            PathBuf::from("/tmp/rota/students.db-wal")
        );
    }

    #[cfg(unix)]
    #[test]
    fn database_file_and_directory_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let parent = dir.path().join("data");
        let path = parent.join("rota.db");
        let _conn = open_secure_db(&path).expect("open");

        let mode = |p: &Path| fs::metadata(p).expect("metadata").permissions().mode() & 0o777;
        assert_eq!(mode(&path), 0o600);
        assert_eq!(mode(&parent), 0o700);
    }

    #[cfg(unix)]
    #[test]
    fn wal_sidecars_are_owner_only_after_open() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("rota.db");
        let store = crate::HistoryStore::open(&path).expect("open store");

        let wal = sidecar_path(&path, "-wal");
        assert!(wal.exists(), "WAL file is created by the schema bootstrap");
        let mode = fs::metadata(&wal).expect("metadata").permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);

        store.close().expect("close");
    }
}
