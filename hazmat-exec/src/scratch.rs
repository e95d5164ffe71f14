use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Error};
use tempfile::TempDir;

/// Owner of the scratch files of a run.
///
/// The scratch files are created once and reused by every case: whoever writes them must truncate
/// them (the runner does, opening the outputs with `File::create`). All of them are removed by
/// `release_all`, which is also called when the manager is dropped, so the cleanup happens on every
/// exit path that unwinds the stack.
#[derive(Debug)]
pub struct TempFileManager {
    /// Where the files are created.
    dir: PathBuf,
    /// Keeps alive, and removes on drop, the directory when it's owned by the manager.
    _owned: Option<TempDir>,
    /// The files handed out so far.
    files: Vec<PathBuf>,
    /// Counter used for the anonymous files.
    next: usize,
}

impl TempFileManager {
    /// Create the scratch files inside a new private temporary directory.
    pub fn new() -> Result<TempFileManager, Error> {
        let dir = tempfile::Builder::new()
            .prefix("hazmat")
            .tempdir()
            .context("Failed to create the scratch directory")?;
        Ok(TempFileManager {
            dir: dir.path().to_owned(),
            _owned: Some(dir),
            files: vec![],
            next: 0,
        })
    }

    /// Create the scratch files inside `dir`, which is not removed at the end.
    pub fn new_in<P: Into<PathBuf>>(dir: P) -> TempFileManager {
        TempFileManager {
            dir: dir.into(),
            _owned: None,
            files: vec![],
            next: 0,
        }
    }

    /// The directory containing the scratch files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create a new empty scratch file with a fresh name.
    pub fn acquire(&mut self) -> Result<PathBuf, Error> {
        loop {
            let name = format!(".hz_tmp{}", self.next);
            self.next += 1;
            if !self.dir.join(&name).exists() {
                return self.acquire_named(name);
            }
        }
    }

    /// Create a new empty scratch file with the given name. Fails if it was already handed out.
    pub fn acquire_named<S: AsRef<str>>(&mut self, name: S) -> Result<PathBuf, Error> {
        let path = self.dir.join(name.as_ref());
        if self.files.contains(&path) {
            bail!("Scratch file {} acquired twice", path.display());
        }
        std::fs::write(&path, b"")
            .with_context(|| format!("Failed to create scratch file {}", path.display()))?;
        trace!("Acquired scratch file {}", path.display());
        self.files.push(path.clone());
        Ok(path)
    }

    /// The files currently owned by the manager.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Remove every scratch file. Files already removed by someone else are ignored.
    pub fn release_all(&mut self) {
        let mut seen = HashSet::new();
        for path in self.files.drain(..) {
            if !seen.insert(path.clone()) {
                continue;
            }
            match std::fs::remove_file(&path) {
                Ok(()) => trace!("Removed scratch file {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove scratch file {}: {}", path.display(), e),
            }
        }
    }
}

impl Drop for TempFileManager {
    fn drop(&mut self) {
        self.release_all();
    }
}

#[cfg(test)]
mod tests {
    use speculoos::prelude::*;

    use super::*;

    #[test]
    fn test_acquire_creates_empty_files() {
        let tmpdir = tempfile::TempDir::new().unwrap();
        let mut manager = TempFileManager::new_in(tmpdir.path());
        let a = manager.acquire().unwrap();
        let b = manager.acquire().unwrap();
        assert_ne!(a, b);
        assert!(a.exists());
        assert_eq!(std::fs::read(&b).unwrap().len(), 0);
        assert_eq!(manager.files().len(), 2);
    }

    #[test]
    fn test_acquire_skips_existing_names() {
        let tmpdir = tempfile::TempDir::new().unwrap();
        std::fs::write(tmpdir.path().join(".hz_tmp0"), "keep me").unwrap();
        let mut manager = TempFileManager::new_in(tmpdir.path());
        let path = manager.acquire().unwrap();
        assert_eq!(path, tmpdir.path().join(".hz_tmp1"));
        drop(manager);
        assert_eq!(
            std::fs::read_to_string(tmpdir.path().join(".hz_tmp0")).unwrap(),
            "keep me"
        );
    }

    #[test]
    fn test_acquire_named_twice() {
        let tmpdir = tempfile::TempDir::new().unwrap();
        let mut manager = TempFileManager::new_in(tmpdir.path());
        manager.acquire_named("input").unwrap();
        assert!(manager.acquire_named("input").is_err());
    }

    #[test]
    fn test_release_all() {
        let tmpdir = tempfile::TempDir::new().unwrap();
        let mut manager = TempFileManager::new_in(tmpdir.path());
        let a = manager.acquire().unwrap();
        let b = manager.acquire().unwrap();
        std::fs::remove_file(&b).unwrap();
        manager.release_all();
        assert!(!a.exists());
        assert_that!(manager.files().len()).is_equal_to(0);
        assert!(tmpdir.path().exists());
    }

    #[test]
    fn test_drop_releases() {
        let tmpdir = tempfile::TempDir::new().unwrap();
        let path = {
            let mut manager = TempFileManager::new_in(tmpdir.path());
            manager.acquire().unwrap()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_owned_directory_removed() {
        let mut manager = TempFileManager::new().unwrap();
        let dir = manager.dir().to_owned();
        manager.acquire().unwrap();
        assert!(dir.exists());
        drop(manager);
        assert!(!dir.exists());
    }
}
