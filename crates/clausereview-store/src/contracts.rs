//! The on-disk contracts directory that uploads are written into.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::StoreError;

/// Directory of uploaded contract files.
///
/// Files are stored verbatim under their upload name; a second upload with
/// the same name overwrites the first.
pub struct ContractsDir {
    root: PathBuf,
}

impl ContractsDir {
    /// Open the directory, creating it (and parents) if absent.
    pub fn open(root: &Path) -> Result<Self, StoreError> {
        if !root.is_dir() {
            std::fs::create_dir_all(root).map_err(|e| StoreError::io(root, e))?;
            info!(path = %root.display(), "created contracts directory");
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write an uploaded file's bytes under its original name.
    pub fn save(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, StoreError> {
        validate_name(name)?;
        let path = self.root.join(name);
        std::fs::write(&path, bytes).map_err(|e| StoreError::io(&path, e))?;
        debug!(path = %path.display(), bytes = bytes.len(), "saved upload");
        Ok(path)
    }

    /// Regular files in the directory, sorted by name.
    pub fn files(&self) -> Result<Vec<PathBuf>, StoreError> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| StoreError::io(&self.root, e))?;
        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&self.root, e))?;
            let path = entry.path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Upload names are used as-is, but must stay inside the directory.
fn validate_name(name: &str) -> Result<(), StoreError> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\');
    if bad {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_creates_missing_dir() {
        let tmp = tempfile::TempDir::new().unwrap();
        let root = tmp.path().join("nested").join("contracts");
        assert!(!root.exists());

        let dir = ContractsDir::open(&root).unwrap();
        assert!(root.is_dir());
        assert_eq!(dir.root(), root);
    }

    #[test]
    fn save_writes_verbatim() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = ContractsDir::open(tmp.path()).unwrap();

        let path = dir.save("contract.txt", b"Governing law: Delaware").unwrap();
        assert_eq!(path, tmp.path().join("contract.txt"));
        assert_eq!(std::fs::read(&path).unwrap(), b"Governing law: Delaware");
    }

    #[test]
    fn save_same_name_overwrites() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = ContractsDir::open(tmp.path()).unwrap();

        dir.save("contract.txt", b"first").unwrap();
        dir.save("contract.txt", b"second").unwrap();

        assert_eq!(dir.files().unwrap().len(), 1);
        assert_eq!(
            std::fs::read_to_string(tmp.path().join("contract.txt")).unwrap(),
            "second"
        );
    }

    #[test]
    fn save_rejects_path_components() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = ContractsDir::open(tmp.path()).unwrap();

        for name in ["", "..", "../escape.pdf", "sub/contract.pdf", "a\\b.pdf"] {
            assert!(
                matches!(dir.save(name, b"x"), Err(StoreError::InvalidName(_))),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn files_sorted_and_skip_subdirs() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = ContractsDir::open(tmp.path()).unwrap();
        dir.save("b.txt", b"b").unwrap();
        dir.save("a.txt", b"a").unwrap();
        std::fs::create_dir(tmp.path().join("archive")).unwrap();

        let names: Vec<String> = dir
            .files()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }
}
