use std::path::{Path, PathBuf};

use crate::error::{FarmError, FarmResult};

const ALLOWED_EXTENSIONS: [&str; 6] = ["pdf", "doc", "docx", "jpg", "jpeg", "png"];

/// Storage seam for uploaded documents. Handlers only see this interface so
/// the disk layout (or a future object store) stays out of request code.
pub trait DocumentStore: Send + Sync {
    /// Persists `bytes` under a timestamp-prefixed variant of
    /// `original_name` and returns the stored name.
    fn store(&self, original_name: &str, bytes: &[u8]) -> FarmResult<String>;
    fn remove(&self, stored_name: &str) -> FarmResult<()>;
    fn path_of(&self, stored_name: &str) -> PathBuf;
}

pub struct LocalDocumentStore {
    root: PathBuf,
}

impl LocalDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> FarmResult<Self> {
        let root = root.into();
        if !root.exists() {
            std::fs::create_dir_all(&root)?;
        }
        Ok(LocalDocumentStore { root })
    }
}

impl DocumentStore for LocalDocumentStore {
    fn store(&self, original_name: &str, bytes: &[u8]) -> FarmResult<String> {
        let safe_name = sanitize_file_name(original_name)?;
        let stored_name = format!("{}_{}", chrono::Local::now().timestamp(), safe_name);
        let target = self.root.join(&stored_name);

        // Write to a temp file in the same directory, then rename, so a
        // crashed upload never leaves a partial file under the stored name.
        let tmp = self.root.join(format!(".{}.part", stored_name));
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &target)?;

        Ok(stored_name)
    }

    fn remove(&self, stored_name: &str) -> FarmResult<()> {
        let path = self.path_of(stored_name);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    fn path_of(&self, stored_name: &str) -> PathBuf {
        self.root.join(stored_name)
    }
}

/// Rejects path traversal and non-allow-listed extensions, keeping only the
/// final path component of whatever the client sent.
fn sanitize_file_name(original: &str) -> FarmResult<String> {
    let name = Path::new(original)
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| FarmError::Validation("Invalid file name.".to_string()))?;

    let extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(FarmError::Validation(format!(
            "File type '.{}' is not allowed.",
            extension
        )));
    }

    Ok(name.replace(['/', '\\'], "_"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn stores_and_removes_files() {
        let dir = tempdir().unwrap();
        let store = LocalDocumentStore::new(dir.path()).unwrap();

        let stored = store.store("contract.pdf", b"pdf-bytes").unwrap();
        assert!(stored.ends_with("_contract.pdf"));
        assert_eq!(std::fs::read(store.path_of(&stored)).unwrap(), b"pdf-bytes");

        store.remove(&stored).unwrap();
        assert!(!store.path_of(&stored).exists());
    }

    #[test]
    fn rejects_disallowed_extension() {
        let dir = tempdir().unwrap();
        let store = LocalDocumentStore::new(dir.path()).unwrap();
        assert!(store.store("malware.exe", b"nope").is_err());
    }

    #[test]
    fn strips_path_components() {
        let dir = tempdir().unwrap();
        let store = LocalDocumentStore::new(dir.path()).unwrap();
        let stored = store.store("../../etc/passwd.png", b"img").unwrap();
        assert!(stored.ends_with("passwd.png"));
        assert!(!stored.contains(".."));
    }
}
