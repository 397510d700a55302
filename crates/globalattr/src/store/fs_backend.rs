use super::backend::GaBackend;
use crate::error::{GaError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const FILE_EXT: &str = ".json";

/// One JSON file per GA under a single directory.
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Backend rooted at `<data_dir>/storage/ga`.
    pub fn for_data_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join("storage").join("ga"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn doc_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}{}", id, FILE_EXT))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(GaError::Io)?;
        }
        Ok(())
    }
}

impl GaBackend for FsBackend {
    fn read(&self, id: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.doc_path(id)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(GaError::Io(e)),
        }
    }

    fn write(&self, id: &str, content: &str) -> Result<()> {
        self.ensure_dir()?;

        // Atomic Write
        let tmp_path = self.root.join(format!(".ga-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp_path, content).map_err(GaError::Io)?;
        if let Err(e) = fs::rename(&tmp_path, self.doc_path(id)) {
            let _ = fs::remove_file(&tmp_path);
            return Err(GaError::Io(e));
        }
        Ok(())
    }

    fn remove(&self, id: &str) -> Result<bool> {
        match fs::remove_file(self.doc_path(id)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(GaError::Io(e)),
        }
    }

    fn list_ids(&self) -> Result<Vec<String>> {
        self.ensure_dir()?;

        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(GaError::Io)? {
            let path = entry.map_err(GaError::Io)?.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            if let Some(id) = name.strip_suffix(FILE_EXT) {
                if !id.is_empty() {
                    ids.push(id.to_string());
                }
            }
        }
        Ok(ids)
    }

    fn location(&self, id: &str) -> String {
        self.doc_path(id).display().to_string()
    }
}
