//! Fragment repositories: JSON files under a root directory, or in memory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::domain::{DomainError, DomainResult, FragmentKey};
use crate::infrastructure::traits::{FileSystem, FragmentRepository};

const FRAGMENT_EXTENSION: &str = "json";

/// Fragments stored as `<root>/<key>.json`.
pub struct FsFragmentRepository {
    root: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl FsFragmentRepository {
    pub fn new(root: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            root: root.into(),
            fs,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &FragmentKey) -> PathBuf {
        let mut path = self.root.clone();
        for segment in key.segments() {
            path.push(segment);
        }
        let mut file_name = path.into_os_string();
        file_name.push(".");
        file_name.push(FRAGMENT_EXTENSION);
        PathBuf::from(file_name)
    }
}

impl FragmentRepository for FsFragmentRepository {
    fn load(&self, key: &FragmentKey) -> DomainResult<Value> {
        let path = self.path_for(key);
        trace!("load: key={} path={}", key, path.display());

        if !self.fs.is_file(&path) {
            return Err(DomainError::FragmentNotFound {
                key: key.to_string(),
            });
        }

        let content =
            self.fs
                .read_to_string(&path)
                .map_err(|e| DomainError::FragmentMalformed {
                    key: key.to_string(),
                    reason: format!("read {}: {}", path.display(), e),
                })?;

        serde_json::from_str(&content).map_err(|e| DomainError::FragmentMalformed {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }

    fn keys(&self) -> DomainResult<Vec<FragmentKey>> {
        if !self.fs.is_dir(&self.root) {
            return Err(DomainError::FragmentNotFound {
                key: self.root.display().to_string(),
            });
        }

        let mut keys = Vec::new();
        for entry in WalkDir::new(&self.root)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let is_fragment = path
                .extension()
                .map(|ext| ext == FRAGMENT_EXTENSION)
                .unwrap_or(false);
            if !is_fragment {
                continue;
            }
            let Ok(relative) = path.with_extension("").strip_prefix(&self.root).map(Path::to_path_buf)
            else {
                continue;
            };
            let segments: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            if let Ok(key) = FragmentKey::new(segments.join("/")) {
                keys.push(key);
            }
        }

        keys.sort();
        debug!("keys: found {} fragments under {}", keys.len(), self.root.display());
        Ok(keys)
    }
}

/// Fragments held in memory, keyed by fragment key.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFragmentRepository {
    fragments: BTreeMap<FragmentKey, Value>,
}

impl InMemoryFragmentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: FragmentKey, value: Value) {
        self.fragments.insert(key, value);
    }

    /// Builder-style insert from a key string.
    pub fn with(mut self, key: &str, value: Value) -> DomainResult<Self> {
        self.insert(FragmentKey::new(key)?, value);
        Ok(self)
    }

    pub fn remove(&mut self, key: &FragmentKey) -> Option<Value> {
        self.fragments.remove(key)
    }

    /// Copy every fragment of another repository.
    pub fn snapshot(source: &dyn FragmentRepository) -> DomainResult<Self> {
        let mut repo = Self::new();
        for key in source.keys()? {
            let value = source.load(&key)?;
            repo.insert(key, value);
        }
        Ok(repo)
    }
}

impl FragmentRepository for InMemoryFragmentRepository {
    fn load(&self, key: &FragmentKey) -> DomainResult<Value> {
        self.fragments
            .get(key)
            .cloned()
            .ok_or_else(|| DomainError::FragmentNotFound {
                key: key.to_string(),
            })
    }

    fn keys(&self) -> DomainResult<Vec<FragmentKey>> {
        Ok(self.fragments.keys().cloned().collect())
    }
}
