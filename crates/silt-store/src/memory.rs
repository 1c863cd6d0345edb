use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::record::{IndexEntry, IndexFile};
use crate::segment::Segment;
use crate::traits::{component_prefix_match, is_direct_child, FileListing, StorageBackend};

#[derive(Default)]
struct Inner {
    workspace: BTreeMap<String, String>,
    base: BTreeMap<String, String>,
    conflict: BTreeMap<String, String>,
    /// Serialized per-path records, keyed by path.
    info: BTreeMap<String, String>,
    /// Serialized aggregate index under the literal `index` key.
    index: Option<String>,
}

impl Inner {
    fn segment(&self, segment: Segment) -> &BTreeMap<String, String> {
        match segment {
            Segment::Workspace => &self.workspace,
            Segment::Base => &self.base,
            Segment::Conflict => &self.conflict,
            Segment::Info => &self.info,
        }
    }

    fn segment_mut(&mut self, segment: Segment) -> &mut BTreeMap<String, String> {
        match segment {
            Segment::Workspace => &mut self.workspace,
            Segment::Base => &mut self.base,
            Segment::Conflict => &mut self.conflict,
            Segment::Info => &mut self.info,
        }
    }
}

/// In-memory, `BTreeMap`-based storage backend.
///
/// Intended for tests and embedding. All segments are held behind a single
/// `RwLock`; records and the index are kept in their serialized form so the
/// backend round-trips exactly what a durable backend would.
pub struct MemoryBackend {
    inner: RwLock<Inner>,
}

impl MemoryBackend {
    /// Create a new empty backend.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Number of blobs in one segment.
    pub fn segment_len(&self, segment: Segment) -> usize {
        self.inner.read().expect("lock poisoned").segment(segment).len()
    }

    /// Returns `true` if no segment holds any data.
    pub fn is_empty(&self) -> bool {
        let inner = self.inner.read().expect("lock poisoned");
        inner.workspace.is_empty()
            && inner.base.is_empty()
            && inner.conflict.is_empty()
            && inner.info.is_empty()
            && inner.index.is_none()
    }

    /// Drop all segments and the index.
    pub fn clear(&self) {
        *self.inner.write().expect("lock poisoned") = Inner::default();
    }

    fn check_path(path: &str) -> StoreResult<()> {
        if path.is_empty() {
            return Err(StoreError::InvalidPath("empty path".to_string()));
        }
        Ok(())
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBackend for MemoryBackend {
    fn init(&self) -> StoreResult<()> {
        Ok(())
    }

    fn read_blob(&self, path: &str, segment: Option<Segment>) -> StoreResult<Option<String>> {
        Self::check_path(path)?;
        let inner = self.inner.read().expect("lock poisoned");
        let found = match segment {
            Some(segment) => inner.segment(segment).get(path),
            None => inner.workspace.get(path).or_else(|| inner.base.get(path)),
        };
        Ok(found.cloned())
    }

    fn write_blob(&self, path: &str, content: &str, segment: Segment) -> StoreResult<()> {
        Self::check_path(path)?;
        let mut inner = self.inner.write().expect("lock poisoned");
        inner
            .segment_mut(segment)
            .insert(path.to_string(), content.to_string());
        Ok(())
    }

    fn delete_blob(&self, path: &str, segment: Option<Segment>) -> StoreResult<()> {
        Self::check_path(path)?;
        let mut inner = self.inner.write().expect("lock poisoned");
        match segment {
            Some(segment) => {
                inner.segment_mut(segment).remove(path);
            }
            None => {
                for segment in Segment::DATA {
                    inner.segment_mut(segment).remove(path);
                }
            }
        }
        Ok(())
    }

    fn list_files(
        &self,
        prefix: Option<&str>,
        segment: Option<Segment>,
        recursive: bool,
    ) -> StoreResult<Vec<FileListing>> {
        let prefix = prefix.unwrap_or("");
        let inner = self.inner.read().expect("lock poisoned");

        let mut paths = BTreeSet::new();
        match segment {
            Some(segment) => paths.extend(inner.segment(segment).keys().cloned()),
            None => {
                paths.extend(inner.workspace.keys().cloned());
                paths.extend(inner.base.keys().cloned());
            }
        }

        let mut listings = Vec::new();
        for path in paths {
            if !component_prefix_match(&path, prefix) {
                continue;
            }
            if !recursive && !is_direct_child(&path, prefix) {
                continue;
            }
            let entry = match inner.info.get(&path) {
                Some(raw) => Some(serde_json::from_str(raw)?),
                None => None,
            };
            listings.push(FileListing { path, entry });
        }
        Ok(listings)
    }

    fn read_entry(&self, path: &str) -> StoreResult<Option<IndexEntry>> {
        Self::check_path(path)?;
        let inner = self.inner.read().expect("lock poisoned");
        match inner.info.get(path) {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    fn write_entry(&self, entry: &IndexEntry) -> StoreResult<()> {
        Self::check_path(&entry.path)?;
        let raw = serde_json::to_string(entry)?;
        let mut inner = self.inner.write().expect("lock poisoned");
        inner.info.insert(entry.path.clone(), raw);
        Ok(())
    }

    fn delete_entry(&self, path: &str) -> StoreResult<()> {
        Self::check_path(path)?;
        let mut inner = self.inner.write().expect("lock poisoned");
        inner.info.remove(path);
        Ok(())
    }

    fn read_index(&self) -> StoreResult<Option<IndexFile>> {
        let inner = self.inner.read().expect("lock poisoned");
        match &inner.index {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    fn write_index(&self, index: &IndexFile) -> StoreResult<()> {
        let raw = serde_json::to_string(index)?;
        self.inner.write().expect("lock poisoned").index = Some(raw);
        Ok(())
    }
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read().expect("lock poisoned");
        f.debug_struct("MemoryBackend")
            .field("workspace", &inner.workspace.len())
            .field("base", &inner.base.len())
            .field("conflict", &inner.conflict.len())
            .field("info", &inner.info.len())
            .finish()
    }
}
