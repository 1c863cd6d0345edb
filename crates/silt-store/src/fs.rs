use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{StoreError, StoreResult};
use crate::record::{IndexEntry, IndexFile};
use crate::segment::Segment;
use crate::traits::{component_prefix_match, is_direct_child, FileListing, StorageBackend};

const INDEX_FILE: &str = "index.json";

/// Filesystem storage backend: one directory per segment under a root.
///
/// Layout:
///
/// ```text
/// <root>/workspace/<path>
/// <root>/base/<path>
/// <root>/conflict/<path>
/// <root>/info/<path>        (JSON-encoded record)
/// <root>/index.json
/// ```
///
/// Logical paths map one-to-one onto nested directories; a single encoding
/// is used for every segment. The aggregate index is written via a temp
/// file and an atomic rename so a crash never leaves a torn index.
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    /// Open a backend over `root`. The directory tree is created by
    /// [`StorageBackend::init`].
    pub fn create<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Capability probe: whether `root` either already looks like a silt
    /// root or could be created under an existing parent.
    pub fn can_use<P: AsRef<Path>>(root: P) -> bool {
        let root = root.as_ref();
        if root.is_dir() {
            return true;
        }
        root.parent().map(Path::is_dir).unwrap_or(false)
    }

    /// Enumerate silt roots directly under `parent` (directories that carry
    /// an index or a workspace segment).
    pub fn available_roots<P: AsRef<Path>>(parent: P) -> StoreResult<Vec<String>> {
        let mut roots = Vec::new();
        for dir_entry in fs::read_dir(parent.as_ref())? {
            let dir_entry = dir_entry?;
            if !dir_entry.file_type()?.is_dir() {
                continue;
            }
            let path = dir_entry.path();
            if path.join(INDEX_FILE).is_file() || path.join(Segment::Workspace.as_str()).is_dir() {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    roots.push(name.to_string());
                }
            }
        }
        roots.sort();
        Ok(roots)
    }

    /// Remove a root and everything under it.
    pub fn delete_root<P: AsRef<Path>>(root: P) -> StoreResult<()> {
        let root = root.as_ref();
        if root.exists() {
            fs::remove_dir_all(root)?;
        }
        Ok(())
    }

    fn segment_dir(&self, segment: Segment) -> PathBuf {
        self.root.join(segment.as_str())
    }

    fn blob_path(&self, path: &str, segment: Segment) -> StoreResult<PathBuf> {
        validate_path(path)?;
        Ok(self.segment_dir(segment).join(path))
    }

    fn read_file(&self, file: &Path) -> StoreResult<Option<String>> {
        match fs::read_to_string(file) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_file(&self, file: &Path, content: &str) -> StoreResult<()> {
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(file, content)?;
        Ok(())
    }

    fn remove_file(&self, file: &Path) -> StoreResult<()> {
        match fs::remove_file(file) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn collect_segment_paths(&self, segment: Segment, out: &mut BTreeSet<String>) -> StoreResult<()> {
        let dir = self.segment_dir(segment);
        if dir.is_dir() {
            collect_paths(&dir, "", out)?;
        }
        Ok(())
    }
}

/// Reject logical paths that would escape the segment directory.
fn validate_path(path: &str) -> StoreResult<()> {
    if path.is_empty() {
        return Err(StoreError::InvalidPath("empty path".to_string()));
    }
    if path.starts_with('/') || path.contains('\\') {
        return Err(StoreError::InvalidPath(path.to_string()));
    }
    if path.split('/').any(|c| c.is_empty() || c == "." || c == "..") {
        return Err(StoreError::InvalidPath(path.to_string()));
    }
    Ok(())
}

fn collect_paths(dir: &Path, rel: &str, out: &mut BTreeSet<String>) -> StoreResult<()> {
    for dir_entry in fs::read_dir(dir)? {
        let dir_entry = dir_entry?;
        let name = match dir_entry.file_name().into_string() {
            Ok(name) => name,
            Err(_) => continue, // non-UTF-8 names are never ours
        };
        let child_rel = if rel.is_empty() {
            name
        } else {
            format!("{rel}/{name}")
        };
        let file_type = dir_entry.file_type()?;
        if file_type.is_dir() {
            collect_paths(&dir_entry.path(), &child_rel, out)?;
        } else if file_type.is_file() {
            out.insert(child_rel);
        }
    }
    Ok(())
}

impl StorageBackend for FsBackend {
    fn init(&self) -> StoreResult<()> {
        if !Self::can_use(&self.root) {
            return Err(StoreError::RootUnavailable(self.root.clone()));
        }
        for segment in [Segment::Workspace, Segment::Base, Segment::Conflict, Segment::Info] {
            fs::create_dir_all(self.segment_dir(segment))?;
        }
        Ok(())
    }

    fn read_blob(&self, path: &str, segment: Option<Segment>) -> StoreResult<Option<String>> {
        match segment {
            Some(segment) => self.read_file(&self.blob_path(path, segment)?),
            None => {
                if let Some(found) = self.read_file(&self.blob_path(path, Segment::Workspace)?)? {
                    return Ok(Some(found));
                }
                self.read_file(&self.blob_path(path, Segment::Base)?)
            }
        }
    }

    fn write_blob(&self, path: &str, content: &str, segment: Segment) -> StoreResult<()> {
        self.write_file(&self.blob_path(path, segment)?, content)
    }

    fn delete_blob(&self, path: &str, segment: Option<Segment>) -> StoreResult<()> {
        match segment {
            Some(segment) => self.remove_file(&self.blob_path(path, segment)?),
            None => {
                for segment in Segment::DATA {
                    self.remove_file(&self.blob_path(path, segment)?)?;
                }
                Ok(())
            }
        }
    }

    fn list_files(
        &self,
        prefix: Option<&str>,
        segment: Option<Segment>,
        recursive: bool,
    ) -> StoreResult<Vec<FileListing>> {
        let prefix = prefix.unwrap_or("");
        let mut paths = BTreeSet::new();
        match segment {
            Some(segment) => self.collect_segment_paths(segment, &mut paths)?,
            None => {
                self.collect_segment_paths(Segment::Workspace, &mut paths)?;
                self.collect_segment_paths(Segment::Base, &mut paths)?;
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
            let entry = self.read_entry(&path)?;
            listings.push(FileListing { path, entry });
        }
        Ok(listings)
    }

    fn read_entry(&self, path: &str) -> StoreResult<Option<IndexEntry>> {
        match self.read_file(&self.blob_path(path, Segment::Info)?)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn write_entry(&self, entry: &IndexEntry) -> StoreResult<()> {
        let raw = serde_json::to_string(entry)?;
        self.write_file(&self.blob_path(&entry.path, Segment::Info)?, &raw)
    }

    fn delete_entry(&self, path: &str) -> StoreResult<()> {
        self.remove_file(&self.blob_path(path, Segment::Info)?)
    }

    fn read_index(&self) -> StoreResult<Option<IndexFile>> {
        match self.read_file(&self.root.join(INDEX_FILE))? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn write_index(&self, index: &IndexFile) -> StoreResult<()> {
        fs::create_dir_all(&self.root)?;
        let raw = serde_json::to_string_pretty(index)?;
        let tmp = self.root.join(".index.json.tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, self.root.join(INDEX_FILE))?;
        Ok(())
    }
}

impl std::fmt::Debug for FsBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsBackend").field("root", &self.root).finish()
    }
}
