use crate::error::StoreResult;
use crate::record::{IndexEntry, IndexFile};
use crate::segment::Segment;

/// A path joined with its metadata record, as returned by enumeration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileListing {
    pub path: String,
    pub entry: Option<IndexEntry>,
}

/// Segmented key/value storage for one VFS root.
///
/// All implementations must satisfy these invariants:
/// - Operations are serialized per backend instance; a backend is exclusive
///   to one VFS instance.
/// - There is no cross-path atomicity. Callers order their writes so the
///   aggregate index lands last; after a crash the root is recoverable to
///   the last durable index.
/// - Backends store bytes and records verbatim. Entry state transitions are
///   the caller's concern.
/// - All I/O errors are propagated, never silently ignored.
pub trait StorageBackend: Send + Sync {
    /// Idempotent setup (create directories, verify access).
    fn init(&self) -> StoreResult<()>;

    /// Read a blob. `None` reads the workspace segment, falling back to
    /// base -- the "effective content" a reader of the VFS sees.
    ///
    /// Returns `Ok(None)` if no segment holds the path.
    fn read_blob(&self, path: &str, segment: Option<Segment>) -> StoreResult<Option<String>>;

    /// Write a blob into one segment, creating or replacing it.
    fn write_blob(&self, path: &str, content: &str, segment: Segment) -> StoreResult<()>;

    /// Delete a blob from one segment, or from every data segment when
    /// `segment` is `None`. Deleting an absent blob is a no-op.
    fn delete_blob(&self, path: &str, segment: Option<Segment>) -> StoreResult<()>;

    /// Enumerate stored paths joined with their metadata records.
    ///
    /// `prefix` matches whole path components: `"dir"` matches `dir` and
    /// `dir/a.txt` but never `directory.txt`. `None` for `segment` lists
    /// the union of workspace and base (the effective file set). With
    /// `recursive` false, paths nested below the prefix are skipped.
    fn list_files(
        &self,
        prefix: Option<&str>,
        segment: Option<Segment>,
        recursive: bool,
    ) -> StoreResult<Vec<FileListing>>;

    /// Read one per-path metadata record from the `info` segment.
    fn read_entry(&self, path: &str) -> StoreResult<Option<IndexEntry>>;

    /// Write one per-path metadata record, replacing any existing record.
    fn write_entry(&self, entry: &IndexEntry) -> StoreResult<()>;

    /// Remove one per-path metadata record. Absent records are a no-op.
    fn delete_entry(&self, path: &str) -> StoreResult<()>;

    /// Read the aggregate index stored under the literal key `index`.
    ///
    /// Returns `Ok(None)` when no index has been written yet. A present but
    /// undecodable index is an error; callers decide whether to reset.
    fn read_index(&self) -> StoreResult<Option<IndexFile>>;

    /// Persist the aggregate index. Implementations should make this the
    /// most durable write they offer (e.g. write-then-rename).
    fn write_index(&self, index: &IndexFile) -> StoreResult<()>;
}

/// Whether `path` starts with `prefix` on whole path components.
pub(crate) fn component_prefix_match(path: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => rest.starts_with('/'),
        None => false,
    }
}

/// Whether `path` sits directly at the prefix level (no deeper nesting).
pub(crate) fn is_direct_child(path: &str, prefix: &str) -> bool {
    let rest = if prefix.is_empty() {
        path
    } else {
        match path.strip_prefix(prefix) {
            Some("") => return true,
            Some(rest) => rest.trim_start_matches('/'),
            None => return false,
        }
    };
    !rest.contains('/')
}
