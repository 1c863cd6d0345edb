use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the four logical storage partitions of a root.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    /// Uncommitted user edits.
    Workspace,
    /// The snapshot last reconciled with the remote.
    Base,
    /// Remote bytes of paths that failed to auto-merge.
    Conflict,
    /// Per-path metadata records.
    Info,
}

impl Segment {
    /// The literal segment name used in storage layouts.
    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::Workspace => "workspace",
            Segment::Base => "base",
            Segment::Conflict => "conflict",
            Segment::Info => "info",
        }
    }

    /// The segments that hold file content (everything but `info`).
    pub const DATA: [Segment; 3] = [Segment::Workspace, Segment::Base, Segment::Conflict];
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
