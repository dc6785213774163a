use crate::digest::Digest;
use crate::tree::nodes::DirSummary;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Version of the canonical serialization layout documented in the
/// `tree::canon` module
///
/// Any change to the canonical layout or the digest function alters every
/// directory digest, so such changes must bump this constant.
pub const FORMAT_VERSION: u32 = 1;

/// The final artifact of checksumming a tree: the root digest plus aggregate
/// totals, tagged with the serialization format version
///
/// A manifest is a snapshot; it is never updated in place.  Two manifests
/// describe the same content state iff all four fields are equal.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct ChecksumManifest {
    pub root_digest: Digest,
    pub total_size: u64,
    pub total_count: u64,
    pub format_version: u32,
}

impl ChecksumManifest {
    pub(crate) fn from_summary(summary: &DirSummary) -> ChecksumManifest {
        ChecksumManifest {
            root_digest: summary.digest,
            total_size: summary.size,
            total_count: summary.file_count,
            format_version: FORMAT_VERSION,
        }
    }

    /// Serialize to the persisted sidecar form, a single JSON record
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a manifest previously produced by [`to_json()`][Self::to_json]
    pub fn from_json(s: &str) -> Result<ChecksumManifest, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// Displays in the aggregate form `<hex digest>-<file count>--<total size>`
impl fmt::Display for ChecksumManifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}--{}",
            self.root_digest, self.total_count, self.total_size
        )
    }
}
