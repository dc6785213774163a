use crate::digest::Digest;
use crate::entrypath::EntryPath;
use crate::errors::{ChecksumError, SourceError};
use crate::manifest::ChecksumManifest;
use crate::tree::try_compile_manifest;
use std::fmt;

/// A leaf object enumerated by a backend: a relative path, a byte count, and
/// a pre-computed content digest
///
/// The aggregation core never reads leaf bytes itself; whatever backend
/// produced the record already knew the digest (a filesystem walk, an object
/// store ETag, ...).  Records are immutable once ingested.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct LeafRecord {
    pub path: EntryPath,
    pub size: u64,
    pub digest: Digest,
}

impl LeafRecord {
    pub fn new(path: EntryPath, size: u64, digest: Digest) -> LeafRecord {
        LeafRecord { path, size, digest }
    }
}

impl fmt::Display for LeafRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes, md5={})", self.path, self.size, self.digest)
    }
}

/// A backend that can enumerate every leaf under its root prefix
///
/// The enumeration must be finite, and paths must already be normalized
/// (see [`EntryPath`]).  Errors are opaque to the caller and fatal to the
/// build attempt that consumes them.
pub trait LeafSource {
    type Iter: Iterator<Item = Result<LeafRecord, SourceError>>;

    fn list(&self) -> Result<Self::Iter, SourceError>;
}

/// Enumerate a source and compute the checksum manifest for its entire tree
pub fn source_checksum<S: LeafSource>(source: &S) -> Result<ChecksumManifest, ChecksumError> {
    try_compile_manifest(source.list()?)
}
