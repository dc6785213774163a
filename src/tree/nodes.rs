use crate::digest::Digest;
use enum_dispatch::enum_dispatch;

/// Trait for behavior shared by [`FileEntry`] and [`DirEntry`]
#[enum_dispatch]
pub trait Entry {
    /// Return the entry's name within its parent directory
    fn name(&self) -> &str;

    /// Return the digest of the file's contents or of the directory's
    /// canonical serialization
    fn digest(&self) -> &Digest;

    /// Return the size of the file or the total size of all files within
    /// the directory
    fn size(&self) -> u64;

    /// Return the number of files within the directory, or 1 for a
    /// [`FileEntry`]
    fn file_count(&self) -> u64;
}

/// A direct child file of a directory, as fed to the aggregator
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct FileEntry {
    pub(crate) name: String,
    pub(crate) digest: Digest,
    pub(crate) size: u64,
}

impl FileEntry {
    pub fn new(name: String, digest: Digest, size: u64) -> FileEntry {
        FileEntry { name, digest, size }
    }
}

impl Entry for FileEntry {
    fn name(&self) -> &str {
        &self.name
    }

    fn digest(&self) -> &Digest {
        &self.digest
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn file_count(&self) -> u64 {
        1
    }
}

/// A direct child subdirectory of a directory, carrying its already-computed
/// aggregates
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct DirEntry {
    pub(crate) name: String,
    pub(crate) digest: Digest,
    pub(crate) size: u64,
    pub(crate) file_count: u64,
}

impl DirEntry {
    pub fn new(name: String, summary: &DirSummary) -> DirEntry {
        DirEntry {
            name,
            digest: summary.digest,
            size: summary.size,
            file_count: summary.file_count,
        }
    }
}

impl Entry for DirEntry {
    fn name(&self) -> &str {
        &self.name
    }

    fn digest(&self) -> &Digest {
        &self.digest
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn file_count(&self) -> u64 {
        self.file_count
    }
}

/// An enum of [`FileEntry`] and [`DirEntry`]
#[enum_dispatch(Entry)]
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum TreeEntry {
    File(FileEntry),
    Directory(DirEntry),
}

impl TreeEntry {
    /// True iff this entry is a subdirectory
    pub fn is_dir(&self) -> bool {
        matches!(self, TreeEntry::Directory(_))
    }
}

/// The aggregates computed for one directory: the digest of its canonical
/// serialization, the total size of all files beneath it, and their count
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct DirSummary {
    pub digest: Digest,
    pub size: u64,
    pub file_count: u64,
}
