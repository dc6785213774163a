use crate::errors::{ChecksumError, SourceError};
use crate::manifest::ChecksumManifest;
use crate::source::{LeafRecord, LeafSource};
use crate::store::{ArrayStore, Entries, StoreEntry};
use crate::tree::try_compile_manifest;

/// Traverse an array store depth-first on the calling thread and checksum
/// every leaf as it is encountered
pub fn depth_first_checksum(store: &ArrayStore) -> Result<ChecksumManifest, ChecksumError> {
    try_compile_manifest(depth_first_leaves(store)?)
}

/// Return an iterator over every leaf record in the store, digesting files
/// lazily in depth-first order
///
/// After the iterator yields its first `Err`, it yields nothing further;
/// a partial enumeration must not be mistaken for a complete one.
pub fn depth_first_leaves(store: &ArrayStore) -> Result<DepthFirstLeaves, SourceError> {
    Ok(DepthFirstLeaves {
        dirstack: vec![store.root().entries()?],
        failed: false,
    })
}

/// Iterator returned by [`depth_first_leaves()`]
#[derive(Debug)]
pub struct DepthFirstLeaves {
    dirstack: Vec<Entries>,
    failed: bool,
}

impl Iterator for DepthFirstLeaves {
    type Item = Result<LeafRecord, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            let topdir = self.dirstack.last_mut()?;
            match topdir.next() {
                Some(Ok(StoreEntry::Directory(d))) => match d.entries() {
                    Ok(entries) => self.dirstack.push(entries),
                    Err(e) => {
                        self.failed = true;
                        return Some(Err(e));
                    }
                },
                Some(Ok(StoreEntry::File(f))) => {
                    let leaf = f.to_leaf();
                    self.failed = leaf.is_err();
                    return Some(leaf);
                }
                Some(Err(e)) => {
                    self.failed = true;
                    return Some(Err(e));
                }
                None => {
                    self.dirstack.pop();
                }
            }
        }
    }
}

impl LeafSource for ArrayStore {
    type Iter = DepthFirstLeaves;

    fn list(&self) -> Result<DepthFirstLeaves, SourceError> {
        depth_first_leaves(self)
    }
}
