mod canon;
pub mod nodes;
use self::nodes::{DirEntry, DirSummary, FileEntry, TreeEntry};
use crate::digest::Digest;
use crate::entrypath::EntryPath;
use crate::errors::{ChecksumError, SourceError, TreeError};
use crate::manifest::ChecksumManifest;
use crate::source::LeafRecord;
use log::{debug, trace};
use std::collections::HashMap;

const ROOT_PATH: &str = "<root>";

/// Policy knobs for a [`ChecksumTree`]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TreeOptions {
    /// When true, computing a manifest for a tree with zero leaves fails
    /// with [`TreeError::EmptyTree`] instead of yielding the
    /// empty-directory sentinel manifest
    pub require_nonempty: bool,

    /// When true, removing the last leaf under a directory also removes the
    /// directory, repeating upward while parents become empty
    pub prune_empty_dirs: bool,
}

impl Default for TreeOptions {
    fn default() -> TreeOptions {
        TreeOptions {
            require_nonempty: false,
            prune_empty_dirs: true,
        }
    }
}

/// An in-memory tree of leaf records grouped by directory, with cached
/// per-directory aggregates
///
/// The tree is built from leaf records ([`add_leaf()`][Self::add_leaf]),
/// aggregated into a [`ChecksumManifest`] ([`recompute()`][Self::recompute]),
/// and then optionally kept around for incremental updates
/// ([`put_leaf()`][Self::put_leaf], [`remove_leaf()`][Self::remove_leaf]).
/// Mutations only clear the cached aggregates on the ancestor chain of the
/// touched path, so a later `recompute()` re-hashes just the changed paths,
/// not the whole tree.
///
/// A tree instance assumes a single writer; it performs no synchronization
/// of its own.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChecksumTree {
    root: DirNode,
    options: TreeOptions,
    rehashes: u64,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct DirNode {
    files: HashMap<String, Leaf>,
    dirs: HashMap<String, DirNode>,
    cached: Option<DirSummary>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
struct Leaf {
    size: u64,
    digest: Digest,
}

impl ChecksumTree {
    pub fn new() -> ChecksumTree {
        ChecksumTree::with_options(TreeOptions::default())
    }

    pub fn with_options(options: TreeOptions) -> ChecksumTree {
        ChecksumTree {
            root: DirNode::default(),
            options,
            rehashes: 0,
        }
    }

    /// Number of directory aggregations performed over the lifetime of this
    /// tree
    ///
    /// Recomputing an unchanged tree adds nothing to this count, and
    /// mutating one path then recomputing adds only the length of the
    /// changed path, so tests can verify that untouched siblings are never
    /// re-hashed.
    pub fn rehash_count(&self) -> u64 {
        self.rehashes
    }

    /// Insert a leaf while building the tree
    ///
    /// Missing intermediate directories are created on demand.  Inserting
    /// the same path twice, or a path that collides with an existing
    /// directory (or vice versa), fails with
    /// [`TreeError::ConflictingEntry`].
    pub fn add_leaf(&mut self, leaf: LeafRecord) -> Result<(), TreeError> {
        self.insert_leaf(leaf, false)
    }

    /// Insert or replace a leaf as an incremental update
    ///
    /// Same as [`add_leaf()`][Self::add_leaf], except that an existing leaf
    /// at the path is replaced instead of conflicting.
    pub fn put_leaf(&mut self, leaf: LeafRecord) -> Result<(), TreeError> {
        self.insert_leaf(leaf, true)
    }

    fn insert_leaf(&mut self, leaf: LeafRecord, replace: bool) -> Result<(), TreeError> {
        let (dirs, name) = leaf.path.split_file();
        // Validate before mutating anything so a conflict leaves the tree
        // untouched
        let mut probe = Some(&self.root);
        for (i, segment) in dirs.iter().enumerate() {
            let Some(node) = probe else {
                break;
            };
            if node.files.contains_key(segment.as_str()) {
                return Err(TreeError::ConflictingEntry {
                    path: leaf.path.prefix(i + 1),
                });
            }
            probe = node.dirs.get(segment.as_str());
        }
        if let Some(parent) = probe {
            if parent.dirs.contains_key(name)
                || (!replace && parent.files.contains_key(name))
            {
                return Err(TreeError::ConflictingEntry {
                    path: leaf.path.clone(),
                });
            }
        }
        trace!("Inserting leaf {leaf}");
        let mut node = &mut self.root;
        node.cached = None;
        for segment in dirs {
            node = node.dirs.entry(segment.clone()).or_default();
            node.cached = None;
        }
        node.files.insert(
            String::from(name),
            Leaf {
                size: leaf.size,
                digest: leaf.digest,
            },
        );
        Ok(())
    }

    /// Create an explicitly empty directory at `path`
    ///
    /// An empty directory is a real, distinguishable state: its sentinel
    /// digest contributes to the parent, unlike a directory that simply
    /// does not exist.  Creating a directory where one already exists is a
    /// no-op; colliding with a file fails with
    /// [`TreeError::ConflictingEntry`].
    pub fn add_dir(&mut self, path: &EntryPath) -> Result<(), TreeError> {
        let mut probe = Some(&self.root);
        for (i, segment) in path.segments().enumerate() {
            let Some(node) = probe else {
                break;
            };
            if node.files.contains_key(segment) {
                return Err(TreeError::ConflictingEntry {
                    path: path.prefix(i + 1),
                });
            }
            probe = node.dirs.get(segment);
        }
        let mut node = &mut self.root;
        node.cached = None;
        for segment in path.segments() {
            node = node.dirs.entry(String::from(segment)).or_default();
            node.cached = None;
        }
        Ok(())
    }

    /// Remove the leaf at `path` as an incremental update
    ///
    /// Fails with [`TreeError::NotFound`], mutating nothing, if any path
    /// segment or the leaf itself is absent.  If removal empties a
    /// directory and [`TreeOptions::prune_empty_dirs`] is set, the
    /// directory is pruned, repeating upward.
    pub fn remove_leaf(&mut self, path: &EntryPath) -> Result<LeafRecord, TreeError> {
        let (dirs, name) = path.split_file();
        match remove_in(&mut self.root, dirs, name, self.options.prune_empty_dirs) {
            Some(leaf) => {
                trace!("Removed leaf at {path}");
                Ok(LeafRecord::new(path.clone(), leaf.size, leaf.digest))
            }
            None => Err(TreeError::NotFound { path: path.clone() }),
        }
    }

    /// Aggregate every directory whose cached summary has been invalidated
    /// and read off the root's manifest
    ///
    /// Cost is proportional to the depth and breadth of the paths mutated
    /// since the previous call; subtrees with valid caches are skipped
    /// outright.
    pub fn recompute(&mut self) -> Result<ChecksumManifest, TreeError> {
        let summary = summarize_node(&mut self.root, ROOT_PATH, &mut self.rehashes);
        if self.options.require_nonempty && summary.file_count == 0 {
            return Err(TreeError::EmptyTree);
        }
        Ok(ChecksumManifest::from_summary(&summary))
    }

    /// Consume the tree and produce its manifest (one-shot mode)
    pub fn into_manifest(mut self) -> Result<ChecksumManifest, TreeError> {
        self.recompute()
    }

    pub fn from_leaves<I: IntoIterator<Item = LeafRecord>>(
        iter: I,
    ) -> Result<ChecksumTree, TreeError> {
        let mut tree = ChecksumTree::new();
        for leaf in iter {
            tree.add_leaf(leaf)?;
        }
        Ok(tree)
    }
}

impl Default for ChecksumTree {
    fn default() -> Self {
        ChecksumTree::new()
    }
}

fn remove_in(node: &mut DirNode, dirs: &[String], name: &str, prune: bool) -> Option<Leaf> {
    let leaf = match dirs.split_first() {
        None => node.files.remove(name)?,
        Some((head, rest)) => {
            let child = node.dirs.get_mut(head.as_str())?;
            let leaf = remove_in(child, rest, name, prune)?;
            let now_empty = child.files.is_empty() && child.dirs.is_empty();
            if prune && now_empty {
                node.dirs.remove(head.as_str());
            }
            leaf
        }
    };
    node.cached = None;
    Some(leaf)
}

fn summarize_node(node: &mut DirNode, relpath: &str, rehashes: &mut u64) -> DirSummary {
    if let Some(cached) = &node.cached {
        return cached.clone();
    }
    let mut entries = Vec::with_capacity(node.files.len() + node.dirs.len());
    for (name, child) in &mut node.dirs {
        let child_relpath = if relpath == ROOT_PATH {
            name.clone()
        } else {
            format!("{relpath}/{name}")
        };
        let sub = summarize_node(child, &child_relpath, rehashes);
        entries.push(TreeEntry::from(DirEntry::new(name.clone(), &sub)));
    }
    for (name, leaf) in &node.files {
        entries.push(TreeEntry::from(FileEntry::new(
            name.clone(),
            leaf.digest,
            leaf.size,
        )));
    }
    let summary = canon::summarize(entries);
    *rehashes += 1;
    debug!(
        "Computed digest for directory {relpath}: {digest}",
        digest = summary.digest
    );
    node.cached = Some(summary.clone());
    summary
}

/// Build a tree from the given leaf records and compute its manifest
pub fn compile_manifest<I: IntoIterator<Item = LeafRecord>>(
    iter: I,
) -> Result<ChecksumManifest, TreeError> {
    ChecksumTree::from_leaves(iter)?.into_manifest()
}

/// Build a tree from fallible leaf records and compute its manifest
///
/// Aborts on the first source error; there is no partial manifest.
pub fn try_compile_manifest<I>(iter: I) -> Result<ChecksumManifest, ChecksumError>
where
    I: IntoIterator<Item = Result<LeafRecord, SourceError>>,
{
    let mut tree = ChecksumTree::new();
    for leaf in iter {
        tree.add_leaf(leaf?)?;
    }
    Ok(tree.into_manifest()?)
}
