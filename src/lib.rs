//! Content-derived, incrementally updatable checksums for hierarchically
//! chunked array stores (Zarr directory trees)
//!
//! Every file in a store is reduced to a leaf record of its relative path,
//! size, and MD5 digest.  Leaf records are assembled into a
//! [`ChecksumTree`], which aggregates a digest for every directory from the
//! digests of its direct children, bottom-up, producing a single
//! [`ChecksumManifest`] for the root.  The manifest depends only on the set
//! of leaf records, never on the order they were produced in or on which
//! backend produced them.
//!
//! Trees support in-place updates: inserting, replacing, or removing a leaf
//! invalidates only the cached summaries along its ancestor chain, so
//! recomputing after a small change re-hashes a handful of directories
//! rather than the whole store.
pub mod digest;
pub mod entrypath;
pub mod errors;
pub mod manifest;
pub mod source;
pub mod store;
pub mod tree;
mod util;
pub mod walkers;
pub use crate::digest::Digest;
pub use crate::entrypath::EntryPath;
pub use crate::manifest::{ChecksumManifest, FORMAT_VERSION};
pub use crate::source::{source_checksum, LeafRecord, LeafSource};
pub use crate::store::{ArrayStore, ListingFilter};
pub use crate::tree::{compile_manifest, try_compile_manifest, ChecksumTree, TreeOptions};
pub use crate::walkers::*;
