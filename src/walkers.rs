//! Traversal strategies for checksumming a local array store
//!
//! Each checksumming function returns either `Ok(ChecksumManifest)`,
//! containing the checksum manifest for the given store, or
//! `Err(ChecksumError)`.  A [`TreeError`][crate::errors::TreeError] inside
//! the latter indicates a bug in the traversal function.
//!
//! All strategies yield the same manifest for the same store; they differ
//! only in how leaves are enumerated and digested.
mod depth_first;
mod fastasync;
mod fastio;
mod jobstack;
pub use depth_first::*;
pub use fastasync::*;
pub use fastio::*;
