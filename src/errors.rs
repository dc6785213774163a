use crate::entrypath::EntryPath;
use std::error::Error;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error returned when parsing an invalid, unnormalized, or unsupported
/// relative path
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("Invalid relative path {0:?}")]
pub struct EntryPathError(pub String);

/// Error returned when a string is not usable as a single path segment
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("Invalid path name {0:?}")]
pub struct EntryNameError(pub String);

/// Error returned when parsing an invalid digest string
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("Invalid digest string {0:?}")]
pub struct DigestParseError(pub String);

/// Error returned by operations on a [`ChecksumTree`][crate::ChecksumTree]
///
/// A failed operation never applies a partial mutation: the tree is left in
/// the state it had before the call.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum TreeError {
    /// A name was inserted twice, or collided between a file and a directory
    #[error("Conflicting entry at path {path:?}")]
    ConflictingEntry { path: EntryPath },

    /// A delete targeted a path with no leaf at it
    #[error("No leaf found at path {path:?}")]
    NotFound { path: EntryPath },

    /// The tree holds no leaves and the nonempty policy is in force
    #[error("Checksum tree contains no leaves")]
    EmptyTree,
}

/// Error returned by a leaf source
///
/// The aggregation core never interprets these; any source error aborts the
/// current build attempt outright.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Error digesting file: {}: {source}", .path.display())]
    DigestFile { path: PathBuf, source: io::Error },

    #[error("Error stat'ing file: {}: {source}", .path.display())]
    Stat { path: PathBuf, source: io::Error },

    #[error("Error reading directory: {}: {source}", .path.display())]
    Readdir { path: PathBuf, source: io::Error },

    #[error("Could not decode name of path {path:?}")]
    UndecodableName { path: PathBuf },

    #[error("Root path of store is not a directory: {}", .path.display())]
    NotDirRoot { path: PathBuf },

    /// Opaque failure from an external backend
    #[error("Leaf source failed: {source}")]
    Backend {
        source: Box<dyn Error + Send + Sync>,
    },
}

impl SourceError {
    pub fn digest_file<P: AsRef<Path>>(path: P, source: io::Error) -> Self {
        SourceError::DigestFile {
            path: path.as_ref().into(),
            source,
        }
    }

    pub fn stat<P: AsRef<Path>>(path: P, source: io::Error) -> Self {
        SourceError::Stat {
            path: path.as_ref().into(),
            source,
        }
    }

    pub fn readdir<P: AsRef<Path>>(path: P, source: io::Error) -> Self {
        SourceError::Readdir {
            path: path.as_ref().into(),
            source,
        }
    }

    pub fn undecodable_name<P: AsRef<Path>>(path: P) -> Self {
        SourceError::UndecodableName {
            path: path.as_ref().into(),
        }
    }

    pub fn not_dir_root<P: AsRef<Path>>(path: P) -> Self {
        SourceError::NotDirRoot {
            path: path.as_ref().into(),
        }
    }

    pub fn backend<E: Error + Send + Sync + 'static>(source: E) -> Self {
        SourceError::Backend {
            source: Box::new(source),
        }
    }
}

/// Umbrella error for checksumming an entire store
#[derive(Debug, Error)]
pub enum ChecksumError {
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Source(#[from] SourceError),
}
