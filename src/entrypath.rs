use crate::errors::{EntryNameError, EntryPathError};
use std::fmt;
use std::str::FromStr;

/// A normalized, nonempty, forward-slash-separated relative path within an
/// array store
///
/// Construction rejects anything that is not already in canonical form:
/// empty paths, empty segments (`"a//b"`), `.`, `..`, and absolute paths all
/// fail with [`EntryPathError`].  Sources are expected to hand over
/// pre-normalized paths; nothing is silently cleaned up.
///
/// Segments are compared as exact byte sequences, case-sensitively.
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct EntryPath(Vec<String>);

impl EntryPath {
    /// Return the final component of the path
    pub fn file_name(&self) -> &str {
        self.0
            .last()
            .expect("Invariant violated: EntryPath is empty")
    }

    /// Return an iterator over the path's segments, in order
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of segments in the path; always at least 1
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Append a single name to the path
    pub fn join(&self, name: &str) -> Result<EntryPath, EntryNameError> {
        if is_path_name(name) {
            let mut segments = self.0.clone();
            segments.push(String::from(name));
            Ok(EntryPath(segments))
        } else {
            Err(EntryNameError(String::from(name)))
        }
    }

    /// Split into the leading directory segments and the file name
    pub(crate) fn split_file(&self) -> (&[String], &str) {
        let (name, dirs) = self
            .0
            .split_last()
            .expect("Invariant violated: EntryPath is empty");
        (dirs, name)
    }

    /// The path consisting of the first `n` segments; `n` must be between 1
    /// and `depth()`
    pub(crate) fn prefix(&self, n: usize) -> EntryPath {
        debug_assert!(
            (1..=self.0.len()).contains(&n),
            "prefix length out of range"
        );
        EntryPath(self.0[..n].to_vec())
    }
}

impl fmt::Debug for EntryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"")?;
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}", segment.escape_debug())?;
        }
        f.write_str("\"")?;
        Ok(())
    }
}

impl fmt::Display for EntryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl FromStr for EntryPath {
    type Err = EntryPathError;

    fn from_str(path: &str) -> Result<EntryPath, EntryPathError> {
        if path.is_empty() {
            return Err(EntryPathError(String::from(path)));
        }
        let mut segments = Vec::new();
        for segment in path.split('/') {
            if !is_path_name(segment) {
                return Err(EntryPathError(String::from(path)));
            }
            segments.push(String::from(segment));
        }
        Ok(EntryPath(segments))
    }
}

impl TryFrom<&str> for EntryPath {
    type Error = EntryPathError;

    fn try_from(path: &str) -> Result<EntryPath, EntryPathError> {
        path.parse()
    }
}

/// True iff `s` is usable as a single path segment
pub(crate) fn is_path_name(s: &str) -> bool {
    !s.is_empty() && s != "." && s != ".." && !s.contains('/')
}
