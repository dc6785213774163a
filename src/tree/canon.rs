//! Canonical serialization of a directory's children
//!
//! A directory's digest is the MD5 of a byte string that encodes its direct
//! children, one entry per child file or subdirectory, sorted by name as
//! exact byte sequences.  Each entry is laid out as:
//!
//! ```text
//! tag       u8          0 = file, 1 = directory
//! name_len  u32 LE      byte length of the name
//! name      [u8]        the name itself
//! digest    [u8; 16]    raw digest bytes
//! size      u64 LE      file size, or total size under the subdirectory
//! ```
//!
//! Every variable-length field is length-prefixed, so no name can collide
//! with a neighboring field, and the sort makes the encoding independent of
//! insertion order.  A directory with no children encodes to the empty byte
//! string, giving the empty-directory sentinel digest `MD5("")`.
//!
//! This layout is versioned by
//! [`FORMAT_VERSION`][crate::manifest::FORMAT_VERSION]; any change to it
//! changes every digest.

use super::nodes::{DirSummary, Entry, TreeEntry};
use crate::digest::Digest;

/// Aggregate a directory's direct children into its summary
///
/// It is the caller's responsibility to ensure that `entries` contains all &
/// only the direct children of one directory and that no two entries share a
/// name.
pub(crate) fn summarize<I: IntoIterator<Item = TreeEntry>>(entries: I) -> DirSummary {
    let mut entries = entries.into_iter().collect::<Vec<_>>();
    entries.sort_unstable_by(|a, b| a.name().as_bytes().cmp(b.name().as_bytes()));
    let mut buf = Vec::new();
    let mut size = 0;
    let mut file_count = 0;
    for entry in &entries {
        size += entry.size();
        file_count += entry.file_count();
        encode_entry(&mut buf, entry);
    }
    DirSummary {
        digest: Digest::of(&buf),
        size,
        file_count,
    }
}

fn encode_entry(buf: &mut Vec<u8>, entry: &TreeEntry) {
    let name = entry.name().as_bytes();
    let name_len =
        u32::try_from(name.len()).expect("Entry name length should fit in a u32");
    buf.push(u8::from(entry.is_dir()));
    buf.extend_from_slice(&name_len.to_le_bytes());
    buf.extend_from_slice(name);
    buf.extend_from_slice(entry.digest().as_bytes());
    buf.extend_from_slice(&entry.size().to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::nodes::{DirEntry, FileEntry};
    use std::iter::empty;

    fn aa() -> Digest {
        "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa".parse().unwrap()
    }

    fn bb() -> Digest {
        "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb".parse().unwrap()
    }

    #[test]
    fn test_summarize_nothing() {
        let summary = summarize(empty());
        assert_eq!(
            summary.digest.to_string(),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
        assert_eq!(summary.digest, Digest::empty());
        assert_eq!(summary.size, 0);
        assert_eq!(summary.file_count, 0);
    }

    #[test]
    fn test_summarize_one_file() {
        let entries = vec![TreeEntry::from(FileEntry::new("bar".into(), aa(), 1))];
        let summary = summarize(entries);
        assert_eq!(
            summary.digest.to_string(),
            "ad33b2be2fde9cc1762592ebe3d02afa"
        );
        assert_eq!(summary.size, 1);
        assert_eq!(summary.file_count, 1);
    }

    #[test]
    fn test_summarize_one_directory() {
        let sub = DirSummary {
            digest: aa(),
            size: 1,
            file_count: 1,
        };
        let entries = vec![TreeEntry::from(DirEntry::new("bar".into(), &sub))];
        let summary = summarize(entries);
        assert_eq!(
            summary.digest.to_string(),
            "a02031652da875ac313f353448607472"
        );
        assert_eq!(summary.size, 1);
        assert_eq!(summary.file_count, 1);
    }

    #[test]
    fn test_file_dir_tag_distinguishes() {
        let as_file = summarize(vec![TreeEntry::from(FileEntry::new(
            "bar".into(),
            aa(),
            1,
        ))]);
        let sub = DirSummary {
            digest: aa(),
            size: 1,
            file_count: 1,
        };
        let as_dir = summarize(vec![TreeEntry::from(DirEntry::new("bar".into(), &sub))]);
        assert_ne!(as_file.digest, as_dir.digest);
    }

    #[test]
    fn test_summarize_two_files() {
        let entries = vec![
            TreeEntry::from(FileEntry::new("bar".into(), aa(), 1)),
            TreeEntry::from(FileEntry::new("baz".into(), bb(), 1)),
        ];
        let summary = summarize(entries);
        assert_eq!(
            summary.digest.to_string(),
            "2a5e7f8932a9736b1cdc730dcc1a2239"
        );
        assert_eq!(summary.size, 2);
        assert_eq!(summary.file_count, 2);
    }

    #[test]
    fn test_summarize_one_of_each() {
        let sub = DirSummary {
            digest: bb(),
            size: 1,
            file_count: 1,
        };
        let entries = vec![
            TreeEntry::from(FileEntry::new("baz".into(), aa(), 1)),
            TreeEntry::from(DirEntry::new("bar".into(), &sub)),
        ];
        let summary = summarize(entries);
        assert_eq!(
            summary.digest.to_string(),
            "807ad8a9256081f2b892e17c1405415c"
        );
        assert_eq!(summary.size, 2);
        assert_eq!(summary.file_count, 2);
    }

    #[test]
    fn test_summarize_order_independent() {
        let forward = vec![
            TreeEntry::from(FileEntry::new("bar".into(), aa(), 1)),
            TreeEntry::from(FileEntry::new("baz".into(), bb(), 1)),
        ];
        let mut backward = forward.clone();
        backward.reverse();
        assert_eq!(summarize(forward), summarize(backward));
    }

    #[test]
    fn test_size_changes_digest() {
        let small = summarize(vec![TreeEntry::from(FileEntry::new(
            "bar".into(),
            aa(),
            1,
        ))]);
        let large = summarize(vec![TreeEntry::from(FileEntry::new(
            "bar".into(),
            aa(),
            2,
        ))]);
        assert_ne!(small.digest, large.digest);
    }
}
