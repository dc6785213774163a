//! Local-filesystem array stores and the entries within
use crate::entrypath::{is_path_name, EntryPath};
use crate::errors::{EntryNameError, SourceError};
use crate::source::LeafRecord;
use crate::util::{async_md5_file, md5_file};
use log::debug;
use std::fmt;
use std::path::{Path, PathBuf};

/// Which directory entries a store listing should skip
///
/// Filtered names never become leaves, so they contribute nothing to any
/// digest, exactly as if the backend had never listed them.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct ListingFilter {
    excluded: Vec<String>,
    ignore_hidden: bool,
}

impl ListingFilter {
    pub fn new() -> ListingFilter {
        ListingFilter::default()
    }

    /// Skip any entry whose name equals `name` exactly
    #[must_use]
    pub fn exclude<S: Into<String>>(mut self, name: S) -> ListingFilter {
        self.excluded.push(name.into());
        self
    }

    /// Skip any entry whose name starts with a dot
    #[must_use]
    pub fn ignore_hidden(mut self, yes: bool) -> ListingFilter {
        self.ignore_hidden = yes;
        self
    }

    fn admits(&self, name: &str) -> bool {
        if self.ignore_hidden && name.starts_with('.') {
            return false;
        }
        !self.excluded.iter().any(|ex| ex == name)
    }
}

/// A hierarchically chunked array store rooted at a local directory
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ArrayStore {
    path: PathBuf,
    filter: ListingFilter,
}

impl ArrayStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<ArrayStore, SourceError> {
        ArrayStore::with_filter(path, ListingFilter::default())
    }

    pub fn with_filter<P: AsRef<Path>>(
        path: P,
        filter: ListingFilter,
    ) -> Result<ArrayStore, SourceError> {
        let path = path.as_ref();
        if !fs_err::metadata(path)
            .map_err(|e| SourceError::stat(path, e))?
            .is_dir()
        {
            return Err(SourceError::not_dir_root(path));
        }
        Ok(ArrayStore {
            path: path.into(),
            filter,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn root(&self) -> StoreDir {
        StoreDir {
            path: self.path.clone(),
            relpath: DirPath::Root,
            filter: self.filter.clone(),
        }
    }
}

/// A file inside an array store, not yet digested
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct StoreFile {
    path: PathBuf,
    relpath: EntryPath,
}

impl StoreFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn relpath(&self) -> &EntryPath {
        &self.relpath
    }

    /// Stat and digest the file, producing its leaf record
    pub fn to_leaf(&self) -> Result<LeafRecord, SourceError> {
        let size = fs_err::metadata(&self.path)
            .map_err(|e| SourceError::stat(&self.path, e))?
            .len();
        let digest = md5_file(&self.path)?;
        debug!("Computed digest for file {}: {digest}", self.relpath);
        Ok(LeafRecord::new(self.relpath.clone(), size, digest))
    }

    pub async fn to_leaf_async(&self) -> Result<LeafRecord, SourceError> {
        let size = fs_err::tokio::metadata(&self.path)
            .await
            .map_err(|e| SourceError::stat(&self.path, e))?
            .len();
        let digest = async_md5_file(&self.path).await?;
        debug!("Computed digest for file {}: {digest}", self.relpath);
        Ok(LeafRecord::new(self.relpath.clone(), size, digest))
    }
}

/// A directory inside an array store (possibly the root)
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct StoreDir {
    path: PathBuf,
    relpath: DirPath,
    filter: ListingFilter,
}

impl StoreDir {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn relpath(&self) -> &DirPath {
        &self.relpath
    }

    /// Iterate over the directory's direct entries, applying the store's
    /// listing filter
    pub fn entries(&self) -> Result<Entries, SourceError> {
        let handle =
            fs_err::read_dir(&self.path).map_err(|e| SourceError::readdir(&self.path, e))?;
        Ok(Entries {
            handle,
            basepath: self.path.clone(),
            baserelpath: self.relpath.clone(),
            filter: self.filter.clone(),
        })
    }

    /// Collect the directory's direct entries without blocking the runtime
    pub async fn entries_async(&self) -> Result<Vec<StoreEntry>, SourceError> {
        let mut entries = Vec::new();
        let mut handle = fs_err::tokio::read_dir(&self.path)
            .await
            .map_err(|e| SourceError::readdir(&self.path, e))?;
        loop {
            let p = match handle.next_entry().await {
                Ok(Some(p)) => p,
                Ok(None) => break,
                Err(e) => return Err(SourceError::readdir(&self.path, e)),
            };
            let path = p.path();
            let Some(name) = p.file_name().to_str().map(String::from) else {
                return Err(SourceError::undecodable_name(path));
            };
            if !self.filter.admits(&name) {
                continue;
            }
            let ftype = p
                .file_type()
                .await
                .map_err(|e| SourceError::stat(&path, e))?;
            let is_dir = ftype.is_dir()
                || (ftype.is_symlink()
                    && fs_err::tokio::metadata(&path)
                        .await
                        .map_err(|e| SourceError::stat(&path, e))?
                        .is_dir());
            entries.push(make_entry(&self.relpath, &self.filter, path, &name, is_dir));
        }
        Ok(entries)
    }
}

/// Iterator over the filtered direct entries of a [`StoreDir`]
#[derive(Debug)]
pub struct Entries {
    handle: fs_err::ReadDir,
    basepath: PathBuf,
    baserelpath: DirPath,
    filter: ListingFilter,
}

impl Entries {
    fn process_direntry(&self, p: &fs_err::DirEntry) -> Result<Option<StoreEntry>, SourceError> {
        let path = p.path();
        let Some(name) = p.file_name().to_str().map(String::from) else {
            return Err(SourceError::undecodable_name(path));
        };
        if !self.filter.admits(&name) {
            return Ok(None);
        }
        let ftype = p.file_type().map_err(|e| SourceError::stat(&path, e))?;
        let is_dir = ftype.is_dir()
            || (ftype.is_symlink()
                && fs_err::metadata(&path)
                    .map_err(|e| SourceError::stat(&path, e))?
                    .is_dir());
        Ok(Some(make_entry(
            &self.baserelpath,
            &self.filter,
            path,
            &name,
            is_dir,
        )))
    }
}

impl Iterator for Entries {
    type Item = Result<StoreEntry, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.handle.next()? {
                Ok(p) => match self.process_direntry(&p) {
                    Ok(Some(entry)) => return Some(Ok(entry)),
                    Ok(None) => (),
                    Err(e) => return Some(Err(e)),
                },
                Err(e) => return Some(Err(SourceError::readdir(&self.basepath, e))),
            }
        }
    }
}

fn make_entry(
    baserelpath: &DirPath,
    filter: &ListingFilter,
    path: PathBuf,
    name: &str,
    is_dir: bool,
) -> StoreEntry {
    let relpath = baserelpath
        .child(name)
        .expect("DirEntry name should not be . or .. nor contain /");
    if is_dir {
        StoreEntry::Directory(StoreDir {
            path,
            relpath: relpath.into(),
            filter: filter.clone(),
        })
    } else {
        StoreEntry::File(StoreFile { path, relpath })
    }
}

/// Either entry of a store directory
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum StoreEntry {
    File(StoreFile),
    Directory(StoreDir),
}

impl From<StoreFile> for StoreEntry {
    fn from(f: StoreFile) -> StoreEntry {
        StoreEntry::File(f)
    }
}

impl From<StoreDir> for StoreEntry {
    fn from(d: StoreDir) -> StoreEntry {
        StoreEntry::Directory(d)
    }
}

/// The relative path of a store directory: either the root itself or a
/// proper [`EntryPath`] beneath it
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum DirPath {
    Root,
    Path(EntryPath),
}

impl DirPath {
    pub fn child(&self, name: &str) -> Result<EntryPath, EntryNameError> {
        match self {
            DirPath::Root if is_path_name(name) => {
                Ok(name.parse().expect("name was just validated"))
            }
            DirPath::Path(ep) => ep.join(name),
            DirPath::Root => Err(EntryNameError(String::from(name))),
        }
    }
}

impl fmt::Display for DirPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirPath::Root => f.write_str("<root>"),
            DirPath::Path(ep) => <EntryPath as fmt::Display>::fmt(ep, f),
        }
    }
}

impl From<EntryPath> for DirPath {
    fn from(ep: EntryPath) -> DirPath {
        DirPath::Path(ep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_dirpath_child() {
        assert_eq!(DirPath::Root.child("foo").unwrap().to_string(), "foo");
        let sub = DirPath::from("foo/bar".parse::<EntryPath>().unwrap());
        assert_eq!(sub.child("baz").unwrap().to_string(), "foo/bar/baz");
        assert!(DirPath::Root.child("..").is_err());
    }

    #[rstest]
    #[case("foo", true)]
    #[case(".hidden", true)]
    #[case("skipme", false)]
    fn test_filter_exclude(#[case] name: &str, #[case] admitted: bool) {
        let filter = ListingFilter::new().exclude("skipme");
        assert_eq!(filter.admits(name), admitted);
    }

    #[rstest]
    #[case("foo", true)]
    #[case(".hidden", false)]
    #[case(".zarray", false)]
    fn test_filter_hidden(#[case] name: &str, #[case] admitted: bool) {
        let filter = ListingFilter::new().ignore_hidden(true);
        assert_eq!(filter.admits(name), admitted);
    }

    #[test]
    fn test_store_root_not_dir() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(
            ArrayStore::new(file.path()),
            Err(SourceError::NotDirRoot { .. })
        ));
    }
}
