use std::fs::{create_dir_all, File};
use std::io::Write;
use std::num::NonZeroUsize;
use std::path::Path;
use tempfile::{tempdir, TempDir};
use zarr_checksum::{
    depth_first_checksum, fastasync_checksum, fastio_checksum, source_checksum, ArrayStore,
    ListingFilter,
};

const FULL_CHECKSUM: &str = "ee1c12edbdf4f61aa1e31f8dc1633f05-6--80";
const FILTERED_CHECKSUM: &str = "1c8d7eb949dd0137b64fd82779df21b9-4--58";
const NO_HIDDEN_CHECKSUM: &str = "11b9ab3e99e2866ce7609f1e4baaa08c-4--51";
const EMPTY_CHECKSUM: &str = "d41d8cd98f00b204e9800998ecf8427e-0--0";

fn write_file(dirpath: &Path, relpath: &str, contents: &[u8]) {
    let path = dirpath.join(relpath);
    create_dir_all(path.parent().unwrap()).unwrap();
    File::create(path).unwrap().write_all(contents).unwrap();
}

fn sample_store() -> TempDir {
    let dir = tempdir().unwrap();
    write_file(dir.path(), ".zgroup", br#"{"zarr_format":2}"#);
    write_file(dir.path(), "arr_0/0", b"chunk-0-data");
    write_file(dir.path(), "arr_0/1", b"chunk-1-data");
    write_file(dir.path(), "arr_1/0", b"lorem ipsum dolor");
    write_file(dir.path(), "arr_1/.hidden", b"hidden stuff");
    write_file(dir.path(), "junk.txt", b"exclude me");
    dir
}

/// Same leaves as [`sample_store()`] plus directories containing no files;
/// walkers only produce leaf records, so the manifest must not change
fn sample_store_with_empty_dirs() -> TempDir {
    let dir = sample_store();
    create_dir_all(dir.path().join("arr_2")).unwrap();
    create_dir_all(dir.path().join("arr_3").join("foo")).unwrap();
    dir
}

fn threads() -> NonZeroUsize {
    NonZeroUsize::new(4).unwrap()
}

#[test]
fn test_depth_first_checksum() {
    let dir = sample_store();
    let store = ArrayStore::new(dir.path()).unwrap();
    assert_eq!(
        depth_first_checksum(&store).unwrap().to_string(),
        FULL_CHECKSUM
    );
}

#[test]
fn test_depth_first_checksum_empty_dirs() {
    let dir = sample_store_with_empty_dirs();
    let store = ArrayStore::new(dir.path()).unwrap();
    assert_eq!(
        depth_first_checksum(&store).unwrap().to_string(),
        FULL_CHECKSUM
    );
}

#[test]
fn test_depth_first_checksum_empty_store() {
    let dir = tempdir().unwrap();
    let store = ArrayStore::new(dir.path()).unwrap();
    assert_eq!(
        depth_first_checksum(&store).unwrap().to_string(),
        EMPTY_CHECKSUM
    );
}

#[test]
fn test_depth_first_checksum_excluded() {
    let dir = sample_store();
    let filter = ListingFilter::new().exclude("junk.txt").exclude(".hidden");
    let store = ArrayStore::with_filter(dir.path(), filter).unwrap();
    assert_eq!(
        depth_first_checksum(&store).unwrap().to_string(),
        FILTERED_CHECKSUM
    );
}

#[test]
fn test_depth_first_checksum_ignore_hidden() {
    let dir = sample_store();
    let filter = ListingFilter::new().ignore_hidden(true);
    let store = ArrayStore::with_filter(dir.path(), filter).unwrap();
    assert_eq!(
        depth_first_checksum(&store).unwrap().to_string(),
        NO_HIDDEN_CHECKSUM
    );
}

#[test]
fn test_source_checksum() {
    let dir = sample_store();
    let store = ArrayStore::new(dir.path()).unwrap();
    assert_eq!(source_checksum(&store).unwrap().to_string(), FULL_CHECKSUM);
}

#[test]
fn test_fastio_checksum() {
    let dir = sample_store();
    let store = ArrayStore::new(dir.path()).unwrap();
    assert_eq!(
        fastio_checksum(&store, threads()).unwrap().to_string(),
        FULL_CHECKSUM
    );
}

#[test]
fn test_fastio_checksum_single_thread() {
    let dir = sample_store();
    let store = ArrayStore::new(dir.path()).unwrap();
    assert_eq!(
        fastio_checksum(&store, NonZeroUsize::new(1).unwrap())
            .unwrap()
            .to_string(),
        FULL_CHECKSUM
    );
}

#[test]
fn test_fastio_checksum_empty_dirs() {
    let dir = sample_store_with_empty_dirs();
    let store = ArrayStore::new(dir.path()).unwrap();
    assert_eq!(
        fastio_checksum(&store, threads()).unwrap().to_string(),
        FULL_CHECKSUM
    );
}

#[test]
fn test_fastio_checksum_empty_store() {
    let dir = tempdir().unwrap();
    let store = ArrayStore::new(dir.path()).unwrap();
    assert_eq!(
        fastio_checksum(&store, threads()).unwrap().to_string(),
        EMPTY_CHECKSUM
    );
}

#[test]
fn test_fastio_checksum_excluded() {
    let dir = sample_store();
    let filter = ListingFilter::new().exclude("junk.txt").exclude(".hidden");
    let store = ArrayStore::with_filter(dir.path(), filter).unwrap();
    assert_eq!(
        fastio_checksum(&store, threads()).unwrap().to_string(),
        FILTERED_CHECKSUM
    );
}

// The fastasync workers block on the job stack, so these tests need a
// runtime with at least one thread per worker

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_fastasync_checksum() {
    let dir = sample_store();
    let store = ArrayStore::new(dir.path()).unwrap();
    assert_eq!(
        fastasync_checksum(&store, 4).await.unwrap().to_string(),
        FULL_CHECKSUM
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_fastasync_checksum_empty_dirs() {
    let dir = sample_store_with_empty_dirs();
    let store = ArrayStore::new(dir.path()).unwrap();
    assert_eq!(
        fastasync_checksum(&store, 4).await.unwrap().to_string(),
        FULL_CHECKSUM
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_fastasync_checksum_empty_store() {
    let dir = tempdir().unwrap();
    let store = ArrayStore::new(dir.path()).unwrap();
    assert_eq!(
        fastasync_checksum(&store, 4).await.unwrap().to_string(),
        EMPTY_CHECKSUM
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_fastasync_checksum_excluded() {
    let dir = sample_store();
    let filter = ListingFilter::new().exclude("junk.txt").exclude(".hidden");
    let store = ArrayStore::with_filter(dir.path(), filter).unwrap();
    assert_eq!(
        fastasync_checksum(&store, 4).await.unwrap().to_string(),
        FILTERED_CHECKSUM
    );
}

#[test]
fn test_all_strategies_agree() {
    let dir = sample_store_with_empty_dirs();
    let store = ArrayStore::new(dir.path()).unwrap();
    let walked = depth_first_checksum(&store).unwrap();
    assert_eq!(fastio_checksum(&store, threads()).unwrap(), walked);
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(8)
        .enable_all()
        .build()
        .unwrap();
    assert_eq!(rt.block_on(fastasync_checksum(&store, 4)).unwrap(), walked);
}
