use crate::digest::Digest;
use crate::errors::SourceError;
use md5::{Digest as _, Md5};
use std::io;
use std::path::Path;
use tokio::io::AsyncReadExt;

pub(crate) fn md5_file<P: AsRef<Path>>(path: P) -> Result<Digest, SourceError> {
    let path = path.as_ref();
    let mut file = fs_err::File::open(path).map_err(|e| SourceError::digest_file(path, e))?;
    let mut hasher = Md5::new();
    io::copy(&mut file, &mut hasher).map_err(|e| SourceError::digest_file(path, e))?;
    Ok(Digest::finalize(hasher))
}

pub(crate) async fn async_md5_file<P: AsRef<Path>>(path: P) -> Result<Digest, SourceError> {
    let path = path.as_ref();
    let mut file = fs_err::tokio::File::open(path)
        .await
        .map_err(|e| SourceError::digest_file(path, e))?;
    let mut hasher = Md5::new();
    let mut buf = vec![0u8; 65536];
    loop {
        let n = file
            .read(&mut buf)
            .await
            .map_err(|e| SourceError::digest_file(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(Digest::finalize(hasher))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_md5_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"foo").unwrap();
        file.flush().unwrap();
        assert_eq!(
            md5_file(file.path()).unwrap().to_string(),
            "acbd18db4cc2f85cedef654fccc4a4d8"
        );
    }

    #[tokio::test]
    async fn test_async_md5_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"foo").unwrap();
        file.flush().unwrap();
        assert_eq!(
            async_md5_file(file.path()).await.unwrap().to_string(),
            "acbd18db4cc2f85cedef654fccc4a4d8"
        );
    }
}
