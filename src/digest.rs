use crate::errors::DigestParseError;
use md5::{Digest as _, Md5};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Width in bytes of all digests in a checksum tree, for both leaf contents
/// and directory serializations
pub const DIGEST_LEN: usize = 16;

/// A 128-bit MD5 digest
///
/// The same digest function is applied to leaf file contents and to the
/// canonical serializations of directories, so a directory digest is a
/// digest-of-digests all the way up to the root.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    /// Digest a byte string in one go
    pub fn of<B: AsRef<[u8]>>(bytes: B) -> Digest {
        Digest(Md5::digest(bytes.as_ref()).into())
    }

    /// The digest of the empty byte string, used as the sentinel digest for
    /// directories with no children
    pub fn empty() -> Digest {
        Digest::of(b"")
    }

    pub const fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Digest {
        Digest(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    pub(crate) fn finalize(hasher: Md5) -> Digest {
        Digest(hasher.finalize().into())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({self})")
    }
}

impl FromStr for Digest {
    type Err = DigestParseError;

    fn from_str(s: &str) -> Result<Digest, DigestParseError> {
        let mut buf = [0u8; DIGEST_LEN];
        hex::decode_to_slice(s, &mut buf).map_err(|_| DigestParseError(String::from(s)))?;
        Ok(Digest(buf))
    }
}

impl TryFrom<&str> for Digest {
    type Error = DigestParseError;

    fn try_from(s: &str) -> Result<Digest, DigestParseError> {
        s.parse()
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Digest, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_empty_is_md5_of_nothing() {
        assert_eq!(
            Digest::empty().to_string(),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
    }

    #[test]
    fn test_of() {
        assert_eq!(
            Digest::of("foo").to_string(),
            "acbd18db4cc2f85cedef654fccc4a4d8"
        );
    }

    #[test]
    fn test_roundtrip_str() {
        let s = "9e30a0a1a465e24220d4132fdd544634";
        let digest = s.parse::<Digest>().unwrap();
        assert_eq!(digest.to_string(), s);
        assert_eq!(format!("{digest:?}"), format!("Digest({s})"));
    }

    #[rstest]
    #[case("")]
    #[case("9e30a0a1")]
    #[case("9e30a0a1a465e24220d4132fdd5446345")]
    #[case("xe30a0a1a465e24220d4132fdd544634")]
    fn test_parse_err(#[case] s: &str) {
        assert!(s.parse::<Digest>().is_err());
    }

    #[test]
    fn test_serde() {
        let digest = "9e30a0a1a465e24220d4132fdd544634".parse::<Digest>().unwrap();
        let json = serde_json::to_string(&digest).unwrap();
        assert_eq!(json, r#""9e30a0a1a465e24220d4132fdd544634""#);
        assert_eq!(serde_json::from_str::<Digest>(&json).unwrap(), digest);
    }
}
