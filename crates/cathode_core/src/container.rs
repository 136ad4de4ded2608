//! Container - self-contained on-disk tables
//!
//! A container owns the full decode of one file. Loading reads the whole file,
//! hands a `ByteReader` to the decoder and rejects trailing bytes.

use crate::error::{Error, Result};
use crate::reader::ByteReader;
use crate::table::Table;
use std::io::ErrorKind;
use std::path::Path;

/// Trait for decodable level tables
pub trait Container: Sized + Send {
    /// File name used in diagnostics
    const NAME: &'static str;

    /// Decode the table from its bytes
    fn decode(reader: &mut ByteReader<'_>) -> Result<Self>;
}

/// Decode a container from an in-memory buffer
pub fn load_bytes<C: Container>(bytes: &[u8]) -> Result<C> {
    let mut reader = ByteReader::new(C::NAME, bytes);
    let value = C::decode(&mut reader)?;
    reader.expect_end()?;
    Ok(value)
}

/// Load a required container from disk
pub fn load<C: Container>(path: &Path) -> Result<C> {
    let bytes = std::fs::read(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            Error::MissingFile { path: path.to_path_buf() }
        } else {
            Error::Io { path: path.to_path_buf(), source }
        }
    })?;
    log::debug!("Decoding {} ({} bytes) from {}", C::NAME, bytes.len(), path.display());
    load_bytes(&bytes)
}

/// Load an optional container, tolerating a missing file
pub fn load_optional<C: Container>(path: &Path) -> Result<Table<C>> {
    match load::<C>(path) {
        Ok(value) => Ok(Table::Loaded(value)),
        Err(e) if e.is_tolerated() => {
            log::info!("Optional table {} not present at {}", C::NAME, path.display());
            Ok(Table::NotLoaded { path: path.to_path_buf() })
        }
        Err(e) => Err(e),
    }
}

/// Opaque table kept as raw bytes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawBlob(pub Vec<u8>);

impl RawBlob {
    /// Raw bytes
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Container for RawBlob {
    const NAME: &'static str = "BLOB";

    fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        Ok(RawBlob(reader.read_remaining().to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::LoadState;
    use std::io::Write;

    struct Pair(u32, u32);

    impl Container for Pair {
        const NAME: &'static str = "PAIR.BIN";

        fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
            Ok(Pair(reader.read_u32()?, reader.read_u32()?))
        }
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&2u32.to_le_bytes());
        let pair: Pair = load_bytes(&bytes).unwrap();
        assert_eq!((pair.0, pair.1), (1, 2));

        bytes.push(0);
        assert!(matches!(
            load_bytes::<Pair>(&bytes),
            Err(Error::MalformedContainer { container: "PAIR.BIN", .. })
        ));
    }

    #[test]
    fn test_missing_required_and_optional() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("PAIR.BIN");

        assert!(matches!(load::<Pair>(&path), Err(Error::MissingFile { .. })));

        let table = load_optional::<Pair>(&path).unwrap();
        assert_eq!(table.state(), LoadState::NotLoaded);

        // a present but broken optional table is not tolerated
        std::fs::write(&path, [1u8, 2]).unwrap();
        assert!(matches!(
            load_optional::<Pair>(&path),
            Err(Error::MalformedContainer { .. })
        ));
    }

    #[test]
    fn test_load_raw_blob() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("LIGHTS.BIN");
        std::fs::File::create(&path).unwrap().write_all(&[1, 2, 3]).unwrap();

        let table = load_optional::<RawBlob>(&path).unwrap();
        assert_eq!(table.get().map(RawBlob::len), Some(3));
    }
}
