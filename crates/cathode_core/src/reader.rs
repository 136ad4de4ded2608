//! Bounds-checked little-endian reader over container bytes
//!
//! Every read either succeeds or fails with `MalformedContainer` naming the
//! container and the byte offset, so decoders can use `?` throughout.

use crate::error::{Error, Result};
use crate::guid::ShortGuid;
use glam::{Vec3, Vec4};

/// Cursor over a container's bytes
#[derive(Clone)]
pub struct ByteReader<'a> {
    container: &'static str,
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Create a reader at offset zero
    pub fn new(container: &'static str, data: &'a [u8]) -> Self {
        Self { container, data, pos: 0 }
    }

    /// Container name used in error messages
    pub fn container(&self) -> &'static str {
        self.container
    }

    /// Current byte offset
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total length of the underlying data
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the underlying data is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes left after the cursor
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Build a `MalformedContainer` error at the current offset
    pub fn error(&self, reason: impl Into<String>) -> Error {
        Error::malformed(self.container, self.pos, reason)
    }

    /// Move the cursor to an absolute offset
    pub fn seek(&mut self, offset: usize) -> Result<()> {
        if offset > self.data.len() {
            return Err(self.error(format!(
                "seek to {} past end ({} bytes)",
                offset,
                self.data.len()
            )));
        }
        self.pos = offset;
        Ok(())
    }

    /// Skip `n` bytes
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.read_bytes(n).map(|_| ())
    }

    /// Read `n` raw bytes
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| self.error(format!("need {} bytes, {} left", n, self.remaining())))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    /// Read everything after the cursor
    pub fn read_remaining(&mut self) -> &'a [u8] {
        let slice = &self.data[self.pos.min(self.data.len())..];
        self.pos = self.data.len();
        slice
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Read a `u8`
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Read a little-endian `u16`
    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    /// Read a little-endian `u32`
    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// Read a little-endian `i32`
    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    /// Read a little-endian IEEE-754 `f32`
    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    /// Read three consecutive `f32`s
    pub fn read_vec3(&mut self) -> Result<Vec3> {
        Ok(Vec3::new(self.read_f32()?, self.read_f32()?, self.read_f32()?))
    }

    /// Read four consecutive `f32`s
    pub fn read_vec4(&mut self) -> Result<Vec4> {
        Ok(Vec4::new(
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
        ))
    }

    /// Read a `ShortGuid`
    pub fn read_guid(&mut self) -> Result<ShortGuid> {
        self.read_u32().map(ShortGuid::new)
    }

    /// Read a `u32`-length-prefixed UTF-8 string
    pub fn read_lstring(&mut self) -> Result<String> {
        let len = self.read_u32()? as usize;
        let start = self.pos;
        let bytes = self.read_bytes(len)?;
        core::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|e| Error::malformed(self.container, start, format!("invalid UTF-8: {}", e)))
    }

    /// Read and check a 4-byte magic followed by a `u32` version of 1
    pub fn expect_header(&mut self, magic: &[u8; 4]) -> Result<()> {
        let found = self.read_array::<4>()?;
        if &found != magic {
            self.pos -= 4;
            return Err(self.error(format!(
                "bad magic {:?}, expected {:?}",
                String::from_utf8_lossy(&found),
                String::from_utf8_lossy(magic)
            )));
        }
        let version = self.read_u32()?;
        if version != 1 {
            return Err(self.error(format!("unsupported version {}", version)));
        }
        Ok(())
    }

    /// Read a record count and check `count * record_size` bytes are available
    pub fn read_count(&mut self, record_size: usize) -> Result<usize> {
        let count = self.read_u32()? as usize;
        let needed = count.saturating_mul(record_size);
        if needed > self.remaining() {
            return Err(self.error(format!(
                "declared {} records of {} bytes, only {} bytes left",
                count,
                record_size,
                self.remaining()
            )));
        }
        Ok(count)
    }

    /// Fail if bytes remain after the last record
    pub fn expect_end(&self) -> Result<()> {
        if self.remaining() != 0 {
            return Err(self.error(format!("{} trailing bytes", self.remaining())));
        }
        Ok(())
    }

    /// Read an `f32` at an absolute offset without moving the cursor
    pub fn f32_at(&self, offset: usize) -> Result<f32> {
        let mut at = self.clone();
        at.seek(offset)?;
        at.read_f32()
    }

    /// Read a `Vec4` at an absolute offset without moving the cursor
    pub fn vec4_at(&self, offset: usize) -> Result<Vec4> {
        let mut at = self.clone();
        at.seek(offset)?;
        at.read_vec4()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_reads() {
        let mut data = Vec::new();
        data.extend_from_slice(&7u32.to_le_bytes());
        data.extend_from_slice(&(-1i32).to_le_bytes());
        data.extend_from_slice(&1.5f32.to_le_bytes());
        data.extend_from_slice(&3u32.to_le_bytes());
        data.extend_from_slice(b"abc");

        let mut r = ByteReader::new("TEST", &data);
        assert_eq!(r.read_u32().unwrap(), 7);
        assert_eq!(r.read_i32().unwrap(), -1);
        assert_eq!(r.read_f32().unwrap(), 1.5);
        assert_eq!(r.read_lstring().unwrap(), "abc");
        assert!(r.expect_end().is_ok());
    }

    #[test]
    fn test_short_read_is_malformed() {
        let data = [1u8, 2];
        let mut r = ByteReader::new("TEST", &data);
        match r.read_u32() {
            Err(Error::MalformedContainer { container, offset, .. }) => {
                assert_eq!(container, "TEST");
                assert_eq!(offset, 0);
            }
            other => panic!("expected malformed, got {:?}", other),
        }
    }

    #[test]
    fn test_count_checks_remaining() {
        let mut data = Vec::new();
        data.extend_from_slice(&100u32.to_le_bytes());
        data.extend_from_slice(&[0u8; 8]);
        let mut r = ByteReader::new("TEST", &data);
        assert!(r.read_count(4).is_err());
    }

    #[test]
    fn test_random_access_is_pure() {
        let mut data = Vec::new();
        for v in [0.0f32, 1.0, 2.0, 3.0, 4.0] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        let r = ByteReader::new("TEST", &data);
        assert_eq!(r.f32_at(8).unwrap(), 2.0);
        assert_eq!(r.f32_at(8).unwrap(), 2.0);
        assert_eq!(r.vec4_at(4).unwrap(), Vec4::new(1.0, 2.0, 3.0, 4.0));
        assert!(r.vec4_at(8).is_err());
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn test_header() {
        let mut data = b"MDLS".to_vec();
        data.extend_from_slice(&1u32.to_le_bytes());
        assert!(ByteReader::new("TEST", &data).expect_header(b"MDLS").is_ok());
        assert!(ByteReader::new("TEST", &data).expect_header(b"MTLS").is_err());
    }
}
