//! Little-endian byte builder used to author container bytes

use crate::guid::ShortGuid;
use glam::Vec3;

/// Growable little-endian buffer
#[derive(Debug, Default, Clone)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    /// Create an empty writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Current length
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.buf.push(v);
        self
    }

    pub fn u16(&mut self, v: u16) -> &mut Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn u32(&mut self, v: u32) -> &mut Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn i32(&mut self, v: i32) -> &mut Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn f32(&mut self, v: f32) -> &mut Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn vec3(&mut self, v: Vec3) -> &mut Self {
        self.f32(v.x).f32(v.y).f32(v.z)
    }

    pub fn guid(&mut self, g: ShortGuid) -> &mut Self {
        self.u32(g.to_u32())
    }

    pub fn bytes(&mut self, b: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(b);
        self
    }

    /// Write a `u32`-length-prefixed string
    pub fn lstring(&mut self, s: &str) -> &mut Self {
        self.u32(s.len() as u32).bytes(s.as_bytes())
    }

    /// Write a magic and version 1
    pub fn header(&mut self, magic: &[u8; 4]) -> &mut Self {
        self.bytes(magic).u32(1)
    }

    /// Overwrite a previously written `u32`
    pub fn patch_u32(&mut self, offset: usize, v: u32) {
        self.buf[offset..offset + 4].copy_from_slice(&v.to_le_bytes());
    }

    /// Take the finished bytes
    pub fn finish(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::ByteReader;

    #[test]
    fn test_writer_matches_reader() {
        let mut w = ByteWriter::new();
        w.header(b"RSRC").u32(0).lstring("BSP_TORRENS");
        let bytes = w.finish();

        let mut r = ByteReader::new("RESOURCES.BIN", &bytes);
        r.expect_header(b"RSRC").unwrap();
        assert_eq!(r.read_u32().unwrap(), 0);
        assert_eq!(r.read_lstring().unwrap(), "BSP_TORRENS");
    }
}
