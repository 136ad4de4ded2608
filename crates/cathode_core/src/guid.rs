//! 32-bit hash-derived identifiers

use core::fmt;
use sha2::{Digest, Sha256};

/// Identifier for composites, entities, parameter names and function types
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShortGuid(u32);

impl ShortGuid {
    /// The invalid/null GUID
    pub const INVALID: Self = Self(0);

    /// Create from the raw on-disk value
    #[inline]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Derive a GUID from a name
    pub fn from_name(name: &str) -> Self {
        let digest = Sha256::digest(name.as_bytes());
        Self(u32::from_le_bytes([digest[3], digest[2], digest[1], digest[0]]))
    }

    /// Raw value
    #[inline]
    pub const fn to_u32(self) -> u32 {
        self.0
    }

    /// Check against the invalid sentinel
    #[inline]
    pub const fn is_invalid(self) -> bool {
        self.0 == 0
    }

    /// `XX-XX-XX-XX` in on-disk byte order
    pub fn to_byte_string(self) -> String {
        let b = self.0.to_le_bytes();
        format!("{:02X}-{:02X}-{:02X}-{:02X}", b[0], b[1], b[2], b[3])
    }
}

impl From<u32> for ShortGuid {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Debug for ShortGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_invalid() {
            write!(f, "ShortGuid(invalid)")
        } else {
            write!(f, "ShortGuid({})", self.to_byte_string())
        }
    }
}

impl fmt::Display for ShortGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
