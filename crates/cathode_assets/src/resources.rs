//! RESOURCES.BIN - which composite instance owns each resource

use cathode_core::{ByteReader, Container, Result, ShortGuid};
use std::collections::HashMap;

/// One resource usage record
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceUsage {
    pub composite_instance: ShortGuid,
    pub resource: ShortGuid,
    pub index: i32,
}

/// Decoded RESOURCES.BIN
#[derive(Clone, Debug, Default)]
pub struct ResourceUsages {
    entries: Vec<ResourceUsage>,
    by_resource: HashMap<ShortGuid, usize>,
}

impl ResourceUsages {
    pub fn entries(&self) -> &[ResourceUsage] {
        &self.entries
    }

    /// First usage of a resource GUID
    pub fn find_usage(&self, resource: ShortGuid) -> Option<&ResourceUsage> {
        self.by_resource.get(&resource).and_then(|&i| self.entries.get(i))
    }
}

impl Container for ResourceUsages {
    const NAME: &'static str = "RESOURCES.BIN";

    fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        reader.expect_header(b"RSRC")?;
        let count = reader.read_count(12)?;
        let mut entries = Vec::with_capacity(count);
        let mut by_resource = HashMap::with_capacity(count);
        for i in 0..count {
            let usage = ResourceUsage {
                composite_instance: reader.read_guid()?,
                resource: reader.read_guid()?,
                index: reader.read_i32()?,
            };
            by_resource.entry(usage.resource).or_insert(i);
            entries.push(usage);
        }
        Ok(Self { entries, by_resource })
    }
}
