//! REDS.BIN - flat renderable-element table

use cathode_core::{ByteReader, Container, Error, Result};

const RECORD_SIZE: usize = 26;

/// Model/material pair drawn by a renderable instance
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderableElement {
    /// Flattened submesh ordinal in LEVEL_MODELS.PAK
    pub model_index: i32,
    /// Material table index, -1 for the submesh default
    pub material_index: i32,
}

impl RenderableElement {
    /// Whether the element defers to the submesh's embedded material
    pub fn uses_default_material(&self) -> bool {
        self.material_index == -1
    }
}

/// Decoded REDS.BIN
#[derive(Clone, Debug, Default)]
pub struct RenderableElements {
    elements: Vec<RenderableElement>,
}

impl RenderableElements {
    pub fn new(elements: Vec<RenderableElement>) -> Self {
        Self { elements }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Contiguous run of `count` elements starting at `index`
    ///
    /// Ranges that do not fit fail with `OutOfBounds`, never truncate.
    pub fn get_elements(&self, index: i32, count: i32) -> Result<&[RenderableElement]> {
        let out_of_bounds = || Error::OutOfBounds {
            table: "REDS.BIN",
            index: index as i64,
            count: count as i64,
            len: self.elements.len(),
        };
        let start = usize::try_from(index).map_err(|_| out_of_bounds())?;
        let len = usize::try_from(count).map_err(|_| out_of_bounds())?;
        let end = start.checked_add(len).ok_or_else(out_of_bounds)?;
        self.elements.get(start..end).ok_or_else(out_of_bounds)
    }
}

impl Container for RenderableElements {
    const NAME: &'static str = "REDS.BIN";

    fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        let count = reader.read_count(RECORD_SIZE)?;
        if reader.remaining() != count * RECORD_SIZE {
            return Err(reader.error(format!(
                "{} records need {} bytes, file has {}",
                count,
                count * RECORD_SIZE,
                reader.remaining()
            )));
        }

        let mut elements = Vec::with_capacity(count);
        for _ in 0..count {
            reader.skip(4)?;
            let model_index = reader.read_i32()?;
            reader.skip(5)?;
            let material_index = reader.read_i32()?;
            reader.skip(9)?;
            elements.push(RenderableElement {
                model_index,
                material_index,
            });
        }
        Ok(Self { elements })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::encode_reds;
    use cathode_core::load_bytes;

    fn table() -> RenderableElements {
        let elements: Vec<_> = (0..4)
            .map(|i| RenderableElement { model_index: i, material_index: 10 + i })
            .collect();
        load_bytes(&encode_reds(&elements)).unwrap()
    }

    #[test]
    fn test_get_elements_exact_run() {
        let reds = table();
        let run = reds.get_elements(1, 2).unwrap();
        assert_eq!(run.len(), 2);
        assert_eq!(run[0].model_index, 1);
        assert_eq!(run[1].material_index, 12);
        assert_eq!(reds.get_elements(0, 4).unwrap().len(), 4);
        assert_eq!(reds.get_elements(4, 0).unwrap().len(), 0);
    }

    #[test]
    fn test_get_elements_out_of_bounds() {
        let reds = table();
        for (index, count) in [(3, 2), (5, 0), (-1, 1), (0, -1), (i32::MAX, i32::MAX)] {
            assert!(matches!(reds.get_elements(index, count), Err(Error::OutOfBounds { .. })));
        }
    }

    #[test]
    fn test_length_must_match_count() {
        let mut bytes = encode_reds(&[RenderableElement { model_index: 0, material_index: -1 }]);
        bytes.push(0);
        assert!(matches!(
            load_bytes::<RenderableElements>(&bytes),
            Err(Error::MalformedContainer { container: "REDS.BIN", .. })
        ));
    }
}
