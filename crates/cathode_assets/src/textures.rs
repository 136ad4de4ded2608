//! LEVEL_TEXTURES.ALL.PAK / GLOBAL_TEXTURES.ALL.PAK - texture tables
//!
//! Entries hold a high and a low resolution payload. Decoding prefers the
//! high resolution payload and falls back to the low one when it is empty.

use cathode_core::{ByteReader, Container, Error, Result};
use image::RgbaImage;

/// Pixel format of a texture payload
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    A32R32G32B32F,
    A16B16G16R16F,
    A8R8G8B8,
    X8R8G8B8,
    A8,
    L8,
    Dxt1,
    Dxt3,
    Dxt5,
    Dxn,
    Bc6h,
    Bc7,
    /// Legacy 24-bit BGR, never rendered
    R8G8B8,
}

impl TextureFormat {
    pub fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            0 => Self::A32R32G32B32F,
            1 => Self::A16B16G16R16F,
            2 => Self::A8R8G8B8,
            3 => Self::X8R8G8B8,
            4 => Self::A8,
            5 => Self::L8,
            6 => Self::Dxt1,
            7 => Self::Dxt3,
            8 => Self::Dxt5,
            9 => Self::Dxn,
            10 => Self::Bc6h,
            11 => Self::Bc7,
            12 => Self::R8G8B8,
            _ => return None,
        })
    }

    pub fn code(self) -> u32 {
        self as u32
    }

    /// Bytes per 4x4 block for block-compressed formats
    pub fn block_size(self) -> Option<usize> {
        match self {
            Self::Dxt1 => Some(8),
            Self::Dxt3 | Self::Dxt5 | Self::Dxn | Self::Bc6h | Self::Bc7 => Some(16),
            _ => None,
        }
    }

    /// Bytes per pixel for uncompressed formats
    pub fn bytes_per_pixel(self) -> Option<usize> {
        match self {
            Self::A32R32G32B32F => Some(16),
            Self::A16B16G16R16F => Some(8),
            Self::A8R8G8B8 | Self::X8R8G8B8 => Some(4),
            Self::R8G8B8 => Some(3),
            Self::A8 | Self::L8 => Some(1),
            _ => None,
        }
    }

    /// Byte size of the top mip of one face
    pub fn surface_size(self, width: u32, height: u32) -> usize {
        let (w, h) = (width as usize, height as usize);
        match (self.block_size(), self.bytes_per_pixel()) {
            (Some(block), _) => w.div_ceil(4).max(1) * h.div_ceil(4).max(1) * block,
            (None, Some(bpp)) => w * h * bpp,
            (None, None) => 0,
        }
    }
}

/// Texture dimensionality
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureKind {
    Texture2D,
    Cubemap,
    Unknown(u8),
}

impl TextureKind {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Texture2D,
            1 => Self::Cubemap,
            other => Self::Unknown(other),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Texture2D => 0,
            Self::Cubemap => 1,
            Self::Unknown(code) => code,
        }
    }

    fn faces(self) -> usize {
        match self {
            Self::Cubemap => 6,
            _ => 1,
        }
    }
}

/// One texture table entry
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextureEntry {
    pub name: String,
    /// Raw format code, checked when decoding
    pub format_code: u32,
    pub kind_code: u8,
    pub width: u16,
    pub height: u16,
    pub low_width: u16,
    pub low_height: u16,
    pub high: Vec<u8>,
    pub low: Vec<u8>,
}

/// Decoded pixel payload
#[derive(Clone, Debug, PartialEq)]
pub enum TexturePixels {
    /// 8-bit formats expanded to RGBA
    Rgba8(RgbaImage),
    /// Block-compressed, float and cubemap payloads passed through as stored
    Raw { format: TextureFormat, data: Vec<u8> },
}

/// Renderer-ready texture
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedTexture {
    pub name: String,
    pub kind: TextureKind,
    pub format: TextureFormat,
    pub width: u32,
    pub height: u32,
    /// Decoded from the low resolution payload
    pub low_res: bool,
    pub pixels: TexturePixels,
}

impl TextureEntry {
    pub fn kind(&self) -> TextureKind {
        TextureKind::from_code(self.kind_code)
    }

    /// Format, or `UnsupportedFormat` for unknown codes and 24-bit BGR
    pub fn format(&self) -> Result<TextureFormat> {
        match TextureFormat::from_code(self.format_code) {
            Some(TextureFormat::R8G8B8) => Err(Error::unsupported(
                "texture format",
                format!("{} is 24-bit BGR", self.name),
            )),
            Some(format) => Ok(format),
            None => Err(Error::unsupported(
                "texture format",
                format!("{} has format code {}", self.name, self.format_code),
            )),
        }
    }

    /// Decode the best available payload
    pub fn decode(&self) -> Result<DecodedTexture> {
        let format = self.format()?;
        let kind = self.kind();
        if let TextureKind::Unknown(code) = kind {
            return Err(Error::unsupported(
                "texture kind",
                format!("{} has kind code {}", self.name, code),
            ));
        }

        let (data, width, height, low_res) = if !self.high.is_empty() {
            (&self.high, self.width, self.height, false)
        } else if !self.low.is_empty() {
            (&self.low, self.low_width, self.low_height, true)
        } else {
            return Err(Error::unresolved("texture", format!("{} has no content", self.name)));
        };
        let (width, height) = (u32::from(width), u32::from(height));

        let surface = format.surface_size(width, height);
        let needed = surface * kind.faces();
        if surface == 0 || data.len() < needed {
            return Err(Error::unresolved(
                "texture",
                format!(
                    "{} needs {} bytes for {}x{} {:?}, has {}",
                    self.name,
                    needed,
                    width,
                    height,
                    format,
                    data.len()
                ),
            ));
        }

        let pixels = match (kind, format) {
            (TextureKind::Texture2D, TextureFormat::A8R8G8B8 | TextureFormat::X8R8G8B8 | TextureFormat::A8 | TextureFormat::L8) => {
                TexturePixels::Rgba8(expand_rgba(&data[..surface], width, height, format)?)
            }
            _ => TexturePixels::Raw {
                format,
                data: data[..needed].to_vec(),
            },
        };

        Ok(DecodedTexture {
            name: self.name.clone(),
            kind,
            format,
            width,
            height,
            low_res,
            pixels,
        })
    }
}

fn expand_rgba(data: &[u8], width: u32, height: u32, format: TextureFormat) -> Result<RgbaImage> {
    let rgba: Vec<u8> = match format {
        // stored as B, G, R, A
        TextureFormat::A8R8G8B8 => data
            .chunks_exact(4)
            .flat_map(|p| [p[2], p[1], p[0], p[3]])
            .collect(),
        TextureFormat::X8R8G8B8 => data
            .chunks_exact(4)
            .flat_map(|p| [p[2], p[1], p[0], 255])
            .collect(),
        TextureFormat::A8 => data.iter().flat_map(|&a| [255, 255, 255, a]).collect(),
        TextureFormat::L8 => data.iter().flat_map(|&l| [l, l, l, 255]).collect(),
        other => {
            return Err(Error::unsupported("texture format", format!("{:?} is not 8-bit", other)))
        }
    };
    RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| Error::unresolved("texture", format!("{}x{} buffer size mismatch", width, height)))
}

/// Decoded texture table
#[derive(Clone, Debug, Default)]
pub struct TextureTable {
    entries: Vec<TextureEntry>,
}

impl TextureTable {
    pub fn new(entries: Vec<TextureEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TextureEntry> {
        self.entries.get(index)
    }
}

impl Container for TextureTable {
    const NAME: &'static str = "TEXTURES.ALL.PAK";

    fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        reader.expect_header(b"TXTR")?;
        // empty name + fixed fields
        let count = reader.read_count(28)?;
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            let name = reader.read_lstring()?;
            let format_code = reader.read_u32()?;
            let kind_code = reader.read_u8()?;
            reader.skip(3)?;
            let width = reader.read_u16()?;
            let height = reader.read_u16()?;
            let low_width = reader.read_u16()?;
            let low_height = reader.read_u16()?;
            let high_len = reader.read_u32()? as usize;
            let low_len = reader.read_u32()? as usize;
            let high = reader.read_bytes(high_len)?.to_vec();
            let low = reader.read_bytes(low_len)?.to_vec();
            entries.push(TextureEntry {
                name,
                format_code,
                kind_code,
                width,
                height,
                low_width,
                low_height,
                high,
                low,
            });
        }
        Ok(Self { entries })
    }
}
