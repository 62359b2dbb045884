//! Loading textures whose mips are spread over several resources.
//!
//! A texture `textures/rock.ddsc` starts with an [`AvtxHeader`] followed by its resident mips, the coarsest ones.
//! The finer mips live in streaming resources next to it (`textures/rock.hmddsc`, `textures/rock.atx1`, ...).
//! Each streaming resource continues where the previous one stopped, supplying the next finer missing mip, until
//! it runs out of bytes.

use apex_vfs::error::Error as IndexError;
use apex_vfs::AssetIndex;
use binrw::BinRead;
use std::io::{Cursor, Read};
use tracing::{debug, instrument, trace, warn};

use crate::codec::{PixelCodec, Raster};
use crate::error::{Error, Result};
use crate::header::{AvtxHeader, AVTX_HEADER_LEN};

/// Extension of the base resource
pub const BASE_EXTENSION: &str = "ddsc";

/// Maximum number of `.atxN` resources
pub const MAX_ATX: usize = 15;

/// Extensions of the streaming resources, in the order they are consulted
pub fn streaming_extensions() -> impl Iterator<Item = String> {
    std::iter::once("hmddsc".to_string()).chain((1..=MAX_ATX).map(|i| format!("atx{i}")))
}

/// Whether `extension` belongs to a raw texture resource
pub fn is_texture_resource(extension: &str) -> bool {
    extension == BASE_EXTENSION
        || extension == "atx"
        || streaming_extensions().any(|e| e == extension)
}

/// Logical path without a texture resource extension
pub fn texture_stem(path: &str) -> &str {
    match path.rsplit_once('.') {
        Some((stem, extension)) if !extension.contains('/') && is_texture_resource(extension) => {
            stem
        }
        _ => path,
    }
}

/// Where the bytes of a mip are stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MipSource {
    /// Logical path of the resource
    pub resource: String,
    /// Position of the mip among the mips of that resource
    pub ordinal: usize,
}

/// A single mip of a single depth slice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MipDescriptor {
    /// Mip level, `0` is full resolution
    pub level: u32,
    pub width: u32,
    pub height: u32,
    pub depth_index: u32,
    pub pixel_format: u32,
    /// Size of the raw pixel data
    pub raw_len: usize,
    /// The resource this mip was loaded from
    pub source: Option<MipSource>,
    pub raw_bytes: Option<Vec<u8>>,
    pub decoded_raster: Option<Raster>,
}

impl MipDescriptor {
    /// Whether the mip has any pixels at all
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A texture and everything that is known about its mips
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureDescriptor {
    /// Logical path of the base resource
    pub path: String,
    pub width0: u32,
    pub height0: u32,
    pub depth_count: u32,
    pub pixel_format: u32,
    pub declared_mip_count: u32,
    pub resident_mip_count: u32,
    /// Every mip, full resolution first with depth slices next to each other
    pub mips: Vec<MipDescriptor>,
    /// The header of the base resource, verbatim
    pub header_prefix: Vec<u8>,
    /// Resources which supplied mips, in the order they were consulted
    pub resources: Vec<String>,
}

impl TextureDescriptor {
    /// Parse the header of the base resource and lay out the mip chain.
    pub fn from_header<C: PixelCodec + ?Sized>(path: &str, data: &[u8], codec: &C) -> Result<Self> {
        if data.len() < AVTX_HEADER_LEN {
            return Err(Error::InsufficientData {
                resource: path.to_string(),
                expected: AVTX_HEADER_LEN,
                actual: data.len(),
            });
        }

        let header = AvtxHeader::read(&mut Cursor::new(data))
            .map_err(|_| Error::NotATexture(path.to_string()))?;

        let depth = header.depth as u32;
        let mut mips = Vec::with_capacity(header.declared_mips as usize * depth as usize);
        let (mut width, mut height) = (header.width as u32, header.height as u32);
        for level in 0..header.declared_mips as u32 {
            for depth_index in 0..depth {
                let raw_len = match width == 0 || height == 0 {
                    true => 0,
                    false => codec.raw_size(header.pixel_format, width, height)?,
                };

                mips.push(MipDescriptor {
                    level,
                    width,
                    height,
                    depth_index,
                    pixel_format: header.pixel_format,
                    raw_len,
                    source: None,
                    raw_bytes: None,
                    decoded_raster: None,
                });
            }

            width /= 2;
            height /= 2;
        }

        Ok(TextureDescriptor {
            path: path.to_string(),
            width0: header.width as u32,
            height0: header.height as u32,
            depth_count: depth,
            pixel_format: header.pixel_format,
            declared_mip_count: header.declared_mips as u32,
            resident_mip_count: header.resident_mips as u32,
            mips,
            header_prefix: data[..AVTX_HEADER_LEN].to_vec(),
            resources: Vec::new(),
        })
    }

    /// Load the resident mips which follow the header of the base resource.
    #[instrument(skip(self, data), err)]
    pub fn load_base(&mut self, resource: &str, data: &[u8]) -> Result<()> {
        let missing = self.declared_mip_count.saturating_sub(self.resident_mip_count);
        let first = (missing * self.depth_count) as usize;

        let mut reader = data.get(AVTX_HEADER_LEN..).unwrap_or_default();
        let mut ordinal = 0;
        for mip in self.mips.iter_mut().skip(first) {
            if mip.is_empty() {
                break;
            }

            let raw = read_up_to(&mut reader, mip.raw_len)?;
            if raw.len() < mip.raw_len {
                return Err(Error::InsufficientData {
                    resource: resource.to_string(),
                    expected: mip.raw_len,
                    actual: raw.len(),
                });
            }

            trace!(level = mip.level, depth = mip.depth_index, ordinal, "resident mip");
            mip.source = Some(MipSource {
                resource: resource.to_string(),
                ordinal,
            });
            mip.raw_bytes = Some(raw);
            ordinal += 1;
        }

        self.resources.push(resource.to_string());
        Ok(())
    }

    /// Load the next finer mips from a streaming resource.
    ///
    /// Returns the number of mips the resource supplied. Running out of bytes right at a mip boundary is expected,
    /// the remaining mips are expected in the next resource.
    #[instrument(skip(self, reader), err)]
    pub fn load_streaming<R: Read>(&mut self, resource: &str, mut reader: R) -> Result<usize> {
        let first_loaded = self
            .mips
            .iter()
            .position(|m| m.raw_bytes.is_some())
            .unwrap_or(self.mips.len());

        let mut ordinal = 0;
        for mip in self.mips[..first_loaded].iter_mut().rev() {
            if mip.is_empty() {
                break;
            }

            let raw = read_up_to(&mut reader, mip.raw_len)?;
            if raw.is_empty() {
                break;
            }
            if raw.len() < mip.raw_len {
                return Err(Error::InsufficientData {
                    resource: resource.to_string(),
                    expected: mip.raw_len,
                    actual: raw.len(),
                });
            }

            trace!(level = mip.level, depth = mip.depth_index, ordinal, "streamed mip");
            mip.source = Some(MipSource {
                resource: resource.to_string(),
                ordinal,
            });
            mip.raw_bytes = Some(raw);
            ordinal += 1;
        }

        if ordinal > 0 {
            self.resources.push(resource.to_string());
        }
        Ok(ordinal)
    }

    /// Decode every loaded mip into an RGBA raster.
    pub fn decode<C: PixelCodec + ?Sized>(&mut self, codec: &C) -> Result<()> {
        for mip in self.mips.iter_mut() {
            if let Some(raw) = &mip.raw_bytes {
                mip.decoded_raster =
                    Some(codec.decode(raw, mip.width, mip.height, mip.pixel_format)?);
            }
        }
        Ok(())
    }

    /// Mips whose bytes have been loaded, in list order
    pub fn loaded_mips(&self) -> impl Iterator<Item = &MipDescriptor> {
        self.mips.iter().filter(|m| m.raw_bytes.is_some())
    }
}

/// Load a texture and all of its streaming resources from `index`.
///
/// `path` may name the base resource or any of the streaming resources.
#[instrument(skip(index, codec), err)]
pub fn load<I, C>(index: &I, path: &str, codec: &C) -> Result<TextureDescriptor>
where
    I: AssetIndex + ?Sized,
    C: PixelCodec + ?Sized,
{
    let stem = texture_stem(path);
    let base = if stem == path {
        path.to_string()
    } else {
        format!("{stem}.{BASE_EXTENSION}")
    };

    if !index.contains(&base) {
        return Err(Error::NotATexture(path.to_string()));
    }

    let data = index.read_path(&base)?;
    let mut texture = TextureDescriptor::from_header(&base, &data, codec)?;
    texture.load_base(&base, &data)?;

    for extension in streaming_extensions() {
        let resource = format!("{stem}.{extension}");
        if !index.contains(&resource) {
            continue;
        }

        let reader = match index.open_path(&resource) {
            Ok(reader) => reader,
            Err(IndexError::NotFound(_) | IndexError::NotEmbedded(_)) => {
                warn!(%resource, "streaming resource has no readable bytes");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let supplied = texture.load_streaming(&resource, reader)?;
        debug!(%resource, supplied, "loaded streaming resource");
    }

    let missing = texture
        .mips
        .iter()
        .filter(|m| m.raw_bytes.is_none() && !m.is_empty())
        .count();
    if missing > 0 {
        warn!(path = %base, missing, "texture is missing mips");
    }

    Ok(texture)
}

fn read_up_to<R: Read>(reader: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut buffer = Vec::with_capacity(len);
    reader.take(len as u64).read_to_end(&mut buffer)?;
    Ok(buffer)
}
