//! Export of textures to DDS interchange files

use apex_vfs::AssetIndex;
use binrw::BinWrite;
use bon::Builder;
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use crate::codec::PixelCodec;
use crate::error::{Error, Result};
use crate::header::InterchangeHeader;
use crate::texture::{load, TextureDescriptor, BASE_EXTENSION};

/// Options for writing exported files
#[derive(Debug, Clone, Copy, Default, Builder)]
pub struct ExportOptions {
    /// Replace files that already exist
    #[builder(default)]
    pub allow_overwrite: bool,
}

/// Serialize the loaded mips of `texture` as a DX10 DDS file.
///
/// The header describes the loaded part of the mip chain. When every mip is loaded that is the whole texture.
#[instrument(skip_all, err, fields(path = %texture.path))]
pub fn export(texture: &TextureDescriptor) -> Result<Vec<u8>> {
    let mut loaded = texture.loaded_mips().peekable();
    let first = loaded
        .peek()
        .copied()
        .ok_or_else(|| Error::NoMipsLoaded(texture.path.clone()))?;

    let levels = texture
        .loaded_mips()
        .filter(|m| m.depth_index == 0)
        .count() as u32;
    if levels < texture.declared_mip_count {
        warn!(
            levels,
            declared = texture.declared_mip_count,
            "exporting an incomplete mip chain"
        );
    }

    let header = InterchangeHeader::new(
        first.width,
        first.height,
        texture.depth_count,
        levels,
        texture.pixel_format,
        first.raw_len as u32,
    );

    let mut output = Cursor::new(Vec::new());
    header.write(&mut output)?;
    for mip in loaded {
        if let Some(raw) = &mip.raw_bytes {
            output.write_all(raw)?;
        }
    }

    Ok(output.into_inner())
}

/// The files an export of a texture to `output` produces, the DDS file and the preview
pub fn export_paths(output: &Path) -> (PathBuf, PathBuf) {
    let base = output.with_extension(BASE_EXTENSION);

    let mut dds = OsString::from(base.as_os_str());
    dds.push(".dds");

    let mut preview = OsString::from(base.as_os_str());
    preview.push(".REFERENCE_ONLY.png");

    (PathBuf::from(dds), PathBuf::from(preview))
}

/// Load the texture `path` from `index` and write it next to `output`.
///
/// Writes `<output>.ddsc.dds` and, when the pixel format can be decoded, a `<output>.ddsc.REFERENCE_ONLY.png`
/// preview of the full resolution mip. Files that already exist are left alone unless
/// [`ExportOptions::allow_overwrite`] is set and are all reported together at the end.
#[instrument(skip(index, codec, options), err)]
pub fn export_files<I, C>(
    index: &I,
    path: &str,
    output: &Path,
    codec: &C,
    options: ExportOptions,
) -> Result<Vec<PathBuf>>
where
    I: AssetIndex + ?Sized,
    C: PixelCodec + ?Sized,
{
    let texture = load(index, path, codec)?;
    let (dds_path, preview_path) = export_paths(output);

    let mut written = Vec::new();
    let mut collisions = Vec::new();

    if !options.allow_overwrite && preview_path.exists() {
        collisions.push(preview_path);
    } else {
        match preview(&texture, codec) {
            Ok(image) => {
                image.save(&preview_path)?;
                info!("wrote {}", preview_path.display());
                written.push(preview_path);
            }
            Err(e) => warn!("skipping preview: {e}"),
        }
    }

    if !options.allow_overwrite && dds_path.exists() {
        collisions.push(dds_path);
    } else {
        let data = export(&texture)?;
        let mut file = BufWriter::new(File::create(&dds_path)?);
        file.write_all(&data)?;
        file.flush()?;
        info!("wrote {}", dds_path.display());
        written.push(dds_path);
    }

    if !collisions.is_empty() {
        return Err(Error::OutputCollision(collisions));
    }

    Ok(written)
}

/// Decode the first loaded mip into an image
fn preview<C: PixelCodec + ?Sized>(
    texture: &TextureDescriptor,
    codec: &C,
) -> Result<image::RgbaImage> {
    let mip = texture
        .loaded_mips()
        .next()
        .ok_or_else(|| Error::NoMipsLoaded(texture.path.clone()))?;

    let raster = match (&mip.decoded_raster, &mip.raw_bytes) {
        (Some(raster), _) => raster.clone(),
        (None, Some(raw)) => codec.decode(raw, mip.width, mip.height, mip.pixel_format)?,
        (None, None) => return Err(Error::NoMipsLoaded(texture.path.clone())),
    };

    Ok(raster.to_image())
}
