//! Import of edited DDS interchange files back into native resources.
//!
//! Only the byte lengths of the original texture are trusted: the edited file is cut into mips using the lengths
//! of the loaded mips of the original, and every mip goes back into the resource it was loaded from at the same
//! position. The base resource gets the original native header in front.

use binrw::BinRead;
use indexmap::IndexMap;
use std::io::{Cursor, Read};
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::header::{InterchangeHeader, INTERCHANGE_HEADER_LEN};
use crate::texture::TextureDescriptor;

/// Split the interchange file read from `edited` into one `(logical path, bytes)` pair per resource of `texture`.
#[instrument(skip_all, err, fields(path = %texture.path))]
pub fn import<R: Read>(texture: &TextureDescriptor, mut edited: R) -> Result<Vec<(String, Vec<u8>)>> {
    let mut data = Vec::new();
    edited.read_to_end(&mut data)?;

    let header = InterchangeHeader::read(&mut Cursor::new(&data))
        .map_err(|_| Error::InvalidInterchange)?;
    debug!(
        width = header.dds.width,
        height = header.dds.height,
        format = header.dx10.dxgi_format,
        "read interchange header"
    );

    let mut outputs: IndexMap<&str, Vec<(usize, &[u8])>> = texture
        .resources
        .iter()
        .map(|r| (r.as_str(), Vec::new()))
        .collect();

    let mut position = INTERCHANGE_HEADER_LEN;
    for mip in texture.loaded_mips() {
        let Some(source) = &mip.source else {
            continue;
        };

        let end = position + mip.raw_len;
        let bytes = data.get(position..end).ok_or_else(|| Error::InsufficientData {
            resource: "interchange payload".to_string(),
            expected: mip.raw_len,
            actual: data.len().saturating_sub(position),
        })?;
        position = end;

        outputs
            .entry(source.resource.as_str())
            .or_default()
            .push((source.ordinal, bytes));
    }

    Ok(outputs
        .into_iter()
        .filter(|(_, mips)| !mips.is_empty())
        .map(|(resource, mut mips)| {
            mips.sort_by_key(|(ordinal, _)| *ordinal);

            let mut bytes = Vec::new();
            if resource == texture.path {
                bytes.extend_from_slice(&texture.header_prefix);
            }
            for (_, mip) in mips {
                bytes.extend_from_slice(mip);
            }

            debug!(resource, len = bytes.len(), "rebuilt resource");
            (resource.to_string(), bytes)
        })
        .collect())
}
