//! Types for writing SARC containers
//!

use binrw::BinWrite;
use bon::Builder;
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{Cursor, Seek, SeekFrom, Write};
use tracing::{debug, instrument};

use crate::error::Result;
use crate::layout::{Layout, Placement, MAX_BLOCK_SIZE};
use crate::types::SarcHeader;

/// Options for how the SARC file should be written
#[derive(Debug, Clone, Copy, Builder)]
pub struct SarcWriterOptions {
    /// Block size no member may straddle
    #[builder(default = MAX_BLOCK_SIZE)]
    pub block_size: u64,
}

impl Default for SarcWriterOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug)]
enum PendingMember {
    Embedded(Vec<u8>),
    Symlink(u32),
}

/// Version 2 SARC generator
///
/// ```
/// # fn doit() -> apex_sarc::error::Result<()>
/// # {
/// use apex_sarc::{SarcArchive, SarcWriter};
///
/// let mut sarc = SarcWriter::default();
/// sarc.add_file("settings/player.bin", b"Hello, World!".to_vec());
/// sarc.add_symlink("textures/player.ddsc", 4096);
///
/// let bytes = sarc.finish(Vec::new())?;
/// assert_eq!(SarcArchive::new(bytes)?.len(), 2);
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
#[derive(Debug, Default)]
pub struct SarcWriter {
    options: SarcWriterOptions,
    members: Vec<(String, PendingMember)>,
}

impl SarcWriter {
    /// Create a writer with the given options.
    pub fn new(options: SarcWriterOptions) -> SarcWriter {
        SarcWriter {
            options,
            members: Vec::new(),
        }
    }

    /// Append a member whose payload is embedded in the container.
    pub fn add_file(&mut self, path: impl ToString, data: impl Into<Vec<u8>>) -> &mut Self {
        self.members
            .push((path.to_string(), PendingMember::Embedded(data.into())));
        self
    }

    /// Append a member that is loaded from elsewhere.
    pub fn add_symlink(&mut self, path: impl ToString, length: u32) -> &mut Self {
        self.members
            .push((path.to_string(), PendingMember::Symlink(length)));
        self
    }

    /// Lay out all members and write the container.
    #[instrument(skip_all, err, fields(members = self.members.len()))]
    pub fn finish<W: Write>(self, mut inner: W) -> Result<W> {
        let directory_len: usize = self
            .members
            .iter()
            .map(|(path, _)| 12 + padded_name_len(path))
            .sum();

        let header = SarcHeader {
            version: 2,
            directory_len: directory_len as u32,
        };

        let mut layout = Layout::with_block_size(header.data_start(), self.options.block_size)?;
        let placements = self
            .members
            .iter()
            .map(|(path, member)| match member {
                PendingMember::Embedded(data) => layout.place(path, data.len() as u64),
                PendingMember::Symlink(length) => Ok(Placement::Symlink { length: *length }),
            })
            .collect::<Result<Vec<_>>>()?;

        let mut output = Cursor::new(Vec::with_capacity(layout.position() as usize));
        header.write(&mut output)?;

        for ((path, _), placement) in self.members.iter().zip(&placements) {
            let padded = padded_name_len(path);
            output.write_u32::<LittleEndian>(padded as u32)?;
            output.write_all(path.as_bytes())?;
            output.write_all(&vec![0u8; padded - path.len()])?;
            output.write_u32::<LittleEndian>(placement.offset())?;
            output.write_u32::<LittleEndian>(placement.length())?;
        }

        for ((path, member), placement) in self.members.iter().zip(&placements) {
            if let (PendingMember::Embedded(data), Placement::Packed { offset, .. }) =
                (member, placement)
            {
                debug!(path, offset, length = data.len(), "writing member");
                // Cursor zero fills when seeking past the end
                output.seek(SeekFrom::Start(*offset as u64))?;
                output.write_all(data)?;
            }
        }

        inner.write_all(output.get_ref())?;
        Ok(inner)
    }
}

/// Names are NUL terminated and padded to a multiple of 4 bytes
fn padded_name_len(path: &str) -> usize {
    (path.len() + 1).next_multiple_of(4)
}
