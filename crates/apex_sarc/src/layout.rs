//! Data region placement.
//!
//! Embedded members are packed in directory order starting right after the directory block. A member is never
//! allowed to straddle a block boundary ([`MAX_BLOCK_SIZE`]): when the bytes of a member would end in a different
//! block than the one they start in, the write position first skips ahead to the next block boundary. After every
//! member the write position is rounded up to a multiple of [`DATA_ALIGNMENT`].

use tracing::debug;

use crate::error::{Error, Result};

/// Size of the blocks a single member must fit into
pub const MAX_BLOCK_SIZE: u64 = 32 * 1024 * 1024;

/// Alignment of every embedded member
pub const DATA_ALIGNMENT: u64 = 4;

/// Where the data of a single member ends up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Not embedded, the stored offset is `0`
    Symlink {
        /// Length stored in the directory
        length: u32,
    },
    /// Embedded at `offset`
    Packed {
        /// Offset from the start of the file
        offset: u32,
        /// Length of the payload
        length: u32,
    },
}

impl Placement {
    /// The offset value to store in the directory
    pub fn offset(&self) -> u32 {
        match self {
            Placement::Symlink { .. } => 0,
            Placement::Packed { offset, .. } => *offset,
        }
    }

    /// The length value to store in the directory
    pub fn length(&self) -> u32 {
        match self {
            Placement::Symlink { length } | Placement::Packed { length, .. } => *length,
        }
    }

    /// The end of the payload, `None` for symlinks
    pub fn end(&self) -> Option<u64> {
        match self {
            Placement::Symlink { .. } => None,
            Placement::Packed { offset, length } => Some(*offset as u64 + *length as u64),
        }
    }
}

/// Running write cursor over the data region of a container
#[derive(Debug, Clone)]
pub struct Layout {
    position: u64,
    block_size: u64,
}

impl Layout {
    /// Start placing members at `data_start` using the engine's block size.
    pub fn new(data_start: u64) -> Self {
        Self {
            position: data_start,
            block_size: MAX_BLOCK_SIZE,
        }
    }

    /// Start placing members at `data_start` using a custom block size.
    pub fn with_block_size(data_start: u64, block_size: u64) -> Result<Self> {
        if block_size == 0 {
            return Err(Error::InvalidBlockSize(block_size));
        }

        Ok(Self {
            position: data_start,
            block_size,
        })
    }

    /// The current write position
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Reserve room for a member of `length` bytes and return its placement.
    pub fn place(&mut self, path: &str, length: u64) -> Result<Placement> {
        if length > self.block_size {
            return Err(Error::OversizedMember {
                path: path.to_owned(),
                size: length,
            });
        }

        if (self.position + length) / self.block_size != self.position / self.block_size {
            let skipped = self.position.div_ceil(self.block_size) * self.block_size;
            debug!(path, from = self.position, to = skipped, "skipping block boundary");
            self.position = skipped;
        }

        let offset =
            u32::try_from(self.position).map_err(|_| Error::OffsetOverflow(self.position))?;
        let length = u32::try_from(length).map_err(|_| Error::OversizedMember {
            path: path.to_owned(),
            size: length,
        })?;

        self.position += length as u64;
        self.position = self.position.next_multiple_of(DATA_ALIGNMENT);

        Ok(Placement::Packed { offset, length })
    }
}

/// Place members of the given `lengths` one after another, starting at `data_start`.
///
/// Returns `(offset, length)` for every member, in input order.
pub fn plan_layout(data_start: u64, lengths: &[u64], block_size: u64) -> Result<Vec<(u32, u32)>> {
    let mut layout = Layout::with_block_size(data_start, block_size)?;
    lengths
        .iter()
        .enumerate()
        .map(|(i, length)| {
            let placement = layout.place(&format!("#{i}"), *length)?;
            Ok((placement.offset(), placement.length()))
        })
        .collect()
}
