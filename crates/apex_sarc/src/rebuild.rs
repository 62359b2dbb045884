//! Rebuilding a container around replaced members.
//!
//! The preamble and directory block are copied verbatim and only the offset/length fields of each entry are
//! patched in place. Members with a replacement become symlinks (offset `0`) carrying the replacement's size,
//! members that already were symlinks stay symlinks, everything else is re-packed from the original bytes
//! following the [`crate::layout`] rules. Gaps left by alignment or block skips are zero filled.

use byteorder::{LittleEndian, WriteBytesExt};
use indexmap::IndexMap;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};
use std::io::{self, Cursor, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::layout::{Layout, Placement};
use crate::read::SarcArchive;

/// Something that can stand in for the payload of a member
pub trait ReplacementSource {
    /// Size of the replacement payload in bytes
    fn size(&self) -> io::Result<u64>;
}

impl ReplacementSource for Path {
    fn size(&self) -> io::Result<u64> {
        Ok(std::fs::metadata(self)?.len())
    }
}

impl ReplacementSource for PathBuf {
    fn size(&self) -> io::Result<u64> {
        self.as_path().size()
    }
}

impl ReplacementSource for [u8] {
    fn size(&self) -> io::Result<u64> {
        Ok(self.len() as u64)
    }
}

impl ReplacementSource for Vec<u8> {
    fn size(&self) -> io::Result<u64> {
        Ok(self.len() as u64)
    }
}

/// A lookup from member path to its replacement
pub trait Replacements {
    /// Size of the replacement for `path`, if one exists
    fn replacement_size(&self, path: &str) -> Option<io::Result<u64>>;
}

impl<K, V, S> Replacements for HashMap<K, V, S>
where
    K: Borrow<str> + Hash + Eq,
    V: ReplacementSource,
    S: BuildHasher,
{
    fn replacement_size(&self, path: &str) -> Option<io::Result<u64>> {
        self.get(path).map(ReplacementSource::size)
    }
}

impl<K, V, S> Replacements for IndexMap<K, V, S>
where
    K: Borrow<str> + Hash + Eq,
    V: ReplacementSource,
    S: BuildHasher,
{
    fn replacement_size(&self, path: &str) -> Option<io::Result<u64>> {
        self.get(path).map(ReplacementSource::size)
    }
}

impl SarcArchive {
    /// Compute the new placement of every entry, in directory order.
    pub fn plan<M: Replacements + ?Sized>(&self, replacements: &M) -> Result<Vec<Placement>> {
        let mut layout = Layout::new(self.data_start());

        self.entries()
            .iter()
            .map(|entry| -> Result<Placement> {
                let replacement = replacements.replacement_size(&entry.path).transpose()?;

                match replacement {
                    Some(size) => Ok(Placement::Symlink {
                        length: u32::try_from(size).map_err(|_| Error::OversizedMember {
                            path: entry.path.to_string(),
                            size,
                        })?,
                    }),
                    None if entry.is_symlink() => Ok(Placement::Symlink {
                        length: entry.length,
                    }),
                    None => layout.place(&entry.path, entry.length as u64),
                }
            })
            .collect()
    }

    /// Produce the bytes of a new container with the given members replaced.
    ///
    /// Rebuilding with no replacements keeps every entry's payload at an equivalent position.
    #[instrument(skip_all, err, fields(entries = self.len()))]
    pub fn rebuild<M: Replacements + ?Sized>(&self, replacements: &M) -> Result<Vec<u8>> {
        let placements = self.plan(replacements)?;

        let directory_end = self.data_start() as usize;
        let end = placements
            .iter()
            .filter_map(Placement::end)
            .map(|end| end as usize)
            .fold(directory_end, usize::max);

        let mut output = vec![0u8; end];
        output[..directory_end].copy_from_slice(&self.as_bytes()[..directory_end]);

        let mut patcher = Cursor::new(&mut output[..]);
        for (entry, placement) in self.entries().iter().zip(&placements) {
            patcher.seek(SeekFrom::Start(entry.offset_field))?;
            patcher.write_u32::<LittleEndian>(placement.offset())?;
            patcher.seek(SeekFrom::Start(entry.length_field))?;
            patcher.write_u32::<LittleEndian>(placement.length())?;
        }

        for (entry, placement) in self.entries().iter().zip(&placements) {
            match placement {
                Placement::Symlink { length } => {
                    debug!(path = %entry.path, length, "symlink");
                }
                Placement::Packed { offset, length } => {
                    debug!(path = %entry.path, offset, length, "copying");
                    let payload = self
                        .payload(entry)?
                        .ok_or_else(|| Error::MemberOutOfBounds(entry.path.to_string()))?;
                    let start = *offset as usize;
                    output[start..start + payload.len()].copy_from_slice(payload);
                }
            }
        }

        Ok(output)
    }
}
