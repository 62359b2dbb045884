//! Types for reading SARC containers
//!

use binrw::BinRead;
use byteorder::{LittleEndian, ReadBytesExt};
use indexmap::IndexMap;
use std::io::{Cursor, Read};
use tracing::{instrument, trace};

use crate::{
    error::{Error, Result},
    types::{SarcEntry, SarcHeader, SarcRecord, HEADER_LEN, MAGIC, RECORD_LEN},
};

/// A fully loaded SARC container
///
/// The original bytes are kept alongside the parsed directory, since rebuilding copies the preamble, the
/// directory block and untouched payloads verbatim.
///
/// ```no_run
/// fn list_sarc_contents(path: &std::path::Path) -> apex_sarc::error::Result<()> {
///     let sarc = apex_sarc::SarcArchive::new(std::fs::read(path)?)?;
///
///     for entry in sarc.entries() {
///         println!("{} {:#x} {}", entry.path, entry.offset, entry.length);
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SarcArchive {
    header: SarcHeader,
    entries: Vec<SarcEntry>,
    names: IndexMap<Box<str>, usize>,
    data: Vec<u8>,
}

impl SarcArchive {
    /// Parse a SARC container held in memory.
    #[instrument(skip_all, err, fields(size = data.len()))]
    pub fn new(data: Vec<u8>) -> Result<SarcArchive> {
        let header = SarcHeader::read(&mut Cursor::new(&data)).map_err(|_| Error::InvalidArchive)?;
        let entries = Self::get_entries(&data, &header)?;

        let mut names = IndexMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            names.entry(entry.path.clone()).or_insert(i);
        }

        Ok(SarcArchive {
            header,
            entries,
            names,
            data,
        })
    }

    /// Read a whole SARC container from a reader and parse it.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<SarcArchive> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::new(data)
    }

    /// Checks whether the given bytes start with the SARC magic.
    ///
    /// Only the first [`MAGIC`] bytes are looked at.
    pub fn sniff(data: &[u8]) -> bool {
        data.starts_with(MAGIC)
    }

    /// Number of entries contained in this SARC.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this SARC contains no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The parsed preamble
    pub fn header(&self) -> &SarcHeader {
        &self.header
    }

    /// All entries in directory order
    pub fn entries(&self) -> &[SarcEntry] {
        &self.entries
    }

    /// Offset from the start of the file where the data region begins
    pub fn data_start(&self) -> u64 {
        self.header.data_start()
    }

    /// The raw bytes of the container
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Get the first entry with the given path, if it's present.
    pub fn by_name(&self, name: &str) -> Option<&SarcEntry> {
        self.names.get(name).map(|&i| &self.entries[i])
    }

    /// Get the embedded payload of an entry, `None` for symlinks.
    pub fn payload(&self, entry: &SarcEntry) -> Result<Option<&[u8]>> {
        if entry.is_symlink() {
            return Ok(None);
        }

        let start = entry.offset as usize;
        let end = start + entry.length as usize;
        self.data
            .get(start..end)
            .map(Some)
            .ok_or_else(|| Error::MemberOutOfBounds(entry.path.to_string()))
    }

    fn get_entries(data: &[u8], header: &SarcHeader) -> Result<Vec<SarcEntry>> {
        let end = header.data_start();
        if end > data.len() as u64 {
            return Err(Error::InvalidArchive);
        }

        let mut cursor = Cursor::new(&data[..end as usize]);
        cursor.set_position(HEADER_LEN);

        match header.version {
            2 => Self::get_entries_v2(&mut cursor, end),
            3 => Self::get_entries_v3(&mut cursor, end),
            version => Err(Error::UnsupportedVersion(version)),
        }
    }

    fn get_entries_v2(cursor: &mut Cursor<&[u8]>, end: u64) -> Result<Vec<SarcEntry>> {
        let mut entries = Vec::new();

        while end - cursor.position() >= 4 {
            let name_len = cursor.read_u32::<LittleEndian>()? as usize;
            if name_len == 0 {
                break;
            }

            let mut name = vec![0u8; name_len];
            cursor
                .read_exact(&mut name)
                .map_err(|_| Error::InvalidArchive)?;

            let offset_field = cursor.position();
            let offset = cursor.read_u32::<LittleEndian>()?;
            let length_field = cursor.position();
            let length = cursor.read_u32::<LittleEndian>()?;

            let entry = SarcEntry {
                path: decode_name(&name),
                offset,
                length,
                offset_field,
                length_field,
            };
            trace!(path = %entry.path, offset, length, "read entry");
            entries.push(entry);
        }

        Ok(entries)
    }

    fn get_entries_v3(cursor: &mut Cursor<&[u8]>, end: u64) -> Result<Vec<SarcEntry>> {
        let strings_len = cursor.read_u32::<LittleEndian>()? as usize;
        let mut strings = vec![0u8; strings_len];
        cursor
            .read_exact(&mut strings)
            .map_err(|_| Error::InvalidArchive)?;

        let mut entries = Vec::new();
        while end - cursor.position() >= RECORD_LEN {
            let record_start = cursor.position();
            let record = SarcRecord::read(cursor)?;

            let name = strings
                .get(record.name_offset as usize..)
                .ok_or(Error::InvalidArchive)?;

            let entry = SarcEntry {
                path: decode_name(name),
                offset: record.data_offset,
                length: record.data_length,
                offset_field: record_start + 4,
                length_field: record_start + 8,
            };
            trace!(path = %entry.path, offset = entry.offset, length = entry.length, "read entry");
            entries.push(entry);
        }

        Ok(entries)
    }
}

fn decode_name(raw: &[u8]) -> Box<str> {
    let trimmed = match raw.iter().position(|&c| c == 0) {
        Some(nul) => &raw[..nul],
        None => raw,
    };
    String::from_utf8_lossy(trimmed).into()
}
