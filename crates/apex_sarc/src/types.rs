//! Base types for structure of SARC file.

use binrw::{BinRead, BinWrite};

/// Size of the fixed preamble preceding the directory block
pub const HEADER_LEN: u64 = 16;

/// The length prefixed magic every SARC container starts with
pub const MAGIC: &[u8; 8] = b"\x04\x00\x00\x00SARC";

/// SARC file header
///
/// Always starts with the length prefixed magic "SARC", followed by the directory version and the size of the
/// directory block. All data is stored in little endian format.
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq)]
#[brw(magic = b"\x04\x00\x00\x00SARC", little)]
pub struct SarcHeader {
    /// The layout version of the directory block
    pub version: u32,

    /// The size of the directory block following this header
    pub directory_len: u32,
}

impl SarcHeader {
    /// Offset from the start of the file where the data region begins
    pub fn data_start(&self) -> u64 {
        HEADER_LEN + self.directory_len as u64
    }
}

impl Default for SarcHeader {
    fn default() -> Self {
        Self {
            version: 2,
            directory_len: 0,
        }
    }
}

/// Fixed size directory record of a version 3 container
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
#[brw(little)]
pub struct SarcRecord {
    /// Offset of the member path inside the string block
    pub name_offset: u32,

    /// Offset of the member data from the start of the file
    pub data_offset: u32,

    /// Size of the member data
    pub data_length: u32,

    /// Hash of the member path
    pub path_hash: u32,

    /// Hash of the member extension
    pub extension_hash: u32,
}

/// Size of a [`SarcRecord`] on disk
pub const RECORD_LEN: u64 = 20;

/// A member of a SARC container
///
/// Besides the current offset and length, an entry remembers where in the directory block those two values
/// are physically stored. Rebuilding a container only ever rewrites the values at these locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SarcEntry {
    /// Path of the member
    pub path: Box<str>,
    /// Offset of the member data from the start of the file, `0` for symlinks
    pub offset: u32,
    /// Size of the member data
    pub length: u32,
    /// Absolute file position of the offset field
    pub offset_field: u64,
    /// Absolute file position of the length field
    pub length_field: u64,
}

impl SarcEntry {
    /// Whether the payload of this member lives outside of the container
    pub fn is_symlink(&self) -> bool {
        self.offset == 0
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use binrw::BinRead;
    use binrw::BinWrite;
    use pretty_assertions::assert_eq;

    use crate::error::Result;
    use crate::types::{SarcHeader, SarcRecord};

    #[test]
    fn read_header() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x04, 0x00, 0x00, 0x00,
            0x53, 0x41, 0x52, 0x43,
            0x03, 0x00, 0x00, 0x00,
            0x40, 0x01, 0x00, 0x00,
        ]);

        let expected = SarcHeader {
            version: 3,
            directory_len: 0x140,
        };

        let header = SarcHeader::read(&mut input)?;
        assert_eq!(header, expected);
        assert_eq!(header.data_start(), 0x150);

        Ok(())
    }

    #[test]
    fn read_header_rejects_bad_magic() {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x04, 0x00, 0x00, 0x00,
            0x53, 0x41, 0x52, 0x44,
            0x03, 0x00, 0x00, 0x00,
            0x40, 0x01, 0x00, 0x00,
        ]);

        assert!(SarcHeader::read(&mut input).is_err());
    }

    #[test]
    fn write_header() -> Result<()> {
        #[rustfmt::skip]
        let expected: Vec<u8> = vec![
            0x04, 0x00, 0x00, 0x00,
            0x53, 0x41, 0x52, 0x43,
            0x02, 0x00, 0x00, 0x00,
            0x18, 0x00, 0x00, 0x00,
        ];

        let header = SarcHeader {
            directory_len: 0x18,
            ..Default::default()
        };

        let mut actual = Vec::new();
        header.write(&mut Cursor::new(&mut actual))?;

        assert_eq!(actual, expected);

        Ok(())
    }

    #[test]
    fn read_record() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x0A, 0x00, 0x00, 0x00,
            0x20, 0x01, 0x00, 0x00,
            0x0B, 0x00, 0x00, 0x00,
            0xEF, 0xBE, 0xAD, 0xDE,
            0x00, 0x00, 0x00, 0x00,
        ]);

        let expected = SarcRecord {
            name_offset: 10,
            data_offset: 0x120,
            data_length: 11,
            path_hash: 0xDEADBEEF,
            ..Default::default()
        };

        assert_eq!(SarcRecord::read(&mut input)?, expected);

        Ok(())
    }
}
