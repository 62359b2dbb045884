//! On-disk headers of native textures and DDS interchange files.

use binrw::{BinRead, BinWrite};

/// Size of the native texture header
pub const AVTX_HEADER_LEN: usize = 128;

/// Size of the DDS header, excluding the magic
pub const DDS_HEADER_LEN: u32 = 124;

/// Size of the DDS pixel format block
pub const DDS_PIXEL_FORMAT_LEN: u32 = 32;

/// Size of magic, DDS header and DX10 extension together
pub const INTERCHANGE_HEADER_LEN: usize = 4 + DDS_HEADER_LEN as usize + 20;

pub const DDSD_CAPS: u32 = 0x1;
pub const DDSD_HEIGHT: u32 = 0x2;
pub const DDSD_WIDTH: u32 = 0x4;
pub const DDSD_PIXELFORMAT: u32 = 0x1000;
pub const DDSD_MIPMAPCOUNT: u32 = 0x20000;
pub const DDSD_LINEARSIZE: u32 = 0x80000;
pub const DDSD_DEPTH: u32 = 0x800000;

pub const DDPF_FOURCC: u32 = 0x4;

pub const DDSCAPS_COMPLEX: u32 = 0x8;
pub const DDSCAPS_TEXTURE: u32 = 0x1000;
pub const DDSCAPS_MIPMAP: u32 = 0x400000;
pub const DDSCAPS2_VOLUME: u32 = 0x200000;

pub const DIMENSION_TEXTURE2D: u32 = 3;
pub const DIMENSION_TEXTURE3D: u32 = 4;

/// Native texture header
///
/// Every base texture resource starts with this header, directly followed by the resident mips.
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(magic = b"AVTX", little)]
pub struct AvtxHeader {
    /// Format version
    pub version: u16,

    pub unknown0: u8,

    /// Dimension of the texture
    pub dimension: u8,

    /// DXGI format code
    pub pixel_format: u32,

    /// Width of the full resolution mip
    pub width: u16,

    /// Height of the full resolution mip
    pub height: u16,

    /// Number of depth slices
    pub depth: u16,

    pub flags: u16,

    /// Number of mips the texture has in total
    pub declared_mips: u8,

    /// Number of mips stored in the base resource
    pub resident_mips: u8,

    pub unknown1: u16,

    pub reserved: [u32; 26],
}

/// DDS pixel format block
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct DdsPixelFormat {
    pub size: u32,
    pub flags: u32,
    pub four_cc: [u8; 4],
    pub rgb_bit_count: u32,
    pub r_bit_mask: u32,
    pub g_bit_mask: u32,
    pub b_bit_mask: u32,
    pub a_bit_mask: u32,
}

/// DDS header, preceded by the `DDS ` magic
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(magic = b"DDS ", little)]
pub struct DdsHeader {
    pub size: u32,
    pub flags: u32,
    pub height: u32,
    pub width: u32,
    pub pitch_or_linear_size: u32,
    pub depth: u32,
    pub mip_map_count: u32,
    pub reserved1: [u32; 11],
    pub pixel_format: DdsPixelFormat,
    pub caps: u32,
    pub caps2: u32,
    pub caps3: u32,
    pub caps4: u32,
    pub reserved2: u32,
}

/// DX10 extension of the DDS header
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct Dx10Header {
    pub dxgi_format: u32,
    pub resource_dimension: u32,
    pub misc_flag: u32,
    pub array_size: u32,
    pub misc_flags2: u32,
}

/// Everything in front of the pixel data of an interchange file
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct InterchangeHeader {
    pub dds: DdsHeader,

    #[br(assert(dds.pixel_format.four_cc == *b"DX10"))]
    pub dx10: Dx10Header,
}

impl InterchangeHeader {
    /// Header of a DX10 interchange file
    pub fn new(
        width: u32,
        height: u32,
        depth: u32,
        mip_count: u32,
        pixel_format: u32,
        linear_size: u32,
    ) -> Self {
        let mut flags = DDSD_CAPS
            | DDSD_HEIGHT
            | DDSD_WIDTH
            | DDSD_PIXELFORMAT
            | DDSD_MIPMAPCOUNT
            | DDSD_LINEARSIZE;
        let mut caps2 = 0;
        let mut resource_dimension = DIMENSION_TEXTURE2D;

        if depth > 1 {
            flags |= DDSD_DEPTH;
            caps2 |= DDSCAPS2_VOLUME;
            resource_dimension = DIMENSION_TEXTURE3D;
        }

        InterchangeHeader {
            dds: DdsHeader {
                size: DDS_HEADER_LEN,
                flags,
                height,
                width,
                pitch_or_linear_size: linear_size,
                depth,
                mip_map_count: mip_count,
                reserved1: [0; 11],
                pixel_format: DdsPixelFormat {
                    size: DDS_PIXEL_FORMAT_LEN,
                    flags: DDPF_FOURCC,
                    four_cc: *b"DX10",
                    ..Default::default()
                },
                caps: DDSCAPS_COMPLEX | DDSCAPS_TEXTURE | DDSCAPS_MIPMAP,
                caps2,
                caps3: 0,
                caps4: 0,
                reserved2: 0,
            },
            dx10: Dx10Header {
                dxgi_format: pixel_format,
                resource_dimension,
                misc_flag: 0,
                array_size: 1,
                misc_flags2: 0,
            },
        }
    }
}

#[cfg(test)]
mod test {
    use binrw::{BinRead, BinWrite};
    use pretty_assertions::{assert_eq, assert_str_eq};
    use std::io::Cursor;

    use crate::error::Result;
    use crate::header::{AvtxHeader, InterchangeHeader, AVTX_HEADER_LEN, INTERCHANGE_HEADER_LEN};

    #[test]
    fn read_avtx_header() -> Result<()> {
        #[rustfmt::skip]
        let prefix = [
            b'A', b'V', b'T', b'X',
            0x01, 0x00, 0x00, 0x02,
            0x47, 0x00, 0x00, 0x00,
            0x00, 0x01, 0x80, 0x00,
            0x01, 0x00, 0x00, 0x00,
            0x09, 0x05, 0x00, 0x00,
        ];
        let mut input = vec![0u8; AVTX_HEADER_LEN];
        input[..prefix.len()].copy_from_slice(&prefix);

        let mut cursor = Cursor::new(&input);
        let header = AvtxHeader::read(&mut cursor)?;

        assert_eq!(
            header,
            AvtxHeader {
                version: 1,
                dimension: 2,
                pixel_format: 71,
                width: 256,
                height: 128,
                depth: 1,
                declared_mips: 9,
                resident_mips: 5,
                ..Default::default()
            }
        );
        assert_eq!(cursor.position() as usize, AVTX_HEADER_LEN);

        Ok(())
    }

    #[test]
    fn write_interchange_header() -> Result<()> {
        let mut output = Cursor::new(Vec::new());
        InterchangeHeader::new(4, 4, 1, 1, 87, 64).write(&mut output)?;

        #[rustfmt::skip]
        let expected = vec![
            b'D', b'D', b'S', b' ',
            0x7C, 0x00, 0x00, 0x00, 0x07, 0x10, 0x0A, 0x00,
            0x04, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00,
            0x40, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            // Pixel format
            0x20, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00,
            b'D', b'X', b'1', b'0',
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            // Caps
            0x08, 0x10, 0x40, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            // DX10
            0x57, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
        ];

        assert_eq!(output.get_ref().len(), INTERCHANGE_HEADER_LEN);
        assert_str_eq!(
            format!("{:02X?}", output.get_ref()),
            format!("{:02X?}", expected)
        );

        Ok(())
    }

    #[test]
    fn volume_interchange_header() -> Result<()> {
        let header = InterchangeHeader::new(16, 16, 4, 5, 28, 1024);

        assert_eq!(header.dds.flags & 0x800000, 0x800000);
        assert_eq!(header.dds.caps2, 0x200000);
        assert_eq!(header.dx10.resource_dimension, 4);

        let mut output = Cursor::new(Vec::new());
        header.write(&mut output)?;
        output.set_position(0);
        assert_eq!(InterchangeHeader::read(&mut output)?, header);

        Ok(())
    }

    #[test]
    fn reject_non_dx10_interchange() {
        let mut header = InterchangeHeader::new(4, 4, 1, 1, 71, 8);
        header.dds.pixel_format.four_cc = *b"DXT1";

        let mut output = Cursor::new(Vec::new());
        header.write(&mut output).expect("write");
        output.set_position(0);

        assert!(InterchangeHeader::read(&mut output).is_err());
    }
}
