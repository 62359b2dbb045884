//! Pixel formats.
//!
//! The texture code never looks at pixel data itself, it only needs to know how many bytes a mip of a given size
//! occupies and, for previews, how to turn those bytes into RGBA. Both questions are answered by a [`PixelCodec`].
//! [`BasicCodec`] knows the sizes of the block compressed and most uncompressed DXGI formats and can decode the
//! ones textures use the most.

use image::RgbaImage;

use crate::error::{Error, Result};

/// Sizes and decoding of DXGI pixel formats
pub trait PixelCodec {
    /// Number of bytes of a `width` x `height` image in `format`
    fn raw_size(&self, format: u32, width: u32, height: u32) -> Result<usize>;

    /// Decode `raw` into an RGBA8 raster padded to multiples of 4
    fn decode(&self, raw: &[u8], width: u32, height: u32, format: u32) -> Result<Raster>;
}

/// An RGBA8 image whose dimensions are padded up to multiples of 4
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    /// Visible width
    pub width: u32,
    /// Visible height
    pub height: u32,
    /// Width of the stored pixels
    pub padded_width: u32,
    /// Height of the stored pixels
    pub padded_height: u32,
    /// Row major RGBA bytes, `padded_width * padded_height * 4` long
    pub pixels: Vec<u8>,
}

impl Raster {
    /// A raster with every pixel zeroed
    pub fn new(width: u32, height: u32) -> Self {
        let padded_width = width.next_multiple_of(4).max(4);
        let padded_height = height.next_multiple_of(4).max(4);
        Raster {
            width,
            height,
            padded_width,
            padded_height,
            pixels: vec![0; padded_width as usize * padded_height as usize * 4],
        }
    }

    /// RGBA value at `(x, y)`
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = rgba_offset(self.padded_width, x, y);
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    fn put(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = rgba_offset(self.padded_width, x, y);
        self.pixels[i..i + 4].copy_from_slice(&rgba);
    }

    /// Zero everything outside of the visible area
    fn clear_padding(&mut self) {
        for y in 0..self.padded_height {
            for x in 0..self.padded_width {
                if x >= self.width || y >= self.height {
                    self.put(x, y, [0; 4]);
                }
            }
        }
    }

    /// The visible area as an image
    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width.max(1), self.height.max(1), |x, y| {
            image::Rgba(self.pixel(x, y))
        })
    }
}

/// Byte offset of pixel `(x, y)` in RGBA rows of `width` pixels
fn rgba_offset(width: u32, x: u32, y: u32) -> usize {
    (y as usize * width as usize + x as usize) * 4
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Packing {
    /// 4x4 blocks of the given size
    Block(usize),
    /// Individual pixels of the given size
    Pixel(usize),
}

fn packing_of(format: u32) -> Option<Packing> {
    let packing = match format {
        // BC1, BC4
        70..=72 | 79..=81 => Packing::Block(8),
        // BC2, BC3, BC5, BC6H, BC7
        73..=78 | 82..=84 | 94..=99 => Packing::Block(16),
        1..=4 => Packing::Pixel(16),
        5..=8 => Packing::Pixel(12),
        9..=22 => Packing::Pixel(8),
        23..=47 => Packing::Pixel(4),
        48..=59 => Packing::Pixel(2),
        60..=65 => Packing::Pixel(1),
        85 | 86 | 115 => Packing::Pixel(2),
        87..=93 => Packing::Pixel(4),
        _ => return None,
    };
    Some(packing)
}

/// [`PixelCodec`] for DXGI formats
///
/// Decodes BC1, BC3, R8G8B8A8 and B8G8R8A8/X8 data.
#[derive(Debug, Default, Copy, Clone)]
pub struct BasicCodec;

impl PixelCodec for BasicCodec {
    fn raw_size(&self, format: u32, width: u32, height: u32) -> Result<usize> {
        let (width, height) = (width as usize, height as usize);
        match packing_of(format) {
            Some(Packing::Block(size)) => {
                Ok(width.div_ceil(4).max(1) * height.div_ceil(4).max(1) * size)
            }
            Some(Packing::Pixel(size)) => Ok(width * height * size),
            None => Err(Error::UnsupportedPixelFormat(format)),
        }
    }

    fn decode(&self, raw: &[u8], width: u32, height: u32, format: u32) -> Result<Raster> {
        let expected = self.raw_size(format, width, height)?;
        if raw.len() < expected {
            return Err(Error::InsufficientData {
                resource: format!("{width}x{height} format {format} pixels"),
                expected,
                actual: raw.len(),
            });
        }

        let mut raster = Raster::new(width, height);
        match format {
            70..=72 => decode_blocks(&mut raster, raw, 8, |block, out| {
                decode_color_block(block, out, true)
            }),
            76..=78 => decode_blocks(&mut raster, raw, 16, |block, out| {
                decode_color_block(&block[8..], out, false);
                decode_alpha_block(&block[..8], out);
            }),
            27..=32 => decode_pixels(&mut raster, raw, |p| [p[0], p[1], p[2], p[3]]),
            87 | 90 | 91 => decode_pixels(&mut raster, raw, |p| [p[2], p[1], p[0], p[3]]),
            88 | 92 | 93 => decode_pixels(&mut raster, raw, |p| [p[2], p[1], p[0], 0xFF]),
            _ => return Err(Error::UnsupportedPixelFormat(format)),
        }

        raster.clear_padding();
        Ok(raster)
    }
}

fn decode_pixels(raster: &mut Raster, raw: &[u8], convert: impl Fn(&[u8]) -> [u8; 4]) {
    for y in 0..raster.height {
        for x in 0..raster.width {
            let i = rgba_offset(raster.width, x, y);
            raster.put(x, y, convert(&raw[i..i + 4]));
        }
    }
}

fn decode_blocks(
    raster: &mut Raster,
    raw: &[u8],
    block_size: usize,
    decode: impl Fn(&[u8], &mut [[u8; 4]; 16]),
) {
    let blocks_x = raster.padded_width / 4;
    let blocks_y = raster.padded_height / 4;

    for by in 0..blocks_y {
        for bx in 0..blocks_x {
            let i = (by as usize * blocks_x as usize + bx as usize) * block_size;
            let mut texels = [[0u8; 4]; 16];
            decode(&raw[i..i + block_size], &mut texels);

            for (t, rgba) in texels.iter().enumerate() {
                let x = bx * 4 + (t % 4) as u32;
                let y = by * 4 + (t / 4) as u32;
                raster.put(x, y, *rgba);
            }
        }
    }
}

fn rgb565(value: u16) -> [u8; 3] {
    let r = ((value >> 11) & 0x1F) as u32;
    let g = ((value >> 5) & 0x3F) as u32;
    let b = (value & 0x1F) as u32;
    [
        ((r * 255 + 15) / 31) as u8,
        ((g * 255 + 31) / 63) as u8,
        ((b * 255 + 15) / 31) as u8,
    ]
}

fn mix(a: [u8; 3], b: [u8; 3], wa: u32, wb: u32) -> [u8; 4] {
    let total = wa + wb;
    let channel = |i: usize| ((a[i] as u32 * wa + b[i] as u32 * wb) / total) as u8;
    [channel(0), channel(1), channel(2), 0xFF]
}

/// BC1 style color block, `punch_through` allows the 3 color plus transparent mode
fn decode_color_block(block: &[u8], out: &mut [[u8; 4]; 16], punch_through: bool) {
    let c0 = u16::from_le_bytes([block[0], block[1]]);
    let c1 = u16::from_le_bytes([block[2], block[3]]);
    let indices = u32::from_le_bytes([block[4], block[5], block[6], block[7]]);

    let (a, b) = (rgb565(c0), rgb565(c1));
    let palette = if c0 > c1 || !punch_through {
        [mix(a, b, 1, 0), mix(a, b, 0, 1), mix(a, b, 2, 1), mix(a, b, 1, 2)]
    } else {
        [mix(a, b, 1, 0), mix(a, b, 0, 1), mix(a, b, 1, 1), [0, 0, 0, 0]]
    };

    for (t, texel) in out.iter_mut().enumerate() {
        *texel = palette[((indices >> (2 * t)) & 0x3) as usize];
    }
}

/// BC3 alpha block, replaces the alpha channel of `out`
fn decode_alpha_block(block: &[u8], out: &mut [[u8; 4]; 16]) {
    let (a0, a1) = (block[0] as u32, block[1] as u32);
    let mut bits = 0u64;
    for (i, byte) in block[2..8].iter().enumerate() {
        bits |= (*byte as u64) << (8 * i);
    }

    let alpha = |code: u32| -> u8 {
        match code {
            0 => a0 as u8,
            1 => a1 as u8,
            c if a0 > a1 => (((8 - c) * a0 + (c - 1) * a1) / 7) as u8,
            6 => 0,
            7 => 0xFF,
            c => (((6 - c) * a0 + (c - 1) * a1) / 5) as u8,
        }
    };

    for (t, texel) in out.iter_mut().enumerate() {
        texel[3] = alpha(((bits >> (3 * t)) & 0x7) as u32);
    }
}
