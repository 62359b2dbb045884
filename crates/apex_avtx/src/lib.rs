//! A library for working with the textures of *Apex* engine games.
//!
//! A texture is stored as a base resource (`.ddsc`) holding an [`AvtxHeader`](header::AvtxHeader) and the
//! coarsest mips, plus up to sixteen streaming resources (`.hmddsc`, `.atx1` ... `.atx15`) holding the finer ones.
//!
//! |   Offset |  Size | Field                        |
//! |---------:|------:|:-----------------------------|
//! |     0x00 |     4 | magic `AVTX`                 |
//! |     0x04 |     2 | version                      |
//! |     0x06 |     1 | unknown                      |
//! |     0x07 |     1 | dimension                    |
//! |     0x08 |     4 | DXGI pixel format            |
//! |     0x0C |     2 | width of mip 0               |
//! |     0x0E |     2 | height of mip 0              |
//! |     0x10 |     2 | depth                        |
//! |     0x12 |     2 | flags                        |
//! |     0x14 |     1 | declared mip count           |
//! |     0x15 |     1 | mips stored in this resource |
//! |     0x16 |     2 | unknown                      |
//! |     0x18 |   104 | reserved                     |
//!
//! Textures are exchanged with image editors as DX10 DDS files: [`export`](export::export) writes one and
//! [`import`](import::import) splits an edited one back into the native resources.
//!
//! ```
//! # fn doit() -> apex_avtx::error::Result<()>
//! # {
//! use apex_avtx::{codec::BasicCodec, export::export, import::import, texture::load};
//! use apex_vfs::{MemoryIndex, NodeKind};
//! use binrw::BinWrite;
//!
//! let header = apex_avtx::header::AvtxHeader {
//!     pixel_format: 87,
//!     width: 1,
//!     height: 1,
//!     depth: 1,
//!     declared_mips: 1,
//!     resident_mips: 1,
//!     ..Default::default()
//! };
//! let mut resource = std::io::Cursor::new(Vec::new());
//! header.write(&mut resource)?;
//! resource.get_mut().extend([0x10, 0x20, 0x30, 0xFF]);
//!
//! let mut index = MemoryIndex::new();
//! index.add(Some("textures/dot.ddsc"), NodeKind::Opaque, None, Some(resource.into_inner()));
//!
//! let texture = load(&index, "textures/dot.ddsc", &BasicCodec)?;
//! let dds = export(&texture)?;
//! let resources = import(&texture, &dds[..])?;
//! assert_eq!(resources[0].0, "textures/dot.ddsc");
//! # Ok(())
//! # }
//! # doit().unwrap();
//! ```

pub mod codec;
pub mod error;
pub mod export;
pub mod header;
pub mod import;
pub mod texture;

pub use codec::{BasicCodec, PixelCodec, Raster};
pub use export::{export_files, ExportOptions};
pub use texture::{load, MipDescriptor, MipSource, TextureDescriptor};
