//! The 128-entry sprite view over OAM.
//!
//! Every access decodes the entry's attribute words, resolves dimensions
//! through the size table, and constitutes the sprite's pixels tile by tile
//! through the cache. Nothing about a sprite is cached between accesses;
//! only the underlying tiles are.

use std::fmt;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use super::memory::{Memory, OBJ_TILE_DATA_BASE};
use super::object_attributes::{self, ColorMode, ObjAttributes};
use super::registers::Registers;
use super::tile_cache::TileCache;
use super::{Color, ObjMappingKind};

/// Number of OAM entries.
pub const OBJ_COUNT: usize = 128;

/// Tile-index distance between vertically adjacent tile rows in
/// two-dimensional mapping mode, where the OBJ character region is a
/// 32-tile-wide grid.
pub const TWO_D_TILE_STRIDE: u16 = 0x20;

/// Collection access outside `[0, 127]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjIndexError {
    pub index: usize,
}

impl fmt::Display for ObjIndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OBJ index {} out of range, OAM holds {OBJ_COUNT} entries",
            self.index
        )
    }
}

impl std::error::Error for ObjIndexError {}

/// A fully realized sprite: decoded attributes, resolved dimensions, and
/// the row-major pixel block. Transient and caller-owned; building one
/// never writes to OAM or video memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprite {
    pub attributes: ObjAttributes,
    pub width: u16,
    pub height: u16,
    pub pixels: Vec<Color>,
}

impl Sprite {
    /// X position, 9 bits (sprites move in a 512x256 world).
    #[must_use]
    pub const fn x(&self) -> u16 {
        self.attributes.attribute1.x_coordinate
    }

    /// Y position, 8 bits.
    #[must_use]
    pub const fn y(&self) -> u8 {
        self.attributes.attribute0.y_coordinate
    }

    #[must_use]
    pub const fn color_mode(&self) -> ColorMode {
        self.attributes.attribute0.color_mode
    }

    #[must_use]
    pub const fn tile_index(&self) -> u16 {
        self.attributes.attribute2.tile_number
    }

    #[must_use]
    pub const fn palette_id(&self) -> u8 {
        self.attributes.attribute2.palette_number
    }

    #[must_use]
    pub const fn priority(&self) -> u8 {
        self.attributes.attribute2.priority
    }

    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Color {
        self.pixels[y * usize::from(self.width) + x]
    }

    /// Resolves the sprite's tiles through the cache and blits them into
    /// the pixel block.
    ///
    /// `tile_stride` is the tile-index distance between tile rows: 0 means
    /// the rows are packed sequentially (one-dimensional mapping). 8bpp
    /// tiles occupy two 32-byte index slots, so their columns advance by
    /// two.
    fn constitute(&mut self, tile_cache: &mut TileCache, tile_stride: u16) {
        let width_tiles = self.width / 8;
        let height_tiles = self.height / 8;
        let color_mode = self.color_mode();
        let palette_id = self.palette_id();

        let col_step = match color_mode {
            ColorMode::Palette4bpp => 1,
            ColorMode::Palette8bpp => 2,
        };
        let row_advance = if tile_stride == 0 {
            width_tiles * col_step
        } else {
            tile_stride
        };

        for ty in 0..height_tiles {
            for tx in 0..width_tiles {
                let tile_id = self.tile_index() + ty * row_advance + tx * col_step;
                let tile =
                    *tile_cache.lookup(tile_id, palette_id, color_mode, OBJ_TILE_DATA_BASE);

                let stride = usize::from(self.width);
                let origin = usize::from(ty) * 8 * stride + usize::from(tx) * 8;
                for row in 0..8 {
                    let destination = origin + row * stride;
                    self.pixels[destination..destination + 8]
                        .copy_from_slice(&tile[row * 8..row * 8 + 8]);
                }
            }
        }
    }
}

/// Read-only indexed view over the 128 OAM entries.
///
/// Owns no sprite data, only handles to the OAM region, the registers, and
/// the owning context's tile cache. The cache borrow is mutable because
/// realizing a sprite may decode and store tiles.
pub struct ObjCollection<'a> {
    memory: &'a Arc<Mutex<Memory>>,
    registers: &'a Registers,
    tile_cache: &'a mut TileCache,
}

impl<'a> ObjCollection<'a> {
    pub(crate) fn new(
        memory: &'a Arc<Mutex<Memory>>,
        registers: &'a Registers,
        tile_cache: &'a mut TileCache,
    ) -> Self {
        Self {
            memory,
            registers,
            tile_cache,
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        OBJ_COUNT
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Decodes and constitutes OAM entry `index`.
    ///
    /// # Errors
    ///
    /// [`ObjIndexError`] when `index` is 128 or above.
    pub fn get(&mut self, index: usize) -> Result<Sprite, ObjIndexError> {
        if index >= OBJ_COUNT {
            return Err(ObjIndexError { index });
        }

        // The lock is released before constitution; tile lookups re-acquire
        // the region through the cache's association.
        let words = self.memory.lock().unwrap().oam_entry(index);
        let attributes = ObjAttributes::from(words);
        let (width, height) = object_attributes::dimensions(
            attributes.attribute0.obj_shape,
            attributes.attribute1.obj_size,
        );

        // Mapping mode is mutable runtime state of the emulated machine, so
        // it is read back out of DISPCNT on every access, never cached.
        let tile_stride = tile_stride(self.registers.get_obj_character_vram_mapping());

        let mut sprite = Sprite {
            attributes,
            width,
            height,
            pixels: vec![Color::default(); usize::from(width) * usize::from(height)],
        };
        sprite.constitute(self.tile_cache, tile_stride);

        Ok(sprite)
    }
}

/// Tile-row stride handed to constitution: sequential (0) in
/// one-dimensional mapping, [`TWO_D_TILE_STRIDE`] in two-dimensional
/// mapping.
const fn tile_stride(mapping: ObjMappingKind) -> u16 {
    match mapping {
        ObjMappingKind::OneDimensional => 0,
        ObjMappingKind::TwoDimensional => TWO_D_TILE_STRIDE,
    }
}
