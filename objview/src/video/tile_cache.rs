//! Decoded-tile cache.
//!
//! Tiles are 8x8 pixel blocks stored in VRAM as packed palette indices;
//! resolving one means walking its bytes and looking every index up in
//! palette RAM. The cache keeps resolved blocks keyed by
//! (tile base, palette base, tile index, color depth) so that repeated
//! sprite constitution does not re-decode the same tiles.
//!
//! # Lifecycle
//!
//! A cache is born *unassociated*. [`TileCache::associate`] binds it to a
//! live memory region through a weak handle (the cache never owns the
//! region), after which [`TileCache::lookup`] may be called.
//! [`TileCache::invalidate_association`] drops the handle and every cached
//! entry; dropping the cache performs the same invalidation implicitly, so
//! no explicit teardown call is required before deinit.
//!
//! Looking up through an unassociated cache, or through one whose region
//! has been dropped, is a lifecycle contract violation by the embedder and
//! panics; it is never reported as a recoverable error.
//!
//! # Staleness
//!
//! Entries record the region's generation counter at decode time. A lookup
//! that finds an entry decoded under an older generation re-decodes it, so
//! tile and palette writes are picked up on the next access.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use super::Color;
use super::memory::{Memory, OBJ_TILE_DATA_SIZE};
use super::object_attributes::ColorMode;

/// One resolved 8x8 tile, row-major.
pub type TilePixels = [Color; 64];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct TileKey {
    tile_base: usize,
    palette_base: usize,
    tile_index: u16,
    color_mode: ColorMode,
}

struct CachedTile {
    pixels: TilePixels,
    generation: u64,
}

pub struct TileCache {
    entries: HashMap<TileKey, CachedTile>,
    association: Option<Weak<Mutex<Memory>>>,
}

impl Default for TileCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TileCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            association: None,
        }
    }

    #[must_use]
    pub const fn is_associated(&self) -> bool {
        self.association.is_some()
    }

    /// Number of resolved tiles currently held.
    #[must_use]
    pub fn cached_tiles(&self) -> usize {
        self.entries.len()
    }

    /// Binds the cache to a live memory region.
    ///
    /// # Panics
    ///
    /// Panics if the cache is already associated; the previous binding must
    /// be cleared with [`Self::invalidate_association`] first.
    pub fn associate(&mut self, region: &Arc<Mutex<Memory>>) {
        assert!(
            self.association.is_none(),
            "tile cache is already associated with a video memory region"
        );
        self.association = Some(Arc::downgrade(region));
        logger::log("tile cache associated");
    }

    /// Clears the region binding and every cached entry.
    pub fn invalidate_association(&mut self) {
        self.association = None;
        self.entries.clear();
        logger::log("tile cache association invalidated");
    }

    /// Resolves one tile, decoding and storing it on miss or staleness.
    ///
    /// `tile_base` is the byte offset in VRAM of the character region the
    /// index counts from. Tile indices advance in 32-byte steps regardless
    /// of depth (an 8bpp tile spans two index slots), and byte offsets wrap
    /// inside the 32 KiB character region as on hardware.
    ///
    /// # Panics
    ///
    /// Panics if the cache is unassociated or the associated region has
    /// been dropped.
    pub fn lookup(
        &mut self,
        tile_index: u16,
        palette_id: u8,
        color_mode: ColorMode,
        tile_base: usize,
    ) -> &TilePixels {
        let association = self
            .association
            .as_ref()
            .expect("tile cache lookup while unassociated");
        let region = association
            .upgrade()
            .expect("tile cache region was dropped before the association was invalidated");
        let memory = region.lock().unwrap();

        let tile_index = tile_index & 0x3FF;
        let palette_base = match color_mode {
            ColorMode::Palette4bpp => usize::from(palette_id) * 0x20,
            ColorMode::Palette8bpp => 0,
        };
        let key = TileKey {
            tile_base,
            palette_base,
            tile_index,
            color_mode,
        };

        let generation = memory.generation();
        let fresh = self
            .entries
            .get(&key)
            .is_some_and(|entry| entry.generation == generation);

        if !fresh {
            let pixels = match color_mode {
                ColorMode::Palette4bpp => {
                    decode_tile_4bpp(&memory, tile_base, tile_index, palette_id)
                }
                ColorMode::Palette8bpp => decode_tile_8bpp(&memory, tile_base, tile_index),
            };
            self.entries.insert(key, CachedTile { pixels, generation });
        }

        &self.entries[&key].pixels
    }
}

impl Drop for TileCache {
    fn drop(&mut self) {
        self.invalidate_association();
    }
}

/// 4bpp: 32 bytes per tile, two pixels per byte, low nibble is the even x.
/// The nibble indexes into the sprite's 16-color palette bank.
fn decode_tile_4bpp(
    memory: &Memory,
    tile_base: usize,
    tile_index: u16,
    palette_id: u8,
) -> TilePixels {
    let mut pixels = [Color::default(); 64];
    let vram = memory.vram();
    let tile_offset = usize::from(tile_index) * 32;
    let bank = usize::from(palette_id) * 16;

    for row in 0..8 {
        for pair in 0..4 {
            let byte = vram[tile_base + ((tile_offset + row * 4 + pair) & (OBJ_TILE_DATA_SIZE - 1))];

            pixels[row * 8 + pair * 2] = memory.obj_palette_color(bank + usize::from(byte & 0x0F));
            pixels[row * 8 + pair * 2 + 1] = memory.obj_palette_color(bank + usize::from(byte >> 4));
        }
    }

    pixels
}

/// 8bpp: 64 bytes per tile, each byte an index into the shared 256-color
/// palette.
fn decode_tile_8bpp(memory: &Memory, tile_base: usize, tile_index: u16) -> TilePixels {
    let mut pixels = [Color::default(); 64];
    let vram = memory.vram();
    let tile_offset = usize::from(tile_index) * 32;

    for (i, pixel) in pixels.iter_mut().enumerate() {
        let byte = vram[tile_base + ((tile_offset + i) & (OBJ_TILE_DATA_SIZE - 1))];
        *pixel = memory.obj_palette_color(usize::from(byte));
    }

    pixels
}
