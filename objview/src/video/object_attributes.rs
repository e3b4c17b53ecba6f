//! OAM attribute decoding.
//!
//! We use nomenclature coming from <https://www.coranac.com/tonc/text/regobj.htm#sec-oam>.
//!
//! Decoding is pure and total over the full 16-bit input domain: the
//! hardware accepts every bit pattern, so reserved encodings map to
//! explicit `Prohibited` variants instead of errors, and the size table
//! returns the degenerate 8x8 fallback for the reserved shape row.

use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjMode {
    #[default]
    Normal,
    Affine,
    Disabled,
    AffineDouble,
}

impl From<u16> for ObjMode {
    fn from(value: u16) -> Self {
        match value {
            0 => Self::Normal,
            1 => Self::Affine,
            2 => Self::Disabled,
            3 => Self::AffineDouble,
            _ => unreachable!(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GfxMode {
    #[default]
    Normal,
    AlphaBlending,
    ObjectWindow,
    /// Hardware-reserved encoding (3); decoded as-is, never rejected.
    Prohibited,
}

impl From<u16> for GfxMode {
    fn from(value: u16) -> Self {
        match value {
            0 => Self::Normal,
            1 => Self::AlphaBlending,
            2 => Self::ObjectWindow,
            3 => Self::Prohibited,
            _ => unreachable!(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorMode {
    /// 16 colors, palette bank selected per sprite
    #[default]
    Palette4bpp,
    /// 256 colors, single shared bank
    Palette8bpp,
}

impl From<bool> for ColorMode {
    fn from(value: bool) -> Self {
        if value {
            Self::Palette8bpp
        } else {
            Self::Palette4bpp
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjShape {
    #[default]
    Square,
    Horizontal,
    Vertical,
    /// Hardware-reserved encoding (3); sized as 8x8 by the table.
    Prohibited,
}

impl From<u16> for ObjShape {
    fn from(value: u16) -> Self {
        match value {
            0 => Self::Square,
            1 => Self::Horizontal,
            2 => Self::Vertical,
            3 => Self::Prohibited,
            _ => unreachable!(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjSize {
    #[default]
    Size0,
    Size1,
    Size2,
    Size3,
}

impl From<u16> for ObjSize {
    fn from(value: u16) -> Self {
        match value {
            0 => Self::Size0,
            1 => Self::Size1,
            2 => Self::Size2,
            3 => Self::Size3,
            _ => unreachable!(),
        }
    }
}

/// Attribute word 0: Y position, modes, color depth, shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjAttribute0 {
    pub y_coordinate: u8,
    pub obj_mode: ObjMode,
    pub gfx_mode: GfxMode,
    pub obj_mosaic: bool,
    pub color_mode: ColorMode,
    pub obj_shape: ObjShape,
}

impl From<u16> for ObjAttribute0 {
    fn from(value: u16) -> Self {
        Self {
            y_coordinate: value.get_bits(0..=7) as u8,
            obj_mode: value.get_bits(8..=9).into(),
            gfx_mode: value.get_bits(10..=11).into(),
            obj_mosaic: value.get_bit(12),
            color_mode: value.get_bit(13).into(),
            obj_shape: value.get_bits(14..=15).into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransformationKind {
    RotationScaling {
        rotation_scaling_parameter: u8,
    },
    Flip {
        horizontal_flip: bool,
        vertical_flip: bool,
    },
}

/// Attribute word 1: X position, flip/rotation parameter, size.
///
/// Bits 9-13 are the rotation/scaling parameter index when the sprite is
/// affine, flip flags otherwise, so decoding needs word 0's mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjAttribute1 {
    pub x_coordinate: u16,
    pub transformation_kind: TransformationKind,
    pub obj_size: ObjSize,
}

impl ObjAttribute1 {
    fn from_value(value: u16, obj_mode: ObjMode) -> Self {
        Self {
            x_coordinate: value.get_bits(0..=8),
            transformation_kind: match obj_mode {
                ObjMode::Affine | ObjMode::AffineDouble => TransformationKind::RotationScaling {
                    rotation_scaling_parameter: value.get_bits(9..=13) as u8,
                },
                ObjMode::Normal | ObjMode::Disabled => TransformationKind::Flip {
                    horizontal_flip: value.get_bit(12),
                    vertical_flip: value.get_bit(13),
                },
            },
            obj_size: value.get_bits(14..=15).into(),
        }
    }
}

/// Attribute word 2: tile index, priority, palette bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjAttribute2 {
    pub tile_number: u16,
    pub priority: u8,
    pub palette_number: u8,
}

impl ObjAttribute2 {
    fn from_value(value: u16, color_mode: ColorMode) -> Self {
        Self {
            tile_number: value.get_bits(0..=9),
            priority: value.get_bits(10..=11) as u8,
            // 256-color sprites use the single shared palette bank, the
            // bank bits are meaningless for them.
            palette_number: match color_mode {
                ColorMode::Palette4bpp => value.get_bits(12..=15) as u8,
                ColorMode::Palette8bpp => 0,
            },
        }
    }
}

/// The decoded form of one OAM entry's three attribute words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjAttributes {
    pub attribute0: ObjAttribute0,
    pub attribute1: ObjAttribute1,
    pub attribute2: ObjAttribute2,
}

impl From<[u16; 3]> for ObjAttributes {
    fn from(value: [u16; 3]) -> Self {
        let attribute0 = ObjAttribute0::from(value[0]);

        Self {
            attribute0,
            attribute1: ObjAttribute1::from_value(value[1], attribute0.obj_mode),
            attribute2: ObjAttribute2::from_value(value[2], attribute0.color_mode),
        }
    }
}

/// Sprite dimensions in pixels, indexed by `shape * 4 + size`.
///
/// Reproduced from the reference hardware table; the entries do not follow
/// a closed form. The reserved shape row falls back to 8x8.
pub const OBJ_SIZES: [(u16, u16); 16] = [
    (8, 8),
    (16, 16),
    (32, 32),
    (64, 64),
    (16, 8),
    (32, 8),
    (32, 16),
    (64, 32),
    (8, 16),
    (8, 32),
    (16, 32),
    (32, 64),
    (8, 8),
    (8, 8),
    (8, 8),
    (8, 8),
];

/// Pixel (width, height) for a shape/size pair.
#[must_use]
pub const fn dimensions(shape: ObjShape, size: ObjSize) -> (u16, u16) {
    OBJ_SIZES[shape as usize * 4 + size as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::Rng;

    #[test]
    fn decode_256_color_sprite() {
        let attributes = ObjAttributes::from([0x6050, 0x8120, 0x0203]);

        assert_eq!(attributes.attribute0.y_coordinate, 0x50);
        assert_eq!(attributes.attribute0.obj_shape, ObjShape::Horizontal);
        assert_eq!(attributes.attribute0.color_mode, ColorMode::Palette8bpp);
        assert_eq!(attributes.attribute1.x_coordinate, 0x120);
        assert_eq!(attributes.attribute1.obj_size, ObjSize::Size2);
        assert_eq!(attributes.attribute2.tile_number, 0x203);
        // Palette bank bits are ignored for 256-color sprites.
        assert_eq!(attributes.attribute2.palette_number, 0);
    }

    #[test]
    fn decode_16_color_sprite() {
        let attributes = ObjAttributes::from([0x4050, 0x0120, 0x4203]);

        assert_eq!(attributes.attribute0.color_mode, ColorMode::Palette4bpp);
        assert_eq!(attributes.attribute0.obj_shape, ObjShape::Horizontal);
        assert_eq!(attributes.attribute1.obj_size, ObjSize::Size0);
        assert_eq!(attributes.attribute2.tile_number, 0x203);
        assert_eq!(attributes.attribute2.palette_number, 4);
        assert_eq!(attributes.attribute2.priority, 0);
    }

    #[test]
    fn decode_is_total_and_extracts_fields() {
        let mut rng = rand::thread_rng();

        for _ in 0..1000 {
            let a: u16 = rng.r#gen();
            let b: u16 = rng.r#gen();
            let c: u16 = rng.r#gen();

            let attributes = ObjAttributes::from([a, b, c]);

            assert_eq!(attributes.attribute0.y_coordinate as u16, a & 0xFF);
            assert_eq!(attributes.attribute0.obj_shape as u16, a >> 14);
            assert_eq!(
                attributes.attribute0.color_mode,
                ColorMode::from(a & 0x2000 != 0)
            );
            assert_eq!(attributes.attribute1.x_coordinate, b & 0x1FF);
            assert_eq!(attributes.attribute1.obj_size as u16, b >> 14);
            assert_eq!(attributes.attribute2.tile_number, c & 0x3FF);

            let expected_palette = if a & 0x2000 != 0 { 0 } else { c >> 12 };
            assert_eq!(attributes.attribute2.palette_number as u16, expected_palette);
        }
    }

    #[test]
    fn flip_and_rotation_share_the_same_bits() {
        // Normal mode: bits 12-13 are flips.
        let normal = ObjAttributes::from([0x0000, 0x3000, 0x0000]);
        assert_eq!(
            normal.attribute1.transformation_kind,
            TransformationKind::Flip {
                horizontal_flip: true,
                vertical_flip: true,
            }
        );

        // Affine mode: bits 9-13 are the parameter group index.
        let affine = ObjAttributes::from([0x0100, 0x3000, 0x0000]);
        assert_eq!(
            affine.attribute1.transformation_kind,
            TransformationKind::RotationScaling {
                rotation_scaling_parameter: 0x18,
            }
        );
    }

    #[test]
    fn reserved_encodings_decode() {
        let attributes = ObjAttributes::from([0xCC00, 0x0000, 0x0000]);
        assert_eq!(attributes.attribute0.obj_shape, ObjShape::Prohibited);
        assert_eq!(attributes.attribute0.gfx_mode, GfxMode::Prohibited);
    }

    #[test]
    fn dimensions_match_the_hardware_table() {
        assert_eq!(dimensions(ObjShape::Square, ObjSize::Size0), (8, 8));
        assert_eq!(dimensions(ObjShape::Square, ObjSize::Size3), (64, 64));
        assert_eq!(dimensions(ObjShape::Horizontal, ObjSize::Size0), (16, 8));
        assert_eq!(dimensions(ObjShape::Horizontal, ObjSize::Size2), (32, 16));
        assert_eq!(dimensions(ObjShape::Vertical, ObjSize::Size1), (8, 32));
        assert_eq!(dimensions(ObjShape::Vertical, ObjSize::Size3), (32, 64));
    }

    #[test]
    fn reserved_shape_row_is_degenerate() {
        assert_eq!(dimensions(ObjShape::Prohibited, ObjSize::Size0), (8, 8));
        assert_eq!(dimensions(ObjShape::Prohibited, ObjSize::Size3), (8, 8));
    }

    #[test]
    fn dimensions_is_idempotent() {
        let first = dimensions(ObjShape::Horizontal, ObjSize::Size3);
        let second = dimensions(ObjShape::Horizontal, ObjSize::Size3);
        assert_eq!(first, second);
        assert_eq!(first, (64, 32));
    }
}
