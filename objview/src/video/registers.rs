//! LCD I/O registers consumed by the sprite views.
//!
//! Only DISPCNT (`0x0400_0000`, I/O register index 0) matters here; the
//! single bit this crate reads from it is the OBJ character VRAM mapping
//! mode. The mapping mode is mutable runtime state of the emulated machine,
//! so it is read back out of the register on every collection access rather
//! than cached in the view.

use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;

use super::ObjMappingKind;

/// LCD control registers.
#[derive(Default, Serialize, Deserialize)]
pub struct Registers {
    /// LCD Control
    pub dispcnt: u16,
}

impl Registers {
    /// OBJ character VRAM mapping mode (DISPCNT bit 6): `1` = tiles of a
    /// multi-tile sprite are sequential in memory, `0` = they sit in a
    /// 32-tile-wide grid.
    #[must_use]
    pub fn get_obj_character_vram_mapping(&self) -> ObjMappingKind {
        self.dispcnt.get_bit(6).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn mapping_mode_follows_bit_6() {
        let mut registers = Registers::default();
        assert_eq!(
            registers.get_obj_character_vram_mapping(),
            ObjMappingKind::TwoDimensional
        );

        registers.dispcnt.set_bit_on(6);
        assert_eq!(
            registers.get_obj_character_vram_mapping(),
            ObjMappingKind::OneDimensional
        );
    }
}
