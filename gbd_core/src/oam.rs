//! Parsing of the 160-byte sprite attribute table (OAM).
use std::fmt::Display;
use std::fmt::Formatter;

use intbits::Bits;

/// Size of the sprite attribute table in bytes.
pub const OAM_SIZE: usize = 160;

/// Number of sprite entries in the table.
pub const MAX_SPRITES: usize = 40;

const ENTRY_BYTES: usize = 4;

/// One sprite attribute entry.
///
/// Stored coordinates are hardware values offset by (8, 16) from screen
/// coordinates. The attribute byte is kept raw and decoded lazily, so both
/// the DMG and CGB interpretation of bit 4 stay available.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct OamEntry {
    pub id: usize,
    pub y: u8,
    pub x: u8,
    pub tile: u8,
    pub flags: u8,
}

impl OamEntry {
    fn new(id: usize, data: [u8; ENTRY_BYTES]) -> Self {
        Self {
            id,
            y: data[0],
            x: data[1],
            tile: data[2],
            flags: data[3],
        }
    }

    /// Background colors 1-3 draw over this sprite.
    pub fn behind_background(&self) -> bool {
        self.flags.bit(7)
    }

    pub fn flip_v(&self) -> bool {
        self.flags.bit(6)
    }

    pub fn flip_h(&self) -> bool {
        self.flags.bit(5)
    }

    /// DMG object palette number (OBP0 or OBP1).
    pub fn dmg_palette(&self) -> u8 {
        self.flags.bit(4) as u8
    }

    /// Tile memory bank holding this sprite's tile (CGB only).
    pub fn vram_bank(&self) -> u8 {
        self.flags.bit(3) as u8
    }

    /// CGB object palette number (0..=7).
    pub fn cgb_palette(&self) -> u8 {
        self.flags.bits(0..=2)
    }

    pub fn screen_x(&self) -> i32 {
        self.x as i32 - 8
    }

    pub fn screen_y(&self) -> i32 {
        self.y as i32 - 16
    }

    /// True if any part of the sprite can appear on screen. Stored
    /// coordinates of 0 or beyond the display edge hide the sprite.
    pub fn is_visible(&self) -> bool {
        self.y > 0 && self.y < 160 && self.x > 0 && self.x < 168
    }
}

impl Display for OamEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Sprite {}: ({}, {}) tile {} flags {:02X}",
            self.id,
            self.screen_x(),
            self.screen_y(),
            self.tile,
            self.flags
        )
    }
}

/// Parses a full OAM snapshot into 40 entries.
///
/// All-or-nothing: a snapshot smaller than [OAM_SIZE] yields an empty vec.
pub fn parse_oam(data: &[u8]) -> Vec<OamEntry> {
    if data.len() < OAM_SIZE {
        log::warn!("rejected OAM data: {} bytes, expected {OAM_SIZE}", data.len());
        return Vec::new();
    }
    (0..MAX_SPRITES)
        .map(|id| {
            let offset = id * ENTRY_BYTES;
            OamEntry::new(id, data[offset..offset + ENTRY_BYTES].try_into().unwrap())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn entry(y: u8, x: u8, tile: u8, flags: u8) -> OamEntry {
        OamEntry::new(0, [y, x, tile, flags])
    }

    #[test]
    fn parse_full_table() {
        let mut data = vec![0_u8; OAM_SIZE];
        data[4] = 80; // sprite 1 y
        data[5] = 16; // sprite 1 x
        data[6] = 0x42;
        data[7] = 0xF0;
        let sprites = parse_oam(&data);
        assert_eq!(sprites.len(), MAX_SPRITES);
        assert_eq!(
            sprites[1],
            OamEntry {
                id: 1,
                y: 80,
                x: 16,
                tile: 0x42,
                flags: 0xF0
            }
        );
        assert_eq!(sprites[0], entry(0, 0, 0, 0));
    }

    #[test]
    fn zeroed_table_parses_as_hidden_sprites() {
        let sprites = parse_oam(&[0_u8; OAM_SIZE]);
        assert_eq!(sprites.len(), MAX_SPRITES);
        assert!(sprites.iter().all(|sprite| !sprite.is_visible()));
    }

    #[test]
    fn short_table_yields_nothing() {
        assert_eq!(parse_oam(&[0_u8; OAM_SIZE - 1]), Vec::new());
        assert_eq!(parse_oam(&[]), Vec::new());
    }

    #[test]
    fn attribute_bits() {
        let sprite = entry(0, 0, 0, 0b1010_1101);
        assert!(sprite.behind_background());
        assert!(!sprite.flip_v());
        assert!(sprite.flip_h());
        assert_eq!(sprite.dmg_palette(), 0);
        assert_eq!(sprite.vram_bank(), 1);
        assert_eq!(sprite.cgb_palette(), 5);
    }

    #[test]
    fn screen_coordinates_are_offset() {
        let sprite = entry(16, 8, 0, 0);
        assert_eq!(sprite.screen_x(), 0);
        assert_eq!(sprite.screen_y(), 0);
        let sprite = entry(0, 0, 0, 0);
        assert_eq!(sprite.screen_x(), -8);
        assert_eq!(sprite.screen_y(), -16);
    }

    #[test]
    fn visibility_boundaries() {
        assert!(entry(1, 1, 0, 0).is_visible());
        assert!(entry(159, 167, 0, 0).is_visible());
        assert!(!entry(0, 1, 0, 0).is_visible());
        assert!(!entry(160, 1, 0, 0).is_visible());
        assert!(!entry(1, 0, 0, 0).is_visible());
        assert!(!entry(1, 168, 0, 0).is_visible());
    }
}
