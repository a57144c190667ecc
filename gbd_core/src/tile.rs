//! Decoding of the 2bpp planar tile format stored in tile memory.
//!
//! Each tile is 16 bytes: two bytes per row, low bitplane first. Bit 7 of
//! each plane byte is the leftmost pixel, so the color index of pixel x is
//! built from bit (7 - x) of both planes.
use intbits::Bits;

/// Size of one tile in bytes.
pub const TILE_BYTES: usize = 16;

/// Number of tiles in one 8 KiB tile memory bank.
pub const TILE_COUNT: usize = 384;

/// Width and height of a tile in pixels.
pub const TILE_DIM: usize = 8;

const TILE_BASE_ADDR: u16 = 0x8000;

/// Decoded 8x8 tile. Each entry is a 2-bit color index (0..=3).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TilePixels([[u8; TILE_DIM]; TILE_DIM]);

impl TilePixels {
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.0[y][x]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8; TILE_DIM]> {
        self.0.iter()
    }
}

/// Returns the CPU-visible address of the first byte of a tile.
pub fn tile_address(tile_index: usize) -> u16 {
    TILE_BASE_ADDR + (tile_index * TILE_BYTES) as u16
}

/// Decodes a single pixel of a tile, applying optional mirroring.
///
/// `tile` must be the 16 bytes of one tile. Pure lookup, no bounds or
/// validity checks beyond slice indexing.
pub fn decode_pixel(tile: &[u8], x: usize, y: usize, flip_h: bool, flip_v: bool) -> u8 {
    let x = if flip_h { TILE_DIM - 1 - x } else { x };
    let y = if flip_v { TILE_DIM - 1 - y } else { y };
    let low = tile[y * 2];
    let high = tile[y * 2 + 1];
    let bit = TILE_DIM - 1 - x;
    ((high.bit(bit) as u8) << 1) | (low.bit(bit) as u8)
}

/// Decodes tile `tile_index` out of a tile memory bank.
///
/// The caller is responsible for clamping `tile_index` below [TILE_COUNT].
pub fn decode_tile(bank: &[u8], tile_index: usize) -> TilePixels {
    decode_tile_flipped(bank, tile_index, false, false)
}

/// Decodes a tile with optional horizontal and vertical mirroring applied.
pub fn decode_tile_flipped(bank: &[u8], tile_index: usize, flip_h: bool, flip_v: bool) -> TilePixels {
    let offset = tile_index * TILE_BYTES;
    let tile = &bank[offset..offset + TILE_BYTES];
    let mut pixels = [[0_u8; TILE_DIM]; TILE_DIM];
    for (y, row) in pixels.iter_mut().enumerate() {
        for (x, pixel) in row.iter_mut().enumerate() {
            *pixel = decode_pixel(tile, x, y, flip_h, flip_v);
        }
    }
    TilePixels(pixels)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn encode_tile(pixels: &TilePixels) -> [u8; TILE_BYTES] {
        let mut data = [0_u8; TILE_BYTES];
        for y in 0..TILE_DIM {
            for x in 0..TILE_DIM {
                let index = pixels.pixel(x, y);
                let bit = TILE_DIM - 1 - x;
                data[y * 2].set_bit(bit, index.bit(0));
                data[y * 2 + 1].set_bit(bit, index.bit(1));
            }
        }
        data
    }

    #[test]
    fn decode_known_rows() {
        let mut bank = vec![0_u8; TILE_COUNT * TILE_BYTES];
        // Row 0: low plane only -> all pixels 1
        bank[0] = 0xFF;
        bank[1] = 0x00;
        // Row 1: high plane only -> all pixels 2
        bank[2] = 0x00;
        bank[3] = 0xFF;
        // Row 2: both planes -> all pixels 3
        bank[4] = 0xFF;
        bank[5] = 0xFF;
        // Row 3: alternating planes -> pixels 1, 2, 1, 2, ...
        bank[6] = 0xAA;
        bank[7] = 0x55;

        let pixels = decode_tile(&bank, 0);
        assert_eq!(pixels.rows().next().unwrap(), &[1; 8]);
        assert_eq!(pixels.pixel(0, 1), 2);
        assert_eq!(pixels.pixel(7, 2), 3);
        assert_eq!(pixels.pixel(0, 3), 1);
        assert_eq!(pixels.pixel(1, 3), 2);
        assert_eq!(pixels.pixel(0, 4), 0);
    }

    #[test]
    fn bit7_is_leftmost_pixel() {
        let mut tile = [0_u8; TILE_BYTES];
        tile[0] = 0x80;
        assert_eq!(decode_pixel(&tile, 0, 0, false, false), 1);
        assert_eq!(decode_pixel(&tile, 7, 0, false, false), 0);
    }

    #[test]
    fn decode_encode_round_trip() {
        let mut bank = vec![0_u8; TILE_BYTES];
        for (i, byte) in bank.iter_mut().enumerate() {
            *byte = (i as u8).wrapping_mul(37).wrapping_add(11);
        }
        let pixels = decode_tile(&bank, 0);
        assert_eq!(encode_tile(&pixels).as_slice(), bank.as_slice());
    }

    #[test]
    fn flips_mirror_the_tile() {
        let mut bank = vec![0_u8; TILE_BYTES];
        bank[0] = 0x80; // pixel (0, 0) set
        let plain = decode_tile(&bank, 0);
        let flipped_h = decode_tile_flipped(&bank, 0, true, false);
        let flipped_v = decode_tile_flipped(&bank, 0, false, true);
        let flipped_both = decode_tile_flipped(&bank, 0, true, true);
        assert_eq!(plain.pixel(0, 0), 1);
        assert_eq!(flipped_h.pixel(7, 0), 1);
        assert_eq!(flipped_h.pixel(0, 0), 0);
        assert_eq!(flipped_v.pixel(0, 7), 1);
        assert_eq!(flipped_both.pixel(7, 7), 1);
    }

    #[test]
    fn mirror_symmetry_holds_for_every_pixel() {
        let mut tile = [0_u8; TILE_BYTES];
        for (i, byte) in tile.iter_mut().enumerate() {
            *byte = (i as u8).wrapping_mul(73).wrapping_add(29);
        }
        for y in 0..TILE_DIM {
            for x in 0..TILE_DIM {
                assert_eq!(
                    decode_pixel(&tile, x, y, false, false),
                    decode_pixel(&tile, 7 - x, y, true, false)
                );
                assert_eq!(
                    decode_pixel(&tile, x, y, false, false),
                    decode_pixel(&tile, x, 7 - y, false, true)
                );
            }
        }
    }

    #[test]
    fn tile_addresses() {
        assert_eq!(tile_address(0), 0x8000);
        assert_eq!(tile_address(1), 0x8010);
        assert_eq!(tile_address(383), 0x97F0);
    }
}
