//! Palette tables for DMG grayscale and CGB color modes.
use crate::common::image::Rgb15;
use crate::common::image::Rgba32;

/// Number of background and object palettes in CGB mode.
pub const NUM_PALETTES: usize = 8;

/// Number of colors per palette.
pub const COLORS_PER_PALETTE: usize = 4;

const PALETTE_BYTES: usize = COLORS_PER_PALETTE * 2;

#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, strum::Display)]
pub enum EmulationMode {
    #[default]
    Dmg,
    Cgb,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display)]
pub enum PaletteKind {
    Background,
    Object,
}

/// Four display-ready colors indexed by a 2-bit color index.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Palette(pub [Rgba32; COLORS_PER_PALETTE]);

/// The fixed DMG grayscale ramp, lightest first.
pub const DMG_PALETTE: Palette = Palette([
    Rgba32([255, 255, 255, 255]),
    Rgba32([192, 192, 192, 255]),
    Rgba32([96, 96, 96, 255]),
    Rgba32([0, 0, 0, 255]),
]);

const BLACK_PALETTE: Palette = Palette([Rgba32([0, 0, 0, 255]); COLORS_PER_PALETTE]);

/// Parses raw CGB palette memory into groups of four RGB555 colors.
///
/// The data must be a non-empty multiple of 8 bytes covering at most
/// [NUM_PALETTES] palettes, little-endian u16 per color. Returns None on any
/// size violation.
pub fn parse_palette_ram(data: &[u8]) -> Option<Vec<[Rgb15; COLORS_PER_PALETTE]>> {
    if data.is_empty() || data.len() % PALETTE_BYTES != 0 || data.len() > NUM_PALETTES * PALETTE_BYTES
    {
        return None;
    }
    Some(
        data.chunks_exact(PALETTE_BYTES)
            .map(|chunk| {
                let mut colors = [Rgb15::default(); COLORS_PER_PALETTE];
                for (color, bytes) in colors.iter_mut().zip(chunk.chunks_exact(2)) {
                    *color = Rgb15(u16::from_le_bytes([bytes[0], bytes[1]]));
                }
                colors
            })
            .collect(),
    )
}

/// Owns the current palette tables and resolves color lookups by mode.
///
/// In DMG mode every lookup returns the fixed grayscale ramp. In CGB mode
/// lookups index the stored tables, with out-of-range palette numbers
/// clamped to the last palette.
pub struct PaletteResolver {
    mode: EmulationMode,
    background: [Palette; NUM_PALETTES],
    object: [Palette; NUM_PALETTES],
    selected_background: usize,
    selected_object: usize,
}

impl Default for PaletteResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl PaletteResolver {
    pub fn new() -> Self {
        Self {
            mode: EmulationMode::Dmg,
            background: [BLACK_PALETTE; NUM_PALETTES],
            object: [BLACK_PALETTE; NUM_PALETTES],
            selected_background: 0,
            selected_object: 0,
        }
    }

    pub fn mode(&self) -> EmulationMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: EmulationMode) {
        self.mode = mode;
    }

    /// Replaces the first `colors.len()` palettes of a table. Extra entries
    /// beyond [NUM_PALETTES] are ignored.
    pub fn set_palettes(&mut self, kind: PaletteKind, colors: &[[Rgb15; COLORS_PER_PALETTE]]) {
        let table = match kind {
            PaletteKind::Background => &mut self.background,
            PaletteKind::Object => &mut self.object,
        };
        for (slot, colors) in table.iter_mut().zip(colors.iter()) {
            *slot = Palette(colors.map(Rgba32::from));
        }
    }

    pub fn resolve(&self, kind: PaletteKind, index: usize) -> Palette {
        match self.mode {
            EmulationMode::Dmg => DMG_PALETTE,
            EmulationMode::Cgb => {
                let index = index.min(NUM_PALETTES - 1);
                match kind {
                    PaletteKind::Background => self.background[index],
                    PaletteKind::Object => self.object[index],
                }
            }
        }
    }

    pub fn selected(&self, kind: PaletteKind) -> usize {
        match kind {
            PaletteKind::Background => self.selected_background,
            PaletteKind::Object => self.selected_object,
        }
    }

    pub fn select(&mut self, kind: PaletteKind, index: usize) {
        let index = index.min(NUM_PALETTES - 1);
        match kind {
            PaletteKind::Background => self.selected_background = index,
            PaletteKind::Object => self.selected_object = index,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn red_palettes() -> Vec<[Rgb15; 4]> {
        // Every color pure red
        vec![[Rgb15(0x001F); 4]; NUM_PALETTES]
    }

    #[test]
    fn dmg_mode_always_resolves_grayscale() {
        let mut resolver = PaletteResolver::new();
        resolver.set_palettes(PaletteKind::Background, &red_palettes());
        for index in 0..16 {
            assert_eq!(resolver.resolve(PaletteKind::Background, index), DMG_PALETTE);
            assert_eq!(resolver.resolve(PaletteKind::Object, index), DMG_PALETTE);
        }
    }

    #[test]
    fn cgb_mode_resolves_stored_colors() {
        let mut resolver = PaletteResolver::new();
        resolver.set_mode(EmulationMode::Cgb);
        resolver.set_palettes(PaletteKind::Background, &red_palettes());
        let palette = resolver.resolve(PaletteKind::Background, 3);
        assert_eq!(palette.0[0], Rgba32([255, 0, 0, 255]));
        // Object table untouched
        assert_eq!(resolver.resolve(PaletteKind::Object, 0), BLACK_PALETTE);
    }

    #[test]
    fn out_of_range_palette_is_clamped() {
        let mut resolver = PaletteResolver::new();
        resolver.set_mode(EmulationMode::Cgb);
        let mut palettes = red_palettes();
        palettes[7] = [Rgb15(0x7C00); 4]; // pure blue
        resolver.set_palettes(PaletteKind::Background, &palettes);
        assert_eq!(
            resolver.resolve(PaletteKind::Background, 100),
            resolver.resolve(PaletteKind::Background, 7)
        );
        assert_eq!(
            resolver.resolve(PaletteKind::Background, 7).0[0],
            Rgba32([0, 0, 255, 255])
        );
    }

    #[test]
    fn parse_palette_ram_validates_size() {
        assert!(parse_palette_ram(&[]).is_none());
        assert!(parse_palette_ram(&[0; 7]).is_none());
        assert!(parse_palette_ram(&[0; 72]).is_none());
        assert_eq!(parse_palette_ram(&[0; 16]).unwrap().len(), 2);
    }

    #[test]
    fn parse_palette_ram_little_endian() {
        let mut data = [0_u8; 8];
        data[2] = 0x1F; // color 1 = 0x001F, pure red
        data[5] = 0x7C; // color 2 = 0x7C00, pure blue
        let palettes = parse_palette_ram(&data).unwrap();
        assert_eq!(palettes[0][1], Rgb15(0x001F));
        assert_eq!(palettes[0][2], Rgb15(0x7C00));
    }

    #[test]
    fn selection_is_clamped() {
        let mut resolver = PaletteResolver::new();
        resolver.select(PaletteKind::Background, 100);
        assert_eq!(resolver.selected(PaletteKind::Background), 7);
        resolver.select(PaletteKind::Object, 3);
        assert_eq!(resolver.selected(PaletteKind::Object), 3);
    }
}
