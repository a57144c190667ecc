//! Emulator-agnostic debugger core for Game Boy graphics memory.
//!
//! [VramDebugger] consumes raw memory snapshots from a running emulator and
//! renders tile, sprite and palette views into pooled GPU surfaces. It is
//! generic over the [texture::Surface] backend so the same core runs under
//! egui and in headless tests.
pub mod banks;
pub mod common;
pub mod oam;
pub mod palette;
pub mod texture;
pub mod tile;

use banks::BankRegion;
use banks::BankRegistry;
use banks::MAX_VRAM_BANKS;
use banks::VRAM_BANK_SIZE;
use oam::OamEntry;
use oam::MAX_SPRITES;
use oam::OAM_SIZE;
use palette::EmulationMode;
use palette::Palette;
use palette::PaletteKind;
use palette::PaletteResolver;
use texture::Surface;
use texture::TexturePool;
use tile::TilePixels;
use tile::TILE_BYTES;
use tile::TILE_COUNT;

/// Size of a full CPU address space snapshot.
pub const SNAPSHOT_SIZE: usize = 0x10000;

const VRAM_BASE: usize = 0x8000;
const OAM_BASE: usize = 0xFE00;
const CGB_FLAG_ADDR: usize = 0x0143;

const TILES_PER_ROW: usize = 16;
const TILE_GRID_SCALE: usize = 2;
const SPRITE_SCALE: usize = 4;
const INSPECTOR_SCALE: usize = 8;

/// Which view of tile memory the tile grid and inspector read from.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, strum::Display)]
pub enum VramSource {
    /// The CPU-mapped 0x8000..=0x9FFF region from the latest snapshot.
    #[default]
    Mapped,
    Bank0,
    Bank1,
}

impl VramSource {
    pub fn bank_index(&self) -> Option<usize> {
        match self {
            VramSource::Mapped => None,
            VramSource::Bank0 => Some(0),
            VramSource::Bank1 => Some(1),
        }
    }
}

/// Everything known about one tile, for the inspector view.
pub struct TileInspection<'a, S> {
    pub index: usize,
    pub start_address: u16,
    pub end_address: u16,
    pub raw: [u8; TILE_BYTES],
    pub pixels: TilePixels,
    pub palette: Palette,
    pub surface: &'a S,
}

/// Coordinates snapshot ingestion, decoding and surface pooling.
///
/// Mutation entry points validate their input and return false without
/// touching any state when it is malformed. Rendering reads the latest
/// accepted snapshots, so a rejected update leaves the views showing the
/// previous data.
pub struct VramDebugger<S: Surface> {
    mode: EmulationMode,
    vram: [Vec<u8>; MAX_VRAM_BANKS],
    oam: Vec<u8>,
    snapshot: Vec<u8>,
    snapshot_valid: bool,
    palettes: PaletteResolver,
    vram_source: VramSource,
    selected_tile: Option<usize>,
    tall_sprites: bool,
    tile_pool: TexturePool<S>,
    sprite_pool: TexturePool<S>,
    inspector_pool: TexturePool<S>,
}

impl<S: Surface> VramDebugger<S> {
    pub fn new(context: S::Context) -> Self {
        Self {
            mode: EmulationMode::Dmg,
            vram: [vec![0; VRAM_BANK_SIZE], vec![0; VRAM_BANK_SIZE]],
            oam: vec![0; OAM_SIZE],
            snapshot: vec![0; SNAPSHOT_SIZE],
            snapshot_valid: false,
            palettes: PaletteResolver::new(),
            vram_source: VramSource::Mapped,
            selected_tile: None,
            tall_sprites: false,
            tile_pool: TexturePool::new(context.clone(), "tile_grid"),
            sprite_pool: TexturePool::new(context.clone(), "sprites"),
            inspector_pool: TexturePool::new(context, "inspector"),
        }
    }

    pub fn mode(&self) -> EmulationMode {
        self.mode
    }

    /// Switches between DMG and CGB interpretation. On a change the tile
    /// memory source resets to the mapped view and all surfaces re-render.
    pub fn set_mode(&mut self, mode: EmulationMode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        self.palettes.set_mode(mode);
        self.vram_source = VramSource::Mapped;
        self.mark_surfaces_dirty();
    }

    /// Copies one bank of tile memory into the debugger. The data must be
    /// exactly [VRAM_BANK_SIZE] bytes. In DMG mode updates to bank 1 are
    /// accepted but ignored, since the hardware has no second bank.
    pub fn update_vram(&mut self, data: &[u8], bank: usize) -> bool {
        if data.len() != VRAM_BANK_SIZE {
            log::warn!(
                "rejected VRAM update: {} bytes, expected {VRAM_BANK_SIZE}",
                data.len()
            );
            return false;
        }
        if bank >= MAX_VRAM_BANKS {
            log::warn!("rejected VRAM update for bank {bank}");
            return false;
        }
        if self.mode == EmulationMode::Dmg && bank != 0 {
            return true;
        }
        self.vram[bank].copy_from_slice(data);
        self.mark_surfaces_dirty();
        true
    }

    /// Copies a full OAM snapshot. The data must be exactly [OAM_SIZE] bytes.
    pub fn update_oam(&mut self, data: &[u8]) -> bool {
        if data.len() != OAM_SIZE {
            log::warn!(
                "rejected OAM update: {} bytes, expected {OAM_SIZE}",
                data.len()
            );
            return false;
        }
        self.oam.copy_from_slice(data);
        self.sprite_pool.mark_all_dirty();
        true
    }

    /// Replaces the background and/or object palette tables from raw CGB
    /// palette memory. Both arguments are validated before either table is
    /// touched, so a malformed call changes nothing.
    pub fn update_palettes(&mut self, background: Option<&[u8]>, object: Option<&[u8]>) -> bool {
        let background = match background {
            Some(data) => match palette::parse_palette_ram(data) {
                Some(palettes) => Some(palettes),
                None => {
                    log::warn!("rejected background palette data: {} bytes", data.len());
                    return false;
                }
            },
            None => None,
        };
        let object = match object {
            Some(data) => match palette::parse_palette_ram(data) {
                Some(palettes) => Some(palettes),
                None => {
                    log::warn!("rejected object palette data: {} bytes", data.len());
                    return false;
                }
            },
            None => None,
        };
        if background.is_none() && object.is_none() {
            return false;
        }
        if let Some(palettes) = background {
            self.palettes.set_palettes(PaletteKind::Background, &palettes);
        }
        if let Some(palettes) = object {
            self.palettes.set_palettes(PaletteKind::Object, &palettes);
        }
        self.mark_surfaces_dirty();
        true
    }

    /// Ingests a full 64 KiB address space snapshot: detects the hardware
    /// mode from the CGB flag at 0x0143, then extracts the mapped tile
    /// memory and OAM regions.
    ///
    /// The detection is advisory. A later [VramDebugger::set_mode] call
    /// overrides it until the next snapshot.
    pub fn update_memory(&mut self, data: &[u8]) -> bool {
        if data.len() != SNAPSHOT_SIZE {
            log::warn!(
                "rejected memory snapshot: {} bytes, expected {SNAPSHOT_SIZE}",
                data.len()
            );
            return false;
        }
        let cgb_flag = data[CGB_FLAG_ADDR];
        let mode = if cgb_flag == 0x80 || cgb_flag == 0xC0 {
            EmulationMode::Cgb
        } else {
            EmulationMode::Dmg
        };
        self.set_mode(mode);
        self.snapshot.copy_from_slice(data);
        self.snapshot_valid = true;
        self.update_vram(&data[VRAM_BASE..VRAM_BASE + VRAM_BANK_SIZE], 0);
        self.update_oam(&data[OAM_BASE..OAM_BASE + OAM_SIZE]);
        true
    }

    pub fn vram_source(&self) -> VramSource {
        self.vram_source
    }

    pub fn set_vram_source(&mut self, source: VramSource) {
        if self.vram_source != source {
            self.vram_source = source;
            self.mark_surfaces_dirty();
        }
    }

    pub fn selected_tile(&self) -> Option<usize> {
        self.selected_tile
    }

    pub fn select_tile(&mut self, index: Option<usize>) {
        self.selected_tile = index.filter(|index| *index < TILE_COUNT);
    }

    pub fn palettes(&self) -> &PaletteResolver {
        &self.palettes
    }

    pub fn select_palette(&mut self, kind: PaletteKind, index: usize) {
        self.palettes.select(kind, index);
    }

    /// Renders all 384 tiles of the active tile memory source into the tile
    /// grid pool, re-uploading only dirty entries.
    pub fn render_tile_grid(&mut self, banks: &BankRegistry) {
        let rows = (TILE_COUNT + TILES_PER_ROW - 1) / TILES_PER_ROW;
        self.tile_pool
            .reinitialize_if_needed(rows, TILES_PER_ROW, TILE_GRID_SCALE);
        let palette = self.palettes.resolve(PaletteKind::Background, 0);
        let source = match self.vram_source.bank_index() {
            Some(bank) => banks.select_source(BankRegion::Vram, bank, &self.vram[0]),
            None => self.vram[0].as_slice(),
        };
        for index in 0..TILE_COUNT {
            let row = index / TILES_PER_ROW;
            let col = index % TILES_PER_ROW;
            if !self.tile_pool.is_dirty(row, col) {
                continue;
            }
            let image = texture::tile_to_rgba(
                &tile::decode_tile(source, index),
                &palette,
                TILE_GRID_SCALE,
            );
            self.tile_pool.update_at(row, col, &image);
        }
    }

    pub fn tile_surface(&self, index: usize) -> Option<&S> {
        self.tile_pool
            .surface(index / TILES_PER_ROW, index % TILES_PER_ROW)
    }

    /// Renders all 40 sprites into the sprite pool. Column 0 holds the
    /// sprite tile, column 1 the bottom half in 8x16 mode. Sprites read the
    /// debugger's own bank copies: in CGB mode the bank named by the sprite
    /// attributes, in DMG mode always bank 0.
    pub fn render_sprites(&mut self, tall: bool) {
        if tall != self.tall_sprites {
            self.tall_sprites = tall;
            self.sprite_pool.mark_all_dirty();
        }
        self.sprite_pool
            .reinitialize_if_needed(MAX_SPRITES, 2, SPRITE_SCALE);
        for sprite in oam::parse_oam(&self.oam) {
            // Only the bottom-half column matters in 8x16 mode.
            let dirty = self.sprite_pool.is_dirty(sprite.id, 0)
                || (tall && self.sprite_pool.is_dirty(sprite.id, 1));
            if !dirty {
                continue;
            }
            let bank = match self.mode {
                EmulationMode::Cgb => &self.vram[sprite.vram_bank() as usize],
                EmulationMode::Dmg => &self.vram[0],
            };
            let palette = match self.mode {
                EmulationMode::Cgb => self
                    .palettes
                    .resolve(PaletteKind::Object, sprite.cgb_palette() as usize),
                EmulationMode::Dmg => self
                    .palettes
                    .resolve(PaletteKind::Object, sprite.dmg_palette() as usize),
            };
            // In 8x16 mode the hardware ignores bit 0 of the tile index.
            let top_index = if tall {
                (sprite.tile & 0xFE) as usize
            } else {
                sprite.tile as usize
            };
            let top = tile::decode_tile_flipped(bank, top_index, sprite.flip_h(), sprite.flip_v());
            let image = texture::tile_to_rgba(&top, &palette, SPRITE_SCALE);
            self.sprite_pool.update_at(sprite.id, 0, &image);
            if tall {
                let bottom = tile::decode_tile_flipped(
                    bank,
                    top_index | 1,
                    sprite.flip_h(),
                    sprite.flip_v(),
                );
                let image = texture::tile_to_rgba(&bottom, &palette, SPRITE_SCALE);
                self.sprite_pool.update_at(sprite.id, 1, &image);
            }
        }
    }

    pub fn sprite_surface(&self, id: usize, bottom_half: bool) -> Option<&S> {
        self.sprite_pool.surface(id, bottom_half as usize)
    }

    /// Parses the current OAM snapshot into sprite entries.
    pub fn sprites(&self) -> Vec<OamEntry> {
        oam::parse_oam(&self.oam)
    }

    /// Decodes and renders a single tile for the inspector, returning its
    /// raw bytes, address range and decoded pixels alongside the surface.
    /// None for out-of-range indices.
    pub fn inspect_tile(&mut self, banks: &BankRegistry, index: usize) -> Option<TileInspection<'_, S>> {
        if index >= TILE_COUNT {
            return None;
        }
        self.inspector_pool.reinitialize_if_needed(1, 1, INSPECTOR_SCALE);
        // The inspected tile can change every call, so always re-render.
        self.inspector_pool.mark_all_dirty();
        let palette = self.palettes.resolve(
            PaletteKind::Background,
            self.palettes.selected(PaletteKind::Background),
        );
        let source = match self.vram_source.bank_index() {
            Some(bank) => banks.select_source(BankRegion::Vram, bank, &self.vram[0]),
            None => self.vram[0].as_slice(),
        };
        let pixels = tile::decode_tile(source, index);
        let mut raw = [0_u8; TILE_BYTES];
        raw.copy_from_slice(&source[index * TILE_BYTES..(index + 1) * TILE_BYTES]);
        let image = texture::tile_to_rgba(&pixels, &palette, INSPECTOR_SCALE);
        self.inspector_pool.update_at(0, 0, &image);
        let start_address = tile::tile_address(index);
        Some(TileInspection {
            index,
            start_address,
            end_address: start_address + TILE_BYTES as u16 - 1,
            raw,
            pixels,
            palette,
            surface: self.inspector_pool.surface(0, 0)?,
        })
    }

    /// Returns the byte at `addr` after bank resolution for a banked region,
    /// for hex display. None before the first full snapshot or for addresses
    /// outside the region.
    pub fn effective_byte(
        &self,
        banks: &BankRegistry,
        region: BankRegion,
        addr: u16,
        requested_bank: usize,
    ) -> Option<u8> {
        if !self.snapshot_valid {
            return None;
        }
        let (start, end) = match region {
            BankRegion::Rom => (0x4000_u16, 0x7FFF_u16),
            BankRegion::Vram => (0x8000, 0x9FFF),
            BankRegion::Ram => (0xA000, 0xBFFF),
        };
        if !(start..=end).contains(&addr) {
            return None;
        }
        let mapped = &self.snapshot[start as usize..=end as usize];
        let source = banks.select_source(region, requested_bank, mapped);
        source.get((addr - start) as usize).copied()
    }

    /// Drops all pooled surfaces, e.g. when the render backend goes away.
    /// They are reallocated lazily by the next render call.
    pub fn clear_surfaces(&mut self) {
        self.tile_pool.clear();
        self.sprite_pool.clear();
        self.inspector_pool.clear();
    }

    fn mark_surfaces_dirty(&mut self) {
        self.tile_pool.mark_all_dirty();
        self.sprite_pool.mark_all_dirty();
        self.inspector_pool.mark_all_dirty();
    }
}
