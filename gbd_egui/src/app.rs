//! Demo shell that feeds a synthetic memory snapshot into the viewer.
use eframe::CreationContext;
use eframe::Frame;
use egui::Context;
use gbd_core::banks::BankRegistry;
use gbd_core::banks::VRAM_BANK_SIZE;
use gbd_core::palette::EmulationMode;
use gbd_core::tile::TILE_BYTES;
use gbd_core::tile::TILE_COUNT;
use gbd_core::VramDebugger;
use gbd_core::SNAPSHOT_SIZE;

use crate::util::EguiSurface;
use crate::vram::VramViewerWindow;

pub struct DemoApp {
    debugger: VramDebugger<EguiSurface>,
    viewer: VramViewerWindow,
    memory: Vec<u8>,
    vram_bank1: Vec<u8>,
    frame_count: u64,
}

impl DemoApp {
    pub fn new(cc: &CreationContext<'_>, cgb: bool) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());
        DemoApp {
            debugger: VramDebugger::new(cc.egui_ctx.clone()),
            viewer: VramViewerWindow::new(),
            memory: demo_memory(cgb),
            vram_bank1: demo_bank1(),
            frame_count: 0,
        }
    }
}

impl eframe::App for DemoApp {
    fn update(&mut self, ctx: &Context, _frame: &mut Frame) {
        self.frame_count += 1;
        // Move sprite 0 around to show live snapshot updates
        self.memory[0xFE00] = 16 + ((self.frame_count / 4) % 120) as u8;

        self.debugger.update_memory(&self.memory);
        if self.debugger.mode() == EmulationMode::Cgb {
            self.debugger.update_vram(&self.vram_bank1, 1);
            self.debugger
                .update_palettes(Some(&demo_palette_ram(0)), Some(&demo_palette_ram(7)));
        }

        let mut banks = BankRegistry::new();
        if !banks.set_vram_bank(0, &self.memory[0x8000..0x8000 + VRAM_BANK_SIZE])
            || !banks.set_vram_bank(1, &self.vram_bank1)
        {
            log::error!("failed to register demo VRAM banks");
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            if ui.button("VRAM Viewer").clicked() {
                self.viewer.open = true;
            }
        });
        self.viewer.show(ctx, &mut self.debugger, &banks);
        ctx.request_repaint();
    }
}

fn demo_memory(cgb: bool) -> Vec<u8> {
    let mut memory = vec![0_u8; SNAPSHOT_SIZE];
    if cgb {
        memory[0x0143] = 0x80;
    }
    for tile in 0..TILE_COUNT {
        let base = 0x8000 + tile * TILE_BYTES;
        for row in 0..8 {
            let (low, high) = demo_tile_row(tile, row);
            memory[base + row * 2] = low;
            memory[base + row * 2 + 1] = high;
        }
    }
    for sprite in 0..10_usize {
        let base = 0xFE00 + sprite * 4;
        memory[base] = 16 + sprite as u8 * 12;
        memory[base + 1] = 8 + sprite as u8 * 14;
        memory[base + 2] = sprite as u8 * 2;
        memory[base + 3] = (sprite as u8 % 8) | if sprite % 3 == 0 { 0x20 } else { 0 };
    }
    memory
}

fn demo_tile_row(tile: usize, row: usize) -> (u8, u8) {
    match tile % 4 {
        0 => (
            0xAA_u8.rotate_left(row as u32),
            0x55_u8.rotate_left(row as u32),
        ),
        1 => (if row % 2 == 0 { 0xFF } else { 0x00 }, 0x00),
        2 => (0xFF, if row < 4 { 0x00 } else { 0xFF }),
        _ => (0x18, 0x3C),
    }
}

fn demo_bank1() -> Vec<u8> {
    let mut bank = vec![0_u8; VRAM_BANK_SIZE];
    for tile in 0..TILE_COUNT {
        let base = tile * TILE_BYTES;
        for row in 0..8 {
            let (low, high) = demo_tile_row(tile, row);
            // Inverted patterns so the banks are easy to tell apart
            bank[base + row * 2] = !low;
            bank[base + row * 2 + 1] = !high;
        }
    }
    bank
}

fn demo_palette_ram(seed: u16) -> Vec<u8> {
    let mut data = Vec::with_capacity(64);
    for palette in 0..8_u16 {
        for color in 0..4_u16 {
            let r = (palette * 4 + seed) & 0x1F;
            let g = color * 10;
            let b = 0x1F - ((palette * 3) & 0x1F);
            data.extend_from_slice(&(r | (g << 5) | (b << 10)).to_le_bytes());
        }
    }
    data
}
