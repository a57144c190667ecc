//! Debug window showing tile memory, sprites and palettes.
use egui::Color32;
use egui::Context;
use egui::Sense;
use egui::Ui;
use egui::Vec2;
use gbd_core::banks::BankRegion;
use gbd_core::banks::BankRegistry;
use gbd_core::oam::MAX_SPRITES;
use gbd_core::palette::EmulationMode;
use gbd_core::palette::PaletteKind;
use gbd_core::palette::NUM_PALETTES;
use gbd_core::tile;
use gbd_core::VramDebugger;
use gbd_core::VramSource;

use crate::util::EguiSurface;

const TILES_PER_ROW: usize = 16;

#[derive(PartialEq, Copy, Clone, strum::Display)]
enum VramViewerTabs {
    Tiles,
    Sprites,
    Palettes,
}

pub struct VramViewerWindow {
    pub open: bool,
    selected_tab: VramViewerTabs,
    tall_sprites: bool,
}

impl VramViewerWindow {
    pub fn new() -> Self {
        VramViewerWindow {
            open: true,
            selected_tab: VramViewerTabs::Tiles,
            tall_sprites: false,
        }
    }

    pub fn show(
        &mut self,
        ctx: &Context,
        debugger: &mut VramDebugger<EguiSurface>,
        banks: &BankRegistry,
    ) {
        egui::Window::new("VRAM")
            .open(&mut self.open)
            .show(ctx, |ui| {
                ui.label(format!("Mode: {}", debugger.mode()));
                tabs_widget(
                    ui,
                    &[
                        VramViewerTabs::Tiles,
                        VramViewerTabs::Sprites,
                        VramViewerTabs::Palettes,
                    ],
                    &mut self.selected_tab,
                );
                ui.separator();
                match self.selected_tab {
                    VramViewerTabs::Tiles => tiles_widget(ui, debugger, banks),
                    VramViewerTabs::Sprites => {
                        sprites_widget(ui, debugger, &mut self.tall_sprites)
                    }
                    VramViewerTabs::Palettes => palettes_widget(ui, debugger),
                }
            });
    }
}

impl Default for VramViewerWindow {
    fn default() -> Self {
        Self::new()
    }
}

fn tabs_widget<T: ToString + PartialEq + Copy>(ui: &mut Ui, tabs: &[T], selected: &mut T) {
    ui.horizontal(|ui| {
        for tab in tabs.iter() {
            ui.selectable_value(selected, *tab, tab.to_string());
        }
    });
}

fn tiles_widget(ui: &mut Ui, debugger: &mut VramDebugger<EguiSurface>, banks: &BankRegistry) {
    if debugger.mode() == EmulationMode::Cgb && banks.provided(BankRegion::Vram) {
        bank_selector_widget(ui, debugger);
    }
    debugger.render_tile_grid(banks);

    let tile_size = Vec2::splat(24.0);
    egui::ScrollArea::vertical()
        .max_height(400.0)
        .show(ui, |ui| {
            ui.spacing_mut().item_spacing = Vec2::splat(1.0);
            for row in 0..(tile::TILE_COUNT / TILES_PER_ROW) {
                ui.horizontal(|ui| {
                    for col in 0..TILES_PER_ROW {
                        let index = row * TILES_PER_ROW + col;
                        let Some(texture) = debugger.tile_surface(index).map(|s| s.id()) else {
                            continue;
                        };
                        let response = ui
                            .add(egui::Image::new((texture, tile_size)).sense(Sense::click()))
                            .on_hover_text(format!(
                                "Tile {index}\nAddress: {:04X}",
                                tile::tile_address(index)
                            ));
                        if response.clicked() {
                            debugger.select_tile(Some(index));
                        }
                    }
                });
            }
        });
    ui.separator();
    inspector_widget(ui, debugger, banks);
}

fn bank_selector_widget(ui: &mut Ui, debugger: &mut VramDebugger<EguiSurface>) {
    let mut source = debugger.vram_source();
    ui.horizontal(|ui| {
        ui.label("Source:");
        for option in [VramSource::Mapped, VramSource::Bank0, VramSource::Bank1] {
            ui.selectable_value(&mut source, option, option.to_string());
        }
    });
    debugger.set_vram_source(source);
}

fn inspector_widget(ui: &mut Ui, debugger: &mut VramDebugger<EguiSurface>, banks: &BankRegistry) {
    let Some(index) = debugger.selected_tile() else {
        ui.label("Click a tile to inspect it");
        return;
    };

    if debugger.mode() == EmulationMode::Cgb {
        let mut selected = debugger.palettes().selected(PaletteKind::Background);
        ui.horizontal(|ui| {
            ui.label("Palette:");
            for option in 0..NUM_PALETTES {
                ui.selectable_value(&mut selected, option, option.to_string());
            }
        });
        debugger.select_palette(PaletteKind::Background, selected);
    }

    if let Some(inspection) = debugger.inspect_tile(banks, index) {
        ui.horizontal(|ui| {
            ui.image((inspection.surface.id(), Vec2::splat(64.0)));
            ui.vertical(|ui| {
                ui.label(format!("Tile {}", inspection.index));
                ui.label(format!(
                    "Address: {:04X}-{:04X}",
                    inspection.start_address, inspection.end_address
                ));
                for line in inspection.raw.chunks(8) {
                    ui.monospace(
                        line.iter()
                            .map(|byte| format!("{byte:02X}"))
                            .collect::<Vec<_>>()
                            .join(" "),
                    );
                }
            });
        });
    }
    if ui.button("Clear Selection").clicked() {
        debugger.select_tile(None);
    }
}

fn sprites_widget(ui: &mut Ui, debugger: &mut VramDebugger<EguiSurface>, tall: &mut bool) {
    ui.checkbox(tall, "8x16 sprites");
    debugger.render_sprites(*tall);

    let sprites = debugger.sprites();
    let visible = sprites.iter().filter(|sprite| sprite.is_visible()).count();
    ui.label(format!("{visible} of {MAX_SPRITES} sprites visible"));

    let sprite_size = Vec2::splat(32.0);
    for row in sprites.chunks(8) {
        ui.horizontal(|ui| {
            for sprite in row {
                let Some(texture) = debugger.sprite_surface(sprite.id, false).map(|s| s.id())
                else {
                    continue;
                };
                let tooltip = format!(
                    "{sprite}\nPalette: {}\nBank: {}\nVisible: {}",
                    if debugger.mode() == EmulationMode::Cgb {
                        sprite.cgb_palette()
                    } else {
                        sprite.dmg_palette()
                    },
                    sprite.vram_bank(),
                    sprite.is_visible()
                );
                ui.vertical(|ui| {
                    ui.add(egui::Image::new((texture, sprite_size)))
                        .on_hover_text(tooltip.as_str());
                    if *tall {
                        if let Some(bottom) =
                            debugger.sprite_surface(sprite.id, true).map(|s| s.id())
                        {
                            ui.add(egui::Image::new((bottom, sprite_size)))
                                .on_hover_text(tooltip.as_str());
                        }
                    }
                });
            }
        });
    }
}

fn palettes_widget(ui: &mut Ui, debugger: &VramDebugger<EguiSurface>) {
    // DMG only has the fixed grayscale ramp, no point repeating it 8 times.
    let rows = match debugger.mode() {
        EmulationMode::Dmg => 1,
        EmulationMode::Cgb => NUM_PALETTES,
    };
    for kind in [PaletteKind::Background, PaletteKind::Object] {
        ui.label(kind.to_string());
        for index in 0..rows {
            let palette = debugger.palettes().resolve(kind, index);
            ui.horizontal(|ui| {
                ui.monospace(format!("{index}"));
                for color in palette.0 {
                    let (rect, _) = ui.allocate_exact_size(Vec2::splat(16.0), Sense::hover());
                    ui.painter().rect_filled(
                        rect,
                        egui::CornerRadius::ZERO,
                        Color32::from_rgb(color.0[0], color.0[1], color.0[2]),
                    );
                }
            });
        }
        ui.separator();
    }
}
