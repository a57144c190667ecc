use egui::Color32;
use egui::ColorImage;
use egui::TextureHandle;
use egui::TextureOptions;
use gbd_core::common::image::RgbaBuffer;
use gbd_core::texture::Surface;

/// GPU surface backed by an egui-managed texture.
pub struct EguiSurface {
    handle: TextureHandle,
}

impl EguiSurface {
    pub fn id(&self) -> egui::TextureId {
        self.handle.id()
    }

    pub fn size_vec2(&self) -> egui::Vec2 {
        self.handle.size_vec2()
    }
}

impl Surface for EguiSurface {
    type Context = egui::Context;

    fn create(context: &egui::Context, label: &str, size: [usize; 2]) -> Self {
        Self {
            handle: context.load_texture(
                label.to_string(),
                ColorImage::filled(size, Color32::BLACK),
                TextureOptions::NEAREST,
            ),
        }
    }

    fn upload(&mut self, image: &RgbaBuffer) {
        self.handle.set(
            ColorImage::from_rgba_unmultiplied(image.size(), image.as_raw()),
            TextureOptions::NEAREST,
        );
    }
}
