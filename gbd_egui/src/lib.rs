//! egui frontend for the [gbd_core] VRAM debugger.
mod app;
mod util;
mod vram;

pub use app::DemoApp;
pub use util::EguiSurface;
pub use vram::VramViewerWindow;
