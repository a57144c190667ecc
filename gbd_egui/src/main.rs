use argh::FromArgs;
use gbd_core::common::logging;
use gbd_egui::DemoApp;

/// Game Boy VRAM viewer demo
#[derive(FromArgs)]
struct GbdArgs {
    /// run the demo in CGB color mode
    #[argh(switch)]
    cgb: bool,
}

fn main() -> anyhow::Result<()> {
    logging::init();
    let args: GbdArgs = argh::from_env();

    let native_options = eframe::NativeOptions {
        ..Default::default()
    };

    eframe::run_native(
        "Game Boy VRAM Viewer",
        native_options,
        Box::new(move |cc| Ok(Box::new(DemoApp::new(cc, args.cgb)))),
    )
    .map_err(|err| anyhow::anyhow!("failed to run viewer: {err}"))
}
