#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title("yearline"),
        ..Default::default()
    };
    eframe::run_native(
        "yearline",
        options,
        Box::new(|cc| Ok(Box::new(yearline_ui::YearlineApp::new(cc)))),
    )
}

// The wasm build enters through `yearline_ui::start` instead.
#[cfg(target_arch = "wasm32")]
fn main() {}
