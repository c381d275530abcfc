mod renderer;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use yearline_core::layout::{self, TimeScale, TrackLayout, ViewTransform};
use yearline_core::model::TimelineModel;
use yearline_core::scene::build_scene;
use yearline_core::svg::render_svg;
use yearline_protocol::Viewport;

const EXPORT_WIDTH: f64 = 1200.0;
const EXPORT_HEIGHT: f64 = 600.0;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: yearline <document.json> [--export [out.svg]]");
        std::process::exit(1);
    }

    let path = PathBuf::from(&args[1]);
    let data =
        std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
    let model = TimelineModel::from_json(&data)?;

    if args.iter().any(|a| a == "--export") {
        let out = args
            .iter()
            .position(|a| a == "--export")
            .and_then(|i| args.get(i + 1))
            .map_or_else(|| PathBuf::from("timeline.svg"), PathBuf::from);
        export_svg(&model, &out)?;
        return Ok(());
    }

    renderer::run(&model)?;
    Ok(())
}

/// Headless export at a fixed canvas size with the default view.
fn export_svg(model: &TimelineModel, out: &Path) -> Result<()> {
    let viewport = Viewport {
        width: EXPORT_WIDTH,
        height: EXPORT_HEIGHT,
    };
    let track_layout = TrackLayout::new(&model.settings.tracks, viewport.axis_y());
    let drawable = viewport.width - layout::PADDING_LEFT - layout::PADDING_RIGHT;
    let scale = TimeScale::fit(&model.domain, drawable);
    let scene = build_scene(model, &track_layout, &scale, &viewport);
    let view = ViewTransform::new(layout::PADDING_LEFT);
    let markup = render_svg(&scene, &view, &viewport);
    std::fs::write(out, markup).with_context(|| format!("writing {}", out.display()))?;
    Ok(())
}
