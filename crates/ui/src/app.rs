use eframe::egui;
use yearline_core::interact::{Dispatcher, Effect, PointerEvent, WheelDirection};
use yearline_core::layout::{
    self, TimeScale, TrackLayout, ViewTransform,
};
use yearline_core::model::TimelineModel;
use yearline_core::scene::{self, Scene};
use yearline_core::svg;
use yearline_protocol::{Point, Viewport};

use crate::renderer;

const DEMO_DOCUMENT: &[u8] = include_bytes!("../../../demos/resume.json");

/// Everything derived from a loaded document, rebuilt together on resize.
struct LoadedDocument {
    model: TimelineModel,
    viewport: Viewport,
    layout: TrackLayout,
    scale: TimeScale,
    scene: Scene,
    dispatcher: Dispatcher,
}

impl LoadedDocument {
    fn new(model: TimelineModel, viewport: Viewport) -> Self {
        let layout = TrackLayout::new(&model.settings.tracks, viewport.axis_y());
        let drawable = (viewport.width - layout::PADDING_LEFT - layout::PADDING_RIGHT).max(1.0);
        let scale = TimeScale::fit(&model.domain, drawable);
        let scene = scene::build_scene(&model, &layout, &scale, &viewport);
        let dispatcher = Dispatcher::new(ViewTransform::new(layout::PADDING_LEFT));
        Self {
            model,
            viewport,
            layout,
            scale,
            scene,
            dispatcher,
        }
    }

    /// Rebuild layout and scene for a new canvas size. The time density
    /// is kept from load so resizing does not silently rescale content;
    /// pan and zoom survive.
    fn resize(&mut self, viewport: Viewport) {
        if (viewport.width - self.viewport.width).abs() < 0.5
            && (viewport.height - self.viewport.height).abs() < 0.5
        {
            return;
        }
        self.viewport = viewport;
        self.layout = TrackLayout::new(&self.model.settings.tracks, viewport.axis_y());
        self.scene = scene::build_scene(&self.model, &self.layout, &self.scale, &self.viewport);
    }
}

struct Tooltip {
    pos: Point,
    text: String,
}

/// Main application state.
pub struct YearlineApp {
    doc: Option<LoadedDocument>,
    tooltip: Option<Tooltip>,
    /// Error message to display.
    error: Option<String>,
    /// Pending document data, or the load failure, from async sources.
    pending_data: std::sync::Arc<std::sync::Mutex<Option<Result<Vec<u8>, String>>>>,
}

impl YearlineApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        let pending_data: std::sync::Arc<std::sync::Mutex<Option<Result<Vec<u8>, String>>>> =
            std::sync::Arc::new(std::sync::Mutex::new(None));

        // On WASM the document comes from a `?data=` query parameter; the
        // embedded demo is the fallback.
        #[cfg(target_arch = "wasm32")]
        {
            match data_url_from_query() {
                Some(url) => {
                    let pd = pending_data.clone();
                    let ctx = cc.egui_ctx.clone();
                    wasm_bindgen_futures::spawn_local(async move {
                        let result = fetch_bytes(&url).await;
                        if let Err(e) = &result {
                            web_sys::console::error_1(
                                &format!("yearline: fetch error: {e}").into(),
                            );
                        }
                        if let Ok(mut lock) = pd.lock() {
                            *lock = Some(result);
                        }
                        ctx.request_repaint();
                    });
                }
                None => {
                    if let Ok(mut lock) = pending_data.lock() {
                        *lock = Some(Ok(DEMO_DOCUMENT.to_vec()));
                    }
                }
            }
        }

        Self {
            doc: None,
            tooltip: None,
            error: None,
            pending_data,
        }
    }

    fn load_document(&mut self, data: &[u8], canvas: Viewport) {
        match TimelineModel::from_json(data) {
            Ok(model) => {
                self.doc = Some(LoadedDocument::new(model, canvas));
                self.tooltip = None;
                self.error = None;
            }
            Err(e) => {
                self.error = Some(format!("Failed to load document: {e}"));
            }
        }
    }

    /// Take the async load result. Failures surface as the inline error
    /// instead of leaving the empty-state placeholder up.
    fn drain_pending(&mut self) -> Option<Vec<u8>> {
        let taken = {
            let mut lock = self.pending_data.lock().unwrap_or_else(|e| e.into_inner());
            lock.take()
        };
        match taken {
            Some(Ok(data)) => Some(data),
            Some(Err(e)) => {
                self.error = Some(format!("Failed to load document: {e}"));
                None
            }
            None => None,
        }
    }

    fn export_svg(&mut self) {
        let Some(doc) = &self.doc else {
            return;
        };
        let markup = svg::render_svg(&doc.scene, doc.dispatcher.view(), &doc.viewport);

        #[cfg(not(target_arch = "wasm32"))]
        {
            let picked = rfd::FileDialog::new()
                .set_file_name("timeline.svg")
                .add_filter("SVG", &["svg"])
                .save_file();
            if let Some(path) = picked {
                if let Err(e) = std::fs::write(&path, markup) {
                    rfd::MessageDialog::new()
                        .set_title("Export failed")
                        .set_description(format!("Could not write {}: {e}", path.display()))
                        .set_level(rfd::MessageLevel::Error)
                        .show();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        if let Err(e) = download_svg(&markup) {
            self.error = Some(format!("Export failed: {e}"));
        }
    }

    /// Translate egui pointer state into timeline pointer events.
    fn pointer_events(
        ui: &egui::Ui,
        response: &egui::Response,
        canvas: egui::Rect,
    ) -> Vec<PointerEvent> {
        let mut events = Vec::new();
        let local = |pos: egui::Pos2| Point {
            x: (pos.x - canvas.left()) as f64,
            y: (pos.y - canvas.top()) as f64,
        };

        let hover = ui.input(|i| i.pointer.hover_pos());
        let inside = hover.map(|p| canvas.contains(p)).unwrap_or(false);

        if response.drag_started() {
            if let Some(pos) = response.interact_pointer_pos() {
                events.push(PointerEvent::Down { pos: local(pos) });
            }
        }
        if response.dragged() || response.drag_stopped() {
            if let Some(pos) = response.interact_pointer_pos() {
                if response.drag_stopped() {
                    events.push(PointerEvent::Up { pos: local(pos) });
                } else {
                    events.push(PointerEvent::Move { pos: local(pos) });
                }
            }
        } else if response.clicked() {
            // egui swallows the down/up pair for plain clicks; synthesize it
            // so click handling sees a zero-travel drag.
            if let Some(pos) = response.interact_pointer_pos() {
                let p = local(pos);
                events.push(PointerEvent::Down { pos: p });
                events.push(PointerEvent::Up { pos: p });
            }
        } else if inside {
            if let Some(pos) = hover {
                events.push(PointerEvent::Move { pos: local(pos) });
            }
        } else {
            events.push(PointerEvent::Leave);
        }

        if inside {
            let scroll = ui.input(|i| i.raw_scroll_delta);
            if scroll.y.abs() > 0.1 {
                if let Some(pos) = hover {
                    let direction = if scroll.y > 0.0 {
                        WheelDirection::ZoomIn
                    } else {
                        WheelDirection::ZoomOut
                    };
                    events.push(PointerEvent::Wheel {
                        pos: local(pos),
                        direction,
                    });
                }
            }
        }

        events
    }
}

impl eframe::App for YearlineApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Pick up async-loaded document data; fetch failures land in
        // `self.error` before the status bar renders.
        let pending = self.drain_pending();

        // Toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("yearline");
                ui.separator();

                if ui.button("Open").clicked() {
                    #[cfg(not(target_arch = "wasm32"))]
                    {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Timeline document", &["json"])
                            .pick_file()
                        {
                            match std::fs::read(&path) {
                                Ok(data) => {
                                    if let Ok(mut lock) = self.pending_data.lock() {
                                        *lock = Some(Ok(data));
                                    }
                                }
                                Err(e) => {
                                    self.error = Some(format!("Failed to read file: {e}"));
                                }
                            }
                        }
                    }
                }

                if ui.button("Demo").clicked() {
                    if let Ok(mut lock) = self.pending_data.lock() {
                        *lock = Some(Ok(DEMO_DOCUMENT.to_vec()));
                    }
                }

                ui.separator();

                if ui
                    .add_enabled(self.doc.is_some(), egui::Button::new("Export SVG"))
                    .clicked()
                {
                    self.export_svg();
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if let Some(doc) = &self.doc {
                        let zoom_pct = doc.dispatcher.view().zoom() * 100.0;
                        ui.label(format!("{zoom_pct:.0}%"));
                    }
                });
            });
        });

        // Status bar
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(err) = &self.error {
                    ui.colored_label(egui::Color32::RED, err);
                } else if let Some(doc) = &self.doc {
                    let domain = &doc.model.domain;
                    ui.label(format!(
                        "{} – {} | {} items | {} tracks",
                        domain.start,
                        domain.end,
                        doc.model.items.len(),
                        doc.model.settings.tracks.len(),
                    ));
                } else {
                    ui.label("No document loaded — click Open or Demo");
                }
            });
        });

        // Timeline canvas
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let canvas = ui.available_rect_before_wrap();
                let viewport = Viewport {
                    width: canvas.width() as f64,
                    height: canvas.height() as f64,
                };

                if let Some(data) = pending {
                    self.load_document(&data, viewport);
                }

                let Some(doc) = &mut self.doc else {
                    ui.centered_and_justified(|ui| {
                        ui.vertical_centered(|ui| {
                            ui.add_space(ui.available_height() / 3.0);
                            ui.heading("Drop a timeline document here or click Open");
                            ui.label("JSON with settings, tracks, and dated items");
                        });
                    });
                    return;
                };

                doc.resize(viewport);

                let response = ui.allocate_rect(canvas, egui::Sense::click_and_drag());
                for event in Self::pointer_events(ui, &response, canvas) {
                    for effect in doc.dispatcher.dispatch(event, &doc.scene) {
                        match effect {
                            Effect::ViewChanged => {}
                            Effect::TooltipShow { pos, text } => {
                                self.tooltip = Some(Tooltip { pos, text });
                            }
                            Effect::TooltipMove { pos } => {
                                if let Some(tip) = &mut self.tooltip {
                                    tip.pos = pos;
                                }
                            }
                            Effect::TooltipHide => self.tooltip = None,
                            Effect::OpenUrl(url) => {
                                ctx.open_url(egui::OpenUrl::new_tab(url));
                            }
                        }
                    }
                }

                let painter = ui.painter_at(canvas);
                let bg = doc.scene.background;
                painter.rect_filled(
                    canvas,
                    egui::CornerRadius::ZERO,
                    egui::Color32::from_rgb(bg.r, bg.g, bg.b),
                );
                renderer::paint_scene(
                    &painter,
                    &doc.scene,
                    doc.dispatcher.view(),
                    canvas.min,
                );

                if let Some(tip) = &self.tooltip {
                    // Dispatcher positions are canvas-local; anchor the
                    // tooltip just under the pointer.
                    let anchor = egui::pos2(
                        canvas.left() + tip.pos.x as f32 + 12.0,
                        canvas.top() + tip.pos.y as f32 + 12.0,
                    );
                    #[allow(deprecated)]
                    egui::show_tooltip_at(
                        ui.ctx(),
                        ui.layer_id(),
                        egui::Id::new("item_tooltip"),
                        anchor,
                        |ui| {
                            ui.label(&tip.text);
                        },
                    );
                }
            });

        // Handle file drop
        let dropped: Option<Vec<u8>> = ctx.input(|i| {
            i.raw
                .dropped_files
                .first()
                .and_then(|f| f.bytes.as_ref().map(|b| b.to_vec()))
        });
        if let Some(data) = dropped {
            if let Ok(mut lock) = self.pending_data.lock() {
                *lock = Some(Ok(data));
            }
            ctx.request_repaint();
        }
    }
}


#[cfg(target_arch = "wasm32")]
fn data_url_from_query() -> Option<String> {
    let window = web_sys::window()?;
    let search = window.location().search().ok()?;
    let query = search.strip_prefix('?')?;
    for pair in query.split('&') {
        if let Some(value) = pair.strip_prefix("data=") {
            if !value.is_empty() {
                return js_sys::decode_uri_component(value)
                    .ok()
                    .map(|s| String::from(s));
            }
        }
    }
    None
}

#[cfg(target_arch = "wasm32")]
async fn fetch_bytes(url: &str) -> Result<Vec<u8>, String> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    let window = web_sys::window().ok_or("no window")?;
    let resp_value = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| format!("{e:?}"))?;
    let resp: web_sys::Response = resp_value.dyn_into().map_err(|_| "not a Response")?;
    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }
    let buf = JsFuture::from(resp.array_buffer().map_err(|e| format!("{e:?}"))?)
        .await
        .map_err(|e| format!("{e:?}"))?;
    let uint8 = js_sys::Uint8Array::new(&buf);
    Ok(uint8.to_vec())
}

#[cfg(target_arch = "wasm32")]
fn download_svg(markup: &str) -> Result<(), String> {
    use wasm_bindgen::JsCast;

    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;

    let bag = web_sys::BlobPropertyBag::new();
    bag.set_type("image/svg+xml");
    let parts = js_sys::Array::of1(&markup.into());
    let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &bag)
        .map_err(|e| format!("{e:?}"))?;
    let url = web_sys::Url::create_object_url_with_blob(&blob).map_err(|e| format!("{e:?}"))?;

    let anchor: web_sys::HtmlAnchorElement = document
        .create_element("a")
        .map_err(|e| format!("{e:?}"))?
        .dyn_into()
        .map_err(|_| "not an anchor")?;
    anchor.set_href(&url);
    anchor.set_download("timeline.svg");
    anchor.click();
    web_sys::Url::revoke_object_url(&url).map_err(|e| format!("{e:?}"))?;
    Ok(())
}
