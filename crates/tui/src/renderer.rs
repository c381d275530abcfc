use std::io::stdout;

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders},
};
use yearline_core::interact::{ZOOM_IN_STEP, ZOOM_OUT_STEP};
use yearline_core::layout::{self, TimeScale, TrackLayout, ViewTransform};
use yearline_core::model::TimelineModel;
use yearline_core::scene::build_scene;
use yearline_core::svg::render_svg;
use yearline_protocol::{ScenePrimitive, Viewport};

/// Logical pixels per terminal cell. Scene geometry is computed in the
/// same pixel units the GUI uses, then quantized to cells here.
const CELL_W: f64 = 7.0;
const CELL_H: f64 = 14.0;

fn to_term_color(c: yearline_protocol::Color) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}

pub fn run(model: &TimelineModel) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut view = ViewTransform::new(layout::PADDING_LEFT);
    let mut status: Option<String> = None;

    loop {
        let term_size = terminal.size()?;
        let content_rows = term_size.height.saturating_sub(1);
        let viewport = Viewport {
            width: f64::from(term_size.width) * CELL_W,
            height: f64::from(content_rows) * CELL_H,
        };

        let track_layout = TrackLayout::new(&model.settings.tracks, viewport.axis_y());
        let drawable = (viewport.width - layout::PADDING_LEFT - layout::PADDING_RIGHT).max(1.0);
        let scale = TimeScale::fit(&model.domain, drawable);
        let scene = build_scene(model, &track_layout, &scale, &viewport);

        terminal.draw(|frame| {
            let area = frame.area();

            let header_area = Rect::new(0, 0, area.width, 1);
            let title = match &status {
                Some(msg) => format!(" yearline — {msg} "),
                None => format!(
                    " yearline — {} items | ←→ pan | +/- zoom | 0 reset | e export | q quit ",
                    model.items.len()
                ),
            };
            let header = Block::default()
                .title(title)
                .style(Style::default().fg(Color::White).bg(Color::DarkGray));
            frame.render_widget(header, header_area);

            let content_area = Rect::new(0, 1, area.width, area.height.saturating_sub(1));
            let block = Block::default()
                .borders(Borders::NONE)
                .style(Style::default().bg(Color::Black));
            frame.render_widget(block, content_area);

            let buf = frame.buffer_mut();
            let mut put = |col: i64, row: i64, ch: char, fg: Color| {
                if col < 0
                    || row < 0
                    || col >= i64::from(content_area.width)
                    || row >= i64::from(content_area.height)
                {
                    return;
                }
                let x = col as u16;
                let y = row as u16 + content_area.y;
                buf[(x, y)].set_char(ch).set_fg(fg).set_bg(Color::Black);
            };

            // Primitives are back-to-front; later cells overwrite earlier.
            for prim in &scene.primitives {
                match prim {
                    ScenePrimitive::Rect {
                        rect,
                        fill,
                        opacity,
                        ..
                    } => {
                        let col = (view.device_x(rect.x) / CELL_W).floor() as i64;
                        let row = (rect.y / CELL_H).floor() as i64;
                        let cols = ((rect.w * view.zoom() / CELL_W) as i64).max(1);
                        let rows = ((rect.h / CELL_H) as i64).max(1);
                        let ch = if *opacity < 1.0 { '░' } else { '█' };
                        let fg = to_term_color(*fill);
                        for r in 0..rows {
                            for c in 0..cols {
                                put(col + c, row + r, ch, fg);
                            }
                        }
                    }
                    ScenePrimitive::Circle { center, fill, .. } => {
                        let col = (view.device_x(center.x) / CELL_W).round() as i64;
                        let row = (center.y / CELL_H).floor() as i64;
                        put(col, row, '●', to_term_color(*fill));
                    }
                    ScenePrimitive::Line {
                        from, to, color, ..
                    } => {
                        let fg = to_term_color(*color);
                        if (from.y - to.y).abs() < f64::EPSILON {
                            let row = (from.y / CELL_H).floor() as i64;
                            let c1 = (view.device_x(from.x.min(to.x)) / CELL_W).floor() as i64;
                            let c2 = (view.device_x(from.x.max(to.x)) / CELL_W).ceil() as i64;
                            for c in c1..=c2 {
                                put(c, row, '─', fg);
                            }
                        } else {
                            let col = (view.device_x(from.x) / CELL_W).floor() as i64;
                            let r1 = (from.y.min(to.y) / CELL_H).floor() as i64;
                            let r2 = (from.y.max(to.y) / CELL_H).floor() as i64;
                            for r in r1..=r2 {
                                put(col, r, '│', fg);
                            }
                        }
                    }
                    ScenePrimitive::Text {
                        position,
                        text,
                        color,
                        align,
                        ..
                    } => {
                        let fg = to_term_color(*color);
                        let len = text.chars().count() as i64;
                        let col = (view.device_x(position.x) / CELL_W).round() as i64;
                        let start = match align {
                            yearline_protocol::TextAlign::Left => col,
                            yearline_protocol::TextAlign::Center => col - len / 2,
                            yearline_protocol::TextAlign::Right => col - len,
                        };
                        let row = ((position.y / CELL_H).floor() as i64).max(0) - 1;
                        for (i, ch) in text.chars().enumerate() {
                            put(start + i as i64, row, ch, fg);
                        }
                    }
                }
            }
        })?;

        // Pan/zoom steps in logical pixels.
        let pan_step = viewport.width * 0.1;
        let center_x = viewport.width / 2.0;

        if event::poll(std::time::Duration::from_millis(100))? {
            status = None;
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Left => view.pan_by(pan_step),
                    KeyCode::Right => view.pan_by(-pan_step),
                    KeyCode::Char('+') | KeyCode::Char('=') => {
                        view.zoom_at(center_x, ZOOM_IN_STEP);
                    }
                    KeyCode::Char('-') => view.zoom_at(center_x, ZOOM_OUT_STEP),
                    KeyCode::Char('0') => view = ViewTransform::new(layout::PADDING_LEFT),
                    KeyCode::Char('e') => {
                        status = Some(match std::fs::write(
                            "timeline.svg",
                            render_svg(&scene, &view, &viewport),
                        ) {
                            Ok(()) => "exported timeline.svg".to_string(),
                            Err(e) => format!("export failed: {e}"),
                        });
                    }
                    _ => {}
                },
                Event::Mouse(mouse) => {
                    let anchor = f64::from(mouse.column) * CELL_W;
                    match mouse.kind {
                        MouseEventKind::ScrollUp => view.zoom_at(anchor, ZOOM_IN_STEP),
                        MouseEventKind::ScrollDown => view.zoom_at(anchor, ZOOM_OUT_STEP),
                        MouseEventKind::ScrollLeft => view.pan_by(pan_step),
                        MouseEventKind::ScrollRight => view.pan_by(-pan_step),
                        _ => {}
                    }
                }
                _ => {}
            }
        }
    }

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    Ok(())
}
