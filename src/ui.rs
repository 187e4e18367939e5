use crate::app::App;
use crate::braille::BrailleCanvas;
use crate::map::{ImageryFrame, MapLayers};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
    Frame,
};

/// Longest label drawn on the map
const MAX_LABEL: usize = 24;

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Split into map area and status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    let imagery = render_map(frame, app, chunks[0]);
    render_panel(frame, app, imagery.as_ref());
    render_status_bar(frame, app, chunks[1]);
}

/// Draw the map and return the imagery on screen
fn render_map(frame: &mut Frame, app: &App, area: Rect) -> Option<ImageryFrame> {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " NAIP Imagery ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Line::from(Span::styled(
            format!(" {} ", app.shell.epoch()),
            Style::default().fg(Color::Yellow),
        )));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let map = app.map.borrow();
    let MapLayers {
        canvases,
        labels,
        imagery,
    } = map.render();

    // Braille pixel to character cell
    let cursor_pos = map.mouse_pixel_pos().and_then(|(px, py)| {
        let cx = (px / 2) as u16;
        let cy = (py / 4) as u16;
        (cx < inner.width && cy < inner.height).then_some((cx, cy))
    });

    let widget = MapWidget {
        layers: canvases
            .iter()
            .filter(|layer| !layer.canvas.is_blank())
            .map(|layer| (&layer.canvas, layer.color))
            .collect(),
        labels: &labels,
        cursor_pos,
    };
    frame.render_widget(widget, inner);

    imagery
}

/// Braille layers with text labels overlaid
struct MapWidget<'a> {
    layers: Vec<(&'a BrailleCanvas, Color)>,
    labels: &'a [(u16, u16, String)],
    cursor_pos: Option<(u16, u16)>,
}

impl MapWidget<'_> {
    /// Render a braille canvas layer with a specific color
    fn render_layer(canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        for (row_idx, row_str) in canvas.rows().enumerate() {
            if row_idx >= area.height as usize {
                break;
            }
            let y = area.y + row_idx as u16;

            for (col_idx, ch) in row_str.chars().enumerate() {
                if col_idx >= area.width as usize {
                    break;
                }
                // Skip empty braille characters (U+2800)
                if ch == '\u{2800}' {
                    continue;
                }
                let x = area.x + col_idx as u16;
                buf[(x, y)].set_char(ch).set_fg(color);
            }
        }
    }
}

impl Widget for MapWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Back to front in style order
        for (canvas, color) in &self.layers {
            Self::render_layer(canvas, *color, area, buf);
        }

        let label_style = Style::default().fg(Color::White);
        for (lx, ly, text) in self.labels {
            if *ly >= area.height || *lx >= area.width {
                continue;
            }

            let x = area.x + *lx;
            let y = area.y + *ly;
            let max_len = area.width.saturating_sub(*lx) as usize;
            for (i, ch) in text.chars().take(max_len.min(MAX_LABEL)).enumerate() {
                buf[(x + i as u16, y)].set_char(ch).set_style(label_style);
            }
        }

        if let Some((cx, cy)) = self.cursor_pos {
            buf[(area.x + cx, area.y + cy)].set_char('╋').set_fg(Color::Red);
        }
    }
}

/// Epoch selector over the top-left corner of the map
fn render_panel(frame: &mut Frame, app: &App, imagery: Option<&ImageryFrame>) {
    let area = app.panel_area().intersection(frame.area());
    if area.width < 3 || area.height < 3 {
        return;
    }
    let panel = app.panel.borrow();

    let mut lines: Vec<Line> = panel
        .options()
        .iter()
        .enumerate()
        .map(|(i, (value, label))| {
            if panel.is_selected(value) {
                Line::from(vec![
                    Span::styled("▶", Style::default().fg(Color::Yellow)),
                    Span::styled(format!("{} ", i + 1), Style::default().fg(Color::DarkGray)),
                    Span::styled(*label, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
                ])
            } else {
                Line::from(vec![
                    Span::raw(" "),
                    Span::styled(format!("{} ", i + 1), Style::default().fg(Color::DarkGray)),
                    Span::raw(*label),
                ])
            }
        })
        .collect();

    match (panel.hint(), imagery) {
        (Some(hint), _) => lines.push(Line::from(Span::styled(hint, Style::default().fg(Color::Red)))),
        (None, Some(imagery)) => lines.push(Line::from(Span::styled(
            format!("{} z{} · {} tiles", imagery.source, imagery.tile_zoom, imagery.tiles.len()),
            Style::default().fg(Color::Green),
        ))),
        (None, None) => lines.push(Line::from(Span::styled(
            "No imagery at this zoom",
            Style::default().fg(Color::DarkGray),
        ))),
    }
    if let Some(url) = imagery.and_then(|imagery| imagery.center_tile_url.as_deref()) {
        lines.push(Line::from(Span::styled(url, Style::default().fg(Color::DarkGray))));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(" Mosaic ", Style::default().fg(Color::Cyan)));

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(" Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.orientation(), Style::default().fg(Color::Magenta)),
    ];
    if let Some(cursor) = app.cursor_coords() {
        spans.push(Span::styled(" | ╋ ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(cursor, Style::default().fg(Color::Red)));
    }
    spans.push(Span::styled(
        " | hjkl:pan +/-:zoom [/]:rotate </>:tilt 1-4/e:mosaic r:reset q:quit | ",
        Style::default().fg(Color::DarkGray),
    ));
    spans.push(Span::styled(app.shell.href(), Style::default().fg(Color::White)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
