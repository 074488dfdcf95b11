use crate::application::{App, AppMode};
use crate::domain::{InfraType, LngLat, MapQuery};
use std::str::FromStr;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};

pub fn render_ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(f, app, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);
    render_layer_table(f, app, body[0]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8),
            Constraint::Length(10),
            Constraint::Min(0),
        ])
        .split(body[1]);
    render_toggles(f, app, side[0]);
    render_route(f, app, side[1]);
    render_activity(f, app, side[2]);

    render_status_bar(f, app, chunks[2]);

    if app.mode == AppMode::Help {
        render_help_popup(f, app.help_scroll);
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let map_status = app.editor.map.with(|map| match map {
        Some(handle) => format!("{} layers attached", handle.borrow().len()),
        None => "map not ready".to_string(),
    });
    let header = Paragraph::new(format!(
        "mapstack | Mode: {} | {} | Storage: {} | OD pairs: {}",
        app.editor.mode.get(),
        map_status,
        if app.editor.remote_storage.get() { "remote" } else { "local" },
        app.editor.od_pairs.with(|pairs| pairs.len()),
    ))
    .style(Style::default().fg(Color::Cyan));
    f.render_widget(header, area);
}

fn render_layer_table(f: &mut Frame, app: &App, area: Rect) {
    let visible_rows = (area.height as usize).saturating_sub(3);
    let scroll = app.selected.saturating_sub(visible_rows.saturating_sub(1));

    let map = app.editor.map.get();
    let stack = map.as_ref().map(|handle| handle.borrow());

    let header = Row::new(vec![
        Cell::from("#").style(Style::default().fg(Color::Yellow)),
        Cell::from("On").style(Style::default().fg(Color::Yellow)),
        Cell::from("Layer").style(Style::default().fg(Color::Yellow)),
    ])
    .height(1);

    let total = app.editor.table.len();
    let rows: Vec<Row> = app
        .editor
        .table
        .iter()
        .rev()
        .enumerate()
        .skip(scroll)
        .take(visible_rows)
        .map(|(row, id)| {
            let attached = stack.as_ref().is_some_and(|s| s.has_layer(id));
            let style = if row == app.selected {
                Style::default().bg(Color::Blue).fg(Color::White)
            } else if attached {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Row::new(vec![
                Cell::from(format!("{}", total - row)),
                Cell::from(if attached { "●" } else { " " }),
                Cell::from(id.to_string()),
            ])
            .style(style)
        })
        .collect();

    let title = match app.selected_layer() {
        Some(id) => format!("Layer order (top first) | {}: {}", id, app.anchor_preview()),
        None => "Layer order (top first)".to_string(),
    };
    let table = Table::new(
        rows,
        [Constraint::Length(3), Constraint::Length(2), Constraint::Min(10)],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title(title))
    .column_spacing(1);

    f.render_widget(table, area);
}

fn render_toggles(f: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = app
        .editor
        .toggles
        .bindings()
        .iter()
        .enumerate()
        .map(|(idx, binding)| {
            let on = binding.flag.get();
            Line::from(vec![
                Span::styled(format!("{} ", idx + 1), Style::default().fg(Color::Yellow)),
                Span::styled(
                    if on { "[x] " } else { "[ ] " },
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(binding.label),
            ])
        })
        .collect();

    let toggles = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Reference layers"));
    f.render_widget(toggles, area);
}

fn infra_color(infra: InfraType) -> Color {
    Color::from_str(infra.color()).unwrap_or(Color::Reset)
}

fn render_route(f: &mut Frame, app: &App, area: Rect) {
    let endpoint = |label: &'static str, point: Option<LngLat>| {
        Line::from(vec![
            Span::styled(label, Style::default().fg(Color::Yellow)),
            Span::raw(point.map_or_else(|| "not set".to_string(), |p| p.to_string())),
        ])
    };

    let mut lines = vec![
        endpoint("A: ", app.editor.route_a.get()),
        endpoint("B: ", app.editor.route_b.get()),
        Line::from(format!(
            "Network: {} features | Zones: {}",
            app.editor.coherent_network.with(|fc| fc.features.len()),
            app.editor.od_zones.with(|fc| fc.features.len()),
        )),
    ];

    app.editor.route.with(|route| match route {
        Some(route) => {
            lines.push(Line::from(format!(
                "{:.0} m, directness {:.2}",
                route.route_length,
                route.directness()
            )));
            lines.extend(route.directions.iter().map(|step| {
                Line::from(vec![
                    Span::styled("■ ", Style::default().fg(infra_color(step.infra_type))),
                    Span::raw(format!(
                        "{:.0} m {} ({})",
                        step.length,
                        step.name.as_deref().unwrap_or("unnamed"),
                        step.infra_type.label()
                    )),
                ])
            }));
        }
        None => {
            // Legend until there are steps to colour.
            lines.extend(InfraType::ALL.iter().map(|infra| {
                Line::from(vec![
                    Span::styled("■ ", Style::default().fg(infra_color(*infra))),
                    Span::raw(infra.label()),
                ])
            }));
        }
    });

    let route = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Route"));
    f.render_widget(route, area);
}

fn render_activity(f: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = app.activity().into_iter().map(Line::from).collect();
    let activity = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Activity"))
        .style(Style::default().fg(Color::Gray));
    f.render_widget(activity, area);
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let text = match app.mode {
        AppMode::Normal => match app.status_message {
            Some(ref status) => status.clone(),
            None => "↑↓/jk: select | Enter: add/remove | 1-6: toggles | m: mode | r: load/unload map | o: storage | Ctrl+S: save | ?: help | q: quit".to_string(),
        },
        AppMode::Help => "↑↓/jk: scroll | PgUp/PgDn: fast scroll | Home: top | Esc/q: close help".to_string(),
    };

    let status = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(match app.mode {
            AppMode::Normal => Style::default(),
            AppMode::Help => Style::default().fg(Color::Cyan),
        });
    f.render_widget(status, area);
}

fn render_help_popup(f: &mut Frame, scroll: usize) {
    let area = f.area();
    let popup_area = Rect {
        x: area.width / 10,
        y: area.height / 10,
        width: area.width * 4 / 5,
        height: area.height * 4 / 5,
    };

    f.render_widget(Clear, popup_area);

    let help_lines: Vec<&str> = HELP_TEXT.lines().collect();
    let visible_height = popup_area.height.saturating_sub(2) as usize;

    let start_line = scroll.min(help_lines.len().saturating_sub(visible_height));
    let end_line = (start_line + visible_height).min(help_lines.len());

    let visible_text = help_lines[start_line..end_line].join("\n");

    let help_widget = Paragraph::new(visible_text)
        .block(Block::default()
            .borders(Borders::ALL)
            .title(format!("mapstack Help (Line {}/{})", start_line + 1, help_lines.len()))
            .style(Style::default().fg(Color::Cyan)))
        .style(Style::default().fg(Color::White));

    f.render_widget(help_widget, popup_area);
}

const HELP_TEXT: &str = r#"MAPSTACK LAYER INSPECTOR

=== LAYER ORDER ===
• Every map layer has a fixed place in the layer order table
• The table is listed top first: rows higher up draw above rows below
• Green rows (●) are attached to the map right now
• A new layer is inserted directly below the nearest attached layer
  above it, or on top of everything when there is none
• The title bar shows where the selected layer would go

=== MAP ===
r               Load a fresh map (basemap layers only) or unload it
                While no map is loaded, layers can't be added; toggled
                layers are re-added as soon as a map loads

=== LAYERS ===
↑↓ or j/k       Select a layer
Enter/Space     Add the selected layer, or remove it if attached
1-6             Flip a reference layer toggle

=== STATE ===
m               Cycle the editor mode
o               Switch remote asset storage on or off
Ctrl+S          Autosave the map session to the save directory
Esc             Clear the status message

=== HELP NAVIGATION ===
↑↓ or j/k       Scroll help text up/down one line
Page Up/Down    Scroll help text up/down 5 lines
Home            Jump to top of help text
Esc/F1/?/q      Close this help window

q               Quit application"#;
