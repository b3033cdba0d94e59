use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use campboard_core::board::{CapacityTier, Rect as HitRect};
use campboard_core::utils::{format_optional, pluralize, truncate_string};

use crate::app::{App, AppState, BoardLayout, Dialog};

use super::{board, styles};

const DIALOG_CONTROLS: [(Dialog, &str); 2] = [
    (Dialog::BunkManager, "[b] Cabins & bunks"),
    (Dialog::EventBunks, "[e] Event bunks"),
];

/// Draw the frame and report where zones, cards and controls ended up.
pub fn render(frame: &mut Frame, app: &App) -> BoardLayout {
    let mut layout = BoardLayout::default();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title bar
            Constraint::Min(10),   // Board
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0], &mut layout);
    board::render(frame, app, chunks[1], &mut layout);
    render_status_bar(frame, app, chunks[2]);

    render_drag_overlay(frame, app);

    // Render overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame, app),
        AppState::ShowingDialog(dialog) => render_dialog_overlay(frame, app, dialog),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        AppState::Normal | AppState::Quitting => {}
    }

    layout
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect, layout: &mut BoardLayout) {
    let title = "  Campboard";
    let event = format!("  event {}", app.event_id());

    let mut spans = vec![
        Span::styled(title, styles::title_style()),
        Span::styled(event.clone(), styles::muted_style()),
    ];
    let mut used = title.len() + event.chars().count();

    let controls_width: usize = DIALOG_CONTROLS.iter().map(|(_, l)| l.len() + 2).sum();
    let help_hint = "[?] Help ";
    let padding = (area.width as usize).saturating_sub(used + controls_width + help_hint.len());
    spans.push(Span::raw(" ".repeat(padding)));
    used += padding;

    for (dialog, label) in DIALOG_CONTROLS {
        let x = area.x as usize + used;
        spans.push(Span::styled(label, styles::highlight_style()));
        spans.push(Span::raw("  "));
        if x + label.len() <= (area.x + area.width) as usize {
            layout
                .dialog_controls
                .push((dialog, HitRect::new(x as u16, area.y, label.len() as u16, 1)));
        }
        used += label.len() + 2;
    }
    spans.push(Span::styled(help_hint, styles::muted_style()));

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = "[u]pdate | [x] remove counselor | [q]uit ";

    let (left_text, left_style) = if app.board.is_dragging() {
        (" Dragging - release over a bunk or pool, Esc to cancel ".to_string(), styles::highlight_style())
    } else if let Some(ref msg) = app.status_message {
        (format!(" {} ", msg), styles::muted_style())
    } else if let Some(ref notice) = app.notice {
        (format!(" {} ", notice.message), styles::notice_style(notice.level))
    } else {
        (format!(" Updated {} ", app.cache_age), styles::muted_style())
    };

    let pending = if app.in_flight > 0 {
        format!(" saving {}… ", app.in_flight)
    } else {
        String::new()
    };

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(pending.chars().count())
        .saturating_sub(shortcuts.len());

    let status_line = Line::from(vec![
        Span::styled(left_text, left_style),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(pending, styles::highlight_style()),
        Span::styled(shortcuts, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

/// A clone of the dragged card that follows the pointer
fn render_drag_overlay(frame: &mut Frame, app: &App) {
    let (Some(descriptor), Some((x, y))) = (app.board.drag().descriptor(), app.board.drag().pointer())
    else {
        return;
    };

    let screen = frame.area();
    let label = format!(" {} ", truncate_string(&descriptor.label(), 24));
    let width = (label.chars().count() as u16).min(screen.width);
    let x = x.saturating_add(1).min(screen.right().saturating_sub(width));
    let y = y.min(screen.bottom().saturating_sub(1));
    let area = Rect::new(x, y, width, 1);

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(Span::styled(label, styles::drag_overlay_style())),
        area,
    );
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn overlay_block(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .title(Span::styled(format!(" {} ", title), styles::title_style()))
        .style(Style::default())
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(key, styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect_fixed(54, 25, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled(
            format!("  campboard {}", version),
            styles::muted_style(),
        )),
        Line::from(Span::styled(
            format!("  {}", truncate_string(app.config.api_base_url(), 48)),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Mouse", styles::highlight_style())),
        help_line("  drag card  ", "Move a camper or counselor"),
        help_line("  drop pool  ", "Return a camper to the pool"),
        help_line("  [x]        ", "Remove a bunk's counselor"),
        help_line("  wheel      ", "Scroll the list under the pointer"),
        Line::from(""),
        Line::from(Span::styled(" Keys", styles::highlight_style())),
        help_line("  ↑/↓ j/k    ", "Select bunk"),
        help_line("  x          ", "Remove selected bunk's counselor"),
        help_line("  PgUp/PgDn  ", "Scroll the bunks"),
        help_line("  [ / ]      ", "Scroll unassigned campers"),
        help_line("  { / }      ", "Scroll free counselors"),
        help_line("  b / e      ", "Cabins & bunks / event bunks"),
        help_line("  u          ", "Refresh from the service"),
        help_line("  Esc        ", "Cancel drag / close"),
        help_line("  q          ", "Quit"),
        Line::from(""),
        Line::from(Span::styled(" Occupancy", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  under 80%  ", styles::tier_style(CapacityTier::Normal)),
            Span::styled("80% and up  ", styles::tier_style(CapacityTier::NearFull)),
            Span::styled("full/over", styles::tier_style(CapacityTier::Full)),
        ]),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    frame.render_widget(Paragraph::new(help_text).block(overlay_block("Help")), area);
}

/// Informational view of the cabin/bunk records; editing happens in the
/// records tool.
fn dialog_lines(app: &App, dialog: Dialog, width: usize) -> Vec<Line<'static>> {
    let snapshot = app.board.snapshot();
    let mut lines = Vec::new();

    match dialog {
        Dialog::BunkManager => {
            for cabin in &snapshot.cabins {
                let location = format_optional(&cabin.location, "no location");
                lines.push(Line::from(vec![
                    Span::styled(format!(" {}", cabin.name), styles::highlight_style()),
                    Span::styled(
                        format!("  {} · capacity {}", location, cabin.capacity),
                        styles::muted_style(),
                    ),
                ]));
                for bunk in snapshot
                    .bunks
                    .iter()
                    .filter(|b| b.cabin_id.as_deref() == Some(cabin.id.as_str()))
                {
                    lines.push(Line::from(Span::styled(
                        truncate_string(&format!("   {} ({} beds)", bunk.name, bunk.capacity), width),
                        styles::list_item_style(),
                    )));
                }
            }
            if snapshot.cabins.is_empty() {
                lines.push(Line::from(Span::styled(" No cabins defined", styles::muted_style())));
            }
        }
        Dialog::EventBunks => {
            lines.push(Line::from(Span::styled(
                format!(
                    " {} active for event {}",
                    pluralize(snapshot.bunks.len(), "bunk"),
                    snapshot.event_id
                ),
                styles::highlight_style(),
            )));
            for bunk in &snapshot.bunks {
                let restriction = bunk.restriction_display().unwrap_or_default();
                lines.push(Line::from(vec![
                    Span::styled(
                        truncate_string(&format!("   {}", bunk.name), width / 2),
                        styles::list_item_style(),
                    ),
                    Span::styled(format!("  {}", restriction), styles::muted_style()),
                ]));
            }
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("   Press ", styles::muted_style()),
        Span::styled("Esc", styles::help_key_style()),
        Span::styled(" to close", styles::muted_style()),
    ]));
    lines
}

fn render_dialog_overlay(frame: &mut Frame, app: &App, dialog: Dialog) {
    let area = centered_rect_fixed(60, 20, frame.area());
    frame.render_widget(Clear, area);

    let lines = dialog_lines(app, dialog, area.width.saturating_sub(2) as usize);
    frame.render_widget(
        Paragraph::new(lines).block(overlay_block(dialog.title())),
        area,
    );
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(40, 6, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines).block(overlay_block("Quit")), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use campboard_core::board::DragHandle;
    use campboard_core::models::{Assignment, BoardSnapshot, Bunk, Camper};
    use ratatui::{backend::TestBackend, Terminal};

    use crate::app::PoolList;

    #[test]
    fn test_centered_rect_fixed() {
        let r = centered_rect_fixed(40, 10, Rect::new(0, 0, 100, 50));
        assert_eq!(r, Rect::new(30, 20, 40, 10));

        let small = centered_rect_fixed(40, 10, Rect::new(0, 0, 20, 5));
        assert_eq!(small, Rect::new(0, 0, 20, 5));
    }

    fn test_app(name: &str) -> App {
        let dir = std::env::temp_dir().join(format!(
            "campboard-render-{}-{}",
            name,
            std::process::id()
        ));
        let cache = campboard_core::cache::CacheManager::new(dir).expect("cache dir");
        let api = campboard_core::api::ApiClient::new("http://localhost:9").expect("client");
        App::with_parts(
            campboard_core::config::Config::default(),
            api,
            cache,
            "e1".to_string(),
        )
    }

    /// Draw one frame and adopt its layout, the way the main loop does
    fn draw(terminal: &mut Terminal<TestBackend>, app: &mut App) -> BoardLayout {
        let mut layout = BoardLayout::default();
        let view: &App = app;
        terminal
            .draw(|f| layout = render(f, view))
            .expect("draw");
        app.apply_layout(layout.clone());
        layout
    }

    fn camper(n: usize) -> Camper {
        Camper {
            id: format!("c{}", n),
            first_name: "Camper".to_string(),
            last_name: n.to_string(),
            age: Some(11),
            gender: None,
        }
    }

    fn has_card(layout: &BoardLayout, handle: &DragHandle) -> bool {
        layout.cards.iter().any(|(h, _)| h == handle)
    }

    fn zone_names(layout: &BoardLayout) -> Vec<String> {
        layout.zones.iter().map(|(z, _)| z.to_string()).collect()
    }

    #[test]
    fn test_render_empty_board_registers_pools_and_controls() {
        let mut app = test_app("empty");
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).expect("terminal");
        let layout = draw(&mut terminal, &mut app);

        assert_eq!(zone_names(&layout), vec!["pool", "counselor-pool"]);
        assert!(layout.cards.is_empty());
        assert_eq!(layout.dialog_controls.len(), 2);
    }

    #[test]
    fn test_long_pool_scrolls_to_every_camper() {
        let mut app = test_app("long-pool");
        let mut snap = BoardSnapshot::empty("e1");
        snap.unassigned_campers = (0..60).map(camper).collect();
        app.board.replace_snapshot(snap);

        let mut terminal = Terminal::new(TestBackend::new(120, 40)).expect("terminal");
        let first = DragHandle::PoolCamper("c0".to_string());
        let last = DragHandle::PoolCamper("c59".to_string());

        let layout = draw(&mut terminal, &mut app);
        assert!(has_card(&layout, &first));
        assert!(!has_card(&layout, &last));
        assert!(layout.camper_pool.max_scroll > 0);

        app.scroll_pool_down(PoolList::Campers, 100);
        let layout = draw(&mut terminal, &mut app);
        assert!(has_card(&layout, &last));
        assert!(!has_card(&layout, &first));

        // Every registered card sits inside the pool box
        let pool = layout.camper_pool.area;
        assert!(layout
            .cards
            .iter()
            .all(|(_, r)| r.y > pool.y && r.y + 1 < pool.y + pool.height));
    }

    #[test]
    fn test_bunk_taller_than_viewport_stays_reachable() {
        let mut app = test_app("tall-bunk");
        let mut snap = BoardSnapshot::empty("e1");
        snap.bunks = vec![Bunk {
            id: "B1".to_string(),
            name: "Bunk B1".to_string(),
            capacity: 4,
            gender: None,
            min_age: None,
            max_age: None,
            cabin_id: None,
            counselor_id: None,
        }];
        snap.assignments = (0..20)
            .map(|n| Assignment {
                id: format!("a{}", n),
                camper_id: format!("c{}", n),
                bunk_id: "B1".to_string(),
                event_id: "e1".to_string(),
                camper: Some(camper(n)),
            })
            .collect();
        app.board.replace_snapshot(snap);

        let mut terminal = Terminal::new(TestBackend::new(120, 24)).expect("terminal");
        let b1 = "bunk:B1".to_string();
        let first = DragHandle::Assignment("a0".to_string());
        let last = DragHandle::Assignment("a19".to_string());

        let layout = draw(&mut terminal, &mut app);
        assert!(zone_names(&layout).contains(&b1));
        assert!(has_card(&layout, &first));
        assert!(!has_card(&layout, &last));

        app.scroll_down(100);
        assert!(app.scroll > 0);
        let layout = draw(&mut terminal, &mut app);
        assert!(zone_names(&layout).contains(&b1));
        assert!(has_card(&layout, &last));
        assert!(!has_card(&layout, &first));
    }
}
