//! Board view: the camper pool, the counselor pool, and bunk boxes grouped
//! under their cabins.
//!
//! Rendering also records where every zone, card and control landed, so the
//! next mouse event can be hit-tested against what is actually on screen.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use campboard_core::board::{BunkStats, CabinGroup, DragHandle, Rect as HitRect, ZoneId};
use campboard_core::utils::{format_occupancy, pluralize, truncate_string};

use crate::app::{App, BoardLayout, PoolList, PoolViewport};

use super::styles;

/// Width of the left column holding both pools
const POOL_COLUMN_WIDTH: u16 = 34;

/// Height of the counselor pool box
const COUNSELOR_POOL_HEIGHT: u16 = 10;

/// Preferred bunk box width; columns stretch to fill the row
const BUNK_BOX_WIDTH: u16 = 30;

const REMOVE_CONTROL: &str = "[x]";

/// Title marker for a bunk holding more campers than it has beds
const OVER_CAPACITY: &str = "over ";

pub fn render(frame: &mut Frame, app: &App, area: Rect, layout: &mut BoardLayout) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(POOL_COLUMN_WIDTH), Constraint::Min(20)])
        .split(area);

    let pools = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),
            Constraint::Length(COUNSELOR_POOL_HEIGHT),
        ])
        .split(columns[0]);

    render_camper_pool(frame, app, pools[0], layout);
    render_counselor_pool(frame, app, pools[1], layout);
    render_bunks(frame, app, columns[1], layout);
}

fn hit_rect(r: Rect) -> HitRect {
    HitRect::new(r.x, r.y, r.width, r.height)
}

fn zone_border(app: &App, zone: &ZoneId, idle: Style) -> (Style, BorderType) {
    if app.board.hovered_zone() == Some(zone) {
        (styles::drop_target_style(), BorderType::Thick)
    } else {
        (idle, BorderType::Plain)
    }
}

fn card_style(app: &App, handle: &DragHandle) -> Style {
    if app.board.drag().is_dragging_handle(handle) {
        styles::dragging_card_style()
    } else {
        styles::list_item_style()
    }
}

/// One card row: bullet, name, and right-aligned detail
fn card_line(label: &str, detail: &str, width: u16, style: Style) -> Line<'static> {
    let width = width as usize;
    let detail_len = detail.chars().count();
    let name = truncate_string(label, width.saturating_sub(detail_len + 4));
    let pad = width.saturating_sub(3 + name.chars().count() + detail_len);
    Line::from(vec![
        Span::styled(" • ", styles::muted_style()),
        Span::styled(name, style),
        Span::raw(" ".repeat(pad)),
        Span::styled(detail.to_string(), styles::muted_style()),
    ])
}

/// Lines for the visible window of a pool list, registering a card for each
/// row shown. Returns the lines, the first index shown, and how far the list
/// can scroll.
fn pool_cards<'a, T>(
    app: &App,
    items: &'a [T],
    inner: Rect,
    offset: u16,
    layout: &mut BoardLayout,
    card: impl Fn(&'a T) -> (DragHandle, String, String),
) -> (Vec<Line<'static>>, usize, u16) {
    let rows = inner.height as usize;
    let max_scroll = items.len().saturating_sub(rows);
    let first = (offset as usize).min(max_scroll);

    let mut lines = Vec::with_capacity(rows);
    for (i, item) in items.iter().skip(first).take(rows).enumerate() {
        let (handle, label, detail) = card(item);
        let style = card_style(app, &handle);
        lines.push(card_line(&label, &detail, inner.width, style));
        layout.cards.push((
            handle,
            HitRect::new(inner.x, inner.y + i as u16, inner.width, 1),
        ));
    }
    (lines, first, u16::try_from(max_scroll).unwrap_or(u16::MAX))
}

/// "26-50 of 60" footer for a pool that does not fit its box
fn pool_position(first: usize, shown: usize, total: usize) -> Option<Line<'static>> {
    if shown >= total {
        return None;
    }
    let more = if first + shown < total { " ↓" } else { "" };
    let less = if first > 0 { "↑ " } else { "" };
    Some(
        Line::from(Span::styled(
            format!(" {}{}-{} of {}{} ", less, first + 1, first + shown, total, more),
            styles::muted_style(),
        ))
        .right_aligned(),
    )
}

fn render_camper_pool(frame: &mut Frame, app: &App, area: Rect, layout: &mut BoardLayout) {
    let campers = &app.board.snapshot().unassigned_campers;
    let (border, border_type) = zone_border(app, &ZoneId::Pool, styles::border_style(false));

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(border)
        .title(Span::styled(
            format!(" Unassigned ({}) ", campers.len()),
            styles::title_style(),
        ));
    let inner = block.inner(area);
    layout.zones.push((ZoneId::Pool, hit_rect(area)));

    let offset = app.pool_scroll(PoolList::Campers);
    let (mut lines, first, max_scroll) = pool_cards(app, campers, inner, offset, layout, |c| {
        (
            DragHandle::PoolCamper(c.id.clone()),
            c.full_name(),
            c.attributes_display(),
        )
    });
    layout.camper_pool = PoolViewport {
        area: hit_rect(area),
        max_scroll,
    };
    if let Some(position) = pool_position(first, lines.len(), campers.len()) {
        block = block.title_bottom(position);
    }
    if campers.is_empty() {
        lines.push(Line::from(Span::styled(
            " Everyone has a bunk",
            styles::muted_style(),
        )));
    }
    frame.render_widget(block, area);
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_counselor_pool(frame: &mut Frame, app: &App, area: Rect, layout: &mut BoardLayout) {
    let counselors = app.board.counselor_pool();
    let (border, border_type) =
        zone_border(app, &ZoneId::CounselorPool, styles::border_style(false));

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(border)
        .title(Span::styled(
            format!(" Counselors ({}) ", counselors.len()),
            styles::title_style(),
        ));
    let inner = block.inner(area);
    layout.zones.push((ZoneId::CounselorPool, hit_rect(area)));

    let offset = app.pool_scroll(PoolList::Counselors);
    let (mut lines, first, max_scroll) = pool_cards(app, &counselors, inner, offset, layout, |k| {
        (
            DragHandle::Counselor(k.id.clone()),
            k.name.clone(),
            k.initials(),
        )
    });
    layout.counselor_pool = PoolViewport {
        area: hit_rect(area),
        max_scroll,
    };
    if let Some(position) = pool_position(first, lines.len(), counselors.len()) {
        block = block.title_bottom(position);
    }
    if counselors.is_empty() {
        lines.push(Line::from(Span::styled(
            " Every counselor has a bunk",
            styles::muted_style(),
        )));
    }
    frame.render_widget(block, area);
    frame.render_widget(Paragraph::new(lines), inner);
}

/// Rows a bunk box needs: borders, the counselor line, and the roster
fn bunk_box_height(app: &App, stats: &BunkStats<'_>) -> u16 {
    let roster = app.board.snapshot().roster(&stats.bunk.id).len().max(1);
    u16::try_from(roster).unwrap_or(u16::MAX).saturating_add(3)
}

fn group_header(group: &CabinGroup<'_>, width: u16) -> Line<'static> {
    let occupancy = group.occupancy();
    let capacity = group.capacity();
    let stats = format!(
        "{} · {}/{}",
        pluralize(group.bunks.len(), "bunk"),
        occupancy,
        capacity
    );
    let title = truncate_string(group.title(), (width as usize).saturating_sub(stats.len() + 4));
    Line::from(vec![
        Span::styled(format!(" {} ", title), styles::highlight_style()),
        Span::styled(format!(" {}", stats), styles::muted_style()),
    ])
}

/// The on-screen part of a bunk box that may run past the bunk area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct VerticalClip {
    /// First visible screen row
    top: u16,
    /// One past the last visible screen row
    bottom: u16,
    /// Box rows scrolled off above the area
    hidden_above: u16,
    /// The box's bottom border is below the area
    cut_below: bool,
}

/// Clip a box starting at virtual row `y` to the rows `top..bottom`.
fn clip_rows(y: i32, height: u16, top: i32, bottom: i32) -> Option<VerticalClip> {
    let end = y + height as i32;
    let visible_top = y.max(top);
    let visible_bottom = end.min(bottom);
    if visible_top >= visible_bottom {
        return None;
    }
    Some(VerticalClip {
        top: visible_top as u16,
        bottom: visible_bottom as u16,
        hidden_above: (visible_top - y) as u16,
        cut_below: end > bottom,
    })
}

fn render_bunks(frame: &mut Frame, app: &App, area: Rect, layout: &mut BoardLayout) {
    let snapshot = app.board.snapshot();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false))
        .title(Span::styled(
            format!(
                " Bunks · {} assigned ",
                pluralize(snapshot.total_assigned(), "camper")
            ),
            styles::title_style(),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let groups = app.board.groups();
    layout.viewport_height = inner.height;
    if groups.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                " No bunks are active for this event.",
                styles::muted_style(),
            )),
            inner,
        );
        layout.content_height = 0;
        return;
    }

    let columns = (inner.width / BUNK_BOX_WIDTH).max(1);
    let box_width = inner.width / columns;
    let selected = app.selected_bunk_id();

    // Virtual rows, shifted up by the scroll offset. Boxes straddling an edge
    // are clipped so their zone and visible cards still register.
    let top = inner.y as i32;
    let bottom = top + inner.height as i32;
    let origin = top - app.scroll as i32;
    let mut y = origin;

    for group in &groups {
        if y >= top && y < bottom {
            frame.render_widget(
                Paragraph::new(group_header(group, inner.width)),
                Rect::new(inner.x, y as u16, inner.width, 1),
            );
        }
        y += 1;

        for row in group.bunks.chunks(columns as usize) {
            let row_height = row
                .iter()
                .map(|s| bunk_box_height(app, s))
                .max()
                .unwrap_or(4);

            if let Some(clip) = clip_rows(y, row_height, top, bottom) {
                for (i, stats) in row.iter().enumerate() {
                    let x = inner.x + i as u16 * box_width;
                    let is_selected = selected.as_deref() == Some(stats.bunk.id.as_str());
                    render_bunk(frame, app, stats, (x, box_width), clip, is_selected, layout);
                }
            }
            y += row_height as i32;
        }
        // Gap between groups
        y += 1;
    }

    layout.content_height = u16::try_from(y - origin).unwrap_or(u16::MAX);
}

/// What a content row of a bunk box responds to
enum RowHit {
    RemoveControl,
    Card(DragHandle),
}

fn render_bunk(
    frame: &mut Frame,
    app: &App,
    stats: &BunkStats<'_>,
    (x, width): (u16, u16),
    clip: VerticalClip,
    selected: bool,
    layout: &mut BoardLayout,
) {
    let bunk = stats.bunk;
    let area = Rect::new(x, clip.top, width, clip.bottom - clip.top);
    let zone = ZoneId::Bunk(bunk.id.clone());
    let idle = if selected {
        styles::border_style(true)
    } else {
        styles::tier_style(stats.tier)
    };
    let (border, border_type) = zone_border(app, &zone, idle);

    let mut borders = Borders::LEFT | Borders::RIGHT;
    if clip.hidden_above == 0 {
        borders |= Borders::TOP;
    }
    if !clip.cut_below {
        borders |= Borders::BOTTOM;
    }
    let mut block = Block::default()
        .borders(borders)
        .border_type(border_type)
        .border_style(border);

    if clip.hidden_above == 0 {
        let occupancy = format_occupancy(stats.occupancy, bunk.capacity, stats.percentage);
        let over = if stats.is_over_capacity() { OVER_CAPACITY } else { "" };
        let name_room = (area.width as usize).saturating_sub(occupancy.len() + over.len() + 6);
        let name_style = if selected {
            styles::selected_style()
        } else {
            styles::list_item_style()
        };
        block = block.title(Line::from(vec![
            Span::styled(format!(" {} ", truncate_string(&bunk.name, name_room)), name_style),
            Span::styled(format!("{} ", occupancy), styles::tier_style(stats.tier)),
            Span::styled(over, styles::error_style()),
        ]));
    }
    if let (false, Some(restriction)) = (clip.cut_below, bunk.restriction_display()) {
        block = block.title_bottom(
            Line::from(Span::styled(format!(" {} ", restriction), styles::muted_style()))
                .right_aligned(),
        );
    }

    let inner = block.inner(area);
    frame.render_widget(block, area);
    layout.zones.push((zone, hit_rect(area)));

    // Content rows in box order: the counselor line, then the roster
    let mut rows: Vec<(Line<'static>, Option<RowHit>)> = Vec::new();

    match (bunk.counselor_id.as_deref(), app.board.bunk_counselor(&bunk.id)) {
        (Some(counselor_id), counselor) => {
            let name = counselor.map(|k| k.name.as_str()).unwrap_or(counselor_id);
            let room = (inner.width as usize).saturating_sub(REMOVE_CONTROL.len() + 4);
            let label = truncate_string(name, room);
            let pad = (inner.width as usize)
                .saturating_sub(3 + label.chars().count() + REMOVE_CONTROL.len());
            rows.push((
                Line::from(vec![
                    Span::styled(" ★ ", styles::highlight_style()),
                    Span::styled(label, styles::list_item_style()),
                    Span::raw(" ".repeat(pad)),
                    Span::styled(REMOVE_CONTROL, styles::control_style()),
                ]),
                Some(RowHit::RemoveControl),
            ));
        }
        (None, _) => rows.push((
            Line::from(Span::styled(" No counselor", styles::muted_style())),
            None,
        )),
    }

    let roster = app.board.snapshot().roster(&bunk.id);
    if roster.is_empty() {
        rows.push((
            Line::from(Span::styled("   (empty)", styles::muted_style())),
            None,
        ));
    }
    for assignment in roster {
        let handle = DragHandle::Assignment(assignment.id.clone());
        let detail = assignment
            .camper
            .as_ref()
            .map(|c| c.attributes_display())
            .unwrap_or_default();
        let style = card_style(app, &handle);
        rows.push((
            card_line(&assignment.camper_name(), &detail, inner.width, style),
            Some(RowHit::Card(handle)),
        ));
    }

    // Below the top border, box row n shows content row n - 1
    let skip = clip.hidden_above.saturating_sub(1) as usize;
    let control_width = REMOVE_CONTROL.len() as u16;
    let mut lines = Vec::new();
    for (i, (line, hit)) in rows.into_iter().skip(skip).take(inner.height as usize).enumerate() {
        let row_y = inner.y + i as u16;
        match hit {
            Some(RowHit::RemoveControl) if inner.width >= control_width => {
                layout.remove_controls.push((
                    bunk.id.clone(),
                    HitRect::new(inner.x + inner.width - control_width, row_y, control_width, 1),
                ));
            }
            Some(RowHit::Card(handle)) => {
                layout
                    .cards
                    .push((handle, HitRect::new(inner.x, row_y, inner.width, 1)));
            }
            _ => {}
        }
        lines.push(line);
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_card_line_fills_width() {
        let line = card_line("Sam Reed", "12 · M", 24, styles::list_item_style());
        let s = text(&line);
        assert_eq!(s.chars().count(), 24);
        assert!(s.starts_with(" • Sam Reed"));
        assert!(s.ends_with("12 · M"));
    }

    #[test]
    fn test_card_line_truncates_long_names() {
        let line = card_line("Bartholomew Fitzgerald-Montgomery", "11", 20, styles::list_item_style());
        let s = text(&line);
        assert!(s.contains("..."));
        assert!(s.chars().count() <= 20);
    }

    #[test]
    fn test_clip_rows() {
        // Fully inside
        assert_eq!(
            clip_rows(5, 4, 3, 20),
            Some(VerticalClip { top: 5, bottom: 9, hidden_above: 0, cut_below: false })
        );
        // Taller than the area on both sides
        assert_eq!(
            clip_rows(-2, 30, 3, 20),
            Some(VerticalClip { top: 3, bottom: 20, hidden_above: 5, cut_below: true })
        );
        // Runs past the bottom edge
        assert_eq!(
            clip_rows(18, 5, 3, 20),
            Some(VerticalClip { top: 18, bottom: 20, hidden_above: 0, cut_below: true })
        );
        // Entirely above or below
        assert_eq!(clip_rows(-10, 4, 3, 20), None);
        assert_eq!(clip_rows(20, 4, 3, 20), None);
    }

    #[test]
    fn test_pool_position_footer() {
        assert!(pool_position(0, 5, 5).is_none());
        let text_of = |l: Line<'static>| text(&l);
        assert_eq!(pool_position(0, 25, 60).map(text_of).as_deref(), Some(" 1-25 of 60 ↓ "));
        assert_eq!(pool_position(35, 25, 60).map(text_of).as_deref(), Some(" ↑ 36-60 of 60 "));
    }
}
