use ratatui::style::{Color, Modifier, Style};

use campboard_core::board::{CapacityTier, NoticeLevel};

// Color palette
pub const PRIMARY: Color = Color::Rgb(64, 128, 192);
pub const SECONDARY: Color = Color::Rgb(96, 160, 96);
pub const ACCENT: Color = Color::Rgb(192, 160, 64);
pub const ERROR: Color = Color::Rgb(192, 64, 64);
pub const MUTED: Color = Color::Rgb(128, 128, 128);
pub const HIGHLIGHT: Color = Color::Rgb(48, 48, 64);

// Styles
pub fn title_style() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default().bg(HIGHLIGHT).add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    Style::default().fg(Color::White)
}

pub fn muted_style() -> Style {
    Style::default().fg(MUTED)
}

pub fn highlight_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn success_style() -> Style {
    Style::default().fg(SECONDARY)
}

pub fn error_style() -> Style {
    Style::default().fg(ERROR)
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(PRIMARY)
    } else {
        Style::default().fg(MUTED)
    }
}

/// Border of the zone the pointer would drop into
pub fn drop_target_style() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

/// Card whose record is currently being dragged
pub fn dragging_card_style() -> Style {
    Style::default()
        .fg(MUTED)
        .add_modifier(Modifier::DIM | Modifier::CROSSED_OUT)
}

/// The floating clone that follows the pointer
pub fn drag_overlay_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(ACCENT)
        .add_modifier(Modifier::BOLD)
}

pub fn tier_style(tier: CapacityTier) -> Style {
    match tier {
        CapacityTier::Normal => Style::default().fg(SECONDARY),
        CapacityTier::NearFull => Style::default().fg(ACCENT),
        CapacityTier::Full => Style::default().fg(ERROR).add_modifier(Modifier::BOLD),
    }
}

pub fn notice_style(level: NoticeLevel) -> Style {
    match level {
        NoticeLevel::Success => success_style(),
        NoticeLevel::Error => error_style().add_modifier(Modifier::BOLD),
    }
}

pub fn control_style() -> Style {
    Style::default().fg(ERROR)
}

pub fn status_bar_style() -> Style {
    Style::default().bg(Color::Rgb(32, 32, 40)).fg(Color::White)
}

pub fn help_key_style() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn help_desc_style() -> Style {
    Style::default().fg(Color::White)
}
