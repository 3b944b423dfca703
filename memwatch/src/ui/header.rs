//! Top header: title, live marker, latency badge and connection badge.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::scheduler::Snapshot;
use crate::ui::theme;
use crate::ui::util::truncate_middle;

pub fn connection_label(s: &Snapshot) -> &'static str {
    if s.is_loading() {
        "Connecting"
    } else if s.connection.is_connected {
        "Connected"
    } else {
        "Using Mock Data"
    }
}

pub fn draw_header(f: &mut ratatui::Frame<'_>, area: Rect, s: &Snapshot) {
    let badge_color = if s.connection.is_connected {
        theme::OK
    } else {
        theme::BAD
    };
    let mut spans = vec![
        Span::styled(
            "memwatch - Memory Monitor",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("● Live", Style::default().fg(Color::Green)),
    ];
    if let Some(cur) = s.current.as_ref() {
        if !cur.meta.request_duration.is_empty() {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                format!("[{}]", cur.meta.request_duration),
                Style::default().fg(theme::MUTED),
            ));
        }
    }
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
        truncate_middle(&s.endpoint, 40),
        Style::default().fg(theme::MUTED),
    ));
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
        format!("[{}]", connection_label(s)),
        Style::default().fg(badge_color).add_modifier(Modifier::BOLD),
    ));
    if s.is_stale() && !s.is_loading() {
        spans.push(Span::styled(" stale", Style::default().fg(Color::Yellow)));
    }
    spans.push(Span::styled(
        "  (c: configure, q: quit)",
        Style::default().fg(theme::MUTED),
    ));

    let p = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(p, area);
}
