//! Instantaneous metric cards with trend arrows.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::history::Window;
use crate::scheduler::Snapshot;
use crate::types::ChartPoint;
use crate::ui::theme;
use crate::ui::util::{mb_label, seconds_label};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl Trend {
    pub fn icon(self) -> &'static str {
        match self {
            Trend::Up => "↗",
            Trend::Down => "↘",
            Trend::Stable => "→",
        }
    }

    fn color(self) -> Color {
        match self {
            Trend::Up => theme::CPU_USER,
            Trend::Down => theme::MEM_RSS,
            Trend::Stable => theme::MUTED,
        }
    }
}

/// Direction of `field` across the last two points; stable with fewer than two.
pub fn trend_of<F: Fn(&ChartPoint) -> f64>(w: &Window, field: F) -> Trend {
    match w.last_pair() {
        Some((prev, last)) => {
            let (a, b) = (field(prev), field(last));
            if b > a {
                Trend::Up
            } else if b < a {
                Trend::Down
            } else {
                Trend::Stable
            }
        }
        None => Trend::Stable,
    }
}

pub struct Card {
    pub title: &'static str,
    pub value: String,
    pub subtitle: &'static str,
    pub trend: Trend,
}

pub fn build_cards(s: &Snapshot) -> Vec<Card> {
    let Some(cur) = s.current.as_ref() else {
        return Vec::new();
    };
    let mem = &cur.data.memory_usage;
    let latest = s.window.latest();
    let rss = mem
        .rss_formatted
        .clone()
        .or_else(|| latest.map(|p| mb_label(p.memory_rss)))
        .unwrap_or_default();
    let heap = mem
        .heap_used_formatted
        .clone()
        .or_else(|| latest.map(|p| mb_label(p.memory_heap_used)))
        .unwrap_or_default();
    let uptime = cur
        .data
        .process
        .uptime_formatted
        .clone()
        .unwrap_or_else(|| seconds_label(cur.data.process.uptime));
    let latency = if cur.meta.request_duration.is_empty() {
        "n/a".to_string()
    } else {
        cur.meta.request_duration.clone()
    };

    vec![
        Card {
            title: "RSS Memory",
            value: rss,
            subtitle: "Resident Set Size",
            trend: trend_of(&s.window, |p| p.memory_rss as f64),
        },
        Card {
            title: "Heap Used",
            value: heap,
            subtitle: "Active heap memory",
            trend: trend_of(&s.window, |p| p.memory_heap_used as f64),
        },
        Card {
            title: "Uptime",
            value: uptime,
            subtitle: "Process running time",
            trend: trend_of(&s.window, |p| p.uptime),
        },
        Card {
            title: "Response Time",
            value: latency,
            subtitle: "API latency",
            trend: Trend::Stable,
        },
    ]
}

pub fn draw_cards(f: &mut ratatui::Frame<'_>, area: Rect, s: &Snapshot) {
    let cards = build_cards(s);
    if cards.is_empty() {
        return;
    }
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, cards.len() as u32); cards.len()])
        .split(area);

    for (card, rect) in cards.iter().zip(cols.iter()) {
        let lines = vec![
            Line::from(vec![
                Span::styled(
                    card.value.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(" "),
                Span::styled(card.trend.icon(), Style::default().fg(card.trend.color())),
            ]),
            Line::from(Span::styled(card.subtitle, Style::default().fg(theme::MUTED))),
        ];
        let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(card.title));
        f.render_widget(p, *rect);
    }
}
