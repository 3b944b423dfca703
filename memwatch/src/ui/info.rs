//! Process information and environment detail panels.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::normalize::to_chart_point;
use crate::scheduler::Snapshot;
use crate::ui::theme;

fn row(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<14}"), Style::default().fg(theme::MUTED)),
        Span::styled(value, Style::default().add_modifier(Modifier::BOLD)),
    ])
}

pub fn process_rows(s: &Snapshot) -> Vec<(&'static str, String)> {
    let Some(cur) = s.current.as_ref() else {
        return Vec::new();
    };
    let p = &cur.data.process;
    let ru = &cur.data.resource_usage;
    vec![
        ("PID:", p.pid.to_string()),
        ("Platform:", p.platform.clone()),
        ("Architecture:", p.arch.clone()),
        ("Node Version:", p.node_version.clone()),
        (
            "Page faults:",
            format!("{:.0} minor / {:.0} major", ru.minor_page_fault, ru.major_page_fault),
        ),
        (
            "Ctx switches:",
            format!(
                "{:.0} vol / {:.0} invol",
                ru.voluntary_context_switches, ru.involuntary_context_switches
            ),
        ),
    ]
}

pub fn environment_rows(s: &Snapshot) -> Vec<(&'static str, String)> {
    let Some(cur) = s.current.as_ref() else {
        return Vec::new();
    };
    let env = &cur.data.environment;
    // latest point carries the local-time label of the current sample
    let updated = s
        .window
        .latest()
        .map(|p| p.time.clone())
        .unwrap_or_else(|| to_chart_point(cur).time);
    vec![
        ("Timezone:", env.timezone.clone()),
        ("Locale:", env.locale.clone()),
        ("Last Updated:", updated),
        ("Data Points:", s.window.len().to_string()),
    ]
}

pub fn draw_info(f: &mut ratatui::Frame<'_>, area: Rect, s: &Snapshot) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let panels = [
        ("Process Information", process_rows(s)),
        ("Environment Details", environment_rows(s)),
    ];
    for ((title, rows), rect) in panels.into_iter().zip(cols.iter()) {
        let lines: Vec<Line> = rows.into_iter().map(|(k, v)| row(k, v)).collect();
        let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(p, *rect);
    }
}
