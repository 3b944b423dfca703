//! CPU usage chart. Accumulated microseconds are folded into a 0..100 relative scale.

use ratatui::{
    layout::Rect,
    style::Style,
    symbols::Marker,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
};

use crate::history::Window;
use crate::ui::mem::{series, time_bounds_labels};
use crate::ui::theme;

/// Position within the current second of CPU time, scaled to 0..=100.
pub fn cpu_relative(micros: f64) -> f64 {
    ((micros % 1_000_000.0) / 10_000.0).round()
}

pub fn draw_cpu_chart(f: &mut ratatui::Frame<'_>, area: Rect, w: &Window) {
    let user = series(w, |p| cpu_relative(p.cpu_user));
    let system = series(w, |p| cpu_relative(p.cpu_system));
    let x_max = (w.len().saturating_sub(1)).max(1) as f64;

    let title = match w.latest() {
        Some(p) => format!(
            "CPU Usage (user {:.0} / sys {:.0})",
            cpu_relative(p.cpu_user),
            cpu_relative(p.cpu_system)
        ),
        None => "CPU Usage".into(),
    };

    let datasets = vec![
        Dataset::default()
            .name("User")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(theme::CPU_USER))
            .data(&user),
        Dataset::default()
            .name("System")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(theme::CPU_SYSTEM))
            .data(&system),
    ];

    let chart = Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title(title))
        .x_axis(
            Axis::default()
                .bounds([0.0, x_max])
                .labels(time_bounds_labels(w)),
        )
        .y_axis(
            Axis::default()
                .bounds([0.0, 100.0])
                .labels(vec![Span::raw("0"), Span::raw("100")]),
        );
    f.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_scale_wraps_each_second() {
        assert_eq!(cpu_relative(2_884_297.0), 88.0);
        assert_eq!(cpu_relative(531_100.0), 53.0);
        assert_eq!(cpu_relative(1_000_000.0), 0.0);
        assert_eq!(cpu_relative(999_999.0), 100.0);
    }
}
