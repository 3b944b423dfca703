//! Memory usage over time: RSS, heap used/total and external, in MB.

use ratatui::{
    layout::Rect,
    style::Style,
    symbols::Marker,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
};

use crate::history::Window;
use crate::types::ChartPoint;
use crate::ui::theme;

pub fn series<F: Fn(&ChartPoint) -> f64>(w: &Window, field: F) -> Vec<(f64, f64)> {
    w.iter()
        .enumerate()
        .map(|(i, p)| (i as f64, field(p)))
        .collect()
}

// First and last time labels for the x axis
pub fn time_bounds_labels(w: &Window) -> Vec<String> {
    match (w.iter().next(), w.latest()) {
        (Some(first), Some(last)) => vec![first.time.clone(), last.time.clone()],
        _ => vec![String::new(), String::new()],
    }
}

pub fn y_max(values: &[&[(f64, f64)]]) -> f64 {
    let peak = values
        .iter()
        .flat_map(|s| s.iter().map(|&(_, y)| y))
        .fold(0.0_f64, f64::max);
    (peak * 1.1).max(1.0).ceil()
}

pub fn draw_mem_chart(f: &mut ratatui::Frame<'_>, area: Rect, w: &Window) {
    let rss = series(w, |p| p.memory_rss as f64);
    let heap_used = series(w, |p| p.memory_heap_used as f64);
    let heap_total = series(w, |p| p.memory_heap_total as f64);
    let external = series(w, |p| p.memory_external as f64);
    let top = y_max(&[
        rss.as_slice(),
        heap_used.as_slice(),
        heap_total.as_slice(),
        external.as_slice(),
    ]);
    let x_max = (w.len().saturating_sub(1)).max(1) as f64;

    let datasets = vec![
        Dataset::default()
            .name("RSS")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(theme::MEM_RSS))
            .data(&rss),
        Dataset::default()
            .name("Heap Used")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(theme::MEM_HEAP_USED))
            .data(&heap_used),
        Dataset::default()
            .name("Heap Total")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(theme::MEM_HEAP_TOTAL))
            .data(&heap_total),
        Dataset::default()
            .name("External")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(theme::MEM_EXTERNAL))
            .data(&external),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Memory Usage Over Time (MB)"),
        )
        .x_axis(
            Axis::default()
                .bounds([0.0, x_max])
                .labels(time_bounds_labels(w)),
        )
        .y_axis(
            Axis::default()
                .bounds([0.0, top])
                .labels(vec![Span::raw("0"), Span::raw(format!("{top:.0}"))]),
        );
    f.render_widget(chart, area);
}
