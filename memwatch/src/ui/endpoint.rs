//! Endpoint configuration panel: edit the polled URL at runtime.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::scheduler::{Snapshot, DEFAULT_ENDPOINT};
use crate::ui::theme;

/// Shape of the payload the endpoint has to return.
pub const EXPECTED_FORMAT: &str =
    r#"{"success":true,"data":{"memoryUsage":{"rss":..},"process":{"uptime":..},"cpuUsage":{..},"timestamp":".."},"meta":{..}}"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointAction {
    Save(String),
    Reset,
    Cancel,
}

#[derive(Debug, Default)]
pub struct EndpointEditor {
    pub open: bool,
    pub input: String,
}

impl EndpointEditor {
    pub fn open_with(&mut self, current: &str) {
        self.open = true;
        self.input = current.to_string();
    }

    /// Feed a key while the panel is open. Returns an action once the edit concludes.
    pub fn handle_key(&mut self, k: KeyEvent) -> Option<EndpointAction> {
        if !self.open {
            return None;
        }
        match k.code {
            KeyCode::Char('r') if k.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input = DEFAULT_ENDPOINT.to_string();
                self.open = false;
                Some(EndpointAction::Reset)
            }
            KeyCode::Enter => {
                self.open = false;
                let url = self.input.trim().to_string();
                if url.is_empty() {
                    Some(EndpointAction::Cancel)
                } else {
                    Some(EndpointAction::Save(url))
                }
            }
            KeyCode::Esc => {
                self.open = false;
                Some(EndpointAction::Cancel)
            }
            KeyCode::Backspace => {
                self.input.pop();
                None
            }
            KeyCode::Char(c) if !k.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.push(c);
                None
            }
            _ => None,
        }
    }
}

pub fn draw_endpoint_panel(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    editor: &EndpointEditor,
    s: &Snapshot,
) {
    let mut lines = vec![
        Line::from(vec![
            Span::styled("URL: ", Style::default().fg(theme::MUTED)),
            Span::styled(
                format!("{}_", editor.input),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("Current: ", Style::default().fg(theme::MUTED)),
            Span::raw(s.endpoint.clone()),
        ]),
    ];
    if let Some(err) = s.connection.last_error.as_ref() {
        lines.push(Line::from(vec![
            Span::styled("Last Error: ", Style::default().fg(Color::Red)),
            Span::raw(err.clone()),
        ]));
    }
    lines.push(Line::from(vec![
        Span::styled("Expected JSON: ", Style::default().fg(theme::MUTED)),
        Span::raw(EXPECTED_FORMAT),
    ]));
    lines.push(Line::from(Span::styled(
        "Enter: save  Ctrl-R: reset to /mem-check  Esc: cancel",
        Style::default().fg(theme::MUTED),
    )));

    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Endpoint Configuration"),
        );
    f.render_widget(p, area);
}
