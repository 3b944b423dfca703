//! App state and main loop: input handling, following scheduler snapshots, and drawing.

use std::{io, time::Duration};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Terminal,
};
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::info;

use crate::scheduler::{Scheduler, Snapshot};
use crate::ui::{
    cards::draw_cards,
    cpu::draw_cpu_chart,
    endpoint::{draw_endpoint_panel, EndpointAction, EndpointEditor},
    header::draw_header,
    info::draw_info,
    mem::draw_mem_chart,
};

const FRAME_INTERVAL: Duration = Duration::from_millis(100);

pub struct App {
    scheduler: Scheduler,
    snapshots: watch::Receiver<Snapshot>,
    // Latest snapshot pulled from the scheduler
    last: Snapshot,
    editor: EndpointEditor,
    should_quit: bool,
}

impl App {
    pub fn new(scheduler: Scheduler) -> Self {
        let snapshots = scheduler.subscribe();
        let last = snapshots.borrow().clone();
        Self {
            scheduler,
            snapshots,
            last,
            editor: EndpointEditor::default(),
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        self.scheduler.start();

        // Terminal setup
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let res = self.event_loop(&mut terminal).await;

        // Teardown
        self.scheduler.stop().await;
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        res
    }

    async fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> anyhow::Result<()> {
        loop {
            // Input (non-blocking)
            while event::poll(Duration::from_millis(10))? {
                if let Event::Key(k) = event::read()? {
                    if k.kind == KeyEventKind::Press {
                        self.handle_key(k);
                    }
                }
            }
            if self.should_quit {
                break;
            }

            if self.snapshots.has_changed().unwrap_or(false) {
                self.last = self.snapshots.borrow_and_update().clone();
            }

            terminal.draw(|f| self.draw(f))?;
            sleep(FRAME_INTERVAL).await;
        }
        Ok(())
    }

    pub fn handle_key(&mut self, k: KeyEvent) {
        if self.editor.open {
            match self.editor.handle_key(k) {
                Some(EndpointAction::Save(url)) => self.scheduler.set_endpoint(url),
                Some(EndpointAction::Reset) => self.scheduler.reset_endpoint(),
                Some(EndpointAction::Cancel) => info!("endpoint edit cancelled"),
                None => {}
            }
            return;
        }
        match k.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') | KeyCode::Char('C') => {
                self.editor.open_with(&self.scheduler.endpoint());
            }
            _ => {}
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn editor(&self) -> &EndpointEditor {
        &self.editor
    }

    pub fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        let area = f.area();
        if self.last.is_loading() {
            draw_loading(f, area, &self.last);
            return;
        }

        let panel_height = if self.editor.open { 8 } else { 0 };
        // Root rows: header, cards, endpoint panel, charts, info
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(4),
                Constraint::Length(panel_height),
                Constraint::Min(10),
                Constraint::Length(8),
            ])
            .split(area);

        draw_header(f, rows[0], &self.last);
        draw_cards(f, rows[1], &self.last);
        if self.editor.open {
            draw_endpoint_panel(f, rows[2], &self.editor, &self.last);
        }

        let charts = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(66), Constraint::Percentage(34)])
            .split(rows[3]);
        draw_mem_chart(f, charts[0], &self.last.window);
        draw_cpu_chart(f, charts[1], &self.last.window);

        draw_info(f, rows[4], &self.last);
    }
}

fn draw_loading(f: &mut ratatui::Frame<'_>, area: Rect, s: &Snapshot) {
    let p = Paragraph::new(format!("Loading memory data from {} ...", s.endpoint))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL).title("memwatch"));
    f.render_widget(p, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{PollSettings, DEFAULT_ENDPOINT};
    use crate::synthetic::SyntheticSource;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;
    use std::sync::Arc;

    fn app() -> App {
        let sched = Scheduler::new(
            Arc::new(SyntheticSource::seeded(1)),
            DEFAULT_ENDPOINT.into(),
            PollSettings::default(),
        );
        App::new(sched)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn q_quits_unless_editing() {
        let mut a = app();
        press(&mut a, KeyCode::Char('c'));
        assert!(a.editor().open);
        press(&mut a, KeyCode::Char('q'));
        assert!(!a.should_quit());
        assert!(a.editor().input.ends_with('q'));
        press(&mut a, KeyCode::Esc);
        assert!(!a.editor().open);
        press(&mut a, KeyCode::Char('q'));
        assert!(a.should_quit());
    }

    #[test]
    fn saving_in_editor_changes_scheduler_endpoint() {
        let mut a = app();
        press(&mut a, KeyCode::Char('c'));
        press(&mut a, KeyCode::Char('2'));
        press(&mut a, KeyCode::Enter);
        assert_eq!(a.scheduler.endpoint(), "/mem-check2");
        a.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE));
        a.handle_key(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL));
        assert_eq!(a.scheduler.endpoint(), "/mem-check");
    }

    #[tokio::test]
    async fn draws_loading_then_dashboard() {
        let mut a = app();
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| a.draw(f)).unwrap();
        let text = format!("{:?}", terminal.backend().buffer());
        assert!(text.contains("Loading memory data"));

        a.scheduler.start();
        let mut rx = a.scheduler.subscribe();
        let snap = rx.wait_for(|s| s.cycles >= 1).await.unwrap().clone();
        a.scheduler.stop().await;
        a.last = snap;
        terminal.draw(|f| a.draw(f)).unwrap();
        let text = format!("{:?}", terminal.backend().buffer());
        assert!(text.contains("RSS Memory"));
        assert!(text.contains("Connected"));
        assert!(text.contains("Memory Usage Over Time"));
        assert!(text.contains("Data Points:"));
    }
}
