pub mod button;
pub mod widgets;

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Constraint, Layout, Margin, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Clear, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use tracing::{debug, info};

use crate::carousel::CarouselController;
use crate::catalog::Catalog;
use crate::color::Color;
use crate::sampler::{ColorCache, ExtractionWorker};

use button::BuyNowButton;
use widgets::{px_per_cell, to_color, CarouselWidget, Contrast, IndicatorDots};

const MODAL_WIDTH: u16 = 40;
const MODAL_HEIGHT: u16 = 25;
const FRAME_INTERVAL: Duration = Duration::from_millis(100);

const BACKDROP: Color = Color::new(0x1a, 0x1a, 0x1a);
const INK: Color = Color::new(0x00, 0x05, 0x00);
const FINE_PRINT: Color = Color::new(0x33, 0x33, 0x33);

/// State for the interactive carousel.
pub struct TuiApp {
    pub catalog: Arc<Catalog>,
    pub controller: CarouselController,
    pub cache: ColorCache,
    pub buy_button: BuyNowButton,
    worker: Option<ExtractionWorker>,
    status: Option<String>,
    carousel_area: Rect,
    button_area: Rect,
    should_quit: bool,
}

impl TuiApp {
    pub fn new(
        catalog: Arc<Catalog>,
        controller: CarouselController,
        worker: Option<ExtractionWorker>,
        buy_button: BuyNowButton,
    ) -> Self {
        Self {
            catalog,
            controller,
            cache: ColorCache::new(),
            buy_button,
            worker,
            status: None,
            carousel_area: Rect::default(),
            button_area: Rect::default(),
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Pull finished extractions into the cache.
    pub fn poll_extraction(&mut self) {
        if let Some(worker) = &self.worker {
            let stored = worker.drain_into(&mut self.cache);
            if stored > 0 {
                debug!(stored, cached = self.cache.len(), "colors received");
            }
        }
    }

    /// Background tint for the current page.
    pub fn active_color(&self) -> Color {
        self.controller.active_color(&self.catalog, &self.cache)
    }

    fn px(&self, column: u16) -> f32 {
        let scale = px_per_cell(self.controller.item_width(), self.carousel_area.width);
        f32::from(column) * scale
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.on_key(key),
            Event::Mouse(mouse) => self.on_mouse(mouse),
            _ => {}
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Left | KeyCode::Char('h') => self.keyboard_swipe(1.0),
            KeyCode::Right | KeyCode::Char('l') => self.keyboard_swipe(-1.0),
            KeyCode::Enter | KeyCode::Char('b') => self.buy(),
            _ => {}
        }
    }

    /// A full-width drag in `direction` (+1 shows the previous item, -1 the next).
    fn keyboard_swipe(&mut self, direction: f32) {
        let distance = direction * self.controller.item_width();
        self.controller.begin_drag(0.0);
        self.controller.update_drag(distance);
        self.controller.end_drag();
    }

    fn on_mouse(&mut self, mouse: MouseEvent) {
        let inside = |area: Rect| area.contains((mouse.column, mouse.row).into());
        let x = self.px(mouse.column);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) if inside(self.carousel_area) => {
                self.controller.begin_drag(x);
            }
            MouseEventKind::Down(MouseButton::Left) if inside(self.button_area) => self.buy(),
            MouseEventKind::Drag(MouseButton::Left) => self.controller.update_drag(x),
            MouseEventKind::Up(MouseButton::Left) => {
                self.controller.end_drag();
            }
            _ => {}
        }
    }

    fn buy(&mut self) {
        let Some(item) = self.catalog.get(self.controller.current_index()) else {
            return;
        };
        self.status = Some(if self.buy_button.click() {
            info!(id = item.id, title = %item.title, price = item.price, "purchase requested");
            format!("Purchase requested: {} (${})", item.title, item.price)
        } else {
            "Buy now is unavailable right now".to_string()
        });
    }

    /// How long the event loop may block before the next frame or timer.
    pub fn poll_timeout(&self, now: Instant) -> Duration {
        self.controller
            .next_deadline()
            .map(|at| at.saturating_duration_since(now))
            .map_or(FRAME_INTERVAL, |until| until.min(FRAME_INTERVAL))
    }

    /// Stop nudge timers and let go of the extraction worker.
    pub fn teardown(&mut self) {
        self.controller.teardown();
        self.worker = None;
    }
}

/// Launch the TUI application.
pub fn run(mut app: TuiApp) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = event_loop(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    app.teardown();

    res
}

fn event_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut TuiApp) -> Result<()> {
    while !app.should_quit() {
        app.poll_extraction();
        terminal.draw(|frame| render(frame, app))?;

        if event::poll(app.poll_timeout(Instant::now()))? {
            app.handle_event(event::read()?);
        }
        app.controller.tick(Instant::now());
    }
    Ok(())
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// Draw the modal card and remember where the interactive parts landed.
pub fn render(frame: &mut Frame, app: &mut TuiApp) {
    let area = frame.area();
    frame.render_widget(
        Block::new().style(Style::default().bg(to_color(BACKDROP))),
        area,
    );

    let tint = app.active_color();
    let contrast = Contrast::for_background(tint);
    let modal = centered(area, MODAL_WIDTH, MODAL_HEIGHT);
    let card = Block::bordered()
        .title(" Change the Setlist ")
        .title_style(Style::default().add_modifier(Modifier::BOLD))
        .border_style(Style::default().fg(ratatui::style::Color::Black))
        .style(Style::default().bg(to_color(tint)).fg(to_color(INK)));
    let inner = card.inner(modal);
    frame.render_widget(Clear, modal);
    frame.render_widget(card, modal);

    let [intro, carousel, dots, button, separator, fine_print, status] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(8),
        Constraint::Length(2),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Min(1),
    ])
    .areas(inner);

    frame.render_widget(
        Paragraph::new("Cycle through the songs and select what you want to hear at your concert.")
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        intro,
    );

    app.carousel_area = carousel;
    frame.render_widget(
        CarouselWidget::new(&app.catalog, &app.controller, &app.cache),
        carousel,
    );
    frame.render_widget(
        IndicatorDots::new(
            app.catalog.len(),
            app.controller.current_index(),
            contrast.text,
            tint,
        ),
        dots,
    );

    let button = button.inner(Margin::new(2, 0));
    app.button_area = button;
    frame.render_widget(&app.buy_button, button);

    frame.render_widget(
        Paragraph::new("─".repeat(usize::from(separator.width)))
            .style(Style::default().fg(to_color(contrast.separator))),
        separator,
    );
    frame.render_widget(
        Paragraph::new(
            "By purchasing a ticket you acknowledge that the setlist may change. \
             We strive for accuracy but cannot guarantee specific songs will be performed.",
        )
        .style(Style::default().fg(to_color(FINE_PRINT)))
        .wrap(Wrap { trim: true }),
        fine_print,
    );

    let hint = app
        .status
        .clone()
        .unwrap_or_else(|| "←/→ or drag · enter buy · q quit".to_string());
    frame.render_widget(
        Paragraph::new(Line::from(hint))
            .alignment(Alignment::Center)
            .style(Style::default().fg(to_color(contrast.text))),
        status,
    );
}
