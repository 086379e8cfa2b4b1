use ratatui::prelude::*;
use ratatui::widgets::{Block, Paragraph, Widget};

use tracing::debug;

/// The reusable "Buy now" call to action.
///
/// Clicking runs the `on_click` callback unless the button is disabled or
/// loading. What the callback does is up to the host.
pub struct BuyNowButton {
    text: String,
    show_apple_pay: bool,
    disabled: bool,
    loading: bool,
    on_click: Option<Box<dyn FnMut() + Send>>,
}

impl Default for BuyNowButton {
    fn default() -> Self {
        Self {
            text: "Buy now".to_string(),
            show_apple_pay: true,
            disabled: false,
            loading: false,
            on_click: None,
        }
    }
}

impl std::fmt::Debug for BuyNowButton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuyNowButton")
            .field("text", &self.text)
            .field("show_apple_pay", &self.show_apple_pay)
            .field("disabled", &self.disabled)
            .field("loading", &self.loading)
            .field("on_click", &self.on_click.is_some())
            .finish()
    }
}

impl BuyNowButton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn show_apple_pay(mut self, show: bool) -> Self {
        self.show_apple_pay = show;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn on_click(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.on_click = Some(Box::new(callback));
        self
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_enabled(&self) -> bool {
        !self.disabled && !self.loading
    }

    pub fn label(&self) -> &str {
        if self.loading {
            "Processing..."
        } else {
            &self.text
        }
    }

    pub fn shows_pay_badge(&self) -> bool {
        self.show_apple_pay && !self.loading
    }

    /// Fire the callback. Returns whether it ran.
    pub fn click(&mut self) -> bool {
        if !self.is_enabled() {
            debug!(loading = self.loading, "buy button click ignored");
            return false;
        }
        if let Some(callback) = self.on_click.as_mut() {
            callback();
        }
        true
    }
}

impl Widget for &BuyNowButton {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let fg = if self.is_enabled() {
            Color::White
        } else {
            Color::DarkGray
        };
        let block = Block::bordered()
            .border_style(Style::default().fg(Color::Black))
            .style(Style::default().bg(Color::Black).fg(fg));

        let mut spans = vec![Span::styled(
            self.label().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )];
        if self.shows_pay_badge() {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                " Pay ",
                Style::default().bg(Color::White).fg(Color::Black),
            ));
        }

        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .block(block)
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_button() -> (BuyNowButton, Arc<AtomicUsize>) {
        let clicks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&clicks);
        let button = BuyNowButton::new().on_click(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (button, clicks)
    }

    fn rendered_text(button: &BuyNowButton) -> String {
        let area = Rect::new(0, 0, 30, 3);
        let mut buf = Buffer::empty(area);
        button.render(area, &mut buf);
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn defaults() {
        let button = BuyNowButton::new();
        assert_eq!(button.label(), "Buy now");
        assert!(button.shows_pay_badge());
        assert!(button.is_enabled());
    }

    #[test]
    fn click_runs_callback_when_enabled() {
        let (mut button, clicks) = counting_button();
        assert!(button.click());
        assert!(button.click());
        assert_eq!(clicks.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn disabled_button_ignores_clicks() {
        let (button, clicks) = counting_button();
        let mut button = button.disabled(true);
        assert!(!button.click());
        assert_eq!(clicks.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn loading_button_ignores_clicks_and_hides_badge() {
        let (mut button, clicks) = counting_button();
        button.set_loading(true);
        assert_eq!(button.label(), "Processing...");
        assert!(!button.shows_pay_badge());
        assert!(!button.click());
        assert_eq!(clicks.load(Ordering::SeqCst), 0);

        button.set_loading(false);
        assert!(button.click());
    }

    #[test]
    fn click_without_callback_still_reports_success() {
        let mut button = BuyNowButton::new().text("Vote");
        assert!(button.click());
    }

    #[test]
    fn renders_label_and_badge() {
        let text = rendered_text(&BuyNowButton::new());
        assert!(text.contains("Buy now"), "got:\n{text}");
        assert!(text.contains("Pay"), "got:\n{text}");

        let text = rendered_text(&BuyNowButton::new().show_apple_pay(false).text("Vote"));
        assert!(text.contains("Vote"));
        assert!(!text.contains("Pay"));
    }
}
