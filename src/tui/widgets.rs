use ratatui::prelude::*;
use ratatui::widgets::{Paragraph, Widget};

use crate::carousel::CarouselController;
use crate::catalog::{Catalog, Item, Rarity};
use crate::color::Color as AppColor;
use crate::sampler::ColorCache;

const PRICE_TAG_BG: AppColor = AppColor::new(0x32, 0x32, 0x32);

pub fn to_color(c: AppColor) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}

/// Text and separator colors that stay readable on a tinted background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contrast {
    pub text: AppColor,
    pub separator: AppColor,
}

impl Contrast {
    pub fn for_background(bg: AppColor) -> Self {
        let dark = AppColor::new(0x4a, 0x55, 0x68);
        let light = AppColor::new(0xe2, 0xe8, 0xf0);
        if bg.is_light() {
            Self {
                text: dark,
                separator: light,
            }
        } else {
            Self {
                text: light,
                separator: dark,
            }
        }
    }
}

fn rarity_color(rarity: Rarity) -> Color {
    match rarity {
        Rarity::Common => Color::Gray,
        Rarity::Rare => Color::Rgb(0x3b, 0x82, 0xf6),
        Rarity::Epic => Color::Rgb(0xa8, 0x55, 0xf7),
        Rarity::Legendary => Color::Rgb(0xea, 0xb3, 0x08),
    }
}

/// Center `text` in `width` columns, cutting it with an ellipsis if needed.
fn fit(text: &str, width: usize) -> String {
    let len = text.chars().count();
    let text = if len > width {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    } else {
        text.to_string()
    };
    format!("{text:^width$}")
}

/// The lines of one song card, exactly `width` columns wide.
fn card_lines(item: &Item, cover: AppColor, width: usize) -> Vec<Line<'static>> {
    let cover_width = width.saturating_sub(8).max(4).min(width);
    let left = (width - cover_width) / 2;
    let right = width - cover_width - left;
    let cover_style = Style::default().bg(to_color(cover));

    let price = format!(" ${} ", item.price);
    let tag_width = price.chars().count().min(cover_width);
    let tag_row = Line::from(vec![
        Span::raw(" ".repeat(left)),
        Span::styled(
            price.chars().take(tag_width).collect::<String>(),
            Style::default()
                .bg(to_color(PRICE_TAG_BG))
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" ".repeat(cover_width - tag_width), cover_style),
        Span::raw(" ".repeat(right)),
    ]);
    let cover_row = || {
        Line::from(vec![
            Span::raw(" ".repeat(left)),
            Span::styled(" ".repeat(cover_width), cover_style),
            Span::raw(" ".repeat(right)),
        ])
    };

    vec![
        Line::from(" ".repeat(width)),
        tag_row,
        cover_row(),
        cover_row(),
        cover_row(),
        Line::from(" ".repeat(width)),
        Line::styled(
            format!(" {} ", fit(&item.title, width.saturating_sub(2))),
            Style::default().fg(Color::Black).add_modifier(Modifier::BOLD),
        ),
        Line::styled(
            format!(" {} ", fit(item.rarity.label(), width.saturating_sub(2))),
            Style::default().fg(rarity_color(item.rarity)),
        ),
    ]
}

/// The horizontally scrolling strip of song cards. Each card is as wide as
/// the area; the strip is shifted by the controller's translation.
pub struct CarouselWidget<'a> {
    catalog: &'a Catalog,
    controller: &'a CarouselController,
    cache: &'a ColorCache,
}

impl<'a> CarouselWidget<'a> {
    pub fn new(
        catalog: &'a Catalog,
        controller: &'a CarouselController,
        cache: &'a ColorCache,
    ) -> Self {
        Self {
            catalog,
            controller,
            cache,
        }
    }
}

/// Pixels represented by one terminal column when a card spans `columns`.
pub fn px_per_cell(item_width: f32, columns: u16) -> f32 {
    item_width / f32::from(columns.max(1))
}

impl Widget for CarouselWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let card_width = i32::from(area.width);
        let scale = px_per_cell(self.controller.item_width(), area.width);
        let strip = card_width.saturating_mul(self.catalog.len() as i32 + 1);
        let shift = ((self.controller.translate_x() / scale).round() as i32).clamp(-strip, strip);
        let (area_left, area_right) = (i32::from(area.x), i32::from(area.right()));

        for (i, item) in self.catalog.items().iter().enumerate() {
            let left = area_left + i as i32 * card_width + shift;
            let visible_left = left.max(area_left);
            let visible_right = (left + card_width).min(area_right);
            if visible_left >= visible_right {
                continue;
            }

            let cover = self.cache.resolve(self.catalog, item.id);
            let rect = Rect::new(
                visible_left as u16,
                area.y,
                (visible_right - visible_left) as u16,
                area.height,
            );
            Paragraph::new(card_lines(item, cover, area.width as usize))
                .scroll((0, (visible_left - left) as u16))
                .render(rect, buf);
        }
    }
}

/// Page indicator: one dot per item, the current one emphasized.
pub struct IndicatorDots {
    count: usize,
    active: usize,
    contrast: AppColor,
    background: AppColor,
}

impl IndicatorDots {
    pub fn new(count: usize, active: usize, contrast: AppColor, background: AppColor) -> Self {
        Self {
            count,
            active,
            contrast,
            background,
        }
    }
}

impl Widget for IndicatorDots {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inactive = self.contrast.mix(self.background, 0.5);
        let mut spans = Vec::with_capacity(self.count * 2);
        for i in 0..self.count {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            if i == self.active {
                spans.push(Span::styled("●", Style::default().fg(to_color(self.contrast))));
            } else {
                spans.push(Span::styled("•", Style::default().fg(to_color(inactive))));
            }
        }
        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}
