// TUI module for rendering the terminal interface
pub mod input;

// Re-exports
pub use input::{handle_key_event, handle_summary_input, KeyAction, PointerTracker};

use crate::domain::{Card, CardId, StackParams, Summary, Transform};
use crate::surface::{DisplaySurface, OverlayKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Gauge, Paragraph, Wrap},
    Frame,
};

/// Horizontal pixels represented by one terminal column
pub const PX_PER_COL: f64 = 8.0;
/// Vertical pixels represented by one terminal row
pub const PX_PER_ROW: f64 = 16.0;

/// How many stacked cards are drawn below the topmost one
const VISIBLE_DEPTH: usize = 2;
const CARD_WIDTH: u16 = 44;

const ACCENT_ACCEPT: Color = Color::Rgb(76, 217, 100);
const ACCENT_REJECT: Color = Color::Rgb(255, 69, 58);
const ACCENT_HIGHLIGHT: Color = Color::Rgb(255, 159, 10);
const TEXT_PRIMARY: Color = Color::Rgb(235, 235, 235);
const TEXT_SECONDARY: Color = Color::Rgb(142, 142, 147);
const BG_DARK: Color = Color::Rgb(28, 28, 30);

/// UI view state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    /// Card stack with progress
    Deck,
    /// Summary screen at end
    Summary,
}

/// What the terminal shows for one card
#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    pub id: CardId,
    pub title: String,
    pub image_ref: String,
    pub transform: Transform,
    pub stack: Option<StackParams>,
    pub moving: bool,
}

/// Display surface backed by a view model that [`render`] draws
#[derive(Debug, Default)]
pub struct TerminalDisplay {
    viewport_cols: u16,
    cards: Vec<CardView>,
    accept_overlay: bool,
    reject_overlay: bool,
    progress_percent: f64,
    progress_label: String,
    summary: Option<Summary>,
}

impl TerminalDisplay {
    pub fn new(viewport_cols: u16) -> Self {
        Self {
            viewport_cols,
            ..Self::default()
        }
    }

    /// Clears everything shown for a finished round
    pub fn clear(&mut self) {
        *self = Self::new(self.viewport_cols);
    }

    pub fn set_viewport_cols(&mut self, cols: u16) {
        self.viewport_cols = cols;
    }

    pub fn view_state(&self) -> ViewState {
        if self.summary.is_some() {
            ViewState::Summary
        } else {
            ViewState::Deck
        }
    }

    pub fn card(&self, id: CardId) -> Option<&CardView> {
        self.cards.iter().find(|card| card.id == id)
    }

    pub fn overlay_visible(&self, kind: OverlayKind) -> bool {
        match kind {
            OverlayKind::Accept => self.accept_overlay,
            OverlayKind::Reject => self.reject_overlay,
        }
    }

    pub fn progress(&self) -> (f64, &str) {
        (self.progress_percent, &self.progress_label)
    }

    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    /// Cards that still take part in the stack, deepest first
    fn stacked_cards(&self) -> Vec<&CardView> {
        let mut cards: Vec<_> = self
            .cards
            .iter()
            .filter(|card| card.stack.is_some())
            .collect();
        cards.sort_by_key(|card| card.stack.map_or(0, |stack| stack.z_index));
        cards
    }

    fn card_mut(&mut self, id: CardId) -> Option<&mut CardView> {
        self.cards.iter_mut().find(|card| card.id == id)
    }
}

impl DisplaySurface for TerminalDisplay {
    fn viewport_width(&self) -> f64 {
        f64::from(self.viewport_cols) * PX_PER_COL
    }

    fn render_card(&mut self, card: &Card) {
        let view = CardView {
            id: card.id,
            title: card.title.clone(),
            image_ref: card.image_ref.clone(),
            transform: Transform::NEUTRAL,
            stack: None,
            moving: false,
        };
        match self.card_mut(card.id) {
            Some(existing) => *existing = view,
            None => self.cards.push(view),
        }
    }

    fn apply_transform(&mut self, card_id: CardId, transform: Transform) {
        if let Some(card) = self.card_mut(card_id) {
            card.transform = transform;
        }
    }

    fn set_moving(&mut self, card_id: CardId, moving: bool) {
        if let Some(card) = self.card_mut(card_id) {
            card.moving = moving;
        }
    }

    fn set_stack_params(&mut self, card_id: CardId, params: StackParams) {
        if let Some(card) = self.card_mut(card_id) {
            card.stack = Some(params);
        }
    }

    fn remove_card(&mut self, card_id: CardId) {
        if let Some(card) = self.card_mut(card_id) {
            card.stack = None;
            card.moving = false;
        }
    }

    fn set_overlay(&mut self, kind: OverlayKind, visible: bool) {
        match kind {
            OverlayKind::Accept => self.accept_overlay = visible,
            OverlayKind::Reject => self.reject_overlay = visible,
        }
    }

    fn set_progress(&mut self, percent: f64, label: &str) {
        self.progress_percent = percent;
        self.progress_label = label.to_string();
    }

    fn show_summary(&mut self, summary: &Summary) {
        self.summary = Some(summary.clone());
    }
}

/// Renders the deck or the summary, whichever is visible
pub fn render(frame: &mut Frame, display: &TerminalDisplay) {
    match display.view_state() {
        ViewState::Deck => render_deck(frame, display),
        ViewState::Summary => {
            if let Some(summary) = display.summary() {
                render_summary(frame, summary);
            }
        }
    }
}

fn render_deck(frame: &mut Frame, display: &TerminalDisplay) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Progress
            Constraint::Min(0),    // Card stack
            Constraint::Length(3), // Footer
        ])
        .split(frame.area());

    render_progress(frame, chunks[0], display);
    render_stack(frame, chunks[1], display);
    render_footer(frame, chunks[2]);
}

fn render_progress(frame: &mut Frame, area: Rect, display: &TerminalDisplay) {
    let (percent, label) = display.progress();
    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(" catswp "),
        )
        .gauge_style(Style::default().fg(ACCENT_HIGHLIGHT).bg(BG_DARK))
        .ratio((percent / 100.0).clamp(0.0, 1.0))
        .label(format!("{} {:.0}%", label, percent));

    frame.render_widget(gauge, area);
}

fn render_stack(frame: &mut Frame, area: Rect, display: &TerminalDisplay) {
    let placed: Vec<_> = display
        .stacked_cards()
        .into_iter()
        .filter_map(|card| card_rect(area, card).map(|rect| (rect, card)))
        .collect();
    let visible_from = placed.len().saturating_sub(VISIBLE_DEPTH + 1);

    for (rect, card) in &placed[visible_from..] {
        render_card(frame, *rect, card);
    }

    let overlay = if display.overlay_visible(OverlayKind::Accept) {
        Some(("  LIKE  ", ACCENT_ACCEPT))
    } else if display.overlay_visible(OverlayKind::Reject) {
        Some(("  NOPE  ", ACCENT_REJECT))
    } else {
        None
    };

    if let Some((text, color)) = overlay {
        let badge = Rect::new(area.x, area.y, area.width, area.height.min(1));
        let paragraph = Paragraph::new(Span::styled(
            text,
            Style::default()
                .fg(BG_DARK)
                .bg(color)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center);
        frame.render_widget(paragraph, badge);
    }
}

fn render_card(frame: &mut Frame, rect: Rect, card: &CardView) {
    let opacity = card.stack.map_or(1.0, |stack| stack.opacity);
    let text_color = if opacity < 0.5 {
        TEXT_SECONDARY
    } else {
        TEXT_PRIMARY
    };
    let border_color = if card.moving {
        ACCENT_HIGHLIGHT
    } else {
        text_color
    };

    let block = Block::default()
        .title(format!(" {} ", card.title))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color))
        .style(Style::default().bg(BG_DARK));

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("=^.^=", Style::default().fg(text_color))),
        Line::from(""),
        Line::from(Span::styled(
            card.image_ref.clone(),
            Style::default().fg(TEXT_SECONDARY),
        )),
    ];

    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        rect,
    );
}

/// Screen rectangle of a card after scaling, stacking and its transform,
/// clipped to `area`. `None` once the card is fully off screen.
fn card_rect(area: Rect, card: &CardView) -> Option<Rect> {
    let stack = card.stack?;
    let width = (f64::from(CARD_WIDTH.min(area.width)) * stack.scale).round() as i32;
    let height = (f64::from(area.height.saturating_sub(2)) * stack.scale).round() as i32;

    let center_x = i32::from(area.x) + i32::from(area.width) / 2;
    let top = i32::from(area.y) + 1;
    let offset_x = (card.transform.translate_x / PX_PER_COL).round() as i32;
    let offset_y = ((card.transform.translate_y + stack.translate_y) / PX_PER_ROW).round() as i32;

    let left = center_x - width / 2 + offset_x;
    let top = top + offset_y;

    let x0 = left.max(i32::from(area.x));
    let y0 = top.max(i32::from(area.y));
    let x1 = (left + width).min(i32::from(area.x) + i32::from(area.width));
    let y1 = (top + height).min(i32::from(area.y) + i32::from(area.height));

    if x1 - x0 < 3 || y1 - y0 < 3 {
        return None;
    }

    Some(Rect::new(
        x0 as u16,
        y0 as u16,
        (x1 - x0) as u16,
        (y1 - y0) as u16,
    ))
}

fn render_footer(frame: &mut Frame, area: Rect) {
    let footer = Paragraph::new(Line::from(vec![
        Span::styled("← h ", Style::default().fg(ACCENT_REJECT)),
        Span::raw("Nope   "),
        Span::styled("→ l ", Style::default().fg(ACCENT_ACCEPT)),
        Span::raw("Like   "),
        Span::styled("drag ", Style::default().fg(ACCENT_HIGHLIGHT)),
        Span::raw("Swipe   "),
        Span::styled("q ", Style::default().fg(TEXT_SECONDARY)),
        Span::raw("Quit"),
    ]))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    );

    frame.render_widget(footer, area);
}

/// Renders the summary screen at the end
pub fn render_summary(frame: &mut Frame, summary: &Summary) {
    let area = centered_rect(70, 70, frame.area());

    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" All done! ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT_HIGHLIGHT))
        .style(Style::default().bg(BG_DARK));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::raw("You liked "),
            Span::styled(
                summary.accepted_count.to_string(),
                Style::default()
                    .fg(ACCENT_ACCEPT)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" of "),
            Span::styled(
                summary.total.to_string(),
                Style::default()
                    .fg(ACCENT_HIGHLIGHT)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" cats"),
        ]),
        Line::from(""),
    ];

    lines.extend(summary.accepted_refs.iter().map(|image_ref| {
        Line::from(vec![
            Span::styled("♥ ", Style::default().fg(ACCENT_ACCEPT)),
            Span::raw(image_ref.clone()),
        ])
    }));

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press r to play again, any other key to exit",
        Style::default().fg(TEXT_SECONDARY),
    )));

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().fg(TEXT_PRIMARY))
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, inner);
}

/// Helper function to create a centered rectangle
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
