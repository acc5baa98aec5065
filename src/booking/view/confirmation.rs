use std::sync::Arc;

use crossterm::event::{KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Margin, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::Theme;
use crate::booking::model::{Slot, Station};
use crate::config::{DialogAction, KeyResolver};
use crate::ui::{EventResult, Modal, Result, contains};

const WIDTH: u16 = 60;
const HEIGHT: u16 = 9;
const CLOSE: &str = "[x]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationEvent {
    Closed,
}

/// Booking summary shown after a successful submit.
///
/// Closes on a dismiss key, a click on `[x]` or a click on the backdrop.
pub struct ConfirmationDialog {
    station: Station,
    slot: Slot,
    popup_area: Rect,
    close_area: Rect,
    resolver: Arc<KeyResolver>,
}

impl ConfirmationDialog {
    pub fn new(station: Station, slot: Slot, resolver: Arc<KeyResolver>) -> Self {
        Self {
            station,
            slot,
            popup_area: Rect::default(),
            close_area: Rect::default(),
            resolver,
        }
    }

    fn detail<'a>(label: &'a str, value: String, theme: &Theme) -> Line<'a> {
        Line::from(vec![
            Span::styled(
                label,
                Style::default().fg(theme.subtext1()).add_modifier(Modifier::BOLD),
            ),
            Span::styled(value, Style::default().fg(theme.text())),
        ])
    }
}

impl Modal for ConfirmationDialog {
    type Output = ConfirmationEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if self.resolver.matches_dialog(&key, DialogAction::Dismiss) {
            return Ok(ConfirmationEvent::Closed.into());
        }
        Ok(EventResult::Consumed)
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Result<EventResult<Self::Output>> {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return Ok(EventResult::Consumed);
        }
        let (column, row) = (mouse.column, mouse.row);
        if contains(self.close_area, column, row) || !contains(self.popup_area, column, row) {
            return Ok(ConfirmationEvent::Closed.into());
        }
        Ok(EventResult::Consumed)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let width = WIDTH.min(area.width);
        let height = HEIGHT.min(area.height);
        self.popup_area = area.centered(Constraint::Length(width), Constraint::Length(height));

        frame.render_widget(Clear, self.popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.success()))
            .style(Style::default().bg(theme.base()))
            .title_top(
                Line::from(format!(" {} ", self.title().unwrap_or_default()))
                    .style(Style::default().fg(theme.success()).add_modifier(Modifier::BOLD))
                    .centered(),
            )
            .title_top(
                Line::from(CLOSE)
                    .style(Style::default().fg(theme.overlay1()))
                    .right_aligned(),
            );
        let inner = block.inner(self.popup_area);
        frame.render_widget(block, self.popup_area);

        // Right-aligned title ends one cell before the corner.
        self.close_area = Rect::new(
            self.popup_area.right().saturating_sub(4),
            self.popup_area.y,
            3,
            1,
        );

        let lines = vec![
            Line::default(),
            Self::detail("Station: ", self.station.name.clone(), theme),
            Self::detail("Address: ", self.station.address.clone(), theme),
            Self::detail("Time:    ", self.slot.time_label(), theme),
            Line::default(),
            Line::from(Span::styled(
                format!("{} to close", self.resolver.display_dialog(DialogAction::Dismiss)),
                Style::default().fg(theme.overlay0()),
            ))
            .alignment(Alignment::Center),
        ];
        frame.render_widget(Paragraph::new(lines), inner.inner(Margin::new(2, 0)));
    }

    fn title(&self) -> Option<&str> {
        Some("Booking Confirmed!")
    }
}
