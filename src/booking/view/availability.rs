use std::sync::Arc;

use crossterm::event::{KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::Theme;
use crate::booking::model::{Slot, SlotSelection, Station};
use crate::config::{KeyResolver, NavAction};
use crate::ui::{Component, EventResult, Result, contains};

/// Rows per station: name, slot chips, gap.
const STATION_ROWS: u16 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityEvent {
    SlotChosen { station_id: String, slot: Slot },
}

/// Stations with their slots as chips. The cursor moves across slots with the
/// arrow keys; the chosen slot is drawn filled.
pub struct AvailabilityList {
    stations: Vec<Station>,
    selected: Option<SlotSelection>,
    /// (station, slot) under the keyboard cursor.
    cursor: (usize, usize),
    offset: usize,
    focused: bool,
    chips: Vec<(Rect, usize, usize)>,
    resolver: Arc<KeyResolver>,
}

impl AvailabilityList {
    pub const fn new(resolver: Arc<KeyResolver>) -> Self {
        Self {
            stations: Vec::new(),
            selected: None,
            cursor: (0, 0),
            offset: 0,
            focused: false,
            chips: Vec::new(),
            resolver,
        }
    }

    pub fn set_stations(&mut self, stations: &[Station]) {
        if self.stations != stations {
            self.stations = stations.to_vec();
            self.cursor = (0, 0);
            self.offset = 0;
            self.chips.clear();
        }
    }

    pub fn set_selected(&mut self, selected: Option<SlotSelection>) {
        self.selected = selected;
    }

    pub const fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    fn slot_count(&self, station: usize) -> usize {
        self.stations
            .get(station)
            .map_or(0, |s| s.available_slots.len())
    }

    fn choose(&mut self, station: usize, slot: usize) -> EventResult<AvailabilityEvent> {
        let Some(s) = self.stations.get(station) else {
            return EventResult::Consumed;
        };
        let Some(&time) = s.available_slots.get(slot) else {
            return EventResult::Consumed;
        };
        self.cursor = (station, slot);
        AvailabilityEvent::SlotChosen {
            station_id: s.id.clone(),
            slot: time,
        }
        .into()
    }

    fn move_station(&mut self, down: bool) {
        let (station, slot) = self.cursor;
        let last = self.stations.len().saturating_sub(1);
        let station = if down {
            (station + 1).min(last)
        } else {
            station.saturating_sub(1)
        };
        let slot = slot.min(self.slot_count(station).saturating_sub(1));
        self.cursor = (station, slot);
    }

    fn move_slot(&mut self, right: bool) {
        let (station, slot) = self.cursor;
        let last = self.slot_count(station).saturating_sub(1);
        let slot = if right {
            (slot + 1).min(last)
        } else {
            slot.saturating_sub(1)
        };
        self.cursor = (station, slot);
    }

    fn keep_cursor_visible(&mut self, visible: usize) {
        let station = self.cursor.0;
        if station < self.offset {
            self.offset = station;
        } else if visible > 0 && station >= self.offset + visible {
            self.offset = station + 1 - visible;
        }
    }

    fn chip_style(&self, theme: &Theme, station: &Station, slot: Slot, at_cursor: bool) -> Style {
        let chosen = self
            .selected
            .as_ref()
            .is_some_and(|s| s.station_id == station.id && s.slot == slot);

        let style = if chosen {
            Style::default()
                .bg(theme.primary())
                .fg(theme.base())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().bg(theme.surface0()).fg(theme.text())
        };
        if at_cursor {
            style.add_modifier(Modifier::UNDERLINED).fg(if chosen {
                theme.base()
            } else {
                theme.peach()
            })
        } else {
            style
        }
    }
}

impl Component for AvailabilityList {
    type Output = AvailabilityEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if self.stations.is_empty() {
            return Ok(EventResult::Ignored);
        }

        let r = Arc::clone(&self.resolver);
        if r.matches_nav(&key, NavAction::Select) {
            let (station, slot) = self.cursor;
            return Ok(self.choose(station, slot));
        }
        if r.matches_nav(&key, NavAction::Down) {
            self.move_station(true);
        } else if r.matches_nav(&key, NavAction::Up) {
            self.move_station(false);
        } else if r.matches_nav(&key, NavAction::Right) {
            self.move_slot(true);
        } else if r.matches_nav(&key, NavAction::Left) {
            self.move_slot(false);
        } else if r.matches_nav(&key, NavAction::Home) {
            self.cursor.1 = 0;
        } else if r.matches_nav(&key, NavAction::End) {
            self.cursor.1 = self.slot_count(self.cursor.0).saturating_sub(1);
        } else {
            return Ok(EventResult::Ignored);
        }
        Ok(EventResult::Consumed)
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Result<EventResult<Self::Output>> {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return Ok(EventResult::Ignored);
        }
        let hit = self
            .chips
            .iter()
            .find(|(area, _, _)| contains(*area, mouse.column, mouse.row))
            .map(|&(_, station, slot)| (station, slot));

        Ok(match hit {
            Some((station, slot)) => self.choose(station, slot),
            None => EventResult::Ignored,
        })
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        self.chips.clear();
        if self.stations.is_empty() || area.height == 0 {
            return;
        }

        let [heading_area, list_area] =
            Layout::vertical([Constraint::Length(2), Constraint::Fill(1)]).areas(area);
        frame.render_widget(
            Paragraph::new("Available Stations:")
                .style(Style::default().fg(theme.text()).add_modifier(Modifier::BOLD)),
            heading_area,
        );

        let visible = usize::from(list_area.height / STATION_ROWS).max(1);
        self.keep_cursor_visible(visible);

        let mut y = list_area.y;
        for (index, station) in self.stations.iter().enumerate().skip(self.offset).take(visible) {
            if y >= list_area.bottom() {
                break;
            }
            let name = Line::from(vec![
                Span::styled(
                    station.name.clone(),
                    Style::default().fg(theme.text()).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  {}", station.address),
                    Style::default().fg(theme.overlay1()),
                ),
            ]);
            frame.render_widget(Paragraph::new(name), Rect::new(list_area.x, y, list_area.width, 1));

            let chip_row = y + 1;
            if chip_row < list_area.bottom() {
                let mut x = list_area.x;
                for (slot_index, &slot) in station.available_slots.iter().enumerate() {
                    let text = format!(" {} ", slot.short_label());
                    let width = u16::try_from(text.chars().count()).unwrap_or(u16::MAX);
                    if x.saturating_add(width) > list_area.right() {
                        break;
                    }
                    let chip = Rect::new(x, chip_row, width, 1);
                    let at_cursor = self.focused && self.cursor == (index, slot_index);
                    let style = self.chip_style(theme, station, slot, at_cursor);
                    frame.render_widget(Paragraph::new(text).style(style), chip);
                    self.chips.push((chip, index, slot_index));
                    x = x.saturating_add(width + 1);
                }
            }
            y = y.saturating_add(STATION_ROWS);
        }
    }
}
