use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};

use crate::Theme;
use crate::config::{FormAction, KeyResolver, NavAction, SearchAction};
use crate::search::Matcher;
use crate::ui::{Component, EventResult, Result, contains};

/// Rows of the option list shown before it scrolls.
const MAX_VISIBLE_OPTIONS: u16 = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropdownEvent {
    /// An option was picked; the list is closed.
    Selected(String),
    /// The list was closed without picking anything.
    Dismissed,
}

/// A labelled select control with an overlay option list.
///
/// Each instance owns its open/closed state. Mouse clicks should be delivered
/// to every instance: a left click outside the button and the list closes an
/// open dropdown without touching its value, the way a document-level
/// click listener would.
///
/// Rendering is split in two: [`Component::render`] draws the label, button
/// and error line, [`Dropdown::render_overlay`] draws the open list and must
/// run after everything else so the list sits on top.
pub struct Dropdown {
    label: String,
    placeholder: String,
    options: Vec<String>,
    value: Option<String>,
    error: Option<String>,
    open: bool,
    focused: bool,
    /// `Some` while type-to-filter is active.
    filter: Option<String>,
    state: ListState,
    button_area: Rect,
    list_area: Rect,
    rows_area: Rect,
    resolver: Arc<KeyResolver>,
}

impl Dropdown {
    /// Rows taken by label, button and error line.
    pub const HEIGHT: u16 = 5;

    pub fn new(label: impl Into<String>, options: Vec<String>, resolver: Arc<KeyResolver>) -> Self {
        Self {
            label: label.into(),
            placeholder: "Select an option".to_string(),
            options,
            value: None,
            error: None,
            open: false,
            focused: false,
            filter: None,
            state: ListState::default(),
            button_area: Rect::default(),
            list_area: Rect::default(),
            rows_area: Rect::default(),
            resolver,
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn set_value(&mut self, value: Option<String>) {
        self.value = value;
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    pub const fn is_open(&self) -> bool {
        self.open
    }

    pub const fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn open(&mut self) {
        self.open = true;
        self.filter = None;
        let visible = self.visible_options();
        let current = self
            .value
            .as_ref()
            .and_then(|v| visible.iter().position(|o| *o == v));
        let highlight = current.or(if visible.is_empty() { None } else { Some(0) });
        self.state = ListState::default().with_selected(highlight);
    }

    pub fn close(&mut self) {
        self.open = false;
        self.filter = None;
        self.list_area = Rect::default();
        self.rows_area = Rect::default();
    }

    pub fn toggle(&mut self) {
        if self.open {
            self.close();
        } else {
            self.open();
        }
    }

    /// Options matching the active filter, in catalogue order.
    fn visible_options(&self) -> Vec<&String> {
        match self.filter.as_deref() {
            Some(query) if !query.is_empty() => {
                let matcher = Matcher::new();
                self.options.iter().filter(|o| matcher.matches(o, query)).collect()
            }
            _ => self.options.iter().collect(),
        }
    }

    fn highlighted(&self) -> Option<String> {
        let index = self.state.selected()?;
        self.visible_options().get(index).map(|o| (*o).clone())
    }

    fn select(&mut self, option: String) -> EventResult<DropdownEvent> {
        self.value = Some(option.clone());
        self.close();
        DropdownEvent::Selected(option).into()
    }

    fn dismiss(&mut self) -> EventResult<DropdownEvent> {
        self.close();
        DropdownEvent::Dismissed.into()
    }

    fn refilter(&mut self) {
        let highlight = if self.visible_options().is_empty() { None } else { Some(0) };
        self.state = ListState::default().with_selected(highlight);
    }

    fn handle_filter_key(&mut self, key: KeyEvent) -> Option<EventResult<DropdownEvent>> {
        let filter = self.filter.as_mut()?;
        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                filter.push(c);
            }
            KeyCode::Backspace => {
                filter.pop();
            }
            _ if self.resolver.matches_search(&key, SearchAction::Exit) => {
                self.filter = None;
            }
            _ => return None,
        }
        self.refilter();
        Some(EventResult::Consumed)
    }

    fn handle_open_key(&mut self, key: KeyEvent) -> EventResult<DropdownEvent> {
        if let Some(result) = self.handle_filter_key(key) {
            return result;
        }

        if self.resolver.matches_search(&key, SearchAction::Toggle) {
            self.filter = Some(String::new());
            return EventResult::Consumed;
        }
        if self.resolver.matches_form(&key, FormAction::Close) {
            return self.dismiss();
        }
        if self.resolver.matches_nav(&key, NavAction::Select) {
            return self
                .highlighted()
                .map_or(EventResult::Consumed, |option| self.select(option));
        }
        if self.resolver.matches_nav(&key, NavAction::Down) {
            self.state.select_next();
        } else if self.resolver.matches_nav(&key, NavAction::Up) {
            self.state.select_previous();
        } else if self.resolver.matches_nav(&key, NavAction::Home) {
            self.state.select_first();
        } else if self.resolver.matches_nav(&key, NavAction::End) {
            self.state.select_last();
        } else {
            return EventResult::Ignored;
        }
        self.clamp_highlight();
        EventResult::Consumed
    }

    // ListState::select_next/last do not know the item count until render
    fn clamp_highlight(&mut self) {
        let len = self.visible_options().len();
        if len == 0 {
            self.state.select(None);
        } else if let Some(i) = self.state.selected() {
            self.state.select(Some(i.min(len - 1)));
        }
    }

    fn option_at_row(&self, row: u16) -> Option<String> {
        let index = usize::from(row.checked_sub(self.rows_area.y)?) + self.state.offset();
        self.visible_options().get(index).map(|o| (*o).clone())
    }

    fn list_height(&self) -> u16 {
        let rows = u16::try_from(self.visible_options().len())
            .unwrap_or(u16::MAX)
            .clamp(1, MAX_VISIBLE_OPTIONS);
        let filter_row = u16::from(self.filter.is_some());
        rows + filter_row + 2
    }

    /// Draw the open option list below the button. No-op when closed.
    pub fn render_overlay(&mut self, frame: &mut Frame, theme: &Theme) {
        if !self.open {
            return;
        }

        let screen = frame.area();
        let top = self.button_area.bottom();
        let height = self.list_height().min(screen.bottom().saturating_sub(top));
        self.list_area = Rect::new(self.button_area.x, top, self.button_area.width, height);

        frame.render_widget(Clear, self.list_area);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.border_focused()))
            .style(Style::default().bg(theme.base()));
        let inner = block.inner(self.list_area);
        frame.render_widget(block, self.list_area);

        let [filter_area, rows_area] = Layout::vertical([
            Constraint::Length(u16::from(self.filter.is_some())),
            Constraint::Fill(1),
        ])
        .areas(inner);
        self.rows_area = rows_area;

        if let Some(query) = &self.filter {
            let prompt = Line::from(vec![
                Span::styled("/", Style::default().fg(theme.peach())),
                Span::styled(query.clone(), Style::default().fg(theme.text())),
            ]);
            frame.render_widget(Paragraph::new(prompt), filter_area);
        }

        let visible = self.visible_options();
        if visible.is_empty() {
            let empty = Paragraph::new("No options found").style(Style::default().fg(theme.overlay1()));
            frame.render_widget(empty, rows_area);
            return;
        }

        let items: Vec<ListItem> = visible
            .iter()
            .map(|option| {
                let style = if self.value.as_ref() == Some(*option) {
                    Style::default().fg(theme.text()).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(theme.subtext0())
                };
                ListItem::new((*option).clone()).style(style)
            })
            .collect();

        let list = List::new(items)
            .highlight_style(
                Style::default()
                    .bg(theme.selection_bg())
                    .fg(theme.lavender())
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(list, rows_area, &mut self.state);
    }
}

impl Component for Dropdown {
    type Output = DropdownEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if self.open {
            return Ok(self.handle_open_key(key));
        }
        if self.resolver.matches_nav(&key, NavAction::Select) {
            self.open();
            return Ok(EventResult::Consumed);
        }
        Ok(EventResult::Ignored)
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Result<EventResult<Self::Output>> {
        let (column, row) = (mouse.column, mouse.row);
        let inside_list = self.open && contains(self.list_area, column, row);

        Ok(match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if inside_list {
                    self.option_at_row(row)
                        .map_or(EventResult::Consumed, |option| self.select(option))
                } else if contains(self.button_area, column, row) {
                    self.toggle();
                    EventResult::Consumed
                } else if self.open {
                    self.dismiss()
                } else {
                    EventResult::Ignored
                }
            }
            MouseEventKind::ScrollDown if inside_list => {
                self.state.select_next();
                self.clamp_highlight();
                EventResult::Consumed
            }
            MouseEventKind::ScrollUp if inside_list => {
                self.state.select_previous();
                self.clamp_highlight();
                EventResult::Consumed
            }
            _ => EventResult::Ignored,
        })
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let [label_area, button_area, error_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .areas(area);
        self.button_area = button_area;

        let label_style = if self.focused {
            Style::default().fg(theme.lavender()).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.subtext1())
        };
        frame.render_widget(Paragraph::new(self.label.clone()).style(label_style), label_area);

        let border_color = if self.error.is_some() {
            theme.error()
        } else if self.open || self.focused {
            theme.border_focused()
        } else {
            theme.border()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(border_color));
        let inner = block.inner(button_area);
        frame.render_widget(block, button_area);

        let [text_area, arrow_area] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Length(2)]).areas(inner);
        let text = self.value.as_ref().map_or_else(
            || Span::styled(self.placeholder.clone(), Style::default().fg(theme.overlay0())),
            |value| Span::styled(value.clone(), Style::default().fg(theme.text())),
        );
        frame.render_widget(Paragraph::new(Line::from(text)), text_area);
        let arrow = if self.open { "▲" } else { "▼" };
        frame.render_widget(
            Paragraph::new(arrow).style(Style::default().fg(theme.overlay1())),
            arrow_area,
        );

        if let Some(error) = &self.error {
            frame.render_widget(
                Paragraph::new(error.clone()).style(Style::default().fg(theme.error())),
                error_area,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;

    fn options() -> Vec<String> {
        ["Oil Change", "Engine Work", "AC Repair"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    /// Renders the dropdown at (0, 0) with a width of 30, so the button
    /// occupies rows 1..=3 and an open list starts at row 4.
    fn draw(dropdown: &mut Dropdown) {
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal
            .draw(|frame| {
                let theme = Theme::default();
                dropdown.render(frame, Rect::new(0, 0, 30, Dropdown::HEIGHT), &theme);
                dropdown.render_overlay(frame, &theme);
            })
            .unwrap();
    }

    fn dropdown() -> Dropdown {
        Dropdown::new("Repair Service", options(), Arc::new(KeyResolver::default()))
    }

    #[test]
    fn test_keyboard_select_closes_and_emits() {
        let mut dd = dropdown();
        assert_eq!(dd.handle_key(key(KeyCode::Enter)).unwrap(), EventResult::Consumed);
        assert!(dd.is_open());

        dd.handle_key(key(KeyCode::Down)).unwrap();
        let result = dd.handle_key(key(KeyCode::Enter)).unwrap();

        assert_eq!(result, DropdownEvent::Selected("Engine Work".to_string()).into());
        assert_eq!(dd.value(), Some("Engine Work"));
        assert!(!dd.is_open());
    }

    #[test]
    fn test_escape_dismisses_without_change() {
        let mut dd = dropdown();
        dd.set_value(Some("AC Repair".to_string()));
        dd.open();
        dd.handle_key(key(KeyCode::Up)).unwrap();

        let result = dd.handle_key(key(KeyCode::Esc)).unwrap();

        assert_eq!(result, DropdownEvent::Dismissed.into());
        assert_eq!(dd.value(), Some("AC Repair"));
    }

    #[test]
    fn test_open_highlights_current_value() {
        let mut dd = dropdown();
        dd.set_value(Some("AC Repair".to_string()));
        dd.open();
        assert_eq!(dd.highlighted().as_deref(), Some("AC Repair"));
    }

    #[test]
    fn test_highlight_stays_in_bounds() {
        let mut dd = dropdown();
        dd.open();
        for _ in 0..10 {
            dd.handle_key(key(KeyCode::Down)).unwrap();
        }
        assert_eq!(dd.highlighted().as_deref(), Some("AC Repair"));
    }

    #[test]
    fn test_outside_click_closes_and_keeps_value() {
        let mut dd = dropdown();
        dd.set_value(Some("Oil Change".to_string()));
        draw(&mut dd);
        dd.handle_mouse(click(5, 2)).unwrap();
        assert!(dd.is_open());
        draw(&mut dd);

        let result = dd.handle_mouse(click(50, 15)).unwrap();

        assert_eq!(result, DropdownEvent::Dismissed.into());
        assert!(!dd.is_open());
        assert_eq!(dd.value(), Some("Oil Change"));
    }

    #[test]
    fn test_outside_click_when_closed_is_ignored() {
        let mut dd = dropdown();
        draw(&mut dd);
        assert_eq!(dd.handle_mouse(click(50, 15)).unwrap(), EventResult::Ignored);
    }

    #[test]
    fn test_click_on_option_selects_it() {
        let mut dd = dropdown();
        draw(&mut dd);
        dd.handle_mouse(click(5, 2)).unwrap();
        draw(&mut dd);

        // List border is row 4, options start at row 5
        let result = dd.handle_mouse(click(5, 6)).unwrap();

        assert_eq!(result, DropdownEvent::Selected("Engine Work".to_string()).into());
        assert!(!dd.is_open());
    }

    #[test]
    fn test_clicking_button_twice_toggles() {
        let mut dd = dropdown();
        draw(&mut dd);
        dd.handle_mouse(click(5, 2)).unwrap();
        draw(&mut dd);
        dd.handle_mouse(click(5, 2)).unwrap();
        assert!(!dd.is_open());
    }

    #[test]
    fn test_instances_are_independent() {
        let resolver = Arc::new(KeyResolver::default());
        let mut first = Dropdown::new("Car Type", options(), resolver.clone());
        let mut second = Dropdown::new("Repair Service", options(), resolver);

        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        let mut draw_both = |first: &mut Dropdown, second: &mut Dropdown| {
            terminal
                .draw(|frame| {
                    let theme = Theme::default();
                    first.render(frame, Rect::new(0, 0, 28, Dropdown::HEIGHT), &theme);
                    second.render(frame, Rect::new(30, 0, 28, Dropdown::HEIGHT), &theme);
                    first.render_overlay(frame, &theme);
                    second.render_overlay(frame, &theme);
                })
                .unwrap();
        };

        draw_both(&mut first, &mut second);
        first.handle_mouse(click(5, 2)).unwrap();
        second.handle_mouse(click(5, 2)).unwrap();
        assert!(first.is_open());
        assert!(!second.is_open());

        draw_both(&mut first, &mut second);
        first.handle_mouse(click(35, 2)).unwrap();
        second.handle_mouse(click(35, 2)).unwrap();
        assert!(!first.is_open());
        assert!(second.is_open());
    }

    #[test]
    fn test_filter_narrows_options() {
        let mut dd = dropdown();
        dd.open();
        dd.handle_key(key(KeyCode::Char('/'))).unwrap();
        for c in "eng".chars() {
            dd.handle_key(key(KeyCode::Char(c))).unwrap();
        }

        let result = dd.handle_key(key(KeyCode::Enter)).unwrap();

        assert_eq!(result, DropdownEvent::Selected("Engine Work".to_string()).into());
    }

    #[test]
    fn test_filter_without_match_renders_placeholder_row() {
        let mut dd = dropdown();
        dd.open();
        dd.handle_key(key(KeyCode::Char('/'))).unwrap();
        for c in "zzz".chars() {
            dd.handle_key(key(KeyCode::Char(c))).unwrap();
        }
        assert_eq!(dd.handle_key(key(KeyCode::Enter)).unwrap(), EventResult::Consumed);
        assert!(dd.is_open());

        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal
            .draw(|frame| {
                let theme = Theme::default();
                dd.render(frame, Rect::new(0, 0, 30, Dropdown::HEIGHT), &theme);
                dd.render_overlay(frame, &theme);
            })
            .unwrap();
        let rendered: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(rendered.contains("No options found"));
    }

    #[test]
    fn test_error_text_is_rendered_under_button() {
        let mut dd = dropdown().with_placeholder("Select a repair service");
        dd.set_error(Some("Please select a repair service".to_string()));

        let mut terminal = Terminal::new(TestBackend::new(40, 6)).unwrap();
        terminal
            .draw(|frame| dd.render(frame, Rect::new(0, 0, 40, Dropdown::HEIGHT), &Theme::default()))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let error_row: String = (0..40u16).map(|x| buffer[(x, 4u16)].symbol().to_string()).collect();
        assert!(error_row.starts_with("Please select a repair service"));
    }
}
