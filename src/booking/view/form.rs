use std::sync::Arc;

use crossterm::event::{KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::Theme;
use crate::booking::catalog::{self, CAR_TYPES, REPAIR_SERVICES};
use crate::booking::form::BookingForm;
use crate::booking::message::BookingMsg;
use crate::booking::model::{Field, Status};
use crate::booking::view::{
    AvailabilityEvent, AvailabilityList, ConfirmationDialog, ConfirmationEvent,
};
use crate::config::{DialogAction, FormAction, KeyResolver, NavAction, SearchAction};
use crate::ui::{
    Component, Dropdown, DropdownEvent, EventResult, Keybinding, Modal, Result, Screen, Spinner,
    contains,
};

const MAX_WIDTH: u16 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    CarType,
    RepairService,
    Slots,
    Book,
}

impl Focus {
    const fn field(self) -> Option<Field> {
        match self {
            Self::CarType => Some(Field::CarType),
            Self::RepairService => Some(Field::RepairService),
            Self::Slots | Self::Book => None,
        }
    }
}

/// The booking page: two dropdowns, the availability list and the book button.
///
/// One input may produce several messages, e.g. a click that closes one
/// dropdown and picks a slot, so the output is a batch.
pub struct BookingScreen {
    car_type: Dropdown,
    service: Dropdown,
    availability: AvailabilityList,
    confirmation: Option<ConfirmationDialog>,
    spinner: Spinner,
    focus: Focus,
    status: Status,
    slot_error: Option<String>,
    book_area: Rect,
    resolver: Arc<KeyResolver>,
}

impl BookingScreen {
    pub fn new(resolver: Arc<KeyResolver>) -> Self {
        let dropdown = |field: Field, options: &[&str]| {
            Dropdown::new(field.label(), catalog::options(options), Arc::clone(&resolver))
                .with_placeholder(field.placeholder())
        };
        let mut screen = Self {
            car_type: dropdown(Field::CarType, CAR_TYPES),
            service: dropdown(Field::RepairService, REPAIR_SERVICES),
            availability: AvailabilityList::new(Arc::clone(&resolver)),
            confirmation: None,
            spinner: Spinner::new().with_label("Checking for available stations..."),
            focus: Focus::CarType,
            status: Status::Idle,
            slot_error: None,
            book_area: Rect::default(),
            resolver,
        };
        screen.apply_focus();
        screen
    }

    /// Mirror the form state into the widgets.
    pub fn sync(&mut self, form: &BookingForm) {
        for field in [Field::CarType, Field::RepairService] {
            let dropdown = self.dropdown_mut(field);
            dropdown.set_value(form.selection().get(field).map(str::to_string));
            dropdown.set_error(form.field_error(field).map(|e| e.to_string()));
        }

        self.availability.set_stations(form.stations());
        self.availability.set_selected(form.selected_slot().cloned());
        self.status = form.status();
        self.slot_error = form.slot_error().map(|e| e.to_string());

        match (form.is_confirmation_open(), form.confirmation()) {
            (true, Some(booked)) => {
                if self.confirmation.is_none() {
                    self.confirmation = Some(ConfirmationDialog::new(
                        booked.station.clone(),
                        booked.slot,
                        Arc::clone(&self.resolver),
                    ));
                }
            }
            _ => {
                if self.confirmation.take().is_some() {
                    self.focus = Focus::CarType;
                }
            }
        }

        if self.focus == Focus::Slots && self.availability.is_empty() {
            self.focus = Focus::Book;
        }
        self.apply_focus();
    }

    const fn dropdown_mut(&mut self, field: Field) -> &mut Dropdown {
        match field {
            Field::CarType => &mut self.car_type,
            Field::RepairService => &mut self.service,
        }
    }

    fn open_field(&self) -> Option<Field> {
        if self.car_type.is_open() {
            Some(Field::CarType)
        } else if self.service.is_open() {
            Some(Field::RepairService)
        } else {
            None
        }
    }

    fn apply_focus(&mut self) {
        self.car_type.set_focused(self.focus == Focus::CarType);
        self.service.set_focused(self.focus == Focus::RepairService);
        self.availability.set_focused(self.focus == Focus::Slots);
    }

    fn focus_ring(&self) -> Vec<Focus> {
        let mut ring = vec![Focus::CarType, Focus::RepairService];
        if !self.availability.is_empty() {
            ring.push(Focus::Slots);
        }
        ring.push(Focus::Book);
        ring
    }

    /// Move focus along the ring. Leaving a dropdown closes it and counts as
    /// a blur of that field.
    fn move_focus(&mut self, forward: bool) -> Vec<BookingMsg> {
        let mut msgs = Vec::new();
        if let Some(field) = self.focus.field() {
            self.dropdown_mut(field).close();
            msgs.push(BookingMsg::FieldTouched(field));
        }

        let ring = self.focus_ring();
        let current = ring.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (current + 1) % ring.len()
        } else {
            (current + ring.len() - 1) % ring.len()
        };
        self.focus = ring[next];
        self.apply_focus();
        msgs
    }

    fn dropdown_message(field: Field, event: DropdownEvent) -> BookingMsg {
        match event {
            DropdownEvent::Selected(value) => BookingMsg::SetField(field, value),
            DropdownEvent::Dismissed => BookingMsg::FieldTouched(field),
        }
    }

    fn slot_message(event: AvailabilityEvent) -> BookingMsg {
        match event {
            AvailabilityEvent::SlotChosen { station_id, slot } => {
                BookingMsg::SelectSlot { station_id, slot }
            }
        }
    }

    fn batch(msgs: Vec<BookingMsg>) -> EventResult<Vec<BookingMsg>> {
        if msgs.is_empty() {
            EventResult::Consumed
        } else {
            EventResult::Event(msgs)
        }
    }

    fn render_status(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        match self.status {
            Status::Loading => self.spinner.render(frame, area, theme),
            Status::LoadedEmpty | Status::Error => {
                let [line] = Layout::vertical([Constraint::Length(1)]).areas(area);
                frame.render_widget(
                    Paragraph::new("No stations available")
                        .alignment(Alignment::Center)
                        .style(Style::default().fg(theme.subtext0())),
                    line,
                );
            }
            Status::LoadedNonEmpty => self.availability.render(frame, area, theme),
            Status::Idle => {
                let [line] = Layout::vertical([Constraint::Length(1)]).areas(area);
                frame.render_widget(
                    Paragraph::new("Pick a car type and a repair service to see open slots.")
                        .alignment(Alignment::Center)
                        .style(Style::default().fg(theme.overlay0())),
                    line,
                );
            }
        }
    }

    fn render_book_button(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        self.book_area = area;
        let focused = self.focus == Focus::Book;
        let border = if focused {
            theme.border_focused()
        } else {
            theme.border()
        };
        let label_style = if focused {
            Style::default()
                .fg(theme.base())
                .bg(theme.lavender())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text()).add_modifier(Modifier::BOLD)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(border));
        frame.render_widget(
            Paragraph::new(Line::styled(" Book Now ", label_style))
                .alignment(Alignment::Center)
                .block(block),
            area,
        );
    }
}

impl Screen for BookingScreen {
    type Output = Vec<BookingMsg>;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if let Some(dialog) = &mut self.confirmation {
            return Ok(dialog
                .handle_key(key)?
                .map(|ConfirmationEvent::Closed| vec![BookingMsg::CloseConfirmation]));
        }

        if let Some(field) = self.open_field() {
            let result = self.dropdown_mut(field).handle_key(key)?;
            if result.is_consumed() {
                return Ok(result.map(|e| vec![Self::dropdown_message(field, e)]));
            }
            // An open list keeps every key except focus movement.
            if !self.resolver.matches_form(&key, FormAction::NextField)
                && !self.resolver.matches_form(&key, FormAction::PrevField)
            {
                return Ok(EventResult::Consumed);
            }
        }

        if self.resolver.matches_form(&key, FormAction::NextField) {
            return Ok(Self::batch(self.move_focus(true)));
        }
        if self.resolver.matches_form(&key, FormAction::PrevField) {
            return Ok(Self::batch(self.move_focus(false)));
        }

        let result = match self.focus {
            Focus::CarType | Focus::RepairService => {
                let field = self.focus.field().unwrap_or(Field::CarType);
                self.dropdown_mut(field)
                    .handle_key(key)?
                    .map(|e| vec![Self::dropdown_message(field, e)])
            }
            Focus::Slots => self
                .availability
                .handle_key(key)?
                .map(|e| vec![Self::slot_message(e)]),
            Focus::Book if self.resolver.matches_nav(&key, NavAction::Select) => {
                EventResult::Event(vec![BookingMsg::Submit])
            }
            Focus::Book => EventResult::Ignored,
        };
        if result.is_consumed() {
            return Ok(result);
        }

        if self.resolver.matches_form(&key, FormAction::Submit) {
            return Ok(EventResult::Event(vec![BookingMsg::Submit]));
        }
        Ok(EventResult::Ignored)
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Result<EventResult<Self::Output>> {
        if let Some(dialog) = &mut self.confirmation {
            return Ok(dialog
                .handle_mouse(mouse)?
                .map(|ConfirmationEvent::Closed| vec![BookingMsg::CloseConfirmation]));
        }

        let previous = self.focus;

        // Every dropdown sees every click and decides for itself whether it
        // was inside.
        let mut msgs = Vec::new();
        let mut claimed = false;
        for field in [Field::CarType, Field::RepairService] {
            match self.dropdown_mut(field).handle_mouse(mouse)? {
                EventResult::Ignored => {}
                EventResult::Consumed => {
                    claimed = true;
                    self.focus = if field == Field::CarType {
                        Focus::CarType
                    } else {
                        Focus::RepairService
                    };
                }
                EventResult::Event(DropdownEvent::Dismissed) => {
                    msgs.push(BookingMsg::FieldTouched(field));
                }
                EventResult::Event(event) => {
                    claimed = true;
                    msgs.push(Self::dropdown_message(field, event));
                }
            }
        }

        if !claimed {
            match self.availability.handle_mouse(mouse)? {
                EventResult::Event(event) => {
                    claimed = true;
                    self.focus = Focus::Slots;
                    msgs.push(Self::slot_message(event));
                }
                EventResult::Consumed => claimed = true,
                EventResult::Ignored => {}
            }
        }

        if !claimed
            && mouse.kind == MouseEventKind::Down(MouseButton::Left)
            && contains(self.book_area, mouse.column, mouse.row)
        {
            claimed = true;
            self.focus = Focus::Book;
            msgs.push(BookingMsg::Submit);
        }

        // A click that takes focus away from a dropdown blurs its field.
        if let Some(field) = previous.field()
            && self.focus != previous
            && !msgs.contains(&BookingMsg::FieldTouched(field))
        {
            msgs.insert(0, BookingMsg::FieldTouched(field));
        }

        self.apply_focus();
        if msgs.is_empty() && !claimed {
            return Ok(EventResult::Ignored);
        }
        Ok(Self::batch(msgs))
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let [_, column, _] = Layout::horizontal([
            Constraint::Fill(1),
            Constraint::Max(MAX_WIDTH),
            Constraint::Fill(1),
        ])
        .areas(area);

        let [header_area, fields_area, error_area, body_area, button_area] =
            Layout::vertical([
                Constraint::Length(3),
                Constraint::Length(Dropdown::HEIGHT),
                Constraint::Length(1),
                Constraint::Fill(1),
                Constraint::Length(3),
            ])
            .areas(column);

        let header = vec![
            Line::styled(
                "Book Repair Without Stress",
                Style::default().fg(theme.mauve()).add_modifier(Modifier::BOLD),
            ),
            Line::styled(
                "See stations and open times, then book in a few keystrokes.",
                Style::default().fg(theme.subtext0()),
            ),
        ];
        frame.render_widget(Paragraph::new(header).alignment(Alignment::Center), header_area);

        let [car_area, service_area] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)])
                .spacing(2)
                .areas(fields_area);
        self.car_type.render(frame, car_area, theme);
        self.service.render(frame, service_area, theme);

        if let Some(error) = &self.slot_error {
            frame.render_widget(
                Paragraph::new(error.clone()).style(Style::default().fg(theme.error())),
                error_area,
            );
        }

        self.render_status(frame, body_area, theme);
        self.render_book_button(frame, button_area, theme);

        // Overlays last so they sit on top.
        self.car_type.render_overlay(frame, theme);
        self.service.render_overlay(frame, theme);
        if let Some(dialog) = &mut self.confirmation {
            dialog.render(frame, area, theme);
        }
    }

    fn handle_tick(&mut self) {
        if self.status == Status::Loading {
            self.spinner.handle_tick();
        }
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        let r = &self.resolver;
        if self.confirmation.is_some() {
            return vec![Keybinding::new(r.display_dialog(DialogAction::Dismiss), "Close")];
        }
        if self.open_field().is_some() {
            return vec![
                Keybinding::new(r.display_nav(NavAction::Select), "Choose"),
                Keybinding::new(r.display_search(SearchAction::Toggle), "Filter"),
                Keybinding::new(r.display_form(FormAction::Close), "Cancel"),
            ];
        }

        let select = match self.focus {
            Focus::CarType | Focus::RepairService => "Open",
            Focus::Slots => "Pick slot",
            Focus::Book => "Book",
        };
        let mut bindings = vec![
            Keybinding::new(r.display_nav(NavAction::Select), select),
            Keybinding::new(r.display_form(FormAction::NextField), "Next field"),
        ];
        if self.focus == Focus::Slots {
            bindings.push(Keybinding::new("←↑↓→", "Move"));
        }
        bindings.push(Keybinding::new(r.display_form(FormAction::Submit), "Book"));
        bindings
    }
}
