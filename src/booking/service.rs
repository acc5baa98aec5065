//! Booking service.
//!
//! Follows a single-funnel update pattern: input handlers and commands only
//! queue [`BookingMsg`]s, and `update()` is the one place that changes the
//! form and returns commands to spawn.

use std::sync::Arc;

use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

use crate::Theme;
use crate::booking::command::FetchStationsCmd;
use crate::booking::form::{BookingForm, FetchRequest};
use crate::booking::message::BookingMsg;
use crate::booking::model::Field;
use crate::booking::source::StationSource;
use crate::booking::view::BookingScreen;
use crate::commands::Command;
use crate::config::KeyResolver;
use crate::ui::{EventResult, Keybinding, Result, Screen};

/// Result from `update()`
pub enum UpdateResult {
    /// No action needed
    Idle,
    /// Spawn these commands
    Commands(Vec<Box<dyn Command>>),
}

pub struct BookingService {
    form: BookingForm,
    screen: BookingScreen,
    source: Arc<dyn StationSource>,
    msg_tx: UnboundedSender<BookingMsg>,
    msg_rx: UnboundedReceiver<BookingMsg>,
}

impl BookingService {
    pub fn new(source: Arc<dyn StationSource>, resolver: Arc<KeyResolver>) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        Self {
            form: BookingForm::new(),
            screen: BookingScreen::new(resolver),
            source,
            msg_tx,
            msg_rx,
        }
    }

    /// Queue a message to be processed by update().
    fn queue(&self, msg: BookingMsg) {
        let _ = self.msg_tx.send(msg);
    }

    /// Fill in a field before the first frame, as if the user had picked it.
    pub fn preselect(&self, field: Field, value: String) {
        self.queue(BookingMsg::SetField(field, value));
    }

    pub const fn form(&self) -> &BookingForm {
        &self.form
    }

    fn enqueue(&self, result: EventResult<Vec<BookingMsg>>) -> bool {
        match result {
            EventResult::Ignored => false,
            EventResult::Consumed => true,
            EventResult::Event(msgs) => {
                for msg in msgs {
                    self.queue(msg);
                }
                true
            }
        }
    }

    /// Returns `true` if the key was consumed; the App then calls `update()`.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        let result = self.screen.handle_key(key)?;
        Ok(self.enqueue(result))
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> Result<bool> {
        let result = self.screen.handle_mouse(mouse)?;
        Ok(self.enqueue(result))
    }

    pub fn handle_tick(&mut self) {
        self.screen.handle_tick();
    }

    fn fetch(&self, request: FetchRequest) -> UpdateResult {
        debug!(
            ticket = %request.ticket,
            car_type = %request.car_type,
            service = %request.service,
            "Starting station lookup"
        );
        UpdateResult::Commands(vec![Box::new(FetchStationsCmd::new(
            Arc::clone(&self.source),
            request,
            self.msg_tx.clone(),
        ))])
    }

    /// Process a single message and return the result.
    fn process_message(&mut self, msg: BookingMsg) -> UpdateResult {
        match msg {
            BookingMsg::SetField(field, value) => {
                debug!(?field, %value, "Field changed");
                if let Some(request) = self.form.set_field(field, value) {
                    return self.fetch(request);
                }
            }

            BookingMsg::FieldTouched(field) => self.form.touch(field),

            BookingMsg::SelectSlot { station_id, slot } => {
                if !self.form.select_slot(&station_id, slot) {
                    debug!(%station_id, %slot, "Ignoring slot outside the current results");
                }
            }

            BookingMsg::Submit => match self.form.submit() {
                Ok(()) => {
                    if let Some(booked) = self.form.confirmation() {
                        info!(
                            station = %booked.station.id,
                            slot = %booked.slot,
                            "Booking confirmed"
                        );
                    }
                }
                Err(e) => debug!(error = %e, "Booking not submitted"),
            },

            BookingMsg::CloseConfirmation => self.form.close_confirmation(),

            BookingMsg::StationsLoaded { ticket, response } => {
                let count = response.stations.len();
                if self.form.apply_stations(ticket, response.stations) {
                    info!(%ticket, count, "Stations loaded");
                } else {
                    debug!(%ticket, "Dropping stale station response");
                }
            }

            BookingMsg::FetchFailed { ticket, error } => {
                if !self.form.apply_failure(ticket) {
                    debug!(%ticket, %error, "Dropping stale lookup failure");
                }
            }
        }
        UpdateResult::Idle
    }

    /// Process all queued messages.
    ///
    /// Called by the App after consumed input and on every loop turn so
    /// command results get picked up.
    pub fn update(&mut self) -> UpdateResult {
        let mut commands: Vec<Box<dyn Command>> = Vec::new();

        while let Ok(msg) = self.msg_rx.try_recv() {
            if let UpdateResult::Commands(cmds) = self.process_message(msg) {
                commands.extend(cmds);
            }
        }
        self.screen.sync(&self.form);

        if commands.is_empty() {
            UpdateResult::Idle
        } else {
            UpdateResult::Commands(commands)
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        self.screen.render(frame, area, theme);
    }

    pub fn keybindings(&self) -> Vec<Keybinding> {
        self.screen.keybindings()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;
    use crate::booking::catalog;
    use crate::booking::model::{FetchTicket, Slot, StationsResponse, Status};
    use crate::booking::source::{MockStationSource, filter_stations};

    fn service() -> BookingService {
        let source = Arc::new(MockStationSource::new(Duration::ZERO).unwrap());
        BookingService::new(source, Arc::new(KeyResolver::default()))
    }

    fn response(service: &str) -> StationsResponse {
        StationsResponse {
            car_type: Some("Kia Rio".into()),
            service_type: Some(service.into()),
            stations: filter_stations(&catalog::stations().unwrap(), service),
        }
    }

    async fn run(result: UpdateResult) -> usize {
        let UpdateResult::Commands(cmds) = result else {
            return 0;
        };
        let count = cmds.len();
        for cmd in cmds {
            cmd.execute().await.unwrap();
        }
        count
    }

    #[tokio::test]
    async fn test_preselect_both_fetches() {
        let mut service = service();
        service.preselect(Field::CarType, "Toyota Sienna".into());
        service.preselect(Field::RepairService, "Engine Work".into());

        assert_eq!(run(service.update()).await, 1);
        assert_eq!(service.form().status(), Status::Loading);

        assert_eq!(run(service.update()).await, 0);
        assert_eq!(service.form().status(), Status::LoadedNonEmpty);
        assert_eq!(service.form().stations()[0].id, "station-002");
    }

    #[tokio::test]
    async fn test_single_field_does_not_fetch() {
        let mut service = service();
        service.preselect(Field::RepairService, "Engine Work".into());

        assert_eq!(run(service.update()).await, 0);
        assert_eq!(service.form().status(), Status::Idle);
    }

    #[test]
    fn test_out_of_order_responses() {
        let mut service = service();
        service.queue(BookingMsg::SetField(Field::CarType, "Kia Rio".into()));
        service.queue(BookingMsg::SetField(Field::RepairService, "Oil Change".into()));
        service.queue(BookingMsg::SetField(Field::RepairService, "AC Repair".into()));
        let UpdateResult::Commands(cmds) = service.update() else {
            panic!("expected lookups");
        };
        assert_eq!(cmds.len(), 2);

        let latest = service.form().pending_ticket().unwrap();
        let stale = FetchTicket(latest.0 - 1);
        service.queue(BookingMsg::StationsLoaded {
            ticket: latest,
            response: response("AC Repair"),
        });
        service.queue(BookingMsg::StationsLoaded {
            ticket: stale,
            response: response("Oil Change"),
        });
        service.update();

        let ids: Vec<_> = service.form().stations().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["station-003", "station-004"]);
    }

    #[test]
    fn test_failed_lookup_shows_empty() {
        let mut service = service();
        service.queue(BookingMsg::SetField(Field::CarType, "Kia Rio".into()));
        service.queue(BookingMsg::SetField(Field::RepairService, "Oil Change".into()));
        service.update();

        let ticket = service.form().pending_ticket().unwrap();
        service.queue(BookingMsg::FetchFailed {
            ticket,
            error: "connection refused".into(),
        });
        service.update();

        assert_eq!(service.form().status(), Status::Error);
        assert!(service.form().stations().is_empty());
    }

    #[test]
    fn test_book_and_close_flow() {
        let mut service = service();
        service.queue(BookingMsg::SetField(Field::CarType, "Kia Rio".into()));
        service.queue(BookingMsg::SetField(Field::RepairService, "Oil Change".into()));
        service.update();
        let ticket = service.form().pending_ticket().unwrap();
        service.queue(BookingMsg::StationsLoaded {
            ticket,
            response: response("Oil Change"),
        });

        // Submit key before a slot is chosen
        let b = KeyEvent::new(KeyCode::Char('b'), KeyModifiers::NONE);
        assert!(service.handle_key(b).unwrap());
        service.update();
        assert!(service.form().slot_error().is_some());

        service.queue(BookingMsg::SelectSlot {
            station_id: "station-003".into(),
            slot: Slot::parse("2025-05-17T12:00:00").unwrap(),
        });
        service.queue(BookingMsg::Submit);
        service.update();
        assert!(service.form().is_confirmation_open());

        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        assert!(service.handle_key(esc).unwrap());
        service.update();

        assert!(!service.form().is_confirmation_open());
        assert_eq!(service.form().status(), Status::Idle);
        assert!(service.form().selection().car_type.is_none());
    }
}
