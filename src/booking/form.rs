//! Booking form state.
//!
//! Pure state: no I/O, no rendering. The service feeds it user actions and
//! lookup results; it tells the service when a lookup must start.

use crate::booking::model::{
    FetchTicket, Field, SelectionState, Slot, SlotSelection, Station, Status, ValidationError,
};

/// A station lookup the caller must run and report back with its ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticket: FetchTicket,
    pub car_type: String,
    pub service: String,
}

/// What the confirmation shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation<'a> {
    pub station: &'a Station,
    pub slot: Slot,
}

#[derive(Debug, Default)]
pub struct BookingForm {
    selection: SelectionState,
    car_type_error: Option<ValidationError>,
    service_error: Option<ValidationError>,
    stations: Vec<Station>,
    /// Ticket of the only lookup whose answer is still wanted.
    pending: Option<FetchTicket>,
    next_ticket: u64,
    fetch_failed: bool,
    slot: Option<SlotSelection>,
    slot_error: Option<ValidationError>,
    confirmation_open: bool,
}

impl BookingForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub const fn selected_slot(&self) -> Option<&SlotSelection> {
        self.slot.as_ref()
    }

    pub const fn field_error(&self, field: Field) -> Option<ValidationError> {
        match field {
            Field::CarType => self.car_type_error,
            Field::RepairService => self.service_error,
        }
    }

    pub const fn slot_error(&self) -> Option<ValidationError> {
        self.slot_error
    }

    pub const fn pending_ticket(&self) -> Option<FetchTicket> {
        self.pending
    }

    pub const fn is_confirmation_open(&self) -> bool {
        self.confirmation_open
    }

    pub fn status(&self) -> Status {
        if self.pending.is_some() {
            Status::Loading
        } else if !self.selection.is_complete() {
            Status::Idle
        } else if self.fetch_failed {
            Status::Error
        } else if self.stations.is_empty() {
            Status::LoadedEmpty
        } else {
            Status::LoadedNonEmpty
        }
    }

    const fn error_mut(&mut self, field: Field) -> &mut Option<ValidationError> {
        match field {
            Field::CarType => &mut self.car_type_error,
            Field::RepairService => &mut self.service_error,
        }
    }

    /// Record a field choice.
    ///
    /// Choosing the current value again changes nothing. Any other change
    /// drops the slot choice and, once both fields are set, starts a lookup.
    pub fn set_field(&mut self, field: Field, value: String) -> Option<FetchRequest> {
        let value = (!value.is_empty()).then_some(value);
        let current = self.selection.slot_mut(field);
        if *current == value {
            return None;
        }

        *current = value;
        let cleared = current.is_none();
        *self.error_mut(field) = cleared.then(|| field.required_error());
        self.slot = None;
        self.start_fetch()
    }

    /// A field lost focus: flag it when still empty.
    pub fn touch(&mut self, field: Field) {
        if self.selection.get(field).is_none() {
            *self.error_mut(field) = Some(field.required_error());
        }
    }

    fn start_fetch(&mut self) -> Option<FetchRequest> {
        let Some((car_type, service)) = self.selection.pair() else {
            self.pending = None;
            return None;
        };
        let request = FetchRequest {
            ticket: FetchTicket(self.next_ticket),
            car_type: car_type.to_string(),
            service: service.to_string(),
        };
        self.next_ticket += 1;
        self.pending = Some(request.ticket);
        self.stations.clear();
        self.fetch_failed = false;
        Some(request)
    }

    /// Apply a lookup answer. Answers for anything but the latest lookup are
    /// dropped and `false` is returned.
    pub fn apply_stations(&mut self, ticket: FetchTicket, stations: Vec<Station>) -> bool {
        if self.pending != Some(ticket) {
            return false;
        }
        self.pending = None;
        self.stations = stations;
        self.fetch_failed = false;
        self.slot = None;
        true
    }

    /// Record a failed lookup. Same staleness rule as [`Self::apply_stations`].
    pub fn apply_failure(&mut self, ticket: FetchTicket) -> bool {
        if self.pending != Some(ticket) {
            return false;
        }
        self.pending = None;
        self.stations.clear();
        self.fetch_failed = true;
        self.slot = None;
        true
    }

    /// Choose a slot; it replaces any earlier choice. Returns `false` when the
    /// station or slot is not in the current list.
    pub fn select_slot(&mut self, station_id: &str, slot: Slot) -> bool {
        let known = self
            .stations
            .iter()
            .any(|s| s.id == station_id && s.has_slot(slot));
        if !known {
            return false;
        }
        self.slot = Some(SlotSelection {
            station_id: station_id.to_string(),
            slot,
        });
        self.slot_error = None;
        true
    }

    /// Validate and open the confirmation.
    ///
    /// Field errors are set for every empty field and win over the slot check.
    /// On failure the first error is returned.
    pub fn submit(&mut self) -> Result<(), ValidationError> {
        let mut first = None;
        for field in [Field::CarType, Field::RepairService] {
            if self.selection.get(field).is_none() {
                let err = field.required_error();
                *self.error_mut(field) = Some(err);
                first.get_or_insert(err);
            }
        }
        if let Some(err) = first {
            return Err(err);
        }

        if self.confirmation().is_none() {
            self.slot_error = Some(ValidationError::MissingSlot);
            return Err(ValidationError::MissingSlot);
        }

        self.slot_error = None;
        self.confirmation_open = true;
        Ok(())
    }

    /// The booked station and time, once a slot is chosen.
    pub fn confirmation(&self) -> Option<Confirmation<'_>> {
        let choice = self.slot.as_ref()?;
        let station = self.stations.iter().find(|s| s.id == choice.station_id)?;
        Some(Confirmation {
            station,
            slot: choice.slot,
        })
    }

    /// Close the confirmation and start over with an empty form.
    pub fn close_confirmation(&mut self) {
        self.reset();
    }

    /// Clear every field, error, result and choice. Any lookup still in
    /// flight is forgotten.
    pub fn reset(&mut self) {
        let next_ticket = self.next_ticket;
        *self = Self {
            next_ticket,
            ..Self::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::catalog;
    use crate::booking::source::filter_stations;

    fn lookup(service: &str) -> Vec<Station> {
        filter_stations(&catalog::stations().unwrap(), service)
    }

    fn slot(s: &str) -> Slot {
        Slot::parse(s).unwrap()
    }

    /// Form with both fields set and the Oil Change stations loaded.
    fn loaded_form() -> BookingForm {
        let mut form = BookingForm::new();
        assert!(form.set_field(Field::CarType, "Toyota Camry".into()).is_none());
        let req = form
            .set_field(Field::RepairService, "Oil Change".into())
            .unwrap();
        assert!(form.apply_stations(req.ticket, lookup(&req.service)));
        form
    }

    #[test]
    fn test_fetch_starts_only_when_both_set() {
        let mut form = BookingForm::new();
        assert_eq!(form.status(), Status::Idle);

        assert!(form.set_field(Field::RepairService, "AC Repair".into()).is_none());
        assert_eq!(form.status(), Status::Idle);

        let req = form.set_field(Field::CarType, "Kia Rio".into()).unwrap();
        assert_eq!(req.car_type, "Kia Rio");
        assert_eq!(req.service, "AC Repair");
        assert_eq!(form.status(), Status::Loading);
    }

    #[test]
    fn test_loaded_statuses() {
        let form = loaded_form();
        assert_eq!(form.status(), Status::LoadedNonEmpty);
        assert_eq!(form.stations().len(), 2);

        let mut form = BookingForm::new();
        form.set_field(Field::CarType, "Kia Rio".into());
        let req = form
            .set_field(Field::RepairService, "Rocket Booster Installation".into())
            .unwrap();
        form.apply_stations(req.ticket, lookup(&req.service));
        assert_eq!(form.status(), Status::LoadedEmpty);
    }

    #[test]
    fn test_failure_status() {
        let mut form = BookingForm::new();
        form.set_field(Field::CarType, "Kia Rio".into());
        let req = form.set_field(Field::RepairService, "Oil Change".into()).unwrap();

        assert!(form.apply_failure(req.ticket));
        assert_eq!(form.status(), Status::Error);
        assert!(form.stations().is_empty());
    }

    #[test]
    fn test_same_value_is_noop() {
        let mut form = loaded_form();
        assert!(form.select_slot("station-001", slot("2025-05-17T09:00:00")));

        assert!(form.set_field(Field::RepairService, "Oil Change".into()).is_none());
        assert!(form.selected_slot().is_some());
        assert_eq!(form.status(), Status::LoadedNonEmpty);
    }

    #[test]
    fn test_field_change_clears_slot_and_refetches() {
        let mut form = loaded_form();
        form.select_slot("station-001", slot("2025-05-17T09:00:00"));

        let req = form.set_field(Field::CarType, "Honda Civic".into()).unwrap();
        assert!(form.selected_slot().is_none());
        assert!(form.stations().is_empty());
        assert_eq!(req.car_type, "Honda Civic");
        assert_eq!(req.service, "Oil Change");
    }

    #[test]
    fn test_stale_response_is_dropped() {
        let mut form = BookingForm::new();
        form.set_field(Field::CarType, "Kia Rio".into());
        let first = form.set_field(Field::RepairService, "Oil Change".into()).unwrap();
        let second = form
            .set_field(Field::RepairService, "Engine Work".into())
            .unwrap();
        assert_ne!(first.ticket, second.ticket);

        // Latest answer arrives first, the older one after it.
        assert!(form.apply_stations(second.ticket, lookup("Engine Work")));
        assert!(!form.apply_stations(first.ticket, lookup("Oil Change")));

        let ids: Vec<_> = form.stations().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["station-002"]);
        assert_eq!(form.status(), Status::LoadedNonEmpty);
    }

    #[test]
    fn test_stale_failure_is_dropped() {
        let mut form = BookingForm::new();
        form.set_field(Field::CarType, "Kia Rio".into());
        let first = form.set_field(Field::RepairService, "Oil Change".into()).unwrap();
        let second = form.set_field(Field::RepairService, "AC Repair".into()).unwrap();

        assert!(!form.apply_failure(first.ticket));
        assert_eq!(form.status(), Status::Loading);
        assert!(form.apply_stations(second.ticket, lookup("AC Repair")));
        assert_eq!(form.stations().len(), 2);
    }

    #[test]
    fn test_select_slot_replaces_previous() {
        let mut form = loaded_form();

        assert!(form.select_slot("station-001", slot("2025-05-17T09:00:00")));
        assert!(form.select_slot("station-003", slot("2025-05-17T16:00:00")));

        let chosen = form.selected_slot().unwrap();
        assert_eq!(chosen.station_id, "station-003");
        assert_eq!(chosen.slot, slot("2025-05-17T16:00:00"));
    }

    #[test]
    fn test_select_unknown_slot_is_rejected() {
        let mut form = loaded_form();

        assert!(!form.select_slot("station-002", slot("2025-05-17T10:00:00")));
        assert!(!form.select_slot("station-001", slot("2025-05-17T10:00:00")));
        assert!(form.selected_slot().is_none());
    }

    #[test]
    fn test_submit_empty_form_flags_both_fields() {
        let mut form = BookingForm::new();

        assert_eq!(form.submit(), Err(ValidationError::MissingCarType));
        assert_eq!(
            form.field_error(Field::CarType),
            Some(ValidationError::MissingCarType)
        );
        assert_eq!(
            form.field_error(Field::RepairService),
            Some(ValidationError::MissingRepairService)
        );
        assert!(form.slot_error().is_none());
        assert!(!form.is_confirmation_open());
    }

    #[test]
    fn test_submit_without_slot() {
        let mut form = loaded_form();

        assert_eq!(form.submit(), Err(ValidationError::MissingSlot));
        assert_eq!(form.slot_error(), Some(ValidationError::MissingSlot));
        assert!(!form.is_confirmation_open());

        form.select_slot("station-003", slot("2025-05-17T08:00:00"));
        assert!(form.slot_error().is_none());
    }

    #[test]
    fn test_submit_opens_confirmation() {
        let mut form = loaded_form();
        form.select_slot("station-001", slot("2025-05-17T14:30:00"));

        assert_eq!(form.submit(), Ok(()));
        assert!(form.is_confirmation_open());

        let confirmation = form.confirmation().unwrap();
        assert_eq!(confirmation.station.name, "Total Filling Station - Lekki");
        assert_eq!(confirmation.station.address, "KM 14 Lekki-Epe Expressway, Lagos");
        assert_eq!(confirmation.slot.time_label(), "2:30 PM");
    }

    /// Form with `car_type` and `service` set and that lookup applied.
    fn form_for(car_type: &str, service: &str) -> BookingForm {
        let mut form = BookingForm::new();
        form.set_field(Field::CarType, car_type.into());
        let req = form.set_field(Field::RepairService, service.into()).unwrap();
        form.apply_stations(req.ticket, lookup(&req.service));
        form
    }

    #[test]
    fn test_every_pair_blocks_without_slot_and_confirms_any_slot() {
        for car_type in catalog::CAR_TYPES {
            for service in catalog::REPAIR_SERVICES {
                let mut form = form_for(car_type, service);
                assert_eq!(form.submit(), Err(ValidationError::MissingSlot));
                assert!(!form.is_confirmation_open());

                for station in lookup(service) {
                    for slot in &station.available_slots {
                        let mut form = form_for(car_type, service);
                        assert!(form.select_slot(&station.id, *slot));
                        assert_eq!(form.submit(), Ok(()));

                        let confirmation = form.confirmation().unwrap();
                        assert_eq!(confirmation.station.name, station.name);
                        assert_eq!(confirmation.station.address, station.address);
                        assert_eq!(confirmation.slot, *slot);
                        assert_eq!(confirmation.slot.time_label(), slot.time_label());
                    }
                }
            }
        }
    }

    #[test]
    fn test_close_confirmation_resets() {
        let mut form = loaded_form();
        form.select_slot("station-001", slot("2025-05-17T09:00:00"));
        form.submit().unwrap();

        form.close_confirmation();

        assert!(!form.is_confirmation_open());
        assert_eq!(form.selection(), &SelectionState::default());
        assert!(form.stations().is_empty());
        assert!(form.selected_slot().is_none());
        assert!(form.field_error(Field::CarType).is_none());
        assert_eq!(form.status(), Status::Idle);
    }

    #[test]
    fn test_reset_forgets_in_flight_lookup() {
        let mut form = BookingForm::new();
        form.set_field(Field::CarType, "Kia Rio".into());
        let req = form.set_field(Field::RepairService, "Oil Change".into()).unwrap();

        form.reset();

        assert!(!form.apply_stations(req.ticket, lookup("Oil Change")));
        assert!(form.stations().is_empty());

        form.set_field(Field::CarType, "Kia Rio".into());
        let next = form.set_field(Field::RepairService, "Oil Change".into()).unwrap();
        assert_ne!(next.ticket, req.ticket);
    }

    #[test]
    fn test_touch_flags_empty_field() {
        let mut form = BookingForm::new();
        form.touch(Field::RepairService);
        assert_eq!(
            form.field_error(Field::RepairService),
            Some(ValidationError::MissingRepairService)
        );
        assert!(form.field_error(Field::CarType).is_none());

        form.set_field(Field::RepairService, "Engine Work".into());
        assert!(form.field_error(Field::RepairService).is_none());

        form.touch(Field::RepairService);
        assert!(form.field_error(Field::RepairService).is_none());
    }
}
