//! Messages for the booking service.
//!
//! User actions and lookup results both flow through this one type.

use crate::booking::model::{FetchTicket, Field, Slot, StationsResponse};

#[derive(Debug, Clone, PartialEq)]
pub enum BookingMsg {
    // === Form ===
    /// A dropdown value was chosen
    SetField(Field, String),
    /// A dropdown closed or lost focus
    FieldTouched(Field),
    /// A slot chip was chosen
    SelectSlot { station_id: String, slot: Slot },
    /// Book button pressed
    Submit,
    /// Confirmation dismissed
    CloseConfirmation,

    // === Async Results ===
    /// Station lookup answered
    StationsLoaded {
        ticket: FetchTicket,
        response: StationsResponse,
    },
    /// Station lookup failed
    FetchFailed { ticket: FetchTicket, error: String },
}
