mod availability;
mod confirmation;
mod form;

pub use availability::{AvailabilityEvent, AvailabilityList};
pub use confirmation::{ConfirmationDialog, ConfirmationEvent};
pub use form::BookingScreen;
