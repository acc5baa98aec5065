//! Car repair booking: pick a car and a service, see which stations have
//! open slots, book one.

pub mod catalog;
pub mod command;
pub mod form;
pub mod message;
pub mod model;
pub mod service;
pub mod source;
pub mod view;

pub use service::{BookingService, UpdateResult};
pub use source::StationSource;
