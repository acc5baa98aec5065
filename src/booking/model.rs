use std::fmt;

use chrono::{DateTime, Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const SLOT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A bookable timestamp offered by a station, in local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot(NaiveDateTime);

impl Slot {
    /// Parse an ISO-8601 timestamp.
    ///
    /// Timestamps without an offset are taken as local time. Timestamps with
    /// an offset are converted to local wall-clock time.
    pub fn parse(s: &str) -> Result<Self, chrono::ParseError> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| {
                DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Local).naive_local())
            })
            .map(Self)
    }

    /// Compact label for slot chips: `9 AM`, or `2:30 PM` off the full hour.
    pub fn short_label(&self) -> String {
        if self.0.minute() == 0 {
            self.0.format("%-I %p").to_string()
        } else {
            self.time_label()
        }
    }

    /// Time with minutes, as shown on the confirmation: `9:00 AM`.
    pub fn time_label(&self) -> String {
        self.0.format("%-I:%M %p").to_string()
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(SLOT_FORMAT))
    }
}

impl Serialize for Slot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Slot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A service location with the repair services it offers and its open slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub id: String,
    pub name: String,
    pub address: String,
    pub services: Vec<String>,
    pub available_slots: Vec<Slot>,
}

impl Station {
    /// Exact, case-sensitive service match.
    pub fn offers(&self, service: &str) -> bool {
        self.services.iter().any(|s| s == service)
    }

    pub fn has_slot(&self, slot: Slot) -> bool {
        self.available_slots.contains(&slot)
    }
}

/// Payload of a station lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationsResponse {
    pub car_type: Option<String>,
    pub service_type: Option<String>,
    pub stations: Vec<Station>,
}

/// The two required form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    CarType,
    RepairService,
}

impl Field {
    pub const fn label(self) -> &'static str {
        match self {
            Self::CarType => "Car Type",
            Self::RepairService => "Repair Service",
        }
    }

    pub const fn placeholder(self) -> &'static str {
        match self {
            Self::CarType => "Select your car type",
            Self::RepairService => "Select a repair service",
        }
    }

    pub const fn required_error(self) -> ValidationError {
        match self {
            Self::CarType => ValidationError::MissingCarType,
            Self::RepairService => ValidationError::MissingRepairService,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub car_type: Option<String>,
    pub repair_service: Option<String>,
}

impl SelectionState {
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::CarType => self.car_type.as_deref(),
            Field::RepairService => self.repair_service.as_deref(),
        }
    }

    pub(crate) const fn slot_mut(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::CarType => &mut self.car_type,
            Field::RepairService => &mut self.repair_service,
        }
    }

    /// Both fields, when both are set.
    pub fn pair(&self) -> Option<(&str, &str)> {
        Some((self.car_type.as_deref()?, self.repair_service.as_deref()?))
    }

    pub fn is_complete(&self) -> bool {
        self.pair().is_some()
    }
}

/// The one slot the user picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSelection {
    pub station_id: String,
    pub slot: Slot,
}

/// Availability status, derived from the form state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Idle,
    Loading,
    LoadedEmpty,
    LoadedNonEmpty,
    Error,
}

/// Inline validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please select your car type")]
    MissingCarType,
    #[error("Please select a repair service")]
    MissingRepairService,
    #[error("Please select a time slot.")]
    MissingSlot,
}

/// Sequence number of a station lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(pub u64);

impl fmt::Display for FetchTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_labels() {
        let nine = Slot::parse("2025-05-17T09:00:00").unwrap();
        let half_past_two = Slot::parse("2025-05-17T14:30:00").unwrap();

        assert_eq!(nine.short_label(), "9 AM");
        assert_eq!(nine.time_label(), "9:00 AM");
        assert_eq!(half_past_two.short_label(), "2:30 PM");
        assert_eq!(half_past_two.time_label(), "2:30 PM");
    }

    #[test]
    fn test_slot_parse_rejects_garbage() {
        assert!(Slot::parse("tomorrow morning").is_err());
    }

    #[test]
    fn test_station_deserializes_camel_case() {
        let json = r#"{
            "id": "station-x",
            "name": "Test Station",
            "address": "1 Test Road",
            "services": ["Oil Change"],
            "availableSlots": ["2025-05-17T08:30:00"]
        }"#;

        let station: Station = serde_json::from_str(json).unwrap();

        assert!(station.offers("Oil Change"));
        assert!(!station.offers("oil change"));
        assert_eq!(station.available_slots[0].to_string(), "2025-05-17T08:30:00");
    }

    #[test]
    fn test_response_allows_null_echo_fields() {
        let json = r#"{ "carType": null, "serviceType": null, "stations": [] }"#;
        let response: StationsResponse = serde_json::from_str(json).unwrap();
        assert!(response.car_type.is_none());
        assert!(response.stations.is_empty());
    }

    #[test]
    fn test_selection_pair() {
        let mut selection = SelectionState::default();
        *selection.slot_mut(Field::CarType) = Some("Kia Rio".to_string());
        assert!(!selection.is_complete());

        *selection.slot_mut(Field::RepairService) = Some("AC Repair".to_string());
        assert_eq!(selection.pair(), Some(("Kia Rio", "AC Repair")));
    }

    #[test]
    fn test_validation_messages() {
        assert_eq!(
            Field::CarType.required_error().to_string(),
            "Please select your car type"
        );
        assert_eq!(ValidationError::MissingSlot.to_string(), "Please select a time slot.");
    }
}
