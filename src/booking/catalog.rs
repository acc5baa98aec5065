//! Fixed option lists and the built-in station fixture.

use color_eyre::eyre::{Result, eyre};

use crate::booking::model::{Slot, Station};

pub const CAR_TYPES: &[&str] = &[
    "Toyota Corolla",
    "Toyota Camry",
    "Honda Accord",
    "Honda Civic",
    "Lexus RX 350",
    "Kia Rio",
    "Hyundai Elantra",
    "Nissan Altima",
    "Toyota Hiace Bus",
    "Toyota Sienna",
];

pub const REPAIR_SERVICES: &[&str] = &[
    "Oil Change",
    "Brake Pad Replacement",
    "Rocket Booster Installation",
    "Engine Work",
    "AC Repair",
    "Tire Patching & Replacement",
    "Wheel Balancing & Alignment",
    "Battery Service",
    "Suspension Fix",
    "Bodywork & Painting",
    "Transmission Repair",
];

pub fn options(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

/// Find a catalogue entry by case-insensitive name.
pub fn resolve(list: &[&str], name: &str) -> Result<String> {
    list.iter()
        .find(|entry| entry.eq_ignore_ascii_case(name.trim()))
        .map(|entry| (*entry).to_string())
        .ok_or_else(|| eyre!("'{}' not found. Available: {}", name, list.join(", ")))
}

struct Fixture {
    id: &'static str,
    name: &'static str,
    address: &'static str,
    services: &'static [&'static str],
    slots: &'static [&'static str],
}

const FIXTURE: &[Fixture] = &[
    Fixture {
        id: "station-001",
        name: "Total Filling Station - Lekki",
        address: "KM 14 Lekki-Epe Expressway, Lagos",
        services: &[
            "Oil Change",
            "Tire Patching & Replacement",
            "Wheel Balancing & Alignment",
            "Battery Service",
        ],
        slots: &["2025-05-17T09:00:00", "2025-05-17T11:00:00", "2025-05-17T14:30:00"],
    },
    Fixture {
        id: "station-002",
        name: "Oando Service Hub - Ikeja",
        address: "13 Obafemi Awolowo Way, Ikeja, Lagos",
        services: &["Brake Pad Replacement", "Engine Work", "Transmission Repair"],
        slots: &["2025-05-17T10:00:00", "2025-05-17T13:00:00", "2025-05-17T15:00:00"],
    },
    Fixture {
        id: "station-003",
        name: "Mobil Service Center - Surulere",
        address: "21 Bode Thomas Street, Surulere, Lagos",
        services: &["AC Repair", "Suspension Fix", "Bodywork & Painting", "Oil Change"],
        slots: &["2025-05-17T08:00:00", "2025-05-17T12:00:00", "2025-05-17T16:00:00"],
    },
    Fixture {
        id: "station-004",
        name: "NIPCO AutoCare - Yaba",
        address: "10 Herbert Macaulay Way, Yaba, Lagos",
        services: &["Brake Pad Replacement", "Suspension Fix", "Battery Service", "AC Repair"],
        slots: &["2025-05-17T09:30:00", "2025-05-17T11:30:00", "2025-05-17T14:00:00"],
    },
    Fixture {
        id: "station-005",
        name: "Enyo Service Point - Ajah",
        address: "56 Admiralty Way, Ajah, Lagos",
        services: &[
            "Tire Patching & Replacement",
            "Wheel Balancing & Alignment",
            "Bodywork & Painting",
            "Transmission Repair",
        ],
        slots: &["2025-05-17T08:30:00", "2025-05-17T12:30:00", "2025-05-17T15:30:00"],
    },
];

/// The built-in stations served by the in-process source.
pub fn stations() -> Result<Vec<Station>> {
    FIXTURE
        .iter()
        .map(|f| {
            let available_slots = f
                .slots
                .iter()
                .map(|s| Slot::parse(s))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Station {
                id: f.id.to_string(),
                name: f.name.to_string(),
                address: f.address.to_string(),
                services: options(f.services),
                available_slots,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_fixture_loads() {
        let stations = stations().unwrap();
        assert_eq!(stations.len(), 5);
        assert!(stations.iter().all(|s| s.available_slots.len() == 3));

        let ids: HashSet<_> = stations.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids.len(), stations.len());
    }

    #[test]
    fn test_options_are_unique() {
        for list in [CAR_TYPES, REPAIR_SERVICES] {
            let unique: HashSet<_> = list.iter().collect();
            assert_eq!(unique.len(), list.len());
        }
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        assert_eq!(resolve(CAR_TYPES, "kia rio").unwrap(), "Kia Rio");
        assert_eq!(resolve(REPAIR_SERVICES, " OIL CHANGE ").unwrap(), "Oil Change");
    }

    #[test]
    fn test_resolve_lists_available_values() {
        let err = resolve(CAR_TYPES, "DeLorean").unwrap_err().to_string();
        assert!(err.contains("DeLorean"));
        assert!(err.contains("Toyota Corolla"));
    }
}
