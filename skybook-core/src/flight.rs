use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Airport {
    pub code: String,
    pub name: String,
    pub city: String,
}

/// One end of a flight (departure or arrival).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlightEndpoint {
    pub airport: String,
    pub city: String,
    pub code: String,
    pub time: NaiveTime,
    pub date: NaiveDate,
}

/// Immutable catalog record. Prices are whole currency units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Flight {
    pub id: String,
    pub airline: String,
    pub flight_number: String,
    pub departure: FlightEndpoint,
    pub arrival: FlightEndpoint,
    pub duration_minutes: u32,
    pub price: i32,
    pub currency: String,
    pub aircraft: String,
    pub available_seats: u32,
}

impl Flight {
    /// Duration formatted the way the results page shows it, e.g. `6h 15m`.
    pub fn duration_label(&self) -> String {
        format!("{}h {}m", self.duration_minutes / 60, self.duration_minutes % 60)
    }

    pub fn serves(&self, origin: &str, destination: &str) -> bool {
        self.departure.code == origin && self.arrival.code == destination
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SeatClass {
    First,
    Business,
    Economy,
}

impl fmt::Display for SeatClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SeatClass::First => "first",
            SeatClass::Business => "business",
            SeatClass::Economy => "economy",
        };
        f.write_str(label)
    }
}

/// A seat in one generated seat map. Not persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Seat {
    pub id: String,
    pub row: u8,
    pub column: char,
    pub class: SeatClass,
    pub is_available: bool,
    pub upcharge: Option<i32>,
}

impl Seat {
    pub fn new(row: u8, column: char, class: SeatClass, is_available: bool, upcharge: Option<i32>) -> Self {
        Self {
            id: format!("{}{}", row, column),
            row,
            column,
            class,
            is_available,
            upcharge,
        }
    }

    /// Upcharge contribution to a quote; seats without one add nothing.
    pub fn upcharge_amount(&self) -> i32 {
        self.upcharge.unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seat_id_is_row_then_column() {
        let seat = Seat::new(12, 'C', SeatClass::Economy, true, None);
        assert_eq!(seat.id, "12C");
        assert_eq!(seat.upcharge_amount(), 0);
    }

    #[test]
    fn test_seat_class_serializes_lowercase() {
        let json = serde_json::to_string(&SeatClass::Business).unwrap();
        assert_eq!(json, r#""business""#);
        assert_eq!(SeatClass::First.to_string(), "first");
    }
}
