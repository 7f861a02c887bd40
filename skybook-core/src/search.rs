use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{CoreError, CoreResult};

// ============================================================================
// Passenger Count
// ============================================================================

/// Number of travellers on one booking, always within `1..=6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PassengerCount(u8);

impl PassengerCount {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 6;

    pub fn new(count: u8) -> CoreResult<Self> {
        if (Self::MIN..=Self::MAX).contains(&count) {
            Ok(Self(count))
        } else {
            Err(CoreError::Validation(format!(
                "passenger count must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                count
            )))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// "1 Passenger" / "3 Passengers"
    pub fn label(self) -> String {
        if self.0 == 1 {
            "1 Passenger".to_string()
        } else {
            format!("{} Passengers", self.0)
        }
    }
}

impl Default for PassengerCount {
    fn default() -> Self {
        Self(1)
    }
}

impl TryFrom<u8> for PassengerCount {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PassengerCount> for u8 {
    fn from(value: PassengerCount) -> Self {
        value.0
    }
}

impl fmt::Display for PassengerCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Trip Type
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TripType {
    #[serde(rename = "oneway")]
    OneWay,
    #[default]
    #[serde(rename = "roundtrip")]
    RoundTrip,
}

impl TripType {
    pub fn as_str(self) -> &'static str {
        match self {
            TripType::OneWay => "oneway",
            TripType::RoundTrip => "roundtrip",
        }
    }
}

// ============================================================================
// Search Query
// ============================================================================

/// A submitted search. Field names match the results view query string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub from: String,
    pub to: String,
    pub departure: NaiveDate,
    pub passengers: PassengerCount,
    #[serde(rename = "tripType")]
    pub trip_type: TripType,
    #[serde(rename = "return", default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<NaiveDate>,
}

impl SearchQuery {
    /// String-encoded query parameters, in the order the search form emits them.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("from", self.from.clone()),
            ("to", self.to.clone()),
            ("departure", self.departure.format("%Y-%m-%d").to_string()),
            ("passengers", self.passengers.to_string()),
            ("tripType", self.trip_type.as_str().to_string()),
        ];
        if let Some(return_date) = self.return_date {
            pairs.push(("return", return_date.format("%Y-%m-%d").to_string()));
        }
        pairs
    }
}

// ============================================================================
// Search Form
// ============================================================================

/// Editable search form state. `submit` turns it into a [`SearchQuery`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchForm {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub departure: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    pub passengers: PassengerCount,
    pub trip_type: TripType,
}

impl SearchForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.origin, &mut self.destination);
    }

    pub fn set_trip_type(&mut self, trip_type: TripType) {
        self.trip_type = trip_type;
    }

    /// Names of the required fields that are still empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if filled(&self.origin).is_none() {
            missing.push("origin");
        }
        if filled(&self.destination).is_none() {
            missing.push("destination");
        }
        if self.departure.is_none() {
            missing.push("departure");
        }
        missing
    }

    pub fn can_submit(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// The return-date picker only exists for round trips.
    pub fn shows_return_date(&self) -> bool {
        self.trip_type == TripType::RoundTrip
    }

    pub fn is_departure_selectable(date: NaiveDate, today: NaiveDate) -> bool {
        date >= today
    }

    /// Lower bound is the departure date, or today before one is picked.
    pub fn is_return_date_selectable(&self, date: NaiveDate, today: NaiveDate) -> bool {
        if !self.shows_return_date() {
            return false;
        }
        date >= self.departure.unwrap_or(today)
    }

    pub fn set_departure(&mut self, date: NaiveDate, today: NaiveDate) -> CoreResult<()> {
        if !Self::is_departure_selectable(date, today) {
            return Err(CoreError::Validation(format!(
                "departure date {} is in the past",
                date
            )));
        }
        self.departure = Some(date);
        Ok(())
    }

    pub fn set_return_date(&mut self, date: NaiveDate, today: NaiveDate) -> CoreResult<()> {
        if !self.is_return_date_selectable(date, today) {
            return Err(CoreError::Validation(format!(
                "return date {} is not selectable",
                date
            )));
        }
        self.return_date = Some(date);
        Ok(())
    }

    pub fn submit(&self) -> CoreResult<SearchQuery> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(CoreError::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }

        // missing_fields() guarantees these are present
        let (Some(from), Some(to), Some(departure)) =
            (filled(&self.origin), filled(&self.destination), self.departure)
        else {
            return Err(CoreError::Validation("missing required fields".to_string()));
        };

        let return_date = match (self.trip_type, self.return_date) {
            (TripType::RoundTrip, Some(date)) if date < departure => {
                return Err(CoreError::Validation(format!(
                    "return date {} is before departure {}",
                    date, departure
                )));
            }
            (TripType::RoundTrip, date) => date,
            (TripType::OneWay, _) => None,
        };

        Ok(SearchQuery {
            from: from.to_string(),
            to: to.to_string(),
            departure,
            passengers: self.passengers,
            trip_type: self.trip_type,
            return_date,
        })
    }
}

fn filled(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
