use rand::Rng;
use serde::{Deserialize, Serialize};
use skybook_core::{Seat, SeatClass};
use std::ops::RangeInclusive;

/// One block of rows sharing a class, column set, upcharge and
/// availability odds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CabinSection {
    pub class: SeatClass,
    pub rows: RangeInclusive<u8>,
    pub columns: Vec<char>,
    pub upcharge: Option<i32>,
    /// Probability that any one seat in the section is free.
    pub availability: f64,
}

impl CabinSection {
    pub fn seat_count(&self) -> usize {
        self.rows.clone().count() * self.columns.len()
    }
}

/// Generates randomized seat maps for the narrow-body demo layout.
#[derive(Debug, Clone)]
pub struct SeatGenerator {
    sections: Vec<CabinSection>,
}

impl SeatGenerator {
    pub fn new(sections: Vec<CabinSection>) -> Self {
        Self { sections }
    }

    pub fn sections(&self) -> &[CabinSection] {
        &self.sections
    }

    /// The seat `seat_id` would be in this layout, marked available. Class
    /// and upcharge come from its section; `None` if the layout has no such seat.
    pub fn layout_seat(&self, seat_id: &str) -> Option<Seat> {
        self.sections.iter().find_map(|section| {
            let column = section.columns.iter().copied().find(|c| seat_id.ends_with(*c))?;
            let row: u8 = seat_id.strip_suffix(column)?.parse().ok()?;
            section
                .rows
                .contains(&row)
                .then(|| Seat::new(row, column, section.class, true, section.upcharge))
        })
    }

    /// Fresh map drawn from the thread-local RNG.
    pub fn generate(&self) -> SeatMap {
        self.generate_with(&mut rand::thread_rng())
    }

    pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R) -> SeatMap {
        let mut seats = Vec::with_capacity(self.sections.iter().map(CabinSection::seat_count).sum());

        for section in &self.sections {
            for row in section.rows.clone() {
                for &column in &section.columns {
                    let is_available = rng.gen_bool(section.availability.clamp(0.0, 1.0));
                    seats.push(Seat::new(row, column, section.class, is_available, section.upcharge));
                }
            }
        }

        SeatMap { seats }
    }
}

impl Default for SeatGenerator {
    /// First rows 1-3 (A-D, +150), business rows 4-8 (A-F, +75),
    /// economy rows 9-35 (A-F).
    fn default() -> Self {
        let narrow = vec!['A', 'B', 'C', 'D'];
        let wide = vec!['A', 'B', 'C', 'D', 'E', 'F'];

        Self::new(vec![
            CabinSection {
                class: SeatClass::First,
                rows: 1..=3,
                columns: narrow,
                upcharge: Some(150),
                availability: 0.7,
            },
            CabinSection {
                class: SeatClass::Business,
                rows: 4..=8,
                columns: wide.clone(),
                upcharge: Some(75),
                availability: 0.6,
            },
            CabinSection {
                class: SeatClass::Economy,
                rows: 9..=35,
                columns: wide,
                upcharge: None,
                availability: 0.8,
            },
        ])
    }
}

/// All seats for one viewing of the seat-selection stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeatMap {
    seats: Vec<Seat>,
}

impl SeatMap {
    pub fn from_seats(seats: Vec<Seat>) -> Self {
        Self { seats }
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn get(&self, seat_id: &str) -> Option<&Seat> {
        self.seats.iter().find(|s| s.id == seat_id)
    }

    pub fn by_class(&self, class: SeatClass) -> impl Iterator<Item = &Seat> {
        self.seats.iter().filter(move |s| s.class == class)
    }

    pub fn available(&self) -> impl Iterator<Item = &Seat> {
        self.seats.iter().filter(|s| s.is_available)
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }
}
