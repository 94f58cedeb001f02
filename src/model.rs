// Domain model: a hotel owns its rooms and the reservations made against them

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// Process-scoped handle for a hotel. Assigned on load/creation, never persisted
// and never reused within a run, so it survives deletions of other hotels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HotelId(pub(crate) u64);

impl fmt::Display for HotelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// Canonical room label. Stored files carry either a JSON string or a JSON
// number here; both collapse to the same trimmed string so that `1` and `"1"`
// address the same room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RoomNumber(String);

impl RoomNumber {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomNumber {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for RoomNumber {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<i64> for RoomNumber {
    fn from(raw: i64) -> Self {
        Self(raw.to_string())
    }
}

impl fmt::Display for RoomNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RoomNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawNumber {
            Text(String),
            Integer(i64),
            Float(f64),
        }

        Ok(match RawNumber::deserialize(deserializer)? {
            RawNumber::Text(text) => RoomNumber::new(text),
            RawNumber::Integer(n) => RoomNumber::from(n),
            // 101.0 prints as "101"
            RawNumber::Float(n) => RoomNumber::new(n.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Room {
    pub number: RoomNumber,
    pub room_type: String,
    pub capacity: u32,
    pub price: f64,
}

impl Room {
    pub fn new(
        number: impl Into<RoomNumber>,
        room_type: impl Into<String>,
        capacity: u32,
        price: f64,
    ) -> Self {
        Self {
            number: number.into(),
            room_type: room_type.into(),
            capacity,
            price,
        }
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Room {}: type {}, capacity {}, price {}",
            self.number, self.room_type, self.capacity, self.price
        )
    }
}

// A permanent guest-to-room assignment. `room` is the position of the room in
// the owning hotel's room list; rooms are never removed so the position holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Reservation {
    pub reservation_id: u32,
    pub room: usize,
    pub guest_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hotel {
    pub name: String,
    pub location: String,
    pub rooms: Vec<Room>,
    pub reservations: Vec<Reservation>,
}

impl Hotel {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            rooms: Vec::new(),
            reservations: Vec::new(),
        }
    }

    // First room carrying this number; duplicates are allowed but unreachable.
    pub fn room_position(&self, number: &RoomNumber) -> Option<usize> {
        self.rooms.iter().position(|room| &room.number == number)
    }

    pub fn room_for(&self, reservation: &Reservation) -> Option<&Room> {
        self.rooms.get(reservation.room)
    }

    // Ids are scoped to the hotel: two hotels both hand out 1, 2, 3...
    pub fn next_reservation_id(&self) -> u32 {
        self.reservations.len() as u32 + 1
    }
}

impl fmt::Display for Hotel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.location)
    }
}
