// Whole-document JSON persistence for the hotel list
//
// The on-disk shape repeats the owning hotel's name/location and the full room
// record inside every reservation. Those copies are written for compatibility
// only; on load the containing hotel is authoritative.

use crate::config::StoreConfig;
use crate::model::{Hotel, Reservation, Room};
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed store {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Reservation in hotel '{hotel}' refers to unknown room {room}")]
    DanglingRoom { hotel: String, room: String },

    #[error("Serialization error: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl StoreError {
    // Conditions that make the document itself unusable, as opposed to I/O trouble
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            StoreError::Malformed { .. } | StoreError::DanglingRoom { .. }
        )
    }
}

// Persistence seam used by the managers
pub trait HotelStore {
    // Absent backing document is an empty registry, not an error
    fn load(&self) -> Result<Vec<Hotel>, StoreError>;

    // Replaces the whole document
    fn save(&self, hotels: &[&Hotel]) -> Result<(), StoreError>;
}

// On-disk records
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HotelRecord {
    pub name: String,
    pub location: String,
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub reservations: Vec<ReservationRecord>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReservationRecord {
    pub reservation_id: u32,
    pub hotel: HotelSummary,
    pub room: Room,
    pub guest_name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HotelSummary {
    pub name: String,
    pub location: String,
}

impl TryFrom<&Hotel> for HotelRecord {
    type Error = StoreError;

    fn try_from(hotel: &Hotel) -> Result<Self, Self::Error> {
        let reservations = hotel
            .reservations
            .iter()
            .map(|reservation| {
                let room = hotel
                    .room_for(reservation)
                    .ok_or_else(|| StoreError::DanglingRoom {
                        hotel: hotel.name.clone(),
                        room: format!("at position {}", reservation.room),
                    })?;

                Ok(ReservationRecord {
                    reservation_id: reservation.reservation_id,
                    hotel: HotelSummary {
                        name: hotel.name.clone(),
                        location: hotel.location.clone(),
                    },
                    room: room.clone(),
                    guest_name: reservation.guest_name.clone(),
                })
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        Ok(HotelRecord {
            name: hotel.name.clone(),
            location: hotel.location.clone(),
            rooms: hotel.rooms.clone(),
            reservations,
        })
    }
}

impl TryFrom<HotelRecord> for Hotel {
    type Error = StoreError;

    fn try_from(record: HotelRecord) -> Result<Self, Self::Error> {
        let mut hotel = Hotel::new(record.name, record.location);
        hotel.rooms = record.rooms;

        for stored in record.reservations {
            // Resolve the embedded room copy against this hotel's own rooms
            let room = hotel.room_position(&stored.room.number).ok_or_else(|| {
                StoreError::DanglingRoom {
                    hotel: hotel.name.clone(),
                    room: stored.room.number.to_string(),
                }
            })?;

            hotel.reservations.push(Reservation {
                reservation_id: stored.reservation_id,
                room,
                guest_name: stored.guest_name,
            });
        }

        Ok(hotel)
    }
}

pub struct JsonFileStore {
    config: StoreConfig,
}

impl JsonFileStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.config.path.clone(),
            source,
        }
    }

    // Sibling file so the final rename stays on one filesystem
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .config
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.config.path.with_file_name(name)
    }

    fn replace_with(&self, temp_path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let mut file = File::create(temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);
        fs::rename(temp_path, self.path())
    }

    fn encode(&self, records: &[HotelRecord]) -> Result<Vec<u8>, StoreError> {
        if self.config.indent == 0 {
            return serde_json::to_vec(records).map_err(StoreError::Serialize);
        }

        let indent = " ".repeat(self.config.indent);
        let mut out = Vec::new();
        {
            let formatter = PrettyFormatter::with_indent(indent.as_bytes());
            let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
            records
                .serialize(&mut serializer)
                .map_err(StoreError::Serialize)?;
        }
        Ok(out)
    }
}

impl HotelStore for JsonFileStore {
    fn load(&self) -> Result<Vec<Hotel>, StoreError> {
        let path = self.path();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No store at {}, starting empty", path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        let records: Vec<HotelRecord> =
            serde_json::from_str(&contents).map_err(|source| StoreError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;

        let hotels = records
            .into_iter()
            .map(Hotel::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Loaded {} hotels from {}", hotels.len(), path.display());
        Ok(hotels)
    }

    fn save(&self, hotels: &[&Hotel]) -> Result<(), StoreError> {
        let records = hotels
            .iter()
            .map(|hotel| HotelRecord::try_from(*hotel))
            .collect::<Result<Vec<_>, _>>()?;
        let bytes = self.encode(&records)?;

        let temp_path = self.temp_path();
        if let Err(e) = self.replace_with(&temp_path, &bytes) {
            // Cleanup failure is ignored; the write error is reported
            let _ = fs::remove_file(&temp_path);
            return Err(self.io_error(e));
        }

        debug!(
            "Saved {} hotels to {} ({} bytes)",
            records.len(),
            self.path().display(),
            bytes.len()
        );
        Ok(())
    }
}
