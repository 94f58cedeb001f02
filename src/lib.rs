// Hotel registry: hotels, their rooms and reservations, kept in one JSON document

pub mod config;
pub mod console;
pub mod hotel_manager;
pub mod model;
pub mod room_manager;
pub mod store;

// Re-export key types for convenience
pub use config::{AppConfig, StoreConfig};
pub use console::Console;
pub use hotel_manager::{Booking, HotelError, HotelManager};
pub use model::{Hotel, HotelId, Reservation, Room, RoomNumber};
pub use room_manager::RoomManager;
pub use store::{
    HotelRecord, HotelStore, HotelSummary, JsonFileStore, ReservationRecord, StoreError,
};
