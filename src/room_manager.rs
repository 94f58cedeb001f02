// Room manager: creates and queries the rooms of a hotel
//
// Holds no state of its own. Rooms live in their hotel and are written out
// through the hotel manager's store.

use crate::hotel_manager::{HotelError, HotelManager};
use crate::model::{Hotel, HotelId, Room, RoomNumber};
use crate::store::HotelStore;
use tracing::info;

#[derive(Debug, Default, Clone, Copy)]
pub struct RoomManager;

impl RoomManager {
    pub fn new() -> Self {
        Self
    }

    // Appends without checking for a duplicate number. NaN and infinities are
    // refused since JSON cannot hold them.
    pub fn create_room<S: HotelStore>(
        &self,
        manager: &mut HotelManager<S>,
        hotel_id: HotelId,
        number: impl Into<RoomNumber>,
        room_type: impl Into<String>,
        capacity: u32,
        price: f64,
    ) -> Result<Room, HotelError> {
        if !price.is_finite() {
            return Err(HotelError::InvalidPrice(price));
        }

        let room = Room::new(number, room_type, capacity, price);
        let hotel = manager
            .hotel_mut(hotel_id)
            .ok_or(HotelError::HotelNotFound(hotel_id))?;
        hotel.rooms.push(room.clone());

        manager.persist_or(|manager| {
            if let Some(hotel) = manager.hotel_mut(hotel_id) {
                hotel.rooms.pop();
            }
        })?;

        info!("Created room {} in hotel {}", room.number, hotel_id);
        Ok(room)
    }

    pub fn search_by_hotel<'a>(&self, hotel: &'a Hotel) -> &'a [Room] {
        &hotel.rooms
    }

    pub fn search_by_hotel_and_type<'a>(&self, hotel: &'a Hotel, room_type: &str) -> Vec<&'a Room> {
        hotel
            .rooms
            .iter()
            .filter(|room| room.room_type == room_type)
            .collect()
    }

    // Inclusive upper bound on price
    pub fn search_by_hotel_type_and_price<'a>(
        &self,
        hotel: &'a Hotel,
        room_type: &str,
        max_price: f64,
    ) -> Vec<&'a Room> {
        hotel
            .rooms
            .iter()
            .filter(|room| room.room_type == room_type && room.price <= max_price)
            .collect()
    }

    pub fn get_room_by_number<'a>(&self, hotel: &'a Hotel, number: &RoomNumber) -> Option<&'a Room> {
        hotel.room_position(number).map(|i| &hotel.rooms[i])
    }
}
