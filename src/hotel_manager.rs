// Hotel manager: owns the authoritative hotel list for the process
//
// Every structural change is written through to the store before the call
// returns. If the write fails the change is undone, so memory and disk never
// disagree between calls.

use crate::config::StoreConfig;
use crate::model::{Hotel, HotelId, Reservation, RoomNumber};
use crate::store::{HotelStore, JsonFileStore, StoreError};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum HotelError {
    #[error("Hotel index {index} out of range (1..={count})")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("Hotel {0} not found")]
    HotelNotFound(HotelId),

    #[error("Price {0} is not a finite number")]
    InvalidPrice(f64),

    #[error("Room {number} not found in hotel '{hotel}'")]
    RoomNotFound { hotel: String, number: RoomNumber },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

// Result of asking for a reservation on a room
#[derive(Debug, Clone, PartialEq)]
pub enum Booking {
    Created(Reservation),
    // The room was already reserved; nothing was written
    Existing(Reservation),
}

impl Booking {
    pub fn reservation(&self) -> &Reservation {
        match self {
            Booking::Created(reservation) | Booking::Existing(reservation) => reservation,
        }
    }

    pub fn into_reservation(self) -> Reservation {
        match self {
            Booking::Created(reservation) | Booking::Existing(reservation) => reservation,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Booking::Created(_))
    }
}

struct Slot {
    id: HotelId,
    hotel: Hotel,
}

pub struct HotelManager<S: HotelStore = JsonFileStore> {
    store: S,
    hotels: Vec<Slot>,
    next_id: u64,
}

impl HotelManager<JsonFileStore> {
    // Open the JSON document described by `config`
    pub fn open(config: StoreConfig) -> Result<Self, StoreError> {
        Self::new(JsonFileStore::new(config))
    }
}

impl<S: HotelStore> HotelManager<S> {
    pub fn new(store: S) -> Result<Self, StoreError> {
        let loaded = store.load()?;
        let mut manager = Self {
            store,
            hotels: Vec::with_capacity(loaded.len()),
            next_id: 1,
        };
        for hotel in loaded {
            manager.push(hotel);
        }

        debug!("Hotel manager ready with {} hotels", manager.hotels.len());
        Ok(manager)
    }

    fn push(&mut self, hotel: Hotel) -> HotelId {
        let id = HotelId(self.next_id);
        self.next_id += 1;
        self.hotels.push(Slot { id, hotel });
        id
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // Rewrite the whole document from the in-memory list
    pub fn save(&self) -> Result<(), StoreError> {
        let hotels: Vec<&Hotel> = self.hotels.iter().map(|slot| &slot.hotel).collect();
        self.store.save(&hotels)
    }

    // Persist, or run `rollback` and report the failure
    pub(crate) fn persist_or(
        &mut self,
        rollback: impl FnOnce(&mut Self),
    ) -> Result<(), HotelError> {
        if let Err(e) = self.save() {
            warn!("Persisting hotels failed, reverting last change: {}", e);
            rollback(self);
            return Err(e.into());
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.hotels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hotels.is_empty()
    }

    pub fn create_hotel(
        &mut self,
        name: impl Into<String>,
        location: impl Into<String>,
    ) -> Result<(HotelId, &Hotel), HotelError> {
        let id = self.push(Hotel::new(name, location));
        self.persist_or(|manager| {
            manager.hotels.pop();
        })?;

        let slot = &self.hotels[self.hotels.len() - 1];
        info!("Created hotel {} {}", slot.id, slot.hotel);
        Ok((id, &slot.hotel))
    }

    // 1-based positions in insertion order; positions shift after a delete
    pub fn list_hotels(&self) -> impl Iterator<Item = (usize, &Hotel)> + '_ {
        self.hotels
            .iter()
            .enumerate()
            .map(|(i, slot)| (i + 1, &slot.hotel))
    }

    pub fn delete_hotel(&mut self, index: usize) -> Result<Hotel, HotelError> {
        let count = self.hotels.len();
        if index == 0 || index > count {
            return Err(HotelError::IndexOutOfRange { index, count });
        }

        let slot = self.hotels.remove(index - 1);
        if let Err(e) = self.save() {
            warn!("Persisting hotels failed, restoring hotel {}: {}", slot.id, e);
            self.hotels.insert(index - 1, slot);
            return Err(e.into());
        }

        info!("Deleted hotel {} {}", slot.id, slot.hotel);
        Ok(slot.hotel)
    }

    pub fn search_by_location(&self, location: &str) -> Vec<&Hotel> {
        self.hotels
            .iter()
            .map(|slot| &slot.hotel)
            .filter(|hotel| hotel.location == location)
            .collect()
    }

    pub fn get_by_index(&self, index: usize) -> Option<&Hotel> {
        let id = self.hotel_id_at(index)?;
        self.hotel(id)
    }

    // Translate a displayed position into a handle that survives deletions
    pub fn hotel_id_at(&self, index: usize) -> Option<HotelId> {
        index
            .checked_sub(1)
            .and_then(|i| self.hotels.get(i))
            .map(|slot| slot.id)
    }

    pub fn position_of(&self, id: HotelId) -> Option<usize> {
        self.hotels
            .iter()
            .position(|slot| slot.id == id)
            .map(|i| i + 1)
    }

    pub fn hotel(&self, id: HotelId) -> Option<&Hotel> {
        self.hotels
            .iter()
            .find(|slot| slot.id == id)
            .map(|slot| &slot.hotel)
    }

    pub(crate) fn hotel_mut(&mut self, id: HotelId) -> Option<&mut Hotel> {
        self.hotels
            .iter_mut()
            .find(|slot| slot.id == id)
            .map(|slot| &mut slot.hotel)
    }

    // Lookup-or-create: a room holds at most one reservation
    pub fn create_reservation(
        &mut self,
        hotel_id: HotelId,
        room_number: &RoomNumber,
        guest_name: &str,
    ) -> Result<Booking, HotelError> {
        let hotel = self
            .hotel_mut(hotel_id)
            .ok_or(HotelError::HotelNotFound(hotel_id))?;
        let room = hotel
            .room_position(room_number)
            .ok_or_else(|| HotelError::RoomNotFound {
                hotel: hotel.name.clone(),
                number: room_number.clone(),
            })?;

        if let Some(existing) = hotel.reservations.iter().find(|r| r.room == room) {
            warn!(
                "Room {} in {} already reserved as #{} for {}",
                room_number, hotel, existing.reservation_id, existing.guest_name
            );
            return Ok(Booking::Existing(existing.clone()));
        }

        let reservation = Reservation {
            reservation_id: hotel.next_reservation_id(),
            room,
            guest_name: guest_name.to_string(),
        };
        hotel.reservations.push(reservation.clone());

        self.persist_or(|manager| {
            if let Some(hotel) = manager.hotel_mut(hotel_id) {
                hotel.reservations.pop();
            }
        })?;

        info!(
            "Created reservation #{} for {} in room {} of hotel {}",
            reservation.reservation_id, reservation.guest_name, room_number, hotel_id
        );
        Ok(Booking::Created(reservation))
    }

    pub fn find_reservation(
        &self,
        hotel_id: HotelId,
        room_number: &RoomNumber,
    ) -> Option<&Reservation> {
        let hotel = self.hotel(hotel_id)?;
        let room = hotel.room_position(room_number)?;
        hotel.reservations.iter().find(|r| r.room == room)
    }

    pub fn search_reservations_by_hotel(&self, hotel_id: HotelId) -> Option<&[Reservation]> {
        self.hotel(hotel_id)
            .map(|hotel| hotel.reservations.as_slice())
    }

    // Reservation ids are per hotel, so several hotels may share one.
    // Returns the first match in hotel order.
    pub fn search_reservation_by_id(&self, reservation_id: u32) -> Option<(&Hotel, &Reservation)> {
        let matches = self.reservations_with_id(reservation_id);
        if matches.len() > 1 {
            warn!(
                "Reservation id {} is ambiguous across {} hotels",
                reservation_id,
                matches.len()
            );
        }
        matches.into_iter().next()
    }

    pub fn reservations_with_id(&self, reservation_id: u32) -> Vec<(&Hotel, &Reservation)> {
        self.hotels
            .iter()
            .flat_map(|slot| {
                slot.hotel
                    .reservations
                    .iter()
                    .filter(move |r| r.reservation_id == reservation_id)
                    .map(move |r| (&slot.hotel, r))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Room;
    use crate::room_manager::RoomManager;
    use crate::store::mock_store::MockStore;
    use tempfile::tempdir;

    fn manager() -> HotelManager<MockStore> {
        HotelManager::new(MockStore::new()).unwrap()
    }

    fn names<S: HotelStore>(manager: &HotelManager<S>) -> Vec<(usize, String)> {
        manager
            .list_hotels()
            .map(|(position, hotel)| (position, hotel.name.clone()))
            .collect()
    }

    fn add_room<S: HotelStore>(manager: &mut HotelManager<S>, id: HotelId, number: &str) {
        RoomManager::new()
            .create_room(manager, id, number, "Luxury", 2, 1000.0)
            .unwrap();
    }

    #[test]
    fn test_create_hotel_lists_in_insertion_order() {
        let mut manager = manager();
        for name in ["Alpha", "Bravo", "Charlie"] {
            let (_, hotel) = manager.create_hotel(name, "Somewhere").unwrap();
            assert_eq!(hotel.name, name);
            assert!(hotel.rooms.is_empty());
            assert!(hotel.reservations.is_empty());
        }

        assert_eq!(
            names(&manager),
            vec![
                (1, "Alpha".to_string()),
                (2, "Bravo".to_string()),
                (3, "Charlie".to_string())
            ]
        );
        assert_eq!(manager.store().save_count(), 3);
    }

    #[test]
    fn test_delete_hotel_shifts_positions() {
        let mut manager = manager();
        manager.create_hotel("Alpha", "A").unwrap();
        manager.create_hotel("Bravo", "B").unwrap();
        manager.create_hotel("Charlie", "C").unwrap();

        let removed = manager.delete_hotel(2).unwrap();
        assert_eq!(removed.name, "Bravo");
        assert_eq!(manager.get_by_index(2).unwrap().name, "Charlie");
        assert!(manager.get_by_index(3).is_none());

        let removed = manager.delete_hotel(2).unwrap();
        assert_eq!(removed.name, "Charlie");
        assert!(manager.get_by_index(2).is_none());
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.store().last_saved().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_hotel_out_of_range() {
        let mut manager = manager();
        manager.create_hotel("Alpha", "A").unwrap();

        assert!(matches!(
            manager.delete_hotel(0),
            Err(HotelError::IndexOutOfRange { index: 0, count: 1 })
        ));
        assert!(matches!(
            manager.delete_hotel(2),
            Err(HotelError::IndexOutOfRange { index: 2, count: 1 })
        ));
        assert_eq!(manager.len(), 1);
        // Only the create was written
        assert_eq!(manager.store().save_count(), 1);
    }

    #[test]
    fn test_get_by_index_bounds() {
        let mut manager = manager();
        assert!(manager.get_by_index(1).is_none());

        manager.create_hotel("Alpha", "A").unwrap();
        assert!(manager.get_by_index(0).is_none());
        assert_eq!(manager.get_by_index(1).unwrap().name, "Alpha");
        assert!(manager.get_by_index(2).is_none());
    }

    #[test]
    fn test_hotel_id_survives_deletion_of_earlier_hotel() {
        let mut manager = manager();
        manager.create_hotel("Alpha", "A").unwrap();
        let (charlie, _) = manager.create_hotel("Charlie", "C").unwrap();
        assert_eq!(manager.position_of(charlie), Some(2));

        let alpha = manager.hotel_id_at(1).unwrap();
        manager.delete_hotel(1).unwrap();

        assert_eq!(manager.hotel(charlie).unwrap().name, "Charlie");
        assert_eq!(manager.position_of(charlie), Some(1));
        assert!(manager.hotel(alpha).is_none());
        assert_eq!(manager.hotel_id_at(1), Some(charlie));
    }

    #[test]
    fn test_search_by_location_exact_match() {
        let mut manager = manager();
        manager.create_hotel("Alpha", "Cancun").unwrap();
        manager.create_hotel("Bravo", "Merida").unwrap();
        manager.create_hotel("Charlie", "Cancun").unwrap();

        let found: Vec<&str> = manager
            .search_by_location("Cancun")
            .iter()
            .map(|hotel| hotel.name.as_str())
            .collect();
        assert_eq!(found, vec!["Alpha", "Charlie"]);
        assert!(manager.search_by_location("cancun").is_empty());
        assert!(manager.search_by_location("Canc").is_empty());
    }

    #[test]
    fn test_duplicate_reservation_returns_existing() {
        let mut manager = manager();
        let (hotel, _) = manager.create_hotel("Hotel Test", "Location Test").unwrap();
        add_room(&mut manager, hotel, "1");
        let saves_before = manager.store().save_count();

        let first = manager
            .create_reservation(hotel, &RoomNumber::from("1"), "Ana")
            .unwrap();
        let second = manager
            .create_reservation(hotel, &RoomNumber::from("1"), "Luis")
            .unwrap();

        assert!(first.is_new());
        assert!(!second.is_new());
        assert_eq!(first.reservation(), second.reservation());
        assert_eq!(second.into_reservation().guest_name, "Ana");
        assert_eq!(manager.search_reservations_by_hotel(hotel).unwrap().len(), 1);
        assert_eq!(manager.store().save_count(), saves_before + 1);
    }

    #[test]
    fn test_reservation_ids_are_per_hotel() {
        let mut manager = manager();
        let (first_hotel, _) = manager.create_hotel("Alpha", "A").unwrap();
        let (second_hotel, _) = manager.create_hotel("Bravo", "B").unwrap();
        for id in [first_hotel, second_hotel] {
            add_room(&mut manager, id, "101");
            add_room(&mut manager, id, "102");
        }

        let ids: Vec<u32> = [
            (first_hotel, "101"),
            (first_hotel, "102"),
            (second_hotel, "102"),
        ]
        .into_iter()
        .map(|(hotel, room)| {
            manager
                .create_reservation(hotel, &RoomNumber::from(room), "Guest")
                .unwrap()
                .reservation()
                .reservation_id
        })
        .collect();

        assert_eq!(ids, vec![1, 2, 1]);
    }

    #[test]
    fn test_create_reservation_unknown_room_or_hotel() {
        let mut manager = manager();
        let (hotel, _) = manager.create_hotel("Alpha", "A").unwrap();

        let err = manager
            .create_reservation(hotel, &RoomNumber::from("9"), "Ana")
            .unwrap_err();
        assert!(matches!(err, HotelError::RoomNotFound { .. }));

        manager.delete_hotel(1).unwrap();
        let err = manager
            .create_reservation(hotel, &RoomNumber::from("9"), "Ana")
            .unwrap_err();
        assert!(matches!(err, HotelError::HotelNotFound(id) if id == hotel));
    }

    #[test]
    fn test_find_reservation_by_room() {
        let mut manager = manager();
        let (hotel, _) = manager.create_hotel("Alpha", "A").unwrap();
        add_room(&mut manager, hotel, "1");
        add_room(&mut manager, hotel, "2");
        manager
            .create_reservation(hotel, &RoomNumber::from("2"), "Ana")
            .unwrap();

        assert!(manager.find_reservation(hotel, &RoomNumber::from("1")).is_none());
        assert_eq!(
            manager
                .find_reservation(hotel, &RoomNumber::from("2"))
                .unwrap()
                .guest_name,
            "Ana"
        );
        assert!(manager.find_reservation(hotel, &RoomNumber::from("3")).is_none());
    }

    #[test]
    fn test_search_reservation_by_id_prefers_first_hotel() {
        let mut manager = manager();
        let (alpha, _) = manager.create_hotel("Alpha", "A").unwrap();
        let (bravo, _) = manager.create_hotel("Bravo", "B").unwrap();
        add_room(&mut manager, alpha, "1");
        add_room(&mut manager, bravo, "1");
        manager
            .create_reservation(bravo, &RoomNumber::from("1"), "Luis")
            .unwrap();
        manager
            .create_reservation(alpha, &RoomNumber::from("1"), "Ana")
            .unwrap();

        let (hotel, reservation) = manager.search_reservation_by_id(1).unwrap();
        assert_eq!(hotel.name, "Alpha");
        assert_eq!(reservation.guest_name, "Ana");
        assert_eq!(manager.reservations_with_id(1).len(), 2);
        assert!(manager.search_reservation_by_id(2).is_none());
    }

    #[test]
    fn test_failed_save_rolls_back_every_mutation() {
        let mut manager = manager();
        let (hotel, _) = manager.create_hotel("Alpha", "A").unwrap();
        add_room(&mut manager, hotel, "1");

        manager.store().fail_next_saves(1);
        assert!(matches!(
            manager.create_hotel("Bravo", "B"),
            Err(HotelError::Store(_))
        ));
        assert_eq!(manager.len(), 1);

        manager.store().fail_next_saves(1);
        assert!(manager.delete_hotel(1).is_err());
        assert_eq!(manager.get_by_index(1).unwrap().name, "Alpha");
        assert_eq!(manager.hotel_id_at(1), Some(hotel));

        manager.store().fail_next_saves(1);
        assert!(manager
            .create_reservation(hotel, &RoomNumber::from("1"), "Ana")
            .is_err());
        assert!(manager.search_reservations_by_hotel(hotel).unwrap().is_empty());

        // Retrying after the failure hands out the same id
        let booking = manager
            .create_reservation(hotel, &RoomNumber::from("1"), "Ana")
            .unwrap();
        assert_eq!(booking.reservation().reservation_id, 1);
    }

    #[test]
    fn test_reopen_reproduces_hotels() {
        let dir = tempdir().unwrap();
        let config = StoreConfig::with_path(dir.path().join("hotels.json"));

        let mut manager = HotelManager::open(config.clone()).unwrap();
        let (alpha, _) = manager.create_hotel("Alpha", "Cancun").unwrap();
        manager.create_hotel("Bravo", "Merida").unwrap();
        add_room(&mut manager, alpha, "1");
        add_room(&mut manager, alpha, "2");
        manager
            .create_reservation(alpha, &RoomNumber::from("2"), "Ana")
            .unwrap();
        let before: Vec<Hotel> = manager.list_hotels().map(|(_, h)| h.clone()).collect();
        drop(manager);

        let mut reopened = HotelManager::open(config).unwrap();
        let after: Vec<Hotel> = reopened.list_hotels().map(|(_, h)| h.clone()).collect();
        assert_eq!(after, before);

        // The room stays reserved across runs
        let alpha = reopened.hotel_id_at(1).unwrap();
        let booking = reopened
            .create_reservation(alpha, &RoomNumber::from("2"), "Luis")
            .unwrap();
        assert!(!booking.is_new());
        assert_eq!(booking.reservation().guest_name, "Ana");
    }

    #[test]
    fn test_new_surfaces_malformed_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hotels.json");
        std::fs::write(&path, "[{\"name\": 1}]").unwrap();

        let err = HotelManager::open(StoreConfig::with_path(path)).err().unwrap();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_seeded_store_gets_sequential_ids() {
        let mut seeded = Hotel::new("Seeded", "S");
        seeded.rooms.push(Room::new("1", "Single", 1, 500.0));
        let mut manager =
            HotelManager::new(MockStore::with_hotels(vec![seeded, Hotel::new("Other", "O")]))
                .unwrap();

        let first = manager.hotel_id_at(1).unwrap();
        let second = manager.hotel_id_at(2).unwrap();
        assert_ne!(first, second);

        let (third, _) = manager.create_hotel("Third", "T").unwrap();
        assert!(third > second);
        assert_eq!(manager.store().save_count(), 1);
    }
}
