// Line-oriented menu over the hotel and room managers
//
// Hotels are picked by their displayed position and translated to a stable
// id before any manager call. Bad input and missing entities are reported
// and the loop continues; only I/O failure on the console itself ends it.

use crate::hotel_manager::{Booking, HotelError, HotelManager};
use crate::model::{HotelId, RoomNumber};
use crate::room_manager::RoomManager;
use crate::store::HotelStore;
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

const MENU: &str = "\
Menu:
1. Create hotel
2. List hotels
3. Search hotels by location
4. Delete hotel
5. Create room
6. List rooms by hotel
7. List rooms by hotel and type
8. List rooms by hotel, type and price
9. Create reservation
10. List reservations by hotel
11. Find reservation by id
12. Exit";

#[derive(Error, Debug)]
enum InputError {
    #[error("Console I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("End of input")]
    Eof,

    #[error("'{value}' is not a valid {expected}")]
    Invalid {
        value: String,
        expected: &'static str,
    },
}

#[derive(Debug, PartialEq)]
enum Step {
    Continue,
    Exit,
}

pub struct Console<'a, S: HotelStore, R, W> {
    hotels: &'a mut HotelManager<S>,
    rooms: RoomManager,
    input: R,
    output: W,
}

impl<'a, S, R, W> Console<'a, S, R, W>
where
    S: HotelStore,
    R: BufRead,
    W: Write,
{
    pub fn new(hotels: &'a mut HotelManager<S>, input: R, output: W) -> Self {
        Self {
            hotels,
            rooms: RoomManager::new(),
            input,
            output,
        }
    }

    // Runs until the exit entry is chosen or input ends
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            writeln!(self.output, "\n{}", MENU)?;
            let step = match self.prompt("Choose an option") {
                Ok(choice) => self.dispatch(&choice),
                Err(e) => Err(e),
            };

            match step {
                Ok(Step::Continue) => {}
                Ok(Step::Exit) => {
                    writeln!(self.output, "Goodbye!")?;
                    return Ok(());
                }
                Err(InputError::Eof) => {
                    debug!("Console input closed");
                    return Ok(());
                }
                Err(InputError::Io(e)) => return Err(e),
                Err(e @ InputError::Invalid { .. }) => writeln!(self.output, "{}", e)?,
            }
        }
    }

    fn dispatch(&mut self, choice: &str) -> Result<Step, InputError> {
        match choice {
            "1" => self.create_hotel()?,
            "2" => self.list_hotels()?,
            "3" => self.search_hotels_by_location()?,
            "4" => self.delete_hotel()?,
            "5" => self.create_room()?,
            "6" => self.list_rooms()?,
            "7" => self.list_rooms_by_type()?,
            "8" => self.list_rooms_by_type_and_price()?,
            "9" => self.create_reservation()?,
            "10" => self.list_reservations()?,
            "11" => self.find_reservation_by_id()?,
            "12" => return Ok(Step::Exit),
            other => writeln!(self.output, "Unknown option '{}'.", other)?,
        }
        Ok(Step::Continue)
    }

    fn prompt(&mut self, label: &str) -> Result<String, InputError> {
        write!(self.output, "{}: ", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(InputError::Eof);
        }
        Ok(line.trim().to_string())
    }

    fn prompt_parsed<T: FromStr>(
        &mut self,
        label: &str,
        expected: &'static str,
    ) -> Result<T, InputError> {
        let value = self.prompt(label)?;
        value
            .parse()
            .map_err(|_| InputError::Invalid { value, expected })
    }

    fn report(&mut self, error: &HotelError) -> Result<(), InputError> {
        writeln!(self.output, "Error: {}", error)?;
        Ok(())
    }

    fn print_hotels(&mut self) -> Result<(), InputError> {
        if self.hotels.is_empty() {
            writeln!(self.output, "No hotels registered.")?;
        }
        for (position, hotel) in self.hotels.list_hotels() {
            writeln!(self.output, "{}. {}", position, hotel)?;
        }
        Ok(())
    }

    // Show the list, read a position and resolve it to a stable id
    fn choose_hotel(&mut self) -> Result<Option<HotelId>, InputError> {
        self.print_hotels()?;
        let index: usize = self.prompt_parsed("Hotel number", "hotel number")?;
        let id = self.hotels.hotel_id_at(index);
        if id.is_none() {
            writeln!(self.output, "Hotel not found.")?;
        }
        Ok(id)
    }

    fn create_hotel(&mut self) -> Result<(), InputError> {
        let name = self.prompt("Hotel name")?;
        let location = self.prompt("Hotel location")?;
        match self.hotels.create_hotel(name, location) {
            Ok((_, hotel)) => writeln!(
                self.output,
                "Hotel '{}' created in '{}'.",
                hotel.name, hotel.location
            )?,
            Err(e) => self.report(&e)?,
        }
        Ok(())
    }

    fn list_hotels(&mut self) -> Result<(), InputError> {
        writeln!(self.output, "Hotels:")?;
        self.print_hotels()
    }

    fn search_hotels_by_location(&mut self) -> Result<(), InputError> {
        let location = self.prompt("Location")?;
        let found = self.hotels.search_by_location(&location);
        if found.is_empty() {
            writeln!(self.output, "No hotels found in that location.")?;
        }
        for hotel in found {
            writeln!(self.output, "- {}", hotel)?;
        }
        Ok(())
    }

    fn delete_hotel(&mut self) -> Result<(), InputError> {
        self.print_hotels()?;
        let index: usize = self.prompt_parsed("Hotel number to delete", "hotel number")?;
        match self.hotels.delete_hotel(index) {
            Ok(hotel) => writeln!(self.output, "Hotel '{}' deleted.", hotel.name)?,
            Err(HotelError::IndexOutOfRange { .. }) => {
                writeln!(self.output, "Invalid hotel index.")?
            }
            Err(e) => self.report(&e)?,
        }
        Ok(())
    }

    fn create_room(&mut self) -> Result<(), InputError> {
        let Some(hotel) = self.choose_hotel()? else {
            return Ok(());
        };
        let number = self.prompt("Room number")?;
        let room_type = self.prompt("Room type")?;
        let capacity: u32 = self.prompt_parsed("Capacity", "capacity")?;
        let price: f64 = self.prompt_parsed("Price per night", "price")?;

        match self
            .rooms
            .create_room(self.hotels, hotel, number, room_type, capacity, price)
        {
            Ok(room) => writeln!(self.output, "Room {} created.", room.number)?,
            Err(e) => self.report(&e)?,
        }
        Ok(())
    }

    fn print_rooms(
        &mut self,
        hotel: HotelId,
        room_type: Option<&str>,
        max_price: Option<f64>,
    ) -> Result<(), InputError> {
        let Some(found) = self.hotels.hotel(hotel) else {
            writeln!(self.output, "Hotel not found.")?;
            return Ok(());
        };

        let rooms = match (room_type, max_price) {
            (Some(room_type), Some(max_price)) => self
                .rooms
                .search_by_hotel_type_and_price(found, room_type, max_price),
            (Some(room_type), None) => self.rooms.search_by_hotel_and_type(found, room_type),
            _ => self.rooms.search_by_hotel(found).iter().collect(),
        };

        if rooms.is_empty() {
            writeln!(self.output, "No matching rooms found for this hotel.")?;
            return Ok(());
        }
        writeln!(self.output, "Rooms of {}:", found)?;
        for room in rooms {
            writeln!(self.output, "{}", room)?;
        }
        Ok(())
    }

    fn list_rooms(&mut self) -> Result<(), InputError> {
        match self.choose_hotel()? {
            Some(hotel) => self.print_rooms(hotel, None, None),
            None => Ok(()),
        }
    }

    fn list_rooms_by_type(&mut self) -> Result<(), InputError> {
        let Some(hotel) = self.choose_hotel()? else {
            return Ok(());
        };
        let room_type = self.prompt("Room type")?;
        self.print_rooms(hotel, Some(&room_type), None)
    }

    fn list_rooms_by_type_and_price(&mut self) -> Result<(), InputError> {
        let Some(hotel) = self.choose_hotel()? else {
            return Ok(());
        };
        let room_type = self.prompt("Room type")?;
        let max_price: f64 = self.prompt_parsed("Maximum price per night", "price")?;
        self.print_rooms(hotel, Some(&room_type), Some(max_price))
    }

    fn create_reservation(&mut self) -> Result<(), InputError> {
        let Some(hotel) = self.choose_hotel()? else {
            return Ok(());
        };
        self.print_rooms(hotel, None, None)?;

        let number = RoomNumber::new(self.prompt("Room number")?);
        let known = self
            .hotels
            .hotel(hotel)
            .and_then(|found| self.rooms.get_room_by_number(found, &number))
            .is_some();
        if !known {
            writeln!(self.output, "Room not found.")?;
            return Ok(());
        }

        let guest_name = self.prompt("Guest name")?;
        match self.hotels.create_reservation(hotel, &number, &guest_name) {
            Ok(Booking::Created(reservation)) => writeln!(
                self.output,
                "Reservation created. Reservation id: {}",
                reservation.reservation_id
            )?,
            Ok(Booking::Existing(reservation)) => writeln!(
                self.output,
                "Room {} is already reserved for {}. Reservation id: {}",
                number, reservation.guest_name, reservation.reservation_id
            )?,
            Err(e) => self.report(&e)?,
        }
        Ok(())
    }

    fn list_reservations(&mut self) -> Result<(), InputError> {
        let Some(hotel) = self.choose_hotel()? else {
            return Ok(());
        };
        let Some(found) = self.hotels.hotel(hotel) else {
            return Ok(());
        };
        let reservations = self
            .hotels
            .search_reservations_by_hotel(hotel)
            .unwrap_or_default();

        if reservations.is_empty() {
            writeln!(self.output, "No reservations found for this hotel.")?;
        }
        for reservation in reservations {
            let room = found
                .room_for(reservation)
                .map(|room| room.number.to_string())
                .unwrap_or_else(|| "?".to_string());
            writeln!(
                self.output,
                "ID: {}, guest: {}, room: {}",
                reservation.reservation_id, reservation.guest_name, room
            )?;
        }
        Ok(())
    }

    fn find_reservation_by_id(&mut self) -> Result<(), InputError> {
        let reservation_id: u32 = self.prompt_parsed("Reservation id", "reservation id")?;
        let Some((hotel, reservation)) = self.hotels.search_reservation_by_id(reservation_id)
        else {
            writeln!(self.output, "Reservation not found.")?;
            return Ok(());
        };

        let room = hotel
            .room_for(reservation)
            .map(|room| room.number.to_string())
            .unwrap_or_else(|| "?".to_string());
        writeln!(
            self.output,
            "ID: {}, guest: {}, room: {}, hotel: {}",
            reservation.reservation_id, reservation.guest_name, room, hotel
        )?;

        let others = self.hotels.reservations_with_id(reservation_id).len() - 1;
        if others > 0 {
            writeln!(
                self.output,
                "Note: reservation id {} also exists in {} other hotel(s).",
                reservation_id, others
            )?;
        }
        Ok(())
    }
}
