use crate::{
    backend::ReservationBackend,
    error::BackendError,
    types::{NewReservation, OwnedReservation, Reservation, ReservationStatus, Room},
};
use chrono::NaiveDate;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tracing::{error, info};
use uuid::Uuid;

/// Non-persistent reservation store used when no database is configured.
#[derive(Debug, Clone, Default)]
pub struct LocalReservations {
    rooms: Arc<Mutex<Vec<Room>>>,
    reservations: Arc<Mutex<HashMap<Uuid, Reservation>>>,
}

impl LocalReservations {
    pub fn with_example_rooms() -> Self {
        let local_reservations = Self::default();
        let examples = [
            ("Sala Estudio 1", "Campus Central", 4, "Grupal", true, true),
            ("Sala Estudio 2", "Campus Central", 6, "Grupal", false, true),
            ("Sala Silenciosa A", "Campus Norte", 2, "Individual", true, false),
            ("Sala Multimedia", "Campus Norte", 8, "Multimedia", true, true),
            ("Cubículo 3", "Campus Sur", 2, "Individual", false, false),
        ];
        for (name, campus, capacity, room_type, accessible_seating, power_outlets) in examples {
            local_reservations.add_room(Room {
                id: Uuid::new_v4(),
                name: name.into(),
                campus: campus.into(),
                capacity,
                room_type: room_type.into(),
                accessible_seating,
                power_outlets,
            });
        }
        local_reservations
    }

    pub fn add_room(&self, room: Room) {
        info!(room = %room.name, "Adding room");
        let mut rooms = lock(&self.rooms);
        rooms.push(room);
        rooms.sort_by(|a, b| a.name.cmp(&b.name));
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ReservationBackend for LocalReservations {
    fn rooms(&self) -> Result<Vec<Room>, BackendError> {
        Ok(lock(&self.rooms).clone())
    }

    fn active_reservations(
        &self,
        room_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>, BackendError> {
        let mut reservations: Vec<Reservation> = lock(&self.reservations)
            .values()
            .filter(|reservation| {
                reservation.room_id == room_id
                    && reservation.date == date
                    && reservation.is_active()
            })
            .cloned()
            .collect();
        reservations.sort_unstable_by_key(|reservation| reservation.start_time);
        Ok(reservations)
    }

    fn reservations_of_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<OwnedReservation>, BackendError> {
        let rooms = lock(&self.rooms);
        let mut reservations: Vec<OwnedReservation> = lock(&self.reservations)
            .values()
            .filter(|reservation| reservation.owner_id == owner_id && reservation.is_active())
            .filter_map(|reservation| {
                let room = rooms.iter().find(|room| room.id == reservation.room_id)?;
                Some(OwnedReservation {
                    reservation: reservation.clone(),
                    room_name: room.name.clone(),
                    campus: room.campus.clone(),
                })
            })
            .collect();
        reservations.sort_unstable_by(|a, b| {
            b.reservation
                .date
                .cmp(&a.reservation.date)
                .then_with(|| a.reservation.start_time.cmp(&b.reservation.start_time))
        });
        Ok(reservations)
    }

    fn create_reservation(
        &self,
        reservation: NewReservation,
    ) -> Result<Reservation, BackendError> {
        if !lock(&self.rooms)
            .iter()
            .any(|room| room.id == reservation.room_id)
        {
            let err = "Room does not exist and can't therefore be reserved";
            error!(room_id = %reservation.room_id, "{err}");
            return Err(BackendError::new(err));
        }

        let reservation = Reservation {
            id: Uuid::new_v4(),
            room_id: reservation.room_id,
            date: reservation.date,
            start_time: reservation.start_time,
            end_time: reservation.end_time,
            status: ReservationStatus::Active,
            owner_id: reservation.owner_id,
        };
        lock(&self.reservations).insert(reservation.id, reservation.clone());
        Ok(reservation)
    }

    fn cancel_reservation(&self, id: Uuid) -> Result<(), BackendError> {
        match lock(&self.reservations).get_mut(&id) {
            Some(reservation) => {
                reservation.status = ReservationStatus::Cancelled;
                Ok(())
            }
            None => {
                let err = "Reservation does not exist and can't therefore be cancelled";
                error!(%id, "{err}");
                Err(BackendError::new(err))
            }
        }
    }
}
