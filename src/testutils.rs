use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc, Mutex,
};

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    backend::ReservationBackend,
    error::BackendError,
    types::{NewReservation, OwnedReservation, Reservation, ReservationStatus, Room},
};

pub struct MockReservationBackendInner {
    pub success: AtomicBool,
    pub calls_to_rooms: AtomicU64,
    pub calls_to_active_reservations: AtomicU64,
    pub calls_to_reservations_of_owner: AtomicU64,
    pub calls_to_create_reservation: AtomicU64,
    pub calls_to_cancel_reservation: AtomicU64,
    pub rooms: Mutex<Vec<Room>>,
    pub reservations: Mutex<Vec<Reservation>>,
    pub created: Mutex<Vec<NewReservation>>,
}

#[derive(Clone)]
pub struct MockReservationBackend(pub Arc<MockReservationBackendInner>);

impl MockReservationBackendInner {
    fn new() -> Self {
        Self {
            success: AtomicBool::new(true),
            calls_to_rooms: AtomicU64::default(),
            calls_to_active_reservations: AtomicU64::default(),
            calls_to_reservations_of_owner: AtomicU64::default(),
            calls_to_create_reservation: AtomicU64::default(),
            calls_to_cancel_reservation: AtomicU64::default(),
            rooms: Mutex::default(),
            reservations: Mutex::default(),
            created: Mutex::default(),
        }
    }
}

impl MockReservationBackend {
    pub fn new() -> Self {
        Self(Arc::new(MockReservationBackendInner::new()))
    }

    pub fn with_room(room: Room) -> Self {
        let backend = Self::new();
        backend.0.rooms.lock().unwrap().push(room);
        backend
    }

    pub fn fail(&self) {
        self.0.success.store(false, Ordering::SeqCst);
    }

    pub fn calls_to_rooms(&self) -> u64 {
        self.0.calls_to_rooms.load(Ordering::SeqCst)
    }

    pub fn calls_to_active_reservations(&self) -> u64 {
        self.0.calls_to_active_reservations.load(Ordering::SeqCst)
    }

    pub fn calls_to_reservations_of_owner(&self) -> u64 {
        self.0.calls_to_reservations_of_owner.load(Ordering::SeqCst)
    }

    /// Reservations handed to `create_reservation`, in call order.
    pub fn created(&self) -> Vec<NewReservation> {
        self.0.created.lock().unwrap().clone()
    }

    pub fn calls_to_create_reservation(&self) -> u64 {
        self.0.calls_to_create_reservation.load(Ordering::SeqCst)
    }

    pub fn calls_to_cancel_reservation(&self) -> u64 {
        self.0.calls_to_cancel_reservation.load(Ordering::SeqCst)
    }

    fn result(&self) -> Result<(), BackendError> {
        match self.0.success.load(Ordering::SeqCst) {
            true => Ok(()),
            false => Err(BackendError::new("Supposed to fail")),
        }
    }
}

pub fn example_room() -> Room {
    Room {
        id: Uuid::new_v4(),
        name: "Sala Estudio 1".into(),
        campus: "Campus Central".into(),
        capacity: 4,
        room_type: "Grupal".into(),
        accessible_seating: true,
        power_outlets: true,
    }
}

impl ReservationBackend for MockReservationBackend {
    fn rooms(&self) -> Result<Vec<Room>, BackendError> {
        self.0.calls_to_rooms.fetch_add(1, Ordering::SeqCst);
        self.result()?;
        Ok(self.0.rooms.lock().unwrap().clone())
    }

    fn active_reservations(
        &self,
        room_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>, BackendError> {
        self.0
            .calls_to_active_reservations
            .fetch_add(1, Ordering::SeqCst);
        self.result()?;
        Ok(self
            .0
            .reservations
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.room_id == room_id && r.date == date && r.is_active())
            .cloned()
            .collect())
    }

    fn reservations_of_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<OwnedReservation>, BackendError> {
        self.0
            .calls_to_reservations_of_owner
            .fetch_add(1, Ordering::SeqCst);
        self.result()?;
        let rooms = self.0.rooms.lock().unwrap();
        Ok(self
            .0
            .reservations
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.owner_id == owner_id && r.is_active())
            .filter_map(|r| {
                let room = rooms.iter().find(|room| room.id == r.room_id)?;
                Some(OwnedReservation {
                    reservation: r.clone(),
                    room_name: room.name.clone(),
                    campus: room.campus.clone(),
                })
            })
            .collect())
    }

    fn create_reservation(
        &self,
        reservation: NewReservation,
    ) -> Result<Reservation, BackendError> {
        self.0
            .calls_to_create_reservation
            .fetch_add(1, Ordering::SeqCst);
        self.result()?;
        self.0.created.lock().unwrap().push(reservation.clone());
        let reservation = Reservation {
            id: Uuid::new_v4(),
            room_id: reservation.room_id,
            date: reservation.date,
            start_time: reservation.start_time,
            end_time: reservation.end_time,
            status: ReservationStatus::Active,
            owner_id: reservation.owner_id,
        };
        self.0.reservations.lock().unwrap().push(reservation.clone());
        Ok(reservation)
    }

    fn cancel_reservation(&self, id: Uuid) -> Result<(), BackendError> {
        self.0
            .calls_to_cancel_reservation
            .fetch_add(1, Ordering::SeqCst);
        self.result()?;
        for reservation in self.0.reservations.lock().unwrap().iter_mut() {
            if reservation.id == id {
                reservation.status = ReservationStatus::Cancelled;
            }
        }
        Ok(())
    }
}
