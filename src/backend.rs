use crate::{
    error::BackendError,
    types::{NewReservation, OwnedReservation, Reservation, Room},
};
use chrono::NaiveDate;
use uuid::Uuid;

pub trait ReservationBackend: Clone + Send + Sync + 'static {
    /// All rooms, ordered by name.
    fn rooms(&self) -> Result<Vec<Room>, BackendError>;
    /// Active reservations of one room on one date, ordered by start time.
    fn active_reservations(
        &self,
        room_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>, BackendError>;
    /// Active reservations of one owner with their room, newest date first.
    fn reservations_of_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<OwnedReservation>, BackendError>;
    fn create_reservation(&self, reservation: NewReservation)
        -> Result<Reservation, BackendError>;
    fn cancel_reservation(&self, id: Uuid) -> Result<(), BackendError>;
}
