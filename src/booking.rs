use crate::{
    backend::ReservationBackend,
    error::{BookingError, SelectionError},
    selection::{are_consecutive, SlotSelection},
    slot_grid,
    types::{NewReservation, OwnedReservation, Reservation},
};
use chrono::{Local, NaiveDate, NaiveTime};
use tracing::{error, info};
use uuid::Uuid;

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Dates before `today` can't be booked.
pub fn ensure_bookable_date(date: NaiveDate, today: NaiveDate) -> Result<(), BookingError> {
    if date < today {
        return Err(BookingError::PastDate(date));
    }
    Ok(())
}

/// Turns a run of slots into a single reservation covering all of them.
pub fn reservation_from_slots(
    room_id: Uuid,
    date: NaiveDate,
    owner_id: Uuid,
    slots: &[NaiveTime],
) -> Result<NewReservation, BookingError> {
    let (Some(first), Some(last)) = (slots.iter().min(), slots.iter().max()) else {
        return Err(BookingError::EmptySelection);
    };
    if !are_consecutive(slots) {
        return Err(SelectionError::NotConsecutive.into());
    }

    Ok(NewReservation {
        room_id,
        date,
        start_time: *first,
        end_time: *last + slot_grid::slot_duration(),
        owner_id,
    })
}

/// Books `slots` of `room_id` as one reservation.
///
/// Availability is not re-read here. Another session may have reserved
/// the same slots since the grid was computed, and the store has no
/// overlap constraint to catch it.
pub fn book_slots<B: ReservationBackend>(
    backend: &B,
    room_id: Uuid,
    date: NaiveDate,
    owner_id: Uuid,
    slots: &[NaiveTime],
    today: NaiveDate,
) -> Result<Reservation, BookingError> {
    ensure_bookable_date(date, today)?;
    let new_reservation = reservation_from_slots(room_id, date, owner_id, slots)?;

    let reservation = backend.create_reservation(new_reservation).map_err(|err| {
        error!(%room_id, %date, %err, "Reservation could not be created");
        err
    })?;
    info!(
        id = %reservation.id,
        %room_id,
        %date,
        start = %reservation.start_time,
        end = %reservation.end_time,
        "Reservation created"
    );
    Ok(reservation)
}

/// Books the slots currently selected for `room_id` and clears them on success.
pub fn submit<B: ReservationBackend>(
    backend: &B,
    selection: &mut SlotSelection,
    room_id: Uuid,
    date: NaiveDate,
    owner_id: Uuid,
    today: NaiveDate,
) -> Result<Reservation, BookingError> {
    let reservation = book_slots(
        backend,
        room_id,
        date,
        owner_id,
        selection.selected(room_id),
        today,
    )?;
    selection.clear(room_id);
    Ok(reservation)
}

pub fn cancel<B: ReservationBackend>(backend: &B, reservation_id: Uuid) -> Result<(), BookingError> {
    backend.cancel_reservation(reservation_id).map_err(|err| {
        error!(%reservation_id, %err, "Reservation could not be cancelled");
        err
    })?;
    info!(%reservation_id, "Reservation cancelled");
    Ok(())
}

pub fn my_reservations<B: ReservationBackend>(
    backend: &B,
    owner_id: Uuid,
) -> Result<Vec<OwnedReservation>, BookingError> {
    Ok(backend.reservations_of_owner(owner_id)?)
}
