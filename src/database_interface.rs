use crate::schema::{reservations, rooms};
use crate::{
    backend::ReservationBackend,
    error::BackendError,
    types::{NewReservation, OwnedReservation, Reservation, ReservationStatus, Room},
};
use chrono::{NaiveDate, NaiveTime};
use diesel::prelude::*;
use diesel::{ConnectionError, PgConnection};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::error;
use uuid::Uuid;

#[derive(Queryable, Selectable)]
#[diesel(table_name = rooms)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct RoomRow {
    id: Uuid,
    name: String,
    campus: String,
    capacity: i32,
    room_type: String,
    accessible_seating: bool,
    power_outlets: bool,
}

impl From<RoomRow> for Room {
    fn from(row: RoomRow) -> Self {
        Room {
            id: row.id,
            name: row.name,
            campus: row.campus,
            capacity: row.capacity,
            room_type: row.room_type,
            accessible_seating: row.accessible_seating,
            power_outlets: row.power_outlets,
        }
    }
}

#[derive(Queryable, Selectable, Insertable)]
#[diesel(table_name = reservations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct ReservationRow {
    id: Uuid,
    room_id: Uuid,
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    status: String,
    owner_id: Uuid,
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = BackendError;

    fn try_from(row: ReservationRow) -> Result<Self, Self::Error> {
        Ok(Reservation {
            id: row.id,
            room_id: row.room_id,
            date: row.date,
            start_time: row.start_time,
            end_time: row.end_time,
            status: row.status.parse().map_err(BackendError)?,
            owner_id: row.owner_id,
        })
    }
}

fn into_reservations(rows: Vec<ReservationRow>) -> Result<Vec<Reservation>, BackendError> {
    rows.into_iter().map(Reservation::try_from).collect()
}

fn database_error(context: &str) -> impl Fn(diesel::result::Error) -> BackendError + '_ {
    move |err| {
        error!(%err, "{context}");
        BackendError::new(format!("Database Error. {context}"))
    }
}

#[derive(Clone)]
pub struct DatabaseInterface {
    connection: Arc<Mutex<PgConnection>>,
}

impl DatabaseInterface {
    pub fn new(database_url: &str) -> Result<Self, ConnectionError> {
        let connection = Self::establish_connection(database_url)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    fn establish_connection(database_url: &str) -> Result<PgConnection, ConnectionError> {
        PgConnection::establish(database_url)
    }

    fn connection(&self) -> MutexGuard<'_, PgConnection> {
        self.connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl ReservationBackend for DatabaseInterface {
    fn rooms(&self) -> Result<Vec<Room>, BackendError> {
        let mut connection = self.connection();
        let rows = rooms::table
            .order(rooms::name.asc())
            .select(RoomRow::as_select())
            .load(&mut *connection)
            .map_err(database_error("Failed to read rooms"))?;
        Ok(rows.into_iter().map(Room::from).collect())
    }

    fn active_reservations(
        &self,
        room_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>, BackendError> {
        let mut connection = self.connection();
        let rows = reservations::table
            .filter(reservations::room_id.eq(room_id))
            .filter(reservations::date.eq(date))
            .filter(reservations::status.eq(ReservationStatus::Active.as_str()))
            .order(reservations::start_time.asc())
            .select(ReservationRow::as_select())
            .load(&mut *connection)
            .map_err(database_error("Failed to read reservations"))?;
        into_reservations(rows)
    }

    fn reservations_of_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<OwnedReservation>, BackendError> {
        let mut connection = self.connection();
        let rows = reservations::table
            .inner_join(rooms::table)
            .filter(reservations::owner_id.eq(owner_id))
            .filter(reservations::status.eq(ReservationStatus::Active.as_str()))
            .order((reservations::date.desc(), reservations::start_time.asc()))
            .select((ReservationRow::as_select(), rooms::name, rooms::campus))
            .load::<(ReservationRow, String, String)>(&mut *connection)
            .map_err(database_error("Failed to read reservations"))?;

        rows.into_iter()
            .map(|(row, room_name, campus)| {
                Ok(OwnedReservation {
                    reservation: Reservation::try_from(row)?,
                    room_name,
                    campus,
                })
            })
            .collect()
    }

    fn create_reservation(
        &self,
        reservation: NewReservation,
    ) -> Result<Reservation, BackendError> {
        let mut connection = self.connection();
        let row = ReservationRow {
            id: Uuid::new_v4(),
            room_id: reservation.room_id,
            date: reservation.date,
            start_time: reservation.start_time,
            end_time: reservation.end_time,
            status: ReservationStatus::Active.as_str().into(),
            owner_id: reservation.owner_id,
        };

        let row = diesel::insert_into(reservations::table)
            .values(&row)
            .returning(ReservationRow::as_returning())
            .get_result(&mut *connection)
            .map_err(database_error("Reservation can't be created"))?;
        Reservation::try_from(row)
    }

    fn cancel_reservation(&self, id: Uuid) -> Result<(), BackendError> {
        let mut connection = self.connection();
        let result = diesel::update(reservations::table.find(id))
            .set(reservations::status.eq(ReservationStatus::Cancelled.as_str()))
            .execute(&mut *connection)
            .map_err(database_error("Cancellation of reservation failed"))?;

        if result == 0 {
            error!(%id, "Cancellation failed. 0 database lines were changed");
            return Err(BackendError::new(
                "Database Error. Cancellation of reservation failed",
            ));
        }
        Ok(())
    }
}
