use crate::backend::ReservationBackend;
use crate::booking;
use crate::configuration::Configuration;
use crate::error::BookingError;
use crate::room_filter::{self, RoomFilter};
use crate::selection::{SlotSelection, Toggle};
use crate::slot_grid;
use crate::types::{OwnedReservation, Reservation, Room};
use axum::extract::{rejection::JsonRejection, Path, Query, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{extract::State, http::StatusCode, Extension, Json};
use axum::{
    routing::{get, post},
    Router,
};
use axum_valid::Valid;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use uuid::Uuid;

/// Header carrying the id of the caller, as issued by the identity provider.
pub const USER_ID_HEADER: &str = "x-user-id";

type HttpError = (StatusCode, String);

#[derive(Clone)]
pub struct AppState<B: ReservationBackend, C: Configuration> {
    backend: B,
    configuration: C,
    selections: Arc<Mutex<HashMap<Uuid, SlotSelection>>>,
}

impl<B: ReservationBackend, C: Configuration> AppState<B, C> {
    fn selections(&self) -> MutexGuard<'_, HashMap<Uuid, SlotSelection>> {
        self.selections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Clone, Copy)]
struct UserId(Uuid);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct HealthResponse {
    title: String,
    status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SlotQuery {
    date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SlotView {
    start: NaiveTime,
    available: bool,
    selected: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ToggleRequest {
    date: NaiveDate,
    #[serde(deserialize_with = "deserialize_slot")]
    slot: NaiveTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SelectionResponse {
    room_id: Uuid,
    toggle: Toggle,
    slots: Vec<NaiveTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SubmitRequest {
    date: NaiveDate,
}

/// Accepts both `HH:MM` and `HH:MM:SS`.
fn deserialize_slot<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
    let value = String::deserialize(deserializer)?;
    NaiveTime::parse_from_str(&value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(&value, "%H:%M"))
        .map_err(serde::de::Error::custom)
}

fn bad_request(rejection: JsonRejection) -> HttpError {
    (StatusCode::BAD_REQUEST, rejection.body_text())
}

fn error_response(err: BookingError) -> HttpError {
    let status = if err.is_validation() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, err.to_string())
}

pub fn create_app<B: ReservationBackend, C: Configuration>(backend: B, configuration: C) -> Router {
    let state = AppState {
        backend,
        configuration,
        selections: Arc::default(),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public = Router::new().route("/health", get(get_health::<B, C>));

    let user = Router::new()
        .route("/rooms", get(get_rooms::<B, C>))
        .route("/campuses", get(get_campuses::<B, C>))
        .route("/rooms/{room_id}/slots", get(get_slots::<B, C>))
        .route("/rooms/{room_id}/selection", post(toggle_slot::<B, C>))
        .route("/rooms/{room_id}/reservations", post(create_reservation::<B, C>))
        .route("/reservations", get(get_my_reservations::<B, C>))
        .route("/reservations/{reservation_id}/cancel", post(cancel_reservation::<B, C>))
        .route_layer(middleware::from_fn(identify_user));

    Router::new()
        .merge(public)
        .merge(user)
        .with_state(state)
        .layer(cors)
}

async fn identify_user(mut request: Request, next: Next) -> Result<Response, HttpError> {
    let Some(header) = request.headers().get(USER_ID_HEADER) else {
        return Err((StatusCode::UNAUTHORIZED, "Missing credentials".to_string()));
    };
    let Ok(user_id) = header.to_str().unwrap_or("").parse::<Uuid>() else {
        return Err((StatusCode::UNAUTHORIZED, "Unauthorized".to_string()));
    };
    request.extensions_mut().insert(UserId(user_id));
    Ok(next.run(request).await)
}

fn find_room<B: ReservationBackend>(backend: &B, room_id: Uuid) -> Result<Room, HttpError> {
    backend
        .rooms()
        .map_err(|err| error_response(err.into()))?
        .into_iter()
        .find(|room| room.id == room_id)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Room {room_id} does not exist")))
}

async fn get_health<B: ReservationBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        title: state.configuration.website_title(),
        status: "ok".into(),
    })
}

async fn get_rooms<B: ReservationBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Valid(Query(filter)): Valid<Query<RoomFilter>>,
) -> Result<Json<Vec<Room>>, HttpError> {
    let rooms = state
        .backend
        .rooms()
        .map_err(|err| error_response(err.into()))?;
    Ok(Json(filter.apply(&rooms)))
}

async fn get_campuses<B: ReservationBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
) -> Result<Json<Vec<String>>, HttpError> {
    let rooms = state
        .backend
        .rooms()
        .map_err(|err| error_response(err.into()))?;
    Ok(Json(room_filter::campuses(&rooms)))
}

async fn get_slots<B: ReservationBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Extension(UserId(user_id)): Extension<UserId>,
    Path(room_id): Path<Uuid>,
    Query(query): Query<SlotQuery>,
) -> Result<Json<Vec<SlotView>>, HttpError> {
    find_room(&state.backend, room_id)?;
    let reservations = state
        .backend
        .active_reservations(room_id, query.date)
        .map_err(|err| error_response(err.into()))?;

    let selections = state.selections();
    let selection = selections.get(&user_id);
    let slots = slot_grid::generate_slots(room_id, query.date, &reservations)
        .into_iter()
        .map(|slot| SlotView {
            start: slot.start,
            available: slot.available,
            selected: selection.is_some_and(|selection| selection.is_selected(room_id, slot.start)),
        })
        .collect();
    Ok(Json(slots))
}

async fn toggle_slot<B: ReservationBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Extension(UserId(user_id)): Extension<UserId>,
    Path(room_id): Path<Uuid>,
    request: Result<Json<ToggleRequest>, JsonRejection>,
) -> Result<Json<SelectionResponse>, HttpError> {
    let Json(request) = request.map_err(bad_request)?;
    booking::ensure_bookable_date(request.date, booking::today()).map_err(error_response)?;
    find_room(&state.backend, room_id)?;
    let reservations = state
        .backend
        .active_reservations(room_id, request.date)
        .map_err(|err| error_response(err.into()))?;
    let available = slot_grid::generate_slots(room_id, request.date, &reservations)
        .iter()
        .find(|slot| slot.start == request.slot)
        .map_or(true, |slot| slot.available);

    let mut selections = state.selections();
    let selection = selections.entry(user_id).or_default();
    let toggle = selection
        .toggle(room_id, request.slot, available)
        .map_err(|err| error_response(err.into()))?;

    Ok(Json(SelectionResponse {
        room_id,
        toggle,
        slots: selection.selected(room_id).to_vec(),
    }))
}

async fn create_reservation<B: ReservationBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Extension(UserId(user_id)): Extension<UserId>,
    Path(room_id): Path<Uuid>,
    request: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Reservation>), HttpError> {
    let Json(request) = request.map_err(bad_request)?;

    // Work on a copy so the shared map is not locked during the insert.
    let mut draft = state
        .selections()
        .get(&user_id)
        .cloned()
        .unwrap_or_default();
    let reservation = booking::submit(
        &state.backend,
        &mut draft,
        room_id,
        request.date,
        user_id,
        booking::today(),
    )
    .map_err(error_response)?;

    if let Some(selection) = state.selections().get_mut(&user_id) {
        selection.clear(room_id);
    }
    Ok((StatusCode::CREATED, Json(reservation)))
}

async fn get_my_reservations<B: ReservationBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Extension(UserId(user_id)): Extension<UserId>,
) -> Result<Json<Vec<OwnedReservation>>, HttpError> {
    booking::my_reservations(&state.backend, user_id)
        .map(Json)
        .map_err(error_response)
}

async fn cancel_reservation<B: ReservationBackend, C: Configuration>(
    State(state): State<AppState<B, C>>,
    Extension(UserId(user_id)): Extension<UserId>,
    Path(reservation_id): Path<Uuid>,
) -> Result<(StatusCode, String), HttpError> {
    info!(%user_id, %reservation_id, "Cancellation requested");
    match booking::cancel(&state.backend, reservation_id) {
        Ok(()) => Ok((
            StatusCode::OK,
            "Reservation cancelled successfully".to_string(),
        )),
        Err(err) => {
            error!(%err, "Cancellation failed");
            Err(error_response(err))
        }
    }
}
