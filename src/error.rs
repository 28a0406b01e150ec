use crate::selection::MAX_SLOTS_PER_BOOKING;
use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("{0} is not a bookable slot start")]
    InvalidSlot(NaiveTime),
    #[error("Slot {0} is already reserved")]
    SlotUnavailable(NaiveTime),
    #[error("At most {} slots (2 hours) can be booked at once", MAX_SLOTS_PER_BOOKING)]
    LimitReached,
    #[error("Selected slots must be consecutive")]
    NotConsecutive,
}

/// Failure reported by the reservation store. Not classified any further.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct BackendError(pub String);

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    #[error("At least one slot has to be selected")]
    EmptySelection,
    #[error("Reservations can't be made for a past date ({0})")]
    PastDate(NaiveDate),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl BookingError {
    /// Validation failures are raised before the backend is contacted.
    pub fn is_validation(&self) -> bool {
        !matches!(self, BookingError::Backend(_))
    }
}
