use crate::{error::SelectionError, slot_grid};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Four slots of 30 minutes, i.e. two hours per reservation.
pub const MAX_SLOTS_PER_BOOKING: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Toggle {
    Added,
    Removed,
}

/// Slots a user has picked per room while preparing a booking.
#[derive(Debug, Clone, Default)]
pub struct SlotSelection {
    slots: HashMap<Uuid, Vec<NaiveTime>>,
}

impl SlotSelection {
    pub fn selected(&self, room_id: Uuid) -> &[NaiveTime] {
        self.slots.get(&room_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_selected(&self, room_id: Uuid, slot: NaiveTime) -> bool {
        self.selected(room_id).contains(&slot)
    }

    /// Selects `slot` for `room_id`, or deselects it if already selected.
    ///
    /// Deselecting never fails and may leave a gap. Selecting is refused
    /// when the slot is taken, when the booking cap is reached or when the
    /// result would not be a consecutive run. A refused toggle leaves the
    /// selection untouched.
    pub fn toggle(
        &mut self,
        room_id: Uuid,
        slot: NaiveTime,
        available: bool,
    ) -> Result<Toggle, SelectionError> {
        if !slot_grid::is_slot_start(slot) {
            return Err(SelectionError::InvalidSlot(slot));
        }

        let current = self.selected(room_id);
        if current.contains(&slot) {
            if let Some(slots) = self.slots.get_mut(&room_id) {
                slots.retain(|selected| *selected != slot);
            }
            return Ok(Toggle::Removed);
        }

        if !available {
            return Err(SelectionError::SlotUnavailable(slot));
        }
        if current.len() >= MAX_SLOTS_PER_BOOKING {
            return Err(SelectionError::LimitReached);
        }

        let mut candidate = current.to_vec();
        candidate.push(slot);
        candidate.sort_unstable();
        if !are_consecutive(&candidate) {
            return Err(SelectionError::NotConsecutive);
        }

        self.slots.insert(room_id, candidate);
        Ok(Toggle::Added)
    }

    pub fn clear(&mut self, room_id: Uuid) {
        self.slots.remove(&room_id);
    }
}

pub fn are_consecutive(slots: &[NaiveTime]) -> bool {
    let mut sorted = slots.to_vec();
    sorted.sort_unstable();
    sorted
        .windows(2)
        .all(|pair| pair[1] - pair[0] == slot_grid::slot_duration())
}
