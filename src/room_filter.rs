use crate::types::Room;
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RoomFilter {
    #[validate(length(min = 1, max = 100))]
    pub campus: Option<String>,
    #[validate(range(min = 1, max = 500))]
    pub min_capacity: Option<i32>,
    #[serde(default)]
    pub accessible: bool,
    #[serde(default)]
    pub power: bool,
}

impl RoomFilter {
    pub fn matches(&self, room: &Room) -> bool {
        self.campus
            .as_ref()
            .map_or(true, |campus| room.campus == *campus)
            && self
                .min_capacity
                .map_or(true, |min_capacity| room.capacity >= min_capacity)
            && (!self.accessible || room.accessible_seating)
            && (!self.power || room.power_outlets)
    }

    pub fn apply(&self, rooms: &[Room]) -> Vec<Room> {
        rooms
            .iter()
            .filter(|room| self.matches(room))
            .cloned()
            .collect()
    }
}

/// Distinct campuses in order of first appearance.
pub fn campuses(rooms: &[Room]) -> Vec<String> {
    let mut campuses: Vec<String> = Vec::new();
    for room in rooms {
        if !campuses.contains(&room.campus) {
            campuses.push(room.campus.clone());
        }
    }
    campuses
}
