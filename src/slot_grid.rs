use crate::types::{Reservation, TimeSlot};
use chrono::{Duration, NaiveDate, NaiveTime, Timelike};
use uuid::Uuid;

pub const OPENING_HOUR: u32 = 8;
pub const CLOSING_HOUR: u32 = 20;
pub const SLOT_MINUTES: i64 = 30;
pub const SLOTS_PER_DAY: usize = ((CLOSING_HOUR - OPENING_HOUR) * 60 / SLOT_MINUTES as u32) as usize;

pub fn slot_duration() -> Duration {
    Duration::minutes(SLOT_MINUTES)
}

fn opening_time() -> NaiveTime {
    NaiveTime::from_hms_opt(OPENING_HOUR, 0, 0).unwrap_or_default()
}

pub fn slot_starts() -> Vec<NaiveTime> {
    let opening = opening_time();
    (0..SLOTS_PER_DAY as i32)
        .map(|index| opening + slot_duration() * index)
        .collect()
}

pub fn is_slot_start(time: NaiveTime) -> bool {
    time.second() == 0
        && time.nanosecond() == 0
        && time.minute() as i64 % SLOT_MINUTES == 0
        && (OPENING_HOUR..CLOSING_HOUR).contains(&time.hour())
}

/// Builds the day grid for `room_id` on `date`.
///
/// A slot is blocked when an active reservation of that room and date
/// contains the slot's start instant. Reservations for other rooms, other
/// dates or with a cancelled status are skipped, so the full reservation
/// list of a day can be passed in.
pub fn generate_slots(room_id: Uuid, date: NaiveDate, reservations: &[Reservation]) -> Vec<TimeSlot> {
    let relevant: Vec<&Reservation> = reservations
        .iter()
        .filter(|reservation| {
            reservation.room_id == room_id && reservation.date == date && reservation.is_active()
        })
        .collect();

    slot_starts()
        .into_iter()
        .map(|start| TimeSlot {
            start,
            available: !relevant.iter().any(|reservation| reservation.covers(start)),
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::ReservationStatus;

    fn time(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn reservation(room_id: Uuid, start: NaiveTime, end: NaiveTime) -> Reservation {
        Reservation {
            id: Uuid::new_v4(),
            room_id,
            date: day(),
            start_time: start,
            end_time: end,
            status: ReservationStatus::Active,
            owner_id: Uuid::new_v4(),
        }
    }

    fn unavailable(slots: &[TimeSlot]) -> Vec<NaiveTime> {
        slots
            .iter()
            .filter(|slot| !slot.available)
            .map(|slot| slot.start)
            .collect()
    }

    #[test]
    fn empty_day_has_24_ordered_free_slots() {
        let slots = generate_slots(Uuid::new_v4(), day(), &[]);

        assert_eq!(slots.len(), 24);
        assert_eq!(slots.first().unwrap().start, time(8, 0));
        assert_eq!(slots.last().unwrap().start, time(19, 30));
        assert!(slots.iter().all(|slot| slot.available));
        for pair in slots.windows(2) {
            assert_eq!(pair[1].start - pair[0].start, Duration::minutes(30));
        }
    }

    #[test]
    fn reservation_blocks_the_slots_it_contains() {
        let room_id = Uuid::new_v4();
        let reservations = vec![reservation(room_id, time(9, 0), time(10, 0))];

        let slots = generate_slots(room_id, day(), &reservations);

        assert_eq!(slots.len(), 24);
        assert_eq!(unavailable(&slots), vec![time(9, 0), time(9, 30)]);
    }

    #[test_case::test_case(time(9, 0), time(10, 0), time(10, 0), true ; "ending at slot start leaves it free")]
    #[test_case::test_case(time(10, 0), time(11, 0), time(10, 0), false ; "starting at slot start blocks it")]
    #[test_case::test_case(time(9, 10), time(9, 50), time(9, 0), true ; "mid slot start does not block earlier slot")]
    #[test_case::test_case(time(9, 10), time(9, 50), time(9, 30), false ; "slot start inside reservation is blocked")]
    #[test_case::test_case(time(19, 30), time(20, 0), time(19, 30), false ; "last slot of the day")]
    #[test_case::test_case(NaiveTime::from_hms_opt(9, 30, 30).unwrap(), time(10, 0), time(9, 30), false ; "seconds on start are dropped")]
    #[test_case::test_case(time(9, 0), NaiveTime::from_hms_opt(10, 0, 30).unwrap(), time(10, 0), true ; "seconds on end are dropped")]
    fn point_in_interval(start: NaiveTime, end: NaiveTime, slot: NaiveTime, expected_available: bool) {
        let room_id = Uuid::new_v4();
        let reservations = vec![reservation(room_id, start, end)];

        let slots = generate_slots(room_id, day(), &reservations);
        let slot = slots.iter().find(|s| s.start == slot).unwrap();

        assert_eq!(slot.available, expected_available);
    }

    #[test]
    fn foreign_and_cancelled_reservations_are_ignored() {
        let room_id = Uuid::new_v4();
        let mut cancelled = reservation(room_id, time(8, 0), time(9, 0));
        cancelled.status = ReservationStatus::Cancelled;
        let other_room = reservation(Uuid::new_v4(), time(12, 0), time(13, 0));
        let mut other_day = reservation(room_id, time(14, 0), time(15, 0));
        other_day.date = day().succ_opt().unwrap();

        let slots = generate_slots(room_id, day(), &[cancelled, other_room, other_day]);

        assert!(slots.iter().all(|slot| slot.available));
    }

    #[test_case::test_case(time(8, 0), true)]
    #[test_case::test_case(time(19, 30), true)]
    #[test_case::test_case(time(20, 0), false)]
    #[test_case::test_case(time(7, 30), false)]
    #[test_case::test_case(time(9, 15), false)]
    #[test_case::test_case(NaiveTime::from_hms_opt(9, 0, 1).unwrap(), false)]
    fn slot_start_detection(candidate: NaiveTime, expected: bool) {
        assert_eq!(is_slot_start(candidate), expected);
    }
}
