//! Watering task derivation
//!
//! Turns the current plant and room records into an urgency-ordered list of
//! watering tasks. Tasks are never stored; they are rebuilt on every read.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use crate::dates::{add_days, days_overdue, is_due_by_today, start_of_day};
use crate::models::{Plant, Room};

/// Anything with a due date that can be bucketed into "Today" / "Soon"
pub trait Scheduled {
    fn due_date(&self) -> DateTime<Utc>;

    fn days_overdue(&self) -> u32;
}

/// A plant that needs (or will need) watering
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WateringTask {
    pub plant_id: Uuid,
    pub plant: Plant,
    pub room: Room,
    pub days_overdue: u32,
    pub is_overdue: bool,
    pub next_watering_date: DateTime<Utc>,
}

impl Scheduled for WateringTask {
    fn due_date(&self) -> DateTime<Utc> {
        self.next_watering_date
    }

    fn days_overdue(&self) -> u32 {
        self.days_overdue
    }
}

/// Tasks split by due day; each side keeps the input order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskBuckets<T> {
    pub today: Vec<T>,
    pub soon: Vec<T>,
}

/// When a plant is next due for water.
///
/// A plant that has never been watered is due at the start of today.
pub fn next_watering_date(
    last_watered: Option<DateTime<Utc>>,
    frequency_days: u32,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    match last_watered {
        Some(last) => add_days(last, frequency_days),
        None => start_of_day(now),
    }
}

/// Build watering tasks for every plant whose room can be resolved.
///
/// Plants without a room, or pointing at a room that no longer exists, are
/// skipped. The result is ordered most-overdue first; ties keep plant order.
pub fn derive_watering_tasks(
    plants: &[Plant],
    rooms_by_id: &HashMap<Uuid, Room>,
    now: DateTime<Utc>,
) -> Vec<WateringTask> {
    let mut tasks: Vec<WateringTask> = plants
        .iter()
        .filter_map(|plant| {
            let room = plant.room_id.and_then(|id| rooms_by_id.get(&id));
            let Some(room) = room else {
                debug!(plant_id = %plant.id, "Skipping plant without a resolvable room");
                return None;
            };

            let next = next_watering_date(
                plant.last_watered_date,
                plant.watering_frequency_days,
                now,
            );
            let overdue = days_overdue(next, now);

            Some(WateringTask {
                plant_id: plant.id,
                plant: plant.clone(),
                room: room.clone(),
                days_overdue: overdue,
                is_overdue: overdue > 0,
                next_watering_date: next,
            })
        })
        .collect();

    sort_by_urgency(&mut tasks);
    tasks
}

/// Stable sort, most overdue first
pub fn sort_by_urgency<T: Scheduled>(tasks: &mut [T]) {
    tasks.sort_by(|a, b| b.days_overdue().cmp(&a.days_overdue()));
}

/// Split tasks into those due by the end of today and those due later
pub fn partition_by_due<T: Scheduled>(tasks: Vec<T>, now: DateTime<Utc>) -> TaskBuckets<T> {
    let (today, soon): (Vec<T>, Vec<T>) = tasks
        .into_iter()
        .partition(|task| is_due_by_today(task.due_date(), now));

    TaskBuckets { today, soon }
}
