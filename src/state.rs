//! Application state management
//!
//! In-memory record store for rooms, plants, catalog entries and care tasks.
//! Every write that touches a plant's attributes or catalog link refreshes its
//! watering frequency through the shared estimator.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};
use uuid::Uuid;

use crate::care::{
    derive_care_tasks, CareHistory, CareHistoryEntry, CareTask, CareTaskInput, CareTaskStatus,
    CareTaskType,
};
use crate::error::{AppError, AppResult};
use crate::frequency;
use crate::models::{
    BaseNeed, CatalogEntry, CatalogEntryInput, Plant, PlantInput, Room, RoomInput,
};
use crate::tasks::{derive_watering_tasks, next_watering_date, WateringTask};

/// Result of recomputing a single plant's schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recomputed {
    pub watering_frequency_days: u32,
    pub next_watering_date: DateTime<Utc>,
}

/// Central application state
#[derive(Debug)]
pub struct AppState {
    rooms: HashMap<Uuid, Room>,
    /// Kept in insertion order so task ties stay stable
    plants: Vec<Plant>,
    catalog: HashMap<Uuid, CatalogEntry>,
    care_tasks: Vec<CareTask>,
    history: CareHistory,
    start_time: DateTime<Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new() -> Self {
        info!("Initializing application state");
        Self {
            rooms: HashMap::new(),
            plants: Vec::new(),
            catalog: HashMap::new(),
            care_tasks: Vec::new(),
            history: CareHistory::new(),
            start_time: Utc::now(),
        }
    }

    // ------------------------------------------------------------------
    // Rooms
    // ------------------------------------------------------------------

    pub fn add_room(&mut self, input: RoomInput, now: DateTime<Utc>) -> Room {
        let room = Room::new(input.name, input.settings, now);
        info!(room_id = %room.id, name = %room.name, "Room created");
        self.rooms.insert(room.id, room.clone());
        room
    }

    pub fn get_room(&self, id: Uuid) -> AppResult<&Room> {
        self.rooms
            .get(&id)
            .ok_or_else(|| AppError::NotFound(format!("Room {} not found", id)))
    }

    /// Rooms sorted by creation time, ties broken by id
    pub fn list_rooms(&self) -> Vec<&Room> {
        let mut rooms: Vec<&Room> = self.rooms.values().collect();
        rooms.sort_by_key(|r| (r.created_at, r.id));
        rooms
    }

    pub fn update_room(&mut self, id: Uuid, input: RoomInput) -> AppResult<Room> {
        let room = self
            .rooms
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Room {} not found", id)))?;
        room.name = input.name;
        room.settings = input.settings;
        debug!(room_id = %id, "Room updated");
        Ok(room.clone())
    }

    /// Remove a room. Plants that reference it are left as they are; their
    /// watering tasks are dropped until they are moved to another room.
    pub fn remove_room(&mut self, id: Uuid) -> AppResult<Room> {
        let room = self
            .rooms
            .remove(&id)
            .ok_or_else(|| AppError::NotFound(format!("Room {} not found", id)))?;
        let orphaned = self.plants.iter().filter(|p| p.room_id == Some(id)).count();
        info!(room_id = %id, orphaned_plants = orphaned, "Room removed");
        Ok(room)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    // ------------------------------------------------------------------
    // Catalog
    // ------------------------------------------------------------------

    pub fn add_catalog_entry(&mut self, input: CatalogEntryInput) -> CatalogEntry {
        let entry = CatalogEntry::from(input);
        info!(catalog_id = %entry.id, name = %entry.common_name, "Catalog entry created");
        self.catalog.insert(entry.id, entry.clone());
        entry
    }

    pub fn get_catalog_entry(&self, id: Uuid) -> AppResult<&CatalogEntry> {
        self.catalog
            .get(&id)
            .ok_or_else(|| AppError::NotFound(format!("Catalog entry {} not found", id)))
    }

    pub fn list_catalog(&self) -> Vec<&CatalogEntry> {
        let mut entries: Vec<&CatalogEntry> = self.catalog.values().collect();
        entries.sort_by(|a, b| a.common_name.cmp(&b.common_name));
        entries
    }

    // ------------------------------------------------------------------
    // Plants
    // ------------------------------------------------------------------

    /// Create a plant and compute its watering frequency
    pub fn add_plant(&mut self, input: PlantInput, now: DateTime<Utc>) -> AppResult<Plant> {
        self.check_references(&input)?;

        let mut plant = Plant::new(input, now);
        plant.watering_frequency_days = self.estimate_for(&plant, now);

        info!(
            plant_id = %plant.id,
            days = plant.watering_frequency_days,
            "Plant created"
        );
        self.plants.push(plant.clone());
        Ok(plant)
    }

    /// Replace a plant's editable fields and refresh its frequency
    pub fn update_plant(
        &mut self,
        id: Uuid,
        input: PlantInput,
        now: DateTime<Utc>,
    ) -> AppResult<Plant> {
        self.check_references(&input)?;

        let index = self.plant_index(id)?;
        self.plants[index].apply(input, now);
        let days = self.estimate_for(&self.plants[index], now);
        self.plants[index].watering_frequency_days = days;

        info!(plant_id = %id, days, "Plant updated");
        Ok(self.plants[index].clone())
    }

    pub fn get_plant(&self, id: Uuid) -> AppResult<&Plant> {
        self.plants
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Plant {} not found", id)))
    }

    pub fn list_plants(&self) -> &[Plant] {
        &self.plants
    }

    /// Remove a plant and its care tasks. History entries are kept.
    pub fn remove_plant(&mut self, id: Uuid) -> AppResult<Plant> {
        let index = self.plant_index(id)?;
        let plant = self.plants.remove(index);
        self.care_tasks.retain(|t| t.plant_id != id);
        info!(plant_id = %id, "Plant removed");
        Ok(plant)
    }

    pub fn plant_count(&self) -> usize {
        self.plants.len()
    }

    /// Record a watering at `now`. Unlocked watering care tasks for the
    /// plant restart their interval from the same instant.
    pub fn mark_watered(&mut self, id: Uuid, now: DateTime<Utc>) -> AppResult<Plant> {
        let index = self.plant_index(id)?;
        let plant = &mut self.plants[index];
        plant.last_watered_date = Some(now);
        plant.updated_at = now;
        let plant = plant.clone();

        let rescheduled = self.reschedule_watering_tasks(&HashSet::from([id]), now);
        debug!(plant_id = %id, rescheduled, "Plant marked as watered");
        Ok(plant)
    }

    /// Mark every selected plant as watered; unknown ids are ignored.
    /// Returns the ids that were updated, in plant order.
    pub fn mark_watered_many(&mut self, selection: &HashSet<Uuid>, now: DateTime<Utc>) -> Vec<Uuid> {
        let updated: Vec<Uuid> = self
            .plants
            .iter_mut()
            .filter(|p| selection.contains(&p.id))
            .map(|plant| {
                plant.last_watered_date = Some(now);
                plant.updated_at = now;
                plant.id
            })
            .collect();

        let watered: HashSet<Uuid> = updated.iter().copied().collect();
        let rescheduled = self.reschedule_watering_tasks(&watered, now);

        info!(
            selected = selection.len(),
            updated = updated.len(),
            rescheduled,
            "Bulk watering recorded"
        );
        updated
    }

    /// Push unlocked watering care tasks of the given plants out from `now`.
    /// Locked tasks keep their schedule and no history is recorded.
    fn reschedule_watering_tasks(&mut self, plant_ids: &HashSet<Uuid>, now: DateTime<Utc>) -> usize {
        let mut rescheduled = 0;
        for task in self.care_tasks.iter_mut().filter(|t| {
            t.task_type == CareTaskType::Watering && !t.is_locked && plant_ids.contains(&t.plant_id)
        }) {
            task.reschedule(now);
            rescheduled += 1;
        }
        rescheduled
    }

    /// Recompute and persist one plant's frequency
    pub fn recompute_frequency(&mut self, id: Uuid, now: DateTime<Utc>) -> AppResult<Recomputed> {
        let index = self.plant_index(id)?;
        let days = self.estimate_for(&self.plants[index], now);

        let plant = &mut self.plants[index];
        if plant.watering_frequency_days != days {
            info!(
                plant_id = %id,
                previous = plant.watering_frequency_days,
                days,
                "Watering frequency changed"
            );
            plant.watering_frequency_days = days;
            plant.updated_at = now;
        }

        Ok(Recomputed {
            watering_frequency_days: days,
            next_watering_date: next_watering_date(plant.last_watered_date, days, now),
        })
    }

    /// Recompute every plant; returns how many frequencies changed
    pub fn recompute_all(&mut self, now: DateTime<Utc>) -> usize {
        let ids: Vec<Uuid> = self.plants.iter().map(|p| p.id).collect();
        let mut changed = 0;

        for id in ids {
            let before = self
                .get_plant(id)
                .map(|p| p.watering_frequency_days)
                .unwrap_or_default();
            if let Ok(result) = self.recompute_frequency(id, now) {
                if result.watering_frequency_days != before {
                    changed += 1;
                }
            }
        }

        changed
    }

    /// Watering tasks for all plants as of `now`
    pub fn watering_tasks(&self, now: DateTime<Utc>) -> Vec<WateringTask> {
        derive_watering_tasks(&self.plants, &self.rooms, now)
    }

    fn plant_index(&self, id: Uuid) -> AppResult<usize> {
        self.plants
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Plant {} not found", id)))
    }

    fn base_need_for(&self, plant: &Plant) -> Option<BaseNeed> {
        plant
            .catalog_id
            .and_then(|id| self.catalog.get(&id))
            .map(|entry| entry.water_needed)
    }

    fn estimate_for(&self, plant: &Plant, now: DateTime<Utc>) -> u32 {
        let estimate = frequency::estimate(&plant.attributes, self.base_need_for(plant), now);
        debug!(
            plant_id = %plant.id,
            base_days = estimate.base_days,
            adjustments = ?estimate.adjustments,
            days = estimate.days,
            "Estimated watering frequency"
        );
        estimate.days
    }

    fn check_references(&self, input: &PlantInput) -> AppResult<()> {
        if let Some(room_id) = input.room_id {
            if !self.rooms.contains_key(&room_id) {
                return Err(AppError::BadRequest(format!("Unknown room {}", room_id)));
            }
        }
        if let Some(catalog_id) = input.catalog_id {
            if !self.catalog.contains_key(&catalog_id) {
                return Err(AppError::BadRequest(format!(
                    "Unknown catalog entry {}",
                    catalog_id
                )));
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Care tasks
    // ------------------------------------------------------------------

    pub fn add_care_task(
        &mut self,
        plant_id: Uuid,
        input: CareTaskInput,
        now: DateTime<Utc>,
    ) -> AppResult<CareTask> {
        self.plant_index(plant_id)?;
        let task = CareTask::new(plant_id, input, now);
        info!(
            task_id = %task.id,
            plant_id = %plant_id,
            task_type = ?task.task_type,
            "Care task created"
        );
        self.care_tasks.push(task.clone());
        Ok(task)
    }

    pub fn care_tasks_for(&self, plant_id: Uuid) -> AppResult<Vec<&CareTask>> {
        self.plant_index(plant_id)?;
        Ok(self
            .care_tasks
            .iter()
            .filter(|t| t.plant_id == plant_id)
            .collect())
    }

    /// Unlocked care tasks across all plants, most overdue first
    pub fn due_care_tasks(&self, now: DateTime<Utc>) -> Vec<CareTaskStatus> {
        derive_care_tasks(&self.care_tasks, now)
    }

    /// Complete a care task. Completing a watering task also waters the plant.
    pub fn complete_care_task(
        &mut self,
        task_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<CareHistoryEntry> {
        let task = self
            .care_tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| AppError::NotFound(format!("Care task {} not found", task_id)))?;

        let entry = task.complete(now)?;
        self.history.record(entry.clone());

        if entry.task_type == CareTaskType::Watering {
            self.mark_watered(entry.plant_id, now)?;
        }

        info!(
            task_id = %task_id,
            plant_id = %entry.plant_id,
            history_size = self.history.len(),
            "Care task completed"
        );
        Ok(entry)
    }

    pub fn unlock_care_task(&mut self, task_id: Uuid) -> AppResult<CareTask> {
        let task = self
            .care_tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| AppError::NotFound(format!("Care task {} not found", task_id)))?;
        task.unlock();
        info!(task_id = %task_id, "Care task unlocked");
        Ok(task.clone())
    }

    /// Completion history for a plant, newest first
    pub fn history_for(&self, plant_id: Uuid, limit: usize) -> Vec<&CareHistoryEntry> {
        self.history.for_plant(plant_id, limit)
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        (Utc::now() - self.start_time).num_seconds().max(0) as u64
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
