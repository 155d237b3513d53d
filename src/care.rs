//! Care task scheduling
//!
//! Each plant can carry several independent recurring care tasks. Their due
//! dates follow the same day-truncation and overdue rules as watering tasks.
//! Completions are recorded in an append-only history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use crate::dates::{add_days, days_overdue};
use crate::tasks::{sort_by_urgency, Scheduled};

/// Upper bound on entries returned by a single history query
pub const MAX_HISTORY_LIMIT: usize = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CareError {
    #[error("Care task {0} is locked")]
    Locked(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CareTaskType {
    Watering,
    Fertilizing,
    Repotting,
    Pruning,
    PestCheck,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareTask {
    pub id: Uuid,
    pub plant_id: Uuid,
    pub task_type: CareTaskType,
    pub frequency_days: u32,
    pub last_completed_date: Option<DateTime<Utc>>,
    pub next_due_date: DateTime<Utc>,
    /// Locked tasks are not yet available to the user
    pub is_locked: bool,
    pub created_at: DateTime<Utc>,
}

impl CareTask {
    /// Create a task from validated input. Without a previous completion the
    /// task is due immediately.
    pub fn new(plant_id: Uuid, input: CareTaskInput, now: DateTime<Utc>) -> Self {
        let next_due_date = match input.last_completed_date {
            Some(last) => add_days(last, input.frequency_days),
            None => now,
        };

        Self {
            id: Uuid::new_v4(),
            plant_id,
            task_type: input.task_type,
            frequency_days: input.frequency_days,
            last_completed_date: input.last_completed_date,
            next_due_date,
            is_locked: input.is_locked,
            created_at: now,
        }
    }

    /// Mark the task done at `now` and return the history entry to append
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<CareHistoryEntry, CareError> {
        if self.is_locked {
            return Err(CareError::Locked(self.id));
        }

        self.reschedule(now);

        Ok(CareHistoryEntry {
            id: Uuid::new_v4(),
            task_id: self.id,
            plant_id: self.plant_id,
            task_type: self.task_type,
            completed_at: now,
        })
    }

    /// Restart the interval from `now` without recording a completion
    pub fn reschedule(&mut self, now: DateTime<Utc>) {
        self.last_completed_date = Some(now);
        self.next_due_date = add_days(now, self.frequency_days);
    }

    pub fn unlock(&mut self) {
        self.is_locked = false;
    }
}

/// Input DTO for creating a care task
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CareTaskInput {
    pub task_type: CareTaskType,

    #[validate(range(min = 1, max = 365, message = "Frequency must be between 1 and 365 days"))]
    pub frequency_days: u32,

    pub last_completed_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub is_locked: bool,
}

/// A care task evaluated against the current day
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CareTaskStatus {
    pub task: CareTask,
    pub days_overdue: u32,
    pub is_overdue: bool,
}

impl Scheduled for CareTaskStatus {
    fn due_date(&self) -> DateTime<Utc> {
        self.task.next_due_date
    }

    fn days_overdue(&self) -> u32 {
        self.days_overdue
    }
}

/// Evaluate every unlocked task, most overdue first
pub fn derive_care_tasks<'a, I>(tasks: I, now: DateTime<Utc>) -> Vec<CareTaskStatus>
where
    I: IntoIterator<Item = &'a CareTask>,
{
    let mut statuses: Vec<CareTaskStatus> = tasks
        .into_iter()
        .filter(|task| !task.is_locked)
        .map(|task| {
            let overdue = days_overdue(task.next_due_date, now);
            CareTaskStatus {
                task: task.clone(),
                days_overdue: overdue,
                is_overdue: overdue > 0,
            }
        })
        .collect();

    sort_by_urgency(&mut statuses);
    statuses
}

/// Record of a completed care task; never modified once written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareHistoryEntry {
    pub id: Uuid,
    pub task_id: Uuid,
    pub plant_id: Uuid,
    pub task_type: CareTaskType,
    pub completed_at: DateTime<Utc>,
}

/// Append-only log of completions
#[derive(Debug, Default)]
pub struct CareHistory {
    entries: Vec<CareHistoryEntry>,
}

impl CareHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: CareHistoryEntry) {
        self.entries.push(entry);
    }

    /// Most recent completions for a plant, newest first
    pub fn for_plant(&self, plant_id: Uuid, limit: usize) -> Vec<&CareHistoryEntry> {
        self.entries
            .iter()
            .rev()
            .filter(|e| e.plant_id == plant_id)
            .take(limit.min(MAX_HISTORY_LIMIT))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
