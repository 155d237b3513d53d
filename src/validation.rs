//! Input validation module
//!
//! Rejects malformed input at the API edge so the scheduling core only ever
//! sees well-formed records.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use validator::{Validate, ValidationErrors};

use crate::care::{CareTaskInput, MAX_HISTORY_LIMIT};
use crate::error::{AppError, AppResult};
use crate::models::{CatalogEntryInput, PlantAttributes, PlantInput, RoomInput, WaterManyInput};

/// Run derive-level validation and flatten the failures into one message
fn check<T: Validate>(input: &T) -> AppResult<()> {
    input.validate().map_err(|errors| {
        let message = describe(&errors);
        warn!(errors = %message, "Input validation failed");
        AppError::ValidationError(message)
    })
}

fn describe(errors: &ValidationErrors) -> String {
    let messages: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let msgs: Vec<&str> = errors
                .iter()
                .filter_map(|e| e.message.as_ref().map(|c| c.as_ref()))
                .collect();
            if msgs.is_empty() {
                format!("{}: invalid value", field)
            } else {
                format!("{}: {}", field, msgs.join(", "))
            }
        })
        .collect();

    messages.join("; ")
}

/// Validate a plant create/update payload
pub fn validate_plant_input(input: &PlantInput, now: DateTime<Utc>) -> AppResult<()> {
    check(input)?;
    validate_attributes(&input.attributes, now)?;

    if let Some(last) = input.last_watered_date {
        if last > now {
            return Err(AppError::ValidationError(
                "lastWateredDate cannot be in the future".to_string(),
            ));
        }
    }

    debug!("Plant input validation passed");
    Ok(())
}

/// Validate the physical profile of a plant
pub fn validate_attributes(attributes: &PlantAttributes, now: DateTime<Utc>) -> AppResult<()> {
    // NaN slips through range checks, so finiteness is checked first
    validate_measure("potSize", attributes.pot_size)?;
    validate_measure("distanceFromWindow", attributes.distance_from_window)?;
    validate_measure("plantSize", attributes.plant_size)?;

    check(attributes)?;

    if let Some(acquired) = attributes.acquired_at {
        if acquired > now {
            return Err(AppError::ValidationError(
                "acquiredAt cannot be in the future".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_measure(field: &str, value: Option<f64>) -> AppResult<()> {
    match value {
        Some(v) if !v.is_finite() => Err(AppError::ValidationError(format!(
            "{} must be a finite number",
            field
        ))),
        _ => Ok(()),
    }
}

pub fn validate_room_input(input: &RoomInput) -> AppResult<()> {
    check(input)?;
    if let Some(settings) = &input.settings {
        validate_measure("temperature", settings.temperature)?;
        validate_measure("humidity", settings.humidity)?;
        check(settings)?;
    }
    Ok(())
}

pub fn validate_catalog_input(input: &CatalogEntryInput) -> AppResult<()> {
    check(input)
}

pub fn validate_care_task_input(input: &CareTaskInput, now: DateTime<Utc>) -> AppResult<()> {
    check(input)?;
    if let Some(last) = input.last_completed_date {
        if last > now {
            return Err(AppError::ValidationError(
                "lastCompletedDate cannot be in the future".to_string(),
            ));
        }
    }
    Ok(())
}

/// Validate a bulk selection
pub fn validate_selection(input: &WaterManyInput) -> AppResult<()> {
    check(input)
}

/// Resolve the history limit, falling back to the configured default
pub fn validate_history_limit(limit: Option<usize>, default: usize) -> AppResult<usize> {
    let limit = limit.unwrap_or(default);

    if limit == 0 || limit > MAX_HISTORY_LIMIT {
        return Err(AppError::ValidationError(format!(
            "Limit must be between 1 and {}",
            MAX_HISTORY_LIMIT
        )));
    }

    Ok(limit)
}
