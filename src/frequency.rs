//! Watering frequency estimation
//!
//! Derives a per-plant watering interval from the catalog base need plus a
//! fixed table of additive adjustments. This is the only implementation of
//! the formula: the store, the recompute endpoint and the background sweep
//! all call into it.
//!
//! Adjustment table (days):
//! - Pot diameter: >60 cm +2, >30 cm +1
//! - No drainage: +2
//! - Terracotta -1, plastic/ceramic +1
//! - Window distance: >200 cm +2, >100 cm +1
//! - Plant height >100 cm: -1
//! - Older than 2 years: +1
//! - Near AC: -2, near heater: -2
//! - Clay soil +1, sandy soil -1

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::dates::age_in_years;
use crate::models::{BaseNeed, PlantAttributes, PotMaterial, SoilType};

pub const MIN_FREQUENCY_DAYS: u32 = 1;
pub const MAX_FREQUENCY_DAYS: u32 = 30;

/// Attribute responsible for an adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Factor {
    PotSize,
    Drainage,
    PotMaterial,
    WindowDistance,
    PlantSize,
    Age,
    AirConditioning,
    Heater,
    Soil,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Adjustment {
    pub factor: Factor,
    pub days: i32,
}

/// Full breakdown of one estimation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyEstimate {
    pub base_need: BaseNeed,
    pub base_days: i32,
    /// Non-zero adjustments in table order
    pub adjustments: Vec<Adjustment>,
    /// Final interval, clamped to [1, 30]
    pub days: u32,
}

impl FrequencyEstimate {
    pub fn raw_total(&self) -> i32 {
        self.base_days + self.adjustments.iter().map(|a| a.days).sum::<i32>()
    }
}

/// Estimate with a full breakdown of the applied adjustments.
///
/// `now` is only used to derive the plant's age from `acquired_at`.
pub fn estimate(
    attributes: &PlantAttributes,
    base_need: Option<BaseNeed>,
    now: DateTime<Utc>,
) -> FrequencyEstimate {
    let base_need = base_need.unwrap_or_default();
    let base_days = base_need.base_days();

    let adjustments: Vec<Adjustment> = [
        (Factor::PotSize, pot_size_days(attributes.pot_size)),
        (Factor::Drainage, drainage_days(attributes.has_drainage)),
        (Factor::PotMaterial, pot_material_days(attributes.pot_material)),
        (Factor::WindowDistance, window_distance_days(attributes.distance_from_window)),
        (Factor::PlantSize, plant_size_days(attributes.plant_size)),
        (Factor::Age, age_days(attributes.acquired_at, now)),
        (Factor::AirConditioning, flag_days(attributes.is_near_ac, -2)),
        (Factor::Heater, flag_days(attributes.is_near_heater, -2)),
        (Factor::Soil, soil_days(attributes.soil)),
    ]
    .into_iter()
    .filter(|(_, days)| *days != 0)
    .map(|(factor, days)| Adjustment { factor, days })
    .collect();

    let total = base_days + adjustments.iter().map(|a| a.days).sum::<i32>();

    FrequencyEstimate {
        base_need,
        base_days,
        adjustments,
        days: clamp_days(f64::from(total)),
    }
}

/// Watering interval in whole days, always within [1, 30]
pub fn estimate_watering_frequency_days(
    attributes: &PlantAttributes,
    base_need: Option<BaseNeed>,
    now: DateTime<Utc>,
) -> u32 {
    estimate(attributes, base_need, now).days
}

fn clamp_days(days: f64) -> u32 {
    days.clamp(f64::from(MIN_FREQUENCY_DAYS), f64::from(MAX_FREQUENCY_DAYS))
        .round() as u32
}

fn pot_size_days(pot_size: Option<f64>) -> i32 {
    match pot_size {
        Some(cm) if cm > 60.0 => 2,
        Some(cm) if cm > 30.0 => 1,
        _ => 0,
    }
}

fn drainage_days(has_drainage: Option<bool>) -> i32 {
    // Only an explicit "no drainage" counts; unknown is neutral
    if has_drainage == Some(false) {
        2
    } else {
        0
    }
}

fn pot_material_days(material: Option<PotMaterial>) -> i32 {
    match material {
        Some(PotMaterial::Terracotta) => -1,
        Some(PotMaterial::Plastic) | Some(PotMaterial::Ceramic) => 1,
        Some(PotMaterial::Other) | None => 0,
    }
}

fn window_distance_days(distance: Option<f64>) -> i32 {
    match distance {
        Some(cm) if cm > 200.0 => 2,
        Some(cm) if cm > 100.0 => 1,
        _ => 0,
    }
}

fn plant_size_days(height: Option<f64>) -> i32 {
    match height {
        Some(cm) if cm > 100.0 => -1,
        _ => 0,
    }
}

fn age_days(acquired_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i32 {
    match acquired_at {
        Some(since) if age_in_years(since, now) > 2 => 1,
        _ => 0,
    }
}

fn flag_days(flag: Option<bool>, days: i32) -> i32 {
    if flag == Some(true) {
        days
    } else {
        0
    }
}

fn soil_days(soil: Option<SoilType>) -> i32 {
    match soil {
        Some(SoilType::ClaySoil) => 1,
        Some(SoilType::SandySoil) => -1,
        Some(SoilType::Other) | None => 0,
    }
}
