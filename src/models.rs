//! Data models for plants, rooms and catalog entries
//!
//! Defines the records the store owns and the input DTOs accepted by the API.
//! Derived records (watering tasks, care task status) live next to the logic
//! that produces them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Species-level watering need supplied by the plant catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseNeed {
    Low,
    #[default]
    Moderate,
    High,
}

impl BaseNeed {
    /// Starting interval before any per-plant adjustment
    pub fn base_days(self) -> i32 {
        match self {
            BaseNeed::Low => 14,
            BaseNeed::Moderate => 7,
            BaseNeed::High => 3,
        }
    }
}

/// Pot material; anything unrecognised is treated as `Other`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PotMaterial {
    Terracotta,
    Plastic,
    Ceramic,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SoilType {
    ClaySoil,
    SandySoil,
    #[serde(other)]
    Other,
}

/// Physical and environmental profile of a single plant.
///
/// Every field is optional; an absent value means "no information" and
/// contributes no adjustment to the watering interval.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PlantAttributes {
    /// Pot diameter (cm)
    #[validate(range(min = 0.0, max = 500.0, message = "Pot size must be between 0 and 500 cm"))]
    pub pot_size: Option<f64>,

    pub has_drainage: Option<bool>,

    pub pot_material: Option<PotMaterial>,

    /// Distance from the nearest window (cm)
    #[validate(range(
        min = 0.0,
        max = 10000.0,
        message = "Distance from window must be between 0 and 10000 cm"
    ))]
    pub distance_from_window: Option<f64>,

    /// Plant height (cm)
    #[validate(range(min = 0.0, max = 5000.0, message = "Plant size must be between 0 and 5000 cm"))]
    pub plant_size: Option<f64>,

    /// When the plant was acquired, used to derive its age
    pub acquired_at: Option<DateTime<Utc>>,

    #[serde(rename = "isNearAC")]
    pub is_near_ac: Option<bool>,

    pub is_near_heater: Option<bool>,

    pub soil: Option<SoilType>,
}

/// A plant as held by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plant {
    pub id: Uuid,
    pub name: String,
    pub room_id: Option<Uuid>,
    pub catalog_id: Option<Uuid>,
    /// Computed interval, always within [1, 30]
    pub watering_frequency_days: u32,
    /// `None` means the plant has never been watered
    pub last_watered_date: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub attributes: PlantAttributes,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Plant {
    /// Build a plant from validated input. The caller fills in the frequency.
    pub fn new(input: PlantInput, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            room_id: input.room_id,
            catalog_id: input.catalog_id,
            watering_frequency_days: 1,
            last_watered_date: input.last_watered_date,
            attributes: input.attributes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the user-editable fields with `input`
    pub fn apply(&mut self, input: PlantInput, now: DateTime<Utc>) {
        self.name = input.name;
        self.room_id = input.room_id;
        self.catalog_id = input.catalog_id;
        self.last_watered_date = input.last_watered_date;
        self.attributes = input.attributes;
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomEnvironment {
    Indoor,
    Outdoor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightLevel {
    Low,
    Medium,
    Bright,
    Direct,
}

/// Optional climate context of a room
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RoomSettings {
    /// Typical temperature (Celsius)
    #[validate(range(min = -30.0, max = 60.0, message = "Temperature must be between -30 and 60°C"))]
    pub temperature: Option<f64>,

    /// Typical relative humidity (percentage)
    #[validate(range(min = 0.0, max = 100.0, message = "Humidity must be between 0 and 100%"))]
    pub humidity: Option<f64>,

    pub environment: Option<RoomEnvironment>,

    pub light_level: Option<LightLevel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<RoomSettings>,
    pub created_at: DateTime<Utc>,
}

impl Room {
    pub fn new(
        name: impl Into<String>,
        settings: Option<RoomSettings>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            settings,
            created_at: now,
        }
    }
}

/// Species record from the plant catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: Uuid,
    pub common_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scientific_name: Option<String>,
    pub water_needed: BaseNeed,
}

impl From<CatalogEntryInput> for CatalogEntry {
    fn from(input: CatalogEntryInput) -> Self {
        CatalogEntry {
            id: Uuid::new_v4(),
            common_name: input.common_name,
            scientific_name: input.scientific_name,
            water_needed: input.water_needed,
        }
    }
}

/// Input DTO for creating or replacing a plant
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PlantInput {
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: String,

    pub room_id: Option<Uuid>,

    pub catalog_id: Option<Uuid>,

    pub last_watered_date: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub attributes: PlantAttributes,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RoomInput {
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: String,

    pub settings: Option<RoomSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntryInput {
    #[validate(length(min = 1, max = 100, message = "Common name must be 1 to 100 characters"))]
    pub common_name: String,

    #[validate(length(max = 200))]
    pub scientific_name: Option<String>,

    #[serde(default)]
    pub water_needed: BaseNeed,
}

/// Bulk "mark watered" request; the selection is owned by the client
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct WaterManyInput {
    #[validate(length(min = 1, max = 500, message = "Select between 1 and 500 plants"))]
    pub plant_ids: Vec<Uuid>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheck {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub plant_count: usize,
    pub room_count: usize,
}
