//! HTTP request handlers
//!
//! Implements REST API endpoints for the plant care service.

use actix_web::{web, HttpRequest, HttpResponse, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::care::CareTaskInput;
use crate::config::ScheduleSettings;
use crate::error::AppError;
use crate::models::{CatalogEntryInput, HealthCheck, PlantInput, RoomInput, WaterManyInput};
use crate::state::AppState;
use crate::tasks::partition_by_due;
use crate::validation::{
    validate_care_task_input, validate_catalog_input, validate_history_limit,
    validate_plant_input, validate_room_input, validate_selection,
};

type SharedState = web::Data<Arc<RwLock<AppState>>>;

/// Configure all application routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Health check
            .route("/health", web::get().to(health_check))
            // Rooms
            .route("/rooms", web::get().to(list_rooms))
            .route("/rooms", web::post().to(create_room))
            .route("/rooms/{id}", web::get().to(get_room))
            .route("/rooms/{id}", web::put().to(update_room))
            .route("/rooms/{id}", web::delete().to(delete_room))
            // Catalog
            .route("/catalog", web::get().to(list_catalog))
            .route("/catalog", web::post().to(create_catalog_entry))
            // Plants
            .route("/plants", web::get().to(list_plants))
            .route("/plants", web::post().to(create_plant))
            .route("/plants/water", web::post().to(water_plants))
            .route("/plants/{id}", web::get().to(get_plant))
            .route("/plants/{id}", web::put().to(update_plant))
            .route("/plants/{id}", web::delete().to(delete_plant))
            .route("/plants/{id}/water", web::post().to(water_plant))
            .route("/plants/{id}/care-tasks", web::get().to(list_care_tasks))
            .route("/plants/{id}/care-tasks", web::post().to(create_care_task))
            .route("/plants/{id}/history", web::get().to(get_history))
            // Care tasks
            .route("/care-tasks/{id}/complete", web::post().to(complete_care_task))
            .route("/care-tasks/{id}/unlock", web::post().to(unlock_care_task))
            // Derived task lists
            .route("/tasks/watering", web::get().to(get_watering_tasks))
            .route("/tasks/care", web::get().to(get_care_tasks))
            // Server-side recomputation
            .route(
                "/functions/recompute-frequency",
                web::get().to(recompute_frequency_query),
            )
            .route(
                "/functions/recompute-frequency",
                web::post().to(recompute_frequency_body),
            ),
    );
}

/// Health check endpoint
///
/// GET /api/health
pub async fn health_check(state: SharedState) -> Result<HttpResponse, AppError> {
    let state = state.read().await;

    let health = HealthCheck {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        uptime_seconds: state.uptime_seconds(),
        plant_count: state.plant_count(),
        room_count: state.room_count(),
    };

    Ok(HttpResponse::Ok().json(health))
}

// ----------------------------------------------------------------------
// Rooms
// ----------------------------------------------------------------------

/// GET /api/rooms
pub async fn list_rooms(state: SharedState) -> Result<HttpResponse, AppError> {
    let state = state.read().await;
    Ok(HttpResponse::Ok().json(state.list_rooms()))
}

/// POST /api/rooms
pub async fn create_room(
    state: SharedState,
    body: web::Json<RoomInput>,
) -> Result<HttpResponse, AppError> {
    validate_room_input(&body)?;
    let room = state.write().await.add_room(body.into_inner(), Utc::now());
    Ok(HttpResponse::Created().json(room))
}

/// GET /api/rooms/{id}
pub async fn get_room(
    state: SharedState,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let state = state.read().await;
    let room = state.get_room(path.into_inner())?;
    Ok(HttpResponse::Ok().json(room))
}

/// PUT /api/rooms/{id}
pub async fn update_room(
    state: SharedState,
    path: web::Path<Uuid>,
    body: web::Json<RoomInput>,
) -> Result<HttpResponse, AppError> {
    validate_room_input(&body)?;
    let room = state
        .write()
        .await
        .update_room(path.into_inner(), body.into_inner())?;
    Ok(HttpResponse::Ok().json(room))
}

/// DELETE /api/rooms/{id}
pub async fn delete_room(
    state: SharedState,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    state.write().await.remove_room(path.into_inner())?;
    Ok(HttpResponse::NoContent().finish())
}

// ----------------------------------------------------------------------
// Catalog
// ----------------------------------------------------------------------

/// GET /api/catalog
pub async fn list_catalog(state: SharedState) -> Result<HttpResponse, AppError> {
    let state = state.read().await;
    Ok(HttpResponse::Ok().json(state.list_catalog()))
}

/// POST /api/catalog
pub async fn create_catalog_entry(
    state: SharedState,
    body: web::Json<CatalogEntryInput>,
) -> Result<HttpResponse, AppError> {
    validate_catalog_input(&body)?;
    let entry = state.write().await.add_catalog_entry(body.into_inner());
    Ok(HttpResponse::Created().json(entry))
}

// ----------------------------------------------------------------------
// Plants
// ----------------------------------------------------------------------

/// GET /api/plants
pub async fn list_plants(state: SharedState) -> Result<HttpResponse, AppError> {
    let state = state.read().await;
    Ok(HttpResponse::Ok().json(state.list_plants()))
}

/// Create a plant; its watering frequency is computed on the way in
///
/// POST /api/plants
pub async fn create_plant(
    state: SharedState,
    body: web::Json<PlantInput>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let correlation_id = extract_correlation_id(&req);
    let now = Utc::now();

    validate_plant_input(&body, now)?;
    let plant = state.write().await.add_plant(body.into_inner(), now)?;

    info!(
        correlation_id = %correlation_id,
        plant_id = %plant.id,
        "Plant registered"
    );

    Ok(HttpResponse::Created().json(plant))
}

/// GET /api/plants/{id}
pub async fn get_plant(
    state: SharedState,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let state = state.read().await;
    let plant = state.get_plant(path.into_inner())?;
    Ok(HttpResponse::Ok().json(plant))
}

/// PUT /api/plants/{id}
pub async fn update_plant(
    state: SharedState,
    path: web::Path<Uuid>,
    body: web::Json<PlantInput>,
) -> Result<HttpResponse, AppError> {
    let now = Utc::now();
    validate_plant_input(&body, now)?;
    let plant = state
        .write()
        .await
        .update_plant(path.into_inner(), body.into_inner(), now)?;
    Ok(HttpResponse::Ok().json(plant))
}

/// DELETE /api/plants/{id}
pub async fn delete_plant(
    state: SharedState,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    state.write().await.remove_plant(path.into_inner())?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/plants/{id}/water
pub async fn water_plant(
    state: SharedState,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let plant = state
        .write()
        .await
        .mark_watered(path.into_inner(), Utc::now())?;
    Ok(HttpResponse::Ok().json(plant))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WaterManyResponse {
    updated: Vec<Uuid>,
    correlation_id: String,
}

/// Mark a client-side selection of plants as watered
///
/// POST /api/plants/water
pub async fn water_plants(
    state: SharedState,
    body: web::Json<WaterManyInput>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let correlation_id = extract_correlation_id(&req);
    validate_selection(&body)?;

    let selection: HashSet<Uuid> = body.into_inner().plant_ids.into_iter().collect();
    let updated = state.write().await.mark_watered_many(&selection, Utc::now());

    info!(
        correlation_id = %correlation_id,
        updated = updated.len(),
        "Bulk watering request handled"
    );

    Ok(HttpResponse::Ok().json(WaterManyResponse {
        updated,
        correlation_id,
    }))
}

// ----------------------------------------------------------------------
// Care tasks
// ----------------------------------------------------------------------

/// GET /api/plants/{id}/care-tasks
pub async fn list_care_tasks(
    state: SharedState,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let state = state.read().await;
    let tasks = state.care_tasks_for(path.into_inner())?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// POST /api/plants/{id}/care-tasks
pub async fn create_care_task(
    state: SharedState,
    path: web::Path<Uuid>,
    body: web::Json<CareTaskInput>,
) -> Result<HttpResponse, AppError> {
    let now = Utc::now();
    validate_care_task_input(&body, now)?;
    let task = state
        .write()
        .await
        .add_care_task(path.into_inner(), body.into_inner(), now)?;
    Ok(HttpResponse::Created().json(task))
}

/// Query parameters for care history
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

/// History outlives the plant, so a deleted plant's id still resolves here
///
/// GET /api/plants/{id}/history?limit=20
pub async fn get_history(
    state: SharedState,
    settings: web::Data<ScheduleSettings>,
    path: web::Path<Uuid>,
    query: web::Query<HistoryQuery>,
) -> Result<HttpResponse, AppError> {
    let limit = validate_history_limit(query.limit, settings.history_default_limit)?;
    let plant_id = path.into_inner();

    let state = state.read().await;
    Ok(HttpResponse::Ok().json(state.history_for(plant_id, limit)))
}

/// POST /api/care-tasks/{id}/complete
pub async fn complete_care_task(
    state: SharedState,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let entry = state
        .write()
        .await
        .complete_care_task(path.into_inner(), Utc::now())?;
    Ok(HttpResponse::Created().json(entry))
}

/// POST /api/care-tasks/{id}/unlock
pub async fn unlock_care_task(
    state: SharedState,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let task = state.write().await.unlock_care_task(path.into_inner())?;
    Ok(HttpResponse::Ok().json(task))
}

// ----------------------------------------------------------------------
// Task lists
// ----------------------------------------------------------------------

/// Watering tasks split into "today" and "soon", most overdue first
///
/// GET /api/tasks/watering
pub async fn get_watering_tasks(state: SharedState) -> Result<HttpResponse, AppError> {
    let now = Utc::now();
    let tasks = state.read().await.watering_tasks(now);
    Ok(HttpResponse::Ok().json(partition_by_due(tasks, now)))
}

/// GET /api/tasks/care
pub async fn get_care_tasks(state: SharedState) -> Result<HttpResponse, AppError> {
    let now = Utc::now();
    let tasks = state.read().await.due_care_tasks(now);
    Ok(HttpResponse::Ok().json(partition_by_due(tasks, now)))
}

// ----------------------------------------------------------------------
// Recomputation
// ----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct RecomputeRequest {
    pub plant_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecomputeResponse {
    pub watering_frequency_days: u32,
    pub next_watering_date: DateTime<Utc>,
}

/// GET /api/functions/recompute-frequency?plant_id=...
pub async fn recompute_frequency_query(
    state: SharedState,
    query: web::Query<RecomputeRequest>,
) -> Result<HttpResponse, AppError> {
    recompute(state, query.plant_id).await
}

/// POST /api/functions/recompute-frequency with `{"plant_id": "..."}`
pub async fn recompute_frequency_body(
    state: SharedState,
    body: web::Json<RecomputeRequest>,
) -> Result<HttpResponse, AppError> {
    recompute(state, body.plant_id).await
}

async fn recompute(state: SharedState, plant_id: Uuid) -> Result<HttpResponse, AppError> {
    let result = state
        .write()
        .await
        .recompute_frequency(plant_id, Utc::now())?;

    info!(
        plant_id = %plant_id,
        days = result.watering_frequency_days,
        "Frequency recomputed on request"
    );

    Ok(HttpResponse::Ok().json(RecomputeResponse {
        watering_frequency_days: result.watering_frequency_days,
        next_watering_date: result.next_watering_date,
    }))
}

/// Extract or generate correlation ID from request headers
fn extract_correlation_id(req: &HttpRequest) -> String {
    req.headers()
        .get("X-Correlation-ID")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::care::CareTaskType;
    use crate::frequency::estimate_watering_frequency_days;
    use crate::models::{BaseNeed, PlantAttributes};
    use actix_web::{test, App};
    use serde_json::{json, Value};

    fn shared() -> Arc<RwLock<AppState>> {
        Arc::new(RwLock::new(AppState::new()))
    }

    #[actix_web::test]
    async fn test_health_check() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(shared()))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn test_new_plant_shows_up_in_today() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(shared()))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/rooms")
            .set_json(json!({ "name": "Kitchen" }))
            .to_request();
        let room: Value = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::post()
            .uri("/api/plants")
            .set_json(json!({ "name": "Basil", "roomId": room["id"], "potSize": 70.0 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        let plant: Value = test::read_body_json(resp).await;
        assert_eq!(plant["wateringFrequencyDays"], 9);

        let req = test::TestRequest::get().uri("/api/tasks/watering").to_request();
        let tasks: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(tasks["today"].as_array().unwrap().len(), 1);
        assert_eq!(tasks["today"][0]["plantId"], plant["id"]);
        assert_eq!(tasks["today"][0]["daysOverdue"], 0);
        assert!(tasks["soon"].as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_create_plant_invalid_data() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(shared()))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/plants")
            .set_json(json!({ "name": "Bad", "potSize": -3.0 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);

        let req = test::TestRequest::post()
            .uri("/api/plants")
            .set_json(json!({ "name": "Lost", "roomId": Uuid::new_v4() }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn test_recompute_matches_library() {
        let state = shared();
        let attributes = PlantAttributes {
            pot_size: Some(45.0),
            has_drainage: Some(false),
            is_near_ac: Some(true),
            ..Default::default()
        };
        let plant_id = {
            let mut s = state.write().await;
            let entry = s.add_catalog_entry(CatalogEntryInput {
                common_name: "Snake plant".to_string(),
                scientific_name: None,
                water_needed: BaseNeed::Low,
            });
            let input = PlantInput {
                name: "Snake".to_string(),
                catalog_id: Some(entry.id),
                attributes: attributes.clone(),
                ..Default::default()
            };
            s.add_plant(input, Utc::now()).unwrap().id
        };
        let expected =
            estimate_watering_frequency_days(&attributes, Some(BaseNeed::Low), Utc::now());

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri(&format!("/api/functions/recompute-frequency?plant_id={}", plant_id))
            .to_request();
        let body: RecomputeResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.watering_frequency_days, expected);
        assert_eq!(body.watering_frequency_days, 15);

        let req = test::TestRequest::post()
            .uri("/api/functions/recompute-frequency")
            .set_json(json!({ "plant_id": plant_id }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["wateringFrequencyDays"], 15);
        assert!(body.get("nextWateringDate").is_some());
    }

    #[actix_web::test]
    async fn test_recompute_unknown_plant() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(shared()))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri(&format!(
                "/api/functions/recompute-frequency?plant_id={}",
                Uuid::new_v4()
            ))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }

    #[actix_web::test]
    async fn test_locked_care_task_conflict() {
        let state = shared();
        let task_id = {
            let mut s = state.write().await;
            let now = Utc::now();
            let plant = s
                .add_plant(
                    PlantInput {
                        name: "Bonsai".to_string(),
                        ..Default::default()
                    },
                    now,
                )
                .unwrap();
            s.add_care_task(
                plant.id,
                CareTaskInput {
                    task_type: CareTaskType::Repotting,
                    frequency_days: 365,
                    last_completed_date: None,
                    is_locked: true,
                },
                now,
            )
            .unwrap()
            .id
        };

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri(&format!("/api/care-tasks/{}/complete", task_id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 409);

        let req = test::TestRequest::post()
            .uri(&format!("/api/care-tasks/{}/unlock", task_id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = test::TestRequest::post()
            .uri(&format!("/api/care-tasks/{}/complete", task_id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
    }

    #[actix_web::test]
    async fn test_history_uses_configured_limit() {
        let state = shared();
        let plant_id = {
            let mut s = state.write().await;
            let now = Utc::now();
            let plant = s
                .add_plant(
                    PlantInput {
                        name: "Mint".to_string(),
                        ..Default::default()
                    },
                    now,
                )
                .unwrap();
            let task = s
                .add_care_task(
                    plant.id,
                    CareTaskInput {
                        task_type: CareTaskType::Watering,
                        frequency_days: 2,
                        last_completed_date: None,
                        is_locked: false,
                    },
                    now,
                )
                .unwrap();
            for _ in 0..3 {
                s.complete_care_task(task.id, now).unwrap();
            }
            plant.id
        };

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .app_data(web::Data::new(ScheduleSettings {
                    sweep_interval_secs: 3600,
                    history_default_limit: 2,
                }))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri(&format!("/api/plants/{}/history", plant_id))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().unwrap().len(), 2);

        let req = test::TestRequest::get()
            .uri(&format!("/api/plants/{}/history?limit=0", plant_id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn test_history_readable_after_plant_deleted() {
        let state = shared();
        let plant_id = {
            let mut s = state.write().await;
            let now = Utc::now();
            let plant = s
                .add_plant(
                    PlantInput {
                        name: "Rosemary".to_string(),
                        ..Default::default()
                    },
                    now,
                )
                .unwrap();
            let task = s
                .add_care_task(
                    plant.id,
                    CareTaskInput {
                        task_type: CareTaskType::Pruning,
                        frequency_days: 30,
                        last_completed_date: None,
                        is_locked: false,
                    },
                    now,
                )
                .unwrap();
            s.complete_care_task(task.id, now).unwrap();
            plant.id
        };

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .app_data(web::Data::new(ScheduleSettings::default()))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::delete()
            .uri(&format!("/api/plants/{}", plant_id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 204);

        let req = test::TestRequest::get()
            .uri(&format!("/api/plants/{}/history", plant_id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["taskType"], "pruning");
    }

    #[actix_web::test]
    async fn test_bulk_water_empty_selection() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(shared()))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/plants/water")
            .set_json(json!({ "plantIds": [] }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }
}
