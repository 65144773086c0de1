use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{AvailabilityStatus, Booking, PricingModel, Resort, StayOption};
use crate::state::AppState;

fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

// ── Resorts ──

#[derive(Deserialize)]
pub struct ResortPayload {
    pub name: String,
    pub location: String,
    pub description: Option<String>,
    pub price_per_night: Option<f64>,
    pub rating: Option<f64>,
    pub capacity: Option<i64>,
    #[serde(default)]
    pub amenities: Vec<String>,
}

impl ResortPayload {
    fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() || self.location.trim().is_empty() {
            return Err(AppError::Validation(
                "name and location are required".to_string(),
            ));
        }
        if self.price_per_night.is_some_and(|p| p < 0.0) {
            return Err(AppError::Validation(
                "price per night cannot be negative".to_string(),
            ));
        }
        if self.rating.is_some_and(|r| !(0.0..=5.0).contains(&r)) {
            return Err(AppError::Validation(
                "rating must be between 0 and 5".to_string(),
            ));
        }
        if self.capacity.is_some_and(|c| c < 1) {
            return Err(AppError::Validation(
                "capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// GET /api/admin/resorts
pub async fn list_resorts(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Resort>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let resorts = {
        let db = state.db.lock().unwrap();
        queries::list_resorts(&db)?
    };
    Ok(Json(resorts))
}

// POST /api/admin/resorts
pub async fn create_resort(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<ResortPayload>,
) -> Result<Json<Resort>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    payload.validate()?;

    let now = Utc::now().naive_utc();
    let resort = Resort {
        id: Uuid::new_v4().to_string(),
        name: payload.name.trim().to_string(),
        location: payload.location.trim().to_string(),
        description: payload.description,
        price_per_night: payload.price_per_night,
        rating: payload.rating,
        capacity: payload.capacity,
        amenities: payload.amenities,
        stay_options: vec![],
        created_at: now,
        updated_at: now,
    };

    {
        let db = state.db.lock().unwrap();
        queries::create_resort(&db, &resort)?;
    }
    tracing::info!(resort_id = %resort.id, name = %resort.name, "resort created");

    Ok(Json(resort))
}

// PUT /api/admin/resorts/:id
pub async fn update_resort(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<ResortPayload>,
) -> Result<Json<Resort>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    payload.validate()?;

    let db = state.db.lock().unwrap();
    let mut resort = queries::get_resort(&db, &id)?
        .ok_or_else(|| AppError::NotFound(format!("resort {id}")))?;

    resort.name = payload.name.trim().to_string();
    resort.location = payload.location.trim().to_string();
    resort.description = payload.description;
    resort.price_per_night = payload.price_per_night;
    resort.rating = payload.rating;
    resort.capacity = payload.capacity;
    resort.amenities = payload.amenities;

    queries::update_resort(&db, &resort)?;
    Ok(Json(resort))
}

// DELETE /api/admin/resorts/:id
pub async fn delete_resort(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let deleted = {
        let db = state.db.lock().unwrap();
        queries::delete_resort(&db, &id)?
    };
    if !deleted {
        return Err(AppError::NotFound(format!("resort {id}")));
    }
    tracing::info!(resort_id = %id, "resort deleted");

    Ok(Json(serde_json::json!({ "ok": true })))
}

// ── Stay options ──

#[derive(Deserialize)]
pub struct StayOptionPayload {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub pricing_model: Option<String>,
    pub availability_status: Option<String>,
    pub capacity: Option<i64>,
    #[serde(default)]
    pub amenities: Vec<String>,
}

impl StayOptionPayload {
    fn validate(&self) -> Result<(PricingModel, AvailabilityStatus, i64), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("name is required".to_string()));
        }
        if self.price <= 0.0 {
            return Err(AppError::Validation(
                "price must be greater than zero".to_string(),
            ));
        }

        let pricing_model = match self.pricing_model.as_deref() {
            None | Some("per_option") => PricingModel::PerOption,
            Some("per_person") => PricingModel::PerPerson,
            Some(other) => {
                return Err(AppError::Validation(format!(
                    "unknown pricing model: {other}"
                )))
            }
        };
        let availability = match self.availability_status.as_deref() {
            None | Some("available") => AvailabilityStatus::Available,
            Some("limited") => AvailabilityStatus::Limited,
            Some("booked_out") => AvailabilityStatus::BookedOut,
            Some(other) => {
                return Err(AppError::Validation(format!(
                    "unknown availability status: {other}"
                )))
            }
        };
        let capacity = self.capacity.unwrap_or(1);
        if capacity < 1 {
            return Err(AppError::Validation(
                "capacity must be at least 1".to_string(),
            ));
        }

        Ok((pricing_model, availability, capacity))
    }
}

// POST /api/admin/resorts/:id/stay-options
pub async fn create_stay_option(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(resort_id): Path<String>,
    Json(payload): Json<StayOptionPayload>,
) -> Result<Json<StayOption>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let (pricing_model, availability_status, capacity) = payload.validate()?;

    let db = state.db.lock().unwrap();
    if queries::get_resort(&db, &resort_id)?.is_none() {
        return Err(AppError::NotFound(format!("resort {resort_id}")));
    }

    let now = Utc::now().naive_utc();
    let option = StayOption {
        id: Uuid::new_v4().to_string(),
        resort_id,
        name: payload.name.trim().to_string(),
        description: payload.description,
        price: payload.price,
        pricing_model,
        availability_status,
        capacity,
        amenities: payload.amenities,
        created_at: now,
        updated_at: now,
    };
    queries::create_stay_option(&db, &option)?;

    Ok(Json(option))
}

// PUT /api/admin/stay-options/:id
pub async fn update_stay_option(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<StayOptionPayload>,
) -> Result<Json<StayOption>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let (pricing_model, availability_status, capacity) = payload.validate()?;

    let db = state.db.lock().unwrap();
    let mut option = queries::get_stay_option(&db, &id)?
        .ok_or_else(|| AppError::NotFound(format!("stay option {id}")))?;

    option.name = payload.name.trim().to_string();
    option.description = payload.description;
    option.price = payload.price;
    option.pricing_model = pricing_model;
    option.availability_status = availability_status;
    option.capacity = capacity;
    option.amenities = payload.amenities;

    queries::update_stay_option(&db, &option)?;
    Ok(Json(option))
}

// DELETE /api/admin/stay-options/:id
pub async fn delete_stay_option(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let deleted = {
        let db = state.db.lock().unwrap();
        queries::delete_stay_option(&db, &id)?
    };
    if !deleted {
        return Err(AppError::NotFound(format!("stay option {id}")));
    }

    Ok(Json(serde_json::json!({ "ok": true })))
}

// ── Bookings ──

// GET /api/admin/bookings
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let limit = query.limit.unwrap_or(50);
    let bookings = {
        let db = state.db.lock().unwrap();
        queries::get_all_bookings(&db, query.status.as_deref(), limit)?
    };
    Ok(Json(bookings))
}

// ── Website settings ──

// GET /api/admin/settings
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<HashMap<String, String>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let settings = {
        let db = state.db.lock().unwrap();
        queries::get_all_settings(&db)?
    };
    Ok(Json(settings.into_iter().collect()))
}

// POST /api/admin/settings
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(settings): Json<HashMap<String, String>>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    {
        let db = state.db.lock().unwrap();
        for (key, value) in &settings {
            queries::upsert_setting(&db, key, value)?;
        }
    }
    Ok(Json(serde_json::json!({ "ok": true })))
}

// ── Contact messages ──

// GET /api/admin/messages
#[derive(Serialize)]
pub struct ContactMessageResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub created_at: String,
}

pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<ContactMessageResponse>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let messages = {
        let db = state.db.lock().unwrap();
        queries::list_contact_messages(&db)?
    };

    let response = messages
        .into_iter()
        .map(|m| ContactMessageResponse {
            id: m.id,
            name: m.name,
            email: m.email,
            subject: m.subject,
            message: m.message,
            created_at: m.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        })
        .collect();
    Ok(Json(response))
}
