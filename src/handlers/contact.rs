use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::queries::{self, ContactMessage};
use crate::errors::AppError;
use crate::services::notify::NotifyKind;
use crate::state::AppState;

// GET /api/settings
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let settings = {
        let db = state.db.lock().unwrap();
        queries::get_all_settings(&db)?
    };

    let mut map = serde_json::Map::new();
    for (key, value) in settings {
        map.insert(key, serde_json::Value::String(value));
    }
    Ok(Json(serde_json::Value::Object(map)))
}

// POST /api/contact
#[derive(Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ContactRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    for (field, value) in [
        ("name", &request.name),
        ("email", &request.email),
        ("subject", &request.subject),
        ("message", &request.message),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{field} is required")));
        }
    }

    let msg = ContactMessage {
        id: Uuid::new_v4().to_string(),
        name: request.name.trim().to_string(),
        email: request.email.trim().to_string(),
        subject: request.subject.trim().to_string(),
        message: request.message.trim().to_string(),
        created_at: Utc::now().naive_utc(),
    };

    {
        let db = state.db.lock().unwrap();
        queries::create_contact_message(&db, &msg)?;
    }

    state.notifier.notify(
        NotifyKind::Success,
        "Message Sent",
        "We will get back to you shortly.",
    );

    Ok(Json(serde_json::json!({ "ok": true })))
}
