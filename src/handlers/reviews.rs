use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::Review;
use crate::services::notify::NotifyKind;
use crate::state::AppState;

// GET /api/resorts/:id/reviews
pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
    Path(resort_id): Path<String>,
) -> Result<Json<Vec<Review>>, AppError> {
    let reviews = {
        let db = state.db.lock().unwrap();
        queries::get_reviews_for_resort(&db, &resort_id)?
    };
    Ok(Json(reviews))
}

// POST /api/resorts/:id/reviews
#[derive(Deserialize)]
pub struct ReviewRequest {
    pub rating: i64,
    pub comment: String,
}

pub async fn create_review(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(resort_id): Path<String>,
    Json(request): Json<ReviewRequest>,
) -> Result<Json<Review>, AppError> {
    let user = state
        .identity
        .current_user(&headers)
        .ok_or(AppError::Unauthorized)?;

    if !(1..=5).contains(&request.rating) {
        return Err(AppError::Validation(
            "rating must be between 1 and 5".to_string(),
        ));
    }
    if request.comment.trim().is_empty() {
        return Err(AppError::Validation(
            "please provide both a rating and comment".to_string(),
        ));
    }

    let now = Utc::now().naive_utc();
    let review = {
        let db = state.db.lock().unwrap();

        if queries::get_resort(&db, &resort_id)?.is_none() {
            return Err(AppError::NotFound(format!("resort {resort_id}")));
        }

        let booking_id =
            queries::find_reviewable_booking(&db, &user.id, &resort_id, &now.date())?
                .ok_or_else(|| {
                    AppError::Validation(
                        "you can only review resorts after a completed stay".to_string(),
                    )
                })?;

        let review = Review {
            id: Uuid::new_v4().to_string(),
            resort_id: resort_id.clone(),
            booking_id,
            user_id: user.id.clone(),
            author_name: user.name.clone(),
            rating: request.rating,
            comment: request.comment.trim().to_string(),
            created_at: now,
        };
        queries::create_review(&db, &review)?;
        review
    };

    state.notifier.notify(
        NotifyKind::Success,
        "Review Submitted",
        "Thank you for your feedback!",
    );

    Ok(Json(review))
}
