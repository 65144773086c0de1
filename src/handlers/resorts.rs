use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::Resort;
use crate::services::search::{search_resorts, SearchCriteria, SortKey};
use crate::state::AppState;

// GET /api/resorts
#[derive(Deserialize)]
pub struct ResortsQuery {
    pub term: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub guests: Option<i64>,
    /// Comma-separated amenity tags, all required.
    pub amenities: Option<String>,
    pub sort: Option<String>,
}

impl ResortsQuery {
    fn into_criteria(self) -> SearchCriteria {
        SearchCriteria {
            term: self.term.unwrap_or_default(),
            price_min: self.min_price.unwrap_or(0.0),
            price_max: self.max_price.unwrap_or(f64::MAX),
            min_guests: self.guests.unwrap_or(1),
            required_amenities: self
                .amenities
                .map(|list| {
                    list.split(',')
                        .map(str::trim)
                        .filter(|a| !a.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
            sort: SortKey::parse(self.sort.as_deref().unwrap_or("rating_desc")),
        }
    }
}

pub async fn list_resorts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ResortsQuery>,
) -> Result<Json<Vec<Resort>>, AppError> {
    let resorts = {
        let db = state.db.lock().unwrap();
        queries::list_resorts(&db)?
    };
    Ok(Json(search_resorts(resorts, &query.into_criteria())))
}

// GET /api/resorts/:id
pub async fn get_resort(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Resort>, AppError> {
    let resort = {
        let db = state.db.lock().unwrap();
        queries::get_resort(&db, &id)?
    };
    resort
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("resort {id}")))
}
