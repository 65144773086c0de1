use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, BookingQuote, StayOption};
use crate::services::booking::finalize_booking;
use crate::services::identity::UserIdentity;
use crate::services::notify::NotifyKind;
use crate::services::payment::flow::{FlowState, PaymentFlow, TransitionError};
use crate::services::payment::{upi_link, PaymentCheck};
use crate::services::quote::compute_quote;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct StayRequest {
    pub resort_id: String,
    pub stay_option_id: String,
    /// YYYY-MM-DD
    pub check_in: String,
    /// YYYY-MM-DD
    pub check_out: String,
    pub guests: i64,
}

fn parse_date(s: &str, field: &str) -> Result<NaiveDateTime, AppError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default())
        .map_err(|_| AppError::Validation(format!("{field} must be a YYYY-MM-DD date")))
}

fn load_stay(
    state: &AppState,
    request: &StayRequest,
) -> Result<(String, StayOption), AppError> {
    let db = state.db.lock().unwrap();
    let resort = queries::get_resort(&db, &request.resort_id)?
        .ok_or_else(|| AppError::NotFound(format!("resort {}", request.resort_id)))?;
    let option = queries::get_stay_option(&db, &request.stay_option_id)?
        .ok_or_else(|| AppError::NotFound(format!("stay option {}", request.stay_option_id)))?;
    if option.resort_id != resort.id {
        return Err(AppError::Validation(
            "stay option does not belong to the selected resort".to_string(),
        ));
    }
    Ok((resort.name, option))
}

fn quote_for(request: &StayRequest, option: &StayOption) -> Result<BookingQuote, AppError> {
    let check_in = parse_date(&request.check_in, "check_in")?;
    let check_out = parse_date(&request.check_out, "check_out")?;
    compute_quote(option, check_in, check_out, request.guests)
        .map_err(|e| AppError::Validation(e.to_string()))
}

// POST /api/bookings/quote
#[derive(Serialize)]
pub struct QuoteResponse {
    pub resort_name: String,
    pub stay_option_name: String,
    #[serde(flatten)]
    pub quote: BookingQuote,
}

pub async fn get_quote(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StayRequest>,
) -> Result<Json<QuoteResponse>, AppError> {
    let (resort_name, option) = load_stay(&state, &request)?;
    let quote = quote_for(&request, &option)?;
    Ok(Json(QuoteResponse {
        resort_name,
        stay_option_name: option.name,
        quote,
    }))
}

// POST /api/payments
#[derive(Serialize)]
pub struct StartPaymentResponse {
    pub flow_id: String,
    pub state: FlowState,
    pub total_amount: f64,
    pub upi_link: String,
    pub expires_in_seconds: i64,
}

pub async fn start_payment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<StayRequest>,
) -> Result<Json<StartPaymentResponse>, AppError> {
    let user = current_user(&state, &headers)?;
    let (resort_name, option) = load_stay(&state, &request)?;
    let quote = quote_for(&request, &option)?;

    let now = Utc::now().naive_utc();
    let flow = PaymentFlow::new(
        Uuid::new_v4().to_string(),
        user,
        quote,
        resort_name.clone(),
        option.name.clone(),
        now,
    );

    let link = upi_link(
        &state.config.upi_id,
        &state.config.upi_payee_name,
        flow.quote.total_amount,
        &format!("Booking at {resort_name}"),
    );
    let response = StartPaymentResponse {
        flow_id: flow.id.clone(),
        state: flow.state,
        total_amount: flow.quote.total_amount,
        upi_link: link,
        expires_in_seconds: flow.seconds_left(now),
    };

    state.payments.lock().unwrap().insert(flow);
    tracing::info!(flow_id = %response.flow_id, amount = response.total_amount, "payment flow started");

    Ok(Json(response))
}

// GET /api/payments/:id
#[derive(Serialize)]
pub struct PaymentStatusResponse {
    pub flow_id: String,
    pub state: FlowState,
    pub seconds_left: i64,
    pub booking_id: Option<String>,
}

pub async fn get_payment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<PaymentStatusResponse>, AppError> {
    let user = current_user(&state, &headers)?;
    let now = Utc::now().naive_utc();

    let payments = state.payments.lock().unwrap();
    let flow = owned_flow(&payments, &id, &user)?;
    Ok(Json(PaymentStatusResponse {
        flow_id: flow.id.clone(),
        state: flow.state,
        seconds_left: flow.seconds_left(now),
        booking_id: flow.booking_id.clone(),
    }))
}

// POST /api/payments/:id/check
#[derive(Serialize)]
pub struct CheckPaymentResponse {
    pub flow_id: String,
    pub state: FlowState,
    pub seconds_left: i64,
    pub booking_id: Option<String>,
    pub availability_updated: Option<bool>,
}

pub async fn check_payment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<CheckPaymentResponse>, AppError> {
    let user = current_user(&state, &headers)?;

    // Snapshot under the lock; the provider call must not hold it.
    let (reference, amount) = {
        let payments = state.payments.lock().unwrap();
        let flow = owned_flow(&payments, &id, &user)?;
        match flow.state {
            FlowState::Completed => {
                return Ok(Json(CheckPaymentResponse {
                    flow_id: flow.id.clone(),
                    state: FlowState::Completed,
                    seconds_left: 0,
                    booking_id: flow.booking_id.clone(),
                    availability_updated: None,
                }))
            }
            FlowState::Expired => {
                return Err(AppError::FlowConflict(
                    "the payment window has expired".to_string(),
                ))
            }
            FlowState::Pending => (flow.id.clone(), flow.quote.total_amount),
        }
    };

    let check = state
        .payment_provider
        .check_status(&reference, amount)
        .await
        .map_err(|e| AppError::Gateway(e.to_string()))?;

    let now = Utc::now().naive_utc();

    if check == PaymentCheck::Pending {
        state.notifier.notify(
            NotifyKind::Info,
            "Payment Pending",
            "Please complete the payment to confirm your booking.",
        );
        let payments = state.payments.lock().unwrap();
        let flow = owned_flow(&payments, &id, &user)?;
        return Ok(Json(CheckPaymentResponse {
            flow_id: id,
            state: flow.state,
            seconds_left: flow.seconds_left(now),
            booking_id: None,
            availability_updated: None,
        }));
    }

    // Success: take the terminal transition first, under the lock. If the
    // window expired while the provider call was in flight, the expiry won
    // and this confirmation is an anomaly to report, not apply.
    let flow_snapshot = {
        let mut payments = state.payments.lock().unwrap();
        let flow = payments
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("payment flow {id}")))?;
        match flow.complete(now) {
            Ok(()) => flow.clone(),
            Err(TransitionError::AlreadyCompleted) => {
                return Ok(Json(CheckPaymentResponse {
                    flow_id: id,
                    state: FlowState::Completed,
                    seconds_left: 0,
                    booking_id: flow.booking_id.clone(),
                    availability_updated: None,
                }))
            }
            Err(TransitionError::Expired) => {
                tracing::warn!(flow_id = %id, "late payment confirmation discarded");
                return Err(AppError::FlowConflict(
                    "payment confirmed after the window expired".to_string(),
                ));
            }
        }
    };

    let finalized = {
        let db = state.db.lock().unwrap();
        match finalize_booking(&db, &flow_snapshot) {
            Ok(finalized) => finalized,
            Err(e) => {
                state.notifier.notify(
                    NotifyKind::Error,
                    "Booking Error",
                    "There was an error completing your booking. Please contact support.",
                );
                return Err(AppError::Internal(e));
            }
        }
    };

    {
        let mut payments = state.payments.lock().unwrap();
        if let Some(flow) = payments.get_mut(&id) {
            flow.booking_id = Some(finalized.booking.id.clone());
        }
    }

    state.notifier.notify(
        NotifyKind::Success,
        "Booking Confirmed!",
        "Your stay has been successfully booked.",
    );
    if !finalized.availability_updated {
        state.notifier.notify(
            NotifyKind::Error,
            "Availability Update Failed",
            "Your booking is confirmed, but the stay option status could not be refreshed.",
        );
    }

    Ok(Json(CheckPaymentResponse {
        flow_id: id,
        state: FlowState::Completed,
        seconds_left: 0,
        booking_id: Some(finalized.booking.id),
        availability_updated: Some(finalized.availability_updated),
    }))
}

// POST /api/payments/:id/cancel
pub async fn cancel_payment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user = current_user(&state, &headers)?;

    let mut payments = state.payments.lock().unwrap();
    {
        let flow = owned_flow(&payments, &id, &user)?;
        if flow.state == FlowState::Completed {
            return Err(AppError::FlowConflict(
                "payment already completed".to_string(),
            ));
        }
    }
    payments.remove(&id);
    tracing::info!(flow_id = %id, "payment flow abandoned");

    Ok(Json(serde_json::json!({ "ok": true })))
}

// GET /api/bookings
pub async fn my_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Booking>>, AppError> {
    let user = current_user(&state, &headers)?;
    let bookings = {
        let db = state.db.lock().unwrap();
        queries::get_bookings_for_user(&db, &user.id)?
    };
    Ok(Json(bookings))
}

fn current_user(state: &AppState, headers: &HeaderMap) -> Result<UserIdentity, AppError> {
    state
        .identity
        .current_user(headers)
        .ok_or(AppError::Unauthorized)
}

fn owned_flow<'a>(
    payments: &'a crate::services::payment::flow::FlowRegistry,
    id: &str,
    user: &UserIdentity,
) -> Result<&'a PaymentFlow, AppError> {
    let flow = payments
        .get(id)
        .ok_or_else(|| AppError::NotFound(format!("payment flow {id}")))?;
    // A foreign flow id looks the same as a missing one.
    if flow.user.id != user.id {
        return Err(AppError::NotFound(format!("payment flow {id}")));
    }
    Ok(flow)
}
