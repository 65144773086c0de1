use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub resort_id: String,
    pub stay_option_id: String,
    pub user_id: Option<String>,
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub guest_count: i64,
    pub total_amount: f64,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Pending,
    Failed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Pending => "pending",
            BookingStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "confirmed" => BookingStatus::Confirmed,
            "failed" => BookingStatus::Failed,
            _ => BookingStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Completed,
    Pending,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Completed => "completed",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "completed" => PaymentStatus::Completed,
            "failed" => PaymentStatus::Failed,
            _ => PaymentStatus::Pending,
        }
    }
}

/// A computed, unpersisted total for a prospective stay. Nothing is written
/// until payment confirmation turns it into a `Booking`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingQuote {
    pub resort_id: String,
    pub stay_option_id: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guest_count: i64,
    pub nights: i64,
    pub total_amount: f64,
}
