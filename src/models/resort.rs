use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resort {
    pub id: String,
    pub name: String,
    pub location: String,
    pub description: Option<String>,
    pub price_per_night: Option<f64>,
    pub rating: Option<f64>,
    pub capacity: Option<i64>,
    pub amenities: Vec<String>,
    pub stay_options: Vec<StayOption>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Resort {
    /// Largest stay-option capacity, falling back to the resort's own
    /// declared capacity, then 1.
    pub fn effective_capacity(&self) -> i64 {
        let from_options = self.stay_options.iter().map(|so| so.capacity).max();
        match from_options {
            Some(c) if c > 0 => c,
            _ => self.capacity.filter(|c| *c > 0).unwrap_or(1),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StayOption {
    pub id: String,
    pub resort_id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub pricing_model: PricingModel,
    pub availability_status: AvailabilityStatus,
    pub capacity: i64,
    pub amenities: Vec<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Whether the nightly price is charged once per booking or multiplied by
/// the guest count.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum PricingModel {
    PerOption,
    PerPerson,
}

impl PricingModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PricingModel::PerOption => "per_option",
            PricingModel::PerPerson => "per_person",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "per_person" => PricingModel::PerPerson,
            _ => PricingModel::PerOption,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    Available,
    Limited,
    BookedOut,
}

impl AvailabilityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityStatus::Available => "available",
            AvailabilityStatus::Limited => "limited",
            AvailabilityStatus::BookedOut => "booked_out",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "limited" => AvailabilityStatus::Limited,
            "booked_out" => AvailabilityStatus::BookedOut,
            _ => AvailabilityStatus::Available,
        }
    }
}
