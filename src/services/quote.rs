use chrono::NaiveDateTime;

use crate::models::{AvailabilityStatus, BookingQuote, PricingModel, StayOption};

#[derive(Debug, PartialEq)]
pub enum QuoteError {
    InvalidDates,
    InvalidGuestCount,
    CapacityExceeded { capacity: i64 },
    BookedOut,
}

impl std::fmt::Display for QuoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuoteError::InvalidDates => {
                write!(f, "check-out must be after check-in")
            }
            QuoteError::InvalidGuestCount => {
                write!(f, "guest count must be at least 1")
            }
            QuoteError::CapacityExceeded { capacity } => {
                write!(f, "this stay option sleeps at most {capacity} guests")
            }
            QuoteError::BookedOut => {
                write!(f, "this stay option is fully booked")
            }
        }
    }
}

/// Price a prospective stay. Pure: reads the stay option, writes nothing.
///
/// Nights are the ceiling of the stay length in days, never below 1, and
/// per-person options multiply by the guest count. Invalid input is
/// rejected, never clamped.
pub fn compute_quote(
    option: &StayOption,
    check_in: NaiveDateTime,
    check_out: NaiveDateTime,
    guest_count: i64,
) -> Result<BookingQuote, QuoteError> {
    if check_out <= check_in {
        return Err(QuoteError::InvalidDates);
    }
    if guest_count < 1 {
        return Err(QuoteError::InvalidGuestCount);
    }
    if guest_count > option.capacity {
        return Err(QuoteError::CapacityExceeded {
            capacity: option.capacity,
        });
    }
    if option.availability_status == AvailabilityStatus::BookedOut {
        return Err(QuoteError::BookedOut);
    }

    let seconds = (check_out - check_in).num_seconds();
    let nights = ((seconds + 86_399) / 86_400).max(1);

    let guests_factor = match option.pricing_model {
        PricingModel::PerPerson => guest_count,
        PricingModel::PerOption => 1,
    };
    let total_amount = option.price * nights as f64 * guests_factor as f64;

    Ok(BookingQuote {
        resort_id: option.resort_id.clone(),
        stay_option_id: option.id.clone(),
        check_in: check_in.date(),
        check_out: check_out.date(),
        guest_count,
        nights,
        total_amount,
    })
}
