use chrono::Utc;
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::queries;
use crate::models::{AvailabilityStatus, Booking, BookingStatus, PaymentStatus};
use crate::services::payment::flow::PaymentFlow;

pub struct FinalizedBooking {
    pub booking: Booking,
    /// False when the availability overwrite failed after the booking was
    /// written. The booking stands either way.
    pub availability_updated: bool,
}

/// Commit a confirmed payment: insert the booking, then mark the stay
/// option `limited`. The two writes are not atomic. The booking is the
/// authoritative record of guest intent; the availability flag is a coarse
/// secondary signal, an overwrite rather than an inventory decrement.
pub fn finalize_booking(conn: &Connection, flow: &PaymentFlow) -> anyhow::Result<FinalizedBooking> {
    let now = Utc::now().naive_utc();
    let booking = Booking {
        id: Uuid::new_v4().to_string(),
        resort_id: flow.quote.resort_id.clone(),
        stay_option_id: flow.quote.stay_option_id.clone(),
        user_id: Some(flow.user.id.clone()),
        guest_name: flow.user.name.clone(),
        guest_email: flow.user.email.clone(),
        check_in_date: flow.quote.check_in,
        check_out_date: flow.quote.check_out,
        guest_count: flow.quote.guest_count,
        total_amount: flow.quote.total_amount,
        status: BookingStatus::Confirmed,
        payment_status: PaymentStatus::Completed,
        payment_method: "upi".to_string(),
        created_at: now,
        updated_at: now,
    };

    queries::create_booking(conn, &booking)?;

    let availability_updated = match queries::set_availability_status(
        conn,
        &flow.quote.stay_option_id,
        AvailabilityStatus::Limited,
    ) {
        Ok(updated) => updated,
        Err(e) => {
            // No rollback: the booking stays, the flag is best effort.
            tracing::warn!(
                booking_id = %booking.id,
                stay_option_id = %flow.quote.stay_option_id,
                "booking written but availability update failed: {e:#}"
            );
            false
        }
    };

    Ok(FinalizedBooking {
        booking,
        availability_updated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::{PricingModel, Resort, StayOption};
    use crate::services::identity::UserIdentity;
    use crate::services::payment::flow::PaymentFlow;
    use chrono::NaiveDate;

    fn setup() -> (Connection, PaymentFlow) {
        let conn = db::init_db(":memory:").unwrap();
        let now = Utc::now().naive_utc();

        queries::create_resort(
            &conn,
            &Resort {
                id: "r1".to_string(),
                name: "Misty Meadows".to_string(),
                location: "Munnar".to_string(),
                description: None,
                price_per_night: Some(4500.0),
                rating: Some(4.8),
                capacity: None,
                amenities: vec![],
                stay_options: vec![],
                created_at: now,
                updated_at: now,
            },
        )
        .unwrap();
        queries::create_stay_option(
            &conn,
            &StayOption {
                id: "so1".to_string(),
                resort_id: "r1".to_string(),
                name: "Deluxe".to_string(),
                description: None,
                price: 5000.0,
                pricing_model: PricingModel::PerOption,
                availability_status: crate::models::AvailabilityStatus::Available,
                capacity: 4,
                amenities: vec![],
                created_at: now,
                updated_at: now,
            },
        )
        .unwrap();

        let flow = PaymentFlow::new(
            "flow-1".to_string(),
            UserIdentity {
                id: "u1".to_string(),
                name: Some("Asha".to_string()),
                email: Some("asha@example.com".to_string()),
            },
            crate::models::BookingQuote {
                resort_id: "r1".to_string(),
                stay_option_id: "so1".to_string(),
                check_in: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
                check_out: NaiveDate::from_ymd_opt(2025, 8, 4).unwrap(),
                guest_count: 2,
                nights: 3,
                total_amount: 15000.0,
            },
            "Misty Meadows".to_string(),
            "Deluxe".to_string(),
            now,
        );
        (conn, flow)
    }

    #[test]
    fn test_finalize_writes_booking_and_marks_limited() {
        let (conn, flow) = setup();

        let finalized = finalize_booking(&conn, &flow).unwrap();
        assert!(finalized.availability_updated);
        assert_eq!(finalized.booking.status, BookingStatus::Confirmed);
        assert_eq!(finalized.booking.payment_status, PaymentStatus::Completed);
        assert_eq!(finalized.booking.total_amount, 15000.0);

        let stored = queries::get_booking_by_id(&conn, &finalized.booking.id)
            .unwrap()
            .unwrap();
        assert_eq!(stored.user_id.as_deref(), Some("u1"));

        let option = queries::get_stay_option(&conn, "so1").unwrap().unwrap();
        assert_eq!(
            option.availability_status,
            crate::models::AvailabilityStatus::Limited
        );
    }

    #[test]
    fn test_missing_stay_option_does_not_void_the_booking() {
        let (conn, mut flow) = setup();
        flow.quote.stay_option_id = "gone".to_string();

        let finalized = finalize_booking(&conn, &flow).unwrap();
        assert!(!finalized.availability_updated);
        assert!(queries::get_booking_by_id(&conn, &finalized.booking.id)
            .unwrap()
            .is_some());
    }
}
