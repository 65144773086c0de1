use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, Connection};

use crate::models::{
    AvailabilityStatus, Booking, BookingStatus, PaymentStatus, PricingModel, Resort, Review,
    StayOption,
};

// ── Resorts ──

pub fn create_resort(conn: &Connection, resort: &Resort) -> anyhow::Result<()> {
    let amenities = serde_json::to_string(&resort.amenities)?;
    conn.execute(
        "INSERT INTO resorts (id, name, location, description, price_per_night, rating, capacity, amenities, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            resort.id,
            resort.name,
            resort.location,
            resort.description,
            resort.price_per_night,
            resort.rating,
            resort.capacity,
            amenities,
            resort.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            resort.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    )?;
    Ok(())
}

pub fn update_resort(conn: &Connection, resort: &Resort) -> anyhow::Result<bool> {
    let amenities = serde_json::to_string(&resort.amenities)?;
    let now = Utc::now().naive_utc().format("%Y-%m-%d %H:%M:%S").to_string();
    let count = conn.execute(
        "UPDATE resorts SET name = ?1, location = ?2, description = ?3, price_per_night = ?4,
         rating = ?5, capacity = ?6, amenities = ?7, updated_at = ?8 WHERE id = ?9",
        params![
            resort.name,
            resort.location,
            resort.description,
            resort.price_per_night,
            resort.rating,
            resort.capacity,
            amenities,
            now,
            resort.id,
        ],
    )?;
    Ok(count > 0)
}

/// Stay options and reviews go with it via ON DELETE CASCADE.
pub fn delete_resort(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM resorts WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

pub fn get_resort(conn: &Connection, id: &str) -> anyhow::Result<Option<Resort>> {
    let result = conn.query_row(
        "SELECT id, name, location, description, price_per_night, rating, capacity, amenities, created_at, updated_at
         FROM resorts WHERE id = ?1",
        params![id],
        |row| Ok(parse_resort_row(row)),
    );

    match result {
        Ok(resort) => {
            let mut resort = resort?;
            resort.stay_options = get_stay_options_for_resort(conn, &resort.id)?;
            Ok(Some(resort))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_resorts(conn: &Connection) -> anyhow::Result<Vec<Resort>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, location, description, price_per_night, rating, capacity, amenities, created_at, updated_at
         FROM resorts ORDER BY created_at DESC",
    )?;
    let rows = stmt.query_map([], |row| Ok(parse_resort_row(row)))?;

    let mut resorts = vec![];
    for row in rows {
        resorts.push(row??);
    }
    for resort in &mut resorts {
        resort.stay_options = get_stay_options_for_resort(conn, &resort.id)?;
    }
    Ok(resorts)
}

fn parse_resort_row(row: &rusqlite::Row) -> anyhow::Result<Resort> {
    let amenities_json: String = row.get(7)?;
    let created_at_str: String = row.get(8)?;
    let updated_at_str: String = row.get(9)?;

    Ok(Resort {
        id: row.get(0)?,
        name: row.get(1)?,
        location: row.get(2)?,
        description: row.get(3)?,
        price_per_night: row.get(4)?,
        rating: row.get(5)?,
        capacity: row.get(6)?,
        amenities: serde_json::from_str(&amenities_json).unwrap_or_default(),
        stay_options: vec![],
        created_at: parse_datetime(&created_at_str),
        updated_at: parse_datetime(&updated_at_str),
    })
}

// ── Stay options ──

pub fn create_stay_option(conn: &Connection, option: &StayOption) -> anyhow::Result<()> {
    let amenities = serde_json::to_string(&option.amenities)?;
    conn.execute(
        "INSERT INTO stay_options (id, resort_id, name, description, price, pricing_model, availability_status, capacity, amenities, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            option.id,
            option.resort_id,
            option.name,
            option.description,
            option.price,
            option.pricing_model.as_str(),
            option.availability_status.as_str(),
            option.capacity,
            amenities,
            option.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            option.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    )?;
    Ok(())
}

pub fn update_stay_option(conn: &Connection, option: &StayOption) -> anyhow::Result<bool> {
    let amenities = serde_json::to_string(&option.amenities)?;
    let now = Utc::now().naive_utc().format("%Y-%m-%d %H:%M:%S").to_string();
    let count = conn.execute(
        "UPDATE stay_options SET name = ?1, description = ?2, price = ?3, pricing_model = ?4,
         availability_status = ?5, capacity = ?6, amenities = ?7, updated_at = ?8 WHERE id = ?9",
        params![
            option.name,
            option.description,
            option.price,
            option.pricing_model.as_str(),
            option.availability_status.as_str(),
            option.capacity,
            amenities,
            now,
            option.id,
        ],
    )?;
    Ok(count > 0)
}

pub fn delete_stay_option(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM stay_options WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

pub fn get_stay_option(conn: &Connection, id: &str) -> anyhow::Result<Option<StayOption>> {
    let result = conn.query_row(
        "SELECT id, resort_id, name, description, price, pricing_model, availability_status, capacity, amenities, created_at, updated_at
         FROM stay_options WHERE id = ?1",
        params![id],
        |row| Ok(parse_stay_option_row(row)),
    );

    match result {
        Ok(option) => Ok(Some(option?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_stay_options_for_resort(
    conn: &Connection,
    resort_id: &str,
) -> anyhow::Result<Vec<StayOption>> {
    let mut stmt = conn.prepare(
        "SELECT id, resort_id, name, description, price, pricing_model, availability_status, capacity, amenities, created_at, updated_at
         FROM stay_options WHERE resort_id = ?1 ORDER BY created_at ASC",
    )?;
    let rows = stmt.query_map(params![resort_id], |row| Ok(parse_stay_option_row(row)))?;

    let mut options = vec![];
    for row in rows {
        options.push(row??);
    }
    Ok(options)
}

pub fn set_availability_status(
    conn: &Connection,
    id: &str,
    status: AvailabilityStatus,
) -> anyhow::Result<bool> {
    let now = Utc::now().naive_utc().format("%Y-%m-%d %H:%M:%S").to_string();
    let count = conn.execute(
        "UPDATE stay_options SET availability_status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), now, id],
    )?;
    Ok(count > 0)
}

fn parse_stay_option_row(row: &rusqlite::Row) -> anyhow::Result<StayOption> {
    let pricing_model: String = row.get(5)?;
    let availability: String = row.get(6)?;
    let amenities_json: String = row.get(8)?;
    let created_at_str: String = row.get(9)?;
    let updated_at_str: String = row.get(10)?;

    Ok(StayOption {
        id: row.get(0)?,
        resort_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        price: row.get(4)?,
        pricing_model: PricingModel::parse(&pricing_model),
        availability_status: AvailabilityStatus::parse(&availability),
        capacity: row.get(7)?,
        amenities: serde_json::from_str(&amenities_json).unwrap_or_default(),
        created_at: parse_datetime(&created_at_str),
        updated_at: parse_datetime(&updated_at_str),
    })
}

// ── Bookings ──

pub fn create_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO bookings (id, resort_id, stay_option_id, user_id, guest_name, guest_email,
         check_in_date, check_out_date, guest_count, total_amount, status, payment_status,
         payment_method, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            booking.id,
            booking.resort_id,
            booking.stay_option_id,
            booking.user_id,
            booking.guest_name,
            booking.guest_email,
            booking.check_in_date.format("%Y-%m-%d").to_string(),
            booking.check_out_date.format("%Y-%m-%d").to_string(),
            booking.guest_count,
            booking.total_amount,
            booking.status.as_str(),
            booking.payment_status.as_str(),
            booking.payment_method,
            booking.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            booking.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_bookings_for_user(conn: &Connection, user_id: &str) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(
        "SELECT id, resort_id, stay_option_id, user_id, guest_name, guest_email, check_in_date,
         check_out_date, guest_count, total_amount, status, payment_status, payment_method,
         created_at, updated_at
         FROM bookings WHERE user_id = ?1 ORDER BY created_at DESC",
    )?;
    let rows = stmt.query_map(params![user_id], |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn get_all_bookings(
    conn: &Connection,
    status_filter: Option<&str>,
    limit: i64,
) -> anyhow::Result<Vec<Booking>> {
    let (sql, params_vec): (String, Vec<Box<dyn rusqlite::types::ToSql>>) = match status_filter {
        Some(status) => (
            "SELECT id, resort_id, stay_option_id, user_id, guest_name, guest_email, check_in_date, \
             check_out_date, guest_count, total_amount, status, payment_status, payment_method, \
             created_at, updated_at \
             FROM bookings WHERE status = ?1 ORDER BY created_at DESC LIMIT ?2"
                .to_string(),
            vec![
                Box::new(status.to_string()) as Box<dyn rusqlite::types::ToSql>,
                Box::new(limit),
            ],
        ),
        None => (
            "SELECT id, resort_id, stay_option_id, user_id, guest_name, guest_email, check_in_date, \
             check_out_date, guest_count, total_amount, status, payment_status, payment_method, \
             created_at, updated_at \
             FROM bookings ORDER BY created_at DESC LIMIT ?1"
                .to_string(),
            vec![Box::new(limit) as Box<dyn rusqlite::types::ToSql>],
        ),
    };

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn get_booking_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let result = conn.query_row(
        "SELECT id, resort_id, stay_option_id, user_id, guest_name, guest_email, check_in_date,
         check_out_date, guest_count, total_amount, status, payment_status, payment_method,
         created_at, updated_at
         FROM bookings WHERE id = ?1",
        params![id],
        |row| Ok(parse_booking_row(row)),
    );

    match result {
        Ok(booking) => Ok(Some(booking?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let check_in_str: String = row.get(6)?;
    let check_out_str: String = row.get(7)?;
    let status_str: String = row.get(10)?;
    let payment_status_str: String = row.get(11)?;
    let created_at_str: String = row.get(13)?;
    let updated_at_str: String = row.get(14)?;

    Ok(Booking {
        id: row.get(0)?,
        resort_id: row.get(1)?,
        stay_option_id: row.get(2)?,
        user_id: row.get(3)?,
        guest_name: row.get(4)?,
        guest_email: row.get(5)?,
        check_in_date: parse_date(&check_in_str),
        check_out_date: parse_date(&check_out_str),
        guest_count: row.get(8)?,
        total_amount: row.get(9)?,
        status: BookingStatus::parse(&status_str),
        payment_status: PaymentStatus::parse(&payment_status_str),
        payment_method: row.get(12)?,
        created_at: parse_datetime(&created_at_str),
        updated_at: parse_datetime(&updated_at_str),
    })
}

// ── Reviews ──

pub fn create_review(conn: &Connection, review: &Review) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO reviews (id, resort_id, booking_id, user_id, author_name, rating, comment, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            review.id,
            review.resort_id,
            review.booking_id,
            review.user_id,
            review.author_name,
            review.rating,
            review.comment,
            review.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_reviews_for_resort(conn: &Connection, resort_id: &str) -> anyhow::Result<Vec<Review>> {
    let mut stmt = conn.prepare(
        "SELECT id, resort_id, booking_id, user_id, author_name, rating, comment, created_at
         FROM reviews WHERE resort_id = ?1 ORDER BY created_at DESC",
    )?;
    let rows = stmt.query_map(params![resort_id], |row| {
        let created_at_str: String = row.get(7)?;
        Ok(Review {
            id: row.get(0)?,
            resort_id: row.get(1)?,
            booking_id: row.get(2)?,
            user_id: row.get(3)?,
            author_name: row.get(4)?,
            rating: row.get(5)?,
            comment: row.get(6)?,
            created_at: parse_datetime(&created_at_str),
        })
    })?;

    let mut reviews = vec![];
    for row in rows {
        reviews.push(row?);
    }
    Ok(reviews)
}

/// A confirmed stay at the resort whose check-out has passed and which has
/// not been reviewed yet. Returns the booking id to attach the review to.
pub fn find_reviewable_booking(
    conn: &Connection,
    user_id: &str,
    resort_id: &str,
    today: &NaiveDate,
) -> anyhow::Result<Option<String>> {
    let today_str = today.format("%Y-%m-%d").to_string();
    let result = conn.query_row(
        "SELECT id FROM bookings
         WHERE user_id = ?1 AND resort_id = ?2 AND status = 'confirmed' AND check_out_date < ?3
           AND id NOT IN (SELECT booking_id FROM reviews WHERE user_id = ?1 AND resort_id = ?2)
         ORDER BY check_out_date DESC LIMIT 1",
        params![user_id, resort_id, today_str],
        |row| row.get::<_, String>(0),
    );

    match result {
        Ok(id) => Ok(Some(id)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ── Website settings ──

pub fn get_all_settings(conn: &Connection) -> anyhow::Result<Vec<(String, String)>> {
    let mut stmt =
        conn.prepare("SELECT setting_key, setting_value FROM website_settings ORDER BY setting_key")?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;

    let mut settings = vec![];
    for row in rows {
        settings.push(row?);
    }
    Ok(settings)
}

pub fn upsert_setting(conn: &Connection, key: &str, value: &str) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO website_settings (setting_key, setting_value) VALUES (?1, ?2)
         ON CONFLICT(setting_key) DO UPDATE SET setting_value = excluded.setting_value",
        params![key, value],
    )?;
    Ok(())
}

// ── Contact messages ──

pub struct ContactMessage {
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub created_at: NaiveDateTime,
}

pub fn create_contact_message(conn: &Connection, msg: &ContactMessage) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO contact_messages (id, name, email, subject, message, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            msg.id,
            msg.name,
            msg.email,
            msg.subject,
            msg.message,
            msg.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    )?;
    Ok(())
}

pub fn list_contact_messages(conn: &Connection) -> anyhow::Result<Vec<ContactMessage>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, email, subject, message, created_at
         FROM contact_messages ORDER BY created_at DESC",
    )?;
    let rows = stmt.query_map([], |row| {
        let created_at_str: String = row.get(5)?;
        Ok(ContactMessage {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            subject: row.get(3)?,
            message: row.get(4)?,
            created_at: parse_datetime(&created_at_str),
        })
    })?;

    let mut messages = vec![];
    for row in rows {
        messages.push(row?);
    }
    Ok(messages)
}

// ── Parse helpers ──

fn parse_datetime(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .unwrap_or_else(|_| Utc::now().naive_utc())
}

fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap_or_else(|_| Utc::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn sample_resort(id: &str) -> Resort {
        let now = Utc::now().naive_utc();
        Resort {
            id: id.to_string(),
            name: "Backwater Bliss".to_string(),
            location: "Alleppey".to_string(),
            description: Some("Houseboats on the backwaters".to_string()),
            price_per_night: Some(6500.0),
            rating: Some(4.7),
            capacity: Some(4),
            amenities: vec!["Houseboat Option".to_string(), "Fresh Seafood".to_string()],
            stay_options: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    fn sample_option(id: &str, resort_id: &str) -> StayOption {
        let now = Utc::now().naive_utc();
        StayOption {
            id: id.to_string(),
            resort_id: resort_id.to_string(),
            name: "Premium Houseboat".to_string(),
            description: None,
            price: 9000.0,
            pricing_model: PricingModel::PerOption,
            availability_status: AvailabilityStatus::Available,
            capacity: 6,
            amenities: vec!["AC".to_string()],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_resort_round_trip_with_options() {
        let conn = setup_db();
        create_resort(&conn, &sample_resort("r1")).unwrap();
        create_stay_option(&conn, &sample_option("so1", "r1")).unwrap();

        let resort = get_resort(&conn, "r1").unwrap().unwrap();
        assert_eq!(resort.name, "Backwater Bliss");
        assert_eq!(resort.amenities.len(), 2);
        assert_eq!(resort.stay_options.len(), 1);
        assert_eq!(resort.stay_options[0].capacity, 6);
    }

    #[test]
    fn test_delete_resort_cascades_to_stay_options() {
        let conn = setup_db();
        create_resort(&conn, &sample_resort("r1")).unwrap();
        create_stay_option(&conn, &sample_option("so1", "r1")).unwrap();

        assert!(delete_resort(&conn, "r1").unwrap());
        assert!(get_stay_option(&conn, "so1").unwrap().is_none());
    }

    #[test]
    fn test_set_availability_status() {
        let conn = setup_db();
        create_resort(&conn, &sample_resort("r1")).unwrap();
        create_stay_option(&conn, &sample_option("so1", "r1")).unwrap();

        assert!(set_availability_status(&conn, "so1", AvailabilityStatus::Limited).unwrap());
        let option = get_stay_option(&conn, "so1").unwrap().unwrap();
        assert_eq!(option.availability_status, AvailabilityStatus::Limited);
    }

    #[test]
    fn test_find_reviewable_booking() {
        let conn = setup_db();
        create_resort(&conn, &sample_resort("r1")).unwrap();

        let now = Utc::now().naive_utc();
        let booking = Booking {
            id: "b1".to_string(),
            resort_id: "r1".to_string(),
            stay_option_id: "so1".to_string(),
            user_id: Some("u1".to_string()),
            guest_name: Some("Asha".to_string()),
            guest_email: None,
            check_in_date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            check_out_date: NaiveDate::from_ymd_opt(2025, 1, 12).unwrap(),
            guest_count: 2,
            total_amount: 13000.0,
            status: BookingStatus::Confirmed,
            payment_status: PaymentStatus::Completed,
            payment_method: "upi".to_string(),
            created_at: now,
            updated_at: now,
        };
        create_booking(&conn, &booking).unwrap();

        let today = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        assert_eq!(
            find_reviewable_booking(&conn, "u1", "r1", &today).unwrap(),
            Some("b1".to_string())
        );

        // Before check-out the stay is not reviewable yet.
        let early = NaiveDate::from_ymd_opt(2025, 1, 11).unwrap();
        assert!(find_reviewable_booking(&conn, "u1", "r1", &early)
            .unwrap()
            .is_none());

        let review = Review {
            id: "rev1".to_string(),
            resort_id: "r1".to_string(),
            booking_id: "b1".to_string(),
            user_id: "u1".to_string(),
            author_name: Some("Asha".to_string()),
            rating: 5,
            comment: "Wonderful stay".to_string(),
            created_at: now,
        };
        create_review(&conn, &review).unwrap();

        assert!(find_reviewable_booking(&conn, "u1", "r1", &today)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_settings_upsert() {
        let conn = setup_db();
        upsert_setting(&conn, "company_email", "hello@luxestays.in").unwrap();
        upsert_setting(&conn, "company_email", "support@luxestays.in").unwrap();

        let settings = get_all_settings(&conn).unwrap();
        assert_eq!(settings.len(), 1);
        assert_eq!(settings[0].1, "support@luxestays.in");
    }
}
