pub mod booking;
pub mod resort;
pub mod review;

pub use booking::{Booking, BookingQuote, BookingStatus, PaymentStatus};
pub use resort::{AvailabilityStatus, PricingModel, Resort, StayOption};
pub use review::Review;
