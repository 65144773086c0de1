pub mod booking;
pub mod identity;
pub mod notify;
pub mod payment;
pub mod quote;
pub mod search;
