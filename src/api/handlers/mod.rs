pub mod admin;
pub mod artists;
pub mod auth;
pub mod bookings;
pub mod categories;
pub mod chat;
pub mod notifications;
pub mod payments;
pub mod reviews;
pub mod root;
