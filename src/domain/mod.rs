pub mod booking;
pub mod chat;
pub mod notification;
pub mod payment;
pub mod review;
pub mod user;

pub use booking::*;
pub use chat::*;
pub use notification::*;
pub use payment::*;
pub use review::*;
pub use user::*;
