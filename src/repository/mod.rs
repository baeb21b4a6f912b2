use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::*;
use crate::error::Result;

pub mod booking_repository;
pub mod category_repository;
pub mod chat_repository;
pub mod notification_repository;
pub mod payment_repository;
pub mod pending_artist_repository;
pub mod review_repository;
pub mod user_repository;

pub use booking_repository::SqliteBookingRepository;
pub use category_repository::SqliteCategoryRepository;
pub use chat_repository::SqliteChatRepository;
pub use notification_repository::SqliteNotificationRepository;
pub use payment_repository::SqlitePaymentRepository;
pub use pending_artist_repository::SqlitePendingArtistRepository;
pub use review_repository::SqliteReviewRepository;
pub use user_repository::SqliteUserRepository;

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create(&self, booking: Booking) -> Result<Booking>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>>;
    async fn list(&self, filter: &BookingFilter) -> Result<Vec<Booking>>;
    async fn count(&self, filter: &BookingFilter) -> Result<i64>;
    /// Version-checked write: fails with Conflict when the booking changed
    /// since it was read.
    async fn update(&self, booking: &Booking) -> Result<Booking>;
    async fn add_revision(&self, revision: Revision) -> Result<Revision>;
    async fn revisions_for(&self, booking_id: Uuid) -> Result<Vec<Revision>>;
    async fn count_with_status(&self, status: BookingStatus) -> Result<i64>;
    async fn count_all(&self) -> Result<i64>;
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn create(&self, payment: Payment) -> Result<Payment>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>>;
    async fn find_by_booking(&self, booking_id: Uuid) -> Result<Vec<Payment>>;
    async fn find_by_charge_id(&self, charge_id: &str) -> Result<Option<Payment>>;
    async fn list_for_customer(&self, customer_id: Uuid) -> Result<Vec<Payment>>;
    async fn list_for_artist(&self, artist_id: Uuid) -> Result<Vec<Payment>>;
    async fn list_all(&self, limit: i64, offset: i64) -> Result<Vec<Payment>>;
    async fn update_status(&self, id: Uuid, status: PaymentStatus) -> Result<Payment>;
    async fn succeeded_revenue_cents(&self) -> Result<i64>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, request: CreateUserRequest) -> Result<User>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn count_by_role(&self, role: Role) -> Result<i64>;
    async fn list_by_role(&self, role: Role, limit: i64, offset: i64) -> Result<Vec<User>>;
    async fn create_artist_profile(&self, profile: ArtistProfile) -> Result<ArtistProfile>;
    async fn find_artist_profile(&self, user_id: Uuid) -> Result<Option<ArtistProfile>>;
    async fn update_artist_rating(&self, user_id: Uuid, rating: f64, total_reviews: i64)
        -> Result<()>;
    async fn create_customer_profile(&self, profile: CustomerProfile) -> Result<CustomerProfile>;
    async fn find_customer_profile(&self, user_id: Uuid) -> Result<Option<CustomerProfile>>;
}

#[async_trait]
pub trait PendingArtistRepository: Send + Sync {
    async fn create(&self, application: ArtistApplication) -> Result<PendingArtist>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<PendingArtist>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<PendingArtist>>;
    async fn list_pending(&self) -> Result<Vec<PendingArtist>>;
    async fn mark_rejected(&self, id: Uuid, reviewed_by: Uuid) -> Result<PendingArtist>;
}

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn create(&self, review: Review) -> Result<Review>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Review>>;
    async fn find_by_booking(&self, booking_id: Uuid) -> Result<Option<Review>>;
    async fn list_by_artist(&self, artist_id: Uuid, limit: i64, offset: i64)
        -> Result<Vec<Review>>;
    async fn update(&self, review: &Review) -> Result<Review>;
    async fn delete(&self, id: Uuid) -> Result<()>;
    async fn set_visibility(&self, id: Uuid, visible: bool) -> Result<Review>;
    /// (average rating, visible review count) for an artist.
    async fn aggregate_for_artist(&self, artist_id: Uuid) -> Result<(f64, i64)>;
    async fn count_visible(&self) -> Result<i64>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, notification: Notification) -> Result<Notification>;
    async fn list_for_user(&self, user_id: Uuid, unread_only: bool, limit: i64, offset: i64)
        -> Result<Vec<Notification>>;
    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<Notification>;
    async fn mark_all_read(&self, user_id: Uuid) -> Result<u64>;
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create(&self, name: &str, description: Option<&str>) -> Result<Category>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>>;
    async fn list_active(&self) -> Result<Vec<Category>>;
}

#[async_trait]
pub trait ChatRepository: Send + Sync {
    async fn create_channel(&self, channel: ChatChannel) -> Result<ChatChannel>;
    async fn find_channel_by_id(&self, id: Uuid) -> Result<Option<ChatChannel>>;
    async fn find_channel_by_booking(&self, booking_id: Uuid) -> Result<Option<ChatChannel>>;
    async fn list_channels_for_user(&self, user_id: Uuid) -> Result<Vec<ChatChannel>>;
    async fn add_message(&self, message: ChatMessage) -> Result<ChatMessage>;
    async fn list_messages(&self, channel_id: Uuid, limit: i64, offset: i64)
        -> Result<Vec<ChatMessage>>;
}
