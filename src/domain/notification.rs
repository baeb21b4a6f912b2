use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Append-only record of something a user should hear about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub is_read: bool,
    pub related_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NotificationKind {
    BookingRequest,
    BookingStatus,
    PaymentReceived,
    PaymentRefunded,
    ReviewReceived,
    ArtistApplication,
    Dispute,
    System,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::BookingRequest => "BookingRequest",
            NotificationKind::BookingStatus => "BookingStatus",
            NotificationKind::PaymentReceived => "PaymentReceived",
            NotificationKind::PaymentRefunded => "PaymentRefunded",
            NotificationKind::ReviewReceived => "ReviewReceived",
            NotificationKind::ArtistApplication => "ArtistApplication",
            NotificationKind::Dispute => "Dispute",
            NotificationKind::System => "System",
        }
    }
}
