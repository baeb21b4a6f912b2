use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One channel per booking, created lazily when work starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChannel {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub customer_id: Uuid,
    pub artist_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl ChatChannel {
    pub fn has_participant(&self, user_id: Uuid) -> bool {
        self.customer_id == user_id || self.artist_id == user_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub channel_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}
