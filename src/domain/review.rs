use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub customer_id: Uuid,
    pub artist_id: Uuid,
    pub rating: i64,
    pub comment: Option<String>,
    pub visible: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateReviewRequest {
    pub booking_id: Uuid,
    pub rating: i64,
    pub comment: Option<String>,
}
