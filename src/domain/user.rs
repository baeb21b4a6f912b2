use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub name: String,
    pub phone: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    Admin,
    Artist,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Artist => "Artist",
            Role::Customer => "Customer",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistProfile {
    pub user_id: Uuid,
    pub category_id: Option<Uuid>,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub hourly_rate_cents: i64,
    pub rating: f64,
    pub total_reviews: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub user_id: Uuid,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Staging record for an artist application. Approval promotes it into a
/// User + ArtistProfile pair; the record itself never becomes a login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingArtist {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub category_id: Option<Uuid>,
    pub bio: Option<String>,
    pub hourly_rate_cents: i64,
    pub status: PendingArtistStatus,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PendingArtistStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistApplication {
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub category_id: Option<Uuid>,
    pub bio: Option<String>,
    pub hourly_rate_cents: i64,
}
