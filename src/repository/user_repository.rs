use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{ArtistProfile, CreateUserRequest, CustomerProfile, Role, User},
    error::{AppError, Result},
    repository::UserRepository,
};

#[derive(FromRow)]
struct UserRow {
    id: String,
    email: String,
    password_hash: String,
    role: String,
    name: String,
    phone: Option<String>,
    active: i64,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(FromRow)]
struct ArtistProfileRow {
    user_id: String,
    category_id: Option<String>,
    bio: Option<String>,
    skills: String,
    hourly_rate_cents: i64,
    rating: f64,
    total_reviews: i64,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(FromRow)]
struct CustomerProfileRow {
    user_id: String,
    address: Option<String>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn parse_role(s: &str) -> Result<Role> {
        match s {
            "Admin" => Ok(Role::Admin),
            "Artist" => Ok(Role::Artist),
            "Customer" => Ok(Role::Customer),
            _ => Err(AppError::Database(format!("Invalid role: {}", s))),
        }
    }

    fn row_to_user(row: UserRow) -> Result<User> {
        Ok(User {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            email: row.email,
            password_hash: row.password_hash,
            role: Self::parse_role(&row.role)?,
            name: row.name,
            phone: row.phone,
            active: row.active != 0,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    fn row_to_artist_profile(row: ArtistProfileRow) -> Result<ArtistProfile> {
        Ok(ArtistProfile {
            user_id: Uuid::parse_str(&row.user_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            category_id: row
                .category_id
                .as_deref()
                .map(Uuid::parse_str)
                .transpose()
                .map_err(|e| AppError::Database(e.to_string()))?,
            bio: row.bio,
            skills: serde_json::from_str(&row.skills)
                .map_err(|e| AppError::Database(format!("Invalid skills payload: {}", e)))?,
            hourly_rate_cents: row.hourly_rate_cents,
            rating: row.rating,
            total_reviews: row.total_reviews,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, request: CreateUserRequest) -> Result<User> {
        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, role, name, phone, active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, 1, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&request.email)
        .bind(&request.password_hash)
        .bind(request.role.as_str())
        .bind(&request.name)
        .bind(&request.phone)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict("Email already exists".to_string())
            }
            other => AppError::Database(other.to_string()),
        })?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created user".to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, role, name, phone, active, created_at, updated_at \
             FROM users WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_user(r)?)),
            None => Ok(None),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, role, name, phone, active, created_at, updated_at \
             FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_user(r)?)),
            None => Ok(None),
        }
    }

    async fn count_by_role(&self, role: Role) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = ?")
            .bind(role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count)
    }

    async fn list_by_role(&self, role: Role, limit: i64, offset: i64) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, role, name, phone, active, created_at, updated_at \
             FROM users WHERE role = ? ORDER BY created_at DESC LIMIT ? OFFSET ?",
        )
        .bind(role.as_str())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_user).collect()
    }

    async fn create_artist_profile(&self, profile: ArtistProfile) -> Result<ArtistProfile> {
        let now = Utc::now().naive_utc();
        let skills = serde_json::to_string(&profile.skills)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO artist_profiles (
                user_id, category_id, bio, skills, hourly_rate_cents,
                rating, total_reviews, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, 0, 0, ?, ?)
            "#,
        )
        .bind(profile.user_id.to_string())
        .bind(profile.category_id.map(|id| id.to_string()))
        .bind(&profile.bio)
        .bind(skills)
        .bind(profile.hourly_rate_cents)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_artist_profile(profile.user_id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created artist profile".to_string())
        })
    }

    async fn find_artist_profile(&self, user_id: Uuid) -> Result<Option<ArtistProfile>> {
        let row = sqlx::query_as::<_, ArtistProfileRow>(
            "SELECT user_id, category_id, bio, skills, hourly_rate_cents, rating, total_reviews, \
             created_at, updated_at FROM artist_profiles WHERE user_id = ?",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_artist_profile(r)?)),
            None => Ok(None),
        }
    }

    async fn update_artist_rating(
        &self,
        user_id: Uuid,
        rating: f64,
        total_reviews: i64,
    ) -> Result<()> {
        let now = Utc::now().naive_utc();

        sqlx::query(
            "UPDATE artist_profiles SET rating = ?, total_reviews = ?, updated_at = ? WHERE user_id = ?",
        )
        .bind(rating)
        .bind(total_reviews)
        .bind(now)
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    async fn create_customer_profile(&self, profile: CustomerProfile) -> Result<CustomerProfile> {
        let now = Utc::now().naive_utc();

        sqlx::query(
            "INSERT INTO customer_profiles (user_id, address, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(profile.user_id.to_string())
        .bind(&profile.address)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_customer_profile(profile.user_id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created customer profile".to_string())
        })
    }

    async fn find_customer_profile(&self, user_id: Uuid) -> Result<Option<CustomerProfile>> {
        let row = sqlx::query_as::<_, CustomerProfileRow>(
            "SELECT user_id, address, created_at, updated_at FROM customer_profiles WHERE user_id = ?",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(CustomerProfile {
                user_id: Uuid::parse_str(&r.user_id)
                    .map_err(|e| AppError::Database(e.to_string()))?,
                address: r.address,
                created_at: DateTime::from_naive_utc_and_offset(r.created_at, Utc),
                updated_at: DateTime::from_naive_utc_and_offset(r.updated_at, Utc),
            })),
            None => Ok(None),
        }
    }
}
