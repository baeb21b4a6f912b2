use std::sync::Arc;

use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use atelier::{
    auth::AuthService,
    config::Settings,
    domain::{
        ArtistProfile, CreateBookingRequest, CreateUserRequest, CustomerProfile, PaymentType,
        PricingType, Role, User,
    },
    payments::FakePaymentGateway,
    repository::UserRepository,
    service::ServiceContext,
};

pub struct TestEnv {
    pub ctx: Arc<ServiceContext>,
    pub gateway: Arc<FakePaymentGateway>,
    pub pool: SqlitePool,
}

pub async fn setup() -> anyhow::Result<TestEnv> {
    let pool = SqlitePool::connect(":memory:").await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let gateway = Arc::new(FakePaymentGateway::new());
    let ctx = Arc::new(ServiceContext::new(
        pool.clone(),
        gateway.clone(),
        None,
        &Settings::default(),
    ));

    Ok(TestEnv { ctx, gateway, pool })
}

pub async fn create_user(env: &TestEnv, role: Role, email: &str) -> anyhow::Result<User> {
    let user = env
        .ctx
        .user_repo
        .create(CreateUserRequest {
            email: email.to_string(),
            password_hash: AuthService::hash_password("password123")?,
            role,
            name: format!("{} {}", role.as_str(), email),
            phone: None,
        })
        .await?;

    match role {
        Role::Artist => {
            env.ctx
                .user_repo
                .create_artist_profile(ArtistProfile {
                    user_id: user.id,
                    category_id: None,
                    bio: None,
                    skills: vec![],
                    hourly_rate_cents: 10_000,
                    rating: 0.0,
                    total_reviews: 0,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                })
                .await?;
        }
        Role::Customer => {
            env.ctx
                .user_repo
                .create_customer_profile(CustomerProfile {
                    user_id: user.id,
                    address: None,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                })
                .await?;
        }
        Role::Admin => {}
    }

    Ok(user)
}

/// A fixed-price booking request starting comfortably in the future.
pub fn booking_request(artist_id: Uuid, total_cents: i64) -> CreateBookingRequest {
    CreateBookingRequest {
        artist_id,
        category_id: None,
        pricing_type: PricingType::Package,
        payment_type: PaymentType::Full,
        total_amount_cents: None,
        package_price_cents: Some(total_cents),
        advance_percentage: 50,
        estimated_start_date: Utc::now() + Duration::hours(72),
        cancellation_window_hours: 24,
        revision_limit: 2,
        location: Some("Studio A".to_string()),
        special_requests: None,
    }
}
