use std::sync::Arc;

use chrono::{Duration, Utc};
use clap::Parser;
use fake::faker::address::en::CityName;
use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::Sentence;
use fake::faker::name::en::Name;
use fake::Fake;
use rand::seq::SliceRandom;
use rand::Rng;
use sqlx::sqlite::SqlitePoolOptions;
use uuid::Uuid;

use atelier::{
    auth::AuthService,
    domain::{
        ArtistProfile, Booking, BookingPaymentStatus, BookingStatus, CreateUserRequest,
        CustomerProfile, PaymentType, PricingType, Role,
    },
    repository::{
        BookingRepository, CategoryRepository, SqliteBookingRepository, SqliteCategoryRepository,
        SqliteUserRepository, UserRepository,
    },
};

/// Seeds a development database with users and bookings.
#[derive(Parser)]
struct Args {
    /// Database URL (defaults to DATABASE_URL or sqlite:atelier.db)
    #[arg(long)]
    database_url: Option<String>,

    #[arg(long, default_value_t = 5)]
    artists: usize,

    #[arg(long, default_value_t = 10)]
    customers: usize,

    #[arg(long, default_value_t = 20)]
    bookings: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let database_url = args
        .database_url
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| "sqlite:atelier.db".to_string());

    println!("Seeding {database_url}...");

    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&db_pool).await?;

    let user_repo = Arc::new(SqliteUserRepository::new(db_pool.clone()));
    let booking_repo = Arc::new(SqliteBookingRepository::new(db_pool.clone()));
    let category_repo = Arc::new(SqliteCategoryRepository::new(db_pool.clone()));

    let mut category_ids = Vec::new();
    for (name, description) in [
        ("Portrait", "Commissioned portrait work"),
        ("Illustration", "Editorial and book illustration"),
        ("Live Performance", "Events, weddings and venues"),
    ] {
        match category_repo.create(name, Some(description)).await {
            Ok(category) => category_ids.push(category.id),
            Err(_) => println!("Category {name} already present, skipping"),
        }
    }

    let password_hash = AuthService::hash_password("password123")?;

    // Admin account
    let admin = user_repo
        .create(CreateUserRequest {
            email: "admin@atelier.local".to_string(),
            password_hash: password_hash.clone(),
            role: Role::Admin,
            name: "Admin".to_string(),
            phone: None,
        })
        .await;
    match admin {
        Ok(_) => println!("Created admin@atelier.local (password123)"),
        Err(_) => println!("Admin account already present, skipping"),
    }

    let mut rng = rand::thread_rng();

    let mut artist_ids = Vec::new();
    for i in 0..args.artists {
        let name: String = Name().fake();
        let user = user_repo
            .create(CreateUserRequest {
                email: format!("artist{}+{}", i, SafeEmail().fake::<String>()),
                password_hash: password_hash.clone(),
                role: Role::Artist,
                name: name.clone(),
                phone: None,
            })
            .await?;

        user_repo
            .create_artist_profile(ArtistProfile {
                user_id: user.id,
                category_id: category_ids.choose(&mut rng).copied(),
                bio: Some(Sentence(3..8).fake()),
                skills: vec!["portrait".to_string(), "digital".to_string()],
                hourly_rate_cents: rng.gen_range(20..200) * 100,
                rating: 0.0,
                total_reviews: 0,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .await?;

        artist_ids.push(user.id);
    }
    println!("Created {} artists", artist_ids.len());

    let mut customer_ids = Vec::new();
    for i in 0..args.customers {
        let user = user_repo
            .create(CreateUserRequest {
                email: format!("customer{}+{}", i, SafeEmail().fake::<String>()),
                password_hash: password_hash.clone(),
                role: Role::Customer,
                name: Name().fake(),
                phone: None,
            })
            .await?;

        user_repo
            .create_customer_profile(CustomerProfile {
                user_id: user.id,
                address: Some(CityName().fake()),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .await?;

        customer_ids.push(user.id);
    }
    println!("Created {} customers", customer_ids.len());

    let statuses = [
        BookingStatus::Pending,
        BookingStatus::Pending,
        BookingStatus::InProgress,
        BookingStatus::Review,
        BookingStatus::Completed,
    ];

    if artist_ids.is_empty() || customer_ids.is_empty() {
        println!("No artists or customers to book against, skipping bookings.");
        println!("Done.");
        return Ok(());
    }

    for _ in 0..args.bookings {
        let customer_id = *customer_ids.choose(&mut rng).unwrap();
        let artist_id = *artist_ids.choose(&mut rng).unwrap();
        let status = *statuses.choose(&mut rng).unwrap();
        let total = rng.gen_range(100..2000) * 100;

        let booking = Booking {
            id: Uuid::new_v4(),
            customer_id,
            artist_id,
            category_id: category_ids.choose(&mut rng).copied(),
            status: BookingStatus::Pending,
            payment_status: BookingPaymentStatus::Pending,
            pricing_type: PricingType::Package,
            payment_type: PaymentType::Full,
            total_amount_cents: total,
            amount_paid_cents: 0,
            amount_refunded_cents: 0,
            advance_percentage: 50,
            revisions_used: 0,
            revision_limit: 2,
            estimated_start_date: Utc::now() + Duration::days(rng.gen_range(1..30)),
            cancellation_window_hours: 24,
            location: Some(CityName().fake()),
            special_requests: Some(Sentence(3..10).fake()),
            custom_quote: None,
            cancellation: None,
            dispute: None,
            final_approval: None,
            admin_notes: None,
            version: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let mut booking = booking_repo.create(booking).await?;
        if status != BookingStatus::Pending {
            booking.status = status;
            booking_repo.update(&booking).await?;
        }
    }
    println!("Created {} bookings", args.bookings);

    println!("Done.");
    Ok(())
}
