mod common;

use atelier::{
    domain::{BookingStatus, CreateReviewRequest, Role},
    error::AppError,
    repository::UserRepository,
};
use common::{booking_request, create_user, setup};

async fn completed_booking(
    env: &common::TestEnv,
    customer: &atelier::domain::User,
    artist: &atelier::domain::User,
) -> anyhow::Result<atelier::domain::Booking> {
    let service = &env.ctx.booking_service;
    let booking = service
        .create_booking(customer, booking_request(artist.id, 50_000))
        .await?;
    service
        .transition(artist, booking.id, BookingStatus::InProgress, None, None)
        .await?;
    service
        .transition(artist, booking.id, BookingStatus::Review, None, None)
        .await?;
    let booking = service
        .transition(customer, booking.id, BookingStatus::Completed, None, None)
        .await?;
    Ok(booking)
}

#[tokio::test]
async fn review_requires_completed_booking_and_is_unique() -> anyhow::Result<()> {
    let env = setup().await?;
    let customer = create_user(&env, Role::Customer, "cust@example.com").await?;
    let artist = create_user(&env, Role::Artist, "artist@example.com").await?;

    let pending = env
        .ctx
        .booking_service
        .create_booking(&customer, booking_request(artist.id, 50_000))
        .await?;

    // Not completed yet.
    let err = env
        .ctx
        .review_service
        .create_review(
            &customer,
            CreateReviewRequest {
                booking_id: pending.id,
                rating: 5,
                comment: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let booking = completed_booking(&env, &customer, &artist).await?;

    let review = env
        .ctx
        .review_service
        .create_review(
            &customer,
            CreateReviewRequest {
                booking_id: booking.id,
                rating: 4,
                comment: Some("great work".to_string()),
            },
        )
        .await?;
    assert_eq!(review.rating, 4);

    // One review per booking.
    let err = env
        .ctx
        .review_service
        .create_review(
            &customer,
            CreateReviewRequest {
                booking_id: booking.id,
                rating: 5,
                comment: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // The artist's aggregate moved.
    let profile = env
        .ctx
        .user_repo
        .find_artist_profile(artist.id)
        .await?
        .unwrap();
    assert_eq!(profile.total_reviews, 1);
    assert!((profile.rating - 4.0).abs() < f64::EPSILON);

    Ok(())
}

#[tokio::test]
async fn only_the_booking_customer_reviews() -> anyhow::Result<()> {
    let env = setup().await?;
    let customer = create_user(&env, Role::Customer, "cust@example.com").await?;
    let artist = create_user(&env, Role::Artist, "artist@example.com").await?;
    let stranger = create_user(&env, Role::Customer, "stranger@example.com").await?;

    let booking = completed_booking(&env, &customer, &artist).await?;

    let err = env
        .ctx
        .review_service
        .create_review(
            &stranger,
            CreateReviewRequest {
                booking_id: booking.id,
                rating: 1,
                comment: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    Ok(())
}

#[tokio::test]
async fn hiding_a_review_updates_the_aggregate() -> anyhow::Result<()> {
    let env = setup().await?;
    let customer = create_user(&env, Role::Customer, "cust@example.com").await?;
    let artist = create_user(&env, Role::Artist, "artist@example.com").await?;
    let admin = create_user(&env, Role::Admin, "admin@example.com").await?;

    let booking = completed_booking(&env, &customer, &artist).await?;
    let review = env
        .ctx
        .review_service
        .create_review(
            &customer,
            CreateReviewRequest {
                booking_id: booking.id,
                rating: 2,
                comment: None,
            },
        )
        .await?;

    env.ctx
        .review_service
        .set_visibility(&admin, review.id, false)
        .await?;

    let profile = env
        .ctx
        .user_repo
        .find_artist_profile(artist.id)
        .await?
        .unwrap();
    assert_eq!(profile.total_reviews, 0);
    assert_eq!(profile.rating, 0.0);

    let visible = env
        .ctx
        .review_service
        .list_by_artist(artist.id, 10, 0)
        .await?;
    assert!(visible.is_empty());

    Ok(())
}
