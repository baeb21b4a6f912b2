mod common;

use atelier::{
    domain::{BookingFilter, BookingStatus, Role},
    error::AppError,
    repository::BookingRepository,
};
use common::{booking_request, create_user, setup};

#[tokio::test]
async fn stale_booking_writes_conflict() -> anyhow::Result<()> {
    let env = setup().await?;
    let customer = create_user(&env, Role::Customer, "cust@example.com").await?;
    let artist = create_user(&env, Role::Artist, "artist@example.com").await?;

    let booking = env
        .ctx
        .booking_service
        .create_booking(&customer, booking_request(artist.id, 50_000))
        .await?;

    // Two readers grab the same version.
    let mut first = env.ctx.booking_repo.find_by_id(booking.id).await?.unwrap();
    let mut second = env.ctx.booking_repo.find_by_id(booking.id).await?.unwrap();

    first.location = Some("Studio B".to_string());
    env.ctx.booking_repo.update(&first).await?;

    // The slower writer loses instead of silently clobbering.
    second.location = Some("Studio C".to_string());
    let err = env.ctx.booking_repo.update(&second).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let stored = env.ctx.booking_repo.find_by_id(booking.id).await?.unwrap();
    assert_eq!(stored.location.as_deref(), Some("Studio B"));
    assert_eq!(stored.version, 2);

    Ok(())
}

#[tokio::test]
async fn list_filters_scope_and_match() -> anyhow::Result<()> {
    let env = setup().await?;
    let customer = create_user(&env, Role::Customer, "cust@example.com").await?;
    let other_customer = create_user(&env, Role::Customer, "other@example.com").await?;
    let artist = create_user(&env, Role::Artist, "artist@example.com").await?;

    let service = &env.ctx.booking_service;

    let mut cheap = booking_request(artist.id, 10_000);
    cheap.special_requests = Some("acoustic set".to_string());
    service.create_booking(&customer, cheap).await?;

    let expensive = booking_request(artist.id, 250_000);
    let accepted = service.create_booking(&other_customer, expensive).await?;
    service
        .transition(&artist, accepted.id, BookingStatus::InProgress, None, None)
        .await?;

    // Scoped to one customer.
    let (bookings, total) = service
        .list_bookings(&customer, BookingFilter {
            limit: 10,
            ..Default::default()
        })
        .await?;
    assert_eq!(total, 1);
    assert_eq!(bookings[0].customer_id, customer.id);

    // The artist sees both.
    let (_, total) = service
        .list_bookings(&artist, BookingFilter {
            limit: 10,
            ..Default::default()
        })
        .await?;
    assert_eq!(total, 2);

    // Status filter.
    let (bookings, _) = service
        .list_bookings(&artist, BookingFilter {
            status: Some(BookingStatus::InProgress),
            limit: 10,
            ..Default::default()
        })
        .await?;
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].id, accepted.id);

    // Amount range filter.
    let (bookings, _) = service
        .list_bookings(&artist, BookingFilter {
            min_amount_cents: Some(100_000),
            limit: 10,
            ..Default::default()
        })
        .await?;
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].total_amount_cents, 250_000);

    // Free-text search over special requests.
    let (bookings, _) = service
        .list_bookings(&artist, BookingFilter {
            search: Some("acoustic".to_string()),
            limit: 10,
            ..Default::default()
        })
        .await?;
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].special_requests.as_deref(), Some("acoustic set"));

    Ok(())
}

#[tokio::test]
async fn create_rejects_inactive_or_missing_artist() -> anyhow::Result<()> {
    let env = setup().await?;
    let customer = create_user(&env, Role::Customer, "cust@example.com").await?;
    let not_an_artist = create_user(&env, Role::Customer, "peer@example.com").await?;

    let err = env
        .ctx
        .booking_service
        .create_booking(&customer, booking_request(not_an_artist.id, 50_000))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = env
        .ctx
        .booking_service
        .create_booking(&customer, booking_request(uuid::Uuid::new_v4(), 50_000))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    Ok(())
}
