mod common;

use atelier::{
    domain::{BookingPaymentStatus, BookingStatus, PricingType, Role},
    error::AppError,
    repository::{BookingRepository, ChatRepository},
};
use chrono::{Duration, Utc};
use common::{booking_request, create_user, setup};

#[tokio::test]
async fn booking_happy_path_with_revision_loop() -> anyhow::Result<()> {
    let env = setup().await?;
    let customer = create_user(&env, Role::Customer, "cust@example.com").await?;
    let artist = create_user(&env, Role::Artist, "artist@example.com").await?;

    let service = &env.ctx.booking_service;

    let booking = service
        .create_booking(&customer, booking_request(artist.id, 100_000))
        .await?;
    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.total_amount_cents, 100_000);

    // Artist accepts: chat channel appears.
    let booking = service
        .transition(&artist, booking.id, BookingStatus::InProgress, None, None)
        .await?;
    assert_eq!(booking.status, BookingStatus::InProgress);
    assert!(env
        .ctx
        .chat_repo
        .find_channel_by_booking(booking.id)
        .await?
        .is_some());

    // Artist hands the work over for review.
    let booking = service
        .transition(&artist, booking.id, BookingStatus::Review, None, None)
        .await?;
    assert_eq!(booking.status, BookingStatus::Review);

    // Customer asks for a revision, artist re-delivers.
    let booking = service
        .transition(
            &customer,
            booking.id,
            BookingStatus::InProgress,
            Some("tighten the line work".to_string()),
            None,
        )
        .await?;
    assert_eq!(booking.revisions_used, 1);

    let revisions = env.ctx.booking_repo.revisions_for(booking.id).await?;
    assert_eq!(revisions.len(), 1);

    let booking = service
        .transition(&artist, booking.id, BookingStatus::Review, None, None)
        .await?;

    // Customer approves.
    let booking = service
        .transition(&customer, booking.id, BookingStatus::Completed, None, None)
        .await?;
    assert_eq!(booking.status, BookingStatus::Completed);
    assert!(booking.final_approval.is_some());

    Ok(())
}

#[tokio::test]
async fn revision_limit_is_enforced_and_reports_usage() -> anyhow::Result<()> {
    let env = setup().await?;
    let customer = create_user(&env, Role::Customer, "cust@example.com").await?;
    let artist = create_user(&env, Role::Artist, "artist@example.com").await?;

    let service = &env.ctx.booking_service;
    let mut request = booking_request(artist.id, 50_000);
    request.revision_limit = 1;

    let booking = service.create_booking(&customer, request).await?;
    service
        .transition(&artist, booking.id, BookingStatus::InProgress, None, None)
        .await?;
    service
        .transition(&artist, booking.id, BookingStatus::Review, None, None)
        .await?;

    // First revision passes.
    service
        .transition(&customer, booking.id, BookingStatus::InProgress, None, None)
        .await?;
    service
        .transition(&artist, booking.id, BookingStatus::Review, None, None)
        .await?;

    // Second hits the limit and reports the usage tuple.
    let err = service
        .transition(&customer, booking.id, BookingStatus::InProgress, None, None)
        .await
        .unwrap_err();
    match err {
        AppError::BadRequest(msg) => assert!(msg.contains("1/1"), "unexpected message: {msg}"),
        other => panic!("expected BadRequest, got {other:?}"),
    }

    let booking = env.ctx.booking_repo.find_by_id(booking.id).await?.unwrap();
    assert_eq!(booking.revisions_used, 1);
    assert!(booking.revisions_used <= booking.revision_limit);

    Ok(())
}

#[tokio::test]
async fn outsiders_are_forbidden_and_wrong_states_rejected() -> anyhow::Result<()> {
    let env = setup().await?;
    let customer = create_user(&env, Role::Customer, "cust@example.com").await?;
    let artist = create_user(&env, Role::Artist, "artist@example.com").await?;
    let stranger = create_user(&env, Role::Customer, "stranger@example.com").await?;
    let admin = create_user(&env, Role::Admin, "admin@example.com").await?;

    let service = &env.ctx.booking_service;
    let booking = service
        .create_booking(&customer, booking_request(artist.id, 50_000))
        .await?;

    // A stranger may not accept someone else's booking.
    let err = service
        .transition(&stranger, booking.id, BookingStatus::InProgress, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    // The customer may not accept their own booking either.
    let err = service
        .transition(&customer, booking.id, BookingStatus::InProgress, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    // Completed is unreachable from Pending, even for an admin.
    let err = service
        .transition(&admin, booking.id, BookingStatus::Completed, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Admin can drive the artist-side transition.
    let booking = service
        .transition(&admin, booking.id, BookingStatus::InProgress, None, None)
        .await?;
    assert_eq!(booking.status, BookingStatus::InProgress);

    Ok(())
}

#[tokio::test]
async fn advance_payment_charges_half_and_holds() -> anyhow::Result<()> {
    let env = setup().await?;
    let customer = create_user(&env, Role::Customer, "cust@example.com").await?;
    let artist = create_user(&env, Role::Artist, "artist@example.com").await?;

    let mut request = booking_request(artist.id, 100_000);
    request.payment_type = atelier::domain::PaymentType::Advance;
    request.advance_percentage = 50;

    let booking = env
        .ctx
        .booking_service
        .create_booking(&customer, request)
        .await?;

    let (payment, booking) = env
        .ctx
        .payment_service
        .pay_booking(&customer, booking.id)
        .await?;

    assert_eq!(payment.amount_cents, 50_000);
    assert_eq!(booking.amount_paid_cents, 50_000);
    assert_eq!(booking.payment_status, BookingPaymentStatus::Held);
    // 10% platform commission on the charge
    assert_eq!(payment.platform_fee_cents, 5_000);

    // Second charge collects the balance and settles the booking.
    let (payment, booking) = env
        .ctx
        .payment_service
        .pay_booking(&customer, booking.id)
        .await?;
    assert_eq!(payment.amount_cents, 50_000);
    assert_eq!(booking.payment_status, BookingPaymentStatus::Paid);

    // A third attempt is a double payment.
    let err = env
        .ctx
        .payment_service
        .pay_booking(&customer, booking.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}

#[tokio::test]
async fn cancellation_outside_window_refunds_in_full() -> anyhow::Result<()> {
    let env = setup().await?;
    let customer = create_user(&env, Role::Customer, "cust@example.com").await?;
    let artist = create_user(&env, Role::Artist, "artist@example.com").await?;

    // Start is 72h away, window is 24h.
    let booking = env
        .ctx
        .booking_service
        .create_booking(&customer, booking_request(artist.id, 100_000))
        .await?;

    env.ctx
        .payment_service
        .pay_booking(&customer, booking.id)
        .await?;
    env.ctx
        .booking_service
        .transition(&artist, booking.id, BookingStatus::InProgress, None, None)
        .await?;

    let booking = env
        .ctx
        .booking_service
        .cancel(&customer, booking.id, Some("plans changed".to_string()))
        .await?;

    assert_eq!(booking.status, BookingStatus::Cancelled);
    assert_eq!(booking.amount_refunded_cents, 100_000);
    assert_eq!(booking.payment_status, BookingPaymentStatus::Refunded);
    let cancellation = booking.cancellation.unwrap();
    assert_eq!(cancellation.refund_amount_cents, 100_000);

    let refunds = env.gateway.refunds.lock().unwrap();
    assert_eq!(refunds.len(), 1);
    assert_eq!(refunds[0].1, 100_000);

    Ok(())
}

#[tokio::test]
async fn cancellation_inside_window_refunds_half() -> anyhow::Result<()> {
    let env = setup().await?;
    let customer = create_user(&env, Role::Customer, "cust@example.com").await?;
    let artist = create_user(&env, Role::Artist, "artist@example.com").await?;

    let mut request = booking_request(artist.id, 100_000);
    request.estimated_start_date = Utc::now() + Duration::hours(2);

    let booking = env
        .ctx
        .booking_service
        .create_booking(&customer, request)
        .await?;

    env.ctx
        .payment_service
        .pay_booking(&customer, booking.id)
        .await?;
    env.ctx
        .booking_service
        .transition(&artist, booking.id, BookingStatus::InProgress, None, None)
        .await?;

    let booking = env
        .ctx
        .booking_service
        .cancel(&customer, booking.id, None)
        .await?;

    assert_eq!(booking.amount_refunded_cents, 50_000);
    assert_eq!(booking.payment_status, BookingPaymentStatus::Partial);

    Ok(())
}

#[tokio::test]
async fn completed_bookings_cannot_be_cancelled() -> anyhow::Result<()> {
    let env = setup().await?;
    let customer = create_user(&env, Role::Customer, "cust@example.com").await?;
    let artist = create_user(&env, Role::Artist, "artist@example.com").await?;

    let service = &env.ctx.booking_service;
    let booking = service
        .create_booking(&customer, booking_request(artist.id, 50_000))
        .await?;
    service
        .transition(&artist, booking.id, BookingStatus::InProgress, None, None)
        .await?;
    service
        .transition(&artist, booking.id, BookingStatus::Review, None, None)
        .await?;
    service
        .transition(&customer, booking.id, BookingStatus::Completed, None, None)
        .await?;

    let err = service
        .cancel(&customer, booking.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}

#[tokio::test]
async fn quote_approval_sets_total_and_rejects_replay() -> anyhow::Result<()> {
    let env = setup().await?;
    let customer = create_user(&env, Role::Customer, "cust@example.com").await?;
    let artist = create_user(&env, Role::Artist, "artist@example.com").await?;

    let mut request = booking_request(artist.id, 0);
    request.pricing_type = PricingType::CustomQuote;
    request.package_price_cents = None;
    request.total_amount_cents = Some(10_000); // placeholder until the quote lands

    let service = &env.ctx.booking_service;
    let booking = service.create_booking(&customer, request).await?;

    let booking = service.set_quote(&artist, booking.id, 75_000).await?;
    assert!(!booking.custom_quote.as_ref().unwrap().approved);

    let booking = service.approve_quote(&customer, booking.id).await?;
    assert_eq!(booking.total_amount_cents, 75_000);
    assert!(booking.custom_quote.as_ref().unwrap().approved);

    // Approving twice is rejected.
    let err = service.approve_quote(&customer, booking.id).await.unwrap_err();
    match err {
        AppError::BadRequest(msg) => assert!(msg.contains("already approved")),
        other => panic!("expected BadRequest, got {other:?}"),
    }

    // And the quote can no longer be replaced.
    let err = service.set_quote(&artist, booking.id, 90_000).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}

#[tokio::test]
async fn dispute_is_single_open_and_resolution_refunds() -> anyhow::Result<()> {
    let env = setup().await?;
    let customer = create_user(&env, Role::Customer, "cust@example.com").await?;
    let artist = create_user(&env, Role::Artist, "artist@example.com").await?;
    let admin = create_user(&env, Role::Admin, "admin@example.com").await?;

    let service = &env.ctx.booking_service;
    let booking = service
        .create_booking(&customer, booking_request(artist.id, 100_000))
        .await?;
    env.ctx
        .payment_service
        .pay_booking(&customer, booking.id)
        .await?;

    let booking = service
        .open_dispute(&customer, booking.id, "work never started".to_string())
        .await?;

    let err = service
        .open_dispute(&customer, booking.id, "again".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Only an admin resolves.
    let err = service
        .resolve_dispute(&customer, booking.id, "no".to_string(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let booking = service
        .resolve_dispute(&admin, booking.id, "refund half".to_string(), Some(50_000))
        .await?;

    let dispute = booking.dispute.as_ref().unwrap();
    assert_eq!(dispute.status, atelier::domain::DisputeStatus::Resolved);
    assert_eq!(booking.amount_refunded_cents, 50_000);
    assert!(booking.admin_notes.as_ref().unwrap().contains("dispute resolved"));

    Ok(())
}
