mod common;

use atelier::{
    domain::{BookingPaymentStatus, BookingStatus, PaymentStatus, Role},
    error::AppError,
    repository::{BookingRepository, NotificationRepository, PaymentRepository},
};
use common::{booking_request, create_user, setup};

#[tokio::test]
async fn declined_charge_marks_payment_failed() -> anyhow::Result<()> {
    let env = setup().await?;
    let customer = create_user(&env, Role::Customer, "cust@example.com").await?;
    let artist = create_user(&env, Role::Artist, "artist@example.com").await?;

    let booking = env
        .ctx
        .booking_service
        .create_booking(&customer, booking_request(artist.id, 50_000))
        .await?;

    env.gateway.fail_next();
    let err = env
        .ctx
        .payment_service
        .pay_booking(&customer, booking.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Payment(_)));

    let booking = env.ctx.booking_repo.find_by_id(booking.id).await?.unwrap();
    assert_eq!(booking.amount_paid_cents, 0);

    // A later, successful retry still settles the booking.
    let (_, booking) = env
        .ctx
        .payment_service
        .pay_booking(&customer, booking.id)
        .await?;
    assert_eq!(booking.payment_status, BookingPaymentStatus::Paid);

    Ok(())
}

#[tokio::test]
async fn only_the_paying_customer_can_charge() -> anyhow::Result<()> {
    let env = setup().await?;
    let customer = create_user(&env, Role::Customer, "cust@example.com").await?;
    let artist = create_user(&env, Role::Artist, "artist@example.com").await?;
    let stranger = create_user(&env, Role::Customer, "stranger@example.com").await?;

    let booking = env
        .ctx
        .booking_service
        .create_booking(&customer, booking_request(artist.id, 50_000))
        .await?;

    let err = env
        .ctx
        .payment_service
        .pay_booking(&stranger, booking.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    Ok(())
}

#[tokio::test]
async fn force_refund_clamps_and_leaves_an_audit_note() -> anyhow::Result<()> {
    let env = setup().await?;
    let customer = create_user(&env, Role::Customer, "cust@example.com").await?;
    let artist = create_user(&env, Role::Artist, "artist@example.com").await?;
    let admin = create_user(&env, Role::Admin, "admin@example.com").await?;

    let booking = env
        .ctx
        .booking_service
        .create_booking(&customer, booking_request(artist.id, 50_000))
        .await?;
    env.ctx
        .payment_service
        .pay_booking(&customer, booking.id)
        .await?;

    // Not for regular users.
    let err = env
        .ctx
        .payment_service
        .force_refund(&customer, booking.id, 10_000, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    // Asking for more than was collected refunds only what is there.
    let booking = env
        .ctx
        .payment_service
        .force_refund(&admin, booking.id, 999_999, Some("goodwill"))
        .await?;

    assert_eq!(booking.amount_refunded_cents, 50_000);
    assert_eq!(booking.payment_status, BookingPaymentStatus::Refunded);
    let notes = booking.admin_notes.as_ref().unwrap();
    assert!(notes.contains("force-refund"));
    assert!(notes.contains(&admin.id.to_string()));

    let refunds = env.gateway.refunds.lock().unwrap();
    assert_eq!(refunds[0].1, 50_000);

    Ok(())
}

#[tokio::test]
async fn gateway_callback_settles_pending_charges_once() -> anyhow::Result<()> {
    let env = setup().await?;
    let customer = create_user(&env, Role::Customer, "cust@example.com").await?;
    let artist = create_user(&env, Role::Artist, "artist@example.com").await?;

    let booking = env
        .ctx
        .booking_service
        .create_booking(&customer, booking_request(artist.id, 50_000))
        .await?;
    let (payment, _) = env
        .ctx
        .payment_service
        .pay_booking(&customer, booking.id)
        .await?;

    // Force the stored charge back to Pending to simulate an async
    // confirmation, then deliver the callback twice.
    let pending = env
        .ctx
        .payment_repo
        .update_status(payment.id, PaymentStatus::Pending)
        .await?;
    let charge_id = pending.charge_id.clone().unwrap();

    let mut booking = env.ctx.booking_repo.find_by_id(booking.id).await?.unwrap();
    booking.amount_paid_cents = 0;
    booking.payment_status = BookingPaymentStatus::Pending;
    env.ctx.booking_repo.update(&booking).await?;

    env.ctx
        .payment_service
        .apply_gateway_event(&charge_id, true)
        .await?;
    // Replay is a no-op.
    env.ctx
        .payment_service
        .apply_gateway_event(&charge_id, true)
        .await?;

    let booking = env.ctx.booking_repo.find_by_id(booking.id).await?.unwrap();
    assert_eq!(booking.amount_paid_cents, 50_000);
    assert_eq!(booking.payment_status, BookingPaymentStatus::Paid);

    // Unknown charges are ignored rather than erroring the webhook.
    env.ctx
        .payment_service
        .apply_gateway_event("pi_unknown", true)
        .await?;

    Ok(())
}

#[tokio::test]
async fn transitions_notify_the_counterparty_once() -> anyhow::Result<()> {
    let env = setup().await?;
    let customer = create_user(&env, Role::Customer, "cust@example.com").await?;
    let artist = create_user(&env, Role::Artist, "artist@example.com").await?;

    let booking = env
        .ctx
        .booking_service
        .create_booking(&customer, booking_request(artist.id, 50_000))
        .await?;

    // Creation pings the artist.
    let artist_inbox = env
        .ctx
        .notification_repo
        .list_for_user(artist.id, false, 50, 0)
        .await?;
    assert_eq!(artist_inbox.len(), 1);

    env.ctx
        .booking_service
        .transition(&artist, booking.id, BookingStatus::InProgress, None, None)
        .await?;

    // Acceptance pings the customer, exactly once.
    let customer_inbox = env
        .ctx
        .notification_repo
        .list_for_user(customer.id, false, 50, 0)
        .await?;
    assert_eq!(customer_inbox.len(), 1);
    assert!(customer_inbox[0].title.contains("Accepted"));

    // The artist heard nothing new about their own action.
    let artist_inbox = env
        .ctx
        .notification_repo
        .list_for_user(artist.id, false, 50, 0)
        .await?;
    assert_eq!(artist_inbox.len(), 1);

    Ok(())
}
