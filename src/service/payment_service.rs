use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    domain::{
        Booking, BookingPaymentStatus, NotificationKind, Payment, PaymentStatus, RefundStatus,
        Role, User,
    },
    error::{AppError, Result},
    notify::NotificationDispatcher,
    payments::{ChargeRequest, GatewayStatus, PaymentGateway},
    repository::{BookingRepository, PaymentRepository},
    service::pricing,
};

pub struct PaymentService {
    payment_repo: Arc<dyn PaymentRepository>,
    booking_repo: Arc<dyn BookingRepository>,
    gateway: Arc<dyn PaymentGateway>,
    dispatcher: Arc<NotificationDispatcher>,
    platform_fee_percent: i64,
}

impl PaymentService {
    pub fn new(
        payment_repo: Arc<dyn PaymentRepository>,
        booking_repo: Arc<dyn BookingRepository>,
        gateway: Arc<dyn PaymentGateway>,
        dispatcher: Arc<NotificationDispatcher>,
        platform_fee_percent: i64,
    ) -> Self {
        Self {
            payment_repo,
            booking_repo,
            gateway,
            dispatcher,
            platform_fee_percent,
        }
    }

    /// Charges the customer for a booking. The first charge takes the
    /// advance split (or the full amount); later charges collect whatever
    /// balance remains.
    pub async fn pay_booking(&self, actor: &User, booking_id: Uuid) -> Result<(Payment, Booking)> {
        let mut booking = self
            .booking_repo
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        if booking.customer_id != actor.id {
            return Err(AppError::Forbidden);
        }

        if booking.status.is_terminal() && booking.status != crate::domain::BookingStatus::Completed
        {
            return Err(AppError::BadRequest(
                "Cannot pay for a cancelled or declined booking".to_string(),
            ));
        }

        if booking.payment_status == BookingPaymentStatus::Paid {
            return Err(AppError::BadRequest(
                "Payment already completed for this booking".to_string(),
            ));
        }

        let amount_cents = if booking.amount_paid_cents == 0 {
            pricing::amount_to_pay(
                booking.total_amount_cents,
                booking.payment_type,
                booking.advance_percentage,
            )
        } else {
            booking.total_amount_cents - booking.amount_paid_cents
        };

        if amount_cents <= 0 {
            return Err(AppError::BadRequest(
                "Nothing left to charge for this booking".to_string(),
            ));
        }

        let mut metadata = HashMap::new();
        metadata.insert("booking_id".to_string(), booking.id.to_string());
        metadata.insert("customer_id".to_string(), booking.customer_id.to_string());
        metadata.insert("artist_id".to_string(), booking.artist_id.to_string());

        let outcome = self
            .gateway
            .charge(ChargeRequest {
                amount_cents,
                currency: "USD".to_string(),
                metadata,
                idempotency_key: Uuid::new_v4().to_string(),
            })
            .await?;

        let status = match outcome.status {
            GatewayStatus::Succeeded => PaymentStatus::Succeeded,
            GatewayStatus::Pending => PaymentStatus::Pending,
            GatewayStatus::Failed => PaymentStatus::Failed,
        };

        let payment = self
            .payment_repo
            .create(Payment {
                id: Uuid::new_v4(),
                booking_id: booking.id,
                customer_id: booking.customer_id,
                artist_id: booking.artist_id,
                amount_cents,
                currency: "USD".to_string(),
                charge_id: Some(outcome.charge_id),
                status,
                platform_fee_cents: pricing::platform_fee(amount_cents, self.platform_fee_percent),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .await?;

        match status {
            PaymentStatus::Succeeded => {
                booking.amount_paid_cents += amount_cents;
                booking.payment_status = if booking.amount_paid_cents >= booking.total_amount_cents
                {
                    BookingPaymentStatus::Paid
                } else {
                    BookingPaymentStatus::Held
                };
            }
            PaymentStatus::Failed => {
                booking.payment_status = BookingPaymentStatus::Failed;
            }
            _ => {}
        }

        let booking = self.booking_repo.update(&booking).await?;

        if status == PaymentStatus::Failed {
            return Err(AppError::Payment(
                "Payment was declined by the processor".to_string(),
            ));
        }

        if status == PaymentStatus::Succeeded {
            self.dispatcher
                .notify(
                    booking.artist_id,
                    NotificationKind::PaymentReceived,
                    "Payment Received",
                    &format!(
                        "Payment received for booking. Amount: ${:.2}",
                        amount_cents as f64 / 100.0
                    ),
                    Some(payment.id),
                )
                .await;
        }

        Ok((payment, booking))
    }

    /// Pushes a refund through the gateway and reconciles the booking's
    /// running totals. The amount is clamped to what is actually still
    /// refundable. Returns the updated booking.
    pub async fn process_refund(&self, mut booking: Booking, amount_cents: i64) -> Result<Booking> {
        let refundable = booking.amount_paid_cents - booking.amount_refunded_cents;
        let amount_cents = amount_cents.min(refundable);

        if amount_cents <= 0 {
            if let Some(ref mut cancellation) = booking.cancellation {
                cancellation.refund_status = RefundStatus::Processed;
            }
            return self.booking_repo.update(&booking).await;
        }

        let payments = self.payment_repo.find_by_booking(booking.id).await?;
        let settled = payments
            .into_iter()
            .find(|p| p.status == PaymentStatus::Succeeded && p.charge_id.is_some())
            .ok_or_else(|| {
                AppError::BadRequest("No settled payment to refund for this booking".to_string())
            })?;

        let charge_id = settled.charge_id.as_deref().unwrap_or_default();

        match self.gateway.refund(charge_id, amount_cents).await {
            Ok(_) => {
                self.payment_repo
                    .update_status(settled.id, PaymentStatus::Refunded)
                    .await?;

                booking.amount_refunded_cents += amount_cents;
                booking.payment_status =
                    if booking.amount_refunded_cents >= booking.total_amount_cents {
                        BookingPaymentStatus::Refunded
                    } else {
                        BookingPaymentStatus::Partial
                    };
                if let Some(ref mut cancellation) = booking.cancellation {
                    cancellation.refund_status = RefundStatus::Processed;
                }

                let booking = self.booking_repo.update(&booking).await?;

                self.dispatcher
                    .notify(
                        booking.customer_id,
                        NotificationKind::PaymentRefunded,
                        "Payment Refunded",
                        &format!(
                            "Your payment of ${:.2} has been refunded.",
                            amount_cents as f64 / 100.0
                        ),
                        Some(booking.id),
                    )
                    .await;

                Ok(booking)
            }
            Err(e) => {
                if let Some(ref mut cancellation) = booking.cancellation {
                    cancellation.refund_status = RefundStatus::Failed;
                }
                self.booking_repo.update(&booking).await?;
                Err(e)
            }
        }
    }

    /// Admin override: refund an arbitrary amount outside the cancellation
    /// policy. Always leaves an audit note on the booking.
    pub async fn force_refund(
        &self,
        actor: &User,
        booking_id: Uuid,
        amount_cents: i64,
        note: Option<&str>,
    ) -> Result<Booking> {
        if actor.role != Role::Admin {
            return Err(AppError::Forbidden);
        }
        if amount_cents <= 0 {
            return Err(AppError::BadRequest(
                "Refund amount must be greater than zero".to_string(),
            ));
        }

        let mut booking = self
            .booking_repo
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        append_admin_note(
            &mut booking,
            actor.id,
            &format!(
                "force-refund ${:.2}{}",
                amount_cents as f64 / 100.0,
                note.map(|n| format!(": {}", n)).unwrap_or_default()
            ),
        );

        self.process_refund(booking, amount_cents).await
    }

    pub async fn get_payment(&self, actor: &User, id: Uuid) -> Result<Payment> {
        let payment = self
            .payment_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))?;

        let authorized = payment.customer_id == actor.id
            || payment.artist_id == actor.id
            || actor.role == Role::Admin;
        if !authorized {
            return Err(AppError::Forbidden);
        }

        Ok(payment)
    }

    pub async fn list_for_actor(&self, actor: &User) -> Result<Vec<Payment>> {
        match actor.role {
            Role::Customer => self.payment_repo.list_for_customer(actor.id).await,
            Role::Artist => self.payment_repo.list_for_artist(actor.id).await,
            Role::Admin => self.payment_repo.list_all(200, 0).await,
        }
    }

    /// Re-checks a charge against the processor's record. Used for manual
    /// reconciliation when a callback is suspected lost.
    pub async fn verify_payment(&self, actor: &User, id: Uuid) -> Result<Payment> {
        let payment = self.get_payment(actor, id).await?;

        let charge_id = payment
            .charge_id
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("Payment has no gateway charge".to_string()))?;

        let outcome = self.gateway.retrieve(charge_id).await?;

        if payment.status == PaymentStatus::Pending {
            self.apply_gateway_event(charge_id, outcome.status == GatewayStatus::Succeeded)
                .await?;
            return self.get_payment(actor, id).await;
        }

        Ok(payment)
    }

    /// Reconciles an asynchronous gateway callback. Only Pending charges
    /// move; replays of already-settled events are no-ops.
    pub async fn apply_gateway_event(&self, charge_id: &str, succeeded: bool) -> Result<()> {
        let payment = match self.payment_repo.find_by_charge_id(charge_id).await? {
            Some(p) => p,
            None => {
                tracing::warn!("gateway event for unknown charge: {}", charge_id);
                return Ok(());
            }
        };

        if payment.status != PaymentStatus::Pending {
            return Ok(());
        }

        let status = if succeeded {
            PaymentStatus::Succeeded
        } else {
            PaymentStatus::Failed
        };
        self.payment_repo.update_status(payment.id, status).await?;

        let mut booking = match self.booking_repo.find_by_id(payment.booking_id).await? {
            Some(b) => b,
            None => return Ok(()),
        };

        if succeeded {
            booking.amount_paid_cents += payment.amount_cents;
            booking.payment_status = if booking.amount_paid_cents >= booking.total_amount_cents {
                BookingPaymentStatus::Paid
            } else {
                BookingPaymentStatus::Held
            };
        } else if booking.amount_paid_cents == 0 {
            booking.payment_status = BookingPaymentStatus::Failed;
        }

        self.booking_repo.update(&booking).await?;

        if succeeded {
            self.dispatcher
                .notify(
                    booking.artist_id,
                    NotificationKind::PaymentReceived,
                    "Payment Received",
                    &format!(
                        "Payment received for booking. Amount: ${:.2}",
                        payment.amount_cents as f64 / 100.0
                    ),
                    Some(payment.id),
                )
                .await;
        }

        Ok(())
    }
}

/// Appends a timestamped admin-action line to the booking's audit notes.
pub fn append_admin_note(booking: &mut Booking, actor_id: Uuid, text: &str) {
    let line = format!("[{}] admin {}: {}", Utc::now().to_rfc3339(), actor_id, text);
    booking.admin_notes = Some(match booking.admin_notes.take() {
        Some(existing) => format!("{}\n{}", existing, line),
        None => line,
    });
}
