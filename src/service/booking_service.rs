use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    config::BookingConfig,
    domain::{
        Booking, BookingFilter, BookingPaymentStatus, BookingStatus, Cancellation, ChatChannel,
        CreateBookingRequest, CustomQuote, Dispute, DisputeStatus, FinalApproval,
        NotificationKind, PricingType, RefundStatus, Revision, RevisionStatus, Role, User,
    },
    error::{AppError, Result},
    notify::NotificationDispatcher,
    repository::{BookingRepository, ChatRepository, UserRepository},
    service::{payment_service::append_admin_note, pricing, PaymentService},
};

/// Validates and applies booking status changes. All transition rules live
/// here; handlers never compare statuses themselves.
pub struct BookingService {
    booking_repo: Arc<dyn BookingRepository>,
    chat_repo: Arc<dyn ChatRepository>,
    user_repo: Arc<dyn UserRepository>,
    payment_service: Arc<PaymentService>,
    dispatcher: Arc<NotificationDispatcher>,
    defaults: BookingConfig,
}

impl BookingService {
    pub fn new(
        booking_repo: Arc<dyn BookingRepository>,
        chat_repo: Arc<dyn ChatRepository>,
        user_repo: Arc<dyn UserRepository>,
        payment_service: Arc<PaymentService>,
        dispatcher: Arc<NotificationDispatcher>,
        defaults: BookingConfig,
    ) -> Self {
        Self {
            booking_repo,
            chat_repo,
            user_repo,
            payment_service,
            dispatcher,
            defaults,
        }
    }

    pub async fn create_booking(
        &self,
        actor: &User,
        request: CreateBookingRequest,
    ) -> Result<Booking> {
        if actor.role != Role::Customer {
            return Err(AppError::Forbidden);
        }

        let artist = self
            .user_repo
            .find_by_id(request.artist_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Artist not found".to_string()))?;
        if artist.role != Role::Artist || !artist.active {
            return Err(AppError::BadRequest(
                "Artist is not available for booking".to_string(),
            ));
        }

        if request.estimated_start_date <= Utc::now() {
            return Err(AppError::BadRequest(
                "Estimated start date must be in the future".to_string(),
            ));
        }

        let total_amount_cents = pricing::resolve_total_amount(
            request.pricing_type,
            None,
            request.package_price_cents,
            request.total_amount_cents,
        )?;

        let booking = Booking {
            id: Uuid::new_v4(),
            customer_id: actor.id,
            artist_id: request.artist_id,
            category_id: request.category_id,
            status: BookingStatus::Pending,
            payment_status: BookingPaymentStatus::Pending,
            pricing_type: request.pricing_type,
            payment_type: request.payment_type,
            total_amount_cents,
            amount_paid_cents: 0,
            amount_refunded_cents: 0,
            advance_percentage: request.advance_percentage,
            revisions_used: 0,
            revision_limit: request.revision_limit,
            estimated_start_date: request.estimated_start_date,
            cancellation_window_hours: request.cancellation_window_hours,
            location: request.location,
            special_requests: request.special_requests,
            custom_quote: None,
            cancellation: None,
            dispute: None,
            final_approval: None,
            admin_notes: None,
            version: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let booking = self.booking_repo.create(booking).await?;

        self.dispatcher
            .notify(
                booking.artist_id,
                NotificationKind::BookingRequest,
                "New Booking Request",
                &format!("You have a new booking request from {}.", actor.name),
                Some(booking.id),
            )
            .await;

        Ok(booking)
    }

    /// Fills per-booking defaults from the marketplace configuration.
    pub fn defaults(&self) -> &BookingConfig {
        &self.defaults
    }

    pub async fn get_booking(&self, actor: &User, id: Uuid) -> Result<Booking> {
        let booking = self
            .booking_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        self.require_participant(actor, &booking)?;
        Ok(booking)
    }

    pub async fn list_bookings(
        &self,
        actor: &User,
        mut filter: BookingFilter,
    ) -> Result<(Vec<Booking>, i64)> {
        match actor.role {
            Role::Customer => filter.customer_id = Some(actor.id),
            Role::Artist => filter.artist_id = Some(actor.id),
            Role::Admin => {}
        }

        let total = self.booking_repo.count(&filter).await?;
        let bookings = self.booking_repo.list(&filter).await?;
        Ok((bookings, total))
    }

    pub async fn revisions(&self, actor: &User, booking_id: Uuid) -> Result<Vec<Revision>> {
        let booking = self.get_booking(actor, booking_id).await?;
        self.booking_repo.revisions_for(booking.id).await
    }

    /// The transition engine. State validity is checked before actor
    /// authority, so an impossible transition reads as BadRequest even for
    /// an admin, and an unauthorized-but-possible one as Forbidden.
    pub async fn transition(
        &self,
        actor: &User,
        booking_id: Uuid,
        target: BookingStatus,
        revision_description: Option<String>,
        notes: Option<String>,
    ) -> Result<Booking> {
        let mut booking = self
            .booking_repo
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        let current = booking.status;
        Self::require_valid_pair(current, target)?;
        self.require_transition_authority(actor, &booking, current, target)?;

        match (current, target) {
            (BookingStatus::Review, BookingStatus::InProgress) => {
                if booking.revisions_used >= booking.revision_limit {
                    return Err(AppError::BadRequest(format!(
                        "Revision limit reached ({}/{})",
                        booking.revisions_used, booking.revision_limit
                    )));
                }
                booking.revisions_used += 1;
                self.booking_repo
                    .add_revision(Revision {
                        id: Uuid::new_v4(),
                        booking_id: booking.id,
                        requested_by: actor.id,
                        description: revision_description,
                        status: RevisionStatus::Requested,
                        created_at: Utc::now(),
                    })
                    .await?;
            }
            (BookingStatus::Review, BookingStatus::Completed) => {
                booking.final_approval = Some(FinalApproval {
                    approved_by: actor.id,
                    notes,
                    approved_at: Utc::now(),
                });
            }
            _ => {}
        }

        booking.status = target;
        let booking = self.booking_repo.update(&booking).await?;

        // First entry into InProgress opens the chat channel between the
        // two parties.
        if target == BookingStatus::InProgress {
            self.ensure_chat_channel(&booking).await;
        }

        self.notify_transition(&booking, actor, current, target).await;

        Ok(booking)
    }

    /// Cancellation is its own path because money moves: the refund is
    /// computed from the policy before the status flips.
    pub async fn cancel(
        &self,
        actor: &User,
        booking_id: Uuid,
        reason: Option<String>,
    ) -> Result<Booking> {
        let mut booking = self
            .booking_repo
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        let refund_cents = pricing::cancellation_refund(
            booking.status,
            booking.estimated_start_date,
            Utc::now(),
            booking.cancellation_window_hours,
            booking.amount_paid_cents,
        )?;

        let is_participant =
            booking.customer_id == actor.id || booking.artist_id == actor.id;
        if !is_participant && actor.role != Role::Admin {
            return Err(AppError::Forbidden);
        }

        booking.status = BookingStatus::Cancelled;
        booking.cancellation = Some(Cancellation {
            cancelled_by: actor.id,
            reason,
            refund_amount_cents: refund_cents,
            refund_status: RefundStatus::Pending,
            window_hours: booking.cancellation_window_hours,
        });

        let booking = self.booking_repo.update(&booking).await?;
        let booking = self.payment_service.process_refund(booking, refund_cents).await?;

        let recipient = if actor.id == booking.customer_id {
            booking.artist_id
        } else {
            booking.customer_id
        };
        self.dispatcher
            .notify(
                recipient,
                NotificationKind::BookingStatus,
                "Booking Cancelled",
                "The booking has been cancelled.",
                Some(booking.id),
            )
            .await;

        Ok(booking)
    }

    /// Admin override: cancel from any state except an already-cancelled
    /// booking, refunding exactly the amount the admin specifies.
    pub async fn force_cancel(
        &self,
        actor: &User,
        booking_id: Uuid,
        reason: Option<String>,
        refund_cents: Option<i64>,
    ) -> Result<Booking> {
        if actor.role != Role::Admin {
            return Err(AppError::Forbidden);
        }

        let mut booking = self
            .booking_repo
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        if booking.status == BookingStatus::Cancelled {
            return Err(AppError::BadRequest(
                "Booking is already cancelled".to_string(),
            ));
        }

        let refund_cents = refund_cents.unwrap_or(0);

        append_admin_note(
            &mut booking,
            actor.id,
            &format!(
                "force-cancel{}",
                reason
                    .as_deref()
                    .map(|r| format!(": {}", r))
                    .unwrap_or_default()
            ),
        );

        booking.status = BookingStatus::Cancelled;
        booking.cancellation = Some(Cancellation {
            cancelled_by: actor.id,
            reason,
            refund_amount_cents: refund_cents,
            refund_status: RefundStatus::Pending,
            window_hours: booking.cancellation_window_hours,
        });

        let booking = self.booking_repo.update(&booking).await?;
        let booking = self.payment_service.process_refund(booking, refund_cents).await?;

        self.dispatcher
            .notify(
                booking.customer_id,
                NotificationKind::BookingStatus,
                "Booking Cancelled",
                "Your booking has been cancelled by an administrator.",
                Some(booking.id),
            )
            .await;

        Ok(booking)
    }

    /// Artist proposes a price for a custom-quote booking. Renegotiation is
    /// allowed until the customer approves.
    pub async fn set_quote(
        &self,
        actor: &User,
        booking_id: Uuid,
        amount_cents: i64,
    ) -> Result<Booking> {
        let mut booking = self
            .booking_repo
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        if booking.artist_id != actor.id {
            return Err(AppError::Forbidden);
        }
        if booking.pricing_type != PricingType::CustomQuote {
            return Err(AppError::BadRequest(
                "Booking does not use custom-quote pricing".to_string(),
            ));
        }
        if booking.status != BookingStatus::Pending {
            return Err(AppError::BadRequest(
                "Quotes can only be set while the booking is pending".to_string(),
            ));
        }
        if amount_cents <= 0 {
            return Err(AppError::BadRequest(
                "Quote amount must be greater than zero".to_string(),
            ));
        }
        if let Some(ref quote) = booking.custom_quote {
            if quote.approved {
                return Err(AppError::BadRequest(
                    "Quote already approved".to_string(),
                ));
            }
        }

        booking.custom_quote = Some(CustomQuote {
            amount_cents,
            approved: false,
            requested_at: Utc::now(),
            approved_at: None,
        });

        let booking = self.booking_repo.update(&booking).await?;

        self.dispatcher
            .notify(
                booking.customer_id,
                NotificationKind::BookingStatus,
                "Quote Received",
                &format!(
                    "The artist proposed a quote of ${:.2}.",
                    amount_cents as f64 / 100.0
                ),
                Some(booking.id),
            )
            .await;

        Ok(booking)
    }

    pub async fn approve_quote(&self, actor: &User, booking_id: Uuid) -> Result<Booking> {
        let mut booking = self
            .booking_repo
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        if booking.customer_id != actor.id {
            return Err(AppError::Forbidden);
        }

        let quote = booking
            .custom_quote
            .as_mut()
            .ok_or_else(|| AppError::BadRequest("No quote to approve".to_string()))?;

        if quote.approved {
            return Err(AppError::BadRequest("Quote already approved".to_string()));
        }

        quote.approved = true;
        quote.approved_at = Some(Utc::now());
        booking.total_amount_cents = quote.amount_cents;

        let booking = self.booking_repo.update(&booking).await?;

        self.dispatcher
            .notify(
                booking.artist_id,
                NotificationKind::BookingStatus,
                "Quote Approved",
                "Your quote has been approved by the customer.",
                Some(booking.id),
            )
            .await;

        Ok(booking)
    }

    pub async fn open_dispute(
        &self,
        actor: &User,
        booking_id: Uuid,
        reason: String,
    ) -> Result<Booking> {
        let mut booking = self
            .booking_repo
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        self.require_participant(actor, &booking)?;

        if let Some(ref dispute) = booking.dispute {
            if dispute.status == DisputeStatus::Open {
                return Err(AppError::BadRequest(
                    "A dispute is already open for this booking".to_string(),
                ));
            }
        }

        booking.dispute = Some(Dispute {
            status: DisputeStatus::Open,
            reason,
            admin_decision: None,
        });

        let booking = self.booking_repo.update(&booking).await?;

        let recipient = if actor.id == booking.customer_id {
            booking.artist_id
        } else {
            booking.customer_id
        };
        self.dispatcher
            .notify(
                recipient,
                NotificationKind::Dispute,
                "Dispute Opened",
                "A dispute has been opened on one of your bookings.",
                Some(booking.id),
            )
            .await;

        Ok(booking)
    }

    /// Resolving a dispute may carry an admin-directed refund; both parties
    /// always hear about the outcome.
    pub async fn resolve_dispute(
        &self,
        actor: &User,
        booking_id: Uuid,
        decision: String,
        refund_cents: Option<i64>,
    ) -> Result<Booking> {
        if actor.role != Role::Admin {
            return Err(AppError::Forbidden);
        }

        let mut booking = self
            .booking_repo
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        match booking.dispute {
            Some(ref mut dispute) if dispute.status == DisputeStatus::Open => {
                dispute.status = DisputeStatus::Resolved;
                dispute.admin_decision = Some(decision.clone());
            }
            _ => {
                return Err(AppError::BadRequest(
                    "No open dispute on this booking".to_string(),
                ));
            }
        }

        append_admin_note(&mut booking, actor.id, &format!("dispute resolved: {}", decision));

        let booking = self.booking_repo.update(&booking).await?;

        let booking = match refund_cents {
            Some(amount) if amount > 0 => {
                self.payment_service.process_refund(booking, amount).await?
            }
            _ => booking,
        };

        for recipient in [booking.customer_id, booking.artist_id] {
            self.dispatcher
                .notify(
                    recipient,
                    NotificationKind::Dispute,
                    "Dispute Resolved",
                    &format!("The dispute has been resolved: {}", decision),
                    Some(booking.id),
                )
                .await;
        }

        Ok(booking)
    }

    fn require_participant(&self, actor: &User, booking: &Booking) -> Result<()> {
        let authorized = booking.customer_id == actor.id
            || booking.artist_id == actor.id
            || actor.role == Role::Admin;
        if !authorized {
            return Err(AppError::Forbidden);
        }
        Ok(())
    }

    fn require_valid_pair(current: BookingStatus, target: BookingStatus) -> Result<()> {
        let valid = matches!(
            (current, target),
            (BookingStatus::Pending, BookingStatus::InProgress)
                | (BookingStatus::Pending, BookingStatus::Declined)
                | (BookingStatus::InProgress, BookingStatus::Review)
                | (BookingStatus::Review, BookingStatus::Completed)
                | (BookingStatus::Review, BookingStatus::InProgress)
        );

        if !valid {
            return Err(AppError::BadRequest(format!(
                "Cannot move a booking from {} to {}",
                current.as_str(),
                target.as_str()
            )));
        }
        Ok(())
    }

    fn require_transition_authority(
        &self,
        actor: &User,
        booking: &Booking,
        current: BookingStatus,
        target: BookingStatus,
    ) -> Result<()> {
        let is_artist = booking.artist_id == actor.id;
        let is_customer = booking.customer_id == actor.id;
        let is_admin = actor.role == Role::Admin;

        let allowed = match (current, target) {
            (BookingStatus::Pending, BookingStatus::InProgress)
            | (BookingStatus::Pending, BookingStatus::Declined)
            | (BookingStatus::InProgress, BookingStatus::Review) => is_artist || is_admin,
            (BookingStatus::Review, BookingStatus::Completed) => is_customer || is_admin,
            // The revision loop belongs to the paying customer alone.
            (BookingStatus::Review, BookingStatus::InProgress) => is_customer,
            _ => false,
        };

        if !allowed {
            return Err(AppError::Forbidden);
        }
        Ok(())
    }

    async fn ensure_chat_channel(&self, booking: &Booking) {
        match self.chat_repo.find_channel_by_booking(booking.id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                let channel = ChatChannel {
                    id: Uuid::new_v4(),
                    booking_id: booking.id,
                    customer_id: booking.customer_id,
                    artist_id: booking.artist_id,
                    created_at: Utc::now(),
                };
                if let Err(e) = self.chat_repo.create_channel(channel).await {
                    tracing::error!("failed to create chat channel: {:?}", e);
                }
            }
            Err(e) => {
                tracing::error!("failed to look up chat channel: {:?}", e);
            }
        }
    }

    /// Exactly one notification per successful transition, aimed at the
    /// party who did not drive it.
    async fn notify_transition(
        &self,
        booking: &Booking,
        actor: &User,
        current: BookingStatus,
        target: BookingStatus,
    ) {
        let (recipient, title, body) = match (current, target) {
            (BookingStatus::Pending, BookingStatus::InProgress) => (
                booking.customer_id,
                "Booking Accepted",
                "Your booking has been accepted and work has started.".to_string(),
            ),
            (BookingStatus::Pending, BookingStatus::Declined) => (
                booking.customer_id,
                "Booking Declined",
                "Your booking request has been declined.".to_string(),
            ),
            (BookingStatus::InProgress, BookingStatus::Review) => (
                booking.customer_id,
                "Ready for Review",
                "The artist marked the work as complete. Please review it.".to_string(),
            ),
            (BookingStatus::Review, BookingStatus::Completed) => (
                booking.artist_id,
                "Booking Completed",
                "The customer approved the work. The booking is complete.".to_string(),
            ),
            (BookingStatus::Review, BookingStatus::InProgress) => (
                booking.artist_id,
                "Revision Requested",
                format!(
                    "The customer requested a revision ({}/{} used).",
                    booking.revisions_used, booking.revision_limit
                ),
            ),
            _ => (
                if actor.id == booking.customer_id {
                    booking.artist_id
                } else {
                    booking.customer_id
                },
                "Booking Updated",
                format!("The booking is now {}.", target.as_str()),
            ),
        };

        self.dispatcher
            .notify(
                recipient,
                NotificationKind::BookingStatus,
                title,
                &body,
                Some(booking.id),
            )
            .await;
    }
}
