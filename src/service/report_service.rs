use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::{
    domain::{BookingFilter, BookingStatus, PaymentStatus, Role, User},
    error::{AppError, Result},
    repository::{BookingRepository, PaymentRepository, ReviewRepository, UserRepository},
};

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_artists: i64,
    pub total_customers: i64,
    pub total_bookings: i64,
    pub pending_bookings: i64,
    pub total_revenue_cents: i64,
    pub total_reviews: i64,
}

#[derive(Debug, Serialize)]
pub struct ArtistPerformance {
    pub artist_id: Uuid,
    pub total_bookings: i64,
    pub completed_bookings: i64,
    pub cancelled_bookings: i64,
    pub earnings_cents: i64,
    pub platform_fees_cents: i64,
    pub average_rating: f64,
    pub total_reviews: i64,
}

pub struct ReportService {
    booking_repo: Arc<dyn BookingRepository>,
    payment_repo: Arc<dyn PaymentRepository>,
    review_repo: Arc<dyn ReviewRepository>,
    user_repo: Arc<dyn UserRepository>,
}

impl ReportService {
    pub fn new(
        booking_repo: Arc<dyn BookingRepository>,
        payment_repo: Arc<dyn PaymentRepository>,
        review_repo: Arc<dyn ReviewRepository>,
        user_repo: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            booking_repo,
            payment_repo,
            review_repo,
            user_repo,
        }
    }

    pub async fn dashboard_stats(&self, actor: &User) -> Result<DashboardStats> {
        if actor.role != Role::Admin {
            return Err(AppError::Forbidden);
        }

        Ok(DashboardStats {
            total_artists: self.user_repo.count_by_role(Role::Artist).await?,
            total_customers: self.user_repo.count_by_role(Role::Customer).await?,
            total_bookings: self.booking_repo.count_all().await?,
            pending_bookings: self
                .booking_repo
                .count_with_status(BookingStatus::Pending)
                .await?,
            total_revenue_cents: self.payment_repo.succeeded_revenue_cents().await?,
            total_reviews: self.review_repo.count_visible().await?,
        })
    }

    /// Per-artist roll-up: bookings by outcome, settled earnings net of the
    /// platform commission, and the review aggregate.
    pub async fn artist_performance(&self, actor: &User, artist_id: Uuid) -> Result<ArtistPerformance> {
        if actor.role != Role::Admin && actor.id != artist_id {
            return Err(AppError::Forbidden);
        }

        let mut filter = BookingFilter {
            artist_id: Some(artist_id),
            ..Default::default()
        };

        let total_bookings = self.booking_repo.count(&filter).await?;
        filter.status = Some(BookingStatus::Completed);
        let completed_bookings = self.booking_repo.count(&filter).await?;
        filter.status = Some(BookingStatus::Cancelled);
        let cancelled_bookings = self.booking_repo.count(&filter).await?;

        let payments = self.payment_repo.list_for_artist(artist_id).await?;
        let (mut earnings_cents, mut platform_fees_cents) = (0, 0);
        for payment in payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Succeeded)
        {
            earnings_cents += payment.amount_cents - payment.platform_fee_cents;
            platform_fees_cents += payment.platform_fee_cents;
        }

        let (average_rating, total_reviews) =
            self.review_repo.aggregate_for_artist(artist_id).await?;

        Ok(ArtistPerformance {
            artist_id,
            total_bookings,
            completed_bookings,
            cancelled_bookings,
            earnings_cents,
            platform_fees_cents,
            average_rating,
            total_reviews,
        })
    }
}
