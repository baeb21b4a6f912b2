use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    domain::{BookingStatus, CreateReviewRequest, NotificationKind, Review, Role, User},
    error::{AppError, Result},
    notify::NotificationDispatcher,
    repository::{BookingRepository, ReviewRepository, UserRepository},
};

pub struct ReviewService {
    review_repo: Arc<dyn ReviewRepository>,
    booking_repo: Arc<dyn BookingRepository>,
    user_repo: Arc<dyn UserRepository>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl ReviewService {
    pub fn new(
        review_repo: Arc<dyn ReviewRepository>,
        booking_repo: Arc<dyn BookingRepository>,
        user_repo: Arc<dyn UserRepository>,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            review_repo,
            booking_repo,
            user_repo,
            dispatcher,
        }
    }

    /// One review per completed booking, written by the owning customer.
    pub async fn create_review(&self, actor: &User, request: CreateReviewRequest) -> Result<Review> {
        if !(1..=5).contains(&request.rating) {
            return Err(AppError::BadRequest(
                "Rating must be between 1 and 5".to_string(),
            ));
        }

        let booking = self
            .booking_repo
            .find_by_id(request.booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        if booking.customer_id != actor.id {
            return Err(AppError::Forbidden);
        }

        if booking.status != BookingStatus::Completed {
            return Err(AppError::BadRequest(
                "Only completed bookings can be reviewed".to_string(),
            ));
        }

        if self
            .review_repo
            .find_by_booking(booking.id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "A review already exists for this booking".to_string(),
            ));
        }

        let review = self
            .review_repo
            .create(Review {
                id: Uuid::new_v4(),
                booking_id: booking.id,
                customer_id: booking.customer_id,
                artist_id: booking.artist_id,
                rating: request.rating,
                comment: request.comment,
                visible: true,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .await?;

        self.refresh_artist_rating(booking.artist_id).await?;

        self.dispatcher
            .notify(
                booking.artist_id,
                NotificationKind::ReviewReceived,
                "New Review Received",
                &format!("You received a {}-star review from {}.", review.rating, actor.name),
                Some(review.id),
            )
            .await;

        Ok(review)
    }

    pub async fn get_review(&self, id: Uuid) -> Result<Review> {
        self.review_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Review not found".to_string()))
    }

    pub async fn list_by_artist(
        &self,
        artist_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Review>> {
        self.review_repo.list_by_artist(artist_id, limit, offset).await
    }

    pub async fn update_review(
        &self,
        actor: &User,
        id: Uuid,
        rating: Option<i64>,
        comment: Option<String>,
    ) -> Result<Review> {
        let mut review = self.get_review(id).await?;

        if review.customer_id != actor.id {
            return Err(AppError::Forbidden);
        }

        if let Some(rating) = rating {
            if !(1..=5).contains(&rating) {
                return Err(AppError::BadRequest(
                    "Rating must be between 1 and 5".to_string(),
                ));
            }
            review.rating = rating;
        }
        if let Some(comment) = comment {
            review.comment = Some(comment);
        }

        let review = self.review_repo.update(&review).await?;
        self.refresh_artist_rating(review.artist_id).await?;

        Ok(review)
    }

    pub async fn delete_review(&self, actor: &User, id: Uuid) -> Result<()> {
        let review = self.get_review(id).await?;

        if review.customer_id != actor.id && actor.role != Role::Admin {
            return Err(AppError::Forbidden);
        }

        self.review_repo.delete(id).await?;
        self.refresh_artist_rating(review.artist_id).await?;

        Ok(())
    }

    /// Admin moderation: hidden reviews drop out of listings and the
    /// artist's aggregate.
    pub async fn set_visibility(&self, actor: &User, id: Uuid, visible: bool) -> Result<Review> {
        if actor.role != Role::Admin {
            return Err(AppError::Forbidden);
        }

        let review = self.review_repo.set_visibility(id, visible).await?;
        self.refresh_artist_rating(review.artist_id).await?;

        Ok(review)
    }

    async fn refresh_artist_rating(&self, artist_id: Uuid) -> Result<()> {
        let (rating, total) = self.review_repo.aggregate_for_artist(artist_id).await?;
        self.user_repo
            .update_artist_rating(artist_id, rating, total)
            .await
    }
}
