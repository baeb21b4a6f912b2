pub mod approval_service;
pub mod booking_service;
pub mod payment_service;
pub mod pricing;
pub mod report_service;
pub mod review_service;

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::AuthService;
use crate::config::Settings;
use crate::notify::{Mailer, NotificationDispatcher};
use crate::payments::PaymentGateway;
use crate::repository::*;

pub use approval_service::ApprovalService;
pub use booking_service::BookingService;
pub use payment_service::PaymentService;
pub use report_service::{ArtistPerformance, DashboardStats, ReportService};
pub use review_service::ReviewService;

pub struct ServiceContext {
    pub booking_repo: Arc<dyn BookingRepository>,
    pub payment_repo: Arc<dyn PaymentRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub pending_artist_repo: Arc<dyn PendingArtistRepository>,
    pub review_repo: Arc<dyn ReviewRepository>,
    pub category_repo: Arc<dyn CategoryRepository>,
    pub notification_repo: Arc<dyn NotificationRepository>,
    pub chat_repo: Arc<dyn ChatRepository>,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub auth_service: Arc<AuthService>,
    pub booking_service: Arc<BookingService>,
    pub payment_service: Arc<PaymentService>,
    pub approval_service: Arc<ApprovalService>,
    pub review_service: Arc<ReviewService>,
    pub report_service: Arc<ReportService>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(
        db_pool: SqlitePool,
        gateway: Arc<dyn PaymentGateway>,
        mailer: Option<Arc<Mailer>>,
        settings: &Settings,
    ) -> Self {
        let booking_repo: Arc<dyn BookingRepository> =
            Arc::new(SqliteBookingRepository::new(db_pool.clone()));
        let payment_repo: Arc<dyn PaymentRepository> =
            Arc::new(SqlitePaymentRepository::new(db_pool.clone()));
        let user_repo: Arc<dyn UserRepository> =
            Arc::new(SqliteUserRepository::new(db_pool.clone()));
        let pending_artist_repo: Arc<dyn PendingArtistRepository> =
            Arc::new(SqlitePendingArtistRepository::new(db_pool.clone()));
        let review_repo: Arc<dyn ReviewRepository> =
            Arc::new(SqliteReviewRepository::new(db_pool.clone()));
        let category_repo: Arc<dyn CategoryRepository> =
            Arc::new(SqliteCategoryRepository::new(db_pool.clone()));
        let notification_repo: Arc<dyn NotificationRepository> =
            Arc::new(SqliteNotificationRepository::new(db_pool.clone()));
        let chat_repo: Arc<dyn ChatRepository> =
            Arc::new(SqliteChatRepository::new(db_pool.clone()));

        let dispatcher = Arc::new(NotificationDispatcher::new(notification_repo.clone()));

        let auth_service = Arc::new(AuthService::new(
            settings.auth.jwt_secret.clone(),
            settings.auth.token_duration_hours,
        ));

        let payment_service = Arc::new(PaymentService::new(
            payment_repo.clone(),
            booking_repo.clone(),
            gateway,
            dispatcher.clone(),
            settings.booking.platform_fee_percent,
        ));

        let booking_service = Arc::new(BookingService::new(
            booking_repo.clone(),
            chat_repo.clone(),
            user_repo.clone(),
            payment_service.clone(),
            dispatcher.clone(),
            settings.booking.clone(),
        ));

        let approval_service = Arc::new(ApprovalService::new(
            db_pool.clone(),
            pending_artist_repo.clone(),
            user_repo.clone(),
            dispatcher.clone(),
            mailer,
        ));

        let review_service = Arc::new(ReviewService::new(
            review_repo.clone(),
            booking_repo.clone(),
            user_repo.clone(),
            dispatcher.clone(),
        ));

        let report_service = Arc::new(ReportService::new(
            booking_repo.clone(),
            payment_repo.clone(),
            review_repo.clone(),
            user_repo.clone(),
        ));

        Self {
            booking_repo,
            payment_repo,
            user_repo,
            pending_artist_repo,
            review_repo,
            category_repo,
            notification_repo,
            chat_repo,
            dispatcher,
            auth_service,
            booking_service,
            payment_service,
            approval_service,
            review_service,
            report_service,
            db_pool,
        }
    }
}
