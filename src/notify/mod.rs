use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    domain::{Notification, NotificationKind},
    repository::NotificationRepository,
};

pub mod email;
pub use email::Mailer;

/// Best-effort notification fan-out. Delivery failures are logged and
/// swallowed; the caller's primary operation never fails because a
/// notification could not be written.
pub struct NotificationDispatcher {
    repo: Arc<dyn NotificationRepository>,
}

impl NotificationDispatcher {
    pub fn new(repo: Arc<dyn NotificationRepository>) -> Self {
        Self { repo }
    }

    pub async fn notify(
        &self,
        user_id: Uuid,
        kind: NotificationKind,
        title: &str,
        body: &str,
        related_id: Option<Uuid>,
    ) {
        let notification = Notification {
            id: Uuid::new_v4(),
            user_id,
            kind,
            title: title.to_string(),
            body: body.to_string(),
            is_read: false,
            related_id,
            created_at: Utc::now(),
        };

        match self.repo.create(notification).await {
            Ok(_) => {
                tracing::debug!(%user_id, kind = kind.as_str(), "notification dispatched");
            }
            Err(e) => {
                tracing::error!(%user_id, kind = kind.as_str(), "notification dispatch failed: {:?}", e);
            }
        }
    }
}
