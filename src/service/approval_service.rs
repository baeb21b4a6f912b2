use std::sync::Arc;

use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    auth::AuthService,
    domain::{ArtistApplication, NotificationKind, PendingArtist, PendingArtistStatus, Role, User},
    error::{AppError, Result},
    notify::{Mailer, NotificationDispatcher},
    repository::{PendingArtistRepository, UserRepository},
};

/// Handles the pending-artist lifecycle. Approval is a single transaction:
/// either the user, the profile and the staging-row removal all land, or
/// none of them do.
pub struct ApprovalService {
    pool: SqlitePool,
    pending_repo: Arc<dyn PendingArtistRepository>,
    user_repo: Arc<dyn UserRepository>,
    dispatcher: Arc<NotificationDispatcher>,
    mailer: Option<Arc<Mailer>>,
}

impl ApprovalService {
    pub fn new(
        pool: SqlitePool,
        pending_repo: Arc<dyn PendingArtistRepository>,
        user_repo: Arc<dyn UserRepository>,
        dispatcher: Arc<NotificationDispatcher>,
        mailer: Option<Arc<Mailer>>,
    ) -> Self {
        Self {
            pool,
            pending_repo,
            user_repo,
            dispatcher,
            mailer,
        }
    }

    pub async fn apply(&self, application: ArtistApplication) -> Result<PendingArtist> {
        if self
            .user_repo
            .find_by_email(&application.email)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }

        self.pending_repo.create(application).await
    }

    pub async fn list_pending(&self, actor: &User) -> Result<Vec<PendingArtist>> {
        if actor.role != Role::Admin {
            return Err(AppError::Forbidden);
        }
        self.pending_repo.list_pending().await
    }

    /// Promotes a pending artist into a live User + ArtistProfile pair and
    /// removes the staging row, all inside one transaction. Returns the new
    /// user and the generated one-time password.
    pub async fn approve(&self, actor: &User, pending_id: Uuid) -> Result<(User, String)> {
        if actor.role != Role::Admin {
            return Err(AppError::Forbidden);
        }

        let pending = self
            .pending_repo
            .find_by_id(pending_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;

        if pending.status != PendingArtistStatus::Pending {
            return Err(AppError::BadRequest(
                "Application is not pending review".to_string(),
            ));
        }

        if self.user_repo.find_by_email(&pending.email).await?.is_some() {
            return Err(AppError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }

        let password = generate_password();
        let password_hash = AuthService::hash_password(&password)?;

        let user_id = Uuid::new_v4();
        let now = Utc::now().naive_utc();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, role, name, phone, active, created_at, updated_at)
            VALUES (?, ?, ?, 'Artist', ?, ?, 1, ?, ?)
            "#,
        )
        .bind(user_id.to_string())
        .bind(&pending.email)
        .bind(&password_hash)
        .bind(&pending.name)
        .bind(&pending.phone)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO artist_profiles (
                user_id, category_id, bio, skills, hourly_rate_cents,
                rating, total_reviews, created_at, updated_at
            ) VALUES (?, ?, ?, '[]', ?, 0, 0, ?, ?)
            "#,
        )
        .bind(user_id.to_string())
        .bind(pending.category_id.map(|c| c.to_string()))
        .bind(&pending.bio)
        .bind(pending.hourly_rate_cents)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        sqlx::query("DELETE FROM pending_artists WHERE id = ?")
            .bind(pending.id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve promoted artist".to_string()))?;

        self.dispatcher
            .notify(
                user.id,
                NotificationKind::ArtistApplication,
                "Application Approved",
                "Your artist application has been approved. Welcome aboard!",
                None,
            )
            .await;

        if let Some(ref mailer) = self.mailer {
            mailer
                .send_best_effort(
                    &user.email,
                    "Your artist application was approved",
                    &format!(
                        "Hi {},\n\nYour application has been approved. \
                         Sign in with the temporary password: {}\n",
                        user.name, password
                    ),
                )
                .await;
        }

        Ok((user, password))
    }

    pub async fn reject(&self, actor: &User, pending_id: Uuid) -> Result<PendingArtist> {
        if actor.role != Role::Admin {
            return Err(AppError::Forbidden);
        }

        let pending = self.pending_repo.mark_rejected(pending_id, actor.id).await?;

        if let Some(ref mailer) = self.mailer {
            mailer
                .send_best_effort(
                    &pending.email,
                    "Your artist application",
                    &format!(
                        "Hi {},\n\nUnfortunately your application was not accepted this time.\n",
                        pending.name
                    ),
                )
                .await;
        } else {
            tracing::info!("artist application {} rejected", pending.id);
        }

        Ok(pending)
    }
}

fn generate_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect()
}
