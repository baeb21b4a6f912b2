mod common;

use atelier::{
    domain::{ArtistApplication, PendingArtistStatus, Role},
    error::AppError,
    repository::{PendingArtistRepository, UserRepository},
};
use common::{create_user, setup};

fn application(email: &str) -> ArtistApplication {
    ArtistApplication {
        email: email.to_string(),
        name: "Prospective Artist".to_string(),
        phone: None,
        category_id: None,
        bio: Some("Oil on canvas".to_string()),
        hourly_rate_cents: 15_000,
    }
}

#[tokio::test]
async fn approval_promotes_into_user_and_profile() -> anyhow::Result<()> {
    let env = setup().await?;
    let admin = create_user(&env, Role::Admin, "admin@example.com").await?;

    let pending = env
        .ctx
        .approval_service
        .apply(application("new.artist@example.com"))
        .await?;
    assert_eq!(pending.status, PendingArtistStatus::Pending);

    let (user, password) = env
        .ctx
        .approval_service
        .approve(&admin, pending.id)
        .await?;

    assert_eq!(user.role, Role::Artist);
    assert_eq!(user.email, "new.artist@example.com");
    assert_eq!(password.len(), 16);

    // The profile exists and carries the applied rate.
    let profile = env
        .ctx
        .user_repo
        .find_artist_profile(user.id)
        .await?
        .expect("artist profile should exist");
    assert_eq!(profile.hourly_rate_cents, 15_000);

    // The staging row is gone.
    assert!(env
        .ctx
        .pending_artist_repo
        .find_by_id(pending.id)
        .await?
        .is_none());

    // Replaying the approval can't double promote.
    let err = env
        .ctx
        .approval_service
        .approve(&admin, pending.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    Ok(())
}

#[tokio::test]
async fn rejection_flags_the_application() -> anyhow::Result<()> {
    let env = setup().await?;
    let admin = create_user(&env, Role::Admin, "admin@example.com").await?;

    let pending = env
        .ctx
        .approval_service
        .apply(application("declined@example.com"))
        .await?;

    let rejected = env.ctx.approval_service.reject(&admin, pending.id).await?;
    assert_eq!(rejected.status, PendingArtistStatus::Rejected);
    assert_eq!(rejected.reviewed_by, Some(admin.id));

    // No user record was ever created.
    assert!(env
        .ctx
        .user_repo
        .find_by_email("declined@example.com")
        .await?
        .is_none());

    // A second rejection is not pending anymore.
    let err = env
        .ctx
        .approval_service
        .reject(&admin, pending.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}

#[tokio::test]
async fn application_conflicts_with_existing_account() -> anyhow::Result<()> {
    let env = setup().await?;
    create_user(&env, Role::Customer, "taken@example.com").await?;

    let err = env
        .ctx
        .approval_service
        .apply(application("taken@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    Ok(())
}

#[tokio::test]
async fn only_admins_review_applications() -> anyhow::Result<()> {
    let env = setup().await?;
    let customer = create_user(&env, Role::Customer, "cust@example.com").await?;

    let pending = env
        .ctx
        .approval_service
        .apply(application("hopeful@example.com"))
        .await?;

    let err = env
        .ctx
        .approval_service
        .approve(&customer, pending.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let err = env
        .ctx
        .approval_service
        .list_pending(&customer)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    Ok(())
}
